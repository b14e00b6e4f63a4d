//! Error types for wares-core
//!
//! Central thiserror hierarchy; callers match on variants to decide
//! between 404s, 500s, and degraded behavior.

use std::path::PathBuf;
use thiserror::Error;

/// Core error type for wares operations
#[derive(Error, Debug)]
pub enum CoreError {
    // ===================
    // IO Errors
    // ===================
    #[error("Failed to read file: {path}")]
    FileRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to write file: {path}")]
    FileWrite {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to stat file: {path}")]
    FileStat {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    // ===================
    // Parse Errors
    // ===================
    #[error("Failed to parse JSON in {path}")]
    JsonParse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("Failed to serialize dataset")]
    JsonSerialize {
        #[source]
        source: serde_json::Error,
    },

    // ===================
    // Domain Errors
    // ===================
    #[error("Item not found: {id}")]
    ItemNotFound { id: i64 },

    #[error("Stats refresh failed: {message}")]
    StatsRefresh { message: String },
}

impl CoreError {
    /// True for errors that map to a missing resource rather than a fault.
    pub fn is_not_found(&self) -> bool {
        matches!(self, CoreError::ItemNotFound { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_not_found_classification() {
        assert!(CoreError::ItemNotFound { id: 7 }.is_not_found());
        assert!(!CoreError::StatsRefresh {
            message: "boom".into()
        }
        .is_not_found());
    }
}
