//! Flat-file dataset store
//!
//! The whole collection lives in one JSON file and is read/rewritten
//! wholesale. The file's modified time doubles as the dataset's version
//! token: any write moves it, which is what invalidates derived data.
//!
//! Durability and multi-writer coordination are out of scope; the store
//! assumes a single process owns the file.

use crate::error::CoreError;
use crate::models::{Item, NewItem};
use async_trait::async_trait;
use std::path::{Path, PathBuf};
use std::time::SystemTime;
use tracing::debug;

/// Opaque comparable marker for the dataset's current state.
///
/// Two tokens compare equal iff no write happened between the reads that
/// produced them (backed by the file's mtime).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct VersionToken(SystemTime);

impl VersionToken {
    pub fn from_mtime(mtime: SystemTime) -> Self {
        Self(mtime)
    }
}

/// Read-side interface required by derived-data consumers.
///
/// Both operations may fail with I/O errors; callers decide how to degrade.
#[async_trait]
pub trait DatasetStore: Send + Sync + 'static {
    /// Read the full ordered collection.
    async fn read_all(&self) -> Result<Vec<Item>, CoreError>;

    /// Current version token for change detection.
    async fn version_token(&self) -> Result<VersionToken, CoreError>;
}

/// JSON flat-file implementation of [`DatasetStore`].
pub struct JsonFileStore {
    path: PathBuf,
}

impl JsonFileStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Replace the whole collection on disk (pretty-printed, like the
    /// seed file, so manual edits stay pleasant).
    pub async fn replace_all(&self, items: &[Item]) -> Result<(), CoreError> {
        let json = serde_json::to_string_pretty(items)
            .map_err(|source| CoreError::JsonSerialize { source })?;

        tokio::fs::write(&self.path, json)
            .await
            .map_err(|source| CoreError::FileWrite {
                path: self.path.clone(),
                source,
            })?;

        debug!(path = %self.path.display(), count = items.len(), "Dataset rewritten");
        Ok(())
    }

    /// Append a new item, assigning its id from the current epoch millis.
    ///
    /// Returns the stored item. The rewrite moves the file mtime, so the
    /// stats cache sees a new version token on its next check.
    pub async fn append(&self, new: NewItem) -> Result<Item, CoreError> {
        let mut items = self.read_all().await?;

        let item = new.into_item(chrono::Utc::now().timestamp_millis());
        items.push(item.clone());

        self.replace_all(&items).await?;

        debug!(id = item.id, name = %item.name, "Item appended");
        Ok(item)
    }

    /// Look up a single item by id.
    pub async fn find(&self, id: i64) -> Result<Item, CoreError> {
        let items = self.read_all().await?;
        items
            .into_iter()
            .find(|item| item.id == id)
            .ok_or(CoreError::ItemNotFound { id })
    }
}

#[async_trait]
impl DatasetStore for JsonFileStore {
    async fn read_all(&self) -> Result<Vec<Item>, CoreError> {
        let raw = tokio::fs::read_to_string(&self.path)
            .await
            .map_err(|source| CoreError::FileRead {
                path: self.path.clone(),
                source,
            })?;

        serde_json::from_str(&raw).map_err(|source| CoreError::JsonParse {
            path: self.path.clone(),
            source,
        })
    }

    async fn version_token(&self) -> Result<VersionToken, CoreError> {
        let meta = tokio::fs::metadata(&self.path)
            .await
            .map_err(|source| CoreError::FileStat {
                path: self.path.clone(),
                source,
            })?;

        let mtime = meta.modified().map_err(|source| CoreError::FileStat {
            path: self.path.clone(),
            source,
        })?;

        Ok(VersionToken::from_mtime(mtime))
    }
}
