//! wares-core - Core library for wares
//!
//! Provides the item model, flat-file dataset store, stats aggregation with
//! a version-checked single-flight cache, and list query logic.

pub mod cache;
pub mod error;
pub mod models;
pub mod query;
pub mod stats;
pub mod store;

pub use cache::StatsCache;
pub use error::CoreError;
pub use models::{Item, ItemPage, NewItem, StatsSnapshot};
pub use store::{DatasetStore, JsonFileStore, VersionToken};
