//! Storage module for persisting harvested documents
//!
//! This module handles all durable writes for the crawler:
//! - Document records serialized as `<id>.json`
//! - Attachment files stored under their normalized names
//! - Presence checks used to resume a crawl across runs

mod fs;
mod traits;

pub use fs::FsStorage;
pub use traits::{Storage, StorageError, StorageResult};

use std::path::Path;
use std::sync::Arc;

/// Opens the output directory as shared storage for the crawl
///
/// # Arguments
///
/// * `path` - The output directory (created if missing)
///
/// # Returns
///
/// * `Ok(Arc<dyn Storage>)` - Storage ready to be shared by workers
/// * `Err(HarvestError)` - The directory could not be created
pub fn open_storage(path: &Path) -> crate::Result<Arc<dyn Storage>> {
    Ok(Arc::new(FsStorage::new(path)?))
}
