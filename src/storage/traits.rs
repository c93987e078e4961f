//! Storage traits and error types
//!
//! This module defines the trait interface for storage backends and
//! associated error types.

use crate::crawler::DocumentRecord;
use async_trait::async_trait;
use thiserror::Error;

/// Errors that can occur during storage operations
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("Failed to write {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to serialize record {id}: {source}")]
    Serialization {
        id: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("Invalid storage key: '{0}'")]
    InvalidKey(String),
}

/// Result type for storage operations
pub type StorageResult<T> = Result<T, StorageError>;

/// Trait for storage backend implementations
///
/// Records are keyed by document identifier and attachments by their
/// normalized file name. Concurrent workers write disjoint keys, so
/// implementations only need to be safe for concurrent use across keys.
#[async_trait]
pub trait Storage: Send + Sync {
    /// Returns true if a record for `id` was persisted by this or an
    /// earlier run
    ///
    /// This is the resumption probe consulted by the page scanner.
    fn has_record(&self, id: &str) -> bool;

    /// Writes an attachment under its file name
    async fn write_attachment(&self, name: &str, bytes: &[u8]) -> StorageResult<()>;

    /// Serializes and writes a document record
    ///
    /// Once this returns `Ok`, [`has_record`](Self::has_record) must report
    /// the record as present.
    async fn write_record(&self, record: &DocumentRecord) -> StorageResult<()>;
}
