//! Filesystem storage backend
//!
//! Layout of the output directory:
//! - `<id>.json` - one serialized record per document (the resumption marker)
//! - `<attachment name>` - the attachment file, if the document has one

use crate::crawler::DocumentRecord;
use crate::storage::traits::{Storage, StorageError, StorageResult};
use async_trait::async_trait;
use std::path::{Path, PathBuf};

/// Stores records and attachments as plain files in one directory
#[derive(Debug, Clone)]
pub struct FsStorage {
    root: PathBuf,
}

impl FsStorage {
    /// Opens (creating if needed) the output directory
    ///
    /// # Errors
    ///
    /// Returns `StorageError::Io` if the directory cannot be created.
    pub fn new(root: impl Into<PathBuf>) -> StorageResult<Self> {
        let root = root.into();
        std::fs::create_dir_all(&root).map_err(|source| StorageError::Io {
            path: root.display().to_string(),
            source,
        })?;
        Ok(Self { root })
    }

    /// The output directory
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Path of the record file for `id`
    pub fn record_path(&self, id: &str) -> PathBuf {
        self.root.join(format!("{}.json", id))
    }

    /// Resolves a key to a path directly inside the output directory
    fn key_path(&self, key: &str) -> StorageResult<PathBuf> {
        if key.is_empty()
            || key == "."
            || key == ".."
            || key.contains(|c: char| c == '/' || c == '\\' || c == '\0')
        {
            return Err(StorageError::InvalidKey(key.to_string()));
        }
        Ok(self.root.join(key))
    }
}

/// Writes `bytes` to a sibling temp file and renames it into place
async fn write_atomic(path: &Path, bytes: &[u8]) -> StorageResult<()> {
    let mut tmp = path.as_os_str().to_owned();
    tmp.push(".tmp");
    let tmp = PathBuf::from(tmp);

    let io_err = |source| StorageError::Io {
        path: path.display().to_string(),
        source,
    };

    tokio::fs::write(&tmp, bytes).await.map_err(io_err)?;
    if let Err(source) = tokio::fs::rename(&tmp, path).await {
        let _ = tokio::fs::remove_file(&tmp).await;
        return Err(io_err(source));
    }
    Ok(())
}

#[async_trait]
impl Storage for FsStorage {
    fn has_record(&self, id: &str) -> bool {
        match self.key_path(&format!("{}.json", id)) {
            Ok(path) => path.exists(),
            Err(_) => false,
        }
    }

    async fn write_attachment(&self, name: &str, bytes: &[u8]) -> StorageResult<()> {
        let path = self.key_path(name)?;
        write_atomic(&path, bytes).await?;
        tracing::debug!("Wrote attachment {} ({} bytes)", path.display(), bytes.len());
        Ok(())
    }

    async fn write_record(&self, record: &DocumentRecord) -> StorageResult<()> {
        let path = self.key_path(&format!("{}.json", record.document_id))?;
        let json = serde_json::to_vec(record).map_err(|source| StorageError::Serialization {
            id: record.document_id.clone(),
            source,
        })?;
        write_atomic(&path, &json).await
    }
}
