//! Document worker: fetch, extract and persist one catalog record
//!
//! A worker handles exactly one identifier. Every failure is terminal for
//! that identifier in this run and nothing is retried; a later run picks the
//! identifier up again because no `<id>.json` was written.

use crate::crawler::fetcher::fetch_url;
use crate::crawler::metadata::{extract_record, DocumentRecord};
use crate::state::SuccessCounter;
use crate::storage::{Storage, StorageError};
use crate::url::CatalogUrls;
use crate::{FetchError, ParseError};
use reqwest::Client;
use std::sync::Arc;
use thiserror::Error;

/// Why a document was abandoned
#[derive(Debug, Error)]
pub enum DocumentError {
    #[error("cannot fetch metadata: {0}")]
    Metadata(#[source] FetchError),

    #[error("cannot parse metadata: {0}")]
    Parse(#[from] ParseError),

    #[error("cannot fetch attachment {name}: {source}")]
    Attachment {
        name: String,
        #[source]
        source: FetchError,
    },

    #[error("cannot store document: {0}")]
    Storage(#[from] StorageError),
}

/// Final state of one dispatched identifier
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DocumentOutcome {
    /// Record (and attachment, if any) written
    Saved(String),
    /// Abandoned; the reason was logged
    Failed(String),
}

/// Shared context for document workers
///
/// Cheap to clone: one clone is moved into every spawned task.
#[derive(Clone)]
pub struct DocumentWorker {
    client: Client,
    urls: Arc<CatalogUrls>,
    storage: Arc<dyn Storage>,
    counter: SuccessCounter,
    fetch_attachments: bool,
}

impl DocumentWorker {
    pub fn new(
        client: Client,
        urls: Arc<CatalogUrls>,
        storage: Arc<dyn Storage>,
        counter: SuccessCounter,
        fetch_attachments: bool,
    ) -> Self {
        Self {
            client,
            urls,
            storage,
            counter,
            fetch_attachments,
        }
    }

    /// Processes `id` and logs the result
    ///
    /// This is the body of the task spawned per identifier.
    pub async fn run(self, id: String) -> DocumentOutcome {
        match self.process(&id).await {
            Ok(record) => {
                tracing::info!("Document {} saved: {}", id, record.title);
                DocumentOutcome::Saved(id)
            }
            Err(e) => {
                tracing::warn!("Skipping document {}: {}", id, e);
                DocumentOutcome::Failed(id)
            }
        }
    }

    /// Fetches, extracts and persists one document
    ///
    /// 1. fetch the metadata document
    /// 2. extract the record
    /// 3. if enabled and declared, fetch and write the attachment
    /// 4. write the record
    /// 5. increment the success counter
    ///
    /// The record is written last, so a missing attachment never leaves a
    /// record (and thus a resumption marker) behind.
    pub async fn process(&self, id: &str) -> Result<DocumentRecord, DocumentError> {
        let metadata_url = self.urls.metadata_url(id);
        let xml = fetch_url(&self.client, metadata_url.as_str())
            .await
            .map_err(DocumentError::Metadata)?;

        let record = extract_record(&xml, id)?;

        if self.fetch_attachments {
            if let Some(name) = record.attachment() {
                let attachment_url = self.urls.attachment_url(name);
                let bytes = fetch_url(&self.client, attachment_url.as_str())
                    .await
                    .map_err(|source| DocumentError::Attachment {
                        name: name.to_string(),
                        source,
                    })?;
                self.storage.write_attachment(name, &bytes).await?;
            }
        }

        self.storage.write_record(&record).await?;

        let total = self.counter.increment().await;
        tracing::debug!("{} documents saved so far", total);

        Ok(record)
    }
}
