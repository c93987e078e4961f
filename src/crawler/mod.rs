//! Crawler module for catalog harvesting
//!
//! This module contains the core harvesting logic, including:
//! - HTTP fetching of listing pages, metadata documents and attachments
//! - Listing page scanning for document identifiers
//! - Metadata extraction from the XML rendition of a detail page
//! - Per-document workers and overall crawl coordination

mod coordinator;
mod fetcher;
mod metadata;
mod scanner;
mod worker;

pub use coordinator::{run_crawl, Coordinator};
pub use fetcher::{build_http_client, fetch_url};
pub use metadata::{
    extract_fields, extract_record, normalize_attachment_name, DocumentRecord, ExtractedFields,
};
pub use scanner::{PageScanner, ScanResult};
pub use worker::{DocumentError, DocumentOutcome, DocumentWorker};
