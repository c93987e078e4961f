//! Listing page scanner
//!
//! Extracts document identifiers from the detail links of a listing page
//! and filters out the ones this run (or a previous run) already handled.

use crate::config::CatalogConfig;
use crate::state::SeenSet;
use crate::url::CatalogUrls;
use crate::{ConfigError, ParseError};
use scraper::{Html, Selector};
use url::Url;

/// Outcome of scanning one listing page
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ScanResult {
    /// Identifier-bearing anchors found on the page, new or not
    pub anchors: usize,

    /// Identifiers to dispatch, in page order
    pub document_ids: Vec<String>,

    /// Anchors skipped because the identifier was already dispatched
    pub already_seen: usize,

    /// Anchors skipped because a record already exists on disk
    pub already_persisted: usize,
}

impl ScanResult {
    /// Returns true if the page yielded nothing to dispatch
    pub fn is_empty(&self) -> bool {
        self.document_ids.is_empty()
    }

    /// Returns true if the page had no identifier-bearing anchors at all
    pub fn has_no_listing(&self) -> bool {
        self.anchors == 0
    }
}

/// Scans listing pages for new document identifiers
#[derive(Debug, Clone)]
pub struct PageScanner {
    selector: Selector,
    urls: CatalogUrls,
}

impl PageScanner {
    /// Creates a scanner for the configured listing layout
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::Validation` if the listing selector is not a
    /// valid CSS selector.
    pub fn new(config: &CatalogConfig, urls: CatalogUrls) -> Result<Self, ConfigError> {
        let selector = Selector::parse(&config.listing_selector).map_err(|e| {
            ConfigError::Validation(format!(
                "invalid listing-selector '{}': {:?}",
                config.listing_selector, e
            ))
        })?;

        Ok(Self { selector, urls })
    }

    /// Scans one listing page
    ///
    /// For every anchor matched by the listing selector that carries a
    /// document identifier:
    /// 1. skip it if `seen` already holds the identifier
    /// 2. skip it if `is_persisted` reports an existing record
    /// 3. otherwise mark it seen and emit it
    ///
    /// # Arguments
    ///
    /// * `page` - Raw listing page body
    /// * `page_url` - Address the page was fetched from (for relative links)
    /// * `seen` - Identifiers already dispatched in this run
    /// * `is_persisted` - Resumption probe
    ///
    /// # Errors
    ///
    /// Returns `ParseError::NoMarkup` if the body contains no markup at all
    /// (an empty body or a plain-text error message). Bytes that are not
    /// UTF-8 are replaced rather than rejected; the links are ASCII.
    pub fn scan<F>(
        &self,
        page: &[u8],
        page_url: &Url,
        seen: &mut SeenSet,
        is_persisted: F,
    ) -> Result<ScanResult, ParseError>
    where
        F: Fn(&str) -> bool,
    {
        let html = String::from_utf8_lossy(page);
        if !html.contains('<') {
            return Err(ParseError::NoMarkup);
        }
        let document = Html::parse_document(&html);

        let mut result = ScanResult::default();

        for element in document.select(&self.selector) {
            let Some(href) = element.value().attr("href") else {
                continue;
            };
            let Some(id) = self.urls.document_id(href, page_url) else {
                continue;
            };
            result.anchors += 1;

            if seen.contains(&id) {
                tracing::trace!("Skipping {}: already dispatched", id);
                result.already_seen += 1;
                continue;
            }

            if is_persisted(&id) {
                tracing::debug!("Skipping {}: record already saved", id);
                result.already_persisted += 1;
                continue;
            }

            seen.insert(&id);
            result.document_ids.push(id);
        }

        Ok(result)
    }
}
