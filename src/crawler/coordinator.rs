//! Crawler coordinator - main crawl orchestration logic
//!
//! The coordinator walks listing pages in order. For each page it:
//! - fetches and scans the listing
//! - decides whether the catalog has run dry
//! - spawns one document worker per new identifier
//! - waits for every worker before moving to the next page
//!
//! Waiting for all workers before the next page keeps the success counter
//! exact when the "empty page" stop rule is evaluated.

use crate::config::Config;
use crate::crawler::fetcher::{build_http_client, fetch_url};
use crate::crawler::scanner::PageScanner;
use crate::crawler::worker::{DocumentOutcome, DocumentWorker};
use crate::output::{CrawlStatistics, StopReason};
use crate::state::{CancellationFlag, SeenSet, SuccessCounter};
use crate::storage::{open_storage, Storage};
use crate::url::CatalogUrls;
use crate::ConfigError;
use reqwest::Client;
use std::path::Path;
use std::sync::Arc;
use tokio::task::JoinSet;

/// What the crawl loop should do after a listing page
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum PageStep {
    /// Move on to the next page
    Continue,
    /// The page was empty after earlier successes
    Exhausted,
    /// Cancellation was requested before dispatch
    Cancelled,
}

/// Main crawler coordinator structure
pub struct Coordinator {
    config: Arc<Config>,
    client: Client,
    urls: Arc<CatalogUrls>,
    scanner: PageScanner,
    storage: Arc<dyn Storage>,
    worker: DocumentWorker,
    seen: SeenSet,
    counter: SuccessCounter,
    cancel: CancellationFlag,
    stats: CrawlStatistics,
}

impl Coordinator {
    /// Creates a coordinator writing to the configured output directory
    ///
    /// # Arguments
    ///
    /// * `config` - The validated harvester configuration
    ///
    /// # Returns
    ///
    /// * `Ok(Coordinator)` - Ready to run
    /// * `Err(HarvestError)` - No output directory, or it could not be
    ///   created, or the HTTP client could not be built
    pub fn new(config: Config) -> crate::Result<Self> {
        let directory = config.output.directory.clone().ok_or_else(|| {
            ConfigError::Validation("output directory not specified".to_string())
        })?;
        let storage = open_storage(Path::new(&directory))?;
        Self::with_storage(config, storage)
    }

    /// Creates a coordinator on top of an existing storage backend
    pub fn with_storage(config: Config, storage: Arc<dyn Storage>) -> crate::Result<Self> {
        let urls = Arc::new(CatalogUrls::new(&config.catalog)?);
        let scanner = PageScanner::new(&config.catalog, urls.as_ref().clone())?;
        let client = build_http_client(&config.http)?;
        let counter = SuccessCounter::new();

        let worker = DocumentWorker::new(
            client.clone(),
            urls.clone(),
            storage.clone(),
            counter.clone(),
            config.crawl.fetch_attachments,
        );

        Ok(Self {
            config: Arc::new(config),
            client,
            urls,
            scanner,
            storage,
            worker,
            seen: SeenSet::new(),
            counter,
            cancel: CancellationFlag::new(),
            stats: CrawlStatistics::new(),
        })
    }

    /// Replaces the cancellation flag, e.g. with one wired to Ctrl+C
    pub fn with_cancellation(mut self, cancel: CancellationFlag) -> Self {
        self.cancel = cancel;
        self
    }

    /// A handle to this coordinator's cancellation flag
    pub fn cancellation_flag(&self) -> CancellationFlag {
        self.cancel.clone()
    }

    /// A handle to the shared success counter
    pub fn success_counter(&self) -> SuccessCounter {
        self.counter.clone()
    }

    /// Runs the crawl loop until the page range is exhausted, the catalog
    /// runs dry, or cancellation is requested
    ///
    /// Per-page and per-document failures are logged and skipped, so the
    /// crawl itself cannot fail.
    ///
    /// # Returns
    ///
    /// Statistics for the run, including the final success count
    pub async fn run(&mut self) -> CrawlStatistics {
        let start_page = self.config.crawl.start_page;
        let max_page = self.config.crawl.max_page;
        tracing::info!("Starting crawl at page {} (last page {})", start_page, max_page);

        let mut tasks: JoinSet<DocumentOutcome> = JoinSet::new();
        let mut stop_reason = StopReason::PageLimit;

        for page in start_page..=max_page {
            if self.cancel.is_cancelled() {
                tracing::info!("Crawl interrupted before page {}", page);
                stop_reason = StopReason::Interrupted;
                break;
            }

            let step = self.crawl_page(page, &mut tasks).await;

            // Every worker settles before the next page is considered.
            self.wait_for_workers(&mut tasks).await;

            match step {
                PageStep::Continue => {}
                PageStep::Exhausted => {
                    tracing::info!("No more documents in index page {}", page);
                    stop_reason = StopReason::Exhausted;
                    break;
                }
                PageStep::Cancelled => {
                    stop_reason = StopReason::Interrupted;
                    break;
                }
            }
        }

        let saved = self.counter.get().await;
        self.stats.finish(saved, stop_reason);
        tracing::info!("Done, {} documents were fetched", saved);

        self.stats.clone()
    }

    /// Fetches, scans and dispatches one listing page
    async fn crawl_page(&mut self, page: u32, tasks: &mut JoinSet<DocumentOutcome>) -> PageStep {
        let page_url = self.urls.listing_url(page);
        self.stats.last_page = Some(page);

        let body = match fetch_url(&self.client, page_url.as_str()).await {
            Ok(body) => body,
            Err(e) => {
                tracing::warn!("Cannot fetch listing page {}: {}", page, e);
                self.stats.pages_failed += 1;
                return PageStep::Continue;
            }
        };

        let storage = &self.storage;
        let scan = match self
            .scanner
            .scan(&body, &page_url, &mut self.seen, |id| storage.has_record(id))
        {
            Ok(scan) => scan,
            Err(e) => {
                tracing::warn!("Cannot parse listing page {}: {}", page, e);
                self.stats.pages_failed += 1;
                return PageStep::Continue;
            }
        };

        self.stats.pages_fetched += 1;
        self.stats.already_persisted += scan.already_persisted as u64;

        if scan.is_empty() {
            if self.counter.get().await > 0 {
                return PageStep::Exhausted;
            }
            tracing::debug!(
                "Listing page {} has nothing new ({} links, {} already saved)",
                page,
                scan.anchors,
                scan.already_persisted
            );
            return PageStep::Continue;
        }

        if self.cancel.is_cancelled() {
            tracing::info!(
                "Crawl interrupted, not dispatching {} documents from page {}",
                scan.document_ids.len(),
                page
            );
            return PageStep::Cancelled;
        }

        tracing::info!(
            "Page {}: dispatching {} documents",
            page,
            scan.document_ids.len()
        );

        for id in scan.document_ids {
            self.stats.documents_dispatched += 1;
            tasks.spawn(self.worker.clone().run(id));
        }

        PageStep::Continue
    }

    /// Joins every spawned worker
    async fn wait_for_workers(&mut self, tasks: &mut JoinSet<DocumentOutcome>) {
        if tasks.is_empty() {
            return;
        }

        tracing::debug!("Waiting for {} pending documents...", tasks.len());
        while let Some(joined) = tasks.join_next().await {
            match joined {
                Ok(DocumentOutcome::Saved(_)) => {}
                Ok(DocumentOutcome::Failed(_)) => self.stats.documents_failed += 1,
                Err(e) => {
                    tracing::error!("Document task did not complete: {}", e);
                    self.stats.documents_failed += 1;
                }
            }
        }
    }
}

/// Runs a complete crawl with the given configuration
///
/// # Example
///
/// ```no_run
/// use etd_harvester::config::{validate, Config, ConfigOverrides};
/// use etd_harvester::crawler::run_crawl;
/// use etd_harvester::state::CancellationFlag;
///
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let config = Config::default().with_overrides(ConfigOverrides {
///     output_dir: Some("./out".to_string()),
///     max_page: Some(5),
///     ..Default::default()
/// });
/// validate(&config)?;
/// let stats = run_crawl(config, CancellationFlag::new()).await?;
/// println!("{} documents saved", stats.documents_saved);
/// # Ok(())
/// # }
/// ```
pub async fn run_crawl(
    config: Config,
    cancel: CancellationFlag,
) -> crate::Result<CrawlStatistics> {
    let mut coordinator = Coordinator::new(config)?.with_cancellation(cancel);
    Ok(coordinator.run().await)
}
