//! Run statistics collected by the coordinator
//!
//! This module provides the per-run counters and the final report printed
//! by the binary.

use chrono::{DateTime, Utc};
use std::fmt;

/// Why a crawl ended
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StopReason {
    /// The configured last page was processed
    PageLimit,
    /// A listing page yielded nothing new after earlier successes
    Exhausted,
    /// Cancellation was requested
    Interrupted,
}

impl fmt::Display for StopReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let text = match self {
            Self::PageLimit => "page limit reached",
            Self::Exhausted => "no more documents",
            Self::Interrupted => "interrupted",
        };
        f.write_str(text)
    }
}

/// Crawl statistics summary
#[derive(Debug, Clone)]
pub struct CrawlStatistics {
    /// When the coordinator was created
    pub started_at: DateTime<Utc>,

    /// When the crawl loop ended
    pub finished_at: Option<DateTime<Utc>>,

    /// Last listing page that was attempted
    pub last_page: Option<u32>,

    /// Listing pages fetched and scanned
    pub pages_fetched: u64,

    /// Listing pages that could not be fetched or parsed
    pub pages_failed: u64,

    /// Identifiers handed to a worker
    pub documents_dispatched: u64,

    /// Final value of the success counter
    pub documents_saved: u64,

    /// Workers that abandoned their identifier
    pub documents_failed: u64,

    /// Identifiers skipped because a record already existed
    pub already_persisted: u64,

    /// Set once the crawl loop ends
    pub stop_reason: Option<StopReason>,
}

impl CrawlStatistics {
    /// Starts a new set of statistics stamped with the current time
    pub fn new() -> Self {
        Self {
            started_at: Utc::now(),
            finished_at: None,
            last_page: None,
            pages_fetched: 0,
            pages_failed: 0,
            documents_dispatched: 0,
            documents_saved: 0,
            documents_failed: 0,
            already_persisted: 0,
            stop_reason: None,
        }
    }

    /// Records the end of the crawl
    pub fn finish(&mut self, documents_saved: u64, reason: StopReason) {
        self.documents_saved = documents_saved;
        self.stop_reason = Some(reason);
        self.finished_at = Some(Utc::now());
    }

    /// Wall-clock duration in seconds, once finished
    pub fn duration_seconds(&self) -> Option<i64> {
        self.finished_at
            .map(|finished| (finished - self.started_at).num_seconds())
    }

    /// Share of dispatched documents that were saved, in percent
    pub fn success_rate(&self) -> f64 {
        if self.documents_dispatched == 0 {
            return 0.0;
        }
        (self.documents_saved as f64 / self.documents_dispatched as f64) * 100.0
    }
}

impl Default for CrawlStatistics {
    fn default() -> Self {
        Self::new()
    }
}

/// Prints statistics to stdout in a formatted manner
///
/// # Arguments
///
/// * `stats` - The statistics to display
pub fn print_statistics(stats: &CrawlStatistics) {
    println!("=== Harvest Statistics ===\n");

    println!("Run:");
    println!("  Started: {}", stats.started_at.to_rfc3339());
    if let Some(finished) = stats.finished_at {
        println!("  Finished: {}", finished.to_rfc3339());
    }
    if let Some(duration) = stats.duration_seconds() {
        println!("  Duration: {} seconds", duration);
    }
    if let Some(reason) = stats.stop_reason {
        println!("  Stopped: {}", reason);
    }
    if let Some(page) = stats.last_page {
        println!("  Last page: {}", page);
    }
    println!();

    println!("Listing pages:");
    println!("  Fetched: {}", stats.pages_fetched);
    println!("  Failed: {}", stats.pages_failed);
    println!();

    println!("Documents:");
    println!("  Dispatched: {}", stats.documents_dispatched);
    println!("  Saved: {}", stats.documents_saved);
    println!("  Failed: {}", stats.documents_failed);
    println!("  Already saved by a previous run: {}", stats.already_persisted);
    println!();

    println!(
        "Success Rate: {:.1}% ({} / {} documents saved)",
        stats.success_rate(),
        stats.documents_saved,
        stats.documents_dispatched
    );
}
