//! Output module for run statistics and the final report
//!
//! Documents themselves are written through [`crate::storage`]; this module
//! only covers what the run reports about itself.

pub mod stats;

pub use stats::{print_statistics, CrawlStatistics, StopReason};
