//! Cooperative cancellation for the crawl loop
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

/// Flag raised once by an interrupt and polled by the coordinator
///
/// The coordinator checks it before each listing page and before each
/// dispatch round. Workers already running are never interrupted.
#[derive(Debug, Clone, Default)]
pub struct CancellationFlag {
    cancelled: Arc<AtomicBool>,
}

impl CancellationFlag {
    /// Creates an unset flag
    pub fn new() -> Self {
        Self::default()
    }

    /// Raises the flag. There is no way to lower it again.
    pub fn cancel(&self) {
        self.cancelled.store(true, Ordering::SeqCst);
    }

    /// Returns true once [`cancel`](Self::cancel) has been called on any handle
    pub fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::SeqCst)
    }
}
