//! Shared success counter for document workers
use std::sync::Arc;
use tokio::sync::Mutex;

/// Number of documents fully written during this run
///
/// Cloning yields another handle to the same counter. Workers increment it
/// only after every artifact of a document has been written.
#[derive(Debug, Clone, Default)]
pub struct SuccessCounter {
    count: Arc<Mutex<u64>>,
}

impl SuccessCounter {
    /// Creates a counter starting at zero
    pub fn new() -> Self {
        Self::default()
    }

    /// Increments the counter and returns the new value
    pub async fn increment(&self) -> u64 {
        let mut count = self.count.lock().await;
        *count += 1;
        *count
    }

    /// Current value
    pub async fn get(&self) -> u64 {
        *self.count.lock().await
    }
}
