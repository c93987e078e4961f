//! State module for tracking crawl progress
//!
//! All run state is owned by the coordinator and handed to workers
//! explicitly; nothing here is a process-wide singleton.
//!
//! # Components
//!
//! - `SeenSet`: identifiers already dispatched in this run
//! - `SuccessCounter`: documents fully written, shared by all workers
//! - `CancellationFlag`: raised by an interrupt, polled by the crawl loop

mod cancel;
mod counter;
mod seen;

// Re-export main types
pub use cancel::CancellationFlag;
pub use counter::SuccessCounter;
pub use seen::SeenSet;
