//! Identifiers dispatched during the current run
use std::collections::HashSet;

/// Set of identifiers already handed to a document worker in this run
///
/// Only the coordinator's control task touches this set, so it needs no
/// locking. It only ever grows.
#[derive(Debug, Clone, Default)]
pub struct SeenSet {
    ids: HashSet<String>,
}

impl SeenSet {
    /// Creates an empty set
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns true if `id` was already dispatched
    pub fn contains(&self, id: &str) -> bool {
        self.ids.contains(id)
    }

    /// Marks `id` as dispatched
    ///
    /// Returns false if it was already present.
    pub fn insert(&mut self, id: &str) -> bool {
        if self.ids.contains(id) {
            return false;
        }
        self.ids.insert(id.to_string())
    }

    /// Number of identifiers seen so far
    pub fn len(&self) -> usize {
        self.ids.len()
    }

    /// Returns true if nothing has been dispatched yet
    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }
}
