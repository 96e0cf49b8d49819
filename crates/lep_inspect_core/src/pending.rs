//! crates/lep_inspect_core/src/pending.rs
//!
//! The set of locally staged upload candidates. Candidates keep their
//! insertion order; that order is the positional contract with the init
//! endpoint, so the set never reorders.

use uuid::Uuid;

use crate::domain::UploadCandidate;

/// Ordered collection of files staged for the next batch submission.
#[derive(Debug, Default)]
pub struct PendingSet {
    items: Vec<UploadCandidate>,
}

impl PendingSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, candidate: UploadCandidate) {
        self.items.push(candidate);
    }

    /// Removes one candidate by its client-generated handle. Returns whether
    /// anything was removed.
    pub fn remove(&mut self, id: Uuid) -> bool {
        let before = self.items.len();
        self.items.retain(|c| c.id != id);
        self.items.len() != before
    }

    /// Drops every candidate. Called on explicit clear and after a
    /// successful submit.
    pub fn clear(&mut self) {
        self.items.clear();
    }

    pub fn candidates(&self) -> &[UploadCandidate] {
        &self.items
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}
