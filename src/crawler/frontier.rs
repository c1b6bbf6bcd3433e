//! Deduplication state for one crawl run
//!
//! The frontier is created empty when a run starts and dropped when it ends.
//! It is shared by handle between the coordinating task and anything else
//! that may submit work; every check-and-insert happens under one lock so
//! two callers can never both claim the same key.

use crate::url::ArticleId;
use std::collections::HashSet;
use std::sync::{Mutex, MutexGuard, PoisonError};
use url::Url;

#[derive(Debug, Default)]
pub struct DedupFrontier {
    /// Article identities already submitted for fetching
    claimed: Mutex<HashSet<ArticleId>>,

    /// Pages already fetched for links (recursive mode)
    visited: Mutex<HashSet<String>>,
}

impl DedupFrontier {
    pub fn new() -> Self {
        Self::default()
    }

    /// Claims an article identity
    ///
    /// Returns true iff this call inserted the identity, i.e. the caller is
    /// the one that must submit the fetch.
    pub fn try_claim(&self, id: &ArticleId) -> bool {
        lock(&self.claimed).insert(id.clone())
    }

    /// Marks a page URL as visited, returning true if it was not visited before
    pub fn try_visit(&self, url: &Url) -> bool {
        lock(&self.visited).insert(url.as_str().to_string())
    }

    pub fn is_visited(&self, url: &Url) -> bool {
        lock(&self.visited).contains(url.as_str())
    }

    /// Number of identities claimed so far
    pub fn claimed_count(&self) -> usize {
        lock(&self.claimed).len()
    }

    pub fn visited_count(&self) -> usize {
        lock(&self.visited).len()
    }
}

/// A panic in another holder cannot leave a `HashSet` half-inserted, so the
/// guard is recovered rather than propagated.
fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}
