//! Run statistics
//!
//! Counters are shared between the coordinating task and fetch workers, so
//! they are plain atomics; a [`StatsSnapshot`] is taken once the run ends.

use std::sync::atomic::{AtomicU64, Ordering};

/// Live counters for one crawl run
#[derive(Debug, Default)]
pub struct CrawlStats {
    pages_fetched: AtomicU64,
    transport_failures: AtomicU64,
    index_pages: AtomicU64,
    empty_index_pages: AtomicU64,
    articles_submitted: AtomicU64,
    articles_complete: AtomicU64,
    articles_restricted: AtomicU64,
    articles_failed: AtomicU64,
}

/// Final counts for one crawl run
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct StatsSnapshot {
    /// Pages retrieved for links or index listings
    pub pages_fetched: u64,
    /// Page retrievals that failed (article fetches are counted separately)
    pub transport_failures: u64,
    pub index_pages: u64,
    pub empty_index_pages: u64,
    pub articles_submitted: u64,
    pub articles_complete: u64,
    pub articles_restricted: u64,
    pub articles_failed: u64,
}

impl CrawlStats {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record_page(&self) {
        self.pages_fetched.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_transport_failure(&self) {
        self.transport_failures.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_index_page(&self, link_count: usize) {
        self.index_pages.fetch_add(1, Ordering::Relaxed);
        if link_count == 0 {
            self.empty_index_pages.fetch_add(1, Ordering::Relaxed);
        }
    }

    pub fn record_submitted(&self) {
        self.articles_submitted.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_complete(&self) {
        self.articles_complete.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_restricted(&self) {
        self.articles_restricted.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_article_failure(&self) {
        self.articles_failed.fetch_add(1, Ordering::Relaxed);
    }

    pub fn snapshot(&self) -> StatsSnapshot {
        StatsSnapshot {
            pages_fetched: self.pages_fetched.load(Ordering::Relaxed),
            transport_failures: self.transport_failures.load(Ordering::Relaxed),
            index_pages: self.index_pages.load(Ordering::Relaxed),
            empty_index_pages: self.empty_index_pages.load(Ordering::Relaxed),
            articles_submitted: self.articles_submitted.load(Ordering::Relaxed),
            articles_complete: self.articles_complete.load(Ordering::Relaxed),
            articles_restricted: self.articles_restricted.load(Ordering::Relaxed),
            articles_failed: self.articles_failed.load(Ordering::Relaxed),
        }
    }
}

impl StatsSnapshot {
    /// Articles that made it into the batch
    pub fn articles_collected(&self) -> u64 {
        self.articles_complete + self.articles_restricted
    }

    /// Share of submitted articles that produced a record, as a percentage
    pub fn success_rate(&self) -> f64 {
        if self.articles_submitted == 0 {
            return 0.0;
        }
        (self.articles_collected() as f64 / self.articles_submitted as f64) * 100.0
    }

    /// Logs the run summary
    pub fn log_summary(&self) {
        tracing::info!(
            "Pages fetched: {} ({} transport failures), index pages: {} ({} empty)",
            self.pages_fetched,
            self.transport_failures,
            self.index_pages,
            self.empty_index_pages
        );
        tracing::info!(
            "Articles submitted: {}, complete: {}, restricted: {}, failed: {} ({:.1}% collected)",
            self.articles_submitted,
            self.articles_complete,
            self.articles_restricted,
            self.articles_failed,
            self.success_rate()
        );
    }
}
