//! Bounded worker pool for article fetches
//!
//! Submission never blocks: each submitted URL becomes a task that first
//! waits for one of `K` semaphore permits, so at most `K` fetches are in
//! flight while the rest queue. Results are collected by [`FetchDispatcher::drain`]
//! in completion order.

use crate::crawler::article::{ArticleFetcher, ArticleOutcome, ArticleRecord};
use crate::output::CrawlStats;
use futures::stream::{self, Stream};
use std::sync::Arc;
use tokio::sync::Semaphore;
use tokio::task::{AbortHandle, JoinSet};
use url::Url;

/// Default number of concurrent article fetches
pub const DEFAULT_WORKERS: usize = 10;

pub struct FetchDispatcher {
    fetcher: ArticleFetcher,
    permits: Arc<Semaphore>,
    tasks: JoinSet<ArticleOutcome>,
    stats: Arc<CrawlStats>,
}

impl FetchDispatcher {
    /// Creates a pool allowing `workers` fetches in flight (at least one)
    pub fn new(fetcher: ArticleFetcher, workers: usize, stats: Arc<CrawlStats>) -> Self {
        Self {
            fetcher,
            permits: Arc::new(Semaphore::new(workers.max(1))),
            tasks: JoinSet::new(),
            stats,
        }
    }

    /// Queues one article fetch
    ///
    /// Must be called from within a Tokio runtime.
    pub fn submit(&mut self, url: Url) -> AbortHandle {
        let fetcher = self.fetcher.clone();
        let permits = Arc::clone(&self.permits);
        let stats = Arc::clone(&self.stats);
        stats.record_submitted();

        self.tasks.spawn(async move {
            let outcome = match permits.acquire_owned().await {
                Ok(_permit) => fetcher.fetch(&url).await,
                Err(_) => ArticleOutcome::Failed {
                    url: url.to_string(),
                    reason: "worker pool closed".to_string(),
                },
            };

            match &outcome {
                ArticleOutcome::Complete(_) => stats.record_complete(),
                ArticleOutcome::Restricted(_) => stats.record_restricted(),
                ArticleOutcome::Failed { .. } => stats.record_article_failure(),
            }
            outcome
        })
    }

    /// Number of submitted tasks not yet collected
    pub fn pending(&self) -> usize {
        self.tasks.len()
    }

    /// Consumes the pool, yielding every record as its task completes
    ///
    /// Failed fetches are logged and skipped; a panicking task is logged and
    /// does not stop the others.
    pub fn drain(self) -> impl Stream<Item = ArticleRecord> {
        stream::unfold(self.tasks, |mut tasks| async move {
            loop {
                match tasks.join_next().await? {
                    Ok(ArticleOutcome::Failed { url, reason }) => {
                        tracing::warn!("Dropping article {}: {}", url, reason);
                    }
                    Ok(outcome) => {
                        if let Some(record) = outcome.into_record() {
                            return Some((record, tasks));
                        }
                    }
                    Err(e) => {
                        tracing::error!("Article task failed: {}", e);
                    }
                }
            }
        })
    }
}
