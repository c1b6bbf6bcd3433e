//! Crawl coordinator - the two traversal strategies
//!
//! Both strategies share the same pipeline: discovered links are resolved to
//! article identities, claimed in the run's [`DedupFrontier`], submitted to a
//! [`FetchDispatcher`], and drained into a [`ResultSink`] once discovery is
//! finished.
//!
//! - **Recursive** (standard mode): depth-bounded link following from a seed.
//! - **Backtrack** (historical mode): every category of the index on every
//!   day of a date range.

use crate::config::{Config, SiteConfig};
use crate::crawler::article::ArticleFetcher;
use crate::crawler::dispatcher::FetchDispatcher;
use crate::crawler::fetcher::{HttpSource, PageSource};
use crate::crawler::frontier::DedupFrontier;
use crate::crawler::paginator::{page_url, IndexPaginator, IndexQuery};
use crate::crawler::parser::extract_site_links;
use crate::output::{CrawlStats, ResultSink, StatsSnapshot};
use crate::url::{article_identity, is_article_url};
use crate::CrawlError;
use chrono::NaiveDate;
use std::sync::Arc;
use url::Url;

/// Outcome of one crawl run
#[derive(Debug)]
pub struct CrawlReport {
    /// Records in completion order
    pub sink: ResultSink,
    pub stats: StatsSnapshot,
}

/// Owns what every run needs; each run builds its own frontier and pool
#[derive(Clone)]
pub struct Coordinator {
    config: Arc<Config>,
    source: Arc<dyn PageSource>,
}

impl Coordinator {
    /// Creates a coordinator that fetches over HTTP
    pub fn new(config: Config) -> Result<Self, CrawlError> {
        let source = HttpSource::from_config(&config.crawler, &config.user_agent)?;
        Ok(Self::with_source(config, Arc::new(source)))
    }

    /// Creates a coordinator over any page source
    pub fn with_source(config: Config, source: Arc<dyn PageSource>) -> Self {
        Self {
            config: Arc::new(config),
            source,
        }
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    fn dispatcher(&self, stats: &Arc<CrawlStats>) -> FetchDispatcher {
        FetchDispatcher::new(
            ArticleFetcher::new(Arc::clone(&self.source)),
            self.config.crawler.max_workers as usize,
            Arc::clone(stats),
        )
    }

    /// Claims the article behind `url` and submits it if nobody has yet
    fn submit_if_unclaimed(
        frontier: &DedupFrontier,
        dispatcher: &mut FetchDispatcher,
        url: &Url,
    ) -> bool {
        let Some(id) = article_identity(url) else {
            return false;
        };

        if frontier.try_claim(&id) {
            tracing::debug!("Submitting article {} ({})", id, url);
            dispatcher.submit(url.clone());
            true
        } else {
            tracing::trace!("Article {} already claimed, skipping {}", id, url);
            false
        }
    }

    /// Recursive crawl from `start`, following same-site links up to `max_depth`
    ///
    /// The work list is a stack, so the most recently discovered link is
    /// visited first. Each page is fetched for links at most once; each
    /// article found along the way is submitted at most once. Submitted
    /// fetches are drained after the work list is empty.
    pub async fn crawl_recursive(&self, start: &Url, max_depth: u32) -> CrawlReport {
        let domain = self.config.site.domain.as_str();
        let stats = Arc::new(CrawlStats::new());
        let frontier = DedupFrontier::new();
        let mut dispatcher = self.dispatcher(&stats);

        let mut work: Vec<(Url, u32)> = vec![(start.clone(), 0)];
        let start_time = std::time::Instant::now();

        while let Some((url, depth)) = work.pop() {
            if depth > max_depth || !frontier.try_visit(&url) {
                continue;
            }

            let body = match self.source.fetch(&url).await.into_page(&url) {
                Ok(body) => body,
                Err(reason) => {
                    tracing::warn!("Skipping {}: {}", url, reason);
                    stats.record_transport_failure();
                    continue;
                }
            };
            stats.record_page();

            if depth < max_depth {
                for link in extract_site_links(&body, &url, domain) {
                    if !frontier.is_visited(&link) {
                        work.push((link, depth + 1));
                    }
                }
            }

            if is_article_url(&url, domain) {
                Self::submit_if_unclaimed(&frontier, &mut dispatcher, &url);
            }

            let visited = frontier.visited_count();
            if visited % 50 == 0 {
                tracing::info!(
                    "Progress: {} pages visited, {} queued, {} articles submitted",
                    visited,
                    work.len(),
                    frontier.claimed_count()
                );
            }
        }

        tracing::info!(
            "Link discovery finished in {:?}: {} pages visited, draining {} article fetches",
            start_time.elapsed(),
            frontier.visited_count(),
            dispatcher.pending()
        );

        let sink = ResultSink::collect(dispatcher.drain()).await;
        let stats = stats.snapshot();
        stats.log_summary();
        CrawlReport { sink, stats }
    }

    /// Backtrack crawl over every day in `start..=end` and every configured category
    ///
    /// All index pages are walked and all fetches submitted before any
    /// result is drained. A category whose first page has no links is
    /// skipped without paginating further.
    pub async fn crawl_backtrack(&self, start: NaiveDate, end: NaiveDate) -> CrawlReport {
        let site = &self.config.site;
        let stats = Arc::new(CrawlStats::new());
        let frontier = DedupFrontier::new();
        let mut dispatcher = self.dispatcher(&stats);
        let paginator = IndexPaginator::new(
            Arc::clone(&self.source),
            site.domain.clone(),
            self.config.crawler.page_concurrency as usize,
            Arc::clone(&stats),
        )
        .with_max_pages(self.config.crawler.max_index_pages);

        if start > end {
            tracing::warn!("Empty date range {} .. {}, nothing to crawl", start, end);
        }

        let index_url = match Url::parse(&site.index_url) {
            Ok(url) => url,
            Err(e) => {
                tracing::error!("Invalid index URL {}: {}", site.index_url, e);
                return CrawlReport {
                    sink: ResultSink::new(),
                    stats: stats.snapshot(),
                };
            }
        };

        for date in start.iter_days().take_while(|d| *d <= end) {
            tracing::info!("Crawling archive for date: {}", date);

            for category in &site.categories {
                let label = SiteConfig::category_label(category).unwrap_or("custom");
                tracing::info!("  Category {} ({})", category, label);

                let base = IndexQuery::new(category.clone(), date).base_url(&index_url);
                let first = match paginator.fetch_index_page(&page_url(&base, 1)).await {
                    Ok(first) if !first.links.is_empty() => first,
                    Ok(_) => {
                        tracing::warn!("No articles found in category {} on {}", category, date);
                        continue;
                    }
                    Err(failure) => {
                        tracing::warn!(
                            "Index for category {} on {} unavailable: {}",
                            category,
                            date,
                            failure.reason
                        );
                        continue;
                    }
                };

                for page in paginator.walk_from(&base, first).await {
                    tracing::debug!("Page {} - {} links", page.source_url, page.links.len());
                    for link in &page.links {
                        Self::submit_if_unclaimed(&frontier, &mut dispatcher, link);
                    }
                }
            }
        }

        tracing::info!(
            "Index walk finished: draining {} article fetches",
            dispatcher.pending()
        );

        let sink = ResultSink::collect(dispatcher.drain()).await;
        let stats = stats.snapshot();
        stats.log_summary();
        CrawlReport { sink, stats }
    }
}
