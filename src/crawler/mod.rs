//! Crawler module for article discovery and retrieval
//!
//! This module contains the core crawling logic, including:
//! - Page retrieval behind the `PageSource` seam
//! - Article and index page parsing
//! - Index pagination
//! - Run-scoped deduplication and the bounded fetch pool
//! - The recursive and backtrack coordinators, and the periodic scheduler

mod article;
mod coordinator;
mod dispatcher;
mod fetcher;
mod frontier;
mod paginator;
mod parser;
mod scheduler;

#[cfg(test)]
mod test_support;

pub use article::{ArticleFetcher, ArticleOutcome, ArticleRecord};
pub use coordinator::{Coordinator, CrawlReport};
pub use dispatcher::{FetchDispatcher, DEFAULT_WORKERS};
pub use fetcher::{build_http_client, fetch_url, FetchResult, HttpSource, PageSource};
pub use frontier::DedupFrontier;
pub use paginator::{
    page_url, IndexPaginator, IndexQuery, PageFailure, PageResult, DEFAULT_MAX_INDEX_PAGES,
};
pub use parser::{
    extract_site_links, parse_article, parse_index_page, IndexPage, ParsedArticle,
    PREMIUM_MARKER,
};
pub use scheduler::{RunState, Scheduler, TickOutcome};

use crate::output::timestamped_path;
use crate::CrawlError;
use chrono::{Local, NaiveDate};
use std::path::{Path, PathBuf};
use url::Url;

/// Runs one standard crawl and writes its batch to a timestamped file
///
/// # Returns
///
/// * `Ok(PathBuf)` - The file that was written
/// * `Err(CrawlError)` - The start URL was invalid or the batch could not be written
pub async fn run_standard_once(
    coordinator: &Coordinator,
    max_depth: u32,
) -> Result<PathBuf, CrawlError> {
    let config = coordinator.config();
    let start = Url::parse(&config.site.start_url)?;

    tracing::info!("Scraping recursively from {} (max depth {})", start, max_depth);
    let report = coordinator.crawl_recursive(&start, max_depth).await;

    let path = timestamped_path(Path::new(&config.output.directory), Local::now());
    report.sink.write_json(&path)?;
    tracing::info!("Saved {} articles to {}", report.sink.len(), path.display());
    Ok(path)
}

/// Runs one backtrack crawl over `start..=end` and writes its batch to `output`
pub async fn run_backtrack(
    coordinator: &Coordinator,
    start: NaiveDate,
    end: NaiveDate,
    output: &Path,
) -> Result<usize, CrawlError> {
    tracing::info!("Backtracking {} .. {}", start, end);
    let report = coordinator.crawl_backtrack(start, end).await;

    report.sink.write_json(output)?;
    tracing::info!("Saved {} articles to {}", report.sink.len(), output.display());
    Ok(report.sink.len())
}
