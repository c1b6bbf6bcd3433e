//! Paginated index traversal
//!
//! An index query (one category on one date) is a sequence of pages. Page 1
//! is always fetched first because it alone announces the total page count;
//! pages 2..N are then fetched with bounded concurrency and returned in page
//! order.

use crate::crawler::fetcher::PageSource;
use crate::crawler::parser::parse_index_page;
use crate::output::CrawlStats;
use chrono::NaiveDate;
use futures::stream::{self, StreamExt};
use std::sync::Arc;
use url::Url;

/// Default ceiling on the page count announced by an index page
pub const DEFAULT_MAX_INDEX_PAGES: u32 = 500;

/// One category on one date of the site index
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IndexQuery {
    pub category: String,
    pub date: NaiveDate,
}

impl IndexQuery {
    pub fn new(category: impl Into<String>, date: NaiveDate) -> Self {
        Self {
            category: category.into(),
            date,
        }
    }

    /// Base URL of the query, without a page number
    ///
    /// ```
    /// use bisnis_crawler::crawler::IndexQuery;
    /// use chrono::NaiveDate;
    /// use url::Url;
    ///
    /// let index = Url::parse("https://www.bisnis.com/index").unwrap();
    /// let query = IndexQuery::new("43", NaiveDate::from_ymd_opt(2025, 1, 2).unwrap());
    /// assert_eq!(
    ///     query.base_url(&index).as_str(),
    ///     "https://www.bisnis.com/index?categoryId=43&type=indeks&date=2025-01-02"
    /// );
    /// ```
    pub fn base_url(&self, index_url: &Url) -> Url {
        let mut url = index_url.clone();
        url.query_pairs_mut()
            .clear()
            .append_pair("categoryId", &self.category)
            .append_pair("type", "indeks")
            .append_pair("date", &self.date.format("%Y-%m-%d").to_string());
        url
    }
}

/// Returns `base` with its `page` parameter set to `page`
pub fn page_url(base: &Url, page: u32) -> Url {
    let retained: Vec<(String, String)> = base
        .query_pairs()
        .filter(|(key, _)| key != "page")
        .map(|(key, value)| (key.into_owned(), value.into_owned()))
        .collect();

    let mut url = base.clone();
    url.query_pairs_mut()
        .clear()
        .extend_pairs(retained)
        .append_pair("page", &page.to_string());
    url
}

/// Links found on one index page
#[derive(Debug, Clone, PartialEq)]
pub struct PageResult {
    pub source_url: Url,
    pub links: Vec<Url>,
    /// Authoritative only on page 1 of a query
    pub total_pages: u32,
}

/// Why an index page produced no result
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageFailure {
    pub url: Url,
    pub reason: String,
}

pub struct IndexPaginator {
    source: Arc<dyn PageSource>,
    domain_pattern: String,
    page_concurrency: usize,
    max_pages: u32,
    stats: Arc<CrawlStats>,
}

impl IndexPaginator {
    pub fn new(
        source: Arc<dyn PageSource>,
        domain_pattern: impl Into<String>,
        page_concurrency: usize,
        stats: Arc<CrawlStats>,
    ) -> Self {
        Self {
            source,
            domain_pattern: domain_pattern.into(),
            page_concurrency: page_concurrency.max(1),
            max_pages: DEFAULT_MAX_INDEX_PAGES,
            stats,
        }
    }

    /// Caps how many pages one query may walk, whatever page 1 announces
    pub fn with_max_pages(mut self, max_pages: u32) -> Self {
        self.max_pages = max_pages.max(1);
        self
    }

    /// Fetches and parses a single index page
    pub async fn fetch_index_page(&self, url: &Url) -> Result<PageResult, PageFailure> {
        let body = match self.source.fetch(url).await.into_page(url) {
            Ok(body) => body,
            Err(reason) => {
                self.stats.record_transport_failure();
                return Err(PageFailure {
                    url: url.clone(),
                    reason,
                });
            }
        };
        let page = parse_index_page(&body, url, &self.domain_pattern);
        self.stats.record_page();
        self.stats.record_index_page(page.links.len());

        Ok(PageResult {
            source_url: url.clone(),
            links: page.links,
            total_pages: page.total_pages,
        })
    }

    /// Walks every page of the query rooted at `base`
    ///
    /// If page 1 cannot be retrieved the result is empty.
    pub async fn walk_index(&self, base: &Url) -> Vec<PageResult> {
        let first_url = page_url(base, 1);
        match self.fetch_index_page(&first_url).await {
            Ok(first) => self.walk_from(base, first).await,
            Err(failure) => {
                tracing::warn!("Index page {} unavailable: {}", failure.url, failure.reason);
                Vec::new()
            }
        }
    }

    /// Continues a walk from an already fetched page 1
    ///
    /// Pages that fail to load are logged and left out; pages with no links
    /// are kept. Only the end of the page range stops the walk.
    pub async fn walk_from(&self, base: &Url, first: PageResult) -> Vec<PageResult> {
        let total_pages = if first.total_pages > self.max_pages {
            tracing::warn!(
                "{} announces {} pages, walking only the first {}",
                first.source_url,
                first.total_pages,
                self.max_pages
            );
            self.max_pages
        } else {
            first.total_pages
        };

        let mut pages = vec![first];

        let rest: Vec<Result<PageResult, PageFailure>> = stream::iter(2..=total_pages)
            .map(|page| {
                let url = page_url(base, page);
                async move { self.fetch_index_page(&url).await }
            })
            .buffered(self.page_concurrency)
            .collect()
            .await;

        for result in rest {
            match result {
                Ok(page) => {
                    if page.links.is_empty() {
                        tracing::debug!("No article links on {}", page.source_url);
                    }
                    pages.push(page);
                }
                Err(failure) => {
                    tracing::warn!("Index page {} unavailable: {}", failure.url, failure.reason);
                }
            }
        }

        pages
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::crawler::test_support::StubSource;

    const INDEX: &str = "https://www.bisnis.com/index";

    fn query() -> IndexQuery {
        IndexQuery::new("43", NaiveDate::from_ymd_opt(2025, 1, 2).unwrap())
    }

    fn base() -> Url {
        query().base_url(&Url::parse(INDEX).unwrap())
    }

    fn index_page(total: Option<&str>, ids: &[u32]) -> String {
        let mut html = String::from("<html><body>");
        if let Some(total) = total {
            html.push_str(&format!(r#"<input id="total_page" value="{}">"#, total));
        }
        for id in ids {
            html.push_str(&format!(
                r#"<a class="artLink" href="https://ekonomi.bisnis.com/read/20250102/43/{}/x">{}</a>"#,
                id, id
            ));
        }
        html.push_str("</body></html>");
        html
    }

    fn paginator(source: Arc<StubSource>) -> IndexPaginator {
        IndexPaginator::new(source, "*.bisnis.com", 2, Arc::new(CrawlStats::new()))
    }

    #[test]
    fn test_page_url_replaces_page_parameter() {
        let first = page_url(&base(), 1);
        let third = page_url(&first, 3);
        assert_eq!(
            third.as_str(),
            "https://www.bisnis.com/index?categoryId=43&type=indeks&date=2025-01-02&page=3"
        );
    }

    #[tokio::test]
    async fn test_absent_total_fetches_one_page() {
        let source = Arc::new(
            StubSource::new().with_page(page_url(&base(), 1).as_str(), &index_page(None, &[1, 2])),
        );

        let pages = paginator(source.clone()).walk_index(&base()).await;
        assert_eq!(pages.len(), 1);
        assert_eq!(pages[0].links.len(), 2);
        assert_eq!(source.requests().len(), 1);
    }

    #[tokio::test]
    async fn test_non_numeric_total_fetches_one_page() {
        let source = Arc::new(StubSource::new().with_page(
            page_url(&base(), 1).as_str(),
            &index_page(Some("n/a"), &[1]),
        ));

        let pages = paginator(source.clone()).walk_index(&base()).await;
        assert_eq!(pages.len(), 1);
        assert_eq!(source.requests().len(), 1);
    }

    #[tokio::test]
    async fn test_three_pages_fetched_in_scope() {
        let source = Arc::new(
            StubSource::new()
                .with_page(page_url(&base(), 1).as_str(), &index_page(Some("3"), &[1]))
                .with_page(page_url(&base(), 2).as_str(), &index_page(Some("3"), &[2]))
                .with_page(page_url(&base(), 3).as_str(), &index_page(Some("3"), &[3])),
        );

        let pages = paginator(source.clone()).walk_index(&base()).await;
        assert_eq!(pages.len(), 3);

        let mut requested = source.requests();
        assert_eq!(requested.len(), 3);
        requested.sort();
        for (n, url) in requested.iter().enumerate() {
            let url = Url::parse(url).unwrap();
            let pairs: Vec<(String, String)> = url
                .query_pairs()
                .map(|(k, v)| (k.into_owned(), v.into_owned()))
                .collect();
            assert!(pairs.contains(&("categoryId".to_string(), "43".to_string())));
            assert!(pairs.contains(&("date".to_string(), "2025-01-02".to_string())));
            assert!(pairs.contains(&("page".to_string(), (n + 1).to_string())));
        }

        let sources: Vec<String> = pages.iter().map(|p| p.source_url.to_string()).collect();
        assert!(sources[0].ends_with("page=1"));
        assert!(sources[2].ends_with("page=3"));
    }

    #[tokio::test]
    async fn test_empty_and_missing_pages_do_not_halt() {
        let source = Arc::new(
            StubSource::new()
                .with_page(page_url(&base(), 1).as_str(), &index_page(Some("4"), &[1]))
                .with_page(page_url(&base(), 2).as_str(), &index_page(Some("4"), &[]))
                .with_page(page_url(&base(), 4).as_str(), &index_page(Some("4"), &[4])),
        );
        let stats = Arc::new(CrawlStats::new());
        let paginator = IndexPaginator::new(source.clone(), "*.bisnis.com", 2, stats.clone());

        let pages = paginator.walk_index(&base()).await;
        assert_eq!(source.requests().len(), 4);
        assert_eq!(pages.len(), 3);
        assert!(pages[1].links.is_empty());
        assert_eq!(pages[2].links.len(), 1);

        let snapshot = stats.snapshot();
        assert_eq!(snapshot.empty_index_pages, 1);
        assert_eq!(snapshot.transport_failures, 1);
    }

    #[tokio::test]
    async fn test_huge_announced_total_is_capped() {
        let source = Arc::new(
            StubSource::new()
                .with_page(
                    page_url(&base(), 1).as_str(),
                    &index_page(Some("4294967295"), &[1]),
                )
                .with_page(page_url(&base(), 2).as_str(), &index_page(None, &[2])),
        );

        let pages = paginator(source.clone())
            .with_max_pages(3)
            .walk_index(&base())
            .await;

        assert_eq!(source.requests().len(), 3);
        assert_eq!(pages.len(), 2);
        assert_eq!(pages[0].total_pages, u32::MAX);
        assert!(source
            .requests()
            .iter()
            .all(|r| !r.ends_with("page=4")));
    }

    #[tokio::test]
    async fn test_not_found_index_page_yields_no_links() {
        let source = Arc::new(StubSource::new().with_status_page(
            page_url(&base(), 1).as_str(),
            404,
            "<html><body>Halaman tidak ditemukan</body></html>",
        ));
        let stats = Arc::new(CrawlStats::new());
        let paginator = IndexPaginator::new(source.clone(), "*.bisnis.com", 2, stats.clone());

        let pages = paginator.walk_index(&base()).await;
        assert_eq!(pages.len(), 1);
        assert!(pages[0].links.is_empty());
        assert_eq!(stats.snapshot().transport_failures, 0);
    }

    #[tokio::test]
    async fn test_unreachable_first_page_yields_nothing() {
        let source = Arc::new(StubSource::new());
        let pages = paginator(source.clone()).walk_index(&base()).await;
        assert!(pages.is_empty());
        assert_eq!(source.requests().len(), 1);
    }
}
