//! Integration tests for the crawler
//!
//! These tests use wiremock to serve the site over real HTTP. Article and
//! index URLs keep their production `https://*.bisnis.com` form; a
//! rewriting page source redirects every request to the mock server.

use async_trait::async_trait;
use bisnis_crawler::config::Config;
use bisnis_crawler::crawler::{
    page_url, run_backtrack, ArticleFetcher, ArticleOutcome, Coordinator, FetchResult,
    HttpSource, IndexPaginator, IndexQuery, PageSource, PREMIUM_MARKER,
};
use bisnis_crawler::output::CrawlStats;
use bisnis_crawler::ArticleRecord;
use chrono::NaiveDate;
use std::sync::Arc;
use url::Url;
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

/// Sends every request to the mock server, keeping path and query
struct MockSite {
    inner: HttpSource,
    base: Url,
}

impl MockSite {
    fn new(server: &MockServer) -> Self {
        let config = Config::default();
        Self {
            inner: HttpSource::from_config(&config.crawler, &config.user_agent)
                .expect("Failed to build HTTP client"),
            base: Url::parse(&server.uri()).expect("Failed to parse mock URI"),
        }
    }
}

#[async_trait]
impl PageSource for MockSite {
    async fn fetch(&self, url: &Url) -> FetchResult {
        let mut target = self.base.clone();
        target.set_path(url.path());
        target.set_query(url.query());
        self.inner.fetch(&target).await
    }
}

fn html(body: String) -> ResponseTemplate {
    ResponseTemplate::new(200)
        .set_body_string(body)
        .insert_header("content-type", "text/html; charset=utf-8")
}

fn article_path(id: u32) -> String {
    format!("/read/20250102/43/{}/judul-{}", id, id)
}

fn article_url(id: u32) -> String {
    format!("https://ekonomi.bisnis.com{}", article_path(id))
}

fn article_body(id: u32) -> String {
    format!(
        r#"<html><head><title>Artikel {id}</title>
        <meta name="publishdate" content="2025/01/02 10:00:0{id}"></head>
        <body><article class="detailsContent"><p>Paragraf {id}.</p><p>Penutup.</p></article></body></html>"#
    )
}

fn date() -> NaiveDate {
    NaiveDate::from_ymd_opt(2025, 1, 2).unwrap()
}

async fn mount_article(server: &MockServer, id: u32) {
    Mock::given(method("GET"))
        .and(path(article_path(id)))
        .respond_with(html(article_body(id)))
        .mount(server)
        .await;
}

#[tokio::test]
async fn test_http_source_error_status_still_parsed() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/ok"))
        .respond_with(html("<html><title>OK</title></html>".to_string()))
        .mount(&mock_server)
        .await;
    Mock::given(method("GET"))
        .and(path(article_path(9)))
        .respond_with(
            ResponseTemplate::new(404)
                .set_body_string("<html><head><title>Tidak Ditemukan</title></head></html>"),
        )
        .mount(&mock_server)
        .await;

    let source = MockSite::new(&mock_server);

    let ok = source
        .fetch(&Url::parse("https://www.bisnis.com/ok").unwrap())
        .await;
    match ok {
        FetchResult::Success {
            status_code, body, ..
        } => {
            assert_eq!(status_code, 200);
            assert!(body.contains("OK"));
        }
        other => panic!("expected success, got {:?}", other),
    }

    let gone_url = Url::parse(&article_url(9)).unwrap();
    match source.fetch(&gone_url).await {
        FetchResult::Success { status_code, .. } => assert_eq!(status_code, 404),
        other => panic!("expected a readable 404, got {:?}", other),
    }

    let fetcher = ArticleFetcher::new(Arc::new(source));
    let record = fetcher
        .fetch(&gone_url)
        .await
        .into_record()
        .expect("fallback record for 404 page");
    assert_eq!(record.title, "Tidak Ditemukan");
    assert_eq!(record.content, PREMIUM_MARKER);
}

#[tokio::test]
async fn test_article_fetch_over_http() {
    let mock_server = MockServer::start().await;
    mount_article(&mock_server, 1).await;

    Mock::given(method("GET"))
        .and(path(article_path(2)))
        .respond_with(html(
            "<html><head><title>Premium</title></head><body><div class=\"locked\"></div></body></html>"
                .to_string(),
        ))
        .mount(&mock_server)
        .await;

    let fetcher = ArticleFetcher::new(Arc::new(MockSite::new(&mock_server)));

    match fetcher.fetch(&Url::parse(&article_url(1)).unwrap()).await {
        ArticleOutcome::Complete(record) => {
            assert_eq!(record.url, article_url(1));
            assert_eq!(record.title, "Artikel 1");
            assert_eq!(record.date, "2025-01-02T10:00:01");
            assert_eq!(record.content, "Paragraf 1.\nPenutup.");
        }
        other => panic!("expected complete article, got {:?}", other),
    }

    let restricted = fetcher.fetch(&Url::parse(&article_url(2)).unwrap()).await;
    let record = restricted.into_record().expect("fallback record");
    assert_eq!(record.content, PREMIUM_MARKER);
    assert_eq!(record.date, PREMIUM_MARKER);

    // unmounted path: wiremock answers 404 with an empty body
    let missing = fetcher.fetch(&Url::parse(&article_url(3)).unwrap()).await;
    assert!(matches!(missing, ArticleOutcome::Restricted(_)));
}

#[tokio::test]
async fn test_walk_index_over_http_fetches_each_page_once() {
    let mock_server = MockServer::start().await;

    for page in 1..=3u32 {
        Mock::given(method("GET"))
            .and(path("/index"))
            .and(query_param("categoryId", "43"))
            .and(query_param("date", "2025-01-02"))
            .and(query_param("page", page.to_string()))
            .respond_with(html(format!(
                r#"<input id="total_page" value="3"><a class="artLink" href="{}">x</a>"#,
                article_url(page)
            )))
            .expect(1)
            .mount(&mock_server)
            .await;
    }

    let paginator = IndexPaginator::new(
        Arc::new(MockSite::new(&mock_server)),
        "*.bisnis.com",
        2,
        Arc::new(CrawlStats::new()),
    );
    let index = Url::parse("https://www.bisnis.com/index").unwrap();
    let base = IndexQuery::new("43", date()).base_url(&index);

    let pages = paginator.walk_index(&base).await;
    assert_eq!(pages.len(), 3);
    assert_eq!(pages[2].source_url, page_url(&base, 3));
    assert_eq!(pages[2].links[0].as_str(), article_url(3));

    let requests = mock_server.received_requests().await.unwrap();
    assert_eq!(requests.len(), 3);
}

#[tokio::test]
async fn test_backtrack_end_to_end_writes_deduplicated_batch() {
    let mock_server = MockServer::start().await;

    let duplicate = "https://www.bisnis.com/read/20250102/1/1/judul-lain";
    Mock::given(method("GET"))
        .and(path("/index"))
        .and(query_param("categoryId", "43"))
        .and(query_param("page", "1"))
        .respond_with(html(format!(
            r#"<html><body>
               <a class="artLink" href="{}">1</a>
               <a class="artLink" href="{}">2</a>
               <a class="artLink" href="{}">1 (lagi)</a>
            </body></html>"#,
            article_url(1),
            article_url(2),
            duplicate
        )))
        .mount(&mock_server)
        .await;
    mount_article(&mock_server, 1).await;
    mount_article(&mock_server, 2).await;
    Mock::given(method("GET"))
        .and(path("/read/20250102/1/1/judul-lain"))
        .respond_with(html(article_body(1)))
        .expect(0)
        .mount(&mock_server)
        .await;

    let mut config = Config::default();
    config.site.categories = vec!["43".to_string()];
    let coordinator = Coordinator::with_source(config, Arc::new(MockSite::new(&mock_server)));

    let dir = tempfile::TempDir::new().unwrap();
    let output = dir.path().join("output/backtrack_output.json");

    let saved = run_backtrack(&coordinator, date(), date(), &output)
        .await
        .expect("Backtrack failed");
    assert_eq!(saved, 2);

    let text = std::fs::read_to_string(&output).expect("Output not written");
    let mut records: Vec<ArticleRecord> = serde_json::from_str(&text).unwrap();
    records.sort_by(|a, b| a.url.cmp(&b.url));

    assert_eq!(records.len(), 2);
    assert_eq!(records[0].url, article_url(1));
    assert_eq!(records[1].title, "Artikel 2");
}

#[tokio::test]
async fn test_recursive_depth_zero_over_http() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/"))
        .respond_with(html(format!(
            r#"<html><body><a href="{}">1</a><a href="/kanal/ekonomi">Ekonomi</a></body></html>"#,
            article_url(1)
        )))
        .expect(1)
        .mount(&mock_server)
        .await;
    mount_article(&mock_server, 1).await;

    let coordinator =
        Coordinator::with_source(Config::default(), Arc::new(MockSite::new(&mock_server)));
    let report = coordinator
        .crawl_recursive(&Url::parse("https://www.bisnis.com/").unwrap(), 0)
        .await;

    assert!(report.sink.is_empty());
    let requests = mock_server.received_requests().await.unwrap();
    assert_eq!(requests.len(), 1);
}

#[tokio::test]
async fn test_recursive_depth_one_collects_linked_articles() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/"))
        .respond_with(html(format!(
            r#"<html><body><a href="{}">1</a><a href="{}">2</a><a href="{}">1 again</a></body></html>"#,
            article_url(1),
            article_url(2),
            article_url(1)
        )))
        .mount(&mock_server)
        .await;
    mount_article(&mock_server, 1).await;
    mount_article(&mock_server, 2).await;

    let coordinator =
        Coordinator::with_source(Config::default(), Arc::new(MockSite::new(&mock_server)));
    let report = coordinator
        .crawl_recursive(&Url::parse("https://www.bisnis.com/").unwrap(), 1)
        .await;

    assert_eq!(report.sink.len(), 2);
    assert_eq!(report.stats.articles_submitted, 2);
    assert!(report
        .sink
        .records()
        .iter()
        .all(|r| r.content.ends_with("Penutup.")));
}
