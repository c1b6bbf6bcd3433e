//! HTML parsing for article pages, index pages, and link discovery
//!
//! All functions here are pure transforms over markup: they never fail, they
//! only degrade missing fields.

use crate::url::{is_article_url, is_same_site};
use chrono::NaiveDateTime;
use once_cell::sync::Lazy;
use scraper::{ElementRef, Html, Selector};
use std::collections::HashSet;
use url::Url;

/// Literal used for content (and date) when an article is paywalled or otherwise restricted
pub const PREMIUM_MARKER: &str = "premium content";

/// Format of the `publishdate` meta tag
const PUBLISH_DATE_FORMAT: &str = "%Y/%m/%d %H:%M:%S";

static TITLE: Lazy<Selector> = Lazy::new(|| selector("title"));
static PUBLISH_DATE: Lazy<Selector> = Lazy::new(|| selector(r#"meta[name="publishdate"]"#));
static ARTICLE_BODY: Lazy<Selector> = Lazy::new(|| selector("article.detailsContent"));
static PARAGRAPH: Lazy<Selector> = Lazy::new(|| selector("p"));
static ANCHOR: Lazy<Selector> = Lazy::new(|| selector("a[href]"));
static INDEX_LINK: Lazy<Selector> = Lazy::new(|| selector("a.artLink[href]"));
static TOTAL_PAGE: Lazy<Selector> = Lazy::new(|| selector("input#total_page"));

/// Paragraph classes that are boilerplate, not article text
const SKIPPED_PARAGRAPH_CLASSES: &[&str] = &["disclaimer", "baca-juga-title"];

/// Container of "read also" link boxes embedded in the body
const RELATED_BOX_CLASS: &str = "baca-juga-box";

fn selector(css: &str) -> Selector {
    Selector::parse(css).expect("static selector is valid")
}

/// Fields extracted from an article page
#[derive(Debug, Clone, PartialEq)]
pub struct ParsedArticle {
    /// Trimmed `<title>` text, empty when absent
    pub title: String,

    /// ISO-8601 publish date, the raw meta value if unparsable, or [`PREMIUM_MARKER`]
    pub date: String,

    /// Body paragraphs, or `None` when the article container is absent
    pub paragraphs: Option<Vec<String>>,
}

/// Extracted information from an index page
#[derive(Debug, Clone, PartialEq)]
pub struct IndexPage {
    /// Article links in document order
    pub links: Vec<Url>,

    /// Total page count announced by the page, at least 1
    pub total_pages: u32,
}

/// Parses an article page
///
/// # Example
///
/// ```
/// use bisnis_crawler::crawler::parse_article;
///
/// let html = r#"<html><head><title>Judul</title>
///     <meta name="publishdate" content="2025/01/02 08:30:00"></head>
///     <body><article class="detailsContent"><p>Satu</p><p>Dua</p></article></body></html>"#;
/// let parsed = parse_article(html);
/// assert_eq!(parsed.title, "Judul");
/// assert_eq!(parsed.date, "2025-01-02T08:30:00");
/// assert_eq!(parsed.paragraphs.unwrap(), vec!["Satu", "Dua"]);
/// ```
pub fn parse_article(html: &str) -> ParsedArticle {
    let document = Html::parse_document(html);

    let title = document
        .select(&TITLE)
        .next()
        .map(|el| el.text().map(str::trim).collect::<String>())
        .unwrap_or_default();

    let date = document
        .select(&PUBLISH_DATE)
        .next()
        .and_then(|el| el.value().attr("content"))
        .map(normalize_publish_date)
        .unwrap_or_else(|| PREMIUM_MARKER.to_string());

    let paragraphs = document
        .select(&ARTICLE_BODY)
        .next()
        .map(|body| extract_paragraphs(&body));

    ParsedArticle {
        title,
        date,
        paragraphs,
    }
}

/// Converts a `publishdate` value to ISO-8601, passing it through verbatim if it does not parse
fn normalize_publish_date(raw: &str) -> String {
    NaiveDateTime::parse_from_str(raw.trim(), PUBLISH_DATE_FORMAT)
        .map(|dt| dt.format("%Y-%m-%dT%H:%M:%S").to_string())
        .unwrap_or_else(|_| raw.to_string())
}

fn extract_paragraphs(body: &ElementRef<'_>) -> Vec<String> {
    body.select(&PARAGRAPH)
        .filter(|p| {
            !p.value()
                .classes()
                .any(|class| SKIPPED_PARAGRAPH_CLASSES.contains(&class))
        })
        .filter(|p| !inside_related_box(p))
        .map(|p| p.text().collect::<String>())
        .filter(|text| !text.is_empty())
        .collect()
}

fn inside_related_box(element: &ElementRef<'_>) -> bool {
    element.ancestors().filter_map(ElementRef::wrap).any(|ancestor| {
        ancestor.value().name() == "div"
            && ancestor
                .value()
                .classes()
                .any(|class| class == RELATED_BOX_CLASS)
    })
}

/// Extracts every distinct same-site link from a page
///
/// Links are resolved against `base_url`, stripped of fragments, and kept
/// only if they are HTTPS on a host matching `domain_pattern`. The first
/// occurrence of each link determines its position.
pub fn extract_site_links(html: &str, base_url: &Url, domain_pattern: &str) -> Vec<Url> {
    let document = Html::parse_document(html);
    let mut seen = HashSet::new();

    document
        .select(&ANCHOR)
        .filter_map(|el| el.value().attr("href"))
        .filter_map(|href| resolve_link(href, base_url))
        .filter(|url| is_same_site(url, domain_pattern))
        .filter(|url| seen.insert(url.as_str().to_string()))
        .collect()
}

/// Parses an index page: article links marked `a.artLink` and the `total_page` field
///
/// A missing or non-numeric page count is read as 1.
pub fn parse_index_page(html: &str, base_url: &Url, domain_pattern: &str) -> IndexPage {
    let document = Html::parse_document(html);

    let links = document
        .select(&INDEX_LINK)
        .filter_map(|el| el.value().attr("href"))
        .filter_map(|href| resolve_link(href, base_url))
        .filter(|url| is_article_url(url, domain_pattern))
        .collect();

    let total_pages = document
        .select(&TOTAL_PAGE)
        .next()
        .and_then(|el| el.value().attr("value"))
        .and_then(|value| value.trim().parse::<u32>().ok())
        .filter(|&n| n >= 1)
        .unwrap_or(1);

    IndexPage { links, total_pages }
}

/// Resolves a link href to an absolute URL
///
/// Returns None for empty hrefs, fragment-only anchors, and
/// `javascript:`/`mailto:`/`tel:`/`data:` links.
fn resolve_link(href: &str, base_url: &Url) -> Option<Url> {
    let href = href.trim();

    if href.is_empty() || href.starts_with('#') {
        return None;
    }

    if href.starts_with("javascript:")
        || href.starts_with("mailto:")
        || href.starts_with("tel:")
        || href.starts_with("data:")
    {
        return None;
    }

    let mut url = base_url.join(href).ok()?;
    url.set_fragment(None);
    Some(url)
}
