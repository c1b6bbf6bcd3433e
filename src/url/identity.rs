use crate::url::domain::is_same_site;
use once_cell::sync::Lazy;
use regex::Regex;
use std::fmt;
use url::Url;

/// Path shape of an article: `/read/<date>/<category>/<id>`
static ARTICLE_PATH: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"/read/\d+/\d+/(\d+)").expect("article path pattern is valid"));

/// Stable numeric key of an article, independent of the URL it was found under
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ArticleId(String);

impl ArticleId {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ArticleId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Extracts the article identity from a URL path
///
/// Returns the last numeric segment of `/read/<n>/<n>/<n>`, or `None` when
/// the path does not have that shape.
///
/// ```
/// use url::Url;
/// use bisnis_crawler::url::article_identity;
///
/// let url = Url::parse("https://ekonomi.bisnis.com/read/20240101/9/1728834/slug").unwrap();
/// assert_eq!(article_identity(&url).unwrap().as_str(), "1728834");
/// ```
pub fn article_identity(url: &Url) -> Option<ArticleId> {
    ARTICLE_PATH
        .captures(url.path())
        .and_then(|caps| caps.get(1))
        .map(|m| ArticleId(m.as_str().to_string()))
}

/// Returns true iff the URL is an article on the site
///
/// The scheme must be HTTPS, the parsed host must match `domain_pattern`,
/// and the path must carry the article identity pattern.
pub fn is_article_url(url: &Url, domain_pattern: &str) -> bool {
    is_same_site(url, domain_pattern) && article_identity(url).is_some()
}
