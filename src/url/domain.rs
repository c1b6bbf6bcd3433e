use url::Url;

/// Extracts the lowercase host of a URL
///
/// # Examples
///
/// ```
/// use url::Url;
/// use bisnis_crawler::url::extract_domain;
///
/// let url = Url::parse("https://MARKET.Bisnis.com/read/1/2/3").unwrap();
/// assert_eq!(extract_domain(&url), Some("market.bisnis.com".to_string()));
/// ```
pub fn extract_domain(url: &Url) -> Option<String> {
    url.host_str().map(|h| h.to_lowercase())
}

/// Checks if a host matches a domain pattern
///
/// `"bisnis.com"` matches only that exact host. `"*.bisnis.com"` matches the
/// bare domain and any subdomain at any depth. Matching is done on whole
/// labels, so `evilbisnis.com` and `bisnis.com.evil.net` never match.
///
/// ```
/// use bisnis_crawler::url::matches_domain;
///
/// assert!(matches_domain("*.bisnis.com", "bisnis.com"));
/// assert!(matches_domain("*.bisnis.com", "ekonomi.bisnis.com"));
/// assert!(!matches_domain("*.bisnis.com", "notbisnis.com"));
/// assert!(!matches_domain("bisnis.com", "www.bisnis.com"));
/// ```
pub fn matches_domain(pattern: &str, host: &str) -> bool {
    let host = host.to_lowercase();
    match pattern.strip_prefix("*.") {
        Some(base) => host == base || host.ends_with(&format!(".{}", base)),
        None => host == pattern,
    }
}

/// Checks that a URL is HTTPS and its host matches the domain pattern
pub fn is_same_site(url: &Url, pattern: &str) -> bool {
    url.scheme() == "https"
        && extract_domain(url)
            .map(|host| matches_domain(pattern, &host))
            .unwrap_or(false)
}
