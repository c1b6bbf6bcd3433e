use serde::Deserialize;

/// Index categories walked in backtrack mode, as `(categoryId, label)` pairs
///
/// The `all` entry is kept although the site does not paginate it.
pub const DEFAULT_CATEGORIES: &[(&str, &str)] = &[
    ("all", "Semua"),
    ("1", "Rekomendasi"),
    ("655", "Premium"),
    ("194", "Market"),
    ("5", "Finansial"),
    ("43", "Ekonomi"),
    ("277", "Tekno"),
    ("197", "Style"),
    ("186", "Kabar24"),
    ("392", "Bola"),
    ("547", "Infografik"),
    ("272", "Otomotif"),
    ("258", "Entrepreneur"),
    ("222", "Travel"),
    ("382", "Jakarta"),
    ("548", "Bandung"),
    ("420", "Banten"),
    ("528", "Semarang"),
    ("526", "Surabaya"),
    ("529", "Bali"),
    ("527", "Sumatra"),
    ("406", "Kalimantan"),
    ("530", "Sulawesi"),
    ("413", "Papua"),
    ("242", "Koran"),
    ("638", "Viral"),
    ("390", "Ramalan"),
];

/// Main configuration structure
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    pub crawler: CrawlerConfig,
    #[serde(rename = "user-agent")]
    pub user_agent: UserAgentConfig,
    pub site: SiteConfig,
    pub schedule: ScheduleConfig,
    pub output: OutputConfig,
}

/// Crawler behavior configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct CrawlerConfig {
    /// Maximum link depth followed from the start URL in standard mode
    #[serde(rename = "max-depth")]
    pub max_depth: u32,

    /// Number of article fetches allowed in flight at once
    #[serde(rename = "max-workers")]
    pub max_workers: u32,

    /// Timeout for a single page retrieval (seconds)
    #[serde(rename = "request-timeout")]
    pub request_timeout: u64,

    /// Number of index pages 2..N fetched concurrently for one query
    #[serde(rename = "page-concurrency")]
    pub page_concurrency: u32,

    /// Ceiling on the page count an index page may announce
    #[serde(rename = "max-index-pages")]
    pub max_index_pages: u32,
}

impl Default for CrawlerConfig {
    fn default() -> Self {
        Self {
            max_depth: 2,
            max_workers: 10,
            request_timeout: 10,
            page_concurrency: 4,
            max_index_pages: 500,
        }
    }
}

/// User agent identification configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct UserAgentConfig {
    /// Name of the crawler
    #[serde(rename = "crawler-name")]
    pub crawler_name: String,

    /// Version of the crawler
    #[serde(rename = "crawler-version")]
    pub crawler_version: String,

    /// URL with information about the crawler
    #[serde(rename = "contact-url")]
    pub contact_url: String,
}

impl Default for UserAgentConfig {
    fn default() -> Self {
        Self {
            crawler_name: "BisnisCrawler".to_string(),
            crawler_version: env!("CARGO_PKG_VERSION").to_string(),
            contact_url: "https://www.bisnis.com".to_string(),
        }
    }
}

impl UserAgentConfig {
    /// Formats the User-Agent header value: `Name/Version (+ContactURL)`
    pub fn header_value(&self) -> String {
        format!(
            "{}/{} (+{})",
            self.crawler_name, self.crawler_version, self.contact_url
        )
    }
}

/// The site being harvested
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct SiteConfig {
    /// Domain pattern that article and page hosts must match (e.g. "*.bisnis.com")
    pub domain: String,

    /// Homepage used as the seed of a standard crawl
    #[serde(rename = "start-url")]
    pub start_url: String,

    /// Base URL of the date/category index
    #[serde(rename = "index-url")]
    pub index_url: String,

    /// Category identifiers walked per day in backtrack mode
    pub categories: Vec<String>,
}

impl Default for SiteConfig {
    fn default() -> Self {
        Self {
            domain: "*.bisnis.com".to_string(),
            start_url: "https://www.bisnis.com".to_string(),
            index_url: "https://www.bisnis.com/index".to_string(),
            categories: DEFAULT_CATEGORIES
                .iter()
                .map(|(id, _)| id.to_string())
                .collect(),
        }
    }
}

impl SiteConfig {
    /// Returns the human-readable label for a category id, if it is a known one
    pub fn category_label(id: &str) -> Option<&'static str> {
        DEFAULT_CATEGORIES
            .iter()
            .find(|(known, _)| *known == id)
            .map(|(_, label)| *label)
    }
}

/// Standard-mode scheduling
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ScheduleConfig {
    /// Minutes between the starts of successive standard crawls
    #[serde(rename = "interval-minutes")]
    pub interval_minutes: u64,
}

impl Default for ScheduleConfig {
    fn default() -> Self {
        Self {
            interval_minutes: 1,
        }
    }
}

/// Output configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct OutputConfig {
    /// Directory receiving timestamped standard-mode batches
    pub directory: String,

    /// Default file written by a backtrack run
    #[serde(rename = "backtrack-path")]
    pub backtrack_path: String,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            directory: "output".to_string(),
            backtrack_path: "output/backtrack_output.json".to_string(),
        }
    }
}
