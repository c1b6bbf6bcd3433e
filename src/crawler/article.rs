//! Article retrieval and record construction

use crate::crawler::fetcher::PageSource;
use crate::crawler::parser::{parse_article, PREMIUM_MARKER};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use url::Url;

/// One harvested article, as written to the output batch
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ArticleRecord {
    pub url: String,
    pub title: String,
    pub date: String,
    pub content: String,
}

impl ArticleRecord {
    /// Returns true if the body could not be read and the fallback marker stands in for it
    pub fn is_restricted(&self) -> bool {
        self.content == PREMIUM_MARKER
    }
}

/// What became of one article fetch
#[derive(Debug, Clone)]
pub enum ArticleOutcome {
    /// Full record with body text
    Complete(ArticleRecord),

    /// The page loaded but had no article container (paywall, restricted page)
    Restricted(ArticleRecord),

    /// The page could not be retrieved
    Failed { url: String, reason: String },
}

impl ArticleOutcome {
    /// The record to keep, if any
    pub fn into_record(self) -> Option<ArticleRecord> {
        match self {
            ArticleOutcome::Complete(record) | ArticleOutcome::Restricted(record) => Some(record),
            ArticleOutcome::Failed { .. } => None,
        }
    }
}

/// Retrieves articles and turns them into records
#[derive(Clone)]
pub struct ArticleFetcher {
    source: Arc<dyn PageSource>,
}

impl ArticleFetcher {
    pub fn new(source: Arc<dyn PageSource>) -> Self {
        Self { source }
    }

    /// Fetches one article with a single attempt
    pub async fn fetch(&self, url: &Url) -> ArticleOutcome {
        let body = match self.source.fetch(url).await.into_page(url) {
            Ok(body) => body,
            Err(reason) => {
                tracing::debug!("Article fetch failed for {}: {}", url, reason);
                return ArticleOutcome::Failed {
                    url: url.to_string(),
                    reason,
                };
            }
        };

        let parsed = parse_article(&body);
        match parsed.paragraphs {
            Some(paragraphs) => ArticleOutcome::Complete(ArticleRecord {
                url: url.to_string(),
                title: parsed.title,
                date: parsed.date,
                content: paragraphs.join("\n"),
            }),
            None => {
                tracing::debug!("No article container at {}, using fallback record", url);
                ArticleOutcome::Restricted(ArticleRecord {
                    url: url.to_string(),
                    title: parsed.title,
                    date: parsed.date,
                    content: PREMIUM_MARKER.to_string(),
                })
            }
        }
    }
}
