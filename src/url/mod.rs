//! Identity resolution for site URLs
//!
//! This module decides whether a URL belongs to the site, whether it is an
//! article, and which article it is.

mod domain;
mod identity;

pub use domain::{extract_domain, is_same_site, matches_domain};
pub use identity::{article_identity, is_article_url, ArticleId};
