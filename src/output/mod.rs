//! Output module for crawl batches
//!
//! This module handles:
//! - Collecting completed article records in completion order
//! - Writing a batch as one pretty-printed JSON array
//! - Recording run statistics

mod sink;
pub mod stats;

pub use sink::{timestamped_path, ResultSink};
pub use stats::{CrawlStats, StatsSnapshot};

use thiserror::Error;

/// Errors that can occur while writing a batch
#[derive(Debug, Error)]
pub enum OutputError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to serialize batch: {0}")]
    Json(#[from] serde_json::Error),
}

/// Result type for output operations
pub type OutputResult<T> = Result<T, OutputError>;
