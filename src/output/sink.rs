use crate::crawler::ArticleRecord;
use crate::output::OutputResult;
use chrono::{DateTime, TimeZone};
use futures::stream::{Stream, StreamExt};
use std::fs::{self, File};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

/// Completed article records of one run, in completion order
#[derive(Debug, Clone, Default)]
pub struct ResultSink {
    records: Vec<ArticleRecord>,
}

impl ResultSink {
    pub fn new() -> Self {
        Self::default()
    }

    /// Collects every record a drain stream yields
    pub async fn collect<S>(stream: S) -> Self
    where
        S: Stream<Item = ArticleRecord>,
    {
        Self {
            records: stream.collect().await,
        }
    }

    pub fn records(&self) -> &[ArticleRecord] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Writes the batch as a pretty-printed UTF-8 JSON array, creating parent directories
    pub fn write_json(&self, path: &Path) -> OutputResult<()> {
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)?;
        }

        let mut writer = BufWriter::new(File::create(path)?);
        serde_json::to_writer_pretty(&mut writer, &self.records)?;
        writer.write_all(b"\n")?;
        writer.flush()?;
        Ok(())
    }
}

/// Path of a standard-mode batch: `<dir>/latest_<YYYYmmddHHMMSS>.json`
pub fn timestamped_path<Tz>(dir: &Path, at: DateTime<Tz>) -> PathBuf
where
    Tz: TimeZone,
    Tz::Offset: std::fmt::Display,
{
    dir.join(format!("latest_{}.json", at.format("%Y%m%d%H%M%S")))
}
