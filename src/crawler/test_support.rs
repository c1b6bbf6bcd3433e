//! In-memory page source for crawler tests

use crate::crawler::fetcher::{FetchResult, PageSource};
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;
use std::time::Duration;
use url::Url;

/// Serves canned pages and records every request
#[derive(Default)]
pub struct StubSource {
    pages: HashMap<String, (u16, String)>,
    requests: Mutex<Vec<String>>,
    delay: Option<Duration>,
    in_flight: AtomicUsize,
    max_in_flight: AtomicUsize,
}

impl StubSource {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a page; the key is normalized the same way `Url` prints it
    pub fn with_page(self, url: &str, body: &str) -> Self {
        self.with_status_page(url, 200, body)
    }

    /// Registers a page answered with `status`
    pub fn with_status_page(mut self, url: &str, status: u16, body: &str) -> Self {
        let key = Url::parse(url).unwrap().to_string();
        self.pages.insert(key, (status, body.to_string()));
        self
    }

    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    /// All requested URLs, in request order
    pub fn requests(&self) -> Vec<String> {
        self.requests.lock().unwrap().clone()
    }

    pub fn request_count(&self, url: &str) -> usize {
        let key = Url::parse(url).unwrap().to_string();
        self.requests().iter().filter(|r| **r == key).count()
    }

    pub fn max_in_flight(&self) -> usize {
        self.max_in_flight.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl PageSource for StubSource {
    async fn fetch(&self, url: &Url) -> FetchResult {
        self.requests.lock().unwrap().push(url.to_string());

        let now = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        self.max_in_flight.fetch_max(now, Ordering::SeqCst);
        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }
        self.in_flight.fetch_sub(1, Ordering::SeqCst);

        match self.pages.get(url.as_str()) {
            Some((status, body)) => FetchResult::Success {
                final_url: url.to_string(),
                status_code: *status,
                body: body.clone(),
            },
            None => FetchResult::NetworkError {
                error: "Connection failed".to_string(),
            },
        }
    }
}
