//! Canned sitemap source for unit tests

use super::control::StopHandle;
use super::fetcher::SitemapSource;
use crate::{ExtractError, ExtractResult};
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Mutex;

/// Serves fixed documents or errors by URL and records every request
#[derive(Default)]
pub struct MockSource {
    responses: HashMap<String, ExtractResult<String>>,
    calls: Mutex<Vec<String>>,
    stop_on: Mutex<Option<(String, StopHandle)>>,
}

impl MockSource {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_document(mut self, url: &str, body: String) -> Self {
        self.responses.insert(url.to_string(), Ok(body));
        self
    }

    pub fn with_error(mut self, url: &str, error: ExtractError) -> Self {
        self.responses.insert(url.to_string(), Err(error));
        self
    }

    /// Requests a stop on `handle` the first time `url` is fetched
    pub fn stop_at(&self, url: &str, handle: StopHandle) {
        *self.stop_on.lock().unwrap() = Some((url.to_string(), handle));
    }

    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }
}

#[async_trait]
impl SitemapSource for MockSource {
    async fn fetch_sitemap(&self, url: &str) -> ExtractResult<String> {
        self.calls.lock().unwrap().push(url.to_string());

        let mut stop_on = self.stop_on.lock().unwrap();
        if stop_on.as_ref().map_or(false, |(target, _)| target == url) {
            if let Some((_, handle)) = stop_on.take() {
                handle.request_stop();
            }
        }
        drop(stop_on);

        self.responses
            .get(url)
            .cloned()
            .unwrap_or_else(|| Err(ExtractError::Http { status: 404 }))
    }
}
