//! Scripted fetcher for pipeline tests.

use async_trait::async_trait;
use parking_lot::Mutex;

use crate::errors::BrowserError;
use crate::fetch::PageFetcher;
use crate::models::RawDocument;

/// A fetcher that returns canned documents and records its calls.
#[derive(Debug)]
pub struct MockFetcher {
    page: Mutex<Result<String, BrowserError>>,
    search_page: Mutex<Result<String, BrowserError>>,
    page_urls: Mutex<Vec<String>>,
    queries: Mutex<Vec<String>>,
    call_count: Mutex<usize>,
}

impl Default for MockFetcher {
    fn default() -> Self {
        Self::new()
    }
}

impl MockFetcher {
    /// Creates a fetcher returning empty documents.
    #[must_use]
    pub fn new() -> Self {
        Self {
            page: Mutex::new(Ok(String::new())),
            search_page: Mutex::new(Ok(String::new())),
            page_urls: Mutex::new(Vec::new()),
            queries: Mutex::new(Vec::new()),
            call_count: Mutex::new(0),
        }
    }

    /// Sets the markup returned for page fetches.
    #[must_use]
    pub fn with_page(self, html: impl Into<String>) -> Self {
        *self.page.lock() = Ok(html.into());
        self
    }

    /// Sets the markup returned for search fetches.
    #[must_use]
    pub fn with_search_page(self, html: impl Into<String>) -> Self {
        *self.search_page.lock() = Ok(html.into());
        self
    }

    /// Makes every fetch fail with `error`.
    #[must_use]
    pub fn with_error(self, error: BrowserError) -> Self {
        *self.page.lock() = Err(error.clone());
        *self.search_page.lock() = Err(error);
        self
    }

    /// Returns the number of fetches of either kind.
    #[must_use]
    pub fn call_count(&self) -> usize {
        *self.call_count.lock()
    }

    /// Returns the URLs passed to page fetches.
    #[must_use]
    pub fn page_urls(&self) -> Vec<String> {
        self.page_urls.lock().clone()
    }

    /// Returns the queries passed to search fetches.
    #[must_use]
    pub fn queries(&self) -> Vec<String> {
        self.queries.lock().clone()
    }

    /// Resets call tracking.
    pub fn reset(&self) {
        *self.call_count.lock() = 0;
        self.page_urls.lock().clear();
        self.queries.lock().clear();
    }
}

#[async_trait]
impl PageFetcher for MockFetcher {
    async fn fetch_page(&self, url: &str) -> Result<RawDocument, BrowserError> {
        *self.call_count.lock() += 1;
        self.page_urls.lock().push(url.to_string());
        let html = self.page.lock().clone()?;
        Ok(RawDocument::new(html, url))
    }

    async fn fetch_search_results(&self, query: &str) -> Result<RawDocument, BrowserError> {
        *self.call_count.lock() += 1;
        self.queries.lock().push(query.to_string());
        let html = self.search_page.lock().clone()?;
        Ok(RawDocument::new(html, "https://lite.duckduckgo.com/lite/"))
    }
}
