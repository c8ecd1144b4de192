//! Headless page fetching.
//!
//! [`PageFetcher`] is the seam between the pipeline and the engine. The
//! Chromium-backed implementation lives behind the `chrome` feature; tests
//! drive the pipeline with doubles from [`crate::testing`] or mockall.

mod profiles;

#[cfg(feature = "chrome")]
mod chrome;
#[cfg(feature = "chrome")]
mod session;

pub use profiles::{random_profile, BrowserProfile, BROWSER_PROFILES};

#[cfg(feature = "chrome")]
pub use chrome::{launch_args, resolve_executable, ChromeFetcher};
#[cfg(feature = "chrome")]
pub use session::Session;

use async_trait::async_trait;
use tracing::{debug, info, warn, Level};

use crate::errors::BrowserError;
use crate::models::{FetchMode, FetchRequest, RawDocument};

/// Loads rendered markup for pages and search queries.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait PageFetcher: Send + Sync {
    /// Loads `url` and returns the rendered DOM.
    async fn fetch_page(&self, url: &str) -> Result<RawDocument, BrowserError>;

    /// Submits `query` to the search front-end and returns the results page.
    async fn fetch_search_results(&self, query: &str) -> Result<RawDocument, BrowserError>;
}

/// Dispatches a [`FetchRequest`] to the matching fetcher call.
pub async fn fetch_request(
    fetcher: &dyn PageFetcher,
    request: &FetchRequest,
) -> Result<RawDocument, BrowserError> {
    match &request.mode {
        FetchMode::Page => fetcher.fetch_page(&request.target_url).await,
        FetchMode::Search { query } => fetcher.fetch_search_results(query).await,
    }
}

/// Receives fetch lifecycle callbacks.
pub trait FetchObserver: Send + Sync {
    /// Called when a fetch starts.
    fn on_fetch_start(&self, url: &str, request_id: &str);

    /// Called when a fetch completes.
    fn on_fetch_complete(&self, url: &str, request_id: &str, duration_ms: f64, html_len: usize);

    /// Called when a fetch fails.
    fn on_fetch_error(&self, url: &str, request_id: &str, error: &BrowserError);
}

/// No-op implementation of [`FetchObserver`].
#[derive(Debug, Clone, Copy, Default)]
pub struct NoOpFetchObserver;

impl FetchObserver for NoOpFetchObserver {
    fn on_fetch_start(&self, _url: &str, _request_id: &str) {}
    fn on_fetch_complete(&self, _url: &str, _request_id: &str, _duration_ms: f64, _html_len: usize) {}
    fn on_fetch_error(&self, _url: &str, _request_id: &str, _error: &BrowserError) {}
}

/// A fetch observer that logs through `tracing`.
///
/// Failures are always logged at `warn`; start and completion use the
/// configured level.
#[derive(Debug, Clone)]
pub struct LoggingFetchObserver {
    level: Level,
}

impl Default for LoggingFetchObserver {
    fn default() -> Self {
        Self { level: Level::INFO }
    }
}

impl LoggingFetchObserver {
    /// Creates a logging observer with the specified level.
    #[must_use]
    pub fn new(level: Level) -> Self {
        Self { level }
    }

    /// Creates a debug-level logging observer.
    #[must_use]
    pub fn debug() -> Self {
        Self::new(Level::DEBUG)
    }
}

impl FetchObserver for LoggingFetchObserver {
    fn on_fetch_start(&self, url: &str, request_id: &str) {
        match self.level {
            Level::DEBUG | Level::TRACE => debug!(url = %url, request_id = %request_id, "Fetch started"),
            _ => info!(url = %url, request_id = %request_id, "Fetch started"),
        }
    }

    fn on_fetch_complete(&self, url: &str, request_id: &str, duration_ms: f64, html_len: usize) {
        match self.level {
            Level::DEBUG | Level::TRACE => debug!(
                url = %url,
                request_id = %request_id,
                duration_ms,
                html_len,
                "Fetch completed"
            ),
            _ => info!(
                url = %url,
                request_id = %request_id,
                duration_ms,
                html_len,
                "Fetch completed"
            ),
        }
    }

    fn on_fetch_error(&self, url: &str, request_id: &str, error: &BrowserError) {
        warn!(url = %url, request_id = %request_id, error = %error, "Fetch failed");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::MockFetcher;

    #[test]
    fn test_observers_do_not_panic() {
        let err = BrowserError::fetch_failed("https://example.com", "reset");
        for observer in [
            Box::new(NoOpFetchObserver) as Box<dyn FetchObserver>,
            Box::new(LoggingFetchObserver::default()),
            Box::new(LoggingFetchObserver::debug()),
        ] {
            observer.on_fetch_start("https://example.com", "req-1");
            observer.on_fetch_complete("https://example.com", "req-1", 12.5, 2048);
            observer.on_fetch_error("https://example.com", "req-1", &err);
        }
    }

    #[tokio::test]
    async fn test_fetch_request_dispatch() {
        let fetcher = MockFetcher::new()
            .with_page("<p>page</p>")
            .with_search_page("<p>results</p>");

        let page = FetchRequest::page("example.com").unwrap();
        let doc = fetch_request(&fetcher, &page).await.unwrap();
        assert_eq!(doc.html, "<p>page</p>");
        assert_eq!(fetcher.page_urls(), vec!["https://example.com".to_string()]);

        let search = FetchRequest::search("rust", "https://lite.duckduckgo.com/lite/").unwrap();
        let doc = fetch_request(&fetcher, &search).await.unwrap();
        assert_eq!(doc.html, "<p>results</p>");
        assert_eq!(fetcher.queries(), vec!["rust".to_string()]);
        assert_eq!(fetcher.call_count(), 2);
    }

    #[tokio::test]
    async fn test_automock_fetcher() {
        let mut mock = MockPageFetcher::new();
        mock.expect_fetch_page()
            .withf(|url| url == "https://example.com/")
            .times(1)
            .returning(|url| Ok(RawDocument::new("<title>x</title>", url)));

        let doc = mock.fetch_page("https://example.com/").await.unwrap();
        assert_eq!(doc.base_url, "https://example.com/");
    }
}
