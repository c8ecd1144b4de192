//! Chromium-backed [`PageFetcher`].

use async_trait::async_trait;
use chromiumoxide::error::CdpError;
use chromiumoxide::Page;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::debug;
use uuid::Uuid;

use super::profiles::random_profile;
use super::session::Session;
use super::{FetchObserver, LoggingFetchObserver, PageFetcher};
use crate::config::{FetchConfig, WaitCondition};
use crate::errors::BrowserError;
use crate::models::RawDocument;

const IDLE_POLL_INTERVAL: Duration = Duration::from_millis(100);
const RESOURCE_COUNT_SCRIPT: &str = "performance.getEntriesByType('resource').length";
const QUERY_INPUT: &str = r#"input[name="q"]"#;
const SUBMIT_BUTTON: &str = r#"input[type="submit"]"#;

/// Engine flags derived from the fetch configuration.
#[must_use]
pub fn launch_args(config: &FetchConfig) -> Vec<String> {
    let mut args = vec![
        "--disable-dev-shm-usage".to_string(),
        "--disable-gpu".to_string(),
        "--no-first-run".to_string(),
        "--mute-audio".to_string(),
    ];
    if config.block_images {
        args.push("--blink-settings=imagesEnabled=false".to_string());
    }
    args
}

/// The engine executable: the configured path, else `chrome_bin`, else autodetect.
#[must_use]
pub fn resolve_executable(config: &FetchConfig, chrome_bin: Option<String>) -> Option<PathBuf> {
    config.chrome_executable.clone().or_else(|| {
        chrome_bin
            .map(|bin| bin.trim().to_string())
            .filter(|bin| !bin.is_empty())
            .map(PathBuf::from)
    })
}

/// Fetches pages with a fresh headless Chromium per call.
pub struct ChromeFetcher {
    config: FetchConfig,
    observer: Arc<dyn FetchObserver>,
}

impl std::fmt::Debug for ChromeFetcher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ChromeFetcher")
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

impl ChromeFetcher {
    /// Creates a fetcher that logs fetch lifecycle events.
    #[must_use]
    pub fn new(config: FetchConfig) -> Self {
        Self {
            config,
            observer: Arc::new(LoggingFetchObserver::default()),
        }
    }

    /// Replaces the fetch observer.
    #[must_use]
    pub fn with_observer(mut self, observer: Arc<dyn FetchObserver>) -> Self {
        self.observer = observer;
        self
    }

    /// Gets the configuration.
    #[must_use]
    pub fn config(&self) -> &FetchConfig {
        &self.config
    }

    async fn observed<F>(&self, url: &str, fetch: F) -> Result<RawDocument, BrowserError>
    where
        F: std::future::Future<Output = Result<RawDocument, BrowserError>>,
    {
        let request_id = Uuid::new_v4().to_string();
        self.observer.on_fetch_start(url, &request_id);
        let start = Instant::now();

        match fetch.await {
            Ok(doc) => {
                let duration_ms = start.elapsed().as_secs_f64() * 1000.0;
                self.observer
                    .on_fetch_complete(url, &request_id, duration_ms, doc.html.len());
                Ok(doc.with_duration_ms(duration_ms))
            }
            Err(e) => {
                self.observer.on_fetch_error(url, &request_id, &e);
                Err(e)
            }
        }
    }

    /// Quiet window to wait for after every navigation, page loads and
    /// search submissions alike.
    fn idle_wait(&self) -> Option<Duration> {
        (self.config.wait_until == WaitCondition::NetworkIdle).then(|| self.config.idle_window())
    }

    /// Runs `navigate` under the navigation timeout.
    async fn bounded<T, F>(&self, url: &str, navigate: F) -> Result<T, BrowserError>
    where
        F: std::future::Future<Output = Result<T, CdpError>>,
    {
        match tokio::time::timeout(self.config.timeout(), navigate).await {
            Ok(Ok(value)) => Ok(value),
            Ok(Err(CdpError::Timeout)) | Err(_) => Err(BrowserError::FetchTimeout {
                url: url.to_string(),
                timeout_seconds: self.config.timeout_seconds,
            }),
            Ok(Err(e)) => Err(BrowserError::from_navigation(url, e.to_string())),
        }
    }

    async fn load_page(&self, session: &Session, url: &str) -> Result<RawDocument, BrowserError> {
        let profile = random_profile();
        let page = session.new_page(profile, &[]).await?;
        let idle_wait = self.idle_wait();

        let (html, final_url) = self
            .bounded(url, async {
                page.goto(url).await?;
                if let Some(window) = idle_wait {
                    wait_for_network_idle(&page, window).await?;
                }
                let html = page.content().await?;
                let final_url = page.url().await?;
                Ok((html, final_url))
            })
            .await?;

        Ok(RawDocument::new(html, final_url.unwrap_or_else(|| url.to_string())))
    }

    async fn load_search(&self, session: &Session, query: &str) -> Result<RawDocument, BrowserError> {
        let search_url = self.config.search_url.as_str();
        let profile = random_profile();
        let headers = [
            (
                "Accept",
                "text/html,application/xhtml+xml,application/xml;q=0.9,*/*;q=0.8",
            ),
            ("Accept-Language", profile.accept_language),
            ("Referer", search_url),
            ("DNT", "1"),
        ];
        let page = session.new_page(profile, &headers).await?;
        let settle = self.config.settle_delay();
        let idle_wait = self.idle_wait();

        let (html, final_url) = self
            .bounded(search_url, async {
                page.goto(search_url).await?;
                tokio::time::sleep(settle).await;

                let input = page.find_element(QUERY_INPUT).await?;
                input.click().await?;
                input.type_str(query).await?;
                tokio::time::sleep(settle).await;

                page.find_element(SUBMIT_BUTTON).await?.click().await?;
                page.wait_for_navigation().await?;
                if let Some(window) = idle_wait {
                    wait_for_network_idle(&page, window).await?;
                }

                let html = page.content().await?;
                let final_url = page.url().await?;
                Ok((html, final_url))
            })
            .await?;

        debug!(query = %query, "Search submitted");
        Ok(RawDocument::new(
            html,
            final_url.unwrap_or_else(|| search_url.to_string()),
        ))
    }
}

async fn resource_count(page: &Page) -> Result<u64, CdpError> {
    Ok(page.evaluate(RESOURCE_COUNT_SCRIPT).await?.into_value::<u64>()?)
}

/// Polls the resource-entry count until it stays put for `window`.
async fn wait_for_network_idle(page: &Page, window: Duration) -> Result<(), CdpError> {
    let mut last = resource_count(page).await?;
    let mut quiet_since = Instant::now();
    loop {
        tokio::time::sleep(IDLE_POLL_INTERVAL).await;
        let count = resource_count(page).await?;
        if count != last {
            last = count;
            quiet_since = Instant::now();
        } else if quiet_since.elapsed() >= window {
            debug!(resources = count, "Network idle");
            return Ok(());
        }
    }
}

#[async_trait]
impl PageFetcher for ChromeFetcher {
    async fn fetch_page(&self, url: &str) -> Result<RawDocument, BrowserError> {
        self.observed(url, async {
            let session = Session::launch(&self.config).await?;
            let result = self.load_page(&session, url).await;
            session.close().await;
            result
        })
        .await
    }

    async fn fetch_search_results(&self, query: &str) -> Result<RawDocument, BrowserError> {
        let url = self.config.search_url.clone();
        self.observed(&url, async {
            let session = Session::launch(&self.config).await?;
            let result = self.load_search(&session, query).await;
            session.close().await;
            result
        })
        .await
    }
}
