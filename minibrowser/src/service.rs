//! The browse and search pipelines.

use std::sync::Arc;
use tokio::sync::Semaphore;
use tracing::{debug, error, info, warn};

use crate::config::BrowserConfig;
use crate::errors::BrowserError;
use crate::fetch::{fetch_request, PageFetcher};
use crate::models::{FetchRequest, RawDocument, RenderModel, SearchHit};
use crate::render::LegacyRenderer;
use crate::search::{parse_results, render_results};
use crate::simplify::Simplifier;
use crate::urls::check_destination;

const SHELL_TITLE: &str = "Browser";
const SEARCH_TITLE: &str = "Search";
const SEARCH_NAV_NOTE: &str = "<small>Search results open in the simplified browser.</small>";

/// Composes fetching, simplification and rendering.
///
/// Engine launches are capped at `max_concurrent_fetches`; callers past the
/// cap wait for a permit.
pub struct BrowserService {
    fetcher: Arc<dyn PageFetcher>,
    simplifier: Simplifier,
    renderer: LegacyRenderer,
    permits: Semaphore,
    config: BrowserConfig,
}

impl std::fmt::Debug for BrowserService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BrowserService")
            .field("simplifier", &self.simplifier)
            .field("available_permits", &self.permits.available_permits())
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

impl BrowserService {
    /// Creates a service over `fetcher`.
    #[must_use]
    pub fn new(config: BrowserConfig, fetcher: Arc<dyn PageFetcher>) -> Self {
        Self {
            fetcher,
            simplifier: Simplifier::from_config(&config),
            renderer: LegacyRenderer::new(config.render.clone()),
            permits: Semaphore::new(config.max_concurrent_fetches.max(1)),
            config,
        }
    }

    /// Creates a service backed by headless Chromium.
    #[cfg(feature = "chrome")]
    #[must_use]
    pub fn with_chrome(config: BrowserConfig) -> Self {
        let fetcher = Arc::new(crate::fetch::ChromeFetcher::new(config.fetch.clone()));
        Self::new(config, fetcher)
    }

    /// Gets the configuration.
    #[must_use]
    pub fn config(&self) -> &BrowserConfig {
        &self.config
    }

    /// The shell shown before any address was entered.
    #[must_use]
    pub fn empty_shell(&self) -> String {
        self.renderer.render(&RenderModel::empty(SHELL_TITLE))
    }

    /// Renders `error` as an error shell.
    #[must_use]
    pub fn render_error(&self, error: &BrowserError, url: Option<&str>) -> String {
        self.renderer.render_error(error.title(), url, &error.to_string())
    }

    /// Runs the browse pipeline for user input `input`.
    ///
    /// Blocked destinations are rejected before the fetcher is called.
    pub async fn browse(&self, input: &str) -> Result<String, BrowserError> {
        let request = FetchRequest::page(input)?;
        let url = request.target_url.as_str();
        if let Err(e) = check_destination(url) {
            warn!(url = %url, "Rejected search engine destination");
            return Err(e);
        }

        info!(url = %url, "Browsing");
        let raw = self.fetch(&request).await?;

        let model = self.simplifier.simplify(&raw, url);
        info!(
            url = %url,
            duration_ms = raw.duration_ms,
            title = %model.title,
            "Browse completed"
        );
        Ok(self.renderer.render(&model))
    }

    /// Runs the search pipeline; result links point at `local_base_url`.
    pub async fn search(&self, query: &str, local_base_url: &str) -> Result<String, BrowserError> {
        let hits = self.search_hits(query).await?;
        let query = query.trim();
        let content = format!(
            "<p>Search results for: {}</p><br>\n{}",
            html_escape::encode_text(query),
            render_results(&hits, local_base_url)
        );
        let model = RenderModel {
            title: SEARCH_TITLE.to_string(),
            source_url: Some(query.to_string()),
            nav_html: Some(SEARCH_NAV_NOTE.to_string()),
            content_html: content,
        };
        Ok(self.renderer.render(&model))
    }

    /// Fetches and parses the results for `query`.
    pub async fn search_hits(&self, query: &str) -> Result<Vec<SearchHit>, BrowserError> {
        let request = FetchRequest::search(query, &self.config.fetch.search_url)?;
        let query = request.query().unwrap_or_default();

        info!(query = %query, "Searching");
        let raw = self.fetch(&request).await?;

        let hits = parse_results(&raw.html);
        info!(
            query = %query,
            hits = hits.len(),
            duration_ms = raw.duration_ms,
            "Search completed"
        );
        Ok(hits)
    }

    /// Fetches under a concurrency permit.
    async fn fetch(&self, request: &FetchRequest) -> Result<RawDocument, BrowserError> {
        let _permit = self.acquire().await?;
        let raw = fetch_request(self.fetcher.as_ref(), request)
            .await
            .inspect_err(|e| {
                error!(request = ?request, error = %e, "Fetch failed");
            })?;
        debug!(document = %serde_json::json!(raw.to_dict()), "Fetched document");
        Ok(raw)
    }

    async fn acquire(&self) -> Result<tokio::sync::SemaphorePermit<'_>, BrowserError> {
        self.permits
            .acquire()
            .await
            .map_err(|e| BrowserError::EngineLaunch(format!("fetch limiter closed: {e}")))
    }
}
