//! Configuration types for fetching, sanitizing, detection and rendering.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;

/// When the fetcher considers a page fully rendered.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WaitCondition {
    /// Navigation (the load event) has completed.
    Load,
    /// Navigation completed and resource loading has gone quiet.
    #[default]
    NetworkIdle,
}

/// Configuration for the headless fetcher.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FetchConfig {
    /// Navigation timeout in seconds.
    #[serde(default = "default_timeout")]
    pub timeout_seconds: f64,
    /// Wait condition applied before extracting markup.
    #[serde(default)]
    pub wait_until: WaitCondition,
    /// Quiet window for [`WaitCondition::NetworkIdle`], in milliseconds.
    #[serde(default = "default_idle_window")]
    pub idle_window_ms: u64,
    /// Settle delay before typing a query and before reading results, in milliseconds.
    #[serde(default = "default_settle_delay")]
    pub settle_delay_ms: u64,
    /// Minimal search front-end used by the search path.
    #[serde(default = "default_search_url")]
    pub search_url: String,
    /// Explicit Chrome/Chromium executable. Falls back to `CHROME_BIN`, then autodetection.
    #[serde(default)]
    pub chrome_executable: Option<PathBuf>,
    /// Whether to keep images from loading at all.
    #[serde(default = "default_true")]
    pub block_images: bool,
    /// Whether to pass `--no-sandbox` to the engine.
    #[serde(default = "default_true")]
    pub disable_sandbox: bool,
}

fn default_timeout() -> f64 {
    120.0
}

fn default_idle_window() -> u64 {
    500
}

fn default_settle_delay() -> u64 {
    2000
}

fn default_search_url() -> String {
    "https://lite.duckduckgo.com/lite/".to_string()
}

fn default_true() -> bool {
    true
}

impl Default for FetchConfig {
    fn default() -> Self {
        Self {
            timeout_seconds: default_timeout(),
            wait_until: WaitCondition::default(),
            idle_window_ms: default_idle_window(),
            settle_delay_ms: default_settle_delay(),
            search_url: default_search_url(),
            chrome_executable: None,
            block_images: true,
            disable_sandbox: true,
        }
    }
}

impl FetchConfig {
    /// Creates a new fetch configuration with defaults.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the navigation timeout.
    #[must_use]
    pub fn with_timeout(mut self, seconds: f64) -> Self {
        self.timeout_seconds = seconds;
        self
    }

    /// Sets the wait condition.
    #[must_use]
    pub fn with_wait_until(mut self, wait_until: WaitCondition) -> Self {
        self.wait_until = wait_until;
        self
    }

    /// Sets the settle delay used by the search path.
    #[must_use]
    pub fn with_settle_delay_ms(mut self, millis: u64) -> Self {
        self.settle_delay_ms = millis;
        self
    }

    /// Sets the Chrome executable.
    #[must_use]
    pub fn with_chrome_executable(mut self, path: impl Into<PathBuf>) -> Self {
        self.chrome_executable = Some(path.into());
        self
    }

    /// Gets the navigation timeout as a Duration.
    ///
    /// A negative or non-finite value falls back to the default.
    #[must_use]
    pub fn timeout(&self) -> Duration {
        Duration::try_from_secs_f64(self.timeout_seconds)
            .unwrap_or_else(|_| Duration::from_secs_f64(default_timeout()))
    }

    /// Gets the settle delay as a Duration.
    #[must_use]
    pub fn settle_delay(&self) -> Duration {
        Duration::from_millis(self.settle_delay_ms)
    }

    /// Gets the network-idle quiet window as a Duration.
    #[must_use]
    pub fn idle_window(&self) -> Duration {
        Duration::from_millis(self.idle_window_ms)
    }
}

/// Configuration for markup sanitization.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SanitizerConfig {
    /// Resolve relative URLs against the document's base URL before rewriting.
    #[serde(default = "default_true")]
    pub absolutize_urls: bool,
    /// Unwrap every element not listed in `strict_tags`.
    #[serde(default)]
    pub strict_tags_only: bool,
    /// Tags kept when `strict_tags_only` is on.
    #[serde(default = "default_strict_tags")]
    pub strict_tags: Vec<String>,
}

fn default_strict_tags() -> Vec<String> {
    [
        "div", "p", "h1", "h2", "h3", "ul", "ol", "li", "a", "form", "input", "table", "tr",
        "td", "br",
    ]
    .iter()
    .map(|t| (*t).to_string())
    .collect()
}

impl Default for SanitizerConfig {
    fn default() -> Self {
        Self {
            absolutize_urls: true,
            strict_tags_only: false,
            strict_tags: default_strict_tags(),
        }
    }
}

impl SanitizerConfig {
    /// Creates a new sanitizer configuration with defaults.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Disables URL absolutization.
    #[must_use]
    pub fn without_absolutize(mut self) -> Self {
        self.absolutize_urls = false;
        self
    }

    /// Enables strict tag unwrapping.
    #[must_use]
    pub fn with_strict_tags(mut self) -> Self {
        self.strict_tags_only = true;
        self
    }
}

/// Thresholds for the structure detector.
///
/// These roughly separate link farms from prose; none of the exact values
/// carries meaning beyond that.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DetectorConfig {
    /// Minimum links for a navigation candidate.
    #[serde(default = "default_nav_min_links")]
    pub nav_min_links: usize,
    /// Minimum link density for a navigation candidate.
    #[serde(default = "default_nav_min_density")]
    pub nav_min_link_density: f64,
    /// Minimum text length for a content candidate.
    #[serde(default = "default_content_min_text")]
    pub content_min_text: usize,
    /// Link density above which a content candidate counts as a link farm.
    #[serde(default = "default_link_farm_density")]
    pub link_farm_density: f64,
    /// Link count above which the link-farm density check applies.
    #[serde(default = "default_link_farm_links")]
    pub link_farm_min_links: usize,
    /// Minimum text length for fallback content candidates.
    #[serde(default = "default_fallback_min_text")]
    pub fallback_min_text: usize,
}

fn default_nav_min_links() -> usize {
    3
}

fn default_nav_min_density() -> f64 {
    0.25
}

fn default_content_min_text() -> usize {
    200
}

fn default_link_farm_density() -> f64 {
    0.55
}

fn default_link_farm_links() -> usize {
    5
}

fn default_fallback_min_text() -> usize {
    800
}

impl Default for DetectorConfig {
    fn default() -> Self {
        Self {
            nav_min_links: default_nav_min_links(),
            nav_min_link_density: default_nav_min_density(),
            content_min_text: default_content_min_text(),
            link_farm_density: default_link_farm_density(),
            link_farm_min_links: default_link_farm_links(),
            fallback_min_text: default_fallback_min_text(),
        }
    }
}

/// Which content extraction strategy a deployment runs.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ExtractionMode {
    /// Use the structure detector's content region.
    #[default]
    Heuristic,
    /// Refine the content region with a readability-style article pass.
    Readability,
}

/// Configuration for the legacy renderer.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RenderConfig {
    /// Background of the header row and navigation cell.
    #[serde(default = "default_header_color")]
    pub header_color: String,
    /// Background of the header row in error shells.
    #[serde(default = "default_error_color")]
    pub error_color: String,
    /// Font family for the whole document.
    #[serde(default = "default_font_family")]
    pub font_family: String,
}

fn default_header_color() -> String {
    "#dbeafe".to_string()
}

fn default_error_color() -> String {
    "#fecaca".to_string()
}

fn default_font_family() -> String {
    "Verdana, Arial, Helvetica, sans-serif".to_string()
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            header_color: default_header_color(),
            error_color: default_error_color(),
            font_family: default_font_family(),
        }
    }
}

/// Combined configuration for the browser service.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BrowserConfig {
    /// Maximum concurrent engine instances.
    #[serde(default = "default_concurrent")]
    pub max_concurrent_fetches: usize,
    /// Extraction strategy.
    #[serde(default)]
    pub extraction: ExtractionMode,
    /// Fetch configuration.
    #[serde(default)]
    pub fetch: FetchConfig,
    /// Sanitizer configuration.
    #[serde(default)]
    pub sanitizer: SanitizerConfig,
    /// Detector thresholds.
    #[serde(default)]
    pub detector: DetectorConfig,
    /// Renderer configuration.
    #[serde(default)]
    pub render: RenderConfig,
}

fn default_concurrent() -> usize {
    4
}

impl Default for BrowserConfig {
    fn default() -> Self {
        Self {
            max_concurrent_fetches: default_concurrent(),
            extraction: ExtractionMode::default(),
            fetch: FetchConfig::default(),
            sanitizer: SanitizerConfig::default(),
            detector: DetectorConfig::default(),
            render: RenderConfig::default(),
        }
    }
}

impl BrowserConfig {
    /// Creates a new browser configuration with defaults.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the maximum concurrent fetches.
    #[must_use]
    pub fn with_max_concurrent(mut self, max: usize) -> Self {
        self.max_concurrent_fetches = max;
        self
    }

    /// Selects the extraction strategy.
    #[must_use]
    pub fn with_extraction(mut self, mode: ExtractionMode) -> Self {
        self.extraction = mode;
        self
    }

    /// Replaces the fetch configuration.
    #[must_use]
    pub fn with_fetch(mut self, fetch: FetchConfig) -> Self {
        self.fetch = fetch;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fetch_config_defaults() {
        let config = FetchConfig::default();
        assert_eq!(config.timeout_seconds, 120.0);
        assert_eq!(config.wait_until, WaitCondition::NetworkIdle);
        assert_eq!(config.settle_delay(), Duration::from_secs(2));
        assert!(config.search_url.starts_with("https://lite.duckduckgo.com"));
        assert!(config.block_images);
    }

    #[test]
    fn test_fetch_config_builder() {
        let config = FetchConfig::new()
            .with_timeout(30.0)
            .with_wait_until(WaitCondition::Load)
            .with_chrome_executable("/usr/bin/chromium");

        assert_eq!(config.timeout(), Duration::from_secs(30));
        assert_eq!(config.wait_until, WaitCondition::Load);
        assert_eq!(config.chrome_executable, Some(PathBuf::from("/usr/bin/chromium")));
    }

    #[test]
    fn test_invalid_timeout_falls_back() {
        assert_eq!(FetchConfig::new().with_timeout(-1.0).timeout(), Duration::from_secs(120));
        assert_eq!(FetchConfig::new().with_timeout(f64::NAN).timeout(), Duration::from_secs(120));
        assert_eq!(FetchConfig::new().with_timeout(0.5).timeout(), Duration::from_millis(500));
    }

    #[test]
    fn test_detector_config_defaults() {
        let config = DetectorConfig::default();
        assert_eq!(config.nav_min_links, 3);
        assert_eq!(config.content_min_text, 200);
        assert_eq!(config.link_farm_min_links, 5);
        assert_eq!(config.fallback_min_text, 800);
    }

    #[test]
    fn test_browser_config_from_partial_json() {
        let config: BrowserConfig = serde_json::from_str(
            r#"{"extraction": "readability", "fetch": {"timeout_seconds": 15, "wait_until": "load"}}"#,
        )
        .unwrap();

        assert_eq!(config.extraction, ExtractionMode::Readability);
        assert_eq!(config.max_concurrent_fetches, 4);
        assert_eq!(config.fetch.timeout_seconds, 15.0);
        assert_eq!(config.fetch.wait_until, WaitCondition::Load);
        assert_eq!(config.render.header_color, "#dbeafe");
        assert!(config.sanitizer.absolutize_urls);
    }

    #[test]
    fn test_browser_config_builder() {
        let config = BrowserConfig::new()
            .with_max_concurrent(2)
            .with_extraction(ExtractionMode::Readability);

        assert_eq!(config.max_concurrent_fetches, 2);
        assert_eq!(config.extraction, ExtractionMode::Readability);
    }
}
