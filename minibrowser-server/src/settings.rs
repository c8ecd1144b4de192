//! Process settings.

use anyhow::Context;
use minibrowser::config::BrowserConfig;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Environment variable naming the JSON settings file.
pub const CONFIG_ENV: &str = "MINIBROWSER_CONFIG";

/// Environment variable overriding the bind address.
pub const BIND_ENV: &str = "MINIBROWSER_BIND";

/// Log output format.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LogFormat {
    /// Human-readable lines.
    #[default]
    Text,
    /// One JSON object per event.
    Json,
}

/// Settings for the server process.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerSettings {
    /// Socket address to listen on.
    #[serde(default = "default_bind")]
    pub bind: String,
    /// Log output format.
    #[serde(default)]
    pub log_format: LogFormat,
    /// Pipeline configuration.
    #[serde(default)]
    pub browser: BrowserConfig,
}

fn default_bind() -> String {
    "0.0.0.0:3000".to_string()
}

impl Default for ServerSettings {
    fn default() -> Self {
        Self {
            bind: default_bind(),
            log_format: LogFormat::default(),
            browser: BrowserConfig::default(),
        }
    }
}

impl ServerSettings {
    /// Loads settings from the environment.
    pub fn from_env() -> anyhow::Result<Self> {
        let path = std::env::var(CONFIG_ENV).ok().filter(|p| !p.trim().is_empty());
        let bind = std::env::var(BIND_ENV).ok();
        Self::load(path.as_deref().map(Path::new), bind)
    }

    /// Loads settings from an optional JSON file, then applies `bind_override`.
    pub fn load(path: Option<&Path>, bind_override: Option<String>) -> anyhow::Result<Self> {
        let mut settings = match path {
            Some(path) => {
                let raw = std::fs::read_to_string(path)
                    .with_context(|| format!("failed to read settings file {}", path.display()))?;
                serde_json::from_str(&raw)
                    .with_context(|| format!("failed to parse settings file {}", path.display()))?
            }
            None => Self::default(),
        };
        if let Some(bind) = bind_override.map(|b| b.trim().to_string()).filter(|b| !b.is_empty()) {
            settings.bind = bind;
        }
        let timeout = settings.browser.fetch.timeout_seconds;
        anyhow::ensure!(
            timeout.is_finite() && timeout > 0.0,
            "fetch timeout_seconds must be a positive number, got {timeout}"
        );
        Ok(settings)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use minibrowser::config::ExtractionMode;
    use pretty_assertions::assert_eq;
    use std::io::Write;

    #[test]
    fn test_defaults_without_file() {
        let settings = ServerSettings::load(None, None).unwrap();
        assert_eq!(settings.bind, "0.0.0.0:3000");
        assert_eq!(settings.log_format, LogFormat::Text);
        assert_eq!(settings.browser.max_concurrent_fetches, 4);
    }

    #[test]
    fn test_load_file_and_override_bind() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(
            file,
            r#"{{"bind": "127.0.0.1:8080", "log_format": "json",
                "browser": {{"extraction": "readability", "max_concurrent_fetches": 2}}}}"#
        )
        .unwrap();

        let settings = ServerSettings::load(Some(file.path()), None).unwrap();
        assert_eq!(settings.bind, "127.0.0.1:8080");
        assert_eq!(settings.log_format, LogFormat::Json);
        assert_eq!(settings.browser.extraction, ExtractionMode::Readability);
        assert_eq!(settings.browser.max_concurrent_fetches, 2);
        assert_eq!(settings.browser.fetch.timeout_seconds, 120.0);

        let settings =
            ServerSettings::load(Some(file.path()), Some("127.0.0.1:9999".into())).unwrap();
        assert_eq!(settings.bind, "127.0.0.1:9999");
    }

    #[test]
    fn test_missing_and_malformed_files() {
        let dir = tempfile::tempdir().unwrap();
        let err = ServerSettings::load(Some(dir.path().join("nope.json").as_path()), None).unwrap_err();
        assert!(err.to_string().contains("failed to read settings file"));

        let bad = dir.path().join("bad.json");
        std::fs::write(&bad, "{not json").unwrap();
        let err = ServerSettings::load(Some(bad.as_path()), None).unwrap_err();
        assert!(err.to_string().contains("failed to parse settings file"));
    }

    #[test]
    fn test_rejects_negative_timeout() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, r#"{{"browser": {{"fetch": {{"timeout_seconds": -5}}}}}}"#).unwrap();

        let err = ServerSettings::load(Some(file.path()), None).unwrap_err();
        assert!(err.to_string().contains("timeout_seconds must be a positive number"));
    }
}
