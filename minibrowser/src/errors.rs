//! Error types for the minibrowser pipeline.
//!
//! Boundary errors (bad input, blocked destinations) short-circuit before any
//! fetch happens; fetch errors come from the headless engine and are surfaced
//! verbatim. Sanitization, detection and rendering never fail.

use std::collections::HashMap;
use thiserror::Error;

/// The main error type for minibrowser operations.
#[derive(Debug, Clone, Error, PartialEq)]
pub enum BrowserError {
    /// The caller supplied an empty or unparseable URL.
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// The destination host is on the search-engine block-list.
    #[error("Blocked destination: {host} is a search engine, use the search form instead")]
    BlockedHost {
        /// The offending host.
        host: String,
    },

    /// The destination host could not be resolved.
    #[error("{url} is not a valid URL")]
    InvalidUrl {
        /// The URL that failed to resolve.
        url: String,
    },

    /// Navigation did not finish within the configured timeout.
    #[error("Timed out after {timeout_seconds}s while loading {url}")]
    FetchTimeout {
        /// The URL being loaded.
        url: String,
        /// The navigation timeout in seconds.
        timeout_seconds: f64,
    },

    /// Navigation or markup extraction failed.
    #[error("Failed to fetch {url}: {details}")]
    FetchFailed {
        /// The URL being loaded.
        url: String,
        /// The engine's error message.
        details: String,
    },

    /// The headless engine could not be launched.
    #[error("Failed to launch browser engine: {0}")]
    EngineLaunch(String),
}

impl BrowserError {
    /// Creates an invalid input error.
    #[must_use]
    pub fn invalid_input(message: impl Into<String>) -> Self {
        Self::InvalidInput(message.into())
    }

    /// Creates a blocked host error.
    #[must_use]
    pub fn blocked_host(host: impl Into<String>) -> Self {
        Self::BlockedHost { host: host.into() }
    }

    /// Creates a fetch failure error.
    #[must_use]
    pub fn fetch_failed(url: impl Into<String>, details: impl Into<String>) -> Self {
        Self::FetchFailed {
            url: url.into(),
            details: details.into(),
        }
    }

    /// Classifies a raw engine navigation error for `url`.
    ///
    /// Name resolution failures become [`BrowserError::InvalidUrl`], anything
    /// else a generic [`BrowserError::FetchFailed`].
    #[must_use]
    pub fn from_navigation(url: &str, details: impl Into<String>) -> Self {
        let details = details.into();
        if details.contains("ERR_NAME_NOT_RESOLVED") {
            Self::InvalidUrl {
                url: url.to_string(),
            }
        } else {
            Self::fetch_failed(url, details)
        }
    }

    /// Whether the error was caused by the caller's input rather than the fetch.
    #[must_use]
    pub fn is_client_error(&self) -> bool {
        matches!(self, Self::InvalidInput(_) | Self::BlockedHost { .. })
    }

    /// HTTP status code the route boundary answers with.
    #[must_use]
    pub fn status_code(&self) -> u16 {
        match self {
            Self::InvalidInput(_) => 400,
            Self::BlockedHost { .. } => 403,
            Self::InvalidUrl { .. }
            | Self::FetchTimeout { .. }
            | Self::FetchFailed { .. }
            | Self::EngineLaunch(_) => 500,
        }
    }

    /// Short title for the error shell.
    #[must_use]
    pub fn title(&self) -> &'static str {
        match self {
            Self::InvalidInput(_) => "Invalid address",
            Self::BlockedHost { .. } => "Search engine blocked",
            Self::InvalidUrl { .. } => "Unknown host",
            Self::FetchTimeout { .. } => "Page took too long",
            Self::FetchFailed { .. } | Self::EngineLaunch(_) => "Page could not be loaded",
        }
    }

    /// Converts to a dictionary representation.
    #[must_use]
    pub fn to_dict(&self) -> HashMap<String, serde_json::Value> {
        let mut map = HashMap::new();

        let kind = match self {
            Self::InvalidInput(_) => "InvalidInput",
            Self::BlockedHost { host } => {
                map.insert("host".to_string(), serde_json::json!(host));
                "BlockedHost"
            }
            Self::InvalidUrl { url } => {
                map.insert("url".to_string(), serde_json::json!(url));
                "InvalidUrl"
            }
            Self::FetchTimeout {
                url,
                timeout_seconds,
            } => {
                map.insert("url".to_string(), serde_json::json!(url));
                map.insert("timeout_seconds".to_string(), serde_json::json!(timeout_seconds));
                "FetchTimeout"
            }
            Self::FetchFailed { url, .. } => {
                map.insert("url".to_string(), serde_json::json!(url));
                "FetchFailed"
            }
            Self::EngineLaunch(_) => "EngineLaunch",
        };

        map.insert("type".to_string(), serde_json::json!(kind));
        map.insert("status".to_string(), serde_json::json!(self.status_code()));
        map.insert("message".to_string(), serde_json::json!(self.to_string()));
        map
    }
}
