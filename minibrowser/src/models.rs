//! Data models flowing through the fetch, simplify and render stages.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use crate::errors::BrowserError;
use crate::urls::{normalize_url, strip_scheme};

/// What a fetch should do once the engine is up.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FetchMode {
    /// Load the target page.
    Page,
    /// Submit `query` to the search front-end at the target URL.
    Search {
        /// The search query.
        query: String,
    },
}

/// A single fetch request.
///
/// `target_url` is always a normalized absolute `http(s)` URL.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FetchRequest {
    /// The normalized destination.
    pub target_url: String,
    /// Page load or search submission.
    pub mode: FetchMode,
}

impl FetchRequest {
    /// Creates a page request, normalizing the URL.
    pub fn page(url: &str) -> Result<Self, BrowserError> {
        Ok(Self {
            target_url: normalize_url(url)?,
            mode: FetchMode::Page,
        })
    }

    /// Creates a search request against the given front-end.
    pub fn search(query: &str, search_url: &str) -> Result<Self, BrowserError> {
        let query = query.trim();
        if query.is_empty() {
            return Err(BrowserError::invalid_input("empty search query"));
        }
        Ok(Self {
            target_url: normalize_url(search_url)?,
            mode: FetchMode::Search {
                query: query.to_string(),
            },
        })
    }

    /// The query for search requests.
    #[must_use]
    pub fn query(&self) -> Option<&str> {
        match &self.mode {
            FetchMode::Page => None,
            FetchMode::Search { query } => Some(query),
        }
    }
}

/// Rendered markup exactly as the engine returned it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RawDocument {
    /// The serialized DOM.
    pub html: String,
    /// URL relative links resolve against (the final URL after redirects).
    pub base_url: String,
    /// Fetch duration in milliseconds.
    pub duration_ms: f64,
    /// When the fetch finished.
    pub fetched_at: DateTime<Utc>,
}

impl RawDocument {
    /// Creates a raw document fetched just now.
    #[must_use]
    pub fn new(html: impl Into<String>, base_url: impl Into<String>) -> Self {
        Self {
            html: html.into(),
            base_url: base_url.into(),
            duration_ms: 0.0,
            fetched_at: Utc::now(),
        }
    }

    /// Sets the fetch duration.
    #[must_use]
    pub fn with_duration_ms(mut self, duration_ms: f64) -> Self {
        self.duration_ms = duration_ms;
        self
    }

    /// Converts to dictionary (markup reduced to its length).
    #[must_use]
    pub fn to_dict(&self) -> HashMap<String, serde_json::Value> {
        let mut dict = HashMap::new();
        dict.insert("base_url".to_string(), serde_json::json!(self.base_url));
        dict.insert("html_len".to_string(), serde_json::json!(self.html.len()));
        dict.insert("duration_ms".to_string(), serde_json::json!(self.duration_ms));
        dict.insert(
            "fetched_at".to_string(),
            serde_json::json!(self.fetched_at.to_rfc3339()),
        );
        dict
    }
}

/// Everything the legacy renderer needs for one page.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RenderModel {
    /// Page title shown in the header row.
    pub title: String,
    /// Source URL; `None` renders the empty shell.
    pub source_url: Option<String>,
    /// Navigation cell markup.
    pub nav_html: Option<String>,
    /// Content cell markup.
    pub content_html: String,
}

impl RenderModel {
    /// Creates a model for a page, defaulting the title to the URL sans scheme.
    #[must_use]
    pub fn for_page(source_url: impl Into<String>, title: Option<String>) -> Self {
        let source_url = source_url.into();
        let title = title
            .map(|t| t.trim().to_string())
            .filter(|t| !t.is_empty())
            .unwrap_or_else(|| strip_scheme(&source_url).to_string());
        Self {
            title,
            source_url: Some(source_url),
            nav_html: None,
            content_html: String::new(),
        }
    }

    /// Creates the empty shell model.
    #[must_use]
    pub fn empty(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            ..Default::default()
        }
    }

    /// Sets the navigation markup.
    #[must_use]
    pub fn with_nav_html(mut self, nav_html: impl Into<String>) -> Self {
        self.nav_html = Some(nav_html.into());
        self
    }

    /// Sets the content markup.
    #[must_use]
    pub fn with_content_html(mut self, content_html: impl Into<String>) -> Self {
        self.content_html = content_html.into();
        self
    }
}

/// One organic search result, in result-list order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchHit {
    /// Absolute result URL.
    pub result_url: String,
    /// Link text.
    pub title: String,
    /// Snippet text.
    #[serde(default)]
    pub snippet: Option<String>,
    /// URL as the engine displays it.
    #[serde(default)]
    pub display_url: Option<String>,
}

impl SearchHit {
    /// Creates a hit with URL and title.
    #[must_use]
    pub fn new(result_url: impl Into<String>, title: impl Into<String>) -> Self {
        Self {
            result_url: result_url.into(),
            title: title.into(),
            ..Default::default()
        }
    }

    /// Sets the snippet.
    #[must_use]
    pub fn with_snippet(mut self, snippet: impl Into<String>) -> Self {
        self.snippet = Some(snippet.into());
        self
    }

    /// Sets the display URL.
    #[must_use]
    pub fn with_display_url(mut self, display_url: impl Into<String>) -> Self {
        self.display_url = Some(display_url.into());
        self
    }

}

/// Text and link measurements of one candidate block.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct BlockMetrics {
    /// Length of the whitespace-collapsed text.
    pub text_length: usize,
    /// Length of the whitespace-collapsed text inside anchors.
    pub link_text_length: usize,
    /// Number of `p` descendants.
    pub paragraph_count: usize,
    /// Number of `a` descendants.
    pub link_count: usize,
    /// `link_text_length / text_length`.
    pub link_density: f64,
}

impl BlockMetrics {
    /// Builds metrics, deriving link density.
    #[must_use]
    pub fn new(
        text_length: usize,
        link_text_length: usize,
        paragraph_count: usize,
        link_count: usize,
    ) -> Self {
        #[allow(clippy::cast_precision_loss)]
        let link_density = if text_length == 0 {
            0.0
        } else {
            link_text_length as f64 / text_length as f64
        };
        Self {
            text_length,
            link_text_length,
            paragraph_count,
            link_count,
            link_density,
        }
    }
}
