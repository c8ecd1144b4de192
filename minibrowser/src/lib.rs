//! # Minibrowser
//!
//! Web content acquisition and simplification for very old browsers.
//!
//! A page goes through:
//!
//! - **Fetching**: a headless Chromium renders the page, scripts included
//! - **Sanitizing**: executable markup, media and clutter are removed, links
//!   are rewritten to re-enter the proxy
//! - **Structure detection**: a navigation block and a content block are
//!   picked with link-density heuristics
//! - **Extraction**: the content cell comes from the detected region or a
//!   readability-style article pass
//! - **Legacy rendering**: a table layout in HTML 4.01 with no scripts
//!
//! Search queries go to a minimal search front-end and come back as a plain
//! result list.
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use minibrowser::prelude::*;
//!
//! let service = BrowserService::with_chrome(BrowserConfig::default());
//! let html = service.browse("example.com").await?;
//! ```

#![forbid(unsafe_code)]
#![warn(
    clippy::all,
    clippy::pedantic,
    missing_docs,
    rust_2018_idioms
)]
#![allow(
    clippy::module_name_repetitions,
    clippy::must_use_candidate,
    clippy::missing_errors_doc,
    clippy::missing_panics_doc
)]

pub mod config;
pub mod detect;
pub mod dom;
pub mod errors;
pub mod extract;
pub mod fetch;
pub mod models;
pub mod render;
pub mod sanitize;
pub mod search;
pub mod service;
pub mod simplify;
pub mod testing;
pub mod urls;

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::config::{
        BrowserConfig, DetectorConfig, ExtractionMode, FetchConfig, RenderConfig,
        SanitizerConfig, WaitCondition,
    };
    pub use crate::detect::{StructureClassification, StructureDetector};
    pub use crate::errors::BrowserError;
    pub use crate::extract::{ContentExtractor, HeuristicExtractor, ReadabilityExtractor};
    pub use crate::fetch::{
        FetchObserver, LoggingFetchObserver, NoOpFetchObserver, PageFetcher,
    };
    #[cfg(feature = "chrome")]
    pub use crate::fetch::ChromeFetcher;
    pub use crate::models::{
        BlockMetrics, FetchMode, FetchRequest, RawDocument, RenderModel, SearchHit,
    };
    pub use crate::render::LegacyRenderer;
    pub use crate::sanitize::{SanitizedDocument, Sanitizer};
    pub use crate::service::BrowserService;
    pub use crate::simplify::Simplifier;
    pub use crate::urls::{check_destination, normalize_url};
}
