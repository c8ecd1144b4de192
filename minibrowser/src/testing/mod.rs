//! Testing utilities for the browser pipeline.
//!
//! This module provides:
//! - A scripted [`PageFetcher`](crate::fetch::PageFetcher) double
//! - Representative page and search-result fixtures
//! - Assertions over rendered legacy markup

mod assertions;
mod fixtures;
mod mocks;

pub use assertions::{
    assert_legacy_document, assert_no_executable_markup, assert_only_proxy_links,
};
pub use fixtures::{article_page, link_farm_page, search_results_page};
pub use mocks::MockFetcher;
