//! Assertions over rendered and sanitized markup.

use regex::Regex;
use std::sync::LazyLock;

use crate::render::DOCTYPE;
use crate::urls::PROXY_PREFIX;

static LINK_TARGET: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#"(?:href|action)="([^"]*)""#).unwrap());

/// Asserts that `html` is a complete legacy document.
pub fn assert_legacy_document(html: &str) {
    assert!(
        html.starts_with(DOCTYPE),
        "Expected document to start with the HTML 4.01 doctype, got: {:?}",
        html.chars().take(80).collect::<String>()
    );
    assert!(
        !html.contains("data-browser-"),
        "Expected structural markers to be stripped"
    );
    assert_no_executable_markup(html);
}

/// Asserts that no scripts, styles sheets, frames or handlers survived.
pub fn assert_no_executable_markup(html: &str) {
    let lower = html.to_ascii_lowercase();
    for needle in ["<script", "<iframe", "<object", "<embed", " onclick=", " onload=", "javascript:"] {
        assert!(
            !lower.contains(needle),
            "Expected no '{}' in markup, got: {}",
            needle,
            html
        );
    }
}

/// Asserts that every `href`/`action` in `html` enters the proxy.
///
/// The toolbar's own form actions are skipped.
pub fn assert_only_proxy_links(html: &str) {
    for capture in LINK_TARGET.captures_iter(html) {
        let target = &capture[1];
        if matches!(target, "/browser/browse" | "/browser/search" | "/") {
            continue;
        }
        assert!(
            target.starts_with(PROXY_PREFIX) || target.contains(PROXY_PREFIX),
            "Expected proxy link, got '{}'",
            target
        );
    }
}
