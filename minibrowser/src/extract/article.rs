//! Readability-mode extraction backed by the `readability` crate.
//!
//! The pass runs on the prepared document so `class` and `id` weighting
//! still applies; its output is finalized by the caller.

use tracing::debug;
use url::Url;

use super::{region_html, ContentExtractor};
use crate::dom::{parse_document, NodeExt};
use crate::sanitize::{SanitizedDocument, NAV_MARKER};

/// Single-best-article pass over the detected content region.
#[derive(Debug, Clone, Copy, Default)]
pub struct ReadabilityExtractor;

impl ReadabilityExtractor {
    /// Extracts the main article from a standalone HTML fragment.
    ///
    /// Returns `None` when the base URL does not parse, the pass fails or
    /// the article has no text.
    #[must_use]
    pub fn extract_article(&self, html: &str, base_url: &str) -> Option<String> {
        let base = Url::parse(base_url).ok()?;
        match readability::extractor::extract(&mut html.as_bytes(), &base) {
            Ok(product) if !product.text.trim().is_empty() => {
                debug!(
                    base_url = %base_url,
                    text_len = product.text.len(),
                    "Readability pass"
                );
                Some(product.content)
            }
            Ok(_) => None,
            Err(e) => {
                debug!(base_url = %base_url, error = %e, "Readability pass failed");
                None
            }
        }
    }
}

/// The prepared region with a nested navigation block cut out.
fn narrowed_region(doc: &SanitizedDocument) -> String {
    let region = region_html(doc);
    if !doc.classification().nav_nested_in_content() {
        return region;
    }
    let fragment = parse_document(&region);
    for nav in fragment.select_all(&format!("[{NAV_MARKER}]")) {
        nav.detach();
    }
    fragment
        .select_one("body")
        .unwrap_or(fragment)
        .inner_html()
}

impl ContentExtractor for ReadabilityExtractor {
    fn name(&self) -> &'static str {
        "readability"
    }

    fn extract_prepared(&self, doc: &SanitizedDocument) -> Option<String> {
        self.extract_article(&narrowed_region(doc), doc.base_url())
    }

    fn extract(&self, doc: &SanitizedDocument) -> String {
        region_html(doc)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sanitize::{Sanitizer, CONTENT_MARKER};

    fn prose(topic: &str, sentences: usize) -> String {
        format!("The {topic} report covers the harbour, the old mill and the new bridge in some detail. ")
            .repeat(sentences)
    }

    #[test]
    fn test_negative_class_block_left_out() {
        let html = format!(
            r#"<div class="article-body"><p>{}</p><p>{}</p></div>
<div class="comments sidebar"><p>{}</p><p>{}</p><p>{}</p></div>"#,
            prose("story", 3),
            prose("story", 3),
            prose("reader", 2),
            prose("reader", 2),
            prose("reader", 2)
        );
        let article = ReadabilityExtractor
            .extract_article(&html, "https://example.com/story")
            .unwrap();

        assert!(article.contains("The story report"));
        assert!(!article.contains("The reader report"));
    }

    #[test]
    fn test_picks_prose_over_link_list() {
        let links: String = (0..20)
            .map(|i| format!("<li><a href=\"https://example.com/x{i}\">Link number {i} to somewhere</a></li>"))
            .collect();
        let html = format!(
            "<div id=\"links\"><ul>{links}</ul></div><div id=\"story\"><p>{}</p><p>{}</p><p>{}</p></div>",
            prose("story", 4),
            prose("story", 5),
            prose("story", 3)
        );
        let article = ReadabilityExtractor
            .extract_article(&html, "https://example.com/")
            .unwrap();

        assert!(article.contains("The story report"));
        assert!(!article.contains("Link number"));
    }

    #[test]
    fn test_unparseable_base_url_returns_none() {
        let html = format!("<p>{}</p>", prose("story", 3));
        assert_eq!(ReadabilityExtractor.extract_article(&html, "not a url"), None);
    }

    #[test]
    fn test_nested_nav_cut_from_region() {
        let doc = Sanitizer::default().prepare(
            &format!(
                r#"<body><div {CONTENT_MARKER}="1"><ul {NAV_MARKER}="1"><li><a href="https://example.com/a">Menu entry</a></li></ul><p>{}</p></div></body>"#,
                prose("story", 3)
            ),
            "https://example.com/",
        );
        let region = narrowed_region(&doc);
        assert!(!region.contains("Menu entry"));
        assert!(region.contains("The story report"));
    }

    #[test]
    fn test_finalized_extract_is_region() {
        let doc = Sanitizer::default().sanitize(
            &format!(r#"<body><div>skip</div><div {CONTENT_MARKER}="1"><p>tiny</p></div></body>"#),
            "https://example.com",
        );
        assert_eq!(ReadabilityExtractor.extract(&doc), "<p>tiny</p>");
    }
}
