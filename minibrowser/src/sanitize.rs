//! Markup sanitization.
//!
//! Sanitizing runs in two stages so structure detection can look at the
//! document while it still carries `class`, `id` and `role`:
//!
//! 1. [`Sanitizer::prepare`] parses, strips executable markup, absolutizes
//!    URLs and removes unwanted elements.
//! 2. [`Sanitizer::finalize`] flattens semantic containers, rewrites links and
//!    forms to re-enter the proxy and strips every attribute outside the
//!    allow-list.
//!
//! [`Sanitizer::sanitize`] runs both back to back. Each step is idempotent.

use kuchikiki::NodeRef;
use tracing::debug;
use url::Url;

use crate::config::SanitizerConfig;
use crate::detect::StructureClassification;
use crate::dom::{parse_document, NodeExt};
use crate::urls::{has_dangerous_scheme, is_http_url, is_proxy_link, proxy_link, resolve_against};

/// Marker attribute placed on the detected navigation root.
pub const NAV_MARKER: &str = "data-browser-nav-root";

/// Marker attribute placed on the detected content root.
pub const CONTENT_MARKER: &str = "data-browser-content-root";

const EXECUTABLE_SELECTOR: &str = "script, object, embed, applet, base, meta[http-equiv]";

const URL_ATTRIBUTES: &[&str] = &[
    "href",
    "src",
    "action",
    "formaction",
    "poster",
    "background",
    "cite",
    "longdesc",
    "srcset",
    "data",
    "codebase",
];

const ABSOLUTIZE_TARGETS: &[(&str, &str)] = &[
    ("a[href]", "href"),
    ("form[action]", "action"),
    ("link[href]", "href"),
    ("img[src]", "src"),
    ("iframe[src]", "src"),
];

const UNWANTED_SELECTOR: &str = "script, style, noscript, iframe, link[rel~=\"stylesheet\"], \
     svg, object[type*=\"svg\"], embed[type*=\"svg\"], img, picture, figure, \
     .td_module_related_posts, .related-posts, .related-post, \
     [class*=\"related_posts\"], [class*=\"related-articles\"]";

const SEMANTIC_SELECTOR: &str = "section, article, nav, header, footer, aside, main";

/// A parsed document going through sanitization.
///
/// Wraps a mutable `kuchikiki` tree; the tree is single-threaded, so a
/// document never crosses an `.await`.
#[derive(Debug, Clone)]
pub struct SanitizedDocument {
    root: NodeRef,
    base_url: String,
}

impl SanitizedDocument {
    /// The document node.
    #[must_use]
    pub fn root(&self) -> &NodeRef {
        &self.root
    }

    /// The URL relative links were resolved against.
    #[must_use]
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// The `<body>` element, or the document node when there is none.
    #[must_use]
    pub fn body(&self) -> NodeRef {
        self.root.select_one("body").unwrap_or_else(|| self.root.clone())
    }

    /// Markup of the body's children.
    #[must_use]
    pub fn body_html(&self) -> String {
        self.body().inner_html()
    }

    /// Text of the first `<title>`, if non-empty.
    #[must_use]
    pub fn title(&self) -> Option<String> {
        self.root
            .select_one("title")
            .map(|t| t.normalized_text())
            .filter(|t| !t.is_empty())
    }

    /// Regions currently carrying the structural markers.
    ///
    /// Safe to call after [`Sanitizer::finalize`] replaced the marked nodes.
    #[must_use]
    pub fn classification(&self) -> StructureClassification {
        StructureClassification {
            nav_region: self.root.select_one(&format!("[{NAV_MARKER}]")),
            content_region: self.root.select_one(&format!("[{CONTENT_MARKER}]")),
        }
    }

    /// Removes both structural markers from every node.
    pub fn clear_markers(&self) {
        for node in self.root.select_all(&format!("[{NAV_MARKER}], [{CONTENT_MARKER}]")) {
            node.remove_attr(NAV_MARKER);
            node.remove_attr(CONTENT_MARKER);
        }
    }

    /// Serializes the whole document.
    #[must_use]
    pub fn to_html(&self) -> String {
        self.root.to_string()
    }
}

/// Runs the sanitization steps.
#[derive(Debug, Clone, Default)]
pub struct Sanitizer {
    config: SanitizerConfig,
}

impl Sanitizer {
    /// Creates a sanitizer with the given configuration.
    #[must_use]
    pub fn new(config: SanitizerConfig) -> Self {
        Self { config }
    }

    /// Gets the configuration.
    #[must_use]
    pub fn config(&self) -> &SanitizerConfig {
        &self.config
    }

    /// Full sanitization in one call.
    #[must_use]
    pub fn sanitize(&self, raw_html: &str, base_url: &str) -> SanitizedDocument {
        let doc = self.prepare(raw_html, base_url);
        self.finalize(&doc);
        doc
    }

    /// Parses and cleans the document while keeping detection hints.
    #[must_use]
    pub fn prepare(&self, raw_html: &str, base_url: &str) -> SanitizedDocument {
        let doc = SanitizedDocument {
            root: parse_document(raw_html),
            base_url: base_url.to_string(),
        };

        let stripped = strip_executable(&doc.root);
        let absolutized = if self.config.absolutize_urls {
            Url::parse(base_url).map_or(0, |base| absolutize(&doc.root, &base))
        } else {
            0
        };
        let removed = remove_all(&doc.root, UNWANTED_SELECTOR);

        debug!(
            base_url = %base_url,
            stripped,
            absolutized,
            removed,
            "Prepared document"
        );
        doc
    }

    /// Flattens, rewrites links and reduces attributes to the allow-list.
    pub fn finalize(&self, doc: &SanitizedDocument) {
        let flattened = flatten_semantic(&doc.root);
        let rewritten = rewrite_links(&doc.root);
        strip_attributes(&doc.root);
        let unwrapped = if self.config.strict_tags_only {
            unwrap_disallowed(&doc.body(), &self.config.strict_tags)
        } else {
            0
        };

        debug!(
            base_url = %doc.base_url,
            flattened,
            rewritten,
            unwrapped,
            "Finalized document"
        );
    }
}

fn remove_all(root: &NodeRef, selector: &str) -> usize {
    let nodes = root.select_all(selector);
    for node in &nodes {
        node.detach();
    }
    nodes.len()
}

fn strip_executable(root: &NodeRef) -> usize {
    let mut count = remove_all(root, EXECUTABLE_SELECTOR);
    for node in root.select_all("*") {
        for name in node.attr_names() {
            let dangerous = name.starts_with("on")
                || (URL_ATTRIBUTES.contains(&name.as_str())
                    && node.attr_value(&name).is_some_and(|v| has_dangerous_scheme(&v)));
            if dangerous {
                node.remove_attr(&name);
                count += 1;
            }
        }
    }
    count
}

fn absolutize(root: &NodeRef, base: &Url) -> usize {
    let mut count = 0;
    for (selector, attr) in ABSOLUTIZE_TARGETS {
        for node in root.select_all(selector) {
            let Some(value) = node.attr_value(attr) else {
                continue;
            };
            if value.trim().is_empty() || is_proxy_link(&value) || is_http_url(&value) {
                continue;
            }
            if let Some(absolute) = resolve_against(base, &value) {
                node.set_attr(attr, &absolute);
                count += 1;
            }
        }
    }
    count
}

fn flatten_semantic(root: &NodeRef) -> usize {
    let nodes = root.select_all(SEMANTIC_SELECTOR);
    for node in &nodes {
        node.rename_element("div");
    }
    nodes.len()
}

fn rewrite_target(node: &NodeRef, attr: &str) -> bool {
    let Some(value) = node.attr_value(attr) else {
        return false;
    };
    if is_proxy_link(&value) {
        return false;
    }
    let value = value.trim();
    if is_http_url(value) {
        node.set_attr(attr, &proxy_link(value));
    } else {
        node.remove_attr(attr);
    }
    true
}

fn rewrite_links(root: &NodeRef) -> usize {
    let mut count = 0;
    for anchor in root.select_all("a") {
        count += usize::from(rewrite_target(&anchor, "href"));
    }
    for form in root.select_all("form") {
        count += usize::from(rewrite_target(&form, "action"));
        form.set_attr("method", "get");
    }
    count
}

fn allowed_attribute(tag: &str, attr: &str) -> bool {
    if attr == NAV_MARKER || attr == CONTENT_MARKER {
        return true;
    }
    match tag {
        "a" => attr == "href",
        "form" => attr == "action" || attr == "method",
        _ => false,
    }
}

fn strip_attributes(root: &NodeRef) {
    for node in root.select_all("*") {
        let tag = node.element_name().unwrap_or_default();
        node.retain_attrs(|attr| allowed_attribute(&tag, attr));
    }
}

fn unwrap_disallowed(body: &NodeRef, allowed: &[String]) -> usize {
    let mut count = 0;
    for node in body.descendants().filter(|n| n.as_element().is_some()).collect::<Vec<_>>() {
        let tag = node.element_name().unwrap_or_default();
        let marked = node.attr_value(NAV_MARKER).is_some() || node.attr_value(CONTENT_MARKER).is_some();
        if !marked && !allowed.iter().any(|a| a.eq_ignore_ascii_case(&tag)) {
            node.unwrap_children();
            count += 1;
        }
    }
    count
}
