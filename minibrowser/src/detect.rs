//! Heuristic navigation/content classification.
//!
//! Candidates are collected from ordered rule tables, measured, scored and
//! filtered; the highest score wins and the first candidate keeps a tie.
//! Winners are tagged with the structural marker attributes so they can be
//! found again after the tree is rewritten.

use kuchikiki::{NodeRef, Selectors};
use tracing::{debug, warn};

use crate::config::DetectorConfig;
use crate::dom::{collapse_whitespace, NodeExt};
use crate::models::BlockMetrics;
use crate::sanitize::{SanitizedDocument, CONTENT_MARKER, NAV_MARKER};

/// One heuristic: which blocks it applies to, how they score, and which are
/// ruled out.
#[derive(Debug, Clone, Copy)]
pub struct DetectionRule {
    /// CSS selector for candidate blocks.
    pub selector: &'static str,
    /// Score of a measured block; higher is better.
    pub score: fn(&BlockMetrics) -> f64,
    /// Whether a measured block is ruled out.
    pub exclude: fn(&BlockMetrics, &DetectorConfig) -> bool,
}

impl DetectionRule {
    const fn nav(selector: &'static str) -> Self {
        Self {
            selector,
            score: nav_score,
            exclude: nav_excluded,
        }
    }

    const fn content(selector: &'static str) -> Self {
        Self {
            selector,
            score: content_score,
            exclude: content_excluded,
        }
    }

    const fn fallback(selector: &'static str) -> Self {
        Self {
            selector,
            score: content_score,
            exclude: fallback_excluded,
        }
    }
}

/// Navigation candidates.
pub const NAV_RULES: &[DetectionRule] = &[
    DetectionRule::nav("nav"),
    DetectionRule::nav("[role=\"navigation\"]"),
    DetectionRule::nav("[class*=\"nav\"]"),
    DetectionRule::nav("[class*=\"menu\"]"),
    DetectionRule::nav("[id*=\"nav\"]"),
    DetectionRule::nav("[id*=\"menu\"]"),
];

/// Main-content candidates.
pub const CONTENT_RULES: &[DetectionRule] = &[
    DetectionRule::content("main"),
    DetectionRule::content("article"),
    DetectionRule::content("[id*=\"content\"]"),
    DetectionRule::content("[class*=\"content\"]"),
    DetectionRule::content("[class*=\"post\"]"),
    DetectionRule::content("[class*=\"entry\"]"),
    DetectionRule::content("[id*=\"main\"]"),
];

/// Content candidates tried when no [`CONTENT_RULES`] candidate survives.
pub const FALLBACK_RULES: &[DetectionRule] = &[
    DetectionRule::fallback("main"),
    DetectionRule::fallback("article"),
    DetectionRule::fallback("section"),
    DetectionRule::fallback("div"),
];

#[allow(clippy::cast_precision_loss)]
fn nav_score(m: &BlockMetrics) -> f64 {
    m.link_density * 1000.0 + m.link_count as f64 * 40.0
        - m.paragraph_count as f64 * 30.0
        - m.text_length as f64 * 0.05
}

fn nav_excluded(m: &BlockMetrics, config: &DetectorConfig) -> bool {
    m.link_count < config.nav_min_links || m.link_density < config.nav_min_link_density
}

#[allow(clippy::cast_precision_loss)]
fn content_score(m: &BlockMetrics) -> f64 {
    m.text_length as f64 + m.paragraph_count as f64 * 200.0 - m.link_density * 200.0
}

fn content_excluded(m: &BlockMetrics, config: &DetectorConfig) -> bool {
    m.text_length < config.content_min_text
        || (m.link_density > config.link_farm_density && m.link_count > config.link_farm_min_links)
}

fn fallback_excluded(m: &BlockMetrics, config: &DetectorConfig) -> bool {
    m.text_length <= config.fallback_min_text || content_excluded(m, config)
}

/// The detected regions of one document.
///
/// The two regions never overlap: content is never the navigation block,
/// never inside it and never around it.
#[derive(Debug, Clone, Default)]
pub struct StructureClassification {
    /// Root of the navigation block.
    pub nav_region: Option<NodeRef>,
    /// Root of the main content block.
    pub content_region: Option<NodeRef>,
}

impl StructureClassification {
    /// Whether the navigation block sits inside the content block.
    #[must_use]
    pub fn nav_nested_in_content(&self) -> bool {
        match (&self.nav_region, &self.content_region) {
            (Some(nav), Some(content)) => content.contains_node(nav),
            _ => false,
        }
    }
}

/// Measures a block; `None` when its text is empty.
#[must_use]
pub fn measure_block(node: &NodeRef) -> Option<BlockMetrics> {
    let text = node.normalized_text();
    if text.is_empty() {
        return None;
    }
    let links = node.descendants_named("a");
    let link_text: String = links.iter().map(NodeRef::text_contents).collect();
    Some(BlockMetrics::new(
        text.chars().count(),
        collapse_whitespace(&link_text).chars().count(),
        node.descendants_named("p").len(),
        links.len(),
    ))
}

struct Candidate {
    node: NodeRef,
    metrics: BlockMetrics,
    rule: DetectionRule,
}

/// Classifies documents into navigation and content regions.
#[derive(Debug, Clone, Default)]
pub struct StructureDetector {
    config: DetectorConfig,
}

impl StructureDetector {
    /// Creates a detector with the given thresholds.
    #[must_use]
    pub fn new(config: DetectorConfig) -> Self {
        Self { config }
    }

    /// Gets the thresholds.
    #[must_use]
    pub fn config(&self) -> &DetectorConfig {
        &self.config
    }

    /// Classifies `doc` and marks the winners.
    ///
    /// Expects a document from [`crate::sanitize::Sanitizer::prepare`]; markers
    /// already present in the markup are cleared first.
    pub fn detect(&self, doc: &SanitizedDocument) -> StructureClassification {
        let root = doc.root();
        clear_markers(root);

        let nav_candidates = collect(root, NAV_RULES);
        let nav = self.choose(&nav_candidates, None);

        let content_candidates = collect(root, CONTENT_RULES);
        let mut content = self.choose(&content_candidates, nav.map(|c| &c.node));
        let mut fallback_candidates = Vec::new();
        if content.is_none() {
            fallback_candidates = collect(root, FALLBACK_RULES);
            content = self.choose(&fallback_candidates, nav.map(|c| &c.node));
        }

        if let Some(c) = nav {
            c.node.set_attr(NAV_MARKER, "1");
        }
        if let Some(c) = content {
            c.node.set_attr(CONTENT_MARKER, "1");
        }

        debug!(
            base_url = %doc.base_url(),
            nav_candidates = nav_candidates.len(),
            content_candidates = content_candidates.len(),
            fallback_candidates = fallback_candidates.len(),
            nav_links = nav.map(|c| c.metrics.link_count),
            content_text = content.map(|c| c.metrics.text_length),
            "Detected page structure"
        );

        StructureClassification {
            nav_region: nav.map(|c| c.node.clone()),
            content_region: content.map(|c| c.node.clone()),
        }
    }

    fn choose<'a>(&self, candidates: &'a [Candidate], nav: Option<&NodeRef>) -> Option<&'a Candidate> {
        let mut best: Option<(&Candidate, f64)> = None;
        for candidate in candidates {
            if let Some(nav) = nav {
                if nav.contains_node(&candidate.node) || candidate.node.contains_node(nav) {
                    continue;
                }
            }
            if (candidate.rule.exclude)(&candidate.metrics, &self.config) {
                continue;
            }
            let score = (candidate.rule.score)(&candidate.metrics);
            if best.map_or(true, |(_, best_score)| score > best_score) {
                best = Some((candidate, score));
            }
        }
        best.map(|(c, _)| c)
    }
}

fn clear_markers(root: &NodeRef) {
    for node in root.select_all(&format!("[{NAV_MARKER}], [{CONTENT_MARKER}]")) {
        node.remove_attr(NAV_MARKER);
        node.remove_attr(CONTENT_MARKER);
    }
}

/// Candidates in document order; each element is measured once, under the
/// first rule that matches it.
fn collect(root: &NodeRef, rules: &[DetectionRule]) -> Vec<Candidate> {
    let compiled: Vec<(DetectionRule, Selectors)> = rules
        .iter()
        .filter_map(|rule| match Selectors::compile(rule.selector) {
            Ok(selectors) => Some((*rule, selectors)),
            Err(()) => {
                warn!(selector = rule.selector, "Skipping unparseable detection selector");
                None
            }
        })
        .collect();

    root.descendants()
        .filter_map(|node| {
            let element = node.clone().into_element_ref()?;
            let rule = compiled
                .iter()
                .find(|(_, selectors)| selectors.matches(&element))
                .map(|(rule, _)| *rule)?;
            let metrics = measure_block(&node)?;
            Some(Candidate {
                node,
                metrics,
                rule,
            })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sanitize::Sanitizer;

    const BASE: &str = "https://example.com/";

    fn prose(words: usize) -> String {
        "lorem ipsum, dolor sit amet ".repeat(words / 5 + 1)
    }

    fn detect(html: &str) -> (SanitizedDocument, StructureClassification) {
        let doc = Sanitizer::default().prepare(html, BASE);
        let classification = StructureDetector::default().detect(&doc);
        (doc, classification)
    }

    fn nav_links(count: usize) -> String {
        (0..count)
            .map(|i| format!("<li><a href=\"/p{i}\">Page {i}</a></li>"))
            .collect()
    }

    #[test]
    fn test_nav_and_content() {
        let paragraphs: String = (0..5).map(|_| format!("<p>{}</p>", &prose(40)[..200])).collect();
        let html = format!(
            "<body><nav><ul>{}</ul></nav><div id=\"body\">{paragraphs}</div></body>",
            nav_links(10)
        );
        let (_, c) = detect(&html);

        let nav = c.nav_region.unwrap();
        let content = c.content_region.unwrap();
        assert_eq!(nav.element_name().as_deref(), Some("nav"));
        assert_eq!(content.attr_value("id").as_deref(), Some("body"));
        assert_eq!(nav.attr_value(NAV_MARKER).as_deref(), Some("1"));
        assert_eq!(content.attr_value(CONTENT_MARKER).as_deref(), Some("1"));
    }

    #[test]
    fn test_content_candidates_preferred_over_fallback() {
        let html = format!(
            "<body><div class=\"post-body\"><p>{}</p><p>{}</p></div><div>{}</div></body>",
            prose(60),
            prose(60),
            prose(400)
        );
        let (_, c) = detect(&html);
        let content = c.content_region.unwrap();
        assert_eq!(content.attr_value("class").as_deref(), Some("post-body"));
    }

    #[test]
    fn test_content_never_overlaps_nav() {
        // The menu container is both a nav candidate and a content candidate.
        let html = format!(
            "<body><div class=\"menu content\"><ul>{}</ul></div><main><p>{}</p></main></body>",
            nav_links(30),
            prose(80)
        );
        let (_, c) = detect(&html);
        let nav = c.nav_region.unwrap();
        let content = c.content_region.unwrap();
        assert!(!nav.contains_node(&content));
        assert!(!content.contains_node(&nav));
        assert_eq!(content.element_name().as_deref(), Some("main"));
    }

    #[test]
    fn test_link_farm_only_yields_no_content() {
        let farm = |n: usize| {
            (0..n)
                .map(|i| format!("<a href=\"/l{i}\">a reasonably long link title number {i}</a> "))
                .collect::<String>()
        };
        let html = format!(
            "<body><div class=\"content\">{}</div><div>{}</div></body>",
            farm(30),
            farm(40)
        );
        let (doc, c) = detect(&html);
        assert!(c.content_region.is_none());
        assert!(doc.classification().content_region.is_none());
    }

    #[test]
    fn test_nav_thresholds() {
        // Too few links.
        let (_, c) = detect("<body><nav><a href=\"/a\">A</a><a href=\"/b\">B</a></nav></body>");
        assert!(c.nav_region.is_none());

        // Enough links but mostly prose.
        let html = format!(
            "<body><div class=\"navbar\"><a href=\"/a\">A</a><a href=\"/b\">B</a><a href=\"/c\">C</a>{}</div></body>",
            prose(100)
        );
        let (_, c) = detect(&html);
        assert!(c.nav_region.is_none());
    }

    #[test]
    fn test_first_candidate_wins_tie() {
        let block = format!("<ul>{}</ul>", nav_links(5));
        let html = format!("<body><nav id=\"first\">{block}</nav><nav id=\"second\">{block}</nav></body>");
        let (_, c) = detect(&html);
        assert_eq!(c.nav_region.unwrap().attr_value("id").as_deref(), Some("first"));
    }

    #[test]
    fn test_empty_blocks_are_not_candidates() {
        let (_, c) = detect("<body><nav>   </nav><main></main></body>");
        assert!(c.nav_region.is_none());
        assert!(c.content_region.is_none());
        assert!(measure_block(&parse("<div> \n </div>")).is_none());
    }

    #[test]
    fn test_existing_markers_are_cleared() {
        let html = format!(
            "<body><div data-browser-content-root=\"1\" class=\"sidebar\">x</div><article><p>{}</p></article></body>",
            prose(80)
        );
        let (doc, c) = detect(&html);
        let content = c.content_region.unwrap();
        assert_eq!(content.element_name().as_deref(), Some("article"));
        assert_eq!(doc.root().select_all(&format!("[{CONTENT_MARKER}]")).len(), 1);
    }

    #[test]
    fn test_measure_block() {
        let node = parse("<div><p>Hello <a href=\"/x\">world</a></p><p><a href=\"/y\">again</a></p></div>");
        let metrics = measure_block(&node).unwrap();
        assert_eq!(metrics.text_length, "Hello worldagain".len());
        assert_eq!(metrics.link_text_length, "worldagain".len());
        assert_eq!(metrics.paragraph_count, 2);
        assert_eq!(metrics.link_count, 2);
    }

    #[test]
    fn test_nested_nav_detection() {
        let html = format!(
            "<body><article><div class=\"menu\"><ul>{}</ul></div><p>{}</p><p>{}</p></article></body>",
            nav_links(8),
            prose(100),
            prose(100)
        );
        let (_, c) = detect(&html);
        // The article contains the menu, so it cannot be the content region.
        let content = c.content_region;
        assert!(c.nav_region.is_some());
        if let Some(content) = content {
            assert!(!content.contains_node(c.nav_region.as_ref().unwrap()));
        }
        assert!(!StructureClassification::default().nav_nested_in_content());
    }

    fn parse(html: &str) -> NodeRef {
        crate::dom::parse_document(html).select_one("div").unwrap()
    }
}
