//! Content extraction strategies.
//!
//! Navigation always comes from the structure detector; an extractor only
//! decides what goes into the content cell.

mod article;

pub use article::ReadabilityExtractor;

use crate::config::ExtractionMode;
use crate::dom::NodeExt;
use crate::sanitize::SanitizedDocument;

/// Produces the content markup of a sanitized, classified document.
pub trait ContentExtractor: Send + Sync {
    /// Strategy name for logging.
    fn name(&self) -> &'static str;

    /// Runs on the prepared, classified document while `class` and `id` are
    /// still present. Markup returned here replaces [`extract`](Self::extract)
    /// and is finalized by the caller.
    fn extract_prepared(&self, _doc: &SanitizedDocument) -> Option<String> {
        None
    }

    /// Content HTML for the document.
    fn extract(&self, doc: &SanitizedDocument) -> String;
}

/// Returns the content region's markup, or the body's when no region was found.
#[derive(Debug, Clone, Copy, Default)]
pub struct HeuristicExtractor;

impl ContentExtractor for HeuristicExtractor {
    fn name(&self) -> &'static str {
        "heuristic"
    }

    fn extract(&self, doc: &SanitizedDocument) -> String {
        region_html(doc)
    }
}

/// Markup of the marked content region, falling back to the body.
pub(crate) fn region_html(doc: &SanitizedDocument) -> String {
    doc.classification()
        .content_region
        .map_or_else(|| doc.body_html(), |region| region.inner_html())
}

/// Builds the extractor for a deployment's configured mode.
#[must_use]
pub fn extractor_for(mode: ExtractionMode) -> Box<dyn ContentExtractor> {
    match mode {
        ExtractionMode::Heuristic => Box::new(HeuristicExtractor),
        ExtractionMode::Readability => Box::new(ReadabilityExtractor),
    }
}
