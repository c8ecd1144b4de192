//! Offline half of the browse pipeline: raw markup in, render model out.

use std::time::Instant;
use tracing::debug;

use crate::config::BrowserConfig;
use crate::detect::StructureDetector;
use crate::dom::NodeExt;
use crate::extract::{extractor_for, ContentExtractor};
use crate::models::{RawDocument, RenderModel};
use crate::sanitize::{SanitizedDocument, Sanitizer, NAV_MARKER};

/// Sanitizes, classifies and extracts a fetched document.
///
/// Synchronous on purpose: the parsed tree is not `Send`, so it must be
/// created and dropped between two `.await` points.
pub struct Simplifier {
    sanitizer: Sanitizer,
    detector: StructureDetector,
    extractor: Box<dyn ContentExtractor>,
}

impl std::fmt::Debug for Simplifier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Simplifier")
            .field("sanitizer", &self.sanitizer)
            .field("detector", &self.detector)
            .field("extractor", &self.extractor.name())
            .finish()
    }
}

impl Default for Simplifier {
    fn default() -> Self {
        Self::from_config(&BrowserConfig::default())
    }
}

impl Simplifier {
    /// Creates a simplifier from explicit parts.
    #[must_use]
    pub fn new(
        sanitizer: Sanitizer,
        detector: StructureDetector,
        extractor: Box<dyn ContentExtractor>,
    ) -> Self {
        Self {
            sanitizer,
            detector,
            extractor,
        }
    }

    /// Creates a simplifier for a deployment configuration.
    #[must_use]
    pub fn from_config(config: &BrowserConfig) -> Self {
        Self::new(
            Sanitizer::new(config.sanitizer.clone()),
            StructureDetector::new(config.detector.clone()),
            extractor_for(config.extraction),
        )
    }

    /// Name of the active extraction strategy.
    #[must_use]
    pub fn extractor_name(&self) -> &'static str {
        self.extractor.name()
    }

    /// Turns `raw` into a render model shown under `source_url`.
    #[must_use]
    pub fn simplify(&self, raw: &RawDocument, source_url: &str) -> RenderModel {
        let start = Instant::now();

        let doc = self.sanitizer.prepare(&raw.html, &raw.base_url);
        let title = doc.title();
        self.detector.detect(&doc);
        let article = self.extractor.extract_prepared(&doc);
        self.sanitizer.finalize(&doc);

        self.assemble(&doc, article, title, source_url, start)
    }

    /// Builds the model from a finalized, marked document.
    ///
    /// `article` is prepared markup from the extractor's early pass; it goes
    /// through the full sanitizer before use.
    fn assemble(
        &self,
        doc: &SanitizedDocument,
        article: Option<String>,
        title: Option<String>,
        source_url: &str,
        start: Instant,
    ) -> RenderModel {
        let classification = doc.classification();
        let nav_html = classification.nav_region.as_ref().map(|nav| {
            nav.remove_attr(NAV_MARKER);
            nav.outer_html()
        });
        if classification.nav_nested_in_content() {
            if let Some(nav) = &classification.nav_region {
                nav.detach();
            }
        }
        let early = article.is_some();
        let content_html = match article {
            Some(article) => {
                let fragment = self.sanitizer.sanitize(&article, doc.base_url());
                fragment.clear_markers();
                fragment.body_html()
            }
            None => self.extractor.extract(doc),
        };
        doc.clear_markers();

        debug!(
            url = %source_url,
            extractor = self.extractor.name(),
            early_pass = early,
            has_nav = nav_html.is_some(),
            has_content_region = classification.content_region.is_some(),
            content_len = content_html.len(),
            elapsed_ms = start.elapsed().as_secs_f64() * 1000.0,
            "Simplified document"
        );

        let model = RenderModel::for_page(source_url, title).with_content_html(content_html);
        match nav_html {
            Some(nav) => model.with_nav_html(nav),
            None => model,
        }
    }
}
