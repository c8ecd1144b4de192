//! Table-based markup for old rendering engines.
//!
//! Output is HTML 4.01 Transitional with no scripts, CSS1-level styling only,
//! `<font face>` for typography and `bgcolor` for colours.

use html_escape::{encode_double_quoted_attribute, encode_text};
use regex::Regex;
use std::fmt::Write as _;
use std::sync::LazyLock;

use crate::config::RenderConfig;
use crate::models::RenderModel;

/// Doctype every rendered document starts with.
pub const DOCTYPE: &str = r#"<!DOCTYPE HTML PUBLIC "-//W3C//DTD HTML 4.01 Transitional//EN">"#;

const NO_NAVIGATION: &str = "<small>No navigation detected.</small>";
const ADDRESS_PROMPT: &str = "Enter an address above to start browsing.";

static MARKER_ATTRIBUTES: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#"\sdata-browser-(?:nav|content)-root="1""#).unwrap());

/// Removes marker attributes in the exact form the detector writes them.
#[must_use]
pub fn strip_markers(html: &str) -> String {
    MARKER_ATTRIBUTES.replace_all(html, "").into_owned()
}

struct Shell<'a> {
    title: &'a str,
    url: Option<&'a str>,
    header_color: &'a str,
    columns: Option<(&'a str, &'a str)>,
}

/// Renders [`RenderModel`]s and error shells.
#[derive(Debug, Clone, Default)]
pub struct LegacyRenderer {
    config: RenderConfig,
}

impl LegacyRenderer {
    /// Creates a renderer with the given configuration.
    #[must_use]
    pub fn new(config: RenderConfig) -> Self {
        Self { config }
    }

    /// Gets the configuration.
    #[must_use]
    pub fn config(&self) -> &RenderConfig {
        &self.config
    }

    /// Renders a page. A model without a source URL renders the empty shell.
    #[must_use]
    pub fn render(&self, model: &RenderModel) -> String {
        let nav = model
            .nav_html
            .as_deref()
            .filter(|html| !html.trim().is_empty())
            .unwrap_or(NO_NAVIGATION);
        self.shell(&Shell {
            title: &model.title,
            url: model.source_url.as_deref(),
            header_color: &self.config.header_color,
            columns: model
                .source_url
                .as_ref()
                .map(|_| (nav, model.content_html.as_str())),
        })
    }

    /// Renders an error shell with the message in the content cell.
    #[must_use]
    pub fn render_error(&self, title: &str, url: Option<&str>, message: &str) -> String {
        let content = format!("<p><b>{}</b></p>", encode_text(message));
        self.shell(&Shell {
            title,
            url,
            header_color: &self.config.error_color,
            columns: Some(("&nbsp;", content.as_str())),
        })
    }

    fn shell(&self, shell: &Shell<'_>) -> String {
        let font = encode_double_quoted_attribute(&self.config.font_family);
        let title = encode_text(shell.title);
        let mut html = String::with_capacity(4096);

        let _ = writeln!(html, "{DOCTYPE}");
        html.push_str("<html>\n<head>\n");
        html.push_str("<meta http-equiv=\"Content-Type\" content=\"text/html; charset=UTF-8\">\n");
        let _ = writeln!(html, "<title>{title}</title>");
        let _ = writeln!(
            html,
            "<style type=\"text/css\">\nbody {{ font-family: {font}; }}\nul {{ list-style-type: none; }}\n</style>"
        );
        html.push_str("</head>\n<body>\n");
        let _ = writeln!(html, "<font face=\"{font}\">");

        self.toolbar(&mut html, shell.url.unwrap_or_default());

        html.push_str("<table width=\"100%\" cellpadding=\"6\" cellspacing=\"0\" border=\"0\">\n");
        let origin = shell.url.map_or_else(
            || ADDRESS_PROMPT.to_string(),
            |url| format!("Original: {}", encode_text(url)),
        );
        let _ = writeln!(
            html,
            "<tr>\n<td colspan=\"2\" align=\"center\" bgcolor=\"{}\">\n<h1>{title}</h1>\n<small>{origin}</small>\n<hr>\n</td>\n</tr>",
            encode_double_quoted_attribute(shell.header_color)
        );
        if let Some((nav, content)) = shell.columns {
            let _ = writeln!(
                html,
                "<tr>\n<td width=\"22%\" valign=\"top\" bgcolor=\"{}\">\n{nav}\n</td>\n<td width=\"78%\" valign=\"top\">\n{content}\n</td>\n</tr>",
                encode_double_quoted_attribute(&self.config.header_color)
            );
        }
        html.push_str("</table>\n</font>\n</body>\n</html>\n");

        strip_markers(&html)
    }

    fn toolbar(&self, html: &mut String, url: &str) {
        let _ = writeln!(
            html,
            "<table width=\"100%\" cellpadding=\"2\" cellspacing=\"0\" border=\"0\">\n<tr>\n\
             <td align=\"left\" width=\"100%\">\n<form action=\"/browser/browse\" method=\"get\">\n\
             <input type=\"text\" name=\"url\" size=\"60\" value=\"{}\">\n<input type=\"submit\" value=\"Open\">\n</form>\n</td>\n\
             <td align=\"left\" valign=\"middle\">\n<form action=\"/browser/search\" method=\"get\">\n\
             <input type=\"text\" name=\"url\" size=\"20\">\n<input type=\"submit\" value=\"Search\">\n</form>\n</td>\n\
             <td align=\"right\" valign=\"middle\">\n<form action=\"/\" method=\"get\">\n\
             <input type=\"submit\" value=\"Close\">\n</form>\n</td>\n</tr>\n</table>\n<hr>",
            encode_double_quoted_attribute(url)
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn model() -> RenderModel {
        RenderModel::for_page("https://example.com/a?b=1&c=2", Some("Tom & <Jerry>".to_string()))
            .with_nav_html(r#"<ul data-browser-nav-root="1"><li><a href="/browser/browse?url=x">x</a></li></ul>"#)
            .with_content_html(r#"<div data-browser-content-root="1"><p>Body</p></div>"#)
    }

    #[test]
    fn test_doctype_prefix() {
        let html = LegacyRenderer::default().render(&model());
        assert!(html.starts_with(DOCTYPE));
    }

    #[test]
    fn test_exactly_one_toolbar_and_content_table() {
        let html = LegacyRenderer::default().render(&model());
        assert_eq!(html.matches("<table").count(), 2);
        assert_eq!(html.matches("action=\"/browser/browse\"").count(), 1);
        assert_eq!(html.matches("action=\"/browser/search\"").count(), 1);
        assert_eq!(html.matches("action=\"/\"").count(), 1);
    }

    #[test]
    fn test_title_and_url_escaped() {
        let html = LegacyRenderer::default().render(&model());
        assert!(html.contains("<h1>Tom &amp; &lt;Jerry&gt;</h1>"));
        assert!(html.contains("<title>Tom &amp; &lt;Jerry&gt;</title>"));
        assert!(html.contains("Original: https://example.com/a?b=1&amp;c=2"));
        assert!(html.contains("value=\"https://example.com/a?b=1&amp;c=2\""));
        assert!(!html.contains("<Jerry>"));
    }

    #[test]
    fn test_markers_stripped() {
        let html = LegacyRenderer::default().render(&model());
        assert!(!html.contains("data-browser-"));
        assert!(html.contains("<ul><li>"));
        assert!(html.contains("<div><p>Body</p></div>"));
    }

    #[test]
    fn test_layout_cells() {
        let html = LegacyRenderer::default().render(&model());
        assert!(html.contains("<td width=\"22%\" valign=\"top\" bgcolor=\"#dbeafe\">"));
        assert!(html.contains("<td width=\"78%\" valign=\"top\">"));
        assert!(html.contains("<font face=\"Verdana, Arial, Helvetica, sans-serif\">"));
        assert!(!html.contains("<script"));
        assert!(!html.contains("@media"));
    }

    #[test]
    fn test_missing_nav_placeholder() {
        let model = RenderModel::for_page("https://example.com", None).with_content_html("<p>x</p>");
        let html = LegacyRenderer::default().render(&model);
        assert!(html.contains("No navigation detected."));
        assert!(html.contains("<h1>example.com</h1>"));
    }

    #[test]
    fn test_empty_shell() {
        let html = LegacyRenderer::default().render(&RenderModel::empty("Browser"));
        assert!(html.contains(ADDRESS_PROMPT));
        assert!(!html.contains("width=\"22%\""));
        assert!(html.contains("name=\"url\" size=\"60\" value=\"\""));
        assert_eq!(html.matches("<table").count(), 2);
    }

    #[test]
    fn test_error_shell() {
        let renderer = LegacyRenderer::default();
        let html = renderer.render_error(
            "Search engine blocked",
            Some("https://www.google.com"),
            "Use the <search> form",
        );
        assert!(html.starts_with(DOCTYPE));
        assert!(html.contains("bgcolor=\"#fecaca\""));
        assert!(html.contains("<h1>Search engine blocked</h1>"));
        assert!(html.contains("Use the &lt;search&gt; form"));
    }

    #[test]
    fn test_strip_markers_exact_form_only() {
        assert_eq!(
            strip_markers(r#"<div data-browser-nav-root="1" id="x">a</div><p data-browser-content-root="1">b</p>"#),
            r#"<div id="x">a</div><p>b</p>"#
        );

        let text = r#"<p>Docs mention data-browser-nav-root="x</p><p><a href="/browser/browse?url=https%3A%2F%2Fx.org%2F">link</a> tail</p>"#;
        assert_eq!(strip_markers(text), text);
    }
}
