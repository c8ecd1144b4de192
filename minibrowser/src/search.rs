//! Parsing and rendering of minimal search-results pages.

use html_escape::{encode_double_quoted_attribute, encode_text};
use scraper::{ElementRef, Html, Selector};
use std::fmt::Write as _;
use std::sync::LazyLock;
use tracing::debug;
use url::Url;

use crate::dom::collapse_whitespace;
use crate::models::SearchHit;
use crate::urls::PROXY_PREFIX;

static TABLE: LazyLock<Selector> = LazyLock::new(|| Selector::parse("table").unwrap());
static ROW: LazyLock<Selector> = LazyLock::new(|| Selector::parse("tr").unwrap());
static RESULT_LINK: LazyLock<Selector> = LazyLock::new(|| Selector::parse("a.result-link").unwrap());
static RESULT_SNIPPET: LazyLock<Selector> = LazyLock::new(|| Selector::parse(".result-snippet").unwrap());
static LINK_TEXT: LazyLock<Selector> = LazyLock::new(|| Selector::parse(".link-text").unwrap());

fn element_text(element: &ElementRef<'_>) -> String {
    collapse_whitespace(&element.text().collect::<String>())
}

fn has_class(element: &ElementRef<'_>, class: &str) -> bool {
    element.value().classes().any(|c| c == class)
}

fn following_rows<'a>(row: &ElementRef<'a>) -> impl Iterator<Item = ElementRef<'a>> {
    row.next_siblings().filter_map(ElementRef::wrap)
}

/// Resolves a result href to its destination.
///
/// Scheme-relative links get `https:`; redirect links carrying the target in
/// an `uddg` parameter are unwrapped.
#[must_use]
pub fn resolve_result_href(href: &str) -> String {
    let href = href.trim();
    let absolute = if href.starts_with("//") {
        format!("https:{href}")
    } else {
        href.to_string()
    };
    Url::parse(&absolute)
        .ok()
        .and_then(|parsed| {
            parsed
                .query_pairs()
                .find(|(key, _)| key == "uddg")
                .map(|(_, target)| target.trim().to_string())
        })
        .filter(|target| target.starts_with("http://") || target.starts_with("https://"))
        .unwrap_or(absolute)
}

/// Extracts organic results in list order.
///
/// The results table is the last table holding an `a.result-link`; each of
/// its rows with such a link starts one hit.
#[must_use]
pub fn parse_results(raw_html: &str) -> Vec<SearchHit> {
    let document = Html::parse_document(raw_html);
    let Some(table) = document
        .select(&TABLE)
        .filter(|t| t.select(&RESULT_LINK).next().is_some())
        .last()
    else {
        debug!("No results table found");
        return Vec::new();
    };

    let hits: Vec<SearchHit> = table
        .select(&ROW)
        .filter_map(|row| {
            let link = row.select(&RESULT_LINK).next()?;
            let href = link.value().attr("href").map(str::trim).filter(|h| !h.is_empty())?;
            let title = element_text(&link);
            if title.is_empty() {
                return None;
            }

            let mut hit = SearchHit::new(resolve_result_href(href), title);

            if let Some(next) = following_rows(&row).next() {
                let marker = next.select(&RESULT_SNIPPET).next();
                if marker.is_some() || has_class(&next, "result-snippet") {
                    let snippet = marker
                        .map(|m| element_text(&m))
                        .filter(|s| !s.is_empty())
                        .unwrap_or_else(|| element_text(&next));
                    if !snippet.is_empty() {
                        hit = hit.with_snippet(snippet);
                    }
                }
            }

            let display = following_rows(&row)
                .find_map(|r| r.select(&LINK_TEXT).next())
                .map(|l| element_text(&l))
                .filter(|d| !d.is_empty());
            if let Some(display) = display {
                hit = hit.with_display_url(display);
            }
            Some(hit)
        })
        .collect();

    debug!(hits = hits.len(), "Parsed search results");
    hits
}

/// Renders hits as a simple list linking back into the proxy.
#[must_use]
pub fn render_results(hits: &[SearchHit], local_base_url: &str) -> String {
    if hits.is_empty() {
        return "<p>No results found.</p>".to_string();
    }
    let base = encode_double_quoted_attribute(local_base_url.trim_end_matches('/'));
    let mut html = String::from("<ul>\n");
    for hit in hits {
        let shown = hit.display_url.as_deref().unwrap_or(&hit.result_url);
        let _ = writeln!(
            html,
            "<li>\n<a href=\"{base}{PROXY_PREFIX}{}\"><strong>{}</strong></a><br>\n<small>{}</small><br>",
            urlencoding::encode(&hit.result_url),
            encode_text(&hit.title),
            encode_text(shown)
        );
        if let Some(snippet) = &hit.snippet {
            let _ = writeln!(html, "<p>{}</p>", encode_text(snippet));
        }
        html.push_str("</li>\n");
    }
    html.push_str("</ul>");
    html
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    const FIXTURE: &str = r#"<html><body>
        <form><table><tr><td><input name="q"></td></tr></table></form>
        <table>
          <tr><td>1.&nbsp;</td><td><a rel="nofollow" href="https://rust-lang.org/" class="result-link">Rust Programming Language</a></td></tr>
          <tr><td>&nbsp;</td><td class="result-snippet">A language empowering everyone to build <b>reliable</b> software.</td></tr>
          <tr><td>&nbsp;</td><td><span class="link-text">rust-lang.org</span></td></tr>
          <tr><td>&nbsp;</td><td>&nbsp;</td></tr>
          <tr><td>2.&nbsp;</td><td><a rel="nofollow" href="//duckduckgo.com/l/?uddg=https%3A%2F%2Fdoc.rust-lang.org%2Fbook%2F&amp;rut=abc" class="result-link">The Rust Book</a></td></tr>
          <tr class="result-snippet"><td>&nbsp;</td><td>Learn Rust &amp; more.</td></tr>
          <tr><td>&nbsp;</td><td><span class="link-text">doc.rust-lang.org/book</span></td></tr>
          <tr><td>3.&nbsp;</td><td><a href="https://crates.io/" class="result-link">crates.io</a></td></tr>
          <tr><td>&nbsp;</td><td class="result-snippet">The Rust community's crate registry</td></tr>
          <tr><td>&nbsp;</td><td><span class="link-text">crates.io</span></td></tr>
        </table>
        <table><tr><td>footer</td></tr></table>
        </body></html>"#;

    #[test]
    fn test_parse_three_results_in_order() {
        let hits = parse_results(FIXTURE);
        assert_eq!(hits.len(), 3);

        assert_eq!(hits[0].result_url, "https://rust-lang.org/");
        assert_eq!(hits[0].title, "Rust Programming Language");
        assert_eq!(
            hits[0].snippet.as_deref(),
            Some("A language empowering everyone to build reliable software.")
        );
        assert_eq!(hits[0].display_url.as_deref(), Some("rust-lang.org"));

        assert_eq!(hits[1].result_url, "https://doc.rust-lang.org/book/");
        assert_eq!(hits[1].snippet.as_deref(), Some("Learn Rust & more."));
        assert_eq!(hits[1].display_url.as_deref(), Some("doc.rust-lang.org/book"));

        assert_eq!(hits[2].title, "crates.io");
        assert!(hits.iter().all(|h| h.snippet.is_some() && h.display_url.is_some()));
    }

    #[test]
    fn test_hits_without_url_or_title_are_skipped() {
        let html = r#"<table>
            <tr><td><a class="result-link">no href</a></td></tr>
            <tr><td><a class="result-link" href="https://a.example/"> </a></td></tr>
            <tr><td><a class="result-link" href="https://b.example/">B</a></td></tr>
            </table>"#;
        let hits = parse_results(html);
        assert_eq!(hits, vec![SearchHit::new("https://b.example/", "B")]);
    }

    #[test]
    fn test_no_results_table() {
        assert!(parse_results("<table><tr><td>nothing</td></tr></table>").is_empty());
        assert!(parse_results("").is_empty());
    }

    #[test]
    fn test_resolve_result_href() {
        assert_eq!(resolve_result_href("https://a.example/x"), "https://a.example/x");
        assert_eq!(
            resolve_result_href("//duckduckgo.com/l/?uddg=https%3A%2F%2Fb.example%2F&rut=1"),
            "https://b.example/"
        );
        assert_eq!(resolve_result_href("//c.example/y"), "https://c.example/y");
    }

    #[test]
    fn test_render_results() {
        let hits = vec![
            SearchHit::new("https://a.example/?q=1&r=2", "A <b>")
                .with_snippet("about & stuff")
                .with_display_url("a.example"),
            SearchHit::new("https://b.example/", "B"),
        ];
        let html = render_results(&hits, "http://portal.local/");

        assert_eq!(
            html,
            "<ul>\n\
             <li>\n<a href=\"http://portal.local/browser/browse?url=https%3A%2F%2Fa.example%2F%3Fq%3D1%26r%3D2\"><strong>A &lt;b&gt;</strong></a><br>\n<small>a.example</small><br>\n\
             <p>about &amp; stuff</p>\n</li>\n\
             <li>\n<a href=\"http://portal.local/browser/browse?url=https%3A%2F%2Fb.example%2F\"><strong>B</strong></a><br>\n<small>https://b.example/</small><br>\n\
             </li>\n</ul>"
        );
    }

    #[test]
    fn test_render_no_results() {
        assert_eq!(render_results(&[], "http://x"), "<p>No results found.</p>");
    }
}
