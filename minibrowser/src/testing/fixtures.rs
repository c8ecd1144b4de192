//! Page fixtures shaped like real-world markup.

/// A page with a site navigation bar, a prose article and the usual clutter.
#[must_use]
pub fn article_page() -> String {
    let nav_links: String = (1..=10)
        .map(|i| format!(r#"<li><a href="/section/{i}">Section {i}</a></li>"#))
        .collect();
    let paragraphs: String = (1..=5)
        .map(|i| {
            format!(
                "<p>Paragraph {i} explains, in some detail, how the river carved the valley over \
                 thousands of years, leaving terraces that farmers still use today for vines, \
                 orchards and grazing.</p>"
            )
        })
        .collect();
    format!(
        r#"<!DOCTYPE html>
<html>
<head>
<title>Valley History</title>
<script src="/app.js"></script>
<style>body {{ color: red }}</style>
</head>
<body>
<header class="site-header"><nav id="main-nav"><ul>{nav_links}</ul></nav></header>
<main id="main">
<article class="post">
<h1>Valley History</h1>
{paragraphs}
<img src="/valley.jpg" alt="valley">
<p><a href="https://other.example/source" onclick="track()">Source</a></p>
</article>
<div class="related-posts"><a href="/related">Related</a></div>
</main>
<iframe src="https://ads.example/"></iframe>
<footer><a href="javascript:void(0)">Top</a></footer>
</body>
</html>"#
    )
}

/// A page whose only blocks are dense link lists.
#[must_use]
pub fn link_farm_page() -> String {
    let block = |prefix: &str| -> String {
        (1..=30)
            .map(|i| format!(r#"<a href="/{prefix}/{i}">{prefix} link number {i}</a> "#))
            .collect()
    };
    format!(
        "<html><head><title>Links</title></head><body><div class=\"a\">{}</div><div class=\"b\">{}</div></body></html>",
        block("alpha"),
        block("beta")
    )
}

/// A minimal search front-end results page with three hits.
#[must_use]
pub fn search_results_page() -> String {
    r#"<html><head><title>rust at DuckDuckGo</title></head><body>
<form action="/lite/" method="post"><table><tr><td><input name="q" value="rust"></td></tr></table></form>
<table>
<tr><td>1.&nbsp;</td><td><a rel="nofollow" href="https://www.rust-lang.org/" class="result-link">Rust Programming Language</a></td></tr>
<tr><td>&nbsp;</td><td class="result-snippet">A language empowering everyone to build reliable and efficient software.</td></tr>
<tr><td>&nbsp;</td><td><span class="link-text">www.rust-lang.org</span></td></tr>
<tr><td>&nbsp;</td><td>&nbsp;</td></tr>
<tr><td>2.&nbsp;</td><td><a rel="nofollow" href="//duckduckgo.com/l/?uddg=https%3A%2F%2Fdoc.rust-lang.org%2Fbook%2F&amp;rut=x" class="result-link">The Rust Programming Language Book</a></td></tr>
<tr><td>&nbsp;</td><td class="result-snippet">An introductory book about Rust.</td></tr>
<tr><td>&nbsp;</td><td><span class="link-text">doc.rust-lang.org/book</span></td></tr>
<tr><td>&nbsp;</td><td>&nbsp;</td></tr>
<tr><td>3.&nbsp;</td><td><a rel="nofollow" href="https://crates.io/" class="result-link">crates.io: Rust Package Registry</a></td></tr>
<tr><td>&nbsp;</td><td class="result-snippet">The Rust community's crate registry.</td></tr>
<tr><td>&nbsp;</td><td><span class="link-text">crates.io</span></td></tr>
</table>
</body></html>"#
        .to_string()
}
