//! URL normalization, proxy-link construction and the destination block-list.

use url::Url;

use crate::errors::BrowserError;

/// Path prefix every rewritten outbound link points at.
pub const PROXY_PREFIX: &str = "/browser/browse?url=";

/// Search engines that must be reached through the search route instead.
pub const SEARCH_ENGINE_BLOCKLIST: &[&str] = &[
    "google.com",
    "google.de",
    "bing.com",
    "duckduckgo.com",
    "yahoo.com",
    "search.yahoo.com",
    "ecosia.org",
    "startpage.com",
    "ask.com",
    "baidu.com",
    "yandex.ru",
    "yandex.com",
    "searchencrypt.com",
    "qwant.com",
    "swisscows.com",
];

const DANGEROUS_SCHEMES: &[&str] = &["javascript:", "vbscript:", "data:"];

/// Normalizes user input into an absolute `http(s)` URL.
///
/// Bare hosts and paths get an `https://` prefix; inputs that already carry
/// an `http`/`https` scheme are returned unchanged, so the operation is
/// idempotent.
pub fn normalize_url(input: &str) -> Result<String, BrowserError> {
    let trimmed = input.trim();
    if trimmed.is_empty() {
        return Err(BrowserError::invalid_input("no URL given"));
    }

    let candidate = if is_http_url(trimmed) {
        trimmed.to_string()
    } else if trimmed.contains("://") {
        return Err(BrowserError::invalid_input(format!(
            "unsupported scheme in {trimmed}"
        )));
    } else {
        format!("https://{}", trimmed.trim_start_matches('/'))
    };

    match Url::parse(&candidate) {
        Ok(parsed) if parsed.host_str().is_some_and(|h| !h.is_empty()) => Ok(candidate),
        Ok(_) => Err(BrowserError::invalid_input(format!("{trimmed} has no host"))),
        Err(e) => Err(BrowserError::invalid_input(format!("{trimmed}: {e}"))),
    }
}

/// Whether `value` starts with an `http://` or `https://` scheme.
#[must_use]
pub fn is_http_url(value: &str) -> bool {
    let lower = value
        .trim_start()
        .chars()
        .take(8)
        .collect::<String>()
        .to_ascii_lowercase();
    lower.starts_with("http://") || lower.starts_with("https://")
}

/// Whether `value` is a proxy link as [`proxy_link`] builds it: the prefix
/// followed by one fully encoded `http(s)` URL.
#[must_use]
pub fn is_proxy_link(value: &str) -> bool {
    value.strip_prefix(PROXY_PREFIX).is_some_and(|target| {
        !target.contains(['&', '#'])
            && urlencoding::decode(target).is_ok_and(|decoded| is_http_url(&decoded))
    })
}

/// Builds the proxy link for an absolute URL.
#[must_use]
pub fn proxy_link(absolute_url: &str) -> String {
    format!("{PROXY_PREFIX}{}", urlencoding::encode(absolute_url))
}

/// Resolves `value` against `base`, returning `None` when it cannot be parsed.
#[must_use]
pub fn resolve_against(base: &Url, value: &str) -> Option<String> {
    base.join(value.trim()).ok().map(String::from)
}

/// Whether an attribute value uses a scheme that can execute code.
///
/// Browsers ignore embedded whitespace and control characters in schemes,
/// so those are dropped before comparing.
#[must_use]
pub fn has_dangerous_scheme(value: &str) -> bool {
    let compact: String = value
        .chars()
        .filter(|c| !c.is_whitespace() && !c.is_control())
        .take(16)
        .collect::<String>()
        .to_ascii_lowercase();
    DANGEROUS_SCHEMES.iter().any(|s| compact.starts_with(s))
}

/// Strips the scheme and `://` from a URL for display.
#[must_use]
pub fn strip_scheme(url: &str) -> &str {
    url.split_once("://").map_or(url, |(_, rest)| rest)
}

/// Returns the block-listed domain `host` falls under, if any.
///
/// A host matches when it equals a listed domain or ends with `.` + domain.
#[must_use]
pub fn blocked_domain(host: &str) -> Option<&'static str> {
    let host = host.trim_end_matches('.').to_ascii_lowercase();
    SEARCH_ENGINE_BLOCKLIST.iter().copied().find(|domain| {
        host == *domain
            || host
                .strip_suffix(domain)
                .is_some_and(|prefix| prefix.ends_with('.'))
    })
}

/// Rejects destinations that are search engines.
///
/// Runs at the request boundary, before any fetch.
pub fn check_destination(url: &str) -> Result<(), BrowserError> {
    let parsed = Url::parse(url).map_err(|e| BrowserError::invalid_input(format!("{url}: {e}")))?;
    let host = parsed.host_str().unwrap_or_default();
    if blocked_domain(host).is_some() {
        return Err(BrowserError::blocked_host(host));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_normalize_bare_host() {
        assert_eq!(normalize_url("example.com").unwrap(), "https://example.com");
        assert_eq!(
            normalize_url("  example.com/a/b?c=1 ").unwrap(),
            "https://example.com/a/b?c=1"
        );
    }

    #[test]
    fn test_normalize_is_idempotent() {
        for input in ["http://example.com/x", "https://example.com", "example.org/path"] {
            let once = normalize_url(input).unwrap();
            assert_eq!(normalize_url(&once).unwrap(), once);
        }
        assert_eq!(normalize_url("HTTP://Example.com").unwrap(), "HTTP://Example.com");
    }

    #[test]
    fn test_normalize_rejects_bad_input() {
        assert!(matches!(normalize_url(""), Err(BrowserError::InvalidInput(_))));
        assert!(matches!(normalize_url("   "), Err(BrowserError::InvalidInput(_))));
        assert!(matches!(
            normalize_url("ftp://example.com"),
            Err(BrowserError::InvalidInput(_))
        ));
        assert!(matches!(normalize_url("http://"), Err(BrowserError::InvalidInput(_))));
    }

    #[test]
    fn test_proxy_link_encodes() {
        let link = proxy_link("https://example.com/a?b=c&d=e");
        assert_eq!(
            link,
            "/browser/browse?url=https%3A%2F%2Fexample.com%2Fa%3Fb%3Dc%26d%3De"
        );
        assert!(is_proxy_link(&link));
        assert!(!is_proxy_link("https://example.com"));
        assert!(!is_proxy_link("/browser/browse?url=local-page"));
        assert!(!is_proxy_link("/browser/browse?url=https%3A%2F%2Fa.org&x=1"));
    }

    #[test]
    fn test_dangerous_schemes() {
        assert!(has_dangerous_scheme("javascript:alert(1)"));
        assert!(has_dangerous_scheme("  JavaScript:alert(1)"));
        assert!(has_dangerous_scheme("java\tscript:alert(1)"));
        assert!(has_dangerous_scheme("data:text/html;base64,AAAA"));
        assert!(has_dangerous_scheme("vbscript:msgbox"));
        assert!(!has_dangerous_scheme("https://example.com"));
        assert!(!has_dangerous_scheme("/relative/path"));
    }

    #[test]
    fn test_resolve_against_base() {
        let base = Url::parse("https://example.com/dir/page.html").unwrap();
        assert_eq!(
            resolve_against(&base, "other.html").as_deref(),
            Some("https://example.com/dir/other.html")
        );
        assert_eq!(
            resolve_against(&base, "/root").as_deref(),
            Some("https://example.com/root")
        );
        assert_eq!(
            resolve_against(&base, "//cdn.example.net/x").as_deref(),
            Some("https://cdn.example.net/x")
        );
    }

    #[test]
    fn test_strip_scheme() {
        assert_eq!(strip_scheme("https://example.com/a"), "example.com/a");
        assert_eq!(strip_scheme("example.com"), "example.com");
    }

    #[test]
    fn test_blocklist_suffix_matching() {
        assert_eq!(blocked_domain("google.com"), Some("google.com"));
        assert_eq!(blocked_domain("maps.google.com"), Some("google.com"));
        assert_eq!(blocked_domain("WWW.BING.COM"), Some("bing.com"));
        assert_eq!(blocked_domain("notgoogle.com"), None);
        assert_eq!(blocked_domain("example.com"), None);
    }

    #[test]
    fn test_check_destination() {
        assert!(check_destination("https://example.com/page").is_ok());
        assert_eq!(
            check_destination("https://www.google.com/search?q=x"),
            Err(BrowserError::blocked_host("www.google.com"))
        );
        assert_eq!(
            check_destination("https://lite.duckduckgo.com/lite/"),
            Err(BrowserError::blocked_host("lite.duckduckgo.com"))
        );
    }
}
