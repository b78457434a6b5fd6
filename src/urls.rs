//! URL helpers for link resolution and structural comparison.

use url::Url;

/// Resolve an href against a base URL, returning an absolute http(s) URL.
///
/// Returns `None` for empty hrefs, in-page anchors, and anything that does
/// not resolve to an http(s) URL with a host.
#[must_use]
pub fn resolve_href(base: &Url, href: &str) -> Option<Url> {
    let href = href.trim();
    if href.is_empty() || href.starts_with('#') {
        return None;
    }

    let resolved = base.join(href).ok()?;
    if !matches!(resolved.scheme(), "http" | "https") || resolved.host_str().is_none() {
        return None;
    }
    Some(resolved)
}

/// Whether two URLs share a host.
#[must_use]
pub fn same_host(a: &Url, b: &Url) -> bool {
    a.host_str().is_some() && a.host_str() == b.host_str()
}

/// Domain root of a URL, in `scheme://host/` form. Used for the Referer
/// header on fetch retries.
#[must_use]
pub fn domain_root(url: &Url) -> String {
    match url.host_str() {
        Some(host) => format!("{}://{}/", url.scheme(), host),
        None => url.to_string(),
    }
}

/// Path segments of a URL with surrounding slashes trimmed.
///
/// An empty path yields a single empty segment so that two root URLs still
/// compare as structurally equal.
#[must_use]
pub fn path_segments(url: &Url) -> Vec<String> {
    url.path()
        .trim_matches('/')
        .split('/')
        .map(str::to_string)
        .collect()
}

/// Remove every ASCII digit from a path segment.
#[must_use]
pub fn strip_digits(segment: &str) -> String {
    segment.chars().filter(|c| !c.is_ascii_digit()).collect()
}

/// Whether a string parses as an absolute http(s) URL.
#[must_use]
pub fn is_absolute_http(s: &str) -> bool {
    let s = s.trim();
    if !s.starts_with("http://") && !s.starts_with("https://") {
        return false;
    }
    Url::parse(s).is_ok_and(|u| u.host_str().is_some())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[allow(clippy::unwrap_used)]
    fn base() -> Url {
        Url::parse("https://example.com/book/index.html").unwrap()
    }

    #[test]
    fn resolve_relative_href() {
        let url = resolve_href(&base(), "ch-1.html");
        assert_eq!(
            url.map(String::from),
            Some("https://example.com/book/ch-1.html".to_string())
        );
    }

    #[test]
    fn resolve_rejects_anchors_and_empty() {
        assert!(resolve_href(&base(), "#top").is_none());
        assert!(resolve_href(&base(), "").is_none());
        assert!(resolve_href(&base(), "   ").is_none());
    }

    #[test]
    fn resolve_rejects_non_http_schemes() {
        assert!(resolve_href(&base(), "javascript:void(0)").is_none());
        assert!(resolve_href(&base(), "mailto:a@b.com").is_none());
    }

    #[test]
    fn same_host_comparison() {
        #[allow(clippy::unwrap_used)]
        let other = Url::parse("https://other.com/x").unwrap();
        #[allow(clippy::unwrap_used)]
        let same = Url::parse("https://example.com/y").unwrap();
        assert!(!same_host(&base(), &other));
        assert!(same_host(&base(), &same));
    }

    #[test]
    fn domain_root_format() {
        assert_eq!(domain_root(&base()), "https://example.com/");
    }

    #[test]
    fn path_segments_trim_slashes() {
        #[allow(clippy::unwrap_used)]
        let url = Url::parse("https://example.com/a/b/c/").unwrap();
        assert_eq!(path_segments(&url), vec!["a", "b", "c"]);
    }

    #[test]
    fn root_path_is_single_empty_segment() {
        #[allow(clippy::unwrap_used)]
        let url = Url::parse("https://example.com/").unwrap();
        assert_eq!(path_segments(&url), vec![String::new()]);
    }

    #[test]
    fn strip_digits_removes_all_digits() {
        assert_eq!(strip_digits("ch-12"), "ch-");
        assert_eq!(strip_digits("123"), "");
        assert_eq!(strip_digits("plain"), "plain");
    }

    #[test]
    fn absolute_http_detection() {
        assert!(is_absolute_http("https://example.com/x"));
        assert!(is_absolute_http("http://example.com"));
        assert!(!is_absolute_http("/relative"));
        assert!(!is_absolute_http("ftp://example.com"));
    }
}
