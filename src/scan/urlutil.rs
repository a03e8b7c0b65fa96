//! URL helpers shared by link extraction and click classification.

use url::Url;

/// Resolve an href against the page URL, discarding non-navigational values
/// (empty, pure fragments, javascript: pseudo-links).
pub fn normalize_href(base: &Url, href: Option<&str>) -> Option<Url> {
    let href = href?.trim();
    if href.is_empty() || href.starts_with('#') {
        return None;
    }
    if href.to_ascii_lowercase().starts_with("javascript:") {
        return None;
    }
    base.join(href).ok()
}

/// True when two URLs differ at most in query or fragment. Such a change is
/// an in-page state update, not a real navigation.
pub fn same_page_path(a: &Url, b: &Url) -> bool {
    a.scheme() == b.scheme()
        && a.host_str() == b.host_str()
        && a.port_or_known_default() == b.port_or_known_default()
        && a.path() == b.path()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn url(s: &str) -> Url {
        Url::parse(s).unwrap()
    }

    #[test]
    fn test_normalize_relative_href() {
        let base = url("https://example.com/stories/page");
        assert_eq!(
            normalize_href(&base, Some("/about")).unwrap().as_str(),
            "https://example.com/about"
        );
        assert_eq!(
            normalize_href(&base, Some("faq")).unwrap().as_str(),
            "https://example.com/stories/faq"
        );
        assert_eq!(
            normalize_href(&base, Some("https://other.com/x")).unwrap().as_str(),
            "https://other.com/x"
        );
    }

    #[test]
    fn test_normalize_rejects_non_navigational() {
        let base = url("https://example.com/");
        assert_eq!(normalize_href(&base, None), None);
        assert_eq!(normalize_href(&base, Some("")), None);
        assert_eq!(normalize_href(&base, Some("   ")), None);
        assert_eq!(normalize_href(&base, Some("#section")), None);
        assert_eq!(normalize_href(&base, Some("javascript:void(0)")), None);
        assert_eq!(normalize_href(&base, Some("JavaScript:void(0)")), None);
    }

    #[test]
    fn test_same_page_path_ignores_query_and_fragment() {
        let a = url("https://example.com/page");
        assert!(same_page_path(&a, &url("https://example.com/page?tab=2")));
        assert!(same_page_path(&a, &url("https://example.com/page#anchor")));
        assert!(same_page_path(&a, &url("https://example.com/page?a=1#b")));
    }

    #[test]
    fn test_same_page_path_detects_real_changes() {
        let a = url("https://example.com/page");
        assert!(!same_page_path(&a, &url("https://example.com/other")));
        assert!(!same_page_path(&a, &url("https://other.com/page")));
        assert!(!same_page_path(&a, &url("http://example.com/page")));
        assert!(!same_page_path(&a, &url("https://example.com:8443/page")));
    }
}
