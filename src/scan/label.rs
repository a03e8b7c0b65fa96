//! Element labeling.
//!
//! Labels double as stable identifiers: a trigger found on the base page is
//! relocated in a fresh session purely by its label, so extraction must be
//! deterministic. Each source is tried in order and the first non-empty,
//! length-bounded candidate wins.

use crate::browser::session::RawAnchor;
use chromiumoxide::element::Element;
use std::collections::HashSet;
use std::time::Duration;

/// Bound on clickable-element labels
pub const CLICKABLE_LABEL_MAX: usize = 150;
/// Bound on hover-trigger labels
pub const HOVER_TRIGGER_LABEL_MAX: usize = 100;
/// Bound on link texts and popup titles
pub const LINK_TEXT_MAX: usize = 200;

/// Per-source extraction timeout. A stalled CDP read on one attribute must
/// not stall the whole enumeration.
const EXTRACT_TIMEOUT: Duration = Duration::from_millis(300);

/// Attributes consulted after rendered text, in priority order
const FALLBACK_ATTRS: [&str; 5] = ["aria-label", "title", "value", "href", "id"];

/// Collapse whitespace runs and bound the length. Returns `None` for empty
/// or over-long candidates so callers fall through to the next source.
pub fn normalize_label(raw: &str, max_len: usize) -> Option<String> {
    let collapsed = raw.split_whitespace().collect::<Vec<_>>().join(" ");
    if collapsed.is_empty() || collapsed.chars().count() > max_len {
        return None;
    }
    Some(collapsed)
}

/// Deduplicate labeled items, keeping the first occurrence of each label in
/// input order, bounded by `cap`. Shared by every enumeration pass so the
/// same label can never produce two candidates.
pub fn dedup_first_seen<T>(
    items: impl IntoIterator<Item = (String, T)>,
    cap: usize,
) -> Vec<(String, T)> {
    let mut seen: HashSet<String> = HashSet::new();
    let mut out = Vec::new();
    for (label, value) in items {
        if out.len() >= cap {
            break;
        }
        if seen.insert(label.clone()) {
            out.push((label, value));
        }
    }
    out
}

/// Label for an anchor snapshotted via page JavaScript
pub fn anchor_label(anchor: &RawAnchor, max_len: usize) -> Option<String> {
    normalize_label(&anchor.text, max_len)
        .or_else(|| {
            anchor
                .aria_label
                .as_deref()
                .and_then(|s| normalize_label(s, max_len))
        })
        .or_else(|| {
            anchor
                .title
                .as_deref()
                .and_then(|s| normalize_label(s, max_len))
        })
        .or_else(|| {
            anchor
                .href
                .as_deref()
                .and_then(|s| normalize_label(s, max_len))
        })
}

/// Label for a live element handle.
///
/// Chain: rendered text, then full text content, then a fixed list of
/// attributes. Every read is individually time-bounded and any failure just
/// advances to the next source.
pub async fn element_label(el: &Element, max_len: usize) -> Option<String> {
    if let Ok(Ok(Some(text))) = tokio::time::timeout(EXTRACT_TIMEOUT, el.inner_text()).await {
        if let Some(label) = normalize_label(&text, max_len) {
            return Some(label);
        }
    }

    // innerText is empty for visually hidden text; textContent still sees it
    let text_content = tokio::time::timeout(
        EXTRACT_TIMEOUT,
        el.call_js_fn("function() { return this.textContent; }", false),
    )
    .await;
    if let Ok(Ok(ret)) = text_content {
        if let Some(text) = ret.result.value.and_then(|v| v.as_str().map(str::to_string)) {
            if let Some(label) = normalize_label(&text, max_len) {
                return Some(label);
            }
        }
    }

    for attr in FALLBACK_ATTRS {
        if let Ok(Ok(Some(value))) = tokio::time::timeout(EXTRACT_TIMEOUT, el.attribute(attr)).await
        {
            if let Some(label) = normalize_label(&value, max_len) {
                return Some(label);
            }
        }
    }

    None
}

#[cfg(test)]
mod tests {
    use super::*;

    fn anchor(text: &str, aria: Option<&str>, title: Option<&str>, href: Option<&str>) -> RawAnchor {
        RawAnchor {
            href: href.map(str::to_string),
            text: text.to_string(),
            aria_label: aria.map(str::to_string),
            title: title.map(str::to_string),
        }
    }

    #[test]
    fn test_normalize_collapses_whitespace() {
        assert_eq!(
            normalize_label("  Learn \n\t more  ", 100),
            Some("Learn more".to_string())
        );
    }

    #[test]
    fn test_normalize_rejects_empty_and_overlong() {
        assert_eq!(normalize_label("   \n ", 100), None);
        let long = "x".repeat(101);
        assert_eq!(normalize_label(&long, 100), None);
        let exact = "y".repeat(100);
        assert_eq!(normalize_label(&exact, 100), Some(exact));
    }

    #[test]
    fn test_anchor_label_prefers_text() {
        let a = anchor("Our story", Some("About us"), Some("About"), Some("/about"));
        assert_eq!(anchor_label(&a, 200), Some("Our story".to_string()));
    }

    #[test]
    fn test_anchor_label_falls_through_in_order() {
        let a = anchor("", Some("About us"), Some("About"), Some("/about"));
        assert_eq!(anchor_label(&a, 200), Some("About us".to_string()));

        let a = anchor("  ", None, Some("About"), Some("/about"));
        assert_eq!(anchor_label(&a, 200), Some("About".to_string()));

        let a = anchor("", None, None, Some("/about"));
        assert_eq!(anchor_label(&a, 200), Some("/about".to_string()));

        let a = anchor("", None, None, None);
        assert_eq!(anchor_label(&a, 200), None);
    }

    #[test]
    fn test_overlong_source_skipped_not_truncated() {
        let long_text = "word ".repeat(80);
        let a = anchor(&long_text, Some("Short"), None, None);
        assert_eq!(anchor_label(&a, 200), Some("Short".to_string()));
    }

    #[test]
    fn test_dedup_keeps_first_occurrence() {
        let items = vec![
            ("Learn more".to_string(), 1),
            ("Contact".to_string(), 2),
            ("Learn more".to_string(), 3),
        ];
        let deduped = dedup_first_seen(items, 50);
        assert_eq!(
            deduped,
            vec![("Learn more".to_string(), 1), ("Contact".to_string(), 2)]
        );
    }

    #[test]
    fn test_dedup_preserves_input_order() {
        let items = ["C", "A", "B", "A", "C"]
            .iter()
            .map(|l| (l.to_string(), ()));
        let labels: Vec<String> = dedup_first_seen(items, 50)
            .into_iter()
            .map(|(label, ())| label)
            .collect();
        assert_eq!(labels, vec!["C", "A", "B"]);
    }

    #[test]
    fn test_dedup_respects_cap() {
        let items = (0..10).map(|i| (format!("label-{}", i), ()));
        assert_eq!(dedup_first_seen(items, 3).len(), 3);
    }
}
