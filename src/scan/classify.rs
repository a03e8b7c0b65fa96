//! Click-outcome classification.
//!
//! Classification is a pure function over what was observed around a click,
//! kept separate from the browser plumbing that gathers the observation.

use crate::scan::model::{ClickResult, Link, PopupActionResult};
use crate::scan::urlutil::same_page_path;
use crate::scan::ScanConfig;
use url::Url;

/// A detected popup, already inspected for its title, actions, and links
#[derive(Debug, Clone, PartialEq)]
pub struct PopupOutcome {
    pub title: String,
    pub nested_links: Vec<Link>,
    pub actions: Vec<PopupActionResult>,
}

/// Everything recorded around a single click trial
#[derive(Debug, Clone, PartialEq)]
pub struct ClickObservation {
    pub before_url: Url,
    pub after_url: Url,
    /// after scrollY minus before scrollY; sign preserved
    pub scroll_delta: i64,
    pub new_tab_url: Option<Url>,
    pub popup: Option<PopupOutcome>,
}

/// Classify one click observation.
///
/// Precedence: popup (when configured to win), then new tab, then URL change
/// (split into real navigation vs query/fragment-only), then scroll beyond
/// the threshold, then none. Exactly one outcome is produced.
pub fn classify_click(obs: ClickObservation, config: &ScanConfig) -> ClickResult {
    let ClickObservation {
        before_url,
        after_url,
        scroll_delta,
        new_tab_url,
        popup,
    } = obs;

    let mut popup = popup;
    if config.popup_priority {
        if let Some(p) = popup.take() {
            return ClickResult::Popup {
                title: p.title,
                nested_links: p.nested_links,
                actions: p.actions,
            };
        }
    }

    if let Some(url) = new_tab_url {
        return ClickResult::NavigateNewTab {
            target_url: url.to_string(),
        };
    }

    if after_url != before_url {
        if same_page_path(&before_url, &after_url) {
            return ClickResult::NavigateInternal {
                target_url: after_url.to_string(),
                scroll_delta,
            };
        }
        return ClickResult::Navigate {
            target_url: after_url.to_string(),
        };
    }

    // With popup priority disabled the popup still outranks scroll and none
    if let Some(p) = popup {
        return ClickResult::Popup {
            title: p.title,
            nested_links: p.nested_links,
            actions: p.actions,
        };
    }

    if scroll_delta.abs() > config.scroll_threshold_px {
        return ClickResult::Scroll { scroll_delta };
    }

    ClickResult::None
}

#[cfg(test)]
mod tests {
    use super::*;

    fn url(s: &str) -> Url {
        Url::parse(s).unwrap()
    }

    fn obs(before: &str, after: &str, delta: i64) -> ClickObservation {
        ClickObservation {
            before_url: url(before),
            after_url: url(after),
            scroll_delta: delta,
            new_tab_url: None,
            popup: None,
        }
    }

    fn popup() -> PopupOutcome {
        PopupOutcome {
            title: "Leaving site".to_string(),
            nested_links: vec![],
            actions: vec![],
        }
    }

    #[test]
    fn test_scroll_threshold_is_strict() {
        let config = ScanConfig::default();
        let result = classify_click(obs("https://a.com/", "https://a.com/", 30), &config);
        assert_eq!(result, ClickResult::None);

        let result = classify_click(obs("https://a.com/", "https://a.com/", 31), &config);
        assert_eq!(result, ClickResult::Scroll { scroll_delta: 31 });
    }

    #[test]
    fn test_scroll_delta_sign_preserved() {
        let config = ScanConfig::default();
        let result = classify_click(obs("https://a.com/", "https://a.com/", -500), &config);
        assert_eq!(result, ClickResult::Scroll { scroll_delta: -500 });
    }

    #[test]
    fn test_path_change_is_navigate() {
        let config = ScanConfig::default();
        let result = classify_click(obs("https://a.com/x", "https://a.com/y", 0), &config);
        assert_eq!(
            result,
            ClickResult::Navigate {
                target_url: "https://a.com/y".to_string()
            }
        );
    }

    #[test]
    fn test_query_only_change_is_internal() {
        let config = ScanConfig::default();
        let result = classify_click(obs("https://a.com/x", "https://a.com/x?tab=2", 12), &config);
        assert_eq!(
            result,
            ClickResult::NavigateInternal {
                target_url: "https://a.com/x?tab=2".to_string(),
                scroll_delta: 12,
            }
        );
    }

    #[test]
    fn test_fragment_only_change_is_internal() {
        let config = ScanConfig::default();
        let result = classify_click(obs("https://a.com/x", "https://a.com/x#faq", 900), &config);
        assert!(matches!(result, ClickResult::NavigateInternal { .. }));
    }

    #[test]
    fn test_popup_wins_over_navigation_by_default() {
        let config = ScanConfig::default();
        let mut o = obs("https://a.com/x", "https://a.com/y", 0);
        o.popup = Some(popup());
        let result = classify_click(o, &config);
        assert!(matches!(result, ClickResult::Popup { .. }));
    }

    #[test]
    fn test_popup_priority_can_be_disabled() {
        let config = ScanConfig {
            popup_priority: false,
            ..ScanConfig::default()
        };
        let mut o = obs("https://a.com/x", "https://a.com/y", 0);
        o.popup = Some(popup());
        let result = classify_click(o, &config);
        assert!(matches!(result, ClickResult::Navigate { .. }));

        // Without a URL change the popup is still reported
        let mut o = obs("https://a.com/x", "https://a.com/x", 600);
        o.popup = Some(popup());
        let result = classify_click(o, &config);
        assert!(matches!(result, ClickResult::Popup { .. }));
    }

    #[test]
    fn test_new_tab_wins_over_url_change() {
        let config = ScanConfig::default();
        let mut o = obs("https://a.com/x", "https://a.com/y", 0);
        o.new_tab_url = Some(url("https://other.com/doc"));
        let result = classify_click(o, &config);
        assert_eq!(
            result,
            ClickResult::NavigateNewTab {
                target_url: "https://other.com/doc".to_string()
            }
        );
    }

    #[test]
    fn test_no_change_is_none() {
        let config = ScanConfig::default();
        let result = classify_click(obs("https://a.com/", "https://a.com/", 0), &config);
        assert_eq!(result, ClickResult::None);
    }
}
