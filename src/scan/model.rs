//! The interaction map: the serializable record of everything a scan found.

use serde::{Deserialize, Serialize};

/// A visible hyperlink, with its label and resolved absolute target
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Link {
    pub text: String,
    pub href: String,
}

/// The element an interaction was performed on, identified by its label.
/// The selector hint is a human-readable locator, not a CSS selector.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Trigger {
    pub text: String,
    pub selector_hint: String,
}

impl Trigger {
    pub fn from_label(label: &str) -> Self {
        Self {
            text: label.to_string(),
            selector_hint: format!("text={}", label),
        }
    }
}

/// A hover trigger together with the links it revealed
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HoverInteraction {
    pub trigger: Trigger,
    pub revealed_links: Vec<Link>,
}

/// A click trigger together with its classified outcome
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClickInteraction {
    pub trigger: Trigger,
    pub result: ClickResult,
}

/// Classified outcome of clicking an element
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ClickResult {
    /// No observable change
    None,
    /// The page navigated to a different path or host
    Navigate { target_url: String },
    /// The URL changed but only in query or fragment (tab switch, filter,
    /// in-page anchor)
    NavigateInternal { target_url: String, scroll_delta: i64 },
    /// A new tab or window was opened
    NavigateNewTab { target_url: String },
    /// The viewport scrolled without a URL change
    Scroll { scroll_delta: i64 },
    /// A modal or interstitial appeared
    Popup {
        title: String,
        nested_links: Vec<Link>,
        actions: Vec<PopupActionResult>,
    },
}

/// Outcome of clicking one action button inside a popup
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PopupActionResult {
    pub text: String,
    pub expected: PopupActionExpectation,
    pub target_url: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PopupActionExpectation {
    Navigate,
    NavigateNewTab,
    StayOnSamePage,
}

/// Complete scan output for one page
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InteractionMap {
    pub page_url: String,
    pub hover_interactions: Vec<HoverInteraction>,
    pub click_interactions: Vec<ClickInteraction>,
}

impl InteractionMap {
    pub fn new(page_url: &str) -> Self {
        Self {
            page_url: page_url.to_string(),
            hover_interactions: Vec::new(),
            click_interactions: Vec::new(),
        }
    }

    pub fn to_pretty_json(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }

    /// Write the map atomically: serialize to a sibling temp file, then
    /// rename over the destination. Readers never observe a partial file.
    pub async fn write_to_file(&self, path: &std::path::Path) -> anyhow::Result<()> {
        use anyhow::Context;

        let json = self.to_pretty_json().context("Failed to serialize interaction map")?;
        let file_name = path
            .file_name()
            .and_then(|n| n.to_str())
            .unwrap_or("interaction_map.json");
        let tmp = path.with_file_name(format!("{}.tmp", file_name));
        tokio::fs::write(&tmp, json.as_bytes())
            .await
            .with_context(|| format!("Failed to write {}", tmp.display()))?;
        tokio::fs::rename(&tmp, path)
            .await
            .with_context(|| format!("Failed to move {} into place", path.display()))?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_click_result_tagged_serialization() {
        let result = ClickResult::Navigate {
            target_url: "https://example.com/about".to_string(),
        };
        let value = serde_json::to_value(&result).unwrap();
        assert_eq!(
            value,
            json!({"type": "navigate", "target_url": "https://example.com/about"})
        );

        let result = ClickResult::Scroll { scroll_delta: -240 };
        let value = serde_json::to_value(&result).unwrap();
        assert_eq!(value, json!({"type": "scroll", "scroll_delta": -240}));

        let result = ClickResult::None;
        let value = serde_json::to_value(&result).unwrap();
        assert_eq!(value, json!({"type": "none"}));
    }

    #[test]
    fn test_navigate_internal_carries_scroll_delta() {
        let result = ClickResult::NavigateInternal {
            target_url: "https://example.com/?tab=2".to_string(),
            scroll_delta: 12,
        };
        let value = serde_json::to_value(&result).unwrap();
        assert_eq!(value["type"], "navigate_internal");
        assert_eq!(value["scroll_delta"], 12);
    }

    #[test]
    fn test_popup_serialization() {
        let result = ClickResult::Popup {
            title: "You are leaving this site".to_string(),
            nested_links: vec![Link {
                text: "Privacy policy".to_string(),
                href: "https://example.com/privacy".to_string(),
            }],
            actions: vec![PopupActionResult {
                text: "Continue".to_string(),
                expected: PopupActionExpectation::NavigateNewTab,
                target_url: Some("https://other.example.com/".to_string()),
            }],
        };
        let value = serde_json::to_value(&result).unwrap();
        assert_eq!(value["type"], "popup");
        assert_eq!(value["actions"][0]["expected"], "navigate_new_tab");
        assert_eq!(value["nested_links"][0]["text"], "Privacy policy");
    }

    #[test]
    fn test_stay_on_same_page_has_null_target() {
        let action = PopupActionResult {
            text: "Cancel".to_string(),
            expected: PopupActionExpectation::StayOnSamePage,
            target_url: None,
        };
        let value = serde_json::to_value(&action).unwrap();
        assert_eq!(
            value,
            json!({"text": "Cancel", "expected": "stay_on_same_page", "target_url": null})
        );
    }

    #[test]
    fn test_interaction_map_round_trip() {
        let mut map = InteractionMap::new("https://example.com/");
        map.hover_interactions.push(HoverInteraction {
            trigger: Trigger::from_label("Resources"),
            revealed_links: vec![Link {
                text: "FAQ".to_string(),
                href: "https://example.com/faq".to_string(),
            }],
        });
        map.click_interactions.push(ClickInteraction {
            trigger: Trigger::from_label("Back to top"),
            result: ClickResult::Scroll { scroll_delta: -800 },
        });

        let json = map.to_pretty_json().unwrap();
        let parsed: InteractionMap = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, map);
        assert_eq!(parsed.hover_interactions[0].trigger.selector_hint, "text=Resources");
    }

    #[test]
    fn test_non_ascii_preserved() {
        let map = InteractionMap::new("https://example.com/café");
        let json = map.to_pretty_json().unwrap();
        assert!(json.contains("café"));
    }
}
