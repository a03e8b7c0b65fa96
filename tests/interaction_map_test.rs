//! Interaction-map output format tests: the JSON a scan writes is the
//! contract consumed by the Gherkin generation stage.

use interaction_scout::{
    ClickInteraction, ClickResult, HoverInteraction, InteractionMap, Link,
    PopupActionExpectation, PopupActionResult, Trigger,
};

fn sample_map() -> InteractionMap {
    let mut map = InteractionMap::new("https://example.com/stories/");
    map.hover_interactions.push(HoverInteraction {
        trigger: Trigger::from_label("Resources"),
        revealed_links: vec![
            Link {
                text: "FAQ".to_string(),
                href: "https://example.com/faq".to_string(),
            },
            Link {
                text: "Downloads".to_string(),
                href: "https://example.com/downloads".to_string(),
            },
        ],
    });
    map.click_interactions.push(ClickInteraction {
        trigger: Trigger::from_label("See full prescribing information"),
        result: ClickResult::NavigateNewTab {
            target_url: "https://docs.example.com/pi.pdf".to_string(),
        },
    });
    map.click_interactions.push(ClickInteraction {
        trigger: Trigger::from_label("Visit patient support"),
        result: ClickResult::Popup {
            title: "You are now leaving this website".to_string(),
            nested_links: vec![],
            actions: vec![
                PopupActionResult {
                    text: "Continue".to_string(),
                    expected: PopupActionExpectation::Navigate,
                    target_url: Some("https://support.example.com/".to_string()),
                },
                PopupActionResult {
                    text: "Cancel".to_string(),
                    expected: PopupActionExpectation::StayOnSamePage,
                    target_url: None,
                },
            ],
        },
    });
    map
}

#[test]
fn test_map_top_level_shape() {
    let value = serde_json::to_value(sample_map()).unwrap();
    assert_eq!(value["page_url"], "https://example.com/stories/");
    assert!(value["hover_interactions"].is_array());
    assert!(value["click_interactions"].is_array());
}

#[test]
fn test_outcome_variants_use_snake_case_tags() {
    let value = serde_json::to_value(sample_map()).unwrap();
    assert_eq!(value["click_interactions"][0]["result"]["type"], "navigate_new_tab");
    assert_eq!(value["click_interactions"][1]["result"]["type"], "popup");
    assert_eq!(
        value["click_interactions"][1]["result"]["actions"][1]["expected"],
        "stay_on_same_page"
    );
}

#[test]
fn test_selector_hint_derived_from_label() {
    let value = serde_json::to_value(sample_map()).unwrap();
    assert_eq!(
        value["hover_interactions"][0]["trigger"]["selector_hint"],
        "text=Resources"
    );
}

#[test]
fn test_map_survives_round_trip() {
    let map = sample_map();
    let json = map.to_pretty_json().unwrap();
    let parsed: InteractionMap = serde_json::from_str(&json).unwrap();
    assert_eq!(parsed, map);
}

#[tokio::test]
async fn test_write_to_file_is_complete_and_pretty() {
    let dir = std::env::temp_dir().join(format!(
        "scout-map-test-{}",
        std::time::SystemTime::now()
            .duration_since(std::time::UNIX_EPOCH)
            .unwrap()
            .as_nanos()
    ));
    std::fs::create_dir_all(&dir).unwrap();
    let path = dir.join("homepage_interactions.json");

    let map = sample_map();
    map.write_to_file(&path).await.unwrap();

    let written = std::fs::read_to_string(&path).unwrap();
    // Pretty-printed, and no temp file left behind
    assert!(written.contains("\n  \"page_url\""));
    let parsed: InteractionMap = serde_json::from_str(&written).unwrap();
    assert_eq!(parsed, map);
    assert_eq!(std::fs::read_dir(&dir).unwrap().count(), 1);

    std::fs::remove_dir_all(&dir).unwrap();
}
