//! Isolated click re-probing.
//!
//! Every click trial runs in a fresh session so earlier trials cannot taint
//! the outcome: navigate to the base page, relocate the trigger by label,
//! click, observe, classify. Popup action buttons get the same treatment one
//! level deep.

use crate::browser::session::{ProbeSession, SessionFactory};
use crate::error::Result;
use crate::scan::classify::{classify_click, ClickObservation, PopupOutcome};
use crate::scan::label::{element_label, CLICKABLE_LABEL_MAX};
use crate::scan::model::{
    ClickInteraction, ClickResult, PopupActionExpectation, PopupActionResult, Trigger,
};
use crate::scan::popup::{detect_popup, find_action_by_label, popup_container};
use crate::scan::{ScanConfig, INTERACTIVE_SELECTOR};
use chromiumoxide::element::Element;
use std::time::Duration;
use url::Url;

/// Run one click trial for a label collected on the base page.
///
/// Returns `None` when the trigger cannot be relocated or the click itself
/// fails (the page changed between enumeration and re-probe). Observation
/// errors after a successful click degrade to a `none` outcome rather than
/// aborting the scan; only session acquisition failure propagates.
pub async fn probe_click(
    factory: &SessionFactory,
    base_url: &Url,
    label: &str,
    config: &ScanConfig,
) -> Result<Option<ClickInteraction>> {
    let session = factory.acquire().await?;
    log::info!("[click-test] Trigger: '{}'", label);

    let outcome = run_click_trial(&session, factory, base_url, label, config).await;
    session.release().await;

    match outcome {
        Ok(result) => Ok(result.map(|result| ClickInteraction {
            trigger: Trigger::from_label(label),
            result,
        })),
        Err(e) => {
            log::warn!("  -> Error during click test: {}", e);
            Ok(Some(ClickInteraction {
                trigger: Trigger::from_label(label),
                result: ClickResult::None,
            }))
        }
    }
}

async fn run_click_trial(
    session: &ProbeSession,
    factory: &SessionFactory,
    base_url: &Url,
    label: &str,
    config: &ScanConfig,
) -> Result<Option<ClickResult>> {
    prepare_page(session, base_url, config).await?;

    let Some(el) = find_by_label(session, label, config).await else {
        log::info!("  -> Trigger not found in fresh session");
        return Ok(None);
    };
    session.scroll_into_view(&el, Duration::from_millis(800)).await;

    let before_url = session.current_url().await?;
    let before_scroll = session.scroll_y().await;
    let before_pages = session.open_page_ids().await;

    if let Err(e) = session.force_click(&el, config.click_timeout).await {
        log::info!("  -> Click failed: {}", e);
        return Ok(None);
    }
    session.settle(config.settle_after_click_ms).await;

    let probe = detect_popup(session, base_url, config).await;
    let after_url = session.current_url().await?;
    let after_scroll = session.scroll_y().await;
    let new_tab_url = session.new_tab_url(&before_pages).await;

    let popup = match probe {
        Some(probe) => {
            log::info!("  -> Popup detected: '{}'", probe.title);
            let mut actions = Vec::new();
            if popup_is_reported(config, new_tab_url.is_some(), &before_url, &after_url) {
                for action_label in &probe.action_labels {
                    if let Some(action) =
                        probe_popup_action(factory, base_url, label, action_label, config).await
                    {
                        actions.push(action);
                    }
                }
            } else {
                log::info!("  -> Popup outranked by navigation; skipping button probes");
            }
            Some(PopupOutcome {
                title: probe.title,
                nested_links: probe.nested_links,
                actions,
            })
        }
        None => None,
    };

    let observation = ClickObservation {
        before_url,
        after_url,
        scroll_delta: after_scroll - before_scroll,
        new_tab_url,
        popup,
    };
    let result = classify_click(observation, config);
    log::info!("  -> Result: {:?}", result);
    Ok(Some(result))
}

/// Whether a detected popup will end up as the reported outcome under the
/// classification precedence. Each popup button re-probe costs a fresh
/// browser launch, so buttons are only examined when the popup will actually
/// be reported.
fn popup_is_reported(
    config: &ScanConfig,
    opened_new_tab: bool,
    before_url: &Url,
    after_url: &Url,
) -> bool {
    config.popup_priority || (!opened_new_tab && after_url == before_url)
}

/// Re-probe one popup action button in its own fresh session: reopen the
/// popup via the original trigger, click the button, and record where it
/// leads. Runs one level deep only; popups behind popup buttons are not
/// explored.
async fn probe_popup_action(
    factory: &SessionFactory,
    base_url: &Url,
    trigger_label: &str,
    action_label: &str,
    config: &ScanConfig,
) -> Option<PopupActionResult> {
    let session = match factory.acquire().await {
        Ok(s) => s,
        Err(e) => {
            log::warn!("    [popup-btn] Session launch failed: {}", e);
            return None;
        }
    };
    log::info!("    [popup-btn] Testing '{}' behind '{}'", action_label, trigger_label);

    let outcome =
        run_popup_action_trial(&session, base_url, trigger_label, action_label, config).await;
    session.release().await;

    match outcome {
        Ok(result) => result,
        Err(e) => {
            log::warn!("      -> Error during popup button test: {}", e);
            Some(PopupActionResult {
                text: action_label.to_string(),
                expected: PopupActionExpectation::StayOnSamePage,
                target_url: None,
            })
        }
    }
}

async fn run_popup_action_trial(
    session: &ProbeSession,
    base_url: &Url,
    trigger_label: &str,
    action_label: &str,
    config: &ScanConfig,
) -> Result<Option<PopupActionResult>> {
    prepare_page(session, base_url, config).await?;

    let Some(trigger) = find_by_label(session, trigger_label, config).await else {
        log::info!("      -> Trigger not found in fresh session");
        return Ok(None);
    };
    session
        .scroll_into_view(&trigger, Duration::from_millis(800))
        .await;
    session.force_click(&trigger, config.click_timeout).await?;
    session.settle(1500).await;

    let Some(container) = popup_container(session).await else {
        log::info!("      -> Popup did not reappear");
        return Ok(None);
    };
    let Some(button) = find_action_by_label(session, &container, action_label, config).await else {
        log::info!("      -> Button not found inside popup");
        return Ok(None);
    };
    session
        .scroll_into_view(&button, Duration::from_millis(800))
        .await;

    let before_url = session.current_url().await?;
    let before_pages = session.open_page_ids().await;
    session.force_click(&button, config.click_timeout).await?;
    session.settle(config.settle_after_click_ms).await;

    if let Some(new_url) = session.new_tab_url(&before_pages).await {
        log::info!("      -> Opened new tab: {}", new_url);
        return Ok(Some(PopupActionResult {
            text: action_label.to_string(),
            expected: PopupActionExpectation::NavigateNewTab,
            target_url: Some(new_url.to_string()),
        }));
    }

    let after_url = session.current_url().await?;
    if after_url != before_url {
        log::info!("      -> Navigated to {}", after_url);
        Ok(Some(PopupActionResult {
            text: action_label.to_string(),
            expected: PopupActionExpectation::Navigate,
            target_url: Some(after_url.to_string()),
        }))
    } else {
        log::info!("      -> Stayed on the same page");
        Ok(Some(PopupActionResult {
            text: action_label.to_string(),
            expected: PopupActionExpectation::StayOnSamePage,
            target_url: None,
        }))
    }
}

/// Base-page preparation shared by every fresh session: navigate, let the
/// page settle, clear any cookie banner.
pub async fn prepare_page(
    session: &ProbeSession,
    base_url: &Url,
    config: &ScanConfig,
) -> Result<()> {
    session.goto(base_url.as_str(), config.nav_timeout).await?;
    session.settle(config.settle_after_load_ms).await;
    session.dismiss_cookie_banner().await;
    session.settle(500).await;
    Ok(())
}

/// Relocate a clickable element by the exact label it was enumerated under
async fn find_by_label(
    session: &ProbeSession,
    label: &str,
    config: &ScanConfig,
) -> Option<Element> {
    let elements = session.find_elements(INTERACTIVE_SELECTOR).await;
    for el in elements {
        if !session.is_visible(&el, config.visibility_timeout).await {
            continue;
        }
        if element_label(&el, CLICKABLE_LABEL_MAX).await.as_deref() == Some(label) {
            return Some(el);
        }
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;

    fn url(s: &str) -> Url {
        Url::parse(s).unwrap()
    }

    #[test]
    fn test_popup_always_reported_with_priority() {
        let config = ScanConfig::default();
        let before = url("https://a.com/x");
        let after = url("https://a.com/y");
        assert!(popup_is_reported(&config, false, &before, &after));
        assert!(popup_is_reported(&config, true, &before, &before));
    }

    #[test]
    fn test_popup_probes_skipped_when_navigation_wins() {
        let config = ScanConfig {
            popup_priority: false,
            ..ScanConfig::default()
        };
        let before = url("https://a.com/x");
        // URL changed or a tab opened: the classifier reports the navigation,
        // so examining popup buttons would be wasted work
        assert!(!popup_is_reported(&config, false, &before, &url("https://a.com/y")));
        assert!(!popup_is_reported(&config, true, &before, &before));
        // Nothing else happened: the popup is still the outcome
        assert!(popup_is_reported(&config, false, &before, &before));
    }
}
