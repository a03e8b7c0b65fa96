//! Popup and interstitial detection.
//!
//! Detection runs in page JavaScript: find the first visible modal-looking
//! element, climb from a bare heading to its container, and tag the result
//! with a marker attribute. The marker lets Rust reacquire a live element
//! handle for the container and inspect it with the normal element API.

use crate::browser::session::ProbeSession;
use crate::scan::label::{dedup_first_seen, element_label, CLICKABLE_LABEL_MAX, LINK_TEXT_MAX};
use crate::scan::model::Link;
use crate::scan::urlutil::normalize_href;
use crate::scan::ScanConfig;
use chromiumoxide::element::Element;
use std::time::Duration;
use url::Url;

/// Clickable elements inside a popup container
const POPUP_ACTION_SELECTOR: &str = "button, a, [role='button'], input[type='button']";

/// Marker attribute set on the detected container
const POPUP_MARKER: &str = "data-scout-popup";

const DETECT_JS: &str = r#"
    (() => {
        const visible = (el) => {
            const rect = el.getBoundingClientRect();
            const style = window.getComputedStyle(el);
            return rect.width > 0 && rect.height > 0
                && style.visibility !== 'hidden' && style.display !== 'none';
        };
        const candidates = document.querySelectorAll(
            "[role='dialog'], [aria-modal='true'], [class*='modal'], " +
            "[class*='popup'], [class*='overlay'], [id*='interstitial']");
        let popup = null;
        for (const el of candidates) {
            if (visible(el)) { popup = el; break; }
        }
        if (!popup) return false;
        // A heading matched directly: climb to the enclosing container
        if (/^H[1-6]$/.test(popup.tagName) || popup.getAttribute('role') === 'heading') {
            const container = popup.closest(
                "[role='dialog'], [class*='modal'], [class*='popup'], [class*='container']");
            if (container) popup = container;
        }
        document.querySelectorAll('[data-scout-popup]')
            .forEach((el) => el.removeAttribute('data-scout-popup'));
        popup.setAttribute('data-scout-popup', '1');
        return true;
    })()
"#;

/// Heading-like descendants tried in order for the popup title
const TITLE_SELECTORS: [&str; 3] = [
    ".popup_header h1, .popup_header h2",
    "h1, h2, h3",
    "[role='heading'], .title, .modal-title",
];

/// What was found inside a popup
#[derive(Debug, Clone)]
pub struct PopupProbe {
    pub title: String,
    pub action_labels: Vec<String>,
    pub nested_links: Vec<Link>,
}

/// Locate a visible popup container and return a live handle to it
pub async fn popup_container(session: &ProbeSession) -> Option<Element> {
    let found = session
        .evaluate(DETECT_JS)
        .await
        .ok()?
        .as_bool()
        .unwrap_or(false);
    if !found {
        return None;
    }
    session
        .find_elements(&format!("[{}='1']", POPUP_MARKER))
        .await
        .into_iter()
        .next()
}

/// Detect a popup on the current page and inspect its contents
pub async fn detect_popup(
    session: &ProbeSession,
    base_url: &Url,
    config: &ScanConfig,
) -> Option<PopupProbe> {
    let container = popup_container(session).await?;
    Some(inspect_popup(session, &container, base_url, config).await)
}

/// Read title, action-button labels, and nested links out of a container
pub async fn inspect_popup(
    session: &ProbeSession,
    container: &Element,
    base_url: &Url,
    config: &ScanConfig,
) -> PopupProbe {
    let title = popup_title(session, container, config)
        .await
        .unwrap_or_default();

    let buttons = container
        .find_elements(POPUP_ACTION_SELECTOR)
        .await
        .unwrap_or_default();
    let mut labeled = Vec::new();
    for button in &buttons {
        if !session.is_visible(button, config.visibility_timeout).await {
            continue;
        }
        let Some(label) = element_label(button, CLICKABLE_LABEL_MAX).await else {
            continue;
        };
        labeled.push((label, ()));
    }
    let action_labels: Vec<String> = dedup_first_seen(labeled, config.max_popup_actions)
        .into_iter()
        .map(|(label, ())| label)
        .collect();

    let mut nested_links = Vec::new();
    let anchors = container.find_elements("a").await.unwrap_or_default();
    for anchor in anchors.iter().take(config.max_popup_links) {
        if !session.is_visible(anchor, config.visibility_timeout).await {
            continue;
        }
        let href = match tokio::time::timeout(
            Duration::from_millis(300),
            anchor.attribute("href"),
        )
        .await
        {
            Ok(Ok(h)) => h,
            _ => None,
        };
        let Some(href) = normalize_href(base_url, href.as_deref()) else {
            continue;
        };
        let Some(text) = element_label(anchor, LINK_TEXT_MAX).await else {
            continue;
        };
        nested_links.push(Link {
            text,
            href: href.to_string(),
        });
    }

    PopupProbe {
        title,
        action_labels,
        nested_links,
    }
}

/// Find an action button inside the container by its exact label
pub async fn find_action_by_label(
    session: &ProbeSession,
    container: &Element,
    label: &str,
    config: &ScanConfig,
) -> Option<Element> {
    let buttons = container
        .find_elements(POPUP_ACTION_SELECTOR)
        .await
        .unwrap_or_default();
    for button in buttons {
        if !session.is_visible(&button, config.visibility_timeout).await {
            continue;
        }
        if element_label(&button, CLICKABLE_LABEL_MAX).await.as_deref() == Some(label) {
            return Some(button);
        }
    }
    None
}

async fn popup_title(
    session: &ProbeSession,
    container: &Element,
    config: &ScanConfig,
) -> Option<String> {
    for selector in TITLE_SELECTORS {
        let headings = container.find_elements(selector).await.unwrap_or_default();
        for heading in &headings {
            if !session.is_visible(heading, config.visibility_timeout).await {
                continue;
            }
            if let Some(title) = element_label(heading, LINK_TEXT_MAX).await {
                return Some(title);
            }
        }
    }
    None
}
