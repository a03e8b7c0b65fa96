//! Hover probing: which navigation elements reveal disclosure menus.
//!
//! Each trigger is hovered and the set of visible link hrefs is compared
//! before and after. When new links appear, the probe tries to narrow them
//! down to a single dropdown container so unrelated lazy-loaded links do not
//! pollute the result.

use crate::browser::session::ProbeSession;
use crate::scan::label::{
    anchor_label, dedup_first_seen, element_label, HOVER_TRIGGER_LABEL_MAX, LINK_TEXT_MAX,
};
use crate::scan::model::{HoverInteraction, Link, Trigger};
use crate::scan::urlutil::normalize_href;
use crate::scan::{ScanConfig, HOVER_TRIGGER_SELECTOR};
use std::collections::{BTreeMap, HashSet};
use std::time::Duration;
use url::Url;

/// Visible links inside likely dropdown containers, two containers per
/// selector family at most
const CONTAINER_SNAPSHOT_JS: &str = r#"
    (() => {
        const visible = (el) => {
            const rect = el.getBoundingClientRect();
            const style = window.getComputedStyle(el);
            return rect.width > 0 && rect.height > 0
                && style.visibility !== 'hidden' && style.display !== 'none';
        };
        const selectors = [
            "[role='menu']", "[class*='menu']", "[class*='dropdown']", "[class*='flyout']",
        ];
        const out = [];
        for (const sel of selectors) {
            let taken = 0;
            for (const node of document.querySelectorAll(sel)) {
                if (taken >= 2) break;
                if (!visible(node)) continue;
                taken += 1;
                const links = [];
                node.querySelectorAll('a').forEach((a) => {
                    if (!visible(a)) return;
                    links.push({
                        href: a.getAttribute('href'),
                        text: a.innerText || '',
                        aria_label: a.getAttribute('aria-label'),
                        title: a.getAttribute('title'),
                    });
                });
                out.push(links);
            }
        }
        return out;
    })()
"#;

/// Links present in `after` but not in `before`, keyed by href
pub fn diff_links(
    before: &BTreeMap<String, String>,
    after: &BTreeMap<String, String>,
) -> Vec<Link> {
    after
        .iter()
        .filter(|(href, _)| !before.contains_key(*href))
        .map(|(href, text)| Link {
            text: text.clone(),
            href: href.clone(),
        })
        .collect()
}

/// Pick the dropdown container that accounts for the revealed links: the
/// first one whose visible links actually include at least half of the new
/// hrefs. Its full link list is taken as the menu contents. Matching on
/// intersection rather than size keeps a large always-visible menu-classed
/// sidebar from hijacking the result.
pub fn narrow_to_container(new_links: &[Link], containers: &[Vec<Link>]) -> Option<Vec<Link>> {
    if new_links.is_empty() {
        return None;
    }
    let new_hrefs: HashSet<&str> = new_links.iter().map(|l| l.href.as_str()).collect();
    containers
        .iter()
        .find(|c| {
            let overlap = c
                .iter()
                .filter(|l| new_hrefs.contains(l.href.as_str()))
                .count();
            overlap * 2 >= new_links.len()
        })
        .cloned()
}

/// Probe every hover trigger on the current page.
///
/// Failures are per-trigger: a hover that errors is logged and skipped, and
/// the pointer is parked between triggers so menus cannot stack.
pub async fn probe_hovers(
    session: &ProbeSession,
    base_url: &Url,
    config: &ScanConfig,
) -> Vec<HoverInteraction> {
    let triggers = session.find_elements(HOVER_TRIGGER_SELECTOR).await;
    log::info!(
        "[hover] Found {} hover triggers (examining up to {})",
        triggers.len(),
        config.max_hover_triggers
    );

    let mut labeled: Vec<(String, &chromiumoxide::element::Element)> = Vec::new();
    for el in triggers.iter().take(config.max_hover_triggers) {
        if !session.is_visible(el, config.visibility_timeout).await {
            continue;
        }
        let Some(trigger_text) = element_label(el, HOVER_TRIGGER_LABEL_MAX).await else {
            continue;
        };
        labeled.push((trigger_text, el));
    }

    let mut results = Vec::new();
    for (trigger_text, el) in dedup_first_seen(labeled, config.max_hover_triggers) {
        log::info!("  [hover] Trigger: '{}'", trigger_text);

        let before = link_map(session, base_url).await;
        session.scroll_into_view(el, Duration::from_millis(800)).await;
        if let Err(e) = session.hover(el, config.hover_timeout).await {
            log::warn!("    -> Hover failed: {}", e);
            continue;
        }
        session.settle(config.settle_after_hover_ms).await;
        let after = link_map(session, base_url).await;

        let new_links = diff_links(&before, &after);
        if new_links.is_empty() {
            log::info!("    -> No new links revealed");
        } else {
            log::info!("    -> {} new links revealed", new_links.len());
            let containers = container_links(session, base_url).await;
            let revealed_links =
                narrow_to_container(&new_links, &containers).unwrap_or(new_links);
            results.push(HoverInteraction {
                trigger: Trigger::from_label(&trigger_text),
                revealed_links,
            });
        }

        session.reset_pointer().await;
        session.settle(200).await;
    }

    results
}

/// Visible anchors keyed by normalized absolute href. First label per href
/// wins, which keeps the diff stable across repeated snapshots.
async fn link_map(session: &ProbeSession, base_url: &Url) -> BTreeMap<String, String> {
    let mut map = BTreeMap::new();
    for anchor in session.link_snapshot().await {
        let Some(href) = normalize_href(base_url, anchor.href.as_deref()) else {
            continue;
        };
        let Some(text) = anchor_label(&anchor, LINK_TEXT_MAX) else {
            continue;
        };
        map.entry(href.to_string()).or_insert(text);
    }
    map
}

async fn container_links(session: &ProbeSession, base_url: &Url) -> Vec<Vec<Link>> {
    let raw: Vec<Vec<crate::browser::session::RawAnchor>> =
        match session.evaluate(CONTAINER_SNAPSHOT_JS).await {
            Ok(value) => serde_json::from_value(value).unwrap_or_default(),
            Err(_) => Vec::new(),
        };

    raw.into_iter()
        .map(|anchors| {
            anchors
                .into_iter()
                .filter_map(|a| {
                    let href = normalize_href(base_url, a.href.as_deref())?;
                    let text = anchor_label(&a, LINK_TEXT_MAX)?;
                    Some(Link {
                        text,
                        href: href.to_string(),
                    })
                })
                .collect()
        })
        .collect()
}
