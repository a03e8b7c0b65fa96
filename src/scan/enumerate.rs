//! Clickable-affordance enumeration on the base page.

use crate::browser::session::ProbeSession;
use crate::scan::label::{dedup_first_seen, element_label, CLICKABLE_LABEL_MAX};
use crate::scan::{ScanConfig, INTERACTIVE_SELECTOR};

/// Collect the labels of visible clickable elements, in document order,
/// deduplicated on first occurrence and capped by the config.
///
/// Labels are the output here, not element handles: each label is later
/// re-resolved in a fresh session, so a handle from this page would be
/// useless anyway.
pub async fn collect_clickables(session: &ProbeSession, config: &ScanConfig) -> Vec<String> {
    let elements = session.find_elements(INTERACTIVE_SELECTOR).await;
    log::info!(
        "[base-scan] Found {} clickable candidates (examining up to {})",
        elements.len(),
        config.max_clickables
    );

    let mut labeled = Vec::new();
    for el in elements.iter().take(config.max_clickables) {
        if !session.is_visible(el, config.visibility_timeout).await {
            continue;
        }
        let Some(label) = element_label(el, CLICKABLE_LABEL_MAX).await else {
            continue;
        };
        labeled.push((label, ()));
    }

    let labels: Vec<String> = dedup_first_seen(labeled, config.max_clickables)
        .into_iter()
        .map(|(label, ())| label)
        .collect();

    log::info!("[base-scan] {} unique clickable labels", labels.len());
    labels
}
