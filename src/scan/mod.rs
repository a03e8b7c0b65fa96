//! Interaction scanning: affordance discovery, isolated re-probing, and
//! outcome classification.

pub mod classify;
pub mod enumerate;
pub mod hover;
pub mod label;
pub mod model;
pub mod popup;
pub mod reprobe;
pub mod scanner;
pub mod urlutil;

use std::time::Duration;

/// Elements considered clickable candidates
pub const INTERACTIVE_SELECTOR: &str = "a, button, [role='button'], input[type='button']";

/// Elements probed for hover-revealed disclosure menus, scoped to
/// navigation/header regions
pub const HOVER_TRIGGER_SELECTOR: &str = "nav a, nav button, header a, header button";

/// Tunable parameters of a scan.
///
/// The scroll threshold and the popup-over-navigation precedence are
/// heuristics without a principled justification, so they are configuration
/// rather than hardcoded behavior.
#[derive(Debug, Clone)]
pub struct ScanConfig {
    /// Safety cap on clickable candidates per page
    pub max_clickables: usize,
    /// Safety cap on hover triggers per page
    pub max_hover_triggers: usize,
    /// Minimum |scroll delta| in px that counts as a scroll interaction
    /// (strictly greater than)
    pub scroll_threshold_px: i64,
    /// Whether a detected popup outranks URL/scroll changes
    pub popup_priority: bool,
    /// Navigation timeout; generous to tolerate slow sites
    pub nav_timeout: Duration,
    pub click_timeout: Duration,
    pub hover_timeout: Duration,
    /// Per-element visibility check timeout
    pub visibility_timeout: Duration,
    /// Settle interval after page load, before probing starts
    pub settle_after_load_ms: u64,
    /// Settle interval after a click, before classification
    pub settle_after_click_ms: u64,
    /// Settle interval after a hover, before re-snapshotting links
    pub settle_after_hover_ms: u64,
    /// Cap on action buttons examined inside one popup
    pub max_popup_actions: usize,
    /// Cap on anchor links extracted from one popup
    pub max_popup_links: usize,
}

impl Default for ScanConfig {
    fn default() -> Self {
        Self {
            max_clickables: 50,
            max_hover_triggers: 40,
            scroll_threshold_px: 30,
            popup_priority: true,
            nav_timeout: Duration::from_secs(90),
            click_timeout: Duration::from_secs(3),
            hover_timeout: Duration::from_secs(1),
            visibility_timeout: Duration::from_millis(400),
            settle_after_load_ms: 1000,
            settle_after_click_ms: 2000,
            settle_after_hover_ms: 800,
            max_popup_actions: 10,
            max_popup_links: 20,
        }
    }
}
