//! Isolated browsing sessions for interaction probing.
//!
//! Every probe trial runs in its own [`ProbeSession`]: a dedicated Chrome
//! instance with a unique user-data directory, so cookie banners, popups, and
//! navigation history from one trial can never leak into the next. Sessions
//! are acquired from a [`SessionFactory`] and must be released on every exit
//! path.

use crate::browser::chrome::{ChromeDriver, LaunchOptions};
use crate::error::{BrowserError, Result};
use chromiumoxide::cdp::browser_protocol::input::{
    DispatchMouseEventParams, DispatchMouseEventType,
};
use chromiumoxide::cdp::browser_protocol::target::TargetId;
use chromiumoxide::element::Element;
use chromiumoxide::page::Page;
use serde::Deserialize;
use std::time::Duration;
use url::Url;

/// Cookie-consent button labels, probed in order; first match wins
const COOKIE_CANDIDATES: [&str; 6] = [
    "Accept All Cookies",
    "Accept all",
    "Accept",
    "Confirm My Choices",
    "Agree",
    "Got it",
];

/// Element-level visibility predicate shared by all DOM probes
const VISIBILITY_FN: &str = r#"function() {
    const rect = this.getBoundingClientRect();
    const style = window.getComputedStyle(this);
    return rect.width > 0 && rect.height > 0
        && style.visibility !== 'hidden' && style.display !== 'none';
}"#;

/// Raw label sources of a visible anchor, as read from the page
#[derive(Debug, Clone, Deserialize)]
pub struct RawAnchor {
    pub href: Option<String>,
    #[serde(default)]
    pub text: String,
    pub aria_label: Option<String>,
    pub title: Option<String>,
}

/// Hands out isolated browsing sessions, one per probe trial
#[derive(Debug, Clone)]
pub struct SessionFactory {
    options: LaunchOptions,
}

impl SessionFactory {
    pub fn new(options: LaunchOptions) -> Self {
        Self { options }
    }

    /// Launch a fresh, fully isolated session
    pub async fn acquire(&self) -> Result<ProbeSession> {
        let driver = ChromeDriver::launch(self.options.clone()).await?;
        let page = driver.initial_page().await?;
        Ok(ProbeSession { driver, page })
    }
}

/// One isolated browsing session: a Chrome instance plus its active page.
///
/// The methods here are the capability surface the scan is written against:
/// navigate, locate, read, click, hover, and observe. Any browser automation
/// backend able to provide these operations could be substituted.
pub struct ProbeSession {
    driver: ChromeDriver,
    page: Page,
}

impl ProbeSession {
    /// Navigate and wait for DOMContentLoaded
    pub async fn goto(&self, url: &str, timeout: Duration) -> Result<()> {
        ChromeDriver::goto(&self.page, url, timeout).await
    }

    /// Let dynamic content settle
    pub async fn settle(&self, ms: u64) {
        tokio::time::sleep(Duration::from_millis(ms)).await;
    }

    /// Current page URL, parsed
    pub async fn current_url(&self) -> Result<Url> {
        let url = self
            .page
            .url()
            .await
            .map_err(|e| BrowserError::Other(e.to_string()))?
            .ok_or(BrowserError::NoPage)?;
        Url::parse(&url).map_err(|e| BrowserError::Other(format!("Invalid page URL: {}", e)))
    }

    /// Vertical scroll offset; 0 when it cannot be read
    pub async fn scroll_y(&self) -> i64 {
        match self.evaluate("window.scrollY").await {
            Ok(v) => v.as_f64().map(|f| f.round() as i64).unwrap_or(0),
            Err(_) => 0,
        }
    }

    /// Execute JavaScript in the page context
    pub async fn evaluate(&self, script: &str) -> Result<serde_json::Value> {
        let result = self
            .page
            .evaluate(script)
            .await
            .map_err(|e| BrowserError::Other(format!("Script execution failed: {}", e)))?;
        Ok(result.into_value().unwrap_or(serde_json::Value::Null))
    }

    /// All elements matching a CSS selector (empty on failure)
    pub async fn find_elements(&self, selector: &str) -> Vec<Element> {
        self.page.find_elements(selector).await.unwrap_or_default()
    }

    /// Time-bounded visibility check; any failure counts as not visible
    pub async fn is_visible(&self, el: &Element, timeout: Duration) -> bool {
        match tokio::time::timeout(timeout, el.call_js_fn(VISIBILITY_FN, false)).await {
            Ok(Ok(ret)) => ret.result.value.and_then(|v| v.as_bool()).unwrap_or(false),
            _ => false,
        }
    }

    /// Forced click via the DOM, bypassing actionability checks that a
    /// pointer-based click would perform (overlapping elements etc.)
    pub async fn force_click(&self, el: &Element, timeout: Duration) -> Result<()> {
        match tokio::time::timeout(timeout, el.call_js_fn("function() { this.click(); }", false))
            .await
        {
            Ok(Ok(_)) => Ok(()),
            Ok(Err(e)) => Err(BrowserError::Other(format!("Click failed: {}", e))),
            Err(_) => Err(BrowserError::Other("Click timed out".to_string())),
        }
    }

    /// Move the pointer onto the element to trigger hover state
    pub async fn hover(&self, el: &Element, timeout: Duration) -> Result<()> {
        let fut = async {
            let point = el
                .clickable_point()
                .await
                .map_err(|e| BrowserError::Other(format!("No hover point: {}", e)))?;
            self.dispatch_mouse_move(point.x, point.y).await
        };
        match tokio::time::timeout(timeout, fut).await {
            Ok(res) => res,
            Err(_) => Err(BrowserError::Other("Hover timed out".to_string())),
        }
    }

    /// Park the pointer in the top-left corner so hover state from one probe
    /// cannot compound into the next
    pub async fn reset_pointer(&self) {
        let _ = self.dispatch_mouse_move(0.0, 0.0).await;
    }

    async fn dispatch_mouse_move(&self, x: f64, y: f64) -> Result<()> {
        let params = DispatchMouseEventParams::builder()
            .r#type(DispatchMouseEventType::MouseMoved)
            .x(x)
            .y(y)
            .build()
            .map_err(BrowserError::Other)?;
        self.page
            .execute(params)
            .await
            .map_err(|e| BrowserError::Other(format!("Mouse move failed: {}", e)))?;
        Ok(())
    }

    /// Best-effort scroll into view before clicking or hovering
    pub async fn scroll_into_view(&self, el: &Element, timeout: Duration) {
        let _ = tokio::time::timeout(timeout, el.scroll_into_view()).await;
    }

    /// Snapshot every currently visible anchor with its label sources
    pub async fn link_snapshot(&self) -> Vec<RawAnchor> {
        let script = r#"
            (() => {
                const visible = (el) => {
                    const rect = el.getBoundingClientRect();
                    const style = window.getComputedStyle(el);
                    return rect.width > 0 && rect.height > 0
                        && style.visibility !== 'hidden' && style.display !== 'none';
                };
                const out = [];
                document.querySelectorAll('a').forEach((a) => {
                    if (!visible(a)) return;
                    out.push({
                        href: a.getAttribute('href'),
                        text: a.innerText || '',
                        aria_label: a.getAttribute('aria-label'),
                        title: a.getAttribute('title'),
                    });
                });
                return out;
            })()
        "#;

        match self.evaluate(script).await {
            Ok(value) => serde_json::from_value(value).unwrap_or_default(),
            Err(_) => Vec::new(),
        }
    }

    /// Try to dismiss a cookie-consent banner so it does not block clicks.
    /// Non-fatal: when no candidate matches, the page is left as-is.
    pub async fn dismiss_cookie_banner(&self) {
        let names = serde_json::to_string(&COOKIE_CANDIDATES).unwrap_or_else(|_| "[]".to_string());
        let script = format!(
            r#"
            ((names) => {{
                const visible = (el) => {{
                    const rect = el.getBoundingClientRect();
                    const style = window.getComputedStyle(el);
                    return rect.width > 0 && rect.height > 0
                        && style.visibility !== 'hidden' && style.display !== 'none';
                }};
                const buttons = document.querySelectorAll(
                    "button, [role='button'], input[type='button']");
                for (const name of names) {{
                    for (const b of buttons) {{
                        if (!visible(b)) continue;
                        const label = (b.innerText || b.value || '').trim();
                        if (label === name) {{ b.click(); return name; }}
                    }}
                }}
                // Some cookie UIs use generic classes / aria labels
                const generic = document.querySelector(
                    "button.cookie, button[aria-label*='cookie']");
                if (generic) {{ generic.click(); return 'generic cookie button'; }}
                return null;
            }})({})
        "#,
            names
        );

        let clicked =
            match tokio::time::timeout(Duration::from_secs(1), self.evaluate(&script)).await {
                Ok(Ok(v)) => v.as_str().map(str::to_string),
                _ => None,
            };

        if let Some(name) = clicked {
            log::info!("[cookie] Clicked '{}'", name);
            self.settle(500).await;
        }
    }

    /// Target IDs of all open pages, used to detect clicks that spawn tabs
    pub async fn open_page_ids(&self) -> Vec<TargetId> {
        match self.driver.pages().await {
            Ok(pages) => pages.iter().map(|p| p.target_id().clone()).collect(),
            Err(_) => Vec::new(),
        }
    }

    /// URL of a page that was not open before the click, if any
    pub async fn new_tab_url(&self, before: &[TargetId]) -> Option<Url> {
        let pages = self.driver.pages().await.ok()?;
        for p in pages {
            if before.contains(p.target_id()) {
                continue;
            }
            let read = tokio::time::timeout(Duration::from_secs(5), p.url()).await;
            if let Ok(Ok(Some(u))) = read {
                if u.starts_with("chrome://") {
                    continue;
                }
                if let Ok(parsed) = Url::parse(&u) {
                    return Some(parsed);
                }
            }
        }
        None
    }

    /// Shut the session down. Callers must reach this on every exit path.
    pub async fn release(self) {
        let ProbeSession { driver, page: _ } = self;
        if let Err(e) = driver.close().await {
            log::debug!("Session close failed (ignored): {}", e);
        }
    }
}
