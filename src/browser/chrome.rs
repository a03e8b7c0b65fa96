// spider_chrome re-exports chromiumoxide API
use crate::error::{BrowserError, Result};
use chromiumoxide::browser::{Browser, BrowserConfig};
use chromiumoxide::cdp::browser_protocol::page::{EventDomContentEventFired, NavigateParams};
use chromiumoxide::page::Page;
use futures::StreamExt;
use std::path::PathBuf;
use std::time::Duration;

/// A CDP-driven Chrome instance.
///
/// Every driver gets its own unique user-data directory, so two drivers never
/// share cookies, storage, or history. The scan exploits this for trial
/// isolation: each probe runs against a freshly launched driver (see
/// [`crate::browser::session`]).
pub struct ChromeDriver {
    browser: Browser,
    temp_dir: Option<PathBuf>,
}

/// How to launch Chrome
#[derive(Debug, Clone, Default)]
pub struct LaunchOptions {
    /// Explicit Chrome executable; system Chrome is used when unset
    pub chrome_path: Option<String>,
    /// Linux AppArmor workaround, required in most CI environments
    pub no_sandbox: bool,
    pub headless: bool,
}

impl ChromeDriver {
    /// Launch a new Chrome instance with a unique user-data directory
    pub async fn launch(options: LaunchOptions) -> Result<Self> {
        // Nanosecond timestamp keeps profile directories unique even when
        // sessions are created back to back
        let unique_id = std::time::SystemTime::now()
            .duration_since(std::time::UNIX_EPOCH)
            .map_err(|e| BrowserError::Other(e.to_string()))?
            .as_nanos();
        let temp_dir = std::env::temp_dir().join(format!("interaction-scout-{}", unique_id));
        std::fs::create_dir_all(&temp_dir).map_err(|e| {
            BrowserError::LaunchFailed(format!("Failed to create temp directory: {}", e))
        })?;

        let mut config = if options.headless {
            BrowserConfig::builder()
        } else {
            BrowserConfig::builder().with_head()
        };

        config = config.user_data_dir(&temp_dir);

        if options.no_sandbox {
            config = config.arg("--no-sandbox");
        }

        if let Some(path) = &options.chrome_path {
            config = config.chrome_executable(path);
        }

        let browser_config = config.build().map_err(BrowserError::LaunchFailed)?;

        let (browser, mut handler) = Browser::launch(browser_config).await.map_err(|e| {
            BrowserError::LaunchFailed(format!(
                "{}. \n\n\
                 Chrome not found. You can:\n\
                 - Install Chrome: https://www.google.com/chrome/\n\
                 - Ubuntu/Debian: sudo apt install chromium-browser\n\
                 - Or specify path: --chrome-path /path/to/chrome\n\
                 - Linux sandbox issue? Try: --no-sandbox",
                e
            ))
        })?;

        // Spawn handler task driving the CDP connection
        tokio::spawn(async move {
            while (handler.next().await).is_some() {
                // Handle browser events
            }
        });

        Ok(Self {
            browser,
            temp_dir: Some(temp_dir),
        })
    }

    /// Get the current active page, excluding Chrome's own chrome:// pages.
    /// Creates a blank page if none exists.
    pub async fn initial_page(&self) -> Result<Page> {
        let pages = self.browser.pages().await?;

        for page in pages.iter() {
            if let Ok(Some(url)) = page.url().await {
                if !url.starts_with("chrome://") {
                    return Ok(page.clone());
                }
            }
        }

        if let Some(page) = pages.last() {
            return Ok(page.clone());
        }

        self.browser
            .new_page("about:blank")
            .await
            .map_err(|e| BrowserError::Other(format!("Failed to create page: {}", e)))
    }

    /// Navigate a page and wait for DOMContentLoaded.
    ///
    /// The event listener is attached before the navigate command is issued so
    /// a fast-loading page cannot fire the event before we start listening.
    /// The caller supplies the timeout (90s by default, to tolerate slow
    /// sites).
    pub async fn goto(page: &Page, url: &str, timeout: Duration) -> Result<()> {
        log::debug!("Navigating to: {}", url);

        let mut dom_loaded = page
            .event_listener::<EventDomContentEventFired>()
            .await
            .map_err(|e| {
                BrowserError::NavigationFailed(format!("Failed to attach load listener: {}", e))
            })?;

        let params = NavigateParams::builder()
            .url(url)
            .build()
            .map_err(|e| BrowserError::NavigationFailed(format!("Invalid URL {}: {}", url, e)))?;

        let response = page.execute(params).await.map_err(|e| {
            let error_str = e.to_string();
            // "oneshot canceled" means the CDP connection itself died
            if error_str.contains("oneshot canceled") {
                BrowserError::NavigationFailed(
                    "Browser connection lost. The browser may have been closed or crashed."
                        .to_string(),
                )
            } else {
                BrowserError::NavigationFailed(format!("Failed to navigate to {}: {}", url, e))
            }
        })?;

        if let Some(error_text) = &response.result.error_text {
            return Err(BrowserError::NavigationFailed(format!(
                "Navigation error: {}",
                error_text
            )));
        }

        match tokio::time::timeout(timeout, dom_loaded.next()).await {
            Ok(Some(_)) => {
                log::debug!("DOMContentLoaded fired for {}", url);
                Ok(())
            }
            Ok(None) => {
                log::warn!("Load event stream ended early for {}", url);
                Ok(())
            }
            Err(_) => Err(BrowserError::NavigationFailed(format!(
                "Timed out after {:?} waiting for DOMContentLoaded on {}",
                timeout, url
            ))),
        }
    }

    /// All currently open pages of this instance
    pub async fn pages(&self) -> Result<Vec<Page>> {
        Ok(self.browser.pages().await?)
    }

    /// Close the browser
    pub async fn close(mut self) -> Result<()> {
        self.browser
            .close()
            .await
            .map_err(|e| BrowserError::Other(e.to_string()))?;
        let _ = self.browser.wait().await;
        Ok(())
    }
}

impl Drop for ChromeDriver {
    fn drop(&mut self) {
        // Clean up the per-run profile directory
        if let Some(temp_dir) = &self.temp_dir {
            if temp_dir.exists() {
                let _ = std::fs::remove_dir_all(temp_dir);
            }
        }
    }
}
