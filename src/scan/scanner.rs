//! Scan orchestration: base pass, sequential re-probes, map assembly.

use crate::browser::session::{ProbeSession, SessionFactory};
use crate::error::{BrowserError, Result};
use crate::scan::enumerate::collect_clickables;
use crate::scan::hover::probe_hovers;
use crate::scan::model::{HoverInteraction, InteractionMap};
use crate::scan::reprobe::{prepare_page, probe_click};
use crate::scan::ScanConfig;
use url::Url;

/// Drives a full scan of one page
pub struct Scanner {
    factory: SessionFactory,
    config: ScanConfig,
}

impl Scanner {
    pub fn new(factory: SessionFactory, config: ScanConfig) -> Self {
        Self { factory, config }
    }

    /// Scan a page: probe hover menus and enumerate clickables on a base
    /// session, then re-probe each clickable in its own fresh session.
    ///
    /// Trials run sequentially. Each one launches a dedicated browser
    /// instance, and interleaving them would multiply resource usage without
    /// making the observations any more reliable.
    pub async fn scan(&self, url: &str) -> Result<InteractionMap> {
        let base_url = Url::parse(url)
            .map_err(|e| BrowserError::Other(format!("Invalid target URL '{}': {}", url, e)))?;

        log::info!("[scan] Starting scan of {}", url);
        let mut map = InteractionMap::new(url);

        let base = self.factory.acquire().await?;
        let base_result = self.base_pass(&base, &base_url).await;
        base.release().await;
        let (hover_interactions, clickables) = base_result?;
        map.hover_interactions = hover_interactions;

        log::info!(
            "[scan] Base pass done: {} hover menus, {} clickables to re-probe",
            map.hover_interactions.len(),
            clickables.len()
        );

        for label in &clickables {
            if let Some(interaction) = probe_click(&self.factory, &base_url, label, &self.config).await? {
                map.click_interactions.push(interaction);
            }
        }

        log::info!(
            "[scan] Finished: {} click interactions recorded",
            map.click_interactions.len()
        );
        Ok(map)
    }

    async fn base_pass(
        &self,
        session: &ProbeSession,
        base_url: &Url,
    ) -> Result<(Vec<HoverInteraction>, Vec<String>)> {
        prepare_page(session, base_url, &self.config).await?;
        // Extra settle on the very first load; hover diffing is sensitive to
        // late-arriving nav markup
        session.settle(500).await;

        let hovers = probe_hovers(session, base_url, &self.config).await;
        let clickables = collect_clickables(session, &self.config).await;
        Ok((hovers, clickables))
    }
}
