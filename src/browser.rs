use anyhow::Result;
use async_trait::async_trait;

use crate::models::{Tab, TabGroup, WindowId, WindowInfo};

/// Filter for live tab queries.
#[derive(Debug, Clone, Copy, Default)]
pub struct TabQuery {
    /// Restrict the query to the currently focused window.
    pub current_window: bool,
}

/// Live browser state, injected so capture can run against a real
/// extension bridge or a scripted double in tests.
#[async_trait]
pub trait BrowserApi: Send + Sync {
    async fn query_tabs(&self, query: TabQuery) -> Result<Vec<Tab>>;
    async fn get_window(&self, id: WindowId) -> Result<WindowInfo>;
    /// Only meaningful when [`Capabilities::tab_groups`] is set.
    async fn query_tab_groups(&self) -> Result<Vec<TabGroup>>;
}

/// Platform capabilities resolved once at startup. Downstream code branches
/// on these booleans instead of sniffing browser name/version strings.
#[derive(Debug, Clone, Copy, Default)]
pub struct Capabilities {
    pub tab_groups: bool,
}

impl Capabilities {
    /// Tab groups shipped in Chrome 89.
    pub fn detect(browser_name: &str, major_version: u32) -> Self {
        Self {
            tab_groups: browser_name == "Chrome" && major_version >= 89,
        }
    }
}
