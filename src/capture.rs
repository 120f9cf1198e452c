use std::collections::BTreeMap;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::browser::{BrowserApi, Capabilities, TabQuery};
use crate::error::{Result, SessionError};
use crate::models::{Session, TabGroup, WindowId};
use crate::settings::Settings;
use crate::{favicon, filter, replace};
use crate::{log_info, log_warn};

const ENABLE_LOGS: bool = true;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum CaptureScope {
    AllWindows,
    CurrentWindowOnly,
}

/// Explicit capture configuration, derived from a settings snapshot so
/// capture never reaches into shared state mid-flight.
#[derive(Debug, Clone)]
pub struct CaptureOptions {
    pub scope: CaptureScope,
    pub save_private_windows: bool,
    pub compress_favicons: bool,
    pub save_tab_groups: bool,
    pub ignore_urls: Vec<String>,
}

impl CaptureOptions {
    pub fn from_settings(scope: CaptureScope, settings: &Settings) -> Self {
        Self {
            scope,
            save_private_windows: settings.save_private_windows,
            compress_favicons: settings.compress_favicons,
            save_tab_groups: settings.save_tab_groups,
            ignore_urls: settings.ignore_urls.clone(),
        }
    }
}

/// Assembles a [`Session`] from live browser state.
pub struct SessionCapture {
    browser: Arc<dyn BrowserApi>,
    capabilities: Capabilities,
}

impl SessionCapture {
    pub fn new(browser: Arc<dyn BrowserApi>, capabilities: Capabilities) -> Self {
        Self {
            browser,
            capabilities,
        }
    }

    /// Captures the current windows and tabs into a new session.
    ///
    /// Fails with [`SessionError::EmptyCapture`] when nothing survives scope
    /// and ignore-rule filtering; that is the only validation gate. Favicon
    /// compression failures are logged per tab and the original URL kept.
    pub async fn capture(
        &self,
        name: &str,
        tags: Vec<String>,
        options: &CaptureOptions,
        session_start_time: DateTime<Utc>,
    ) -> Result<Session> {
        log_info!("capture() '{}' {:?}", name, options.scope);

        let now = Utc::now();
        let mut session = Session {
            id: Uuid::new_v4().to_string(),
            name: name.to_string(),
            tag: tags,
            date: now,
            last_edited_time: now,
            session_start_time,
            windows: BTreeMap::new(),
            windows_info: BTreeMap::new(),
            windows_number: 0,
            tabs_number: 0,
            tab_groups: None,
        };

        let query = TabQuery {
            current_window: options.scope == CaptureScope::CurrentWindowOnly,
        };
        let tabs = self
            .browser
            .query_tabs(query)
            .await
            .map_err(SessionError::Browser)?;

        for mut tab in tabs {
            if tab.incognito && !options.save_private_windows {
                continue;
            }

            // Lazy-restored tabs record the real destination, not the shim.
            if let Some(original) = replace::resolve_replaced_url(&tab.url) {
                tab.url = original;
            }

            if options.compress_favicons {
                if let Some(fav) = tab.fav_icon_url.as_deref() {
                    if fav.starts_with("data:image") {
                        match favicon::compress_data_url(fav) {
                            Ok(compressed) => tab.fav_icon_url = Some(compressed),
                            Err(err) => {
                                log_warn!(
                                    "favicon compression failed for {}: {err:#}",
                                    tab.url
                                );
                            }
                        }
                    }
                }
            }

            session
                .windows
                .entry(tab.window_id)
                .or_default()
                .insert(tab.id, tab);
        }

        let window_ids: Vec<WindowId> = session.windows.keys().copied().collect();
        for window_id in window_ids {
            let info = self
                .browser
                .get_window(window_id)
                .await
                .map_err(SessionError::Browser)?;
            session.windows_info.insert(window_id, info);
        }

        if self.capabilities.tab_groups && options.save_tab_groups {
            let groups = self
                .browser
                .query_tab_groups()
                .await
                .map_err(SessionError::Browser)?;
            let groups: Vec<TabGroup> = groups
                .into_iter()
                .filter(|group| session.windows.contains_key(&group.window_id))
                .collect();
            if !groups.is_empty() {
                session.tab_groups = Some(groups);
            }
        }

        let session = filter::apply_ignore_rules(session, &options.ignore_urls);

        if session.tabs_number == 0 {
            return Err(SessionError::EmptyCapture);
        }
        Ok(session)
    }
}
