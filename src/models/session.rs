use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

pub type WindowId = i64;
pub type TabId = i64;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum WindowKind {
    Normal,
    Popup,
}

/// Snapshot of a single tab at capture time.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Tab {
    pub id: TabId,
    pub window_id: WindowId,
    pub index: u32,
    pub url: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fav_icon_url: Option<String>,
    #[serde(default)]
    pub pinned: bool,
    #[serde(default)]
    pub active: bool,
    #[serde(default)]
    pub incognito: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub group_id: Option<i64>,
}

/// Window metadata captured alongside its tabs.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WindowInfo {
    pub id: WindowId,
    pub focused: bool,
    #[serde(default)]
    pub incognito: bool,
    pub kind: WindowKind,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub state: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub left: Option<i32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub top: Option<i32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub width: Option<i32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub height: Option<i32>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TabGroup {
    pub id: i64,
    pub window_id: WindowId,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub color: Option<String>,
    #[serde(default)]
    pub collapsed: bool,
}

/// A saved set of windows and tabs.
///
/// `windows_number` and `tabs_number` are derived; call [`Session::recount`]
/// after any structural edit. Every key of `windows` has a matching entry in
/// `windows_info` (`recount` prunes the orphans).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Session {
    pub id: String,
    pub name: String,
    pub tag: Vec<String>,
    pub date: DateTime<Utc>,
    pub last_edited_time: DateTime<Utc>,
    pub session_start_time: DateTime<Utc>,
    pub windows: BTreeMap<WindowId, BTreeMap<TabId, Tab>>,
    pub windows_info: BTreeMap<WindowId, WindowInfo>,
    pub windows_number: u32,
    pub tabs_number: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tab_groups: Option<Vec<TabGroup>>,
}

impl Session {
    /// Drops empty windows, prunes `windows_info` entries without a window,
    /// and recomputes the derived counts.
    pub fn recount(&mut self) {
        self.windows.retain(|_, tabs| !tabs.is_empty());
        let windows = &self.windows;
        self.windows_info.retain(|id, _| windows.contains_key(id));
        self.windows_number = self.windows.len() as u32;
        self.tabs_number = self.windows.values().map(|tabs| tabs.len() as u32).sum();
    }
}

/// Reference to the session currently considered "live", stored in settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ActiveSessionPointer {
    pub name: String,
    pub id: String,
    pub session_start_time: DateTime<Utc>,
}
