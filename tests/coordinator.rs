use std::collections::BTreeMap;
use std::sync::Arc;

use anyhow::anyhow;
use async_trait::async_trait;
use chrono::{Duration, Utc};
use tempfile::TempDir;
use tokio::sync::broadcast::error::TryRecvError;

use tabkeeper::models::{
    ActiveSessionPointer, Session, Tab, TabGroup, TabId, WindowId, WindowInfo, WindowKind,
};
use tabkeeper::{
    BrowserApi, Capabilities, CaptureScope, Database, EventBus, NoopCloudSync, SessionCoordinator,
    SessionError, SessionEvent, Settings, SettingsStore, TabQuery,
};

struct ScriptedBrowser {
    tabs: Vec<Tab>,
    windows: Vec<WindowInfo>,
}

#[async_trait]
impl BrowserApi for ScriptedBrowser {
    async fn query_tabs(&self, query: TabQuery) -> anyhow::Result<Vec<Tab>> {
        if query.current_window {
            let focused = self
                .windows
                .iter()
                .find(|window| window.focused)
                .map(|window| window.id);
            Ok(self
                .tabs
                .iter()
                .filter(|tab| Some(tab.window_id) == focused)
                .cloned()
                .collect())
        } else {
            Ok(self.tabs.clone())
        }
    }

    async fn get_window(&self, id: WindowId) -> anyhow::Result<WindowInfo> {
        self.windows
            .iter()
            .find(|window| window.id == id)
            .cloned()
            .ok_or_else(|| anyhow!("no window {id}"))
    }

    async fn query_tab_groups(&self) -> anyhow::Result<Vec<TabGroup>> {
        Ok(Vec::new())
    }
}

fn tab(id: TabId, window_id: WindowId, url: &str, incognito: bool) -> Tab {
    Tab {
        id,
        window_id,
        index: 0,
        url: url.into(),
        title: None,
        fav_icon_url: None,
        pinned: false,
        active: false,
        incognito,
        group_id: None,
    }
}

fn window(id: WindowId, focused: bool) -> WindowInfo {
    WindowInfo {
        id,
        focused,
        incognito: false,
        kind: WindowKind::Normal,
        state: None,
        left: None,
        top: None,
        width: None,
        height: None,
    }
}

fn default_browser() -> ScriptedBrowser {
    ScriptedBrowser {
        tabs: vec![
            tab(1, 1, "https://a.example/", false),
            tab(2, 1, "https://b.example/", false),
        ],
        windows: vec![window(1, true)],
    }
}

fn manual_session(id: &str, name: &str, tags: &[&str]) -> Session {
    let now = Utc::now();
    let mut windows = BTreeMap::new();
    windows.insert(1, BTreeMap::from([(1, tab(1, 1, "https://a.example/", false))]));
    let mut windows_info = BTreeMap::new();
    windows_info.insert(1, window(1, true));
    Session {
        id: id.into(),
        name: name.into(),
        tag: tags.iter().map(|t| t.to_string()).collect(),
        date: now,
        last_edited_time: now,
        session_start_time: now,
        windows,
        windows_info,
        windows_number: 1,
        tabs_number: 1,
        tab_groups: None,
    }
}

struct Fixture {
    _dir: TempDir,
    coordinator: SessionCoordinator,
    settings: Arc<SettingsStore>,
    store: Database,
    events: EventBus,
}

fn fixture(settings: Settings, browser: ScriptedBrowser) -> Fixture {
    let dir = TempDir::new().unwrap();
    let store = Database::new(dir.path().join("sessions.db")).unwrap();
    let settings_store = Arc::new(SettingsStore::new(dir.path().join("settings.json")).unwrap());
    settings_store.update(settings).unwrap();
    let events = EventBus::default();
    let coordinator = SessionCoordinator::new(
        store.clone(),
        settings_store.clone(),
        Arc::new(browser),
        Capabilities::default(),
        events.clone(),
        Arc::new(NoopCloudSync),
        Utc::now(),
    );
    Fixture {
        _dir: dir,
        coordinator,
        settings: settings_store,
        store,
        events,
    }
}

#[tokio::test]
async fn save_current_session_persists_and_notifies() {
    let fx = fixture(Settings::default(), default_browser());
    let mut rx = fx.events.subscribe();

    let session = fx
        .coordinator
        .save_current_session("morning", vec!["work".into()], CaptureScope::AllWindows)
        .await
        .unwrap();

    assert_eq!(session.tabs_number, 2);
    let stored = fx.store.get_session(&session.id).await.unwrap().unwrap();
    assert_eq!(stored, session);

    match rx.try_recv().unwrap() {
        SessionEvent::SaveSession {
            session: notified,
            save_by_sync,
        } => {
            assert_eq!(notified.id, session.id);
            assert!(!save_by_sync);
        }
        other => panic!("unexpected event: {other:?}"),
    }
}

#[tokio::test]
async fn empty_capture_leaves_state_untouched() {
    let browser = ScriptedBrowser {
        tabs: vec![tab(1, 1, "https://private.example/", true)],
        windows: vec![window(1, true)],
    };
    let mut settings = Settings::default();
    settings.active_session = Some(ActiveSessionPointer {
        name: "old".into(),
        id: "old-id".into(),
        session_start_time: Utc::now(),
    });
    let fx = fixture(settings, browser);
    let mut rx = fx.events.subscribe();

    let err = fx
        .coordinator
        .save_current_session("empty", Vec::new(), CaptureScope::AllWindows)
        .await
        .unwrap_err();

    assert!(matches!(err, SessionError::EmptyCapture));
    assert!(fx.store.list_sessions().await.unwrap().is_empty());
    // Capture failed before the pointer side effect; the old pointer stays.
    assert_eq!(fx.settings.active_session().unwrap().id, "old-id");
    assert!(matches!(rx.try_recv(), Err(TryRecvError::Empty)));
}

#[tokio::test]
async fn tracked_save_sets_active_pointer_and_untracked_clears_it() {
    let mut settings = Settings::default();
    settings.track_active_session = true;
    let fx = fixture(settings, default_browser());

    let session = fx
        .coordinator
        .save_current_session("tracked", Vec::new(), CaptureScope::AllWindows)
        .await
        .unwrap();
    let pointer = fx.settings.active_session().unwrap();
    assert_eq!(pointer.id, session.id);
    assert_eq!(pointer.name, "tracked");

    // Disable tracking: the next save clears the stale pointer.
    let mut settings = fx.settings.snapshot();
    settings.track_active_session = false;
    fx.settings.update(settings).unwrap();

    fx.coordinator
        .save_current_session("untracked", Vec::new(), CaptureScope::AllWindows)
        .await
        .unwrap();
    assert!(fx.settings.active_session().is_none());
}

#[tokio::test]
async fn device_tag_appended_once_across_repeated_saves() {
    let mut settings = Settings::default();
    settings.save_device_name = true;
    settings.device_name = "Laptop".into();
    let fx = fixture(settings, default_browser());

    let session = manual_session("abc", "work session", &["work"]);
    let saved = fx.coordinator.save(session, true, false).await.unwrap();
    assert_eq!(saved.tag, vec!["work".to_string(), "Laptop".to_string()]);

    let saved_again = fx.coordinator.save(saved, true, false).await.unwrap();
    assert_eq!(
        saved_again.tag,
        vec!["work".to_string(), "Laptop".to_string()]
    );
}

#[tokio::test]
async fn sync_originated_save_skips_device_tag() {
    let mut settings = Settings::default();
    settings.save_device_name = true;
    settings.device_name = "Laptop".into();
    let fx = fixture(settings, default_browser());
    let mut rx = fx.events.subscribe();

    let saved = fx
        .coordinator
        .save(manual_session("abc", "synced", &["work"]), true, true)
        .await
        .unwrap();
    assert_eq!(saved.tag, vec!["work".to_string()]);

    match rx.try_recv().unwrap() {
        SessionEvent::SaveSession { save_by_sync, .. } => assert!(save_by_sync),
        other => panic!("unexpected event: {other:?}"),
    }
}

#[tokio::test]
async fn remove_clears_matching_pointer_and_queues_tombstone_once() {
    let mut settings = Settings::default();
    settings.active_session = Some(ActiveSessionPointer {
        name: "work session".into(),
        id: "abc".into(),
        session_start_time: Utc::now(),
    });
    let fx = fixture(settings, default_browser());
    let mut rx = fx.events.subscribe();

    fx.store
        .put_session(&manual_session("abc", "work session", &[]))
        .await
        .unwrap();

    fx.coordinator.remove("abc", true).await.unwrap();

    assert!(fx.store.get_session("abc").await.unwrap().is_none());
    assert!(fx.settings.active_session().is_none());
    assert_eq!(fx.store.removed_ids().await.unwrap(), vec!["abc".to_string()]);
    assert_eq!(
        rx.try_recv().unwrap(),
        SessionEvent::DeleteSession { id: "abc".into() }
    );
}

#[tokio::test]
async fn remove_keeps_unrelated_pointer() {
    let mut settings = Settings::default();
    settings.active_session = Some(ActiveSessionPointer {
        name: "other".into(),
        id: "other-id".into(),
        session_start_time: Utc::now(),
    });
    let fx = fixture(settings, default_browser());

    fx.store
        .put_session(&manual_session("abc", "doomed", &[]))
        .await
        .unwrap();
    fx.coordinator.remove("abc", false).await.unwrap();

    assert_eq!(fx.settings.active_session().unwrap().id, "other-id");
}

#[tokio::test]
async fn rename_missing_id_is_a_silent_noop() {
    let fx = fixture(Settings::default(), default_browser());
    let mut rx = fx.events.subscribe();

    let result = fx.coordinator.rename("missing-id", "New Name").await.unwrap();
    assert!(result.is_none());
    assert!(fx.store.list_sessions().await.unwrap().is_empty());
    assert!(matches!(rx.try_recv(), Err(TryRecvError::Empty)));
}

#[tokio::test]
async fn rename_trims_and_bumps_edited_time() {
    let fx = fixture(Settings::default(), default_browser());
    let mut rx = fx.events.subscribe();

    let mut session = manual_session("abc", "old name", &[]);
    session.last_edited_time = Utc::now() - Duration::hours(1);
    let before = session.last_edited_time;
    fx.store.put_session(&session).await.unwrap();

    let renamed = fx
        .coordinator
        .rename("abc", "  New Name  ")
        .await
        .unwrap()
        .unwrap();
    assert_eq!(renamed.name, "New Name");
    assert!(renamed.last_edited_time > before);

    match rx.try_recv().unwrap() {
        SessionEvent::UpdateSession { session, .. } => assert_eq!(session.name, "New Name"),
        other => panic!("unexpected event: {other:?}"),
    }
}

#[tokio::test]
async fn update_without_touch_keeps_edited_time() {
    let fx = fixture(Settings::default(), default_browser());

    let mut session = manual_session("abc", "name", &[]);
    session.last_edited_time = Utc::now() - Duration::hours(2);
    let frozen = session.last_edited_time;
    fx.store.put_session(&session).await.unwrap();

    let updated = fx
        .coordinator
        .update(session.clone(), false, false, false)
        .await
        .unwrap();
    assert_eq!(updated.last_edited_time, frozen);

    let touched = fx.coordinator.update(session, false, true, false).await.unwrap();
    assert!(touched.last_edited_time > frozen);
}

#[tokio::test]
async fn delete_all_empties_the_store_and_notifies() {
    let fx = fixture(Settings::default(), default_browser());
    let mut rx = fx.events.subscribe();

    for id in ["a", "b", "c"] {
        fx.store
            .put_session(&manual_session(id, id, &[]))
            .await
            .unwrap();
    }

    fx.coordinator.delete_all().await.unwrap();

    assert!(fx.store.list_sessions().await.unwrap().is_empty());
    assert_eq!(rx.try_recv().unwrap(), SessionEvent::DeleteAll);

    // Already-empty store: still completes and still notifies.
    fx.coordinator.delete_all().await.unwrap();
    assert_eq!(rx.try_recv().unwrap(), SessionEvent::DeleteAll);
}

#[tokio::test]
async fn current_window_scope_counts_only_focused_window() {
    let browser = ScriptedBrowser {
        tabs: vec![
            tab(1, 1, "https://a.example/", false),
            tab(2, 1, "https://b.example/", false),
            tab(3, 1, "https://private.example/", true),
            tab(4, 2, "https://elsewhere.example/", false),
        ],
        windows: vec![window(1, true), window(2, false)],
    };
    let fx = fixture(Settings::default(), browser);

    let session = fx
        .coordinator
        .save_current_session("scoped", Vec::new(), CaptureScope::CurrentWindowOnly)
        .await
        .unwrap();

    assert_eq!(session.tabs_number, 2);
    assert_eq!(session.windows_number, 1);
}
