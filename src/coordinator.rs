use std::sync::Arc;

use chrono::{DateTime, Utc};

use crate::browser::{BrowserApi, Capabilities};
use crate::capture::{CaptureOptions, CaptureScope, SessionCapture};
use crate::error::{Result, SessionError};
use crate::models::{ActiveSessionPointer, Session};
use crate::notify::{EventBus, SessionEvent};
use crate::settings::SettingsStore;
use crate::store::Database;
use crate::sync::CloudSync;
use crate::tag;
use crate::{log_error, log_info};

const ENABLE_LOGS: bool = true;

/// Orchestrates session persistence and its side effects: active-session
/// tracking, the removal queue, change notification, and cloud-sync
/// triggering.
///
/// Within one call, the store write/delete completes before the matching
/// event is broadcast. Across concurrent calls nothing is ordered; the
/// store itself is last-write-wins per id.
#[derive(Clone)]
pub struct SessionCoordinator {
    store: Database,
    settings: Arc<SettingsStore>,
    capture: Arc<SessionCapture>,
    events: EventBus,
    sync: Arc<dyn CloudSync>,
    session_start_time: DateTime<Utc>,
}

impl SessionCoordinator {
    pub fn new(
        store: Database,
        settings: Arc<SettingsStore>,
        browser: Arc<dyn BrowserApi>,
        capabilities: Capabilities,
        events: EventBus,
        sync: Arc<dyn CloudSync>,
        session_start_time: DateTime<Utc>,
    ) -> Self {
        Self {
            store,
            settings,
            capture: Arc::new(SessionCapture::new(browser, capabilities)),
            events,
            sync,
            session_start_time,
        }
    }

    pub fn events(&self) -> &EventBus {
        &self.events
    }

    /// Captures the live browser state under `name`/`tags` and saves it.
    /// Capture failures propagate without touching any state.
    pub async fn save_current_session(
        &self,
        name: &str,
        tags: Vec<String>,
        scope: CaptureScope,
    ) -> Result<Session> {
        log_info!("save_current_session() '{}' {:?}", name, scope);
        let settings = self.settings.snapshot();
        let options = CaptureOptions::from_settings(scope, &settings);
        let session = self
            .capture
            .capture(name, tags, &options, self.session_start_time)
            .await?;

        // Saving implicitly resets the active session: tracked saves point
        // at the new record, untracked saves clear any stale pointer.
        let pointer = settings
            .track_active_session
            .then(|| ActiveSessionPointer {
                name: session.name.clone(),
                id: session.id.clone(),
                session_start_time: Utc::now(),
            });
        if let Err(err) = self.settings.set_active_session(pointer) {
            log_error!("failed to persist active session pointer: {err:#}");
        }

        self.save(session, true, false).await
    }

    /// Persists a session. When device-name tagging is on and the save did
    /// not originate from sync, the device tag is appended once.
    pub async fn save(
        &self,
        mut session: Session,
        notify: bool,
        from_sync: bool,
    ) -> Result<Session> {
        log_info!("save() {} '{}'", session.id, session.name);
        let settings = self.settings.snapshot();
        if settings.save_device_name && !from_sync {
            if let Some(device_tag) = tag::validated_tag(&settings.device_name, &session) {
                let device_tag = device_tag.to_string();
                session.tag.push(device_tag);
            }
        }

        self.store.put_session(&session).await.map_err(|err| {
            log_error!("save() {err:#}");
            SessionError::StoreWrite(err)
        })?;

        if notify {
            self.events.broadcast(SessionEvent::SaveSession {
                session: session.clone(),
                save_by_sync: from_sync,
            });
            if !from_sync {
                self.spawn_auto_sync();
            }
        }
        Ok(session)
    }

    /// Persists an edited session, bumping `last_edited_time` unless
    /// suppressed.
    pub async fn update(
        &self,
        mut session: Session,
        notify: bool,
        touch_edited_time: bool,
        from_sync: bool,
    ) -> Result<Session> {
        log_info!("update() {} '{}'", session.id, session.name);
        if touch_edited_time {
            session.last_edited_time = Utc::now();
        }

        self.store.put_session(&session).await.map_err(|err| {
            log_error!("update() {err:#}");
            SessionError::StoreWrite(err)
        })?;

        if notify {
            self.events.broadcast(SessionEvent::UpdateSession {
                session: session.clone(),
                save_by_sync: from_sync,
            });
        }
        Ok(session)
    }

    /// Deletes a session. The store delete is the operation of record; once
    /// it succeeds, a matching active-session pointer is cleared (whether or
    /// not tracking is currently enabled) and the id is queued as a
    /// tombstone.
    pub async fn remove(&self, id: &str, notify: bool) -> Result<()> {
        log_info!("remove() {id}");
        self.store.delete_session(id).await.map_err(|err| {
            log_error!("remove() {err:#}");
            SessionError::StoreDelete(err)
        })?;

        if let Some(active) = self.settings.active_session() {
            if active.id == id {
                if let Err(err) = self.settings.set_active_session(None) {
                    log_error!("failed to clear active session pointer: {err:#}");
                }
            }
        }

        if let Err(err) = self.store.push_removed(id).await {
            log_error!("failed to queue removed session {id}: {err:#}");
        }

        if notify {
            self.events
                .broadcast(SessionEvent::DeleteSession { id: id.to_string() });
        }
        Ok(())
    }

    /// Renames a session. A missing id is a silent no-op.
    pub async fn rename(&self, id: &str, new_name: &str) -> Result<Option<Session>> {
        log_info!("rename() {id} -> '{new_name}'");
        let mut session = match self.store.get_session(id).await {
            Ok(Some(session)) => session,
            Ok(None) => return Ok(None),
            Err(err) => {
                log_error!("rename() {err:#}");
                return Ok(None);
            }
        };

        session.name = new_name.trim().to_string();
        self.update(session, true, true, false).await.map(Some)
    }

    /// Clears the whole store. Store errors are logged, never surfaced, so
    /// the bulk operation always completes from the caller's perspective.
    pub async fn delete_all(&self) -> Result<()> {
        log_info!("delete_all()");
        match self.store.delete_all_sessions().await {
            Ok(()) => self.events.broadcast(SessionEvent::DeleteAll),
            Err(err) => log_error!("delete_all() {err:#}"),
        }
        Ok(())
    }

    /// Errors are dropped; sync is advisory.
    fn spawn_auto_sync(&self) {
        let sync = self.sync.clone();
        tokio::spawn(async move {
            if let Err(err) = sync.trigger_auto_sync().await {
                log_error!("auto sync failed: {err:#}");
            }
        });
    }
}
