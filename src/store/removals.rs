use anyhow::{Context, Result};
use chrono::Utc;
use rusqlite::params;

use crate::store::Database;

impl Database {
    /// Appends a deleted session id to the removal queue. The queue is
    /// consumed elsewhere (undo, cloud-sync tombstones); this side only
    /// ever pushes.
    pub async fn push_removed(&self, session_id: &str) -> Result<()> {
        let session_id = session_id.to_string();
        self.execute(move |conn| {
            conn.execute(
                "INSERT INTO removal_queue (session_id, removed_at) VALUES (?1, ?2)",
                params![session_id, Utc::now().to_rfc3339()],
            )
            .with_context(|| "failed to push removed session")?;
            Ok(())
        })
        .await
    }

    pub async fn removed_ids(&self) -> Result<Vec<String>> {
        self.execute(|conn| {
            let mut stmt = conn.prepare(
                "SELECT session_id FROM removal_queue ORDER BY position ASC",
            )?;

            let mut rows = stmt.query([])?;
            let mut ids = Vec::new();
            while let Some(row) = rows.next()? {
                ids.push(row.get::<_, String>(0)?);
            }

            Ok(ids)
        })
        .await
    }
}
