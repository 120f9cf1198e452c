use anyhow::{Context, Result};
use rusqlite::{params, OptionalExtension};

use crate::models::Session;
use crate::store::Database;

impl Database {
    pub async fn put_session(&self, session: &Session) -> Result<()> {
        let record = session.clone();
        self.execute(move |conn| {
            let document =
                serde_json::to_string(&record).context("failed to serialize session")?;
            conn.execute(
                "INSERT OR REPLACE INTO sessions (id, name, date, last_edited_time, document)
                 VALUES (?1, ?2, ?3, ?4, ?5)",
                params![
                    record.id,
                    record.name,
                    record.date.to_rfc3339(),
                    record.last_edited_time.to_rfc3339(),
                    document,
                ],
            )
            .with_context(|| "failed to write session")?;
            Ok(())
        })
        .await
    }

    pub async fn get_session(&self, session_id: &str) -> Result<Option<Session>> {
        let session_id = session_id.to_string();
        self.execute(move |conn| {
            let document: Option<String> = conn
                .query_row(
                    "SELECT document FROM sessions WHERE id = ?1",
                    params![session_id],
                    |row| row.get(0),
                )
                .optional()?;

            match document {
                Some(document) => Ok(Some(
                    serde_json::from_str(&document)
                        .context("failed to parse stored session")?,
                )),
                None => Ok(None),
            }
        })
        .await
    }

    pub async fn delete_session(&self, session_id: &str) -> Result<()> {
        let session_id = session_id.to_string();
        self.execute(move |conn| {
            conn.execute(
                "DELETE FROM sessions WHERE id = ?1",
                params![session_id],
            )
            .with_context(|| "failed to delete session")?;
            Ok(())
        })
        .await
    }

    pub async fn delete_all_sessions(&self) -> Result<()> {
        self.execute(|conn| {
            conn.execute("DELETE FROM sessions", [])
                .with_context(|| "failed to clear sessions")?;
            Ok(())
        })
        .await
    }

    pub async fn list_sessions(&self) -> Result<Vec<Session>> {
        self.execute(|conn| {
            let mut stmt = conn.prepare(
                "SELECT document FROM sessions ORDER BY date DESC",
            )?;

            let mut rows = stmt.query([])?;
            let mut sessions = Vec::new();
            while let Some(row) = rows.next()? {
                let document: String = row.get(0)?;
                sessions.push(
                    serde_json::from_str(&document)
                        .context("failed to parse stored session")?,
                );
            }

            Ok(sessions)
        })
        .await
    }
}
