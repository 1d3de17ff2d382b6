use crate::error::Result;
use crate::storage::Storage;
use chrono::{DateTime, Utc};
use rusqlite::{params, OptionalExtension};
use serde::de::DeserializeOwned;
use serde::Serialize;

pub struct SnapshotStore<'a> {
    storage: &'a Storage,
}

impl<'a> SnapshotStore<'a> {
    pub fn new(storage: &'a Storage) -> Self {
        Self { storage }
    }

    /// Replace the stored state of `component`.
    pub async fn save<T: Serialize>(
        &self,
        component: &str,
        state: &T,
        saved_at: DateTime<Utc>,
    ) -> Result<()> {
        let conn = self.storage.get_connection().await;
        let data = serde_json::to_string(state)?;

        conn.execute(
            "INSERT OR REPLACE INTO snapshots (component, data, saved_at)
             VALUES (?1, ?2, ?3)",
            params![component, data, saved_at.timestamp()],
        )?;

        tracing::info!("Saved snapshot for {}", component);
        Ok(())
    }

    pub async fn load<T: DeserializeOwned>(&self, component: &str) -> Result<Option<T>> {
        let conn = self.storage.get_connection().await;

        let data: Option<String> = conn
            .query_row(
                "SELECT data FROM snapshots WHERE component = ?1",
                params![component],
                |row| row.get(0),
            )
            .optional()?;

        match data {
            Some(json) => Ok(Some(serde_json::from_str(&json)?)),
            None => Ok(None),
        }
    }

    pub async fn delete(&self, component: &str) -> Result<()> {
        let conn = self.storage.get_connection().await;
        conn.execute(
            "DELETE FROM snapshots WHERE component = ?1",
            params![component],
        )?;
        Ok(())
    }
}
