use crate::error::Result;
use crate::events::Event;
use crate::storage::Storage;
use chrono::{DateTime, Utc};
use rusqlite::params;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EventRecord {
    pub seq: i64,
    pub name: String,
    pub payload: serde_json::Value,
    pub recorded_at: DateTime<Utc>,
}

impl EventRecord {
    pub fn decode<E: DeserializeOwned>(&self) -> Result<E> {
        Ok(serde_json::from_value(self.payload.clone())?)
    }
}

pub struct EventStore<'a> {
    storage: &'a Storage,
}

impl<'a> EventStore<'a> {
    pub fn new(storage: &'a Storage) -> Self {
        Self { storage }
    }

    /// Append events in order, returning the sequence number of the last one.
    pub async fn append<E: Event>(
        &self,
        component: &str,
        events: &[E],
        recorded_at: DateTime<Utc>,
    ) -> Result<Option<i64>> {
        let mut conn = self.storage.get_connection().await;
        let tx = conn.transaction()?;

        let mut last = None;
        for event in events {
            let payload = serde_json::to_string(event)?;
            tx.execute(
                "INSERT INTO events (component, name, payload, recorded_at)
                 VALUES (?1, ?2, ?3, ?4)",
                params![component, event.name(), payload, recorded_at.timestamp()],
            )?;
            last = Some(tx.last_insert_rowid());
        }
        tx.commit()?;

        tracing::debug!("Appended {} events for {}", events.len(), component);
        Ok(last)
    }

    pub async fn list(&self, component: &str) -> Result<Vec<EventRecord>> {
        let conn = self.storage.get_connection().await;

        let mut stmt = conn.prepare(
            "SELECT seq, name, payload, recorded_at
             FROM events WHERE component = ?1 ORDER BY seq ASC",
        )?;

        let rows = stmt.query_map(params![component], |row| {
            let payload: String = row.get(2)?;
            let recorded_at: i64 = row.get(3)?;
            Ok((row.get::<_, i64>(0)?, row.get::<_, String>(1)?, payload, recorded_at))
        })?;

        let mut records = Vec::new();
        for row in rows {
            let (seq, name, payload, recorded_at) = row?;
            records.push(EventRecord {
                seq,
                name,
                payload: serde_json::from_str(&payload)?,
                recorded_at: DateTime::from_timestamp(recorded_at, 0).unwrap_or_else(Utc::now),
            });
        }

        Ok(records)
    }

    pub async fn count(&self, component: &str) -> Result<u64> {
        let conn = self.storage.get_connection().await;
        let count: i64 = conn.query_row(
            "SELECT COUNT(*) FROM events WHERE component = ?1",
            params![component],
            |row| row.get(0),
        )?;
        Ok(count as u64)
    }
}
