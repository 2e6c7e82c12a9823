use std::path::Path;

use chrono::Utc;
use rusqlite::{params, Connection, OptionalExtension};
use serde_json::Value;
use uuid::Uuid;

use clawforge_canon::sha256_hex_of_value;

use crate::error::{AuditError, AuditResult};
use crate::event::AuditEvent;

/// A synchronous SQLite-backed audit log. One `runs` row per session and
/// one `events` row per appended, hash-chained event.
pub struct AuditStore {
    conn: Connection,
}

impl AuditStore {
    /// Opens (creating if absent) the audit database at `db_path` and
    /// ensures its schema exists.
    pub fn open(db_path: &Path) -> AuditResult<Self> {
        if let Some(parent) = db_path.parent() {
            let _ = std::fs::create_dir_all(parent);
        }
        let conn = Connection::open(db_path)?;
        let store = Self { conn };
        store.initialize_schema()?;
        Ok(store)
    }

    /// Opens an in-memory database, for tests and one-shot validations.
    pub fn open_in_memory() -> AuditResult<Self> {
        let conn = Connection::open_in_memory()?;
        let store = Self { conn };
        store.initialize_schema()?;
        Ok(store)
    }

    fn initialize_schema(&self) -> AuditResult<()> {
        self.conn.execute_batch(
            r#"
            CREATE TABLE IF NOT EXISTS runs (
                run_id TEXT PRIMARY KEY,
                actor TEXT,
                host TEXT,
                correlation TEXT,
                meta TEXT,
                created_at TEXT NOT NULL
            );
            CREATE TABLE IF NOT EXISTS events (
                run_id TEXT NOT NULL,
                seq INTEGER NOT NULL,
                event_id TEXT NOT NULL,
                timestamp TEXT NOT NULL,
                payload TEXT NOT NULL,
                prev_hash TEXT,
                hash TEXT NOT NULL,
                PRIMARY KEY (run_id, seq),
                FOREIGN KEY (run_id) REFERENCES runs (run_id)
            );
            "#,
        )?;
        Ok(())
    }

    /// Registers a new run. `meta` is stored as opaque JSON and never
    /// interpreted by this crate.
    pub fn create_run(
        &self,
        run_id: Uuid,
        actor: Option<&str>,
        host: Option<&str>,
        correlation: Option<&str>,
        meta: Option<&Value>,
    ) -> AuditResult<()> {
        let meta_text = meta.map(|m| m.to_string());
        self.conn.execute(
            "INSERT INTO runs (run_id, actor, host, correlation, meta, created_at) VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
            params![run_id.to_string(), actor, host, correlation, meta_text, Utc::now().to_rfc3339()],
        )?;
        Ok(())
    }

    fn last_event(&self, run_id: Uuid) -> AuditResult<Option<AuditEvent>> {
        let mut stmt = self.conn.prepare(
            "SELECT seq, event_id, timestamp, payload, prev_hash, hash FROM events WHERE run_id = ?1 ORDER BY seq DESC LIMIT 1",
        )?;
        let row = stmt
            .query_row(params![run_id.to_string()], |row| row_to_event(row, run_id))
            .optional()?;
        Ok(row)
    }

    /// Appends one event to `run_id`'s chain, computing `seq`, `hash`, and
    /// `prevHash` from the current tail of the chain.
    pub fn append_event(&self, run_id: Uuid, payload: Value) -> AuditResult<AuditEvent> {
        let run_exists: Option<String> =
            self.conn.query_row("SELECT run_id FROM runs WHERE run_id = ?1", params![run_id.to_string()], |row| row.get(0)).optional()?;
        if run_exists.is_none() {
            return Err(AuditError::RunNotFound(run_id));
        }

        let previous = self.last_event(run_id)?;
        let seq = previous.as_ref().map_or(1, |e| e.seq + 1);
        let prev_hash = previous.map(|e| e.hash);

        let mut event = AuditEvent {
            seq,
            event_id: Uuid::new_v4(),
            run_id,
            timestamp: Utc::now().to_rfc3339(),
            payload,
            prev_hash,
            hash: String::new(),
        };
        event.hash = sha256_hex_of_value(&event.hashed_payload())?;

        self.conn.execute(
            "INSERT INTO events (run_id, seq, event_id, timestamp, payload, prev_hash, hash) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
            params![
                run_id.to_string(),
                event.seq,
                event.event_id.to_string(),
                event.timestamp,
                event.payload.to_string(),
                event.prev_hash,
                event.hash,
            ],
        )?;

        Ok(event)
    }

    /// Lists every event for `run_id` in chain order.
    pub fn list_events(&self, run_id: Uuid) -> AuditResult<Vec<AuditEvent>> {
        let mut stmt = self
            .conn
            .prepare("SELECT seq, event_id, timestamp, payload, prev_hash, hash FROM events WHERE run_id = ?1 ORDER BY seq ASC")?;
        let rows = stmt.query_map(params![run_id.to_string()], |row| row_to_event(row, run_id))?;
        let mut events = Vec::new();
        for row in rows {
            events.push(row?);
        }
        Ok(events)
    }
}

fn row_to_event(row: &rusqlite::Row<'_>, run_id: Uuid) -> rusqlite::Result<AuditEvent> {
    let event_id_text: String = row.get(1)?;
    let payload_text: String = row.get(3)?;
    Ok(AuditEvent {
        seq: row.get(0)?,
        event_id: Uuid::parse_str(&event_id_text).unwrap_or_else(|_| Uuid::nil()),
        run_id,
        timestamp: row.get(2)?,
        payload: serde_json::from_str(&payload_text).unwrap_or(Value::Null),
        prev_hash: row.get(4)?,
        hash: row.get(5)?,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn appended_events_form_a_verifiable_chain() {
        let store = AuditStore::open_in_memory().unwrap();
        let run_id = Uuid::new_v4();
        store.create_run(run_id, Some("alice"), None, None, None).unwrap();
        store.append_event(run_id, json!({"kind": "gate_passed"})).unwrap();
        store.append_event(run_id, json!({"kind": "evidence_appended"})).unwrap();

        let events = store.list_events(run_id).unwrap();
        assert_eq!(events.len(), 2);
        assert_eq!(events[0].seq, 1);
        assert!(events[0].prev_hash.is_none());
        assert_eq!(events[1].prev_hash.as_deref(), Some(events[0].hash.as_str()));
        crate::chain::verify_chain(&events).unwrap();
    }

    #[test]
    fn appending_to_unknown_run_is_rejected() {
        let store = AuditStore::open_in_memory().unwrap();
        let err = store.append_event(Uuid::new_v4(), json!({})).unwrap_err();
        assert!(matches!(err, AuditError::RunNotFound(_)));
    }
}
