//! SQLite-backed session log.
//!
//! One row per [`LogEvent`], plus the time it was written. The JSON file
//! sink is the default; this one suits long-running logs that get queried.

use std::path::Path;

use chrono::{DateTime, Utc};
use rusqlite::{params, Connection};
use serde::{Deserialize, Serialize};

use crate::error::{DatabaseError, LogSinkError};
use crate::events::{ActionCode, LogEvent};
use crate::log_sink::LogSink;

/// A log event read back from the database.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StoredLogEvent {
    pub id: i64,
    #[serde(flatten)]
    pub event: LogEvent,
    pub logged_at: DateTime<Utc>,
}

/// SQLite database holding the `task_logs` table.
pub struct SqliteLogSink {
    conn: Connection,
}

impl SqliteLogSink {
    /// Open (or create) the log database at `path`.
    ///
    /// # Errors
    /// Returns an error if the database cannot be opened or migrated.
    pub fn open(path: impl AsRef<Path>) -> Result<Self, DatabaseError> {
        let path = path.as_ref();
        let conn = Connection::open(path).map_err(|source| DatabaseError::OpenFailed {
            path: path.to_path_buf(),
            source,
        })?;
        let db = Self { conn };
        db.migrate()?;
        tracing::debug!(path = %path.display(), "opened log database");
        Ok(db)
    }

    /// Open an in-memory database.
    ///
    /// # Errors
    /// Returns an error if SQLite cannot allocate the database.
    pub fn open_memory() -> Result<Self, DatabaseError> {
        let conn = Connection::open_in_memory()?;
        let db = Self { conn };
        db.migrate()?;
        Ok(db)
    }

    fn migrate(&self) -> Result<(), DatabaseError> {
        self.conn
            .execute_batch(
                "CREATE TABLE IF NOT EXISTS task_logs (
                    id               INTEGER PRIMARY KEY AUTOINCREMENT,
                    task_id          TEXT,
                    task_description TEXT NOT NULL,
                    task_duration    INTEGER NOT NULL,
                    action           TEXT NOT NULL,
                    extended_by      INTEGER,
                    logged_at        TEXT NOT NULL
                );

                CREATE INDEX IF NOT EXISTS idx_task_logs_task_id ON task_logs(task_id);
                CREATE INDEX IF NOT EXISTS idx_task_logs_logged_at ON task_logs(logged_at);",
            )
            .map_err(|e| DatabaseError::MigrationFailed(e.to_string()))
    }

    /// Insert one event, returning its row id.
    ///
    /// # Errors
    /// Returns an error if the insert fails.
    pub fn record(&self, event: &LogEvent) -> Result<i64, DatabaseError> {
        self.conn.execute(
            "INSERT INTO task_logs (task_id, task_description, task_duration, action, extended_by, logged_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
            params![
                event.task_id,
                event.task_description,
                event.task_duration,
                event.action.as_str(),
                event.extended_by,
                Utc::now().to_rfc3339(),
            ],
        )?;
        Ok(self.conn.last_insert_rowid())
    }

    /// The most recent `limit` events, oldest first.
    ///
    /// # Errors
    /// Returns an error if the query fails or a row holds an unknown action.
    pub fn recent(&self, limit: usize) -> Result<Vec<StoredLogEvent>, DatabaseError> {
        let limit = i64::try_from(limit).unwrap_or(i64::MAX);
        let mut stmt = self.conn.prepare(
            "SELECT id, task_id, task_description, task_duration, action, extended_by, logged_at
             FROM task_logs
             ORDER BY id DESC
             LIMIT ?1",
        )?;
        let rows = stmt.query_map(params![limit], |row| {
            Ok((
                row.get::<_, i64>(0)?,
                row.get::<_, Option<String>>(1)?,
                row.get::<_, String>(2)?,
                row.get::<_, u32>(3)?,
                row.get::<_, String>(4)?,
                row.get::<_, Option<u32>>(5)?,
                row.get::<_, String>(6)?,
            ))
        })?;

        let mut events = Vec::new();
        for row in rows {
            let (id, task_id, task_description, task_duration, action, extended_by, logged_at) =
                row?;
            let action = ActionCode::from_code(&action).ok_or_else(|| {
                DatabaseError::QueryFailed(format!("row {id} has unknown action '{action}'"))
            })?;
            let logged_at = DateTime::parse_from_rfc3339(&logged_at)
                .map_err(|e| DatabaseError::QueryFailed(format!("row {id}: {e}")))?
                .with_timezone(&Utc);
            events.push(StoredLogEvent {
                id,
                event: LogEvent {
                    task_id,
                    task_description,
                    task_duration,
                    action,
                    extended_by,
                },
                logged_at,
            });
        }
        events.reverse();
        Ok(events)
    }

    /// Number of logged events.
    pub fn count(&self) -> Result<u64, DatabaseError> {
        Ok(self
            .conn
            .query_row("SELECT COUNT(*) FROM task_logs", [], |row| row.get(0))?)
    }
}

impl LogSink for SqliteLogSink {
    fn append(&mut self, event: &LogEvent) -> Result<(), LogSinkError> {
        self.record(event)?;
        Ok(())
    }
}
