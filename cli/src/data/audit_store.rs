//! Local audit trail of tag reads and writes.
//!
//! Entries live in SQLite next to the rest of battag's data. The store is
//! handed to callers explicitly, never reached through a global.

use std::path::{Path, PathBuf};

use battag_record::{BatteryRecord, RecordError};
use chrono::{DateTime, Utc};
use rusqlite::{params, Connection, OptionalExtension};
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::config::data_dir;

const CURRENT_SCHEMA_VERSION: i32 = 1;
const DATABASE_NAME: &str = "audit.db";

/// Minute precision, UTC.
pub const AUDIT_TIME_FORMAT: &str = "%Y-%m-%d %H:%M";

/// What happened to the record being logged.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LogKind {
    Read,
    Write,
    /// A record file was opened for viewing.
    ViewImport,
    /// A record file was written to a tag.
    ImportWrite,
}

impl LogKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            LogKind::Read => "read",
            LogKind::Write => "write",
            LogKind::ViewImport => "view_import",
            LogKind::ImportWrite => "import_write",
        }
    }

    /// Unrecognized kinds read back as `Read`.
    pub fn from_str(s: &str) -> Self {
        match s {
            "write" => LogKind::Write,
            "view_import" => LogKind::ViewImport,
            "import_write" => LogKind::ImportWrite,
            _ => LogKind::Read,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LogEntry {
    pub time: String,
    #[serde(rename = "type")]
    pub kind: LogKind,
    pub data: BatteryRecord,
}

/// Errors that can occur during audit log operations
#[derive(Debug, thiserror::Error)]
pub enum AuditStoreError {
    #[error("Database error: {0}")]
    Database(#[from] rusqlite::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialize(#[from] serde_json::Error),

    #[error("Stored record is unreadable: {0}")]
    Record(#[from] RecordError),
}

pub type Result<T> = std::result::Result<T, AuditStoreError>;

/// Append-only log of record snapshots.
pub trait AuditLog {
    /// Store `record` unless it serializes identically to the most recent
    /// entry. Returns whether an entry was added.
    fn append_at(&mut self, kind: LogKind, record: &BatteryRecord, time: DateTime<Utc>)
        -> Result<bool>;

    fn append(&mut self, kind: LogKind, record: &BatteryRecord) -> Result<bool> {
        self.append_at(kind, record, Utc::now())
    }

    /// All entries, oldest first.
    fn list(&self) -> Result<Vec<LogEntry>>;

    fn clear(&mut self) -> Result<()>;
}

fn format_time(time: DateTime<Utc>) -> String {
    time.format(AUDIT_TIME_FORMAT).to_string()
}

/// Audit log backed by SQLite
pub struct SqliteAuditLog {
    conn: Connection,
    path: PathBuf,
}

impl SqliteAuditLog {
    /// Open or create the audit database in the data directory
    pub fn open() -> Result<Self> {
        let dir = data_dir();
        std::fs::create_dir_all(&dir)?;
        Self::open_at(&dir.join(DATABASE_NAME))
    }

    pub fn open_at(path: &Path) -> Result<Self> {
        let conn = Connection::open(path)?;

        conn.execute_batch(
            "PRAGMA journal_mode=WAL;
             PRAGMA synchronous=NORMAL;
             PRAGMA busy_timeout=5000;",
        )?;

        Self::with_connection(conn, path.to_path_buf())
    }

    #[cfg(test)]
    pub fn open_in_memory() -> Result<Self> {
        Self::with_connection(Connection::open_in_memory()?, PathBuf::from(":memory:"))
    }

    fn with_connection(conn: Connection, path: PathBuf) -> Result<Self> {
        let mut store = Self { conn, path };
        store.initialize_schema()?;
        Ok(store)
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn initialize_schema(&mut self) -> Result<()> {
        let exists: bool = self.conn.query_row(
            "SELECT COUNT(*) > 0 FROM sqlite_master WHERE type='table' AND name='schema_version'",
            [],
            |row| row.get(0),
        )?;

        if exists {
            let version: i32 = self
                .conn
                .query_row("SELECT version FROM schema_version LIMIT 1", [], |row| {
                    row.get(0)
                })
                .optional()?
                .unwrap_or(0);
            if version > CURRENT_SCHEMA_VERSION {
                warn!(version, "audit database was written by a newer battag");
            }
            return Ok(());
        }

        let tx = self.conn.transaction()?;
        tx.execute_batch(
            r#"
            CREATE TABLE schema_version (
                version INTEGER NOT NULL
            );

            CREATE TABLE audit_log (
                id INTEGER PRIMARY KEY,
                time TEXT NOT NULL,
                kind TEXT NOT NULL,
                data TEXT NOT NULL
            );
            "#,
        )?;
        tx.execute(
            "INSERT INTO schema_version (version) VALUES (?)",
            [CURRENT_SCHEMA_VERSION],
        )?;
        tx.commit()?;
        Ok(())
    }

    fn last_raw(&self) -> Result<Option<String>> {
        Ok(self
            .conn
            .query_row(
                "SELECT data FROM audit_log ORDER BY id DESC LIMIT 1",
                [],
                |row| row.get(0),
            )
            .optional()?)
    }

    pub fn count(&self) -> Result<i64> {
        Ok(self
            .conn
            .query_row("SELECT COUNT(*) FROM audit_log", [], |row| row.get(0))?)
    }
}

impl AuditLog for SqliteAuditLog {
    fn append_at(
        &mut self,
        kind: LogKind,
        record: &BatteryRecord,
        time: DateTime<Utc>,
    ) -> Result<bool> {
        let raw = record.to_json()?;
        if self.last_raw()?.as_deref() == Some(raw.as_str()) {
            debug!(kind = kind.as_str(), sn = %record.sn, "skipping duplicate audit entry");
            return Ok(false);
        }

        self.conn.execute(
            "INSERT INTO audit_log (time, kind, data) VALUES (?, ?, ?)",
            params![format_time(time), kind.as_str(), raw],
        )?;
        debug!(kind = kind.as_str(), sn = %record.sn, "audit entry stored");
        Ok(true)
    }

    fn list(&self) -> Result<Vec<LogEntry>> {
        let mut stmt = self
            .conn
            .prepare("SELECT time, kind, data FROM audit_log ORDER BY id ASC")?;

        let rows = stmt
            .query_map([], |row| {
                Ok((
                    row.get::<_, String>(0)?,
                    row.get::<_, String>(1)?,
                    row.get::<_, String>(2)?,
                ))
            })?
            .collect::<std::result::Result<Vec<_>, _>>()?;

        rows.into_iter()
            .map(|(time, kind, data)| {
                Ok(LogEntry {
                    time,
                    kind: LogKind::from_str(&kind),
                    data: BatteryRecord::parse(&data)?,
                })
            })
            .collect()
    }

    fn clear(&mut self) -> Result<()> {
        let removed = self.conn.execute("DELETE FROM audit_log", [])?;
        debug!(removed, "audit log cleared");
        Ok(())
    }
}

/// In-memory audit log.
#[cfg(test)]
#[derive(Debug, Default)]
pub struct MemoryAuditLog {
    entries: Vec<LogEntry>,
}

#[cfg(test)]
impl MemoryAuditLog {
    pub fn new() -> Self {
        Self::default()
    }
}

#[cfg(test)]
impl AuditLog for MemoryAuditLog {
    fn append_at(
        &mut self,
        kind: LogKind,
        record: &BatteryRecord,
        time: DateTime<Utc>,
    ) -> Result<bool> {
        let raw = record.to_json()?;
        if let Some(last) = self.entries.last() {
            if last.data.to_json()? == raw {
                return Ok(false);
            }
        }

        self.entries.push(LogEntry {
            time: format_time(time),
            kind,
            data: record.clone(),
        });
        Ok(true)
    }

    fn list(&self) -> Result<Vec<LogEntry>> {
        Ok(self.entries.clone())
    }

    fn clear(&mut self) -> Result<()> {
        self.entries.clear();
        Ok(())
    }
}
