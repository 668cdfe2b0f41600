//! SQLite persistence for user feedback.
//!
//! One append-only table of feedback rows. Writes go through a single
//! connection behind an async mutex, which is what guarantees each insert
//! a unique, monotonically increasing id. WAL mode keeps concurrent reads
//! cheap during writes.

use std::path::Path;

use chrono::{DateTime, Utc};
use rusqlite::{params, Connection};
use serde::Serialize;
use tokio::sync::Mutex;

use crate::classifier::Label;

const SCHEMA: &str = r#"
CREATE TABLE IF NOT EXISTS feedback (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    comment TEXT NOT NULL,
    toxic INTEGER NOT NULL DEFAULT 0,
    severe_toxic INTEGER NOT NULL DEFAULT 0,
    obscene INTEGER NOT NULL DEFAULT 0,
    threat INTEGER NOT NULL DEFAULT 0,
    insult INTEGER NOT NULL DEFAULT 0,
    identity_hate INTEGER NOT NULL DEFAULT 0,
    timestamp TEXT NOT NULL
);
"#;

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("Database error: {0}")]
    Sqlite(#[from] rusqlite::Error),
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Membership of a feedback submission against the fixed label vocabulary.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct LabelFlags {
    pub toxic: bool,
    pub severe_toxic: bool,
    pub obscene: bool,
    pub threat: bool,
    pub insult: bool,
    pub identity_hate: bool,
}

impl LabelFlags {
    /// Builds the six membership indicators from a set of labels.
    /// Duplicates are harmless.
    pub fn from_labels(labels: &[Label]) -> Self {
        let mut flags = Self::default();
        for label in labels {
            match label {
                Label::Toxic => flags.toxic = true,
                Label::SevereToxic => flags.severe_toxic = true,
                Label::Obscene => flags.obscene = true,
                Label::Threat => flags.threat = true,
                Label::Insult => flags.insult = true,
                Label::IdentityHate => flags.identity_hate = true,
            }
        }
        flags
    }

    pub fn contains(&self, label: Label) -> bool {
        match label {
            Label::Toxic => self.toxic,
            Label::SevereToxic => self.severe_toxic,
            Label::Obscene => self.obscene,
            Label::Threat => self.threat,
            Label::Insult => self.insult,
            Label::IdentityHate => self.identity_hate,
        }
    }
}

/// One persisted feedback submission. Immutable once written; no exposed
/// operation deletes rows.
#[derive(Debug, Clone, Serialize)]
pub struct FeedbackEntry {
    pub id: i64,
    pub comment: String,
    pub toxic: bool,
    pub severe_toxic: bool,
    pub obscene: bool,
    pub threat: bool,
    pub insult: bool,
    pub identity_hate: bool,
    pub timestamp: DateTime<Utc>,
}

/// File-backed feedback store over a single SQLite connection.
pub struct FeedbackStore {
    conn: Mutex<Connection>,
}

impl FeedbackStore {
    /// Open or create a feedback database at `path`.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self, StoreError> {
        let path = path.as_ref();
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }

        let conn = Connection::open(path)?;
        conn.execute_batch(
            "PRAGMA journal_mode = WAL;
             PRAGMA synchronous = NORMAL;
             PRAGMA temp_store = MEMORY;",
        )?;
        conn.execute_batch(SCHEMA)?;

        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    /// In-memory store, used by tests.
    pub fn open_in_memory() -> Result<Self, StoreError> {
        let conn = Connection::open_in_memory()?;
        conn.execute_batch(SCHEMA)?;
        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    /// Appends one feedback row and returns its store-assigned id.
    ///
    /// The comment is stored verbatim and the timestamp is assigned here,
    /// never by the client. A single INSERT statement, so the write is
    /// all-or-nothing.
    pub async fn insert(&self, comment: &str, flags: LabelFlags) -> Result<i64, StoreError> {
        let conn = self.conn.lock().await;
        conn.execute(
            "INSERT INTO feedback
             (comment, toxic, severe_toxic, obscene, threat, insult, identity_hate, timestamp)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)",
            params![
                comment,
                flags.toxic,
                flags.severe_toxic,
                flags.obscene,
                flags.threat,
                flags.insult,
                flags.identity_hate,
                Utc::now(),
            ],
        )?;
        Ok(conn.last_insert_rowid())
    }

    /// Total number of feedback rows.
    pub async fn count(&self) -> Result<u64, StoreError> {
        let conn = self.conn.lock().await;
        let count: i64 = conn.query_row("SELECT COUNT(*) FROM feedback", [], |row| row.get(0))?;
        Ok(count as u64)
    }

    /// Returns up to `limit` rows starting at `offset`, ordered by id
    /// ascending (insertion order). `limit = 0` and an offset past the end
    /// both yield an empty vector, not an error.
    pub async fn list(&self, limit: u32, offset: u32) -> Result<Vec<FeedbackEntry>, StoreError> {
        let conn = self.conn.lock().await;
        let mut stmt = conn.prepare(
            "SELECT id, comment, toxic, severe_toxic, obscene, threat, insult, identity_hate, timestamp
             FROM feedback
             ORDER BY id ASC
             LIMIT ?1 OFFSET ?2",
        )?;

        let rows = stmt.query_map(params![limit, offset], |row| {
            Ok(FeedbackEntry {
                id: row.get(0)?,
                comment: row.get(1)?,
                toxic: row.get(2)?,
                severe_toxic: row.get(3)?,
                obscene: row.get(4)?,
                threat: row.get(5)?,
                insult: row.get(6)?,
                identity_hate: row.get(7)?,
                timestamp: row.get(8)?,
            })
        })?;

        let mut entries = Vec::new();
        for row in rows {
            entries.push(row?);
        }
        Ok(entries)
    }
}
