//! libSQL backend — async `MessageStore` implementation.
//!
//! Supports local file and in-memory databases.

use std::path::Path;
use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use libsql::{Connection, Database, params};
use tracing::{debug, info};
use uuid::Uuid;

use crate::error::StoreError;
use crate::store::migrations;
use crate::store::traits::{ChangeEntry, Message, MessageStore};

/// Columns selected for message reads; order matches `row_to_message`.
const MESSAGE_COLUMNS: &str = "seq, id, sender, text, created_at, processed";

/// libSQL message store.
///
/// Holds a single connection reused for all operations;
/// `libsql::Connection` is `Send + Sync` and safe for concurrent async use.
pub struct LibSqlStore {
    #[allow(dead_code)]
    db: Arc<Database>,
    conn: Connection,
}

impl LibSqlStore {
    /// Open (or create) a local database file and run migrations.
    pub async fn new_local(path: &Path) -> Result<Self, StoreError> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)
                .map_err(|e| StoreError::Open(format!("create store directory: {e}")))?;
        }

        let db = libsql::Builder::new_local(path)
            .build()
            .await
            .map_err(|e| StoreError::Open(format!("open libSQL database: {e}")))?;

        let conn = db
            .connect()
            .map_err(|e| StoreError::Open(format!("create connection: {e}")))?;

        migrations::run(&conn).await?;
        info!(path = %path.display(), "Message store opened");

        Ok(Self {
            db: Arc::new(db),
            conn,
        })
    }

    /// Create an in-memory store (for tests).
    pub async fn new_memory() -> Result<Self, StoreError> {
        let db = libsql::Builder::new_local(":memory:")
            .build()
            .await
            .map_err(|e| StoreError::Open(format!("create in-memory database: {e}")))?;

        let conn = db
            .connect()
            .map_err(|e| StoreError::Open(format!("create connection: {e}")))?;

        migrations::run(&conn).await?;

        Ok(Self {
            db: Arc::new(db),
            conn,
        })
    }

    fn conn(&self) -> &Connection {
        &self.conn
    }
}

#[async_trait]
impl MessageStore for LibSqlStore {
    async fn append(&self, sender: &str, text: &str) -> Result<String, StoreError> {
        let id = Uuid::new_v4().to_string();
        let created_at = Utc::now().to_rfc3339();
        self.conn()
            .execute(
                "INSERT INTO messages (id, sender, text, created_at, processed)
                 VALUES (?1, ?2, ?3, ?4, 0)",
                params![id.clone(), sender, text, created_at],
            )
            .await
            .map_err(|e| StoreError::Query(format!("append: {e}")))?;

        debug!(id = %id, sender = sender, "Message appended");
        Ok(id)
    }

    async fn get(&self, id: &str) -> Result<Option<Message>, StoreError> {
        let mut rows = self
            .conn()
            .query(
                &format!("SELECT {MESSAGE_COLUMNS} FROM messages WHERE id = ?1"),
                params![id],
            )
            .await
            .map_err(|e| StoreError::Query(format!("get: {e}")))?;

        match rows.next().await {
            Ok(Some(row)) => Ok(Some(row_to_message(&row)?)),
            Ok(None) => Ok(None),
            Err(e) => Err(StoreError::Query(format!("get: {e}"))),
        }
    }

    async fn mark_processed(&self, id: &str) -> Result<(), StoreError> {
        self.conn()
            .execute(
                "UPDATE messages SET processed = 1 WHERE id = ?1",
                params![id],
            )
            .await
            .map_err(|e| StoreError::Query(format!("mark_processed: {e}")))?;

        debug!(id = id, "Message marked processed");
        Ok(())
    }

    async fn added_after(&self, seq: i64) -> Result<Vec<ChangeEntry>, StoreError> {
        let mut rows = self
            .conn()
            .query(
                &format!(
                    "SELECT {MESSAGE_COLUMNS} FROM messages WHERE seq > ?1 ORDER BY seq ASC"
                ),
                params![seq],
            )
            .await
            .map_err(|e| StoreError::Query(format!("added_after: {e}")))?;

        let mut entries = Vec::new();
        while let Ok(Some(row)) = rows.next().await {
            let entry_seq: i64 = row
                .get(0)
                .map_err(|e| StoreError::Query(format!("added_after: {e}")))?;
            entries.push(ChangeEntry {
                seq: entry_seq,
                message: row_to_message(&row)?,
            });
        }
        Ok(entries)
    }
}

// ── Helpers ─────────────────────────────────────────────────────────

fn row_to_message(row: &libsql::Row) -> Result<Message, StoreError> {
    let id: String = row
        .get(1)
        .map_err(|e| StoreError::Query(format!("decode id: {e}")))?;
    let sender: String = row
        .get(2)
        .map_err(|e| StoreError::Query(format!("decode sender: {e}")))?;
    let text: String = row
        .get(3)
        .map_err(|e| StoreError::Query(format!("decode text: {e}")))?;
    let created_str: String = row
        .get(4)
        .map_err(|e| StoreError::Query(format!("decode created_at: {e}")))?;
    let processed: i64 = row
        .get(5)
        .map_err(|e| StoreError::Query(format!("decode processed: {e}")))?;

    Ok(Message {
        id,
        sender,
        text,
        created_at: parse_datetime(&created_str),
        processed: processed != 0,
    })
}

/// Parse an RFC 3339 datetime string; unparseable values collapse to the
/// epoch floor rather than failing the whole read.
fn parse_datetime(s: &str) -> DateTime<Utc> {
    DateTime::parse_from_rfc3339(s)
        .map(|dt| dt.with_timezone(&Utc))
        .unwrap_or(DateTime::<Utc>::MIN_UTC)
}

// ── Tests ───────────────────────────────────────────────────────────
