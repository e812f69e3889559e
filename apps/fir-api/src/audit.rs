//! Append-only audit log of authenticated actions
//!
//! One row per successful protected call. Rows are only ever inserted;
//! each insert runs in its own transaction on a pooled connection that is
//! returned to the pool when the transaction scope ends.

use std::str::FromStr;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::Serialize;
use sqlx::sqlite::{SqliteConnectOptions, SqlitePool, SqlitePoolOptions};
use sqlx::FromRow;
use tokio::sync::Mutex;
use tracing::info;

/// A single audit log row
#[derive(Debug, Clone, PartialEq, Serialize, FromRow)]
pub struct AuditLogEntry {
    pub id: i64,
    pub username: String,
    pub action: String,
    pub timestamp: DateTime<Utc>,
}

#[derive(Debug, Clone)]
pub struct AuditLog {
    pool: SqlitePool,
    /// Held across timestamp + insert so id order matches timestamp order
    write_lock: Arc<Mutex<()>>,
}

impl AuditLog {
    /// Connect to `database_url`, creating the database file if needed
    pub async fn connect(database_url: &str) -> Result<Self, sqlx::Error> {
        let options = SqliteConnectOptions::from_str(database_url)?.create_if_missing(true);

        // Each in-memory connection is its own database, so keep exactly one alive
        let pool = if database_url.contains(":memory:") {
            SqlitePoolOptions::new()
                .max_connections(1)
                .idle_timeout(None)
                .max_lifetime(None)
                .connect_with(options)
                .await?
        } else {
            SqlitePoolOptions::new()
                .max_connections(5)
                .connect_with(options)
                .await?
        };

        let log = Self {
            pool,
            write_lock: Arc::new(Mutex::new(())),
        };
        log.run_migrations().await?;
        Ok(log)
    }

    async fn run_migrations(&self) -> Result<(), sqlx::Error> {
        info!("Running audit log migrations...");

        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS audit_logs (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                username TEXT NOT NULL,
                action TEXT NOT NULL,
                timestamp TEXT NOT NULL
            )
            "#,
        )
        .execute(&self.pool)
        .await?;

        sqlx::query(
            r#"
            CREATE INDEX IF NOT EXISTS ix_audit_logs_username ON audit_logs(username)
            "#,
        )
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    /// Append one row and return it
    pub async fn record(&self, username: &str, action: &str) -> Result<AuditLogEntry, sqlx::Error> {
        let _guard = self.write_lock.lock().await;

        let mut tx = self.pool.begin().await?;
        let timestamp = Utc::now();
        let id = sqlx::query(
            r#"
            INSERT INTO audit_logs (username, action, timestamp)
            VALUES (?, ?, ?)
            "#,
        )
        .bind(username)
        .bind(action)
        .bind(timestamp)
        .execute(&mut *tx)
        .await?
        .last_insert_rowid();
        tx.commit().await?;

        info!(id, username = %username, action = %action, "Audit entry recorded");

        Ok(AuditLogEntry {
            id,
            username: username.to_string(),
            action: action.to_string(),
            timestamp,
        })
    }

    /// Most recent rows for `username`, newest first
    pub async fn recent(
        &self,
        username: &str,
        limit: i64,
    ) -> Result<Vec<AuditLogEntry>, sqlx::Error> {
        sqlx::query_as(
            r#"
            SELECT id, username, action, timestamp
            FROM audit_logs
            WHERE username = ?
            ORDER BY id DESC
            LIMIT ?
            "#,
        )
        .bind(username)
        .bind(limit)
        .fetch_all(&self.pool)
        .await
    }

    /// All rows in insertion order
    pub async fn all(&self) -> Result<Vec<AuditLogEntry>, sqlx::Error> {
        sqlx::query_as(
            r#"
            SELECT id, username, action, timestamp
            FROM audit_logs
            ORDER BY id ASC
            "#,
        )
        .fetch_all(&self.pool)
        .await
    }

    pub async fn count(&self) -> Result<i64, sqlx::Error> {
        let (count,): (i64,) = sqlx::query_as("SELECT COUNT(*) FROM audit_logs")
            .fetch_one(&self.pool)
            .await?;
        Ok(count)
    }
}
