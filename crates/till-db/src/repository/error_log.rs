//! # Error Log Repository
//!
//! Persistent sink for failures that were swallowed at the hook boundary.
//! Each entry carries a short title and the full error chain as its trace.

use chrono::{DateTime, Utc};
use serde::Serialize;
use sqlx::{FromRow, SqlitePool};
use tracing::debug;
use uuid::Uuid;

use crate::error::DbResult;

/// A stored error log entry.
#[derive(Debug, Clone, PartialEq, Serialize, FromRow)]
pub struct ErrorLogEntry {
    pub id: String,
    pub title: String,
    pub trace: String,
    /// Session user at the time of the failure.
    pub user: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// Repository for the error log.
#[derive(Debug, Clone)]
pub struct ErrorLogRepository {
    pool: SqlitePool,
}

impl ErrorLogRepository {
    /// Creates a new ErrorLogRepository.
    pub fn new(pool: SqlitePool) -> Self {
        ErrorLogRepository { pool }
    }

    /// Appends an entry and returns it.
    pub async fn record(
        &self,
        title: &str,
        trace: &str,
        user: Option<&str>,
    ) -> DbResult<ErrorLogEntry> {
        let entry = ErrorLogEntry {
            id: Uuid::new_v4().to_string(),
            title: title.to_string(),
            trace: trace.to_string(),
            user: user.map(str::to_string),
            created_at: Utc::now(),
        };

        debug!(id = %entry.id, title = %entry.title, "Recording error log entry");

        sqlx::query(
            r#"
            INSERT INTO error_log (id, title, trace, user, created_at)
            VALUES (?1, ?2, ?3, ?4, ?5)
            "#,
        )
        .bind(&entry.id)
        .bind(&entry.title)
        .bind(&entry.trace)
        .bind(&entry.user)
        .bind(entry.created_at)
        .execute(&self.pool)
        .await?;

        Ok(entry)
    }

    /// Returns up to `limit` entries, newest first.
    pub async fn recent(&self, limit: i64) -> DbResult<Vec<ErrorLogEntry>> {
        let entries: Vec<ErrorLogEntry> = sqlx::query_as(
            r#"
            SELECT id, title, trace, user, created_at
            FROM error_log
            ORDER BY created_at DESC
            LIMIT ?1
            "#,
        )
        .bind(limit)
        .fetch_all(&self.pool)
        .await?;

        Ok(entries)
    }

    /// Counts entries with the given title.
    pub async fn count_titled(&self, title: &str) -> DbResult<i64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM error_log WHERE title = ?1")
            .bind(title)
            .fetch_one(&self.pool)
            .await?;
        Ok(count)
    }
}

#[cfg(test)]
mod tests {
    use crate::{Database, DbConfig};
    use till_core::INVOICE_ERROR_LOG_TITLE;

    #[tokio::test]
    async fn test_record_and_list() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let log = db.error_log();

        let entry = log
            .record(INVOICE_ERROR_LOG_TITLE, "No exchange rate found for USD → XYZ", Some("cashier"))
            .await
            .unwrap();
        log.record("Other", "boom", None).await.unwrap();

        assert_eq!(log.count_titled(INVOICE_ERROR_LOG_TITLE).await.unwrap(), 1);

        let recent = log.recent(10).await.unwrap();
        assert_eq!(recent.len(), 2);
        assert!(recent.contains(&entry));

        assert_eq!(log.recent(1).await.unwrap().len(), 1);
    }
}
