//! # Shift Repository
//!
//! Cashier shifts. Invoices are stamped with the cashier's newest open shift.
//!
//! ## Lookup Rule
//! ```text
//! shifts WHERE user = ? AND status = 'Open'
//!        ORDER BY start_time DESC
//!        LIMIT 1
//! ```

use chrono::{DateTime, Utc};
use sqlx::SqlitePool;
use tracing::debug;

use crate::error::{DbError, DbResult};
use till_core::{ShiftRef, OPEN_SHIFT_STATUS};

/// Status written when a shift is closed.
pub const CLOSED_SHIFT_STATUS: &str = "Closed";

/// Repository for shifts.
#[derive(Debug, Clone)]
pub struct ShiftRepository {
    pool: SqlitePool,
}

impl ShiftRepository {
    /// Creates a new ShiftRepository.
    pub fn new(pool: SqlitePool) -> Self {
        ShiftRepository { pool }
    }

    /// Returns the most recently started open shift of `user`.
    pub async fn last_open_for_user(&self, user: &str) -> DbResult<Option<ShiftRef>> {
        let name: Option<String> = sqlx::query_scalar(
            r#"
            SELECT name
            FROM shifts
            WHERE user = ?1 AND status = ?2
            ORDER BY start_time DESC
            LIMIT 1
            "#,
        )
        .bind(user)
        .bind(OPEN_SHIFT_STATUS)
        .fetch_optional(&self.pool)
        .await?;

        Ok(name.map(ShiftRef))
    }

    /// Opens a shift named `name` for `user`.
    pub async fn open_shift(
        &self,
        name: &str,
        user: &str,
        start_time: DateTime<Utc>,
    ) -> DbResult<ShiftRef> {
        debug!(name = %name, user = %user, "Opening shift");

        sqlx::query(
            r#"
            INSERT INTO shifts (name, user, status, start_time)
            VALUES (?1, ?2, ?3, ?4)
            "#,
        )
        .bind(name)
        .bind(user)
        .bind(OPEN_SHIFT_STATUS)
        .bind(start_time)
        .execute(&self.pool)
        .await?;

        Ok(ShiftRef(name.to_string()))
    }

    /// Closes an open shift.
    ///
    /// Fails with `NotFound` when no open shift has that name.
    pub async fn close_shift(&self, name: &str) -> DbResult<()> {
        debug!(name = %name, "Closing shift");

        let result = sqlx::query(
            r#"
            UPDATE shifts SET
                status = ?2,
                end_time = ?3
            WHERE name = ?1 AND status = ?4
            "#,
        )
        .bind(name)
        .bind(CLOSED_SHIFT_STATUS)
        .bind(Utc::now())
        .bind(OPEN_SHIFT_STATUS)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("Shift (open)", name));
        }

        Ok(())
    }
}
