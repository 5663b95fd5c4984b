//! # Schema Migrations
//!
//! The SQL files under `migrations/sqlite/` are compiled into the binary and
//! applied by [`crate::Database::new`].
//!
//! ```text
//! 001_initial_schema.sql
//!   pos_settings_user_mapping   selling_settings   shifts
//!   currency_exchange           naming_series
//!   sales_invoices ─┬─ sales_invoice_items
//!   error_log
//! ```
//!
//! Schema changes go in a new `NNN_description.sql` file. Applied files are
//! checksummed by sqlx and must not be edited.

use sqlx::SqlitePool;
use tracing::{debug, info};

use crate::error::DbResult;

static MIGRATOR: sqlx::migrate::Migrator = sqlx::migrate!("../../migrations/sqlite");

/// Applies every embedded migration not yet recorded in `_sqlx_migrations`.
pub async fn run_migrations(pool: &SqlitePool) -> DbResult<()> {
    debug!(embedded = MIGRATOR.migrations.len(), "Applying till schema migrations");
    MIGRATOR.run(pool).await?;
    info!("Till schema up to date");
    Ok(())
}

/// `(embedded, applied)` migration counts.
pub async fn migration_status(pool: &SqlitePool) -> DbResult<(usize, usize)> {
    let applied: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM _sqlx_migrations")
        .fetch_one(pool)
        .await?;

    Ok((MIGRATOR.migrations.len(), applied as usize))
}
