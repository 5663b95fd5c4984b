//! # Database State
//!
//! Wraps the `Database` connection for use in hook commands.
//!
//! The `SqlitePool` inside `Database` is thread-safe, so commands can run
//! queries concurrently without explicit locking.

use till_db::Database;

/// Wrapper around `Database` for hook state.
#[derive(Debug, Clone)]
pub struct DbState {
    db: Database,
}

impl DbState {
    /// Creates a new DbState wrapping the database connection.
    pub fn new(db: Database) -> Self {
        DbState { db }
    }

    /// Returns a reference to the inner Database.
    ///
    /// ## Usage
    /// ```rust,ignore
    /// let shift = db_state.inner().shifts().last_open_for_user(session.user()).await?;
    /// ```
    pub fn inner(&self) -> &Database {
        &self.db
    }
}
