//! # Database Errors
//!
//! ```text
//! sqlx::Error ───────┐
//! MigrateError ──────┼──► DbError ──► InvoiceError::StoreRejected  (Rejected)
//! ValidationError ───┘               InvoiceError::Store           (everything else)
//! ```
//!
//! The hooks never see `sqlx` types: anything a repository returns is a
//! [`DbError`], and the invoice path lifts it into [`InvoiceError`].

use sqlx::error::ErrorKind as SqlErrorKind;
use thiserror::Error;
use till_core::{InvoiceError, ValidationError};

/// Everything a till repository can fail with.
#[derive(Debug, Error)]
pub enum DbError {
    /// A row that an update or lookup required is missing.
    #[error("{entity} not found: {id}")]
    NotFound { entity: String, id: String },

    /// A primary key or UNIQUE index rejected the row.
    ///
    /// ## When This Occurs
    /// - Opening a second shift under an existing name
    /// - An invoice name handed out twice (naming series reset by hand)
    #[error("Duplicate value for {target}")]
    UniqueViolation { target: String },

    /// A line pointed at an invoice that does not exist.
    #[error("Foreign key violation: {message}")]
    ForeignKeyViolation { message: String },

    /// Validation refused the document; nothing was written.
    #[error("{0}")]
    Rejected(#[from] ValidationError),

    /// A stored value could not be read back (e.g. a non-decimal rate).
    #[error("Corrupt {column} value: '{value}'")]
    Corrupt { column: String, value: String },

    /// The database file could not be opened, or the pool is closed.
    #[error("Connection failed: {0}")]
    ConnectionFailed(String),

    #[error("Migration failed: {0}")]
    MigrationFailed(String),

    /// SQLite refused the statement for a reason other than a constraint.
    #[error("Query failed: {0}")]
    QueryFailed(String),

    /// No connection became free within the acquire timeout.
    #[error("Connection pool exhausted")]
    PoolExhausted,

    #[error("Internal database error: {0}")]
    Internal(String),
}

impl DbError {
    pub fn not_found(entity: impl Into<String>, id: impl Into<String>) -> Self {
        DbError::NotFound {
            entity: entity.into(),
            id: id.into(),
        }
    }

    /// A column whose text failed to parse.
    pub fn corrupt(column: impl Into<String>, value: impl Into<String>) -> Self {
        DbError::Corrupt {
            column: column.into(),
            value: value.into(),
        }
    }
}

/// SQLite reports the offending index as `UNIQUE constraint failed: t.col`.
fn unique_target(message: &str) -> String {
    message
        .rsplit_once(": ")
        .map(|(_, target)| target.to_string())
        .unwrap_or_else(|| message.to_string())
}

impl From<sqlx::Error> for DbError {
    fn from(err: sqlx::Error) -> Self {
        match err {
            sqlx::Error::Database(db_err) => match db_err.kind() {
                SqlErrorKind::UniqueViolation => DbError::UniqueViolation {
                    target: unique_target(db_err.message()),
                },
                _ if db_err.message().starts_with("UNIQUE constraint failed") => {
                    DbError::UniqueViolation {
                        target: unique_target(db_err.message()),
                    }
                }
                SqlErrorKind::ForeignKeyViolation => DbError::ForeignKeyViolation {
                    message: db_err.message().to_string(),
                },
                _ => DbError::QueryFailed(db_err.message().to_string()),
            },
            sqlx::Error::RowNotFound => DbError::not_found("Row", "query"),
            sqlx::Error::PoolTimedOut => DbError::PoolExhausted,
            sqlx::Error::PoolClosed => DbError::ConnectionFailed("pool is closed".to_string()),
            other => DbError::Internal(other.to_string()),
        }
    }
}

impl From<sqlx::migrate::MigrateError> for DbError {
    fn from(err: sqlx::migrate::MigrateError) -> Self {
        DbError::MigrationFailed(err.to_string())
    }
}

impl From<DbError> for InvoiceError {
    fn from(err: DbError) -> Self {
        match err {
            DbError::Rejected(validation) => InvoiceError::StoreRejected(validation),
            other => InvoiceError::store(other.to_string()),
        }
    }
}

pub type DbResult<T> = Result<T, DbError>;
