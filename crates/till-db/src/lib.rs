//! # till-db: Database Layer for Till POS
//!
//! This crate backs the collaborators of the sales invoice hooks with SQLite,
//! using sqlx for async operations.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                        Till POS Data Flow                               │
//! │                                                                         │
//! │  Hook command (create_sales_invoice)                                   │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                     till-db (THIS CRATE)                        │   │
//! │  │                                                                 │   │
//! │  │   ┌───────────────┐    ┌────────────────────┐  ┌────────────┐  │   │
//! │  │   │   Database    │    │    Repositories    │  │ Migrations │  │   │
//! │  │   │   (pool.rs)   │    │                    │  │ (embedded) │  │   │
//! │  │   │               │    │ PosSettingsRepo    │  │            │  │   │
//! │  │   │ SqlitePool    │◄───│ ShiftRepo          │  │ 001_init   │  │   │
//! │  │   │ Connection    │    │ ExchangeRateRepo   │  │            │  │   │
//! │  │   │ Management    │    │ SalesInvoiceRepo   │  │            │  │   │
//! │  │   │               │    │ ErrorLogRepo       │  │            │  │   │
//! │  │   └───────────────┘    └────────────────────┘  └────────────┘  │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                     SQLite Database                             │   │
//! │  │   <data dir>/till.db  (or :memory: in tests)                    │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Module Organization
//!
//! - [`pool`] - Connection pool creation and configuration
//! - [`migrations`] - Embedded database migrations
//! - [`error`] - Database error types
//! - [`repository`] - Repository implementations
//!
//! ## Usage
//!
//! ```rust,ignore
//! use till_db::{Database, DbConfig};
//!
//! let db = Database::new(DbConfig::new("path/to/till.db")).await?;
//!
//! let defaults = db.pos_settings().user_defaults("cashier@till").await?;
//! let shift = db.shifts().last_open_for_user("cashier@till").await?;
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod error;
pub mod migrations;
pub mod pool;
pub mod repository;

// =============================================================================
// Re-exports
// =============================================================================

pub use error::{DbError, DbResult};
pub use pool::{Database, DbConfig};

// Repository re-exports for convenience
pub use repository::error_log::{ErrorLogEntry, ErrorLogRepository};
pub use repository::exchange_rate::ExchangeRateRepository;
pub use repository::sales_invoice::{SalesInvoiceRepository, SeriesName, DEFAULT_NAMING_SERIES};
pub use repository::settings::PosSettingsRepository;
pub use repository::shift::ShiftRepository;
