//! # Repository Module
//!
//! Database repository implementations for Till POS.
//!
//! ## Repository Pattern
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Collaborators as Repositories                        │
//! │                                                                         │
//! │  Hook command                                                          │
//! │       │                                                                 │
//! │       │  db.shifts().last_open_for_user("cashier@till")                │
//! │       ▼                                                                 │
//! │  ShiftRepository                                                       │
//! │  ├── last_open_for_user(&self, user)                                   │
//! │  ├── open_shift(&self, name, user, start)                              │
//! │  └── close_shift(&self, name)                                          │
//! │       │                                                                 │
//! │       │  SQL Query                                                      │
//! │       ▼                                                                 │
//! │  SQLite Database                                                       │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Available Repositories
//!
//! - [`PosSettingsRepository`](settings::PosSettingsRepository) - Cashier defaults, selling price list
//! - [`ShiftRepository`](shift::ShiftRepository) - Open shift lookup
//! - [`ExchangeRateRepository`](exchange_rate::ExchangeRateRepository) - Currency exchange table
//! - [`SalesInvoiceRepository`](sales_invoice::SalesInvoiceRepository) - Naming, insert and submit
//! - [`ErrorLogRepository`](error_log::ErrorLogRepository) - Failure traces

use rust_decimal::Decimal;
use till_core::money::parse_decimal;

use crate::error::{DbError, DbResult};

pub mod error_log;
pub mod exchange_rate;
pub mod sales_invoice;
pub mod settings;
pub mod shift;

/// Reads a decimal stored as TEXT.
pub(crate) fn decimal_column(column: &str, text: &str) -> DbResult<Decimal> {
    parse_decimal(text).ok_or_else(|| DbError::corrupt(column, text))
}
