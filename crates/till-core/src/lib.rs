//! # till-core: Pure Invoice Logic for Till POS
//!
//! This crate holds everything the sales invoice hook decides on its own:
//! how a cart payload is read, which currency the invoice is issued in,
//! how line rates are converted and what a submittable draft looks like.
//! It has zero I/O dependencies.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                        Till POS Architecture                            │
//! │                                                                         │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                    POS Front End                                │   │
//! │  │      Cart ──► Payment Dialog ──► create_sales_invoice(...)     │   │
//! │  └─────────────────────────────┬───────────────────────────────────┘   │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │                    till-hooks (commands)                        │   │
//! │  │   session ─► shift ─► defaults ─► rate lookup ─► store ─► log  │   │
//! │  └─────────────────────────────┬───────────────────────────────────┘   │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │               ★ till-core (THIS CRATE) ★                        │   │
//! │  │                                                                 │   │
//! │  │   ┌───────────┐  ┌───────────┐  ┌───────────┐  ┌───────────┐  │   │
//! │  │   │ coercion  │  │   money   │  │ assembly  │  │ validation│  │   │
//! │  │   │ LineItem  │  │ Currency  │  │  Draft    │  │  rules    │  │   │
//! │  │   │ Payments  │  │Conversion │  │  Header   │  │  checks   │  │   │
//! │  │   └───────────┘  └───────────┘  └───────────┘  └───────────┘  │   │
//! │  │                                                                 │   │
//! │  │   NO I/O • NO DATABASE • NO NETWORK • PURE FUNCTIONS           │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │                    till-db (Database Layer)                     │   │
//! │  │      settings, shifts, exchange rates, invoices, error log      │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Modules
//!
//! - [`types`] - Domain types (LineItem, PaymentEntry, InvoiceDraft, ...)
//! - [`money`] - Currency codes, conversion, rounding
//! - [`coercion`] - Total coercion of loosely typed cart payloads
//! - [`assembly`] - Currency selection and invoice draft assembly
//! - [`validation`] - Rules a draft must pass before the store accepts it
//! - [`error`] - Domain error types
//!
//! ## Example Usage
//!
//! ```rust
//! use serde_json::json;
//! use till_core::assembly::{assemble_invoice, plan_currency, CurrencyPlan, InvoiceHeader};
//! use till_core::coercion::parse_items;
//! use till_core::money::Conversion;
//! use till_core::UserPosDefaults;
//!
//! let items = parse_items(&json!([{ "item_code": "COFFEE", "qty": 2, "rate": 3.5 }])).unwrap();
//! assert_eq!(plan_currency(None), CurrencyPlan::Base);
//!
//! let defaults = UserPosDefaults {
//!     cost_center: "Main".to_string(),
//!     price_list: Some("Standard".to_string()),
//! };
//! let header = InvoiceHeader::new("Walk-in", &defaults, None, Some("Standard".into()), None);
//! let draft = assemble_invoice(header, &items, &Conversion::base()).unwrap();
//!
//! assert_eq!(draft.currency.as_str(), "USD");
//! assert_eq!(draft.items[0].rate.to_string(), "3.5");
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod assembly;
pub mod coercion;
pub mod error;
pub mod money;
pub mod types;
pub mod validation;

// =============================================================================
// Re-exports for Convenience
// =============================================================================

pub use error::{ErrorKind, InvoiceError, InvoiceResult, ValidationError};
pub use money::{Conversion, CurrencyCode};
pub use types::*;

// =============================================================================
// Crate-Level Constants
// =============================================================================

/// Base currency every item price is stored in.
///
/// Exchange rates are always looked up as `BASE_CURRENCY → target`.
pub const BASE_CURRENCY: &str = "USD";

/// Title under which failed invoice creations are written to the error log.
pub const INVOICE_ERROR_LOG_TITLE: &str = "Create Sales Invoice Error";

/// Title of the user-facing message shown when invoice creation fails.
pub const INVOICE_FAILURE_TITLE: &str = "Invoice Creation Failed";

/// Status a shift must have to be picked up for new invoices.
pub const OPEN_SHIFT_STATUS: &str = "Open";

/// Decimal places used when the store rounds invoice totals.
pub const CURRENCY_PRECISION: u32 = 2;
