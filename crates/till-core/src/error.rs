//! # Error Types
//!
//! Domain-specific error types for till-core.
//!
//! ## Error Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Error Types                                     │
//! │                                                                         │
//! │  till-core errors (this file)                                          │
//! │  ├── InvoiceError     - Why an invoice could not be created            │
//! │  └── ValidationError  - Why the store refused a draft                  │
//! │                                                                         │
//! │  till-db errors (separate crate)                                       │
//! │  └── DbError          - Database operation failures → InvoiceError     │
//! │                                                                         │
//! │  till-hooks (app)                                                      │
//! │  └── Failure response  - { success: false, error, error_kind }         │
//! │                                                                         │
//! │  Flow: ValidationError → DbError → InvoiceError → failure response     │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Design Principles
//! 1. Use `thiserror` for derive macros (not manual impl)
//! 2. Include context in error messages (user, currency, row, ...)
//! 3. Every variant belongs to exactly one [`ErrorKind`]

use serde::{Deserialize, Serialize};
use thiserror::Error;
use ts_rs::TS;

// =============================================================================
// Invoice Error
// =============================================================================

/// Everything that can stop `create_sales_invoice` from producing an invoice.
///
/// None of these ever reach the hook's caller as a panic or an `Err`: the
/// command layer converts them into a failure response.
#[derive(Debug, Error)]
pub enum InvoiceError {
    /// The current user has no row in the POS settings user mapping.
    ///
    /// ## When This Occurs
    /// - A cashier logs in before an administrator mapped them to a
    ///   cost center / price list
    /// - The mapping row was removed while a session was still open
    #[error("Logged-in user is not mapped in POS Settings (user: {user})")]
    MissingPosDefaults { user: String },

    /// No stored exchange rate for the single payment currency.
    ///
    /// ## User Workflow
    /// ```text
    /// Payment dialog: 1 method, currency XYZ
    ///      │
    ///      ▼
    /// lookup(USD → XYZ) = none
    ///      │
    ///      ▼
    /// ExchangeRateNotFound { from: "USD", to: "XYZ" }
    ///      │
    ///      ▼
    /// UI shows: "No exchange rate found for USD → XYZ"
    /// ```
    #[error("No exchange rate found for {from} → {to}")]
    ExchangeRateNotFound { from: String, to: String },

    /// The cart or payment payload could not be read.
    #[error("Malformed input: {reason}")]
    MalformedInput { reason: String },

    /// The document store validated the draft and refused it.
    #[error("{0}")]
    StoreRejected(#[from] ValidationError),

    /// The document store failed while reading or writing.
    #[error("Document store error: {reason}")]
    Store { reason: String },
}

impl InvoiceError {
    /// Creates a MalformedInput error.
    pub fn malformed(reason: impl Into<String>) -> Self {
        InvoiceError::MalformedInput {
            reason: reason.into(),
        }
    }

    /// Creates a Store error.
    pub fn store(reason: impl Into<String>) -> Self {
        InvoiceError::Store {
            reason: reason.into(),
        }
    }

    /// Returns the category this error is reported under.
    pub fn kind(&self) -> ErrorKind {
        match self {
            InvoiceError::MissingPosDefaults { .. } => ErrorKind::Configuration,
            InvoiceError::ExchangeRateNotFound { .. } => ErrorKind::ExchangeRateNotFound,
            InvoiceError::MalformedInput { .. } => ErrorKind::MalformedInput,
            InvoiceError::StoreRejected(_) | InvoiceError::Store { .. } => {
                ErrorKind::StoreRejection
            }
        }
    }
}

/// Machine-readable failure categories.
///
/// ## Usage in Front End
/// ```typescript
/// const res = await call("create_sales_invoice", payload);
/// if (!res.success && res.error_kind === "CONFIGURATION_ERROR") {
///   showSetupHint();
/// }
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorKind {
    /// Missing POS defaults for the current user.
    #[serde(rename = "CONFIGURATION_ERROR")]
    Configuration,
    /// Required USD → target exchange rate is missing.
    ExchangeRateNotFound,
    /// Cart or payment payload could not be parsed.
    MalformedInput,
    /// The store refused or failed to persist the invoice.
    StoreRejection,
}

// =============================================================================
// Validation Error
// =============================================================================

/// Reasons the document store refuses a draft.
///
/// Row numbers are 1-based, the way cashiers count cart lines.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ValidationError {
    /// A required header field is missing or empty.
    #[error("{field} is required")]
    Required { field: String },

    /// The draft has no line items.
    #[error("Items cannot be empty")]
    NoItems,

    /// A line item is missing its item code.
    #[error("Row #{row}: Item Code is required")]
    MissingItemCode { row: usize },

    /// A line item quantity is zero.
    #[error("Row #{row}: Qty cannot be zero")]
    ZeroQuantity { row: usize },

    /// A line item rate is negative.
    #[error("Row #{row}: Rate cannot be negative")]
    NegativeRate { row: usize },

    /// `qty × rate` does not fit in a decimal.
    #[error("Row #{row}: Amount is too large")]
    AmountOverflow { row: usize },

    /// The sum of line amounts does not fit in a decimal.
    #[error("Grand Total is too large")]
    TotalOverflow,

    /// Field value is too long.
    #[error("{field} must be at most {max} characters")]
    TooLong { field: String, max: usize },
}

// =============================================================================
// Result Type Alias
// =============================================================================

/// Convenience type alias for Results with InvoiceError.
pub type InvoiceResult<T> = Result<T, InvoiceError>;

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_messages() {
        let err = InvoiceError::ExchangeRateNotFound {
            from: "USD".to_string(),
            to: "XYZ".to_string(),
        };
        assert_eq!(err.to_string(), "No exchange rate found for USD → XYZ");

        let err = InvoiceError::MissingPosDefaults {
            user: "cashier@example.com".to_string(),
        };
        assert!(err.to_string().contains("not mapped in POS Settings"));
    }

    #[test]
    fn test_validation_error_messages() {
        assert_eq!(ValidationError::NoItems.to_string(), "Items cannot be empty");
        assert_eq!(
            ValidationError::MissingItemCode { row: 2 }.to_string(),
            "Row #2: Item Code is required"
        );
    }

    #[test]
    fn test_validation_converts_to_store_rejection() {
        let err: InvoiceError = ValidationError::NoItems.into();
        assert!(matches!(err, InvoiceError::StoreRejected(_)));
        assert_eq!(err.kind(), ErrorKind::StoreRejection);
        assert_eq!(err.to_string(), "Items cannot be empty");
    }

    #[test]
    fn test_error_kind_serialization() {
        let json = serde_json::to_string(&ErrorKind::Configuration).unwrap();
        assert_eq!(json, "\"CONFIGURATION_ERROR\"");
        let json = serde_json::to_string(&ErrorKind::ExchangeRateNotFound).unwrap();
        assert_eq!(json, "\"EXCHANGE_RATE_NOT_FOUND\"");
    }
}
