//! # Validation Module
//!
//! Rules a draft must pass before the document store accepts it.
//!
//! ## Validation Strategy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                      Validation Layers                                  │
//! │                                                                         │
//! │  Layer 1: Coercion (till-core::coercion)                               │
//! │  ├── Payload shape, numeric text, defaults                             │
//! │  └── Fails with MalformedInput                                         │
//! │           │                                                             │
//! │           ▼                                                             │
//! │  Layer 2: Store validation (THIS MODULE, called by till-db)            │
//! │  ├── Required header fields, non-empty line list                       │
//! │  ├── Line amounts and grand total fit in a decimal                     │
//! │  └── Fails with StoreRejected                                          │
//! │           │                                                             │
//! │           ▼                                                             │
//! │  Layer 3: Database (SQLite)                                            │
//! │  ├── NOT NULL / CHECK constraints                                      │
//! │  └── UNIQUE invoice names                                              │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Usage
//! ```rust
//! use till_core::validation::validate_customer;
//!
//! assert!(validate_customer("Walk-in Customer").is_ok());
//! assert!(validate_customer("  ").is_err());
//! ```

use rust_decimal::Decimal;

use crate::error::ValidationError;
use crate::money::grand_total;
use crate::types::{InvoiceDraft, InvoiceLine};

/// Result type for validation operations.
pub type ValidationResult<T> = Result<T, ValidationError>;

/// Longest name the store accepts for customers, item codes and links.
pub const MAX_NAME_LENGTH: usize = 140;

// =============================================================================
// Header Validators
// =============================================================================

/// Validates the customer reference.
///
/// ## Rules
/// - Must not be blank
/// - At most 140 characters
pub fn validate_customer(customer: &str) -> ValidationResult<()> {
    validate_name("customer", customer)
}

/// Validates the cost center copied from POS defaults.
pub fn validate_cost_center(cost_center: &str) -> ValidationResult<()> {
    validate_name("cost_center", cost_center)
}

fn validate_name(field: &str, value: &str) -> ValidationResult<()> {
    let value = value.trim();

    if value.is_empty() {
        return Err(ValidationError::Required {
            field: field.to_string(),
        });
    }

    if value.chars().count() > MAX_NAME_LENGTH {
        return Err(ValidationError::TooLong {
            field: field.to_string(),
            max: MAX_NAME_LENGTH,
        });
    }

    Ok(())
}

// =============================================================================
// Line Validators
// =============================================================================

/// Validates one invoice line. `row` is 1-based.
///
/// ## Rules
/// - Item code must not be blank
/// - Quantity must not be zero (negative quantities are returns)
/// - Rate must not be negative
/// - `qty × rate` must be representable
pub fn validate_line(row: usize, line: &InvoiceLine) -> ValidationResult<()> {
    if line.item_code.trim().is_empty() {
        return Err(ValidationError::MissingItemCode { row });
    }

    if line.item_code.chars().count() > MAX_NAME_LENGTH {
        return Err(ValidationError::TooLong {
            field: format!("Row #{} item_code", row),
            max: MAX_NAME_LENGTH,
        });
    }

    if line.qty.is_zero() {
        return Err(ValidationError::ZeroQuantity { row });
    }

    if line.rate < Decimal::ZERO {
        return Err(ValidationError::NegativeRate { row });
    }

    if line.amount().is_none() {
        return Err(ValidationError::AmountOverflow { row });
    }

    Ok(())
}

// =============================================================================
// Draft Validator
// =============================================================================

/// Validates a complete draft, header first, then lines in order.
///
/// ## User Workflow
/// ```text
/// ┌─────────────────────────────────────────────────────────────────────────┐
/// │  Store: insert + submit                                                 │
/// │                                                                         │
/// │  validate_draft(&draft) ← THIS FUNCTION                                │
/// │       │                                                                 │
/// │       ├── blank customer?      → "customer is required"                │
/// │       ├── no lines?            → "Items cannot be empty"               │
/// │       ├── row without code?    → "Row #2: Item Code is required"       │
/// │       │                                                                 │
/// │       └── OK → allocate name, insert, submit                           │
/// └─────────────────────────────────────────────────────────────────────────┘
/// ```
pub fn validate_draft(draft: &InvoiceDraft) -> ValidationResult<()> {
    validate_customer(&draft.customer)?;
    validate_cost_center(&draft.cost_center)?;

    if draft.items.is_empty() {
        return Err(ValidationError::NoItems);
    }

    for (index, line) in draft.items.iter().enumerate() {
        validate_line(index + 1, line)?;
    }

    if grand_total(draft.items.iter().map(|line| (&line.qty, &line.rate))).is_none() {
        return Err(ValidationError::TotalOverflow);
    }

    Ok(())
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::money::CurrencyCode;

    fn line(item_code: &str, qty: i64, rate: i64) -> InvoiceLine {
        InvoiceLine {
            item_code: item_code.to_string(),
            qty: Decimal::from(qty),
            rate: Decimal::from(rate),
            cost_center: "Main".to_string(),
            remarks: String::new(),
            uom: None,
        }
    }

    fn draft(items: Vec<InvoiceLine>) -> InvoiceDraft {
        InvoiceDraft {
            customer: "Walk-in".to_string(),
            cost_center: "Main".to_string(),
            shift: String::new(),
            price_list: None,
            change: None,
            currency: CurrencyCode::base(),
            items,
        }
    }

    #[test]
    fn test_validate_customer() {
        assert!(validate_customer("Walk-in").is_ok());
        assert_eq!(
            validate_customer(""),
            Err(ValidationError::Required {
                field: "customer".to_string()
            })
        );
        assert!(validate_customer(&"C".repeat(141)).is_err());
    }

    #[test]
    fn test_validate_line() {
        assert!(validate_line(1, &line("TEA", 1, 2)).is_ok());
        assert!(validate_line(1, &line("TEA", -1, 2)).is_ok());
        assert!(validate_line(1, &line("TEA", 1, 0)).is_ok());
        assert_eq!(
            validate_line(4, &line(" ", 1, 2)),
            Err(ValidationError::MissingItemCode { row: 4 })
        );
        assert_eq!(
            validate_line(1, &line("TEA", 0, 2)),
            Err(ValidationError::ZeroQuantity { row: 1 })
        );
        assert_eq!(
            validate_line(1, &line("TEA", 1, -2)),
            Err(ValidationError::NegativeRate { row: 1 })
        );
    }

    #[test]
    fn test_validate_draft() {
        assert!(validate_draft(&draft(vec![line("TEA", 1, 2)])).is_ok());
        assert_eq!(validate_draft(&draft(vec![])), Err(ValidationError::NoItems));
        assert_eq!(
            validate_draft(&draft(vec![line("TEA", 1, 2), line("", 1, 2)])),
            Err(ValidationError::MissingItemCode { row: 2 })
        );
    }

    #[test]
    fn test_validate_amount_overflow() {
        let mut huge = line("TEA", 1, 100);
        huge.qty = Decimal::from_i128_with_scale(10_i128.pow(28), 0);
        assert_eq!(
            validate_draft(&draft(vec![line("TEA", 1, 2), huge])),
            Err(ValidationError::AmountOverflow { row: 2 })
        );

        let mut max = line("TEA", 1, 0);
        max.rate = Decimal::MAX;
        assert!(validate_line(1, &max).is_ok());
        assert_eq!(
            validate_draft(&draft(vec![max.clone(), max])),
            Err(ValidationError::TotalOverflow)
        );
    }
}
