//! # Domain Types
//!
//! Types that flow through a sales invoice hook call.
//!
//! ## Type Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Domain Types                                    │
//! │                                                                         │
//! │  INPUT (coerced)          COLLABORATORS            OUTPUT              │
//! │  ┌─────────────────┐     ┌─────────────────┐     ┌─────────────────┐   │
//! │  │    LineItem     │     │ UserPosDefaults │     │  InvoiceDraft   │   │
//! │  │  item_code      │     │  cost_center    │     │  header fields  │   │
//! │  │  qty / rate     │     │  price_list     │     │  InvoiceLine[]  │   │
//! │  │  uom / remarks  │     └─────────────────┘     └────────┬────────┘   │
//! │  └─────────────────┘     ┌─────────────────┐              │ store      │
//! │  ┌─────────────────┐     │    ShiftRef     │              ▼            │
//! │  │  PaymentEntry   │     │  name           │     ┌─────────────────┐   │
//! │  │  currency       │     └─────────────────┘     │SubmittedInvoice │   │
//! │  │  amount         │                             │ name, total,    │   │
//! │  └─────────────────┘                             │ posting_date    │   │
//! │                                                  └─────────────────┘   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use std::collections::BTreeMap;

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::money::CurrencyCode;

// =============================================================================
// Collaborator Types
// =============================================================================

/// POS defaults an administrator assigned to a cashier.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct UserPosDefaults {
    /// Cost center stamped on the invoice and on every line.
    pub cost_center: String,

    /// Preferred selling price list, if the cashier has one.
    pub price_list: Option<String>,
}

/// Reference to a cashier's open shift.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(transparent)]
pub struct ShiftRef(pub String);

impl ShiftRef {
    /// Returns the shift name.
    #[inline]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

// =============================================================================
// Input Types
// =============================================================================

/// A cart line after coercion.
///
/// Every field has already been given its default; see
/// [`crate::coercion::coerce_line_item`] for the rules.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LineItem {
    pub item_code: String,
    /// Quantity sold (default 1).
    pub qty: Decimal,
    /// Unit rate in the base currency (default 0).
    pub rate: Decimal,
    pub uom: Option<String>,
    /// Free-text preparation remarks (default empty).
    pub remarks: String,
}

/// One tender line of the payment dialog.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PaymentEntry {
    /// Currency the customer pays in (default USD).
    pub currency: CurrencyCode,
    /// Amount tendered in that currency.
    pub amount: Decimal,
}

/// Payment method key → tender line.
///
/// A `BTreeMap` keeps iteration order independent of insertion order.
pub type PaymentBreakdown = BTreeMap<String, PaymentEntry>;

// =============================================================================
// Document Status
// =============================================================================

/// Lifecycle state of a stored invoice.
///
/// Only `Submitted` is ever visible from outside the store: drafts live in
/// memory and are inserted and submitted in one transaction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[repr(i32)]
#[ts(export)]
#[serde(rename_all = "snake_case")]
pub enum DocStatus {
    /// Saved but not finalized.
    Draft = 0,
    /// Finalized and immutable.
    Submitted = 1,
    /// Reversed after submission.
    Cancelled = 2,
}

impl Default for DocStatus {
    fn default() -> Self {
        DocStatus::Draft
    }
}

// =============================================================================
// Invoice Draft
// =============================================================================

/// A finalized invoice line, ready for the store.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct InvoiceLine {
    pub item_code: String,
    #[ts(type = "number")]
    pub qty: Decimal,
    /// Unit rate in the invoice currency.
    #[ts(type = "number")]
    pub rate: Decimal,
    pub cost_center: String,
    pub remarks: String,
    pub uom: Option<String>,
}

impl InvoiceLine {
    /// Returns `qty × rate` (unrounded), or `None` on overflow.
    #[inline]
    pub fn amount(&self) -> Option<Decimal> {
        self.qty.checked_mul(self.rate)
    }
}

/// An assembled sales invoice that has not reached the store yet.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct InvoiceDraft {
    pub customer: String,
    pub cost_center: String,
    /// Open shift at creation time, empty when the cashier has none.
    pub shift: String,
    pub price_list: Option<String>,
    /// Change handed back to the customer, passed through untouched.
    #[ts(type = "number | null")]
    pub change: Option<Decimal>,
    pub currency: CurrencyCode,
    pub items: Vec<InvoiceLine>,
}

// =============================================================================
// Stored Invoice
// =============================================================================

/// An invoice as the store keeps it after submission.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct SubmittedInvoice {
    /// Store-assigned name, e.g. `ACC-SINV-2026-00001`.
    pub name: String,
    pub customer: String,
    pub cost_center: String,
    pub shift: String,
    pub price_list: Option<String>,
    #[ts(type = "number | null")]
    pub change: Option<Decimal>,
    pub currency: CurrencyCode,
    /// Sum of line amounts, rounded to currency precision.
    #[ts(type = "number")]
    pub grand_total: Decimal,
    #[ts(as = "String")]
    pub posting_date: NaiveDate,
    pub docstatus: DocStatus,
    /// Cashier who created the invoice.
    pub owner: String,
    pub items: Vec<InvoiceLine>,
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    #[test]
    fn test_doc_status_default() {
        assert_eq!(DocStatus::default(), DocStatus::Draft);
        assert_eq!(DocStatus::Submitted as i32, 1);
    }

    #[test]
    fn test_invoice_line_amount() {
        let line = InvoiceLine {
            item_code: "COFFEE".to_string(),
            qty: Decimal::from(2),
            rate: Decimal::from_str("3.5").unwrap(),
            cost_center: "Main".to_string(),
            remarks: String::new(),
            uom: None,
        };
        assert_eq!(line.amount(), Some(Decimal::from(7)));

        let huge = InvoiceLine {
            qty: Decimal::MAX,
            ..line
        };
        assert_eq!(huge.amount(), None);
    }

    #[test]
    fn test_shift_ref_serializes_as_string() {
        let shift = ShiftRef("SHIFT-0001".to_string());
        assert_eq!(serde_json::to_string(&shift).unwrap(), "\"SHIFT-0001\"");
    }
}
