//! # Invoice Assembly
//!
//! Decides the invoice currency and builds the in-memory draft.
//!
//! ## Assembly Flow
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                       Invoice Assembly                                  │
//! │                                                                         │
//! │  payments ──► plan_currency() ──► Base | Foreign(code)                 │
//! │                                        │                                │
//! │                           (hooks look up USD → code)                   │
//! │                                        ▼                                │
//! │                                   Conversion                            │
//! │                                        │                                │
//! │  defaults + shift ──► InvoiceHeader    │                                │
//! │                            │           │                                │
//! │                            ▼           ▼                                │
//! │  LineItem[] ─────────► assemble_invoice() ──► InvoiceDraft             │
//! │                                                                         │
//! │  The draft never leaves memory until the store inserts and submits     │
//! │  it in a single transaction.                                           │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use rust_decimal::Decimal;

use crate::error::{InvoiceError, InvoiceResult};
use crate::money::{Conversion, CurrencyCode};
use crate::types::{
    InvoiceDraft, InvoiceLine, LineItem, PaymentBreakdown, ShiftRef, UserPosDefaults,
};

// =============================================================================
// Currency Selection
// =============================================================================

/// Which currency the invoice will be issued in.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CurrencyPlan {
    /// Issue in USD; no rate lookup needed.
    Base,
    /// Issue in this currency; the USD → currency rate must be looked up.
    Foreign(CurrencyCode),
}

/// Picks the invoice currency from the payment breakdown.
///
/// ## Rules
/// ```text
/// payments                    plan
/// ─────────────────────────   ──────────────────────
/// none / empty                Base
/// exactly one, USD            Base
/// exactly one, other code     Foreign(code)
/// two or more (any codes)     Base  (split tenders are not converted)
/// ```
///
/// ## Example
/// ```rust
/// use rust_decimal::Decimal;
/// use till_core::assembly::{plan_currency, CurrencyPlan};
/// use till_core::{CurrencyCode, PaymentBreakdown, PaymentEntry};
///
/// let mut payments = PaymentBreakdown::new();
/// payments.insert(
///     "m1".to_string(),
///     PaymentEntry { currency: CurrencyCode::new("KES"), amount: Decimal::from(100) },
/// );
/// assert_eq!(plan_currency(Some(&payments)), CurrencyPlan::Foreign(CurrencyCode::new("KES")));
/// ```
pub fn plan_currency(payments: Option<&PaymentBreakdown>) -> CurrencyPlan {
    let Some(payments) = payments else {
        return CurrencyPlan::Base;
    };

    if payments.len() != 1 {
        return CurrencyPlan::Base;
    }

    match payments.values().next() {
        Some(entry) if !entry.currency.is_base() => CurrencyPlan::Foreign(entry.currency.clone()),
        _ => CurrencyPlan::Base,
    }
}

/// Returns the price list the cashier asked for, else their default.
///
/// `None` means the caller must fall back to the global selling price list.
pub fn preferred_price_list(
    requested: Option<&str>,
    defaults: &UserPosDefaults,
) -> Option<String> {
    requested
        .map(str::trim)
        .filter(|name| !name.is_empty())
        .map(str::to_string)
        .or_else(|| {
            defaults
                .price_list
                .as_deref()
                .map(str::trim)
                .filter(|name| !name.is_empty())
                .map(str::to_string)
        })
}

// =============================================================================
// Header
// =============================================================================

/// Invoice fields that do not depend on the cart contents.
#[derive(Debug, Clone, PartialEq)]
pub struct InvoiceHeader {
    pub customer: String,
    pub cost_center: String,
    pub shift: String,
    pub price_list: Option<String>,
    pub change: Option<Decimal>,
}

impl InvoiceHeader {
    /// Builds a header for the cashier described by `defaults`.
    ///
    /// A missing shift becomes an empty reference.
    pub fn new(
        customer: impl Into<String>,
        defaults: &UserPosDefaults,
        shift: Option<&ShiftRef>,
        price_list: Option<String>,
        change: Option<Decimal>,
    ) -> Self {
        InvoiceHeader {
            customer: customer.into(),
            cost_center: defaults.cost_center.clone(),
            shift: shift.map(|s| s.as_str().to_string()).unwrap_or_default(),
            price_list,
            change,
        }
    }
}

// =============================================================================
// Draft
// =============================================================================

/// Builds the draft invoice, one line per cart item in input order.
///
/// ## Per-line Rules
/// - rate is converted only when the invoice currency is not USD
/// - cost center always comes from the cashier's defaults
/// - qty, uom and remarks are copied as coerced
///
/// A rate too large to convert fails with `MalformedInput` naming the row.
pub fn assemble_invoice(
    header: InvoiceHeader,
    items: &[LineItem],
    conversion: &Conversion,
) -> InvoiceResult<InvoiceDraft> {
    let lines = items
        .iter()
        .enumerate()
        .map(|(index, item)| {
            let rate = conversion.convert(item.rate).ok_or_else(|| {
                InvoiceError::malformed(format!(
                    "Row #{}: rate {} is too large to convert to {}",
                    index + 1,
                    item.rate,
                    conversion.currency
                ))
            })?;

            Ok(InvoiceLine {
                item_code: item.item_code.clone(),
                qty: item.qty,
                rate,
                cost_center: header.cost_center.clone(),
                remarks: item.remarks.clone(),
                uom: item.uom.clone(),
            })
        })
        .collect::<InvoiceResult<Vec<_>>>()?;

    Ok(InvoiceDraft {
        customer: header.customer,
        cost_center: header.cost_center,
        shift: header.shift,
        price_list: header.price_list,
        change: header.change,
        currency: conversion.currency.clone(),
        items: lines,
    })
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::coercion::parse_items;
    use crate::types::PaymentEntry;
    use serde_json::json;
    use std::str::FromStr;

    fn d(text: &str) -> Decimal {
        Decimal::from_str(text).unwrap()
    }

    fn defaults() -> UserPosDefaults {
        UserPosDefaults {
            cost_center: "Main".to_string(),
            price_list: Some("Standard".to_string()),
        }
    }

    fn payments(entries: &[(&str, &str)]) -> PaymentBreakdown {
        entries
            .iter()
            .map(|(method, currency)| {
                (
                    method.to_string(),
                    PaymentEntry {
                        currency: CurrencyCode::new(currency),
                        amount: Decimal::from(100),
                    },
                )
            })
            .collect()
    }

    #[test]
    fn test_plan_currency() {
        assert_eq!(plan_currency(None), CurrencyPlan::Base);
        assert_eq!(plan_currency(Some(&payments(&[]))), CurrencyPlan::Base);
        assert_eq!(plan_currency(Some(&payments(&[("m1", "USD")]))), CurrencyPlan::Base);
        assert_eq!(
            plan_currency(Some(&payments(&[("m1", "kes")]))),
            CurrencyPlan::Foreign(CurrencyCode::new("KES"))
        );
        assert_eq!(
            plan_currency(Some(&payments(&[("m1", "KES"), ("m2", "ZAR")]))),
            CurrencyPlan::Base
        );
    }

    #[test]
    fn test_preferred_price_list() {
        let mut defaults = defaults();
        assert_eq!(
            preferred_price_list(Some("Happy Hour"), &defaults),
            Some("Happy Hour".to_string())
        );
        assert_eq!(preferred_price_list(None, &defaults), Some("Standard".to_string()));
        assert_eq!(preferred_price_list(Some(""), &defaults), Some("Standard".to_string()));

        defaults.price_list = None;
        assert_eq!(preferred_price_list(None, &defaults), None);
    }

    #[test]
    fn test_header_without_shift() {
        let header = InvoiceHeader::new("Walk-in", &defaults(), None, None, None);
        assert_eq!(header.shift, "");
        assert_eq!(header.cost_center, "Main");

        let shift = ShiftRef("SHIFT-0007".to_string());
        let header = InvoiceHeader::new("Walk-in", &defaults(), Some(&shift), None, None);
        assert_eq!(header.shift, "SHIFT-0007");
    }

    #[test]
    fn test_assemble_in_base_currency_keeps_rates() {
        let items = parse_items(&json!([{ "item_code": "COFFEE", "qty": 2, "rate": 3.5 }])).unwrap();
        let header = InvoiceHeader::new(
            "Walk-in",
            &defaults(),
            None,
            Some("Standard".to_string()),
            Some(d("1.5")),
        );

        let draft = assemble_invoice(header, &items, &Conversion::base()).unwrap();

        assert_eq!(draft.currency.as_str(), "USD");
        assert_eq!(draft.change, Some(d("1.5")));
        assert_eq!(draft.items.len(), 1);
        assert_eq!(draft.items[0].qty, d("2"));
        assert_eq!(draft.items[0].rate, d("3.5"));
        assert_eq!(draft.items[0].cost_center, "Main");
    }

    #[test]
    fn test_assemble_converts_every_line() {
        let items = parse_items(&json!([
            { "item_code": "TEA", "qty": 1, "rate": 2 },
            { "item_code": "CAKE", "qty": 3, "rate": "1.25", "uom": ["Slice", "Piece"] }
        ]))
        .unwrap();
        let conversion = Conversion::new(CurrencyCode::new("KES"), d("130"));
        let header = InvoiceHeader::new("Walk-in", &defaults(), None, None, None);

        let draft = assemble_invoice(header, &items, &conversion).unwrap();

        assert_eq!(draft.currency.as_str(), "KES");
        assert_eq!(draft.items[0].rate, d("260"));
        assert_eq!(draft.items[1].rate, d("162.5"));
        assert_eq!(draft.items[1].qty, d("3"));
        assert_eq!(draft.items[1].uom.as_deref(), Some("Piece"));
    }

    #[test]
    fn test_assemble_ignores_per_item_cost_center() {
        let items = parse_items(&json!([{ "item_code": "TEA", "cost_center": "Bar" }])).unwrap();
        let header = InvoiceHeader::new("Walk-in", &defaults(), None, None, None);
        let draft = assemble_invoice(header, &items, &Conversion::base()).unwrap();
        assert_eq!(draft.items[0].cost_center, "Main");
    }

    #[test]
    fn test_assemble_empty_cart() {
        let header = InvoiceHeader::new("Walk-in", &defaults(), None, None, None);
        let draft = assemble_invoice(header, &[], &Conversion::base()).unwrap();
        assert!(draft.items.is_empty());
    }

    #[test]
    fn test_assemble_rejects_unconvertible_rate() {
        let items = parse_items(&json!([
            { "item_code": "TEA", "rate": 2 },
            { "item_code": "GOLD", "rate": "79228162514264337593543950335" }
        ]))
        .unwrap();
        let conversion = Conversion::new(CurrencyCode::new("KES"), d("130"));
        let header = InvoiceHeader::new("Walk-in", &defaults(), None, None, None);

        let err = assemble_invoice(header, &items, &conversion).unwrap_err();

        assert!(matches!(err, InvoiceError::MalformedInput { .. }));
        assert!(err.to_string().contains("Row #2"));
    }
}
