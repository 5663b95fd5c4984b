//! # Payload Coercion
//!
//! Turns the loosely typed JSON a POS front end sends into [`LineItem`]s and
//! [`PaymentEntry`]s.
//!
//! ## Coercion Rules
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  Field       Falsy (null, missing, 0, "", false, [], {})   Otherwise    │
//! │  ─────────   ─────────────────────────────────────────   ────────────  │
//! │  qty         1                                             number /     │
//! │                                                            numeric text │
//! │  rate        0                                             number /     │
//! │                                                            numeric text │
//! │  remarks     ""                                            text         │
//! │  uom         none                                          text, or the │
//! │                                                            smallest     │
//! │                                                            member of a  │
//! │                                                            list         │
//! │  item_code   "" (store rejects it)                         text         │
//! │  currency    USD                                           upper-cased  │
//! │                                                                         │
//! │  Anything that fits no rule → InvoiceError::MalformedInput             │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Note that a quantity of `0` is falsy and becomes `1`, while the text
//! `"0"` is not falsy and stays zero (the store then rejects the line).

use rust_decimal::Decimal;
use serde_json::{Map, Value};

use crate::error::{InvoiceError, InvoiceResult};
use crate::money::{parse_decimal, CurrencyCode};
use crate::types::{LineItem, PaymentBreakdown, PaymentEntry};

// =============================================================================
// Items
// =============================================================================

/// Parses the `items` argument of the hook.
///
/// ## Accepted Shapes
/// - a JSON array of item objects
/// - a string holding a JSON-encoded array of item objects
///
/// ## Example
/// ```rust
/// use serde_json::json;
/// use till_core::coercion::parse_items;
///
/// let encoded = json!("[{\"item_code\": \"TEA\", \"rate\": \"2\"}]");
/// let items = parse_items(&encoded).unwrap();
/// assert_eq!(items[0].item_code, "TEA");
/// assert_eq!(items[0].qty.to_string(), "1");
///
/// assert!(parse_items(&json!("not json")).is_err());
/// ```
pub fn parse_items(payload: &Value) -> InvoiceResult<Vec<LineItem>> {
    match payload {
        Value::Array(records) => records
            .iter()
            .enumerate()
            .map(|(index, record)| coerce_line_item(index + 1, record))
            .collect(),
        Value::String(encoded) => {
            let decoded: Value = serde_json::from_str(encoded).map_err(|e| {
                InvoiceError::malformed(format!("items is not valid JSON: {}", e))
            })?;
            match decoded {
                Value::Array(_) => parse_items(&decoded),
                other => Err(InvoiceError::malformed(format!(
                    "items must encode a list, got {}",
                    type_name(&other)
                ))),
            }
        }
        other => Err(InvoiceError::malformed(format!(
            "items must be a list or a JSON string, got {}",
            type_name(other)
        ))),
    }
}

/// Coerces one cart record into a [`LineItem`].
///
/// `row` is the 1-based position of the record, used in error messages.
pub fn coerce_line_item(row: usize, record: &Value) -> InvoiceResult<LineItem> {
    let fields = record.as_object().ok_or_else(|| {
        InvoiceError::malformed(format!(
            "Row #{}: item must be an object, got {}",
            row,
            type_name(record)
        ))
    })?;

    Ok(LineItem {
        item_code: coerce_item_code(row, field(fields, "item_code"))?,
        qty: coerce_number(row, "qty", field(fields, "qty"), Decimal::ONE)?,
        rate: coerce_number(row, "rate", field(fields, "rate"), Decimal::ZERO)?,
        uom: coerce_uom(row, field(fields, "uom"))?,
        remarks: coerce_remarks(row, field(fields, "remarks"))?,
    })
}

/// Reads a numeric field, returning `default` for falsy values.
///
/// ## Rules
/// - falsy → `default`
/// - `true` → 1
/// - JSON number → exact decimal of its text form
/// - numeric string → parsed (plain or scientific notation)
/// - anything else → `MalformedInput`
pub fn coerce_number(
    row: usize,
    name: &str,
    value: &Value,
    default: Decimal,
) -> InvoiceResult<Decimal> {
    if is_falsy(value) {
        return Ok(default);
    }

    let parsed = match value {
        Value::Bool(true) => Some(Decimal::ONE),
        Value::Number(number) => parse_decimal(&number.to_string()),
        Value::String(text) => parse_decimal(text),
        _ => None,
    };

    parsed.ok_or_else(|| {
        InvoiceError::malformed(format!(
            "Row #{}: {} must be a number, got {}",
            row, name, value
        ))
    })
}

/// Resolves the unit of measure.
///
/// A list-valued uom is reduced to its lexicographically smallest member so
/// the same cart always produces the same invoice.
///
/// ## Example
/// ```rust
/// use serde_json::json;
/// use till_core::coercion::coerce_uom;
///
/// assert_eq!(coerce_uom(1, &json!(["Plate", "Bowl"])).unwrap(), Some("Bowl".to_string()));
/// assert_eq!(coerce_uom(1, &json!("Cup")).unwrap(), Some("Cup".to_string()));
/// assert_eq!(coerce_uom(1, &json!(null)).unwrap(), None);
/// ```
pub fn coerce_uom(row: usize, value: &Value) -> InvoiceResult<Option<String>> {
    match value {
        Value::Null => Ok(None),
        Value::String(uom) if uom.trim().is_empty() => Ok(None),
        Value::String(uom) => Ok(Some(uom.clone())),
        Value::Array(members) => {
            let mut smallest: Option<&str> = None;
            for member in members {
                let uom = member.as_str().ok_or_else(|| {
                    InvoiceError::malformed(format!(
                        "Row #{}: uom members must be text, got {}",
                        row,
                        type_name(member)
                    ))
                })?;
                if smallest.map_or(true, |current| uom < current) {
                    smallest = Some(uom);
                }
            }
            Ok(smallest.map(str::to_string))
        }
        other => Err(InvoiceError::malformed(format!(
            "Row #{}: uom must be text or a list of text, got {}",
            row,
            type_name(other)
        ))),
    }
}

fn coerce_item_code(row: usize, value: &Value) -> InvoiceResult<String> {
    match value {
        Value::Null => Ok(String::new()),
        Value::String(code) => Ok(code.clone()),
        Value::Number(number) => Ok(number.to_string()),
        other => Err(InvoiceError::malformed(format!(
            "Row #{}: item_code must be text, got {}",
            row,
            type_name(other)
        ))),
    }
}

fn coerce_remarks(row: usize, value: &Value) -> InvoiceResult<String> {
    if is_falsy(value) {
        return Ok(String::new());
    }
    match value {
        Value::String(text) => Ok(text.clone()),
        Value::Number(number) => Ok(number.to_string()),
        Value::Bool(flag) => Ok(flag.to_string()),
        other => Err(InvoiceError::malformed(format!(
            "Row #{}: remarks must be text, got {}",
            row,
            type_name(other)
        ))),
    }
}

// =============================================================================
// Payments
// =============================================================================

/// Parses the `multi_currency_payments` argument of the hook.
///
/// ## Accepted Shapes
/// - `null` → no breakdown
/// - an object mapping method key → `{ "currency": ..., "amount": ... }`
/// - a string holding such an object JSON-encoded
///
/// ## Example
/// ```rust
/// use serde_json::json;
/// use till_core::coercion::parse_payments;
///
/// let payments = parse_payments(&json!({ "m1": { "currency": "kes", "amount": 100 } }))
///     .unwrap()
///     .unwrap();
/// assert_eq!(payments["m1"].currency.as_str(), "KES");
/// ```
pub fn parse_payments(payload: &Value) -> InvoiceResult<Option<PaymentBreakdown>> {
    match payload {
        Value::Null => Ok(None),
        Value::Object(methods) => methods
            .iter()
            .map(|(method, entry)| Ok((method.clone(), coerce_payment_entry(method, entry)?)))
            .collect::<InvoiceResult<PaymentBreakdown>>()
            .map(Some),
        Value::String(encoded) => {
            let decoded: Value = serde_json::from_str(encoded).map_err(|e| {
                InvoiceError::malformed(format!(
                    "multi_currency_payments is not valid JSON: {}",
                    e
                ))
            })?;
            match decoded {
                Value::Object(_) | Value::Null => parse_payments(&decoded),
                other => Err(InvoiceError::malformed(format!(
                    "multi_currency_payments must encode an object, got {}",
                    type_name(&other)
                ))),
            }
        }
        other => Err(InvoiceError::malformed(format!(
            "multi_currency_payments must be an object, got {}",
            type_name(other)
        ))),
    }
}

/// Coerces one tender line.
///
/// The amount plays no part in currency selection, so an amount that does
/// not read as a number is kept as zero rather than failing the sale.
pub fn coerce_payment_entry(method: &str, value: &Value) -> InvoiceResult<PaymentEntry> {
    let fields = value.as_object().ok_or_else(|| {
        InvoiceError::malformed(format!(
            "payment '{}' must be an object, got {}",
            method,
            type_name(value)
        ))
    })?;

    let currency = match field(fields, "currency") {
        Value::Null => CurrencyCode::base(),
        Value::String(code) => CurrencyCode::new(code),
        other => {
            return Err(InvoiceError::malformed(format!(
                "payment '{}': currency must be text, got {}",
                method,
                type_name(other)
            )))
        }
    };

    let amount = coerce_number(0, "amount", field(fields, "amount"), Decimal::ZERO)
        .unwrap_or(Decimal::ZERO);

    Ok(PaymentEntry { currency, amount })
}

// =============================================================================
// Change
// =============================================================================

/// Reads the change handed back to the customer.
///
/// `null`, missing or blank text means "not given"; a number or numeric
/// text is kept exactly, zero included.
///
/// ```rust
/// use serde_json::json;
/// use till_core::coercion::coerce_change;
///
/// assert_eq!(coerce_change(&json!(null)).unwrap(), None);
/// assert_eq!(coerce_change(&json!("1.50")).unwrap().unwrap().to_string(), "1.50");
/// assert!(coerce_change(&json!({ "usd": 1 })).is_err());
/// ```
pub fn coerce_change(value: &Value) -> InvoiceResult<Option<Decimal>> {
    let parsed = match value {
        Value::Null => return Ok(None),
        Value::String(text) if text.trim().is_empty() => return Ok(None),
        Value::Number(number) => parse_decimal(&number.to_string()),
        Value::String(text) => parse_decimal(text.trim()),
        _ => None,
    };

    parsed.map(Some).ok_or_else(|| {
        InvoiceError::malformed(format!(
            "change must be a number, got {}",
            type_name(value)
        ))
    })
}

// =============================================================================
// Helpers
// =============================================================================

static NULL: Value = Value::Null;

fn field<'a>(fields: &'a Map<String, Value>, name: &str) -> &'a Value {
    fields.get(name).unwrap_or(&NULL)
}

/// Mirrors the "empty means unset" convention of form payloads.
fn is_falsy(value: &Value) -> bool {
    match value {
        Value::Null => true,
        Value::Bool(flag) => !flag,
        Value::Number(number) => number.as_f64().map_or(false, |n| n == 0.0),
        Value::String(text) => text.is_empty(),
        Value::Array(items) => items.is_empty(),
        Value::Object(fields) => fields.is_empty(),
    }
}

fn type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "text",
        Value::Array(_) => "a list",
        Value::Object(_) => "an object",
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::str::FromStr;

    fn d(text: &str) -> Decimal {
        Decimal::from_str(text).unwrap()
    }

    #[test]
    fn test_parse_items_from_array() {
        let items = parse_items(&json!([
            { "item_code": "COFFEE", "qty": 2, "rate": 3.5, "uom": "Cup", "remarks": "no sugar" },
            { "item_code": "TEA" }
        ]))
        .unwrap();

        assert_eq!(items.len(), 2);
        assert_eq!(items[0].item_code, "COFFEE");
        assert_eq!(items[0].qty, d("2"));
        assert_eq!(items[0].rate, d("3.5"));
        assert_eq!(items[0].uom.as_deref(), Some("Cup"));
        assert_eq!(items[0].remarks, "no sugar");

        assert_eq!(items[1].qty, Decimal::ONE);
        assert_eq!(items[1].rate, Decimal::ZERO);
        assert_eq!(items[1].uom, None);
        assert_eq!(items[1].remarks, "");
    }

    #[test]
    fn test_parse_items_from_json_string() {
        let encoded = json!(r#"[{"item_code": "TEA", "qty": "3", "rate": "1.25"}]"#);
        let items = parse_items(&encoded).unwrap();
        assert_eq!(items[0].qty, d("3"));
        assert_eq!(items[0].rate, d("1.25"));
    }

    #[test]
    fn test_parse_items_keeps_input_order() {
        let items = parse_items(&json!([
            { "item_code": "C" }, { "item_code": "A" }, { "item_code": "B" }
        ]))
        .unwrap();
        let codes: Vec<&str> = items.iter().map(|i| i.item_code.as_str()).collect();
        assert_eq!(codes, vec!["C", "A", "B"]);
    }

    #[test]
    fn test_parse_items_empty_list_is_allowed() {
        assert!(parse_items(&json!([])).unwrap().is_empty());
        assert!(parse_items(&json!("[]")).unwrap().is_empty());
    }

    #[test]
    fn test_parse_items_rejects_bad_payloads() {
        let err = parse_items(&json!("{not json")).unwrap_err();
        assert!(matches!(err, InvoiceError::MalformedInput { .. }));

        let err = parse_items(&json!(r#"{"item_code": "TEA"}"#)).unwrap_err();
        assert!(err.to_string().contains("must encode a list"));

        let err = parse_items(&json!(42)).unwrap_err();
        assert!(matches!(err, InvoiceError::MalformedInput { .. }));

        let err = parse_items(&json!(["TEA"])).unwrap_err();
        assert!(err.to_string().contains("Row #1"));
    }

    #[test]
    fn test_falsy_quantity_becomes_one() {
        for qty in [json!(null), json!(0), json!(0.0), json!(""), json!(false)] {
            let item = coerce_line_item(1, &json!({ "item_code": "TEA", "qty": qty })).unwrap();
            assert_eq!(item.qty, Decimal::ONE, "qty {:?}", qty);
        }
    }

    #[test]
    fn test_zero_text_is_not_falsy() {
        // Non-empty text is taken at face value, even when it parses to zero.
        let item = coerce_line_item(1, &json!({ "item_code": "TEA", "qty": "0.00" })).unwrap();
        assert!(item.qty.is_zero());
    }

    #[test]
    fn test_falsy_rate_becomes_zero() {
        for rate in [json!(null), json!(0), json!(""), json!(false)] {
            let item = coerce_line_item(1, &json!({ "item_code": "TEA", "rate": rate })).unwrap();
            assert_eq!(item.rate, Decimal::ZERO);
        }
    }

    #[test]
    fn test_non_numeric_rate_is_malformed() {
        let err = coerce_line_item(3, &json!({ "item_code": "TEA", "rate": "two" })).unwrap_err();
        assert!(matches!(err, InvoiceError::MalformedInput { .. }));
        assert!(err.to_string().contains("Row #3: rate must be a number"));

        let err = coerce_line_item(1, &json!({ "item_code": "TEA", "qty": [1, 2] })).unwrap_err();
        assert!(matches!(err, InvoiceError::MalformedInput { .. }));
    }

    #[test]
    fn test_uom_list_picks_smallest_member() {
        assert_eq!(
            coerce_uom(1, &json!(["Plate", "Bowl", "Cup"])).unwrap(),
            Some("Bowl".to_string())
        );
        assert_eq!(coerce_uom(1, &json!([])).unwrap(), None);
        assert_eq!(coerce_uom(1, &json!("")).unwrap(), None);
        assert!(coerce_uom(1, &json!([1])).is_err());
        assert!(coerce_uom(1, &json!({ "uom": "Cup" })).is_err());
    }

    #[test]
    fn test_missing_item_code_is_left_for_the_store() {
        let item = coerce_line_item(1, &json!({ "qty": 1 })).unwrap();
        assert_eq!(item.item_code, "");

        let item = coerce_line_item(1, &json!({ "item_code": 1001 })).unwrap();
        assert_eq!(item.item_code, "1001");
    }

    #[test]
    fn test_parse_payments() {
        assert_eq!(parse_payments(&json!(null)).unwrap(), None);
        assert!(parse_payments(&json!({})).unwrap().unwrap().is_empty());

        let payments = parse_payments(&json!({
            "cash": { "currency": "usd", "amount": "10" },
            "mobile": { "amount": 5 },
            "card": { "currency": null }
        }))
        .unwrap()
        .unwrap();

        assert_eq!(payments.len(), 3);
        assert!(payments["cash"].currency.is_base());
        assert_eq!(payments["cash"].amount, d("10"));
        assert!(payments["mobile"].currency.is_base());
        assert!(payments["card"].currency.is_base());
        assert_eq!(payments["card"].amount, Decimal::ZERO);
    }

    #[test]
    fn test_parse_payments_from_json_string() {
        let payments = parse_payments(&json!(r#"{"m1": {"currency": "KES", "amount": 100}}"#))
            .unwrap()
            .unwrap();
        assert_eq!(payments["m1"].currency.as_str(), "KES");
    }

    #[test]
    fn test_parse_payments_rejects_bad_entries() {
        assert!(parse_payments(&json!({ "m1": "KES" })).is_err());
        assert!(parse_payments(&json!({ "m1": { "currency": 840 } })).is_err());
        assert!(parse_payments(&json!([1, 2])).is_err());
    }

    #[test]
    fn test_unreadable_payment_amount_is_zero() {
        for amount in [json!("lots"), json!([5]), json!({ "value": 5 })] {
            let payments = parse_payments(&json!({ "m1": { "currency": "kes", "amount": amount } }))
                .unwrap()
                .unwrap();
            assert_eq!(payments["m1"].amount, Decimal::ZERO, "{amount}");
            assert_eq!(payments["m1"].currency.as_str(), "KES");
        }

        let payments = parse_payments(&json!({ "m1": { "amount": "lots" } })).unwrap().unwrap();
        assert!(payments["m1"].currency.is_base());
    }

    #[test]
    fn test_coerce_change() {
        assert_eq!(coerce_change(&json!(0)).unwrap(), Some(Decimal::ZERO));
        assert_eq!(coerce_change(&json!(2.25)).unwrap(), Some(d("2.25")));
        assert_eq!(coerce_change(&json!("")).unwrap(), None);
        assert!(coerce_change(&json!("abc")).is_err());
        assert!(coerce_change(&json!(true)).is_err());
    }
}
