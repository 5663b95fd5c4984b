//! # Money Module
//!
//! Currency codes, rate conversion and rounding for invoice amounts.
//!
//! ## Why Decimals?
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  THE FLOATING POINT PROBLEM                                             │
//! │                                                                         │
//! │  In f64:                                                                │
//! │    0.1 × 3 = 0.30000000000000004  ❌ WRONG!                             │
//! │                                                                         │
//! │  A converted line rate must equal  rate × exchange rate  EXACTLY,      │
//! │  otherwise the till and the ledger disagree on what the cashier        │
//! │  charged.                                                               │
//! │                                                                         │
//! │  OUR SOLUTION: rust_decimal::Decimal                                   │
//! │    3.5 × 130 = 455.0                                                    │
//! │    Rounding happens once, in the store, on the grand total.            │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Usage
//! ```rust
//! use rust_decimal::Decimal;
//! use till_core::money::{Conversion, CurrencyCode};
//!
//! let kes = Conversion::new(CurrencyCode::new("kes"), Decimal::from(130));
//! assert_eq!(kes.currency.as_str(), "KES");
//! assert_eq!(kes.convert(Decimal::from(2)), Some(Decimal::from(260)));
//! ```

use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use ts_rs::TS;

use crate::{BASE_CURRENCY, CURRENCY_PRECISION};

// =============================================================================
// Currency Code
// =============================================================================

/// An ISO 4217 style currency code, always stored upper case.
///
/// ## Normalisation
/// Cashier-entered codes arrive as `"kes"`, `" KES "` or `null`.
/// Everything is trimmed and upper-cased; blank input becomes the base
/// currency.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(transparent)]
pub struct CurrencyCode(String);

impl CurrencyCode {
    /// Creates a currency code, normalising case and whitespace.
    ///
    /// ## Example
    /// ```rust
    /// use till_core::money::CurrencyCode;
    ///
    /// assert_eq!(CurrencyCode::new(" zwg ").as_str(), "ZWG");
    /// assert!(CurrencyCode::new("").is_base());
    /// ```
    pub fn new(code: &str) -> Self {
        let code = code.trim();
        if code.is_empty() {
            return CurrencyCode::base();
        }
        CurrencyCode(code.to_uppercase())
    }

    /// Returns the base currency (USD).
    pub fn base() -> Self {
        CurrencyCode(BASE_CURRENCY.to_string())
    }

    /// Checks if this is the base currency.
    #[inline]
    pub fn is_base(&self) -> bool {
        self.0 == BASE_CURRENCY
    }

    /// Returns the code as a string slice.
    #[inline]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Default for CurrencyCode {
    fn default() -> Self {
        CurrencyCode::base()
    }
}

impl fmt::Display for CurrencyCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

// =============================================================================
// Conversion
// =============================================================================

/// The invoice currency together with the multiplier from the base currency.
///
/// ## Invariant
/// `currency.is_base()` implies `rate == 1`. Base-currency conversions never
/// touch the amount, whatever the stored rate says.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Conversion {
    /// Currency every line rate ends up in.
    pub currency: CurrencyCode,

    /// Multiplier applied to a base-currency amount.
    pub rate: Decimal,
}

impl Conversion {
    /// Creates a conversion into `currency` at `rate`.
    ///
    /// A base-currency target always gets a rate of exactly one.
    pub fn new(currency: CurrencyCode, rate: Decimal) -> Self {
        if currency.is_base() {
            return Conversion::base();
        }
        Conversion { currency, rate }
    }

    /// The identity conversion (USD at 1).
    pub fn base() -> Self {
        Conversion {
            currency: CurrencyCode::base(),
            rate: Decimal::ONE,
        }
    }

    /// Expresses a base-currency amount in the target currency.
    ///
    /// ## User Workflow
    /// ```text
    /// Menu price: TEA $2.00
    /// Payment: one method, KES (USD → KES = 130)
    ///      │
    ///      ▼
    /// convert(2.00) ← THIS FUNCTION
    ///      │
    ///      ▼
    /// Invoice line: TEA KES 260.00
    /// ```
    ///
    /// Returns `None` when the product does not fit in a `Decimal`.
    pub fn convert(&self, amount: Decimal) -> Option<Decimal> {
        if self.currency.is_base() {
            return Some(amount);
        }
        amount.checked_mul(self.rate)
    }
}

impl Default for Conversion {
    fn default() -> Self {
        Conversion::base()
    }
}

// =============================================================================
// Arithmetic Helpers
// =============================================================================

/// Rounds an amount to currency precision using Bankers Rounding.
///
/// ## Example
/// ```rust
/// use rust_decimal::Decimal;
/// use std::str::FromStr;
/// use till_core::money::round_money;
///
/// assert_eq!(round_money(Decimal::from_str("0.125").unwrap()).to_string(), "0.12");
/// assert_eq!(round_money(Decimal::from_str("0.135").unwrap()).to_string(), "0.14");
/// ```
pub fn round_money(amount: Decimal) -> Decimal {
    amount.round_dp_with_strategy(CURRENCY_PRECISION, RoundingStrategy::MidpointNearestEven)
}

/// Sums `qty × rate` over all lines and rounds the result.
///
/// `None` if any product or the running sum overflows.
pub fn grand_total<'a>(
    lines: impl IntoIterator<Item = (&'a Decimal, &'a Decimal)>,
) -> Option<Decimal> {
    lines
        .into_iter()
        .try_fold(Decimal::ZERO, |acc, (qty, rate)| {
            acc.checked_add(qty.checked_mul(*rate)?)
        })
        .map(round_money)
}

/// Parses decimal text, accepting plain (`"3.50"`) and scientific (`"1e3"`) forms.
///
/// Returns `None` for anything else, including `"NaN"` and `"inf"`.
pub fn parse_decimal(text: &str) -> Option<Decimal> {
    let text = text.trim();
    Decimal::from_str(text)
        .or_else(|_| Decimal::from_scientific(text))
        .ok()
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn d(text: &str) -> Decimal {
        Decimal::from_str(text).unwrap()
    }

    #[test]
    fn test_currency_code_normalisation() {
        assert_eq!(CurrencyCode::new("kes").as_str(), "KES");
        assert_eq!(CurrencyCode::new("  usd ").as_str(), "USD");
        assert!(CurrencyCode::new("usd").is_base());
        assert!(CurrencyCode::new("   ").is_base());
        assert_eq!(format!("{}", CurrencyCode::new("zar")), "ZAR");
    }

    #[test]
    fn test_base_conversion_is_identity() {
        let conversion = Conversion::base();
        assert_eq!(conversion.convert(d("3.5")), Some(d("3.5")));
        assert_eq!(conversion.convert(Decimal::MAX), Some(Decimal::MAX));

        // A stored USD → USD rate other than 1 is ignored.
        let conversion = Conversion::new(CurrencyCode::new("USD"), d("7"));
        assert_eq!(conversion.rate, Decimal::ONE);
        assert_eq!(conversion.convert(d("3.5")), Some(d("3.5")));
    }

    #[test]
    fn test_foreign_conversion_is_exact() {
        let conversion = Conversion::new(CurrencyCode::new("KES"), d("130"));
        assert_eq!(conversion.convert(d("2")), Some(d("260")));
        assert_eq!(conversion.convert(d("3.5")), Some(d("455")));

        let conversion = Conversion::new(CurrencyCode::new("ZWG"), d("26.7512"));
        assert_eq!(conversion.convert(d("0.1")), Some(d("2.67512")));
    }

    #[test]
    fn test_conversion_overflow() {
        let conversion = Conversion::new(CurrencyCode::new("KES"), d("130"));
        assert_eq!(conversion.convert(Decimal::MAX), None);
    }

    #[test]
    fn test_round_money_bankers() {
        assert_eq!(round_money(d("10.005")), d("10.00"));
        assert_eq!(round_money(d("10.015")), d("10.02"));
        assert_eq!(round_money(d("7")), d("7"));
    }

    #[test]
    fn test_grand_total() {
        let lines = [(d("2"), d("3.5")), (d("1"), d("0.333"))];
        let total = grand_total(lines.iter().map(|(q, r)| (q, r)));
        assert_eq!(total, Some(d("7.33")));
    }

    #[test]
    fn test_grand_total_overflow() {
        let product = [(d("10000000000000000000000000000"), d("100"))];
        assert_eq!(grand_total(product.iter().map(|(q, r)| (q, r))), None);

        let sum = [(Decimal::ONE, Decimal::MAX), (Decimal::ONE, Decimal::MAX)];
        assert_eq!(grand_total(sum.iter().map(|(q, r)| (q, r))), None);
    }

    #[test]
    fn test_parse_decimal() {
        assert_eq!(parse_decimal("3.50"), Some(d("3.5")));
        assert_eq!(parse_decimal(" 12 "), Some(d("12")));
        assert_eq!(parse_decimal("1e3"), Some(d("1000")));
        assert_eq!(parse_decimal("abc"), None);
        assert_eq!(parse_decimal("NaN"), None);
    }
}
