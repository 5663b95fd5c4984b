//! # Exchange Rate Commands

use std::collections::BTreeMap;

use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;
use serde::ser::{SerializeMap, Serializer};
use serde::Serialize;
use tracing::debug;
use ts_rs::TS;

use crate::error::ApiError;
use crate::state::DbState;
use till_core::assembly::CurrencyPlan;
use till_core::{Conversion, CurrencyCode, InvoiceError, InvoiceResult, BASE_CURRENCY};
use till_db::Database;

/// Every rate quoted from the base currency, for display.
#[derive(Debug, Clone, PartialEq, Serialize, TS)]
#[ts(export)]
pub struct ExchangeRatesResponse {
    pub base: CurrencyCode,
    /// Target code → units of target per one unit of base. Base maps to 1.
    #[serde(serialize_with = "rates_as_numbers")]
    #[ts(type = "Record<string, number>")]
    pub rates: BTreeMap<CurrencyCode, Decimal>,
}

fn rates_as_numbers<S>(rates: &BTreeMap<CurrencyCode, Decimal>, serializer: S) -> Result<S::Ok, S::Error>
where
    S: Serializer,
{
    let mut map = serializer.serialize_map(Some(rates.len()))?;
    for (code, rate) in rates {
        map.serialize_entry(code, &rate.to_f64())?;
    }
    map.end()
}

/// Returns all rates from USD, with USD itself at 1.
pub async fn get_exchange_rates(db: &DbState) -> Result<ExchangeRatesResponse, ApiError> {
    debug!("get_exchange_rates command");

    let base = CurrencyCode::base();
    let mut rates = db.inner().exchange_rates().rates_from(&base).await?;
    rates.insert(base.clone(), Decimal::ONE);

    Ok(ExchangeRatesResponse { base, rates })
}

/// Turns a currency plan into a conversion, looking up the USD → code rate
/// when the plan is foreign. A stored rate of zero or below counts as missing.
pub(crate) async fn resolve_conversion(
    db: &Database,
    plan: CurrencyPlan,
) -> InvoiceResult<Conversion> {
    let currency = match plan {
        CurrencyPlan::Base => return Ok(Conversion::base()),
        CurrencyPlan::Foreign(currency) => currency,
    };

    let base = CurrencyCode::base();
    let rate = db
        .exchange_rates()
        .get_rate(&base, &currency)
        .await?
        .filter(|rate| *rate > Decimal::ZERO)
        .ok_or_else(|| InvoiceError::ExchangeRateNotFound {
            from: BASE_CURRENCY.to_string(),
            to: currency.to_string(),
        })?;

    debug!(currency = %currency, rate = %rate, "Exchange rate resolved");
    Ok(Conversion::new(currency, rate))
}

#[cfg(test)]
mod tests {
    use super::*;
    use till_db::DbConfig;

    #[tokio::test]
    async fn test_get_exchange_rates_includes_base() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        db.exchange_rates()
            .upsert_rate(&CurrencyCode::base(), &CurrencyCode::new("KES"), Decimal::from(130))
            .await
            .unwrap();

        let response = get_exchange_rates(&DbState::new(db)).await.unwrap();
        assert_eq!(response.rates.len(), 2);
        assert_eq!(response.rates[&CurrencyCode::base()], Decimal::ONE);

        let json = serde_json::to_value(&response).unwrap();
        assert_eq!(json["base"], "USD");
        assert_eq!(json["rates"]["KES"], 130.0);
    }

    #[tokio::test]
    async fn test_resolve_conversion() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        db.exchange_rates()
            .upsert_rate(&CurrencyCode::base(), &CurrencyCode::new("KES"), Decimal::from(130))
            .await
            .unwrap();

        let base = resolve_conversion(&db, CurrencyPlan::Base).await.unwrap();
        assert!(base.currency.is_base());

        let kes = resolve_conversion(&db, CurrencyPlan::Foreign(CurrencyCode::new("KES")))
            .await
            .unwrap();
        assert_eq!(kes.rate, Decimal::from(130));

        let err = resolve_conversion(&db, CurrencyPlan::Foreign(CurrencyCode::new("XYZ")))
            .await
            .unwrap_err();
        assert_eq!(err.to_string(), "No exchange rate found for USD → XYZ");
    }

    #[tokio::test]
    async fn test_resolve_conversion_skips_unusable_rates() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let rates = db.exchange_rates();
        rates
            .upsert_rate(&CurrencyCode::base(), &CurrencyCode::new("ZAR"), Decimal::ZERO)
            .await
            .unwrap();
        rates
            .upsert_rate(&CurrencyCode::base(), &CurrencyCode::new("GHS"), Decimal::from(-3))
            .await
            .unwrap();

        for code in ["ZAR", "GHS"] {
            let err = resolve_conversion(&db, CurrencyPlan::Foreign(CurrencyCode::new(code)))
                .await
                .unwrap_err();
            assert!(
                matches!(err, InvoiceError::ExchangeRateNotFound { ref to, .. } if to == code),
                "{code}: {err}"
            );
        }
    }
}
