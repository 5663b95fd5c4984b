//! # Exchange Rate Repository
//!
//! The `currency_exchange` table: one rate per (from, to) pair.
//! Item prices are kept in USD, so hooks only ever ask for `USD → code`.

use std::collections::BTreeMap;

use chrono::Utc;
use rust_decimal::Decimal;
use sqlx::SqlitePool;
use tracing::debug;

use super::decimal_column;
use crate::error::DbResult;
use till_core::CurrencyCode;

/// Repository for currency exchange rates.
#[derive(Debug, Clone)]
pub struct ExchangeRateRepository {
    pool: SqlitePool,
}

impl ExchangeRateRepository {
    /// Creates a new ExchangeRateRepository.
    pub fn new(pool: SqlitePool) -> Self {
        ExchangeRateRepository { pool }
    }

    /// Returns the stored rate for `from → to`, if any.
    pub async fn get_rate(&self, from: &CurrencyCode, to: &CurrencyCode) -> DbResult<Option<Decimal>> {
        let text: Option<String> = sqlx::query_scalar(
            r#"
            SELECT exchange_rate
            FROM currency_exchange
            WHERE from_currency = ?1 AND to_currency = ?2
            "#,
        )
        .bind(from.as_str())
        .bind(to.as_str())
        .fetch_optional(&self.pool)
        .await?;

        text.map(|text| decimal_column("exchange_rate", &text))
            .transpose()
    }

    /// Inserts or replaces the rate for `from → to`.
    pub async fn upsert_rate(
        &self,
        from: &CurrencyCode,
        to: &CurrencyCode,
        rate: Decimal,
    ) -> DbResult<()> {
        debug!(from = %from, to = %to, rate = %rate, "Upserting exchange rate");

        sqlx::query(
            r#"
            INSERT INTO currency_exchange (from_currency, to_currency, exchange_rate, updated_at)
            VALUES (?1, ?2, ?3, ?4)
            ON CONFLICT (from_currency, to_currency) DO UPDATE SET
                exchange_rate = excluded.exchange_rate,
                updated_at = excluded.updated_at
            "#,
        )
        .bind(from.as_str())
        .bind(to.as_str())
        .bind(rate.to_string())
        .bind(Utc::now())
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    /// Returns every rate quoted from `from`, keyed by target currency.
    pub async fn rates_from(&self, from: &CurrencyCode) -> DbResult<BTreeMap<CurrencyCode, Decimal>> {
        let rows: Vec<(String, String)> = sqlx::query_as(
            r#"
            SELECT to_currency, exchange_rate
            FROM currency_exchange
            WHERE from_currency = ?1
            ORDER BY to_currency
            "#,
        )
        .bind(from.as_str())
        .fetch_all(&self.pool)
        .await?;

        rows.into_iter()
            .map(|(to, text)| Ok((CurrencyCode::new(&to), decimal_column("exchange_rate", &text)?)))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{Database, DbConfig, DbError};
    use std::str::FromStr;

    fn code(text: &str) -> CurrencyCode {
        CurrencyCode::new(text)
    }

    #[tokio::test]
    async fn test_missing_rate() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let rate = db.exchange_rates().get_rate(&code("USD"), &code("XYZ")).await.unwrap();
        assert_eq!(rate, None);
    }

    #[tokio::test]
    async fn test_rate_round_trips_exactly() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let rates = db.exchange_rates();
        let rate = Decimal::from_str("129.8765").unwrap();

        rates.upsert_rate(&code("USD"), &code("KES"), rate).await.unwrap();
        assert_eq!(
            rates.get_rate(&code("USD"), &code("KES")).await.unwrap(),
            Some(rate)
        );

        // Direction matters
        assert_eq!(rates.get_rate(&code("KES"), &code("USD")).await.unwrap(), None);

        rates
            .upsert_rate(&code("USD"), &code("KES"), Decimal::from(130))
            .await
            .unwrap();
        assert_eq!(
            rates.get_rate(&code("USD"), &code("KES")).await.unwrap(),
            Some(Decimal::from(130))
        );
    }

    #[tokio::test]
    async fn test_rates_from_base() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let rates = db.exchange_rates();
        rates.upsert_rate(&code("USD"), &code("ZAR"), Decimal::from(18)).await.unwrap();
        rates.upsert_rate(&code("USD"), &code("KES"), Decimal::from(130)).await.unwrap();
        rates.upsert_rate(&code("EUR"), &code("KES"), Decimal::from(140)).await.unwrap();

        let table = rates.rates_from(&code("USD")).await.unwrap();
        let keys: Vec<&str> = table.keys().map(CurrencyCode::as_str).collect();
        assert_eq!(keys, vec!["KES", "ZAR"]);
    }

    #[tokio::test]
    async fn test_corrupt_rate_is_reported() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        sqlx::query(
            "INSERT INTO currency_exchange VALUES ('USD', 'BAD', 'not-a-number', '2026-01-01')",
        )
        .execute(db.pool())
        .await
        .unwrap();

        let err = db
            .exchange_rates()
            .get_rate(&code("USD"), &code("BAD"))
            .await
            .unwrap_err();
        assert!(matches!(err, DbError::Corrupt { .. }));
    }
}
