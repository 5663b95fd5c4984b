//! # POS Settings Repository
//!
//! Cashier → defaults mapping and the global selling price list.

use chrono::Utc;
use sqlx::SqlitePool;
use tracing::debug;

use crate::error::DbResult;
use till_core::UserPosDefaults;

/// Repository for POS settings.
#[derive(Debug, Clone)]
pub struct PosSettingsRepository {
    pool: SqlitePool,
}

impl PosSettingsRepository {
    /// Creates a new PosSettingsRepository.
    pub fn new(pool: SqlitePool) -> Self {
        PosSettingsRepository { pool }
    }

    /// Returns the defaults mapped to `user`, if an administrator set any.
    pub async fn user_defaults(&self, user: &str) -> DbResult<Option<UserPosDefaults>> {
        let row: Option<(String, Option<String>)> = sqlx::query_as(
            r#"
            SELECT cost_center, price_list
            FROM pos_settings_user_mapping
            WHERE user = ?1
            "#,
        )
        .bind(user)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(|(cost_center, price_list)| UserPosDefaults {
            cost_center,
            price_list,
        }))
    }

    /// Maps `user` to `defaults`, replacing any earlier mapping.
    pub async fn map_user(&self, user: &str, defaults: &UserPosDefaults) -> DbResult<()> {
        debug!(user = %user, cost_center = %defaults.cost_center, "Mapping POS user");

        sqlx::query(
            r#"
            INSERT INTO pos_settings_user_mapping (user, cost_center, price_list, updated_at)
            VALUES (?1, ?2, ?3, ?4)
            ON CONFLICT (user) DO UPDATE SET
                cost_center = excluded.cost_center,
                price_list = excluded.price_list,
                updated_at = excluded.updated_at
            "#,
        )
        .bind(user)
        .bind(&defaults.cost_center)
        .bind(&defaults.price_list)
        .bind(Utc::now())
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    /// Removes the mapping for `user`. Returns whether one existed.
    pub async fn unmap_user(&self, user: &str) -> DbResult<bool> {
        let result = sqlx::query("DELETE FROM pos_settings_user_mapping WHERE user = ?1")
            .bind(user)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    /// Returns the global selling price list.
    pub async fn selling_price_list(&self) -> DbResult<Option<String>> {
        let price_list: Option<Option<String>> =
            sqlx::query_scalar("SELECT selling_price_list FROM selling_settings WHERE id = 1")
                .fetch_optional(&self.pool)
                .await?;

        Ok(price_list.flatten().filter(|name| !name.trim().is_empty()))
    }

    /// Sets (or clears) the global selling price list.
    pub async fn set_selling_price_list(&self, price_list: Option<&str>) -> DbResult<()> {
        debug!(price_list = ?price_list, "Setting selling price list");

        sqlx::query(
            r#"
            INSERT INTO selling_settings (id, selling_price_list, updated_at)
            VALUES (1, ?1, ?2)
            ON CONFLICT (id) DO UPDATE SET
                selling_price_list = excluded.selling_price_list,
                updated_at = excluded.updated_at
            "#,
        )
        .bind(price_list)
        .bind(Utc::now())
        .execute(&self.pool)
        .await?;

        Ok(())
    }
}
