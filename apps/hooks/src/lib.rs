//! # Till Hooks Library
//!
//! Server-side hooks behind the Till POS front end.
//!
//! ## Module Organization
//! ```text
//! till_hooks/
//! ├── lib.rs          ◄─── You are here (startup & dispatch)
//! ├── config.rs       ◄─── hooks.toml + TILL_* environment
//! ├── state/
//! │   ├── mod.rs      ◄─── State type exports
//! │   ├── db.rs       ◄─── Database state wrapper
//! │   ├── messages.rs ◄─── User-facing message queue
//! │   └── session.rs  ◄─── Logged-in user
//! ├── commands/
//! │   ├── mod.rs            ◄─── Command exports
//! │   ├── sales_invoice.rs  ◄─── create_sales_invoice
//! │   ├── defaults.rs       ◄─── get_pos_user_defaults
//! │   ├── shift.rs          ◄─── get_last_open_shift_for_current_user
//! │   └── exchange_rates.rs ◄─── get_exchange_rates
//! └── error.rs        ◄─── API error type & failure reporting
//! ```
//!
//! ## Startup Sequence
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                       Hooks Startup                                     │
//! │                                                                         │
//! │  1. HooksConfig::load()   defaults ◄ hooks.toml ◄ TILL_* env           │
//! │  2. init_tracing()        RUST_LOG ◄ log_filter ◄ built-in default     │
//! │  3. Hooks::connect()      SQLite (WAL) + embedded migrations           │
//! │  4. Hooks::call()         one operation per request                    │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

pub mod commands;
pub mod config;
pub mod error;
pub mod state;

use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;
use thiserror::Error;
use tracing::{debug, info, warn};
use tracing_subscriber::EnvFilter;

use commands::sales_invoice::{
    create_sales_invoice, CreateSalesInvoiceRequest, CreateSalesInvoiceResponse,
};
pub use config::{ConfigError, HooksConfig};
use error::{report_invoice_failure, ApiError};
use state::{DbState, MessageQueue, SessionContext};
use till_core::{ErrorKind, InvoiceError};
use till_db::{Database, DbError};

/// Filter used when neither `RUST_LOG` nor `log_filter` is set.
pub const DEFAULT_LOG_FILTER: &str = "info,till=debug,sqlx=warn";

/// Operation names accepted by [`Hooks::call`].
pub const OPERATIONS: [&str; 4] = [
    "create_sales_invoice",
    "get_pos_user_defaults",
    "get_last_open_shift_for_current_user",
    "get_exchange_rates",
];

/// Initializes the tracing subscriber for structured logging.
///
/// ## Log Levels
/// - `RUST_LOG=debug` - Show debug messages
/// - `RUST_LOG=till=trace` - Show trace for till crates only
/// - `log_filter` in hooks.toml when `RUST_LOG` is unset
/// - Default: [`DEFAULT_LOG_FILTER`]
///
/// Logs go to stderr; stdout carries the hook response.
pub fn init_tracing(config: &HooksConfig) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        let directive = config.log_filter.as_deref().unwrap_or(DEFAULT_LOG_FILTER);
        EnvFilter::try_new(directive).unwrap_or_else(|_| EnvFilter::new(DEFAULT_LOG_FILTER))
    });

    // A subscriber may already be installed by an embedding process.
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init();
}

/// Errors that prevent the hooks from starting.
#[derive(Debug, Error)]
pub enum StartupError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Database error: {0}")]
    Db(#[from] DbError),
}

/// Connected hooks: the state every command draws from.
#[derive(Debug, Clone)]
pub struct Hooks {
    db: DbState,
    messages: MessageQueue,
    config: HooksConfig,
}

impl Hooks {
    /// Connects the database described by `config` and applies migrations.
    pub async fn connect(config: HooksConfig) -> Result<Self, StartupError> {
        let db_config = config.db_config()?;
        info!(path = ?db_config.database_path, "Connecting database");

        let db = Database::new(db_config).await?;
        info!("Database connected and migrations applied");

        Ok(Hooks::with_database(db, config))
    }

    /// Wraps an already connected database.
    pub fn with_database(db: Database, config: HooksConfig) -> Self {
        Hooks {
            db: DbState::new(db),
            messages: MessageQueue::new(),
            config,
        }
    }

    pub fn db(&self) -> &DbState {
        &self.db
    }

    /// Messages queued for the user by failed operations.
    pub fn messages(&self) -> &MessageQueue {
        &self.messages
    }

    pub fn config(&self) -> &HooksConfig {
        &self.config
    }

    /// Runs one operation for the session user and returns its JSON result.
    ///
    /// `create_sales_invoice` always answers with a response object, even on
    /// failure. The lookup operations return `Err` on failure, as does an
    /// unknown operation name.
    pub async fn call(
        &self,
        session: &SessionContext,
        operation: &str,
        payload: Value,
    ) -> Result<Value, ApiError> {
        debug!(user = %session.user(), operation, "Hook call");

        match operation {
            "create_sales_invoice" => {
                let response = self.create_sales_invoice(session, payload).await;
                to_json(&response)
            }
            "get_pos_user_defaults" => {
                to_json(&commands::defaults::get_pos_user_defaults(&self.db, session).await?)
            }
            "get_last_open_shift_for_current_user" => to_json(
                &commands::shift::get_last_open_shift_for_current_user(&self.db, session).await?,
            ),
            "get_exchange_rates" => {
                to_json(&commands::exchange_rates::get_exchange_rates(&self.db).await?)
            }
            other => {
                warn!(operation = other, "Unknown hook operation");
                Err(ApiError::new(
                    ErrorKind::MalformedInput,
                    format!("Unknown operation '{}'", other),
                ))
            }
        }
    }

    async fn create_sales_invoice(
        &self,
        session: &SessionContext,
        payload: Value,
    ) -> CreateSalesInvoiceResponse {
        let request: CreateSalesInvoiceRequest = match from_payload(payload) {
            Ok(request) => request,
            Err(err) => {
                report_invoice_failure(self.db.inner(), &self.messages, session, &err).await;
                return CreateSalesInvoiceResponse::failed(&err);
            }
        };

        create_sales_invoice(&self.db, &self.messages, &self.config, session, request).await
    }
}

fn from_payload<T: DeserializeOwned + Default>(payload: Value) -> Result<T, InvoiceError> {
    if payload.is_null() {
        return Ok(T::default());
    }
    serde_json::from_value(payload).map_err(|e| InvoiceError::malformed(e.to_string()))
}

fn to_json<T: Serialize>(value: &T) -> Result<Value, ApiError> {
    serde_json::to_value(value)
        .map_err(|e| ApiError::new(ErrorKind::MalformedInput, e.to_string()))
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal::Decimal;
    use serde_json::json;
    use till_core::{CurrencyCode, UserPosDefaults, INVOICE_FAILURE_TITLE};
    use till_db::DbConfig;

    async fn hooks() -> Hooks {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        db.pos_settings()
            .map_user(
                "jane",
                &UserPosDefaults {
                    cost_center: "Main".to_string(),
                    price_list: None,
                },
            )
            .await
            .unwrap();
        db.exchange_rates()
            .upsert_rate(&CurrencyCode::base(), &CurrencyCode::new("KES"), Decimal::from(130))
            .await
            .unwrap();
        Hooks::with_database(db, HooksConfig::default())
    }

    #[tokio::test]
    async fn test_call_create_sales_invoice() {
        let hooks = hooks().await;
        let session = SessionContext::new("jane");

        let result = hooks
            .call(
                &session,
                "create_sales_invoice",
                json!({
                    "customer": "Walk-in Customer",
                    "items": [{ "item_code": "TEA", "qty": 2, "rate": 1.5 }],
                    "multi_currency_payments": { "m1": { "currency": "KES", "amount": 390 } }
                }),
            )
            .await
            .unwrap();

        assert_eq!(result["success"], true);
        assert_eq!(result["currency"], "KES");
        assert_eq!(result["total"], 390.0);
        assert!(result["name"].as_str().unwrap().starts_with("ACC-SINV-"));
        assert!(result.get("error").is_none());
    }

    #[tokio::test]
    async fn test_call_create_with_bad_payload_shape() {
        let hooks = hooks().await;
        let session = SessionContext::new("jane");

        let result = hooks
            .call(&session, "create_sales_invoice", json!({ "customer": 42 }))
            .await
            .unwrap();

        assert_eq!(result["success"], false);
        assert_eq!(result["error_kind"], "MALFORMED_INPUT");
        assert_eq!(hooks.messages().drain()[0].title, INVOICE_FAILURE_TITLE);
    }

    #[tokio::test]
    async fn test_call_lookups() {
        let hooks = hooks().await;
        let session = SessionContext::new("jane");

        let defaults = hooks
            .call(&session, "get_pos_user_defaults", Value::Null)
            .await
            .unwrap();
        assert_eq!(defaults["cost_center"], "Main");

        let shift = hooks
            .call(&session, "get_last_open_shift_for_current_user", Value::Null)
            .await
            .unwrap();
        assert_eq!(shift, Value::Null);

        let rates = hooks.call(&session, "get_exchange_rates", Value::Null).await.unwrap();
        assert_eq!(rates["rates"]["USD"], 1.0);
        assert_eq!(rates["rates"]["KES"], 130.0);
    }

    #[tokio::test]
    async fn test_call_unknown_operation() {
        let hooks = hooks().await;
        let err = hooks
            .call(&SessionContext::new("jane"), "delete_everything", Value::Null)
            .await
            .unwrap_err();
        assert_eq!(err.code, ErrorKind::MalformedInput);
    }
}
