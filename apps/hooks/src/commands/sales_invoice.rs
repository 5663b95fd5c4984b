//! # Sales Invoice Commands
//!
//! ## create_sales_invoice
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  1. shift      ← db.shifts().last_open_for_user(user)   (may be none)  │
//! │  2. defaults   ← db.pos_settings().user_defaults(user)  (required)     │
//! │  3. items      ← parse_items(request.items)                            │
//! │  4. currency   ← plan_currency(payments) → rate lookup if foreign      │
//! │  5. header     ← customer, cost center, shift, price list, change      │
//! │  6. lines      ← assemble_invoice(...)                                 │
//! │  7. store      ← db.sales_invoices().submit(...)  (one transaction)    │
//! │                                                                         │
//! │  Ok  → { success: true, name, total, posting_date, currency }          │
//! │  Err → error log + red message + { success: false, error, error_kind } │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{debug, info};
use ts_rs::TS;

use super::exchange_rates::resolve_conversion;
use crate::config::HooksConfig;
use crate::error::report_invoice_failure;
use crate::state::{DbState, MessageQueue, SessionContext};
use till_core::assembly::{assemble_invoice, plan_currency, preferred_price_list, InvoiceHeader};
use till_core::coercion::{coerce_change, parse_items, parse_payments};
use till_core::{CurrencyCode, ErrorKind, InvoiceError, InvoiceResult, SubmittedInvoice};
use till_db::Database;

/// Arguments of `create_sales_invoice`, as the POS front end sends them.
///
/// `items`, `change` and `multi_currency_payments` stay loosely typed here;
/// coercion happens inside the command so bad payloads become failure
/// responses instead of deserialization errors.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CreateSalesInvoiceRequest {
    pub customer: String,
    /// Array of item records, or a string holding one JSON-encoded.
    pub items: Value,
    pub price_list: Option<String>,
    pub change: Value,
    /// Method key → `{ currency, amount }`, or a string holding one.
    pub multi_currency_payments: Value,
}

/// Result of `create_sales_invoice`. Absent fields are omitted from JSON.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct CreateSalesInvoiceResponse {
    pub success: bool,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,

    /// Grand total in the invoice currency.
    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        with = "rust_decimal::serde::float_option"
    )]
    #[ts(type = "number | null")]
    pub total: Option<Decimal>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[ts(type = "string | null")]
    pub posting_date: Option<NaiveDate>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub currency: Option<CurrencyCode>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error_kind: Option<ErrorKind>,
}

impl CreateSalesInvoiceResponse {
    /// Success response for a submitted invoice.
    pub fn succeeded(invoice: &SubmittedInvoice) -> Self {
        CreateSalesInvoiceResponse {
            success: true,
            name: Some(invoice.name.clone()),
            total: Some(invoice.grand_total),
            posting_date: Some(invoice.posting_date),
            currency: Some(invoice.currency.clone()),
            error: None,
            error_kind: None,
        }
    }

    /// Failure response carrying the error message and category.
    pub fn failed(err: &InvoiceError) -> Self {
        CreateSalesInvoiceResponse {
            success: false,
            name: None,
            total: None,
            posting_date: None,
            currency: None,
            error: Some(err.to_string()),
            error_kind: Some(err.kind()),
        }
    }
}

/// Creates and submits a sales invoice for the session user.
///
/// Never returns an error: failures are logged, recorded in the error log,
/// queued as a red user message and returned as `success: false`.
pub async fn create_sales_invoice(
    db: &DbState,
    messages: &MessageQueue,
    config: &HooksConfig,
    session: &SessionContext,
    request: CreateSalesInvoiceRequest,
) -> CreateSalesInvoiceResponse {
    debug!(
        user = %session.user(),
        customer = %request.customer,
        "create_sales_invoice command"
    );

    match submit_invoice(db.inner(), config, session, &request).await {
        Ok(invoice) => {
            info!(
                name = %invoice.name,
                user = %session.user(),
                currency = %invoice.currency,
                lines = invoice.items.len(),
                "Sales invoice created"
            );
            CreateSalesInvoiceResponse::succeeded(&invoice)
        }
        Err(err) => {
            report_invoice_failure(db.inner(), messages, session, &err).await;
            CreateSalesInvoiceResponse::failed(&err)
        }
    }
}

async fn submit_invoice(
    db: &Database,
    config: &HooksConfig,
    session: &SessionContext,
    request: &CreateSalesInvoiceRequest,
) -> InvoiceResult<SubmittedInvoice> {
    let user = session.user();

    let shift = db.shifts().last_open_for_user(user).await?;

    let defaults = db
        .pos_settings()
        .user_defaults(user)
        .await?
        .ok_or_else(|| InvoiceError::MissingPosDefaults {
            user: user.to_string(),
        })?;

    let items = parse_items(&request.items)?;
    let change = coerce_change(&request.change)?;
    let payments = parse_payments(&request.multi_currency_payments)?;

    let conversion = resolve_conversion(db, plan_currency(payments.as_ref())).await?;

    let price_list = match preferred_price_list(request.price_list.as_deref(), &defaults) {
        Some(price_list) => Some(price_list),
        None => db.pos_settings().selling_price_list().await?,
    };

    let header = InvoiceHeader::new(
        request.customer.as_str(),
        &defaults,
        shift.as_ref(),
        price_list,
        change,
    );
    let draft = assemble_invoice(header, &items, &conversion)?;

    let invoice = db
        .sales_invoices()
        .submit(&draft, user, &config.naming_series)
        .await?;

    Ok(invoice)
}

// =============================================================================
// Unit Tests
// =============================================================================
