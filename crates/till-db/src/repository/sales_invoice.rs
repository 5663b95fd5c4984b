//! # Sales Invoice Repository
//!
//! The document store for sales invoices.
//!
//! ## Submit Flow
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                       submit(draft, owner)                              │
//! │                                                                         │
//! │  validate_draft(&draft)          (nothing written on failure)          │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  BEGIN                                                                  │
//! │  ├── naming_series += 1          → ACC-SINV-2026-00042                 │
//! │  ├── INSERT sales_invoices       (docstatus 0)                         │
//! │  ├── INSERT sales_invoice_items  (one row per line, idx 1..n)          │
//! │  └── UPDATE docstatus = 1        (submitted)                           │
//! │  COMMIT                                                                 │
//! │                                                                         │
//! │  Any error before COMMIT drops the transaction and rolls back, so      │
//! │  neither the invoice nor the series increment survive.                 │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use chrono::{Datelike, NaiveDate, Utc};
use rust_decimal::Decimal;
use sqlx::{FromRow, SqlitePool};
use tracing::{debug, info};
use uuid::Uuid;

use super::decimal_column;
use crate::error::{DbError, DbResult};
use till_core::money::grand_total;
use till_core::validation::validate_draft;
use till_core::{CurrencyCode, DocStatus, InvoiceDraft, InvoiceLine, SubmittedInvoice, ValidationError};

/// Series used when no other is configured.
pub const DEFAULT_NAMING_SERIES: &str = "ACC-SINV-.YYYY.-";

/// Counter width used when a series has no `#` placeholder.
const DEFAULT_SERIES_DIGITS: usize = 5;

// =============================================================================
// Naming Series
// =============================================================================

/// A naming series template expanded for one posting date.
///
/// Templates are dot-separated parts. `YYYY`, `YY`, `MM` and `DD` expand to
/// the posting date; a run of `#` marks the counter and its width; any other
/// part is literal. Without a `#` part the counter is appended with five
/// digits.
///
/// ```rust
/// use chrono::NaiveDate;
/// use till_db::repository::sales_invoice::SeriesName;
///
/// let date = NaiveDate::from_ymd_opt(2026, 3, 9).unwrap();
/// let series = SeriesName::expand("ACC-SINV-.YYYY.-", date);
/// assert_eq!(series.format(42), "ACC-SINV-2026-00042");
///
/// let series = SeriesName::expand("POS-.MM.-.###.-X", date);
/// assert_eq!(series.format(7), "POS-03-007-X");
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SeriesName {
    /// Text before the counter; also the key of the counter row.
    pub prefix: String,
    /// Zero-padded counter width.
    pub digits: usize,
    /// Text after the counter.
    pub suffix: String,
}

impl SeriesName {
    /// Expands `template` for `date`.
    pub fn expand(template: &str, date: NaiveDate) -> Self {
        let mut prefix = String::new();
        let mut suffix = String::new();
        let mut digits = None;

        for part in template.split('.') {
            let expanded = match part {
                "YYYY" => format!("{:04}", date.year()),
                "YY" => format!("{:02}", date.year() % 100),
                "MM" => format!("{:02}", date.month()),
                "DD" => format!("{:02}", date.day()),
                hashes if !hashes.is_empty() && hashes.chars().all(|c| c == '#') => {
                    if digits.is_none() {
                        digits = Some(hashes.len());
                        continue;
                    }
                    hashes.to_string()
                }
                literal => literal.to_string(),
            };

            if digits.is_some() {
                suffix.push_str(&expanded);
            } else {
                prefix.push_str(&expanded);
            }
        }

        SeriesName {
            prefix,
            digits: digits.unwrap_or(DEFAULT_SERIES_DIGITS),
            suffix,
        }
    }

    /// Formats the document name for counter value `n`.
    pub fn format(&self, n: i64) -> String {
        format!(
            "{}{:0width$}{}",
            self.prefix,
            n,
            self.suffix,
            width = self.digits
        )
    }
}

// =============================================================================
// Row Types
// =============================================================================

#[derive(Debug, FromRow)]
struct InvoiceRow {
    name: String,
    customer: String,
    cost_center: String,
    shift: String,
    price_list: Option<String>,
    change_amount: Option<String>,
    currency: String,
    grand_total: String,
    posting_date: NaiveDate,
    docstatus: DocStatus,
    owner: String,
}

#[derive(Debug, FromRow)]
struct LineRow {
    item_code: String,
    qty: String,
    rate: String,
    cost_center: String,
    remarks: String,
    uom: Option<String>,
}

impl LineRow {
    fn into_line(self) -> DbResult<InvoiceLine> {
        Ok(InvoiceLine {
            qty: decimal_column("qty", &self.qty)?,
            rate: decimal_column("rate", &self.rate)?,
            item_code: self.item_code,
            cost_center: self.cost_center,
            remarks: self.remarks,
            uom: self.uom,
        })
    }
}

impl InvoiceRow {
    fn into_invoice(self, items: Vec<InvoiceLine>) -> DbResult<SubmittedInvoice> {
        let change = self
            .change_amount
            .as_deref()
            .map(|text| decimal_column("change_amount", text))
            .transpose()?;

        Ok(SubmittedInvoice {
            grand_total: decimal_column("grand_total", &self.grand_total)?,
            currency: CurrencyCode::new(&self.currency),
            name: self.name,
            customer: self.customer,
            cost_center: self.cost_center,
            shift: self.shift,
            price_list: self.price_list,
            change,
            posting_date: self.posting_date,
            docstatus: self.docstatus,
            owner: self.owner,
            items,
        })
    }
}

// =============================================================================
// Repository
// =============================================================================

/// Repository for sales invoices.
#[derive(Debug, Clone)]
pub struct SalesInvoiceRepository {
    pool: SqlitePool,
}

impl SalesInvoiceRepository {
    /// Creates a new SalesInvoiceRepository.
    pub fn new(pool: SqlitePool) -> Self {
        SalesInvoiceRepository { pool }
    }

    /// Validates, names, inserts and submits `draft` in one transaction,
    /// posting it today (UTC).
    pub async fn submit(
        &self,
        draft: &InvoiceDraft,
        owner: &str,
        naming_series: &str,
    ) -> DbResult<SubmittedInvoice> {
        self.submit_on(draft, owner, naming_series, Utc::now().date_naive())
            .await
    }

    /// Same as [`submit`](Self::submit) with an explicit posting date.
    ///
    /// Permission checks are not applied: the caller already acts as the
    /// cashier's POS session.
    pub async fn submit_on(
        &self,
        draft: &InvoiceDraft,
        owner: &str,
        naming_series: &str,
        posting_date: NaiveDate,
    ) -> DbResult<SubmittedInvoice> {
        validate_draft(draft)?;

        let total = grand_total(draft.items.iter().map(|line| (&line.qty, &line.rate)))
            .ok_or(ValidationError::TotalOverflow)?;
        let series = SeriesName::expand(naming_series, posting_date);

        let mut tx = self.pool.begin().await?;

        let counter: i64 = sqlx::query_scalar(
            r#"
            INSERT INTO naming_series (prefix, current_value)
            VALUES (?1, 1)
            ON CONFLICT (prefix) DO UPDATE SET current_value = current_value + 1
            RETURNING current_value
            "#,
        )
        .bind(&series.prefix)
        .fetch_one(&mut *tx)
        .await?;

        let name = series.format(counter);
        debug!(name = %name, customer = %draft.customer, lines = draft.items.len(), "Inserting sales invoice");

        sqlx::query(
            r#"
            INSERT INTO sales_invoices (
                name, customer, cost_center, shift, price_list,
                change_amount, currency, grand_total, posting_date,
                docstatus, owner, created_at
            ) VALUES (
                ?1, ?2, ?3, ?4, ?5,
                ?6, ?7, ?8, ?9,
                ?10, ?11, ?12
            )
            "#,
        )
        .bind(&name)
        .bind(&draft.customer)
        .bind(&draft.cost_center)
        .bind(&draft.shift)
        .bind(&draft.price_list)
        .bind(draft.change.map(|change| change.to_string()))
        .bind(draft.currency.as_str())
        .bind(total.to_string())
        .bind(posting_date)
        .bind(DocStatus::Draft)
        .bind(owner)
        .bind(Utc::now())
        .execute(&mut *tx)
        .await?;

        for (index, line) in draft.items.iter().enumerate() {
            let amount = line
                .amount()
                .ok_or(ValidationError::AmountOverflow { row: index + 1 })?;

            sqlx::query(
                r#"
                INSERT INTO sales_invoice_items (
                    id, parent, idx, item_code, qty, rate, amount,
                    cost_center, remarks, uom
                ) VALUES (
                    ?1, ?2, ?3, ?4, ?5, ?6, ?7,
                    ?8, ?9, ?10
                )
                "#,
            )
            .bind(Uuid::new_v4().to_string())
            .bind(&name)
            .bind((index + 1) as i64)
            .bind(&line.item_code)
            .bind(line.qty.to_string())
            .bind(line.rate.to_string())
            .bind(amount.to_string())
            .bind(&line.cost_center)
            .bind(&line.remarks)
            .bind(&line.uom)
            .execute(&mut *tx)
            .await?;
        }

        let result = sqlx::query(
            "UPDATE sales_invoices SET docstatus = ?2 WHERE name = ?1 AND docstatus = ?3",
        )
        .bind(&name)
        .bind(DocStatus::Submitted)
        .bind(DocStatus::Draft)
        .execute(&mut *tx)
        .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("Sales Invoice (draft)", name));
        }

        tx.commit().await?;

        info!(
            name = %name,
            total = %total,
            currency = %draft.currency,
            "Sales invoice submitted"
        );

        Ok(SubmittedInvoice {
            name,
            customer: draft.customer.clone(),
            cost_center: draft.cost_center.clone(),
            shift: draft.shift.clone(),
            price_list: draft.price_list.clone(),
            change: draft.change,
            currency: draft.currency.clone(),
            grand_total: total,
            posting_date,
            docstatus: DocStatus::Submitted,
            owner: owner.to_string(),
            items: draft.items.clone(),
        })
    }

    /// Loads an invoice with its lines in cart order.
    pub async fn get(&self, name: &str) -> DbResult<Option<SubmittedInvoice>> {
        let row: Option<InvoiceRow> = sqlx::query_as(
            r#"
            SELECT
                name, customer, cost_center, shift, price_list,
                change_amount, currency, grand_total, posting_date,
                docstatus, owner
            FROM sales_invoices
            WHERE name = ?1
            "#,
        )
        .bind(name)
        .fetch_optional(&self.pool)
        .await?;

        let Some(row) = row else {
            return Ok(None);
        };

        let items = self.get_lines(name).await?;
        row.into_invoice(items).map(Some)
    }

    /// Loads the lines of an invoice ordered by `idx`.
    pub async fn get_lines(&self, name: &str) -> DbResult<Vec<InvoiceLine>> {
        let rows: Vec<LineRow> = sqlx::query_as(
            r#"
            SELECT item_code, qty, rate, cost_center, remarks, uom
            FROM sales_invoice_items
            WHERE parent = ?1
            ORDER BY idx
            "#,
        )
        .bind(name)
        .fetch_all(&self.pool)
        .await?;

        rows.into_iter().map(LineRow::into_line).collect()
    }

    /// Lists names of invoices created by `owner`, newest first.
    pub async fn names_for_owner(&self, owner: &str) -> DbResult<Vec<String>> {
        let names: Vec<String> = sqlx::query_scalar(
            r#"
            SELECT name
            FROM sales_invoices
            WHERE owner = ?1
            ORDER BY created_at DESC, name DESC
            "#,
        )
        .bind(owner)
        .fetch_all(&self.pool)
        .await?;

        Ok(names)
    }

    /// Counts stored invoices.
    pub async fn count(&self) -> DbResult<i64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM sales_invoices")
            .fetch_one(&self.pool)
            .await?;
        Ok(count)
    }

    /// Sum of line amounts of an invoice, recomputed from stored lines.
    pub async fn line_total(&self, name: &str) -> DbResult<Decimal> {
        let lines = self.get_lines(name).await?;
        grand_total(lines.iter().map(|line| (&line.qty, &line.rate)))
            .ok_or_else(|| DbError::corrupt("sales_invoice_items.amount", name))
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
