//! # Hook Errors and Failure Reporting
//!
//! ## Error Handling Strategy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Error Flow in Till Hooks                             │
//! │                                                                         │
//! │  Lookup commands (defaults, shift, rates)                              │
//! │     Result<T, ApiError>   ← DbError / InvoiceError converted           │
//! │                                                                         │
//! │  create_sales_invoice                                                  │
//! │     InvoiceError ──► report_invoice_failure()                          │
//! │                        ├── tracing::error!                             │
//! │                        ├── error_log row  "Create Sales Invoice Error" │
//! │                        └── UserMessage    "Invoice Creation Failed"    │
//! │                  ──► { success: false, error, error_kind }             │
//! │                                                                         │
//! │  Nothing escapes create_sales_invoice as an Err.                       │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use std::error::Error as StdError;
use std::fmt::Write as _;

use serde::Serialize;
use tracing::{error, warn};

use crate::state::{MessageQueue, SessionContext, UserMessage};
use till_core::{ErrorKind, InvoiceError, INVOICE_ERROR_LOG_TITLE, INVOICE_FAILURE_TITLE};
use till_db::{Database, DbError};

/// Error returned from the lookup commands.
///
/// ## Serialization
/// ```json
/// {
///   "code": "CONFIGURATION_ERROR",
///   "message": "Logged-in user is not mapped in POS Settings (user: jane)"
/// }
/// ```
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ApiError {
    /// Machine-readable category
    pub code: ErrorKind,

    /// Human-readable message
    pub message: String,
}

impl ApiError {
    /// Creates a new API error.
    pub fn new(code: ErrorKind, message: impl Into<String>) -> Self {
        ApiError {
            code,
            message: message.into(),
        }
    }
}

impl From<InvoiceError> for ApiError {
    fn from(err: InvoiceError) -> Self {
        ApiError::new(err.kind(), err.to_string())
    }
}

impl From<DbError> for ApiError {
    fn from(err: DbError) -> Self {
        error!(error = %err, "Database error in hook command");
        InvoiceError::from(err).into()
    }
}

impl std::fmt::Display for ApiError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "[{:?}] {}", self.code, self.message)
    }
}

impl std::error::Error for ApiError {}

// =============================================================================
// Failure Reporting
// =============================================================================

/// Renders an error with its cause chain and debug form for the error log.
///
/// ```text
/// Row #2: Item Code is required
///
/// Caused by:
///     0: Row #2: Item Code is required
///
/// StoreRejected(MissingItemCode { row: 2 })
/// ```
pub fn failure_trace(err: &(dyn StdError + 'static)) -> String {
    let mut trace = err.to_string();

    let mut source = err.source();
    if source.is_some() {
        trace.push_str("\n\nCaused by:");
    }
    let mut depth = 0;
    while let Some(cause) = source {
        let _ = write!(trace, "\n    {}: {}", depth, cause);
        depth += 1;
        source = cause.source();
    }

    let _ = write!(trace, "\n\n{:?}", err);
    trace
}

/// Logs, records and surfaces a failed invoice creation.
///
/// Never fails: if the error log itself cannot be written, that is logged
/// and the user message is still queued.
pub async fn report_invoice_failure(
    db: &Database,
    messages: &MessageQueue,
    session: &SessionContext,
    err: &InvoiceError,
) {
    error!(
        user = %session.user(),
        kind = ?err.kind(),
        error = %err,
        "Sales invoice creation failed"
    );

    let trace = failure_trace(err);
    if let Err(log_err) = db
        .error_log()
        .record(INVOICE_ERROR_LOG_TITLE, &trace, Some(session.user()))
        .await
    {
        warn!(error = %log_err, "Could not write error log entry");
    }

    messages.push(UserMessage::error(INVOICE_FAILURE_TITLE, err.to_string()));
}

#[cfg(test)]
mod tests {
    use super::*;
    use till_core::ValidationError;

    #[test]
    fn test_trace_includes_cause_chain() {
        let err = InvoiceError::StoreRejected(ValidationError::MissingItemCode { row: 2 });
        let trace = failure_trace(&err);

        assert!(trace.starts_with("Row #2: Item Code is required"));
        assert!(trace.contains("Caused by:"));
        assert!(trace.contains("MissingItemCode"));
    }

    #[test]
    fn test_trace_without_cause() {
        let err = InvoiceError::malformed("items is not valid JSON");
        let trace = failure_trace(&err);
        assert!(!trace.contains("Caused by:"));
        assert!(trace.contains("MalformedInput"));
    }

    #[test]
    fn test_api_error_from_invoice_error() {
        let err: ApiError = InvoiceError::MissingPosDefaults {
            user: "jane".to_string(),
        }
        .into();
        assert_eq!(err.code, ErrorKind::Configuration);

        let json = serde_json::to_value(&err).unwrap();
        assert_eq!(json["code"], "CONFIGURATION_ERROR");
    }

    #[tokio::test]
    async fn test_report_writes_log_and_message() {
        let db = Database::new(till_db::DbConfig::in_memory()).await.unwrap();
        let messages = MessageQueue::new();
        let session = SessionContext::new("jane");
        let err = InvoiceError::ExchangeRateNotFound {
            from: "USD".to_string(),
            to: "XYZ".to_string(),
        };

        report_invoice_failure(&db, &messages, &session, &err).await;

        let entries = db.error_log().recent(10).await.unwrap();
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].title, INVOICE_ERROR_LOG_TITLE);
        assert_eq!(entries[0].user.as_deref(), Some("jane"));
        assert!(entries[0].trace.contains("XYZ"));

        let queued = messages.drain();
        assert_eq!(queued.len(), 1);
        assert_eq!(queued[0].title, INVOICE_FAILURE_TITLE);
    }
}
