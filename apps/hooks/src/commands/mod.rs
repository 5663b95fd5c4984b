//! # Hook Commands Module
//!
//! All operations exposed to the POS front end.
//!
//! ## Command Organization
//! ```text
//! commands/
//! ├── mod.rs             ◄─── You are here (exports)
//! ├── sales_invoice.rs   ◄─── create_sales_invoice
//! ├── defaults.rs        ◄─── get_pos_user_defaults
//! ├── shift.rs           ◄─── get_last_open_shift_for_current_user
//! └── exchange_rates.rs  ◄─── get_exchange_rates
//! ```
//!
//! ## How Commands Work
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Hook Command Flow                                    │
//! │                                                                         │
//! │  POS front end                                                          │
//! │  ─────────────                                                          │
//! │  call('create_sales_invoice', {                                         │
//! │    customer: 'Walk-in Customer',                                        │
//! │    items: [{ item_code: 'TEA', qty: 1, rate: 2 }],                      │
//! │    multi_currency_payments: { m1: { currency: 'KES', amount: 260 } }    │
//! │  });                                                                    │
//! │         │                                                               │
//! │         ▼                                                               │
//! │  Hooks::call(session, operation, payload)                               │
//! │         │                                                               │
//! │         ▼                                                               │
//! │  async fn create_sales_invoice(                                         │
//! │      db: &DbState,             ◄── shared pool                          │
//! │      messages: &MessageQueue,  ◄── user-facing messages                 │
//! │      config: &HooksConfig,     ◄── naming series                        │
//! │      session: &SessionContext, ◄── logged-in user                       │
//! │      request: CreateSalesInvoiceRequest,                                │
//! │  ) -> CreateSalesInvoiceResponse                                        │
//! │         │                                                               │
//! │         │ (JSON serialization)                                          │
//! │         ▼                                                               │
//! │  { success: true, name: 'ACC-SINV-2026-00001', total: 260, ... }        │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Each command declares only the state it needs.

pub mod defaults;
pub mod exchange_rates;
pub mod sales_invoice;
pub mod shift;
