//! # State Module
//!
//! State handed to hook commands.
//!
//! Each concern is its own type and every command takes only what it needs.
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    State Architecture                                   │
//! │                                                                         │
//! │  ┌──────────────┐  ┌──────────────────┐  ┌──────────────────┐          │
//! │  │   DbState    │  │  MessageQueue    │  │  SessionContext  │          │
//! │  │              │  │                  │  │                  │          │
//! │  │  Database    │  │  Arc<Mutex<      │  │  user            │          │
//! │  │  (SQLite     │  │   Vec<Message>   │  │  (per call)      │          │
//! │  │   pool)      │  │  >>              │  │                  │          │
//! │  └──────────────┘  └──────────────────┘  └──────────────────┘          │
//! │                                                                         │
//! │  THREAD SAFETY:                                                        │
//! │  • DbState: Database has internal connection pool (thread-safe)        │
//! │  • MessageQueue: Protected by Arc<Mutex<T>>                            │
//! │  • SessionContext: Immutable, one per invocation                       │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

mod db;
mod messages;
mod session;

pub use db::DbState;
pub use messages::{Indicator, MessageQueue, UserMessage};
pub use session::SessionContext;
