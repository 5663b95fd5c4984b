//! # User Message Channel
//!
//! Messages the POS front end shows the cashier (e.g. a red "Invoice
//! Creation Failed" dialog).
//!
//! ## Flow
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  Hook command fails                                                     │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  messages.push(UserMessage::error(title, text))                        │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  Front end polls ──► messages.drain() ──► shows dialogs in order       │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use std::sync::{Arc, Mutex, PoisonError};

use serde::{Deserialize, Serialize};
use ts_rs::TS;

/// Dialog color shown by the front end.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "lowercase")]
pub enum Indicator {
    Red,
    Orange,
    Green,
    Blue,
}

/// A titled message for the cashier.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct UserMessage {
    pub title: String,
    pub message: String,
    pub indicator: Indicator,
}

impl UserMessage {
    /// A red-indicator message.
    pub fn error(title: impl Into<String>, message: impl Into<String>) -> Self {
        UserMessage {
            title: title.into(),
            message: message.into(),
            indicator: Indicator::Red,
        }
    }
}

/// Shared, ordered queue of pending user messages.
///
/// Clones share the same queue.
#[derive(Debug, Clone, Default)]
pub struct MessageQueue {
    messages: Arc<Mutex<Vec<UserMessage>>>,
}

impl MessageQueue {
    /// Creates an empty queue.
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a message.
    pub fn push(&self, message: UserMessage) {
        self.with_messages(|messages| messages.push(message));
    }

    /// Removes and returns every pending message, oldest first.
    pub fn drain(&self) -> Vec<UserMessage> {
        self.with_messages(std::mem::take)
    }

    /// Returns a copy of the pending messages.
    pub fn snapshot(&self) -> Vec<UserMessage> {
        self.with_messages(|messages| messages.clone())
    }

    /// Number of pending messages.
    pub fn len(&self) -> usize {
        self.with_messages(|messages| messages.len())
    }

    /// True when nothing is pending.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    // Recovers the queue from a poisoned lock.
    fn with_messages<F, R>(&self, f: F) -> R
    where
        F: FnOnce(&mut Vec<UserMessage>) -> R,
    {
        let mut messages = self.messages.lock().unwrap_or_else(PoisonError::into_inner);
        f(&mut messages)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_push_and_drain_in_order() {
        let queue = MessageQueue::new();
        assert!(queue.is_empty());

        queue.push(UserMessage::error("First", "one"));
        queue.push(UserMessage::error("Second", "two"));
        assert_eq!(queue.len(), 2);

        let drained = queue.drain();
        assert_eq!(drained[0].title, "First");
        assert_eq!(drained[1].indicator, Indicator::Red);
        assert!(queue.is_empty());
    }

    #[test]
    fn test_clones_share_queue() {
        let queue = MessageQueue::new();
        let clone = queue.clone();
        clone.push(UserMessage::error("Title", "text"));
        assert_eq!(queue.snapshot().len(), 1);
    }

    #[test]
    fn test_message_json() {
        let json = serde_json::to_value(UserMessage::error("T", "m")).unwrap();
        assert_eq!(json["indicator"], "red");
    }
}
