//! # Session Context
//!
//! Who is calling. Passed explicitly into every command instead of being
//! read from ambient request state.

use serde::{Deserialize, Serialize};

/// The logged-in cashier for one hook invocation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionContext {
    user: String,
}

impl SessionContext {
    /// Creates a session for `user`.
    pub fn new(user: impl Into<String>) -> Self {
        SessionContext { user: user.into() }
    }

    /// The session user's identifier.
    pub fn user(&self) -> &str {
        &self.user
    }
}
