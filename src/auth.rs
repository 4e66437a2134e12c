//! Caller identity and the authorization predicate.
//!
//! Identity arrives already verified from the embedding transport; this
//! crate only asks two questions of it.

use serde::{Deserialize, Serialize};

/// What the command layer needs to know about the caller.
pub trait Authorization {
    fn is_admin(&self) -> bool;

    fn current_user_id(&self) -> &str;

    /// Admins may act on anything; other callers only on what they own.
    fn is_admin_or_owner(&self, owner_id: &str) -> bool {
        self.is_admin() || self.current_user_id() == owner_id
    }
}

/// A resolved caller.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Identity {
    pub user_id: String,
    pub is_admin: bool,
}

impl Identity {
    pub fn admin(user_id: impl Into<String>) -> Self {
        Self {
            user_id: user_id.into(),
            is_admin: true,
        }
    }

    pub fn user(user_id: impl Into<String>) -> Self {
        Self {
            user_id: user_id.into(),
            is_admin: false,
        }
    }
}

impl Authorization for Identity {
    fn is_admin(&self) -> bool {
        self.is_admin
    }

    fn current_user_id(&self) -> &str {
        &self.user_id
    }
}
