//! Team model.

use super::user::User;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// A stored team row.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow)]
pub struct TeamRecord {
    pub name: String,
    pub created_at: i64,
}

/// A team with its roster, as returned by the membership operations.
///
/// The roster is derived from the users' team affiliation, never stored.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Team {
    pub name: String,
    pub members: Vec<User>,
}

impl Team {
    /// Identifiers of all members.
    pub fn member_ids(&self) -> Vec<&str> {
        self.members.iter().map(|m| m.user_id.as_str()).collect()
    }

    /// Members eligible for review.
    pub fn active_members(&self) -> impl Iterator<Item = &User> {
        self.members.iter().filter(|m| m.can_review())
    }
}
