//! User model.

use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// A person who can author pull requests and review them.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow)]
pub struct User {
    /// Caller-supplied unique identifier.
    pub user_id: String,

    /// Display name.
    pub username: String,

    /// Team the user belongs to; `None` until a team adopts them.
    pub team_name: Option<String>,

    /// Only active users are picked as reviewers.
    pub is_active: bool,
}

impl User {
    /// Whether this user may be selected as a reviewer.
    pub fn can_review(&self) -> bool {
        self.is_active
    }
}

/// A member entry supplied when creating a team.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewTeamMember {
    pub user_id: String,
    pub username: String,
    pub is_active: bool,
}

impl NewTeamMember {
    pub fn new(user_id: impl Into<String>, username: impl Into<String>, is_active: bool) -> Self {
        Self {
            user_id: user_id.into(),
            username: username.into(),
            is_active,
        }
    }

    /// The stored user this entry becomes once it joins `team_name`.
    pub fn into_user(self, team_name: &str) -> User {
        User {
            user_id: self.user_id,
            username: self.username,
            team_name: Some(team_name.to_string()),
            is_active: self.is_active,
        }
    }
}
