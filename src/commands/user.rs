//! User commands.

use super::{require_admin, require_non_blank};
use crate::auth::Authorization;
use crate::error::AppError;
use crate::models::{PullRequestShort, User};
use crate::services::Services;
use serde::{Deserialize, Serialize};

/// Input for set_user_active command.
#[derive(Debug, Clone, Deserialize)]
pub struct SetUserActiveInput {
    pub user_id: String,
    pub is_active: bool,
}

/// Pull requests a user reviews.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct UserReviews {
    pub user_id: String,
    pub pull_requests: Vec<PullRequestShort>,
}

/// Activate or deactivate a user. Admin only.
pub async fn set_user_active(
    services: &Services,
    caller: &impl Authorization,
    input: SetUserActiveInput,
) -> Result<User, AppError> {
    require_admin(caller)?;
    require_non_blank(&input.user_id, "user_id")?;

    services
        .users
        .set_is_active(&input.user_id, input.is_active)
        .await
}

/// List the pull requests `user_id` reviews.
///
/// Callers other than an admin or the user themself get an empty list.
pub async fn get_user_reviews(
    services: &Services,
    caller: &impl Authorization,
    user_id: &str,
) -> Result<UserReviews, AppError> {
    require_non_blank(user_id, "user_id")?;

    let pull_requests = if caller.is_admin_or_owner(user_id) {
        services.users.get_review_assignments(user_id).await?
    } else {
        Vec::new()
    };

    Ok(UserReviews {
        user_id: user_id.to_string(),
        pull_requests,
    })
}
