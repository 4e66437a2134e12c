//! Transport-neutral command handlers.
//!
//! Each command validates its input, checks the caller against the
//! [`Authorization`] predicate and then delegates to a service. Commands are
//! organized by resource:
//! - `pull_request`: creation, reviewer reassignment and merge
//! - `team`: team creation and lookup
//! - `user`: activation and review listings
//! - `stats`: assignment statistics

pub mod pull_request;
pub mod stats;
pub mod team;
pub mod user;

pub use pull_request::{
    create_pull_request, merge_pull_request, reassign_reviewer, CreatePullRequestInput,
    MergePullRequestInput, ReassignReviewerInput,
};
pub use stats::{assignment_stats, AssignmentStats};
pub use team::{add_team, get_team, AddTeamInput};
pub use user::{get_user_reviews, set_user_active, SetUserActiveInput, UserReviews};

use crate::auth::Authorization;
use crate::error::AppError;

/// Reject callers without admin rights.
fn require_admin(caller: &impl Authorization) -> Result<(), AppError> {
    if caller.is_admin() {
        Ok(())
    } else {
        log::debug!("[auth] '{}' is not an admin", caller.current_user_id());
        Err(AppError::unauthorized("admin role required"))
    }
}

/// Reject empty or whitespace-only values.
fn require_non_blank(value: &str, field: &str) -> Result<(), AppError> {
    if value.trim().is_empty() {
        return Err(AppError::invalid_input_field(
            format!("{} must not be empty", field),
            field,
        ));
    }
    Ok(())
}
