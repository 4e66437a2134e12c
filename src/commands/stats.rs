//! Statistics command.

use crate::error::AppError;
use crate::services::{PullRequestReviewerStat, Services, UserAssignmentStat};
use serde::Serialize;

/// Both assignment views in one response.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AssignmentStats {
    pub users: Vec<UserAssignmentStat>,
    pub pull_requests: Vec<PullRequestReviewerStat>,
}

pub async fn assignment_stats(services: &Services) -> Result<AssignmentStats, AppError> {
    Ok(AssignmentStats {
        users: services.stats.user_assignment_stats().await?,
        pull_requests: services.stats.pull_request_reviewer_stats().await?,
    })
}
