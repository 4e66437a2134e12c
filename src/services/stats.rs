//! Reviewer assignment statistics.

use crate::db::pool::DbPool;
use crate::db::pull_requests;
use crate::error::AppError;
use serde::{Deserialize, Serialize};

/// How many pull requests a user is assigned to review.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserAssignmentStat {
    pub user_id: String,
    pub assigned_prs: i64,
}

/// Reviewer roster size of one pull request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PullRequestReviewerStat {
    pub pull_request_id: String,
    pub reviewer_count: usize,
    pub reviewers: Vec<String>,
}

#[derive(Debug, Clone)]
pub struct StatsService {
    pool: DbPool,
}

impl StatsService {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }

    /// Assignment counts over all pull requests, sorted by user id.
    ///
    /// Users without any assignment are not listed.
    pub async fn user_assignment_stats(&self) -> Result<Vec<UserAssignmentStat>, AppError> {
        let mut conn = self.pool.acquire().await?;
        let counts = pull_requests::count_by_reviewer(&mut conn).await?;

        Ok(counts
            .into_iter()
            .map(|(user_id, assigned_prs)| UserAssignmentStat {
                user_id,
                assigned_prs,
            })
            .collect())
    }

    /// Reviewers of every pull request, sorted by pull request id.
    pub async fn pull_request_reviewer_stats(
        &self,
    ) -> Result<Vec<PullRequestReviewerStat>, AppError> {
        let mut conn = self.pool.acquire().await?;
        let all = pull_requests::get_all(&mut conn).await?;

        Ok(all
            .into_iter()
            .map(|pr| PullRequestReviewerStat {
                pull_request_id: pr.pull_request_id,
                reviewer_count: pr.assigned_reviewers.len(),
                reviewers: pr.assigned_reviewers,
            })
            .collect())
    }
}
