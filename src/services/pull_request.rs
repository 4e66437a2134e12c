//! Assignment engine: pull request creation, reviewer reassignment and merge.
//!
//! Every operation runs as one transaction on the store. Reviewers are drawn
//! from the author's team (creation) or the replaced reviewer's team
//! (reassignment); only active users are eligible and the author never
//! reviews their own pull request.

use crate::db::pool::DbPool;
use crate::db::transaction::Transactor;
use crate::db::{self, pull_requests, users};
use crate::error::{AppError, ConflictReason, Resource};
use crate::models::{NewPullRequest, PullRequest, PullRequestStatus};
use serde::{Deserialize, Serialize};

/// Reviewers assigned when a pull request is created.
pub const MAX_REVIEWERS: usize = 2;

/// Outcome of a successful reassignment.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Reassignment {
    pub pull_request: PullRequest,
    /// The reviewer that took the removed reviewer's place.
    pub replaced_by: String,
}

#[derive(Debug, Clone)]
pub struct PullRequestService {
    pool: DbPool,
    transactor: Transactor,
}

impl PullRequestService {
    pub fn new(pool: DbPool, transactor: Transactor) -> Self {
        Self { pool, transactor }
    }

    /// Create an open pull request and assign up to [`MAX_REVIEWERS`]
    /// reviewers from the author's team.
    ///
    /// # Arguments
    /// * `pull_request_id` - Caller-supplied unique id
    /// * `pull_request_name` - Title
    /// * `author_id` - Id of an existing user
    ///
    /// # Returns
    /// The created pull request with the reviewers actually assigned (0, 1
    /// or 2 depending on how many active teammates the author has).
    pub async fn create_pull_request(
        &self,
        pull_request_id: &str,
        pull_request_name: &str,
        author_id: &str,
    ) -> Result<PullRequest, AppError> {
        let new_pr = NewPullRequest {
            pull_request_id: pull_request_id.to_string(),
            pull_request_name: pull_request_name.to_string(),
            author_id: author_id.to_string(),
            created_at: db::now(),
        };

        let created = self
            .transactor
            .within_transaction("create_pull_request", move |conn| {
                Box::pin(async move {
                    if pull_requests::exists(conn, &new_pr.pull_request_id).await? {
                        return Err(AppError::already_exists(
                            Resource::PullRequest,
                            new_pr.pull_request_id,
                        ));
                    }

                    let author = users::get_by_id(conn, &new_pr.author_id).await?;
                    let reviewers = match author.team_name.as_deref() {
                        Some(team) => {
                            users::get_random_active_excluding(
                                conn,
                                team,
                                std::slice::from_ref(&author.user_id),
                                MAX_REVIEWERS,
                            )
                            .await?
                        }
                        None => Vec::new(),
                    };
                    let reviewer_ids: Vec<String> =
                        reviewers.into_iter().map(|u| u.user_id).collect();

                    pull_requests::create_with_reviewers(conn, &new_pr, &reviewer_ids).await?;
                    Ok(new_pr.into_open(reviewer_ids))
                })
            })
            .await?;

        log::info!(
            "[assign] Created pull request '{}' by '{}' with reviewers {:?}",
            created.pull_request_id,
            created.author_id,
            created.assigned_reviewers
        );

        Ok(created)
    }

    /// Replace `old_reviewer_id` on an open pull request with a random active
    /// member of the old reviewer's team.
    ///
    /// The author, the old reviewer and every remaining reviewer are never
    /// picked. With no eligible candidate the call fails with
    /// `Conflict(NoCandidate)` and the old reviewer stays assigned.
    pub async fn reassign_reviewer(
        &self,
        pull_request_id: &str,
        old_reviewer_id: &str,
    ) -> Result<Reassignment, AppError> {
        let pr_id = pull_request_id.to_string();
        let old_id = old_reviewer_id.to_string();

        let reassignment = self
            .transactor
            .within_transaction("reassign_reviewer", move |conn| {
                Box::pin(async move {
                    let pr = pull_requests::get_by_id(conn, &pr_id).await?;

                    if !pr.can_be_modified() {
                        return Err(AppError::conflict_with_detail(
                            ConflictReason::Merged,
                            format!("'{}' is merged", pr.pull_request_id),
                        ));
                    }

                    if !pr.has_reviewer(&old_id) {
                        return Err(AppError::conflict_with_detail(
                            ConflictReason::NotAssigned,
                            format!(
                                "'{}' is not assigned to '{}'",
                                old_id, pr.pull_request_id
                            ),
                        ));
                    }

                    let old_reviewer = users::get_by_id(conn, &old_id).await?;

                    let mut excluded = pr.assigned_reviewers.clone();
                    excluded.push(pr.author_id.clone());

                    let candidates = match old_reviewer.team_name.as_deref() {
                        Some(team) => {
                            users::get_random_active_excluding(conn, team, &excluded, 1).await?
                        }
                        None => Vec::new(),
                    };
                    let replacement = candidates
                        .into_iter()
                        .next()
                        .ok_or_else(|| AppError::conflict(ConflictReason::NoCandidate))?;

                    pull_requests::replace_reviewer(
                        conn,
                        &pr.pull_request_id,
                        &old_id,
                        &replacement.user_id,
                        db::now(),
                    )
                    .await?;

                    let updated = pull_requests::get_by_id(conn, &pr.pull_request_id).await?;
                    Ok(Reassignment {
                        pull_request: updated,
                        replaced_by: replacement.user_id,
                    })
                })
            })
            .await?;

        log::info!(
            "[assign] Reassigned '{}' on pull request '{}' to '{}'",
            old_reviewer_id,
            pull_request_id,
            reassignment.replaced_by
        );

        Ok(reassignment)
    }

    /// Mark a pull request as merged.
    ///
    /// Merging an already merged pull request returns it unchanged, with its
    /// original merge time, and writes nothing.
    pub async fn merge(&self, pull_request_id: &str) -> Result<PullRequest, AppError> {
        let pull_request_id = pull_request_id.to_string();

        self.transactor
            .within_transaction("merge_pull_request", move |conn| {
                Box::pin(async move {
                    let pr = pull_requests::get_by_id(conn, &pull_request_id).await?;
                    if pr.is_merged() {
                        log::debug!("[assign] '{}' already merged", pr.pull_request_id);
                        return Ok(pr);
                    }

                    let merged_at = db::now();
                    pull_requests::update_status(
                        conn,
                        &pr.pull_request_id,
                        PullRequestStatus::Merged,
                        merged_at,
                    )
                    .await?;

                    log::info!("[assign] Merged pull request '{}'", pr.pull_request_id);
                    Ok(pr.merged(merged_at))
                })
            })
            .await
    }

    /// Get a pull request with its reviewers.
    pub async fn get_pull_request(&self, pull_request_id: &str) -> Result<PullRequest, AppError> {
        let mut conn = self.pool.acquire().await?;
        pull_requests::get_by_id(&mut conn, pull_request_id).await
    }
}
