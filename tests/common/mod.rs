//! Shared fixtures for the integration tests.

#![allow(dead_code)]

use review_assign_lib::config::StoreConfig;
use review_assign_lib::db::pool::DbPool;
use review_assign_lib::db::{self, pull_requests};
use review_assign_lib::models::{NewPullRequest, NewTeamMember, PullRequest, Team};
use review_assign_lib::services::Services;
use tempfile::{tempdir, TempDir};

/// A fresh store in a temporary directory.
///
/// Keep the `TempDir` alive for the duration of the test.
pub async fn setup() -> (TempDir, DbPool, Services) {
    let dir = tempdir().unwrap();
    let config = StoreConfig::for_path(dir.path().join("review-assign.db"));
    let pool = db::initialize_with(&config).await.unwrap();
    let services = Services::new(pool.clone());
    (dir, pool, services)
}

/// Create `team_name` with `(user_id, username, is_active)` members.
pub async fn seed_team(services: &Services, team_name: &str, members: &[(&str, &str, bool)]) -> Team {
    let members = members
        .iter()
        .map(|(id, name, active)| NewTeamMember::new(*id, *name, *active))
        .collect();
    services.teams.create_team(team_name, members).await.unwrap()
}

/// Insert an open pull request with an exact reviewer list, bypassing
/// random selection.
pub async fn seed_pull_request(pool: &DbPool, id: &str, author_id: &str, reviewers: &[&str]) {
    let mut conn = pool.acquire().await.unwrap();
    let new_pr = NewPullRequest {
        pull_request_id: id.to_string(),
        pull_request_name: format!("Change {}", id),
        author_id: author_id.to_string(),
        created_at: db::now(),
    };
    let reviewers: Vec<String> = reviewers.iter().map(|r| r.to_string()).collect();
    pull_requests::create_with_reviewers(&mut conn, &new_pr, &reviewers)
        .await
        .unwrap();
}

/// Reviewers of `id` as stored, sorted.
pub async fn stored_reviewers(pool: &DbPool, id: &str) -> Vec<String> {
    sqlx::query_scalar(
        "SELECT reviewer_id FROM pull_request_reviewers WHERE pull_request_id = ? ORDER BY reviewer_id",
    )
    .bind(id)
    .fetch_all(pool)
    .await
    .unwrap()
}

pub async fn count_rows(pool: &DbPool, table: &str) -> i64 {
    sqlx::query_scalar(&format!("SELECT COUNT(*) FROM {}", table))
        .fetch_one(pool)
        .await
        .unwrap()
}

pub fn sorted_reviewers(pr: &PullRequest) -> Vec<String> {
    let mut reviewers = pr.assigned_reviewers.clone();
    reviewers.sort();
    reviewers
}
