//! Reviewer assignment flows.
//!
//! Exercises the assignment engine end to end against a real SQLite store:
//! 1. Creation picks 0, 1 or 2 active teammates, never the author
//! 2. Reassignment swaps in an eligible teammate or refuses
//! 3. Merge is one-way and idempotent

mod common;

use review_assign_lib::error::{AppError, ConflictReason, Resource};
use review_assign_lib::models::PullRequestStatus;

#[tokio::test]
async fn test_single_teammate_becomes_the_reviewer() {
    let (_dir, _pool, services) = common::setup().await;
    common::seed_team(&services, "backend", &[("u1", "Alice", true), ("u2", "Bob", true)]).await;

    let pr = services
        .pull_requests
        .create_pull_request("pr-1", "Add search", "u1")
        .await
        .unwrap();

    assert_eq!(pr.assigned_reviewers, vec!["u2".to_string()]);
    assert_eq!(pr.status, PullRequestStatus::Open);
    assert_eq!(pr.merged_at, None);

    let stored = services.pull_requests.get_pull_request("pr-1").await.unwrap();
    assert_eq!(stored, pr);
}

#[tokio::test]
async fn test_reviewer_count_follows_team_size_and_skips_author() {
    let (_dir, _pool, services) = common::setup().await;

    for others in 0..=5usize {
        let team = format!("team-{}", others);
        let author = format!("{}-author", team);
        let mut ids = vec![author.clone()];
        ids.extend((0..others).map(|i| format!("{}-m{}", team, i)));
        let members: Vec<(&str, &str, bool)> =
            ids.iter().map(|id| (id.as_str(), id.as_str(), true)).collect();
        common::seed_team(&services, &team, &members).await;

        let pr_id = format!("pr-{}", others);
        let pr = services
            .pull_requests
            .create_pull_request(&pr_id, "Change", &author)
            .await
            .unwrap();

        assert_eq!(pr.assigned_reviewers.len(), others.min(2), "team of {}", others);
        assert!(!pr.has_reviewer(&author));
        assert!(pr
            .assigned_reviewers
            .iter()
            .all(|r| r.starts_with(&format!("{}-m", team))));
    }
}

#[tokio::test]
async fn test_inactive_members_are_never_picked() {
    let (_dir, pool, services) = common::setup().await;
    common::seed_team(
        &services,
        "backend",
        &[("u1", "Alice", true), ("u2", "Bob", false), ("u3", "Carol", false)],
    )
    .await;

    let pr = services
        .pull_requests
        .create_pull_request("pr-1", "Add search", "u1")
        .await
        .unwrap();

    assert!(pr.assigned_reviewers.is_empty());
    assert!(common::stored_reviewers(&pool, "pr-1").await.is_empty());
}

#[tokio::test]
async fn test_create_rejects_duplicate_id_and_unknown_author() {
    let (_dir, pool, services) = common::setup().await;
    common::seed_team(&services, "backend", &[("u1", "Alice", true), ("u2", "Bob", true)]).await;
    services
        .pull_requests
        .create_pull_request("pr-1", "Add search", "u1")
        .await
        .unwrap();

    let err = services
        .pull_requests
        .create_pull_request("pr-1", "Again", "u2")
        .await
        .unwrap_err();
    assert!(err.is_already_exists(Resource::PullRequest));

    let err = services
        .pull_requests
        .create_pull_request("pr-2", "Orphan", "ghost")
        .await
        .unwrap_err();
    assert!(err.is_not_found(Resource::User));

    assert_eq!(common::count_rows(&pool, "pull_requests").await, 1);
}

#[tokio::test]
async fn test_reassign_picks_the_only_eligible_teammate() {
    let (_dir, pool, services) = common::setup().await;
    common::seed_team(
        &services,
        "backend",
        &[
            ("u1", "Alice", true),
            ("u2", "Bob", true),
            ("u3", "Carol", true),
            ("u4", "Dan", true),
        ],
    )
    .await;
    common::seed_pull_request(&pool, "pr-1", "u1", &["u2", "u3"]).await;

    let reassignment = services
        .pull_requests
        .reassign_reviewer("pr-1", "u2")
        .await
        .unwrap();

    assert_eq!(reassignment.replaced_by, "u4");
    assert_eq!(
        common::sorted_reviewers(&reassignment.pull_request),
        vec!["u3".to_string(), "u4".to_string()]
    );
    assert_eq!(
        common::stored_reviewers(&pool, "pr-1").await,
        vec!["u3".to_string(), "u4".to_string()]
    );
}

#[tokio::test]
async fn test_reassign_never_picks_author_or_current_reviewers() {
    let (_dir, pool, services) = common::setup().await;
    common::seed_team(
        &services,
        "backend",
        &[
            ("u1", "Alice", true),
            ("u2", "Bob", true),
            ("u3", "Carol", true),
            ("u4", "Dan", true),
            ("u5", "Eve", true),
            ("u6", "Frank", false),
        ],
    )
    .await;
    common::seed_pull_request(&pool, "pr-1", "u1", &["u2", "u3"]).await;

    let mut current = "u2".to_string();
    for _ in 0..10 {
        let before = common::stored_reviewers(&pool, "pr-1").await;
        let reassignment = services
            .pull_requests
            .reassign_reviewer("pr-1", &current)
            .await
            .unwrap();

        let new = reassignment.replaced_by.clone();
        assert_ne!(new, "u1");
        assert_ne!(new, "u6");
        assert!(!before.contains(&new), "{} was already assigned", new);
        assert_eq!(reassignment.pull_request.assigned_reviewers.len(), 2);
        current = new;
    }
}

#[tokio::test]
async fn test_reassign_merged_pull_request_is_a_conflict() {
    let (_dir, pool, services) = common::setup().await;
    common::seed_team(
        &services,
        "backend",
        &[("u1", "Alice", true), ("u2", "Bob", true), ("u3", "Carol", true)],
    )
    .await;
    common::seed_pull_request(&pool, "pr-1", "u1", &["u2"]).await;
    services.pull_requests.merge("pr-1").await.unwrap();

    let err = services
        .pull_requests
        .reassign_reviewer("pr-1", "u2")
        .await
        .unwrap_err();

    assert_eq!(err.conflict_reason(), Some(ConflictReason::Merged));
    assert_eq!(common::stored_reviewers(&pool, "pr-1").await, vec!["u2".to_string()]);
}

#[tokio::test]
async fn test_reassign_unassigned_user_is_a_conflict() {
    let (_dir, pool, services) = common::setup().await;
    common::seed_team(
        &services,
        "backend",
        &[("u1", "Alice", true), ("u2", "Bob", true), ("u3", "Carol", true)],
    )
    .await;
    common::seed_pull_request(&pool, "pr-1", "u1", &["u2"]).await;

    let err = services
        .pull_requests
        .reassign_reviewer("pr-1", "u3")
        .await
        .unwrap_err();
    assert_eq!(err.conflict_reason(), Some(ConflictReason::NotAssigned));

    let err = services
        .pull_requests
        .reassign_reviewer("pr-404", "u2")
        .await
        .unwrap_err();
    assert!(err.is_not_found(Resource::PullRequest));
}

#[tokio::test]
async fn test_reassign_without_candidates_keeps_the_reviewer() {
    let (_dir, pool, services) = common::setup().await;
    common::seed_team(
        &services,
        "backend",
        &[
            ("u1", "Alice", true),
            ("u2", "Bob", true),
            ("u3", "Carol", true),
            ("u4", "Dan", false),
        ],
    )
    .await;
    common::seed_pull_request(&pool, "pr-1", "u1", &["u2", "u3"]).await;

    let err = services
        .pull_requests
        .reassign_reviewer("pr-1", "u2")
        .await
        .unwrap_err();

    assert!(matches!(
        err,
        AppError::Conflict {
            reason: ConflictReason::NoCandidate,
            ..
        }
    ));
    assert_eq!(
        common::stored_reviewers(&pool, "pr-1").await,
        vec!["u2".to_string(), "u3".to_string()]
    );
}

#[tokio::test]
async fn test_merge_is_idempotent() {
    let (_dir, pool, services) = common::setup().await;
    common::seed_team(&services, "backend", &[("u1", "Alice", true), ("u2", "Bob", true)]).await;
    common::seed_pull_request(&pool, "pr-1", "u1", &["u2"]).await;

    let first = services.pull_requests.merge("pr-1").await.unwrap();
    assert!(first.is_merged());
    assert!(first.merged_at.is_some());

    // Pin the stored merge time so a second write would be visible
    sqlx::query("UPDATE pull_requests SET merged_at = 12345 WHERE pull_request_id = 'pr-1'")
        .execute(&pool)
        .await
        .unwrap();

    let second = services.pull_requests.merge("pr-1").await.unwrap();
    assert_eq!(second.status, PullRequestStatus::Merged);
    assert_eq!(second.merged_at, Some(12345));
    assert_eq!(second.assigned_reviewers, vec!["u2".to_string()]);

    let err = services.pull_requests.merge("pr-404").await.unwrap_err();
    assert!(err.is_not_found(Resource::PullRequest));
}

#[tokio::test]
async fn test_review_assignments_list_any_status() {
    let (_dir, pool, services) = common::setup().await;
    common::seed_team(&services, "backend", &[("u1", "Alice", true), ("u2", "Bob", true)]).await;
    common::seed_pull_request(&pool, "pr-1", "u1", &["u2"]).await;
    common::seed_pull_request(&pool, "pr-2", "u1", &["u2"]).await;
    services.pull_requests.merge("pr-1").await.unwrap();

    let mut reviews = services.users.get_review_assignments("u2").await.unwrap();
    reviews.sort_by(|a, b| a.pull_request_id.cmp(&b.pull_request_id));

    assert_eq!(reviews.len(), 2);
    assert_eq!(reviews[0].status, PullRequestStatus::Merged);
    assert_eq!(reviews[1].status, PullRequestStatus::Open);
    assert!(services
        .users
        .get_review_assignments("u1")
        .await
        .unwrap()
        .is_empty());
}
