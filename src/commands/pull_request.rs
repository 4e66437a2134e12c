//! Pull request commands. All of them require an admin caller.

use super::{require_admin, require_non_blank};
use crate::auth::Authorization;
use crate::error::AppError;
use crate::models::PullRequest;
use crate::services::{Reassignment, Services};
use serde::Deserialize;

/// Input for create_pull_request command.
#[derive(Debug, Clone, Deserialize)]
pub struct CreatePullRequestInput {
    pub pull_request_id: String,
    pub pull_request_name: String,
    pub author_id: String,
}

/// Input for reassign_reviewer command.
#[derive(Debug, Clone, Deserialize)]
pub struct ReassignReviewerInput {
    pub pull_request_id: String,
    pub old_user_id: String,
}

/// Input for merge_pull_request command.
#[derive(Debug, Clone, Deserialize)]
pub struct MergePullRequestInput {
    pub pull_request_id: String,
}

/// Create a pull request with automatically assigned reviewers.
///
/// # Arguments
/// * `services` - Service container
/// * `caller` - Must be an admin
/// * `input` - Id, title and author of the new pull request
///
/// # Returns
/// The created pull request
pub async fn create_pull_request(
    services: &Services,
    caller: &impl Authorization,
    input: CreatePullRequestInput,
) -> Result<PullRequest, AppError> {
    require_admin(caller)?;
    require_non_blank(&input.pull_request_id, "pull_request_id")?;
    require_non_blank(&input.pull_request_name, "pull_request_name")?;
    require_non_blank(&input.author_id, "author_id")?;

    services
        .pull_requests
        .create_pull_request(
            &input.pull_request_id,
            &input.pull_request_name,
            &input.author_id,
        )
        .await
}

/// Replace one reviewer of an open pull request.
pub async fn reassign_reviewer(
    services: &Services,
    caller: &impl Authorization,
    input: ReassignReviewerInput,
) -> Result<Reassignment, AppError> {
    require_admin(caller)?;
    require_non_blank(&input.pull_request_id, "pull_request_id")?;
    require_non_blank(&input.old_user_id, "old_user_id")?;

    services
        .pull_requests
        .reassign_reviewer(&input.pull_request_id, &input.old_user_id)
        .await
}

/// Merge a pull request. Repeating the call is harmless.
pub async fn merge_pull_request(
    services: &Services,
    caller: &impl Authorization,
    input: MergePullRequestInput,
) -> Result<PullRequest, AppError> {
    require_admin(caller)?;
    require_non_blank(&input.pull_request_id, "pull_request_id")?;

    services.pull_requests.merge(&input.pull_request_id).await
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::Identity;
    use crate::commands::test_support;
    use crate::error::Resource;
    use crate::models::NewTeamMember;

    fn create_input(id: &str, author: &str) -> CreatePullRequestInput {
        CreatePullRequestInput {
            pull_request_id: id.to_string(),
            pull_request_name: "Add search".to_string(),
            author_id: author.to_string(),
        }
    }

    #[tokio::test]
    async fn test_non_admin_is_rejected_before_any_write() {
        let (_dir, services) = test_support::services().await;
        let caller = Identity::user("u1");

        let err = create_pull_request(&services, &caller, create_input("pr-1", "u1"))
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::Unauthorized { .. }));

        let err = merge_pull_request(
            &services,
            &caller,
            MergePullRequestInput {
                pull_request_id: "pr-1".into(),
            },
        )
        .await
        .unwrap_err();
        assert!(matches!(err, AppError::Unauthorized { .. }));
    }

    #[tokio::test]
    async fn test_blank_fields_are_invalid() {
        let (_dir, services) = test_support::services().await;
        let admin = Identity::admin("root");

        let err = create_pull_request(&services, &admin, create_input(" ", "u1"))
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::InvalidInput { .. }));

        let err = reassign_reviewer(
            &services,
            &admin,
            ReassignReviewerInput {
                pull_request_id: "pr-1".into(),
                old_user_id: "".into(),
            },
        )
        .await
        .unwrap_err();
        assert!(matches!(err, AppError::InvalidInput { .. }));
    }

    #[tokio::test]
    async fn test_admin_create_and_merge() {
        let (_dir, services) = test_support::services().await;
        let admin = Identity::admin("root");
        services
            .teams
            .create_team(
                "backend",
                vec![
                    NewTeamMember::new("u1", "Alice", true),
                    NewTeamMember::new("u2", "Bob", true),
                ],
            )
            .await
            .unwrap();

        let pr = create_pull_request(&services, &admin, create_input("pr-1", "u1"))
            .await
            .unwrap();
        assert_eq!(pr.assigned_reviewers, vec!["u2".to_string()]);

        let merged = merge_pull_request(
            &services,
            &admin,
            MergePullRequestInput {
                pull_request_id: "pr-1".into(),
            },
        )
        .await
        .unwrap();
        assert!(merged.is_merged());

        let err = create_pull_request(&services, &admin, create_input("pr-2", "ghost"))
            .await
            .unwrap_err();
        assert!(err.is_not_found(Resource::User));
    }
}
