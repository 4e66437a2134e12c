//! Pull request model.

use crate::error::AppError;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use std::str::FromStr;

/// Lifecycle state of a pull request. Transitions only `Open` → `Merged`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum PullRequestStatus {
    Open,
    Merged,
}

impl PullRequestStatus {
    /// Stored representation.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Open => "OPEN",
            Self::Merged => "MERGED",
        }
    }
}

impl FromStr for PullRequestStatus {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "OPEN" => Ok(Self::Open),
            "MERGED" => Ok(Self::Merged),
            other => Err(AppError::internal(format!(
                "unknown pull request status '{}'",
                other
            ))),
        }
    }
}

impl std::fmt::Display for PullRequestStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A pull request with its assigned reviewers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PullRequest {
    pub pull_request_id: String,
    pub pull_request_name: String,
    pub author_id: String,
    pub status: PullRequestStatus,

    /// Reviewer ids; order carries no meaning.
    pub assigned_reviewers: Vec<String>,

    /// Creation timestamp (Unix seconds).
    pub created_at: i64,

    /// Merge timestamp (Unix seconds), set iff merged.
    pub merged_at: Option<i64>,
}

impl PullRequest {
    pub fn is_merged(&self) -> bool {
        self.status == PullRequestStatus::Merged
    }

    /// Only open pull requests accept reviewer changes.
    pub fn can_be_modified(&self) -> bool {
        self.status == PullRequestStatus::Open
    }

    pub fn has_reviewer(&self, user_id: &str) -> bool {
        self.assigned_reviewers.iter().any(|r| r == user_id)
    }

    /// This pull request after a merge at `merged_at`.
    ///
    /// Already-merged pull requests keep their original merge time.
    pub fn merged(mut self, merged_at: i64) -> Self {
        if !self.is_merged() {
            self.status = PullRequestStatus::Merged;
            self.merged_at = Some(merged_at);
        }
        self
    }

    /// The short form used in review listings.
    pub fn to_short(&self) -> PullRequestShort {
        PullRequestShort {
            pull_request_id: self.pull_request_id.clone(),
            pull_request_name: self.pull_request_name.clone(),
            author_id: self.author_id.clone(),
            status: self.status,
        }
    }
}

/// Input for inserting a new, open pull request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewPullRequest {
    pub pull_request_id: String,
    pub pull_request_name: String,
    pub author_id: String,
    pub created_at: i64,
}

impl NewPullRequest {
    /// The open pull request this insert produces with `reviewers`.
    pub fn into_open(self, reviewers: Vec<String>) -> PullRequest {
        PullRequest {
            pull_request_id: self.pull_request_id,
            pull_request_name: self.pull_request_name,
            author_id: self.author_id,
            status: PullRequestStatus::Open,
            assigned_reviewers: reviewers,
            created_at: self.created_at,
            merged_at: None,
        }
    }
}

/// Pull request summary without reviewers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PullRequestShort {
    pub pull_request_id: String,
    pub pull_request_name: String,
    pub author_id: String,
    pub status: PullRequestStatus,
}

/// Row shape of the pull request queries.
///
/// Note: `reviewers` is aggregated by SQLite as a JSON array string
/// and parsed into `Vec<String>` by the `TryFrom` conversion.
#[derive(Debug, Clone, FromRow)]
pub struct PullRequestRow {
    pub pull_request_id: String,
    pub pull_request_name: String,
    pub author_id: String,
    pub status: String,
    pub created_at: i64,
    pub merged_at: Option<i64>,
    pub reviewers: String,
}

impl TryFrom<PullRequestRow> for PullRequest {
    type Error = AppError;

    fn try_from(row: PullRequestRow) -> Result<Self, Self::Error> {
        Ok(Self {
            status: row.status.parse()?,
            assigned_reviewers: serde_json::from_str(&row.reviewers)?,
            pull_request_id: row.pull_request_id,
            pull_request_name: row.pull_request_name,
            author_id: row.author_id,
            created_at: row.created_at,
            merged_at: row.merged_at,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn open_pr(reviewers: &[&str]) -> PullRequest {
        NewPullRequest {
            pull_request_id: "pr-1".into(),
            pull_request_name: "Add search".into(),
            author_id: "u1".into(),
            created_at: 100,
        }
        .into_open(reviewers.iter().map(|r| r.to_string()).collect())
    }

    #[test]
    fn test_status_round_trip() {
        assert_eq!("OPEN".parse::<PullRequestStatus>().unwrap(), PullRequestStatus::Open);
        assert_eq!(PullRequestStatus::Merged.to_string(), "MERGED");
        assert!("merged".parse::<PullRequestStatus>().is_err());
    }

    #[test]
    fn test_merge_is_one_way_and_keeps_first_timestamp() {
        let pr = open_pr(&["u2"]);
        assert!(pr.can_be_modified());

        let merged = pr.merged(200);
        assert!(merged.is_merged());
        assert_eq!(merged.merged_at, Some(200));

        let again = merged.merged(300);
        assert_eq!(again.merged_at, Some(200));
        assert!(!again.can_be_modified());
    }

    #[test]
    fn test_row_conversion_parses_reviewers() {
        let row = PullRequestRow {
            pull_request_id: "pr-1".into(),
            pull_request_name: "Add search".into(),
            author_id: "u1".into(),
            status: "OPEN".into(),
            created_at: 100,
            merged_at: None,
            reviewers: r#"["u2","u3"]"#.into(),
        };

        let pr = PullRequest::try_from(row).unwrap();
        assert!(pr.has_reviewer("u3"));
        assert!(!pr.has_reviewer("u1"));
        assert_eq!(pr.assigned_reviewers.len(), 2);
    }

    #[test]
    fn test_row_conversion_rejects_unknown_status() {
        let row = PullRequestRow {
            pull_request_id: "pr-1".into(),
            pull_request_name: "x".into(),
            author_id: "u1".into(),
            status: "CLOSED".into(),
            created_at: 0,
            merged_at: None,
            reviewers: "[]".into(),
        };
        assert!(PullRequest::try_from(row).is_err());
    }

    #[test]
    fn test_short_form() {
        let short = open_pr(&[]).to_short();
        assert_eq!(short.pull_request_id, "pr-1");
        assert_eq!(short.status, PullRequestStatus::Open);
    }
}
