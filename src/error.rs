//! Application error types.
//!
//! These errors are serializable so that a transport layer can hand them to
//! its clients unchanged. Storage-specific failures never leak through them:
//! the store gateway maps constraint violations to the domain variants and
//! everything else becomes [`AppError::Internal`].

use serde::Serialize;
use std::fmt;
use thiserror::Error;

/// Entity kinds referenced by `NotFound` and `AlreadyExists`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Resource {
    User,
    Team,
    PullRequest,
}

impl fmt::Display for Resource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::User => write!(f, "user"),
            Self::Team => write!(f, "team"),
            Self::PullRequest => write!(f, "pull request"),
        }
    }
}

/// Why a state-changing operation was refused.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ConflictReason {
    /// The pull request is already merged.
    Merged,
    /// The user is not a reviewer of the pull request.
    NotAssigned,
    /// No active team member is left to take the review.
    NoCandidate,
    /// A member still reviews an open pull request of another team.
    CrossTeamActive,
}

impl fmt::Display for ConflictReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Merged => write!(f, "pull request is merged"),
            Self::NotAssigned => write!(f, "reviewer not assigned"),
            Self::NoCandidate => write!(f, "no reviewer candidate available"),
            Self::CrossTeamActive => {
                write!(f, "user has active pull request assignments in another team")
            }
        }
    }
}

/// Application-level errors returned by every service and command.
///
/// All variants serialize to a structured JSON object.
#[derive(Debug, Error, Serialize)]
#[serde(tag = "type", content = "details")]
pub enum AppError {
    /// Requested entity does not exist.
    #[error("Not found: {resource} {id}")]
    NotFound { resource: Resource, id: String },

    /// Entity with the same identifier already exists.
    #[error("Already exists: {resource} {id}")]
    AlreadyExists { resource: Resource, id: String },

    /// Operation refused because of the current assignment state.
    #[error("Conflict: {reason}")]
    Conflict {
        reason: ConflictReason,
        #[serde(skip_serializing_if = "Option::is_none")]
        detail: Option<String>,
    },

    /// Invalid input provided.
    #[error("Invalid input: {message}")]
    InvalidInput {
        message: String,
        #[serde(skip_serializing_if = "Option::is_none")]
        field: Option<String>,
    },

    /// Caller identity lacks the required role.
    #[error("Unauthorized: {message}")]
    Unauthorized { message: String },

    /// Unexpected store failure or commit failure.
    #[error("Internal error: {message}")]
    Internal {
        message: String,
        #[serde(skip_serializing_if = "Option::is_none")]
        operation: Option<String>,
    },
}

impl AppError {
    /// Create a not found error.
    pub fn not_found(resource: Resource, id: impl Into<String>) -> Self {
        Self::NotFound {
            resource,
            id: id.into(),
        }
    }

    /// Create an already exists error.
    pub fn already_exists(resource: Resource, id: impl Into<String>) -> Self {
        Self::AlreadyExists {
            resource,
            id: id.into(),
        }
    }

    /// Create a conflict error.
    pub fn conflict(reason: ConflictReason) -> Self {
        Self::Conflict {
            reason,
            detail: None,
        }
    }

    /// Create a conflict error with extra detail (e.g. the offending ids).
    pub fn conflict_with_detail(reason: ConflictReason, detail: impl Into<String>) -> Self {
        Self::Conflict {
            reason,
            detail: Some(detail.into()),
        }
    }

    /// Create an invalid input error with field name.
    pub fn invalid_input_field(message: impl Into<String>, field: impl Into<String>) -> Self {
        Self::InvalidInput {
            message: message.into(),
            field: Some(field.into()),
        }
    }

    /// Create an unauthorized error.
    pub fn unauthorized(message: impl Into<String>) -> Self {
        Self::Unauthorized {
            message: message.into(),
        }
    }

    /// Create an internal error.
    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal {
            message: message.into(),
            operation: None,
        }
    }

    /// Create an internal error with operation context.
    pub fn internal_with_op(message: impl Into<String>, operation: impl Into<String>) -> Self {
        Self::Internal {
            message: message.into(),
            operation: Some(operation.into()),
        }
    }

    /// The conflict reason, if this is a conflict.
    pub fn conflict_reason(&self) -> Option<ConflictReason> {
        match self {
            Self::Conflict { reason, .. } => Some(*reason),
            _ => None,
        }
    }

    /// Check if this is a not found error for the given resource.
    pub fn is_not_found(&self, expected: Resource) -> bool {
        matches!(self, Self::NotFound { resource, .. } if *resource == expected)
    }

    /// Check if this is an already exists error for the given resource.
    pub fn is_already_exists(&self, expected: Resource) -> bool {
        matches!(self, Self::AlreadyExists { resource, .. } if *resource == expected)
    }
}

// Conversions from common error types

impl From<sqlx::Error> for AppError {
    fn from(err: sqlx::Error) -> Self {
        log::error!("[db] Unclassified store error: {}", err);
        Self::internal("store operation failed")
    }
}

impl From<serde_json::Error> for AppError {
    fn from(err: serde_json::Error) -> Self {
        Self::internal(format!("JSON error: {}", err))
    }
}

impl From<crate::db::DbError> for AppError {
    fn from(err: crate::db::DbError) -> Self {
        log::error!("[db] {}", err);
        Self::internal_with_op("database initialization failed", "initialize")
    }
}
