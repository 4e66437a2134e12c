//! Data models for the application.
//!
//! These models represent the entities stored in the local SQLite database
//! and returned by the services. Row types derive `FromRow` for SQLx queries.

pub mod pull_request;
pub mod team;
pub mod user;

// Re-exports for convenient access
pub use pull_request::{
    NewPullRequest, PullRequest, PullRequestRow, PullRequestShort, PullRequestStatus,
};
pub use team::{Team, TeamRecord};
pub use user::{NewTeamMember, User};
