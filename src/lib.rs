//! Review Assign - reviewer assignment and team membership engine.
//!
//! Pull requests get reviewers drawn at random from the author's team,
//! reviewers can be swapped for an eligible teammate, and teams are created
//! together with their members. All state lives in a SQLite store; every
//! multi-step operation runs as a single transaction on it.
//!
//! Entry points:
//! - [`services::Services`] for direct use of the engines
//! - [`commands`] for validated, authorization-checked calls

pub mod auth;
pub mod commands;
pub mod config;
pub mod db;
pub mod error;
pub mod models;
pub mod selection;
pub mod services;

pub use auth::{Authorization, Identity};
pub use config::StoreConfig;
pub use error::AppError;
pub use services::Services;
