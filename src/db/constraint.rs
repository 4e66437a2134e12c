//! Classification of store errors into domain errors.
//!
//! Gateway functions decide what a violated constraint *means* for the row
//! they were writing (a duplicate pull request id, a missing author); this
//! module only answers which kind of constraint failed.

use crate::error::AppError;

/// Constraint families the gateway maps to domain errors.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Constraint {
    Unique,
    ForeignKey,
    Check,
}

/// Which constraint, if any, rejected the statement.
pub fn violated(err: &sqlx::Error) -> Option<Constraint> {
    let db_err = err.as_database_error()?;
    if db_err.is_unique_violation() {
        Some(Constraint::Unique)
    } else if db_err.is_foreign_key_violation() {
        Some(Constraint::ForeignKey)
    } else if db_err.is_check_violation() {
        Some(Constraint::Check)
    } else {
        None
    }
}

/// Convert an unclassified store error into `Internal`.
///
/// The raw error is logged with the operation and entity id; callers only
/// see the operation context.
pub fn storage_error(operation: &'static str, id: &str, err: sqlx::Error) -> AppError {
    log::error!("[db] {} failed for '{}': {}", operation, id, err);
    AppError::internal_with_op(format!("store failure for '{}'", id), operation)
}

/// Map a write error: known constraints through `on_constraint`, the rest to `Internal`.
pub fn map_write_error(
    operation: &'static str,
    id: &str,
    err: sqlx::Error,
    on_constraint: impl FnOnce(Constraint) -> Option<AppError>,
) -> AppError {
    match violated(&err).and_then(on_constraint) {
        Some(mapped) => {
            log::debug!("[db] {} for '{}' rejected by constraint: {}", operation, id, err);
            mapped
        }
        None => storage_error(operation, id, err),
    }
}
