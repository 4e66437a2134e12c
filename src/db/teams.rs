//! Database queries for teams.

use crate::db::constraint::{map_write_error, storage_error, Constraint};
use crate::error::{AppError, Resource};
use crate::models::TeamRecord;
use sqlx::SqliteConnection;

/// Insert a team.
pub async fn create(
    conn: &mut SqliteConnection,
    name: &str,
    created_at: i64,
) -> Result<TeamRecord, AppError> {
    sqlx::query("INSERT INTO teams (name, created_at) VALUES (?, ?)")
        .bind(name)
        .bind(created_at)
        .execute(&mut *conn)
        .await
        .map_err(|e| {
            map_write_error("teams.create", name, e, |constraint| match constraint {
                Constraint::Unique => Some(AppError::already_exists(Resource::Team, name)),
                _ => None,
            })
        })?;

    Ok(TeamRecord {
        name: name.to_string(),
        created_at,
    })
}

/// Get a team row by name.
pub async fn get_by_name(conn: &mut SqliteConnection, name: &str) -> Result<TeamRecord, AppError> {
    sqlx::query_as::<_, TeamRecord>("SELECT name, created_at FROM teams WHERE name = ?")
        .bind(name)
        .fetch_optional(&mut *conn)
        .await
        .map_err(|e| storage_error("teams.get_by_name", name, e))?
        .ok_or_else(|| AppError::not_found(Resource::Team, name))
}

pub async fn exists(conn: &mut SqliteConnection, name: &str) -> Result<bool, AppError> {
    sqlx::query_scalar("SELECT EXISTS(SELECT 1 FROM teams WHERE name = ?)")
        .bind(name)
        .fetch_one(&mut *conn)
        .await
        .map_err(|e| storage_error("teams.exists", name, e))
}
