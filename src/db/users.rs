//! Database queries for users.

use crate::db::constraint::{map_write_error, storage_error, Constraint};
use crate::error::{AppError, Resource};
use crate::models::User;
use crate::selection;
use sqlx::{QueryBuilder, Sqlite, SqliteConnection};

const USER_COLUMNS: &str = "user_id, username, team_name, is_active";

/// Insert a new user.
pub async fn create(conn: &mut SqliteConnection, user: &User) -> Result<(), AppError> {
    sqlx::query(
        "INSERT INTO users (user_id, username, team_name, is_active) VALUES (?, ?, ?, ?)",
    )
    .bind(&user.user_id)
    .bind(&user.username)
    .bind(&user.team_name)
    .bind(user.is_active)
    .execute(&mut *conn)
    .await
    .map_err(|e| {
        map_write_error("users.create", &user.user_id, e, |constraint| match constraint {
            Constraint::Unique => Some(AppError::already_exists(Resource::User, &user.user_id)),
            Constraint::ForeignKey => team_not_found(user),
            Constraint::Check => None,
        })
    })?;

    Ok(())
}

/// Overwrite name, team and active flag of an existing user.
pub async fn update(conn: &mut SqliteConnection, user: &User) -> Result<(), AppError> {
    let result = sqlx::query(
        r#"
        UPDATE users
        SET username = ?, team_name = ?, is_active = ?
        WHERE user_id = ?
        "#,
    )
    .bind(&user.username)
    .bind(&user.team_name)
    .bind(user.is_active)
    .bind(&user.user_id)
    .execute(&mut *conn)
    .await
    .map_err(|e| {
        map_write_error("users.update", &user.user_id, e, |constraint| match constraint {
            Constraint::ForeignKey => team_not_found(user),
            _ => None,
        })
    })?;

    if result.rows_affected() == 0 {
        return Err(AppError::not_found(Resource::User, &user.user_id));
    }

    Ok(())
}

fn team_not_found(user: &User) -> Option<AppError> {
    Some(AppError::not_found(
        Resource::Team,
        user.team_name.clone().unwrap_or_default(),
    ))
}

/// Check whether a user exists.
pub async fn exists(conn: &mut SqliteConnection, user_id: &str) -> Result<bool, AppError> {
    sqlx::query_scalar("SELECT EXISTS(SELECT 1 FROM users WHERE user_id = ?)")
        .bind(user_id)
        .fetch_one(&mut *conn)
        .await
        .map_err(|e| storage_error("users.exists", user_id, e))
}

/// Get a user by id.
pub async fn get_by_id(conn: &mut SqliteConnection, user_id: &str) -> Result<User, AppError> {
    let sql = format!("SELECT {} FROM users WHERE user_id = ?", USER_COLUMNS);

    sqlx::query_as::<_, User>(&sql)
        .bind(user_id)
        .fetch_optional(&mut *conn)
        .await
        .map_err(|e| storage_error("users.get_by_id", user_id, e))?
        .ok_or_else(|| AppError::not_found(Resource::User, user_id))
}

/// All members of a team, ordered by username.
pub async fn get_by_team(
    conn: &mut SqliteConnection,
    team_name: &str,
) -> Result<Vec<User>, AppError> {
    let sql = format!(
        "SELECT {} FROM users WHERE team_name = ? ORDER BY username, user_id",
        USER_COLUMNS
    );

    sqlx::query_as::<_, User>(&sql)
        .bind(team_name)
        .fetch_all(&mut *conn)
        .await
        .map_err(|e| storage_error("users.get_by_team", team_name, e))
}

/// Set the active flag and return the updated user.
pub async fn set_is_active(
    conn: &mut SqliteConnection,
    user_id: &str,
    is_active: bool,
) -> Result<User, AppError> {
    let sql = format!(
        "UPDATE users SET is_active = ? WHERE user_id = ? RETURNING {}",
        USER_COLUMNS
    );

    sqlx::query_as::<_, User>(&sql)
        .bind(is_active)
        .bind(user_id)
        .fetch_optional(&mut *conn)
        .await
        .map_err(|e| storage_error("users.set_is_active", user_id, e))?
        .ok_or_else(|| AppError::not_found(Resource::User, user_id))
}

/// Active members of `team_name` whose ids are not in `exclude`.
pub async fn get_active_excluding(
    conn: &mut SqliteConnection,
    team_name: &str,
    exclude: &[String],
) -> Result<Vec<User>, AppError> {
    let mut query: QueryBuilder<Sqlite> = QueryBuilder::new(format!(
        "SELECT {} FROM users WHERE team_name = ",
        USER_COLUMNS
    ));
    query.push_bind(team_name).push(" AND is_active = 1");

    if !exclude.is_empty() {
        query.push(" AND user_id NOT IN (");
        let mut ids = query.separated(", ");
        for id in exclude {
            ids.push_bind(id);
        }
        ids.push_unseparated(")");
    }
    query.push(" ORDER BY user_id");

    query
        .build_query_as::<User>()
        .fetch_all(&mut *conn)
        .await
        .map_err(|e| storage_error("users.get_active_excluding", team_name, e))
}

/// Up to `max_count` active members of `team_name` outside `exclude`,
/// chosen uniformly at random.
pub async fn get_random_active_excluding(
    conn: &mut SqliteConnection,
    team_name: &str,
    exclude: &[String],
    max_count: usize,
) -> Result<Vec<User>, AppError> {
    let candidates = get_active_excluding(conn, team_name, exclude).await?;
    log::debug!(
        "[db] {} reviewer candidates in team '{}' (want {})",
        candidates.len(),
        team_name,
        max_count
    );
    Ok(selection::choose_reviewers(candidates, max_count))
}

/// Ids among `user_ids` that belong to a team other than `team_name` and
/// review at least one open pull request.
pub async fn find_cross_team_active(
    conn: &mut SqliteConnection,
    user_ids: &[String],
    team_name: &str,
) -> Result<Vec<String>, AppError> {
    if user_ids.is_empty() {
        return Ok(Vec::new());
    }

    let mut query: QueryBuilder<Sqlite> = QueryBuilder::new(
        r#"
        SELECT DISTINCT u.user_id
        FROM users u
        JOIN pull_request_reviewers prr ON prr.reviewer_id = u.user_id
        JOIN pull_requests pr ON pr.pull_request_id = prr.pull_request_id
        WHERE pr.status = 'OPEN'
          AND u.team_name IS NOT NULL
          AND u.team_name <> "#,
    );
    query.push_bind(team_name).push(" AND u.user_id IN (");
    let mut ids = query.separated(", ");
    for id in user_ids {
        ids.push_bind(id);
    }
    ids.push_unseparated(") ORDER BY u.user_id");

    query
        .build_query_scalar::<String>()
        .fetch_all(&mut *conn)
        .await
        .map_err(|e| storage_error("users.find_cross_team_active", team_name, e))
}
