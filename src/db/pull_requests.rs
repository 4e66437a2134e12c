//! Database queries for pull requests and their reviewer links.

use crate::db::constraint::{map_write_error, storage_error, Constraint};
use crate::db::transaction::{finish_savepoint, savepoint};
use crate::error::{AppError, ConflictReason, Resource};
use crate::models::{NewPullRequest, PullRequest, PullRequestRow, PullRequestStatus};
use sqlx::SqliteConnection;

/// Pull request columns plus the reviewer ids as a JSON array.
const SELECT_PULL_REQUEST: &str = r#"
    SELECT pr.pull_request_id, pr.pull_request_name, pr.author_id, pr.status,
           pr.created_at, pr.merged_at,
           (SELECT json_group_array(r.reviewer_id)
              FROM pull_request_reviewers r
             WHERE r.pull_request_id = pr.pull_request_id) AS reviewers
    FROM pull_requests pr
"#;

fn into_models(rows: Vec<PullRequestRow>) -> Result<Vec<PullRequest>, AppError> {
    rows.into_iter().map(PullRequest::try_from).collect()
}

/// Insert an open pull request and its reviewer links as one unit.
///
/// Either every row is written or none is.
pub async fn create_with_reviewers(
    conn: &mut SqliteConnection,
    pull_request: &NewPullRequest,
    reviewer_ids: &[String],
) -> Result<(), AppError> {
    savepoint(conn, "create_pull_request").await?;
    let result = insert_with_reviewers(conn, pull_request, reviewer_ids).await;
    finish_savepoint(conn, "create_pull_request", result).await
}

async fn insert_with_reviewers(
    conn: &mut SqliteConnection,
    pull_request: &NewPullRequest,
    reviewer_ids: &[String],
) -> Result<(), AppError> {
    let id = pull_request.pull_request_id.as_str();

    sqlx::query(
        r#"
        INSERT INTO pull_requests
            (pull_request_id, pull_request_name, author_id, status, created_at, merged_at)
        VALUES (?, ?, ?, ?, ?, NULL)
        "#,
    )
    .bind(id)
    .bind(&pull_request.pull_request_name)
    .bind(&pull_request.author_id)
    .bind(PullRequestStatus::Open.as_str())
    .bind(pull_request.created_at)
    .execute(&mut *conn)
    .await
    .map_err(|e| {
        map_write_error("pull_requests.create", id, e, |constraint| match constraint {
            Constraint::Unique => Some(AppError::already_exists(Resource::PullRequest, id)),
            Constraint::ForeignKey => Some(AppError::not_found(
                Resource::User,
                pull_request.author_id.as_str(),
            )),
            Constraint::Check => None,
        })
    })?;

    for reviewer_id in reviewer_ids {
        insert_reviewer(conn, id, reviewer_id, pull_request.created_at)
            .await
            .map_err(|e| {
                map_write_error("pull_requests.add_reviewer", id, e, |constraint| {
                    match constraint {
                        Constraint::ForeignKey => {
                            Some(AppError::not_found(Resource::User, reviewer_id.as_str()))
                        }
                        _ => None,
                    }
                })
            })?;
    }

    Ok(())
}

async fn insert_reviewer(
    conn: &mut SqliteConnection,
    pull_request_id: &str,
    reviewer_id: &str,
    assigned_at: i64,
) -> Result<(), sqlx::Error> {
    sqlx::query(
        "INSERT INTO pull_request_reviewers (pull_request_id, reviewer_id, assigned_at) VALUES (?, ?, ?)",
    )
    .bind(pull_request_id)
    .bind(reviewer_id)
    .bind(assigned_at)
    .execute(&mut *conn)
    .await?;
    Ok(())
}

/// Get a pull request with its reviewers.
pub async fn get_by_id(
    conn: &mut SqliteConnection,
    pull_request_id: &str,
) -> Result<PullRequest, AppError> {
    let sql = format!("{} WHERE pr.pull_request_id = ?", SELECT_PULL_REQUEST);

    let row = sqlx::query_as::<_, PullRequestRow>(&sql)
        .bind(pull_request_id)
        .fetch_optional(&mut *conn)
        .await
        .map_err(|e| storage_error("pull_requests.get_by_id", pull_request_id, e))?
        .ok_or_else(|| AppError::not_found(Resource::PullRequest, pull_request_id))?;

    PullRequest::try_from(row)
}

pub async fn exists(conn: &mut SqliteConnection, pull_request_id: &str) -> Result<bool, AppError> {
    sqlx::query_scalar("SELECT EXISTS(SELECT 1 FROM pull_requests WHERE pull_request_id = ?)")
        .bind(pull_request_id)
        .fetch_one(&mut *conn)
        .await
        .map_err(|e| storage_error("pull_requests.exists", pull_request_id, e))
}

/// Move a pull request to `status`, stamping `changed_at` as the merge time
/// when the new status is `Merged`.
///
/// The write is conditional on the status actually changing; zero affected
/// rows is reported as `NotFound`.
pub async fn update_status(
    conn: &mut SqliteConnection,
    pull_request_id: &str,
    status: PullRequestStatus,
    changed_at: i64,
) -> Result<(), AppError> {
    let merged_at = match status {
        PullRequestStatus::Merged => Some(changed_at),
        PullRequestStatus::Open => None,
    };

    let result = sqlx::query(
        r#"
        UPDATE pull_requests
        SET status = ?, merged_at = ?
        WHERE pull_request_id = ? AND status <> ?
        "#,
    )
    .bind(status.as_str())
    .bind(merged_at)
    .bind(pull_request_id)
    .bind(status.as_str())
    .execute(&mut *conn)
    .await
    .map_err(|e| storage_error("pull_requests.update_status", pull_request_id, e))?;

    if result.rows_affected() == 0 {
        return Err(AppError::not_found(Resource::PullRequest, pull_request_id));
    }

    log::debug!("[db] pull request '{}' now {}", pull_request_id, status);
    Ok(())
}

/// Swap reviewer `old_reviewer_id` for `new_reviewer_id` on one pull request.
///
/// The delete is conditional: if `old_reviewer_id` is no longer assigned the
/// call fails with `Conflict(NotAssigned)` and nothing is written.
pub async fn replace_reviewer(
    conn: &mut SqliteConnection,
    pull_request_id: &str,
    old_reviewer_id: &str,
    new_reviewer_id: &str,
    assigned_at: i64,
) -> Result<(), AppError> {
    savepoint(conn, "replace_reviewer").await?;
    let result = swap_reviewer(
        conn,
        pull_request_id,
        old_reviewer_id,
        new_reviewer_id,
        assigned_at,
    )
    .await;
    finish_savepoint(conn, "replace_reviewer", result).await
}

async fn swap_reviewer(
    conn: &mut SqliteConnection,
    pull_request_id: &str,
    old_reviewer_id: &str,
    new_reviewer_id: &str,
    assigned_at: i64,
) -> Result<(), AppError> {
    let removed = sqlx::query(
        "DELETE FROM pull_request_reviewers WHERE pull_request_id = ? AND reviewer_id = ?",
    )
    .bind(pull_request_id)
    .bind(old_reviewer_id)
    .execute(&mut *conn)
    .await
    .map_err(|e| storage_error("pull_requests.remove_reviewer", pull_request_id, e))?;

    if removed.rows_affected() == 0 {
        return Err(AppError::conflict_with_detail(
            ConflictReason::NotAssigned,
            format!(
                "'{}' is not assigned to '{}'",
                old_reviewer_id, pull_request_id
            ),
        ));
    }

    insert_reviewer(conn, pull_request_id, new_reviewer_id, assigned_at)
        .await
        .map_err(|e| {
            map_write_error(
                "pull_requests.add_reviewer",
                pull_request_id,
                e,
                |constraint| match constraint {
                    // Someone else assigned the candidate in the meantime
                    Constraint::Unique => Some(AppError::conflict(ConflictReason::NoCandidate)),
                    Constraint::ForeignKey => {
                        Some(AppError::not_found(Resource::User, new_reviewer_id))
                    }
                    Constraint::Check => None,
                },
            )
        })
}

/// Pull requests (any status) that `reviewer_id` is assigned to, newest first.
pub async fn get_by_reviewer(
    conn: &mut SqliteConnection,
    reviewer_id: &str,
) -> Result<Vec<PullRequest>, AppError> {
    let sql = format!(
        r#"{}
        WHERE pr.pull_request_id IN (
            SELECT pull_request_id FROM pull_request_reviewers WHERE reviewer_id = ?
        )
        ORDER BY pr.created_at DESC, pr.pull_request_id"#,
        SELECT_PULL_REQUEST
    );

    let rows = sqlx::query_as::<_, PullRequestRow>(&sql)
        .bind(reviewer_id)
        .fetch_all(&mut *conn)
        .await
        .map_err(|e| storage_error("pull_requests.get_by_reviewer", reviewer_id, e))?;

    into_models(rows)
}

/// Every pull request, ordered by id.
pub async fn get_all(conn: &mut SqliteConnection) -> Result<Vec<PullRequest>, AppError> {
    let sql = format!("{} ORDER BY pr.pull_request_id", SELECT_PULL_REQUEST);

    let rows = sqlx::query_as::<_, PullRequestRow>(&sql)
        .fetch_all(&mut *conn)
        .await
        .map_err(|e| storage_error("pull_requests.get_all", "*", e))?;

    into_models(rows)
}

/// Number of reviewer links per reviewer, ordered by reviewer id.
pub async fn count_by_reviewer(conn: &mut SqliteConnection) -> Result<Vec<(String, i64)>, AppError> {
    sqlx::query_as::<_, (String, i64)>(
        r#"
        SELECT reviewer_id, COUNT(*)
        FROM pull_request_reviewers
        GROUP BY reviewer_id
        ORDER BY reviewer_id
        "#,
    )
    .fetch_all(&mut *conn)
    .await
    .map_err(|e| storage_error("pull_requests.count_by_reviewer", "*", e))
}
