//! Transaction coordinator.
//!
//! [`Transactor::within_transaction`] runs a scope against one pooled
//! connection inside `BEGIN IMMEDIATE` … `COMMIT`. The connection is the
//! transaction handle: the scope passes it to every gateway call it makes.
//!
//! Outcomes:
//! - scope returns `Ok` → commit (a commit failure is `Internal`)
//! - scope returns `Err` → rollback, the scope's error is returned unchanged
//! - scope panics → rollback, then the panic is resumed
//! - future dropped mid-scope → the connection is closed instead of pooled,
//!   and SQLite discards the open transaction with it
//!
//! Gateway writes that must be atomic on their own use [`savepoint`] and
//! [`finish_savepoint`] (or [`within_savepoint`] for a whole scope), which
//! join whatever transaction is already open on the connection rather than
//! starting a second one.

use crate::db::constraint::storage_error;
use crate::db::pool::DbPool;
use crate::error::AppError;
use futures::future::BoxFuture;
use futures::FutureExt;
use sqlx::pool::PoolConnection;
use sqlx::{Sqlite, SqliteConnection};
use std::panic::AssertUnwindSafe;

/// Opens transactions on a pool.
#[derive(Debug, Clone)]
pub struct Transactor {
    pool: DbPool,
}

impl Transactor {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }

    /// Run `scope` inside a new read-write transaction.
    ///
    /// `operation` names the unit of work in logs and `Internal` errors.
    ///
    /// Every call opens its own transaction on its own connection. Calling
    /// this from inside another scope waits on the outer transaction's write
    /// lock until the busy timeout and then fails; nested steps join the open
    /// transaction with [`within_savepoint`] on the scope's connection.
    pub async fn within_transaction<T, F>(
        &self,
        operation: &'static str,
        scope: F,
    ) -> Result<T, AppError>
    where
        F: for<'c> FnOnce(&'c mut SqliteConnection) -> BoxFuture<'c, Result<T, AppError>>,
    {
        let mut tx = OpenTransaction::begin(&self.pool, operation).await?;

        let outcome = AssertUnwindSafe(scope(tx.connection())).catch_unwind().await;

        match outcome {
            Ok(Ok(value)) => {
                tx.commit().await?;
                Ok(value)
            }
            Ok(Err(err)) => {
                log::debug!("[tx] {} rolled back: {}", operation, err);
                tx.rollback().await;
                Err(err)
            }
            Err(panic) => {
                log::warn!("[tx] {} panicked, rolling back", operation);
                tx.rollback().await;
                std::panic::resume_unwind(panic)
            }
        }
    }
}

/// A pooled connection with an open `BEGIN IMMEDIATE` transaction.
struct OpenTransaction {
    conn: PoolConnection<Sqlite>,
    operation: &'static str,
    finished: bool,
}

impl OpenTransaction {
    async fn begin(pool: &DbPool, operation: &'static str) -> Result<Self, AppError> {
        let conn = pool
            .acquire()
            .await
            .map_err(|e| storage_error(operation, "acquire connection", e))?;

        // Armed before BEGIN: a drop while BEGIN waits for the lock must not
        // return the connection to the pool, since BEGIN still runs.
        let mut tx = Self {
            conn,
            operation,
            finished: false,
        };

        // IMMEDIATE takes the write lock now, so competing writers queue on
        // the busy timeout instead of failing at their first write.
        if let Err(err) = sqlx::query("BEGIN IMMEDIATE").execute(&mut *tx.conn).await {
            // No transaction was opened
            tx.finished = true;
            return Err(storage_error(operation, "begin", err));
        }

        Ok(tx)
    }

    fn connection(&mut self) -> &mut SqliteConnection {
        &mut self.conn
    }

    async fn commit(mut self) -> Result<(), AppError> {
        match sqlx::query("COMMIT").execute(&mut *self.conn).await {
            Ok(_) => {
                self.finished = true;
                Ok(())
            }
            Err(err) => {
                log::error!("[tx] {} commit failed: {}", self.operation, err);
                Err(AppError::internal_with_op(
                    "transaction commit failed",
                    self.operation,
                ))
            }
        }
    }

    async fn rollback(mut self) {
        match sqlx::query("ROLLBACK").execute(&mut *self.conn).await {
            Ok(_) => self.finished = true,
            Err(err) => log::warn!("[tx] {} rollback failed: {}", self.operation, err),
        }
    }
}

impl Drop for OpenTransaction {
    fn drop(&mut self) {
        if !self.finished {
            log::warn!(
                "[tx] {} abandoned with an open transaction, discarding connection",
                self.operation
            );
            self.conn.close_on_drop();
        }
    }
}

/// Open a savepoint on `conn`.
///
/// Inside a transaction it nests; on a bare connection it starts one.
pub async fn savepoint(conn: &mut SqliteConnection, name: &'static str) -> Result<(), AppError> {
    let sql = format!("SAVEPOINT {}", name);
    sqlx::query(&sql)
        .execute(&mut *conn)
        .await
        .map_err(|e| storage_error(name, "savepoint", e))?;
    Ok(())
}

/// Run `scope` on `conn` inside a savepoint.
///
/// Joins the transaction already open on `conn` (or starts one on a bare
/// connection). An `Err` from `scope` undoes only the savepoint's writes and
/// is returned unchanged.
pub async fn within_savepoint<T, F>(
    conn: &mut SqliteConnection,
    name: &'static str,
    scope: F,
) -> Result<T, AppError>
where
    F: for<'c> FnOnce(&'c mut SqliteConnection) -> BoxFuture<'c, Result<T, AppError>>,
{
    savepoint(conn, name).await?;
    let result = scope(&mut *conn).await;
    finish_savepoint(conn, name, result).await
}

/// Close a savepoint opened with [`savepoint`], keeping its writes on `Ok`
/// and undoing them on `Err`. The result is passed through.
pub async fn finish_savepoint<T>(
    conn: &mut SqliteConnection,
    name: &'static str,
    result: Result<T, AppError>,
) -> Result<T, AppError> {
    if result.is_err() {
        let sql = format!("ROLLBACK TO SAVEPOINT {}", name);
        if let Err(err) = sqlx::query(&sql).execute(&mut *conn).await {
            log::warn!("[tx] rollback to savepoint {} failed: {}", name, err);
        }
    }

    let sql = format!("RELEASE SAVEPOINT {}", name);
    let released = sqlx::query(&sql).execute(&mut *conn).await;

    match (result, released) {
        (Ok(value), Ok(_)) => Ok(value),
        (Ok(_), Err(err)) => Err(storage_error(name, "release savepoint", err)),
        (Err(err), released) => {
            if let Err(release_err) = released {
                log::warn!("[tx] release of savepoint {} failed: {}", name, release_err);
            }
            Err(err)
        }
    }
}
