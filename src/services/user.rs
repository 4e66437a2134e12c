//! User activation and review listings.

use crate::db::pool::DbPool;
use crate::db::{pull_requests, users};
use crate::error::AppError;
use crate::models::{PullRequestShort, User};

#[derive(Debug, Clone)]
pub struct UserService {
    pool: DbPool,
}

impl UserService {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }

    /// Set whether a user may be picked as a reviewer.
    ///
    /// Existing assignments are left as they are.
    pub async fn set_is_active(&self, user_id: &str, is_active: bool) -> Result<User, AppError> {
        let mut conn = self.pool.acquire().await?;
        let user = users::set_is_active(&mut conn, user_id, is_active).await?;

        log::info!("[user] '{}' is_active = {}", user.user_id, user.is_active);
        Ok(user)
    }

    pub async fn get_user(&self, user_id: &str) -> Result<User, AppError> {
        let mut conn = self.pool.acquire().await?;
        users::get_by_id(&mut conn, user_id).await
    }

    /// Pull requests of any status that `user_id` reviews.
    pub async fn get_review_assignments(
        &self,
        user_id: &str,
    ) -> Result<Vec<PullRequestShort>, AppError> {
        let mut conn = self.pool.acquire().await?;
        let assigned = pull_requests::get_by_reviewer(&mut conn, user_id).await?;

        Ok(assigned.iter().map(|pr| pr.to_short()).collect())
    }
}
