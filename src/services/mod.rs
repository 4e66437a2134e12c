//! Business logic services.
//!
//! Services own the domain rules and run them against the store through the
//! `db` gateway. They hold no mutable in-process state, so one [`Services`]
//! value can be shared by any number of concurrent tasks.

pub mod pull_request;
pub mod stats;
pub mod team;
pub mod user;

pub use pull_request::{PullRequestService, Reassignment, MAX_REVIEWERS};
pub use stats::{PullRequestReviewerStat, StatsService, UserAssignmentStat};
pub use team::TeamService;
pub use user::UserService;

use crate::config::StoreConfig;
use crate::db::pool::DbPool;
use crate::db::transaction::Transactor;
use crate::error::AppError;

/// All services wired over one connection pool.
#[derive(Debug, Clone)]
pub struct Services {
    pub pull_requests: PullRequestService,
    pub teams: TeamService,
    pub users: UserService,
    pub stats: StatsService,
}

impl Services {
    pub fn new(pool: DbPool) -> Self {
        let transactor = Transactor::new(pool.clone());

        Self {
            pull_requests: PullRequestService::new(pool.clone(), transactor.clone()),
            teams: TeamService::new(pool.clone(), transactor),
            users: UserService::new(pool.clone()),
            stats: StatsService::new(pool),
        }
    }

    /// Open (and migrate) the store described by `config`.
    pub async fn connect(config: &StoreConfig) -> Result<Self, AppError> {
        config.validate()?;
        let pool = crate::db::initialize_with(config).await?;
        log::info!("[db] Store ready at {}", config.db_path.display());
        Ok(Self::new(pool))
    }
}
