//! Membership engine: team creation with member upsert.

use crate::db::pool::DbPool;
use crate::db::transaction::Transactor;
use crate::db::{self, teams, users};
use crate::error::{AppError, ConflictReason, Resource};
use crate::models::{NewTeamMember, Team};

#[derive(Debug, Clone)]
pub struct TeamService {
    pool: DbPool,
    transactor: Transactor,
}

impl TeamService {
    pub fn new(pool: DbPool, transactor: Transactor) -> Self {
        Self { pool, transactor }
    }

    /// Create a team and add or move `members` into it, all or nothing.
    ///
    /// Existing users get their name, team and active flag overwritten; new
    /// ids are created. Fails with `Conflict(CrossTeamActive)` when any member
    /// belongs to another team and still reviews an open pull request.
    ///
    /// # Returns
    /// The team with its stored roster, ordered by username.
    pub async fn create_team(
        &self,
        team_name: &str,
        members: Vec<NewTeamMember>,
    ) -> Result<Team, AppError> {
        let name = team_name.to_string();

        let team = self
            .transactor
            .within_transaction("create_team", move |conn| {
                Box::pin(async move {
                    if teams::exists(conn, &name).await? {
                        return Err(AppError::already_exists(Resource::Team, name));
                    }

                    let member_ids: Vec<String> =
                        members.iter().map(|m| m.user_id.clone()).collect();
                    let blocked = users::find_cross_team_active(conn, &member_ids, &name).await?;
                    if !blocked.is_empty() {
                        log::warn!(
                            "[team] Refusing to create '{}': {:?} review open pull requests elsewhere",
                            name,
                            blocked
                        );
                        return Err(AppError::conflict_with_detail(
                            ConflictReason::CrossTeamActive,
                            blocked.join(", "),
                        ));
                    }

                    teams::create(conn, &name, db::now()).await?;

                    for member in members {
                        let user = member.into_user(&name);
                        if users::exists(conn, &user.user_id).await? {
                            users::update(conn, &user).await?;
                        } else {
                            users::create(conn, &user).await?;
                        }
                    }

                    let members = users::get_by_team(conn, &name).await?;
                    Ok(Team { name, members })
                })
            })
            .await?;

        log::info!(
            "[team] Created team '{}' with {} members",
            team.name,
            team.members.len()
        );

        Ok(team)
    }

    /// Get a team with its members ordered by username.
    pub async fn get_team_with_members(&self, team_name: &str) -> Result<Team, AppError> {
        let mut conn = self.pool.acquire().await?;

        let record = teams::get_by_name(&mut conn, team_name).await?;
        let members = users::get_by_team(&mut conn, &record.name).await?;

        Ok(Team {
            name: record.name,
            members,
        })
    }
}
