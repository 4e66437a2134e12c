//! Team commands. Any caller may use them.

use super::require_non_blank;
use crate::error::AppError;
use crate::models::{NewTeamMember, Team};
use crate::services::Services;
use serde::Deserialize;
use std::collections::HashSet;

/// Input for add_team command.
#[derive(Debug, Clone, Deserialize)]
pub struct AddTeamInput {
    pub team_name: String,
    pub members: Vec<NewTeamMember>,
}

/// Create a team, adding new users and moving existing ones into it.
pub async fn add_team(services: &Services, input: AddTeamInput) -> Result<Team, AppError> {
    require_non_blank(&input.team_name, "team_name")?;

    let mut seen = HashSet::new();
    for member in &input.members {
        require_non_blank(&member.user_id, "user_id")?;
        require_non_blank(&member.username, "username")?;
        if !seen.insert(member.user_id.as_str()) {
            return Err(AppError::invalid_input_field(
                format!("duplicate member '{}'", member.user_id),
                "members",
            ));
        }
    }

    services
        .teams
        .create_team(&input.team_name, input.members)
        .await
}

/// Get a team and its members.
pub async fn get_team(services: &Services, team_name: &str) -> Result<Team, AppError> {
    require_non_blank(team_name, "team_name")?;
    services.teams.get_team_with_members(team_name).await
}
