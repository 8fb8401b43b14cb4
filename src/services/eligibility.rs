use crate::models::Team;
use crate::services::config_loader::GalenaConfig;

/// True when the team belongs to any of the given group categories.
pub fn team_in_group(team: &Team, categories: &[String]) -> bool {
    team.group_ids
        .iter()
        .any(|group_id| categories.iter().any(|category| category == group_id))
}

/// A team occupies award slots unless one of its groups is configured as a
/// no-occupy category (starred teams).
pub fn is_eligible(team: &Team, config: &GalenaConfig) -> bool {
    !team_in_group(team, &config.no_occupy_categories)
}
