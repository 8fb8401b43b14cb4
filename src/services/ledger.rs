use tracing::error;

use crate::models::{ContestState, LedgerRow};
use crate::services::format::{csv_quote, join_group_names};

pub const LEDGER_HEADER: &str =
    "\"team id\",\"team name\",\"team group\",\"team affiliation\",\"award\",\"team members\"";

/// Append-only audit trail of every award handed out. One row per team per
/// award; never deduplicated.
#[derive(Debug, Default)]
pub struct AwardLedger {
    rows: Vec<LedgerRow>,
}

impl AwardLedger {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn rows(&self) -> &[LedgerRow] {
        &self.rows
    }

    pub fn record(
        &mut self,
        state: &ContestState,
        team_id: &str,
        citation: &str,
    ) -> Result<(), String> {
        let team = state.teams.get(team_id).ok_or_else(|| {
            let message = format!("Unknown team id {}", team_id);
            error!("{message}");
            message
        })?;

        let mut group_names = Vec::with_capacity(team.group_ids.len());
        for group_id in &team.group_ids {
            let group = state.groups.get(group_id).ok_or_else(|| {
                let message = format!("Unknown group id {} for team {}", group_id, team_id);
                error!("{message}");
                message
            })?;
            group_names.push(group.name.clone());
        }

        let affiliation = match (&team.affiliation, &team.organization_id) {
            (Some(affiliation), _) => affiliation.clone(),
            (None, Some(organization_id)) => state
                .organizations
                .get(organization_id)
                .ok_or_else(|| {
                    let message =
                        format!("Unknown organization id {} for team {}", organization_id, team_id);
                    error!("{message}");
                    message
                })?
                .formal_name
                .clone(),
            (None, None) => {
                let message = format!("Missing affiliation for team {}", team_id);
                error!("{message}");
                return Err(message);
            }
        };

        self.rows.push(LedgerRow {
            team_id: team_id.to_string(),
            team_name: team.name.clone(),
            group_names: join_group_names(&group_names),
            affiliation,
            citation: citation.to_string(),
            members: team.members.clone().unwrap_or_default(),
        });

        Ok(())
    }

    /// Header row followed by quoted rows in emission order.
    pub fn csv_lines(&self) -> Vec<String> {
        let mut lines = vec![LEDGER_HEADER.to_string()];
        for row in &self.rows {
            lines.push(
                [
                    csv_quote(&row.team_id),
                    csv_quote(&row.team_name),
                    csv_quote(&row.group_names),
                    csv_quote(&row.affiliation),
                    csv_quote(&row.citation),
                    csv_quote(&row.members),
                ]
                .join(","),
            );
        }
        lines
    }
}
