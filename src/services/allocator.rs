use std::collections::HashSet;

use tracing::{error, info, warn};

use crate::models::{AwardRecord, ContestState, ScoreboardRow, Team};
use crate::services::config_loader::GalenaConfig;
use crate::services::eligibility::{is_eligible, team_in_group};
use crate::services::format::{ordinal, problem_letter};
use crate::services::ledger::AwardLedger;

#[derive(Debug)]
pub struct AllocationOutcome {
    pub awards: Vec<AwardRecord>,
    pub warnings: Vec<String>,
}

struct MedalTier {
    count: Option<usize>,
    id: &'static str,
    citation: &'static str,
    gives_medal: bool,
    list_citation: &'static str,
    show_as_list: bool,
}

struct Allocator<'a> {
    state: &'a ContestState,
    config: &'a GalenaConfig,
    ledger: &'a mut AwardLedger,
    awards: Vec<AwardRecord>,
    warnings: Vec<String>,
}

impl<'a> Allocator<'a> {
    fn team(&self, team_id: &str) -> Result<&'a Team, String> {
        self.state.teams.get(team_id).ok_or_else(|| {
            let message = format!("Unknown team id {}", team_id);
            error!("{message}");
            message
        })
    }

    fn eligible(&self, team_id: &str) -> Result<bool, String> {
        Ok(is_eligible(self.team(team_id)?, self.config))
    }

    fn real_rank_of(&self, row: &ScoreboardRow) -> Result<u32, String> {
        row.real_rank.ok_or_else(|| {
            let message = format!(
                "Missing real_rank for eligible team {}; scoreboard not ranked",
                row.team_id
            );
            error!("{message}");
            message
        })
    }

    /// Emits one award record and one ledger row per team.
    fn award(
        &mut self,
        id: impl Into<String>,
        citation: impl Into<String>,
        team_ids: Vec<String>,
    ) -> Result<(), String> {
        let id = id.into();
        let citation = citation.into();
        for team_id in &team_ids {
            self.ledger.record(self.state, team_id, &citation)?;
        }
        info!("Award {} ({}) -> {:?}", id, citation, team_ids);
        self.awards.push(AwardRecord {
            id,
            citation,
            team_ids,
            show: true,
            display_mode: None,
        });
        Ok(())
    }

    /// Presentation-only list variant of a tier; no ledger rows.
    fn award_as_list(
        &mut self,
        id: impl Into<String>,
        citation: impl Into<String>,
        team_ids: Vec<String>,
    ) {
        self.awards.push(AwardRecord {
            id: id.into(),
            citation: citation.into(),
            team_ids,
            show: true,
            display_mode: Some("list".to_string()),
        });
    }

    /// The literal top seed by raw rank, eligibility notwithstanding.
    fn winner(&mut self) -> Result<(), String> {
        let state = self.state;
        let mut buf = Vec::new();
        for row in &state.scoreboard {
            if row.rank > 1 {
                break;
            }
            buf.push(row.team_id.clone());
        }
        self.award("winner", "World Champion", buf)
    }

    fn top_placements(&mut self) -> Result<(), String> {
        let state = self.state;
        let placements = self.config.top_placements;
        let mut buckets: Vec<Vec<String>> = vec![Vec::new(); placements];
        for row in &state.scoreboard {
            if !self.eligible(&row.team_id)? {
                continue;
            }
            let real_rank = self.real_rank_of(row)? as usize;
            if real_rank > placements {
                break;
            }
            buckets[real_rank - 1].push(row.team_id.clone());
        }
        for (idx, team_ids) in buckets.into_iter().enumerate() {
            let place = idx + 1;
            self.award(
                format!("rank-{place}"),
                format!("{} Place", ordinal(place)),
                team_ids,
            )?;
        }
        Ok(())
    }

    fn medals(&mut self) -> Result<(), String> {
        let state = self.state;
        let tiers = [
            MedalTier {
                count: Some(self.config.gold),
                id: "gold-medal",
                citation: "Gold medal winner",
                gives_medal: true,
                list_citation: "Gold Winner",
                show_as_list: self.config.gold_show_list,
            },
            MedalTier {
                count: Some(self.config.silver),
                id: "silver-medal",
                citation: "Silver medal winner",
                gives_medal: true,
                list_citation: "Silver Winner",
                show_as_list: self.config.silver_show_list,
            },
            MedalTier {
                count: Some(self.config.bronze),
                id: "bronze-medal",
                citation: "Bronze medal winner",
                gives_medal: true,
                list_citation: "Bronze Winner",
                show_as_list: self.config.bronze_show_list,
            },
            MedalTier {
                count: None,
                id: "honors-mention",
                citation: "Honorable mention",
                gives_medal: false,
                list_citation: "Honorable Mention",
                show_as_list: self.config.honors_show_list,
            },
        ];

        let mut cumulative: usize = 0;
        let mut pos: usize = 0;
        let mut star_buf: Vec<String> = Vec::new();

        for tier in tiers {
            if let Some(count) = tier.count {
                cumulative += count;
            }
            let mut buf = Vec::new();
            while pos < state.scoreboard.len() {
                let row = &state.scoreboard[pos];
                if !self.eligible(&row.team_id)? {
                    // Starred teams never consume a slot; medal-qualifying
                    // ones are acknowledged separately.
                    if tier.gives_medal {
                        star_buf.push(row.team_id.clone());
                    }
                    pos += 1;
                    continue;
                }
                if tier.count.is_some() && self.real_rank_of(row)? as usize > cumulative {
                    break;
                }
                buf.push(row.team_id.clone());
                pos += 1;
            }

            if !buf.is_empty() && (tier.gives_medal || self.config.honors_show_citation) {
                self.award(tier.id, tier.citation, buf.clone())?;
            }
            if tier.show_as_list && !buf.is_empty() {
                self.award_as_list(format!("{}_list", tier.id), tier.list_citation, buf.clone());
            }
            if let Some(count) = tier.count
                && buf.len() != count
            {
                let warning = format!(
                    "{} expected {} teams, but got {}",
                    tier.citation,
                    count,
                    buf.len()
                );
                warn!("{warning}");
                self.warnings.push(warning);
            }
        }

        if !star_buf.is_empty() {
            self.award("star-team", "Star Team", star_buf)?;
        }
        Ok(())
    }

    /// Single winner for the configured special category; first matching row
    /// in rank order.
    fn best_group(&mut self) -> Result<(), String> {
        if self.config.best_group_categories.is_empty() {
            return Ok(());
        }
        let state = self.state;
        for row in &state.scoreboard {
            let team = self.team(&row.team_id)?;
            if team_in_group(team, &self.config.best_group_categories) {
                self.award(
                    format!("group-winner-{}", self.config.best_group_categories[0]),
                    self.config.best_group_citation.clone(),
                    vec![row.team_id.clone()],
                )?;
                break;
            }
        }
        Ok(())
    }

    fn first_to_solve(&mut self) -> Result<(), String> {
        let state = self.state;
        let contest = state.contest.as_ref().ok_or_else(|| {
            let message = "Contest not defined".to_string();
            error!("{message}");
            message
        })?;
        let cutoff = contest.freeze_cutoff();

        let mut awarded_problems: HashSet<&str> = HashSet::new();
        for submission in &state.submissions {
            let judgement_type = submission.judgement_type.as_ref().ok_or_else(|| {
                let message =
                    format!("Submission {} not enriched with judgement type", submission.id);
                error!("{message}");
                message
            })?;
            if !judgement_type.solved {
                continue;
            }
            if !self.eligible(&submission.team_id)? {
                continue;
            }
            if submission.contest_time >= cutoff {
                continue;
            }
            if awarded_problems.contains(submission.problem_id.as_str()) {
                continue;
            }
            let problem = state.problems.get(&submission.problem_id).ok_or_else(|| {
                let message = format!("Unknown problem id {}", submission.problem_id);
                error!("{message}");
                message
            })?;
            awarded_problems.insert(submission.problem_id.as_str());
            self.award(
                format!("first-to-solve-{}", submission.problem_id),
                format!("First to solve problem {}", problem_letter(problem.ordinal)),
                vec![submission.team_id.clone()],
            )?;
        }
        Ok(())
    }

    /// Chronologically last accepted submission among eligible teams.
    fn last_accepted(&mut self) -> Result<(), String> {
        let state = self.state;
        let mut last_team: Option<&str> = None;
        for submission in &state.submissions {
            let judgement_type = submission.judgement_type.as_ref().ok_or_else(|| {
                let message =
                    format!("Submission {} not enriched with judgement type", submission.id);
                error!("{message}");
                message
            })?;
            if !judgement_type.solved {
                continue;
            }
            if !self.eligible(&submission.team_id)? {
                continue;
            }
            last_team = Some(submission.team_id.as_str());
        }
        if let Some(team_id) = last_team {
            self.award("last-ac", "Tenacious Award", vec![team_id.to_string()])?;
        }
        Ok(())
    }
}

/// Produces the full ordered award list: winner, placements, medal tiers
/// (plus star teams), special category, first-to-solve, tenacity. Appends
/// ledger rows as it goes.
pub fn allocate_awards(
    state: &ContestState,
    config: &GalenaConfig,
    ledger: &mut AwardLedger,
) -> Result<AllocationOutcome, String> {
    if state.scoreboard.is_empty() {
        let message = "Scoreboard is empty".to_string();
        error!("{message}");
        return Err(message);
    }
    if state.scoreboard[0].rank != 1 {
        let message = "Scoreboard not ranked; rank before allocating awards".to_string();
        error!("{message}");
        return Err(message);
    }

    let mut allocator = Allocator {
        state,
        config,
        ledger,
        awards: Vec::new(),
        warnings: Vec::new(),
    };

    allocator.winner()?;
    allocator.top_placements()?;
    allocator.medals()?;
    allocator.best_group()?;
    allocator.first_to_solve()?;
    allocator.last_accepted()?;

    info!(
        "Allocated {} awards with {} warnings",
        allocator.awards.len(),
        allocator.warnings.len()
    );

    Ok(AllocationOutcome {
        awards: allocator.awards,
        warnings: allocator.warnings,
    })
}
