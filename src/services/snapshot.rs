use std::collections::HashSet;

use tracing::{error, info, warn};

use crate::models::ContestState;
use crate::services::config_loader::GalenaConfig;

fn apply_submission_filters(state: &mut ContestState, config: &GalenaConfig) {
    if config.filter_team_submissions.is_empty() {
        return;
    }

    let filter_set: HashSet<&str> = config
        .filter_team_submissions
        .iter()
        .map(String::as_str)
        .collect();

    let removed_submission_ids: HashSet<String> = state
        .submissions
        .iter()
        .filter(|submission| filter_set.contains(submission.team_id.as_str()))
        .map(|submission| submission.id.clone())
        .collect();

    if removed_submission_ids.is_empty() {
        info!("No submissions matched filter_team_submissions");
        return;
    }

    info!("Removing submissions {:?}", removed_submission_ids);

    state
        .submissions
        .retain(|submission| !removed_submission_ids.contains(&submission.id));
    state
        .judgements
        .retain(|_, judgement| !removed_submission_ids.contains(&judgement.submission_id));

    info!(
        "Filtered out {} submissions and related judgements for teams {:?}",
        removed_submission_ids.len(),
        config.filter_team_submissions
    );
}

fn drop_hidden_entries(state: &mut ContestState) {
    let hidden_groups = state
        .groups
        .values()
        .filter(|group| group.hidden)
        .count();
    state.groups.retain(|_, group| !group.hidden);
    if hidden_groups > 0 {
        info!("Dropped {} hidden groups", hidden_groups);
    }

    let visible_group_ids: HashSet<String> = state.groups.keys().cloned().collect();
    let before = state.teams.len();
    state.teams.retain(|_, team| {
        !team.hidden
            && team
                .group_ids
                .iter()
                .any(|group_id| visible_group_ids.contains(group_id))
    });
    if state.teams.len() != before {
        info!(
            "Dropped {} teams that are hidden or have no visible group",
            before - state.teams.len()
        );
    }
}

fn filter_submissions_to_contest(state: &mut ContestState) -> Result<(), String> {
    let contest = state.contest.as_ref().ok_or_else(|| {
        let message = "Contest not defined".to_string();
        error!("{message}");
        message
    })?;
    let duration = contest.duration;

    let before = state.submissions.len();
    let team_ids: HashSet<&str> = state.teams.keys().map(String::as_str).collect();
    state
        .submissions
        .retain(|submission| {
            team_ids.contains(submission.team_id.as_str()) && submission.contest_time <= duration
        });
    if state.submissions.len() != before {
        info!(
            "Dropped {} submissions from unknown teams or outside the contest window",
            before - state.submissions.len()
        );
    }

    let submission_ids: HashSet<String> =
        state.submissions.iter().map(|s| s.id.clone()).collect();
    state
        .judgements
        .retain(|_, judgement| judgement.valid && submission_ids.contains(&judgement.submission_id));

    Ok(())
}

/// Attaches each submission's resolved judgement type. Ranking is undefined
/// over unenriched submissions, so any leftover gap is fatal.
fn enrich_submissions(state: &mut ContestState) -> Result<(), String> {
    // On a rejudge anomaly a submission can carry two valid judgements;
    // applying them in judgement-id order keeps the winner deterministic
    // (the later judgement overwrites the earlier one).
    let mut judgements: Vec<(String, String, Option<String>)> = state
        .judgements
        .values()
        .map(|judgement| {
            (
                judgement.id.clone(),
                judgement.submission_id.clone(),
                judgement.judgement_type_id.clone(),
            )
        })
        .collect();
    judgements.sort_by(|j1, j2| j1.0.cmp(&j2.0));

    for (_, submission_id, judgement_type_id) in judgements {
        let Some(judgement_type_id) = judgement_type_id else {
            continue;
        };
        let judgement_type = state
            .judgement_types
            .get(&judgement_type_id)
            .cloned()
            .ok_or_else(|| {
                let message = format!("Unknown judgement type id {}", judgement_type_id);
                error!("{message}");
                message
            })?;

        let submission = state
            .submissions
            .iter_mut()
            .find(|submission| submission.id == submission_id)
            .ok_or_else(|| {
                let message = format!("Unknown submission id {}", submission_id);
                error!("{message}");
                message
            })?;
        submission.judgement_type = Some(judgement_type);
    }

    for submission in &state.submissions {
        if submission.judgement_type.is_none() {
            let message = format!("Submission {} not judged", submission.id);
            error!("{message}");
            return Err(message);
        }
    }

    Ok(())
}

fn sort_submissions(state: &mut ContestState) -> Result<(), String> {
    let mut keyed = Vec::with_capacity(state.submissions.len());
    for submission in state.submissions.drain(..) {
        let numeric_id: u64 = submission.id.parse().map_err(|_| {
            let message = format!("Non-numeric submission id {}", submission.id);
            error!("{message}");
            message
        })?;
        keyed.push((numeric_id, submission));
    }
    keyed.sort_by_key(|(numeric_id, _)| *numeric_id);
    state.submissions = keyed.into_iter().map(|(_, submission)| submission).collect();
    Ok(())
}

fn prune_scoreboard_rows(state: &mut ContestState, warnings: &mut Vec<String>) {
    let team_ids: HashSet<&str> = state.teams.keys().map(String::as_str).collect();
    let mut removed = Vec::new();
    state.scoreboard.retain(|row| {
        if team_ids.contains(row.team_id.as_str()) {
            true
        } else {
            removed.push(row.team_id.clone());
            false
        }
    });
    for team_id in removed {
        let warning = format!(
            "Dropping scoreboard row for filtered-out team {}",
            team_id
        );
        warn!("{warning}");
        warnings.push(warning);
    }
}

/// Applies the upstream normalization the award engine assumes has already
/// happened, then enriches submissions with their judgement types.
pub fn normalize_and_enrich(
    state: &mut ContestState,
    config: &GalenaConfig,
) -> Result<Vec<String>, String> {
    info!("Snapshot parse complete, normalizing...");
    let mut warnings = Vec::new();

    apply_submission_filters(state, config);
    drop_hidden_entries(state);
    filter_submissions_to_contest(state)?;
    enrich_submissions(state)?;
    sort_submissions(state)?;
    prune_scoreboard_rows(state, &mut warnings);

    info!(
        "Snapshot ready: {} teams, {} problems, {} submissions, {} scoreboard rows",
        state.teams.len(),
        state.problems.len(),
        state.submissions.len(),
        state.scoreboard.len()
    );

    Ok(warnings)
}
