use std::collections::{HashMap, HashSet};

use tracing::{debug, error, info};

use crate::models::{ContestState, ScoreboardRow, Submission, Team};
use crate::services::config_loader::GalenaConfig;
use crate::services::eligibility::is_eligible;

/// For every row, the maximum submission id among that team's first accepted
/// submissions per problem. Distinguishes teams with identical solve count
/// and total time.
fn compute_tiebreaks(rows: &mut [ScoreboardRow], submissions: &[Submission]) -> Result<(), String> {
    let mut max_id_per_team: HashMap<&str, u64> = HashMap::new();
    let mut solved_per_team: HashSet<(&str, &str)> = HashSet::new();

    for submission in submissions {
        let judgement_type = submission.judgement_type.as_ref().ok_or_else(|| {
            let message = format!("Submission {} not enriched with judgement type", submission.id);
            error!("{message}");
            message
        })?;
        if !judgement_type.solved {
            continue;
        }
        if !solved_per_team.insert((submission.team_id.as_str(), submission.problem_id.as_str())) {
            continue;
        }
        let numeric_id: u64 = submission.id.parse().map_err(|_| {
            let message = format!("Non-numeric submission id {}", submission.id);
            error!("{message}");
            message
        })?;
        let entry = max_id_per_team.entry(submission.team_id.as_str()).or_insert(0);
        *entry = (*entry).max(numeric_id);
    }

    for row in rows {
        row.score.max_submission_id = max_id_per_team
            .get(row.team_id.as_str())
            .copied()
            .unwrap_or(0);
    }

    Ok(())
}

fn sort_rows(rows: &mut [ScoreboardRow]) {
    rows.sort_by(|r1, r2| {
        r2.score
            .num_solved
            .cmp(&r1.score.num_solved)
            .then(r1.score.total_time.cmp(&r2.score.total_time))
            .then(r1.score.max_submission_id.cmp(&r2.score.max_submission_id))
    });
}

/// Dense competition ranking over sorted rows: ties share a rank, the next
/// distinct row's rank is its 1-based position.
fn assign_ranks(rows: &mut [ScoreboardRow]) -> Result<(), String> {
    if rows.is_empty() {
        let message = "Scoreboard is empty".to_string();
        error!("{message}");
        return Err(message);
    }

    rows[0].rank = 1;
    for idx in 0..rows.len() - 1 {
        rows[idx + 1].rank = if rows[idx].score == rows[idx + 1].score {
            rows[idx].rank
        } else {
            (idx + 2) as u32
        };
    }
    Ok(())
}

/// Same ranking procedure, restricted to the award-eligible subsequence.
fn assign_real_ranks(
    rows: &mut [ScoreboardRow],
    teams: &HashMap<String, Team>,
    config: &GalenaConfig,
) -> Result<(), String> {
    let mut eligible_indices = Vec::new();
    for (idx, row) in rows.iter().enumerate() {
        let team = teams.get(&row.team_id).ok_or_else(|| {
            let message = format!("Unknown team id {} on scoreboard", row.team_id);
            error!("{message}");
            message
        })?;
        if is_eligible(team, config) {
            eligible_indices.push(idx);
        }
    }

    if eligible_indices.is_empty() {
        let message = "No award-eligible teams on the scoreboard".to_string();
        error!("{message}");
        return Err(message);
    }

    rows[eligible_indices[0]].real_rank = Some(1);
    for pos in 0..eligible_indices.len() - 1 {
        let prev = eligible_indices[pos];
        let next = eligible_indices[pos + 1];
        rows[next].real_rank = if rows[prev].score == rows[next].score {
            rows[prev].real_rank
        } else {
            Some((pos + 2) as u32)
        };
    }
    Ok(())
}

/// Orders the scoreboard and assigns `rank` / `real_rank`. Must run to
/// completion before any award allocation.
pub fn rank_scoreboard(state: &mut ContestState, config: &GalenaConfig) -> Result<(), String> {
    let mut rows = std::mem::take(&mut state.scoreboard);

    let result = (|| {
        compute_tiebreaks(&mut rows, &state.submissions)?;
        sort_rows(&mut rows);
        assign_ranks(&mut rows)?;
        assign_real_ranks(&mut rows, &state.teams, config)
    })();

    state.scoreboard = rows;
    result?;

    for row in &state.scoreboard {
        debug!(
            "Rank {:0>3} real {:?} solved {} time {} tiebreak {} team {}",
            row.rank,
            row.real_rank,
            row.score.num_solved,
            row.score.total_time,
            row.score.max_submission_id,
            row.team_id
        );
    }
    info!("Ranked {} scoreboard rows", state.scoreboard.len());

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::test_fixtures::*;

    fn state_with_rows(rows: Vec<ScoreboardRow>) -> ContestState {
        let mut state = small_contest_state();
        state.scoreboard = rows;
        state
    }

    #[test]
    fn tiebreak_tracks_first_accept_per_problem() {
        let mut state = small_contest_state();
        // Team 1 solves p1 twice; only the first accept (id 11) counts.
        state
            .submissions
            .push(enriched_submission("18", "1", "p1", 2000, true));
        state.scoreboard = vec![row("1", 2, 100), row("2", 1, 50)];

        rank_scoreboard(&mut state, &test_config()).unwrap();

        let team1 = state
            .scoreboard
            .iter()
            .find(|r| r.team_id == "1")
            .unwrap();
        // First accepts: p1 at id 11, p2 at id 15.
        assert_eq!(team1.score.max_submission_id, 15);
    }

    #[test]
    fn teams_with_no_solves_default_to_zero_tiebreak() {
        let mut state = small_contest_state();
        state.submissions.clear();
        state.scoreboard = vec![row("1", 0, 0), row("2", 0, 0)];

        rank_scoreboard(&mut state, &test_config()).unwrap();
        assert!(state
            .scoreboard
            .iter()
            .all(|r| r.score.max_submission_id == 0));
    }

    #[test]
    fn order_is_solved_desc_time_asc_tiebreak_asc() {
        let mut rows = vec![row("1", 2, 200), row("2", 3, 500), row("3", 2, 100)];
        rows[0].score.max_submission_id = 9;
        sort_rows(&mut rows);
        let order: Vec<&str> = rows.iter().map(|r| r.team_id.as_str()).collect();
        assert_eq!(order, vec!["2", "3", "1"]);
    }

    #[test]
    fn distinct_tiebreak_ids_split_otherwise_tied_ranks() {
        let mut state = small_contest_state();
        state.submissions.clear();
        state.scoreboard = vec![row("1", 3, 100), row("2", 3, 100), row("3", 2, 50)];
        // Inject tiebreak ids through solved submissions: team 1 -> 5, team 2 -> 7.
        state
            .submissions
            .push(enriched_submission("5", "1", "p1", 100, true));
        state
            .submissions
            .push(enriched_submission("7", "2", "p1", 200, true));

        rank_scoreboard(&mut state, &test_config()).unwrap();

        let by_pos: Vec<(&str, u32)> = state
            .scoreboard
            .iter()
            .map(|r| (r.team_id.as_str(), r.rank))
            .collect();
        assert_eq!(by_pos, vec![("1", 1), ("2", 2), ("3", 3)]);
    }

    #[test]
    fn identical_triples_share_rank_and_next_rank_skips() {
        let mut state = state_with_rows(vec![row("1", 3, 100), row("2", 3, 100), row("3", 2, 50)]);
        state.submissions.clear();

        rank_scoreboard(&mut state, &test_config()).unwrap();

        let ranks: Vec<u32> = state.scoreboard.iter().map(|r| r.rank).collect();
        assert_eq!(ranks, vec![1, 1, 3]);
    }

    #[test]
    fn real_rank_skips_ineligible_rows() {
        // Team 4 is a no-occupy (starred) team sitting in second place.
        let mut state = state_with_rows(vec![
            row("1", 4, 100),
            row("4", 3, 100),
            row("2", 2, 100),
            row("3", 1, 100),
        ]);
        state.submissions.clear();

        rank_scoreboard(&mut state, &test_config()).unwrap();

        let real: Vec<(&str, Option<u32>)> = state
            .scoreboard
            .iter()
            .map(|r| (r.team_id.as_str(), r.real_rank))
            .collect();
        assert_eq!(
            real,
            vec![("1", Some(1)), ("4", None), ("2", Some(2)), ("3", Some(3))]
        );
    }

    #[test]
    fn empty_scoreboard_is_fatal() {
        let mut state = state_with_rows(Vec::new());
        let err = rank_scoreboard(&mut state, &test_config()).unwrap_err();
        assert!(err.contains("empty"));
    }

    #[test]
    fn no_eligible_teams_is_fatal() {
        let mut state = state_with_rows(vec![row("4", 1, 10)]);
        state.submissions.clear();
        let err = rank_scoreboard(&mut state, &test_config()).unwrap_err();
        assert!(err.contains("eligible"));
    }

    #[test]
    fn rank_is_non_decreasing_and_equal_iff_triples_equal() {
        let mut state = state_with_rows(vec![
            row("1", 3, 100),
            row("2", 3, 100),
            row("3", 3, 120),
            row("4", 1, 10),
        ]);
        state.submissions.clear();

        rank_scoreboard(&mut state, &test_config()).unwrap();

        let rows = &state.scoreboard;
        for pair in rows.windows(2) {
            assert!(pair[0].rank <= pair[1].rank);
            assert_eq!(pair[0].rank == pair[1].rank, pair[0].score == pair[1].score);
        }
    }
}
