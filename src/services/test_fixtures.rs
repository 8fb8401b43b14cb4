//! Small literal contest used across the service unit tests: three official
//! teams, one starred (no-occupy) observer team, two problems.

use chrono::Duration;

use crate::models::{
    Contest, ContestState, Group, Judgement, JudgementType, Organization, Problem, Score,
    ScoreboardRow, Submission, Team,
};
use crate::services::config_loader::GalenaConfig;

pub fn test_config() -> GalenaConfig {
    GalenaConfig {
        no_occupy_categories: vec!["13".to_string()],
        top_placements: 3,
        gold: 1,
        silver: 1,
        bronze: 1,
        best_group_categories: vec!["21".to_string()],
        ..GalenaConfig::default()
    }
}

pub fn accepted_type() -> JudgementType {
    JudgementType {
        id: "AC".to_string(),
        name: Some("correct".to_string()),
        penalty: false,
        solved: true,
    }
}

pub fn wrong_answer_type() -> JudgementType {
    JudgementType {
        id: "WA".to_string(),
        name: Some("wrong answer".to_string()),
        penalty: true,
        solved: false,
    }
}

pub fn submission(id: &str, team_id: &str, problem_id: &str, contest_secs: i64) -> Submission {
    Submission {
        language_id: Some("cpp".to_string()),
        time: None,
        contest_time: Duration::seconds(contest_secs),
        team_id: team_id.to_string(),
        problem_id: problem_id.to_string(),
        id: id.to_string(),
        external_id: None,
        judgement_type: None,
    }
}

pub fn enriched_submission(
    id: &str,
    team_id: &str,
    problem_id: &str,
    contest_secs: i64,
    solved: bool,
) -> Submission {
    let mut s = submission(id, team_id, problem_id, contest_secs);
    s.judgement_type = Some(if solved {
        accepted_type()
    } else {
        wrong_answer_type()
    });
    s
}

pub fn judge(state: &mut ContestState, submission_id: &str, judgement_type_id: &str) {
    let id = format!("j{submission_id}");
    state.judgements.insert(
        id.clone(),
        Judgement {
            start_contest_time: None,
            end_contest_time: None,
            submission_id: submission_id.to_string(),
            id,
            valid: true,
            judgement_type_id: Some(judgement_type_id.to_string()),
        },
    );
}

pub fn row(team_id: &str, num_solved: i32, total_time: i64) -> ScoreboardRow {
    ScoreboardRow {
        team_id: team_id.to_string(),
        score: Score {
            num_solved,
            total_time,
            max_submission_id: 0,
        },
        rank: 0,
        real_rank: None,
    }
}

fn group(id: &str, name: &str) -> Group {
    Group {
        id: id.to_string(),
        hidden: false,
        icpc_id: None,
        name: name.to_string(),
        sortorder: 0,
        color: None,
    }
}

fn organization(id: &str, formal_name: &str) -> Organization {
    Organization {
        id: id.to_string(),
        icpc_id: None,
        name: formal_name.to_string(),
        formal_name: formal_name.to_string(),
        shortname: id.to_string(),
        country: None,
    }
}

fn team(id: &str, name: &str, group_ids: &[&str], organization_id: &str) -> Team {
    Team {
        organization_id: Some(organization_id.to_string()),
        hidden: false,
        group_ids: group_ids.iter().map(|g| g.to_string()).collect(),
        affiliation: None,
        members: None,
        id: id.to_string(),
        icpc_id: None,
        label: None,
        name: name.to_string(),
        display_name: None,
    }
}

fn problem(id: &str, ordinal: i32, label: &str, name: &str) -> Problem {
    Problem {
        ordinal,
        id: id.to_string(),
        rgb: None,
        color: None,
        label: label.to_string(),
        external_id: None,
        name: name.to_string(),
    }
}

pub fn small_contest_state() -> ContestState {
    let mut state = ContestState::new();

    state.contest = Some(Contest {
        start_time: None,
        end_time: None,
        duration: Duration::hours(5),
        scoreboard_freeze_duration: Duration::hours(1),
        id: "c1".to_string(),
        name: "Test Contest".to_string(),
        shortname: Some("tc".to_string()),
        formal_name: None,
        penalty_time: 20,
    });

    for jt in [
        accepted_type(),
        wrong_answer_type(),
        JudgementType {
            id: "CE".to_string(),
            name: Some("compiler error".to_string()),
            penalty: false,
            solved: false,
        },
    ] {
        state.judgement_types.insert(jt.id.clone(), jt);
    }

    for g in [
        group("3", "Participants"),
        group("13", "Observers"),
        group("21", "Girls"),
    ] {
        state.groups.insert(g.id.clone(), g);
    }

    for org in [
        organization("inst-a", "Institute A"),
        organization("inst-b", "Institute B"),
        organization("inst-c", "Institute C"),
        organization("inst-d", "Institute D"),
        organization("inst-e", "Institute E"),
    ] {
        state.organizations.insert(org.id.clone(), org);
    }

    for t in [
        team("1", "Alpha", &["3"], "inst-a"),
        team("2", "Beta", &["3"], "inst-b"),
        team("3", "Gamma", &["3", "21"], "inst-c"),
        team("4", "Delta", &["13"], "inst-d"),
        team("5", "Epsilon", &["3"], "inst-e"),
    ] {
        state.teams.insert(t.id.clone(), t);
    }

    for p in [
        problem("p1", 0, "A", "Apples"),
        problem("p2", 1, "B", "Bridges"),
    ] {
        state.problems.insert(p.id.clone(), p);
    }

    // Enriched submission history; id order is chronological. Submission 14
    // is the starred team's early solve, 15 lands inside the freeze window.
    state.submissions = vec![
        enriched_submission("11", "1", "p1", 600, true),
        enriched_submission("12", "2", "p1", 1200, true),
        enriched_submission("13", "3", "p2", 1800, true),
        enriched_submission("14", "4", "p1", 300, true),
        enriched_submission("15", "1", "p2", 15000, true),
        enriched_submission("16", "2", "p2", 2000, false),
    ];
    for (submission_id, jt) in [
        ("11", "AC"),
        ("12", "AC"),
        ("13", "AC"),
        ("14", "AC"),
        ("15", "AC"),
        ("16", "WA"),
    ] {
        judge(&mut state, submission_id, jt);
    }

    state
}
