use std::collections::HashMap;
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::sync::mpsc::{self, Receiver, Sender};

use serde::de::DeserializeOwned;
use tracing::{info, warn};

use crate::models;
use crate::services::config_loader::GalenaConfig;
use crate::services::snapshot;

#[derive(Debug)]
pub enum ParserEvent {
    Started,
    Progress {
        lines_read: u64,
    },
    LineError {
        line_no: u64,
        message: String,
    },
    Finished {
        lines_read: u64,
        error_count: u64,
        contest_state: Box<models::ContestState>,
        warnings: Vec<String>,
    },
    Failed {
        message: String,
    },
}

fn handle_record<T>(
    name: &str,
    line_no: u64,
    record_data: serde_json::Value,
    state_map: &mut HashMap<String, T>,
    contest_defined: bool,
) -> Result<(), String>
where
    T: Clone + DeserializeOwned + models::HasId,
{
    if !contest_defined {
        return Err("Wrong snapshot: contest not defined yet".to_string());
    }

    let data: T = serde_json::from_value(record_data.clone()).map_err(|err| {
        format!(
            "Line {}: failed to parse {} payload: {} | data: {:#?}",
            line_no, name, err, record_data
        )
    })?;

    match state_map.entry(data.id().to_string()) {
        std::collections::hash_map::Entry::Occupied(mut entry) => {
            warn!("Updating existing {} {}", name, data.id());
            entry.insert(data.clone());
        }
        std::collections::hash_map::Entry::Vacant(entry) => {
            entry.insert(data.clone());
            info!("Added new {} {}", name, data.id());
        }
    }

    Ok(())
}

fn handle_submission_record(
    line_no: u64,
    record_data: serde_json::Value,
    submissions: &mut Vec<models::Submission>,
    contest_defined: bool,
) -> Result<(), String> {
    if !contest_defined {
        return Err("Wrong snapshot: contest not defined yet".to_string());
    }

    let data: models::Submission = serde_json::from_value(record_data.clone()).map_err(|err| {
        format!(
            "Line {}: failed to parse submission payload: {} | data: {:#?}",
            line_no, err, record_data
        )
    })?;

    if let Some(existing) = submissions.iter_mut().find(|s| s.id == data.id) {
        warn!("Updating existing submission {}", data.id);
        *existing = data;
    } else {
        info!("Added new submission {}", data.id);
        submissions.push(data);
    }

    Ok(())
}

fn emit_line_error(tx: &Sender<ParserEvent>, line_no: u64, message: impl Into<String>) -> u64 {
    let _ = tx.send(ParserEvent::LineError {
        line_no,
        message: message.into(),
    });
    1
}

fn apply_record_result(tx: &Sender<ParserEvent>, line_no: u64, result: Result<(), String>) -> u64 {
    if let Err(err) = result {
        return emit_line_error(tx, line_no, err);
    }
    0
}

fn parse_snapshot_line(
    tx: &Sender<ParserEvent>,
    line_no: u64,
    line: &str,
    state: &mut models::ContestState,
) -> u64 {
    let record = match serde_json::from_str::<models::SnapshotRecord>(line) {
        Ok(record) => record,
        Err(err) => return emit_line_error(tx, line_no, err.to_string()),
    };

    let Some(record_data) = record.data else {
        warn!(
            "Empty data for record {:?} on line {}",
            record.record_type, line_no
        );
        return 0;
    };

    match record.record_type {
        models::RecordType::Contest => {
            match serde_json::from_value::<models::Contest>(record_data) {
                Ok(data) => {
                    if state.contest.is_some() {
                        info!("Updating contest data");
                    } else {
                        info!("New contest data parsed");
                    }
                    state.contest = Some(data);
                    0
                }
                Err(err) => {
                    emit_line_error(tx, line_no, format!("Failed to parse contest data: {err}"))
                }
            }
        }
        models::RecordType::JudgementTypes => apply_record_result(
            tx,
            line_no,
            handle_record(
                "judgement types",
                line_no,
                record_data,
                &mut state.judgement_types,
                state.contest.is_some(),
            ),
        ),
        models::RecordType::Languages => {
            info!("Skipping language definition on line {}", line_no);
            0
        }
        models::RecordType::Groups => apply_record_result(
            tx,
            line_no,
            handle_record(
                "groups",
                line_no,
                record_data,
                &mut state.groups,
                state.contest.is_some(),
            ),
        ),
        models::RecordType::Organizations => apply_record_result(
            tx,
            line_no,
            handle_record(
                "organizations",
                line_no,
                record_data,
                &mut state.organizations,
                state.contest.is_some(),
            ),
        ),
        models::RecordType::Teams => apply_record_result(
            tx,
            line_no,
            handle_record(
                "teams",
                line_no,
                record_data,
                &mut state.teams,
                state.contest.is_some(),
            ),
        ),
        models::RecordType::Problems => apply_record_result(
            tx,
            line_no,
            handle_record(
                "problems",
                line_no,
                record_data,
                &mut state.problems,
                state.contest.is_some(),
            ),
        ),
        models::RecordType::Runs => {
            info!("Skipping run detail on line {}", line_no);
            0
        }
        models::RecordType::Submissions => apply_record_result(
            tx,
            line_no,
            handle_submission_record(
                line_no,
                record_data,
                &mut state.submissions,
                state.contest.is_some(),
            ),
        ),
        models::RecordType::Judgements => apply_record_result(
            tx,
            line_no,
            handle_record(
                "judgements",
                line_no,
                record_data,
                &mut state.judgements,
                state.contest.is_some(),
            ),
        ),
        models::RecordType::Scoreboard => {
            if state.contest.is_none() {
                return emit_line_error(
                    tx,
                    line_no,
                    "Wrong snapshot: contest not defined yet".to_string(),
                );
            }
            match serde_json::from_value::<models::ScoreboardSnapshot>(record_data) {
                Ok(data) => {
                    if !state.scoreboard.is_empty() {
                        warn!("Replacing scoreboard rows from line {}", line_no);
                    }
                    info!("Parsed scoreboard with {} rows", data.rows.len());
                    state.scoreboard = data.rows;
                    0
                }
                Err(err) => emit_line_error(
                    tx,
                    line_no,
                    format!("Failed to parse scoreboard data: {err}"),
                ),
            }
        }
        models::RecordType::State => {
            warn!("Skipping state change notify on line {}", line_no);
            0
        }
        models::RecordType::Awards => {
            warn!(
                "Skipping award record on line {}: awards are recomputed here",
                line_no
            );
            0
        }
    }
}

pub fn spawn_snapshot_parser(path: String, config: GalenaConfig) -> Receiver<ParserEvent> {
    let (tx, rx) = mpsc::channel::<ParserEvent>();

    std::thread::spawn(move || {
        let _ = tx.send(ParserEvent::Started);

        let file = match File::open(&path) {
            Ok(file) => file,
            Err(err) => {
                let _ = tx.send(ParserEvent::Failed {
                    message: format!("Failed to open file '{path}': {err}"),
                });
                return;
            }
        };

        let reader = BufReader::new(file);
        let mut lines_read: u64 = 0;
        let mut error_count: u64 = 0;
        let mut state = models::ContestState::new();

        for line_result in reader.lines() {
            match line_result {
                Ok(line) => {
                    lines_read += 1;
                    error_count += parse_snapshot_line(&tx, lines_read, &line, &mut state);

                    if lines_read.is_multiple_of(100) {
                        let _ = tx.send(ParserEvent::Progress { lines_read });
                    }
                }
                Err(err) => {
                    let _ = tx.send(ParserEvent::Failed {
                        message: format!("Failed while reading file '{path}': {err}"),
                    });
                    return;
                }
            }
        }

        let warnings = match snapshot::normalize_and_enrich(&mut state, &config) {
            Ok(warnings) => warnings,
            Err(message) => {
                let _ = tx.send(ParserEvent::Failed { message });
                return;
            }
        };

        let _ = tx.send(ParserEvent::Finished {
            lines_read,
            error_count,
            contest_state: Box::new(state),
            warnings,
        });
    });

    rx
}
