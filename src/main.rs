mod models;
mod services;

use std::fs;
use std::path::Path;

use anyhow::{Context, anyhow, bail};
use tracing::{info, warn};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

use services::allocator;
use services::config_loader::{GalenaConfig, load_galena_config};
use services::feed_parser::{ParserEvent, spawn_snapshot_parser};
use services::ledger::AwardLedger;
use services::ranker;

fn init_tracing() -> Option<WorkerGuard> {
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let console_layer = tracing_subscriber::fmt::layer()
        .with_writer(std::io::stdout)
        .with_target(true);

    let _ = fs::create_dir_all("logs");
    let file_appender = tracing_appender::rolling::daily("logs", "galena.log");
    let (file_writer, file_guard) = tracing_appender::non_blocking(file_appender);
    let file_layer = tracing_subscriber::fmt::layer()
        .with_ansi(false)
        .with_writer(file_writer)
        .with_target(true);

    let init_result = tracing_subscriber::registry()
        .with(env_filter)
        .with(console_layer)
        .with(file_layer)
        .try_init();

    if let Err(err) = init_result {
        eprintln!("tracing init failed: {err}");
        return None;
    }

    Some(file_guard)
}

fn parse_snapshot(path: &str, config: GalenaConfig) -> anyhow::Result<models::ContestState> {
    let rx = spawn_snapshot_parser(path.to_string(), config);
    loop {
        match rx.recv().context("snapshot parser hung up")? {
            ParserEvent::Started => info!("Parsing snapshot {}", path),
            ParserEvent::Progress { lines_read } => info!("Parsed {} lines", lines_read),
            ParserEvent::LineError { line_no, message } => {
                warn!("Line {}: {}", line_no, message);
            }
            ParserEvent::Finished {
                lines_read,
                error_count,
                contest_state,
                warnings,
            } => {
                info!(
                    "Snapshot parsed: {} lines, {} line errors, {} warnings",
                    lines_read,
                    error_count,
                    warnings.len()
                );
                for warning in warnings {
                    warn!("{warning}");
                }
                return Ok(*contest_state);
            }
            ParserEvent::Failed { message } => bail!(message),
        }
    }
}

fn write_outputs(
    snapshot_path: &str,
    awards: &[models::AwardRecord],
    ledger: &AwardLedger,
) -> anyhow::Result<()> {
    let awards_path = format!("{snapshot_path}.awards.json");
    let mut lines = Vec::with_capacity(awards.len());
    for award in awards {
        let wrapped = serde_json::json!({
            "type": "awards",
            "id": award.id,
            "data": award,
        });
        lines.push(serde_json::to_string(&wrapped)?);
    }
    fs::write(&awards_path, lines.join("\n"))
        .with_context(|| format!("Failed to write {awards_path}"))?;
    info!("Wrote {} award records to {}", awards.len(), awards_path);

    let results_path = format!("{snapshot_path}.results.csv");
    fs::write(&results_path, ledger.csv_lines().join("\n"))
        .with_context(|| format!("Failed to write {results_path}"))?;
    info!(
        "Wrote {} ledger rows to {}",
        ledger.rows().len(),
        results_path
    );

    Ok(())
}

fn main() -> anyhow::Result<()> {
    let _log_guard = init_tracing();
    info!("Starting Galena");

    let snapshot_path = std::env::args()
        .nth(1)
        .context("Usage: galena <snapshot.ndjson>")?;

    let config_folder = Path::new(&snapshot_path)
        .parent()
        .map(|p| p.display().to_string())
        .unwrap_or_else(|| ".".to_string());
    let config = load_galena_config(&config_folder).map_err(|e| anyhow!(e))?;

    let mut state = parse_snapshot(&snapshot_path, config.clone())?;

    ranker::rank_scoreboard(&mut state, &config).map_err(|e| anyhow!(e))?;
    for row in &state.scoreboard {
        info!(
            "Rank {:0>3} real {} solved {} time {} team {}",
            row.rank,
            row.real_rank
                .map(|r| r.to_string())
                .unwrap_or_else(|| "*".to_string()),
            row.score.num_solved,
            row.score.total_time,
            row.team_id
        );
    }

    let mut ledger = AwardLedger::new();
    let outcome = allocator::allocate_awards(&state, &config, &mut ledger).map_err(|e| anyhow!(e))?;
    for warning in &outcome.warnings {
        warn!("{warning}");
    }

    write_outputs(&snapshot_path, &outcome.awards, &ledger)?;

    info!("Done: {} awards allocated", outcome.awards.len());
    Ok(())
}
