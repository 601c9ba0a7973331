//! Headless battle runner.
//!
//! This binary runs battles without graphics, for CI testing, balance
//! runs and replay verification.
//!
//! # Usage
//!
//! ```bash
//! # Run a scenario and print a JSON report
//! cargo run -p battle_headless -- run --scenario duel --json
//!
//! # Verify a scenario is deterministic across repeated runs
//! cargo run -p battle_headless -- verify --scenario duel --runs 5
//!
//! # Record a replay, then play it back with hash verification
//! cargo run -p battle_headless -- run --scenario duel --record duel.replay
//! cargo run -p battle_headless -- replay --file duel.replay
//! ```
//!
//! Reports go to stdout; logs go to stderr.

use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;

use clap::{Parser, Subcommand};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use battle_core::prelude::*;
use std::result::Result;
use battle_headless::assets::Assets;
use battle_headless::runner::{run_scenario, RunConfig};

#[derive(Parser)]
#[command(name = "battle_headless")]
#[command(about = "Headless battle runner for CI and balance testing")]
#[command(version)]
struct Cli {
    /// Enable verbose logging to stderr
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Asset directory (skills.ron, roster.ron, maps/, scenarios/)
    #[arg(short, long, global = true, default_value = "assets")]
    assets: PathBuf,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run a single scenario
    Run {
        /// Scenario name under scenarios/
        #[arg(short, long)]
        scenario: String,

        /// Override the scenario's frame count
        #[arg(long)]
        frames: Option<u64>,

        /// Print the report as JSON instead of plain text
        #[arg(long)]
        json: bool,

        /// Record a replay to this path
        #[arg(long)]
        record: Option<PathBuf>,
    },

    /// Verify determinism by running a scenario multiple times
    Verify {
        /// Scenario name under scenarios/
        #[arg(short, long)]
        scenario: String,

        /// Number of verification runs
        #[arg(short, long, default_value = "5")]
        runs: u32,
    },

    /// Play back a recorded replay, verifying the final hash
    Replay {
        /// Replay file path
        #[arg(short, long)]
        file: PathBuf,
    },
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    // Logs to stderr; stdout carries reports only.
    let log_level = if cli.verbose {
        tracing::Level::DEBUG
    } else {
        tracing::Level::INFO
    };
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::fmt::layer()
                .with_writer(std::io::stderr)
                .with_ansi(true),
        )
        .with(tracing_subscriber::filter::LevelFilter::from_level(
            log_level,
        ))
        .init();

    let result = match cli.command {
        Commands::Run {
            scenario,
            frames,
            json,
            record,
        } => cmd_run(&cli.assets, &scenario, frames, json, record),
        Commands::Verify { scenario, runs } => cmd_verify(&cli.assets, &scenario, runs),
        Commands::Replay { file } => cmd_replay(&cli.assets, &file),
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            tracing::error!("{e}");
            ExitCode::FAILURE
        }
    }
}

fn cmd_run(
    assets_dir: &std::path::Path,
    scenario_name: &str,
    frames: Option<u64>,
    json: bool,
    record: Option<PathBuf>,
) -> Result<(), Box<dyn std::error::Error>> {
    let assets = Assets::load(assets_dir)?;
    let scenario = assets.load_scenario(scenario_name)?;
    let config = RunConfig {
        max_frames: frames,
        record_replay: record.is_some(),
        ..RunConfig::default()
    };

    let outcome = run_scenario(&assets, &scenario, &config)?;
    if let (Some(path), Some(replay)) = (record, outcome.replay.as_ref()) {
        std::fs::write(&path, replay.to_bytes()?)?;
        tracing::info!(path = %path.display(), "replay written");
    }

    let report = &outcome.report;
    if json {
        println!("{}", serde_json::to_string_pretty(report)?);
    } else {
        println!(
            "{}: {} frames, hash {:#018x}, {} player(s) / {} enem(ies) alive{}",
            report.scenario,
            report.frames,
            report.final_hash,
            report.players_alive.len(),
            report.enemies_alive.len(),
            if report.decided { " [decided]" } else { "" },
        );
    }
    Ok(())
}

fn cmd_verify(
    assets_dir: &std::path::Path,
    scenario_name: &str,
    runs: u32,
) -> Result<(), Box<dyn std::error::Error>> {
    let assets = Assets::load(assets_dir)?;
    let scenario = assets.load_scenario(scenario_name)?;
    let config = RunConfig::default();

    let mut hashes = Vec::new();
    for run in 0..runs {
        let outcome = run_scenario(&assets, &scenario, &config)?;
        tracing::debug!(run, hash = outcome.report.final_hash, "verification run");
        hashes.push(outcome.report.final_hash);
    }

    if hashes.windows(2).all(|w| w[0] == w[1]) {
        println!("deterministic: {runs} runs, hash {:#018x}", hashes[0]);
        Ok(())
    } else {
        Err(format!("runs diverged: {hashes:?}").into())
    }
}

fn cmd_replay(
    assets_dir: &std::path::Path,
    file: &std::path::Path,
) -> Result<(), Box<dyn std::error::Error>> {
    let assets = Assets::load(assets_dir)?;
    let replay = Replay::from_bytes(&std::fs::read(file)?)?;

    // The replay labels itself with the scenario it was recorded from;
    // rebuild the same context to play it back.
    let scenario = assets.load_scenario(&replay.scenario_id)?;
    let ctx = Arc::new(assets.build_context(&scenario.map, BattleConfig::default())?);

    let battle = replay.playback(ctx)?;
    println!(
        "replay '{}' verified: {} frames, hash {:#018x}",
        replay.scenario_id,
        battle.state().frame,
        replay.final_hash,
    );
    Ok(())
}
