//! Ergo - Structured Interval Workout Engine
//!
//! Host binary for riding structured workouts on a smart trainer.
//! Playback, telemetry, ERG dispatch and console output run as
//! cooperative tasks on a single-threaded embassy executor; blocking I/O
//! (stdin, HTTP) lives on helper threads.
//!
//! Named after the ergometer, whose ERG mode holds a commanded wattage
//! regardless of cadence.

use std::path::Path;

use clap::Parser;
use embassy_executor::Spawner;
use embassy_futures::join::join4;
use log::{error, info, warn};

use ergo_core::device_id;
use ergo_core::session::WorkoutSession;
use ergo_protocol::{parse_workout_text, plan_to_json};

mod backend;
mod channels;
mod cli;
mod config;
mod console;
mod preview;
mod tasks;

use crate::backend::Backend;
use crate::channels::BUS;
use crate::cli::{check_ftp, read_file, read_plan, Cli, CliError, Commands};
use crate::tasks::{console_task, erg_task, session_task, telemetry_task, SessionOptions};

/// Main entry point
#[embassy_executor::main]
async fn main(_spawner: Spawner) {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let cli = Cli::parse();
    let code = match run(cli).await {
        Ok(()) => 0,
        Err(e) => {
            error!("{}", e);
            1
        }
    };

    std::process::exit(code);
}

async fn run(cli: Cli) -> Result<(), CliError> {
    match cli.command {
        Commands::Ride {
            plan,
            ftp,
            trainer,
            autostart,
        } => {
            let options = SessionOptions { autostart };
            ride(cli.config.as_deref(), &plan, ftp, trainer, options).await
        }
        Commands::Preview { plan, ftp } => {
            let config = config::load(cli.config.as_deref());
            let plan = read_plan(&plan)?;
            let ftp = check_ftp(ftp)?.unwrap_or(config.rider.ftp);
            println!("{}", preview::render_preview(&plan, ftp, config.erg.fallback()));
            Ok(())
        }
        Commands::ParseText { file } => {
            let text = read_file(&file)?;
            let plan = parse_workout_text(&text).map_err(|source| {
                CliError::Notation {
                    path: file.clone(),
                    source,
                }
            })?;
            info!("Parsed {} steps from {}", plan.len(), file.display());
            println!("{}", plan_to_json(&plan).map_err(CliError::Serialize)?);
            Ok(())
        }
    }
}

async fn ride(
    config_path: Option<&Path>,
    plan_path: &Path,
    ftp: Option<f64>,
    trainer: Option<String>,
    options: SessionOptions,
) -> Result<(), CliError> {
    let mut config = config::load(config_path);
    if let Some(ftp) = check_ftp(ftp)? {
        config.rider.ftp = ftp;
    }
    if let Some(name) = trainer {
        if name.len() > ergo_core::MAX_DEVICE_ID_LEN {
            return Err(CliError::TrainerTooLong(name));
        }
        config.erg.trainer = Some(device_id(&name));
    }

    let plan = read_plan(plan_path)?;
    info!(
        "Loaded {} ({} steps, {} s)",
        plan_path.display(),
        plan.len(),
        plan.total_duration_ms() / 1000
    );

    let session = WorkoutSession::from_config(plan, &config.ride());
    let backend = Backend::spawn(&config.backend)?;
    console::spawn_stdin_reader().map_err(CliError::Console)?;

    let (_, _, stats, _) = join4(
        session_task(&BUS, session, options),
        telemetry_task(&BUS, backend.telemetry, config.engine.poll_ms),
        erg_task(&BUS, backend.erg),
        console_task(&BUS),
    )
    .await;

    info!(
        "Ride ended: {} ERG commands, {} duplicates suppressed",
        stats.issued, stats.suppressed
    );

    // Links were dropped with their tasks, so the worker winds down
    if backend.worker.join().is_err() {
        warn!("Backend worker panicked");
    }
    Ok(())
}
