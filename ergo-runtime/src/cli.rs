//! Command line interface

use std::fs;
use std::path::{Path, PathBuf};

use clap::{Parser, Subcommand};

use ergo_core::plan::WorkoutPlan;
use ergo_protocol::{parse_plan_json, parse_workout_text, NotationError, WireError};

use crate::backend::BackendError;

/// Ergo: structured interval workouts with ERG trainer control
#[derive(Debug, Parser)]
#[command(name = "ergo")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Config file path (defaults to the embedded ergo.toml)
    #[arg(short, long, global = true, env = "ERGO_CONFIG")]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Ride a workout, driving the trainer through the sensor backend
    Ride {
        /// Workout file (JSON steps, or workout text notation)
        #[arg(short, long)]
        plan: PathBuf,

        /// FTP baseline in watts
        #[arg(long)]
        ftp: Option<f64>,

        /// Trainer to command instead of the detected one
        #[arg(long)]
        trainer: Option<String>,

        /// Start immediately and exit when the workout finishes
        #[arg(long, default_value_t = false)]
        autostart: bool,
    },

    /// Print each step's targets and zones without touching any device
    Preview {
        /// Workout file (JSON steps, or workout text notation)
        #[arg(short, long)]
        plan: PathBuf,

        /// FTP baseline in watts
        #[arg(long)]
        ftp: Option<f64>,
    },

    /// Convert workout text notation to JSON steps
    ParseText {
        /// Text file with one step per line
        file: PathBuf,
    },
}

/// Command failures
#[derive(Debug, thiserror::Error)]
pub enum CliError {
    #[error("failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("invalid workout JSON in {path}: {source}")]
    Wire {
        path: PathBuf,
        #[source]
        source: WireError,
    },
    #[error("invalid workout text in {path}: {source}")]
    Notation {
        path: PathBuf,
        #[source]
        source: NotationError,
    },
    #[error("workout {0} has no steps")]
    EmptyPlan(PathBuf),
    #[error("FTP must be a positive number of watts, got {0}")]
    InvalidFtp(f64),
    #[error("trainer name `{0}` is too long")]
    TrainerTooLong(String),
    #[error(transparent)]
    Backend(#[from] BackendError),
    #[error("failed to start console: {0}")]
    Console(#[source] std::io::Error),
    #[error("failed to serialize plan: {0}")]
    Serialize(#[source] WireError),
}

pub(crate) fn read_file(path: &Path) -> Result<String, CliError> {
    fs::read_to_string(path).map_err(|source| CliError::Io {
        path: path.to_path_buf(),
        source,
    })
}

fn is_json(path: &Path, text: &str) -> bool {
    match path.extension().and_then(|e| e.to_str()) {
        Some(ext) => ext.eq_ignore_ascii_case("json"),
        None => matches!(text.trim_start().chars().next(), Some('[' | '{')),
    }
}

/// Parse workout file contents
///
/// `.json` files (or extensionless files starting with `[` or `{`) are
/// step lists; anything else is read as workout text.
pub fn parse_plan(path: &Path, text: &str) -> Result<WorkoutPlan, CliError> {
    let plan = if is_json(path, text) {
        parse_plan_json(text).map_err(|source| CliError::Wire {
            path: path.to_path_buf(),
            source,
        })?
    } else {
        parse_workout_text(text).map_err(|source| CliError::Notation {
            path: path.to_path_buf(),
            source,
        })?
    };

    if plan.is_empty() {
        return Err(CliError::EmptyPlan(path.to_path_buf()));
    }
    Ok(plan)
}

/// Read and parse a workout file
pub fn read_plan(path: &Path) -> Result<WorkoutPlan, CliError> {
    parse_plan(path, &read_file(path)?)
}

/// Check an FTP given on the command line
pub fn check_ftp(ftp: Option<f64>) -> Result<Option<f64>, CliError> {
    match ftp {
        Some(watts) if !(watts.is_finite() && watts > 0.0) => Err(CliError::InvalidFtp(watts)),
        other => Ok(other),
    }
}
