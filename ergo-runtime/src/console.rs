//! Line commands and status output
//!
//! Commands are read from stdin one per line:
//!
//! ```text
//! start | pause (stop) | resume | skip | reset | status | quit
//! ftp <watts>
//! trainer <device>|auto
//! ```

use std::fmt::Write as _;
use std::io::BufRead;
use std::thread;

use log::{debug, warn};

use ergo_core::events::Event;
use ergo_core::plan::PowerTarget;
use ergo_core::sequencer::Phase;
use ergo_core::session::Snapshot;
use ergo_core::target::ZoneTier;
use ergo_core::{device_id, DeviceId, MAX_DEVICE_ID_LEN};

use crate::channels::BUS;

/// Command entered by the rider
#[derive(Debug, Clone, PartialEq)]
pub enum UserCommand {
    Start,
    Pause,
    Resume,
    Skip,
    Reset,
    /// Change the FTP baseline (watts)
    Ftp(f64),
    /// Pin the trainer, or return to detection with `None`
    Trainer(Option<DeviceId>),
    /// Print the current status
    Status,
    Quit,
}

/// Command line parse errors
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum CommandError {
    #[error("empty command")]
    Empty,
    #[error("unknown command `{0}`")]
    Unknown(String),
    #[error("`{0}` needs an argument")]
    MissingArgument(&'static str),
    #[error("invalid FTP `{0}`, expected a positive number of watts")]
    InvalidFtp(String),
    #[error("trainer name longer than {} bytes", MAX_DEVICE_ID_LEN)]
    TrainerTooLong,
}

/// Parse one console line
pub fn parse_command(line: &str) -> Result<UserCommand, CommandError> {
    let mut words = line.split_whitespace();
    let Some(verb) = words.next() else {
        return Err(CommandError::Empty);
    };

    let command = match verb.to_ascii_lowercase().as_str() {
        "start" => UserCommand::Start,
        "pause" | "stop" => UserCommand::Pause,
        "resume" => UserCommand::Resume,
        "skip" => UserCommand::Skip,
        "reset" => UserCommand::Reset,
        "status" => UserCommand::Status,
        "quit" | "exit" => UserCommand::Quit,
        "ftp" => {
            let value = words.next().ok_or(CommandError::MissingArgument("ftp"))?;
            match value.parse::<f64>() {
                Ok(watts) if watts.is_finite() && watts > 0.0 => UserCommand::Ftp(watts),
                _ => return Err(CommandError::InvalidFtp(value.to_string())),
            }
        }
        "trainer" => {
            let name = words
                .next()
                .ok_or(CommandError::MissingArgument("trainer"))?;
            if name.eq_ignore_ascii_case("auto") {
                UserCommand::Trainer(None)
            } else if name.len() > MAX_DEVICE_ID_LEN {
                return Err(CommandError::TrainerTooLong);
            } else {
                UserCommand::Trainer(Some(device_id(name)))
            }
        }
        other => return Err(CommandError::Unknown(other.to_string())),
    };

    Ok(command)
}

/// Spawn the thread feeding stdin lines into the command channel
///
/// The thread ends after `quit` or at end of input.
pub fn spawn_stdin_reader() -> std::io::Result<thread::JoinHandle<()>> {
    thread::Builder::new()
        .name("ergo-console".to_string())
        .spawn(|| {
            let stdin = std::io::stdin();
            for line in stdin.lock().lines() {
                let line = match line {
                    Ok(line) => line,
                    Err(e) => {
                        warn!("Console read failed: {}", e);
                        break;
                    }
                };
                if line.trim().is_empty() {
                    continue;
                }

                match parse_command(&line) {
                    Ok(command) => {
                        let quit = command == UserCommand::Quit;
                        if let Err(e) = BUS.commands.try_send(command) {
                            warn!("Command queue full, dropped {:?}", e);
                        }
                        if quit {
                            break;
                        }
                    }
                    Err(e) => println!("{}", e),
                }
            }
            debug!("Console reader finished");
        })
}

fn clock(ms: u64) -> String {
    let seconds = ms.div_ceil(1000);
    format!("{:02}:{:02}", seconds / 60, seconds % 60)
}

fn phase_label(phase: Phase) -> &'static str {
    match phase {
        Phase::Idle => "idle",
        Phase::Running => "running",
        Phase::Paused => "paused",
        Phase::Finished => "finished",
    }
}

fn tier_label(tier: ZoneTier) -> &'static str {
    match tier {
        ZoneTier::Success => "easy",
        ZoneTier::Primary => "steady",
        ZoneTier::Warning => "hard",
        ZoneTier::Danger => "max",
    }
}

/// One-line status read-out
pub fn format_status(snapshot: &Snapshot) -> String {
    let (position, count) = snapshot.step_counter;
    let progress = if snapshot.playback.has_started {
        format!(
            "step {}/{} {:.1} s left, {:.1} s in",
            position,
            count,
            snapshot.playback.time_left_s(),
            snapshot.playback.elapsed_s()
        )
    } else {
        format!("{} steps, {} total", count, clock(snapshot.time_remaining_ms))
    };

    let mut line = format!(
        "[{}] {} | {} W {} {} ({}) | {} | {:.1}%",
        phase_label(snapshot.playback.phase),
        progress,
        snapshot.target_watts,
        snapshot.zone,
        tier_label(snapshot.zone.tier()),
        snapshot.target,
        snapshot.cadence,
        snapshot.workout_progress_pct,
    );

    let live = &snapshot.live;
    if let Some(watts) = live.power_w {
        let _ = write!(line, " | power {} W", watts);
    }
    if let Some(rpm) = live.cadence_rpm {
        let _ = write!(line, " | cadence {} rpm", rpm);
    }
    if let Some(bpm) = live.heart_rate_bpm {
        let _ = write!(line, " | hr {} bpm", bpm);
    }

    if let Some(next) = &snapshot.next {
        let _ = write!(
            line,
            " | next {} W for {}",
            next.watts,
            clock(next.duration_ms as u64)
        );
    }

    line
}

/// Announcement for a playback event
pub fn format_event(event: &Event, snapshot: &Snapshot) -> String {
    match event {
        Event::Started => format!("Workout started, {} to go", clock(snapshot.time_remaining_ms)),
        Event::Paused => "Paused".to_string(),
        Event::Resumed => "Resumed".to_string(),
        Event::Reset => "Reset".to_string(),
        Event::StepAdvanced { index } => {
            let kind = match snapshot.target {
                PowerTarget::Free => "free ride",
                PowerTarget::Fixed(_) => "steady",
                PowerTarget::Progressive(_) => "ramp",
            };
            format!("Step {} ({}): {}", index + 1, kind, snapshot.target)
        }
        Event::Finished => "Workout complete".to_string(),
    }
}
