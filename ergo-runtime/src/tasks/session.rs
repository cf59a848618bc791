//! Session task
//!
//! Owns the [`WorkoutSession`]. Applies console commands, ticks playback
//! while running and merges telemetry. After every change the current
//! target goes to the ERG task; events and status requests go to the
//! console.

use embassy_futures::select::{select3, Either3};
use embassy_time::{Duration, Ticker};
use log::{debug, info, trace};

use ergo_core::events::Event;
use ergo_core::sequencer::Phase;
use ergo_core::session::WorkoutSession;

use crate::channels::{Bus, StatusReport};
use crate::console::UserCommand;

/// Session task behaviour
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct SessionOptions {
    /// Start immediately and shut down once the workout finishes
    pub autostart: bool,
}

fn apply(session: &mut WorkoutSession, command: &UserCommand) -> Option<Event> {
    match command {
        UserCommand::Start => session.start(),
        UserCommand::Pause => session.pause(),
        UserCommand::Resume => session.resume(),
        UserCommand::Skip => session.skip(),
        UserCommand::Reset => session.reset(),
        UserCommand::Ftp(watts) => {
            info!("FTP set to {} W", watts);
            session.set_ftp(*watts);
            None
        }
        UserCommand::Trainer(Some(trainer)) => {
            info!("Trainer pinned to {}", trainer);
            session.set_trainer_override(Some(trainer.clone()));
            None
        }
        UserCommand::Trainer(None) => {
            info!("Trainer detected from telemetry");
            session.set_trainer_override(None);
            None
        }
        UserCommand::Status | UserCommand::Quit => None,
    }
}

fn log_event(session: &WorkoutSession, event: Event) {
    if event.is_transition() {
        info!("Event: {:?}", event);
    } else {
        debug!("Event: {:?}", event);
    }
    if event.changes_step() && !event.ends_run() {
        let update = session.target_update();
        info!("Step {}: {} W", update.step_index + 1, update.watts);
    }
}

fn report(bus: &Bus, session: &WorkoutSession, event: Option<Event>) {
    bus.status.signal(StatusReport {
        event,
        snapshot: session.snapshot(),
    });
}

/// Session task - playback coordination loop
///
/// Returns after `quit`, or after the workout finishes when started with
/// [`SessionOptions::autostart`]. Every other task is asked to stop first.
pub async fn session_task(bus: &Bus, mut session: WorkoutSession, options: SessionOptions) {
    info!(
        "Session task started: {} steps, {} s",
        session.sequencer().plan().len(),
        session.sequencer().total_ms() / 1000
    );

    let quantum = Duration::from_millis(session.sequencer().quantum_ms() as u64);
    let mut ticker: Option<Ticker> = None;

    let opening = if options.autostart {
        session.start()
    } else {
        None
    };
    if let Some(event) = opening {
        log_event(&session, event);
    }
    report(bus, &session, opening);

    loop {
        // Ticker only exists while running, so pause and reset stop ticks
        // before the next wait
        let running = session.phase() == Phase::Running;
        match (running, ticker.is_some()) {
            (true, false) => ticker = Some(Ticker::every(quantum)),
            (false, true) => ticker = None,
            _ => {}
        }

        bus.targets.signal(session.target_update());

        if options.autostart && session.phase() == Phase::Finished {
            info!("Workout finished, shutting down");
            break;
        }

        let next_tick = async {
            match ticker.as_mut() {
                Some(ticker) => ticker.next().await,
                None => core::future::pending::<()>().await,
            }
        };

        match select3(bus.commands.receive(), next_tick, bus.telemetry.wait()).await {
            Either3::First(command) => {
                debug!("Command: {:?}", command);
                if command == UserCommand::Quit {
                    info!("Quit requested");
                    break;
                }

                let event = apply(&mut session, &command);
                if event.is_none() && command_changes_phase(&command) {
                    info!("{:?} ignored while {:?}", command, session.phase());
                }
                if let Some(event) = event {
                    log_event(&session, event);
                }
                report(bus, &session, event);
            }

            Either3::Second(()) => {
                if let Some(event) = session.tick() {
                    debug_assert!(!event.is_user_event());
                    log_event(&session, event);
                    report(bus, &session, Some(event));
                } else {
                    trace!("Tick: {:?}", session.sequencer().state());
                }
            }

            Either3::Third(snapshot) => {
                trace!("Telemetry from {} sensors", snapshot.len());
                session.absorb_telemetry(&snapshot);
            }
        }
    }

    bus.shutdown();
    info!("Session task stopped");
}

fn command_changes_phase(command: &UserCommand) -> bool {
    matches!(
        command,
        UserCommand::Start
            | UserCommand::Pause
            | UserCommand::Resume
            | UserCommand::Skip
            | UserCommand::Reset
    )
}
