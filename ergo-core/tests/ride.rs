//! Whole-ride scenarios driven through the session and dispatcher

use ergo_core::device_id;
use ergo_core::erg::ErgDispatcher;
use ergo_core::events::Event;
use ergo_core::plan::{Step, WorkoutPlan};
use ergo_core::sequencer::{Phase, Sequencer};
use ergo_core::session::{RideContext, WorkoutSession};
use ergo_core::target::{classify, target_watts, FallbackPolicy, Zone};
use ergo_core::telemetry::{SensorReading, TelemetrySnapshot};

fn trainer_poll() -> TelemetrySnapshot {
    let mut snapshot = TelemetrySnapshot::new();
    snapshot
        .push(
            device_id("FitnessEquipment_5_7504"),
            SensorReading {
                power_w: Some(150),
                cadence_rpm: Some(88),
                heart_rate_bpm: None,
            },
        )
        .unwrap();
    snapshot
}

/// Run a session to completion, returning the wattage of every command
fn ride(session: &mut WorkoutSession, dispatcher: &mut ErgDispatcher) -> Vec<u16> {
    let mut issued = Vec::new();

    session.start();
    if let Some(command) = dispatcher.offer(&session.target_update()) {
        issued.push(command.watts);
        dispatcher.settle(command.generation);
    }

    while session.phase() == Phase::Running {
        session.tick();
        if let Some(command) = dispatcher.offer(&session.target_update()) {
            issued.push(command.watts);
            dispatcher.settle(command.generation);
        }
    }

    issued
}

fn mixed_plan() -> WorkoutPlan {
    WorkoutPlan::from_steps(&[
        Step::fixed(50.0, 20.0).unwrap(),
        Step::progressive(50.0, 60.0, 30.0).unwrap(),
        Step::free(10.0).unwrap(),
    ])
    .unwrap()
}

#[test]
fn fixed_step_target() {
    let step = Step::fixed(75.0, 120.0).unwrap();
    assert_eq!(target_watts(&step, 250.0, 0, FallbackPolicy::HALF_FTP), 188);
}

#[test]
fn progressive_step_target() {
    let step = Step::progressive(50.0, 80.0, 100.0).unwrap();
    let policy = FallbackPolicy::HALF_FTP;
    assert_eq!(target_watts(&step, 200.0, 0, policy), 100);
    assert_eq!(target_watts(&step, 200.0, 15_000, policy), 110);
    assert_eq!(target_watts(&step, 200.0, 100_000, policy), 160);
}

#[test]
fn zone_of_target() {
    assert_eq!(classify(130, 200.0), Zone::Z2);
}

#[test]
fn counters_across_step_boundary() {
    let plan = WorkoutPlan::from_steps(&[
        Step::fixed(60.0, 10.0).unwrap(),
        Step::fixed(70.0, 5.0).unwrap(),
    ])
    .unwrap();
    let mut seq = Sequencer::new(plan, 1000);
    seq.start();
    for _ in 0..12 {
        seq.tick();
    }

    let state = seq.state();
    assert_eq!(state.step_index, 1);
    assert_eq!(state.elapsed_ms, 12_000);
    assert_eq!(state.time_left_ms, 3_000);
}

#[test]
fn repeated_target_issues_one_command() {
    let plan = WorkoutPlan::from_steps(&[
        Step::free(10.0).unwrap(),
        Step::free(10.0).unwrap(),
        Step::fixed(75.0, 60.0).unwrap(),
    ])
    .unwrap();
    let mut session = WorkoutSession::new(plan, 1000, RideContext::new(200.0));
    session.absorb_telemetry(&trainer_poll());
    session.start();
    session.skip();
    session.skip();

    let mut dispatcher = ErgDispatcher::new();
    session.tick();
    let first = dispatcher.offer(&session.target_update());
    session.tick();
    let second = dispatcher.offer(&session.target_update());

    let command = first.unwrap();
    assert_eq!(command.step_index, 2);
    assert_eq!(command.watts, 150);
    assert!(second.is_none());
    assert_eq!(dispatcher.stats().issued, 1);
}

#[test]
fn full_ride_commands() {
    let mut session = WorkoutSession::new(mixed_plan(), 1000, RideContext::new(200.0));
    session.absorb_telemetry(&trainer_poll());
    let mut dispatcher = ErgDispatcher::new();

    let issued = ride(&mut session, &mut dispatcher);

    assert_eq!(issued, vec![100, 100, 110, 120]);
    assert_eq!(session.phase(), Phase::Finished);
    assert_eq!(session.sequencer().state().elapsed_ms, 60_000);
    assert_eq!(session.snapshot().workout_progress_pct, 100.0);
}

#[test]
fn restart_reissues_first_target() {
    let mut session = WorkoutSession::new(mixed_plan(), 1000, RideContext::new(200.0));
    session.absorb_telemetry(&trainer_poll());
    let mut dispatcher = ErgDispatcher::new();

    let first = ride(&mut session, &mut dispatcher);
    let second = ride(&mut session, &mut dispatcher);

    assert_eq!(first, second);
    assert_eq!(dispatcher.stats().issued, 8);
}

#[test]
fn no_trainer_no_commands() {
    let mut session = WorkoutSession::new(mixed_plan(), 1000, RideContext::new(200.0));
    let mut dispatcher = ErgDispatcher::new();

    assert!(ride(&mut session, &mut dispatcher).is_empty());
    assert_eq!(session.phase(), Phase::Finished);
}

#[test]
fn pause_holds_counters() {
    let mut session = WorkoutSession::new(mixed_plan(), 1000, RideContext::new(200.0));
    session.start();
    for _ in 0..5 {
        session.tick();
    }
    assert_eq!(session.pause(), Some(Event::Paused));

    let paused = session.sequencer().state();
    for _ in 0..5 {
        assert_eq!(session.tick(), None);
    }
    assert_eq!(session.sequencer().state(), paused);

    session.resume();
    session.tick();
    assert_eq!(session.sequencer().state().elapsed_ms, 6_000);
}

#[test]
fn finished_reported_once() {
    let mut session = WorkoutSession::new(mixed_plan(), 1000, RideContext::new(200.0));
    session.start();

    let mut finished = 0;
    for _ in 0..200 {
        if session.tick() == Some(Event::Finished) {
            finished += 1;
        }
    }
    assert_eq!(finished, 1);
    assert_eq!(session.resume(), None);
}
