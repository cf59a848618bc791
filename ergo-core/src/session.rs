//! Ride session
//!
//! Couples the sequencer to an explicitly owned ride context (FTP, trainer,
//! live readings, fallback policy). Every state change can be turned into a
//! [`TargetUpdate`] for the dispatcher and a [`Snapshot`] for display.

use crate::config::RideConfig;
use crate::erg::TargetUpdate;
use crate::events::Event;
use crate::plan::{CadenceTarget, PowerTarget, WorkoutPlan};
use crate::sequencer::{Phase, PlaybackState, Sequencer};
use crate::target::{classify, effective_ftp, preview_watts, target_watts, FallbackPolicy, Zone};
use crate::telemetry::{LiveReadings, TelemetrySnapshot};
use crate::DeviceId;

/// Inputs a ride depends on besides the plan
#[derive(Debug, Clone, PartialEq)]
pub struct RideContext {
    /// FTP baseline (watts)
    pub ftp_watts: f64,
    /// Trainer override; takes precedence over the detected trainer
    pub trainer: Option<DeviceId>,
    /// Latest merged telemetry
    pub live: LiveReadings,
    /// Target policy for steps without a usable power target
    pub fallback: FallbackPolicy,
}

impl RideContext {
    pub fn new(ftp_watts: f64) -> Self {
        Self {
            ftp_watts,
            trainer: None,
            live: LiveReadings::default(),
            fallback: FallbackPolicy::HALF_FTP,
        }
    }

    /// Build a context from configuration
    pub fn from_config(config: &RideConfig) -> Self {
        Self {
            ftp_watts: config.rider.ftp,
            trainer: config.erg.trainer.clone(),
            live: LiveReadings::default(),
            fallback: config.erg.fallback(),
        }
    }

    /// Trainer commands are addressed to
    pub fn active_trainer(&self) -> Option<&DeviceId> {
        self.trainer.as_ref().or(self.live.trainer.as_ref())
    }
}

/// Upcoming step summary
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct StepPreview {
    /// Step index
    pub index: usize,
    /// Power target
    pub target: PowerTarget,
    /// Wattage at the start of the step
    pub watts: u16,
    /// Duration (milliseconds)
    pub duration_ms: u32,
}

/// Pollable read-out of a ride
#[derive(Debug, Clone, PartialEq)]
pub struct Snapshot {
    /// Playback counters
    pub playback: PlaybackState,
    /// One-based step position and step count
    pub step_counter: (usize, usize),
    /// Completion of the current step (percent)
    pub step_progress_pct: f64,
    /// Completion of the plan (percent)
    pub workout_progress_pct: f64,
    /// Time left in the plan (milliseconds)
    pub time_remaining_ms: u64,
    /// Power target of the current step
    pub target: PowerTarget,
    /// Current target wattage
    pub target_watts: u16,
    /// Zone of the current target
    pub zone: Zone,
    /// Cadence hint of the current step
    pub cadence: CadenceTarget,
    /// Next step, if any
    pub next: Option<StepPreview>,
    /// Latest telemetry
    pub live: LiveReadings,
    /// Trainer commands are addressed to
    pub trainer: Option<DeviceId>,
    /// FTP baseline in use (watts)
    pub ftp_watts: f64,
}

/// A sequencer bound to its ride context
#[derive(Debug, Clone)]
pub struct WorkoutSession {
    sequencer: Sequencer,
    context: RideContext,
    run: u32,
}

impl WorkoutSession {
    pub fn new(plan: WorkoutPlan, quantum_ms: u32, context: RideContext) -> Self {
        Self {
            sequencer: Sequencer::new(plan, quantum_ms),
            context,
            run: 0,
        }
    }

    /// Build a session from configuration
    pub fn from_config(plan: WorkoutPlan, config: &RideConfig) -> Self {
        Self::new(plan, config.engine.tick_ms, RideContext::from_config(config))
    }

    pub fn sequencer(&self) -> &Sequencer {
        &self.sequencer
    }

    pub fn context(&self) -> &RideContext {
        &self.context
    }

    pub fn phase(&self) -> Phase {
        self.sequencer.phase()
    }

    // Transitions

    pub fn load(&mut self, plan: WorkoutPlan) -> Option<Event> {
        let event = self.sequencer.load(plan);
        self.observe(event)
    }

    pub fn start(&mut self) -> Option<Event> {
        let event = self.sequencer.start();
        self.observe(event)
    }

    pub fn pause(&mut self) -> Option<Event> {
        let event = self.sequencer.pause();
        self.observe(event)
    }

    pub fn resume(&mut self) -> Option<Event> {
        let event = self.sequencer.resume();
        self.observe(event)
    }

    pub fn skip(&mut self) -> Option<Event> {
        let event = self.sequencer.skip();
        self.observe(event)
    }

    pub fn reset(&mut self) -> Option<Event> {
        let event = self.sequencer.reset();
        self.observe(event)
    }

    pub fn tick(&mut self) -> Option<Event> {
        let event = self.sequencer.tick();
        self.observe(event)
    }

    fn observe(&mut self, event: Option<Event>) -> Option<Event> {
        if let Some(event) = event {
            if event.begins_run() {
                self.run = self.run.wrapping_add(1);
            }
        }
        event
    }

    // Context

    /// Change the FTP baseline; degenerate values fall back at computation
    pub fn set_ftp(&mut self, ftp_watts: f64) {
        self.context.ftp_watts = ftp_watts;
    }

    /// Merge a telemetry poll
    pub fn absorb_telemetry(&mut self, snapshot: &TelemetrySnapshot) {
        self.context.live.absorb(snapshot);
    }

    /// Pin the trainer, or clear the pin with `None`
    pub fn set_trainer_override(&mut self, trainer: Option<DeviceId>) {
        self.context.trainer = trainer;
    }

    // Read-outs

    /// Target wattage for the current instant
    ///
    /// Before the first start the first step's opening target is shown.
    /// An empty plan has no target.
    pub fn target_watts(&self) -> u16 {
        let Some(step) = self.sequencer.current_step() else {
            return 0;
        };

        if self.sequencer.state().has_started {
            target_watts(
                step,
                self.context.ftp_watts,
                self.sequencer.elapsed_in_step_ms(),
                self.context.fallback,
            )
        } else {
            preview_watts(step, self.context.ftp_watts, self.context.fallback)
        }
    }

    /// Zone of the current target
    pub fn zone(&self) -> Zone {
        classify(self.target_watts(), self.context.ftp_watts)
    }

    /// Number of times playback has been started
    pub fn run(&self) -> u32 {
        self.run
    }

    /// Message for the dispatcher describing the current target
    pub fn target_update(&self) -> TargetUpdate {
        let state = self.sequencer.state();
        let power_controlled = self
            .sequencer
            .current_step()
            .map(|step| step.target.is_power_controlled())
            .unwrap_or(false);

        TargetUpdate {
            step_index: state.step_index,
            watts: self.target_watts(),
            power_controlled,
            has_started: state.has_started,
            finished: state.is_finished(),
            run: self.run,
            trainer: self.context.active_trainer().cloned(),
        }
    }

    /// Full read-out of the ride
    pub fn snapshot(&self) -> Snapshot {
        let state = self.sequencer.state();
        let step = self.sequencer.current_step();
        let ftp = self.context.ftp_watts;

        let next = self.sequencer.next_step().map(|next| StepPreview {
            index: state.step_index + 1,
            target: next.target,
            watts: preview_watts(next, ftp, self.context.fallback),
            duration_ms: next.duration_ms,
        });

        Snapshot {
            playback: state,
            step_counter: self.sequencer.step_counter(),
            step_progress_pct: self.sequencer.step_progress_pct(),
            workout_progress_pct: self.sequencer.workout_progress_pct(),
            time_remaining_ms: self.sequencer.time_remaining_ms(),
            target: step.map(|s| s.target).unwrap_or_default(),
            target_watts: self.target_watts(),
            zone: self.zone(),
            cadence: step.map(|s| s.cadence_hint()).unwrap_or(CadenceTarget(None)),
            next,
            live: self.context.live.clone(),
            trainer: self.context.active_trainer().cloned(),
            ftp_watts: effective_ftp(ftp),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::device_id;
    use crate::plan::Step;
    use crate::telemetry::SensorReading;

    fn plan() -> WorkoutPlan {
        WorkoutPlan::from_steps(&[
            Step::fixed(75.0, 120.0).unwrap().with_cadence(90),
            Step::progressive(50.0, 80.0, 100.0).unwrap(),
            Step::free(60.0).unwrap(),
        ])
        .unwrap()
    }

    fn trainer_snapshot(name: &str, watts: u16) -> TelemetrySnapshot {
        let mut snapshot = TelemetrySnapshot::new();
        snapshot
            .push(
                device_id(name),
                SensorReading {
                    power_w: Some(watts),
                    ..Default::default()
                },
            )
            .unwrap();
        snapshot
    }

    #[test]
    fn test_idle_shows_first_step() {
        let session = WorkoutSession::new(plan(), 100, RideContext::new(250.0));
        assert_eq!(session.target_watts(), 188);

        let snapshot = session.snapshot();
        assert_eq!(snapshot.playback.phase, Phase::Idle);
        assert_eq!(snapshot.step_counter, (1, 3));
        assert_eq!(snapshot.cadence, CadenceTarget(Some(90)));
        assert_eq!(snapshot.next.map(|n| n.watts), Some(125));
    }

    #[test]
    fn test_progressive_target_follows_time() {
        let mut session = WorkoutSession::new(plan(), 1000, RideContext::new(200.0));
        session.start();
        session.skip();
        assert_eq!(session.target_watts(), 100);

        for _ in 0..15 {
            session.tick();
        }
        assert_eq!(session.target_watts(), 110);
        assert_eq!(session.zone(), Zone::Z1);
    }

    #[test]
    fn test_target_update_flags() {
        let mut session = WorkoutSession::new(plan(), 100, RideContext::new(250.0));
        session.absorb_telemetry(&trainer_snapshot("FitnessEquipment_5_7504", 180));

        let idle = session.target_update();
        assert!(!idle.has_started);
        assert!(!idle.is_eligible());
        assert_eq!(idle.run, 0);

        session.start();
        let first = session.target_update();
        assert_eq!(first.run, 1);
        assert!(first.is_eligible());
        assert_eq!(first.watts, 188);
        assert_eq!(first.trainer.as_deref(), Some("FitnessEquipment_5_7504"));

        session.reset();
        session.start();
        assert_eq!(session.target_update().run, 2);
    }

    #[test]
    fn test_trainer_override_wins() {
        let mut session = WorkoutSession::new(plan(), 100, RideContext::new(250.0));
        session.absorb_telemetry(&trainer_snapshot("PowerMeter_11_1", 180));
        session.set_trainer_override(Some(device_id("FitnessEquipment_5_7504")));

        assert_eq!(
            session.context().active_trainer().map(|t| t.as_str()),
            Some("FitnessEquipment_5_7504")
        );

        session.set_trainer_override(None);
        assert_eq!(
            session.context().active_trainer().map(|t| t.as_str()),
            Some("PowerMeter_11_1")
        );
    }

    #[test]
    fn test_set_ftp_rescales() {
        let mut session = WorkoutSession::new(plan(), 100, RideContext::new(250.0));
        session.start();
        assert_eq!(session.target_watts(), 188);

        session.set_ftp(300.0);
        assert_eq!(session.target_watts(), 225);

        session.set_ftp(0.0);
        assert_eq!(session.target_watts(), 188);
        assert_eq!(session.snapshot().ftp_watts, 250.0);
    }

    #[test]
    fn test_free_step_not_power_controlled() {
        let mut session = WorkoutSession::new(plan(), 100, RideContext::new(250.0));
        session.absorb_telemetry(&trainer_snapshot("FitnessEquipment_5_7504", 180));
        session.start();
        session.skip();
        session.skip();

        let update = session.target_update();
        assert_eq!(update.step_index, 2);
        assert_eq!(update.watts, 125);
        assert!(!update.power_controlled);
        assert!(!update.is_eligible());
        assert_eq!(session.snapshot().target, PowerTarget::Free);
        assert!(session.snapshot().next.is_none());
    }

    #[test]
    fn test_empty_plan() {
        let mut session = WorkoutSession::new(WorkoutPlan::new(), 100, RideContext::new(250.0));
        assert_eq!(session.start(), None);
        assert_eq!(session.target_watts(), 0);

        let snapshot = session.snapshot();
        assert_eq!(snapshot.step_counter, (0, 1));
        assert_eq!(snapshot.target, PowerTarget::Free);
        assert_eq!(snapshot.zone, Zone::Z1);
    }

    #[test]
    fn test_from_config() {
        let mut config = RideConfig::default();
        config.rider.ftp = 200.0;
        config.engine.tick_ms = 1000;
        config.erg.trainer = Some(device_id("FitnessEquipment_5_7504"));

        let session = WorkoutSession::from_config(plan(), &config);
        assert_eq!(session.sequencer().quantum_ms(), 1000);
        assert_eq!(session.target_watts(), 150);
        assert!(session.context().active_trainer().is_some());
    }
}
