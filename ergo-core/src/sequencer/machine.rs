//! Playback state machine
//!
//! Phases: Idle → Running ⇄ Paused → Finished, with `reset` returning to
//! Idle from anywhere and `start` restarting from anywhere. Every
//! operation that changes state returns the resulting [`Event`]; invalid
//! requests are no-ops returning `None`.

use crate::events::Event;
use crate::plan::{Step, WorkoutPlan};

use super::playback::{Phase, PlaybackState};

/// Default tick quantum (milliseconds)
pub const DEFAULT_QUANTUM_MS: u32 = 100;

/// Step sequencer
///
/// Keeps two counters: time left in the current step and total elapsed
/// time. They are advanced independently on every tick; when the total
/// reaches the plan duration the run finishes even if the step counter
/// has not caught up.
#[derive(Debug, Clone)]
pub struct Sequencer {
    /// Plan being played
    plan: WorkoutPlan,
    /// Cached sum of step durations
    total_ms: u64,
    /// Tick quantum (milliseconds)
    quantum_ms: u32,
    /// Playback counters
    state: PlaybackState,
}

impl Sequencer {
    /// Create a sequencer for a plan
    ///
    /// A zero quantum is raised to 1 ms.
    pub fn new(plan: WorkoutPlan, quantum_ms: u32) -> Self {
        let total_ms = plan.total_duration_ms();
        Self {
            plan,
            total_ms,
            quantum_ms: quantum_ms.max(1),
            state: PlaybackState::default(),
        }
    }

    /// Replace the plan and return to idle
    pub fn load(&mut self, plan: WorkoutPlan) -> Option<Event> {
        self.total_ms = plan.total_duration_ms();
        self.plan = plan;
        self.reset()
    }

    /// Plan being played
    pub fn plan(&self) -> &WorkoutPlan {
        &self.plan
    }

    /// Copy of the playback counters
    pub fn state(&self) -> PlaybackState {
        self.state
    }

    /// Current phase
    pub fn phase(&self) -> Phase {
        self.state.phase
    }

    /// Tick quantum (milliseconds)
    pub fn quantum_ms(&self) -> u32 {
        self.quantum_ms
    }

    /// Plan duration (milliseconds)
    pub fn total_ms(&self) -> u64 {
        self.total_ms
    }

    /// Current step, if the plan has any
    pub fn current_step(&self) -> Option<&Step> {
        self.plan.step(self.state.step_index)
    }

    /// Step after the current one
    pub fn next_step(&self) -> Option<&Step> {
        self.plan.next_step(self.state.step_index)
    }

    /// Start (or restart) from the first step
    ///
    /// Valid from any phase. An empty plan leaves the sequencer idle.
    pub fn start(&mut self) -> Option<Event> {
        let first = self.plan.step(0)?;

        self.state = PlaybackState {
            step_index: 0,
            time_left_ms: first.duration_ms,
            elapsed_ms: 0,
            phase: Phase::Running,
            has_started: true,
        };
        Some(Event::Started)
    }

    /// Pause playback
    pub fn pause(&mut self) -> Option<Event> {
        if self.state.phase == Phase::Running {
            self.state.phase = Phase::Paused;
            Some(Event::Paused)
        } else {
            None
        }
    }

    /// Resume playback after a pause
    pub fn resume(&mut self) -> Option<Event> {
        if self.state.phase == Phase::Paused && self.state.has_started {
            self.state.phase = Phase::Running;
            Some(Event::Resumed)
        } else {
            None
        }
    }

    /// Advance to the next step on demand
    ///
    /// Elapsed time is moved to the start of the new step so both counters
    /// agree again. Skipping the last step finishes the run.
    pub fn skip(&mut self) -> Option<Event> {
        if self.state.phase != Phase::Running {
            return None;
        }

        let next_index = self.state.step_index + 1;
        match self.plan.step(next_index) {
            Some(next) => {
                self.state.step_index = next_index;
                self.state.time_left_ms = next.duration_ms;
                self.state.elapsed_ms = self.plan.offset_of(next_index).min(self.total_ms);
                Some(Event::StepAdvanced { index: next_index })
            }
            None => Some(self.finish()),
        }
    }

    /// Return to idle defaults
    pub fn reset(&mut self) -> Option<Event> {
        self.state = PlaybackState::default();
        Some(Event::Reset)
    }

    /// Apply one quantum of playback time
    ///
    /// Ignored unless running. Returns `StepAdvanced` when a step boundary
    /// was crossed and `Finished` when the run completed on this tick.
    pub fn tick(&mut self) -> Option<Event> {
        if self.state.phase != Phase::Running {
            return None;
        }

        let quantum = self.quantum_ms;
        let mut event = None;

        // Step-local counter: a step is complete once what is left is at or
        // below half a quantum
        let remaining = self.state.time_left_ms.saturating_sub(quantum);
        if (remaining as u64) * 2 <= quantum as u64 {
            let next_index = self.state.step_index + 1;
            match self.plan.step(next_index) {
                Some(next) => {
                    self.state.step_index = next_index;
                    self.state.time_left_ms = next.duration_ms;
                    event = Some(Event::StepAdvanced { index: next_index });
                }
                None => return Some(self.finish()),
            }
        } else {
            self.state.time_left_ms = remaining;
        }

        // Total counter: reaching the plan duration wins over the step counter
        self.state.elapsed_ms = self
            .state
            .elapsed_ms
            .saturating_add(quantum as u64)
            .min(self.total_ms);
        if self.state.elapsed_ms >= self.total_ms {
            return Some(self.finish());
        }

        event
    }

    fn finish(&mut self) -> Event {
        self.state.phase = Phase::Finished;
        self.state.time_left_ms = 0;
        self.state.elapsed_ms = self.total_ms;
        Event::Finished
    }

    /// Time spent in the current step, measured against whole seconds left
    ///
    /// The time left is rounded to the nearest second before subtracting,
    /// so a progressive staircase steps on whole-second boundaries.
    pub fn elapsed_in_step_ms(&self) -> u32 {
        let Some(step) = self.current_step() else {
            return 0;
        };
        let left_rounded = (self.state.time_left_ms.saturating_add(500) / 1000).saturating_mul(1000);
        step.duration_ms.saturating_sub(left_rounded)
    }

    /// Completion of the current step in percent
    pub fn step_progress_pct(&self) -> f64 {
        match self.current_step() {
            Some(step) if step.duration_ms > 0 => {
                100.0 - (self.state.time_left_ms as f64 / step.duration_ms as f64) * 100.0
            }
            _ => 0.0,
        }
    }

    /// Completion of the whole plan in percent
    pub fn workout_progress_pct(&self) -> f64 {
        if self.total_ms == 0 {
            return 0.0;
        }
        (self.state.elapsed_ms as f64 / self.total_ms as f64) * 100.0
    }

    /// Time left in the whole plan (milliseconds)
    pub fn time_remaining_ms(&self) -> u64 {
        self.total_ms.saturating_sub(self.state.elapsed_ms)
    }

    /// One-based position of the current step and the step count
    ///
    /// The count is never reported below one.
    pub fn step_counter(&self) -> (usize, usize) {
        let len = self.plan.len();
        ((self.state.step_index + 1).min(len), len.max(1))
    }
}
