//! Playback state

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Playback phase
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum Phase {
    /// Not started, or reset
    #[default]
    Idle,
    /// Ticking
    Running,
    /// Paused by user
    Paused,
    /// All steps done
    Finished,
}

/// Playback counters
///
/// Owned by the [`Sequencer`](super::Sequencer); callers only ever see
/// copies.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct PlaybackState {
    /// Index of the current step
    pub step_index: usize,
    /// Time left in the current step (milliseconds)
    pub time_left_ms: u32,
    /// Time elapsed since start, clamped to the plan duration (milliseconds)
    pub elapsed_ms: u64,
    /// Current phase
    pub phase: Phase,
    /// Set by start, cleared by reset
    pub has_started: bool,
}

impl PlaybackState {
    /// Time left in the current step, in seconds to one decimal place
    pub fn time_left_s(&self) -> f64 {
        tenths(self.time_left_ms as u64)
    }

    /// Elapsed time, in seconds to one decimal place
    pub fn elapsed_s(&self) -> f64 {
        tenths(self.elapsed_ms)
    }

    /// Check if ticks are being applied
    pub fn is_running(&self) -> bool {
        self.phase == Phase::Running
    }

    /// Check if the run has completed
    pub fn is_finished(&self) -> bool {
        self.phase == Phase::Finished
    }
}

/// Milliseconds to seconds, rounded half up to 0.1 s
fn tenths(ms: u64) -> f64 {
    (ms.saturating_add(50) / 100) as f64 / 10.0
}
