//! Workout plan model
//!
//! A plan is an ordered, immutable list of timed steps. Each step carries
//! at most one power target (fixed or progressive) and an optional cadence
//! target.

pub mod step;
pub mod workout;

pub use step::{CadenceTarget, PowerTarget, ProgressiveRange, Step};
pub use workout::{WorkoutPlan, MAX_STEPS};

use core::fmt;

/// Errors raised while building steps or plans
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlanError {
    /// Step duration is NaN or infinite
    NonFiniteDuration,
    /// Step duration is below zero
    NegativeDuration,
    /// A percentage of FTP is NaN or infinite
    NonFinitePercent,
    /// Plan exceeds [`MAX_STEPS`]
    TooManySteps,
}

impl fmt::Display for PlanError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PlanError::NonFiniteDuration => f.write_str("step duration is not a finite number"),
            PlanError::NegativeDuration => f.write_str("step duration is negative"),
            PlanError::NonFinitePercent => f.write_str("FTP percentage is not a finite number"),
            PlanError::TooManySteps => write!(f, "plan has more than {} steps", MAX_STEPS),
        }
    }
}
