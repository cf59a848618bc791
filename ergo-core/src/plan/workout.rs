//! Ordered workout plans

use heapless::Vec;

use super::{PlanError, Step};

/// Maximum steps per plan
pub const MAX_STEPS: usize = 128;

/// An ordered list of steps, immutable once built
#[derive(Debug, Clone, PartialEq, Default)]
pub struct WorkoutPlan {
    steps: Vec<Step, MAX_STEPS>,
}

impl WorkoutPlan {
    /// Create an empty plan
    pub const fn new() -> Self {
        Self { steps: Vec::new() }
    }

    /// Build a plan from a slice of steps
    pub fn from_steps(steps: &[Step]) -> Result<Self, PlanError> {
        let mut plan = Self::new();
        for step in steps {
            plan.push(*step)?;
        }
        Ok(plan)
    }

    /// Append a step while building the plan
    pub fn push(&mut self, step: Step) -> Result<(), PlanError> {
        self.steps.push(step).map_err(|_| PlanError::TooManySteps)
    }

    /// All steps in order
    pub fn steps(&self) -> &[Step] {
        &self.steps
    }

    /// Step at `index`
    pub fn step(&self, index: usize) -> Option<&Step> {
        self.steps.get(index)
    }

    /// Step following `index`, if any
    pub fn next_step(&self, index: usize) -> Option<&Step> {
        index.checked_add(1).and_then(|next| self.steps.get(next))
    }

    /// Number of steps
    pub fn len(&self) -> usize {
        self.steps.len()
    }

    /// Check if the plan has no steps
    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }

    /// Sum of all step durations (milliseconds)
    pub fn total_duration_ms(&self) -> u64 {
        self.steps.iter().map(|s| s.duration_ms as u64).sum()
    }

    /// Sum of the durations of the steps before `index` (milliseconds)
    pub fn offset_of(&self, index: usize) -> u64 {
        self.steps
            .iter()
            .take(index)
            .map(|s| s.duration_ms as u64)
            .sum()
    }
}
