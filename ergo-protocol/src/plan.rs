//! Workout definition JSON

use ergo_core::plan::{PowerTarget, ProgressiveRange, Step, WorkoutPlan};
use serde::{Deserialize, Serialize};

use crate::error::{StepError, WireError};

/// Progressive range as serialized
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RangeRecord {
    pub from: f64,
    pub to: f64,
}

/// One step as serialized
///
/// At most one of `ftp_percent` and `progressive_range` may be set; both
/// absent denotes a free step.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct StepRecord {
    #[serde(default)]
    pub ftp_percent: Option<f64>,
    /// Duration in seconds
    pub duration: f64,
    #[serde(default)]
    pub rpm: Option<u16>,
    #[serde(default)]
    pub progressive_range: Option<RangeRecord>,
}

impl TryFrom<StepRecord> for Step {
    type Error = StepError;

    fn try_from(record: StepRecord) -> Result<Self, Self::Error> {
        if !(record.duration.is_finite() && record.duration > 0.0) {
            return Err(StepError::InvalidDuration(record.duration));
        }

        let target = match (record.ftp_percent, record.progressive_range) {
            (Some(_), Some(_)) => return Err(StepError::AmbiguousTarget),
            (Some(percent), None) => PowerTarget::Fixed(percent),
            (None, Some(range)) => PowerTarget::Progressive(ProgressiveRange {
                from: range.from,
                to: range.to,
            }),
            (None, None) => PowerTarget::Free,
        };

        let step = Step::new(record.duration, target).map_err(StepError::Invalid)?;
        Ok(match record.rpm {
            Some(rpm) => step.with_cadence(rpm),
            None => step,
        })
    }
}

impl From<&Step> for StepRecord {
    fn from(step: &Step) -> Self {
        let (ftp_percent, progressive_range) = match step.target {
            PowerTarget::Fixed(percent) => (Some(percent), None),
            PowerTarget::Progressive(range) => (
                None,
                Some(RangeRecord {
                    from: range.from,
                    to: range.to,
                }),
            ),
            PowerTarget::Free => (None, None),
        };

        Self {
            ftp_percent,
            duration: step.duration_s(),
            rpm: step.cadence_rpm,
            progressive_range,
        }
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum PlanDocument {
    Steps(Vec<StepRecord>),
    Wrapped { steps: Vec<StepRecord> },
}

impl PlanDocument {
    fn into_records(self) -> Vec<StepRecord> {
        match self {
            PlanDocument::Steps(steps) | PlanDocument::Wrapped { steps } => steps,
        }
    }
}

/// Build a plan from step records
pub fn plan_from_records(records: &[StepRecord]) -> Result<WorkoutPlan, WireError> {
    let mut plan = WorkoutPlan::new();
    for (index, record) in records.iter().enumerate() {
        let step = Step::try_from(*record).map_err(|source| WireError::Step { index, source })?;
        plan.push(step).map_err(WireError::Plan)?;
    }
    Ok(plan)
}

/// Parse a workout definition
pub fn parse_plan_json(text: &str) -> Result<WorkoutPlan, WireError> {
    let document: PlanDocument = serde_json::from_str(text)?;
    plan_from_records(&document.into_records())
}

/// Serialize a plan as a pretty-printed step array
pub fn plan_to_json(plan: &WorkoutPlan) -> Result<String, WireError> {
    let records: Vec<StepRecord> = plan.steps().iter().map(StepRecord::from).collect();
    Ok(serde_json::to_string_pretty(&records)?)
}
