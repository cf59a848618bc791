//! Timed workout steps

use core::fmt;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use super::PlanError;

/// Progressive power range, both ends in percent of FTP
///
/// The target climbs from `from` towards `to` in fixed increments over the
/// step's duration. `to` below `from` is accepted as-is.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct ProgressiveRange {
    /// Starting percentage of FTP
    pub from: f64,
    /// Ceiling percentage of FTP
    pub to: f64,
}

/// Power target of a step
///
/// A step carries exactly one of these. Fixed and progressive targets are
/// mutually exclusive by construction.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum PowerTarget {
    /// Constant percentage of FTP
    Fixed(f64),
    /// Staircase from one percentage to another
    Progressive(ProgressiveRange),
    /// No power target (free ride or recovery)
    #[default]
    Free,
}

impl PowerTarget {
    /// Whether the trainer should be driven in ERG mode for this target
    pub fn is_power_controlled(&self) -> bool {
        !matches!(self, PowerTarget::Free)
    }
}

impl fmt::Display for PowerTarget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PowerTarget::Fixed(percent) => write!(f, "{}% FTP", percent),
            PowerTarget::Progressive(range) => write!(f, "{}% → {}% FTP", range.from, range.to),
            PowerTarget::Free => f.write_str("Recovery ride"),
        }
    }
}

/// Cadence target of a step, for display
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CadenceTarget(pub Option<u16>);

impl fmt::Display for CadenceTarget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.0 {
            Some(rpm) => write!(f, "Aim for {} rpm", rpm),
            None => f.write_str("Free cadence"),
        }
    }
}

/// A single timed step
///
/// Durations are held in whole milliseconds so playback counters stay
/// integer and cannot drift against each other.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Step {
    /// Duration in milliseconds
    pub duration_ms: u32,
    /// Power target
    pub target: PowerTarget,
    /// Cadence target in rpm
    pub cadence_rpm: Option<u16>,
}

impl Step {
    /// Create a step from a duration in seconds
    ///
    /// Fractional seconds are rounded to the nearest millisecond. A zero
    /// duration is allowed; the sequencer moves past it on the next tick.
    pub fn new(duration_s: f64, target: PowerTarget) -> Result<Self, PlanError> {
        validate_target(&target)?;
        Ok(Self {
            duration_ms: seconds_to_ms(duration_s)?,
            target,
            cadence_rpm: None,
        })
    }

    /// Step holding a constant percentage of FTP
    pub fn fixed(percent: f64, duration_s: f64) -> Result<Self, PlanError> {
        Self::new(duration_s, PowerTarget::Fixed(percent))
    }

    /// Step climbing from `from`% to `to`% of FTP
    pub fn progressive(from: f64, to: f64, duration_s: f64) -> Result<Self, PlanError> {
        Self::new(duration_s, PowerTarget::Progressive(ProgressiveRange { from, to }))
    }

    /// Step without a power target
    pub fn free(duration_s: f64) -> Result<Self, PlanError> {
        Self::new(duration_s, PowerTarget::Free)
    }

    /// Attach a cadence target
    pub fn with_cadence(mut self, rpm: u16) -> Self {
        self.cadence_rpm = Some(rpm);
        self
    }

    /// Duration in seconds
    pub fn duration_s(&self) -> f64 {
        self.duration_ms as f64 / 1000.0
    }

    /// Cadence hint for display
    pub fn cadence_hint(&self) -> CadenceTarget {
        CadenceTarget(self.cadence_rpm)
    }
}

fn validate_target(target: &PowerTarget) -> Result<(), PlanError> {
    let finite = match target {
        PowerTarget::Fixed(percent) => percent.is_finite(),
        PowerTarget::Progressive(range) => range.from.is_finite() && range.to.is_finite(),
        PowerTarget::Free => true,
    };
    if finite {
        Ok(())
    } else {
        Err(PlanError::NonFinitePercent)
    }
}

fn seconds_to_ms(duration_s: f64) -> Result<u32, PlanError> {
    if !duration_s.is_finite() {
        return Err(PlanError::NonFiniteDuration);
    }
    if duration_s < 0.0 {
        return Err(PlanError::NegativeDuration);
    }
    // Saturating float-to-int cast
    Ok((duration_s * 1000.0 + 0.5) as u32)
}
