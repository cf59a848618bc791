//! Target power calculator

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::plan::{PowerTarget, ProgressiveRange, Step};

/// Baseline used when the configured FTP is zero, negative or not finite
pub const DEFAULT_FTP_WATTS: f64 = 250.0;

/// Wattage added by each progressive increment
pub const PROGRESSIVE_STEP_WATTS: i64 = 10;

/// Time between progressive increments (milliseconds)
pub const PROGRESSIVE_INTERVAL_MS: u32 = 10_000;

/// Target used when a step carries no usable power target
///
/// Expressed as a ratio of the FTP baseline. The observed behavior is half
/// of FTP; keep it overridable rather than hard-coded.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct FallbackPolicy {
    /// Fraction of FTP to target
    pub ratio: f64,
}

impl FallbackPolicy {
    /// Half of FTP
    pub const HALF_FTP: Self = Self { ratio: 0.5 };

    /// Create a policy, replacing a negative or non-finite ratio with
    /// [`FallbackPolicy::HALF_FTP`]
    pub fn new(ratio: f64) -> Self {
        if ratio.is_finite() && ratio >= 0.0 {
            Self { ratio }
        } else {
            Self::HALF_FTP
        }
    }

    /// Fallback wattage for a baseline
    pub fn watts(&self, ftp: f64) -> u16 {
        clamp_watts(round_half_up(self.ratio * effective_ftp(ftp)))
    }
}

impl Default for FallbackPolicy {
    fn default() -> Self {
        Self::HALF_FTP
    }
}

/// FTP baseline to compute with
///
/// A zero, negative or non-finite baseline is an invalid configuration and
/// is replaced by [`DEFAULT_FTP_WATTS`].
pub fn effective_ftp(ftp: f64) -> f64 {
    if ftp.is_finite() && ftp > 0.0 {
        ftp
    } else {
        DEFAULT_FTP_WATTS
    }
}

/// Round to the nearest integer, halves towards positive infinity
///
/// `core` has no float rounding without `std`, so this is done with a
/// saturating cast and a floor correction. NaN maps to 0.
pub fn round_half_up(x: f64) -> i64 {
    let shifted = x + 0.5;
    let truncated = shifted as i64;
    if (truncated as f64) > shifted {
        truncated - 1
    } else {
        truncated
    }
}

fn clamp_watts(watts: i64) -> u16 {
    watts.clamp(0, u16::MAX as i64) as u16
}

fn percent_of(percent: f64, ftp: f64) -> i64 {
    round_half_up(percent / 100.0 * ftp)
}

/// Compute the target wattage for a step
///
/// # Arguments
/// - `step`: Step being ridden
/// - `ftp`: FTP baseline in watts
/// - `elapsed_in_step_ms`: Time already spent in the step, clamped to the
///   step duration
/// - `fallback`: Policy applied to steps without a usable power target
///
/// Progressive steps produce a staircase: `+10 W` every 10 s from the
/// starting wattage, never above the wattage of the upper bound.
pub fn target_watts(
    step: &Step,
    ftp: f64,
    elapsed_in_step_ms: u32,
    fallback: FallbackPolicy,
) -> u16 {
    let ftp = effective_ftp(ftp);

    match step.target {
        PowerTarget::Fixed(percent) => clamp_watts(percent_of(percent, ftp)),
        PowerTarget::Progressive(range) if step.duration_ms > 0 => {
            let elapsed = elapsed_in_step_ms.min(step.duration_ms);
            clamp_watts(staircase(range, ftp, elapsed))
        }
        // Zero-length progressive steps and free steps
        _ => fallback.watts(ftp),
    }
}

/// Wattage at the very start of a step
pub fn preview_watts(step: &Step, ftp: f64, fallback: FallbackPolicy) -> u16 {
    target_watts(step, ftp, 0, fallback)
}

fn staircase(range: ProgressiveRange, ftp: f64, elapsed_ms: u32) -> i64 {
    let start_w = percent_of(range.from, ftp);
    let max_w = percent_of(range.to, ftp);
    let intervals = (elapsed_ms / PROGRESSIVE_INTERVAL_MS) as i64;

    (start_w + PROGRESSIVE_STEP_WATTS * intervals).min(max_w)
}
