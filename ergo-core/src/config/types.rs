//! Configuration type definitions

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::sequencer::DEFAULT_QUANTUM_MS;
use crate::target::{effective_ftp, FallbackPolicy, DEFAULT_FTP_WATTS};
use crate::DeviceId;

/// Default telemetry poll interval (milliseconds)
pub const DEFAULT_POLL_MS: u32 = 1000;

/// Shortest accepted tick or poll interval (milliseconds)
pub const MIN_INTERVAL_MS: u32 = 10;

/// Errors found while validating a configuration
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigError {
    /// Tick quantum below [`MIN_INTERVAL_MS`]
    TickTooShort,
    /// Poll interval below [`MIN_INTERVAL_MS`]
    PollTooShort,
    /// FTP is zero, negative or not finite
    InvalidFtp,
    /// Fallback ratio is negative or not finite
    InvalidFallbackRatio,
}

impl core::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            ConfigError::TickTooShort => write!(f, "tick_ms must be at least {}", MIN_INTERVAL_MS),
            ConfigError::PollTooShort => write!(f, "poll_ms must be at least {}", MIN_INTERVAL_MS),
            ConfigError::InvalidFtp => f.write_str("ftp must be a positive number"),
            ConfigError::InvalidFallbackRatio => {
                f.write_str("fallback_ratio must be a non-negative number")
            }
        }
    }
}

/// Playback and polling cadence
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct EngineConfig {
    /// Sequencer tick quantum (milliseconds)
    pub tick_ms: u32,
    /// Telemetry poll interval (milliseconds)
    pub poll_ms: u32,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            tick_ms: DEFAULT_QUANTUM_MS,
            poll_ms: DEFAULT_POLL_MS,
        }
    }
}

/// Rider settings
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct RiderConfig {
    /// Functional threshold power (watts)
    pub ftp: f64,
}

impl Default for RiderConfig {
    fn default() -> Self {
        Self {
            ftp: DEFAULT_FTP_WATTS,
        }
    }
}

/// ERG control settings
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct ErgConfig {
    /// Target for steps without a usable power target, as a ratio of FTP
    pub fallback_ratio: f64,
    /// Trainer to address instead of the one detected from telemetry
    pub trainer: Option<DeviceId>,
}

impl ErgConfig {
    pub fn fallback(&self) -> FallbackPolicy {
        FallbackPolicy::new(self.fallback_ratio)
    }
}

impl Default for ErgConfig {
    fn default() -> Self {
        Self {
            fallback_ratio: FallbackPolicy::HALF_FTP.ratio,
            trainer: None,
        }
    }
}

/// Complete ride configuration
#[derive(Debug, Clone, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct RideConfig {
    pub engine: EngineConfig,
    pub rider: RiderConfig,
    pub erg: ErgConfig,
}

impl RideConfig {
    /// Check values that would otherwise be silently replaced at runtime
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.engine.tick_ms < MIN_INTERVAL_MS {
            return Err(ConfigError::TickTooShort);
        }
        if self.engine.poll_ms < MIN_INTERVAL_MS {
            return Err(ConfigError::PollTooShort);
        }
        if effective_ftp(self.rider.ftp) != self.rider.ftp {
            return Err(ConfigError::InvalidFtp);
        }
        if !(self.erg.fallback_ratio.is_finite() && self.erg.fallback_ratio >= 0.0) {
            return Err(ConfigError::InvalidFallbackRatio);
        }
        Ok(())
    }
}
