//! Trainer and telemetry links

use core::fmt;

use crate::erg::ErgCommand;
use crate::telemetry::TelemetrySnapshot;

/// Errors from trainer or telemetry transports
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LinkError {
    /// Connection failed or timed out
    Transport,
    /// Backend answered with a non-success status
    Status(u16),
    /// Response body could not be decoded
    Decode,
    /// Transport refused the request (closed or full)
    Rejected,
    /// A newer command replaced this one before it was sent
    Superseded,
}

impl fmt::Display for LinkError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LinkError::Transport => f.write_str("transport failure"),
            LinkError::Status(code) => write!(f, "backend returned status {}", code),
            LinkError::Decode => f.write_str("malformed response"),
            LinkError::Rejected => f.write_str("request rejected by transport"),
            LinkError::Superseded => f.write_str("superseded by a newer command"),
        }
    }
}

/// Channel to a trainer's ERG mode
///
/// Implementations send one command and resolve when the backend answers.
/// Dropping the returned future aborts the command if the transport
/// supports it.
pub trait ErgLink {
    /// Ask the trainer to hold `command.watts`
    fn set_target_power(
        &mut self,
        command: &ErgCommand,
    ) -> impl core::future::Future<Output = Result<(), LinkError>>;
}

/// Periodic source of sensor readings
pub trait TelemetrySource {
    /// Fetch the current readings of all sensors
    fn poll(&mut self) -> impl core::future::Future<Output = Result<TelemetrySnapshot, LinkError>>;
}
