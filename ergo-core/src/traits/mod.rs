//! I/O traits
//!
//! These traits define the interface between the ride logic and the
//! transport that reaches the trainer and the telemetry backend.

pub mod link;

pub use link::{ErgLink, LinkError, TelemetrySource};
