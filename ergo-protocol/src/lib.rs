//! Ergo backend wire formats
//!
//! This crate defines everything that crosses the boundary between the
//! engine and its surroundings:
//!
//! - Workout definitions as JSON step lists
//! - Telemetry snapshots as returned by the sensor backend
//! - HTTP routes for telemetry reads and ERG commands
//! - The textual workout notation used by published workouts
//!
//! # Workout JSON
//!
//! ```text
//! [
//!   { "ftp_percent": 75, "duration": 600, "rpm": 90, "progressive_range": null },
//!   { "ftp_percent": null, "duration": 300, "rpm": null,
//!     "progressive_range": { "from": 50, "to": 80 } }
//! ]
//! ```
//!
//! A bare array or an object with a `steps` array are both accepted.

#![deny(unsafe_code)]

pub mod error;
pub mod notation;
pub mod plan;
pub mod route;
pub mod telemetry;

pub use error::{NotationError, StepError, WireError};
pub use notation::parse_workout_text;
pub use plan::{parse_plan_json, plan_from_records, plan_to_json, RangeRecord, StepRecord};
pub use route::{erg_route, telemetry_route};
pub use telemetry::{parse_telemetry_json, DecodedTelemetry, TelemetryResponse};
