//! Telemetry response JSON
//!
//! The backend answers `GET /sensors/data` with one object per connected
//! sensor, keyed by sensor name:
//!
//! ```text
//! { "data": { "FitnessEquipment_5_7504": { "power": 182, "cadence": 88 },
//!             "HeartRate_120_9": { "heart_rate": 141 } } }
//! ```
//!
//! Fields that are missing or not numbers are ignored.

use ergo_core::target::round_half_up;
use ergo_core::telemetry::{SensorReading, TelemetrySnapshot};
use ergo_core::try_device_id;
use serde::{Deserialize, Deserializer};
use serde_json::{Map, Value};

use crate::error::WireError;

/// Raw telemetry response
#[derive(Debug, Clone, Default, Deserialize)]
pub struct TelemetryResponse {
    #[serde(default, deserialize_with = "null_as_empty")]
    pub data: Map<String, Value>,
}

/// Snapshot plus the sensors that could not be kept
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DecodedTelemetry {
    pub snapshot: TelemetrySnapshot,
    /// Sensors whose name exceeds the device identifier capacity
    pub rejected: usize,
    /// Sensors beyond the snapshot capacity
    pub overflow: usize,
}

impl DecodedTelemetry {
    /// Number of sensors left out of the snapshot
    pub fn dropped(&self) -> usize {
        self.rejected + self.overflow
    }
}

impl TelemetryResponse {
    /// Convert to a snapshot, keeping backend order
    ///
    /// Sensors with names that do not fit a device identifier are left out
    /// rather than truncated, and so are sensors beyond the snapshot
    /// capacity. Both are counted.
    pub fn decode(&self) -> DecodedTelemetry {
        let mut decoded = DecodedTelemetry::default();

        for (name, reading) in &self.data {
            let Some(device) = try_device_id(name) else {
                decoded.rejected += 1;
                continue;
            };
            let reading = SensorReading {
                power_w: numeric(reading, "power"),
                cadence_rpm: numeric(reading, "cadence"),
                heart_rate_bpm: numeric(reading, "heart_rate"),
            };
            if decoded.snapshot.push(device, reading).is_err() {
                decoded.overflow += 1;
            }
        }

        decoded
    }
}

fn null_as_empty<'de, D>(deserializer: D) -> Result<Map<String, Value>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<Map<String, Value>>::deserialize(deserializer)?.unwrap_or_default())
}

fn numeric(reading: &Value, field: &str) -> Option<u16> {
    let value = reading.get(field)?.as_f64()?;
    if !value.is_finite() {
        return None;
    }
    Some(round_half_up(value).clamp(0, u16::MAX as i64) as u16)
}

/// Decode a telemetry response body
pub fn parse_telemetry_json(text: &str) -> Result<DecodedTelemetry, WireError> {
    let response: TelemetryResponse = serde_json::from_str(text)?;
    Ok(response.decode())
}
