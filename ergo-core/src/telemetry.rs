//! Live sensor readings and trainer designation

use heapless::Vec;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::DeviceId;

/// Maximum sensors in one telemetry snapshot
pub const MAX_SENSORS: usize = 16;

/// One sensor's latest values
///
/// Every field is optional; a sensor reports only what it measures.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct SensorReading {
    /// Power in watts
    pub power_w: Option<u16>,
    /// Cadence in rpm
    pub cadence_rpm: Option<u16>,
    /// Heart rate in bpm
    pub heart_rate_bpm: Option<u16>,
}

impl SensorReading {
    /// Check if the reading carries no values
    pub fn is_empty(&self) -> bool {
        self.power_w.is_none() && self.cadence_rpm.is_none() && self.heart_rate_bpm.is_none()
    }
}

/// Error returned when a snapshot is full
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SnapshotFull;

/// Readings from one telemetry poll, in backend order
#[derive(Debug, Clone, PartialEq, Default)]
pub struct TelemetrySnapshot {
    sensors: Vec<(DeviceId, SensorReading), MAX_SENSORS>,
}

impl TelemetrySnapshot {
    pub const fn new() -> Self {
        Self { sensors: Vec::new() }
    }

    /// Append a sensor reading
    pub fn push(&mut self, device: DeviceId, reading: SensorReading) -> Result<(), SnapshotFull> {
        self.sensors
            .push((device, reading))
            .map_err(|_| SnapshotFull)
    }

    /// Iterate sensors in backend order
    pub fn iter(&self) -> impl Iterator<Item = (&DeviceId, &SensorReading)> {
        self.sensors.iter().map(|(device, reading)| (device, reading))
    }

    pub fn len(&self) -> usize {
        self.sensors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sensors.is_empty()
    }
}

/// Latest values merged across all sensors
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct LiveReadings {
    /// Last power value seen
    pub power_w: Option<u16>,
    /// Last cadence value seen
    pub cadence_rpm: Option<u16>,
    /// Last heart rate seen
    pub heart_rate_bpm: Option<u16>,
    /// Last sensor that reported power
    pub trainer: Option<DeviceId>,
}

impl LiveReadings {
    /// Replace the readings with a snapshot
    ///
    /// Later sensors win for each field and fields no sensor reports are
    /// cleared. The last sensor carrying power becomes the trainer; when no
    /// sensor reports power the previous trainer is kept.
    pub fn absorb(&mut self, snapshot: &TelemetrySnapshot) {
        let mut merged = SensorReading::default();

        for (device, reading) in snapshot.iter() {
            if let Some(watts) = reading.power_w {
                merged.power_w = Some(watts);
                self.trainer = Some(device.clone());
            }
            if let Some(rpm) = reading.cadence_rpm {
                merged.cadence_rpm = Some(rpm);
            }
            if let Some(bpm) = reading.heart_rate_bpm {
                merged.heart_rate_bpm = Some(bpm);
            }
        }

        self.power_w = merged.power_w;
        self.cadence_rpm = merged.cadence_rpm;
        self.heart_rate_bpm = merged.heart_rate_bpm;
    }
}
