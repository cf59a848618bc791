//! Transport-agnostic core logic for the Ergo workout engine
//!
//! This crate contains all playback and target logic that does not depend
//! on a particular executor, network stack or trainer protocol:
//!
//! - Workout plan model (steps, power targets, cadence targets)
//! - Target power calculator and zone classifier
//! - Step sequencer (tick-driven playback state machine)
//! - ERG command dispatcher (deduplication and supersession)
//! - Telemetry model and trainer designation
//! - Ride session context tying the pieces together
//! - I/O traits implemented by runtimes

#![no_std]
#![deny(unsafe_code)]

pub mod config;
pub mod erg;
pub mod events;
pub mod plan;
pub mod sequencer;
pub mod session;
pub mod target;
pub mod telemetry;
pub mod traits;

/// Maximum length of a device identifier (e.g. `FitnessEquipment_5_7504`)
pub const MAX_DEVICE_ID_LEN: usize = 48;

/// Identifier of a sensor or trainer as reported by the telemetry backend
pub type DeviceId = heapless::String<MAX_DEVICE_ID_LEN>;

/// Build a [`DeviceId`], truncating at a character boundary if the input
/// exceeds [`MAX_DEVICE_ID_LEN`] bytes.
pub fn device_id(name: &str) -> DeviceId {
    let mut id = DeviceId::new();
    for ch in name.chars() {
        if id.push(ch).is_err() {
            break;
        }
    }
    id
}

/// Build a [`DeviceId`], or `None` if the name does not fit.
///
/// Use this where the identifier is sent back to the backend: a truncated
/// name would address a different device.
pub fn try_device_id(name: &str) -> Option<DeviceId> {
    let mut id = DeviceId::new();
    id.push_str(name).ok()?;
    Some(id)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_device_id_short() {
        assert_eq!(device_id("FitnessEquipment_5_7504").as_str(), "FitnessEquipment_5_7504");
    }

    #[test]
    fn test_device_id_truncates() {
        let long = "FitnessEquipment_5_7504_FitnessEquipment_5_7504_FitnessEquipment";
        let id = device_id(long);
        assert_eq!(id.len(), MAX_DEVICE_ID_LEN);
        assert!(long.starts_with(id.as_str()));
    }

    #[test]
    fn test_try_device_id_rejects_long_names() {
        assert_eq!(
            try_device_id("FitnessEquipment_5_7504").as_deref(),
            Some("FitnessEquipment_5_7504")
        );

        let exact = "FitnessEquipment_5_7504_FitnessEquipment_5_7504_";
        assert_eq!(try_device_id(exact).map(|id| id.len()), Some(MAX_DEVICE_ID_LEN));

        assert!(try_device_id("ANT_FitnessEquipment_Wahoo_KICKR_CORE_5_7504_Bridge_01").is_none());
    }
}
