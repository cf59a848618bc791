//! Deduplication key

use core::fmt;

use crate::DeviceId;

/// Identity of a trainer command
///
/// Two commands with equal keys are redundant.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DedupKey {
    /// Trainer the command is addressed to
    pub device: DeviceId,
    /// Step the target was computed for
    pub step_index: usize,
    /// Rounded target wattage
    pub watts: u16,
}

impl DedupKey {
    pub fn new(device: DeviceId, step_index: usize, watts: u16) -> Self {
        Self {
            device,
            step_index,
            watts,
        }
    }
}

impl fmt::Display for DedupKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-{}-{}", self.device, self.step_index, self.watts)
    }
}
