//! Target updates and the deduplicating dispatcher

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::DeviceId;

use super::DedupKey;

/// Target computed for the current instant of a ride
///
/// Produced by the session on every state change and tick; the dispatcher
/// turns it into at most one command per distinct key.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TargetUpdate {
    /// Current step index
    pub step_index: usize,
    /// Target wattage
    pub watts: u16,
    /// Current step has a fixed or progressive target
    pub power_controlled: bool,
    /// Playback has been started
    pub has_started: bool,
    /// Playback has finished
    pub finished: bool,
    /// Playback run counter, bumped on every start
    pub run: u32,
    /// Trainer to address, if one is known
    pub trainer: Option<DeviceId>,
}

impl TargetUpdate {
    /// Whether this update may drive the trainer at all
    pub fn is_eligible(&self) -> bool {
        self.power_controlled
            && self.has_started
            && !self.finished
            && self.trainer.is_some()
            && self.watts > 0
    }

    /// Dedup key, if the update names a trainer
    pub fn key(&self) -> Option<DedupKey> {
        self.trainer
            .clone()
            .map(|device| DedupKey::new(device, self.step_index, self.watts))
    }
}

/// A command for the trainer's ERG channel
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ErgCommand {
    /// Trainer to address
    pub device: DeviceId,
    /// Target wattage
    pub watts: u16,
    /// Step the target belongs to
    pub step_index: usize,
    /// Monotonic command counter, starting at 1
    pub generation: u64,
    /// Generation of the unresolved command this one replaces
    pub supersedes: Option<u64>,
}

impl ErgCommand {
    /// Dedup key of this command
    pub fn key(&self) -> DedupKey {
        DedupKey::new(self.device.clone(), self.step_index, self.watts)
    }
}

/// Dispatcher counters
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct DispatchStats {
    /// Commands issued
    pub issued: u32,
    /// Eligible updates dropped as duplicates
    pub suppressed: u32,
    /// Updates that were not eligible for power control
    pub ineligible: u32,
}

/// Deduplicating ERG command dispatcher
///
/// Owns the last issued key and the generation counter. Transports report
/// completion through [`ErgDispatcher::settle`].
#[derive(Debug, Default)]
pub struct ErgDispatcher {
    run: u32,
    last_key: Option<DedupKey>,
    generation: u64,
    in_flight: Option<u64>,
    stats: DispatchStats,
}

impl ErgDispatcher {
    pub fn new() -> Self {
        Self::default()
    }

    /// Offer a freshly computed target
    ///
    /// Returns a command when the update is eligible and its key differs
    /// from the last issued one. The key is recorded immediately. An update
    /// from a new run clears the key first, so a restart re-issues its
    /// opening target.
    pub fn offer(&mut self, update: &TargetUpdate) -> Option<ErgCommand> {
        if update.run != self.run {
            self.run = update.run;
            self.forget();
        }

        if !update.is_eligible() {
            self.stats.ineligible = self.stats.ineligible.saturating_add(1);
            return None;
        }

        let key = update.key()?;
        if self.last_key.as_ref() == Some(&key) {
            self.stats.suppressed = self.stats.suppressed.saturating_add(1);
            return None;
        }

        self.generation += 1;
        let supersedes = self.in_flight.replace(self.generation);
        self.stats.issued = self.stats.issued.saturating_add(1);

        let command = ErgCommand {
            device: key.device.clone(),
            watts: key.watts,
            step_index: key.step_index,
            generation: self.generation,
            supersedes,
        };
        self.last_key = Some(key);
        Some(command)
    }

    /// Mark a command as resolved (sent, failed or aborted)
    ///
    /// Stale generations are ignored. The last key is kept either way;
    /// failures are not retried.
    pub fn settle(&mut self, generation: u64) {
        if self.in_flight == Some(generation) {
            self.in_flight = None;
        }
    }

    /// Clear the last key so the next eligible target is issued again
    pub fn forget(&mut self) {
        self.last_key = None;
    }

    /// Key of the last issued command
    pub fn last_key(&self) -> Option<&DedupKey> {
        self.last_key.as_ref()
    }

    /// Generation of the unresolved command, if any
    pub fn in_flight(&self) -> Option<u64> {
        self.in_flight
    }

    /// Latest issued generation (0 before the first command)
    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn stats(&self) -> DispatchStats {
        self.stats
    }
}
