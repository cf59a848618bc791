//! Inter-task communication channels
//!
//! Defines the channels and signals connecting the runtime tasks. They are
//! grouped in a [`Bus`] so tests can run tasks against a private instance;
//! the binary uses the static [`BUS`], which the stdin reader thread also
//! feeds.

use embassy_sync::blocking_mutex::raw::CriticalSectionRawMutex;
use embassy_sync::channel::Channel;
use embassy_sync::signal::Signal;

use ergo_core::erg::TargetUpdate;
use ergo_core::events::Event;
use ergo_core::session::Snapshot;
use ergo_core::telemetry::TelemetrySnapshot;

use crate::console::UserCommand;

/// Channel capacity for console commands
const COMMAND_CHANNEL_SIZE: usize = 8;

/// Status published by the session for the console
#[derive(Debug, Clone, PartialEq)]
pub struct StatusReport {
    /// Event that triggered the report, if any
    pub event: Option<Event>,
    pub snapshot: Snapshot,
}

/// Channels shared by the runtime tasks
pub struct Bus {
    /// Console commands for the session
    pub commands: Channel<CriticalSectionRawMutex, UserCommand, COMMAND_CHANNEL_SIZE>,
    /// Latest target for the ERG dispatcher (updated by session)
    pub targets: Signal<CriticalSectionRawMutex, TargetUpdate>,
    /// Latest telemetry poll (updated by telemetry task)
    pub telemetry: Signal<CriticalSectionRawMutex, TelemetrySnapshot>,
    /// Status for the console (updated by session)
    pub status: Signal<CriticalSectionRawMutex, StatusReport>,
    /// Stop request for the ERG task
    pub erg_stop: Signal<CriticalSectionRawMutex, ()>,
    /// Stop request for the telemetry task
    pub telemetry_stop: Signal<CriticalSectionRawMutex, ()>,
    /// Stop request for the console task
    pub console_stop: Signal<CriticalSectionRawMutex, ()>,
}

impl Bus {
    pub const fn new() -> Self {
        Self {
            commands: Channel::new(),
            targets: Signal::new(),
            telemetry: Signal::new(),
            status: Signal::new(),
            erg_stop: Signal::new(),
            telemetry_stop: Signal::new(),
            console_stop: Signal::new(),
        }
    }

    /// Ask every task other than the session to stop
    pub fn shutdown(&self) {
        self.erg_stop.signal(());
        self.telemetry_stop.signal(());
        self.console_stop.signal(());
    }
}

impl Default for Bus {
    fn default() -> Self {
        Self::new()
    }
}

/// Bus used by the binary
pub static BUS: Bus = Bus::new();
