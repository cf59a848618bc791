//! Backend worker thread

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::mpsc::Receiver;
use std::sync::Arc;

use embassy_sync::blocking_mutex::raw::CriticalSectionRawMutex;
use embassy_sync::signal::Signal;
use log::{debug, trace, warn};

use ergo_core::erg::ErgCommand;
use ergo_core::telemetry::TelemetrySnapshot;
use ergo_core::traits::LinkError;
use ergo_protocol::{erg_route, parse_telemetry_json, telemetry_route, DecodedTelemetry};

/// Work for the backend thread
#[derive(Debug)]
pub(crate) enum Request {
    Telemetry,
    Erg(ErgCommand),
}

/// Answers from the backend thread
pub(crate) struct Completions {
    pub telemetry: Signal<CriticalSectionRawMutex, Result<TelemetrySnapshot, LinkError>>,
    /// Generation and outcome of the last resolved command
    pub erg: Signal<CriticalSectionRawMutex, (u64, Result<(), LinkError>)>,
}

impl Completions {
    pub fn new() -> Self {
        Self {
            telemetry: Signal::new(),
            erg: Signal::new(),
        }
    }
}

pub(crate) struct Worker {
    pub client: reqwest::blocking::Client,
    pub base_url: String,
    pub inbox: Receiver<Request>,
    pub completions: Arc<Completions>,
    /// Latest generation handed to the link
    pub latest: Arc<AtomicU64>,
    /// Sensors left out of the last decoded snapshot
    pub dropped_sensors: usize,
}

impl Worker {
    pub fn run(mut self) {
        while let Ok(request) = self.inbox.recv() {
            match request {
                Request::Telemetry => {
                    let result = self.fetch_telemetry();
                    self.completions.telemetry.signal(result);
                }
                Request::Erg(command) => {
                    let result = if is_stale(&command, self.latest.load(Ordering::Acquire)) {
                        Err(LinkError::Superseded)
                    } else {
                        self.send_erg(&command)
                    };
                    self.completions.erg.signal((command.generation, result));
                }
            }
        }
        debug!("Backend worker stopped");
    }

    fn fetch_telemetry(&mut self) -> Result<TelemetrySnapshot, LinkError> {
        let url = telemetry_route(&self.base_url);
        trace!("GET {}", url);

        let response = self.client.get(&url).send().map_err(transport)?;
        let status = response.status();
        if !status.is_success() {
            return Err(LinkError::Status(status.as_u16()));
        }

        let body = response.text().map_err(transport)?;
        let decoded = parse_telemetry_json(&body).map_err(|e| {
            debug!("Telemetry decode failed: {}", e);
            LinkError::Decode
        })?;

        if dropped_changed(self.dropped_sensors, &decoded) {
            warn!(
                "Ignoring {} sensors ({} with names over {} bytes, {} over capacity)",
                decoded.dropped(),
                decoded.rejected,
                ergo_core::MAX_DEVICE_ID_LEN,
                decoded.overflow
            );
        }
        self.dropped_sensors = decoded.dropped();

        Ok(decoded.snapshot)
    }

    fn send_erg(&self, command: &ErgCommand) -> Result<(), LinkError> {
        let url = erg_route(&self.base_url, &command.device, command.watts);
        debug!("POST {}", url);

        let response = self.client.post(&url).send().map_err(transport)?;
        let status = response.status();
        if status.is_success() {
            Ok(())
        } else {
            Err(LinkError::Status(status.as_u16()))
        }
    }
}

fn transport(e: reqwest::Error) -> LinkError {
    debug!("Backend request failed: {}", e);
    LinkError::Transport
}

/// Warn once per change in the number of sensors left out
pub(crate) fn dropped_changed(previous: usize, decoded: &DecodedTelemetry) -> bool {
    decoded.dropped() > 0 && decoded.dropped() != previous
}

/// A queued command is stale once a newer generation was handed over
pub(crate) fn is_stale(command: &ErgCommand, latest: u64) -> bool {
    command.generation < latest
}

#[cfg(test)]
mod tests {
    use super::*;
    use ergo_core::device_id;

    fn command(generation: u64) -> ErgCommand {
        ErgCommand {
            device: device_id("FitnessEquipment_5_7504"),
            watts: 150,
            step_index: 0,
            generation,
            supersedes: None,
        }
    }

    #[test]
    fn test_stale_commands() {
        assert!(!is_stale(&command(3), 3));
        assert!(is_stale(&command(2), 3));
        assert!(!is_stale(&command(1), 0));
    }

    #[test]
    fn test_dropped_sensors_warned_on_change() {
        let long_name = r#"{ "data": {
            "ANT_FitnessEquipment_Wahoo_KICKR_CORE_5_7504_Bridge_01": { "power": 182 }
        } }"#;
        let decoded = parse_telemetry_json(long_name).unwrap();

        assert!(dropped_changed(0, &decoded));
        assert!(!dropped_changed(1, &decoded));

        let clean = parse_telemetry_json(r#"{ "data": {} }"#).unwrap();
        assert!(!dropped_changed(1, &clean));
    }
}
