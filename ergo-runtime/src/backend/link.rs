//! Link implementations over the backend worker

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::mpsc::Sender;
use std::sync::Arc;

use log::trace;

use ergo_core::erg::ErgCommand;
use ergo_core::telemetry::TelemetrySnapshot;
use ergo_core::traits::{ErgLink, LinkError, TelemetrySource};

use super::worker::{Completions, Request};

/// ERG channel of the trainer, through the backend
pub struct HttpErgLink {
    requests: Sender<Request>,
    completions: Arc<Completions>,
    latest: Arc<AtomicU64>,
}

impl HttpErgLink {
    pub(crate) fn new(
        requests: Sender<Request>,
        completions: Arc<Completions>,
        latest: Arc<AtomicU64>,
    ) -> Self {
        Self {
            requests,
            completions,
            latest,
        }
    }
}

impl ErgLink for HttpErgLink {
    async fn set_target_power(&mut self, command: &ErgCommand) -> Result<(), LinkError> {
        let generation = command.generation;
        self.latest.store(generation, Ordering::Release);
        self.requests
            .send(Request::Erg(command.clone()))
            .map_err(|_| LinkError::Rejected)?;

        loop {
            let (resolved, result) = self.completions.erg.wait().await;
            if resolved == generation {
                return result;
            }
            trace!("Discarding answer for aborted generation {}", resolved);
        }
    }
}

/// Sensor readings, through the backend
pub struct HttpTelemetry {
    requests: Sender<Request>,
    completions: Arc<Completions>,
}

impl HttpTelemetry {
    pub(crate) fn new(requests: Sender<Request>, completions: Arc<Completions>) -> Self {
        Self {
            requests,
            completions,
        }
    }
}

impl TelemetrySource for HttpTelemetry {
    async fn poll(&mut self) -> Result<TelemetrySnapshot, LinkError> {
        self.requests
            .send(Request::Telemetry)
            .map_err(|_| LinkError::Rejected)?;
        self.completions.telemetry.wait().await
    }
}
