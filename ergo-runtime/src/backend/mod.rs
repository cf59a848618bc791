//! HTTP sensor backend bridge
//!
//! Blocking HTTP runs on a single worker thread that owns the `reqwest`
//! client. Tasks hand it requests over a `std::sync::mpsc` channel and
//! await the answers on embassy signals, so the executor never blocks on
//! the network.
//!
//! Commands are stamped with the dispatcher generation. The worker drops
//! any queued command older than the latest one handed over, and the link
//! discards answers that belong to an aborted command.

mod link;
mod worker;

use std::sync::atomic::AtomicU64;
use std::sync::mpsc;
use std::sync::Arc;
use std::thread;
use std::time::Duration;

use log::info;

use crate::config::BackendConfig;

pub use link::{HttpErgLink, HttpTelemetry};
use worker::{Completions, Request, Worker};

/// Backend setup errors
#[derive(Debug, thiserror::Error)]
pub enum BackendError {
    /// HTTP client could not be built
    #[error("failed to build HTTP client: {0}")]
    Client(#[from] reqwest::Error),
    /// Worker thread could not be started
    #[error("failed to start backend worker: {0}")]
    Spawn(#[from] std::io::Error),
}

/// Handles to a running backend worker
pub struct Backend {
    pub erg: HttpErgLink,
    pub telemetry: HttpTelemetry,
    pub worker: thread::JoinHandle<()>,
}

impl Backend {
    /// Start the worker thread
    ///
    /// The worker exits once both links are dropped.
    pub fn spawn(config: &BackendConfig) -> Result<Self, BackendError> {
        let client = reqwest::blocking::Client::builder()
            .timeout(Duration::from_millis(config.timeout_ms))
            .build()?;

        let (requests, inbox) = mpsc::channel::<Request>();
        let completions = Arc::new(Completions::new());
        let latest = Arc::new(AtomicU64::new(0));

        let worker = Worker {
            client,
            base_url: config.base_url.clone(),
            inbox,
            completions: completions.clone(),
            latest: latest.clone(),
            dropped_sensors: 0,
        };
        let handle = thread::Builder::new()
            .name("ergo-backend".to_string())
            .spawn(move || worker.run())?;

        info!("Backend worker started for {}", config.base_url);

        Ok(Self {
            erg: HttpErgLink::new(requests.clone(), completions.clone(), latest),
            telemetry: HttpTelemetry::new(requests, completions),
            worker: handle,
        })
    }
}
