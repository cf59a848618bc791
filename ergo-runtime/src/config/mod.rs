//! Configuration loading and parsing
//!
//! Loads configuration from a user file or the embedded defaults.
//! Ride settings are the core's types; only the backend section is
//! runtime-specific.

pub mod loader;

use serde::Deserialize;

use ergo_core::config::{EngineConfig, ErgConfig, RideConfig, RiderConfig};

pub use loader::load;

/// Sensor backend connection
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct BackendConfig {
    /// Base URL the routes are appended to
    pub base_url: String,
    /// Request timeout (milliseconds)
    pub timeout_ms: u64,
}

impl Default for BackendConfig {
    fn default() -> Self {
        Self {
            base_url: "http://127.0.0.1:8000".to_string(),
            timeout_ms: 2000,
        }
    }
}

/// Complete runtime configuration (ergo.toml)
#[derive(Debug, Clone, PartialEq, Default, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub engine: EngineConfig,
    pub rider: RiderConfig,
    pub erg: ErgConfig,
    pub backend: BackendConfig,
}

impl AppConfig {
    /// Settings the workout session is built from
    pub fn ride(&self) -> RideConfig {
        RideConfig {
            engine: self.engine,
            rider: self.rider,
            erg: self.erg.clone(),
        }
    }
}
