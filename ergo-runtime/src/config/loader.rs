//! Configuration loading
//!
//! A file given on the command line replaces the embedded ergo.toml as a
//! whole. If it cannot be read or parsed the embedded defaults are used.

use std::fs;
use std::path::{Path, PathBuf};

use log::{error, info};

use ergo_core::config::ConfigError as RideConfigError;

use super::AppConfig;

/// Embedded default configuration (compiled into the binary)
/// Edit ergo.toml and rebuild to change the defaults
pub const EMBEDDED_CONFIG: &str = include_str!("../../ergo.toml");

/// Configuration loading errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// File could not be read
    #[error("failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    /// TOML parsing failed
    #[error("invalid TOML: {0}")]
    Toml(#[from] toml::de::Error),
    /// Ride settings out of range
    #[error("invalid ride settings: {0}")]
    Ride(RideConfigError),
    /// Backend settings out of range
    #[error("invalid backend settings: {0}")]
    Backend(&'static str),
}

/// Parse and validate a configuration document
pub fn parse_config(text: &str) -> Result<AppConfig, ConfigError> {
    let config: AppConfig = toml::from_str(text)?;

    config.ride().validate().map_err(ConfigError::Ride)?;

    let url = config.backend.base_url.as_str();
    if !(url.starts_with("http://") || url.starts_with("https://")) {
        return Err(ConfigError::Backend("base_url must be an http(s) URL"));
    }
    if config.backend.timeout_ms == 0 {
        return Err(ConfigError::Backend("timeout_ms must be positive"));
    }

    Ok(config)
}

fn read_config(path: &Path) -> Result<AppConfig, ConfigError> {
    let text = fs::read_to_string(path).map_err(|source| ConfigError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    parse_config(&text)
}

fn embedded_config() -> AppConfig {
    match parse_config(EMBEDDED_CONFIG) {
        Ok(config) => config,
        Err(e) => {
            // build.rs validates the file, so this only trips on schema drift
            error!("Embedded configuration rejected: {}", e);
            AppConfig::default()
        }
    }
}

/// Load configuration from `path`, or the embedded defaults
pub fn load(path: Option<&Path>) -> AppConfig {
    let config = match path {
        Some(path) => match read_config(path) {
            Ok(config) => {
                info!("Loaded configuration from {}", path.display());
                config
            }
            Err(e) => {
                error!("{}; using embedded defaults", e);
                embedded_config()
            }
        },
        None => {
            info!("Using embedded configuration");
            embedded_config()
        }
    };

    log_config_summary(&config);
    config
}

/// Log a summary of the loaded configuration
fn log_config_summary(config: &AppConfig) {
    info!(
        "Config: tick {} ms, poll {} ms, FTP {} W, fallback {}x FTP",
        config.engine.tick_ms, config.engine.poll_ms, config.rider.ftp, config.erg.fallback_ratio
    );
    match &config.erg.trainer {
        Some(trainer) => info!("  Trainer pinned to {}", trainer),
        None => info!("  Trainer detected from telemetry"),
    }
    info!(
        "  Backend {} (timeout {} ms)",
        config.backend.base_url, config.backend.timeout_ms
    );
}
