//! Build script for ergo-runtime
//!
//! Validates ergo.toml at compile time so the embedded defaults always load.

use std::fs;
use std::path::Path;

fn main() {
    validate_config();
}

/// Validate ergo.toml configuration at compile time
fn validate_config() {
    println!("cargo:rerun-if-changed=ergo.toml");
    println!("cargo:rerun-if-changed=build.rs");

    let config_path = Path::new("ergo.toml");

    let config_content = match fs::read_to_string(config_path) {
        Ok(content) => content,
        Err(e) => {
            panic!(
                "\n\
                ╔══════════════════════════════════════════════════════════════════╗\n\
                ║  ERROR: Failed to read ergo.toml                                 ║\n\
                ║                                                                  ║\n\
                ║  Error: {:<56} ║\n\
                ╚══════════════════════════════════════════════════════════════════╝\n",
                e
            );
        }
    };

    let config: toml::Value = match toml::from_str(&config_content) {
        Ok(value) => value,
        Err(e) => {
            let error_msg = e.to_string();
            panic!(
                "\n\
                ╔══════════════════════════════════════════════════════════════════╗\n\
                ║  ERROR: Invalid TOML syntax in ergo.toml                         ║\n\
                ╠══════════════════════════════════════════════════════════════════╣\n\
                {}\n\
                ╚══════════════════════════════════════════════════════════════════╝\n",
                format_error_lines(&error_msg)
            );
        }
    };

    let mut errors = Vec::new();
    validate_engine(&config, &mut errors);
    validate_rider(&config, &mut errors);
    validate_erg(&config, &mut errors);
    validate_backend(&config, &mut errors);

    if !errors.is_empty() {
        panic!(
            "\n\
            ╔══════════════════════════════════════════════════════════════════╗\n\
            ║  ERROR: Invalid configuration in ergo.toml                       ║\n\
            ╠══════════════════════════════════════════════════════════════════╣\n\
            {}\n\
            ╚══════════════════════════════════════════════════════════════════╝\n",
            errors
                .iter()
                .map(|e| format!("║  • {:<62} ║", e))
                .collect::<Vec<_>>()
                .join("\n")
        );
    }
}

/// Format error message lines with box drawing
fn format_error_lines(msg: &str) -> String {
    msg.lines()
        .map(|line| {
            let truncated = if line.chars().count() > 64 {
                format!("{}...", line.chars().take(61).collect::<String>())
            } else {
                line.to_string()
            };
            format!("║  {:<64} ║", truncated)
        })
        .collect::<Vec<_>>()
        .join("\n")
}

fn number(value: &toml::Value) -> Option<f64> {
    match value {
        toml::Value::Integer(i) => Some(*i as f64),
        toml::Value::Float(f) => Some(*f),
        _ => None,
    }
}

fn validate_engine(config: &toml::Value, errors: &mut Vec<String>) {
    let Some(engine) = config.get("engine") else {
        return;
    };

    for key in ["tick_ms", "poll_ms"] {
        match engine.get(key) {
            Some(toml::Value::Integer(ms)) if *ms < 10 || *ms > u32::MAX as i64 => {
                errors.push(format!("[engine] {} must be at least 10", key));
            }
            Some(toml::Value::Integer(_)) | None => {}
            Some(_) => errors.push(format!("[engine] {} must be an integer", key)),
        }
    }
}

fn validate_rider(config: &toml::Value, errors: &mut Vec<String>) {
    let Some(ftp) = config.get("rider").and_then(|r| r.get("ftp")) else {
        return;
    };

    match number(ftp) {
        Some(w) if w > 0.0 && w.is_finite() => {}
        _ => errors.push("[rider] ftp must be a positive number".to_string()),
    }
}

fn validate_erg(config: &toml::Value, errors: &mut Vec<String>) {
    let Some(erg) = config.get("erg") else {
        return;
    };

    if let Some(ratio) = erg.get("fallback_ratio") {
        match number(ratio) {
            Some(r) if r >= 0.0 && r.is_finite() => {}
            _ => errors.push("[erg] fallback_ratio must be a non-negative number".to_string()),
        }
    }

    if let Some(trainer) = erg.get("trainer") {
        match trainer.as_str() {
            Some(name) if !name.is_empty() && name.len() <= 48 => {}
            _ => errors.push("[erg] trainer must be a name of 1-48 bytes".to_string()),
        }
    }
}

fn validate_backend(config: &toml::Value, errors: &mut Vec<String>) {
    let Some(backend) = config.get("backend") else {
        return;
    };

    if let Some(url) = backend.get("base_url") {
        match url.as_str() {
            Some(u) if u.starts_with("http://") || u.starts_with("https://") => {}
            _ => errors.push("[backend] base_url must be an http(s) URL".to_string()),
        }
    }

    if let Some(timeout) = backend.get("timeout_ms") {
        match timeout.as_integer() {
            Some(ms) if ms > 0 => {}
            _ => errors.push("[backend] timeout_ms must be a positive integer".to_string()),
        }
    }
}
