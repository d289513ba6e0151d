use std::{env, net::SocketAddr, path::PathBuf};

pub const DEFAULT_BIND_ADDR: &str = "0.0.0.0:5000";
pub const DEFAULT_HISTORY_FILE: &str = "matrix_history.json";
pub const DEFAULT_SETTINGS_FILE: &str = "app_settings.json";

/// Service settings read from `MATRIX_*` environment variables.
#[derive(Debug, Clone, PartialEq)]
pub struct ServiceConfig {
    pub bind_addr: SocketAddr,
    pub history_file: PathBuf,
    pub settings_file: PathBuf,
    /// Keep history and preferences in memory instead of on disk.
    pub in_memory: bool,
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            bind_addr: SocketAddr::from(([0, 0, 0, 0], 5000)),
            history_file: PathBuf::from(DEFAULT_HISTORY_FILE),
            settings_file: PathBuf::from(DEFAULT_SETTINGS_FILE),
            in_memory: false,
        }
    }
}

impl ServiceConfig {
    pub fn from_env() -> Self {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Builds the config from an arbitrary variable source. Invalid values
    /// are reported and replaced by their defaults.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let mut config = Self::default();

        if let Some(raw) = lookup("MATRIX_BIND_ADDR") {
            match raw.parse::<SocketAddr>() {
                Ok(addr) => config.bind_addr = addr,
                Err(e) => tracing::warn!(
                    "Ignoring invalid MATRIX_BIND_ADDR '{}' ({}), using {}",
                    raw,
                    e,
                    DEFAULT_BIND_ADDR
                ),
            }
        }
        if let Some(path) = lookup("MATRIX_HISTORY_FILE").filter(|p| !p.is_empty()) {
            config.history_file = PathBuf::from(path);
        }
        if let Some(path) = lookup("MATRIX_SETTINGS_FILE").filter(|p| !p.is_empty()) {
            config.settings_file = PathBuf::from(path);
        }
        if let Some(raw) = lookup("MATRIX_IN_MEMORY") {
            match raw.to_ascii_lowercase().as_str() {
                "1" | "true" | "yes" => config.in_memory = true,
                "0" | "false" | "no" | "" => config.in_memory = false,
                other => tracing::warn!("Ignoring invalid MATRIX_IN_MEMORY '{}'", other),
            }
        }

        config
    }
}
