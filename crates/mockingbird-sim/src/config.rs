//! # Simulator Configuration
//!
//! Environment-based configuration for the simulator and its CLI.

use std::env;
use std::path::PathBuf;

use chrono::TimeDelta;

/// Default tick size in milliseconds.
pub const DEFAULT_TIME_STEP_MS: i64 = 125;

/// Simulator configuration
#[derive(Debug, Clone)]
pub struct Config {
    /// Root of the resources tree; scenarios live under `scenarios/`
    pub resources_dir: PathBuf,

    /// Fixed tick size in milliseconds
    pub time_step_ms: i64,

    /// Logging level
    pub log_level: String,

    /// Emit logs as JSON
    pub log_json: bool,
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> Self {
        Self {
            resources_dir: env::var("RESOURCES_DIR")
                .map_or_else(|_| PathBuf::from("resources"), PathBuf::from),

            time_step_ms: env::var("TIME_STEP_MS")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(DEFAULT_TIME_STEP_MS),

            log_level: env::var("LOG_LEVEL").unwrap_or_else(|_| "info".to_string()),

            log_json: env::var("LOG_JSON")
                .map(|v| v == "true" || v == "1")
                .unwrap_or(false),
        }
    }

    /// Directory holding scenario categories
    pub fn scenario_dir(&self) -> PathBuf {
        self.resources_dir.join("scenarios")
    }

    /// Tick size as a duration
    pub fn time_step(&self) -> TimeDelta {
        TimeDelta::try_milliseconds(self.time_step_ms)
            .unwrap_or_else(|| TimeDelta::milliseconds(DEFAULT_TIME_STEP_MS))
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            resources_dir: PathBuf::from("resources"),
            time_step_ms: DEFAULT_TIME_STEP_MS,
            log_level: "info".to_string(),
            log_json: false,
        }
    }
}
