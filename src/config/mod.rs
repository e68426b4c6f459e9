// Copyright (c) 2026 bad-antics
// Licensed under the MIT License. See LICENSE file in the project root.
// https://github.com/bad-antics/ecam-sim

//! Configuration module

mod thresholds;

pub use thresholds::{default_thresholds, DualBound, Threshold, ThresholdShape, ThresholdTable};

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::info;

use crate::alarms::{default_faults, FaultCatalog, FaultDefinition, FaultSelection};
use crate::error::{ConfigError, ConfigResult};

/// Main application configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Application name
    pub app_name: String,

    /// Application version
    pub version: String,

    /// Log level (tracing filter directive)
    pub log_level: String,

    /// Simulation timing and alarm tuning
    pub simulation: SimulationConfig,

    /// Monitored parameters
    #[serde(default = "default_thresholds")]
    pub thresholds: Vec<Threshold>,

    /// Fault-code catalog
    #[serde(default = "default_faults")]
    pub faults: Vec<FaultDefinition>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            app_name: "ECAM Sim".to_string(),
            version: env!("CARGO_PKG_VERSION").to_string(),
            log_level: "info".to_string(),
            simulation: SimulationConfig::default(),
            thresholds: default_thresholds(),
            faults: default_faults(),
        }
    }
}

impl Config {
    /// Load and validate configuration from file
    pub fn load(path: &Path) -> ConfigResult<Self> {
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let config = Self::from_toml(&content)?;
        info!("Loaded configuration from {:?}", path);
        Ok(config)
    }

    /// Parse and validate configuration text
    pub fn from_toml(content: &str) -> ConfigResult<Self> {
        let config: Config = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    /// Save configuration to file
    pub fn save(&self, path: &Path) -> ConfigResult<()> {
        let content = toml::to_string_pretty(self)?;
        std::fs::write(path, content).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        info!("Saved configuration to {:?}", path);
        Ok(())
    }

    /// Load or create default configuration
    pub fn load_or_create(path: &Path) -> ConfigResult<Self> {
        if path.exists() {
            Self::load(path)
        } else {
            let config = Self::default();

            if let Some(parent) = path.parent() {
                std::fs::create_dir_all(parent).map_err(|source| ConfigError::Io {
                    path: parent.to_path_buf(),
                    source,
                })?;
            }

            config.save(path)?;
            Ok(config)
        }
    }

    /// Get configuration directory
    pub fn config_dir() -> PathBuf {
        dirs::config_dir()
            .map(|d| d.join("ecam-sim"))
            .unwrap_or_else(|| PathBuf::from("./config"))
    }

    /// Get default configuration path
    pub fn default_path() -> PathBuf {
        Self::config_dir().join("config.toml")
    }

    /// Reject anything the simulation cannot run with
    pub fn validate(&self) -> ConfigResult<()> {
        self.simulation.validate()?;
        self.threshold_table()?;
        self.fault_catalog()?;
        Ok(())
    }

    pub fn threshold_table(&self) -> ConfigResult<ThresholdTable> {
        ThresholdTable::new(self.thresholds.clone())
    }

    pub fn fault_catalog(&self) -> ConfigResult<FaultCatalog> {
        FaultCatalog::new(self.faults.clone())
    }
}

/// Simulation timing and alarm tuning
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SimulationConfig {
    /// Sensor update interval in milliseconds
    pub update_interval_ms: u64,

    /// Alarm check interval in milliseconds
    pub alarm_check_interval_ms: u64,

    /// Alarm log capacity
    pub max_log_entries: usize,

    /// Active alarm count at which master status turns critical
    pub max_alarms_before_critical: usize,

    /// Probability that an alarm check raises a fault
    pub alarm_probability: f64,

    /// Scale applied to every parameter's jitter range
    pub jitter_multiplier: f64,

    /// Fault selection policy
    #[serde(default)]
    pub fault_selection: FaultSelection,

    /// Fixed RNG seed for reproducible runs
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub seed: Option<u64>,
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            update_interval_ms: 1000,
            alarm_check_interval_ms: 10_000,
            max_log_entries: 50,
            max_alarms_before_critical: 5,
            alarm_probability: 0.15,
            jitter_multiplier: 1.0,
            fault_selection: FaultSelection::Uniform,
            seed: None,
        }
    }
}

impl SimulationConfig {
    pub fn update_interval(&self) -> Duration {
        Duration::from_millis(self.update_interval_ms)
    }

    pub fn alarm_check_interval(&self) -> Duration {
        Duration::from_millis(self.alarm_check_interval_ms)
    }

    pub fn validate(&self) -> ConfigResult<()> {
        let counts = [
            ("update_interval_ms", self.update_interval_ms as f64),
            ("alarm_check_interval_ms", self.alarm_check_interval_ms as f64),
            ("max_log_entries", self.max_log_entries as f64),
            ("max_alarms_before_critical", self.max_alarms_before_critical as f64),
        ];
        for (field, value) in counts {
            if value <= 0.0 {
                return Err(ConfigError::NonPositive { field, value });
            }
        }
        if !self.jitter_multiplier.is_finite() || self.jitter_multiplier <= 0.0 {
            return Err(ConfigError::NonPositive {
                field: "jitter_multiplier",
                value: self.jitter_multiplier,
            });
        }
        if !(0.0..=1.0).contains(&self.alarm_probability) {
            return Err(ConfigError::ProbabilityOutOfRange(self.alarm_probability));
        }
        Ok(())
    }
}
