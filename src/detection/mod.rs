//! Detection module - threshold classification of sensor readings

mod threshold;

pub use threshold::*;

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

use crate::config::ThresholdTable;
use crate::sensors::SensorSnapshot;

/// Severity of a single reading
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Level {
    #[default]
    Normal,
    Caution,
    Warning,
}

impl fmt::Display for Level {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Level::Normal => "normal",
            Level::Caution => "caution",
            Level::Warning => "warning",
        };
        f.write_str(label)
    }
}

/// Classified state of every monitored parameter
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Assessment {
    parameters: BTreeMap<String, Level>,
    systems: BTreeMap<String, Level>,
}

impl Assessment {
    /// Record a parameter level; the system keeps its worst level.
    pub fn record(&mut self, parameter: &str, system: &str, level: Level) {
        self.parameters.insert(parameter.to_string(), level);
        let worst = self.systems.entry(system.to_string()).or_default();
        *worst = (*worst).max(level);
    }

    pub fn parameter_level(&self, parameter: &str) -> Option<Level> {
        self.parameters.get(parameter).copied()
    }

    /// Worst level in `system`, `Normal` when nothing was recorded
    pub fn system_level(&self, system: &str) -> Level {
        self.systems.get(system).copied().unwrap_or_default()
    }

    /// Parameters currently outside their normal band
    pub fn exceedances(&self) -> impl Iterator<Item = (&str, Level)> {
        self.parameters
            .iter()
            .filter(|(_, level)| **level != Level::Normal)
            .map(|(key, level)| (key.as_str(), *level))
    }

    pub fn worst(&self) -> Level {
        self.systems.values().copied().max().unwrap_or_default()
    }
}

/// Classify every reading in `snapshot` against `table`
pub fn assess(snapshot: &SensorSnapshot, table: &ThresholdTable) -> Assessment {
    let mut assessment = Assessment::default();
    for reading in snapshot.iter() {
        if let Some(threshold) = table.get(&reading.parameter) {
            assessment.record(&threshold.key, &threshold.system, evaluate(reading.value, threshold));
        }
    }
    assessment
}
