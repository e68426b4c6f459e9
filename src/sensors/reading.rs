// Copyright (c) 2026 bad-antics
// Licensed under the MIT License. See LICENSE file in the project root.
// https://github.com/bad-antics/ecam-sim

//! Sensor readings and snapshots

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A single parameter reading
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SensorReading {
    pub parameter: String,
    pub value: f64,
    pub timestamp: DateTime<Utc>,
}

impl SensorReading {
    pub fn new(parameter: &str, value: f64, timestamp: DateTime<Utc>) -> Self {
        Self {
            parameter: parameter.to_string(),
            value,
            timestamp,
        }
    }
}

/// Read-only copy of all current readings
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SensorSnapshot {
    readings: Vec<SensorReading>,
}

impl SensorSnapshot {
    pub fn new(readings: Vec<SensorReading>) -> Self {
        Self { readings }
    }

    pub fn get(&self, parameter: &str) -> Option<&SensorReading> {
        self.readings.iter().find(|r| r.parameter == parameter)
    }

    pub fn value(&self, parameter: &str) -> Option<f64> {
        self.get(parameter).map(|r| r.value)
    }

    pub fn iter(&self) -> impl Iterator<Item = &SensorReading> {
        self.readings.iter()
    }

    pub fn len(&self) -> usize {
        self.readings.len()
    }

    pub fn is_empty(&self) -> bool {
        self.readings.is_empty()
    }
}
