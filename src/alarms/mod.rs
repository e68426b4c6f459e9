//! Alarm module - fault catalog, bounded alarm log and the alarm engine

mod catalog;
mod engine;
mod log;

pub use catalog::{default_faults, FaultCatalog, FaultDefinition, FaultSelection};
pub use engine::{AlarmEngine, RaiseOutcome, TestMode};
pub use log::AlarmLog;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::detection::Level;

/// Severity of a fault; warning is more severe than caution
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AlarmLevel {
    Caution,
    Warning,
}

impl From<AlarmLevel> for Level {
    fn from(level: AlarmLevel) -> Self {
        match level {
            AlarmLevel::Caution => Level::Caution,
            AlarmLevel::Warning => Level::Warning,
        }
    }
}

impl fmt::Display for AlarmLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AlarmLevel::Caution => f.write_str("caution"),
            AlarmLevel::Warning => f.write_str("warning"),
        }
    }
}

/// A raised fault
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Alarm {
    pub id: u64,
    pub timestamp: DateTime<Utc>,
    pub code: String,
    pub message: String,
    pub level: AlarmLevel,
    pub system: String,
    pub acknowledged: bool,
}

impl Alarm {
    pub fn is_active(&self) -> bool {
        !self.acknowledged
    }
}

/// Active (unacknowledged) alarms by level
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AlarmCounts {
    pub warn_count: usize,
    pub caut_count: usize,
}

impl AlarmCounts {
    pub fn new(warn_count: usize, caut_count: usize) -> Self {
        Self { warn_count, caut_count }
    }

    pub fn total(&self) -> usize {
        self.warn_count + self.caut_count
    }
}
