// Copyright (c) 2026 bad-antics
// Licensed under the MIT License. See LICENSE file in the project root.
// https://github.com/bad-antics/ecam-sim

//! Master status aggregation

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::alarms::AlarmCounts;

/// Aircraft-wide status shown on the master banner
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MasterStatus {
    #[default]
    Normal,
    Caution,
    Warning,
    Critical,
}

impl fmt::Display for MasterStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            MasterStatus::Normal => "NORMAL",
            MasterStatus::Caution => "CAUTION",
            MasterStatus::Warning => "WARNING",
            MasterStatus::Critical => "CRITICAL",
        };
        f.write_str(label)
    }
}

/// Status plus the counts it was derived from
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MasterState {
    pub status: MasterStatus,
    pub warn_count: usize,
    pub caut_count: usize,
}

/// Critical once the active total reaches the limit, regardless of mix.
pub fn derive_status(counts: AlarmCounts, max_alarms_before_critical: usize) -> MasterStatus {
    if counts.total() >= max_alarms_before_critical {
        MasterStatus::Critical
    } else if counts.warn_count > 0 {
        MasterStatus::Warning
    } else if counts.caut_count > 0 {
        MasterStatus::Caution
    } else {
        MasterStatus::Normal
    }
}

pub fn master_state(counts: AlarmCounts, max_alarms_before_critical: usize) -> MasterState {
    MasterState {
        status: derive_status(counts, max_alarms_before_critical),
        warn_count: counts.warn_count,
        caut_count: counts.caut_count,
    }
}
