// Copyright (c) 2026 bad-antics
// Licensed under the MIT License. See LICENSE file in the project root.
// https://github.com/bad-antics/ecam-sim

//! Fault-code catalog and selection policy

use serde::{Deserialize, Serialize};
use std::collections::HashSet;

use super::AlarmLevel;
use crate::detection::{Assessment, Level};
use crate::error::{ConfigError, ConfigResult};
use crate::random::RandomSource;

/// Static catalog entry
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FaultDefinition {
    pub code: String,
    pub message: String,
    pub system: String,
    pub level: AlarmLevel,
}

impl FaultDefinition {
    pub fn new(code: &str, message: &str, system: &str, level: AlarmLevel) -> Self {
        Self {
            code: code.to_string(),
            message: message.to_string(),
            system: system.to_string(),
            level,
        }
    }
}

/// How the alarm engine picks a fault when a check fires
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FaultSelection {
    /// Every catalog entry equally likely
    #[default]
    Uniform,
    /// Faults in already-degraded systems are more likely
    Weighted,
}

/// Validated catalog with unique codes
#[derive(Debug, Clone)]
pub struct FaultCatalog {
    faults: Vec<FaultDefinition>,
}

impl FaultCatalog {
    pub fn new(faults: Vec<FaultDefinition>) -> ConfigResult<Self> {
        if faults.is_empty() {
            return Err(ConfigError::EmptyCatalog);
        }
        let mut seen = HashSet::new();
        for fault in &faults {
            if !seen.insert(fault.code.as_str()) {
                return Err(ConfigError::DuplicateFaultCode(fault.code.clone()));
            }
        }
        Ok(Self { faults })
    }

    pub fn get(&self, code: &str) -> Option<&FaultDefinition> {
        self.faults.iter().find(|f| f.code == code)
    }

    pub fn iter(&self) -> impl Iterator<Item = &FaultDefinition> {
        self.faults.iter()
    }

    pub fn len(&self) -> usize {
        self.faults.len()
    }

    pub fn is_empty(&self) -> bool {
        self.faults.is_empty()
    }

    /// Pick one fault using `policy` and a single draw from `rng`
    pub fn select(
        &self,
        policy: FaultSelection,
        assessment: &Assessment,
        rng: &mut dyn RandomSource,
    ) -> &FaultDefinition {
        let draw = rng.next_unit();
        match policy {
            FaultSelection::Uniform => {
                let index = ((draw * self.faults.len() as f64) as usize).min(self.faults.len() - 1);
                &self.faults[index]
            }
            FaultSelection::Weighted => {
                let weights: Vec<f64> = self
                    .faults
                    .iter()
                    .map(|f| selection_weight(assessment.system_level(&f.system)))
                    .collect();
                let total: f64 = weights.iter().sum();
                let mut target = draw * total;
                for (fault, weight) in self.faults.iter().zip(&weights) {
                    if target < *weight {
                        return fault;
                    }
                    target -= weight;
                }
                &self.faults[self.faults.len() - 1]
            }
        }
    }
}

fn selection_weight(level: Level) -> f64 {
    match level {
        Level::Normal => 1.0,
        Level::Caution => 3.0,
        Level::Warning => 5.0,
    }
}

/// Built-in ECAM fault list
pub fn default_faults() -> Vec<FaultDefinition> {
    use AlarmLevel::{Caution, Warning};
    vec![
        FaultDefinition::new("ENG1_FIRE", "ENG 1 FIRE", "ENG", Warning),
        FaultDefinition::new("ENG2_FIRE", "ENG 2 FIRE", "ENG", Warning),
        FaultDefinition::new("ENG1_OIL_LO_PR", "ENG 1 OIL LO PR", "ENG", Warning),
        FaultDefinition::new("ENG2_OIL_LO_PR", "ENG 2 OIL LO PR", "ENG", Warning),
        FaultDefinition::new("ENG1_EGT_OVERLIMIT", "ENG 1 EGT OVER LIMIT", "ENG", Caution),
        FaultDefinition::new("ENG2_EGT_OVERLIMIT", "ENG 2 EGT OVER LIMIT", "ENG", Caution),
        FaultDefinition::new("HYD_G_SYS_LO_PR", "HYD G SYS LO PR", "HYD", Caution),
        FaultDefinition::new("HYD_Y_SYS_LO_PR", "HYD Y SYS LO PR", "HYD", Caution),
        FaultDefinition::new("HYD_G_RSVR_OVHT", "HYD G RSVR OVHT", "HYD", Caution),
        FaultDefinition::new("ELEC_GEN1_FAULT", "ELEC GEN 1 FAULT", "ELEC", Caution),
        FaultDefinition::new("ELEC_DC_BUS1_FAULT", "ELEC DC BUS 1 FAULT", "ELEC", Caution),
        FaultDefinition::new("ELEC_AC_ESS_BUS_FAULT", "ELEC AC ESS BUS FAULT", "ELEC", Warning),
        FaultDefinition::new("CAB_PR_EXCESS_ALT", "CAB PR EXCESS CAB ALT", "PRESS", Warning),
        FaultDefinition::new("CAB_PR_SYS1_FAULT", "CAB PR SYS 1 FAULT", "PRESS", Caution),
        FaultDefinition::new("APU_FIRE", "APU FIRE", "APU", Warning),
    ]
}
