// Copyright (c) 2026 bad-antics
// Licensed under the MIT License. See LICENSE file in the project root.
// https://github.com/bad-antics/ecam-sim

//! Alarm engine - raises, deduplicates and acknowledges alarms

use chrono::{DateTime, Utc};
use std::collections::VecDeque;
use tracing::{debug, info, warn};

use super::{Alarm, AlarmCounts, AlarmLevel, AlarmLog, FaultCatalog, FaultSelection};
use crate::config::SimulationConfig;
use crate::detection::Assessment;
use crate::random::RandomSource;

/// Result of asking the engine to raise a fault code
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RaiseOutcome {
    /// A new alarm was appended to the log
    Raised(Alarm),
    /// An unacknowledged alarm with this code already exists
    Duplicate(u64),
    /// The code is not in the catalog
    UnknownCode,
}

impl RaiseOutcome {
    pub fn alarm(&self) -> Option<&Alarm> {
        match self {
            RaiseOutcome::Raised(alarm) => Some(alarm),
            _ => None,
        }
    }
}

/// Deterministic overrides for scripted scenarios
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TestMode {
    /// Every alarm check fires, bypassing the probability draw
    pub force_raise: bool,
    /// Codes raised in order before falling back to the selection policy
    pub scripted_codes: VecDeque<String>,
}

impl TestMode {
    pub fn forced() -> Self {
        Self {
            force_raise: true,
            scripted_codes: VecDeque::new(),
        }
    }

    pub fn with_codes<I, S>(codes: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            force_raise: true,
            scripted_codes: codes.into_iter().map(Into::into).collect(),
        }
    }
}

/// Owns the alarm log and the id counter
pub struct AlarmEngine {
    catalog: FaultCatalog,
    log: AlarmLog,
    next_id: u64,
    probability: f64,
    selection: FaultSelection,
    test_mode: Option<TestMode>,
}

impl AlarmEngine {
    pub fn new(catalog: FaultCatalog, config: &SimulationConfig) -> Self {
        Self {
            catalog,
            log: AlarmLog::new(config.max_log_entries),
            next_id: 1,
            probability: config.alarm_probability,
            selection: config.fault_selection,
            test_mode: None,
        }
    }

    /// One alarm check. Returns the alarms raised, usually none.
    pub fn tick(
        &mut self,
        assessment: &Assessment,
        rng: &mut dyn RandomSource,
        now: DateTime<Utc>,
    ) -> Vec<Alarm> {
        let forced = self.test_mode.as_ref().is_some_and(|mode| mode.force_raise);
        if !forced && rng.next_unit() >= self.probability {
            return Vec::new();
        }

        let scripted = self
            .test_mode
            .as_mut()
            .and_then(|mode| mode.scripted_codes.pop_front());
        let code = match scripted {
            Some(code) => code,
            None => self.catalog.select(self.selection, assessment, rng).code.clone(),
        };

        match self.raise(&code, now) {
            RaiseOutcome::Raised(alarm) => vec![alarm],
            RaiseOutcome::Duplicate(id) => {
                debug!(code = %code, existing = id, "Fault already active, not raised again");
                Vec::new()
            }
            RaiseOutcome::UnknownCode => {
                warn!(code = %code, "Scripted fault code not in catalog");
                Vec::new()
            }
        }
    }

    /// Raise `code` unless an unacknowledged alarm with that code exists
    pub fn raise(&mut self, code: &str, now: DateTime<Utc>) -> RaiseOutcome {
        let Some(fault) = self.catalog.get(code) else {
            return RaiseOutcome::UnknownCode;
        };
        if let Some(existing) = self.log.active_with_code(code) {
            return RaiseOutcome::Duplicate(existing.id);
        }

        let alarm = Alarm {
            id: self.next_id,
            timestamp: now,
            code: fault.code.clone(),
            message: fault.message.clone(),
            level: fault.level,
            system: fault.system.clone(),
            acknowledged: false,
        };
        self.next_id += 1;

        info!(id = alarm.id, code = %alarm.code, level = %alarm.level, "{}", alarm.message);
        for evicted in self.log.push(alarm.clone()) {
            debug!(id = evicted.id, code = %evicted.code, "Evicted from alarm log");
        }
        RaiseOutcome::Raised(alarm)
    }

    /// Acknowledge one alarm; false when unknown or already acknowledged
    pub fn acknowledge(&mut self, id: u64) -> bool {
        match self.log.get_mut(id) {
            Some(alarm) if !alarm.acknowledged => {
                alarm.acknowledged = true;
                info!(id, code = %alarm.code, "Alarm acknowledged");
                true
            }
            _ => false,
        }
    }

    /// Acknowledge every active alarm, returning those that changed
    pub fn acknowledge_all(&mut self) -> Vec<Alarm> {
        let mut acknowledged = Vec::new();
        for alarm in self.log.iter_mut().filter(|a| !a.acknowledged) {
            alarm.acknowledged = true;
            acknowledged.push(alarm.clone());
        }
        if !acknowledged.is_empty() {
            info!("Acknowledged {} alarms", acknowledged.len());
        }
        acknowledged
    }

    /// Unacknowledged alarms, most recent first
    pub fn active_alarms(&self) -> Vec<Alarm> {
        self.log.iter().rev().filter(|a| a.is_active()).cloned().collect()
    }

    pub fn counts(&self) -> AlarmCounts {
        self.log
            .iter()
            .filter(|a| a.is_active())
            .fold(AlarmCounts::default(), |mut counts, alarm| {
                match alarm.level {
                    AlarmLevel::Warning => counts.warn_count += 1,
                    AlarmLevel::Caution => counts.caut_count += 1,
                }
                counts
            })
    }

    pub fn log(&self) -> &AlarmLog {
        &self.log
    }

    pub fn catalog(&self) -> &FaultCatalog {
        &self.catalog
    }

    pub fn get(&self, id: u64) -> Option<&Alarm> {
        self.log.get(id)
    }

    pub fn set_test_mode(&mut self, mode: Option<TestMode>) {
        self.test_mode = mode;
    }

    pub fn test_mode(&self) -> Option<&TestMode> {
        self.test_mode.as_ref()
    }

    pub fn selection(&self) -> FaultSelection {
        self.selection
    }

    pub fn set_selection(&mut self, selection: FaultSelection) {
        self.selection = selection;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::alarms::{default_faults, FaultDefinition};
    use crate::random::ScriptedSource;

    fn engine(max_log_entries: usize, alarm_probability: f64) -> AlarmEngine {
        let config = SimulationConfig {
            max_log_entries,
            alarm_probability,
            ..SimulationConfig::default()
        };
        AlarmEngine::new(FaultCatalog::new(default_faults()).unwrap(), &config)
    }

    #[test]
    fn test_raise_assigns_monotonic_ids() {
        let mut engine = engine(10, 0.0);
        let now = Utc::now();
        let first = engine.raise("ENG1_FIRE", now).alarm().cloned().unwrap();
        let second = engine.raise("APU_FIRE", now).alarm().cloned().unwrap();
        assert!(second.id > first.id);
        assert_eq!(first.level, AlarmLevel::Warning);
        assert_eq!(first.message, "ENG 1 FIRE");
        assert!(!first.acknowledged);
    }

    #[test]
    fn test_duplicate_code_not_added() {
        let mut engine = engine(10, 0.0);
        let now = Utc::now();
        let id = engine.raise("HYD_G_SYS_LO_PR", now).alarm().unwrap().id;
        assert_eq!(engine.raise("HYD_G_SYS_LO_PR", now), RaiseOutcome::Duplicate(id));
        assert_eq!(engine.log().len(), 1);

        // Once acknowledged the same code may fire again.
        assert!(engine.acknowledge(id));
        assert!(engine.raise("HYD_G_SYS_LO_PR", now).alarm().is_some());
        assert_eq!(engine.log().len(), 2);
    }

    #[test]
    fn test_unknown_code() {
        let mut engine = engine(10, 0.0);
        assert_eq!(engine.raise("NOPE", Utc::now()), RaiseOutcome::UnknownCode);
        assert!(engine.log().is_empty());
    }

    #[test]
    fn test_acknowledge_is_idempotent() {
        let mut engine = engine(10, 0.0);
        let id = engine.raise("ENG1_FIRE", Utc::now()).alarm().unwrap().id;
        assert!(engine.acknowledge(id));
        assert!(!engine.acknowledge(id));
        assert!(!engine.acknowledge(999));
        assert!(engine.get(id).unwrap().acknowledged);
    }

    #[test]
    fn test_acknowledged_alarm_leaves_active_list_but_stays_logged() {
        let mut engine = engine(10, 0.0);
        let now = Utc::now();
        let a = engine.raise("ENG1_FIRE", now).alarm().unwrap().id;
        let b = engine.raise("ELEC_GEN1_FAULT", now).alarm().unwrap().id;
        engine.acknowledge(a);

        let active: Vec<u64> = engine.active_alarms().iter().map(|x| x.id).collect();
        assert_eq!(active, vec![b]);
        assert_eq!(engine.log().len(), 2);
        assert_eq!(engine.counts(), AlarmCounts::new(0, 1));
    }

    #[test]
    fn test_active_alarms_most_recent_first() {
        let mut engine = engine(10, 0.0);
        let now = Utc::now();
        for code in ["ENG1_FIRE", "ENG2_FIRE", "APU_FIRE"] {
            engine.raise(code, now);
        }
        let codes: Vec<String> = engine.active_alarms().into_iter().map(|a| a.code).collect();
        assert_eq!(codes, vec!["APU_FIRE", "ENG2_FIRE", "ENG1_FIRE"]);
    }

    #[test]
    fn test_log_bounded_with_fifo_eviction() {
        let mut engine = engine(3, 0.0);
        let now = Utc::now();
        let codes = ["ENG1_FIRE", "ENG2_FIRE", "APU_FIRE", "HYD_G_SYS_LO_PR", "ELEC_GEN1_FAULT"];
        for code in codes {
            engine.raise(code, now);
            assert!(engine.log().len() <= 3);
        }
        let logged: Vec<&str> = engine.log().iter().map(|a| a.code.as_str()).collect();
        assert_eq!(logged, vec!["APU_FIRE", "HYD_G_SYS_LO_PR", "ELEC_GEN1_FAULT"]);
    }

    #[test]
    fn test_acknowledge_all() {
        let mut engine = engine(10, 0.0);
        let now = Utc::now();
        engine.raise("ENG1_FIRE", now);
        engine.raise("APU_FIRE", now);
        assert_eq!(engine.acknowledge_all().len(), 2);
        assert!(engine.acknowledge_all().is_empty());
        assert_eq!(engine.counts(), AlarmCounts::default());
    }

    #[test]
    fn test_tick_respects_probability() {
        let assessment = Assessment::default();
        let now = Utc::now();

        let mut quiet = engine(10, 0.2);
        let mut rng = ScriptedSource::constant(0.5);
        assert!(quiet.tick(&assessment, &mut rng, now).is_empty());

        let mut busy = engine(10, 0.6);
        let mut rng = ScriptedSource::new(vec![0.5, 0.0]);
        let raised = busy.tick(&assessment, &mut rng, now);
        assert_eq!(raised.len(), 1);
        assert_eq!(raised[0].code, default_faults()[0].code);
    }

    #[test]
    fn test_tick_dedupes_repeat_selection() {
        let assessment = Assessment::default();
        let now = Utc::now();
        let mut engine = engine(10, 1.0);
        let mut rng = ScriptedSource::constant(0.0);
        assert_eq!(engine.tick(&assessment, &mut rng, now).len(), 1);
        assert!(engine.tick(&assessment, &mut rng, now).is_empty());
        assert_eq!(engine.log().len(), 1);
    }

    #[test]
    fn test_test_mode_scripts_faults() {
        let assessment = Assessment::default();
        let now = Utc::now();
        let mut engine = engine(10, 0.0);
        engine.set_test_mode(Some(TestMode::with_codes(["APU_FIRE", "BOGUS"])));
        let mut rng = ScriptedSource::constant(0.0);

        let raised = engine.tick(&assessment, &mut rng, now);
        assert_eq!(raised[0].code, "APU_FIRE");
        assert!(engine.tick(&assessment, &mut rng, now).is_empty());

        // Script exhausted: forced check falls back to the selection policy.
        let raised = engine.tick(&assessment, &mut rng, now);
        assert_eq!(raised.len(), 1);
        assert_eq!(raised[0].code, "ENG1_FIRE");
    }

    #[test]
    fn test_single_entry_catalog() {
        let catalog = FaultCatalog::new(vec![FaultDefinition::new(
            "ONLY",
            "ONLY FAULT",
            "ENG",
            AlarmLevel::Caution,
        )])
        .unwrap();
        let mut engine = AlarmEngine::new(catalog, &SimulationConfig::default());
        engine.set_test_mode(Some(TestMode::forced()));
        let mut rng = ScriptedSource::constant(0.7);
        let raised = engine.tick(&Assessment::default(), &mut rng, Utc::now());
        assert_eq!(raised[0].code, "ONLY");
    }
}
