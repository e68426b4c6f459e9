// Copyright (c) 2026 bad-antics
// Licensed under the MIT License. See LICENSE file in the project root.
// https://github.com/bad-antics/ecam-sim

//! Simulation context - owns sensors, alarms and the event bus

use chrono::{DateTime, Utc};
use serde::Serialize;
use std::sync::Arc;
use tracing::{debug, info, warn};

use super::{master_state, EventBus, MasterState, SystemState};
use crate::alarms::{Alarm, AlarmCounts, AlarmEngine, AlarmLog, RaiseOutcome, TestMode};
use crate::config::{Config, ThresholdTable};
use crate::detection::{assess, Assessment};
use crate::error::ConfigResult;
use crate::random::{RandomSource, SeededSource};
use crate::sensors::{SensorSimulator, SensorSnapshot};

/// One simulated aircraft. Constructed once and passed by reference.
pub struct Simulation {
    config: Arc<Config>,
    thresholds: ThresholdTable,
    sensors: SensorSimulator,
    alarms: AlarmEngine,
    rng: Box<dyn RandomSource>,
    event_bus: Arc<EventBus>,
    state: SystemState,
    // Last published status, for change events only; queries recompute.
    last_status: MasterState,
}

/// Serializable view of the whole simulation
#[derive(Debug, Clone, Serialize)]
pub struct SimulationSummary {
    pub master: MasterState,
    pub active_alarms: Vec<Alarm>,
    pub readings: SensorSnapshot,
    pub state: SystemState,
}

impl Simulation {
    /// Validate `config` and build a simulation seeded from it
    pub fn new(config: Config) -> ConfigResult<Self> {
        let rng = SeededSource::new(config.simulation.seed);
        Self::with_random(config, Box::new(rng))
    }

    /// Build with an explicit random source
    pub fn with_random(config: Config, rng: Box<dyn RandomSource>) -> ConfigResult<Self> {
        config.validate()?;
        let thresholds = config.threshold_table()?;
        let catalog = config.fault_catalog()?;
        let now = Utc::now();

        let sensors = SensorSimulator::new(&thresholds, config.simulation.jitter_multiplier, now);
        let alarms = AlarmEngine::new(catalog, &config.simulation);

        info!(
            "Simulation ready: {} parameters, {} fault codes",
            thresholds.len(),
            alarms.catalog().len()
        );

        Ok(Self {
            config: Arc::new(config),
            thresholds,
            sensors,
            alarms,
            rng,
            event_bus: Arc::new(EventBus::default()),
            state: SystemState::default(),
            last_status: MasterState::default(),
        })
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn event_bus(&self) -> Arc<EventBus> {
        Arc::clone(&self.event_bus)
    }

    /// Fast tick: jitter every sensor and publish the snapshot
    pub fn sensor_tick(&mut self, now: DateTime<Utc>) {
        self.sensors.tick(self.rng.as_mut(), now);
        self.state.sensor_ticks += 1;
        self.event_bus.publish_readings(self.sensors.snapshot());
    }

    /// Slow tick: evaluate readings and maybe raise a fault
    pub fn alarm_tick(&mut self, now: DateTime<Utc>) -> Vec<Alarm> {
        let assessment = self.assessment();
        for (parameter, level) in assessment.exceedances() {
            debug!(parameter, %level, "Parameter outside normal band");
        }

        let raised = self.alarms.tick(&assessment, self.rng.as_mut(), now);
        self.state.alarm_checks += 1;
        for alarm in &raised {
            self.record_raised(alarm);
        }
        self.refresh_status();
        raised
    }

    /// Raise a specific fault code outside the probability roll
    pub fn raise(&mut self, code: &str, now: DateTime<Utc>) -> RaiseOutcome {
        let outcome = self.alarms.raise(code, now);
        match &outcome {
            RaiseOutcome::Raised(alarm) => {
                self.record_raised(alarm);
                self.refresh_status();
            }
            RaiseOutcome::Duplicate(id) => debug!(code, existing = id, "Fault already active"),
            RaiseOutcome::UnknownCode => warn!(code, "Unknown fault code"),
        }
        outcome
    }

    pub fn acknowledge(&mut self, id: u64) -> bool {
        if !self.alarms.acknowledge(id) {
            return false;
        }
        if let Some(alarm) = self.alarms.get(id) {
            self.event_bus.publish_alarm_acknowledged(alarm.clone());
        }
        self.refresh_status();
        true
    }

    /// Acknowledge every active alarm; returns how many changed
    pub fn acknowledge_all(&mut self) -> usize {
        let acknowledged = self.alarms.acknowledge_all();
        let count = acknowledged.len();
        for alarm in acknowledged {
            self.event_bus.publish_alarm_acknowledged(alarm);
        }
        if count > 0 {
            self.refresh_status();
        }
        count
    }

    pub fn readings(&self) -> SensorSnapshot {
        self.sensors.snapshot()
    }

    pub fn assessment(&self) -> Assessment {
        assess(&self.sensors.snapshot(), &self.thresholds)
    }

    pub fn thresholds(&self) -> &ThresholdTable {
        &self.thresholds
    }

    pub fn active_alarms(&self) -> Vec<Alarm> {
        self.alarms.active_alarms()
    }

    pub fn counts(&self) -> AlarmCounts {
        self.alarms.counts()
    }

    pub fn alarm_log(&self) -> &AlarmLog {
        self.alarms.log()
    }

    /// Derived from the alarm log on every call
    pub fn master_state(&self) -> MasterState {
        master_state(self.alarms.counts(), self.config.simulation.max_alarms_before_critical)
    }

    /// Override a reading through the validator
    pub fn set_reading(&mut self, parameter: &str, value: f64, now: DateTime<Utc>) -> Option<f64> {
        self.sensors.set_value(parameter, value, now)
    }

    /// Override a reading from untyped input
    pub fn set_reading_text(&mut self, parameter: &str, raw: &str, now: DateTime<Utc>) -> Option<f64> {
        self.sensors.set_text(parameter, raw, now)
    }

    pub fn set_jitter_multiplier(&mut self, multiplier: f64) -> bool {
        self.sensors.set_jitter_multiplier(multiplier)
    }

    pub fn set_test_mode(&mut self, mode: Option<TestMode>) {
        if mode.is_some() {
            info!("Alarm test mode enabled");
        }
        self.alarms.set_test_mode(mode);
    }

    pub fn state(&self) -> SystemState {
        self.state.clone()
    }

    pub fn summary(&self) -> SimulationSummary {
        SimulationSummary {
            master: self.master_state(),
            active_alarms: self.active_alarms(),
            readings: self.readings(),
            state: self.state(),
        }
    }

    fn record_raised(&mut self, alarm: &Alarm) {
        self.state.alarms_raised += 1;
        self.state.last_alarm = Some(alarm.timestamp);
        self.event_bus.publish_alarm_raised(alarm.clone());
    }

    fn refresh_status(&mut self) {
        let current = self.master_state();
        if current.status != self.last_status.status {
            info!("Master status {} -> {}", self.last_status.status, current.status);
            self.event_bus.publish_status_change(self.last_status, current);
        }
        self.last_status = current;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::alarms::{AlarmLevel, FaultDefinition};
    use crate::core::{EventType, MasterStatus};
    use crate::random::ScriptedSource;

    fn scenario_config() -> Config {
        let mut config = Config::default();
        config.simulation.max_alarms_before_critical = 10;
        config.simulation.max_log_entries = 50;
        config.simulation.alarm_probability = 0.0;
        config.faults = (1..=12)
            .map(|i| {
                let level = if i <= 3 || i > 7 { AlarmLevel::Warning } else { AlarmLevel::Caution };
                FaultDefinition::new(&format!("F{:02}", i), &format!("FAULT {}", i), "ENG", level)
            })
            .collect();
        config
    }

    fn simulation(config: Config) -> Simulation {
        Simulation::with_random(config, Box::new(ScriptedSource::constant(0.5))).unwrap()
    }

    #[test]
    fn test_rejects_malformed_config() {
        let mut config = Config::default();
        config.thresholds[0].caution = None;
        config.thresholds[0].warning = None;
        config.thresholds[0].max = None;
        assert!(Simulation::new(config).is_err());
    }

    #[test]
    fn test_end_to_end_status_escalation() {
        let mut sim = simulation(scenario_config());
        let now = Utc::now();
        assert_eq!(sim.master_state().status, MasterStatus::Normal);

        // F01..F03 are warnings, F04..F05 cautions.
        for code in ["F01", "F02", "F03", "F04", "F05"] {
            assert!(sim.raise(code, now).alarm().is_some());
        }
        let state = sim.master_state();
        assert_eq!((state.warn_count, state.caut_count), (3, 2));
        assert_eq!(state.status, MasterStatus::Warning);

        for code in ["F06", "F07", "F08", "F09", "F10", "F11"] {
            sim.raise(code, now);
        }
        assert_eq!(sim.active_alarms().len(), 11);
        assert_eq!(sim.master_state().status, MasterStatus::Critical);
    }

    #[test]
    fn test_acknowledge_lowers_status_and_keeps_log() {
        let mut sim = simulation(scenario_config());
        let now = Utc::now();
        let id = sim.raise("F01", now).alarm().unwrap().id;
        sim.raise("F04", now);
        assert_eq!(sim.master_state().status, MasterStatus::Warning);

        assert!(sim.acknowledge(id));
        assert!(!sim.acknowledge(id));
        assert_eq!(sim.master_state().status, MasterStatus::Caution);
        assert_eq!(sim.alarm_log().len(), 2);

        assert_eq!(sim.acknowledge_all(), 1);
        assert_eq!(sim.master_state().status, MasterStatus::Normal);
    }

    #[test]
    fn test_duplicate_raise_keeps_log_length() {
        let mut sim = simulation(scenario_config());
        let now = Utc::now();
        sim.raise("F01", now);
        let before = sim.alarm_log().len();
        assert!(matches!(sim.raise("F01", now), RaiseOutcome::Duplicate(_)));
        assert_eq!(sim.alarm_log().len(), before);
    }

    #[test]
    fn test_events_published() {
        let mut sim = simulation(scenario_config());
        let mut events = sim.event_bus().subscribe_events();
        let now = Utc::now();

        sim.sensor_tick(now);
        let id = sim.raise("F01", now).alarm().unwrap().id;
        sim.acknowledge(id);

        let types: Vec<EventType> = std::iter::from_fn(|| events.try_recv().ok())
            .map(|e| e.event_type)
            .collect();
        assert_eq!(
            types,
            vec![
                EventType::ReadingsUpdated,
                EventType::AlarmRaised,
                EventType::MasterStatusChanged,
                EventType::AlarmAcknowledged,
                EventType::MasterStatusChanged,
            ]
        );
    }

    #[test]
    fn test_alarm_tick_in_test_mode() {
        let mut sim = simulation(scenario_config());
        let mut alarms = sim.event_bus().subscribe_alarms();
        sim.set_test_mode(Some(TestMode::with_codes(["F09"])));

        let raised = sim.alarm_tick(Utc::now());
        assert_eq!(raised.len(), 1);
        assert_eq!(alarms.try_recv().unwrap().code, "F09");
        assert_eq!(sim.state().alarm_checks, 1);
        assert_eq!(sim.state().alarms_raised, 1);

        sim.set_test_mode(None);
        assert!(sim.alarm_tick(Utc::now()).is_empty());
    }

    #[test]
    fn test_reading_override_drives_assessment() {
        let mut sim = simulation(Config::default());
        let now = Utc::now();
        assert_eq!(sim.set_reading("eng1_oil_press", 18.0, now), Some(18.0));
        assert_eq!(sim.assessment().system_level("ENG"), crate::detection::Level::Warning);
        assert_eq!(sim.set_reading_text("eng1_oil_press", "n/a", now), Some(57.0));
        assert_eq!(sim.set_reading("nope", 1.0, now), None);
    }

    #[test]
    fn test_summary_serializes() {
        let mut sim = simulation(scenario_config());
        sim.raise("F02", Utc::now());
        let json = serde_json::to_value(sim.summary()).unwrap();
        assert_eq!(json["master"]["status"], "warning");
        assert_eq!(json["active_alarms"][0]["code"], "F02");
        assert_eq!(json["state"]["alarms_raised"], 1);
    }
}
