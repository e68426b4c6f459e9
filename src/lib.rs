// Copyright (c) 2026 bad-antics
// Licensed under the MIT License. See LICENSE file in the project root.
// https://github.com/bad-antics/ecam-sim

//! ECAM Sim - aircraft systems monitoring simulator
//!
//! Generates plausible engine, hydraulic, electrical and pressurisation
//! telemetry, classifies it against caution/warning limits, raises and
//! tracks alarms, and derives a master status for the whole aircraft.
//!
//! # Architecture
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────────┐
//! │                    SimulationClock                           │
//! │        sensor tick (fast)        alarm check (slow)          │
//! ├──────────────────────────────────────────────────────────────┤
//! │  ┌───────────┐  ┌────────────┐  ┌─────────────┐  ┌────────┐  │
//! │  │  Sensor   │→ │ Threshold  │→ │   Alarm     │→ │ Master │  │
//! │  │ Simulator │  │ Evaluation │  │   Engine    │  │ Status │  │
//! │  └───────────┘  └────────────┘  └─────────────┘  └────────┘  │
//! │        ↓                              ↓              ↓       │
//! │  ┌────────────────────────────────────────────────────────┐  │
//! │  │                       Event Bus                         │  │
//! │  └────────────────────────────────────────────────────────┘  │
//! │        ↓ display          ↓ audio          ↓ export          │
//! └──────────────────────────────────────────────────────────────┘
//! ```

#![allow(dead_code)]

pub mod alarms;
pub mod config;
pub mod core;
pub mod detection;
pub mod error;
pub mod random;
pub mod sensors;

// Re-exports for convenience
pub use alarms::{Alarm, AlarmCounts, AlarmEngine, AlarmLevel, FaultDefinition, FaultSelection, TestMode};
pub use config::{Config, SimulationConfig, Threshold};
pub use core::{EventBus, MasterState, MasterStatus, Simulation, SimulationClock};
pub use detection::Level;
pub use error::ConfigError;
pub use sensors::{SensorReading, SensorSimulator, SensorSnapshot};

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Display name
pub const NAME: &str = "ECAM Sim";
