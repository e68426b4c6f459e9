//! Core module - simulation context, clock, status and events

mod engine;
mod event_bus;
mod scheduler;
mod status;

pub use engine::{Simulation, SimulationSummary};
pub use event_bus::{Event, EventBus, EventPayload, EventType};
pub use scheduler::{ClockHandle, SimulationClock, Tick};
pub use status::{derive_status, master_state, MasterState, MasterStatus};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Running totals for a simulation
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SystemState {
    pub sensor_ticks: u64,
    pub alarm_checks: u64,
    pub alarms_raised: u64,
    pub last_alarm: Option<DateTime<Utc>>,
}
