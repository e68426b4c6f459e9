//! Sensor module - simulated telemetry and reading validation

mod reading;
mod simulator;
mod validator;

pub use reading::{SensorReading, SensorSnapshot};
pub use simulator::{jitter, SensorSimulator};
pub use validator::{validate, validate_text};
