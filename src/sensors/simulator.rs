// Copyright (c) 2026 bad-antics
// Licensed under the MIT License. See LICENSE file in the project root.
// https://github.com/bad-antics/ecam-sim

//! Sensor simulator - jittered telemetry for every monitored parameter

use chrono::{DateTime, Utc};
use tracing::{debug, trace};

use super::validator::{validate, validate_text};
use super::{SensorReading, SensorSnapshot};
use crate::config::ThresholdTable;
use crate::random::RandomSource;

/// Perturb `current` by a uniform delta in `[-range, +range]` and keep the
/// result inside `[min, max]`.
pub fn jitter(current: f64, range: f64, min: f64, max: f64, rng: &mut dyn RandomSource) -> f64 {
    let delta = (rng.next_unit() - 0.5) * 2.0 * range;
    validate(current + delta, min, max)
}

/// One simulated parameter
#[derive(Debug, Clone)]
struct Channel {
    key: String,
    value: f64,
    range: f64,
    min: f64,
    max: f64,
    timestamp: DateTime<Utc>,
}

/// Simulates telemetry for every parameter of a threshold table
pub struct SensorSimulator {
    channels: Vec<Channel>,
    jitter_multiplier: f64,
    ticks: u64,
}

impl SensorSimulator {
    pub fn new(table: &ThresholdTable, jitter_multiplier: f64, now: DateTime<Utc>) -> Self {
        let channels = table
            .iter()
            .map(|threshold| {
                let (min, max) = threshold.simulation_range();
                Channel {
                    key: threshold.key.clone(),
                    value: validate(threshold.initial_value(), min, max),
                    range: threshold.jitter,
                    min,
                    max,
                    timestamp: now,
                }
            })
            .collect::<Vec<_>>();

        debug!("Sensor simulator created with {} channels", channels.len());

        Self {
            channels,
            jitter_multiplier,
            ticks: 0,
        }
    }

    /// Jitter every channel once
    pub fn tick(&mut self, rng: &mut dyn RandomSource, now: DateTime<Utc>) {
        for channel in &mut self.channels {
            let range = channel.range * self.jitter_multiplier;
            channel.value = jitter(channel.value, range, channel.min, channel.max, rng);
            channel.timestamp = now;
        }
        self.ticks += 1;
        trace!(tick = self.ticks, "Sensor values updated");
    }

    pub fn snapshot(&self) -> SensorSnapshot {
        SensorSnapshot::new(
            self.channels
                .iter()
                .map(|c| SensorReading::new(&c.key, c.value, c.timestamp))
                .collect(),
        )
    }

    pub fn value(&self, key: &str) -> Option<f64> {
        self.channel(key).map(|c| c.value)
    }

    /// Override a channel; returns the stored value, `None` for unknown keys.
    pub fn set_value(&mut self, key: &str, value: f64, now: DateTime<Utc>) -> Option<f64> {
        let channel = self.channels.iter_mut().find(|c| c.key == key)?;
        channel.value = validate(value, channel.min, channel.max);
        channel.timestamp = now;
        Some(channel.value)
    }

    /// Override a channel from untyped input
    pub fn set_text(&mut self, key: &str, raw: &str, now: DateTime<Utc>) -> Option<f64> {
        let channel = self.channels.iter_mut().find(|c| c.key == key)?;
        channel.value = validate_text(raw, channel.min, channel.max);
        channel.timestamp = now;
        Some(channel.value)
    }

    pub fn jitter_multiplier(&self) -> f64 {
        self.jitter_multiplier
    }

    /// Tune simulation intensity; non-positive or non-finite values are ignored.
    pub fn set_jitter_multiplier(&mut self, multiplier: f64) -> bool {
        if multiplier.is_finite() && multiplier > 0.0 {
            self.jitter_multiplier = multiplier;
            true
        } else {
            false
        }
    }

    pub fn ticks(&self) -> u64 {
        self.ticks
    }

    fn channel(&self, key: &str) -> Option<&Channel> {
        self.channels.iter().find(|c| c.key == key)
    }
}
