// Copyright (c) 2026 bad-antics
// Licensed under the MIT License. See LICENSE file in the project root.
// https://github.com/bad-antics/ecam-sim

//! Simulation clock - sensor and alarm-check ticks on fixed intervals
//!
//! The clock can be stepped by hand (`advance`/`step`) or driven by tokio
//! timers (`run`). Either way a tick runs to completion before the next one
//! starts, and a frozen clock drops due ticks while its schedule keeps
//! moving, so unfreezing resumes immediately.
//!
//! `start`/`stop` gate ticking in both modes. A timer-driven runner stays
//! alive across stop/start and re-arms its timers on every start; only the
//! shutdown signal ends it.

use chrono::Utc;
use parking_lot::Mutex;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{broadcast, Notify};
use tokio::time::{interval_at, Instant, MissedTickBehavior};
use tracing::{debug, info, trace, warn};

use super::Simulation;
use crate::config::SimulationConfig;

const MIN_INTERVAL: Duration = Duration::from_millis(1);

/// Most ticks of one kind replayed by a single manual `advance`
const MAX_CATCH_UP: u128 = 1000;

/// Kind of periodic work
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Tick {
    Sensor,
    AlarmCheck,
}

#[derive(Default)]
struct ClockControl {
    running: AtomicBool,
    frozen: AtomicBool,
    timers_active: AtomicBool,
    discarded: AtomicU64,
    wake: Notify,
}

impl ClockControl {
    fn start(&self) -> bool {
        let started = !self.running.swap(true, Ordering::SeqCst);
        if started {
            info!("Simulation clock started");
            self.wake.notify_one();
        }
        started
    }

    fn stop(&self) -> bool {
        let stopped = self.running.swap(false, Ordering::SeqCst);
        if stopped {
            info!("Simulation clock stopped");
            self.wake.notify_one();
        }
        stopped
    }

    fn set_frozen(&self, frozen: bool) -> bool {
        let changed = self.frozen.swap(frozen, Ordering::SeqCst) != frozen;
        if changed {
            info!(frozen, "Simulation clock freeze changed");
        }
        changed
    }

    fn is_running(&self) -> bool {
        self.running.load(Ordering::SeqCst)
    }

    fn is_frozen(&self) -> bool {
        self.frozen.load(Ordering::SeqCst)
    }
}

/// Controls a clock from another task
#[derive(Clone)]
pub struct ClockHandle {
    control: Arc<ClockControl>,
}

impl ClockHandle {
    pub fn start(&self) -> bool {
        self.control.start()
    }

    pub fn stop(&self) -> bool {
        self.control.stop()
    }

    pub fn set_frozen(&self, frozen: bool) -> bool {
        self.control.set_frozen(frozen)
    }

    pub fn is_running(&self) -> bool {
        self.control.is_running()
    }

    pub fn is_frozen(&self) -> bool {
        self.control.is_frozen()
    }
}

/// Drives sensor updates and alarm checks
pub struct SimulationClock {
    sensor_interval: Duration,
    alarm_interval: Duration,
    control: Arc<ClockControl>,
    elapsed: Duration,
    next_sensor: Duration,
    next_alarm: Duration,
}

impl SimulationClock {
    pub fn new(sensor_interval: Duration, alarm_interval: Duration) -> Self {
        let sensor_interval = sensor_interval.max(MIN_INTERVAL);
        let alarm_interval = alarm_interval.max(MIN_INTERVAL);
        Self {
            sensor_interval,
            alarm_interval,
            control: Arc::new(ClockControl::default()),
            elapsed: Duration::ZERO,
            next_sensor: sensor_interval,
            next_alarm: alarm_interval,
        }
    }

    pub fn from_config(config: &SimulationConfig) -> Self {
        Self::new(config.update_interval(), config.alarm_check_interval())
    }

    pub fn handle(&self) -> ClockHandle {
        ClockHandle {
            control: Arc::clone(&self.control),
        }
    }

    /// Returns false if already running
    pub fn start(&self) -> bool {
        self.control.start()
    }

    /// Returns false if already stopped
    pub fn stop(&self) -> bool {
        self.control.stop()
    }

    /// Returns whether the frozen state changed
    pub fn set_frozen(&self, frozen: bool) -> bool {
        self.control.set_frozen(frozen)
    }

    pub fn is_running(&self) -> bool {
        self.control.is_running()
    }

    pub fn is_frozen(&self) -> bool {
        self.control.is_frozen()
    }

    /// Ticks dropped while frozen or skipped by a capped catch-up
    pub fn discarded(&self) -> u64 {
        self.control.discarded.load(Ordering::Relaxed)
    }

    pub fn elapsed(&self) -> Duration {
        self.elapsed
    }

    /// Manual stepping: move simulated time forward and return the ticks
    /// now due, in schedule order. A stopped clock does not advance.
    ///
    /// Time saturates at `Duration::MAX`. At most `MAX_CATCH_UP` ticks of
    /// each kind are replayed; older ones are skipped and counted as
    /// discarded.
    pub fn advance(&mut self, dt: Duration) -> Vec<Tick> {
        if !self.is_running() {
            return Vec::new();
        }
        self.elapsed = self.elapsed.saturating_add(dt);

        let mut due = Vec::new();
        let skipped = catch_up(&mut self.next_sensor, self.sensor_interval, self.elapsed, Tick::Sensor, &mut due)
            .saturating_add(catch_up(
                &mut self.next_alarm,
                self.alarm_interval,
                self.elapsed,
                Tick::AlarmCheck,
                &mut due,
            ));
        if skipped > 0 {
            self.control.discarded.fetch_add(skipped, Ordering::Relaxed);
            debug!(skipped, "Clock catch-up capped, oldest ticks skipped");
        }
        due.sort();

        if self.is_frozen() {
            self.control.discarded.fetch_add(due.len() as u64, Ordering::Relaxed);
            trace!(dropped = due.len(), "Clock frozen, ticks discarded");
            return Vec::new();
        }
        due.into_iter().map(|(_, tick)| tick).collect()
    }

    /// Advance by `dt` and run every due tick against `simulation`
    pub fn step(&mut self, simulation: &mut Simulation, dt: Duration) -> Vec<Tick> {
        let ticks = self.advance(dt);
        for tick in &ticks {
            apply(simulation, *tick);
        }
        ticks
    }

    /// Timer-driven loop until `shutdown` fires.
    ///
    /// Timers are armed only while the clock is started; a stopped clock
    /// waits here without ticking and re-arms on the next `start`. A prior
    /// `stop` is honoured. A second concurrent call returns at once without
    /// registering timers.
    pub async fn run(&self, simulation: Arc<Mutex<Simulation>>, mut shutdown: broadcast::Receiver<()>) {
        if self.control.timers_active.swap(true, Ordering::SeqCst) {
            warn!("Simulation clock timers already registered");
            return;
        }

        'session: loop {
            while !self.control.is_running() {
                tokio::select! {
                    _ = self.control.wake.notified() => {}
                    _ = shutdown.recv() => break 'session,
                }
            }

            let start = Instant::now();
            let mut sensor_timer = interval_at(start + self.sensor_interval, self.sensor_interval);
            sensor_timer.set_missed_tick_behavior(MissedTickBehavior::Skip);
            let mut alarm_timer = interval_at(start + self.alarm_interval, self.alarm_interval);
            alarm_timer.set_missed_tick_behavior(MissedTickBehavior::Skip);

            debug!(
                "Clock timers armed: sensors every {:?}, alarm checks every {:?}",
                self.sensor_interval, self.alarm_interval
            );

            loop {
                tokio::select! {
                    _ = sensor_timer.tick() => self.fire(&simulation, Tick::Sensor),
                    _ = alarm_timer.tick() => self.fire(&simulation, Tick::AlarmCheck),
                    _ = self.control.wake.notified() => {
                        if !self.control.is_running() {
                            debug!("Clock timers released");
                            continue 'session;
                        }
                    }
                    _ = shutdown.recv() => break 'session,
                }
            }
        }

        info!("Simulation clock shutting down...");
        self.control.running.store(false, Ordering::SeqCst);
        self.control.timers_active.store(false, Ordering::SeqCst);
    }

    fn fire(&self, simulation: &Mutex<Simulation>, tick: Tick) {
        if self.is_frozen() {
            self.control.discarded.fetch_add(1, Ordering::Relaxed);
            return;
        }
        apply(&mut simulation.lock(), tick);
    }
}

/// Queue the ticks of one kind due by `elapsed`, skipping any beyond
/// `MAX_CATCH_UP`. Returns how many were skipped.
fn catch_up(
    next: &mut Duration,
    interval: Duration,
    elapsed: Duration,
    tick: Tick,
    due: &mut Vec<(Duration, Tick)>,
) -> u64 {
    if *next > elapsed {
        return 0;
    }
    let behind = (elapsed - *next).as_nanos() / interval.as_nanos() + 1;
    let skipped = behind.saturating_sub(MAX_CATCH_UP);
    if skipped > 0 {
        *next = duration_from_nanos(next.as_nanos() + skipped * interval.as_nanos());
    }
    for _ in 0..behind.min(MAX_CATCH_UP) {
        due.push((*next, tick));
        *next = next.saturating_add(interval);
    }
    u64::try_from(skipped).unwrap_or(u64::MAX)
}

fn duration_from_nanos(nanos: u128) -> Duration {
    let secs = u64::try_from(nanos / 1_000_000_000).unwrap_or(u64::MAX);
    Duration::new(secs, (nanos % 1_000_000_000) as u32)
}

fn apply(simulation: &mut Simulation, tick: Tick) {
    let now = Utc::now();
    match tick {
        Tick::Sensor => simulation.sensor_tick(now),
        Tick::AlarmCheck => {
            simulation.alarm_tick(now);
        }
    }
}
