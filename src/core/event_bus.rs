// Copyright (c) 2026 bad-antics
// Licensed under the MIT License. See LICENSE file in the project root.
// https://github.com/bad-antics/ecam-sim

//! Event bus for collaborators (display, audio, export)

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::sync::atomic::{AtomicU64, Ordering};
use tokio::sync::broadcast;

use super::MasterState;
use crate::alarms::Alarm;
use crate::sensors::SensorSnapshot;

/// Event types in the system
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum EventType {
    AlarmRaised,
    AlarmAcknowledged,
    MasterStatusChanged,
    ReadingsUpdated,
}

/// Generic event wrapper
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Event {
    pub id: u64,
    pub event_type: EventType,
    pub timestamp: DateTime<Utc>,
    pub payload: EventPayload,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum EventPayload {
    Alarm(Alarm),
    Status { previous: MasterState, current: MasterState },
    Readings(SensorSnapshot),
}

/// Broadcast hub. Publishing never waits on, or requires, a subscriber.
pub struct EventBus {
    reading_tx: broadcast::Sender<SensorSnapshot>,
    alarm_tx: broadcast::Sender<Alarm>,
    event_tx: broadcast::Sender<Event>,
    event_counter: AtomicU64,
}

impl EventBus {
    pub fn new(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        let (reading_tx, _) = broadcast::channel(capacity);
        let (alarm_tx, _) = broadcast::channel(capacity);
        let (event_tx, _) = broadcast::channel(capacity);

        Self {
            reading_tx,
            alarm_tx,
            event_tx,
            event_counter: AtomicU64::new(0),
        }
    }

    pub fn publish_readings(&self, snapshot: SensorSnapshot) {
        let _ = self.reading_tx.send(snapshot.clone());
        self.publish_event(EventType::ReadingsUpdated, EventPayload::Readings(snapshot));
    }

    pub fn publish_alarm_raised(&self, alarm: Alarm) {
        let _ = self.alarm_tx.send(alarm.clone());
        self.publish_event(EventType::AlarmRaised, EventPayload::Alarm(alarm));
    }

    pub fn publish_alarm_acknowledged(&self, alarm: Alarm) {
        self.publish_event(EventType::AlarmAcknowledged, EventPayload::Alarm(alarm));
    }

    pub fn publish_status_change(&self, previous: MasterState, current: MasterState) {
        self.publish_event(
            EventType::MasterStatusChanged,
            EventPayload::Status { previous, current },
        );
    }

    fn publish_event(&self, event_type: EventType, payload: EventPayload) {
        let id = self.event_counter.fetch_add(1, Ordering::Relaxed);
        let event = Event {
            id,
            event_type,
            timestamp: Utc::now(),
            payload,
        };
        let _ = self.event_tx.send(event);
    }

    /// Number of events published so far
    pub fn published(&self) -> u64 {
        self.event_counter.load(Ordering::Relaxed)
    }

    pub fn subscribe_readings(&self) -> broadcast::Receiver<SensorSnapshot> {
        self.reading_tx.subscribe()
    }

    pub fn subscribe_alarms(&self) -> broadcast::Receiver<Alarm> {
        self.alarm_tx.subscribe()
    }

    pub fn subscribe_events(&self) -> broadcast::Receiver<Event> {
        self.event_tx.subscribe()
    }
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new(256)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::MasterStatus;

    #[test]
    fn test_publish_without_subscribers() {
        let bus = EventBus::new(4);
        bus.publish_readings(SensorSnapshot::default());
        bus.publish_status_change(MasterState::default(), MasterState::default());
        assert_eq!(bus.published(), 2);
    }

    #[test]
    fn test_subscriber_receives_in_order() {
        let bus = EventBus::new(8);
        let mut rx = bus.subscribe_events();
        let critical = MasterState {
            status: MasterStatus::Critical,
            warn_count: 4,
            caut_count: 1,
        };
        bus.publish_readings(SensorSnapshot::default());
        bus.publish_status_change(MasterState::default(), critical);

        let first = rx.try_recv().unwrap();
        assert_eq!(first.event_type, EventType::ReadingsUpdated);
        let second = rx.try_recv().unwrap();
        assert_eq!(second.id, first.id + 1);
        match second.payload {
            EventPayload::Status { current, .. } => assert_eq!(current.status, MasterStatus::Critical),
            other => panic!("unexpected payload {:?}", other),
        }
    }
}
