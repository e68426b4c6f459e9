// Copyright (c) 2026 bad-antics
// Licensed under the MIT License. See LICENSE file in the project root.
// https://github.com/bad-antics/ecam-sim

//! Bounded, insertion-ordered alarm log

use std::collections::VecDeque;

use super::Alarm;

/// FIFO log; the oldest entry goes first once capacity is exceeded,
/// acknowledged or not.
#[derive(Debug, Clone)]
pub struct AlarmLog {
    entries: VecDeque<Alarm>,
    capacity: usize,
}

impl AlarmLog {
    /// Capacity is at least one entry.
    pub fn new(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            entries: VecDeque::with_capacity(capacity),
            capacity,
        }
    }

    /// Append, returning whatever was evicted to stay within capacity
    pub fn push(&mut self, alarm: Alarm) -> Vec<Alarm> {
        self.entries.push_back(alarm);
        let overflow = self.entries.len().saturating_sub(self.capacity);
        self.entries.drain(..overflow).collect()
    }

    pub fn get(&self, id: u64) -> Option<&Alarm> {
        self.entries.iter().find(|a| a.id == id)
    }

    pub(crate) fn get_mut(&mut self, id: u64) -> Option<&mut Alarm> {
        self.entries.iter_mut().find(|a| a.id == id)
    }

    pub(crate) fn iter_mut(&mut self) -> impl Iterator<Item = &mut Alarm> {
        self.entries.iter_mut()
    }

    /// Unacknowledged alarm carrying `code`, if any
    pub fn active_with_code(&self, code: &str) -> Option<&Alarm> {
        self.entries.iter().find(|a| a.is_active() && a.code == code)
    }

    /// Oldest first
    pub fn iter(&self) -> impl DoubleEndedIterator<Item = &Alarm> {
        self.entries.iter()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::alarms::AlarmLevel;
    use chrono::Utc;

    fn alarm(id: u64) -> Alarm {
        Alarm {
            id,
            timestamp: Utc::now(),
            code: format!("CODE_{}", id),
            message: "TEST".to_string(),
            level: AlarmLevel::Caution,
            system: "ENG".to_string(),
            acknowledged: false,
        }
    }

    #[test]
    fn test_evicts_oldest_first() {
        let mut log = AlarmLog::new(3);
        for id in 1..=3 {
            assert!(log.push(alarm(id)).is_empty());
        }
        let evicted = log.push(alarm(4));
        assert_eq!(evicted.len(), 1);
        assert_eq!(evicted[0].id, 1);
        assert_eq!(log.len(), 3);
        assert_eq!(log.iter().map(|a| a.id).collect::<Vec<_>>(), vec![2, 3, 4]);
    }

    #[test]
    fn test_acknowledged_entries_evicted_too() {
        let mut log = AlarmLog::new(2);
        log.push(alarm(1));
        log.get_mut(1).unwrap().acknowledged = true;
        log.push(alarm(2));
        log.push(alarm(3));
        assert!(log.get(1).is_none());
        assert_eq!(log.len(), 2);
    }

    #[test]
    fn test_zero_capacity_keeps_one() {
        let mut log = AlarmLog::new(0);
        log.push(alarm(1));
        log.push(alarm(2));
        assert_eq!(log.capacity(), 1);
        assert_eq!(log.iter().map(|a| a.id).collect::<Vec<_>>(), vec![2]);
    }

    #[test]
    fn test_active_with_code() {
        let mut log = AlarmLog::new(5);
        log.push(alarm(1));
        assert_eq!(log.active_with_code("CODE_1").map(|a| a.id), Some(1));
        log.get_mut(1).unwrap().acknowledged = true;
        assert!(log.active_with_code("CODE_1").is_none());
    }
}
