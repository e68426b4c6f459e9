// Copyright (c) 2026 bad-antics
// Licensed under the MIT License. See LICENSE file in the project root.
// https://github.com/bad-antics/ecam-sim

//! Threshold evaluation

use super::Level;
use crate::config::{DualBound, Threshold, ThresholdShape};

/// Rising-bad classification; bounds are inclusive and warning wins.
pub fn classify(value: f64, threshold: &Threshold) -> Level {
    if threshold.warning.is_some_and(|warning| value >= warning) {
        Level::Warning
    } else if threshold.caution.is_some_and(|caution| value >= caution) {
        Level::Caution
    } else {
        Level::Normal
    }
}

/// Both-extremes-bad classification; bounds are inclusive.
pub fn classify_dual_bound(value: f64, limits: &DualBound) -> Level {
    if value <= limits.warning_lo || value >= limits.warning_hi {
        Level::Warning
    } else if value <= limits.caution_lo || value >= limits.caution_hi {
        Level::Caution
    } else {
        Level::Normal
    }
}

/// Classify `value` with whichever shape `threshold` has
pub fn evaluate(value: f64, threshold: &Threshold) -> Level {
    match threshold.shape() {
        ThresholdShape::DualBound(limits) => classify_dual_bound(value, &limits),
        ThresholdShape::Rising => classify(value, threshold),
    }
}
