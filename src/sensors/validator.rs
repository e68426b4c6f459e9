// Copyright (c) 2026 bad-antics
// Licensed under the MIT License. See LICENSE file in the project root.
// https://github.com/bad-antics/ecam-sim

//! Reading validation - clamps and repairs numeric values

use tracing::warn;

/// Clamp `value` into `[min, max]`.
///
/// Non-finite input is replaced by the midpoint of the bounds and reported
/// as a diagnostic. Swapped bounds are reordered and a NaN bound leaves that
/// side open. Never panics and always returns a finite number when at least
/// one bound is finite.
pub fn validate(value: f64, min: f64, max: f64) -> f64 {
    let lo = if min.is_nan() { f64::NEG_INFINITY } else { min };
    let hi = if max.is_nan() { f64::INFINITY } else { max };
    let (lo, hi) = if lo <= hi { (lo, hi) } else { (hi, lo) };

    if !value.is_finite() {
        let fallback = midpoint(lo, hi);
        warn!(value, min, max, fallback, "Invalid reading replaced by range midpoint");
        return fallback;
    }

    value.clamp(lo, hi)
}

/// Validate a textual reading; text that is not a number counts as invalid.
pub fn validate_text(raw: &str, min: f64, max: f64) -> f64 {
    let value = raw.trim().parse::<f64>().unwrap_or_else(|_| {
        warn!(raw, "Non-numeric reading");
        f64::NAN
    });
    validate(value, min, max)
}

fn midpoint(lo: f64, hi: f64) -> f64 {
    let mid = lo / 2.0 + hi / 2.0;
    if mid.is_finite() {
        mid
    } else if lo.is_finite() {
        lo
    } else if hi.is_finite() {
        hi
    } else {
        0.0
    }
}
