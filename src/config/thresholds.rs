// Copyright (c) 2026 bad-antics
// Licensed under the MIT License. See LICENSE file in the project root.
// https://github.com/bad-antics/ecam-sim

//! Threshold definitions for monitored parameters

use serde::{Deserialize, Serialize};
use std::collections::HashSet;

use crate::error::{ConfigError, ConfigResult};

/// Limits for one monitored parameter.
///
/// A threshold is either rising-bad (`caution`, `warning`, `max`) or
/// dual-bound (`warning_lo`, `caution_lo`, `caution_hi`, `warning_hi`),
/// never both. `nominal` is allowed for either shape.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Threshold {
    pub key: String,
    pub name: String,
    pub unit: String,
    /// ECAM system the parameter belongs to (ENG, HYD, ELEC, PRESS)
    pub system: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub caution: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub warning: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max: Option<f64>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub warning_lo: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub caution_lo: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub caution_hi: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub warning_hi: Option<f64>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub nominal: Option<f64>,

    /// Per-tick perturbation range before the global jitter multiplier
    #[serde(default)]
    pub jitter: f64,
}

/// Both-extremes-bad limits
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DualBound {
    pub warning_lo: f64,
    pub caution_lo: f64,
    pub caution_hi: f64,
    pub warning_hi: f64,
}

/// Evaluation shape of a threshold
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ThresholdShape {
    Rising,
    DualBound(DualBound),
}

impl Threshold {
    /// Rising-bad parameter (higher is worse)
    #[allow(clippy::too_many_arguments)]
    pub fn rising(
        key: &str,
        name: &str,
        unit: &str,
        system: &str,
        caution: f64,
        warning: f64,
        max: f64,
        nominal: f64,
        jitter: f64,
    ) -> Self {
        Self {
            caution: Some(caution),
            warning: Some(warning),
            max: Some(max),
            nominal: Some(nominal),
            jitter,
            ..Self::bare(key, name, unit, system)
        }
    }

    /// Parameter unsafe at both extremes; `limits` is
    /// `[warning_lo, caution_lo, caution_hi, warning_hi]`.
    pub fn dual_bound(
        key: &str,
        name: &str,
        unit: &str,
        system: &str,
        limits: [f64; 4],
        nominal: f64,
        jitter: f64,
    ) -> Self {
        let [warning_lo, caution_lo, caution_hi, warning_hi] = limits;
        Self {
            warning_lo: Some(warning_lo),
            caution_lo: Some(caution_lo),
            caution_hi: Some(caution_hi),
            warning_hi: Some(warning_hi),
            nominal: Some(nominal),
            jitter,
            ..Self::bare(key, name, unit, system)
        }
    }

    fn bare(key: &str, name: &str, unit: &str, system: &str) -> Self {
        Self {
            key: key.to_string(),
            name: name.to_string(),
            unit: unit.to_string(),
            system: system.to_string(),
            caution: None,
            warning: None,
            max: None,
            warning_lo: None,
            caution_lo: None,
            caution_hi: None,
            warning_hi: None,
            nominal: None,
            jitter: 0.0,
        }
    }

    fn rising_fields(&self) -> [Option<f64>; 3] {
        [self.caution, self.warning, self.max]
    }

    fn dual_fields(&self) -> [Option<f64>; 4] {
        [self.warning_lo, self.caution_lo, self.caution_hi, self.warning_hi]
    }

    /// Complete dual-bound set, if this is a dual-bound threshold
    pub fn dual_bound_limits(&self) -> Option<DualBound> {
        Some(DualBound {
            warning_lo: self.warning_lo?,
            caution_lo: self.caution_lo?,
            caution_hi: self.caution_hi?,
            warning_hi: self.warning_hi?,
        })
    }

    pub fn shape(&self) -> ThresholdShape {
        match self.dual_bound_limits() {
            Some(limits) => ThresholdShape::DualBound(limits),
            None => ThresholdShape::Rising,
        }
    }

    /// Range the simulator keeps this parameter within.
    ///
    /// The floor is 0 unless a bound or the nominal value is negative, in
    /// which case it sits 20% beyond the lowest of them.
    pub fn simulation_range(&self) -> (f64, f64) {
        let (lowest, upper) = match self.shape() {
            ThresholdShape::DualBound(limits) => (limits.warning_lo, widen(limits.warning_hi)),
            ThresholdShape::Rising => {
                let lowest = self
                    .rising_fields()
                    .into_iter()
                    .chain([self.nominal])
                    .flatten()
                    .fold(f64::INFINITY, f64::min);
                let upper = self
                    .max
                    .or(self.warning.map(widen))
                    .or(self.caution.map(widen))
                    .unwrap_or(0.0);
                (lowest, upper)
            }
        };
        let lower = if lowest.is_finite() { (lowest * 1.2).min(0.0) } else { 0.0 };
        (lower, upper.max(lower))
    }

    /// Starting value for the simulator
    pub fn initial_value(&self) -> f64 {
        if let Some(nominal) = self.nominal {
            return nominal;
        }
        match self.shape() {
            ThresholdShape::DualBound(limits) => (limits.caution_lo + limits.caution_hi) / 2.0,
            ThresholdShape::Rising => self
                .caution
                .or(self.warning)
                .map(|v| v * 0.8)
                .or(self.max.map(|m| m * 0.5))
                .unwrap_or(0.0),
        }
    }

    /// Check the bound invariants
    pub fn validate(&self) -> ConfigResult<()> {
        let mut present = self
            .rising_fields()
            .into_iter()
            .chain(self.dual_fields())
            .chain([self.nominal])
            .flatten();
        if present.any(|v| !v.is_finite()) || !self.jitter.is_finite() || self.jitter < 0.0 {
            return Err(ConfigError::NonFiniteBound { key: self.key.clone() });
        }

        let has_rising = self.caution.is_some() || self.warning.is_some() || self.max.is_some();
        let dual_count = self.dual_fields().iter().flatten().count();

        if has_rising && dual_count > 0 {
            return Err(ConfigError::MixedBounds(self.key.clone()));
        }

        if dual_count > 0 {
            let limits = self
                .dual_bound_limits()
                .ok_or_else(|| ConfigError::IncompleteDualBound(self.key.clone()))?;
            let mut ordered = vec![limits.warning_lo, limits.caution_lo];
            ordered.extend(self.nominal);
            ordered.extend([limits.caution_hi, limits.warning_hi]);
            return self.check_increasing(&ordered, "warning_lo < caution_lo < nominal < caution_hi < warning_hi");
        }

        if !has_rising {
            return Err(ConfigError::NoBounds(self.key.clone()));
        }
        let ordered: Vec<f64> = self.rising_fields().into_iter().flatten().collect();
        self.check_increasing(&ordered, "caution < warning < max")
    }

    fn check_increasing(&self, values: &[f64], rule: &str) -> ConfigResult<()> {
        if values.windows(2).all(|w| w[0] < w[1]) {
            Ok(())
        } else {
            Err(ConfigError::BoundOrder {
                key: self.key.clone(),
                detail: format!("expected {}, got {:?}", rule, values),
            })
        }
    }
}

/// 20% further from zero, upward
fn widen(v: f64) -> f64 {
    v + v.abs() * 0.2
}

/// Validated, immutable threshold table
#[derive(Debug, Clone)]
pub struct ThresholdTable {
    entries: Vec<Threshold>,
}

impl ThresholdTable {
    pub fn new(entries: Vec<Threshold>) -> ConfigResult<Self> {
        let mut seen = HashSet::new();
        for threshold in &entries {
            threshold.validate()?;
            if !seen.insert(threshold.key.as_str()) {
                return Err(ConfigError::DuplicateThreshold(threshold.key.clone()));
            }
        }
        Ok(Self { entries })
    }

    pub fn get(&self, key: &str) -> Option<&Threshold> {
        self.entries.iter().find(|t| t.key == key)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Threshold> {
        self.entries.iter()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// A320-style engine, hydraulic, electrical and pressurisation limits
pub fn default_thresholds() -> Vec<Threshold> {
    vec![
        Threshold::rising("eng1_n1", "ENG 1 N1", "%", "ENG", 95.0, 101.0, 110.0, 85.0, 1.5),
        Threshold::rising("eng2_n1", "ENG 2 N1", "%", "ENG", 95.0, 101.0, 110.0, 85.0, 1.5),
        Threshold::rising("eng1_egt", "ENG 1 EGT", "°C", "ENG", 900.0, 950.0, 1100.0, 620.0, 8.0),
        Threshold::rising("eng2_egt", "ENG 2 EGT", "°C", "ENG", 900.0, 950.0, 1100.0, 620.0, 8.0),
        Threshold::rising("eng1_oil_temp", "ENG 1 OIL TEMP", "°C", "ENG", 140.0, 155.0, 180.0, 90.0, 2.0),
        Threshold::rising("eng2_oil_temp", "ENG 2 OIL TEMP", "°C", "ENG", 140.0, 155.0, 180.0, 90.0, 2.0),
        Threshold::dual_bound("eng1_oil_press", "ENG 1 OIL PRESS", "psi", "ENG", [20.0, 30.0, 85.0, 95.0], 60.0, 2.0),
        Threshold::dual_bound("eng2_oil_press", "ENG 2 OIL PRESS", "psi", "ENG", [20.0, 30.0, 85.0, 95.0], 60.0, 2.0),
        Threshold::dual_bound("hyd_green_press", "HYD G PRESS", "psi", "HYD", [1500.0, 2500.0, 3200.0, 3500.0], 3000.0, 40.0),
        Threshold::dual_bound("hyd_yellow_press", "HYD Y PRESS", "psi", "HYD", [1500.0, 2500.0, 3200.0, 3500.0], 3000.0, 40.0),
        Threshold::dual_bound("elec_dc_bus1", "DC BUS 1", "V", "ELEC", [22.0, 25.0, 30.0, 32.0], 28.0, 0.3),
        Threshold::dual_bound("elec_dc_bus2", "DC BUS 2", "V", "ELEC", [22.0, 25.0, 30.0, 32.0], 28.0, 0.3),
        Threshold::rising("cab_alt", "CAB ALT", "ft", "PRESS", 8800.0, 10000.0, 15000.0, 6000.0, 150.0),
        Threshold::rising("cab_delta_p", "CAB DELTA P", "psi", "PRESS", 8.5, 9.0, 10.0, 7.5, 0.1),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_table_is_valid() {
        let table = ThresholdTable::new(default_thresholds()).unwrap();
        assert_eq!(table.len(), default_thresholds().len());
        assert!(table.get("eng1_oil_press").is_some());
    }

    #[test]
    fn test_threshold_without_bounds_rejected() {
        let mut threshold = Threshold::rising("x", "X", "", "ENG", 1.0, 2.0, 3.0, 0.5, 0.1);
        threshold.caution = None;
        threshold.warning = None;
        threshold.max = None;
        assert!(matches!(threshold.validate(), Err(ConfigError::NoBounds(_))));
    }

    #[test]
    fn test_rising_order_enforced() {
        let threshold = Threshold::rising("x", "X", "", "ENG", 101.0, 95.0, 110.0, 85.0, 1.0);
        assert!(matches!(threshold.validate(), Err(ConfigError::BoundOrder { .. })));
    }

    #[test]
    fn test_dual_bound_order_enforced() {
        let threshold = Threshold::dual_bound("p", "P", "psi", "ENG", [20.0, 30.0, 85.0, 95.0], 90.0, 1.0);
        assert!(matches!(threshold.validate(), Err(ConfigError::BoundOrder { .. })));
    }

    #[test]
    fn test_incomplete_and_mixed_rejected() {
        let mut partial = Threshold::dual_bound("p", "P", "psi", "ENG", [20.0, 30.0, 85.0, 95.0], 60.0, 1.0);
        partial.warning_hi = None;
        assert!(matches!(partial.validate(), Err(ConfigError::IncompleteDualBound(_))));

        let mut mixed = Threshold::dual_bound("p", "P", "psi", "ENG", [20.0, 30.0, 85.0, 95.0], 60.0, 1.0);
        mixed.caution = Some(50.0);
        assert!(matches!(mixed.validate(), Err(ConfigError::MixedBounds(_))));
    }

    #[test]
    fn test_duplicate_key_rejected() {
        let entries = vec![
            Threshold::rising("n1", "N1", "%", "ENG", 95.0, 101.0, 110.0, 85.0, 1.0),
            Threshold::rising("n1", "N1", "%", "ENG", 95.0, 101.0, 110.0, 85.0, 1.0),
        ];
        assert!(matches!(ThresholdTable::new(entries), Err(ConfigError::DuplicateThreshold(_))));
    }

    #[test]
    fn test_simulation_range() {
        let n1 = Threshold::rising("n1", "N1", "%", "ENG", 95.0, 101.0, 110.0, 85.0, 1.0);
        assert_eq!(n1.simulation_range(), (0.0, 110.0));
        assert_eq!(n1.initial_value(), 85.0);

        let volts = Threshold::dual_bound("v", "V", "V", "ELEC", [22.0, 25.0, 30.0, 32.0], 28.0, 0.3);
        let (lo, hi) = volts.simulation_range();
        assert_eq!(lo, 0.0);
        assert!((hi - 38.4).abs() < 1e-9);
    }

    #[test]
    fn test_max_only_threshold_accepted() {
        let mut threshold = Threshold::rising("x", "X", "", "ENG", 1.0, 2.0, 40.0, 0.5, 0.1);
        threshold.caution = None;
        threshold.warning = None;
        threshold.nominal = None;
        assert!(threshold.validate().is_ok());
        assert!(ThresholdTable::new(vec![threshold.clone()]).is_ok());
        assert_eq!(threshold.simulation_range(), (0.0, 40.0));
        assert_eq!(threshold.initial_value(), 20.0);
        assert_eq!(crate::detection::evaluate(39.0, &threshold), crate::detection::Level::Normal);
    }

    #[test]
    fn test_negative_limits_extend_range_below_zero() {
        let temp = Threshold::dual_bound("t", "T", "°C", "ENG", [-40.0, -20.0, 20.0, 40.0], 0.0, 1.0);
        let (lo, hi) = temp.simulation_range();
        assert!((lo + 48.0).abs() < 1e-9);
        assert!((hi - 48.0).abs() < 1e-9);

        let cold = Threshold::rising("c", "C", "°C", "ENG", -20.0, -10.0, -5.0, -30.0, 1.0);
        assert!(cold.validate().is_ok());
        let (lo, hi) = cold.simulation_range();
        assert!((lo + 36.0).abs() < 1e-9);
        assert_eq!(hi, -5.0);
        assert!(lo < hi);
    }
}
