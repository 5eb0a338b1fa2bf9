//! Post-hoc calibration
//!
//! Applies fitted parameters to scores and probabilities. Parameters are
//! chosen offline by the benchmark harness and injected through
//! [`crate::config::EngineConfig`]; nothing here fits or mutates them.
//!
//! - `isotonic`: monotone knot lists and the PAVA fit helper
//! - `scaling`: sigmoid/logit/softmax and the Platt/temperature families

pub mod isotonic;
pub mod scaling;

use serde::{Deserialize, Serialize};

use crate::error::ConfigurationError;
use crate::models::Axis;

pub use isotonic::{pava, Knot, KnotList};
pub use scaling::{
    blend, logit, platt_probability, platt_score, sigmoid, softmax, softmax_with_temperature,
    PROB_EPS,
};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(tag = "method", rename_all = "snake_case")]
pub enum CalibrationMethod {
    #[default]
    Identity,
    Isotonic {
        knots: KnotList,
    },
    /// Score space: `sigmoid(a·(x/100 - b))·100`.
    /// Probability space: `sigmoid(a·logit(p) + b)`.
    Platt {
        a: f64,
        b: f64,
    },
}

/// One calibration method plus its blend strength.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CalibrationModel {
    #[serde(flatten)]
    pub method: CalibrationMethod,
    #[serde(default = "default_strength")]
    pub strength: f64,
}

fn default_strength() -> f64 {
    1.0
}

impl Default for CalibrationModel {
    fn default() -> Self {
        Self::identity()
    }
}

impl CalibrationModel {
    pub fn identity() -> Self {
        Self { method: CalibrationMethod::Identity, strength: 1.0 }
    }

    pub fn isotonic(knots: KnotList, strength: f64) -> Self {
        Self { method: CalibrationMethod::Isotonic { knots }, strength }
    }

    pub fn platt(a: f64, b: f64, strength: f64) -> Self {
        Self { method: CalibrationMethod::Platt { a, b }, strength }
    }

    pub fn is_identity(&self) -> bool {
        matches!(self.method, CalibrationMethod::Identity) || self.strength == 0.0
    }

    pub fn method_name(&self) -> &'static str {
        match self.method {
            CalibrationMethod::Identity => "identity",
            CalibrationMethod::Isotonic { .. } => "isotonic",
            CalibrationMethod::Platt { .. } => "platt",
        }
    }

    /// Calibrate a 0..100 score and blend with the input.
    pub fn apply_score(&self, x: f64) -> f64 {
        let calibrated = match &self.method {
            CalibrationMethod::Identity => return x,
            CalibrationMethod::Isotonic { knots } => knots.evaluate(x),
            CalibrationMethod::Platt { a, b } => platt_score(x, *a, *b),
        };
        blend(x, calibrated, self.strength)
    }

    /// Calibrate a binary class probability and blend with the input.
    ///
    /// Isotonic knots are read on the percent scale.
    pub fn apply_probability(&self, p: f64) -> f64 {
        let calibrated = match &self.method {
            CalibrationMethod::Identity => return p,
            CalibrationMethod::Isotonic { knots } => knots.evaluate(p * 100.0) / 100.0,
            CalibrationMethod::Platt { a, b } => platt_probability(p, *a, *b),
        };
        blend(p, calibrated, self.strength).clamp(0.0, 1.0)
    }

    pub fn validate(&self, name: &str) -> Result<(), ConfigurationError> {
        if !(0.0..=1.0).contains(&self.strength) {
            return Err(ConfigurationError::StrengthOutOfRange(self.strength));
        }
        if let CalibrationMethod::Platt { a, b } = self.method {
            if !a.is_finite() || !b.is_finite() {
                return Err(ConfigurationError::InvalidOption {
                    name: format!("{name}.platt"),
                    reason: format!("non-finite parameters a={a}, b={b}"),
                });
            }
        }
        Ok(())
    }
}

/// Softmax temperature scaling for the Enneagram distribution.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TemperatureScaling {
    pub temperature: f64,
    #[serde(default = "default_strength")]
    pub strength: f64,
}

impl Default for TemperatureScaling {
    fn default() -> Self {
        Self { temperature: 1.0, strength: 1.0 }
    }
}

impl TemperatureScaling {
    pub fn new(temperature: f64, strength: f64) -> Self {
        Self { temperature, strength }
    }

    pub fn is_identity(&self) -> bool {
        self.temperature == 1.0 || self.strength == 0.0
    }

    /// `(1 - s)·softmax(z) + s·softmax(z / T)`; still sums to 1.
    pub fn apply(&self, logits: &[f64]) -> Vec<f64> {
        let base = softmax(logits);
        if self.is_identity() {
            return base;
        }
        let scaled = softmax_with_temperature(logits, self.temperature);
        base.iter()
            .zip(&scaled)
            .map(|(b, c)| blend(*b, *c, self.strength))
            .collect()
    }

    pub fn validate(&self) -> Result<(), ConfigurationError> {
        if !self.temperature.is_finite() || self.temperature <= 0.0 {
            return Err(ConfigurationError::InvalidTemperature(self.temperature));
        }
        if !(0.0..=1.0).contains(&self.strength) {
            return Err(ConfigurationError::StrengthOutOfRange(self.strength));
        }
        Ok(())
    }
}

/// Per-axis probability calibration for MBTI.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(rename_all = "UPPERCASE")]
pub struct MbtiCalibration {
    #[serde(default)]
    pub ei: CalibrationModel,
    #[serde(default)]
    pub sn: CalibrationModel,
    #[serde(default)]
    pub tf: CalibrationModel,
    #[serde(default)]
    pub jp: CalibrationModel,
}

impl MbtiCalibration {
    pub fn uniform(model: CalibrationModel) -> Self {
        Self { ei: model.clone(), sn: model.clone(), tf: model.clone(), jp: model }
    }

    pub fn axis(&self, axis: Axis) -> &CalibrationModel {
        match axis {
            Axis::EI => &self.ei,
            Axis::SN => &self.sn,
            Axis::TF => &self.tf,
            Axis::JP => &self.jp,
        }
    }

    pub fn set_axis(&mut self, axis: Axis, model: CalibrationModel) {
        match axis {
            Axis::EI => self.ei = model,
            Axis::SN => self.sn = model,
            Axis::TF => self.tf = model,
            Axis::JP => self.jp = model,
        }
    }

    pub fn is_identity(&self) -> bool {
        Axis::ALL.iter().all(|a| self.axis(*a).is_identity())
    }
}

/// All calibration parameters, loaded once with the engine config.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct CalibrationConfig {
    /// Applied to composite indicator T-scores.
    #[serde(default)]
    pub composite: CalibrationModel,
    #[serde(default)]
    pub mbti: MbtiCalibration,
    #[serde(default)]
    pub enneagram: TemperatureScaling,
}

impl CalibrationConfig {
    pub fn validate(&self) -> Vec<ConfigurationError> {
        let mut errors = Vec::new();
        if let Err(e) = self.composite.validate("composite") {
            errors.push(e);
        }
        for axis in Axis::ALL {
            if let Err(e) = self.mbti.axis(axis).validate(axis.pair()) {
                errors.push(e);
            }
        }
        if let Err(e) = self.enneagram.validate() {
            errors.push(e);
        }
        errors
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn isotonic_full_strength_maps_fifty_to_seventy() {
        let model = CalibrationModel::isotonic(KnotList::parse("0:0,50:70,100:100").unwrap(), 1.0);
        assert_eq!(model.apply_score(50.0), 70.0);
    }

    #[test]
    fn strength_blends_with_input() {
        let model = CalibrationModel::isotonic(KnotList::parse("0:0,50:70,100:100").unwrap(), 0.5);
        assert!((model.apply_score(50.0) - 60.0).abs() < 1e-12);
    }

    #[test]
    fn identity_is_a_no_op() {
        let model = CalibrationModel::identity();
        assert_eq!(model.apply_score(37.5), 37.5);
        assert_eq!(model.apply_probability(0.42), 0.42);
    }

    #[test]
    fn platt_probability_is_monotone() {
        let model = CalibrationModel::platt(0.8, -0.2, 1.0);
        let mut prev = 0.0;
        for i in 1..100 {
            let p = model.apply_probability(i as f64 / 100.0);
            assert!(p >= prev);
            prev = p;
        }
    }

    #[test]
    fn temperature_keeps_distribution_normalized() {
        let t = TemperatureScaling::new(1.4, 0.7);
        let p = t.apply(&[0.3, -1.2, 2.0, 0.0]);
        assert!((p.iter().sum::<f64>() - 1.0).abs() < 1e-9);
    }

    #[test]
    fn config_round_trips_through_yaml() {
        let mut cfg = CalibrationConfig::default();
        cfg.composite = CalibrationModel::isotonic(KnotList::parse("50:70").unwrap(), 0.8);
        cfg.mbti.set_axis(Axis::TF, CalibrationModel::platt(1.2, 0.4, 1.0));
        cfg.enneagram = TemperatureScaling::new(1.5, 1.0);
        let yaml = serde_yaml::to_string(&cfg).unwrap();
        let back: CalibrationConfig = serde_yaml::from_str(&yaml).unwrap();
        assert_eq!(back, cfg);
    }

    #[test]
    fn parses_knots_from_string_config() {
        let yaml = "composite:\n  method: isotonic\n  knots: \"0:0,50:70,100:100\"\n  strength: 1.0\n";
        let cfg: CalibrationConfig = serde_yaml::from_str(yaml).unwrap();
        assert_eq!(cfg.composite.method_name(), "isotonic");
        assert_eq!(cfg.composite.apply_score(50.0), 70.0);
    }

    #[test]
    fn validation_reports_every_problem() {
        let mut cfg = CalibrationConfig::default();
        cfg.composite.strength = 1.5;
        cfg.enneagram.temperature = 0.0;
        let errors = cfg.validate();
        assert_eq!(errors.len(), 2);
    }
}
