//! Engine configuration
//!
//! A single immutable [`EngineConfig`] replaces process-wide feature flags.
//! It is loaded (YAML or JSON) and validated once, then passed by reference
//! into every scoring call. Validation is exhaustive: every weight table must
//! name all 15 facets, so no lookup ever falls back to a silent default.

pub mod tables;

use std::collections::BTreeMap;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::calibration::CalibrationConfig;
use crate::error::{ConfigurationError, CoreError, Result};
use crate::models::{Axis, EnneagramType, Facet, Indicator, MbtiType};

pub type FacetWeights = BTreeMap<Facet, f64>;

/// Feature switches and fixed magnitudes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineOptions {
    /// Cross-term interactions followed by smoothstep shaping of composites.
    pub nonlinear_shaping: bool,
    pub mbti_modifier: bool,
    pub enneagram_modifier: bool,
    /// Base magnitude of MBTI composite deltas.
    pub modifier_alpha: f64,
    /// Magnitude of Enneagram composite deltas.
    pub modifier_beta: f64,
    /// Summed modifier delta per indicator is clamped to ±this.
    pub max_modifier_delta: f64,
    pub tie_threshold: f64,
    /// Minimum answered share of the catalog.
    pub min_response_ratio: f64,
    pub mbti_low_confidence: f64,
    pub enneagram_low_probability: f64,
}

impl Default for EngineOptions {
    fn default() -> Self {
        Self {
            nonlinear_shaping: false,
            mbti_modifier: false,
            enneagram_modifier: false,
            modifier_alpha: 5.0,
            modifier_beta: 4.0,
            max_modifier_delta: 7.0,
            tie_threshold: 5.0,
            min_response_ratio: 0.75,
            mbti_low_confidence: 0.6,
            enneagram_low_probability: 0.3,
        }
    }
}

impl EngineOptions {
    fn validate(&self, errors: &mut Vec<ConfigurationError>) {
        let mut check = |name: &str, ok: bool, reason: &str| {
            if !ok {
                errors.push(ConfigurationError::InvalidOption {
                    name: name.to_string(),
                    reason: reason.to_string(),
                });
            }
        };
        check("modifier_alpha", (0.0..=10.0).contains(&self.modifier_alpha), "must be in [0, 10]");
        check("modifier_beta", (0.0..=10.0).contains(&self.modifier_beta), "must be in [0, 10]");
        check(
            "max_modifier_delta",
            (0.0..=20.0).contains(&self.max_modifier_delta),
            "must be in [0, 20]",
        );
        check("tie_threshold", (0.0..=100.0).contains(&self.tie_threshold), "must be in [0, 100]");
        check(
            "min_response_ratio",
            self.min_response_ratio > 0.0 && self.min_response_ratio <= 1.0,
            "must be in (0, 1]",
        );
        check(
            "mbti_low_confidence",
            (0.0..=1.0).contains(&self.mbti_low_confidence),
            "must be in [0, 1]",
        );
        check(
            "enneagram_low_probability",
            (0.0..=1.0).contains(&self.enneagram_low_probability),
            "must be in [0, 1]",
        );
    }
}

/// Logistic model for one MBTI axis.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AxisModel {
    #[serde(default)]
    pub intercept: f64,
    pub weights: FacetWeights,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub struct MbtiCoefficients {
    pub ei: AxisModel,
    pub sn: AxisModel,
    pub tf: AxisModel,
    pub jp: AxisModel,
}

impl MbtiCoefficients {
    pub fn axis(&self, axis: Axis) -> &AxisModel {
        match axis {
            Axis::EI => &self.ei,
            Axis::SN => &self.sn,
            Axis::TF => &self.tf,
            Axis::JP => &self.jp,
        }
    }
}

/// Additive nudge applied when `letters` occurs contiguously in the MBTI type code.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PriorRule {
    pub letters: String,
    pub adjustments: BTreeMap<EnneagramType, f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PriorTable {
    pub version: String,
    pub rules: Vec<PriorRule>,
}

impl PriorTable {
    pub fn empty() -> Self {
        Self { version: "none".to_string(), rules: Vec::new() }
    }

    /// Summed nudges for `mbti`, index = type - 1. All matching rules apply.
    pub fn adjustments_for(&self, mbti: MbtiType) -> [f64; 9] {
        let mut out = [0.0; 9];
        for rule in self.rules.iter().filter(|r| mbti.matches_letters(&r.letters)) {
            for (t, delta) in &rule.adjustments {
                out[t.index()] += delta;
            }
        }
        out
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EngineConfig {
    #[serde(default)]
    pub options: EngineOptions,
    pub mbti: MbtiCoefficients,
    pub enneagram: BTreeMap<EnneagramType, FacetWeights>,
    pub priors: PriorTable,
    pub composites: BTreeMap<Indicator, FacetWeights>,
    #[serde(default)]
    pub calibration: CalibrationConfig,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            options: EngineOptions::default(),
            mbti: tables::default_mbti(),
            enneagram: tables::default_enneagram(),
            priors: tables::default_priors(),
            composites: tables::default_composites(),
            calibration: CalibrationConfig::default(),
        }
    }
}

impl EngineConfig {
    pub fn with_options(mut self, options: EngineOptions) -> Self {
        self.options = options;
        self
    }

    pub fn with_calibration(mut self, calibration: CalibrationConfig) -> Self {
        self.calibration = calibration;
        self
    }

    pub fn with_priors(mut self, priors: PriorTable) -> Self {
        self.priors = priors;
        self
    }

    pub fn from_yaml_str(text: &str) -> Result<Self> {
        let config: EngineConfig = serde_yaml::from_str(text)?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_json_str(text: &str) -> Result<Self> {
        let config: EngineConfig = serde_json::from_str(text)?;
        config.validate()?;
        Ok(config)
    }

    /// Load by extension: `.json` as JSON, anything else as YAML.
    pub fn load(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path).map_err(|e| {
            CoreError::Deserialization(format!("cannot read {}: {e}", path.display()))
        })?;
        let config = match path.extension().and_then(|e| e.to_str()) {
            Some("json") => Self::from_json_str(&text)?,
            _ => Self::from_yaml_str(&text)?,
        };
        log::info!(
            "loaded engine config from {} (priors {})",
            path.display(),
            config.priors.version
        );
        Ok(config)
    }

    pub fn to_yaml(&self) -> Result<String> {
        serde_yaml::to_string(self).map_err(|e| CoreError::Serialization(e.to_string()))
    }

    /// Fail fast on any gap; all problems are reported together.
    pub fn validate(&self) -> std::result::Result<(), ConfigurationError> {
        let mut errors = Vec::new();
        self.options.validate(&mut errors);

        for axis in Axis::ALL {
            let model = self.mbti.axis(axis);
            check_complete(&format!("mbti.{}", axis.pair()), &model.weights, &mut errors);
            if !model.intercept.is_finite() {
                errors.push(ConfigurationError::InvalidOption {
                    name: format!("mbti.{}.intercept", axis.pair()),
                    reason: "must be finite".to_string(),
                });
            }
        }

        for t in EnneagramType::ALL {
            match self.enneagram.get(&t) {
                Some(weights) => check_complete(&format!("enneagram.{t}"), weights, &mut errors),
                None => errors.extend(Facet::ALL.iter().map(|f| ConfigurationError::MissingWeight {
                    table: format!("enneagram.{t}"),
                    facet: *f,
                })),
            }
        }

        for rule in &self.priors.rules {
            let valid = !rule.letters.is_empty()
                && rule.letters.chars().all(|c| "EINSTFJP".contains(c));
            if !valid {
                errors.push(ConfigurationError::InvalidOption {
                    name: format!("priors.{}", rule.letters),
                    reason: "letters must be a non-empty subset of EINSTFJP".to_string(),
                });
            }
        }

        for indicator in Indicator::ALL {
            let usable = self.composites.get(&indicator).map_or(false, |subset| {
                !subset.is_empty()
                    && subset.values().all(|w| w.is_finite())
                    && subset.values().map(|w| w.abs()).sum::<f64>() > 0.0
            });
            if !usable {
                errors.push(ConfigurationError::EmptyComposite {
                    indicator: indicator.name().to_string(),
                });
            }
        }

        errors.extend(self.calibration.validate());

        match errors.len() {
            0 => Ok(()),
            1 => Err(errors.remove(0)),
            _ => Err(ConfigurationError::Multiple(errors)),
        }
    }
}

fn check_complete(table: &str, weights: &FacetWeights, errors: &mut Vec<ConfigurationError>) {
    for facet in Facet::ALL {
        match weights.get(&facet) {
            Some(w) if w.is_finite() => {}
            _ => errors.push(ConfigurationError::MissingWeight {
                table: table.to_string(),
                facet,
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_is_complete() {
        EngineConfig::default().validate().unwrap();
    }

    #[test]
    fn load_reads_yaml_files_and_reports_missing_ones() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("engine.yaml");
        std::fs::write(&path, EngineConfig::default().to_yaml().unwrap()).unwrap();
        assert_eq!(EngineConfig::load(&path).unwrap(), EngineConfig::default());

        let err = EngineConfig::load(&dir.path().join("absent.yaml")).unwrap_err();
        assert!(err.to_string().contains("cannot read"));
    }

    #[test]
    fn default_config_round_trips_through_yaml() {
        let cfg = EngineConfig::default();
        let yaml = cfg.to_yaml().unwrap();
        let back = EngineConfig::from_yaml_str(&yaml).unwrap();
        assert_eq!(back, cfg);
    }

    #[test]
    fn default_config_round_trips_through_json() {
        let cfg = EngineConfig::default();
        let json = serde_json::to_string(&cfg).unwrap();
        let back = EngineConfig::from_json_str(&json).unwrap();
        assert_eq!(back, cfg);
    }

    #[test]
    fn missing_facet_weight_fails_fast() {
        let mut cfg = EngineConfig::default();
        cfg.mbti.ei.weights.remove(&Facet::Modesty);
        match cfg.validate() {
            Err(ConfigurationError::MissingWeight { table, facet }) => {
                assert_eq!(table, "mbti.E/I");
                assert_eq!(facet, Facet::Modesty);
            }
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn missing_enneagram_type_lists_all_facets() {
        let mut cfg = EngineConfig::default();
        cfg.enneagram.remove(&EnneagramType::Four);
        match cfg.validate() {
            Err(ConfigurationError::Multiple(errors)) => assert_eq!(errors.len(), 15),
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn empty_composite_is_rejected() {
        let mut cfg = EngineConfig::default();
        cfg.composites.insert(Indicator::Resilience, BTreeMap::new());
        assert!(matches!(
            cfg.validate(),
            Err(ConfigurationError::EmptyComposite { .. })
        ));
    }

    #[test]
    fn zero_weight_composite_is_rejected() {
        let mut cfg = EngineConfig::default();
        cfg.composites.insert(Indicator::Leadership, [(Facet::Grit, 0.0)].into());
        assert!(cfg.validate().is_err());
    }

    #[test]
    fn bad_prior_letters_are_rejected() {
        let mut cfg = EngineConfig::default();
        cfg.priors.rules.push(PriorRule { letters: "XY".into(), adjustments: BTreeMap::new() });
        assert!(cfg.validate().is_err());
    }

    #[test]
    fn priors_accumulate_across_matching_rules() {
        let priors = tables::default_priors();
        let enfj = priors.adjustments_for(MbtiType::Enfj);
        // NF + ENFJ
        assert!((enfj[EnneagramType::Eight.index()] - 0.6).abs() < 1e-12);
        assert!((enfj[EnneagramType::Two.index()] - 0.45).abs() < 1e-12);
        assert!((enfj[EnneagramType::Four.index()] - 0.2).abs() < 1e-12);

        let infp = priors.adjustments_for(MbtiType::Infp);
        assert!((infp[EnneagramType::Four.index()] - 0.8).abs() < 1e-12);
        assert!((infp[EnneagramType::Two.index()] + 0.15).abs() < 1e-12);

        // S and J are not adjacent in any code, so only the exact ESTJ rule fires
        let estj = priors.adjustments_for(MbtiType::Estj);
        assert!((estj[EnneagramType::One.index()] - 0.5).abs() < 1e-12);
        assert!((estj[EnneagramType::Eight.index()] + 0.3).abs() < 1e-12);
        assert_eq!(estj[EnneagramType::Six.index()], 0.0);
        assert_eq!(priors.adjustments_for(MbtiType::Isfp), [0.0; 9]);
    }

    #[test]
    fn options_default_from_partial_yaml() {
        let opts: EngineOptions = serde_yaml::from_str("nonlinear_shaping: true\n").unwrap();
        assert!(opts.nonlinear_shaping);
        assert_eq!(opts.modifier_alpha, 5.0);
        assert_eq!(opts.tie_threshold, 5.0);
    }
}
