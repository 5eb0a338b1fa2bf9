//! Benchmark orchestration and the versioned report.

use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use tracing::info;

use super::canonical::{run_phase1, Phase1Summary};
use super::confusion::{top_confusions, ConfusionEntry, CONFUSION_TOP};
use super::fitting::{fit_mbti, fit_temperature, FitMethod, DEFAULT_TEMPERATURE_GRID};
use super::generator::{generate, TestRow, DEFAULT_REPEATS, DEFAULT_SEED};
use super::metrics::{enneagram_metrics, mbti_metrics, EnneaMetrics, MbtiMetrics, Prediction};
use crate::calibration::{CalibrationConfig, MbtiCalibration, TemperatureScaling};
use crate::config::EngineConfig;
use crate::engine::{Engine, ENGINE_VERSION};
use crate::error::{ConfigurationError, Result};
use crate::mapping::{map_enneagram, map_mbti};

const TARGET_MBTI_ACCURACY: f64 = 0.65;
const TARGET_ENNEAGRAM_TOP3: f64 = 0.70;
const TARGET_ECE: f64 = 0.08;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BenchmarkOptions {
    pub seed: u64,
    pub repeats: usize,
    /// Fitting family for the MBTI axes.
    pub method: FitMethod,
    pub temperature_grid: Vec<f64>,
    pub thresholds: Thresholds,
}

impl Default for BenchmarkOptions {
    fn default() -> Self {
        Self {
            seed: DEFAULT_SEED,
            repeats: DEFAULT_REPEATS,
            method: FitMethod::default(),
            temperature_grid: DEFAULT_TEMPERATURE_GRID.to_vec(),
            thresholds: Thresholds::default(),
        }
    }
}

impl BenchmarkOptions {
    pub fn validate(&self) -> std::result::Result<(), ConfigurationError> {
        if self.repeats == 0 {
            return Err(ConfigurationError::InvalidOption {
                name: "repeats".to_string(),
                reason: "must be at least 1".to_string(),
            });
        }
        if self.temperature_grid.is_empty()
            || self.temperature_grid.iter().any(|t| !t.is_finite() || *t <= 0.0)
        {
            return Err(ConfigurationError::InvalidOption {
                name: "temperature_grid".to_string(),
                reason: "needs at least one finite temperature > 0".to_string(),
            });
        }
        Ok(())
    }
}

/// Pass/fail limits applied to the calibrated metrics.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Thresholds {
    pub mbti_auroc_min: f64,
    pub mbti_ece_max: f64,
    pub enneagram_top3_min: f64,
    pub enneagram_ece_max: f64,
}

impl Default for Thresholds {
    fn default() -> Self {
        Self {
            mbti_auroc_min: 0.70,
            mbti_ece_max: 0.15,
            enneagram_top3_min: 0.56,
            enneagram_ece_max: 0.12,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Verdict {
    pub mbti_pass: bool,
    pub enneagram_pass: bool,
    pub passed: bool,
    pub failures: Vec<String>,
}

impl Thresholds {
    /// MBTI is judged on the axis means.
    pub fn evaluate(&self, mbti: &MbtiMetrics, enneagram: &EnneaMetrics) -> Verdict {
        let mut mbti_failures = Vec::new();
        if mbti.mean_auroc < self.mbti_auroc_min {
            mbti_failures
                .push(format!("MBTI AUROC {:.3} < {:.2}", mbti.mean_auroc, self.mbti_auroc_min));
        }
        if mbti.mean_ece > self.mbti_ece_max {
            mbti_failures.push(format!("MBTI ECE {:.3} > {:.2}", mbti.mean_ece, self.mbti_ece_max));
        }

        let mut enneagram_failures = Vec::new();
        if enneagram.top3 < self.enneagram_top3_min {
            enneagram_failures.push(format!(
                "Enneagram top-3 {:.3} < {:.2}",
                enneagram.top3, self.enneagram_top3_min
            ));
        }
        if enneagram.ece > self.enneagram_ece_max {
            enneagram_failures.push(format!(
                "Enneagram ECE {:.3} > {:.2}",
                enneagram.ece, self.enneagram_ece_max
            ));
        }

        let mbti_pass = mbti_failures.is_empty();
        let enneagram_pass = enneagram_failures.is_empty();
        Verdict {
            mbti_pass,
            enneagram_pass,
            passed: mbti_pass && enneagram_pass,
            failures: [mbti_failures, enneagram_failures].concat(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PhaseMetrics {
    pub mbti: MbtiMetrics,
    pub enneagram: EnneaMetrics,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Phase2 {
    pub before: PhaseMetrics,
    pub after: PhaseMetrics,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct EceSnapshot {
    pub mbti_ece: f64,
    pub enneagram_ece: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CalibrationReport {
    /// e.g. `"isotonic+temperature"`
    pub method: String,
    /// Ready to drop into [`EngineConfig::calibration`].
    pub fitted: CalibrationConfig,
    pub temperature_nll: f64,
    pub before: EceSnapshot,
    pub after: EceSnapshot,
    /// `before - after`; positive means calibration helped.
    pub improvement: EceSnapshot,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BenchmarkReport {
    pub engine_version: String,
    pub seed: u64,
    pub repeat_count: usize,
    pub row_count: usize,
    pub phase1: Phase1Summary,
    pub phase2: Phase2,
    pub calibration: CalibrationReport,
    pub confusion: Vec<ConfusionEntry>,
    pub thresholds: Thresholds,
    pub verdict: Verdict,
    pub recommendations: Vec<String>,
}

/// Run the mappers over synthetic rows, bypassing the Likert layer.
pub fn predict(
    rows: &[TestRow],
    config: &EngineConfig,
    calibration: &CalibrationConfig,
) -> Vec<Prediction> {
    rows.par_iter()
        .map(|row| {
            let z = row.facet_z();
            let mbti = map_mbti(&z, &config.mbti, &calibration.mbti);
            let ennea = map_enneagram(
                &z,
                &config.enneagram,
                &config.priors,
                mbti.mbti_type,
                &calibration.enneagram,
            );
            Prediction {
                repeat: row.repeat,
                mbti_truth: row.mbti,
                enneagram_truth: row.enneagram,
                axis: mbti.probabilities.positives(),
                mbti: mbti.mbti_type,
                enneagram: ennea.probabilities,
                logits: ennea.logits,
            }
        })
        .collect()
}

fn phase_metrics(predictions: &[Prediction]) -> PhaseMetrics {
    PhaseMetrics {
        mbti: mbti_metrics(predictions),
        enneagram: enneagram_metrics(predictions),
    }
}

fn snapshot(metrics: &PhaseMetrics) -> EceSnapshot {
    EceSnapshot { mbti_ece: metrics.mbti.mean_ece, enneagram_ece: metrics.enneagram.ece }
}

pub fn recommendations(metrics: &PhaseMetrics) -> Vec<String> {
    let mut out = Vec::new();
    if metrics.mbti.type_accuracy < TARGET_MBTI_ACCURACY {
        out.push(format!(
            "MBTI type accuracy {:.3} below {TARGET_MBTI_ACCURACY}: revisit T/F and J/P axis coefficients",
            metrics.mbti.type_accuracy
        ));
    }
    if metrics.enneagram.top3 < TARGET_ENNEAGRAM_TOP3 {
        out.push(format!(
            "Enneagram top-3 {:.3} below {TARGET_ENNEAGRAM_TOP3}: rebalance type weight tables",
            metrics.enneagram.top3
        ));
    }
    if metrics.mbti.mean_ece > TARGET_ECE {
        out.push(format!(
            "MBTI ECE {:.3} above {TARGET_ECE}: apply Platt scaling to the axes",
            metrics.mbti.mean_ece
        ));
    }
    if metrics.enneagram.ece > TARGET_ECE {
        out.push(format!(
            "Enneagram ECE {:.3} above {TARGET_ECE}: apply temperature scaling",
            metrics.enneagram.ece
        ));
    }
    out
}

/// Phase 1 canonical checks, then phase 2 synthetic before/after calibration.
///
/// Calibration is fitted and evaluated on the same synthetic set.
pub fn run_benchmark(engine: &Engine, options: &BenchmarkOptions) -> Result<BenchmarkReport> {
    options.validate()?;
    let config = engine.config();

    info!(seed = options.seed, repeats = options.repeats, "benchmark phase 1");
    let phase1 = run_phase1(engine)?;

    let rows = generate(options.seed, options.repeats);
    info!(rows = rows.len(), "benchmark phase 2");

    let uncalibrated = CalibrationConfig {
        composite: config.calibration.composite.clone(),
        mbti: MbtiCalibration::default(),
        enneagram: TemperatureScaling::default(),
    };
    let before_predictions = predict(&rows, config, &uncalibrated);
    let before = phase_metrics(&before_predictions);

    let mbti_calibration = fit_mbti(&before_predictions, options.method);
    let with_mbti = CalibrationConfig { mbti: mbti_calibration, ..uncalibrated.clone() };
    let intermediate = predict(&rows, config, &with_mbti);
    let logits: Vec<[f64; 9]> = intermediate.iter().map(|p| p.logits).collect();
    let truth: Vec<usize> = intermediate.iter().map(|p| p.enneagram_truth.index()).collect();
    let temperature = fit_temperature(&logits, &truth, &options.temperature_grid).ok_or_else(|| {
        ConfigurationError::InvalidOption {
            name: "temperature_grid".to_string(),
            reason: "no temperature evaluated".to_string(),
        }
    })?;
    info!(temperature = temperature.temperature, nll = temperature.nll, "temperature fitted");

    let fitted = CalibrationConfig {
        enneagram: TemperatureScaling::new(temperature.temperature, 1.0),
        ..with_mbti
    };
    let after_predictions = predict(&rows, config, &fitted);
    let after = phase_metrics(&after_predictions);

    let before_ece = snapshot(&before);
    let after_ece = snapshot(&after);
    let verdict = options.thresholds.evaluate(&after.mbti, &after.enneagram);
    let recommendations = recommendations(&after);

    info!(
        mbti_auroc = after.mbti.mean_auroc,
        mbti_ece = after.mbti.mean_ece,
        enneagram_top3 = after.enneagram.top3,
        enneagram_ece = after.enneagram.ece,
        passed = verdict.passed,
        "benchmark complete"
    );

    Ok(BenchmarkReport {
        engine_version: ENGINE_VERSION.to_string(),
        seed: options.seed,
        repeat_count: options.repeats,
        row_count: rows.len(),
        phase1,
        confusion: top_confusions(&after_predictions, CONFUSION_TOP),
        calibration: CalibrationReport {
            method: format!("{}+temperature", options.method.name()),
            fitted,
            temperature_nll: temperature.nll,
            before: before_ece,
            after: after_ece,
            improvement: EceSnapshot {
                mbti_ece: before_ece.mbti_ece - after_ece.mbti_ece,
                enneagram_ece: before_ece.enneagram_ece - after_ece.enneagram_ece,
            },
        },
        phase2: Phase2 { before, after },
        thresholds: options.thresholds.clone(),
        verdict,
        recommendations,
    })
}
