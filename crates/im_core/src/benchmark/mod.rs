//! Offline benchmark harness
//!
//! Measures mapping quality against seeded synthetic ground truth and fits
//! the calibration parameters later injected through the engine config.
//!
//! - `generator`: 144 MBTI × Enneagram truths, R seeded repeats
//! - `metrics`: accuracy, AUROC, Brier, ECE, NLL, percentile CIs
//! - `fitting`: isotonic, Platt and temperature fitting
//! - `canonical`: phase 1 extreme profiles through the full pipeline
//! - `confusion`: top misclassified pairs
//! - `report`: orchestration, thresholds and recommendations

pub mod canonical;
pub mod confusion;
pub mod fitting;
pub mod generator;
pub mod metrics;
pub mod report;

pub use canonical::{canonical_profiles, run_phase1, CanonicalCheck, Phase1Summary};
pub use confusion::{top_confusions, ConfusionEntry};
pub use fitting::{fit_isotonic, fit_mbti, fit_platt, fit_temperature, FitMethod};
pub use generator::{generate, TestRow, DEFAULT_REPEATS, DEFAULT_SEED};
pub use metrics::{AxisMetrics, EnneaMetrics, Interval, MbtiMetrics, Prediction};
pub use report::{
    predict, run_benchmark, BenchmarkOptions, BenchmarkReport, Thresholds, Verdict,
};
