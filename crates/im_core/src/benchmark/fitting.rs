//! Offline fitting of calibration parameters from benchmark predictions.

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use super::metrics::{brier, ece_bin, nll, Prediction, ECE_BINS};
use crate::calibration::{
    pava, platt_probability, CalibrationModel, Knot, KnotList, MbtiCalibration,
    TemperatureScaling,
};
use crate::error::ConfigurationError;
use crate::models::Axis;

pub const DEFAULT_TEMPERATURE_GRID: [f64; 4] = [1.3, 1.4, 1.5, 1.6];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FitMethod {
    #[default]
    Isotonic,
    Platt,
}

impl FitMethod {
    pub fn name(self) -> &'static str {
        match self {
            FitMethod::Isotonic => "isotonic",
            FitMethod::Platt => "platt",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PlattFit {
    pub a: f64,
    pub b: f64,
    pub brier: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TemperatureFit {
    pub temperature: f64,
    pub nll: f64,
}

/// `(mean predicted %, observed positive %, count)` for each non-empty bin.
pub fn bin_statistics(probabilities: &[f64], labels: &[bool]) -> Vec<(f64, f64, f64)> {
    let mut count = [0usize; ECE_BINS];
    let mut p_sum = [0.0f64; ECE_BINS];
    let mut y_sum = [0.0f64; ECE_BINS];
    for (p, y) in probabilities.iter().zip(labels) {
        let b = ece_bin(*p);
        count[b] += 1;
        p_sum[b] += p;
        y_sum[b] += if *y { 1.0 } else { 0.0 };
    }
    (0..ECE_BINS)
        .filter(|b| count[*b] > 0)
        .map(|b| {
            let n = count[b] as f64;
            (p_sum[b] / n * 100.0, y_sum[b] / n * 100.0, n)
        })
        .collect()
}

/// Monotone knots from binned accuracy, pooled with PAVA.
pub fn fit_isotonic(probabilities: &[f64], labels: &[bool]) -> Result<KnotList, ConfigurationError> {
    let pooled = pava(&bin_statistics(probabilities, labels));
    KnotList::new(pooled.into_iter().map(|(x, y)| Knot::new(x, y)).collect())
}

/// Grid search `a ∈ [0.5, 2.0]` step 0.1, `b ∈ [-2, 2]` step 0.2, minimising Brier.
///
/// The first grid point wins on equal loss.
pub fn fit_platt(probabilities: &[f64], labels: &[bool]) -> PlattFit {
    let mut best = PlattFit { a: 1.0, b: 0.0, brier: f64::INFINITY };
    for i in 0..=15 {
        let a = 0.5 + f64::from(i) * 0.1;
        for j in 0..=20 {
            let b = -2.0 + f64::from(j) * 0.2;
            let calibrated: Vec<f64> =
                probabilities.iter().map(|p| platt_probability(*p, a, b)).collect();
            let loss = brier(&calibrated, labels);
            if loss < best.brier {
                best = PlattFit { a, b, brier: loss };
            }
        }
    }
    best
}

/// Pick the temperature from `grid` minimising NLL of the true class.
pub fn fit_temperature(
    logits: &[[f64; 9]],
    truth: &[usize],
    grid: &[f64],
) -> Option<TemperatureFit> {
    let mut best: Option<TemperatureFit> = None;
    for &t in grid {
        let scaling = TemperatureScaling::new(t, 1.0);
        let true_probs: Vec<f64> = logits
            .iter()
            .zip(truth)
            .map(|(l, k)| scaling.apply(l).get(*k).copied().unwrap_or(0.0))
            .collect();
        let loss = nll(&true_probs);
        debug!(temperature = t, nll = loss, "temperature candidate");
        if best.map_or(true, |b| loss < b.nll) {
            best = Some(TemperatureFit { temperature: t, nll: loss });
        }
    }
    best
}

/// One fitted model per MBTI axis, full strength.
pub fn fit_mbti(predictions: &[Prediction], method: FitMethod) -> MbtiCalibration {
    let mut calibration = MbtiCalibration::default();
    for axis in Axis::ALL {
        let (probs, labels): (Vec<f64>, Vec<bool>) = predictions
            .iter()
            .map(|p| (p.axis[axis.index()], p.axis_truth(axis)))
            .unzip();
        let model = match method {
            FitMethod::Isotonic => match fit_isotonic(&probs, &labels) {
                Ok(knots) => CalibrationModel::isotonic(knots, 1.0),
                Err(e) => {
                    warn!(axis = axis.pair(), error = %e, "isotonic fit rejected; keeping identity");
                    CalibrationModel::identity()
                }
            },
            FitMethod::Platt => {
                let fit = fit_platt(&probs, &labels);
                debug!(axis = axis.pair(), a = fit.a, b = fit.b, brier = fit.brier, "platt fit");
                CalibrationModel::platt(fit.a, fit.b, 1.0)
            }
        };
        calibration.set_axis(axis, model);
    }
    calibration
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rows(p: f64, n: usize, positives: usize) -> (Vec<f64>, Vec<bool>) {
        (vec![p; n], (0..n).map(|i| i < positives).collect())
    }

    fn concat(a: (Vec<f64>, Vec<bool>), b: (Vec<f64>, Vec<bool>)) -> (Vec<f64>, Vec<bool>) {
        ([a.0, b.0].concat(), [a.1, b.1].concat())
    }

    #[test]
    fn isotonic_maps_confidence_to_observed_rate() {
        let (p, y) = concat(rows(0.05, 10, 3), rows(0.95, 10, 7));
        let knots = fit_isotonic(&p, &y).unwrap();
        assert_eq!(knots.knots().len(), 4);
        assert!((knots.evaluate(95.0) - 70.0).abs() < 1e-9);
        assert!((knots.evaluate(5.0) - 30.0).abs() < 1e-9);
        let model = CalibrationModel::isotonic(knots, 1.0);
        assert!((model.apply_probability(0.95) - 0.7).abs() < 1e-9);
    }

    #[test]
    fn isotonic_pools_violations() {
        let (p, y) = concat(rows(0.35, 10, 6), rows(0.65, 10, 4));
        let knots = fit_isotonic(&p, &y).unwrap();
        // pooled into one block at x = 50, y = 50, plus both endpoints
        assert_eq!(knots.knots().len(), 3);
        assert!((knots.evaluate(50.0) - 50.0).abs() < 1e-9);
    }

    #[test]
    fn platt_keeps_calibrated_inputs() {
        let (p, y) = concat(rows(0.2, 10, 2), rows(0.8, 10, 8));
        let fit = fit_platt(&p, &y);
        assert!((fit.a - 1.0).abs() < 1e-9);
        assert!(fit.b.abs() < 1e-9);
    }

    #[test]
    fn platt_shrinks_overconfidence() {
        let (p, y) = concat(rows(0.02, 20, 6), rows(0.98, 20, 14));
        let fit = fit_platt(&p, &y);
        assert!(fit.a < 1.0);
    }

    #[test]
    fn temperature_softens_overconfident_logits() {
        let mut logit = [0.0; 9];
        logit[0] = 4.0;
        let logits = vec![logit; 4];
        let truth = vec![0, 1, 0, 1];
        let fit = fit_temperature(&logits, &truth, &[1.0, 2.0]).unwrap();
        assert_eq!(fit.temperature, 2.0);
        assert!(fit_temperature(&logits, &truth, &[]).is_none());
    }
}
