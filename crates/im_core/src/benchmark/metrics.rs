//! Classification and calibration metrics.
//!
//! Every aggregate is a plain sum over a slice in row order, so results do
//! not depend on how predictions were computed.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::calibration::PROB_EPS;
use crate::mapping::enneagram::{rank, TOP_K};
use crate::models::{Axis, EnneagramType, MbtiType};

pub const ECE_BINS: usize = 10;

/// Mapper output for one synthetic row, next to its truth.
#[derive(Debug, Clone, PartialEq)]
pub struct Prediction {
    pub repeat: usize,
    pub mbti_truth: MbtiType,
    pub enneagram_truth: EnneagramType,
    /// `[P(E), P(N), P(F), P(P)]`
    pub axis: [f64; 4],
    pub mbti: MbtiType,
    pub enneagram: [f64; 9],
    pub logits: [f64; 9],
}

impl Prediction {
    pub fn enneagram_primary(&self) -> EnneagramType {
        rank(&self.enneagram)[0]
    }

    pub fn axis_truth(&self, axis: Axis) -> bool {
        self.mbti_truth.poles()[axis.index()]
    }
}

/// Two-sided 95% percentile interval.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Interval {
    pub low: f64,
    pub high: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AxisMetrics {
    pub accuracy: f64,
    pub auroc: f64,
    pub brier: f64,
    pub ece: f64,
    pub accuracy_ci: Interval,
    pub auroc_ci: Interval,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MbtiMetrics {
    pub axes: BTreeMap<Axis, AxisMetrics>,
    /// All four letters correct.
    pub type_accuracy: f64,
    pub mean_accuracy: f64,
    pub mean_auroc: f64,
    pub mean_brier: f64,
    pub mean_ece: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EnneaMetrics {
    pub top1: f64,
    pub top3: f64,
    pub nll: f64,
    /// Multiclass Brier, `Σ_k (p_k - y_k)²` averaged over rows.
    pub brier: f64,
    /// ECE of the max-probability confidence.
    pub ece: f64,
    pub top1_ci: Interval,
    pub top3_ci: Interval,
}

fn mean(values: &[f64]) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    values.iter().sum::<f64>() / values.len() as f64
}

/// Rank-based AUROC (Mann-Whitney U with average ranks for ties).
///
/// Degenerate inputs with a single class score 0.5.
pub fn auroc(scores: &[f64], labels: &[bool]) -> f64 {
    let positives = labels.iter().filter(|l| **l).count();
    let negatives = labels.len() - positives;
    if positives == 0 || negatives == 0 {
        return 0.5;
    }

    let mut order: Vec<usize> = (0..scores.len()).collect();
    order.sort_by(|a, b| scores[*a].total_cmp(&scores[*b]));

    let mut rank_sum = 0.0;
    let mut i = 0;
    while i < order.len() {
        let mut j = i + 1;
        while j < order.len() && scores[order[j]] == scores[order[i]] {
            j += 1;
        }
        // 1-based ranks i+1..=j share their average
        let avg = (i + 1 + j) as f64 / 2.0;
        rank_sum += avg * order[i..j].iter().filter(|k| labels[**k]).count() as f64;
        i = j;
    }

    let p = positives as f64;
    (rank_sum - p * (p + 1.0) / 2.0) / (p * negatives as f64)
}

/// Mean squared error against 0/1 truth.
pub fn brier(probabilities: &[f64], labels: &[bool]) -> f64 {
    let errors: Vec<f64> = probabilities
        .iter()
        .zip(labels)
        .map(|(p, y)| (p - if *y { 1.0 } else { 0.0 }).powi(2))
        .collect();
    mean(&errors)
}

pub fn ece_bin(p: f64) -> usize {
    ((p * ECE_BINS as f64) as usize).min(ECE_BINS - 1)
}

/// Population-weighted |mean confidence − accuracy| over equal-width bins.
pub fn ece(confidences: &[f64], correct: &[bool]) -> f64 {
    let mut count = [0usize; ECE_BINS];
    let mut conf_sum = [0.0f64; ECE_BINS];
    let mut hit_sum = [0.0f64; ECE_BINS];
    for (p, y) in confidences.iter().zip(correct) {
        let b = ece_bin(*p);
        count[b] += 1;
        conf_sum[b] += p;
        hit_sum[b] += if *y { 1.0 } else { 0.0 };
    }
    let total: usize = count.iter().sum();
    if total == 0 {
        return 0.0;
    }
    (0..ECE_BINS)
        .filter(|b| count[*b] > 0)
        .map(|b| {
            let n = count[b] as f64;
            n * (conf_sum[b] / n - hit_sum[b] / n).abs()
        })
        .sum::<f64>()
        / total as f64
}

/// `mean(-ln p(true))`, probabilities floored at `PROB_EPS`.
pub fn nll(true_probabilities: &[f64]) -> f64 {
    let losses: Vec<f64> = true_probabilities.iter().map(|p| -p.max(PROB_EPS).ln()).collect();
    mean(&losses)
}

/// 2.5th and 97.5th percentiles with linear interpolation.
pub fn percentile_interval(values: &[f64]) -> Interval {
    if values.is_empty() {
        return Interval { low: 0.0, high: 0.0 };
    }
    let mut sorted = values.to_vec();
    sorted.sort_by(f64::total_cmp);
    Interval { low: percentile(&sorted, 0.025), high: percentile(&sorted, 0.975) }
}

fn percentile(sorted: &[f64], q: f64) -> f64 {
    let pos = q * (sorted.len() - 1) as f64;
    let lo = pos.floor() as usize;
    let hi = pos.ceil() as usize;
    sorted[lo] + (sorted[hi] - sorted[lo]) * (pos - lo as f64)
}

/// Per-repeat values of `f` in ascending repeat order.
fn per_repeat<F>(predictions: &[Prediction], f: F) -> Vec<f64>
where
    F: Fn(&[&Prediction]) -> f64,
{
    let mut groups: BTreeMap<usize, Vec<&Prediction>> = BTreeMap::new();
    for p in predictions {
        groups.entry(p.repeat).or_default().push(p);
    }
    groups.values().map(|g| f(g.as_slice())).collect()
}

fn axis_columns(rows: &[&Prediction], axis: Axis) -> (Vec<f64>, Vec<bool>) {
    rows.iter().map(|p| (p.axis[axis.index()], p.axis_truth(axis))).unzip()
}

fn accuracy(probabilities: &[f64], labels: &[bool]) -> f64 {
    let hits: Vec<f64> = probabilities
        .iter()
        .zip(labels)
        .map(|(p, y)| if (*p > 0.5) == *y { 1.0 } else { 0.0 })
        .collect();
    mean(&hits)
}

pub fn axis_metrics(predictions: &[Prediction], axis: Axis) -> AxisMetrics {
    let all: Vec<&Prediction> = predictions.iter().collect();
    let (probs, labels) = axis_columns(&all, axis);

    let acc_by_repeat = per_repeat(predictions, |rows| {
        let (p, y) = axis_columns(rows, axis);
        accuracy(&p, &y)
    });
    let auroc_by_repeat = per_repeat(predictions, |rows| {
        let (p, y) = axis_columns(rows, axis);
        auroc(&p, &y)
    });

    AxisMetrics {
        accuracy: accuracy(&probs, &labels),
        auroc: auroc(&probs, &labels),
        brier: brier(&probs, &labels),
        ece: ece(&probs, &labels),
        accuracy_ci: percentile_interval(&acc_by_repeat),
        auroc_ci: percentile_interval(&auroc_by_repeat),
    }
}

pub fn mbti_metrics(predictions: &[Prediction]) -> MbtiMetrics {
    let axes: BTreeMap<Axis, AxisMetrics> =
        Axis::ALL.iter().map(|a| (*a, axis_metrics(predictions, *a))).collect();
    let hits: Vec<f64> = predictions
        .iter()
        .map(|p| if p.mbti == p.mbti_truth { 1.0 } else { 0.0 })
        .collect();
    let column = |f: fn(&AxisMetrics) -> f64| -> f64 {
        axes.values().map(f).sum::<f64>() / axes.len() as f64
    };

    MbtiMetrics {
        type_accuracy: mean(&hits),
        mean_accuracy: column(|m| m.accuracy),
        mean_auroc: column(|m| m.auroc),
        mean_brier: column(|m| m.brier),
        mean_ece: column(|m| m.ece),
        axes,
    }
}

fn top_k_rate(rows: &[&Prediction], k: usize) -> f64 {
    let hits: Vec<f64> = rows
        .iter()
        .map(|p| {
            let hit = rank(&p.enneagram).iter().take(k).any(|t| *t == p.enneagram_truth);
            if hit {
                1.0
            } else {
                0.0
            }
        })
        .collect();
    mean(&hits)
}

pub fn enneagram_metrics(predictions: &[Prediction]) -> EnneaMetrics {
    let all: Vec<&Prediction> = predictions.iter().collect();

    let true_probs: Vec<f64> =
        predictions.iter().map(|p| p.enneagram[p.enneagram_truth.index()]).collect();
    let multiclass: Vec<f64> = predictions
        .iter()
        .map(|p| {
            p.enneagram
                .iter()
                .enumerate()
                .map(|(k, q)| {
                    let y = if k == p.enneagram_truth.index() { 1.0 } else { 0.0 };
                    (q - y).powi(2)
                })
                .sum::<f64>()
        })
        .collect();
    let (confidence, correct): (Vec<f64>, Vec<bool>) = predictions
        .iter()
        .map(|p| {
            let top = p.enneagram_primary();
            (p.enneagram[top.index()], top == p.enneagram_truth)
        })
        .unzip();

    EnneaMetrics {
        top1: top_k_rate(&all, 1),
        top3: top_k_rate(&all, TOP_K),
        nll: nll(&true_probs),
        brier: mean(&multiclass),
        ece: ece(&confidence, &correct),
        top1_ci: percentile_interval(&per_repeat(predictions, |rows| top_k_rate(rows, 1))),
        top3_ci: percentile_interval(&per_repeat(predictions, |rows| top_k_rate(rows, TOP_K))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn auroc_perfect_inverse_and_ties() {
        let labels = [false, false, true, true];
        assert_eq!(auroc(&[0.1, 0.2, 0.8, 0.9], &labels), 1.0);
        assert_eq!(auroc(&[0.9, 0.8, 0.2, 0.1], &labels), 0.0);
        assert_eq!(auroc(&[0.5; 4], &labels), 0.5);
        // one positive/negative pair tied: 3 wins + 0.5 of one pair over 4 pairs
        assert!((auroc(&[0.1, 0.8, 0.8, 0.9], &labels) - 0.875).abs() < 1e-12);
    }

    #[test]
    fn auroc_single_class_is_chance() {
        assert_eq!(auroc(&[0.2, 0.7], &[true, true]), 0.5);
    }

    #[test]
    fn brier_and_nll() {
        assert!((brier(&[1.0, 0.0, 0.5], &[true, false, true]) - 0.25 / 3.0).abs() < 1e-12);
        assert!((nll(&[1.0]) - 0.0).abs() < 1e-12);
        assert!((nll(&[0.0]) + PROB_EPS.ln()).abs() < 1e-9);
    }

    #[test]
    fn ece_counts_certainty_in_last_bin() {
        assert_eq!(ece_bin(1.0), ECE_BINS - 1);
        assert_eq!(ece_bin(0.0), 0);
        assert_eq!(ece_bin(0.95), 9);
        // perfectly calibrated bins
        assert!(ece(&[1.0, 1.0, 0.0], &[true, true, false]).abs() < 1e-12);
        // one bin, confidence 0.9, accuracy 0.5
        assert!((ece(&[0.9, 0.9], &[true, false]) - 0.4).abs() < 1e-12);
    }

    #[test]
    fn percentile_interval_interpolates() {
        let values: Vec<f64> = (0..=40).map(f64::from).collect();
        let ci = percentile_interval(&values);
        assert!((ci.low - 1.0).abs() < 1e-12);
        assert!((ci.high - 39.0).abs() < 1e-12);
        let single = percentile_interval(&[0.7]);
        assert_eq!((single.low, single.high), (0.7, 0.7));
    }

    fn prediction(
        repeat: usize,
        truth: MbtiType,
        axis: [f64; 4],
        ennea_truth: EnneagramType,
        top: usize,
    ) -> Prediction {
        let mut enneagram = [0.05; 9];
        enneagram[top] = 0.6;
        Prediction {
            repeat,
            mbti_truth: truth,
            enneagram_truth: ennea_truth,
            axis,
            mbti: MbtiType::from_poles(axis.map(|p| p > 0.5)),
            enneagram,
            logits: [0.0; 9],
        }
    }

    #[test]
    fn aggregate_metrics() {
        let preds = vec![
            prediction(0, MbtiType::Enfp, [0.9, 0.8, 0.7, 0.6], EnneagramType::Seven, 6),
            prediction(0, MbtiType::Istj, [0.2, 0.3, 0.1, 0.4], EnneagramType::One, 5),
            prediction(1, MbtiType::Enfp, [0.9, 0.8, 0.7, 0.4], EnneagramType::Seven, 6),
            prediction(1, MbtiType::Istj, [0.1, 0.1, 0.1, 0.1], EnneagramType::One, 0),
        ];
        let mbti = mbti_metrics(&preds);
        assert_eq!(mbti.axes[&Axis::EI].accuracy, 1.0);
        assert_eq!(mbti.axes[&Axis::EI].auroc, 1.0);
        assert_eq!(mbti.axes[&Axis::JP].accuracy, 0.75);
        assert_eq!(mbti.type_accuracy, 0.75);

        let ennea = enneagram_metrics(&preds);
        assert_eq!(ennea.top1, 0.75);
        // the miss ranks type 1 among the tied 0.05 entries, first by number
        assert_eq!(ennea.top3, 1.0);
        assert!((ennea.nll - (3.0 * -(0.6f64.ln()) - 0.05f64.ln()) / 4.0).abs() < 1e-9);
        // per-repeat top-1: [0.5, 1.0]
        assert!((ennea.top1_ci.low - 0.5125).abs() < 1e-12);
        assert!((ennea.top1_ci.high - 0.9875).abs() < 1e-12);
    }
}
