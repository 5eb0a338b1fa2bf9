//! Logistic and softmax primitives shared by mapping and calibration.

/// Probabilities are clamped this far from 0 and 1 before taking logs.
pub const PROB_EPS: f64 = 1e-9;

/// Numerically stable logistic function.
pub fn sigmoid(x: f64) -> f64 {
    if x >= 0.0 {
        1.0 / (1.0 + (-x).exp())
    } else {
        let e = x.exp();
        e / (1.0 + e)
    }
}

/// Inverse of [`sigmoid`], with `p` clamped to `[PROB_EPS, 1 - PROB_EPS]`.
pub fn logit(p: f64) -> f64 {
    let p = p.clamp(PROB_EPS, 1.0 - PROB_EPS);
    (p / (1.0 - p)).ln()
}

/// Platt scaling on the 0..100 score scale: `sigmoid(a·(x/100 - b))·100`.
pub fn platt_score(x: f64, a: f64, b: f64) -> f64 {
    sigmoid(a * (x / 100.0 - b)) * 100.0
}

/// Platt scaling on a binary probability: `sigmoid(a·logit(p) + b)`.
pub fn platt_probability(p: f64, a: f64, b: f64) -> f64 {
    sigmoid(a * logit(p) + b)
}

/// Softmax with max-subtraction, so `softmax(x + c) == softmax(x)`.
pub fn softmax(logits: &[f64]) -> Vec<f64> {
    softmax_with_temperature(logits, 1.0)
}

/// `softmax(logits / t)`. Callers guarantee `t > 0`.
pub fn softmax_with_temperature(logits: &[f64], temperature: f64) -> Vec<f64> {
    if logits.is_empty() {
        return Vec::new();
    }
    let scaled: Vec<f64> = logits.iter().map(|z| z / temperature).collect();
    let max = scaled.iter().copied().fold(f64::NEG_INFINITY, f64::max);
    let exps: Vec<f64> = scaled.iter().map(|z| (z - max).exp()).collect();
    let sum: f64 = exps.iter().sum();
    exps.into_iter().map(|e| e / sum).collect()
}

/// Convex blend `base·(1 - s) + calibrated·s`.
pub fn blend(base: f64, calibrated: f64, strength: f64) -> f64 {
    base * (1.0 - strength) + calibrated * strength
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sigmoid_is_symmetric_and_bounded() {
        assert!((sigmoid(0.0) - 0.5).abs() < 1e-15);
        assert!((sigmoid(2.5) + sigmoid(-2.5) - 1.0).abs() < 1e-12);
        assert!(sigmoid(800.0) <= 1.0);
        assert!(sigmoid(-800.0) >= 0.0);
    }

    #[test]
    fn logit_inverts_sigmoid() {
        for x in [-4.0, -0.3, 0.0, 1.7, 6.0] {
            assert!((logit(sigmoid(x)) - x).abs() < 1e-9);
        }
        assert!(logit(0.0).is_finite());
        assert!(logit(1.0).is_finite());
    }

    #[test]
    fn softmax_sums_to_one_and_is_shift_invariant() {
        let a = softmax(&[5.0, 6.0, 7.0]);
        let b = softmax(&[-95.0, -94.0, -93.0]);
        assert!((a.iter().sum::<f64>() - 1.0).abs() < 1e-9);
        for (x, y) in a.iter().zip(&b) {
            assert!((x - y).abs() < 1e-12);
        }
    }

    #[test]
    fn softmax_handles_large_logits() {
        let p = softmax(&[1000.0, 999.0, -1000.0]);
        assert!(p.iter().all(|v| v.is_finite()));
        assert!((p.iter().sum::<f64>() - 1.0).abs() < 1e-9);
    }

    #[test]
    fn higher_temperature_flattens() {
        let sharp = softmax_with_temperature(&[2.0, 0.0, -1.0], 1.0);
        let flat = softmax_with_temperature(&[2.0, 0.0, -1.0], 1.5);
        assert!(flat[0] < sharp[0]);
        assert!(flat[2] > sharp[2]);
    }

    #[test]
    fn platt_identity_parameters() {
        assert!((platt_probability(0.73, 1.0, 0.0) - 0.73).abs() < 1e-9);
        assert!((platt_score(50.0, 4.0, 0.5) - 50.0).abs() < 1e-12);
    }

    #[test]
    fn blend_endpoints() {
        assert_eq!(blend(40.0, 80.0, 0.0), 40.0);
        assert_eq!(blend(40.0, 80.0, 1.0), 80.0);
        assert_eq!(blend(40.0, 80.0, 0.25), 50.0);
    }
}
