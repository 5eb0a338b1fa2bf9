//! Facet z-scores + MBTI type → nine-class Enneagram distribution.

use std::collections::BTreeMap;

use crate::calibration::TemperatureScaling;
use crate::config::{FacetWeights, PriorTable};
use crate::models::{
    ConfidenceTier, EnneagramCandidate, EnneagramResult, EnneagramType, FacetZScores, MbtiType,
};

pub const TOP_K: usize = 3;

pub const NOTE: &str = "Reference pattern-matching result from Big5 facets and MBTI priors; \
not a validated Enneagram assessment.";

/// `Σ w·z` per type, index = type - 1.
pub fn raw_scores(z: &FacetZScores, weights: &BTreeMap<EnneagramType, FacetWeights>) -> [f64; 9] {
    EnneagramType::ALL.map(|t| weights.get(&t).map_or(0.0, |w| z.weighted_sum(w)))
}

/// Raw scores plus the MBTI prior nudges.
pub fn logits(
    z: &FacetZScores,
    weights: &BTreeMap<EnneagramType, FacetWeights>,
    priors: &PriorTable,
    mbti: MbtiType,
) -> [f64; 9] {
    let raw = raw_scores(z, weights);
    let nudges = priors.adjustments_for(mbti);
    std::array::from_fn(|i| raw[i] + nudges[i])
}

pub fn map_enneagram(
    z: &FacetZScores,
    weights: &BTreeMap<EnneagramType, FacetWeights>,
    priors: &PriorTable,
    mbti: MbtiType,
    temperature: &TemperatureScaling,
) -> EnneagramResult {
    let logits = logits(z, weights, priors, mbti);
    from_logits(logits, temperature)
}

/// Softmax (optionally temperature-scaled), rank and extract top candidates.
pub fn from_logits(logits: [f64; 9], temperature: &TemperatureScaling) -> EnneagramResult {
    let dist = temperature.apply(&logits);
    let mut probabilities = [0.0; 9];
    probabilities.copy_from_slice(&dist);

    let ranked = rank(&probabilities);
    let candidates: Vec<EnneagramCandidate> = ranked
        .iter()
        .take(TOP_K)
        .enumerate()
        .map(|(rank, t)| EnneagramCandidate {
            enneagram_type: *t,
            probability: probabilities[t.index()],
            tier: ConfidenceTier::for_rank(rank),
        })
        .collect();

    let primary = ranked[0];
    let wing = match ranked.get(1) {
        Some(second) if primary.is_adjacent(*second) => format!("{primary}w{second}"),
        _ => primary.to_string(),
    };

    EnneagramResult {
        candidates,
        primary,
        wing,
        note: NOTE.to_string(),
        probabilities,
        logits,
    }
}

/// Types ordered by probability descending; ties keep ascending type order.
pub fn rank(probabilities: &[f64; 9]) -> [EnneagramType; 9] {
    let mut order = EnneagramType::ALL;
    order.sort_by(|a, b| probabilities[b.index()].total_cmp(&probabilities[a.index()]));
    order
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::tables::{default_enneagram, default_priors};
    use crate::models::Facet;

    #[test]
    fn distribution_sums_to_one() {
        let z: FacetZScores = Facet::ALL.iter().enumerate().map(|(i, f)| (*f, (i as f64 - 7.0) / 3.0)).collect();
        let result = map_enneagram(
            &z,
            &default_enneagram(),
            &default_priors(),
            MbtiType::Enfp,
            &TemperatureScaling::default(),
        );
        assert!((result.probabilities.iter().sum::<f64>() - 1.0).abs() < 1e-9);
        assert!(result.probabilities.iter().all(|p| (0.0..=1.0).contains(p)));
        assert_eq!(result.candidates.len(), 3);
        assert_eq!(result.candidates[0].enneagram_type, result.primary);
    }

    #[test]
    fn shift_invariant() {
        let t = TemperatureScaling::default();
        let a = from_logits([5.0, 6.0, 7.0, 0.0, 0.0, 0.0, 0.0, 0.0, 0.0], &t);
        let b = from_logits([-95.0, -94.0, -93.0, -100.0, -100.0, -100.0, -100.0, -100.0, -100.0], &t);
        for (x, y) in a.probabilities.iter().zip(&b.probabilities) {
            assert!((x - y).abs() < 1e-9);
        }
    }

    #[test]
    fn tiers_follow_rank() {
        let result = from_logits([0.1, 0.2, 3.0, 0.0, 0.0, 0.0, 0.0, 2.9, 2.95], &TemperatureScaling::default());
        let tiers: Vec<_> = result.candidates.iter().map(|c| c.tier).collect();
        assert_eq!(tiers, vec![ConfidenceTier::High, ConfidenceTier::Medium, ConfidenceTier::Low]);
        assert_eq!(result.primary, EnneagramType::Three);
        // 9 is second and not adjacent to 3
        assert_eq!(result.wing, "3");
    }

    #[test]
    fn adjacent_second_forms_wing() {
        let result = from_logits([0.0, 0.0, 0.0, 0.0, 0.0, 0.0, 1.0, 2.0, 0.0], &TemperatureScaling::default());
        assert_eq!(result.wing, "8w7");
        let wrap = from_logits([2.0, 0.0, 0.0, 0.0, 0.0, 0.0, 0.0, 0.0, 1.0], &TemperatureScaling::default());
        assert_eq!(wrap.wing, "1w9");
    }

    #[test]
    fn ties_rank_by_type_number() {
        let result = from_logits([0.0; 9], &TemperatureScaling::default());
        let order: Vec<u8> = result.candidates.iter().map(|c| c.enneagram_type.number()).collect();
        assert_eq!(order, vec![1, 2, 3]);
        assert_eq!(result.wing, "1w2");
    }

    #[test]
    fn priors_shift_logits() {
        let z = FacetZScores::default();
        let l = logits(&z, &default_enneagram(), &default_priors(), MbtiType::Enfj);
        assert!((l[EnneagramType::Eight.index()] - 0.6).abs() < 1e-12);
        let none = logits(&z, &default_enneagram(), &PriorTable::empty(), MbtiType::Enfj);
        assert!(none.iter().all(|v| *v == 0.0));
    }
}
