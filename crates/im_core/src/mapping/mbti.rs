//! Facet z-scores → four MBTI axis probabilities.

use crate::calibration::{sigmoid, MbtiCalibration};
use crate::config::MbtiCoefficients;
use crate::models::{
    Axis, AxisFlags, ConfidenceLevel, FacetZScores, MbtiProbabilities, MbtiResult, MbtiType,
};

/// An axis is flagged when its probability lies strictly inside this band.
pub const BOUNDARY_LOW: f64 = 0.4;
pub const BOUNDARY_HIGH: f64 = 0.6;

/// Uncalibrated positive-pole probabilities `[P(E), P(N), P(F), P(P)]`.
pub fn axis_probabilities(z: &FacetZScores, coefficients: &MbtiCoefficients) -> [f64; 4] {
    Axis::ALL.map(|axis| {
        let model = coefficients.axis(axis);
        sigmoid(model.intercept + z.weighted_sum(&model.weights))
    })
}

pub fn map_mbti(
    z: &FacetZScores,
    coefficients: &MbtiCoefficients,
    calibration: &MbtiCalibration,
) -> MbtiResult {
    let raw = axis_probabilities(z, coefficients);
    let calibrated = Axis::ALL.map(|axis| calibration.axis(axis).apply_probability(raw[axis.index()]));
    from_probabilities(calibrated)
}

/// Type letters, boundary flags and confidence from final probabilities.
pub fn from_probabilities(positive: [f64; 4]) -> MbtiResult {
    let mbti_type = MbtiType::from_poles(positive.map(|p| p > 0.5));
    let boundary = positive.map(|p| p > BOUNDARY_LOW && p < BOUNDARY_HIGH);
    let confidence = positive.iter().map(|p| (p - 0.5).abs() * 2.0).sum::<f64>() / 4.0;

    let alternate_type = boundary.iter().any(|b| *b).then(|| {
        Axis::ALL
            .iter()
            .map(|axis| {
                if boundary[axis.index()] {
                    let chosen = mbti_type.letter(*axis);
                    format!("{chosen}/{}", axis.opposite(chosen))
                } else {
                    mbti_type.letter(*axis).to_string()
                }
            })
            .collect::<String>()
    });

    MbtiResult {
        mbti_type,
        probabilities: MbtiProbabilities::from_positive(positive),
        boundary: AxisFlags::from_array(boundary),
        confidence,
        confidence_level: ConfidenceLevel::from_confidence(confidence),
        alternate_type,
        description: mbti_type.description().to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::tables::default_mbti;
    use crate::models::Facet;

    #[test]
    fn neutral_profile_is_fully_ambiguous() {
        let result = map_mbti(&FacetZScores::default(), &default_mbti(), &MbtiCalibration::default());
        assert_eq!(result.confidence, 0.0);
        assert_eq!(result.boundary.count(), 4);
        assert_eq!(result.alternate_type.as_deref(), Some("I/ES/NT/FJ/P"));
        assert_eq!(result.confidence_level, ConfidenceLevel::Low);
    }

    #[test]
    fn strong_extraversion_resolves_e() {
        let z: FacetZScores = [
            (Facet::Sociability, 2.5),
            (Facet::Vitality, 2.5),
            (Facet::Assertiveness, 2.5),
        ]
        .into_iter()
        .collect();
        let result = map_mbti(&z, &default_mbti(), &MbtiCalibration::default());
        assert!(result.probabilities.e > 0.9);
        assert!(!result.boundary.ei);
        assert_eq!(result.mbti_type.letter(Axis::EI), 'E');
    }

    #[test]
    fn alternate_renders_only_boundary_axes() {
        let result = from_probabilities([0.9, 0.55, 0.1, 0.45]);
        assert_eq!(result.mbti_type, MbtiType::Entj);
        assert_eq!(result.alternate_type.as_deref(), Some("EN/STJ/P"));
        assert!(from_probabilities([0.9, 0.8, 0.1, 0.2]).alternate_type.is_none());
    }

    #[test]
    fn alternate_leads_with_the_chosen_letter() {
        let result = from_probabilities([0.45, 0.5, 0.5, 0.5]);
        assert_eq!(result.mbti_type, MbtiType::Istj);
        assert_eq!(result.alternate_type.as_deref(), Some("I/ES/NT/FJ/P"));

        let result = from_probabilities([0.55, 0.58, 0.42, 0.9]);
        assert_eq!(result.mbti_type, MbtiType::Entp);
        assert_eq!(result.alternate_type.as_deref(), Some("E/IN/ST/FP"));
    }

    #[test]
    fn boundary_band_is_open() {
        let at_edges = from_probabilities([0.4, 0.6, 0.39, 0.61]);
        assert_eq!(at_edges.boundary.count(), 0);
    }

    #[test]
    fn confidence_is_mean_distance_from_half() {
        let result = from_probabilities([1.0, 0.0, 0.75, 0.5]);
        assert!((result.confidence - (1.0 + 1.0 + 0.5 + 0.0) / 4.0).abs() < 1e-12);
    }

    #[test]
    fn pairs_sum_to_one() {
        let z: FacetZScores = Facet::ALL.iter().enumerate().map(|(i, f)| (*f, i as f64 / 5.0 - 1.4)).collect();
        let p = map_mbti(&z, &default_mbti(), &MbtiCalibration::default()).probabilities;
        for (a, b) in [(p.e, p.i), (p.s, p.n), (p.t, p.f), (p.j, p.p)] {
            assert!((a + b - 1.0).abs() < 1e-9);
            assert!((0.0..=1.0).contains(&a));
        }
    }
}
