//! Literature-curated default weight tables.
//!
//! Every table is expanded to all 15 facets (explicit zeros) so that the
//! default configuration passes the same completeness check as a loaded one.

use std::collections::BTreeMap;

use crate::models::{EnneagramType, Facet, Indicator};

use super::{AxisModel, FacetWeights, MbtiCoefficients, PriorRule, PriorTable};

use Facet::*;

pub(crate) fn full(entries: &[(Facet, f64)]) -> FacetWeights {
    let mut weights: FacetWeights = Facet::ALL.iter().map(|f| (*f, 0.0)).collect();
    for (facet, w) in entries {
        weights.insert(*facet, *w);
    }
    weights
}

/// Positive coefficients push toward E, N, F and P respectively.
pub fn default_mbti() -> MbtiCoefficients {
    MbtiCoefficients {
        ei: AxisModel {
            intercept: 0.0,
            weights: full(&[(Sociability, 0.9), (Vitality, 0.5), (Assertiveness, 0.6), (Anxiety, -0.15)]),
        },
        sn: AxisModel {
            intercept: 0.0,
            weights: full(&[(Curiosity, 0.7), (Aesthetic, 0.5), (Innovation, 0.8), (Order, -0.15)]),
        },
        tf: AxisModel {
            intercept: 0.0,
            weights: full(&[
                (Empathy, 0.9),
                (Cooperation, 0.5),
                (Modesty, 0.4),
                (Assertiveness, -0.2),
                (Anxiety, 0.15),
            ]),
        },
        jp: AxisModel {
            intercept: 0.0,
            weights: full(&[
                (Order, -0.9),
                (SelfControl, -0.7),
                (Grit, -0.4),
                (Impulsivity, 0.3),
                (Innovation, 0.15),
            ]),
        },
    }
}

pub fn default_enneagram() -> BTreeMap<EnneagramType, FacetWeights> {
    use EnneagramType::*;
    [
        (
            One,
            full(&[
                (Order, 0.6),
                (SelfControl, 0.6),
                (Cooperation, 0.2),
                (Impulsivity, -0.3),
                (Innovation, -0.2),
            ]),
        ),
        (Two, full(&[(Empathy, 0.6), (Cooperation, 0.4), (Sociability, 0.3), (Modesty, 0.2)])),
        (
            Three,
            full(&[
                (Assertiveness, 0.3),
                (Grit, 0.3),
                (Vitality, 0.2),
                (Modesty, -0.2),
                (Sociability, 0.1),
            ]),
        ),
        (Four, full(&[(Aesthetic, 0.6), (Anxiety, 0.3), (Impulsivity, 0.3), (Sociability, -0.2)])),
        (Five, full(&[(Curiosity, 0.6), (Innovation, 0.3), (Sociability, -0.4), (Empathy, -0.2)])),
        (
            Six,
            full(&[
                (Anxiety, 0.5),
                (StressVulnerability, 0.3),
                (Cooperation, 0.3),
                (Order, 0.2),
                (Innovation, -0.2),
            ]),
        ),
        (
            Seven,
            full(&[
                (Vitality, 0.5),
                (Sociability, 0.3),
                (Curiosity, 0.2),
                (SelfControl, -0.3),
                (Anxiety, -0.2),
            ]),
        ),
        (
            Eight,
            full(&[
                (Assertiveness, 0.7),
                (Modesty, -0.5),
                (Anxiety, -0.2),
                (Cooperation, -0.2),
                (Grit, 0.2),
            ]),
        ),
        (
            Nine,
            full(&[(Cooperation, 0.4), (Modesty, 0.3), (Assertiveness, -0.3), (Impulsivity, -0.3)]),
        ),
    ]
    .into_iter()
    .collect()
}

/// Heuristic MBTI → Enneagram nudges collected from user feedback.
/// Unvalidated; kept versioned so it can be swapped without code changes.
pub fn default_priors() -> PriorTable {
    use EnneagramType::*;
    let rule = |letters: &str, adjustments: &[(EnneagramType, f64)]| PriorRule {
        letters: letters.to_string(),
        adjustments: adjustments.iter().copied().collect(),
    };
    PriorTable {
        version: "priors-v1".to_string(),
        rules: vec![
            rule("NT", &[(Five, 0.3)]),
            rule("NF", &[(Four, 0.2), (Two, 0.15)]),
            rule("INFP", &[(Four, 0.6), (Two, -0.3)]),
            rule("ENFJ", &[(Eight, 0.6), (Two, 0.3), (Three, 0.2)]),
            rule("SJ", &[(One, 0.4), (Six, 0.2)]),
            rule("ESTJ", &[(One, 0.5), (Eight, -0.3)]),
            rule("SP", &[(Seven, 0.2), (Nine, 0.15)]),
        ],
    }
}

/// Facet subsets per indicator. Negative weights reverse a facet's direction.
pub fn default_composites() -> BTreeMap<Indicator, BTreeMap<Facet, f64>> {
    let subset = |entries: &[(Facet, f64)]| entries.iter().copied().collect::<BTreeMap<_, _>>();
    [
        (Indicator::Exploration, subset(&[(Curiosity, 1.0), (Innovation, 1.0), (Aesthetic, 0.5)])),
        (
            Indicator::SelfRegulation,
            subset(&[(SelfControl, 1.0), (Order, 1.0), (Impulsivity, -1.0)]),
        ),
        (
            Indicator::SocialConnection,
            subset(&[(Sociability, 1.0), (Vitality, 0.5), (Empathy, 0.5)]),
        ),
        (Indicator::Leadership, subset(&[(Assertiveness, 1.0), (Grit, 0.5), (Anxiety, -0.5)])),
        (Indicator::Collaboration, subset(&[(Cooperation, 1.0), (Empathy, 1.0), (Modesty, 0.5)])),
        (
            Indicator::EmotionalStability,
            subset(&[(Anxiety, -1.0), (StressVulnerability, -1.0), (Impulsivity, -0.5)]),
        ),
        (
            Indicator::Resilience,
            subset(&[(StressVulnerability, -1.0), (Grit, 1.0), (Vitality, 0.5)]),
        ),
        (
            Indicator::Immersion,
            subset(&[(Grit, 1.0), (Curiosity, 0.5), (SelfControl, 0.5), (Sociability, -0.5)]),
        ),
        (
            Indicator::GrowthDrive,
            subset(&[(Innovation, 1.0), (Grit, 0.5), (Curiosity, 0.5), (Vitality, 0.5)]),
        ),
    ]
    .into_iter()
    .collect()
}
