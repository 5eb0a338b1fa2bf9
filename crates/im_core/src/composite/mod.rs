//! Composite indicator engine
//!
//! Nine growth indicators derived from facet z-scores:
//!
//! 1. `Σ w·z / Σ|w|` over the configured facet subset → T-score, clipped
//! 2. optional nonlinear stage: cross terms, then smoothstep, applied once
//! 3. optional MBTI deltas, then Enneagram deltas, single final clip
//! 4. score calibration, fixed ±5 CI, tie resolution on the result
//!
//! - `tie_break`: near-tie grouping and deterministic winner selection

pub mod tie_break;

use std::collections::BTreeMap;

use crate::calibration::CalibrationModel;
use crate::config::{EngineConfig, EngineOptions};
use crate::models::{
    clip_score, Axis, CompositeSet, ConfidenceInterval, Domain, EnneagramType, FacetZScores,
    Indicator, IndicatorScore, MbtiType,
};

pub use tie_break::{find_ties, resolve_ties, TieResolution, TieRule};

/// Half-width of every indicator CI (placeholder, not propagated from facet CIs).
pub const INDICATOR_CI_HALF_WIDTH: f64 = 5.0;

const HIGHLIGHT_COUNT: usize = 3;

/// `3x² - 2x³` on `[0, 1]`.
pub fn smoothstep(x: f64) -> f64 {
    let x = x.clamp(0.0, 1.0);
    x * x * (3.0 - 2.0 * x)
}

/// Step 1: linear T-scores.
pub fn linear_scores(z: &FacetZScores, config: &EngineConfig) -> BTreeMap<Indicator, f64> {
    Indicator::ALL
        .iter()
        .map(|ind| {
            let score = config.composites.get(ind).map_or(50.0, |subset| {
                let norm: f64 = subset.values().map(|w| w.abs()).sum();
                let zc = if norm > 0.0 { z.weighted_sum(subset) / norm } else { 0.0 };
                clip_score(50.0 + 10.0 * zc)
            });
            (*ind, score)
        })
        .collect()
}

/// Step 2: cross terms on the linear scores, then smoothstep, then clip.
pub fn apply_nonlinear(scores: &mut BTreeMap<Indicator, f64>, z: &FacetZScores) {
    let domain_t = |d: Domain| clip_score(50.0 + 10.0 * z.domain_mean(d));
    let agreeableness = domain_t(Domain::A);
    let extraversion = domain_t(Domain::E);
    let exploration = scores.get(&Indicator::Exploration).copied().unwrap_or(50.0);
    let immersion = scores.get(&Indicator::Immersion).copied().unwrap_or(50.0);

    if let Some(v) = scores.get_mut(&Indicator::Collaboration) {
        *v = clip_score(*v + 0.3 * (agreeableness * extraversion) / 100.0);
    }
    if let Some(v) = scores.get_mut(&Indicator::GrowthDrive) {
        *v = clip_score(*v + 0.2 * (exploration + immersion) / 2.0);
    }

    for v in scores.values_mut() {
        *v = clip_score(smoothstep(*v / 100.0) * 100.0);
    }
}

/// MBTI-derived deltas, summed per indicator and clamped to ±`max_modifier_delta`.
pub fn mbti_deltas(mbti: MbtiType, options: &EngineOptions) -> BTreeMap<Indicator, f64> {
    let alpha = options.modifier_alpha;
    let mut deltas = BTreeMap::new();
    let mut add = |ind: Indicator, d: f64| *deltas.entry(ind).or_insert(0.0) += d;

    match mbti.letter(Axis::EI) {
        'E' => add(Indicator::SocialConnection, alpha),
        _ => add(Indicator::Immersion, alpha),
    }
    match mbti.letter(Axis::SN) {
        'N' => add(Indicator::Exploration, alpha),
        _ => add(Indicator::SelfRegulation, alpha),
    }
    match mbti.letter(Axis::TF) {
        'T' => {
            add(Indicator::Leadership, (0.6 * alpha).round());
            add(Indicator::GrowthDrive, (0.4 * alpha).round());
        }
        _ => add(Indicator::Collaboration, alpha),
    }
    match mbti.letter(Axis::JP) {
        'J' => {
            add(Indicator::SelfRegulation, (0.7 * alpha).round());
            add(Indicator::Resilience, (0.3 * alpha).round());
        }
        _ => add(Indicator::Exploration, (0.7 * alpha).round()),
    }

    bound(deltas, options.max_modifier_delta)
}

/// Enneagram-derived deltas: two indicators per primary type, `+beta` each.
pub fn enneagram_deltas(primary: EnneagramType, options: &EngineOptions) -> BTreeMap<Indicator, f64> {
    use Indicator::*;
    let targets = match primary {
        EnneagramType::One => [SelfRegulation, Leadership],
        EnneagramType::Two => [Collaboration, SocialConnection],
        EnneagramType::Three => [Leadership, GrowthDrive],
        EnneagramType::Four => [Immersion, Exploration],
        EnneagramType::Five => [Exploration, SelfRegulation],
        EnneagramType::Six => [Resilience, SelfRegulation],
        EnneagramType::Seven => [GrowthDrive, SocialConnection],
        EnneagramType::Eight => [Leadership, Resilience],
        EnneagramType::Nine => [Collaboration, EmotionalStability],
    };
    let mut deltas = BTreeMap::new();
    for ind in targets {
        *deltas.entry(ind).or_insert(0.0) += options.modifier_beta;
    }
    bound(deltas, options.max_modifier_delta)
}

fn bound(deltas: BTreeMap<Indicator, f64>, limit: f64) -> BTreeMap<Indicator, f64> {
    deltas.into_iter().map(|(k, v)| (k, v.clamp(-limit, limit))).collect()
}

/// Steps 1-3 plus calibration: the un-nudged base T-score per indicator.
pub fn base_scores(
    z: &FacetZScores,
    mbti: Option<MbtiType>,
    enneagram: Option<EnneagramType>,
    config: &EngineConfig,
) -> BTreeMap<Indicator, f64> {
    let options = &config.options;
    let mut scores = linear_scores(z, config);

    if options.nonlinear_shaping {
        apply_nonlinear(&mut scores, z);
    }

    let mut total: BTreeMap<Indicator, f64> = BTreeMap::new();
    if let (true, Some(t)) = (options.mbti_modifier, mbti) {
        for (ind, d) in mbti_deltas(t, options) {
            *total.entry(ind).or_insert(0.0) += d;
        }
    }
    if let (true, Some(t)) = (options.enneagram_modifier, enneagram) {
        for (ind, d) in enneagram_deltas(t, options) {
            *total.entry(ind).or_insert(0.0) += d;
        }
    }

    let calibration: &CalibrationModel = &config.calibration.composite;
    scores
        .into_iter()
        .map(|(ind, v)| {
            let modified = clip_score(v + total.get(&ind).copied().unwrap_or(0.0));
            (ind, clip_score(calibration.apply_score(modified)))
        })
        .collect()
}

/// Full indicator set with CIs, tie resolution and strengths/growth areas.
pub fn compute_composites(
    z: &FacetZScores,
    mbti: Option<MbtiType>,
    enneagram: Option<EnneagramType>,
    config: &EngineConfig,
    secondary: Option<&BTreeMap<Indicator, f64>>,
) -> (CompositeSet, Vec<TieResolution>) {
    let base = base_scores(z, mbti, enneagram, config);
    let mut indicators: Vec<IndicatorScore> = Indicator::ALL
        .iter()
        .map(|ind| {
            let b = base.get(ind).copied().unwrap_or(50.0);
            IndicatorScore {
                indicator: *ind,
                score: b,
                base: b,
                tie_nudge: 0.0,
                ci: ConfidenceInterval::around(b, INDICATOR_CI_HALF_WIDTH),
            }
        })
        .collect();

    let ties = resolve_ties(&mut indicators, config.options.tie_threshold, secondary);
    let (strengths, growth_areas) = strengths_and_growth(&indicators);
    (CompositeSet { indicators, strengths, growth_areas }, ties)
}

/// Top three and bottom three indicators by final score.
pub fn strengths_and_growth(indicators: &[IndicatorScore]) -> (Vec<Indicator>, Vec<Indicator>) {
    let mut sorted: Vec<&IndicatorScore> = indicators.iter().collect();
    sorted.sort_by(|a, b| b.score.total_cmp(&a.score).then(a.indicator.cmp(&b.indicator)));
    let strengths = sorted.iter().take(HIGHLIGHT_COUNT).map(|s| s.indicator).collect();
    let growth = sorted.iter().rev().take(HIGHLIGHT_COUNT).map(|s| s.indicator).collect();
    (strengths, growth)
}


#[cfg(all(test, feature = "proptest"))]
mod proptests {
    use super::*;
    use crate::models::Facet;
    use proptest::prelude::*;

    proptest! {
        /// Property: resolving ties on already-resolved output changes nothing
        #[test]
        fn prop_tie_break_idempotent(zs in proptest::collection::vec(-3.0f64..3.0, 15)) {
            let z: FacetZScores = Facet::ALL.iter().zip(zs).map(|(f, v)| (*f, v)).collect();
            let cfg = EngineConfig::default();
            let (set, _) = compute_composites(&z, None, None, &cfg, None);
            let mut again = set.indicators.clone();
            resolve_ties(&mut again, cfg.options.tie_threshold, None);
            prop_assert_eq!(again, set.indicators);
        }
    }
}
