//! Big5 trait scoring: Likert answers → facet/domain scores, theta and CIs.
//!
//! Aggregation is deliberately equal-weighted (item `weight` is ignored).
//! Theta and both CIs use fixed placeholder standard errors; they are a
//! z-score approximation, not a maximum-likelihood IRT estimate.

use std::collections::BTreeMap;

use tracing::debug;

use crate::catalog::ItemCatalog;
use crate::config::EngineOptions;
use crate::error::{ValidationErrors, Violation};
use crate::models::{
    clip_score, ConfidenceInterval, Domain, Facet, ResponseSet, TraitScores, Warning,
};

/// Fixed standard error of domain theta.
pub const THETA_SE: f64 = 0.3;
/// Fixed half-width of facet confidence intervals, in score points.
pub const FACET_CI_HALF_WIDTH: f64 = 5.0;
/// Score assigned to a facet with no answered items.
pub const NEUTRAL_SCORE: f64 = 50.0;

const Z_95: f64 = 1.96;

#[derive(Debug, Clone, PartialEq)]
pub struct TraitOutcome {
    pub scores: TraitScores,
    pub warnings: Vec<Warning>,
}

/// Per-request validation. Collects every violation; never fails fast.
pub fn validate_responses(
    catalog: &ItemCatalog,
    responses: &ResponseSet,
    options: &EngineOptions,
) -> Result<(), ValidationErrors> {
    let mut violations = Vec::new();
    let scale = catalog.scale;

    let mut answered = 0usize;
    for (item_id, value) in responses.iter() {
        if catalog.get(item_id).is_none() {
            violations.push(Violation::UnknownItem { item_id });
            continue;
        }
        answered += 1;
        if !value.is_finite() || value.fract() != 0.0 {
            violations.push(Violation::NonInteger { item_id, value });
        }
        if value.is_finite() && !scale.contains(value) {
            violations.push(Violation::OutOfRange { item_id, value, min: scale.min, max: scale.max });
        }
    }

    let total = catalog.len();
    let required = (total as f64 * options.min_response_ratio).ceil() as usize;
    if answered < required {
        violations.insert(0, Violation::InsufficientResponses { answered, required, total });
    }

    if violations.is_empty() {
        Ok(())
    } else {
        Err(ValidationErrors { violations })
    }
}

/// Validate and score. Missing items degrade to neutral defaults with warnings.
pub fn score_traits(
    catalog: &ItemCatalog,
    responses: &ResponseSet,
    options: &EngineOptions,
) -> Result<TraitOutcome, ValidationErrors> {
    validate_responses(catalog, responses, options)?;

    let scale = catalog.scale;
    let mut warnings = Vec::new();

    let missing: Vec<u32> = catalog
        .items
        .iter()
        .map(|i| i.id)
        .filter(|id| responses.get(*id).is_none())
        .collect();
    if !missing.is_empty() {
        warnings.push(Warning::MissingItems { item_ids: missing });
    }

    let mut distinct = responses.iter().map(|(_, v)| v);
    if let Some(first) = distinct.next() {
        if responses.len() > 1 && distinct.all(|v| v == first) {
            warnings.push(Warning::UniformResponses { value: first });
        }
    }

    let mut facet_scores = BTreeMap::new();
    for facet in Facet::ALL {
        let transformed: Vec<f64> = catalog
            .items_for_facet(facet)
            .filter_map(|item| {
                responses
                    .get(item.id)
                    .map(|v| if item.reverse { scale.mirror(v) } else { v })
            })
            .collect();

        let score = if transformed.is_empty() {
            warnings.push(Warning::MissingFacet { facet });
            NEUTRAL_SCORE
        } else {
            let mean = transformed.iter().sum::<f64>() / transformed.len() as f64;
            clip_score(scale.to_percent(mean).round())
        };
        facet_scores.insert(facet, score);
    }

    let scores = assemble(facet_scores);
    debug!(
        answered = responses.len(),
        warnings = warnings.len(),
        "trait scoring complete"
    );
    Ok(TraitOutcome { scores, warnings })
}

/// Derive domain scores, theta and CIs from facet scores.
pub fn assemble(facet_scores: BTreeMap<Facet, f64>) -> TraitScores {
    let mut domain_scores = BTreeMap::new();
    let mut theta = BTreeMap::new();
    let mut domain_ci = BTreeMap::new();

    for domain in Domain::ALL {
        let facets = domain.facets();
        let mean = facets
            .iter()
            .map(|f| facet_scores.get(f).copied().unwrap_or(NEUTRAL_SCORE))
            .sum::<f64>()
            / facets.len() as f64;
        let score = clip_score(mean.round());
        let t = (score - 50.0) / 10.0;
        domain_scores.insert(domain, score);
        theta.insert(domain, t);
        domain_ci.insert(domain, theta_interval(t));
    }

    let facet_ci = facet_scores
        .iter()
        .map(|(f, s)| (*f, ConfidenceInterval::around(*s, FACET_CI_HALF_WIDTH)))
        .collect();

    TraitScores { domain_scores, facet_scores, theta, domain_ci, facet_ci }
}

fn theta_interval(t: f64) -> ConfidenceInterval {
    let to_score = |v: f64| (v * 10.0 + 50.0).round();
    ConfidenceInterval(
        to_score(t - Z_95 * THETA_SE).max(0.0),
        to_score(t + Z_95 * THETA_SE).min(100.0),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::default_catalog;
    use crate::models::{ItemMeta, LikertScale};

    fn all(value: f64) -> ResponseSet {
        ResponseSet::from_ordered(&[value; 60])
    }

    #[test]
    fn neutral_answers_score_fifty_everywhere() {
        let out = score_traits(default_catalog(), &all(3.0), &EngineOptions::default()).unwrap();
        assert!(out.scores.facet_scores.values().all(|s| *s == 50.0));
        assert!(out.scores.domain_scores.values().all(|s| *s == 50.0));
        assert!(out.scores.theta.values().all(|t| *t == 0.0));
        assert_eq!(out.scores.domain_ci[&Domain::O], ConfidenceInterval(44.0, 56.0));
        assert_eq!(out.scores.facet_ci[&Facet::Grit], ConfidenceInterval(45.0, 55.0));
        assert!(out.warnings.contains(&Warning::UniformResponses { value: 3.0 }));
    }

    #[test]
    fn reverse_items_are_mirrored() {
        // every item answered 5: three normal items at 5, the reverse one at 1
        let out = score_traits(default_catalog(), &all(5.0), &EngineOptions::default()).unwrap();
        assert!(out.scores.facet_scores.values().all(|s| *s == 75.0));
    }

    #[test]
    fn single_reverse_item_facet() {
        let catalog = ItemCatalog::new(
            "single",
            LikertScale::FIVE_POINT,
            vec![ItemMeta {
                id: 1,
                domain: Domain::C,
                facet: Facet::Grit,
                reverse: true,
                weight: None,
            }],
        );
        for r in 1..=5 {
            let responses = ResponseSet::new().with_answer(1, r as f64);
            let out = score_traits(&catalog, &responses, &EngineOptions::default()).unwrap();
            let expected = ((((6 - r) as f64 - 1.0) / 4.0) * 100.0).round();
            assert_eq!(out.scores.facet(Facet::Grit), expected);
        }
    }

    #[test]
    fn empty_facet_defaults_to_neutral_with_warning() {
        // drop every anxiety item (ids 49..=52), still above the 75% floor
        let responses: ResponseSet = (1..=60u32)
            .filter(|id| !(49..=52).contains(id))
            .map(|id| (id, 5.0))
            .collect();
        let out = score_traits(default_catalog(), &responses, &EngineOptions::default()).unwrap();
        assert_eq!(out.scores.facet(Facet::Anxiety), 50.0);
        assert!(out.warnings.contains(&Warning::MissingFacet { facet: Facet::Anxiety }));
        assert!(out
            .warnings
            .contains(&Warning::MissingItems { item_ids: vec![49, 50, 51, 52] }));
    }

    #[test]
    fn collects_all_violations() {
        let mut responses: ResponseSet = (1..=40u32).map(|id| (id, 3.0)).collect();
        responses.insert(3, 9.0);
        responses.insert(4, 2.5);
        responses.insert(99, 3.0);
        let err = score_traits(default_catalog(), &responses, &EngineOptions::default())
            .unwrap_err();
        assert_eq!(
            err.violations,
            vec![
                Violation::InsufficientResponses { answered: 40, required: 45, total: 60 },
                Violation::OutOfRange { item_id: 3, value: 9.0, min: 1, max: 5 },
                Violation::NonInteger { item_id: 4, value: 2.5 },
                Violation::UnknownItem { item_id: 99 },
            ]
        );
    }

    #[test]
    fn exactly_seventy_five_percent_is_accepted() {
        let responses: ResponseSet = (1..=45u32).map(|id| (id, 4.0)).collect();
        assert!(validate_responses(default_catalog(), &responses, &EngineOptions::default()).is_ok());
    }

    #[test]
    fn seven_point_scale_uses_declared_range() {
        let mut catalog = default_catalog().clone();
        catalog.scale = LikertScale::SEVEN_POINT;
        let out = score_traits(&catalog, &all(4.0), &EngineOptions::default()).unwrap();
        assert!(out.scores.facet_scores.values().all(|s| *s == 50.0));

        let err = score_traits(default_catalog(), &all(7.0), &EngineOptions::default()).unwrap_err();
        assert_eq!(err.violations.len(), 60);
    }

    #[test]
    fn domain_ci_formula() {
        let ci = theta_interval(2.0);
        // (2 - 0.588)·10 + 50 = 64.12, (2 + 0.588)·10 + 50 = 75.88
        assert_eq!(ci, ConfidenceInterval(64.0, 76.0));
        assert_eq!(theta_interval(-5.0).low(), 0.0);
        assert_eq!(theta_interval(5.0).high(), 100.0);
    }
}

#[cfg(all(test, feature = "proptest"))]
mod proptests {
    use super::*;
    use crate::catalog::default_catalog;
    use proptest::prelude::*;

    proptest! {
        /// Property: every facet and domain score stays in [0, 100]
        #[test]
        fn prop_scores_in_range(values in proptest::collection::vec(1u8..=5, 60)) {
            let responses = ResponseSet::from_ordered(
                &values.iter().map(|v| f64::from(*v)).collect::<Vec<_>>(),
            );
            let out = score_traits(default_catalog(), &responses, &EngineOptions::default()).unwrap();
            for s in out.scores.facet_scores.values().chain(out.scores.domain_scores.values()) {
                prop_assert!((0.0..=100.0).contains(s));
            }
        }
    }
}
