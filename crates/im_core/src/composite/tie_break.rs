//! Deterministic resolution of near-tied composite indicators.
//!
//! Groups are always computed from the un-nudged `base` scores and every
//! call rewrites all nudges, so resolving an already-resolved set is a no-op.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::models::{clip_score, Indicator, IndicatorScore};

pub const DEFAULT_TIE_THRESHOLD: f64 = 5.0;
pub const TIE_NUDGE: f64 = 0.1;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TieRule {
    SecondaryFactor,
    Complement,
    Alphabetical,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TieResolution {
    pub members: Vec<Indicator>,
    pub winner: Indicator,
    pub rule: TieRule,
}

/// Sort descending by base and group entries within `threshold` of the group anchor.
/// Only groups of two or more are returned.
pub fn find_ties(scores: &[IndicatorScore], threshold: f64) -> Vec<Vec<Indicator>> {
    let mut sorted: Vec<&IndicatorScore> = scores.iter().collect();
    sorted.sort_by(|a, b| b.base.total_cmp(&a.base).then(a.indicator.cmp(&b.indicator)));

    let mut groups = Vec::new();
    let mut i = 0;
    while i < sorted.len() {
        let anchor = sorted[i].base;
        let mut j = i + 1;
        while j < sorted.len() && anchor - sorted[j].base <= threshold {
            j += 1;
        }
        if j - i > 1 {
            groups.push(sorted[i..j].iter().map(|s| s.indicator).collect());
        }
        i = j;
    }
    groups
}

/// Pick a winner per tie group and apply the fixed nudge.
///
/// Order: strictly highest secondary factor, then strictly highest
/// complementary dimension, then alphabetical name.
pub fn resolve_ties(
    scores: &mut [IndicatorScore],
    threshold: f64,
    secondary: Option<&BTreeMap<Indicator, f64>>,
) -> Vec<TieResolution> {
    let base: BTreeMap<Indicator, f64> = scores.iter().map(|s| (s.indicator, s.base)).collect();
    let groups = find_ties(scores, threshold);

    let resolutions: Vec<TieResolution> = groups
        .into_iter()
        .map(|members| {
            let (winner, rule) = pick_winner(&members, &base, secondary);
            TieResolution { members, winner, rule }
        })
        .collect();

    for entry in scores.iter_mut() {
        let won = resolutions.iter().any(|r| r.winner == entry.indicator);
        entry.tie_nudge = if won { TIE_NUDGE } else { 0.0 };
        entry.score = clip_score(entry.base + entry.tie_nudge);
    }
    resolutions
}

fn pick_winner(
    members: &[Indicator],
    base: &BTreeMap<Indicator, f64>,
    secondary: Option<&BTreeMap<Indicator, f64>>,
) -> (Indicator, TieRule) {
    if let Some(factors) = secondary {
        let values: Option<Vec<(Indicator, f64)>> = members
            .iter()
            .map(|m| factors.get(m).map(|v| (*m, *v)))
            .collect();
        if let Some(winner) = values.as_deref().and_then(strict_max) {
            return (winner, TieRule::SecondaryFactor);
        }
    }

    // an indicator without a counterpart competes with 0
    let complements: Vec<(Indicator, f64)> = members
        .iter()
        .map(|m| (*m, m.complement().and_then(|c| base.get(&c).copied()).unwrap_or(0.0)))
        .collect();
    if let Some(winner) = strict_max(&complements) {
        return (winner, TieRule::Complement);
    }

    let winner = members
        .iter()
        .copied()
        .min_by(|a, b| a.name().cmp(b.name()))
        .unwrap_or(members[0]);
    (winner, TieRule::Alphabetical)
}

/// The entry whose value is strictly greater than every other.
fn strict_max(values: &[(Indicator, f64)]) -> Option<Indicator> {
    let (best, best_v) = values.iter().copied().max_by(|a, b| a.1.total_cmp(&b.1))?;
    let unique = values.iter().filter(|(_, v)| *v == best_v).count() == 1;
    unique.then_some(best)
}
