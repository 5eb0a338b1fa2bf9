use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use super::big5::{Domain, Facet};

/// `[low, high]` bounds on the 0..100 scale.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ConfidenceInterval(pub f64, pub f64);

impl ConfidenceInterval {
    pub fn low(&self) -> f64 {
        self.0
    }

    pub fn high(&self) -> f64 {
        self.1
    }

    /// Symmetric band around `center`, clipped to 0..100.
    pub fn around(center: f64, half_width: f64) -> Self {
        Self(clip_score(center - half_width), clip_score(center + half_width))
    }
}

/// Big5 scoring output.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TraitScores {
    pub domain_scores: BTreeMap<Domain, f64>,
    pub facet_scores: BTreeMap<Facet, f64>,
    pub theta: BTreeMap<Domain, f64>,
    pub domain_ci: BTreeMap<Domain, ConfidenceInterval>,
    pub facet_ci: BTreeMap<Facet, ConfidenceInterval>,
}

impl TraitScores {
    pub fn domain(&self, domain: Domain) -> f64 {
        self.domain_scores.get(&domain).copied().unwrap_or(50.0)
    }

    pub fn facet(&self, facet: Facet) -> f64 {
        self.facet_scores.get(&facet).copied().unwrap_or(50.0)
    }

    pub fn facet_z(&self) -> FacetZScores {
        FacetZScores::from_scores(&self.facet_scores)
    }
}

/// Standardized facet scores, `z = (score - 50) / 10`.
///
/// Every downstream mapper consumes only this; absent facets read as z = 0.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FacetZScores(BTreeMap<Facet, f64>);

impl FacetZScores {
    pub fn from_scores(scores: &BTreeMap<Facet, f64>) -> Self {
        Self(
            scores
                .iter()
                .map(|(facet, score)| (*facet, (score - 50.0) / 10.0))
                .collect(),
        )
    }

    pub fn get(&self, facet: Facet) -> f64 {
        self.0.get(&facet).copied().unwrap_or(0.0)
    }

    pub fn set(&mut self, facet: Facet, z: f64) {
        self.0.insert(facet, z);
    }

    /// Mean z of a domain's three facets.
    pub fn domain_mean(&self, domain: Domain) -> f64 {
        domain.facets().iter().map(|f| self.get(*f)).sum::<f64>() / 3.0
    }

    /// `Σ w·z` over a weight table; facets missing from the table contribute nothing.
    pub fn weighted_sum(&self, weights: &BTreeMap<Facet, f64>) -> f64 {
        weights.iter().map(|(facet, w)| w * self.get(*facet)).sum()
    }
}

impl FromIterator<(Facet, f64)> for FacetZScores {
    fn from_iter<I: IntoIterator<Item = (Facet, f64)>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

pub fn clip_score(value: f64) -> f64 {
    value.clamp(0.0, 100.0)
}
