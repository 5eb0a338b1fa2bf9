use std::fmt;

use serde::{Deserialize, Serialize};

use super::traits::ConfidenceInterval;

/// The nine synthetic growth indicators.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Indicator {
    Exploration,
    SelfRegulation,
    SocialConnection,
    Leadership,
    Collaboration,
    EmotionalStability,
    Resilience,
    Immersion,
    GrowthDrive,
}

impl Indicator {
    pub const ALL: [Indicator; 9] = [
        Indicator::Exploration,
        Indicator::SelfRegulation,
        Indicator::SocialConnection,
        Indicator::Leadership,
        Indicator::Collaboration,
        Indicator::EmotionalStability,
        Indicator::Resilience,
        Indicator::Immersion,
        Indicator::GrowthDrive,
    ];

    pub fn name(self) -> &'static str {
        match self {
            Indicator::Exploration => "exploration",
            Indicator::SelfRegulation => "self_regulation",
            Indicator::SocialConnection => "social_connection",
            Indicator::Leadership => "leadership",
            Indicator::Collaboration => "collaboration",
            Indicator::EmotionalStability => "emotional_stability",
            Indicator::Resilience => "resilience",
            Indicator::Immersion => "immersion",
            Indicator::GrowthDrive => "growth_drive",
        }
    }

    /// Fixed counterpart consulted when breaking ties. The pairing is
    /// symmetric; resilience has no counterpart.
    pub fn complement(self) -> Option<Indicator> {
        match self {
            Indicator::Exploration => Some(Indicator::SelfRegulation),
            Indicator::SelfRegulation => Some(Indicator::Exploration),
            Indicator::SocialConnection => Some(Indicator::Immersion),
            Indicator::Immersion => Some(Indicator::SocialConnection),
            Indicator::Leadership => Some(Indicator::Collaboration),
            Indicator::Collaboration => Some(Indicator::Leadership),
            Indicator::EmotionalStability => Some(Indicator::GrowthDrive),
            Indicator::GrowthDrive => Some(Indicator::EmotionalStability),
            Indicator::Resilience => None,
        }
    }
}

impl fmt::Display for Indicator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IndicatorScore {
    pub indicator: Indicator,
    /// Final T-score, `base + tie_nudge`.
    pub score: f64,
    /// T-score before tie resolution.
    pub base: f64,
    #[serde(default)]
    pub tie_nudge: f64,
    pub ci: ConfidenceInterval,
}

/// The nine indicator scores, always in [`Indicator::ALL`] order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CompositeSet {
    pub indicators: Vec<IndicatorScore>,
    pub strengths: Vec<Indicator>,
    pub growth_areas: Vec<Indicator>,
}

impl CompositeSet {
    pub fn get(&self, indicator: Indicator) -> Option<&IndicatorScore> {
        self.indicators.iter().find(|s| s.indicator == indicator)
    }

    pub fn score(&self, indicator: Indicator) -> f64 {
        self.get(indicator).map(|s| s.score).unwrap_or(50.0)
    }

    pub fn base(&self, indicator: Indicator) -> f64 {
        self.get(indicator).map(|s| s.base).unwrap_or(50.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn complements_pair_up_symmetrically() {
        for ind in Indicator::ALL {
            match ind.complement() {
                Some(other) => {
                    assert_ne!(other, ind);
                    assert_eq!(other.complement(), Some(ind));
                }
                None => assert_eq!(ind, Indicator::Resilience),
            }
        }
    }

    #[test]
    fn names_match_serde() {
        for ind in Indicator::ALL {
            let json = serde_json::to_string(&ind).unwrap();
            assert_eq!(json, format!("\"{}\"", ind.name()));
        }
    }
}
