//! Phase 1: four hand-built extreme profiles scored through the full pipeline.

use serde::{Deserialize, Serialize};

use crate::catalog::ItemCatalog;
use crate::engine::Engine;
use crate::error::Result;
use crate::mapping::enneagram::TOP_K;
use crate::models::{EnneagramType, Facet, MbtiType, ResponseSet};

use Facet::*;

/// Answers for one facet: `(reverse-keyed item, other items)`.
type FacetPattern = (Facet, u8, u8);

#[derive(Debug, Clone, PartialEq)]
pub struct CanonicalProfile {
    pub mbti: MbtiType,
    pub enneagram: EnneagramType,
    pub pattern: [FacetPattern; 15],
}

impl CanonicalProfile {
    pub fn name(&self) -> String {
        format!("{}+{}", self.mbti, self.enneagram)
    }

    /// Likert answers for every catalog item of each facet.
    pub fn responses(&self, catalog: &ItemCatalog) -> ResponseSet {
        let mut responses = ResponseSet::new();
        for (facet, reverse, keyed) in self.pattern {
            for item in catalog.items_for_facet(facet) {
                let value = if item.reverse { reverse } else { keyed };
                responses.insert(item.id, f64::from(value));
            }
        }
        responses
    }
}

pub fn canonical_profiles() -> [CanonicalProfile; 4] {
    [
        CanonicalProfile {
            mbti: MbtiType::Enfj,
            enneagram: EnneagramType::Eight,
            pattern: [
                (Curiosity, 1, 5),
                (Aesthetic, 2, 4),
                (Innovation, 1, 5),
                (Order, 1, 5),
                (Grit, 1, 5),
                (SelfControl, 1, 5),
                (Sociability, 1, 5),
                (Vitality, 2, 5),
                (Assertiveness, 1, 5),
                (Empathy, 1, 5),
                (Cooperation, 1, 5),
                (Modesty, 5, 1),
                (Anxiety, 4, 2),
                (Impulsivity, 3, 3),
                (StressVulnerability, 4, 2),
            ],
        },
        CanonicalProfile {
            mbti: MbtiType::Intj,
            enneagram: EnneagramType::Five,
            pattern: [
                (Curiosity, 1, 5),
                (Aesthetic, 2, 4),
                (Innovation, 1, 5),
                (Order, 1, 5),
                (Grit, 1, 5),
                (SelfControl, 1, 5),
                (Sociability, 5, 1),
                (Vitality, 4, 2),
                (Assertiveness, 3, 3),
                (Empathy, 5, 1),
                (Cooperation, 4, 2),
                (Modesty, 4, 2),
                (Anxiety, 4, 2),
                (Impulsivity, 4, 2),
                (StressVulnerability, 4, 2),
            ],
        },
        CanonicalProfile {
            mbti: MbtiType::Infp,
            enneagram: EnneagramType::Four,
            pattern: [
                (Curiosity, 2, 4),
                (Aesthetic, 1, 5),
                (Innovation, 2, 4),
                (Order, 5, 1),
                (Grit, 4, 2),
                (SelfControl, 5, 1),
                (Sociability, 4, 2),
                (Vitality, 4, 2),
                (Assertiveness, 4, 2),
                (Empathy, 1, 5),
                (Cooperation, 1, 5),
                (Modesty, 1, 5),
                (Anxiety, 2, 4),
                (Impulsivity, 2, 4),
                (StressVulnerability, 2, 4),
            ],
        },
        CanonicalProfile {
            mbti: MbtiType::Estj,
            enneagram: EnneagramType::One,
            pattern: [
                (Curiosity, 4, 2),
                (Aesthetic, 4, 2),
                (Innovation, 4, 2),
                (Order, 1, 5),
                (Grit, 2, 4),
                (SelfControl, 1, 5),
                (Sociability, 2, 4),
                (Vitality, 2, 4),
                (Assertiveness, 1, 5),
                (Empathy, 5, 1),
                (Cooperation, 4, 2),
                (Modesty, 5, 1),
                (Anxiety, 4, 2),
                (Impulsivity, 4, 2),
                (StressVulnerability, 4, 2),
            ],
        },
    ]
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CanonicalCheck {
    pub name: String,
    pub mbti: MbtiType,
    pub mbti_confidence: f64,
    pub enneagram: EnneagramType,
    pub enneagram_top3: Vec<EnneagramType>,
    pub mbti_match: bool,
    pub enneagram_match: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Phase1Summary {
    pub checks: Vec<CanonicalCheck>,
    pub mbti_accuracy: f64,
    pub enneagram_accuracy: f64,
}

pub fn run_phase1(engine: &Engine) -> Result<Phase1Summary> {
    let profiles = canonical_profiles();
    let mut checks = Vec::with_capacity(profiles.len());
    for profile in &profiles {
        let result = engine.score_at(&profile.responses(engine.catalog()), None, "")?;
        checks.push(CanonicalCheck {
            name: profile.name(),
            mbti: result.mbti.mbti_type,
            mbti_confidence: result.mbti.confidence,
            enneagram: result.enneagram.primary,
            enneagram_top3: result
                .enneagram
                .candidates
                .iter()
                .take(TOP_K)
                .map(|c| c.enneagram_type)
                .collect(),
            mbti_match: result.mbti.mbti_type == profile.mbti,
            enneagram_match: result.enneagram.primary == profile.enneagram,
        });
    }

    let rate = |hits: usize| hits as f64 / checks.len() as f64;
    let mbti_accuracy = rate(checks.iter().filter(|c| c.mbti_match).count());
    let enneagram_accuracy = rate(checks.iter().filter(|c| c.enneagram_match).count());
    Ok(Phase1Summary { checks, mbti_accuracy, enneagram_accuracy })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::default_catalog;

    #[test]
    fn patterns_cover_every_facet_once() {
        for profile in canonical_profiles() {
            let mut facets: Vec<Facet> = profile.pattern.iter().map(|p| p.0).collect();
            facets.sort();
            assert_eq!(facets, Facet::ALL.to_vec());
            assert_eq!(profile.responses(default_catalog()).len(), 60);
        }
    }

    #[test]
    fn reverse_slot_gets_the_reverse_answer() {
        let enfj = &canonical_profiles()[0];
        let responses = enfj.responses(default_catalog());
        // curiosity items 1..=4, item 2 reverse-keyed
        assert_eq!(responses.get(1), Some(5.0));
        assert_eq!(responses.get(2), Some(1.0));
    }

    #[test]
    fn default_tables_recover_every_profile() {
        let engine = Engine::with_defaults().unwrap();
        let summary = run_phase1(&engine).unwrap();
        let names: Vec<&str> = summary.checks.iter().map(|c| c.name.as_str()).collect();
        assert_eq!(names, vec!["ENFJ+8", "INTJ+5", "INFP+4", "ESTJ+1"]);
        assert_eq!(summary.mbti_accuracy, 1.0);
        assert_eq!(summary.enneagram_accuracy, 1.0);
        assert!(summary.checks.iter().all(|c| c.mbti_confidence > 0.9));
    }
}
