use std::fmt;

use serde::{Deserialize, Serialize};

use super::big5::Facet;

/// Non-fatal advisory attached to a result.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Warning {
    MissingItems { item_ids: Vec<u32> },
    MissingFacet { facet: Facet },
    UniformResponses { value: f64 },
    LowMbtiConfidence { confidence: f64, threshold: f64 },
    LowEnneagramProbability { probability: f64, threshold: f64 },
}

impl fmt::Display for Warning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Warning::MissingItems { item_ids } => {
                write!(f, "{} item(s) unanswered: {:?}", item_ids.len(), item_ids)
            }
            Warning::MissingFacet { facet } => {
                write!(f, "facet {facet} has no answered items; scored as neutral 50")
            }
            Warning::UniformResponses { value } => {
                write!(f, "every answer is {value}; results may not be meaningful")
            }
            Warning::LowMbtiConfidence { confidence, threshold } => {
                write!(f, "MBTI confidence {confidence:.2} below {threshold}")
            }
            Warning::LowEnneagramProbability { probability, threshold } => {
                write!(f, "Enneagram top probability {probability:.2} below {threshold}")
            }
        }
    }
}
