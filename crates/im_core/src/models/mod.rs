//! Domain types shared by every stage of the pipeline.

pub mod big5;
pub mod composite;
pub mod enneagram;
pub mod mbti;
pub mod response;
pub mod traits;
pub mod warning;

pub use big5::{Domain, Facet};
pub use composite::{CompositeSet, Indicator, IndicatorScore};
pub use enneagram::{ConfidenceTier, EnneagramCandidate, EnneagramResult, EnneagramType};
pub use mbti::{Axis, AxisFlags, ConfidenceLevel, MbtiProbabilities, MbtiResult, MbtiType};
pub use response::{ItemMeta, LikertScale, ResponseSet};
pub use traits::{clip_score, ConfidenceInterval, FacetZScores, TraitScores};
pub use warning::Warning;
