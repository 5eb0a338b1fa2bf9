//! Type mappers. Both consume standardized facet z-scores only.

pub mod enneagram;
pub mod mbti;

pub use enneagram::{map_enneagram, raw_scores};
pub use mbti::{axis_probabilities, map_mbti};
