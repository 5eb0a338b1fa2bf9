use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

use super::big5::{Domain, Facet};

/// Inclusive Likert range declared per item-set version.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct LikertScale {
    pub min: u8,
    pub max: u8,
}

impl LikertScale {
    pub const FIVE_POINT: LikertScale = LikertScale { min: 1, max: 5 };
    pub const SEVEN_POINT: LikertScale = LikertScale { min: 1, max: 7 };

    pub fn contains(&self, value: f64) -> bool {
        value >= f64::from(self.min) && value <= f64::from(self.max)
    }

    /// Mirror a value for reverse-keyed items (`max + min - v`).
    pub fn mirror(&self, value: f64) -> f64 {
        f64::from(self.max) + f64::from(self.min) - value
    }

    pub fn midpoint(&self) -> f64 {
        (f64::from(self.min) + f64::from(self.max)) / 2.0
    }

    /// Map a mean on this scale to 0..100.
    pub fn to_percent(&self, mean: f64) -> f64 {
        let span = f64::from(self.max) - f64::from(self.min);
        (mean - f64::from(self.min)) / span * 100.0
    }
}

/// Fixed catalog entry for one questionnaire item.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ItemMeta {
    pub id: u32,
    pub domain: Domain,
    pub facet: Facet,
    #[serde(default)]
    pub reverse: bool,
    /// Carried for catalog compatibility; aggregation is equal-weighted.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub weight: Option<f64>,
}

/// Answers keyed by item id.
///
/// Values are kept as `f64` so that non-integer submissions can be reported
/// as violations instead of failing deserialization.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ResponseSet {
    answers: BTreeMap<u32, f64>,
}

impl ResponseSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build from an ordered answer list mapped onto ids `1..=len`.
    pub fn from_ordered(values: &[f64]) -> Self {
        let answers = values
            .iter()
            .enumerate()
            .map(|(i, v)| (i as u32 + 1, *v))
            .collect();
        Self { answers }
    }

    pub fn with_answer(mut self, item_id: u32, value: f64) -> Self {
        self.answers.insert(item_id, value);
        self
    }

    pub fn insert(&mut self, item_id: u32, value: f64) {
        self.answers.insert(item_id, value);
    }

    pub fn get(&self, item_id: u32) -> Option<f64> {
        self.answers.get(&item_id).copied()
    }

    pub fn len(&self) -> usize {
        self.answers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.answers.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (u32, f64)> + '_ {
        self.answers.iter().map(|(k, v)| (*k, *v))
    }

    /// SHA-256 over the canonical `id=value` list, usable as an idempotency key.
    pub fn fingerprint(&self) -> String {
        let mut hasher = Sha256::new();
        for (id, value) in &self.answers {
            hasher.update(format!("{id}={value};").as_bytes());
        }
        hex(&hasher.finalize())
    }
}

impl FromIterator<(u32, f64)> for ResponseSet {
    fn from_iter<I: IntoIterator<Item = (u32, f64)>>(iter: I) -> Self {
        Self { answers: iter.into_iter().collect() }
    }
}

pub(crate) fn hex(bytes: &[u8]) -> String {
    bytes.iter().map(|b| format!("{:02x}", b)).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn mirror_on_five_and_seven_point_scales() {
        assert_eq!(LikertScale::FIVE_POINT.mirror(2.0), 4.0);
        assert_eq!(LikertScale::SEVEN_POINT.mirror(2.0), 6.0);
    }

    #[test]
    fn to_percent_matches_legacy_formula_on_five_points() {
        let scale = LikertScale::FIVE_POINT;
        for mean in [1.0, 2.5, 3.0, 4.25, 5.0] {
            assert!((scale.to_percent(mean) - (mean - 1.0) * 25.0).abs() < 1e-12);
        }
    }

    #[test]
    fn ordered_answers_start_at_one() {
        let set = ResponseSet::from_ordered(&[5.0, 4.0, 3.0]);
        assert_eq!(set.get(1), Some(5.0));
        assert_eq!(set.get(3), Some(3.0));
        assert_eq!(set.get(0), None);
    }

    #[test]
    fn fingerprint_ignores_insertion_order() {
        let a = ResponseSet::new().with_answer(2, 3.0).with_answer(1, 4.0);
        let b = ResponseSet::new().with_answer(1, 4.0).with_answer(2, 3.0);
        assert_eq!(a.fingerprint(), b.fingerprint());
        assert_eq!(a.fingerprint().len(), 64);
        assert_ne!(a.fingerprint(), a.clone().with_answer(3, 1.0).fingerprint());
    }

    #[test]
    fn deserializes_from_string_keyed_json() {
        let set: ResponseSet = serde_json::from_str(r#"{"1": 3, "2": 4.5}"#).unwrap();
        assert_eq!(set.get(1), Some(3.0));
        assert_eq!(set.get(2), Some(4.5));
    }
}
