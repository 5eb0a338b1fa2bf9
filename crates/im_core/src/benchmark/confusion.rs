//! Most frequent (truth → prediction) misclassifications.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use super::metrics::Prediction;

pub const CONFUSION_TOP: usize = 5;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConfusionEntry {
    /// `"ENFJ+8 -> ENFP+8"`
    pub key: String,
    pub count: usize,
}

/// Rows where either the MBTI type or the Enneagram primary is wrong,
/// counted per pair and sorted by count desc, then key asc.
pub fn top_confusions(predictions: &[Prediction], limit: usize) -> Vec<ConfusionEntry> {
    let mut counts: BTreeMap<String, usize> = BTreeMap::new();
    for p in predictions {
        let primary = p.enneagram_primary();
        if p.mbti != p.mbti_truth || primary != p.enneagram_truth {
            let key = format!("{}+{} -> {}+{}", p.mbti_truth, p.enneagram_truth, p.mbti, primary);
            *counts.entry(key).or_insert(0) += 1;
        }
    }

    let mut entries: Vec<ConfusionEntry> =
        counts.into_iter().map(|(key, count)| ConfusionEntry { key, count }).collect();
    entries.sort_by(|a, b| b.count.cmp(&a.count).then_with(|| a.key.cmp(&b.key)));
    entries.truncate(limit);
    entries
}
