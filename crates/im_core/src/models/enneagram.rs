use std::fmt;

use serde::{Deserialize, Serialize};

/// Enneagram type 1..=9.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(into = "u8", try_from = "u8")]
pub enum EnneagramType {
    One,
    Two,
    Three,
    Four,
    Five,
    Six,
    Seven,
    Eight,
    Nine,
}

impl EnneagramType {
    pub const ALL: [EnneagramType; 9] = [
        EnneagramType::One,
        EnneagramType::Two,
        EnneagramType::Three,
        EnneagramType::Four,
        EnneagramType::Five,
        EnneagramType::Six,
        EnneagramType::Seven,
        EnneagramType::Eight,
        EnneagramType::Nine,
    ];

    pub fn number(self) -> u8 {
        match self {
            EnneagramType::One => 1,
            EnneagramType::Two => 2,
            EnneagramType::Three => 3,
            EnneagramType::Four => 4,
            EnneagramType::Five => 5,
            EnneagramType::Six => 6,
            EnneagramType::Seven => 7,
            EnneagramType::Eight => 8,
            EnneagramType::Nine => 9,
        }
    }

    /// Zero-based position in probability vectors.
    pub fn index(self) -> usize {
        usize::from(self.number() - 1)
    }

    pub fn from_number(n: u8) -> Option<Self> {
        match n {
            1 => Some(EnneagramType::One),
            2 => Some(EnneagramType::Two),
            3 => Some(EnneagramType::Three),
            4 => Some(EnneagramType::Four),
            5 => Some(EnneagramType::Five),
            6 => Some(EnneagramType::Six),
            7 => Some(EnneagramType::Seven),
            8 => Some(EnneagramType::Eight),
            9 => Some(EnneagramType::Nine),
            _ => None,
        }
    }

    pub fn from_index(i: usize) -> Option<Self> {
        Self::ALL.get(i).copied()
    }

    pub fn description(self) -> &'static str {
        match self {
            EnneagramType::One => "Reformer: principled, orderly, driven by standards",
            EnneagramType::Two => "Helper: warm, generous, oriented to others' needs",
            EnneagramType::Three => "Achiever: adaptive, ambitious, image-conscious",
            EnneagramType::Four => "Individualist: expressive, introspective, identity-seeking",
            EnneagramType::Five => "Investigator: perceptive, private, knowledge-seeking",
            EnneagramType::Six => "Loyalist: committed, vigilant, security-oriented",
            EnneagramType::Seven => "Enthusiast: spontaneous, versatile, experience-seeking",
            EnneagramType::Eight => "Challenger: assertive, protective, control-seeking",
            EnneagramType::Nine => "Peacemaker: receptive, steady, conflict-averse",
        }
    }

    /// Neighbours on the circular 1..9 ordering (9 and 1 are adjacent).
    pub fn neighbours(self) -> [EnneagramType; 2] {
        let n = self.number();
        let prev = if n == 1 { 9 } else { n - 1 };
        let next = if n == 9 { 1 } else { n + 1 };
        [Self::ALL[usize::from(prev - 1)], Self::ALL[usize::from(next - 1)]]
    }

    pub fn is_adjacent(self, other: EnneagramType) -> bool {
        self.neighbours().contains(&other)
    }
}

impl From<EnneagramType> for u8 {
    fn from(t: EnneagramType) -> u8 {
        t.number()
    }
}

impl TryFrom<u8> for EnneagramType {
    type Error = String;

    fn try_from(n: u8) -> Result<Self, Self::Error> {
        EnneagramType::from_number(n).ok_or_else(|| format!("enneagram type {n} outside 1..=9"))
    }
}

impl fmt::Display for EnneagramType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.number())
    }
}

/// Confidence tier, assigned purely by rank.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ConfidenceTier {
    High,
    Medium,
    Low,
}

impl ConfidenceTier {
    pub fn for_rank(rank: usize) -> Self {
        match rank {
            0 => ConfidenceTier::High,
            1 => ConfidenceTier::Medium,
            _ => ConfidenceTier::Low,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EnneagramCandidate {
    #[serde(rename = "type")]
    pub enneagram_type: EnneagramType,
    pub probability: f64,
    pub tier: ConfidenceTier,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EnneagramResult {
    pub candidates: Vec<EnneagramCandidate>,
    pub primary: EnneagramType,
    /// `"8w7"` when the second candidate is adjacent, else the primary digit.
    pub wing: String,
    pub note: String,
    /// Full distribution over types 1..=9, index = type - 1.
    pub probabilities: [f64; 9],
    /// Raw weighted scores after prior nudges, before softmax.
    pub logits: [f64; 9],
}

impl EnneagramResult {
    pub fn probability(&self, t: EnneagramType) -> f64 {
        self.probabilities[t.index()]
    }

    pub fn top_probability(&self) -> f64 {
        self.probability(self.primary)
    }

    pub fn in_top(&self, t: EnneagramType, k: usize) -> bool {
        self.candidates.iter().take(k).any(|c| c.enneagram_type == t)
    }
}
