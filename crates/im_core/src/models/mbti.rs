use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// MBTI dichotomy. Probabilities are always stored for the second-listed
/// ("positive") pole: P(E), P(N), P(F), P(P).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Axis {
    EI,
    SN,
    TF,
    JP,
}

impl Axis {
    pub const ALL: [Axis; 4] = [Axis::EI, Axis::SN, Axis::TF, Axis::JP];

    pub fn index(self) -> usize {
        match self {
            Axis::EI => 0,
            Axis::SN => 1,
            Axis::TF => 2,
            Axis::JP => 3,
        }
    }

    pub fn positive_letter(self) -> char {
        match self {
            Axis::EI => 'E',
            Axis::SN => 'N',
            Axis::TF => 'F',
            Axis::JP => 'P',
        }
    }

    pub fn negative_letter(self) -> char {
        match self {
            Axis::EI => 'I',
            Axis::SN => 'S',
            Axis::TF => 'T',
            Axis::JP => 'J',
        }
    }

    /// The other pole's letter.
    pub fn opposite(self, letter: char) -> char {
        if letter == self.positive_letter() {
            self.negative_letter()
        } else {
            self.positive_letter()
        }
    }

    /// Display pair in conventional order, e.g. `E/I`, `S/N`.
    pub fn pair(self) -> &'static str {
        match self {
            Axis::EI => "E/I",
            Axis::SN => "S/N",
            Axis::TF => "T/F",
            Axis::JP => "J/P",
        }
    }
}

/// The sixteen MBTI types.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum MbtiType {
    Intj,
    Intp,
    Entj,
    Entp,
    Infj,
    Infp,
    Enfj,
    Enfp,
    Istj,
    Isfj,
    Estj,
    Esfj,
    Istp,
    Isfp,
    Estp,
    Esfp,
}

impl MbtiType {
    /// Enumeration order used by the benchmark generator.
    pub const ALL: [MbtiType; 16] = [
        MbtiType::Intj,
        MbtiType::Intp,
        MbtiType::Entj,
        MbtiType::Entp,
        MbtiType::Infj,
        MbtiType::Infp,
        MbtiType::Enfj,
        MbtiType::Enfp,
        MbtiType::Istj,
        MbtiType::Isfj,
        MbtiType::Estj,
        MbtiType::Esfj,
        MbtiType::Istp,
        MbtiType::Isfp,
        MbtiType::Estp,
        MbtiType::Esfp,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            MbtiType::Intj => "INTJ",
            MbtiType::Intp => "INTP",
            MbtiType::Entj => "ENTJ",
            MbtiType::Entp => "ENTP",
            MbtiType::Infj => "INFJ",
            MbtiType::Infp => "INFP",
            MbtiType::Enfj => "ENFJ",
            MbtiType::Enfp => "ENFP",
            MbtiType::Istj => "ISTJ",
            MbtiType::Isfj => "ISFJ",
            MbtiType::Estj => "ESTJ",
            MbtiType::Esfj => "ESFJ",
            MbtiType::Istp => "ISTP",
            MbtiType::Isfp => "ISFP",
            MbtiType::Estp => "ESTP",
            MbtiType::Esfp => "ESFP",
        }
    }

    pub fn description(self) -> &'static str {
        match self {
            MbtiType::Intj => "Strategic architect: long-range planning and independent judgment",
            MbtiType::Intp => "Logical analyst: abstract models and precise reasoning",
            MbtiType::Entj => "Decisive commander: organizes people and systems toward goals",
            MbtiType::Entp => "Inventive debater: generates options and challenges assumptions",
            MbtiType::Infj => "Insightful advocate: quiet conviction and a sense of meaning",
            MbtiType::Infp => "Idealistic mediator: values-driven with a rich inner world",
            MbtiType::Enfj => "Charismatic mentor: reads people and rallies them",
            MbtiType::Enfp => "Enthusiastic campaigner: curious, warm and possibility-seeking",
            MbtiType::Istj => "Dependable inspector: thorough, factual and duty-bound",
            MbtiType::Isfj => "Protective caretaker: attentive to needs and traditions",
            MbtiType::Estj => "Efficient executive: structure, standards and follow-through",
            MbtiType::Esfj => "Supportive consul: harmony-minded and socially attentive",
            MbtiType::Istp => "Practical virtuoso: hands-on troubleshooting under pressure",
            MbtiType::Isfp => "Gentle adventurer: present-focused and aesthetically attuned",
            MbtiType::Estp => "Energetic entrepreneur: bold, adaptable and action-first",
            MbtiType::Esfp => "Spontaneous entertainer: lively, sociable and expressive",
        }
    }

    /// Letter selected on `axis`.
    pub fn letter(self, axis: Axis) -> char {
        self.as_str().as_bytes()[axis.index()] as char
    }

    /// True when `pattern` occurs contiguously in the type code (`"NT"` in INTJ, `"INFP"`).
    ///
    /// Non-adjacent letters never match: `"SJ"` fits no four-letter code.
    pub fn matches_letters(self, pattern: &str) -> bool {
        !pattern.is_empty() && self.as_str().contains(pattern)
    }

    /// Build a type from the positive-pole decision on each axis.
    pub fn from_poles(positive: [bool; 4]) -> MbtiType {
        match (positive[0], positive[1], positive[2], positive[3]) {
            (false, true, false, false) => MbtiType::Intj,
            (false, true, false, true) => MbtiType::Intp,
            (true, true, false, false) => MbtiType::Entj,
            (true, true, false, true) => MbtiType::Entp,
            (false, true, true, false) => MbtiType::Infj,
            (false, true, true, true) => MbtiType::Infp,
            (true, true, true, false) => MbtiType::Enfj,
            (true, true, true, true) => MbtiType::Enfp,
            (false, false, false, false) => MbtiType::Istj,
            (false, false, true, false) => MbtiType::Isfj,
            (true, false, false, false) => MbtiType::Estj,
            (true, false, true, false) => MbtiType::Esfj,
            (false, false, false, true) => MbtiType::Istp,
            (false, false, true, true) => MbtiType::Isfp,
            (true, false, false, true) => MbtiType::Estp,
            (true, false, true, true) => MbtiType::Esfp,
        }
    }

    /// Positive-pole flags, inverse of [`MbtiType::from_poles`].
    pub fn poles(self) -> [bool; 4] {
        Axis::ALL.map(|axis| self.letter(axis) == axis.positive_letter())
    }
}

impl fmt::Display for MbtiType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for MbtiType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let upper = s.trim().to_ascii_uppercase();
        MbtiType::ALL
            .iter()
            .copied()
            .find(|t| t.as_str() == upper)
            .ok_or_else(|| format!("unknown MBTI type '{s}'"))
    }
}

/// Eight pole probabilities; each complementary pair sums to 1.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub struct MbtiProbabilities {
    pub e: f64,
    pub i: f64,
    pub s: f64,
    pub n: f64,
    pub t: f64,
    pub f: f64,
    pub j: f64,
    pub p: f64,
}

impl MbtiProbabilities {
    /// From positive-pole probabilities `[P(E), P(N), P(F), P(P)]`.
    pub fn from_positive(p: [f64; 4]) -> Self {
        Self {
            e: p[0],
            i: 1.0 - p[0],
            s: 1.0 - p[1],
            n: p[1],
            t: 1.0 - p[2],
            f: p[2],
            j: 1.0 - p[3],
            p: p[3],
        }
    }

    pub fn positive(&self, axis: Axis) -> f64 {
        match axis {
            Axis::EI => self.e,
            Axis::SN => self.n,
            Axis::TF => self.f,
            Axis::JP => self.p,
        }
    }

    pub fn positives(&self) -> [f64; 4] {
        Axis::ALL.map(|axis| self.positive(axis))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub struct AxisFlags {
    pub ei: bool,
    pub sn: bool,
    pub tf: bool,
    pub jp: bool,
}

impl AxisFlags {
    pub fn from_array(flags: [bool; 4]) -> Self {
        Self { ei: flags[0], sn: flags[1], tf: flags[2], jp: flags[3] }
    }

    pub fn get(&self, axis: Axis) -> bool {
        match axis {
            Axis::EI => self.ei,
            Axis::SN => self.sn,
            Axis::TF => self.tf,
            Axis::JP => self.jp,
        }
    }

    pub fn count(&self) -> usize {
        Axis::ALL.iter().filter(|a| self.get(**a)).count()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ConfidenceLevel {
    Low,
    Moderate,
    High,
}

impl ConfidenceLevel {
    pub fn from_confidence(confidence: f64) -> Self {
        if confidence < 0.5 {
            ConfidenceLevel::Low
        } else if confidence < 0.75 {
            ConfidenceLevel::Moderate
        } else {
            ConfidenceLevel::High
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MbtiResult {
    #[serde(rename = "type")]
    pub mbti_type: MbtiType,
    pub probabilities: MbtiProbabilities,
    pub boundary: AxisFlags,
    pub confidence: f64,
    pub confidence_level: ConfidenceLevel,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub alternate_type: Option<String>,
    pub description: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn poles_round_trip_for_every_type() {
        for t in MbtiType::ALL {
            assert_eq!(MbtiType::from_poles(t.poles()), t);
        }
    }

    #[test]
    fn letter_matching() {
        assert!(MbtiType::Intj.matches_letters("NT"));
        assert!(!MbtiType::Infp.matches_letters("NT"));
        assert!(!MbtiType::Estj.matches_letters("SJ"));
        assert!(!MbtiType::Isfp.matches_letters("SP"));
        assert!(MbtiType::Estj.matches_letters("ESTJ"));
        assert!(MbtiType::Enfj.matches_letters("NF"));
        assert!(MbtiType::Infp.matches_letters("INFP"));
        assert!(!MbtiType::Infp.matches_letters(""));
    }

    #[test]
    fn parse_is_case_insensitive() {
        assert_eq!("enfj".parse::<MbtiType>().unwrap(), MbtiType::Enfj);
        assert!("XXXX".parse::<MbtiType>().is_err());
    }

    #[test]
    fn serializes_as_uppercase_code() {
        assert_eq!(serde_json::to_string(&MbtiType::Esfp).unwrap(), "\"ESFP\"");
    }

    #[test]
    fn probability_pairs_sum_to_one() {
        let p = MbtiProbabilities::from_positive([0.9, 0.2, 0.55, 0.01]);
        assert!((p.e + p.i - 1.0).abs() < 1e-12);
        assert!((p.s + p.n - 1.0).abs() < 1e-12);
        assert!((p.t + p.f - 1.0).abs() < 1e-12);
        assert!((p.j + p.p - 1.0).abs() < 1e-12);
        assert_eq!(p.positives(), [0.9, 0.2, 0.55, 0.01]);
    }
}
