use std::fmt;

use serde::{Deserialize, Serialize};

/// Big5 (OCEAN) domain.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Domain {
    O,
    C,
    E,
    A,
    N,
}

impl Domain {
    pub const ALL: [Domain; 5] = [Domain::O, Domain::C, Domain::E, Domain::A, Domain::N];

    pub fn letter(self) -> char {
        match self {
            Domain::O => 'O',
            Domain::C => 'C',
            Domain::E => 'E',
            Domain::A => 'A',
            Domain::N => 'N',
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Domain::O => "Openness",
            Domain::C => "Conscientiousness",
            Domain::E => "Extraversion",
            Domain::A => "Agreeableness",
            Domain::N => "Neuroticism",
        }
    }

    /// The three facets that make up this domain.
    pub fn facets(self) -> [Facet; 3] {
        match self {
            Domain::O => [Facet::Curiosity, Facet::Aesthetic, Facet::Innovation],
            Domain::C => [Facet::Order, Facet::Grit, Facet::SelfControl],
            Domain::E => [Facet::Sociability, Facet::Vitality, Facet::Assertiveness],
            Domain::A => [Facet::Empathy, Facet::Cooperation, Facet::Modesty],
            Domain::N => [Facet::Anxiety, Facet::Impulsivity, Facet::StressVulnerability],
        }
    }
}

impl fmt::Display for Domain {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.letter())
    }
}

/// One of the 15 Big5 facets, three per domain.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Facet {
    Curiosity,
    Aesthetic,
    Innovation,
    Order,
    Grit,
    SelfControl,
    Sociability,
    Vitality,
    Assertiveness,
    Empathy,
    Cooperation,
    Modesty,
    Anxiety,
    Impulsivity,
    StressVulnerability,
}

impl Facet {
    pub const ALL: [Facet; 15] = [
        Facet::Curiosity,
        Facet::Aesthetic,
        Facet::Innovation,
        Facet::Order,
        Facet::Grit,
        Facet::SelfControl,
        Facet::Sociability,
        Facet::Vitality,
        Facet::Assertiveness,
        Facet::Empathy,
        Facet::Cooperation,
        Facet::Modesty,
        Facet::Anxiety,
        Facet::Impulsivity,
        Facet::StressVulnerability,
    ];

    pub fn domain(self) -> Domain {
        match self {
            Facet::Curiosity | Facet::Aesthetic | Facet::Innovation => Domain::O,
            Facet::Order | Facet::Grit | Facet::SelfControl => Domain::C,
            Facet::Sociability | Facet::Vitality | Facet::Assertiveness => Domain::E,
            Facet::Empathy | Facet::Cooperation | Facet::Modesty => Domain::A,
            Facet::Anxiety | Facet::Impulsivity | Facet::StressVulnerability => Domain::N,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Facet::Curiosity => "curiosity",
            Facet::Aesthetic => "aesthetic",
            Facet::Innovation => "innovation",
            Facet::Order => "order",
            Facet::Grit => "grit",
            Facet::SelfControl => "self_control",
            Facet::Sociability => "sociability",
            Facet::Vitality => "vitality",
            Facet::Assertiveness => "assertiveness",
            Facet::Empathy => "empathy",
            Facet::Cooperation => "cooperation",
            Facet::Modesty => "modesty",
            Facet::Anxiety => "anxiety",
            Facet::Impulsivity => "impulsivity",
            Facet::StressVulnerability => "stress_vulnerability",
        }
    }
}

impl fmt::Display for Facet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}
