//! Seeded synthetic ground truth: every MBTI × Enneagram pair, R times.
//!
//! Each repeat owns its own `ChaCha8Rng` seeded with `seed + r`, so repeats
//! can be generated in parallel and still concatenate to the same rows.

use std::collections::BTreeMap;

use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use rand_distr::StandardNormal;
use rayon::prelude::*;
use serde::{Deserialize, Serialize};

use crate::models::{Domain, EnneagramType, Facet, FacetZScores, MbtiType};

pub const DEFAULT_SEED: u64 = 42;
pub const DEFAULT_REPEATS: usize = 20;
pub const COMBINATIONS: usize = 16 * 9;

/// Standard deviation of the per-domain Gaussian noise.
pub const DOMAIN_NOISE_SD: f64 = 8.0;
/// Facet offsets are uniform in `[-FACET_SPREAD, FACET_SPREAD)`.
pub const FACET_SPREAD: f64 = 5.0;

/// One synthetic respondent with known types.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TestRow {
    pub repeat: usize,
    pub mbti: MbtiType,
    pub enneagram: EnneagramType,
    pub domains: BTreeMap<Domain, f64>,
    pub facets: BTreeMap<Facet, f64>,
}

impl TestRow {
    /// Facet values fed straight into the mappers, bypassing Likert items.
    pub fn facet_z(&self) -> FacetZScores {
        FacetZScores::from_scores(&self.facets)
    }

    /// `"ENFJ+8"`
    pub fn label(&self) -> String {
        format!("{}+{}", self.mbti, self.enneagram)
    }
}

/// All 144 truth pairs in a fixed order: MBTI outer, Enneagram inner.
pub fn combinations() -> Vec<(MbtiType, EnneagramType)> {
    MbtiType::ALL
        .iter()
        .flat_map(|m| EnneagramType::ALL.iter().map(move |e| (*m, *e)))
        .collect()
}

/// Domain target pulled halfway toward each letter's mean.
fn letter_target(letter: char) -> Option<(Domain, f64)> {
    match letter {
        'E' => Some((Domain::E, 70.0)),
        'I' => Some((Domain::E, 30.0)),
        'N' => Some((Domain::O, 70.0)),
        'S' => Some((Domain::O, 40.0)),
        'F' => Some((Domain::A, 65.0)),
        'T' => Some((Domain::A, 45.0)),
        'J' => Some((Domain::C, 70.0)),
        'P' => Some((Domain::C, 45.0)),
        _ => None,
    }
}

fn enneagram_shift(t: EnneagramType) -> [(Domain, f64); 2] {
    match t {
        EnneagramType::One => [(Domain::C, 12.0), (Domain::A, 2.0)],
        EnneagramType::Two => [(Domain::A, 12.0), (Domain::E, 4.0)],
        EnneagramType::Three => [(Domain::E, 8.0), (Domain::C, 4.0)],
        EnneagramType::Four => [(Domain::N, 12.0), (Domain::O, 6.0)],
        EnneagramType::Five => [(Domain::O, 10.0), (Domain::E, -8.0)],
        EnneagramType::Six => [(Domain::N, 8.0), (Domain::C, 4.0)],
        EnneagramType::Seven => [(Domain::E, 12.0), (Domain::N, -4.0)],
        EnneagramType::Eight => [(Domain::E, 10.0), (Domain::A, -8.0)],
        EnneagramType::Nine => [(Domain::A, 8.0), (Domain::N, -8.0)],
    }
}

/// Noise-free domain means for a truth pair.
pub fn domain_means(mbti: MbtiType, enneagram: EnneagramType) -> BTreeMap<Domain, f64> {
    let mut means: BTreeMap<Domain, f64> = Domain::ALL.iter().map(|d| (*d, 50.0)).collect();
    for letter in mbti.as_str().chars() {
        if let Some((domain, mu)) = letter_target(letter) {
            if let Some(v) = means.get_mut(&domain) {
                *v = (*v + mu) / 2.0;
            }
        }
    }
    for (domain, delta) in enneagram_shift(enneagram) {
        if let Some(v) = means.get_mut(&domain) {
            *v += delta;
        }
    }
    means
}

fn sample_row(
    rng: &mut ChaCha8Rng,
    repeat: usize,
    mbti: MbtiType,
    enneagram: EnneagramType,
) -> TestRow {
    let domains: BTreeMap<Domain, f64> = domain_means(mbti, enneagram)
        .into_iter()
        .map(|(d, mean)| {
            let noise: f64 = rng.sample(StandardNormal);
            (d, (mean + noise * DOMAIN_NOISE_SD).clamp(0.0, 100.0))
        })
        .collect();

    let facets = Facet::ALL
        .iter()
        .map(|f| {
            let offset = rng.gen_range(-FACET_SPREAD..FACET_SPREAD);
            let base = domains.get(&f.domain()).copied().unwrap_or(50.0);
            (*f, (base + offset).clamp(0.0, 100.0))
        })
        .collect();

    TestRow { repeat, mbti, enneagram, domains, facets }
}

/// The 144 rows of one repeat.
pub fn generate_repeat(seed: u64, repeat: usize) -> Vec<TestRow> {
    let mut rng = ChaCha8Rng::seed_from_u64(seed.wrapping_add(repeat as u64));
    combinations()
        .into_iter()
        .map(|(m, e)| sample_row(&mut rng, repeat, m, e))
        .collect()
}

/// `repeats × 144` rows, repeat-major. Bit-identical for the same seed.
pub fn generate(seed: u64, repeats: usize) -> Vec<TestRow> {
    (0..repeats)
        .into_par_iter()
        .map(|r| generate_repeat(seed, r))
        .collect::<Vec<_>>()
        .into_iter()
        .flatten()
        .collect()
}
