//! # im_core - Deterministic Personality Scoring Engine
//!
//! Turns 60 Likert answers into Big5 facet and domain scores, maps the
//! standardized facets onto MBTI and Enneagram types, derives nine growth
//! indicators, and benchmarks the mappers against seeded synthetic truth.
//!
//! ## Features
//! - Pure, stateless scoring: same answers + same config = same bytes
//! - Offline calibration fitting (isotonic, Platt, temperature)
//! - Optional double-buffer determinism guard (`determinism_guard` feature)
//! - JSON API for easy integration
//!
//! Results are a research prototype and carry that flag in every envelope.

// Formula code indexes several parallel fixed-size arrays
#![allow(clippy::needless_range_loop)]
// Type names are the established acronyms (ENFJ, ISTJ, ...)
#![allow(clippy::upper_case_acronyms)]
// Doc formatting lints - purely cosmetic
#![allow(clippy::doc_lazy_continuation)]
#![allow(clippy::too_many_arguments)]

pub mod api;
pub mod benchmark;
pub mod calibration;
pub mod catalog;
pub mod composite;
pub mod config;
pub mod engine;
pub mod error;
pub mod mapping;
pub mod models;
pub mod scoring;

// Re-export main API functions
pub use api::{run_benchmark_json, score_json, BenchmarkRequest, ScoreRequest};
pub use error::{CoreError, Result};

// Re-export the engine surface
pub use catalog::{default_catalog, validate_catalog, CatalogStats, ItemCatalog};
pub use config::EngineConfig;
pub use engine::{canonical_hash, Engine, EngineResult, ENGINE_VERSION};

// Re-export benchmark types
pub use benchmark::{run_benchmark, BenchmarkOptions, BenchmarkReport, FitMethod};

// Re-export domain types
pub use models::{
    Domain, EnneagramType, Facet, Indicator, MbtiType, ResponseSet, TraitScores, Warning,
};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
