//! Stateless scoring entry point and the double-buffer determinism guard.

pub mod determinism;
pub mod pipeline;

pub use determinism::{canonical_hash, run_guarded};
pub use pipeline::{Engine, EngineResult, ResultMetadata, ENGINE_VERSION};
