//! Double-buffer determinism guard.
//!
//! Runs a computation twice and compares canonical hashes of the two
//! results with the `timestamp` field removed. A mismatch is a defect.

use serde::Serialize;
use serde_json::Value;
use sha2::{Digest, Sha256};
use tracing::{debug, error};

use crate::error::{DeterminismError, Result};
use crate::models::response::hex;

pub const EXCLUDED_FIELD: &str = "timestamp";

/// SHA-256 of the sorted-key JSON form, top-level `timestamp` excluded.
pub fn canonical_hash<T: Serialize>(value: &T) -> Result<String> {
    // serde_json::Map is BTreeMap-backed, so keys serialize sorted
    let mut json = serde_json::to_value(value)?;
    if let Value::Object(map) = &mut json {
        map.remove(EXCLUDED_FIELD);
    }
    let bytes = serde_json::to_vec(&json)?;
    Ok(hex(&Sha256::digest(&bytes)))
}

/// Compute twice, compare hashes, return the first result on match.
pub fn run_guarded<T, F>(compute: F) -> Result<T>
where
    T: Serialize,
    F: Fn() -> Result<T>,
{
    let first = compute()?;
    let second = compute()?;
    let h1 = canonical_hash(&first)?;
    let h2 = canonical_hash(&second)?;
    if h1 != h2 {
        error!(first = %h1, second = %h2, "double-buffer hash mismatch");
        return Err(DeterminismError { first: h1, second: h2 }.into());
    }
    debug!(hash = %h1, "double-buffer check passed");
    Ok(first)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell;

    #[derive(Debug, Serialize)]
    struct Stamped {
        timestamp: String,
        value: u32,
    }

    #[test]
    fn timestamp_is_excluded_from_hash() {
        let a = Stamped { timestamp: "2024-01-01T00:00:00Z".into(), value: 7 };
        let b = Stamped { timestamp: "2030-06-30T12:00:00Z".into(), value: 7 };
        assert_eq!(canonical_hash(&a).unwrap(), canonical_hash(&b).unwrap());
        let c = Stamped { timestamp: a.timestamp.clone(), value: 8 };
        assert_ne!(canonical_hash(&a).unwrap(), canonical_hash(&c).unwrap());
    }

    #[test]
    fn matching_runs_return_first() {
        let calls = Cell::new(0u32);
        let out = run_guarded(|| {
            calls.set(calls.get() + 1);
            Ok(Stamped { timestamp: format!("t{}", calls.get()), value: 1 })
        })
        .unwrap();
        assert_eq!(calls.get(), 2);
        assert_eq!(out.timestamp, "t1");
    }

    #[test]
    fn divergent_runs_are_fatal() {
        let calls = Cell::new(0u32);
        let err = run_guarded(|| {
            calls.set(calls.get() + 1);
            Ok(Stamped { timestamp: String::new(), value: calls.get() })
        })
        .unwrap_err();
        assert!(err.is_defect());
        assert_eq!(err.code(), "DETERMINISM_ERROR");
    }
}
