use std::collections::BTreeMap;

use serde::Deserialize;

use crate::benchmark::{run_benchmark, BenchmarkOptions};
use crate::catalog::default_catalog;
use crate::config::EngineConfig;
use crate::engine::Engine;
use crate::error::CoreError;
use crate::models::{Indicator, ResponseSet};

pub const SCHEMA_VERSION: u8 = 1;

const INVALID_REQUEST: &str = "INVALID_REQUEST";
const UNSUPPORTED_SCHEMA: &str = "UNSUPPORTED_SCHEMA";

fn err_code(code: &str, message: impl std::fmt::Display) -> String {
    format!("{code}: {message}")
}

fn core_err(err: CoreError) -> String {
    err_code(err.code(), err)
}

fn schema_v1() -> u8 {
    SCHEMA_VERSION
}

/// Answers either keyed by item id or as an ordered list mapped to ids `1..=N`.
///
/// Keys stay strings here: untagged buffering loses serde_json's numeric key parsing.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum ResponseInput {
    Ordered(Vec<f64>),
    Keyed(BTreeMap<String, f64>),
}

impl ResponseInput {
    pub fn into_set(self) -> Result<ResponseSet, String> {
        match self {
            ResponseInput::Ordered(values) => Ok(ResponseSet::from_ordered(&values)),
            ResponseInput::Keyed(answers) => answers
                .into_iter()
                .map(|(key, value)| {
                    key.trim()
                        .parse::<u32>()
                        .map(|id| (id, value))
                        .map_err(|_| {
                            err_code(INVALID_REQUEST, format!("item id '{key}' is not an integer"))
                        })
                })
                .collect(),
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct ScoreRequest {
    #[serde(default = "schema_v1")]
    pub schema_version: u8,
    pub responses: ResponseInput,
    /// Replaces the static tables for this call.
    #[serde(default)]
    pub config: Option<EngineConfig>,
    /// Externally supplied tie-break factors.
    #[serde(default)]
    pub secondary: Option<BTreeMap<Indicator, f64>>,
    /// Force the double-buffer check for this call.
    #[serde(default)]
    pub guarded: bool,
}

#[derive(Debug, Deserialize)]
pub struct BenchmarkRequest {
    #[serde(default = "schema_v1")]
    pub schema_version: u8,
    #[serde(flatten)]
    pub options: BenchmarkOptions,
    #[serde(default)]
    pub config: Option<EngineConfig>,
}

fn check_schema(version: u8) -> Result<(), String> {
    if version == SCHEMA_VERSION {
        Ok(())
    } else {
        Err(err_code(
            UNSUPPORTED_SCHEMA,
            format!("schema_version {version}, expected {SCHEMA_VERSION}"),
        ))
    }
}

fn build_engine(config: Option<EngineConfig>) -> Result<Engine, String> {
    Engine::new(default_catalog().clone(), config.unwrap_or_default()).map_err(core_err)
}

/// Score one response set against the default catalog.
///
/// Errors are `"CODE: message"` strings; validation failures list every violation.
pub fn score_json(request_json: &str) -> Result<String, String> {
    let request: ScoreRequest = serde_json::from_str(request_json)
        .map_err(|e| err_code(INVALID_REQUEST, format!("invalid JSON request: {e}")))?;
    check_schema(request.schema_version)?;

    let ScoreRequest { responses, config, secondary, guarded, .. } = request;
    let engine = build_engine(config)?;
    let responses = responses.into_set()?;

    let result = if guarded {
        engine.score_guarded(&responses, secondary.as_ref())
    } else {
        engine.score_with_secondary(&responses, secondary.as_ref())
    }
    .map_err(core_err)?;

    serde_json::to_string(&result).map_err(|e| core_err(e.into()))
}

/// Run the full benchmark and return the report as JSON.
pub fn run_benchmark_json(request_json: &str) -> Result<String, String> {
    let request: BenchmarkRequest = serde_json::from_str(request_json)
        .map_err(|e| err_code(INVALID_REQUEST, format!("invalid JSON request: {e}")))?;
    check_schema(request.schema_version)?;

    let engine = build_engine(request.config)?;
    let report = run_benchmark(&engine, &request.options).map_err(core_err)?;
    serde_json::to_string(&report).map_err(|e| core_err(e.into()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::Value;

    #[test]
    fn ordered_and_keyed_inputs_agree() {
        let ordered = format!("{{\"responses\": {:?}}}", vec![3.0; 60]);
        let keyed = format!(
            "{{\"responses\": {{{}}}}}",
            (1..=60).map(|i| format!("\"{i}\": 3")).collect::<Vec<_>>().join(",")
        );
        let a: Value = serde_json::from_str(&score_json(&ordered).unwrap()).unwrap();
        let b: Value = serde_json::from_str(&score_json(&keyed).unwrap()).unwrap();
        assert_eq!(a["traits"], b["traits"]);
        assert_eq!(a["mbti"]["type"], "ISTJ");
        assert_eq!(a["metadata"]["item_count"], 60);
    }

    #[test]
    fn validation_errors_carry_code_and_every_violation() {
        let err = score_json(r#"{"responses": {"1": 9, "2": 2.5}}"#).unwrap_err();
        assert!(err.starts_with("VALIDATION_ERROR: "), "{err}");
        assert!(err.contains("item 1"), "{err}");
        assert!(err.contains("item 2"), "{err}");
    }

    #[test]
    fn malformed_requests_are_rejected() {
        assert!(score_json("not json").unwrap_err().starts_with("INVALID_REQUEST"));
        let err = score_json(r#"{"schema_version": 2, "responses": []}"#).unwrap_err();
        assert!(err.starts_with("UNSUPPORTED_SCHEMA"));
        let err = score_json(r#"{"responses": {"one": 3}}"#).unwrap_err();
        assert!(err.starts_with("INVALID_REQUEST"), "{err}");
    }

    #[test]
    fn guarded_request_succeeds() {
        let request = format!("{{\"responses\": {:?}, \"guarded\": true}}", vec![4.0; 60]);
        let out: Value = serde_json::from_str(&score_json(&request).unwrap()).unwrap();
        assert!(out["timestamp"].is_string());
    }

    #[test]
    fn guarded_request_keeps_secondary_factors() {
        let secondary = r#"{"self_regulation": 100, "exploration": 0, "social_connection": 0,
            "leadership": 0, "collaboration": 0, "emotional_stability": 0, "resilience": 0,
            "immersion": 0, "growth_drive": 0}"#;
        let request = |guarded: bool| {
            format!(
                "{{\"responses\": {:?}, \"secondary\": {secondary}, \"guarded\": {guarded}}}",
                vec![3.0; 60]
            )
        };
        let plain: Value = serde_json::from_str(&score_json(&request(false)).unwrap()).unwrap();
        let guarded: Value = serde_json::from_str(&score_json(&request(true)).unwrap()).unwrap();
        assert_eq!(plain["ties"], guarded["ties"]);
        assert_eq!(plain["composites"], guarded["composites"]);
        let ties = guarded["ties"].as_array().unwrap();
        assert!(ties
            .iter()
            .any(|t| t["winner"] == "self_regulation" && t["rule"] == "secondary_factor"));
    }

    #[test]
    fn benchmark_request_uses_defaults() {
        let out: Value =
            serde_json::from_str(&run_benchmark_json(r#"{"repeats": 1}"#).unwrap()).unwrap();
        assert_eq!(out["seed"], 42);
        assert_eq!(out["repeat_count"], 1);
        assert_eq!(out["row_count"], 144);
        let err = run_benchmark_json(r#"{"repeats": 0}"#).unwrap_err();
        assert!(err.starts_with("CONFIGURATION_ERROR"), "{err}");
    }
}
