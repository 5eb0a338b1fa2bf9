use std::fmt;

use serde::Serialize;
use thiserror::Error;

use crate::models::Facet;

/// One per-request problem found while validating a response set.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Violation {
    InsufficientResponses { answered: usize, required: usize, total: usize },
    OutOfRange { item_id: u32, value: f64, min: u8, max: u8 },
    NonInteger { item_id: u32, value: f64 },
    UnknownItem { item_id: u32 },
}

impl fmt::Display for Violation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Violation::InsufficientResponses { answered, required, total } => write!(
                f,
                "insufficient responses: {answered}/{total} answered, at least {required} required"
            ),
            Violation::OutOfRange { item_id, value, min, max } => {
                write!(f, "item {item_id}: value {value} outside {min}..={max}")
            }
            Violation::NonInteger { item_id, value } => {
                write!(f, "item {item_id}: value {value} is not an integer")
            }
            Violation::UnknownItem { item_id } => write!(f, "item {item_id} is not in the catalog"),
        }
    }
}

/// Complete list of violations for a rejected response set.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ValidationErrors {
    pub violations: Vec<Violation>,
}

impl fmt::Display for ValidationErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} violation(s): ", self.violations.len())?;
        for (i, v) in self.violations.iter().enumerate() {
            if i > 0 {
                f.write_str("; ")?;
            }
            write!(f, "{v}")?;
        }
        Ok(())
    }
}

/// Malformed or incomplete engine configuration.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ConfigurationError {
    #[error("missing weight for facet {facet} in {table}")]
    MissingWeight { table: String, facet: Facet },

    #[error("composite {indicator} has no usable facets")]
    EmptyComposite { indicator: String },

    #[error("malformed calibration knots: {0}")]
    MalformedKnots(String),

    #[error("calibration strength {0} outside [0, 1]")]
    StrengthOutOfRange(f64),

    #[error("temperature must be finite and positive, got {0}")]
    InvalidTemperature(f64),

    #[error("invalid option {name}: {reason}")]
    InvalidOption { name: String, reason: String },

    #[error("{} configuration problem(s): {}", .0.len(), join(.0))]
    Multiple(Vec<ConfigurationError>),
}

fn join(errors: &[ConfigurationError]) -> String {
    errors.iter().map(|e| e.to_string()).collect::<Vec<_>>().join("; ")
}

/// Catalog defect found by the startup-time structural check.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum CatalogDefect {
    FacetItemCount { facet: Facet, expected: usize, found: usize },
    DomainItemCount { domain: char, expected: usize, found: usize },
    DuplicateId { item_id: u32 },
    IdGap { missing: u32 },
    DomainMismatch { item_id: u32 },
    InvalidScale { min: u8, max: u8 },
}

impl fmt::Display for CatalogDefect {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CatalogDefect::FacetItemCount { facet, expected, found } => {
                write!(f, "facet {facet}: expected {expected} items, found {found}")
            }
            CatalogDefect::DomainItemCount { domain, expected, found } => {
                write!(f, "domain {domain}: expected {expected} items, found {found}")
            }
            CatalogDefect::DuplicateId { item_id } => write!(f, "duplicate item id {item_id}"),
            CatalogDefect::IdGap { missing } => write!(f, "item id {missing} missing from sequence"),
            CatalogDefect::DomainMismatch { item_id } => {
                write!(f, "item {item_id}: facet does not belong to declared domain")
            }
            CatalogDefect::InvalidScale { min, max } => write!(f, "invalid scale {min}..={max}"),
        }
    }
}

#[derive(Error, Debug, Clone, PartialEq)]
#[error("catalog {version} failed structural validation: {}", render_defects(.defects))]
pub struct StructuralError {
    pub version: String,
    pub defects: Vec<CatalogDefect>,
}

fn render_defects(defects: &[CatalogDefect]) -> String {
    defects.iter().map(|d| d.to_string()).collect::<Vec<_>>().join("; ")
}

#[derive(Error, Debug, Clone, PartialEq)]
#[error("determinism violation: first pass {first}, second pass {second}")]
pub struct DeterminismError {
    pub first: String,
    pub second: String,
}

#[derive(Error, Debug)]
pub enum CoreError {
    #[error("validation failed: {0}")]
    Validation(ValidationErrors),

    #[error("configuration error: {0}")]
    Configuration(#[from] ConfigurationError),

    #[error("structural error: {0}")]
    Structural(#[from] StructuralError),

    #[error("{0}")]
    Determinism(#[from] DeterminismError),

    #[error("Serialization error: {0}")]
    Serialization(String),

    #[error("Deserialization error: {0}")]
    Deserialization(String),
}

impl CoreError {
    /// Defects are bugs in the engine itself and must never be retried.
    pub fn is_defect(&self) -> bool {
        matches!(self, CoreError::Determinism(_))
    }

    /// Whether a caller can fix the input and try again.
    pub fn is_recoverable(&self) -> bool {
        match self {
            CoreError::Validation(_) => true,
            CoreError::Deserialization(_) => true,
            CoreError::Configuration(_) => false,
            CoreError::Structural(_) => false,
            CoreError::Determinism(_) => false,
            CoreError::Serialization(_) => false,
        }
    }

    /// Stable machine-readable code used by the JSON boundary.
    pub fn code(&self) -> &'static str {
        match self {
            CoreError::Validation(_) => "VALIDATION_ERROR",
            CoreError::Configuration(_) => "CONFIGURATION_ERROR",
            CoreError::Structural(_) => "STRUCTURAL_ERROR",
            CoreError::Determinism(_) => "DETERMINISM_ERROR",
            CoreError::Serialization(_) => "SERIALIZATION_ERROR",
            CoreError::Deserialization(_) => "DESERIALIZATION_ERROR",
        }
    }
}

impl From<ValidationErrors> for CoreError {
    fn from(err: ValidationErrors) -> Self {
        CoreError::Validation(err)
    }
}

impl From<serde_json::Error> for CoreError {
    fn from(err: serde_json::Error) -> Self {
        if err.is_data() || err.is_syntax() || err.is_eof() {
            CoreError::Deserialization(err.to_string())
        } else {
            CoreError::Serialization(err.to_string())
        }
    }
}

impl From<serde_yaml::Error> for CoreError {
    fn from(err: serde_yaml::Error) -> Self {
        CoreError::Deserialization(err.to_string())
    }
}

pub type Result<T> = std::result::Result<T, CoreError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn validation_message_lists_every_violation() {
        let err = ValidationErrors {
            violations: vec![
                Violation::OutOfRange { item_id: 3, value: 9.0, min: 1, max: 5 },
                Violation::NonInteger { item_id: 4, value: 2.5 },
            ],
        };
        let msg = err.to_string();
        assert!(msg.starts_with("2 violation(s)"));
        assert!(msg.contains("item 3"));
        assert!(msg.contains("item 4"));
    }

    #[test]
    fn determinism_is_the_only_defect() {
        let det: CoreError = DeterminismError { first: "a".into(), second: "b".into() }.into();
        assert!(det.is_defect());
        assert!(!det.is_recoverable());

        let val: CoreError = ValidationErrors { violations: vec![] }.into();
        assert!(!val.is_defect());
        assert!(val.is_recoverable());
    }

    #[test]
    fn json_syntax_error_maps_to_deserialization() {
        let err: CoreError = serde_json::from_str::<u32>("{").unwrap_err().into();
        assert_eq!(err.code(), "DESERIALIZATION_ERROR");
    }
}
