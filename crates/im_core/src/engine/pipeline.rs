//! Response set → traits → {MBTI, Enneagram, composites} → result envelope.

use std::collections::BTreeMap;

use chrono::{SecondsFormat, Utc};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::catalog::{validate_catalog, CatalogStats, ItemCatalog};
use crate::composite::{compute_composites, TieResolution};
use crate::config::EngineConfig;
use crate::error::Result;
use crate::mapping::{map_enneagram, map_mbti};
use crate::models::{
    CompositeSet, EnneagramResult, Indicator, MbtiResult, ResponseSet, TraitScores, Warning,
};
use crate::scoring::score_traits;

pub const ENGINE_VERSION: &str = concat!("im-engine-", env!("CARGO_PKG_VERSION"));

pub const RESEARCH_PROTOTYPE: &str = "RESEARCH_PROTOTYPE";
pub const NOT_FOR_CLINICAL_USE: &str = "NOT_FOR_CLINICAL_USE";
pub const NOT_FOR_HIRING_DECISIONS: &str = "NOT_FOR_HIRING_DECISIONS";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResultMetadata {
    pub item_count: usize,
    pub answered: usize,
    pub catalog_version: String,
    pub priors_version: String,
    pub flags: Vec<String>,
    pub warnings: Vec<Warning>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EngineResult {
    pub version: String,
    /// RFC 3339, UTC. Excluded from determinism hashing.
    pub timestamp: String,
    pub traits: TraitScores,
    pub mbti: MbtiResult,
    pub enneagram: EnneagramResult,
    pub composites: CompositeSet,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub ties: Vec<TieResolution>,
    pub metadata: ResultMetadata,
}

/// Immutable scoring engine: a structurally valid catalog plus a validated config.
#[derive(Debug, Clone)]
pub struct Engine {
    catalog: ItemCatalog,
    config: EngineConfig,
    stats: CatalogStats,
}

impl Engine {
    /// Runs the startup checks; fails on any catalog defect or config gap.
    pub fn new(catalog: ItemCatalog, config: EngineConfig) -> Result<Self> {
        let stats = validate_catalog(&catalog)?;
        config.validate()?;
        info!(
            catalog = %catalog.version,
            items = stats.total_items,
            priors = %config.priors.version,
            "engine ready"
        );
        Ok(Self { catalog, config, stats })
    }

    /// Default 60-item catalog and the static tables.
    pub fn with_defaults() -> Result<Self> {
        Self::new(crate::catalog::default_catalog().clone(), EngineConfig::default())
    }

    pub fn catalog(&self) -> &ItemCatalog {
        &self.catalog
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn catalog_stats(&self) -> &CatalogStats {
        &self.stats
    }

    /// Score one response set, stamped with the current time.
    ///
    /// With the `determinism_guard` feature the pipeline runs twice and the
    /// two results must hash identically.
    pub fn score(&self, responses: &ResponseSet) -> Result<EngineResult> {
        self.score_with_secondary(responses, None)
    }

    pub fn score_with_secondary(
        &self,
        responses: &ResponseSet,
        secondary: Option<&BTreeMap<Indicator, f64>>,
    ) -> Result<EngineResult> {
        let timestamp = Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true);
        #[cfg(feature = "determinism_guard")]
        {
            super::determinism::run_guarded(|| self.score_at(responses, secondary, &timestamp))
        }
        #[cfg(not(feature = "determinism_guard"))]
        {
            self.score_at(responses, secondary, &timestamp)
        }
    }

    /// Always double-buffered, regardless of build features.
    pub fn score_guarded(
        &self,
        responses: &ResponseSet,
        secondary: Option<&BTreeMap<Indicator, f64>>,
    ) -> Result<EngineResult> {
        let timestamp = Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true);
        super::determinism::run_guarded(|| self.score_at(responses, secondary, &timestamp))
    }

    /// Single pure pass with a caller-supplied timestamp.
    pub fn score_at(
        &self,
        responses: &ResponseSet,
        secondary: Option<&BTreeMap<Indicator, f64>>,
        timestamp: &str,
    ) -> Result<EngineResult> {
        let config = &self.config;
        let options = &config.options;

        let outcome = score_traits(&self.catalog, responses, options)?;
        let mut warnings = outcome.warnings;
        let traits = outcome.scores;
        let z = traits.facet_z();

        let mbti = map_mbti(&z, &config.mbti, &config.calibration.mbti);
        let enneagram = map_enneagram(
            &z,
            &config.enneagram,
            &config.priors,
            mbti.mbti_type,
            &config.calibration.enneagram,
        );
        let (composites, ties) = compute_composites(
            &z,
            Some(mbti.mbti_type),
            Some(enneagram.primary),
            config,
            secondary,
        );

        if mbti.confidence < options.mbti_low_confidence {
            warnings.push(Warning::LowMbtiConfidence {
                confidence: mbti.confidence,
                threshold: options.mbti_low_confidence,
            });
        }
        let top = enneagram.top_probability();
        if top < options.enneagram_low_probability {
            warnings.push(Warning::LowEnneagramProbability {
                probability: top,
                threshold: options.enneagram_low_probability,
            });
        }

        debug!(
            mbti = %mbti.mbti_type,
            enneagram = %enneagram.primary,
            ties = ties.len(),
            warnings = warnings.len(),
            "pipeline pass complete"
        );

        Ok(EngineResult {
            version: ENGINE_VERSION.to_string(),
            timestamp: timestamp.to_string(),
            traits,
            mbti,
            enneagram,
            composites,
            ties,
            metadata: ResultMetadata {
                item_count: self.catalog.len(),
                answered: responses.len(),
                catalog_version: self.catalog.version.clone(),
                priors_version: config.priors.version.clone(),
                flags: [RESEARCH_PROTOTYPE, NOT_FOR_CLINICAL_USE, NOT_FOR_HIRING_DECISIONS]
                    .iter()
                    .map(|f| f.to_string())
                    .collect(),
                warnings,
            },
        })
    }
}
