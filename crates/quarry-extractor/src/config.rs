//! Configuration for the extraction pipeline
//!
//! One configurable component instead of parallel code paths: chunk sizing,
//! retrieval depth, query granularity and parse policy are all runtime
//! settings here.

use crate::analyst::QueryGranularity;
use crate::parser::ParsePolicy;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Configuration for ingestion and analysis
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnalystConfig {
    /// Maximum chunk size (characters)
    pub chunk_size: usize,

    /// Overlap carried from each chunk into the next (characters)
    pub chunk_overlap: usize,

    /// How the document head is scanned for entity/year tags (characters)
    pub head_scan_chars: usize,

    /// Entity names the ingestion tagger recognizes
    #[serde(default)]
    pub known_entities: Vec<String>,

    /// Retrieval strategy: one query per entity or one per (entity, field)
    #[serde(default)]
    pub granularity: QueryGranularity,

    /// Chunks retrieved per query in batch mode
    pub batch_k: usize,

    /// Chunks retrieved per query in per-field mode
    pub per_field_k: usize,

    /// Restrict retrieval to chunks tagged with the queried entity
    #[serde(default)]
    pub filter_by_entity: bool,

    /// How length-mismatched model output is reconciled
    #[serde(default)]
    pub parse_policy: ParsePolicy,

    /// Maximum time for a single generation call (seconds)
    pub generation_timeout_secs: u64,
}

impl AnalystConfig {
    /// Get the generation timeout as a Duration
    pub fn generation_timeout(&self) -> Duration {
        Duration::from_secs(self.generation_timeout_secs)
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<(), String> {
        if self.chunk_size == 0 {
            return Err("chunk_size must be greater than 0".to_string());
        }
        if self.chunk_overlap >= self.chunk_size {
            return Err("chunk_overlap must be smaller than chunk_size".to_string());
        }
        if self.batch_k == 0 {
            return Err("batch_k must be greater than 0".to_string());
        }
        if self.per_field_k == 0 {
            return Err("per_field_k must be greater than 0".to_string());
        }
        if self.generation_timeout_secs == 0 {
            return Err("generation_timeout_secs must be greater than 0".to_string());
        }
        Ok(())
    }
}

impl Default for AnalystConfig {
    /// Balanced settings: large chunks so multi-sentence facts stay together
    fn default() -> Self {
        Self {
            chunk_size: 2_000,
            chunk_overlap: 400,
            head_scan_chars: 500,
            known_entities: Vec::new(),
            granularity: QueryGranularity::Batch,
            batch_k: 6,
            per_field_k: 3,
            filter_by_entity: false,
            parse_policy: ParsePolicy::Lenient,
            generation_timeout_secs: 120,
        }
    }
}

impl AnalystConfig {
    /// Fast preset: smaller chunks, shallow retrieval, shorter deadline
    pub fn fast() -> Self {
        Self {
            chunk_size: 1_000,
            chunk_overlap: 200,
            batch_k: 3,
            per_field_k: 2,
            generation_timeout_secs: 60,
            ..Self::default()
        }
    }

    /// Thorough preset: per-field queries, deeper retrieval, strict parsing
    pub fn thorough() -> Self {
        Self {
            granularity: QueryGranularity::PerField,
            batch_k: 9,
            per_field_k: 4,
            parse_policy: ParsePolicy::Strict,
            generation_timeout_secs: 300,
            ..Self::default()
        }
    }

    /// Load configuration from a TOML string
    pub fn from_toml(toml_str: &str) -> Result<Self, String> {
        let config: Self =
            toml::from_str(toml_str).map_err(|e| format!("Failed to parse TOML: {}", e))?;
        config.validate()?;
        Ok(config)
    }

    /// Serialize configuration to a TOML string
    pub fn to_toml(&self) -> Result<String, String> {
        toml::to_string_pretty(self).map_err(|e| format!("Failed to serialize to TOML: {}", e))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_valid() {
        assert!(AnalystConfig::default().validate().is_ok());
    }

    #[test]
    fn test_fast_config_is_valid() {
        assert!(AnalystConfig::fast().validate().is_ok());
    }

    #[test]
    fn test_thorough_config_is_valid() {
        let config = AnalystConfig::thorough();
        assert!(config.validate().is_ok());
        assert_eq!(config.granularity, QueryGranularity::PerField);
        assert_eq!(config.parse_policy, ParsePolicy::Strict);
    }

    #[test]
    fn test_zero_chunk_size_rejected() {
        let mut config = AnalystConfig::default();
        config.chunk_size = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_overlap_must_be_below_chunk_size() {
        let mut config = AnalystConfig::default();
        config.chunk_overlap = config.chunk_size;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_zero_k_rejected() {
        let mut config = AnalystConfig::default();
        config.batch_k = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_toml_round_trip() {
        let config = AnalystConfig::thorough();
        let toml_str = config.to_toml().unwrap();
        let parsed = AnalystConfig::from_toml(&toml_str).unwrap();

        assert_eq!(config.chunk_size, parsed.chunk_size);
        assert_eq!(config.granularity, parsed.granularity);
        assert_eq!(config.parse_policy, parsed.parse_policy);
    }

    #[test]
    fn test_invalid_toml_rejected() {
        assert!(AnalystConfig::from_toml("chunk_size = \"lots\"").is_err());
    }
}
