//! Error types for the extraction pipeline

use thiserror::Error;

/// Errors that can occur during ingestion and analysis
///
/// Configuration failures abort the run they affect; everything else is
/// scoped to a single query and recovered at the entity level by the batch
/// loop.
#[derive(Error, Debug)]
pub enum AnalystError {
    /// Corpus or settings problem, fatal for the affected run
    #[error("Configuration error: {0}")]
    Config(String),

    /// Index or embedding backend failure during retrieval
    #[error("Retrieval error: {0}")]
    Retrieval(String),

    /// Generation backend failure
    #[error("Generation error: {0}")]
    Generation(String),

    /// Generation exceeded the configured deadline
    #[error("Generation timed out")]
    Timeout,

    /// Strict-policy response with the wrong number of values
    #[error("Response shape mismatch: {0}")]
    ResponseShape(String),
}
