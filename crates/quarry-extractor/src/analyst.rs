//! The Analyst orchestrator: retrieve → prompt → generate → parse
//!
//! Each `analyze` call is stateless beyond the shared, persistent index -
//! nothing from one entity's analysis can leak into another's. When
//! retrieval comes back empty the orchestrator short-circuits to an
//! all-"N/A" record without touching the generation backend: there is no
//! point paying for a generation that could only hallucinate.

use crate::config::AnalystConfig;
use crate::error::AnalystError;
use crate::parser::parse_response;
use crate::prompt::PromptBuilder;
use crate::types::{AnalysisReport, EntityRecord};
use quarry_domain::traits::{EmbeddingProvider, GenerationProvider};
use quarry_domain::{ExtractionRecord, FieldSchema, MetadataFilter, ScoredChunk, NOT_AVAILABLE};
use quarry_store::SemanticIndex;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tokio::time::timeout;
use tracing::{debug, error, info};

/// Retrieval strategy for an analysis call
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum QueryGranularity {
    /// One query per entity, one prompt covering all fields. Cheaper; risks
    /// field values bleeding into each other inside one generation call.
    #[default]
    Batch,

    /// One query and one prompt per (entity, field) pair. Linear in field
    /// count but keeps fields from interfering.
    PerField,
}

/// Coordinates the index, the generation backend and the parser
pub struct Analyst<G, E> {
    llm: Arc<G>,
    index: Arc<SemanticIndex<E>>,
    config: AnalystConfig,
}

impl<G, E> Analyst<G, E>
where
    G: GenerationProvider + Send + Sync + 'static,
    G::Error: std::fmt::Display,
    E: EmbeddingProvider + Send + Sync + 'static,
    E::Error: std::fmt::Display,
{
    /// Create an analyst over a shared index
    pub fn new(llm: G, index: Arc<SemanticIndex<E>>, config: AnalystConfig) -> Self {
        Self {
            llm: Arc::new(llm),
            index,
            config,
        }
    }

    /// Extract the schema's fields for one entity
    pub async fn analyze(
        &self,
        entity: &str,
        schema: &FieldSchema,
    ) -> Result<ExtractionRecord, AnalystError> {
        info!("Analyzing '{}' ({} fields)", entity, schema.len());

        match self.config.granularity {
            QueryGranularity::Batch => self.analyze_batched(entity, schema).await,
            QueryGranularity::PerField => self.analyze_per_field(entity, schema).await,
        }
    }

    /// Analyze every entity, recovering failures per entity
    ///
    /// A failed entity becomes an all-"ERROR" row; the batch always runs to
    /// completion.
    pub async fn analyze_batch(
        &self,
        entities: &[String],
        schema: &FieldSchema,
    ) -> AnalysisReport {
        let mut report = AnalysisReport::new(schema.clone());

        for entity in entities {
            let record = match self.analyze(entity, schema).await {
                Ok(record) => record,
                Err(e) => {
                    error!("Analysis of '{}' failed: {}", entity, e);
                    ExtractionRecord::failed(schema)
                }
            };
            report.push(EntityRecord {
                entity: entity.clone(),
                record,
            });
        }

        report
    }

    async fn analyze_batched(
        &self,
        entity: &str,
        schema: &FieldSchema,
    ) -> Result<ExtractionRecord, AnalystError> {
        let filter = self.filter_for(entity);
        let hits = self
            .retrieve(entity.to_string(), self.config.batch_k, filter)
            .await?;

        if hits.is_empty() {
            info!("No context for '{}'; skipping generation", entity);
            return Ok(ExtractionRecord::not_available(schema));
        }

        let context = join_context(&hits);
        let prompt = PromptBuilder::new(schema, &context)
            .with_entity(entity)
            .build();
        debug!("Prompt length: {} chars", prompt.len());

        let raw = self.call_generation(prompt).await?;
        debug!("Response length: {} chars", raw.len());

        parse_response(&raw, schema, self.config.parse_policy)
    }

    async fn analyze_per_field(
        &self,
        entity: &str,
        schema: &FieldSchema,
    ) -> Result<ExtractionRecord, AnalystError> {
        let filter = self.filter_for(entity);
        let mut values = Vec::with_capacity(schema.len());

        for field in schema.iter() {
            let query = format!("{} {}", entity, field);
            let hits = self
                .retrieve(query, self.config.per_field_k, filter.clone())
                .await?;

            if hits.is_empty() {
                debug!("No context for '{}' / '{}'", entity, field);
                values.push(NOT_AVAILABLE.to_string());
                continue;
            }

            let single = FieldSchema::new([field]).map_err(AnalystError::Config)?;
            let context = join_context(&hits);
            let prompt = PromptBuilder::new(&single, &context)
                .with_entity(entity)
                .build();

            let raw = self.call_generation(prompt).await?;
            let record = parse_response(&raw, &single, self.config.parse_policy)?;
            values.push(
                record
                    .values()
                    .next()
                    .unwrap_or(NOT_AVAILABLE)
                    .to_string(),
            );
        }

        ExtractionRecord::from_values(schema, values).map_err(AnalystError::ResponseShape)
    }

    fn filter_for(&self, entity: &str) -> Option<MetadataFilter> {
        self.config
            .filter_by_entity
            .then(|| MetadataFilter::entity(entity))
    }

    /// Run retrieval on the blocking pool; the query embedding may be a
    /// network call
    async fn retrieve(
        &self,
        query: String,
        k: usize,
        filter: Option<MetadataFilter>,
    ) -> Result<Vec<ScoredChunk>, AnalystError> {
        let index = Arc::clone(&self.index);
        tokio::task::spawn_blocking(move || {
            index
                .retrieve(&query, k, filter.as_ref())
                .map_err(|e| AnalystError::Retrieval(e.to_string()))
        })
        .await
        .map_err(|e| AnalystError::Retrieval(format!("Task join error: {}", e)))?
    }

    /// Bridge the sync generation trait onto the async runtime, bounded by
    /// the configured deadline
    async fn call_generation(&self, prompt: String) -> Result<String, AnalystError> {
        let llm = Arc::clone(&self.llm);
        let task = tokio::task::spawn_blocking(move || {
            llm.generate(&prompt)
                .map_err(|e| AnalystError::Generation(e.to_string()))
        });

        match timeout(self.config.generation_timeout(), task).await {
            Err(_) => Err(AnalystError::Timeout),
            Ok(Err(e)) => Err(AnalystError::Generation(format!("Task join error: {}", e))),
            Ok(Ok(result)) => result,
        }
    }
}

fn join_context(hits: &[ScoredChunk]) -> String {
    hits.iter()
        .map(|h| h.chunk.text.as_str())
        .collect::<Vec<_>>()
        .join("\n\n")
}
