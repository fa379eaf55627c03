//! The analyze command: batch field extraction over the index.

use crate::cli::AnalyzeArgs;
use crate::config::Config;
use crate::embedder::AnyEmbedder;
use crate::error::{CliError, Result};
use crate::output::{format_report_csv, Formatter};
use quarry_domain::FieldSchema;
use quarry_extractor::{Analyst, QueryGranularity};
use quarry_llm::OllamaGenerator;
use quarry_store::SemanticIndex;
use std::sync::Arc;

/// Analyze entities against the index and print the result table.
pub async fn execute_analyze(
    args: AnalyzeArgs,
    config: &Config,
    offline: bool,
    formatter: &Formatter,
) -> Result<()> {
    let schema = FieldSchema::new(args.fields).map_err(CliError::InvalidInput)?;
    let entities: Vec<String> = args
        .entities
        .iter()
        .map(|e| e.trim().to_string())
        .filter(|e| !e.is_empty())
        .collect();
    if entities.is_empty() {
        return Err(CliError::InvalidInput("No entities given".into()));
    }

    let mut analysis = config.analysis.clone();
    if args.per_field {
        analysis.granularity = QueryGranularity::PerField;
    }
    if let Some(k) = args.k {
        analysis.batch_k = k;
        analysis.per_field_k = k;
    }
    analysis.validate().map_err(CliError::Config)?;

    let index_dir = args.index.unwrap_or_else(|| config.index_dir.clone());
    let embedder = AnyEmbedder::from_config(config, offline);
    let index = Arc::new(SemanticIndex::open(&index_dir, embedder)?);

    if index.is_empty() {
        println!(
            "{}",
            formatter.error(&format!(
                "Index at {} is empty; run 'quarry ingest' first",
                index_dir.display()
            ))
        );
        return Ok(());
    }

    let generator = OllamaGenerator::new(&config.ollama.endpoint, &config.ollama.generation_model);
    let analyst = Analyst::new(generator, index, analysis);

    println!(
        "{}",
        formatter.info(&format!(
            "Analyzing {} entit{} × {} field(s)...",
            entities.len(),
            if entities.len() == 1 { "y" } else { "ies" },
            schema.len()
        ))
    );

    let report = analyst.analyze_batch(&entities, &schema).await;
    println!("{}", formatter.format_report(&report)?);

    if let Some(path) = args.out {
        std::fs::write(&path, format_report_csv(&report))?;
        println!(
            "{}",
            formatter.success(&format!("Results saved to {}", path.display()))
        );
    }

    Ok(())
}
