//! Quarry Extractor
//!
//! Extracts caller-specified named fields about named entities from an
//! unstructured text corpus: semantic retrieval finds the relevant passages,
//! a generative model reads the values out of them, and the parser
//! reconciles the free-text answer into a fixed-schema record.
//!
//! # Architecture
//!
//! ```text
//! Corpus dir → Ingestor → SemanticIndex
//!                             ↓
//! Entity → retrieve → PromptBuilder → generate → parse → ExtractionRecord
//! ```
//!
//! # Key Features
//!
//! - **Separator-aware chunking** with overlap, so facts spanning a chunk
//!   boundary survive on both sides
//! - **Batch and per-field retrieval** as runtime configuration, not
//!   parallel code paths
//! - **Short-circuit on empty retrieval**: no context, no generation call
//! - **Entity-level failure recovery**: one bad entity never aborts a batch
//!
//! # Example Usage
//!
//! ```no_run
//! use quarry_extractor::{Analyst, AnalystConfig, Ingestor};
//! use quarry_domain::FieldSchema;
//! use quarry_llm::MockGenerator;
//! use quarry_store::{HashEmbedder, SemanticIndex};
//! use std::path::Path;
//! use std::sync::Arc;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let config = AnalystConfig::default();
//! let index = Arc::new(SemanticIndex::open("./index", HashEmbedder::new(128))?);
//!
//! Ingestor::from_config(&config).ingest_directory(Path::new("./corpus"), &index)?;
//!
//! let analyst = Analyst::new(MockGenerator::new("$50 Million | Jane Doe"), index, config);
//! let schema = FieldSchema::new(["Revenue", "CEO"])?;
//! let record = analyst.analyze("Apex Technologies", &schema).await?;
//!
//! println!("Revenue: {:?}", record.get("Revenue"));
//! # Ok(())
//! # }
//! ```

#![warn(missing_docs)]

mod analyst;
mod chunking;
mod config;
mod error;
mod ingest;
mod parser;
mod prompt;
mod tagging;
mod types;


pub use analyst::{Analyst, QueryGranularity};
pub use chunking::TextChunker;
pub use config::AnalystConfig;
pub use error::AnalystError;
pub use ingest::{IngestReport, Ingestor};
pub use parser::{parse_response, ParsePolicy};
pub use prompt::PromptBuilder;
pub use tagging::{DocumentTagger, KeywordMatcher};
pub use types::{AnalysisReport, EntityRecord};
