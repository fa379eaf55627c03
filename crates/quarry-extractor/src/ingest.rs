//! Corpus ingestion: directory of text files → chunked, tagged, indexed
//!
//! One document per `.txt` file, non-recursive. Files that fail to decode
//! are skipped with a warning; a missing or unreadable corpus directory is
//! fatal for the run.

use crate::chunking::TextChunker;
use crate::config::AnalystConfig;
use crate::error::AnalystError;
use crate::tagging::{DocumentTagger, KeywordMatcher};
use quarry_domain::traits::{EmbeddingProvider, EntityMatcher};
use quarry_domain::Document;
use quarry_store::SemanticIndex;
use std::path::Path;
use tracing::{info, warn};

/// What an ingestion run did
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct IngestReport {
    /// Documents chunked and indexed
    pub documents: usize,

    /// Files skipped (empty, unreadable, or not UTF-8)
    pub skipped: usize,

    /// Total chunks written to the index
    pub chunks: usize,
}

/// Chunks, tags and indexes a corpus directory
pub struct Ingestor<M> {
    chunker: TextChunker,
    tagger: DocumentTagger<M>,
}

impl Ingestor<KeywordMatcher> {
    /// Build an ingestor from configuration, using the configured
    /// known-entity gazetteer
    pub fn from_config(config: &AnalystConfig) -> Self {
        let matcher = KeywordMatcher::new(config.known_entities.iter().cloned());
        Self::new(config, matcher)
    }
}

impl<M: EntityMatcher> Ingestor<M> {
    /// Build an ingestor with a caller-supplied entity matcher
    pub fn new(config: &AnalystConfig, matcher: M) -> Self {
        Self {
            chunker: TextChunker::new(config.chunk_size, config.chunk_overlap),
            tagger: DocumentTagger::new(matcher, config.head_scan_chars),
        }
    }

    /// Ingest every `.txt` file in `corpus_dir` into `index`
    ///
    /// Scans non-recursively in file-name order so repeat runs ingest
    /// identically.
    pub fn ingest_directory<E>(
        &self,
        corpus_dir: &Path,
        index: &SemanticIndex<E>,
    ) -> Result<IngestReport, AnalystError>
    where
        E: EmbeddingProvider,
        E::Error: std::fmt::Display,
    {
        if !corpus_dir.is_dir() {
            return Err(AnalystError::Config(format!(
                "Corpus directory '{}' not found",
                corpus_dir.display()
            )));
        }

        let mut paths: Vec<_> = std::fs::read_dir(corpus_dir)
            .map_err(|e| {
                AnalystError::Config(format!(
                    "Cannot read corpus directory '{}': {}",
                    corpus_dir.display(),
                    e
                ))
            })?
            .filter_map(|entry| entry.ok().map(|e| e.path()))
            .filter(|path| {
                path.is_file() && path.extension().and_then(|ext| ext.to_str()) == Some("txt")
            })
            .collect();
        paths.sort();

        info!("Scanning {} ({} text files)", corpus_dir.display(), paths.len());

        let mut report = IngestReport::default();
        for path in paths {
            let source = path
                .file_name()
                .and_then(|n| n.to_str())
                .unwrap_or("unnamed.txt")
                .to_string();

            let text = match std::fs::read_to_string(&path) {
                Ok(text) => text,
                Err(e) => {
                    warn!("Skipping '{}': {}", source, e);
                    report.skipped += 1;
                    continue;
                }
            };

            let document = Document::new(text, source.clone());
            let metadata = self.tagger.tag(&document);
            let chunks = self.chunker.split(&document, &metadata);
            if chunks.is_empty() {
                report.skipped += 1;
                continue;
            }

            let added = index
                .add(&chunks)
                .map_err(|e| AnalystError::Retrieval(e.to_string()))?;
            info!("Indexed '{}': {} chunks", source, added);
            report.documents += 1;
            report.chunks += added;
        }

        info!(
            "Ingestion complete: {} documents, {} chunks, {} skipped",
            report.documents, report.chunks, report.skipped
        );
        Ok(report)
    }
}
