//! Best-effort metadata enrichment at ingestion time
//!
//! A document's head is scanned for a known entity, a reporting year and a
//! document-type cue. Matching is pluggable: anything implementing
//! [`EntityMatcher`] can sit behind the tagger, so the recognized vocabulary
//! comes from configuration rather than embedded constants. A document that
//! matches nothing keeps the "unknown" tag; tagging never fails ingestion.

use quarry_domain::traits::EntityMatcher;
use quarry_domain::{ChunkMetadata, Document};
use regex::Regex;
use tracing::debug;

/// Four-digit years between 1900 and 2099
const YEAR_PATTERN: &str = r"\b(19|20)\d{2}\b";

/// Document-type cues checked against the lowercased head
const DOC_TYPE_CUES: [(&str, &str); 4] = [
    ("annual report", "annual_report"),
    ("quarterly report", "quarterly_report"),
    ("press release", "press_release"),
    ("earnings call", "earnings_call"),
];

/// Substring gazetteer over a configured list of entity names
///
/// Matches the full name first, then the name's leading token (so "Apex"
/// still resolves to "Apex Technologies" the way abbreviated mentions do in
/// filings). Short leading tokens are skipped to avoid false hits.
#[derive(Debug, Clone)]
pub struct KeywordMatcher {
    entities: Vec<String>,
}

impl KeywordMatcher {
    /// Build a matcher over the given entity names
    pub fn new<I, S>(entities: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            entities: entities.into_iter().map(Into::into).collect(),
        }
    }
}

impl EntityMatcher for KeywordMatcher {
    fn scan(&self, text: &str) -> Option<String> {
        for entity in &self.entities {
            if text.contains(entity.as_str()) {
                return Some(entity.clone());
            }
        }
        for entity in &self.entities {
            if let Some(token) = entity.split_whitespace().next() {
                if token.chars().count() >= 4 && text.contains(token) {
                    return Some(entity.clone());
                }
            }
        }
        None
    }
}

/// Derives chunk metadata from a document's leading text
pub struct DocumentTagger<M> {
    matcher: M,
    head_chars: usize,
    year_re: Regex,
}

impl<M: EntityMatcher> DocumentTagger<M> {
    /// Create a tagger scanning the first `head_chars` characters
    pub fn new(matcher: M, head_chars: usize) -> Self {
        Self {
            matcher,
            head_chars,
            year_re: Regex::new(YEAR_PATTERN).unwrap(),
        }
    }

    /// Produce metadata for a document
    pub fn tag(&self, document: &Document) -> ChunkMetadata {
        let head: String = document.text.chars().take(self.head_chars).collect();
        let mut metadata = ChunkMetadata::for_source(&document.source);

        if let Some(entity) = self.matcher.scan(&head) {
            metadata.entity = entity;
        }

        if let Some(m) = self.year_re.find(&head) {
            if let Ok(year) = m.as_str().parse::<i32>() {
                metadata.year = Some(year);
            }
        }

        let head_lower = head.to_lowercase();
        for (cue, tag) in DOC_TYPE_CUES {
            if head_lower.contains(cue) {
                metadata.doc_type = Some(tag.to_string());
                break;
            }
        }

        debug!(
            "Tagged '{}' as entity='{}' year={:?} type={:?}",
            document.source, metadata.entity, metadata.year, metadata.doc_type
        );
        metadata
    }
}
