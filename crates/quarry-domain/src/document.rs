//! Documents and chunks - the units of text the pipeline operates on

use std::fmt;

/// Unique identifier for a chunk based on UUIDv7
///
/// UUIDv7 provides:
/// - Chronological sortability, so ingestion order is recoverable
/// - 128-bit uniqueness
/// - RFC 9562-standard format with broad ecosystem support
/// - No coordination required for concurrent ingestion
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ChunkId(u128);

impl ChunkId {
    /// Generate a new UUIDv7-based ChunkId
    ///
    /// # Examples
    ///
    /// ```
    /// use quarry_domain::ChunkId;
    ///
    /// let id = ChunkId::new();
    /// assert!(id.value() > 0);
    /// ```
    pub fn new() -> Self {
        Self(uuid::Uuid::now_v7().as_u128())
    }

    /// Create a ChunkId from a raw u128 value
    ///
    /// This is primarily for storage layer deserialization.
    pub fn from_value(value: u128) -> Self {
        Self(value)
    }

    /// Parse a ChunkId from a UUIDv7 string
    pub fn from_string(s: &str) -> Result<Self, String> {
        uuid::Uuid::parse_str(s)
            .map(|u| Self(u.as_u128()))
            .map_err(|e| format!("Invalid UUIDv7 string: {}", e))
    }

    /// Get the raw u128 value
    pub fn value(&self) -> u128 {
        self.0
    }
}

impl Default for ChunkId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for ChunkId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", uuid::Uuid::from_u128(self.0))
    }
}

/// A raw corpus document: text plus source identity
///
/// Created at ingestion, immutable afterwards. One document per corpus file.
#[derive(Debug, Clone, PartialEq)]
pub struct Document {
    /// Full document text
    pub text: String,

    /// Source identifier (typically the file name)
    pub source: String,
}

impl Document {
    /// Create a new document
    pub fn new(text: impl Into<String>, source: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            source: source.into(),
        }
    }
}

/// Metadata carried by every chunk
///
/// `source` is inherited from the parent document; the remaining fields are
/// best-effort enrichment. A document that matches nothing keeps the
/// "unknown" entity tag rather than failing ingestion.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChunkMetadata {
    /// Source identifier of the parent document
    pub source: String,

    /// Entity the document is about, or "unknown"
    pub entity: String,

    /// Reporting year found in the document head, if any
    pub year: Option<i32>,

    /// Document type tag (e.g. "annual_report"), if known
    pub doc_type: Option<String>,
}

/// Entity tag used when no known entity matched the document
pub const UNKNOWN_ENTITY: &str = "unknown";

impl ChunkMetadata {
    /// Metadata with only the source set; enrichment fields at their defaults
    pub fn for_source(source: impl Into<String>) -> Self {
        Self {
            source: source.into(),
            entity: UNKNOWN_ENTITY.to_string(),
            year: None,
            doc_type: None,
        }
    }
}

/// A contiguous slice of a document, sized for embedding
///
/// Chunks are immutable once produced. `seq` preserves in-document order;
/// each chunk after the first starts with the trailing overlap of its
/// predecessor, so concatenating chunks with overlaps removed reconstructs
/// the document.
#[derive(Debug, Clone, PartialEq)]
pub struct Chunk {
    /// Unique identifier
    pub id: ChunkId,

    /// Position of this chunk within its document (0-based)
    pub seq: usize,

    /// Chunk text, overlap prefix included
    pub text: String,

    /// Inherited + enriched metadata
    pub metadata: ChunkMetadata,
}

impl Chunk {
    /// Create a new chunk with a fresh id
    pub fn new(seq: usize, text: impl Into<String>, metadata: ChunkMetadata) -> Self {
        Self {
            id: ChunkId::new(),
            seq,
            text: text.into(),
            metadata,
        }
    }
}

/// Exact-match filter over chunk metadata
///
/// A `None` field matches anything; a `Some` field must equal the chunk's
/// value exactly. An empty filter matches every chunk.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MetadataFilter {
    /// Required source, if any
    pub source: Option<String>,

    /// Required entity tag, if any
    pub entity: Option<String>,

    /// Required year, if any
    pub year: Option<i32>,

    /// Required document type, if any
    pub doc_type: Option<String>,
}

impl MetadataFilter {
    /// Filter restricted to a single entity tag
    pub fn entity(name: impl Into<String>) -> Self {
        Self {
            entity: Some(name.into()),
            ..Self::default()
        }
    }

    /// True when every set field equals the chunk's metadata value
    pub fn matches(&self, metadata: &ChunkMetadata) -> bool {
        if let Some(source) = &self.source {
            if *source != metadata.source {
                return false;
            }
        }
        if let Some(entity) = &self.entity {
            if *entity != metadata.entity {
                return false;
            }
        }
        if let Some(year) = self.year {
            if Some(year) != metadata.year {
                return false;
            }
        }
        if let Some(doc_type) = &self.doc_type {
            if Some(doc_type.as_str()) != metadata.doc_type.as_deref() {
                return false;
            }
        }
        true
    }

    /// True when no field is set
    pub fn is_empty(&self) -> bool {
        self.source.is_none()
            && self.entity.is_none()
            && self.year.is_none()
            && self.doc_type.is_none()
    }
}

/// A chunk paired with its similarity score for a query
///
/// Retrieval returns these ranked most-similar first.
#[derive(Debug, Clone, PartialEq)]
pub struct ScoredChunk {
    /// The retrieved chunk
    pub chunk: Chunk,

    /// Similarity to the query (cosine, higher is closer)
    pub score: f32,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_chunk_id_ordering() {
        let id1 = ChunkId::from_value(1000);
        let id2 = ChunkId::from_value(2000);

        assert!(id1 < id2);
        assert!(id2 > id1);
    }

    #[test]
    fn test_chunk_id_chronological() {
        // UUIDv7s generated in sequence should be chronologically ordered
        let id1 = ChunkId::new();
        std::thread::sleep(std::time::Duration::from_millis(2));
        let id2 = ChunkId::new();

        assert!(id1 < id2, "Earlier UUIDv7 should be less than later UUIDv7");
    }

    #[test]
    fn test_chunk_id_display_and_parse() {
        let id = ChunkId::new();
        let id_str = id.to_string();

        // UUIDv7 strings are 36 characters (8-4-4-4-12 with hyphens)
        assert_eq!(id_str.len(), 36);

        let parsed = ChunkId::from_string(&id_str).unwrap();
        assert_eq!(id, parsed);
    }

    #[test]
    fn test_chunk_id_invalid_string() {
        assert!(ChunkId::from_string("not-a-valid-uuid").is_err());
        assert!(ChunkId::from_string("").is_err());
    }

    #[test]
    fn test_metadata_defaults() {
        let meta = ChunkMetadata::for_source("report.txt");
        assert_eq!(meta.source, "report.txt");
        assert_eq!(meta.entity, UNKNOWN_ENTITY);
        assert!(meta.year.is_none());
        assert!(meta.doc_type.is_none());
    }

    #[test]
    fn test_empty_filter_matches_everything() {
        let filter = MetadataFilter::default();
        assert!(filter.is_empty());
        assert!(filter.matches(&ChunkMetadata::for_source("a.txt")));
    }

    #[test]
    fn test_entity_filter() {
        let mut meta = ChunkMetadata::for_source("a.txt");
        meta.entity = "Apex Technologies".to_string();

        assert!(MetadataFilter::entity("Apex Technologies").matches(&meta));
        assert!(!MetadataFilter::entity("GreenField Power").matches(&meta));
    }

    #[test]
    fn test_filter_all_fields_must_match() {
        let mut meta = ChunkMetadata::for_source("a.txt");
        meta.entity = "Apex Technologies".to_string();
        meta.year = Some(2024);

        let filter = MetadataFilter {
            entity: Some("Apex Technologies".to_string()),
            year: Some(2023),
            ..MetadataFilter::default()
        };
        assert!(!filter.matches(&meta));
    }
}

#[cfg(test)]
mod proptests {
    use super::*;
    use proptest::prelude::*;

    proptest! {
        /// Property: UUIDv7 ordering matches u128 ordering
        #[test]
        fn test_chunk_id_ordering_property(a: u128, b: u128) {
            let id_a = ChunkId::from_value(a);
            let id_b = ChunkId::from_value(b);

            prop_assert_eq!(id_a < id_b, a < b);
            prop_assert_eq!(id_a == id_b, a == b);
            prop_assert_eq!(id_a > id_b, a > b);
        }

        /// Property: Round-trip through string representation preserves ID
        #[test]
        fn test_chunk_id_string_roundtrip(value: u128) {
            let id = ChunkId::from_value(value);
            let id_str = id.to_string();

            match ChunkId::from_string(&id_str) {
                Ok(parsed) => prop_assert_eq!(id, parsed),
                Err(e) => return Err(TestCaseError::fail(e)),
            }
        }
    }
}
