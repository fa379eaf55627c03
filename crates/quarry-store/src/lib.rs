//! Quarry Storage Layer
//!
//! Persistent semantic index over document chunks: SQLite for chunk text,
//! metadata and embeddings, HNSW for nearest-neighbor retrieval. The HNSW
//! index is in-memory and rebuilt from the SQLite rows on open, so a
//! directory that held an index before a restart serves identical retrieval
//! results after it.
//!
//! # Architecture
//!
//! - One directory per index, holding a single `chunks.db`
//! - Embeddings computed once at add-time through the configured
//!   [`EmbeddingProvider`], then owned by the index
//! - Embedding dimension pinned in a meta table at creation and enforced
//!   for the lifetime of the directory
//! - Explicit `flush`/`close` so callers can guarantee handle release
//!   before destructive directory operations
//!
//! # Examples
//!
//! ```no_run
//! use quarry_store::{HashEmbedder, SemanticIndex};
//!
//! let index = SemanticIndex::open("./index", HashEmbedder::new(128)).unwrap();
//! let results = index.retrieve("Apex Technologies", 3, None).unwrap();
//! ```

#![warn(missing_docs)]

pub mod embedding;
pub mod vector_index;

pub use embedding::{cosine_similarity, EmbeddingError, HashEmbedder};
pub use vector_index::{VectorIndex, VectorIndexError, DEFAULT_EF_SEARCH};

use quarry_domain::traits::EmbeddingProvider;
use quarry_domain::{Chunk, ChunkId, ChunkMetadata, MetadataFilter, ScoredChunk};
use rusqlite::{params, Connection, OptionalExtension};
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use thiserror::Error;
use tracing::{debug, info, warn};

/// Name of the database file inside an index directory
const DB_FILE: &str = "chunks.db";

/// Errors that can occur during index operations
#[derive(Error, Debug)]
pub enum StoreError {
    /// Database error
    #[error("Database error: {0}")]
    Database(#[from] rusqlite::Error),

    /// Filesystem error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Embedding backend failure
    #[error("Embedding failed: {0}")]
    Embedding(String),

    /// Vector dimension does not match the index
    #[error(transparent)]
    Vector(#[from] VectorIndexError),

    /// Embedder dimension does not match what the directory was created with
    #[error("Index at {path} has dimension {stored}, embedder produces {provided}")]
    DimensionMismatch {
        /// Index directory
        path: PathBuf,
        /// Dimension recorded in the meta table
        stored: usize,
        /// Dimension of the supplied embedder
        provided: usize,
    },

    /// Stored data failed to round-trip
    #[error("Invalid data: {0}")]
    InvalidData(String),
}

/// Persistent chunk index with nearest-neighbor retrieval
///
/// Writers are serialized by an internal connection mutex; reads against a
/// stable index are safe to run concurrently.
pub struct SemanticIndex<E> {
    dir: PathBuf,
    conn: Mutex<Connection>,
    vectors: VectorIndex,
    embedder: E,
}

impl<E> SemanticIndex<E>
where
    E: EmbeddingProvider,
    E::Error: std::fmt::Display,
{
    /// Open (or create) the index stored in `dir`
    ///
    /// Creates the directory if needed, then rebuilds the in-memory vector
    /// index from any previously persisted chunks. Fails if the directory
    /// was created with a different embedding dimension.
    pub fn open(dir: impl AsRef<Path>, embedder: E) -> Result<Self, StoreError> {
        let dir = dir.as_ref().to_path_buf();
        std::fs::create_dir_all(&dir)?;

        let conn = Connection::open(dir.join(DB_FILE))?;
        conn.pragma_update(None, "journal_mode", "wal")?;
        conn.execute_batch(include_str!("schema.sql"))?;

        let dimension = embedder.dimension();
        match Self::stored_dimension(&conn)? {
            Some(stored) if stored != dimension => {
                return Err(StoreError::DimensionMismatch {
                    path: dir,
                    stored,
                    provided: dimension,
                });
            }
            Some(_) => {}
            None => {
                conn.execute(
                    "INSERT INTO index_meta (key, value) VALUES ('dimension', ?1)",
                    params![dimension.to_string()],
                )?;
            }
        }

        let vectors = VectorIndex::new(dimension);
        let restored = Self::rebuild_vectors(&conn, &vectors, dimension)?;
        if restored > 0 {
            info!("Reopened index at {:?}: {} chunks restored", dir, restored);
        }

        Ok(Self {
            dir,
            conn: Mutex::new(conn),
            vectors,
            embedder,
        })
    }

    fn stored_dimension(conn: &Connection) -> Result<Option<usize>, StoreError> {
        let value: Option<String> = conn
            .query_row(
                "SELECT value FROM index_meta WHERE key = 'dimension'",
                [],
                |row| row.get(0),
            )
            .optional()?;

        match value {
            None => Ok(None),
            Some(v) => v
                .parse::<usize>()
                .map(Some)
                .map_err(|_| StoreError::InvalidData(format!("Bad stored dimension: {}", v))),
        }
    }

    fn rebuild_vectors(
        conn: &Connection,
        vectors: &VectorIndex,
        dimension: usize,
    ) -> Result<usize, StoreError> {
        let mut stmt = conn.prepare("SELECT id, embedding FROM chunks ORDER BY rowid")?;
        let rows = stmt.query_map([], |row| {
            let id: Vec<u8> = row.get(0)?;
            let embedding: Vec<u8> = row.get(1)?;
            Ok((id, embedding))
        })?;

        let mut count = 0;
        for row in rows {
            let (id_bytes, embedding_bytes) = row?;
            let id = bytes_to_chunk_id(&id_bytes)?;
            let embedding = bytes_to_embedding(&embedding_bytes, dimension)?;
            vectors.add(id, &embedding)?;
            count += 1;
        }
        Ok(count)
    }

    /// Embed and persist chunks
    ///
    /// Each chunk's text goes through the embedding provider exactly once;
    /// vector, text and metadata are written in a single transaction. Empty
    /// input is a no-op with a warning, not an error. Returns the number of
    /// chunks added.
    pub fn add(&self, chunks: &[Chunk]) -> Result<usize, StoreError> {
        if chunks.is_empty() {
            warn!("No chunks provided to add");
            return Ok(0);
        }

        // Embed outside the connection lock; the backend call dominates
        let mut embedded = Vec::with_capacity(chunks.len());
        for chunk in chunks {
            let vector = self
                .embedder
                .embed(&chunk.text)
                .map_err(|e| StoreError::Embedding(e.to_string()))?;
            embedded.push((chunk, vector));
        }

        let mut conn = self.conn.lock().unwrap();
        let tx = conn.transaction()?;
        for (chunk, vector) in &embedded {
            tx.execute(
                "INSERT INTO chunks (id, seq, text, source, entity, year, doc_type, embedding)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)",
                params![
                    chunk_id_to_bytes(chunk.id),
                    chunk.seq as i64,
                    chunk.text,
                    chunk.metadata.source,
                    chunk.metadata.entity,
                    chunk.metadata.year,
                    chunk.metadata.doc_type,
                    embedding_to_bytes(vector),
                ],
            )?;
        }
        tx.commit()?;
        drop(conn);

        for (chunk, vector) in &embedded {
            self.vectors.add(chunk.id, vector)?;
        }

        debug!("Indexed {} chunks", chunks.len());
        Ok(chunks.len())
    }

    /// Retrieve up to `k` chunks nearest to `query`, most-similar first
    ///
    /// With a metadata filter, candidates are scored exhaustively with exact
    /// cosine similarity over the matching rows (post-filtering an HNSW
    /// top-k would silently shrink below k); without one, the HNSW index
    /// answers. An empty index yields an empty result, never an error.
    pub fn retrieve(
        &self,
        query: &str,
        k: usize,
        filter: Option<&MetadataFilter>,
    ) -> Result<Vec<ScoredChunk>, StoreError> {
        if k == 0 || self.vectors.is_empty() {
            return Ok(Vec::new());
        }

        let query_vector = self
            .embedder
            .embed(query)
            .map_err(|e| StoreError::Embedding(e.to_string()))?;

        match filter {
            Some(f) if !f.is_empty() => self.retrieve_filtered(&query_vector, k, f),
            _ => self.retrieve_nearest(&query_vector, k),
        }
    }

    fn retrieve_nearest(&self, query: &[f32], k: usize) -> Result<Vec<ScoredChunk>, StoreError> {
        let hits = self.vectors.search(query, k, DEFAULT_EF_SEARCH)?;

        let conn = self.conn.lock().unwrap();
        let mut results = Vec::with_capacity(hits.len());
        for (id, score) in hits {
            if let Some(chunk) = Self::load_chunk(&conn, id)? {
                results.push(ScoredChunk { chunk, score });
            }
        }
        Ok(results)
    }

    fn retrieve_filtered(
        &self,
        query: &[f32],
        k: usize,
        filter: &MetadataFilter,
    ) -> Result<Vec<ScoredChunk>, StoreError> {
        let dimension = self.embedder.dimension();
        let conn = self.conn.lock().unwrap();

        let mut stmt = conn.prepare(
            "SELECT id, seq, text, source, entity, year, doc_type, embedding
             FROM chunks ORDER BY rowid",
        )?;
        let rows = stmt.query_map([], row_to_parts)?;

        let mut scored = Vec::new();
        for row in rows {
            let (chunk, embedding_bytes) = chunk_from_parts(row?)?;
            if !filter.matches(&chunk.metadata) {
                continue;
            }
            let embedding = bytes_to_embedding(&embedding_bytes, dimension)?;
            let score = cosine_similarity(query, &embedding);
            scored.push(ScoredChunk { chunk, score });
        }

        // Stable ranking: similarity descending, insertion order breaks ties
        scored.sort_by(|a, b| {
            b.score
                .partial_cmp(&a.score)
                .unwrap_or(std::cmp::Ordering::Equal)
        });
        scored.truncate(k);
        Ok(scored)
    }

    fn load_chunk(conn: &Connection, id: ChunkId) -> Result<Option<Chunk>, StoreError> {
        let row = conn
            .query_row(
                "SELECT id, seq, text, source, entity, year, doc_type, embedding
                 FROM chunks WHERE id = ?1",
                params![chunk_id_to_bytes(id)],
                row_to_parts,
            )
            .optional()?;

        match row {
            None => Ok(None),
            Some(parts) => Ok(Some(chunk_from_parts(parts)?.0)),
        }
    }

    /// Number of chunks in the index
    pub fn len(&self) -> usize {
        self.vectors.len()
    }

    /// True when the index holds no chunks
    pub fn is_empty(&self) -> bool {
        self.vectors.is_empty()
    }

    /// Embedding dimension this index was created with
    pub fn dimension(&self) -> usize {
        self.embedder.dimension()
    }

    /// Directory the index persists to
    pub fn path(&self) -> &Path {
        &self.dir
    }

    /// Force pending writes down to the database file
    pub fn flush(&self) -> Result<(), StoreError> {
        let conn = self.conn.lock().unwrap();
        conn.execute_batch("PRAGMA wal_checkpoint(TRUNCATE);")?;
        Ok(())
    }

    /// Release the database handle
    ///
    /// Required before deleting the index directory: the handle holds the
    /// database file open until dropped, and destructive reingestion must
    /// not race that release.
    pub fn close(self) -> Result<(), StoreError> {
        let conn = self.conn.into_inner().unwrap();
        conn.close().map_err(|(_, e)| StoreError::Database(e))
    }
}

type RowParts = (Vec<u8>, i64, String, String, String, Option<i32>, Option<String>, Vec<u8>);

fn row_to_parts(row: &rusqlite::Row<'_>) -> rusqlite::Result<RowParts> {
    Ok((
        row.get(0)?,
        row.get(1)?,
        row.get(2)?,
        row.get(3)?,
        row.get(4)?,
        row.get(5)?,
        row.get(6)?,
        row.get(7)?,
    ))
}

fn chunk_from_parts(parts: RowParts) -> Result<(Chunk, Vec<u8>), StoreError> {
    let (id_bytes, seq, text, source, entity, year, doc_type, embedding) = parts;
    let chunk = Chunk {
        id: bytes_to_chunk_id(&id_bytes)?,
        seq: seq as usize,
        text,
        metadata: ChunkMetadata {
            source,
            entity,
            year,
            doc_type,
        },
    };
    Ok((chunk, embedding))
}

fn chunk_id_to_bytes(id: ChunkId) -> Vec<u8> {
    id.value().to_be_bytes().to_vec()
}

fn bytes_to_chunk_id(bytes: &[u8]) -> Result<ChunkId, StoreError> {
    if bytes.len() != 16 {
        return Err(StoreError::InvalidData(format!(
            "Expected 16 bytes for ChunkId, got {}",
            bytes.len()
        )));
    }
    let mut arr = [0u8; 16];
    arr.copy_from_slice(bytes);
    Ok(ChunkId::from_value(u128::from_be_bytes(arr)))
}

fn embedding_to_bytes(embedding: &[f32]) -> Vec<u8> {
    let mut bytes = Vec::with_capacity(embedding.len() * 4);
    for value in embedding {
        bytes.extend_from_slice(&value.to_le_bytes());
    }
    bytes
}

fn bytes_to_embedding(bytes: &[u8], dimension: usize) -> Result<Vec<f32>, StoreError> {
    if bytes.len() != dimension * 4 {
        return Err(StoreError::InvalidData(format!(
            "Expected {} embedding bytes, got {}",
            dimension * 4,
            bytes.len()
        )));
    }
    Ok(bytes
        .chunks_exact(4)
        .map(|b| f32::from_le_bytes([b[0], b[1], b[2], b[3]]))
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_embedding_bytes_roundtrip() {
        let v = vec![0.25f32, -1.5, 3.125, 0.0];
        let bytes = embedding_to_bytes(&v);
        assert_eq!(bytes.len(), 16);
        assert_eq!(bytes_to_embedding(&bytes, 4).unwrap(), v);
    }

    #[test]
    fn test_embedding_bytes_wrong_length() {
        assert!(bytes_to_embedding(&[0u8; 7], 2).is_err());
    }

    #[test]
    fn test_chunk_id_bytes_roundtrip() {
        let id = ChunkId::new();
        let bytes = chunk_id_to_bytes(id);
        assert_eq!(bytes.len(), 16);
        assert_eq!(bytes_to_chunk_id(&bytes).unwrap(), id);
    }

    #[test]
    fn test_chunk_id_bytes_wrong_length() {
        assert!(bytes_to_chunk_id(&[1, 2, 3]).is_err());
    }
}
