//! HNSW nearest-neighbor index over chunk embeddings
//!
//! In-memory approximate nearest-neighbor search, rebuilt from the SQLite
//! rows when an index directory is reopened. Separated from the persistence
//! layer so retrieval latency does not depend on row count.
//!
//! # HNSW Parameters
//!
//! - **M**: bi-directional links per node (default: 16)
//! - **efConstruction**: candidate list size during construction (default: 200)
//! - **efSearch**: candidate list size during search (default: 64)

use hnsw_rs::prelude::*;
use quarry_domain::ChunkId;
use std::sync::Mutex;
use thiserror::Error;

const DEFAULT_M: usize = 16;
const DEFAULT_EF_CONSTRUCTION: usize = 200;
const DEFAULT_MAX_ELEMENTS: usize = 1_000_000;

/// Default search quality parameter
pub const DEFAULT_EF_SEARCH: usize = 64;

/// Errors that can occur during vector index operations
#[derive(Error, Debug)]
pub enum VectorIndexError {
    /// Embedding dimension does not match the index
    #[error("Invalid embedding dimension: expected {expected}, got {actual}")]
    DimensionMismatch {
        /// Dimension the index was created with
        expected: usize,
        /// Dimension of the offending vector
        actual: usize,
    },
}

/// Cosine-distance HNSW index mapping internal slots to [`ChunkId`]s
///
/// Thread-safe: insertion and search take `&self` and serialize internally,
/// matching the store's concurrency contract (writers serialized, readers
/// safe against a stable index).
pub struct VectorIndex {
    dimension: usize,
    hnsw: Mutex<Hnsw<'static, f32, DistCosine>>,
    // Slot i holds the ChunkId inserted as internal id i
    ids: Mutex<Vec<ChunkId>>,
}

impl VectorIndex {
    /// Create an empty index for vectors of the given dimension
    pub fn new(dimension: usize) -> Self {
        let nb_layer = 16.min((DEFAULT_MAX_ELEMENTS as f32).ln().trunc() as usize);
        let hnsw = Hnsw::<'static, f32, DistCosine>::new(
            DEFAULT_M,
            DEFAULT_MAX_ELEMENTS,
            nb_layer,
            DEFAULT_EF_CONSTRUCTION,
            DistCosine {},
        );

        Self {
            dimension,
            hnsw: Mutex::new(hnsw),
            ids: Mutex::new(Vec::new()),
        }
    }

    /// Insert a chunk embedding
    pub fn add(&self, chunk_id: ChunkId, embedding: &[f32]) -> Result<(), VectorIndexError> {
        if embedding.len() != self.dimension {
            return Err(VectorIndexError::DimensionMismatch {
                expected: self.dimension,
                actual: embedding.len(),
            });
        }

        let mut ids = self.ids.lock().unwrap();
        let internal_id = ids.len();
        ids.push(chunk_id);

        let embedding_vec = embedding.to_vec();
        let hnsw = self.hnsw.lock().unwrap();
        hnsw.insert((&embedding_vec, internal_id));

        Ok(())
    }

    /// Nearest neighbors of `query`, as (chunk id, cosine similarity) pairs
    /// sorted most-similar first
    pub fn search(
        &self,
        query: &[f32],
        k: usize,
        ef_search: usize,
    ) -> Result<Vec<(ChunkId, f32)>, VectorIndexError> {
        if query.len() != self.dimension {
            return Err(VectorIndexError::DimensionMismatch {
                expected: self.dimension,
                actual: query.len(),
            });
        }

        let hnsw = self.hnsw.lock().unwrap();
        let ids = self.ids.lock().unwrap();

        let neighbours = hnsw.search(query, k, ef_search);

        // HNSW reports cosine distance; callers want similarity
        let mut results: Vec<(ChunkId, f32)> = neighbours
            .into_iter()
            .filter_map(|n| ids.get(n.d_id).map(|&id| (id, 1.0 - n.distance)))
            .collect();
        results.sort_by(|a, b| b.1.partial_cmp(&a.1).unwrap_or(std::cmp::Ordering::Equal));

        Ok(results)
    }

    /// Number of vectors in the index
    pub fn len(&self) -> usize {
        self.ids.lock().unwrap().len()
    }

    /// True when no vectors have been inserted
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
