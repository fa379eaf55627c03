//! Quarry Domain Layer
//!
//! This crate contains the core domain model for Quarry: the value objects
//! that flow through the extraction pipeline and the trait interfaces that
//! all other layers depend upon. It carries no infrastructure dependencies.
//!
//! ## Key Concepts
//!
//! - **Document**: raw corpus text with its source identity, immutable
//! - **Chunk**: a bounded, overlapping slice of a document sized for embedding
//! - **FieldSchema**: the ordered list of field names a caller wants extracted
//! - **ExtractionRecord**: a fixed-shape field → value mapping, one per
//!   (entity, analysis call), never missing a key
//!
//! ## Architecture
//!
//! - Pure domain logic only
//! - Infrastructure implementations live in other crates
//! - Trait definitions for the embedding and generation capabilities

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod document;
pub mod schema;
pub mod traits;

// Re-exports for convenience
pub use document::{Chunk, ChunkId, ChunkMetadata, Document, MetadataFilter, ScoredChunk};
pub use schema::{ExtractionRecord, FieldSchema, EXTRACTION_ERROR, NOT_AVAILABLE};
