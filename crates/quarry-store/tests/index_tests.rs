//! Integration tests for the persistent semantic index
//!
//! These exercise the full directory lifecycle: open, add, retrieve,
//! close, reopen.

use quarry_domain::{Chunk, ChunkMetadata, MetadataFilter};
use quarry_store::{HashEmbedder, SemanticIndex, StoreError};
use tempfile::TempDir;

const DIM: usize = 64;

fn chunk(seq: usize, text: &str, entity: &str) -> Chunk {
    let mut metadata = ChunkMetadata::for_source("report.txt");
    metadata.entity = entity.to_string();
    Chunk::new(seq, text, metadata)
}

fn open_index(dir: &TempDir) -> SemanticIndex<HashEmbedder> {
    SemanticIndex::open(dir.path(), HashEmbedder::new(DIM)).unwrap()
}

#[test]
fn test_add_and_retrieve() {
    let dir = TempDir::new().unwrap();
    let index = open_index(&dir);

    index
        .add(&[
            chunk(0, "Apex Technologies reported revenue of $50 Million.", "Apex"),
            chunk(1, "GreenField Power expanded its solar portfolio.", "GreenField"),
        ])
        .unwrap();

    assert_eq!(index.len(), 2);

    let results = index
        .retrieve("Apex Technologies reported revenue of $50 Million.", 1, None)
        .unwrap();
    assert_eq!(results.len(), 1);
    assert!(results[0].chunk.text.contains("Apex"));
    assert!(results[0].score > 0.99);
}

#[test]
fn test_retrieve_caps_at_k() {
    let dir = TempDir::new().unwrap();
    let index = open_index(&dir);

    let chunks: Vec<Chunk> = (0..5)
        .map(|i| chunk(i, &format!("Paragraph number {} of the filing.", i), "Apex"))
        .collect();
    index.add(&chunks).unwrap();

    let results = index.retrieve("filing", 3, None).unwrap();
    assert!(results.len() <= 3);
}

#[test]
fn test_retrieve_ranked_descending() {
    let dir = TempDir::new().unwrap();
    let index = open_index(&dir);

    let chunks: Vec<Chunk> = (0..6)
        .map(|i| chunk(i, &format!("Section {} discusses operations.", i), "Apex"))
        .collect();
    index.add(&chunks).unwrap();

    let results = index.retrieve("Section 3 discusses operations.", 6, None).unwrap();
    for pair in results.windows(2) {
        assert!(pair[0].score >= pair[1].score);
    }
}

#[test]
fn test_retrieve_deterministic() {
    let dir = TempDir::new().unwrap();
    let index = open_index(&dir);

    let chunks: Vec<Chunk> = (0..4)
        .map(|i| chunk(i, &format!("Fact {} about the company.", i), "Apex"))
        .collect();
    index.add(&chunks).unwrap();

    let first = index.retrieve("company facts", 4, None).unwrap();
    let second = index.retrieve("company facts", 4, None).unwrap();
    assert_eq!(first, second);
}

#[test]
fn test_empty_index_returns_empty() {
    let dir = TempDir::new().unwrap();
    let index = open_index(&dir);

    let results = index.retrieve("anything at all", 5, None).unwrap();
    assert!(results.is_empty());
}

#[test]
fn test_add_empty_slice_is_noop() {
    let dir = TempDir::new().unwrap();
    let index = open_index(&dir);

    assert_eq!(index.add(&[]).unwrap(), 0);
    assert!(index.is_empty());
}

#[test]
fn test_metadata_filter_restricts_results() {
    let dir = TempDir::new().unwrap();
    let index = open_index(&dir);

    index
        .add(&[
            chunk(0, "Apex revenue grew strongly this year.", "Apex"),
            chunk(0, "GreenField revenue was flat this year.", "GreenField"),
        ])
        .unwrap();

    let filter = MetadataFilter::entity("GreenField");
    let results = index.retrieve("revenue", 5, Some(&filter)).unwrap();

    assert_eq!(results.len(), 1);
    assert_eq!(results[0].chunk.metadata.entity, "GreenField");
}

#[test]
fn test_filter_matching_nothing_is_empty() {
    let dir = TempDir::new().unwrap();
    let index = open_index(&dir);

    index.add(&[chunk(0, "Some text about Apex.", "Apex")]).unwrap();

    let filter = MetadataFilter::entity("Nonexistent Corp");
    let results = index.retrieve("text", 5, Some(&filter)).unwrap();
    assert!(results.is_empty());
}

#[test]
fn test_durability_across_reopen() {
    let dir = TempDir::new().unwrap();
    let query = "Apex Technologies revenue";

    let before = {
        let index = open_index(&dir);
        index
            .add(&[
                chunk(0, "Apex Technologies reported revenue of $50 Million.", "Apex"),
                chunk(1, "The CEO is Jane Doe.", "Apex"),
                chunk(0, "GreenField Power commissioned a wind farm.", "GreenField"),
            ])
            .unwrap();
        let results = index.retrieve(query, 2, None).unwrap();
        index.close().unwrap();
        results
    };

    let index = open_index(&dir);
    assert_eq!(index.len(), 3);

    let after = index.retrieve(query, 2, None).unwrap();
    assert_eq!(before, after);
}

#[test]
fn test_dimension_pinned_across_reopen() {
    let dir = TempDir::new().unwrap();

    {
        let index = open_index(&dir);
        index.add(&[chunk(0, "Pinning the dimension.", "Apex")]).unwrap();
        index.close().unwrap();
    }

    let result = SemanticIndex::open(dir.path(), HashEmbedder::new(DIM * 2));
    assert!(matches!(result, Err(StoreError::DimensionMismatch { .. })));
}

#[test]
fn test_close_releases_directory_for_deletion() {
    let dir = TempDir::new().unwrap();

    let index = open_index(&dir);
    index.add(&[chunk(0, "Ephemeral content.", "Apex")]).unwrap();
    index.flush().unwrap();
    index.close().unwrap();

    // With the handle released, the directory can be wiped and recreated
    std::fs::remove_dir_all(dir.path()).unwrap();
    std::fs::create_dir_all(dir.path()).unwrap();

    let fresh = open_index(&dir);
    assert!(fresh.is_empty());
}
