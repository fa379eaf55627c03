//! Document chunking with separator-aware splitting and overlap
//!
//! Splitting tries separators from coarsest to finest and uses the coarsest
//! level at which every piece fits the size budget, so chunks break at
//! paragraph boundaries when they can and mid-sentence only as a last
//! resort. Each chunk after the first starts with the trailing overlap of
//! its predecessor, so a fact spanning a boundary is visible to both sides.

use quarry_domain::{Chunk, ChunkMetadata, Document};
use tracing::{debug, warn};

/// Separator ladder, coarsest first: paragraph, line, sentence, token
const SEPARATORS: [&str; 4] = ["\n\n", "\n", ". ", " "];

/// Splits documents into bounded, overlapping chunks
///
/// Sizes are in characters. The invariants callers rely on:
/// - every chunk is at most `max_size` characters
/// - consecutive chunks share exactly `overlap` characters (except where a
///   chunk is itself shorter than the overlap)
/// - concatenating chunks with overlaps removed reconstructs the document
pub struct TextChunker {
    max_size: usize,
    overlap: usize,
}

impl TextChunker {
    /// Create a chunker; `overlap` must be smaller than `max_size`
    /// (enforced by [`crate::AnalystConfig::validate`])
    pub fn new(max_size: usize, overlap: usize) -> Self {
        Self { max_size, overlap }
    }

    /// Split a document into ordered chunks carrying `metadata`
    ///
    /// Empty or whitespace-only documents produce zero chunks and are
    /// reported with a warning, not an error.
    pub fn split(&self, document: &Document, metadata: &ChunkMetadata) -> Vec<Chunk> {
        if document.text.trim().is_empty() {
            warn!("Skipping empty document '{}'", document.source);
            return Vec::new();
        }

        let segments = self.base_segments(&document.text);

        let mut texts: Vec<String> = Vec::with_capacity(segments.len());
        for (i, segment) in segments.iter().enumerate() {
            if i == 0 {
                texts.push(segment.clone());
            } else {
                let mut text = tail_chars(&texts[i - 1], self.overlap);
                text.push_str(segment);
                texts.push(text);
            }
        }

        debug!(
            "Split '{}' into {} chunks (max {}, overlap {})",
            document.source,
            texts.len(),
            self.max_size,
            self.overlap
        );

        texts
            .into_iter()
            .enumerate()
            .map(|(seq, text)| Chunk::new(seq, text, metadata.clone()))
            .collect()
    }

    /// Split into base segments: the document text with no overlap applied
    ///
    /// The first segment may use the full `max_size`; later segments leave
    /// room for the overlap prefix they will receive.
    fn base_segments(&self, text: &str) -> Vec<String> {
        let rest_budget = self.max_size.saturating_sub(self.overlap).max(1);
        let pieces = atomic_pieces(text, rest_budget);

        let mut segments: Vec<String> = Vec::new();
        let mut current = String::new();
        let mut current_len = 0usize;

        for piece in pieces {
            let piece_len = char_len(&piece);
            let budget = if segments.is_empty() {
                self.max_size
            } else {
                rest_budget
            };

            if !current.is_empty() && current_len + piece_len > budget {
                segments.push(std::mem::take(&mut current));
                current_len = 0;
            }
            current.push_str(&piece);
            current_len += piece_len;
        }
        if !current.is_empty() {
            segments.push(current);
        }

        segments
    }
}

/// Pieces of `text` no longer than `budget`, split at the coarsest
/// separator level where that holds
///
/// Separators stay attached to the piece they terminate, so concatenating
/// the pieces reproduces the input exactly. A single token longer than the
/// budget is hard-split at character boundaries.
fn atomic_pieces(text: &str, budget: usize) -> Vec<String> {
    for separator in SEPARATORS {
        let pieces: Vec<&str> = text.split_inclusive(separator).collect();
        if pieces.iter().all(|p| char_len(p) <= budget) {
            return pieces.into_iter().map(str::to_string).collect();
        }
    }

    text.split_inclusive(' ')
        .flat_map(|piece| {
            if char_len(piece) <= budget {
                vec![piece.to_string()]
            } else {
                char_windows(piece, budget)
            }
        })
        .collect()
}

fn char_len(s: &str) -> usize {
    s.chars().count()
}

/// Last `n` characters of `s` (all of it when shorter)
fn tail_chars(s: &str, n: usize) -> String {
    let len = char_len(s);
    s.chars().skip(len.saturating_sub(n)).collect()
}

/// Fixed-width character windows covering `s`
fn char_windows(s: &str, width: usize) -> Vec<String> {
    let chars: Vec<char> = s.chars().collect();
    chars
        .chunks(width.max(1))
        .map(|window| window.iter().collect())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn doc(text: &str) -> Document {
        Document::new(text, "test.txt")
    }

    fn meta() -> ChunkMetadata {
        ChunkMetadata::for_source("test.txt")
    }

    /// Strip overlap prefixes and concatenate
    fn reconstruct(chunks: &[Chunk], overlap: usize) -> String {
        let mut out = String::new();
        for (i, chunk) in chunks.iter().enumerate() {
            if i == 0 {
                out.push_str(&chunk.text);
            } else {
                let prev_len = char_len(&chunks[i - 1].text);
                out.extend(chunk.text.chars().skip(overlap.min(prev_len)));
            }
        }
        out
    }

    #[test]
    fn test_small_document_is_one_chunk() {
        let chunker = TextChunker::new(1000, 100);
        let chunks = chunker.split(&doc("Short text."), &meta());
        assert_eq!(chunks.len(), 1);
        assert_eq!(chunks[0].text, "Short text.");
        assert_eq!(chunks[0].seq, 0);
    }

    #[test]
    fn test_empty_document_yields_no_chunks() {
        let chunker = TextChunker::new(1000, 100);
        assert!(chunker.split(&doc(""), &meta()).is_empty());
    }

    #[test]
    fn test_whitespace_document_yields_no_chunks() {
        let chunker = TextChunker::new(1000, 100);
        assert!(chunker.split(&doc("  \n\t \n "), &meta()).is_empty());
    }

    #[test]
    fn test_every_chunk_within_max_size() {
        let text = "The quick brown fox jumps over the lazy dog. ".repeat(40);
        let chunker = TextChunker::new(100, 20);
        let chunks = chunker.split(&doc(&text), &meta());

        assert!(chunks.len() > 1);
        for chunk in &chunks {
            assert!(char_len(&chunk.text) <= 100, "chunk too long: {}", chunk.text.len());
        }
    }

    #[test]
    fn test_consecutive_chunks_overlap_exactly() {
        let text = "Sentence one is here. Sentence two is here. Sentence three is here. \
                    Sentence four is here. Sentence five is here."
            .to_string();
        let overlap = 10;
        let chunker = TextChunker::new(40, overlap);
        let chunks = chunker.split(&doc(&text), &meta());

        assert!(chunks.len() > 1);
        for pair in chunks.windows(2) {
            let prev: Vec<char> = pair[0].text.chars().collect();
            let next: Vec<char> = pair[1].text.chars().collect();
            if prev.len() >= overlap {
                assert_eq!(prev[prev.len() - overlap..], next[..overlap]);
            }
        }
    }

    #[test]
    fn test_overlap_removal_reconstructs_document() {
        let text = "First paragraph of the filing.\n\nSecond paragraph with numbers.\n\n\
                    Third paragraph, final remarks. And a trailing sentence."
            .to_string();
        let overlap = 12;
        let chunker = TextChunker::new(48, overlap);
        let chunks = chunker.split(&doc(&text), &meta());

        assert!(chunks.len() > 1);
        assert_eq!(reconstruct(&chunks, overlap), text);
    }

    #[test]
    fn test_prefers_paragraph_boundaries() {
        let text = "Alpha paragraph.\n\nBeta paragraph.\n\nGamma paragraph.";
        let chunker = TextChunker::new(25, 0);
        let chunks = chunker.split(&doc(text), &meta());

        assert!(chunks.len() > 1);
        // Non-final chunks end at a paragraph break, not mid-sentence
        for chunk in &chunks[..chunks.len() - 1] {
            assert!(chunk.text.ends_with("\n\n"), "broke mid-paragraph: {:?}", chunk.text);
        }
    }

    #[test]
    fn test_hard_splits_giant_token() {
        let text = "x".repeat(100);
        let chunker = TextChunker::new(30, 5);
        let chunks = chunker.split(&doc(&text), &meta());

        assert!(chunks.len() > 1);
        for chunk in &chunks {
            assert!(char_len(&chunk.text) <= 30);
        }
        assert_eq!(reconstruct(&chunks, 5), text);
    }

    #[test]
    fn test_seq_is_sequential_and_metadata_inherited() {
        let text = "One sentence. Two sentence. Three sentence. Four sentence.";
        let chunker = TextChunker::new(25, 5);
        let chunks = chunker.split(&doc(text), &meta());

        for (i, chunk) in chunks.iter().enumerate() {
            assert_eq!(chunk.seq, i);
            assert_eq!(chunk.metadata.source, "test.txt");
        }
    }

    #[test]
    fn test_multibyte_text_splits_on_char_boundaries() {
        let text = "Ümläüte ünd mörë tëxt hërë. ".repeat(10);
        let chunker = TextChunker::new(40, 8);
        let chunks = chunker.split(&doc(&text), &meta());

        for chunk in &chunks {
            assert!(char_len(&chunk.text) <= 40);
        }
        assert_eq!(reconstruct(&chunks, 8), text);
    }

    mod proptest_chunker {
        use super::*;
        use proptest::prelude::*;

        proptest! {
            #[test]
            fn split_never_panics(
                text in "\\PC{0,2000}",
                max_size in 8usize..400,
                overlap in 0usize..200,
            ) {
                prop_assume!(overlap < max_size);
                let chunker = TextChunker::new(max_size, overlap);
                let _ = chunker.split(&doc(&text), &meta());
            }

            #[test]
            fn chunks_respect_max_size(
                text in "[a-zA-Z .\n]{1,2000}",
                max_size in 8usize..200,
                overlap in 0usize..64,
            ) {
                prop_assume!(overlap < max_size);
                let chunker = TextChunker::new(max_size, overlap);
                for chunk in chunker.split(&doc(&text), &meta()) {
                    prop_assert!(char_len(&chunk.text) <= max_size);
                }
            }

            #[test]
            fn overlap_removal_reconstructs(
                text in "[a-z .\n]{1,1500}",
                max_size in 10usize..150,
                overlap in 0usize..40,
            ) {
                prop_assume!(overlap < max_size);
                prop_assume!(!text.trim().is_empty());
                let chunker = TextChunker::new(max_size, overlap);
                let chunks = chunker.split(&doc(&text), &meta());
                prop_assert_eq!(reconstruct(&chunks, overlap), text);
            }

            #[test]
            fn no_empty_chunks(
                text in "[a-z .\n]{1,800}",
                max_size in 4usize..100,
            ) {
                prop_assume!(!text.trim().is_empty());
                let chunker = TextChunker::new(max_size, 0);
                for chunk in chunker.split(&doc(&text), &meta()) {
                    prop_assert!(!chunk.text.is_empty());
                }
            }
        }
    }
}
