//! Property-based tests for the chunking pipeline.
//!
//! These verify the invariants every stage must maintain:
//! - Segment spans are ordered, in bounds, and match the source text
//! - Validated segments respect the token budget
//! - Non-fallback chunks respect the `[min, max]` token window
//! - Chunk spans are ordered and in bounds
//! - The percentile threshold stays inside the sample range

use std::sync::Arc;

use proptest::prelude::*;
use seams::{
    ChunkingOptions, EmbeddingGenerator, SegmentSizeValidator, SemanticChunker, SentenceSegmenter,
    TextSegmenter, TokenCounter, WordTokenCounter,
};

// =============================================================================
// Test Generators
// =============================================================================

/// Generate text with sentence-like structure.
fn sentence_like_text() -> impl Strategy<Value = String> {
    prop::collection::vec(prop::string::string_regex("[A-Za-z]{2,12}").unwrap(), 4..40).prop_map(
        |words| {
            let mut result = String::new();
            for (i, word) in words.iter().enumerate() {
                if i % 5 == 0 {
                    // Sentence-initial capital so the splitter sees a boundary.
                    let mut chars = word.chars();
                    if let Some(first) = chars.next() {
                        result.push_str(&first.to_uppercase().to_string());
                        result.push_str(chars.as_str());
                    }
                } else {
                    result.push_str(word);
                }
                if i % 5 == 4 {
                    result.push_str(". ");
                } else {
                    result.push(' ');
                }
            }
            result
        },
    )
}

/// Arbitrary (possibly boundary-free) text.
fn arbitrary_text() -> impl Strategy<Value = String> {
    prop::string::string_regex("[ -~]{0,300}").unwrap()
}

/// A deterministic embedder whose vectors vary with content.
struct HashingEmbedder;

impl EmbeddingGenerator for HashingEmbedder {
    fn generate_batch(&self, texts: &[String]) -> seams::Result<Vec<Vec<f64>>> {
        Ok(texts
            .iter()
            .map(|t| {
                let sum: f64 = t.bytes().map(f64::from).sum();
                vec![sum, t.len() as f64, 1.0]
            })
            .collect())
    }
}

// =============================================================================
// Segmenter Invariants
// =============================================================================

proptest! {
    #[test]
    fn segments_match_source_spans(text in arbitrary_text()) {
        let segments = SentenceSegmenter::new().segment(&text);
        for segment in &segments {
            prop_assert!(segment.end <= text.len());
            prop_assert_eq!(&text[segment.start..segment.end], segment.text.as_str());
        }
    }

    #[test]
    fn segments_are_ordered_and_disjoint(text in sentence_like_text()) {
        let segments = SentenceSegmenter::new().segment(&text);
        for window in segments.windows(2) {
            prop_assert!(window[0].end <= window[1].start);
        }
    }

    #[test]
    fn whitespace_only_never_segments(padding in prop::string::string_regex("[ \t\n]{0,50}").unwrap()) {
        prop_assert!(SentenceSegmenter::new().segment(&padding).is_empty());
    }
}

// =============================================================================
// Validator Invariants
// =============================================================================

proptest! {
    #[test]
    fn validated_segments_respect_budget(
        text in sentence_like_text(),
        max_tokens in 2usize..20
    ) {
        let counter = WordTokenCounter;
        let validator = SegmentSizeValidator::new(&counter, max_tokens);
        let segments = validator.validate(SentenceSegmenter::new().segment(&text));

        // Word-counted budgets have no unsplittable single word, so the
        // bound is unconditional here.
        for segment in &segments {
            prop_assert!(counter.count(&segment.text) <= max_tokens);
        }
    }

    #[test]
    fn validation_preserves_word_sequence(text in sentence_like_text()) {
        let counter = WordTokenCounter;
        let validator = SegmentSizeValidator::new(&counter, 3);
        let original = SentenceSegmenter::new().segment(&text);
        let original_words: Vec<String> = original
            .iter()
            .flat_map(|s| s.text.split_whitespace().map(str::to_string))
            .collect();

        let validated = validator.validate(original);
        let validated_words: Vec<String> = validated
            .iter()
            .flat_map(|s| s.text.split_whitespace().map(str::to_string))
            .collect();

        prop_assert_eq!(original_words, validated_words);
    }
}

// =============================================================================
// Pipeline Invariants
// =============================================================================

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    #[test]
    fn non_fallback_chunks_respect_token_window(
        text in sentence_like_text(),
        min in 1usize..4,
        max in 8usize..40
    ) {
        let chunker = SemanticChunker::new(Arc::new(WordTokenCounter), Arc::new(HashingEmbedder));
        let options = ChunkingOptions::default().with_token_window(min, max).unwrap();

        let chunks: Vec<_> = chunker
            .chunk(&text, &options)
            .unwrap()
            .collect::<seams::Result<_>>()
            .unwrap();

        let counter = WordTokenCounter;
        for chunk in &chunks {
            let count = counter.count(&chunk.text);
            if chunk.metadata.is_fallback {
                prop_assert!(count <= max);
            } else {
                prop_assert!(count >= min && count <= max);
            }
            prop_assert_eq!(chunk.metadata.token_count, count);
        }
    }

    #[test]
    fn chunk_spans_are_ordered(text in sentence_like_text()) {
        let chunker = SemanticChunker::new(Arc::new(WordTokenCounter), Arc::new(HashingEmbedder));
        let options = ChunkingOptions::default().with_token_window(1, 64).unwrap();

        let chunks: Vec<_> = chunker
            .chunk(&text, &options)
            .unwrap()
            .collect::<seams::Result<_>>()
            .unwrap();

        for chunk in &chunks {
            prop_assert!(chunk.start <= chunk.end);
            prop_assert!(chunk.end <= text.len());
        }
        for window in chunks.windows(2) {
            prop_assert!(window[0].start <= window[1].start);
        }
    }

    #[test]
    fn chunking_never_panics_on_arbitrary_text(text in arbitrary_text()) {
        let chunker = SemanticChunker::new(Arc::new(WordTokenCounter), Arc::new(HashingEmbedder));
        let options = ChunkingOptions::default().with_token_window(1, 32).unwrap();

        let _ = chunker
            .chunk(&text, &options)
            .unwrap()
            .collect::<seams::Result<Vec<_>>>()
            .unwrap();
    }
}

// =============================================================================
// Percentile Invariants
// =============================================================================

proptest! {
    #[test]
    fn threshold_stays_inside_sample_range(
        samples in prop::collection::vec(0.0f64..1.0, 1..50),
        percentile in 0.0f64..=1.0
    ) {
        let threshold = seams::percentile_threshold(&samples, percentile);
        let min = samples.iter().copied().fold(f64::INFINITY, f64::min);
        let max = samples.iter().copied().fold(f64::NEG_INFINITY, f64::max);

        prop_assert!(threshold >= min - 1e-12);
        prop_assert!(threshold <= max + 1e-12);
    }

    #[test]
    fn threshold_is_monotone_in_percentile(
        samples in prop::collection::vec(0.0f64..1.0, 2..50),
        p_lo in 0.0f64..0.5,
        p_hi in 0.5f64..=1.0
    ) {
        let lo = seams::percentile_threshold(&samples, p_lo);
        let hi = seams::percentile_threshold(&samples, p_hi);
        prop_assert!(lo <= hi + 1e-12);
    }
}
