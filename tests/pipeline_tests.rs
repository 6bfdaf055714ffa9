//! End-to-end pipeline tests with stubbed collaborators.
//!
//! Every test here runs the full chunking pipeline against deterministic
//! embedding stubs, so chunk boundaries are reproducible and assertable.

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use seams::{
    CancelToken, ChunkingOptions, EmbeddingGenerator, Error, SemanticChunker, TextChunk,
    WordTokenCounter,
};

// =============================================================================
// Embedding Stubs
// =============================================================================

/// Returns the same vector for every text: zero distance everywhere.
struct UniformEmbedder;

impl EmbeddingGenerator for UniformEmbedder {
    fn generate_batch(&self, texts: &[String]) -> seams::Result<Vec<Vec<f64>>> {
        Ok(texts.iter().map(|_| vec![1.0, 0.0, 0.0]).collect())
    }
}

/// Returns pre-scripted vectors in request order.
struct ScriptedEmbedder(Vec<Vec<f64>>);

impl EmbeddingGenerator for ScriptedEmbedder {
    fn generate_batch(&self, texts: &[String]) -> seams::Result<Vec<Vec<f64>>> {
        Ok(self.0.iter().take(texts.len()).cloned().collect())
    }
}

/// Derives a vector from the text itself: deterministic but content-varying.
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

/// Counts batch calls and embedded texts, delegating to `UniformEmbedder`.
struct CountingEmbedder {
    batches: AtomicUsize,
    texts: AtomicUsize,
}

impl CountingEmbedder {
    fn new() -> Self {
        Self {
            batches: AtomicUsize::new(0),
            texts: AtomicUsize::new(0),
        }
    }
}

impl EmbeddingGenerator for CountingEmbedder {
    fn generate_batch(&self, texts: &[String]) -> seams::Result<Vec<Vec<f64>>> {
        self.batches.fetch_add(1, Ordering::SeqCst);
        self.texts.fetch_add(texts.len(), Ordering::SeqCst);
        UniformEmbedder.generate_batch(texts)
    }
}

/// Violates the batch contract by returning one vector too few.
struct ShortEmbedder;

impl EmbeddingGenerator for ShortEmbedder {
    fn generate_batch(&self, texts: &[String]) -> seams::Result<Vec<Vec<f64>>> {
        Ok(texts.iter().skip(1).map(|_| vec![1.0, 0.0]).collect())
    }
}

/// Always fails.
struct FailingEmbedder;

impl EmbeddingGenerator for FailingEmbedder {
    fn generate_batch(&self, _texts: &[String]) -> seams::Result<Vec<Vec<f64>>> {
        Err(Error::Embedding("model unavailable".to_string()))
    }
}

// =============================================================================
// Helpers
// =============================================================================

fn chunker(embedder: Arc<dyn EmbeddingGenerator>) -> SemanticChunker {
    SemanticChunker::new(Arc::new(WordTokenCounter), embedder)
}

fn collect(chunker: &SemanticChunker, text: &str, options: &ChunkingOptions) -> Vec<TextChunk> {
    chunker
        .chunk(text, options)
        .unwrap()
        .collect::<seams::Result<Vec<_>>>()
        .unwrap()
}

// =============================================================================
// Scenarios
// =============================================================================

#[test]
fn scenario_uniform_embeddings_fall_back_to_whole_document() {
    // Three trivial sentences with identical embeddings. Every gap ties the
    // (zero) threshold, so the primary pass cuts single-sentence candidates;
    // all of them miss the default 10-token floor, and the whole-document
    // fallback emits one chunk covering all three sentences.
    let chunker = chunker(Arc::new(UniformEmbedder));
    let options = ChunkingOptions::default().with_breakpoint_percentile(0.1).unwrap();

    let chunks = collect(&chunker, "A. B. C.", &options);

    assert_eq!(chunks.len(), 1);
    assert!(chunks[0].metadata.is_fallback);
    assert_eq!(chunks[0].metadata.segment_count, 3);
    assert_eq!(chunks[0].text, "A. B. C.");
}

#[test]
fn scenario_distinct_maximal_distances_split_every_sentence() {
    // With buffer_size 1 the three sentences produce three context groups;
    // near-orthogonal scripted vectors make both gap distances maximal and
    // distinct. Percentile 0.0 thresholds at the smaller distance, and the
    // inclusive comparison flags both gaps, one chunk per sentence.
    let chunker = chunker(Arc::new(ScriptedEmbedder(vec![
        vec![1.0, 0.0, 0.0],
        vec![0.0, 1.0, 0.0],
        vec![0.0, 0.01, 1.0],
    ])));
    let options = ChunkingOptions::default()
        .with_token_window(1, 512)
        .unwrap()
        .with_breakpoint_percentile(0.0)
        .unwrap();

    let chunks = collect(&chunker, "A. B. C.", &options);

    assert_eq!(chunks.len(), 3);
    assert!(chunks.iter().all(|c| !c.metadata.is_fallback));
    assert_eq!(chunks[0].text, "A.");
    assert_eq!(chunks[1].text, "B.");
    assert_eq!(chunks[2].text, "C.");
}

#[test]
fn scenario_oversized_sentence_is_packed_into_budgeted_segments() {
    // A single 500-word "sentence" with a 50-token budget must be packed
    // into exactly ceil(500/50) validated segments before grouping.
    let chunker = chunker(Arc::new(UniformEmbedder));
    let options = ChunkingOptions::default()
        .with_token_window(1, 50)
        .unwrap()
        .with_buffer_size(0);

    let text = vec!["word"; 500].join(" ");
    let stream = chunker.chunk(&text, &options).unwrap();

    assert_eq!(stream.segment_count(), 10);

    let chunks: Vec<TextChunk> = stream.collect::<seams::Result<_>>().unwrap();
    let counter = WordTokenCounter;
    use seams::TokenCounter;
    for chunk in &chunks {
        assert!(counter.count(&chunk.text) <= 50);
    }
}

// =============================================================================
// Determinism and coverage
// =============================================================================

#[test]
fn identical_inputs_yield_identical_boundaries() {
    let options = ChunkingOptions::default().with_token_window(2, 64).unwrap();
    let text = "Rust has a strong type system. Ownership prevents data races. \
                My cat sleeps all day. She dreams of birds. The compiler is strict.";

    let first = collect(&chunker(Arc::new(HashingEmbedder)), text, &options);
    let second = collect(&chunker(Arc::new(HashingEmbedder)), text, &options);

    assert_eq!(first.len(), second.len());
    for (a, b) in first.iter().zip(&second) {
        assert_eq!(a.text, b.text);
        assert_eq!(a.start, b.start);
        assert_eq!(a.end, b.end);
        assert_eq!(a.metadata.token_count, b.metadata.token_count);
    }
}

#[test]
fn chunk_spans_are_ordered_and_in_bounds() {
    let options = ChunkingOptions::default().with_token_window(1, 64).unwrap();
    let text = "One thing happened. Then another thing. Then something else entirely. \
                Finally it was over. Nobody noticed at all.";

    let chunks = collect(&chunker(Arc::new(HashingEmbedder)), text, &options);

    assert!(!chunks.is_empty());
    for chunk in &chunks {
        assert!(chunk.start < chunk.end);
        assert!(chunk.end <= text.len());
    }
    for window in chunks.windows(2) {
        assert!(window[0].end <= window[1].start, "spans must not overlap");
    }
}

#[test]
fn non_fallback_chunks_reconstruct_the_segmented_text() {
    let options = ChunkingOptions::default().with_token_window(1, 64).unwrap();
    let text = "Alpha beta gamma. Delta epsilon zeta. Eta theta iota. Kappa lambda mu.";

    let chunks = collect(&chunker(Arc::new(HashingEmbedder)), text, &options);

    assert!(chunks.iter().all(|c| !c.metadata.is_fallback));
    // Chunks join segments with single spaces; rejoining the chunks with
    // single spaces must therefore reproduce the segmented text exactly.
    let rejoined = chunks.iter().map(|c| c.text.as_str()).collect::<Vec<_>>().join(" ");
    assert_eq!(rejoined, text);
}

// =============================================================================
// Degenerate inputs
// =============================================================================

#[test]
fn empty_and_whitespace_inputs_yield_empty_streams() {
    let chunker = chunker(Arc::new(UniformEmbedder));
    let options = ChunkingOptions::default();

    assert!(collect(&chunker, "", &options).is_empty());
    assert!(collect(&chunker, "  \n\t  ", &options).is_empty());
}

#[test]
fn fallback_guarantee_for_single_short_input() {
    // One segment under budget: the stream must be non-empty, whatever the
    // floor does to the primary pass.
    let chunker = chunker(Arc::new(UniformEmbedder));
    let options = ChunkingOptions::default();

    let chunks = collect(&chunker, "Tiny.", &options);
    assert_eq!(chunks.len(), 1);
    assert!(chunks[0].metadata.is_fallback);
}

#[test]
fn invalid_options_are_rejected_before_processing() {
    let chunker = chunker(Arc::new(UniformEmbedder));
    let options = ChunkingOptions {
        breakpoint_percentile: 2.0,
        ..ChunkingOptions::default()
    };

    assert!(matches!(
        chunker.chunk("Some text.", &options),
        Err(Error::InvalidOptions(_))
    ));
}

// =============================================================================
// Collaborator failures
// =============================================================================

#[test]
fn embedding_failure_propagates() {
    let chunker = chunker(Arc::new(FailingEmbedder));
    let result = chunker.chunk("One sentence. Two sentences.", &ChunkingOptions::default());
    assert!(matches!(result, Err(Error::Embedding(_))));
}

#[test]
fn batch_count_mismatch_fails_fast() {
    let chunker = chunker(Arc::new(ShortEmbedder));
    let result = chunker.chunk("One sentence. Two sentences.", &ChunkingOptions::default());

    match result {
        Err(Error::EmbeddingCountMismatch { requested, returned }) => {
            assert_eq!(requested, returned + 1);
        }
        other => panic!("expected count mismatch, got {other:?}"),
    }
}

// =============================================================================
// Cancellation
// =============================================================================

#[test]
fn pre_raised_token_cancels_before_processing() {
    let chunker = chunker(Arc::new(UniformEmbedder));
    let cancel = CancelToken::new();
    cancel.cancel();

    let result = chunker.chunk_with(
        "Some text here.",
        &ChunkingOptions::default(),
        HashMap::new(),
        cancel,
    );
    assert!(matches!(result, Err(Error::Cancelled)));
}

#[test]
fn mid_stream_cancellation_stops_emission() {
    let chunker = chunker(Arc::new(HashingEmbedder));
    let options = ChunkingOptions::default().with_token_window(1, 64).unwrap();
    let cancel = CancelToken::new();

    let mut stream = chunker
        .chunk_with(
            "First sentence here. Second sentence there. Third sentence anywhere.",
            &options,
            HashMap::new(),
            cancel.clone(),
        )
        .unwrap();

    // First chunk comes out fine; cancelling then poisons the stream.
    let first = stream.next().unwrap();
    assert!(first.is_ok());

    cancel.cancel();
    match stream.next() {
        Some(Err(Error::Cancelled)) => {}
        other => panic!("expected cancellation error, got {other:?}"),
    }
    assert!(stream.next().is_none(), "stream must stay finished");
}

// =============================================================================
// Caching
// =============================================================================

#[test]
fn repeat_calls_hit_the_cache() {
    let counting = Arc::new(CountingEmbedder::new());
    let chunker = chunker(Arc::clone(&counting) as Arc<dyn EmbeddingGenerator>);
    let options = ChunkingOptions::default().with_token_window(1, 64).unwrap();
    let text = "Cache me once. Cache me twice. Cache me thrice.";

    let first = collect(&chunker, text, &options);
    let texts_after_first = counting.texts.load(Ordering::SeqCst);
    assert_eq!(counting.batches.load(Ordering::SeqCst), 1);
    assert!(texts_after_first > 0);

    // Second run over identical text: every group is already cached, so no
    // further batch call happens at all.
    let second = collect(&chunker, text, &options);
    assert_eq!(counting.batches.load(Ordering::SeqCst), 1);
    assert_eq!(counting.texts.load(Ordering::SeqCst), texts_after_first);
    assert_eq!(first.len(), second.len());
}

#[test]
fn disabled_caching_re_embeds_every_call() {
    let counting = Arc::new(CountingEmbedder::new());
    let chunker = chunker(Arc::clone(&counting) as Arc<dyn EmbeddingGenerator>);
    let options = ChunkingOptions::default()
        .with_token_window(1, 64)
        .unwrap()
        .with_caching(false);
    let text = "No cache today. None tomorrow either.";

    let _ = collect(&chunker, text, &options);
    let _ = collect(&chunker, text, &options);

    assert_eq!(counting.batches.load(Ordering::SeqCst), 2);
    assert!(chunker.cache().is_empty());
}

// =============================================================================
// Metadata
// =============================================================================

#[test]
fn caller_metadata_lands_on_every_chunk() {
    let chunker = chunker(Arc::new(HashingEmbedder));
    let options = ChunkingOptions::default().with_token_window(1, 64).unwrap();
    let metadata: HashMap<String, String> = [
        ("source".to_string(), "notes/today.md".to_string()),
        ("revision".to_string(), "42".to_string()),
    ]
    .into();

    let chunks: Vec<TextChunk> = chunker
        .chunk_with(
            "First sentence here. Second sentence there.",
            &options,
            metadata,
            CancelToken::new(),
        )
        .unwrap()
        .collect::<seams::Result<_>>()
        .unwrap();

    assert!(!chunks.is_empty());
    for chunk in &chunks {
        assert_eq!(chunk.metadata.custom["source"], "notes/today.md");
        assert_eq!(chunk.metadata.custom["revision"], "42");
    }
}
