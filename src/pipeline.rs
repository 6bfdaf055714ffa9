//! The end-to-end chunking pipeline.
//!
//! ## One Pass, One Suspension Point
//!
//! ```text
//! text ──> segment ──> validate ──> group ──> embed (batched) ──> distances
//!                                               │                    │
//!                                               └── cache ──┐        ▼
//!                                                           │   percentile
//!                                                           │        │
//!                                                           ▼        ▼
//!                                              ChunkStream <── breakpoints
//! ```
//!
//! Everything up to breakpoint detection runs eagerly inside
//! [`SemanticChunker::chunk`]: the percentile threshold is a global
//! statistic, so no boundary decision is final until every distance is
//! known. The single blocking operation is the one batched call to the
//! embedding collaborator covering all cache misses. Chunk emission itself
//! is lazy: the returned [`ChunkStream`] assembles and yields chunks one at
//! a time, including the fallback tiers.
//!
//! ## Cancellation
//!
//! A [`CancelToken`] is checked between segment-processing iterations,
//! before and after the embedding call, and between stream emissions. Once
//! raised, the stream yields [`Error::Cancelled`] and stops. Chunks already
//! yielded stay valid, but the run must be treated as failed — early
//! termination is never a short result.

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use crate::assemble::ChunkAssembler;
use crate::distance::{detect_breakpoints, distance_profile, percentile_threshold};
use crate::group::ContextGrouper;
use crate::validate::SegmentSizeValidator;
use crate::{
    ChunkingOptions, EmbeddingCache, EmbeddingGenerator, Error, Result, Segment, SegmentGroup,
    SentenceSegmenter, TextChunk, TextSegmenter, TokenCounter,
};

/// Cooperative cancellation signal.
///
/// Clone the token, hand one copy to [`SemanticChunker::chunk_with`], and
/// call [`cancel`](Self::cancel) from anywhere (it is just an atomic flag).
#[derive(Debug, Clone, Default)]
pub struct CancelToken {
    flag: Arc<AtomicBool>,
}

impl CancelToken {
    /// Create a token in the not-cancelled state.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Raise the cancellation signal.
    pub fn cancel(&self) {
        self.flag.store(true, Ordering::Relaxed);
    }

    /// Whether the signal has been raised.
    #[must_use]
    pub fn is_cancelled(&self) -> bool {
        self.flag.load(Ordering::Relaxed)
    }

    fn ensure_live(&self) -> Result<()> {
        if self.is_cancelled() {
            Err(Error::Cancelled)
        } else {
            Ok(())
        }
    }
}

/// Semantic boundary-detection chunker.
///
/// Collaborators are injected at construction and shared across calls; the
/// embedding cache lives inside the instance (never global).
///
/// ## Example
///
/// ```rust
/// use std::sync::Arc;
/// use seams::{ChunkingOptions, EmbeddingGenerator, SemanticChunker, WordTokenCounter};
///
/// struct Uniform;
/// impl EmbeddingGenerator for Uniform {
///     fn generate_batch(&self, texts: &[String]) -> seams::Result<Vec<Vec<f64>>> {
///         Ok(texts.iter().map(|_| vec![1.0, 0.0]).collect())
///     }
/// }
///
/// let chunker = SemanticChunker::new(Arc::new(WordTokenCounter), Arc::new(Uniform));
/// let options = ChunkingOptions::default().with_token_window(1, 64)?;
///
/// let chunks: Vec<_> = chunker
///     .chunk("First idea here. Second idea there.", &options)?
///     .collect::<seams::Result<_>>()?;
/// assert!(!chunks.is_empty());
/// # Ok::<(), seams::Error>(())
/// ```
pub struct SemanticChunker {
    segmenter: Arc<dyn TextSegmenter>,
    counter: Arc<dyn TokenCounter>,
    embedder: Arc<dyn EmbeddingGenerator>,
    cache: EmbeddingCache,
}

impl SemanticChunker {
    /// Create a chunker with the default [`SentenceSegmenter`].
    #[must_use]
    pub fn new(counter: Arc<dyn TokenCounter>, embedder: Arc<dyn EmbeddingGenerator>) -> Self {
        Self {
            segmenter: Arc::new(SentenceSegmenter::new()),
            counter,
            embedder,
            cache: EmbeddingCache::new(),
        }
    }

    /// Replace the segmentation strategy.
    #[must_use]
    pub fn with_segmenter(mut self, segmenter: Arc<dyn TextSegmenter>) -> Self {
        self.segmenter = segmenter;
        self
    }

    /// The instance-scoped embedding cache.
    #[must_use]
    pub fn cache(&self) -> &EmbeddingCache {
        &self.cache
    }

    /// Chunk `text` with no caller metadata and no cancellation.
    ///
    /// # Errors
    ///
    /// Returns an error for invalid options or an embedding failure. Empty
    /// or whitespace-only input is an empty stream, not an error.
    pub fn chunk(&self, text: &str, options: &ChunkingOptions) -> Result<ChunkStream> {
        self.chunk_with(text, options, HashMap::new(), CancelToken::new())
    }

    /// Chunk `text`, attaching `metadata` to every emitted chunk and
    /// honoring `cancel` cooperatively.
    ///
    /// # Errors
    ///
    /// Returns an error for invalid options, cancellation observed before
    /// the stream is constructed, an embedding collaborator failure, or a
    /// batch count mismatch.
    pub fn chunk_with(
        &self,
        text: &str,
        options: &ChunkingOptions,
        metadata: HashMap<String, String>,
        cancel: CancelToken,
    ) -> Result<ChunkStream> {
        options.validate()?;
        cancel.ensure_live()?;

        // Stage 1+2: segment, then enforce the token budget per segment.
        let validator = SegmentSizeValidator::new(self.counter.as_ref(), options.max_tokens_per_chunk);
        let mut segments = Vec::new();
        for segment in self.segmenter.segment(text) {
            cancel.ensure_live()?;
            segments.extend(validator.validate(vec![segment]));
        }

        // Stage 3: context windows.
        let grouper = ContextGrouper::new(self.counter.as_ref(), options.max_tokens_per_chunk);
        let mut groups = grouper.group(&segments, options.buffer_size);

        // Stage 4: one batched embedding call for all cache misses.
        self.attach_embeddings(&mut groups, options, &cancel)?;

        // Stage 5: global distance profile -> percentile -> breakpoints.
        let distances = distance_profile(&groups);
        let threshold = percentile_threshold(&distances, options.breakpoint_percentile);
        let breakpoints = detect_breakpoints(&distances, threshold);

        // Stage 6 is lazy: the stream assembles chunks on demand.
        let boundaries = ChunkAssembler::boundaries(segments.len(), &breakpoints);
        let assembler = ChunkAssembler::new(Arc::clone(&self.counter), options, metadata);
        Ok(ChunkStream::new(assembler, segments, boundaries, cancel))
    }

    /// Resolve group embeddings from the cache, batching the misses into a
    /// single collaborator call.
    fn attach_embeddings(
        &self,
        groups: &mut [SegmentGroup],
        options: &ChunkingOptions,
        cancel: &CancelToken,
    ) -> Result<()> {
        let mut missed_indices = Vec::new();
        let mut missed_texts = Vec::new();

        for (i, group) in groups.iter_mut().enumerate() {
            if group.is_dropped() {
                continue;
            }
            if options.enable_caching {
                if let Some(vector) = self.cache.get(&group.combined_text) {
                    group.embedding = Some(vector);
                    continue;
                }
            }
            missed_indices.push(i);
            missed_texts.push(group.combined_text.clone());
        }

        if missed_texts.is_empty() {
            return Ok(());
        }

        cancel.ensure_live()?;
        let vectors = self.embedder.generate_batch(&missed_texts)?;
        cancel.ensure_live()?;

        if vectors.len() != missed_texts.len() {
            return Err(Error::EmbeddingCountMismatch {
                requested: missed_texts.len(),
                returned: vectors.len(),
            });
        }

        for (&i, vector) in missed_indices.iter().zip(vectors) {
            if options.enable_caching {
                self.cache
                    .put(&groups[i].combined_text, vector.clone(), options.max_cache_size);
            }
            groups[i].embedding = Some(vector);
        }

        Ok(())
    }
}

impl std::fmt::Debug for SemanticChunker {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SemanticChunker")
            .field("cached_embeddings", &self.cache.len())
            .finish_non_exhaustive()
    }
}

/// Lazy, forward-only stream of assembled chunks.
///
/// Yields `Result<TextChunk>`: chunks while assembly proceeds, a single
/// `Err(Error::Cancelled)` if the token is raised mid-stream. The fallback
/// tiers run transparently when the primary pass produces nothing.
pub struct ChunkStream {
    assembler: ChunkAssembler,
    segments: Vec<Segment>,
    boundaries: Vec<usize>,
    cancel: CancelToken,
    cursor: usize,
    chunk_start: usize,
    emitted_any: bool,
    fallback: Option<std::vec::IntoIter<TextChunk>>,
    finished: bool,
}

impl ChunkStream {
    fn new(
        assembler: ChunkAssembler,
        segments: Vec<Segment>,
        boundaries: Vec<usize>,
        cancel: CancelToken,
    ) -> Self {
        Self {
            assembler,
            segments,
            boundaries,
            cancel,
            cursor: 0,
            chunk_start: 0,
            emitted_any: false,
            fallback: None,
            finished: false,
        }
    }

    /// How many validated segments feed this stream.
    #[must_use]
    pub fn segment_count(&self) -> usize {
        self.segments.len()
    }
}

impl Iterator for ChunkStream {
    type Item = Result<TextChunk>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            if self.finished {
                return None;
            }
            if self.cancel.is_cancelled() {
                self.finished = true;
                return Some(Err(Error::Cancelled));
            }

            if let Some(fallback) = &mut self.fallback {
                return match fallback.next() {
                    Some(chunk) => Some(Ok(chunk)),
                    None => {
                        self.finished = true;
                        None
                    }
                };
            }

            // Primary pass: one boundary per iteration; dropped candidates
            // advance the start without emitting.
            if self.cursor < self.boundaries.len() {
                let boundary = self.boundaries[self.cursor];
                self.cursor += 1;
                let start = self.chunk_start;
                self.chunk_start = boundary + 1;

                if let Some(chunk) = self.assembler.candidate(&self.segments, start, boundary) {
                    self.emitted_any = true;
                    return Some(Ok(chunk));
                }
                continue;
            }

            // Primary pass exhausted: engage fallback tiers at most once.
            if !self.emitted_any && !self.segments.is_empty() {
                let chunks = self.assembler.whole_document(&self.segments).map_or_else(
                    || {
                        self.segments
                            .iter()
                            .filter_map(|s| self.assembler.single_segment(s))
                            .collect::<Vec<_>>()
                    },
                    |whole| vec![whole],
                );
                self.emitted_any = true;
                self.fallback = Some(chunks.into_iter());
                continue;
            }

            self.finished = true;
            return None;
        }
    }
}

impl std::fmt::Debug for ChunkStream {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ChunkStream")
            .field("segments", &self.segments.len())
            .field("boundaries", &self.boundaries.len())
            .field("finished", &self.finished)
            .finish()
    }
}
