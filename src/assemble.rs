//! Chunk assembly from breakpoints, with multi-tier fallback.
//!
//! ## Primary Pass
//!
//! Breakpoints index gaps between groups, and groups align 1:1 with
//! validated segments, so a breakpoint at `k` ends a chunk after segment
//! `k`. The last segment index is appended as an implicit final boundary:
//!
//! ```text
//! Segments:    [S0] [S1] [S2] [S3] [S4]
//! Breakpoints:          1         3        (+ implicit 4)
//!
//! Candidates:  [S0 S1]  [S2 S3]  [S4]
//! ```
//!
//! Each candidate joins its segments with single spaces and must land in
//! the `[min, max]` token window. A candidate outside the window is
//! dropped — not merged, not retried — and assembly advances past its
//! boundary regardless. Dropping is deliberate: a too-small candidate is
//! noise between two strong boundaries, and a too-large one means the
//! breakpoints disagree with the budget; neither is worth distorting
//! neighboring chunks over.
//!
//! ## Fallback Tiers
//!
//! When the primary pass emits nothing (tiny documents, brutal token
//! windows), two tiers run in order:
//!
//! 1. **Whole document** — if the full joined text fits under `max`, emit
//!    it as one chunk, ignoring `min`.
//! 2. **Segment-by-segment** — otherwise emit each individual segment that
//!    fits under `max`, silently skipping those that do not.
//!
//! Together these guarantee: any input with at least one under-budget
//! segment yields at least one chunk. Only the pathological case (every
//! segment is a single over-budget word) yields none.

use std::collections::HashMap;
use std::sync::Arc;

use crate::{ChunkMetadata, ChunkingOptions, Segment, TextChunk, TokenCounter};

/// Groups validated segments into token-bounded chunks.
pub struct ChunkAssembler {
    counter: Arc<dyn TokenCounter>,
    min_tokens: usize,
    max_tokens: usize,
    custom: HashMap<String, String>,
}

impl ChunkAssembler {
    /// Create an assembler for the given counter and options.
    #[must_use]
    pub fn new(
        counter: Arc<dyn TokenCounter>,
        options: &ChunkingOptions,
        custom: HashMap<String, String>,
    ) -> Self {
        Self {
            counter,
            min_tokens: options.min_tokens_per_chunk,
            max_tokens: options.max_tokens_per_chunk,
            custom,
        }
    }

    /// Chunk-ending segment indices: in-range breakpoints plus the implicit
    /// final boundary `n - 1`.
    #[must_use]
    pub fn boundaries(n_segments: usize, breakpoints: &[usize]) -> Vec<usize> {
        if n_segments == 0 {
            return vec![];
        }
        let last = n_segments - 1;
        let mut boundaries: Vec<usize> =
            breakpoints.iter().copied().filter(|&k| k < last).collect();
        boundaries.push(last);
        boundaries
    }

    /// Build and validate the candidate chunk `segments[start..=boundary]`.
    ///
    /// Returns `None` when the candidate's token count falls outside the
    /// `[min, max]` window.
    #[must_use]
    pub fn candidate(
        &self,
        segments: &[Segment],
        start: usize,
        boundary: usize,
    ) -> Option<TextChunk> {
        let slice = &segments[start..=boundary];
        let text = Self::join(slice);
        let token_count = self.counter.count(&text);

        if token_count < self.min_tokens || token_count > self.max_tokens {
            return None;
        }

        Some(TextChunk::new(
            text,
            slice[0].start,
            slice[slice.len() - 1].end,
            ChunkMetadata::new(token_count, slice.len(), false).with_custom(self.custom.clone()),
        ))
    }

    /// Fallback tier 1: the whole document as one chunk, `min` ignored.
    #[must_use]
    pub fn whole_document(&self, segments: &[Segment]) -> Option<TextChunk> {
        if segments.is_empty() {
            return None;
        }
        let text = Self::join(segments);
        let token_count = self.counter.count(&text);
        if token_count > self.max_tokens {
            return None;
        }

        Some(TextChunk::new(
            text,
            segments[0].start,
            segments[segments.len() - 1].end,
            ChunkMetadata::new(token_count, segments.len(), true).with_custom(self.custom.clone()),
        ))
    }

    /// Fallback tier 2: one segment as one chunk, `min` ignored.
    ///
    /// Returns `None` for segments still over `max` (the residual
    /// single-oversized-word case), which are silently skipped.
    #[must_use]
    pub fn single_segment(&self, segment: &Segment) -> Option<TextChunk> {
        let token_count = self.counter.count(&segment.text);
        if token_count > self.max_tokens {
            return None;
        }

        Some(TextChunk::new(
            segment.text.clone(),
            segment.start,
            segment.end,
            ChunkMetadata::new(token_count, 1, true).with_custom(self.custom.clone()),
        ))
    }

    /// Eager assembly: primary pass, then fallback tiers if it emitted
    /// nothing.
    #[must_use]
    pub fn assemble(&self, segments: &[Segment], breakpoints: &[usize]) -> Vec<TextChunk> {
        let mut chunks = Vec::new();
        let mut chunk_start = 0;

        for boundary in Self::boundaries(segments.len(), breakpoints) {
            if let Some(chunk) = self.candidate(segments, chunk_start, boundary) {
                chunks.push(chunk);
            }
            chunk_start = boundary + 1;
        }

        if chunks.is_empty() && !segments.is_empty() {
            if let Some(chunk) = self.whole_document(segments) {
                chunks.push(chunk);
            } else {
                chunks.extend(segments.iter().filter_map(|s| self.single_segment(s)));
            }
        }

        chunks
    }

    fn join(segments: &[Segment]) -> String {
        let texts: Vec<&str> = segments.iter().map(|s| s.text.as_str()).collect();
        texts.join(" ")
    }
}
