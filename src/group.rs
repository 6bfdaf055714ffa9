//! Context-window grouping for embedding generation.
//!
//! Embedding a lone sentence often misrepresents it: "He refused." embeds
//! very differently depending on who "he" is. Each segment is therefore
//! embedded together with its neighbors:
//!
//! ```text
//! buffer_size = 1
//!
//! Segments:  [S0]   [S1]   [S2]   [S3]
//! Groups:    S0 S1        <- group 0 (window clamped at the left edge)
//!            S0 S1 S2     <- group 1
//!            S1 S2 S3     <- group 2
//!            S2 S3        <- group 3 (clamped at the right edge)
//! ```
//!
//! One group per segment, windows overlapping by design — every segment
//! contributes context to its neighbors' embeddings. This is what makes the
//! adjacent-distance profile smooth enough for percentile thresholding.
//!
//! ## Degradation
//!
//! Groups obey the same token budget as chunks:
//!
//! 1. Combined window over budget → keep only the core segment's text.
//! 2. Core segment itself over budget (the single-oversized-word carve-out
//!    upstream) → emit an empty placeholder so positions stay aligned; the
//!    placeholder is never embedded and its gaps get a neutral distance.

use crate::{Segment, TokenCounter};

/// A sliding context window around one segment, plus its embedding.
#[derive(Debug, Clone, PartialEq)]
pub struct SegmentGroup {
    /// Texts of the segments in the window, in source order.
    pub texts: Vec<String>,
    /// Window texts joined with single spaces.
    pub combined_text: String,
    /// Byte offset of the first segment in the window.
    pub start: usize,
    /// Byte offset past the last segment in the window.
    pub end: usize,
    /// Embedding of `combined_text`, attached after the batch call.
    pub embedding: Option<Vec<f64>>,
}

impl SegmentGroup {
    /// Whether this group was dropped during degradation.
    ///
    /// Dropped groups keep their position in the sequence but carry no text
    /// and never receive an embedding.
    #[must_use]
    pub fn is_dropped(&self) -> bool {
        self.combined_text.is_empty()
    }
}

/// Builds one context group per validated segment.
pub struct ContextGrouper<'a> {
    counter: &'a dyn TokenCounter,
    max_tokens: usize,
}

impl<'a> ContextGrouper<'a> {
    /// Create a grouper for the given counter and budget.
    #[must_use]
    pub fn new(counter: &'a dyn TokenCounter, max_tokens: usize) -> Self {
        Self { counter, max_tokens }
    }

    /// Build `segments.len()` groups, each spanning `2 * buffer_size + 1`
    /// neighboring segments (clamped at the edges).
    #[must_use]
    pub fn group(&self, segments: &[Segment], buffer_size: usize) -> Vec<SegmentGroup> {
        let n = segments.len();
        let mut groups = Vec::with_capacity(n);

        for i in 0..n {
            let lo = i.saturating_sub(buffer_size);
            let hi = (i + buffer_size).min(n - 1);
            let window = &segments[lo..=hi];

            let texts: Vec<String> = window.iter().map(|s| s.text.clone()).collect();
            let combined_text = texts.join(" ");

            if self.counter.count(&combined_text) <= self.max_tokens {
                groups.push(SegmentGroup {
                    texts,
                    combined_text,
                    start: window[0].start,
                    end: window[window.len() - 1].end,
                    embedding: None,
                });
                continue;
            }

            // Buffer blew the budget: fall back to the core segment alone.
            let core = &segments[i];
            if self.counter.count(&core.text) <= self.max_tokens {
                groups.push(SegmentGroup {
                    texts: vec![core.text.clone()],
                    combined_text: core.text.clone(),
                    start: core.start,
                    end: core.end,
                    embedding: None,
                });
            } else {
                // Even the core is over budget. Upstream validation should
                // have split it; holding the slot keeps alignment intact.
                groups.push(SegmentGroup {
                    texts: vec![],
                    combined_text: String::new(),
                    start: core.start,
                    end: core.end,
                    embedding: None,
                });
            }
        }

        groups
    }
}
