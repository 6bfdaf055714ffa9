//! Token-budget enforcement for segments.
//!
//! Segmentation is oblivious to token budgets: a single run-on "sentence"
//! can be thousands of tokens. This stage guarantees (with one documented
//! exception) that every segment entering the grouping stage fits in
//! `max_tokens_per_chunk`.
//!
//! ## Greedy Word Packing
//!
//! Oversized segments are split by accumulating words and measuring the
//! accumulated string after each addition:
//!
//! ```text
//! budget = 4 tokens
//!
//! "alpha beta gamma delta epsilon zeta"
//!  ├── "alpha"                     1  ok
//!  ├── "alpha beta"                2  ok
//!  ├── "alpha beta gamma"          3  ok
//!  ├── "alpha beta gamma delta"    4  ok
//!  ├── "alpha ... epsilon"         5  over → commit "alpha beta gamma delta"
//!  └── restart with "epsilon"
//! ```
//!
//! Measuring the joined string (not summing per-word counts) matters for
//! subword tokenizers, where `count(a + " " + b)` need not equal
//! `count(a) + count(b)`.
//!
//! ## The One Exception
//!
//! A single word that alone exceeds the budget cannot be split at word
//! granularity, so it passes through unmodified. Downstream stages treat
//! such segments defensively (group drop, fallback skip).

use crate::{Segment, TokenCounter};

/// Splits oversized segments until every segment fits the token budget.
pub struct SegmentSizeValidator<'a> {
    counter: &'a dyn TokenCounter,
    max_tokens: usize,
}

impl<'a> SegmentSizeValidator<'a> {
    /// Create a validator for the given counter and budget.
    #[must_use]
    pub fn new(counter: &'a dyn TokenCounter, max_tokens: usize) -> Self {
        Self { counter, max_tokens }
    }

    /// Validate segments, splitting any whose token count exceeds the budget.
    ///
    /// Order and coverage are preserved: sub-segments appear in place of
    /// their parent, in source order, with recomputed offsets.
    #[must_use]
    pub fn validate(&self, segments: Vec<Segment>) -> Vec<Segment> {
        let mut out = Vec::with_capacity(segments.len());
        for segment in segments {
            if self.counter.count(&segment.text) <= self.max_tokens {
                out.push(segment);
            } else {
                self.split_oversized(&segment, &mut out);
            }
        }
        out
    }

    /// Greedy word packing of one oversized segment.
    fn split_oversized(&self, segment: &Segment, out: &mut Vec<Segment>) {
        let words: Vec<&str> = segment.text.split_whitespace().collect();

        // A single word over budget is an accepted violation.
        if words.len() <= 1 {
            out.push(segment.clone());
            return;
        }

        let mut current = String::new();
        let mut search_rel = 0;

        for word in words {
            if current.is_empty() {
                current = word.to_string();
                continue;
            }

            let candidate = format!("{current} {word}");
            if self.counter.count(&candidate) > self.max_tokens {
                search_rel = Self::commit(segment, &current, search_rel, out);
                current = word.to_string();
            } else {
                current = candidate;
            }
        }

        // Every trailing remainder becomes its own final sub-segment.
        if !current.is_empty() {
            Self::commit(segment, &current, search_rel, out);
        }
    }

    /// Emit `text` as a sub-segment, resolving its offset within the parent.
    ///
    /// The sub-segment text joins words with single spaces, which may not
    /// literally occur in the parent (irregular whitespace); in that case
    /// the running offset estimate stands in for the exact position.
    fn commit(segment: &Segment, text: &str, search_rel: usize, out: &mut Vec<Segment>) -> usize {
        let rel = segment.text[search_rel..]
            .find(text)
            .map_or(search_rel, |pos| search_rel + pos);

        let start = segment.start + rel;
        out.push(Segment::new(text, start, start + text.len()));
        rel + text.len()
    }
}
