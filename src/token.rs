//! Token counting.
//!
//! Every budget decision in the pipeline — segment splitting, group
//! degradation, chunk validation — asks the same question: "how many tokens
//! is this text?" The answer depends on the downstream model's tokenizer,
//! which this crate deliberately does not ship. Instead, [`TokenCounter`] is
//! a one-method seam the caller fills in.
//!
//! Determinism matters: the pipeline measures partially accumulated strings
//! while packing words, so a counter that returned different answers for the
//! same text would make chunk boundaries non-reproducible.
//!
//! Two conveniences are included:
//!
//! - [`WordTokenCounter`]: counts Unicode words (UAX #29). Close enough to
//!   real tokenizers for prose, and exact for the "words per chunk" mental
//!   model.
//! - [`HeuristicTokenCounter`]: the classic ~4 characters per token
//!   estimate. Cheapest possible; use when counting speed dominates.

use unicode_segmentation::UnicodeSegmentation;

/// A deterministic, side-effect-free token counting service.
///
/// Implementations must return the same count for the same text on every
/// call; pipeline determinism depends on it.
pub trait TokenCounter: Send + Sync {
    /// Count the tokens in `text`.
    fn count(&self, text: &str) -> usize;
}

/// Counts Unicode words (UAX #29 word boundaries).
///
/// ```rust
/// use seams::{TokenCounter, WordTokenCounter};
///
/// let counter = WordTokenCounter;
/// assert_eq!(counter.count("The quick brown fox."), 4);
/// assert_eq!(counter.count(""), 0);
/// ```
#[derive(Debug, Clone, Copy, Default)]
pub struct WordTokenCounter;

impl TokenCounter for WordTokenCounter {
    fn count(&self, text: &str) -> usize {
        text.unicode_words().count()
    }
}

/// Estimates tokens as `ceil(chars / 4)`.
///
/// Matches the rule of thumb for BPE tokenizers on English text. Never
/// returns 0 for non-empty input.
#[derive(Debug, Clone, Copy, Default)]
pub struct HeuristicTokenCounter;

impl TokenCounter for HeuristicTokenCounter {
    fn count(&self, text: &str) -> usize {
        text.chars().count().div_ceil(4)
    }
}
