//! The TextChunk type: a token-bounded chunk of text with position metadata.

use std::collections::HashMap;

/// A chunk of text with its position in the original document.
///
/// Chunks are the final output of the pipeline: token-bounded spans whose
/// edges sit at detected semantic boundaries ("seams") in the source text.
///
/// ## Byte Offsets
///
/// `start` and `end` are byte offsets into the original text, not character
/// indices. This matches Rust's string slicing semantics:
///
/// ```rust
/// use seams::{ChunkMetadata, TextChunk};
///
/// let text = "Hello, world!";
/// let chunk = TextChunk::new("world", 7, 12, ChunkMetadata::new(1, 1, false));
///
/// // The offsets let you recover the original position
/// assert_eq!(&text[chunk.start..chunk.end], "world");
/// ```
///
/// Note that a multi-segment chunk's `text` joins segment texts with single
/// spaces, so it may differ from `&original[start..end]` by whitespace
/// normalization. The span still brackets exactly the source region the
/// chunk was built from.
#[derive(Debug, Clone, PartialEq)]
pub struct TextChunk {
    /// The chunk text (segment texts joined with single spaces).
    pub text: String,
    /// Byte offset where this chunk starts in the original document.
    pub start: usize,
    /// Byte offset where this chunk ends (exclusive) in the original document.
    pub end: usize,
    /// Token count, segment count, fallback flag, and caller metadata.
    pub metadata: ChunkMetadata,
}

impl TextChunk {
    /// Create a new chunk.
    #[must_use]
    pub fn new(text: impl Into<String>, start: usize, end: usize, metadata: ChunkMetadata) -> Self {
        Self {
            text: text.into(),
            start,
            end,
            metadata,
        }
    }

    /// The length of this chunk in bytes.
    #[must_use]
    pub fn len(&self) -> usize {
        self.text.len()
    }

    /// Whether this chunk is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.text.is_empty()
    }

    /// The byte span of this chunk in the original document.
    #[must_use]
    pub fn span(&self) -> std::ops::Range<usize> {
        self.start..self.end
    }
}

impl std::fmt::Display for TextChunk {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "TextChunk {{ span: {}..{}, tokens: {}, segments: {}, fallback: {} }}",
            self.start,
            self.end,
            self.metadata.token_count,
            self.metadata.segment_count,
            self.metadata.is_fallback
        )
    }
}

/// Metadata attached to every emitted chunk.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ChunkMetadata {
    /// Token count of the chunk text, as reported by the injected counter.
    pub token_count: usize,
    /// How many validated segments the chunk was assembled from.
    pub segment_count: usize,
    /// Whether the chunk came from a fallback assembly tier.
    ///
    /// Fallback chunks are exempt from the `min_tokens_per_chunk` bound.
    pub is_fallback: bool,
    /// Caller-supplied key/value pairs, copied onto every chunk of a run.
    pub custom: HashMap<String, String>,
}

impl ChunkMetadata {
    /// Create metadata with no custom entries.
    #[must_use]
    pub fn new(token_count: usize, segment_count: usize, is_fallback: bool) -> Self {
        Self {
            token_count,
            segment_count,
            is_fallback,
            custom: HashMap::new(),
        }
    }

    /// Attach caller metadata.
    #[must_use]
    pub fn with_custom(mut self, custom: HashMap<String, String>) -> Self {
        self.custom = custom;
        self
    }
}
