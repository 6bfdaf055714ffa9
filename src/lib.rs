//! # seams
//!
//! Semantic boundary detection and token-bounded chunking for
//! retrieval-augmented generation (RAG) pipelines.
//!
//! ## The Problem
//!
//! Embedding models have context windows. Documents don't fit. You need to
//! split them into pieces ("chunks") small enough to embed and retrieve, but
//! coherent enough to mean something on their own.
//!
//! Splitting every N sentences gets the size right and the meaning wrong: a
//! topic shift in the middle of a chunk pollutes its embedding with two
//! unrelated subjects. The better cut is at the *seam* — the point where
//! adjacent text stops being about the same thing.
//!
//! ## The Pipeline
//!
//! ```text
//! "Intro to ML. Models learn from data. ... The weather is sunny today."
//!
//! 1. Segment      split into sentences, tracking byte offsets
//! 2. Validate     split any sentence that blows the token budget
//! 3. Group        wrap each sentence in a window of its neighbors
//! 4. Embed        one batched call for every cache-missed window
//! 5. Profile      cosine distance between each adjacent pair of windows
//! 6. Threshold    percentile over the distance distribution
//! 7. Assemble     cut chunks at the gaps that clear the threshold
//!
//! Distances:  [0.05, 0.08, 0.06, 0.71, 0.04]
//!                                  ↑
//!                             topic shift → chunk edge
//! ```
//!
//! Boundaries adapt to each document: the threshold is a percentile of
//! *that document's* distance distribution, not a magic constant tuned for
//! one embedding model.
//!
//! ## Guarantees
//!
//! - Every regular chunk's token count lands in
//!   `[min_tokens_per_chunk, max_tokens_per_chunk]`.
//! - Segment and chunk spans are non-overlapping, increasing byte offsets
//!   into the original text.
//! - Identical `(text, options)` with a deterministic embedder produce
//!   identical chunk boundaries on every run.
//! - Any input with at least one under-budget segment yields at least one
//!   chunk; when the token window can't be honored, fallback tiers relax
//!   `min` (flagged via `metadata.is_fallback`) rather than returning
//!   nothing.
//!
//! ## Quick Start
//!
//! ```rust
//! use std::sync::Arc;
//! use seams::{ChunkingOptions, EmbeddingGenerator, SemanticChunker, WordTokenCounter};
//!
//! // Any order-preserving batch embedder works; this one is a stub.
//! struct StubEmbedder;
//! impl EmbeddingGenerator for StubEmbedder {
//!     fn generate_batch(&self, texts: &[String]) -> seams::Result<Vec<Vec<f64>>> {
//!         Ok(texts.iter().map(|t| vec![t.len() as f64, 1.0]).collect())
//!     }
//! }
//!
//! let chunker = SemanticChunker::new(Arc::new(WordTokenCounter), Arc::new(StubEmbedder));
//! let options = ChunkingOptions::default().with_token_window(2, 128)?;
//!
//! let text = "Rust has a strong type system. Ownership prevents data races. \
//!             My cat sleeps all day. She dreams of birds.";
//!
//! for chunk in chunker.chunk(text, &options)? {
//!     let chunk = chunk?;
//!     println!("[{}..{}] {}", chunk.start, chunk.end, chunk.text);
//! }
//! # Ok::<(), seams::Error>(())
//! ```
//!
//! ## Collaborators, Not Dependencies
//!
//! Tokenization and embedding are injected behind one-method traits
//! ([`TokenCounter`], [`EmbeddingGenerator`]), so the pipeline tests with
//! stubs and deploys against whatever model the host application uses. The
//! optional `fastembed` feature ships a local ONNX-backed
//! [`FastEmbedGenerator`] for the common case.
//!
//! ## Performance Considerations
//!
//! | Stage | Cost | Notes |
//! |-------|------|-------|
//! | Segment + validate | O(n) | pure CPU |
//! | Group | O(n × buffer) | pure CPU |
//! | Embed | one batch call | the only I/O; cache-missed groups only |
//! | Profile + threshold | O(n log n) | sort for the percentile |
//! | Assemble | O(n) | lazy, streamed |
//!
//! The embedding call dominates. The instance-scoped cache keeps repeat
//! runs over overlapping content from paying it twice.

mod assemble;
mod cache;
mod chunk;
mod distance;
mod embed;
mod error;
mod group;
mod options;
mod pipeline;
mod segment;
mod token;
mod validate;

pub use assemble::ChunkAssembler;
pub use cache::EmbeddingCache;
pub use chunk::{ChunkMetadata, TextChunk};
pub use distance::{cosine_distance, detect_breakpoints, distance_profile, percentile_threshold};
pub use embed::EmbeddingGenerator;
pub use error::{Error, Result};
pub use group::{ContextGrouper, SegmentGroup};
pub use options::{ChunkingOptions, OptionsError};
pub use pipeline::{CancelToken, ChunkStream, SemanticChunker};
pub use segment::{Segment, SentenceSegmenter, TextSegmenter};
pub use token::{HeuristicTokenCounter, TokenCounter, WordTokenCounter};
pub use validate::SegmentSizeValidator;

#[cfg(feature = "fastembed")]
pub use embed::FastEmbedGenerator;
