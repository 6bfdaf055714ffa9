//! Embedding generation.
//!
//! The pipeline needs one thing from an embedding model: a batch call that
//! turns N texts into N vectors, in order. Everything else — model choice,
//! pooling, retries, rate limiting — belongs to the implementation behind
//! the trait, not to the chunker.
//!
//! ## The Batch Contract
//!
//! ```text
//! input:  [t0, t1, t2, ..., tn]
//! output: [v0, v1, v2, ..., vn]   same length, same order, same dimension
//! ```
//!
//! The pipeline zips results back to context groups purely by position, so
//! order preservation is load-bearing. A length mismatch is reported as
//! [`Error::EmbeddingCountMismatch`](crate::Error::EmbeddingCountMismatch)
//! by the caller; this module does not retry or repair.

use crate::Result;

/// A batch vector-embedding service.
///
/// The only suspension point in the pipeline: implementations may block on
/// I/O (HTTP call, ONNX inference). Exactly one batch call is issued per
/// chunking run, covering every cache-missed context group.
pub trait EmbeddingGenerator: Send + Sync {
    /// Embed a batch of texts.
    ///
    /// Must return one vector per input text, in input order, all with the
    /// same dimensionality.
    ///
    /// # Errors
    ///
    /// Returns an error if the underlying model or transport fails.
    fn generate_batch(&self, texts: &[String]) -> Result<Vec<Vec<f64>>>;
}

/// [`EmbeddingGenerator`] backed by fastembed's local ONNX models.
///
/// Requires the `fastembed` feature. Uses the default model
/// (BGE-small-en, 384 dimensions) unless configured otherwise.
#[cfg(feature = "fastembed")]
pub struct FastEmbedGenerator {
    model: fastembed::TextEmbedding,
}

#[cfg(feature = "fastembed")]
impl FastEmbedGenerator {
    /// Load the default fastembed model.
    ///
    /// # Errors
    ///
    /// Returns an error if the model fails to download or initialize.
    pub fn new() -> Result<Self> {
        let model = fastembed::TextEmbedding::try_new(Default::default())
            .map_err(|e| crate::Error::Embedding(e.to_string()))?;
        Ok(Self { model })
    }
}

#[cfg(feature = "fastembed")]
impl EmbeddingGenerator for FastEmbedGenerator {
    fn generate_batch(&self, texts: &[String]) -> Result<Vec<Vec<f64>>> {
        let refs: Vec<&str> = texts.iter().map(String::as_str).collect();
        let vectors = self
            .model
            .embed(refs, None)
            .map_err(|e| crate::Error::Embedding(e.to_string()))?;
        Ok(vectors
            .into_iter()
            .map(|v| v.into_iter().map(f64::from).collect())
            .collect())
    }
}

#[cfg(feature = "fastembed")]
impl std::fmt::Debug for FastEmbedGenerator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FastEmbedGenerator").finish_non_exhaustive()
    }
}
