//! Chunking configuration.
//!
//! ## The Knobs
//!
//! Five numbers and a switch control the whole pipeline:
//!
//! | Field | Default | Controls |
//! |-------|---------|----------|
//! | `max_tokens_per_chunk` | 512 | Hard token ceiling for chunks, segments, and context groups |
//! | `min_tokens_per_chunk` | 10 | Floor below which a candidate chunk is dropped |
//! | `buffer_size` | 1 | Neighbors on each side included in a context group |
//! | `breakpoint_percentile` | 0.75 | Distance percentile a gap must reach to become a boundary |
//! | `enable_caching` | true | Whether embeddings are memoized across calls |
//! | `max_cache_size` | 1000 | Entry count that triggers approximate eviction |
//!
//! ## Picking a Percentile
//!
//! The percentile decides how selective boundary detection is:
//!
//! ```text
//! percentile = 0.5  →  half the gaps become boundaries (many small chunks)
//! percentile = 0.75 →  only the top quartile of distance spikes split
//! percentile = 0.95 →  only dramatic topic shifts split
//! ```
//!
//! Lower percentiles fragment; higher percentiles lump. 0.75 is a reasonable
//! middle for prose.

/// Immutable configuration for one chunking call.
///
/// Constructed via [`ChunkingOptions::default`] plus `Result`-returning
/// setters, so invalid combinations are rejected up front rather than
/// surfacing as odd pipeline behavior:
///
/// ```rust
/// use seams::ChunkingOptions;
///
/// let options = ChunkingOptions::default()
///     .with_token_window(20, 256)?
///     .with_breakpoint_percentile(0.9)?;
///
/// assert_eq!(options.max_tokens_per_chunk, 256);
/// # Ok::<(), seams::OptionsError>(())
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct ChunkingOptions {
    /// Inclusive token ceiling for regular chunks.
    pub max_tokens_per_chunk: usize,
    /// Inclusive token floor for regular chunks.
    pub min_tokens_per_chunk: usize,
    /// Segments included on each side of a context group's core segment.
    pub buffer_size: usize,
    /// Percentile in `[0, 1]` of the distance distribution used as the
    /// breakpoint threshold.
    pub breakpoint_percentile: f64,
    /// Whether to consult and populate the embedding cache.
    pub enable_caching: bool,
    /// Cache entry count that triggers eviction.
    pub max_cache_size: usize,
}

impl Default for ChunkingOptions {
    fn default() -> Self {
        Self {
            max_tokens_per_chunk: 512,
            min_tokens_per_chunk: 10,
            buffer_size: 1,
            breakpoint_percentile: 0.75,
            enable_caching: true,
            max_cache_size: 1000,
        }
    }
}

impl ChunkingOptions {
    /// Set the `[min, max]` token window for regular chunks.
    ///
    /// # Errors
    ///
    /// Returns an error if `max == 0` or `min > max`.
    pub fn with_token_window(mut self, min: usize, max: usize) -> Result<Self, OptionsError> {
        if max == 0 {
            return Err(OptionsError::ZeroMaxTokens);
        }
        if min > max {
            return Err(OptionsError::MinExceedsMax { min, max });
        }
        self.min_tokens_per_chunk = min;
        self.max_tokens_per_chunk = max;
        Ok(self)
    }

    /// Set the context-window buffer size.
    #[must_use]
    pub fn with_buffer_size(mut self, buffer_size: usize) -> Self {
        self.buffer_size = buffer_size;
        self
    }

    /// Set the breakpoint percentile.
    ///
    /// # Errors
    ///
    /// Returns an error if `percentile` is not a finite value in `[0, 1]`.
    pub fn with_breakpoint_percentile(mut self, percentile: f64) -> Result<Self, OptionsError> {
        if !percentile.is_finite() || !(0.0..=1.0).contains(&percentile) {
            return Err(OptionsError::PercentileOutOfRange(percentile));
        }
        self.breakpoint_percentile = percentile;
        Ok(self)
    }

    /// Enable or disable the embedding cache for this call.
    #[must_use]
    pub fn with_caching(mut self, enabled: bool) -> Self {
        self.enable_caching = enabled;
        self
    }

    /// Set the cache size bound.
    #[must_use]
    pub fn with_max_cache_size(mut self, max_cache_size: usize) -> Self {
        self.max_cache_size = max_cache_size;
        self
    }

    /// Validate an options value built by direct field construction.
    ///
    /// # Errors
    ///
    /// Returns the first violated constraint, if any.
    pub fn validate(&self) -> Result<(), OptionsError> {
        if self.max_tokens_per_chunk == 0 {
            return Err(OptionsError::ZeroMaxTokens);
        }
        if self.min_tokens_per_chunk > self.max_tokens_per_chunk {
            return Err(OptionsError::MinExceedsMax {
                min: self.min_tokens_per_chunk,
                max: self.max_tokens_per_chunk,
            });
        }
        if !self.breakpoint_percentile.is_finite()
            || !(0.0..=1.0).contains(&self.breakpoint_percentile)
        {
            return Err(OptionsError::PercentileOutOfRange(self.breakpoint_percentile));
        }
        Ok(())
    }
}

/// Error when configuring chunking options.
#[derive(Debug, Clone, thiserror::Error)]
pub enum OptionsError {
    /// The token ceiling must be positive.
    #[error("max_tokens_per_chunk must be > 0")]
    ZeroMaxTokens,

    /// The token floor must not exceed the ceiling.
    #[error("min_tokens_per_chunk ({min}) exceeds max_tokens_per_chunk ({max})")]
    MinExceedsMax {
        /// The configured floor.
        min: usize,
        /// The configured ceiling.
        max: usize,
    },

    /// The percentile must be a finite value in `[0, 1]`.
    #[error("breakpoint_percentile {0} is not in [0, 1]")]
    PercentileOutOfRange(f64),
}
