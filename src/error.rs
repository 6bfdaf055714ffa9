//! Error types for seams.

/// Errors that can occur during chunking.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Configuration rejected by [`ChunkingOptions`](crate::ChunkingOptions).
    #[error(transparent)]
    InvalidOptions(#[from] crate::OptionsError),

    /// The embedding collaborator failed.
    #[error("embedding error: {0}")]
    Embedding(String),

    /// The embedding collaborator returned the wrong number of vectors.
    ///
    /// The batch contract is one vector per input text, in input order.
    /// A mismatch means positions can no longer be zipped back to groups,
    /// so the pipeline fails fast rather than guessing an alignment.
    #[error("embedding batch returned {returned} vectors for {requested} texts")]
    EmbeddingCountMismatch {
        /// How many texts were sent to the collaborator.
        requested: usize,
        /// How many vectors came back.
        returned: usize,
    },

    /// The pipeline observed a raised cancellation token.
    ///
    /// Chunks already yielded remain valid, but the overall run must be
    /// treated as a failure, not a short result.
    #[error("chunking cancelled")]
    Cancelled,
}

/// Result type for seams operations.
pub type Result<T> = std::result::Result<T, Error>;
