use thiserror::Error;

/// Result type for ranking operations
pub type Result<T> = std::result::Result<T, RelevanceError>;

/// Errors that can occur in the ranking core.
///
/// Arithmetic edge cases (empty inputs, zero-norm vectors, fragments with no
/// sentences) are recovered locally with documented fallbacks and never show
/// up here; only resource failures propagate.
#[derive(Error, Debug)]
pub enum RelevanceError {
    /// Embedding collaborator failed; fatal for the run
    #[error("Embedding error: {0}")]
    Embedding(#[from] docmind_embedding::EmbeddingError),

    /// Fragment and vector counts diverged while building the store
    #[error("Fragment store mismatch: {fragments} fragments but {vectors} vectors")]
    StoreMismatch { fragments: usize, vectors: usize },

    /// Generic error
    #[error("{0}")]
    Other(String),
}
