use thiserror::Error;

/// Result type for embedding operations
pub type Result<T> = std::result::Result<T, EmbeddingError>;

/// Errors that can occur while loading or running the embedding model
#[derive(Error, Debug)]
pub enum EmbeddingError {
    /// The model could not be initialized; fatal for the run
    #[error("Embedding model unavailable: {0}")]
    ModelUnavailable(String),

    /// Tokenization failed
    #[error("Tokenization failed: {0}")]
    Tokenizer(String),

    /// ONNX inference failed
    #[error("Inference failed: {0}")]
    Inference(String),

    /// Model produced a vector of the wrong size
    #[error("Invalid embedding dimension: expected {expected}, got {actual}")]
    InvalidDimension { expected: usize, actual: usize },

    /// Unrecognized embedding mode string
    #[error("Unsupported embedding mode '{0}' (expected 'fast' or 'stub')")]
    UnsupportedMode(String),

    /// Generic error
    #[error("{0}")]
    Other(String),
}
