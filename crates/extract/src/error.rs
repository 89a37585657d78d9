use std::path::PathBuf;
use thiserror::Error;

/// Result type for extraction operations
pub type Result<T> = std::result::Result<T, ExtractError>;

/// Errors that can occur while extracting document text
#[derive(Error, Debug)]
pub enum ExtractError {
    /// Input directory does not exist or is not a directory
    #[error("Input directory not found: {0}")]
    InputDirNotFound(PathBuf),

    /// Unsupported document extension
    #[error("Unsupported document type: {0}")]
    UnsupportedDocument(PathBuf),

    /// PDF text extraction failed
    #[error("PDF extraction failed for {path}: {reason}")]
    PdfExtraction { path: PathBuf, reason: String },

    /// IO error occurred
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    /// Generic error
    #[error("{0}")]
    Other(String),
}
