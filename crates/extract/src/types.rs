use serde::{Deserialize, Serialize};

/// A contiguous unit of extracted document text with source metadata
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Fragment {
    /// Trimmed fragment text (never empty)
    pub text: String,

    /// Originating document (filename within the input set)
    pub source_id: String,

    /// Page the fragment was extracted from (1-indexed)
    pub page_number: usize,
}

impl Fragment {
    /// Create a new fragment
    #[must_use]
    pub const fn new(text: String, source_id: String, page_number: usize) -> Self {
        Self {
            text,
            source_id,
            page_number,
        }
    }

    /// Number of whitespace-delimited words in the fragment text
    #[must_use]
    pub fn word_count(&self) -> usize {
        self.text.split_whitespace().count()
    }
}
