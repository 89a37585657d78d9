use serde::{Deserialize, Serialize};

/// Configuration for fragment extraction behavior
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExtractConfig {
    /// Minimum fragment length in characters (trimmed); shorter paragraphs
    /// are dropped before they reach the ranking stages
    pub min_fragment_chars: usize,

    /// Plain-text extensions read directly (lowercase, without the dot)
    pub text_extensions: Vec<String>,

    /// Extract text from PDF documents via the `pdftotext` binary
    pub include_pdfs: bool,
}

impl Default for ExtractConfig {
    fn default() -> Self {
        Self {
            min_fragment_chars: 50,
            text_extensions: vec!["txt".to_string(), "md".to_string()],
            include_pdfs: true,
        }
    }
}

impl ExtractConfig {
    /// True if the extension (lowercase, no dot) is a recognized plain-text type
    #[must_use]
    pub fn is_text_extension(&self, ext: &str) -> bool {
        self.text_extensions.iter().any(|e| e == ext)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_extensions() {
        let config = ExtractConfig::default();
        assert!(config.is_text_extension("txt"));
        assert!(config.is_text_extension("md"));
        assert!(!config.is_text_extension("pdf"));
        assert!(config.include_pdfs);
    }
}
