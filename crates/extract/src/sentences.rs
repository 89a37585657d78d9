use unicode_segmentation::UnicodeSegmentation;

/// Split text into sentences using Unicode sentence boundaries.
///
/// Sentences are trimmed and empty segments dropped; the returned order is
/// the order they appear in the input. Refinement stages depend on this
/// being the single source of truth for sentence boundaries.
#[must_use]
pub fn split_into_sentences(text: &str) -> Vec<String> {
    text.unicode_sentences()
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(ToString::to_string)
        .collect()
}
