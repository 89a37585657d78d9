use crate::refine::RefinedSection;
use serde::Serialize;

/// One entry of the ranked-sections view.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RankedSection {
    /// Source document the fragment came from
    pub document: String,

    /// Page the fragment was extracted from (1-indexed)
    pub page_number: usize,

    /// 1-based selection rank (1 = most preferred under the selection policy)
    pub importance_rank: usize,

    /// Fragment-level cosine similarity against the intent
    pub similarity: f32,

    #[serde(flatten)]
    pub refined: RefinedSection,
}

/// Structured analysis output: the top-k fragments, each reduced to its most
/// relevant sentences.
#[derive(Debug, Clone, Default, Serialize)]
pub struct RankedAnalysis {
    pub sections: Vec<RankedSection>,

    /// Total fragments considered before selection
    pub total_fragments: usize,
}

impl RankedAnalysis {
    /// True if nothing was selected (empty input or `k = 0`)
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.sections.is_empty()
    }
}

/// Cohesive summary output.
///
/// An empty `text` with a zero `word_count` is the documented sentinel for
/// "no content cleared the extraction thresholds".
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct SummaryOutcome {
    /// The assembled summary, at most `max_words` words
    pub text: String,

    /// Whitespace-delimited word count of `text`
    pub word_count: usize,

    /// Total fragments considered during assembly
    pub total_fragments: usize,
}

impl SummaryOutcome {
    /// True if this is the empty-result sentinel
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.text.is_empty()
    }
}
