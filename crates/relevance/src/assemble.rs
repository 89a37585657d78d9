use crate::store::FragmentStore;

/// Leftover budget below this is not worth a partial fragment; single-word
/// tails read as noise.
const MIN_PARTIAL_WORDS: usize = 20;

pub(crate) const TRUNCATION_MARKER: &str = "...";

/// What happened when a refined text was offered to the draft.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum PushOutcome {
    /// The whole text fit and was appended
    Appended,
    /// A word-boundary prefix filled the remaining budget; the draft is done
    Truncated,
    /// Nothing was appended; the draft is done
    Rejected,
}

/// Mutable accumulator for one budgeted assembly pass.
///
/// Lives only for the duration of a single summary call. Once `push`
/// returns `Truncated` or `Rejected` the draft is closed and no further
/// content is accepted.
pub(crate) struct SummaryDraft {
    parts: Vec<String>,
    word_count: usize,
    max_words: usize,
    closed: bool,
    truncated: bool,
}

impl SummaryDraft {
    pub(crate) const fn new(max_words: usize) -> Self {
        Self {
            parts: Vec::new(),
            word_count: 0,
            max_words,
            closed: false,
            truncated: false,
        }
    }

    pub(crate) const fn is_full(&self) -> bool {
        self.closed || self.word_count >= self.max_words
    }

    pub(crate) const fn word_count(&self) -> usize {
        self.word_count
    }

    /// Offer a refined text to the draft.
    ///
    /// Appends whole when it fits the budget. On overflow, a word-truncated
    /// prefix sized to exactly fill the remaining budget is taken when at
    /// least [`MIN_PARTIAL_WORDS`] remain; otherwise nothing is added.
    /// Either overflow outcome closes the draft.
    pub(crate) fn push(&mut self, text: &str) -> PushOutcome {
        let words: Vec<&str> = text.split_whitespace().collect();
        if words.is_empty() {
            return PushOutcome::Appended;
        }
        if self.closed {
            return PushOutcome::Rejected;
        }

        if self.word_count + words.len() <= self.max_words {
            self.parts.push(words.join(" "));
            self.word_count += words.len();
            return PushOutcome::Appended;
        }

        let remaining = self.max_words - self.word_count;
        self.closed = true;
        self.truncated = true;

        if remaining >= MIN_PARTIAL_WORDS {
            self.parts.push(words[..remaining].join(" "));
            self.word_count = self.max_words;
            PushOutcome::Truncated
        } else {
            PushOutcome::Rejected
        }
    }

    /// Finish the draft into the final summary string.
    ///
    /// The truncation marker is appended only when content was cut and more
    /// than one part made it in.
    pub(crate) fn finish(self) -> String {
        let marker = self.truncated && self.parts.len() > 1;
        let mut summary = self.parts.join(" ");
        if marker {
            let trimmed_len = summary.trim_end().len();
            summary.truncate(trimmed_len);
            summary.push_str(TRUNCATION_MARKER);
        }
        summary
    }
}

/// Assembly visit order over the whole store: source documents in extraction
/// order, and within a document pages ascending with similarity descending
/// inside a page. Extraction order breaks remaining ties.
pub(crate) fn visit_order(store: &FragmentStore, scores: &[f32]) -> Vec<usize> {
    let mut order = Vec::with_capacity(store.len());
    for (_, indices) in store.source_groups() {
        let mut doc = indices;
        doc.sort_by(|&a, &b| {
            let page_a = store.fragment(a).page_number;
            let page_b = store.fragment(b).page_number;
            let score_a = scores.get(a).copied().unwrap_or(0.0);
            let score_b = scores.get(b).copied().unwrap_or(0.0);
            page_a
                .cmp(&page_b)
                .then_with(|| score_b.total_cmp(&score_a))
                .then_with(|| a.cmp(&b))
        });
        order.extend(doc);
    }
    order
}

#[cfg(test)]
mod tests {
    use super::*;
    use docmind_extract::Fragment;
    use pretty_assertions::assert_eq;

    fn words(n: usize, label: &str) -> String {
        (0..n)
            .map(|i| format!("{label}{i}"))
            .collect::<Vec<_>>()
            .join(" ")
    }

    #[test]
    fn whole_texts_append_while_the_budget_allows() {
        let mut draft = SummaryDraft::new(100);
        assert_eq!(draft.push(&words(30, "a")), PushOutcome::Appended);
        assert_eq!(draft.push(&words(30, "b")), PushOutcome::Appended);
        assert_eq!(draft.word_count(), 60);
        assert!(!draft.is_full());
    }

    #[test]
    fn overflow_with_room_takes_an_exact_partial() {
        // Budget 50, three ~30-word texts: first fits whole, second is cut
        // at the word boundary to exactly 20 words, third never lands.
        let mut draft = SummaryDraft::new(50);
        assert_eq!(draft.push(&words(30, "a")), PushOutcome::Appended);
        assert_eq!(draft.push(&words(30, "b")), PushOutcome::Truncated);
        assert!(draft.is_full());
        assert_eq!(draft.word_count(), 50);

        let summary = draft.finish();
        assert_eq!(summary.split_whitespace().count(), 50);
        assert!(summary.contains("b19"));
        assert!(!summary.contains("b20"), "cut lands on a word boundary");
        assert!(summary.ends_with(TRUNCATION_MARKER));
    }

    #[test]
    fn overflow_without_room_rejects_and_closes() {
        let mut draft = SummaryDraft::new(40);
        assert_eq!(draft.push(&words(30, "a")), PushOutcome::Appended);
        // 10 words remain: below the partial threshold.
        assert_eq!(draft.push(&words(30, "b")), PushOutcome::Rejected);
        assert!(draft.is_full());
        assert_eq!(draft.word_count(), 30);
    }

    #[test]
    fn exactly_twenty_remaining_words_still_take_the_partial() {
        let mut draft = SummaryDraft::new(50);
        draft.push(&words(30, "a"));
        assert_eq!(draft.push(&words(25, "b")), PushOutcome::Truncated);
        assert_eq!(draft.word_count(), 50);
    }

    #[test]
    fn marker_requires_truncation_and_multiple_parts() {
        // Everything fit: no marker.
        let mut fits = SummaryDraft::new(100);
        fits.push(&words(30, "a"));
        fits.push(&words(30, "b"));
        assert!(!fits.finish().ends_with(TRUNCATION_MARKER));

        // Truncated, but only one part made it in: no marker.
        let mut single = SummaryDraft::new(25);
        assert_eq!(single.push(&words(25, "a")), PushOutcome::Appended);
        assert_eq!(single.push(&words(30, "b")), PushOutcome::Rejected);
        assert!(!single.finish().ends_with(TRUNCATION_MARKER));

        // Truncated after several parts: marker present.
        let mut cut = SummaryDraft::new(50);
        cut.push(&words(30, "a"));
        cut.push(&words(30, "b"));
        assert!(cut.finish().ends_with(TRUNCATION_MARKER));
    }

    #[test]
    fn empty_draft_finishes_to_the_empty_sentinel() {
        let draft = SummaryDraft::new(100);
        assert_eq!(draft.finish(), "");
    }

    #[test]
    fn empty_text_is_a_no_op() {
        let mut draft = SummaryDraft::new(10);
        assert_eq!(draft.push("   "), PushOutcome::Appended);
        assert_eq!(draft.word_count(), 0);
    }

    fn store_with(entries: &[(&str, usize)]) -> FragmentStore {
        let fragments: Vec<Fragment> = entries
            .iter()
            .map(|(source, page)| {
                Fragment::new(
                    format!("text from {source} page {page}"),
                    (*source).to_string(),
                    *page,
                )
            })
            .collect();
        let vectors = vec![vec![0.0_f32; 4]; fragments.len()];
        FragmentStore::from_embedded(fragments, vectors).unwrap()
    }

    #[test]
    fn visit_order_keeps_documents_in_extraction_order() {
        // b.txt is encountered first, so it leads regardless of scores.
        let store = store_with(&[("b.txt", 1), ("a.txt", 1), ("b.txt", 2)]);
        let scores = [0.1, 0.9, 0.5];

        assert_eq!(visit_order(&store, &scores), vec![0, 2, 1]);
    }

    #[test]
    fn visit_order_sorts_pages_ascending_then_similarity_descending() {
        let store = store_with(&[("a.txt", 2), ("a.txt", 1), ("a.txt", 1), ("a.txt", 2)]);
        let scores = [0.9, 0.2, 0.8, 0.95];

        // Page 1 first (best score leading), then page 2 (best score leading).
        assert_eq!(visit_order(&store, &scores), vec![2, 1, 3, 0]);
    }
}
