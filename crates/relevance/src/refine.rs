use docmind_extract::Fragment;
use serde::Serialize;

/// A fragment reduced to its most intent-relevant sentences.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RefinedSection {
    /// Derived, non-authoritative heading (at most 80 characters)
    pub section_title: String,

    /// Selected sentences joined by single spaces, in source order
    pub refined_text: String,

    /// Highest sentence-level similarity observed in the fragment
    pub relevance_score: f32,
}

const MIN_KEPT_SENTENCES: usize = 3;
const MAX_KEPT_SENTENCES: usize = 5;
const SUMMARY_SENTENCE_CAP: usize = 3;

const TITLE_MAX_CHARS: usize = 80;
const TITLE_KEEP_CHARS: usize = 77;
const TITLE_MIN_LINE_CHARS: usize = 10;
const TITLE_SCAN_LINES: usize = 3;
const TITLE_FALLBACK_WORDS: usize = 10;

/// Sentences kept for the ranked-sections view: a third of the fragment,
/// clamped to 3..=5 so short and long fragments compress comparably.
pub(crate) fn ranked_keep_count(sentence_total: usize) -> usize {
    (sentence_total / 3).clamp(MIN_KEPT_SENTENCES, MAX_KEPT_SENTENCES)
}

/// Sentences kept per fragment during summary assembly; summary space is
/// scarcer than section space.
pub(crate) fn summary_keep_count(sentence_total: usize) -> usize {
    sentence_total.min(SUMMARY_SENTENCE_CAP)
}

/// Indices of the `count` best-scoring sentences, restored to source order.
///
/// Score ties prefer the earlier sentence. The ascending result is what
/// keeps refined text coherent: sentences are filtered, never reordered.
pub(crate) fn pick_sentences(scores: &[f32], count: usize) -> Vec<usize> {
    let mut order: Vec<usize> = (0..scores.len()).collect();
    order.sort_by(|&a, &b| scores[b].total_cmp(&scores[a]).then_with(|| a.cmp(&b)));
    order.truncate(count);
    order.sort_unstable();
    order
}

pub(crate) fn join_sentences(sentences: &[String], picks: &[usize]) -> String {
    picks
        .iter()
        .filter_map(|&idx| sentences.get(idx))
        .map(String::as_str)
        .collect::<Vec<_>>()
        .join(" ")
}

/// Refine one selected fragment for the ranked-sections view.
///
/// Fragments with at most one sentence pass through unchanged; filtering a
/// single sentence would only produce empty output.
pub(crate) fn refine_ranked(
    fragment: &Fragment,
    sentences: &[String],
    sentence_scores: &[f32],
    fragment_similarity: f32,
) -> RefinedSection {
    let section_title = derive_title(&fragment.text);

    if sentences.len() <= 1 {
        let relevance_score = sentence_scores
            .first()
            .copied()
            .unwrap_or(fragment_similarity);
        return RefinedSection {
            section_title,
            refined_text: fragment.text.clone(),
            relevance_score,
        };
    }

    let picks = pick_sentences(sentence_scores, ranked_keep_count(sentences.len()));
    let refined_text = join_sentences(sentences, &picks);
    let relevance_score = sentence_scores.iter().copied().fold(0.0_f32, f32::max);

    RefinedSection {
        section_title,
        refined_text,
        relevance_score,
    }
}

/// Derive a display heading for a fragment.
///
/// The first three lines are scanned for a non-bullet line longer than ten
/// characters; failing that, the first ten words stand in. Either way the
/// result is capped at 80 characters with a trailing ellipsis when cut.
#[must_use]
pub fn derive_title(text: &str) -> String {
    for line in text.lines().take(TITLE_SCAN_LINES) {
        let line = line.trim();
        if line.chars().count() <= TITLE_MIN_LINE_CHARS {
            continue;
        }
        if line.starts_with(['•', '-', '*']) {
            continue;
        }
        return truncate_title(line);
    }

    let fallback = text
        .split_whitespace()
        .take(TITLE_FALLBACK_WORDS)
        .collect::<Vec<_>>()
        .join(" ");
    truncate_title(&fallback)
}

fn truncate_title(title: &str) -> String {
    if title.chars().count() <= TITLE_MAX_CHARS {
        return title.to_string();
    }
    let kept: String = title.chars().take(TITLE_KEEP_CHARS).collect();
    format!("{}...", kept.trim_end())
}
