use crate::assemble::{visit_order, PushOutcome, SummaryDraft};
use crate::error::Result;
use crate::intent::Intent;
use crate::output::{RankedAnalysis, RankedSection, SummaryOutcome};
use crate::refine::{join_sentences, pick_sentences, refine_ranked, summary_keep_count};
use crate::scorer::cosine_scores;
use crate::select::select_diverse;
use crate::store::FragmentStore;
use docmind_embedding::EmbeddingModel;
use docmind_extract::{split_into_sentences, Fragment};

/// The ranking pipeline: owns the embedding handle and exposes the two
/// distillation entry points.
///
/// Construct once per process and reuse across runs; the handle is the only
/// shared resource, and it is read-only after construction. Each call owns
/// its fragments and intermediate state, so concurrent runs never share
/// mutable data.
pub struct IntentPipeline {
    embedder: EmbeddingModel,
}

impl IntentPipeline {
    /// Create a pipeline around an initialized embedding model
    #[must_use]
    pub const fn new(embedder: EmbeddingModel) -> Self {
        Self { embedder }
    }

    /// The injected embedding handle
    #[must_use]
    pub const fn embedder(&self) -> &EmbeddingModel {
        &self.embedder
    }

    /// Rank fragments against the intent, select a diverse top-`k`, and
    /// reduce each selected fragment to its key sentences.
    ///
    /// Empty input or `k = 0` yields an empty analysis, not an error.
    pub async fn rank_and_refine(
        &self,
        fragments: Vec<Fragment>,
        intent: &Intent,
        k: usize,
    ) -> Result<RankedAnalysis> {
        if fragments.is_empty() {
            log::info!("No fragments to rank; returning empty analysis");
            return Ok(RankedAnalysis::default());
        }

        log::info!(
            "Ranking {} fragments for persona '{}'",
            fragments.len(),
            intent.persona
        );

        let query = self.embedder.embed(&intent.ranking_query()).await?;
        let store = FragmentStore::build(fragments, &self.embedder).await?;
        let scores = cosine_scores(&query, store.vectors());
        let selection = select_diverse(&store, &scores, k);

        // All selected fragments' sentences go through the embedder as one
        // batch; slices map back per fragment afterwards.
        let sentence_sets: Vec<Vec<String>> = selection
            .iter()
            .map(|pick| split_into_sentences(&store.fragment(pick.index).text))
            .collect();
        let flat: Vec<&str> = sentence_sets
            .iter()
            .flatten()
            .map(String::as_str)
            .collect();
        let sentence_vectors = self.embedder.embed_batch(flat).await?;

        let mut sections = Vec::with_capacity(selection.len());
        let mut offset = 0usize;
        for (pick, sentences) in selection.iter().zip(&sentence_sets) {
            let vectors = &sentence_vectors[offset..offset + sentences.len()];
            offset += sentences.len();

            let sentence_scores = cosine_scores(&query, vectors);
            let fragment = store.fragment(pick.index);
            let refined = refine_ranked(fragment, sentences, &sentence_scores, pick.similarity);

            sections.push(RankedSection {
                document: fragment.source_id.clone(),
                page_number: fragment.page_number,
                importance_rank: pick.rank,
                similarity: pick.similarity,
                refined,
            });
        }

        log::info!("Selected {} sections", sections.len());
        Ok(RankedAnalysis {
            sections,
            total_fragments: store.len(),
        })
    }

    /// Assemble a cohesive summary under a word budget, walking documents in
    /// extraction order.
    ///
    /// Empty input or a zero budget yields the empty-result sentinel.
    pub async fn assemble_summary(
        &self,
        fragments: Vec<Fragment>,
        intent: &Intent,
        max_words: usize,
    ) -> Result<SummaryOutcome> {
        if fragments.is_empty() || max_words == 0 {
            log::info!("Nothing to summarize; returning empty summary");
            return Ok(SummaryOutcome::default());
        }

        log::info!(
            "Assembling summary from {} fragments (budget {max_words} words)",
            fragments.len()
        );

        let query = self.embedder.embed(&intent.summary_query()).await?;
        let store = FragmentStore::build(fragments, &self.embedder).await?;
        let scores = cosine_scores(&query, store.vectors());
        let order = visit_order(&store, &scores);

        let mut draft = SummaryDraft::new(max_words);
        for idx in order {
            if draft.is_full() {
                break;
            }
            let refined = self.refine_for_summary(&store.fragment(idx).text, &query).await?;
            match draft.push(&refined) {
                PushOutcome::Appended => {}
                PushOutcome::Truncated | PushOutcome::Rejected => break,
            }
        }

        let total_fragments = store.len();
        let word_count = draft.word_count();
        let text = draft.finish();
        log::info!("Summary assembled: {word_count} words");

        Ok(SummaryOutcome {
            text,
            word_count,
            total_fragments,
        })
    }

    /// Summary-side refinement: the fragment's sentence set is scored as one
    /// batch, and at most three sentences survive in source order.
    async fn refine_for_summary(&self, text: &str, query: &[f32]) -> Result<String> {
        let sentences = split_into_sentences(text);
        if sentences.len() <= 1 {
            return Ok(text.to_string());
        }

        let refs: Vec<&str> = sentences.iter().map(String::as_str).collect();
        let vectors = self.embedder.embed_batch(refs).await?;
        let sentence_scores = cosine_scores(query, &vectors);
        let picks = pick_sentences(&sentence_scores, summary_keep_count(sentences.len()));
        Ok(join_sentences(&sentences, &picks))
    }
}
