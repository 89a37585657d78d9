use crate::error::{RelevanceError, Result};
use docmind_embedding::EmbeddingModel;
use docmind_extract::Fragment;
use std::collections::HashMap;

/// Ordered collection of fragments with their embedding vectors.
///
/// The store never reorders its input: fragment index is extraction order,
/// and that order is the single source of truth for both the diversity
/// selector (first-encounter source order) and the budgeted assembler
/// (document-order traversal). Vectors are computed once per run and
/// discarded with the store; nothing is cached across runs.
pub struct FragmentStore {
    fragments: Vec<Fragment>,
    vectors: Vec<Vec<f32>>,
}

impl FragmentStore {
    /// Build a store by embedding every fragment text in one batched call.
    pub async fn build(fragments: Vec<Fragment>, embedder: &EmbeddingModel) -> Result<Self> {
        let texts: Vec<&str> = fragments.iter().map(|f| f.text.as_str()).collect();
        let vectors = embedder.embed_batch(texts).await?;
        Self::from_embedded(fragments, vectors)
    }

    /// Assemble a store from fragments and precomputed vectors.
    pub fn from_embedded(fragments: Vec<Fragment>, vectors: Vec<Vec<f32>>) -> Result<Self> {
        if fragments.len() != vectors.len() {
            return Err(RelevanceError::StoreMismatch {
                fragments: fragments.len(),
                vectors: vectors.len(),
            });
        }
        Ok(Self { fragments, vectors })
    }

    /// Number of fragments
    #[must_use]
    pub fn len(&self) -> usize {
        self.fragments.len()
    }

    /// True if the store holds no fragments
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.fragments.is_empty()
    }

    /// Fragment at extraction index `idx`
    ///
    /// # Panics
    /// Panics if `idx` is out of bounds; indices come from this store's own
    /// grouping methods.
    #[must_use]
    pub fn fragment(&self, idx: usize) -> &Fragment {
        &self.fragments[idx]
    }

    /// All fragments in extraction order
    #[must_use]
    pub fn fragments(&self) -> &[Fragment] {
        &self.fragments
    }

    /// All embedding vectors, parallel to `fragments()`
    #[must_use]
    pub fn vectors(&self) -> &[Vec<f32>] {
        &self.vectors
    }

    /// Fragment indices grouped by source document.
    ///
    /// Groups appear in the order each source was first encountered during
    /// extraction; indices within a group keep extraction order.
    #[must_use]
    pub fn source_groups(&self) -> Vec<(&str, Vec<usize>)> {
        let mut positions: HashMap<&str, usize> = HashMap::new();
        let mut groups: Vec<(&str, Vec<usize>)> = Vec::new();

        for (idx, fragment) in self.fragments.iter().enumerate() {
            let source = fragment.source_id.as_str();
            match positions.get(source) {
                Some(&pos) => groups[pos].1.push(idx),
                None => {
                    positions.insert(source, groups.len());
                    groups.push((source, vec![idx]));
                }
            }
        }

        groups
    }

    /// Distinct source documents in first-encounter order
    #[must_use]
    pub fn source_ids(&self) -> Vec<&str> {
        self.source_groups().into_iter().map(|(id, _)| id).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn fragment(source: &str, page: usize, text: &str) -> Fragment {
        Fragment::new(text.to_string(), source.to_string(), page)
    }

    fn store(fragments: Vec<Fragment>) -> FragmentStore {
        let vectors = vec![vec![0.0_f32; 4]; fragments.len()];
        FragmentStore::from_embedded(fragments, vectors).unwrap()
    }

    #[test]
    fn groups_follow_first_encounter_order() {
        let store = store(vec![
            fragment("b.txt", 1, "b one"),
            fragment("a.txt", 1, "a one"),
            fragment("b.txt", 2, "b two"),
            fragment("c.txt", 1, "c one"),
        ]);

        let groups = store.source_groups();
        let names: Vec<&str> = groups.iter().map(|(id, _)| *id).collect();
        assert_eq!(names, vec!["b.txt", "a.txt", "c.txt"]);
        assert_eq!(groups[0].1, vec![0, 2]);
        assert_eq!(groups[1].1, vec![1]);
        assert_eq!(groups[2].1, vec![3]);
    }

    #[test]
    fn mismatched_vector_count_is_rejected() {
        let result = FragmentStore::from_embedded(
            vec![fragment("a.txt", 1, "text")],
            vec![vec![0.0; 4], vec![0.0; 4]],
        );
        assert!(matches!(
            result,
            Err(RelevanceError::StoreMismatch {
                fragments: 1,
                vectors: 2
            })
        ));
    }

    #[tokio::test]
    async fn build_embeds_every_fragment() {
        let embedder = EmbeddingModel::stub_with_dimension(8);
        let fragments = vec![fragment("a.txt", 1, "alpha"), fragment("a.txt", 2, "beta")];
        let store = FragmentStore::build(fragments, &embedder).await.unwrap();
        assert_eq!(store.len(), 2);
        assert!(store.vectors().iter().all(|v| v.len() == 8));
    }
}
