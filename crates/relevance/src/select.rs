use crate::store::FragmentStore;
use std::cmp::Ordering;

/// One entry of a diversity selection.
#[derive(Debug, Clone, PartialEq)]
pub struct Selection {
    /// Extraction index of the chosen fragment
    pub index: usize,

    /// Cosine similarity against the intent vector
    pub similarity: f32,

    /// 1-based position in the final selection order
    pub rank: usize,
}

/// Pick up to `k` fragments with per-source coverage before repeats.
///
/// A plain top-k by score can collapse onto a single document whenever one
/// document's content sits uniformly closer to the intent. Selection runs in
/// two passes instead:
///
/// 1. source groups in first-encounter order each contribute their best
///    fragment (similarity descending, ties by ascending page then
///    extraction order) until `k` is reached or every source has one entry;
/// 2. remaining slots fill from the leftover pool in global
///    descending-similarity order with the same tie-break.
///
/// `rank` is the 1-based position in the resulting order. `k = 0` and an
/// empty store yield an empty selection; `k >= len` returns every fragment
/// ranked by the same rule.
#[must_use]
pub fn select_diverse(store: &FragmentStore, scores: &[f32], k: usize) -> Vec<Selection> {
    if k == 0 || store.is_empty() {
        return Vec::new();
    }

    let mut selected: Vec<usize> = Vec::with_capacity(k.min(store.len()));
    let mut taken = vec![false; store.len()];

    // Pass 1: coverage. Every source gets a chance to contribute before any
    // source gets a second entry.
    for (_, indices) in store.source_groups() {
        if selected.len() >= k {
            break;
        }
        let mut group = indices;
        group.sort_by(|&a, &b| prefer(store, scores, a, b));
        if let Some(&best) = group.first() {
            selected.push(best);
            taken[best] = true;
        }
    }

    // Pass 2: fill. Second-best fragments compete on raw score.
    if selected.len() < k {
        let mut pool: Vec<usize> = (0..store.len()).filter(|&idx| !taken[idx]).collect();
        pool.sort_by(|&a, &b| prefer(store, scores, a, b));
        for idx in pool {
            if selected.len() >= k {
                break;
            }
            selected.push(idx);
        }
    }

    selected
        .into_iter()
        .enumerate()
        .map(|(pos, index)| Selection {
            index,
            similarity: scores.get(index).copied().unwrap_or(0.0),
            rank: pos + 1,
        })
        .collect()
}

/// Deterministic preference order: similarity descending, then ascending
/// page number, then extraction order.
fn prefer(store: &FragmentStore, scores: &[f32], a: usize, b: usize) -> Ordering {
    let score_a = scores.get(a).copied().unwrap_or(0.0);
    let score_b = scores.get(b).copied().unwrap_or(0.0);
    score_b
        .total_cmp(&score_a)
        .then_with(|| {
            store
                .fragment(a)
                .page_number
                .cmp(&store.fragment(b).page_number)
        })
        .then_with(|| a.cmp(&b))
}
