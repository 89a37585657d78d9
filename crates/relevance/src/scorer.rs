use docmind_embedding::EmbeddingModel;
use ndarray::{Array2, ArrayView1, Axis};

/// Cosine similarity of one query vector against a set of vectors, computed
/// as a single matrix-vector pass.
///
/// Degenerate inputs never fault: a zero-norm query, a zero-norm row, or a
/// row whose length does not match the query all score 0.0. The output is
/// parallel to `vectors` and deterministic for identical inputs.
#[must_use]
pub fn cosine_scores(query: &[f32], vectors: &[Vec<f32>]) -> Vec<f32> {
    if vectors.is_empty() {
        return Vec::new();
    }

    let dim = query.len();
    let query_norm = query.iter().map(|v| v * v).sum::<f32>().sqrt();
    let ragged = vectors.iter().any(|v| v.len() != dim);
    if query_norm == 0.0 || dim == 0 || ragged {
        // Fall back to the scalar path, which handles every degenerate case.
        return vectors
            .iter()
            .map(|v| EmbeddingModel::cosine_similarity(query, v))
            .collect();
    }

    let flat: Vec<f32> = vectors.iter().flat_map(|v| v.iter().copied()).collect();
    let matrix =
        Array2::from_shape_vec((vectors.len(), dim), flat).expect("row-major shape matches input");
    let query_view = ArrayView1::from(query);

    let dots = matrix.dot(&query_view);
    let norms = matrix.map_axis(Axis(1), |row| row.dot(&row).sqrt());

    dots.iter()
        .zip(norms.iter())
        .map(|(dot, norm)| {
            if *norm == 0.0 {
                0.0
            } else {
                dot / (norm * query_norm)
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn matches_pairwise_scalar_results() {
        let query = vec![0.2, -0.4, 0.9];
        let vectors = vec![
            vec![1.0, 0.0, 0.0],
            vec![-0.5, 0.5, 0.7],
            vec![0.2, -0.4, 0.9],
        ];

        let batched = cosine_scores(&query, &vectors);
        for (vector, score) in vectors.iter().zip(&batched) {
            let scalar = EmbeddingModel::cosine_similarity(&query, vector);
            assert!((score - scalar).abs() < 1e-6, "{score} vs {scalar}");
        }
        assert!((batched[2] - 1.0).abs() < 1e-6);
    }

    #[test]
    fn zero_norm_query_scores_zero() {
        let scores = cosine_scores(&[0.0, 0.0], &[vec![1.0, 2.0], vec![3.0, 4.0]]);
        assert_eq!(scores, vec![0.0, 0.0]);
    }

    #[test]
    fn zero_norm_row_scores_zero() {
        let scores = cosine_scores(&[1.0, 0.0], &[vec![0.0, 0.0], vec![1.0, 0.0]]);
        assert_eq!(scores[0], 0.0);
        assert!((scores[1] - 1.0).abs() < 1e-6);
    }

    #[test]
    fn mismatched_row_length_scores_zero() {
        let scores = cosine_scores(&[1.0, 0.0], &[vec![1.0, 0.0, 0.0], vec![1.0, 0.0]]);
        assert_eq!(scores[0], 0.0);
        assert!((scores[1] - 1.0).abs() < 1e-6);
    }

    #[test]
    fn empty_input_yields_empty_output() {
        assert!(cosine_scores(&[1.0, 0.0], &[]).is_empty());
    }
}
