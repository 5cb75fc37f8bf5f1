/// Encode an embedding as a BLOB (little-endian f32 array)
pub fn encode_embedding(embedding: &[f32]) -> Vec<u8> {
    embedding.iter().flat_map(|f| f.to_le_bytes()).collect()
}

/// Parse an embedding BLOB back to `Vec<f32>`
///
/// Returns `None` when the BLOB length is not a multiple of 4.
pub fn parse_embedding(blob: &[u8]) -> Option<Vec<f32>> {
    if blob.len() % 4 != 0 {
        return None;
    }

    blob.chunks(4)
        .map(|bytes| {
            let arr: [u8; 4] = bytes.try_into().ok()?;
            Some(f32::from_le_bytes(arr))
        })
        .collect()
}

/// Compute cosine similarity between two vectors
///
/// Returns 0.0 if either vector has zero magnitude or the lengths differ.
pub fn cosine_similarity(a: &[f32], b: &[f32]) -> f32 {
    if a.len() != b.len() {
        return 0.0;
    }

    let dot: f32 = a.iter().zip(b.iter()).map(|(x, y)| x * y).sum();
    let mag_a: f32 = a.iter().map(|x| x * x).sum::<f32>().sqrt();
    let mag_b: f32 = b.iter().map(|x| x * x).sum::<f32>().sqrt();

    if mag_a == 0.0 || mag_b == 0.0 {
        return 0.0;
    }

    dot / (mag_a * mag_b)
}

/// Order scored candidates best-first: score descending, then id ascending so
/// equal scores always come back in the same order. Non-finite scores are
/// dropped.
pub fn rank_top_k<'a>(mut scored: Vec<(f32, &'a str)>, k: usize) -> Vec<(f32, &'a str)> {
    scored.retain(|(score, _)| score.is_finite());
    scored.sort_by(|a, b| b.0.total_cmp(&a.0).then_with(|| a.1.cmp(b.1)));
    scored.truncate(k);
    scored
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cosine_similarity_identical() {
        let a = vec![1.0, 0.0, 0.0];
        assert!((cosine_similarity(&a, &a) - 1.0).abs() < 1e-6);
    }

    #[test]
    fn test_cosine_similarity_orthogonal() {
        let a = vec![1.0, 0.0, 0.0];
        let b = vec![0.0, 1.0, 0.0];
        assert!(cosine_similarity(&a, &b).abs() < 1e-6);
    }

    #[test]
    fn test_cosine_similarity_opposite() {
        let a = vec![1.0, 0.0, 0.0];
        let b = vec![-1.0, 0.0, 0.0];
        assert!((cosine_similarity(&a, &b) + 1.0).abs() < 1e-6);
    }

    #[test]
    fn test_cosine_similarity_zero_magnitude() {
        let a = vec![0.0, 0.0, 0.0];
        let b = vec![1.0, 0.0, 0.0];
        assert_eq!(cosine_similarity(&a, &b), 0.0);
    }

    #[test]
    fn test_cosine_similarity_length_mismatch() {
        assert_eq!(cosine_similarity(&[1.0, 0.0], &[1.0, 0.0, 0.0]), 0.0);
    }

    #[test]
    fn test_cosine_similarity_magnitude_independent() {
        let a = vec![1.0, 0.0, 0.0];
        let b = vec![2.0, 0.0, 0.0];
        assert!((cosine_similarity(&a, &b) - 1.0).abs() < 1e-6);
    }

    #[test]
    fn test_parse_embedding_valid() {
        let floats = vec![1.0f32, -2.5, 3.25, 4.0];
        let parsed = parse_embedding(&encode_embedding(&floats)).unwrap();
        assert_eq!(parsed, floats);
    }

    #[test]
    fn test_parse_embedding_invalid_length() {
        assert!(parse_embedding(&[0u8, 1, 2, 3, 4]).is_none());
    }

    #[test]
    fn test_parse_embedding_empty() {
        assert_eq!(parse_embedding(&[]), Some(vec![]));
    }

    #[test]
    fn test_rank_top_k_orders_and_truncates() {
        let scored = vec![(0.2, "c"), (0.9, "a"), (0.5, "b"), (0.1, "d")];
        let ranked = rank_top_k(scored, 3);
        let ids: Vec<&str> = ranked.iter().map(|(_, id)| *id).collect();
        assert_eq!(ids, vec!["a", "b", "c"]);
    }

    #[test]
    fn test_rank_top_k_ties_broken_by_id() {
        let scored = vec![(0.5, "doc_3_0"), (0.5, "doc_1_0"), (0.5, "doc_2_0")];
        let ranked = rank_top_k(scored, 10);
        let ids: Vec<&str> = ranked.iter().map(|(_, id)| *id).collect();
        assert_eq!(ids, vec!["doc_1_0", "doc_2_0", "doc_3_0"]);
    }

    #[test]
    fn test_rank_top_k_drops_non_finite_scores() {
        let scored: Vec<(f32, &str)> = (0..40)
            .map(|i| {
                let score = if i % 3 == 0 { f32::NAN } else { i as f32 / 40.0 };
                (score, if i % 2 == 0 { "even" } else { "odd" })
            })
            .chain([(f32::INFINITY, "inf"), (f32::NEG_INFINITY, "neg_inf")])
            .collect();
        let ranked = rank_top_k(scored, 100);
        assert_eq!(ranked.len(), 26);
        assert!(ranked.iter().all(|(score, _)| score.is_finite()));
        assert!((ranked[0].0 - 38.0 / 40.0).abs() < 1e-6);
    }

    #[test]
    fn test_rank_top_k_fewer_than_k() {
        assert_eq!(rank_top_k(vec![(0.3, "only")], 3).len(), 1);
        assert!(rank_top_k(Vec::new(), 3).is_empty());
    }
}
