//! Near-duplicate chunk removal

use crate::types::RetrievedChunk;
use std::collections::HashMap;

/// Token Jaccard similarity between two texts.
///
/// Lower-cased, whitespace-tokenized, repeated tokens counted:
/// sum(min counts) / sum(max counts). Counting repeats keeps boilerplate-
/// heavy prose ("the ... the ...") from slipping under the threshold.
pub fn jaccard_similarity(a: &str, b: &str) -> f32 {
    let counts_a = token_counts(a);
    let counts_b = token_counts(b);

    if counts_a.is_empty() || counts_b.is_empty() {
        return 0.0;
    }

    let mut intersection = 0usize;
    let mut union = 0usize;

    for (token, &count_a) in &counts_a {
        let count_b = counts_b.get(token).copied().unwrap_or(0);
        intersection += count_a.min(count_b);
        union += count_a.max(count_b);
    }
    for (token, &count_b) in &counts_b {
        if !counts_a.contains_key(token) {
            union += count_b;
        }
    }

    intersection as f32 / union as f32
}

fn token_counts(text: &str) -> HashMap<String, usize> {
    let mut counts = HashMap::new();
    for token in text.to_lowercase().split_whitespace() {
        *counts.entry(token.to_string()).or_insert(0) += 1;
    }
    counts
}

/// Remove near-duplicate chunks, preserving order.
///
/// Greedy: the first chunk is always kept; each later chunk is compared
/// against every chunk already kept and dropped when its similarity exceeds
/// the threshold. O(n^2), but candidate counts are bounded by the fetch
/// count (at most 100).
pub fn dedupe_chunks(chunks: Vec<RetrievedChunk>, threshold: f32) -> Vec<RetrievedChunk> {
    let mut unique: Vec<RetrievedChunk> = Vec::with_capacity(chunks.len());

    for chunk in chunks {
        let is_duplicate = unique
            .iter()
            .any(|kept| jaccard_similarity(&chunk.text, &kept.text) > threshold);
        if !is_duplicate {
            unique.push(chunk);
        }
    }

    unique
}

#[cfg(test)]
mod tests {
    use super::*;

    fn chunk(text: &str, score: f32) -> RetrievedChunk {
        RetrievedChunk {
            text: text.to_string(),
            score,
            source: None,
        }
    }

    #[test]
    fn test_jaccard_identical() {
        assert!((jaccard_similarity("a b c", "c b a") - 1.0).abs() < 1e-6);
    }

    #[test]
    fn test_jaccard_disjoint() {
        assert_eq!(jaccard_similarity("a b", "c d"), 0.0);
    }

    #[test]
    fn test_jaccard_empty() {
        assert_eq!(jaccard_similarity("", "a b"), 0.0);
        assert_eq!(jaccard_similarity("", ""), 0.0);
    }

    #[test]
    fn test_jaccard_counts_repeats() {
        // 6 of 7 counted tokens shared
        let sim = jaccard_similarity(
            "The cat sat on the mat",
            "The cat sat on the mat today",
        );
        assert!((sim - 6.0 / 7.0).abs() < 1e-6);
    }

    #[test]
    fn test_near_duplicate_pair_collapses() {
        let chunks = vec![
            chunk("The cat sat on the mat", 0.9),
            chunk("The cat sat on the mat today", 0.8),
            chunk("Completely different text", 0.7),
        ];

        let unique = dedupe_chunks(chunks, 0.85);
        assert_eq!(unique.len(), 2);
        assert_eq!(unique[0].text, "The cat sat on the mat");
        assert_eq!(unique[1].text, "Completely different text");
    }

    #[test]
    fn test_order_preserved() {
        let chunks = vec![chunk("alpha beta", 0.5), chunk("gamma delta", 0.9)];
        let unique = dedupe_chunks(chunks, 0.85);
        assert_eq!(unique[0].text, "alpha beta");
        assert_eq!(unique[1].text, "gamma delta");
    }

    #[test]
    fn test_empty_input() {
        assert!(dedupe_chunks(vec![], 0.85).is_empty());
    }
}
