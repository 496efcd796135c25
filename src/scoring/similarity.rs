use std::collections::{BTreeMap, BTreeSet};

/// Cosine similarity of two term-count vectors over the union of their
/// vocabularies. Empty or zero-norm input scores 0.0.
pub fn cosine(a: &BTreeMap<String, u32>, b: &BTreeMap<String, u32>) -> f64 {
    if a.is_empty() || b.is_empty() {
        return 0.0;
    }

    let vocabulary: BTreeSet<&String> = a.keys().chain(b.keys()).collect();

    let mut dot = 0.0;
    let mut norm_a = 0.0;
    let mut norm_b = 0.0;
    for term in vocabulary {
        let x = a.get(term).copied().unwrap_or(0) as f64;
        let y = b.get(term).copied().unwrap_or(0) as f64;
        dot += x * y;
        norm_a += x * x;
        norm_b += y * y;
    }

    if norm_a == 0.0 || norm_b == 0.0 {
        return 0.0;
    }

    (dot / (norm_a.sqrt() * norm_b.sqrt())).clamp(0.0, 1.0)
}
