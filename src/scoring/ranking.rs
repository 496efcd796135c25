use std::cmp::Ordering;

use super::MatchResult;

/// Best match first; equal scores fall back to `job_id` ascending.
pub fn rank(mut results: Vec<MatchResult>) -> Vec<MatchResult> {
    results.sort_by(|a, b| {
        b.match_score
            .partial_cmp(&a.match_score)
            .unwrap_or(Ordering::Equal)
            .then_with(|| a.job_id.cmp(&b.job_id))
    });
    results
}

/// Keep the `top_k` best results.
pub fn top_k(results: Vec<MatchResult>, top_k: usize) -> Vec<MatchResult> {
    let mut ranked = rank(results);
    ranked.truncate(top_k);
    ranked
}
