//! Percentile threshold helper for turning raw scores into a binary
//! anomaly/not-anomaly call, the way the reference driver picks a cutoff
//! from the sorted score distribution.

/// Returns `sorted_scores[floor(len * percentile / 100)]`.
///
/// `percentile` is clamped to `[0, 100]`; an empty `scores` returns `0.0`.
pub fn threshold(scores: &[f64], percentile: f64) -> f64 {
    if scores.is_empty() {
        return 0.0;
    }
    let percentile = percentile.clamp(0.0, 100.0);
    let mut sorted = scores.to_vec();
    sorted.sort_by(|a, b| a.total_cmp(b));
    let index = ((sorted.len() as f64) * percentile / 100.0).floor() as usize;
    sorted[index.min(sorted.len() - 1)]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn threshold_picks_the_requested_percentile() {
        let scores = vec![1.0, 2.0, 3.0, 4.0, 5.0];
        assert_eq!(threshold(&scores, 0.0), 1.0);
        assert_eq!(threshold(&scores, 100.0), 5.0);
        assert_eq!(threshold(&scores, 60.0), 4.0);
    }

    #[test]
    fn threshold_of_empty_scores_is_zero() {
        assert_eq!(threshold(&[], 90.0), 0.0);
    }
}
