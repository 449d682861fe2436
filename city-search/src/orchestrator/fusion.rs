//! Rank fusion of vector and text signals.
//!
//! Formula:
//!
//! ```text
//! vector_score = 1 - vector_distance                       (0 when absent)
//! text_score   = min(log10(text_match) / divisor, 1.0)     (0 when absent or <= 0)
//! score        = vector_weight * vector_score + text_weight * text_score
//! ```
//!
//! The distance is trusted to be normalised to `[0, 1]` by the search
//! engine; it is not clamped here. With both components in their nominal
//! ranges and the default weights, the score lies in `[0, 1]`.

use crate::config::FusionWeights;
use crate::types::FusedCandidate;

/// Vector component: `1 - distance`, or 0 without a distance.
pub fn vector_score(distance: Option<f32>) -> f64 {
    distance.map_or(0.0, |d| 1.0 - f64::from(d))
}

/// Text component: `log10(score) / divisor`, capped at 1.0.
///
/// Non-positive and absent scores contribute 0.
pub fn text_score(text_match: Option<i64>, divisor: f64) -> f64 {
    match text_match {
        Some(s) if s > 0 => ((s as f64).log10() / divisor).min(1.0),
        _ => 0.0,
    }
}

/// Compute the fusion score of a candidate.
pub fn fuse(candidate: &FusedCandidate, weights: &FusionWeights) -> f64 {
    weights.vector_weight * vector_score(candidate.vector_distance)
        + weights.text_weight * text_score(candidate.text_match, weights.text_log_divisor)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn candidate(distance: Option<f32>, text: Option<i64>) -> FusedCandidate {
        FusedCandidate {
            id: 1,
            vector_distance: distance,
            text_match: text,
            rank_fusion_score: None,
        }
    }

    fn score(distance: Option<f32>, text: Option<i64>) -> f64 {
        fuse(&candidate(distance, text), &FusionWeights::default())
    }

    #[test]
    fn no_signals_scores_zero() {
        assert!(score(None, None).abs() < f64::EPSILON);
    }

    #[test]
    fn vector_only() {
        // 0.3 * (1 - 0.5)
        assert!((score(Some(0.5), None) - 0.15).abs() < 1e-9);
    }

    #[test]
    fn text_only() {
        // 0.7 * log10(1000) / 20 = 0.7 * 0.15
        assert!((score(None, Some(1_000)) - 0.105).abs() < 1e-9);
    }

    #[test]
    fn both_signals_add() {
        let expected = 0.3 * (1.0 - f64::from(0.1_f32)) + 0.7 * (3.0 / 20.0);
        assert!((score(Some(0.1), Some(1_000)) - expected).abs() < 1e-9);
    }

    #[test]
    fn non_positive_text_match_contributes_nothing() {
        assert!(text_score(Some(0), 20.0).abs() < f64::EPSILON);
        assert!(text_score(Some(-50), 20.0).abs() < f64::EPSILON);
        assert!(text_score(None, 20.0).abs() < f64::EPSILON);
    }

    #[test]
    fn text_match_of_one_scores_zero() {
        assert!(text_score(Some(1), 20.0).abs() < f64::EPSILON);
    }

    #[test]
    fn text_score_clamped_at_one() {
        assert!((text_score(Some(i64::MAX), 1.0) - 1.0).abs() < f64::EPSILON);
        assert!((text_score(Some(i64::MAX), 20.0) - 1.0).abs() > f64::EPSILON);
    }

    #[test]
    fn decreasing_distance_strictly_increases_score() {
        let distances = [0.9_f32, 0.7, 0.5, 0.3, 0.1, 0.0];
        for text in [None, Some(10), Some(1_000_000)] {
            let scores: Vec<f64> = distances.iter().map(|&d| score(Some(d), text)).collect();
            for i in 1..scores.len() {
                assert!(scores[i] > scores[i - 1], "not monotonic at {i} for {text:?}");
            }
        }
    }

    #[test]
    fn increasing_text_match_strictly_increases_score_below_clamp() {
        let texts = [2_i64, 10, 1_000, 1_000_000, 1_000_000_000_000];
        for distance in [None, Some(0.2_f32)] {
            let scores: Vec<f64> = texts.iter().map(|&t| score(distance, Some(t))).collect();
            for i in 1..scores.len() {
                assert!(scores[i] > scores[i - 1], "not monotonic at {i}");
            }
        }
    }

    #[test]
    fn score_within_unit_range_for_nominal_inputs() {
        for d in [0.0_f32, 0.25, 0.5, 0.75, 1.0] {
            for t in [None, Some(1), Some(100), Some(i64::MAX)] {
                let s = score(Some(d), t);
                assert!((0.0..=1.0).contains(&s), "score {s} out of range");
            }
        }
    }

    #[test]
    fn custom_weights_respected() {
        let weights = FusionWeights {
            vector_weight: 1.0,
            text_weight: 0.0,
            text_log_divisor: 20.0,
        };
        let s = fuse(&candidate(Some(0.25), Some(1_000)), &weights);
        assert!((s - 0.75).abs() < 1e-9);
    }

    #[test]
    fn fusion_is_deterministic() {
        let c = candidate(Some(0.42), Some(123_456));
        let w = FusionWeights::default();
        assert!((fuse(&c, &w) - fuse(&c, &w)).abs() < f64::EPSILON);
    }
}
