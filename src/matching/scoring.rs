//! Weighted combination of similarity and skill-match scores

use serde::{Deserialize, Serialize};

/// Fixed-policy weights for the combined ranking score. Configurable, but
/// 60% similarity / 40% skill match is the default everywhere.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct ScoreWeights {
    pub similarity: f32,
    pub skill_match: f32,
}

impl Default for ScoreWeights {
    fn default() -> Self {
        Self {
            similarity: 0.6,
            skill_match: 0.4,
        }
    }
}

impl ScoreWeights {
    /// Combine a 0-100 similarity score and a 0-100 skill-match percentage
    /// into one 0-100 ranking score, rounded to two decimals.
    pub fn overall_score(&self, similarity_score: f32, skill_match_percentage: f32) -> f32 {
        round2(self.similarity * similarity_score + self.skill_match * skill_match_percentage)
    }
}

/// Two-decimal rounding applied to every score the engine exposes.
pub fn round2(value: f32) -> f32 {
    (value * 100.0).round() / 100.0
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_overall_score_bounds() {
        let weights = ScoreWeights::default();
        assert_eq!(weights.overall_score(0.0, 0.0), 0.0);
        assert_eq!(weights.overall_score(100.0, 100.0), 100.0);

        let mid = weights.overall_score(50.0, 80.0);
        assert!((0.0..=100.0).contains(&mid));
    }

    #[test]
    fn test_overall_score_weighting() {
        let weights = ScoreWeights::default();
        // 0.6 * 90 + 0.4 * 33.33 = 67.33 (two-decimal rounding)
        assert_eq!(weights.overall_score(90.0, 33.33), 67.33);
        assert_eq!(weights.overall_score(100.0, 0.0), 60.0);
        assert_eq!(weights.overall_score(0.0, 100.0), 40.0);
    }

    #[test]
    fn test_round2() {
        assert_eq!(round2(33.333_333), 33.33);
        assert_eq!(round2(66.666_6), 66.67);
        assert_eq!(round2(100.0), 100.0);
    }
}
