//! Course recommendations for missing skills

use crate::matching::scoring::round2;
use crate::matching::skills::fuzzy_skill_match;
use crate::models::Course;
use serde::{Deserialize, Serialize};

/// A course enriched with how many missing skills it addresses. Computed per
/// request, never persisted.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CourseRecommendation {
    pub course: Course,
    pub relevance_score: usize,
    pub relevance_percentage: f32,
}

/// Ranks a course catalog against a set of missing skills.
#[derive(Debug, Clone)]
pub struct CourseRecommender {
    max_recommendations: usize,
}

impl Default for CourseRecommender {
    fn default() -> Self {
        Self::new(3)
    }
}

impl CourseRecommender {
    pub fn new(max_recommendations: usize) -> Self {
        Self {
            max_recommendations,
        }
    }

    /// Relevance is the count of missing skills that fuzzy-match any of the
    /// course's skill tags. Zero-relevance courses are dropped, the rest are
    /// ranked by relevance descending and truncated. An empty missing-skill
    /// list short-circuits to no recommendations.
    pub fn recommend(
        &self,
        missing_skills: &[String],
        courses: &[Course],
    ) -> Vec<CourseRecommendation> {
        if missing_skills.is_empty() {
            return Vec::new();
        }

        let mut recommendations: Vec<CourseRecommendation> = courses
            .iter()
            .filter_map(|course| {
                let relevance_score = missing_skills
                    .iter()
                    .filter(|missing| {
                        course
                            .skill_tags
                            .iter()
                            .any(|tag| fuzzy_skill_match(missing, tag))
                    })
                    .count();

                if relevance_score == 0 {
                    return None;
                }

                Some(CourseRecommendation {
                    course: course.clone(),
                    relevance_score,
                    relevance_percentage: round2(
                        relevance_score as f32 / missing_skills.len() as f32 * 100.0,
                    ),
                })
            })
            .collect();

        recommendations.sort_by(|a, b| b.relevance_score.cmp(&a.relevance_score));
        recommendations.truncate(self.max_recommendations);
        recommendations
    }
}
