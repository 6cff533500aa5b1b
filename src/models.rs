//! Entity records exchanged with the record store

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Employee {
    pub id: i64,
    pub name: String,
    pub skills: Vec<String>,
    pub preferences: Vec<String>,
    pub resume_text: String,
    /// Cached embedding; always exactly the configured dimension when present.
    pub embedding: Option<Vec<f32>>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Project {
    pub id: i64,
    pub title: String,
    pub required_skills: Vec<String>,
    pub team_size: u32,
    pub description: String,
    pub embedding: Option<Vec<f32>>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Course {
    pub id: i64,
    pub title: String,
    pub skill_tags: Vec<String>,
    pub provider: String,
    pub url: String,
    pub description: String,
}

/// Persisted outcome of one employee-project comparison. Unique on the
/// (employee_id, project_id) pair; recomputation overwrites, never duplicates.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MatchRecord {
    pub employee_id: i64,
    pub project_id: i64,
    pub similarity_score: f32,
    pub skill_match_percentage: f32,
    pub overall_score: f32,
    pub matched_skills: Vec<String>,
    pub missing_skills: Vec<String>,
    pub updated_at: DateTime<Utc>,
}

impl Employee {
    /// Canonical text representation the embedding is derived from.
    /// The format is stable: changing it invalidates every cached vector.
    pub fn embedding_text(&self) -> String {
        format!(
            "{} Skills: {} Resume: {}",
            self.name,
            self.skills.join(", "),
            self.resume_text
        )
    }
}

impl Project {
    pub fn embedding_text(&self) -> String {
        format!(
            "{} Required Skills: {} Description: {}",
            self.title,
            self.required_skills.join(", "),
            self.description
        )
    }
}
