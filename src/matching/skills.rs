//! Skill gap analysis and category assignment

use aho_corasick::AhoCorasick;
use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Result of comparing candidate skills against a required-skill list.
/// `matched` and `missing` partition the required list: together they cover
/// it, and no skill appears in both.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SkillGapResult {
    pub missing_skills: Vec<String>,
    pub matched_skills: Vec<String>,
    pub match_percentage: f32,
}

/// Fixed category enumeration. The derived `Ord` is the assignment order:
/// first category whose rule matches wins, and map iteration follows it.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(rename_all = "snake_case")]
pub enum SkillCategory {
    Programming,
    WebDevelopment,
    DataScience,
    CloudDevops,
    Databases,
    Mobile,
    AiMl,
    Other,
}

impl SkillCategory {
    /// Every category in enumeration order, `Other` last.
    pub const ALL: [SkillCategory; 8] = [
        SkillCategory::Programming,
        SkillCategory::WebDevelopment,
        SkillCategory::DataScience,
        SkillCategory::CloudDevops,
        SkillCategory::Databases,
        SkillCategory::Mobile,
        SkillCategory::AiMl,
        SkillCategory::Other,
    ];
}

struct CategoryRule {
    category: SkillCategory,
    matcher: AhoCorasick,
}

/// Ordered rule table for category assignment. Each rule fires when any of
/// its representative keywords appears inside the skill string.
static CATEGORY_RULES: Lazy<Vec<CategoryRule>> = Lazy::new(|| {
    let tables: [(SkillCategory, &[&str]); 7] = [
        (
            SkillCategory::Programming,
            &["python", "java", "javascript", "typescript", "c++", "c#", "go", "rust"],
        ),
        (
            SkillCategory::WebDevelopment,
            &["react", "angular", "vue", "html", "css", "node.js", "express"],
        ),
        (
            SkillCategory::DataScience,
            &["python", "r", "sql", "pandas", "numpy", "tensorflow", "pytorch", "scikit-learn"],
        ),
        (
            SkillCategory::CloudDevops,
            &["aws", "azure", "gcp", "docker", "kubernetes", "terraform", "jenkins"],
        ),
        (
            SkillCategory::Databases,
            &["mysql", "postgresql", "mongodb", "redis", "elasticsearch", "sqlite"],
        ),
        (
            SkillCategory::Mobile,
            &["swift", "kotlin", "react native", "flutter", "ios", "android"],
        ),
        (
            SkillCategory::AiMl,
            &["machine learning", "deep learning", "nlp", "computer vision", "tensorflow", "pytorch"],
        ),
    ];

    tables
        .into_iter()
        .map(|(category, keywords)| CategoryRule {
            category,
            matcher: AhoCorasick::builder()
                .ascii_case_insensitive(true)
                .build(keywords)
                .expect("static keyword table builds"),
        })
        .collect()
});

/// Containment-either-direction fuzzy match, case-insensitive. A deliberately
/// generous policy: "java" satisfies "javascript" and vice versa. Abbreviations
/// that are not contiguous substrings ("js" for "javascript") do not match,
/// and very short tokens like "r" false-positive against almost anything.
pub fn fuzzy_skill_match(a: &str, b: &str) -> bool {
    let a = a.to_lowercase();
    let b = b.to_lowercase();
    a.contains(&b) || b.contains(&a)
}

/// Set-comparison over skill lists: gap detection and categorization.
#[derive(Debug, Default, Clone)]
pub struct SkillGapAnalyzer;

impl SkillGapAnalyzer {
    pub fn new() -> Self {
        Self
    }

    /// Partition `required_skills` into matched and missing against the
    /// candidate's skills. A required skill is satisfied if any candidate
    /// skill contains it or is contained by it, ignoring case. The match
    /// percentage is 0 when the required list is empty.
    pub fn find_skill_gaps(
        &self,
        candidate_skills: &[String],
        required_skills: &[String],
    ) -> SkillGapResult {
        let candidates: Vec<String> = candidate_skills
            .iter()
            .map(|s| s.to_lowercase())
            .collect();

        // Candidate-inside-required direction via one automaton pass;
        // the reverse direction is a contains scan per pair.
        let candidate_matcher = AhoCorasick::new(&candidates).ok();

        let mut missing_skills = Vec::new();
        let mut matched_skills = Vec::new();

        for required in required_skills {
            let required_lower = required.to_lowercase();
            let satisfied = candidate_matcher
                .as_ref()
                .map(|m| m.is_match(required_lower.as_str()))
                .unwrap_or(false)
                || candidates.iter().any(|c| c.contains(&required_lower));

            if satisfied {
                matched_skills.push(required.clone());
            } else {
                missing_skills.push(required.clone());
            }
        }

        let match_percentage = if required_skills.is_empty() {
            0.0
        } else {
            let matched = (required_skills.len() - missing_skills.len()) as f32;
            crate::matching::scoring::round2(matched / required_skills.len() as f32 * 100.0)
        };

        SkillGapResult {
            missing_skills,
            matched_skills,
            match_percentage,
        }
    }

    /// Assign each skill to exactly one category: the first rule in the
    /// fixed enumeration order whose keyword list substring-matches the
    /// skill. Unmatched skills land in `Other`. Every category is present
    /// in the result, empty or not.
    pub fn categorize_skills(&self, skills: &[String]) -> BTreeMap<SkillCategory, Vec<String>> {
        let mut categorized: BTreeMap<SkillCategory, Vec<String>> = SkillCategory::ALL
            .iter()
            .map(|c| (*c, Vec::new()))
            .collect();

        for skill in skills {
            let category = CATEGORY_RULES
                .iter()
                .find(|rule| rule.matcher.is_match(skill.as_str()))
                .map(|rule| rule.category)
                .unwrap_or(SkillCategory::Other);

            categorized
                .get_mut(&category)
                .expect("all categories pre-seeded")
                .push(skill.clone());
        }

        categorized
    }
}
