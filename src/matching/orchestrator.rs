//! Match orchestration: embeddings, k-NN retrieval, enrichment, persistence

use crate::config::Config;
use crate::error::{Result, TalentMatcherError};
use crate::matching::courses::{CourseRecommendation, CourseRecommender};
use crate::matching::embedding::{EmbeddingGenerator, HashEmbedder};
use crate::matching::index::{SimilarityIndex, EMPLOYEES_COLLECTION, PROJECTS_COLLECTION};
use crate::matching::scoring::ScoreWeights;
use crate::matching::skills::{SkillCategory, SkillGapAnalyzer, SkillGapResult};
use crate::models::{Employee, MatchRecord, Project};
use crate::store::RecordStore;
use chrono::Utc;
use log::{debug, info};
use serde::{Deserialize, Serialize};
use serde_json::json;
use std::collections::{BTreeMap, HashSet};
use std::sync::Arc;

/// A project candidate enriched with skill-gap data and a combined score.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProjectMatch {
    pub project_id: i64,
    pub title: String,
    pub description: String,
    pub team_size: u32,
    pub required_skills: Vec<String>,
    pub similarity_score: f32,
    pub skill_match_percentage: f32,
    pub matched_skills: Vec<String>,
    pub missing_skills: Vec<String>,
    pub overall_score: f32,
}

/// An employee candidate enriched with skill-gap data and a combined score.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EmployeeMatch {
    pub employee_id: i64,
    pub name: String,
    pub skills: Vec<String>,
    pub preferences: Vec<String>,
    pub similarity_score: f32,
    pub skill_match_percentage: f32,
    pub matched_skills: Vec<String>,
    pub missing_skills: Vec<String>,
    pub overall_score: f32,
}

/// Project the gap analysis was scoped to, when one was named.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GapReportScope {
    pub project_id: i64,
    pub project_title: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GapReport {
    pub employee_id: i64,
    pub scope: Option<GapReportScope>,
    pub skill_gap: SkillGapResult,
    pub recommended_courses: Vec<CourseRecommendation>,
    /// Present only for the general (all-projects) form of the report.
    pub skill_categories: Option<BTreeMap<SkillCategory, Vec<String>>>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SkillLevel {
    Junior,
    MidLevel,
    Senior,
    Expert,
}

/// A project whose skill-match percentage sits in the growth band: hard
/// enough to stretch the employee, close enough to be attainable.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GrowthProject {
    pub project_id: i64,
    pub title: String,
    pub description: String,
    pub skill_match_percentage: f32,
    pub missing_skills: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CareerSuggestions {
    pub current_level: SkillLevel,
    pub skill_categories: BTreeMap<SkillCategory, Vec<String>>,
    pub current_matches: Vec<ProjectMatch>,
    pub skill_gaps: SkillGapResult,
    pub recommended_courses: Vec<CourseRecommendation>,
    pub growth_projects: Vec<GrowthProject>,
    pub career_trajectories: Vec<String>,
}

struct TrajectoryRule {
    category: SkillCategory,
    min_count: usize,
    /// When set, the rule only fires if the category is the dominant one
    /// (highest skill count, ties by enumeration order).
    dominant_only: bool,
    path: &'static str,
}

/// Fixed, inspectable trajectory rule table. Deterministic lookup, not
/// generation; every fired rule contributes its path, in table order.
const TRAJECTORY_RULES: &[TrajectoryRule] = &[
    TrajectoryRule {
        category: SkillCategory::Programming,
        min_count: 4,
        dominant_only: true,
        path: "Software Engineer → Senior Software Engineer → Tech Lead",
    },
    TrajectoryRule {
        category: SkillCategory::DataScience,
        min_count: 3,
        dominant_only: false,
        path: "Data Analyst → Data Scientist → ML Engineer",
    },
    TrajectoryRule {
        category: SkillCategory::WebDevelopment,
        min_count: 3,
        dominant_only: false,
        path: "Frontend Developer → Full-stack Developer → Solutions Architect",
    },
    TrajectoryRule {
        category: SkillCategory::CloudDevops,
        min_count: 3,
        dominant_only: false,
        path: "DevOps Engineer → Cloud Architect → Platform Engineer",
    },
];

const FALLBACK_TRAJECTORY: &str = "General Developer → Specialized Developer → Technical Lead";

/// Coordinates the embedding generator, similarity index, skill analyzer and
/// record store for one process. Explicitly constructed; callers share it by
/// reference instead of reaching for a global.
pub struct TalentMatcher {
    store: Arc<dyn RecordStore>,
    index: Arc<SimilarityIndex>,
    embedder: Box<dyn EmbeddingGenerator>,
    analyzer: SkillGapAnalyzer,
    recommender: CourseRecommender,
    weights: ScoreWeights,
    config: Config,
}

impl TalentMatcher {
    pub fn new(
        store: Arc<dyn RecordStore>,
        index: Arc<SimilarityIndex>,
        embedder: Box<dyn EmbeddingGenerator>,
        config: Config,
    ) -> Self {
        let weights = ScoreWeights {
            similarity: config.scoring.similarity_weight,
            skill_match: config.scoring.skill_match_weight,
        };
        let recommender = CourseRecommender::new(config.matching.max_course_recommendations);

        Self {
            store,
            index,
            embedder,
            analyzer: SkillGapAnalyzer::new(),
            recommender,
            weights,
            config,
        }
    }

    /// Fresh index, hash embedder and default config around the given store.
    pub fn with_defaults(store: Arc<dyn RecordStore>) -> Self {
        let config = Config::default();
        let embedder = Box::new(HashEmbedder::new(config.embedding.dimension));
        Self::new(store, Arc::new(SimilarityIndex::new()), embedder, config)
    }

    pub fn index_handle(&self) -> Arc<SimilarityIndex> {
        Arc::clone(&self.index)
    }

    /// Ensure the employee has a persisted embedding and an index entry.
    /// Lazy and memoizing: the hash runs at most once per entity per
    /// mutation, and an existing vector with a missing index entry is
    /// repaired by an idempotent re-upsert rather than recomputed.
    pub fn index_employee(&self, employee: &Employee) -> Result<Vec<f32>> {
        let metadata = json!({ "name": employee.name, "skills": employee.skills });

        if let Some(embedding) = &employee.embedding {
            if !self.index.contains(EMPLOYEES_COLLECTION, employee.id) {
                self.index
                    .upsert(EMPLOYEES_COLLECTION, employee.id, embedding.clone(), metadata);
            }
            return Ok(embedding.clone());
        }

        debug!("generating embedding for employee {}", employee.id);
        let embedding = self.embedder.embed(&employee.embedding_text());
        self.store
            .update_employee_embedding(employee.id, embedding.clone())?;
        self.index
            .upsert(EMPLOYEES_COLLECTION, employee.id, embedding.clone(), metadata);
        Ok(embedding)
    }

    /// Project counterpart of [`TalentMatcher::index_employee`].
    pub fn index_project(&self, project: &Project) -> Result<Vec<f32>> {
        let metadata = json!({ "title": project.title, "required_skills": project.required_skills });

        if let Some(embedding) = &project.embedding {
            if !self.index.contains(PROJECTS_COLLECTION, project.id) {
                self.index
                    .upsert(PROJECTS_COLLECTION, project.id, embedding.clone(), metadata);
            }
            return Ok(embedding.clone());
        }

        debug!("generating embedding for project {}", project.id);
        let embedding = self.embedder.embed(&project.embedding_text());
        self.store
            .update_project_embedding(project.id, embedding.clone())?;
        self.index
            .upsert(PROJECTS_COLLECTION, project.id, embedding.clone(), metadata);
        Ok(embedding)
    }

    /// Index every project the store knows about. Entity creation normally
    /// feeds the index one entity at a time; this is the bulk form for
    /// startup or recovery.
    pub fn index_all_projects(&self) -> Result<usize> {
        let projects = self.store.all_projects()?;
        let count = projects.len();
        for project in &projects {
            self.index_project(project)?;
        }
        Ok(count)
    }

    /// Rank the best project matches for an employee. `NotFound` if the
    /// employee is absent; candidates whose backing record has disappeared
    /// are dropped silently.
    pub fn match_employee_to_projects(
        &self,
        employee_id: i64,
        top_k: usize,
    ) -> Result<Vec<ProjectMatch>> {
        let employee = self
            .store
            .get_employee(employee_id)?
            .ok_or_else(|| TalentMatcherError::employee_not_found(employee_id))?;

        let embedding = self.index_employee(&employee)?;
        let hits = self.index.query(PROJECTS_COLLECTION, &embedding, top_k)?;
        info!(
            "matching employee {} against {} project candidates",
            employee_id,
            hits.len()
        );

        let mut matches = Vec::with_capacity(hits.len());
        for hit in hits {
            let Some(project) = self.store.get_project(hit.entity_id)? else {
                continue;
            };

            let gap = self
                .analyzer
                .find_skill_gaps(&employee.skills, &project.required_skills);
            let overall_score = self
                .weights
                .overall_score(hit.similarity_score, gap.match_percentage);

            self.store.upsert_match_record(MatchRecord {
                employee_id,
                project_id: project.id,
                similarity_score: hit.similarity_score,
                skill_match_percentage: gap.match_percentage,
                overall_score,
                matched_skills: gap.matched_skills.clone(),
                missing_skills: gap.missing_skills.clone(),
                updated_at: Utc::now(),
            })?;

            matches.push(ProjectMatch {
                project_id: project.id,
                title: project.title,
                description: project.description,
                team_size: project.team_size,
                required_skills: project.required_skills,
                similarity_score: hit.similarity_score,
                skill_match_percentage: gap.match_percentage,
                matched_skills: gap.matched_skills,
                missing_skills: gap.missing_skills,
                overall_score,
            });
        }

        // Overall score descending; equal scores fall back to id ascending
        // so rankings are reproducible.
        matches.sort_by(|a, b| {
            b.overall_score
                .partial_cmp(&a.overall_score)
                .unwrap_or(std::cmp::Ordering::Equal)
                .then(a.project_id.cmp(&b.project_id))
        });
        matches.truncate(top_k);
        Ok(matches)
    }

    /// Rank the best employee matches for a project. Symmetric to
    /// [`TalentMatcher::match_employee_to_projects`], including match-history
    /// persistence for every enriched pair.
    pub fn match_project_to_employees(
        &self,
        project_id: i64,
        top_k: usize,
    ) -> Result<Vec<EmployeeMatch>> {
        let project = self
            .store
            .get_project(project_id)?
            .ok_or_else(|| TalentMatcherError::project_not_found(project_id))?;

        let embedding = self.index_project(&project)?;
        let hits = self.index.query(EMPLOYEES_COLLECTION, &embedding, top_k)?;
        info!(
            "matching project {} against {} employee candidates",
            project_id,
            hits.len()
        );

        let mut matches = Vec::with_capacity(hits.len());
        for hit in hits {
            let Some(employee) = self.store.get_employee(hit.entity_id)? else {
                continue;
            };

            let gap = self
                .analyzer
                .find_skill_gaps(&employee.skills, &project.required_skills);
            let overall_score = self
                .weights
                .overall_score(hit.similarity_score, gap.match_percentage);

            self.store.upsert_match_record(MatchRecord {
                employee_id: employee.id,
                project_id,
                similarity_score: hit.similarity_score,
                skill_match_percentage: gap.match_percentage,
                overall_score,
                matched_skills: gap.matched_skills.clone(),
                missing_skills: gap.missing_skills.clone(),
                updated_at: Utc::now(),
            })?;

            matches.push(EmployeeMatch {
                employee_id: employee.id,
                name: employee.name,
                skills: employee.skills,
                preferences: employee.preferences,
                similarity_score: hit.similarity_score,
                skill_match_percentage: gap.match_percentage,
                matched_skills: gap.matched_skills,
                missing_skills: gap.missing_skills,
                overall_score,
            });
        }

        matches.sort_by(|a, b| {
            b.overall_score
                .partial_cmp(&a.overall_score)
                .unwrap_or(std::cmp::Ordering::Equal)
                .then(a.employee_id.cmp(&b.employee_id))
        });
        matches.truncate(top_k);
        Ok(matches)
    }

    /// Gap analysis for one employee, scoped to a project's required skills
    /// or, when no project is named, to the deduplicated union of required
    /// skills across every known project.
    pub fn analyze_skill_gaps(
        &self,
        employee_id: i64,
        project_id: Option<i64>,
    ) -> Result<GapReport> {
        let employee = self
            .store
            .get_employee(employee_id)?
            .ok_or_else(|| TalentMatcherError::employee_not_found(employee_id))?;

        match project_id {
            Some(project_id) => {
                let project = self
                    .store
                    .get_project(project_id)?
                    .ok_or_else(|| TalentMatcherError::project_not_found(project_id))?;

                let skill_gap = self
                    .analyzer
                    .find_skill_gaps(&employee.skills, &project.required_skills);
                let recommended_courses = self.recommend_courses(&skill_gap.missing_skills)?;

                Ok(GapReport {
                    employee_id,
                    scope: Some(GapReportScope {
                        project_id,
                        project_title: project.title,
                    }),
                    skill_gap,
                    recommended_courses,
                    skill_categories: None,
                })
            }
            None => {
                let mut seen = HashSet::new();
                let mut all_required = Vec::new();
                for project in self.store.all_projects()? {
                    for skill in project.required_skills {
                        if seen.insert(skill.to_lowercase()) {
                            all_required.push(skill);
                        }
                    }
                }

                let skill_gap = self.analyzer.find_skill_gaps(&employee.skills, &all_required);
                let recommended_courses = self.recommend_courses(&skill_gap.missing_skills)?;

                Ok(GapReport {
                    employee_id,
                    scope: None,
                    skill_gap,
                    recommended_courses,
                    skill_categories: Some(self.analyzer.categorize_skills(&employee.skills)),
                })
            }
        }
    }

    /// Composite career view: categorization, current standing, growth
    /// projects and trajectory suggestions from the fixed rule table.
    pub fn career_path_suggestions(&self, employee_id: i64) -> Result<CareerSuggestions> {
        let employee = self
            .store
            .get_employee(employee_id)?
            .ok_or_else(|| TalentMatcherError::employee_not_found(employee_id))?;

        let skill_categories = self.analyzer.categorize_skills(&employee.skills);

        let mut current_matches = self.match_employee_to_projects(employee_id, 10)?;
        current_matches.truncate(3);

        let general_report = self.analyze_skill_gaps(employee_id, None)?;
        let growth_projects = self.find_growth_projects(&employee)?;
        let career_trajectories = self.suggest_trajectories(&skill_categories);

        Ok(CareerSuggestions {
            current_level: Self::assess_skill_level(&employee.skills),
            skill_categories,
            current_matches,
            skill_gaps: general_report.skill_gap,
            recommended_courses: general_report.recommended_courses,
            growth_projects,
            career_trajectories,
        })
    }

    fn recommend_courses(&self, missing_skills: &[String]) -> Result<Vec<CourseRecommendation>> {
        let courses = self.store.all_courses()?;
        Ok(self.recommender.recommend(missing_skills, &courses))
    }

    /// Projects whose skill-match percentage falls inside the growth band
    /// (inclusive), ascending: the least additional growth first.
    fn find_growth_projects(&self, employee: &Employee) -> Result<Vec<GrowthProject>> {
        let band_min = self.config.matching.growth_band_min;
        let band_max = self.config.matching.growth_band_max;

        let mut growth: Vec<GrowthProject> = self
            .store
            .all_projects()?
            .into_iter()
            .filter_map(|project| {
                let gap = self
                    .analyzer
                    .find_skill_gaps(&employee.skills, &project.required_skills);
                if gap.match_percentage < band_min || gap.match_percentage > band_max {
                    return None;
                }
                Some(GrowthProject {
                    project_id: project.id,
                    title: project.title,
                    description: project.description,
                    skill_match_percentage: gap.match_percentage,
                    missing_skills: gap.missing_skills,
                })
            })
            .collect();

        growth.sort_by(|a, b| {
            a.skill_match_percentage
                .partial_cmp(&b.skill_match_percentage)
                .unwrap_or(std::cmp::Ordering::Equal)
                .then(a.project_id.cmp(&b.project_id))
        });
        growth.truncate(3);
        Ok(growth)
    }

    fn suggest_trajectories(
        &self,
        skill_categories: &BTreeMap<SkillCategory, Vec<String>>,
    ) -> Vec<String> {
        let dominant = skill_categories
            .iter()
            .max_by(|(cat_a, skills_a), (cat_b, skills_b)| {
                skills_a
                    .len()
                    .cmp(&skills_b.len())
                    // max_by keeps the later of equal elements, so reversed
                    // category order makes the earlier category win ties.
                    .then(cat_b.cmp(cat_a))
            })
            .map(|(category, _)| *category);

        let mut trajectories = Vec::new();
        for rule in TRAJECTORY_RULES {
            let count = skill_categories
                .get(&rule.category)
                .map(|skills| skills.len())
                .unwrap_or(0);
            if count < rule.min_count {
                continue;
            }
            if rule.dominant_only && dominant != Some(rule.category) {
                continue;
            }
            trajectories.push(rule.path.to_string());
        }

        if trajectories.is_empty() {
            trajectories.push(FALLBACK_TRAJECTORY.to_string());
        }
        trajectories
    }

    fn assess_skill_level(skills: &[String]) -> SkillLevel {
        match skills.len() {
            0..=4 => SkillLevel::Junior,
            5..=14 => SkillLevel::MidLevel,
            15..=24 => SkillLevel::Senior,
            _ => SkillLevel::Expert,
        }
    }
}
