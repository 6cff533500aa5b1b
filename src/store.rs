//! Record store interface and the in-memory reference implementation

use crate::error::Result;
use crate::models::{Course, Employee, MatchRecord, Project};
use parking_lot::RwLock;
use std::collections::HashMap;

/// CRUD surface the matching engine needs from whatever persists raw entity
/// records. A relational backend lives behind this trait in production; the
/// engine only ever sees these operations.
///
/// Store failures surface as `TalentMatcherError::Store` — a retryable
/// infrastructure error, distinct from `NotFound`.
pub trait RecordStore: Send + Sync {
    fn get_employee(&self, employee_id: i64) -> Result<Option<Employee>>;
    fn get_project(&self, project_id: i64) -> Result<Option<Project>>;
    fn all_projects(&self) -> Result<Vec<Project>>;
    fn all_courses(&self) -> Result<Vec<Course>>;

    fn update_employee_embedding(&self, employee_id: i64, embedding: Vec<f32>) -> Result<()>;
    fn update_project_embedding(&self, project_id: i64, embedding: Vec<f32>) -> Result<()>;

    /// Insert-or-replace keyed on (employee_id, project_id). Implementations
    /// must serialize concurrent upserts for the same pair.
    fn upsert_match_record(&self, record: MatchRecord) -> Result<()>;
    fn get_match_record(&self, employee_id: i64, project_id: i64) -> Result<Option<MatchRecord>>;
    fn match_history_for_employee(&self, employee_id: i64) -> Result<Vec<MatchRecord>>;
}

/// In-memory store backed by RwLock'd maps. Reference implementation for
/// tests and single-process deployments.
#[derive(Default)]
pub struct InMemoryRecordStore {
    employees: RwLock<HashMap<i64, Employee>>,
    projects: RwLock<HashMap<i64, Project>>,
    courses: RwLock<HashMap<i64, Course>>,
    // The write lock serializes upserts per pair, which is all the engine
    // requires; a relational backend would use a unique key instead.
    match_records: RwLock<HashMap<(i64, i64), MatchRecord>>,
}

impl InMemoryRecordStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert_employee(&self, employee: Employee) {
        self.employees.write().insert(employee.id, employee);
    }

    pub fn insert_project(&self, project: Project) {
        self.projects.write().insert(project.id, project);
    }

    pub fn insert_course(&self, course: Course) {
        self.courses.write().insert(course.id, course);
    }

    pub fn match_record_count(&self) -> usize {
        self.match_records.read().len()
    }
}

impl RecordStore for InMemoryRecordStore {
    fn get_employee(&self, employee_id: i64) -> Result<Option<Employee>> {
        Ok(self.employees.read().get(&employee_id).cloned())
    }

    fn get_project(&self, project_id: i64) -> Result<Option<Project>> {
        Ok(self.projects.read().get(&project_id).cloned())
    }

    fn all_projects(&self) -> Result<Vec<Project>> {
        let mut projects: Vec<Project> = self.projects.read().values().cloned().collect();
        projects.sort_by_key(|p| p.id);
        Ok(projects)
    }

    fn all_courses(&self) -> Result<Vec<Course>> {
        let mut courses: Vec<Course> = self.courses.read().values().cloned().collect();
        courses.sort_by_key(|c| c.id);
        Ok(courses)
    }

    fn update_employee_embedding(&self, employee_id: i64, embedding: Vec<f32>) -> Result<()> {
        if let Some(employee) = self.employees.write().get_mut(&employee_id) {
            employee.embedding = Some(embedding);
        }
        Ok(())
    }

    fn update_project_embedding(&self, project_id: i64, embedding: Vec<f32>) -> Result<()> {
        if let Some(project) = self.projects.write().get_mut(&project_id) {
            project.embedding = Some(embedding);
        }
        Ok(())
    }

    fn upsert_match_record(&self, record: MatchRecord) -> Result<()> {
        self.match_records
            .write()
            .insert((record.employee_id, record.project_id), record);
        Ok(())
    }

    fn get_match_record(&self, employee_id: i64, project_id: i64) -> Result<Option<MatchRecord>> {
        Ok(self
            .match_records
            .read()
            .get(&(employee_id, project_id))
            .cloned())
    }

    fn match_history_for_employee(&self, employee_id: i64) -> Result<Vec<MatchRecord>> {
        let mut records: Vec<MatchRecord> = self
            .match_records
            .read()
            .values()
            .filter(|r| r.employee_id == employee_id)
            .cloned()
            .collect();
        records.sort_by_key(|r| r.project_id);
        Ok(records)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn record(employee_id: i64, project_id: i64, overall_score: f32) -> MatchRecord {
        MatchRecord {
            employee_id,
            project_id,
            similarity_score: 50.0,
            skill_match_percentage: 50.0,
            overall_score,
            matched_skills: vec![],
            missing_skills: vec![],
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn test_match_record_upsert_overwrites() {
        let store = InMemoryRecordStore::new();

        store.upsert_match_record(record(1, 2, 40.0)).unwrap();
        store.upsert_match_record(record(1, 2, 75.5)).unwrap();

        assert_eq!(store.match_record_count(), 1);
        let stored = store.get_match_record(1, 2).unwrap().unwrap();
        assert_eq!(stored.overall_score, 75.5);
    }

    #[test]
    fn test_match_history_scoped_to_employee() {
        let store = InMemoryRecordStore::new();

        store.upsert_match_record(record(1, 2, 40.0)).unwrap();
        store.upsert_match_record(record(1, 3, 60.0)).unwrap();
        store.upsert_match_record(record(9, 2, 80.0)).unwrap();

        let history = store.match_history_for_employee(1).unwrap();
        assert_eq!(history.len(), 2);
        assert!(history.iter().all(|r| r.employee_id == 1));
    }

    #[test]
    fn test_embedding_update_round_trip() {
        let store = InMemoryRecordStore::new();
        store.insert_employee(Employee {
            id: 1,
            name: "Test".to_string(),
            skills: vec![],
            preferences: vec![],
            resume_text: String::new(),
            embedding: None,
        });

        store.update_employee_embedding(1, vec![0.5; 4]).unwrap();
        let employee = store.get_employee(1).unwrap().unwrap();
        assert_eq!(employee.embedding, Some(vec![0.5; 4]));
    }
}
