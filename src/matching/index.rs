//! In-process similarity index over embedded entities

use crate::error::{Result, TalentMatcherError};
use crate::matching::embedding::cosine_similarity;
use crate::matching::scoring::round2;
use log::debug;
use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::HashMap;
use std::sync::Arc;

pub const EMPLOYEES_COLLECTION: &str = "employees";
pub const PROJECTS_COLLECTION: &str = "projects";

/// One entry per (collection, entity_id); replaced wholesale on update.
#[derive(Debug, Clone)]
struct IndexEntry {
    entity_id: i64,
    vector: Vec<f32>,
    metadata: Value,
    /// Insertion order within the collection, used as the stable tie-break
    /// for equal distances.
    seq: u64,
}

#[derive(Default)]
struct Collection {
    entries: Vec<IndexEntry>,
    next_seq: u64,
}

/// Nearest-neighbor result with the similarity mapped to a 0-100 scale.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchHit {
    pub entity_id: i64,
    pub similarity_score: f32,
    pub metadata: Value,
}

/// Per-entity-kind vector store with implicit collection creation. Each
/// collection is guarded by its own lock, so upsert/delete/query are
/// individually atomic and independent collections don't contend.
#[derive(Default)]
pub struct SimilarityIndex {
    collections: RwLock<HashMap<String, Arc<RwLock<Collection>>>>,
}

impl SimilarityIndex {
    pub fn new() -> Self {
        Self::default()
    }

    fn collection(&self, name: &str) -> Arc<RwLock<Collection>> {
        if let Some(collection) = self.collections.read().get(name) {
            return Arc::clone(collection);
        }
        Arc::clone(
            self.collections
                .write()
                .entry(name.to_string())
                .or_default(),
        )
    }

    /// Insert-or-replace under a single write guard: a concurrent reader
    /// never observes the id as absent mid-update.
    pub fn upsert(&self, collection: &str, entity_id: i64, vector: Vec<f32>, metadata: Value) {
        let handle = self.collection(collection);
        let mut guard = handle.write();

        guard.entries.retain(|e| e.entity_id != entity_id);
        let seq = guard.next_seq;
        guard.next_seq += 1;
        guard.entries.push(IndexEntry {
            entity_id,
            vector,
            metadata,
            seq,
        });

        debug!("index upsert: collection={} id={}", collection, entity_id);
    }

    /// Idempotent removal; deleting an absent id is not an error.
    pub fn delete(&self, collection: &str, entity_id: i64) {
        let handle = self.collection(collection);
        let mut guard = handle.write();
        let before = guard.entries.len();
        guard.entries.retain(|e| e.entity_id != entity_id);
        if guard.entries.len() < before {
            debug!("index delete: collection={} id={}", collection, entity_id);
        }
    }

    pub fn contains(&self, collection: &str, entity_id: i64) -> bool {
        self.collection(collection)
            .read()
            .entries
            .iter()
            .any(|e| e.entity_id == entity_id)
    }

    pub fn len(&self, collection: &str) -> usize {
        self.collection(collection).read().entries.len()
    }

    pub fn is_empty(&self, collection: &str) -> bool {
        self.len(collection) == 0
    }

    /// Up to `top_k` entries by ascending cosine distance to `vector`, ties
    /// broken by insertion order. Empty collections yield an empty list,
    /// never an error; a dimension mismatch inside the index does.
    pub fn query(&self, collection: &str, vector: &[f32], top_k: usize) -> Result<Vec<SearchHit>> {
        let handle = self.collection(collection);
        let guard = handle.read();

        let mut scored: Vec<(f32, u64, SearchHit)> = Vec::with_capacity(guard.entries.len());
        for entry in &guard.entries {
            let similarity = cosine_similarity(vector, &entry.vector).map_err(|e| {
                TalentMatcherError::Index(format!(
                    "corrupt entry {} in collection {}: {}",
                    entry.entity_id, collection, e
                ))
            })?;
            let distance = 1.0 - similarity;
            scored.push((
                distance,
                entry.seq,
                SearchHit {
                    entity_id: entry.entity_id,
                    similarity_score: round2((1.0 - distance) * 100.0),
                    metadata: entry.metadata.clone(),
                },
            ));
        }

        scored.sort_by(|a, b| {
            a.0.partial_cmp(&b.0)
                .unwrap_or(std::cmp::Ordering::Equal)
                .then(a.1.cmp(&b.1))
        });

        Ok(scored
            .into_iter()
            .take(top_k)
            .map(|(_, _, hit)| hit)
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn unit(direction: (f32, f32)) -> Vec<f32> {
        vec![direction.0, direction.1]
    }

    #[test]
    fn test_upsert_replaces_existing_entry() {
        let index = SimilarityIndex::new();
        index.upsert(EMPLOYEES_COLLECTION, 1, unit((1.0, 0.0)), json!({}));
        index.upsert(EMPLOYEES_COLLECTION, 1, unit((0.0, 1.0)), json!({}));

        assert_eq!(index.len(EMPLOYEES_COLLECTION), 1);
        let hits = index
            .query(EMPLOYEES_COLLECTION, &unit((0.0, 1.0)), 5)
            .unwrap();
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].entity_id, 1);
        assert_eq!(hits[0].similarity_score, 100.0);
    }

    #[test]
    fn test_delete_is_idempotent() {
        let index = SimilarityIndex::new();
        index.upsert(PROJECTS_COLLECTION, 5, unit((1.0, 0.0)), json!({}));

        index.delete(PROJECTS_COLLECTION, 5);
        index.delete(PROJECTS_COLLECTION, 5);
        index.delete(PROJECTS_COLLECTION, 99);

        assert!(index.is_empty(PROJECTS_COLLECTION));
    }

    #[test]
    fn test_query_ranks_by_descending_similarity() {
        let index = SimilarityIndex::new();
        index.upsert(PROJECTS_COLLECTION, 1, unit((0.0, 1.0)), json!({}));
        index.upsert(PROJECTS_COLLECTION, 2, unit((1.0, 0.0)), json!({}));
        index.upsert(PROJECTS_COLLECTION, 3, unit((1.0, 1.0)), json!({}));

        let hits = index
            .query(PROJECTS_COLLECTION, &unit((1.0, 0.0)), 3)
            .unwrap();
        assert_eq!(hits[0].entity_id, 2);
        assert_eq!(hits[1].entity_id, 3);
        assert_eq!(hits[2].entity_id, 1);
        assert!(hits[0].similarity_score >= hits[1].similarity_score);
        assert!(hits[1].similarity_score >= hits[2].similarity_score);
    }

    #[test]
    fn test_query_larger_k_than_collection() {
        let index = SimilarityIndex::new();
        index.upsert(EMPLOYEES_COLLECTION, 1, unit((1.0, 0.0)), json!({}));
        index.upsert(EMPLOYEES_COLLECTION, 2, unit((0.5, 0.5)), json!({}));

        let hits = index
            .query(EMPLOYEES_COLLECTION, &unit((1.0, 0.0)), 50)
            .unwrap();
        assert_eq!(hits.len(), 2);
    }

    #[test]
    fn test_query_empty_collection_returns_empty() {
        let index = SimilarityIndex::new();
        let hits = index.query("never-seen", &unit((1.0, 0.0)), 5).unwrap();
        assert!(hits.is_empty());
    }

    #[test]
    fn test_ties_broken_by_insertion_order() {
        let index = SimilarityIndex::new();
        // Identical vectors: equal distance, so insertion order decides.
        index.upsert(EMPLOYEES_COLLECTION, 7, unit((1.0, 0.0)), json!({}));
        index.upsert(EMPLOYEES_COLLECTION, 3, unit((1.0, 0.0)), json!({}));

        let hits = index
            .query(EMPLOYEES_COLLECTION, &unit((1.0, 0.0)), 2)
            .unwrap();
        assert_eq!(hits[0].entity_id, 7);
        assert_eq!(hits[1].entity_id, 3);
    }

    #[test]
    fn test_metadata_snapshot_round_trip() {
        let index = SimilarityIndex::new();
        index.upsert(
            PROJECTS_COLLECTION,
            9,
            unit((1.0, 0.0)),
            json!({"title": "Search Revamp"}),
        );

        let hits = index
            .query(PROJECTS_COLLECTION, &unit((1.0, 0.0)), 1)
            .unwrap();
        assert_eq!(hits[0].metadata["title"], "Search Revamp");
    }
}
