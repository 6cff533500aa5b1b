//! Matching engine: embeddings, similarity index, skill analysis, scoring

pub mod courses;
pub mod embedding;
pub mod index;
pub mod orchestrator;
pub mod scoring;
pub mod skills;
