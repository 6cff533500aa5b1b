//! Error handling for the talent matching engine

use thiserror::Error;

#[derive(Error, Debug)]
pub enum TalentMatcherError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("{kind} {id} not found")]
    NotFound { kind: &'static str, id: i64 },

    #[error("Record store error: {0}")]
    Store(String),

    #[error("Similarity index error: {0}")]
    Index(String),

    #[error("Embedding error: {0}")]
    Embedding(String),

    #[error("Configuration error: {0}")]
    Configuration(String),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, TalentMatcherError>;

impl TalentMatcherError {
    /// Missing employee record.
    pub fn employee_not_found(id: i64) -> Self {
        TalentMatcherError::NotFound {
            kind: "employee",
            id,
        }
    }

    /// Missing project record.
    pub fn project_not_found(id: i64) -> Self {
        TalentMatcherError::NotFound { kind: "project", id }
    }

    /// True for conditions the caller should map to a 404-equivalent,
    /// as opposed to retryable infrastructure failures.
    pub fn is_not_found(&self) -> bool {
        matches!(self, TalentMatcherError::NotFound { .. })
    }
}

/// Convert anyhow errors to our custom error type
impl From<anyhow::Error> for TalentMatcherError {
    fn from(err: anyhow::Error) -> Self {
        TalentMatcherError::Store(err.to_string())
    }
}
