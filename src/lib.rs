//! Talent-project matching engine library

pub mod config;
pub mod error;
pub mod matching;
pub mod models;
pub mod store;

pub use config::Config;
pub use error::{Result, TalentMatcherError};
pub use matching::orchestrator::TalentMatcher;
