//! Configuration management for the talent matching engine

use crate::error::{Result, TalentMatcherError};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    pub embedding: EmbeddingConfig,
    pub scoring: ScoringConfig,
    pub matching: MatchingConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EmbeddingConfig {
    /// Fixed length of every generated vector.
    pub dimension: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScoringConfig {
    pub similarity_weight: f32,
    pub skill_match_weight: f32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MatchingConfig {
    pub default_top_k: usize,
    /// Skill-match percentage band for "growth" project suggestions, inclusive.
    pub growth_band_min: f32,
    pub growth_band_max: f32,
    pub max_course_recommendations: usize,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            embedding: EmbeddingConfig { dimension: 384 },
            scoring: ScoringConfig {
                similarity_weight: 0.6,
                skill_match_weight: 0.4,
            },
            matching: MatchingConfig {
                default_top_k: 5,
                growth_band_min: 40.0,
                growth_band_max: 70.0,
                max_course_recommendations: 3,
            },
        }
    }
}

impl Config {
    pub fn load() -> Result<Self> {
        Self::load_from(&Self::config_path())
    }

    pub fn load_from(config_path: &PathBuf) -> Result<Self> {
        if config_path.exists() {
            let content = std::fs::read_to_string(config_path)?;
            let config: Config = toml::from_str(&content).map_err(|e| {
                TalentMatcherError::Configuration(format!("Failed to parse config: {}", e))
            })?;
            Ok(config)
        } else {
            let config = Self::default();
            config.save_to(config_path)?;
            Ok(config)
        }
    }

    pub fn save(&self) -> Result<()> {
        self.save_to(&Self::config_path())
    }

    pub fn save_to(&self, config_path: &PathBuf) -> Result<()> {
        if let Some(parent) = config_path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let content = toml::to_string_pretty(self).map_err(|e| {
            TalentMatcherError::Configuration(format!("Failed to serialize config: {}", e))
        })?;

        std::fs::write(config_path, content)?;
        Ok(())
    }

    fn config_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| dirs::home_dir().unwrap_or_else(|| PathBuf::from(".")))
            .join("talent-matcher")
            .join("config.toml")
    }
}
