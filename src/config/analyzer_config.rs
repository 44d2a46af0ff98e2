//! Analyzer configuration
//!
//! Loaded from `draftmeta.toml` in the working directory, or from an explicit
//! `--config` path. Every section and key is optional.
//!
//! # Configuration Format
//!
//! ```toml
//! # draftmeta.toml
//!
//! [scoring]
//! confidence_z = 1.96
//! weights = { gih_wr = 0.45, iwd = 0.20, alsa_inverse = 0.15, oh_wr = 0.10, gd_wr = 0.10 }
//!
//! [color_strength]
//! playable_threshold = 50.0
//! top_n = { common = 10, uncommon = 5, rare = 3 }
//! stability_weight = { min = 0.8, max = 1.0 }
//!
//! [calibration]
//! sleeper = 90.0
//! trap = 10.0
//!
//! [cache]
//! ttl_hours = 24
//! dir = "/tmp/draftmeta-cache"
//!
//! [trophy]
//! max_decks = 500
//! max_age_days = 7
//!
//! [llm]
//! backend = "gemini"
//! model = "gemini-3-flash-preview"
//! ```

use crate::ai::{AiConfig, LlmBackend};
use crate::analysis::DEFAULT_MAX_DECKS;
use crate::cache::{get_cache_dir, DEFAULT_TTL_HOURS};
use crate::models::CalibrationPercentiles;
use crate::scoring::{CardScorerConfig, ColorScorerConfig};
use anyhow::Context;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

pub const CONFIG_FILE_NAME: &str = "draftmeta.toml";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CacheConfig {
    pub ttl_hours: i64,
    /// Defaults to the platform cache directory
    pub dir: Option<PathBuf>,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            ttl_hours: DEFAULT_TTL_HOURS,
            dir: None,
        }
    }
}

impl CacheConfig {
    pub fn dir(&self) -> PathBuf {
        self.dir.clone().unwrap_or_else(get_cache_dir)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TrophyConfig {
    pub max_decks: usize,
    /// Saved trophy stats older than this are recomputed
    pub max_age_days: u64,
}

impl Default for TrophyConfig {
    fn default() -> Self {
        Self {
            max_decks: DEFAULT_MAX_DECKS,
            max_age_days: 7,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LlmConfig {
    pub backend: LlmBackend,
    pub model: Option<String>,
    pub max_tokens: u32,
    pub temperature: f32,
}

impl Default for LlmConfig {
    fn default() -> Self {
        let ai = AiConfig::default();
        Self {
            backend: ai.backend,
            model: ai.model,
            max_tokens: ai.max_tokens,
            temperature: ai.temperature,
        }
    }
}

impl LlmConfig {
    pub fn ai_config(&self) -> AiConfig {
        AiConfig {
            backend: self.backend,
            model: self.model.clone(),
            max_tokens: self.max_tokens,
            temperature: self.temperature,
            base_url: None,
        }
    }
}

/// All analyzer settings
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AnalyzerConfig {
    pub scoring: CardScorerConfig,
    pub color_strength: ColorScorerConfig,
    pub calibration: CalibrationPercentiles,
    pub cache: CacheConfig,
    pub trophy: TrophyConfig,
    pub llm: LlmConfig,
}

impl AnalyzerConfig {
    /// Load from an explicit path; a missing or malformed file is an error
    pub fn from_file(path: &Path) -> anyhow::Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config {}", path.display()))?;
        let config: AnalyzerConfig = toml::from_str(&content)
            .with_context(|| format!("Failed to parse config {}", path.display()))?;
        Ok(config)
    }
}

/// Load `draftmeta.toml` from `dir`, falling back to defaults
pub fn load_analyzer_config(dir: &Path) -> AnalyzerConfig {
    let path = dir.join(CONFIG_FILE_NAME);
    if !path.exists() {
        debug!("No {} found, using defaults", CONFIG_FILE_NAME);
        return AnalyzerConfig::default();
    }
    match AnalyzerConfig::from_file(&path) {
        Ok(config) => {
            debug!("Loaded analyzer config from {}", path.display());
            config
        }
        Err(e) => {
            warn!("{:#}; using defaults", e);
            AnalyzerConfig::default()
        }
    }
}
