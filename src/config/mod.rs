//! Configuration module for draftmeta
//!
//! This module handles:
//! - Analyzer settings (draftmeta.toml): scoring, color strength,
//!   calibration, cache and trophy knobs
//! - User settings (~/.config/draftmeta/config.toml): API keys and LLM backend

mod analyzer_config;
mod user_config;

pub use analyzer_config::{
    load_analyzer_config, AnalyzerConfig, CacheConfig, LlmConfig, TrophyConfig, CONFIG_FILE_NAME,
};
pub use user_config::{AiKeys, UserConfig};
