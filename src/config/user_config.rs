//! User-level configuration for draftmeta
//!
//! Supports loading config from:
//! - Environment variables
//! - ~/.config/draftmeta/config.toml

use crate::ai::{AiClient, AiConfig, AiError, AiResult, LlmBackend};
use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

#[derive(Debug, Default, Deserialize, Serialize)]
pub struct UserConfig {
    #[serde(default)]
    pub ai: AiKeys,
}

#[derive(Debug, Default, Deserialize, Serialize)]
pub struct AiKeys {
    pub gemini_api_key: Option<String>,
    pub anthropic_api_key: Option<String>,
    pub openai_api_key: Option<String>,

    /// Overrides `[llm] backend` from draftmeta.toml
    pub backend: Option<String>,
    pub model: Option<String>,

    /// Ollama endpoint (default: http://localhost:11434)
    pub ollama_url: Option<String>,
}

impl UserConfig {
    /// Load config from all sources, with priority:
    /// 1. Environment variables (highest)
    /// 2. User config (~/.config/draftmeta/config.toml)
    pub fn load() -> Result<Self> {
        let mut config = UserConfig::default();

        if let Some(user_config) = Self::user_config_path()
            .filter(|p| p.exists())
            .and_then(|p| std::fs::read_to_string(&p).ok())
            .and_then(|content| toml::from_str::<UserConfig>(&content).ok())
        {
            config.merge(user_config);
        }

        config.apply_env(|key| std::env::var(key).ok());
        Ok(config)
    }

    /// Get the user config file path
    pub fn user_config_path() -> Option<PathBuf> {
        dirs::config_dir().map(|p| p.join("draftmeta").join("config.toml"))
    }

    fn apply_env(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        let non_empty = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());
        if let Some(key) = non_empty(LlmBackend::Gemini.env_key()) {
            self.ai.gemini_api_key = Some(key);
        }
        if let Some(key) = non_empty(LlmBackend::Anthropic.env_key()) {
            self.ai.anthropic_api_key = Some(key);
        }
        if let Some(key) = non_empty(LlmBackend::OpenAi.env_key()) {
            self.ai.openai_api_key = Some(key);
        }
        if let Some(model) = non_empty(LlmBackend::Ollama.env_key()) {
            self.ai.model = Some(model);
        }
    }

    /// Merge another config into this one (other takes priority)
    fn merge(&mut self, other: UserConfig) {
        if other.ai.gemini_api_key.is_some() {
            self.ai.gemini_api_key = other.ai.gemini_api_key;
        }
        if other.ai.anthropic_api_key.is_some() {
            self.ai.anthropic_api_key = other.ai.anthropic_api_key;
        }
        if other.ai.openai_api_key.is_some() {
            self.ai.openai_api_key = other.ai.openai_api_key;
        }
        if other.ai.backend.is_some() {
            self.ai.backend = other.ai.backend;
        }
        if other.ai.model.is_some() {
            self.ai.model = other.ai.model;
        }
        if other.ai.ollama_url.is_some() {
            self.ai.ollama_url = other.ai.ollama_url;
        }
    }

    pub fn api_key(&self, backend: LlmBackend) -> Option<&str> {
        match backend {
            LlmBackend::Gemini => self.ai.gemini_api_key.as_deref(),
            LlmBackend::Anthropic => self.ai.anthropic_api_key.as_deref(),
            LlmBackend::OpenAi => self.ai.openai_api_key.as_deref(),
            LlmBackend::Ollama => None,
        }
    }

    /// Backend override from the user file, if any
    pub fn backend(&self) -> AiResult<Option<LlmBackend>> {
        self.ai.backend.as_deref().map(str::parse::<LlmBackend>).transpose()
    }

    /// Build a client for `config`, filling in the user's key, backend and model
    pub fn ai_client(&self, mut config: AiConfig) -> AiResult<AiClient> {
        if let Some(backend) = self.backend()? {
            config.backend = backend;
        }
        if self.ai.model.is_some() {
            config.model = self.ai.model.clone();
        }

        if !config.backend.requires_api_key() {
            if let Some(url) = &self.ai.ollama_url {
                config.base_url = Some(format!("{}/v1/chat/completions", url.trim_end_matches('/')));
            }
            return Ok(AiClient::new(config, "ollama"));
        }

        let key = self
            .api_key(config.backend)
            .map(str::to_string)
            .ok_or_else(|| AiError::MissingApiKey {
                env_var: config.backend.env_key().to_string(),
                signup_url: config.backend.signup_url().to_string(),
            })?;
        Ok(AiClient::new(config, key))
    }
}
