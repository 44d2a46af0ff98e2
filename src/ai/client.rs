//! LLM API client for Gemini, Anthropic and OpenAI-compatible backends
//!
//! Sync HTTP via ureq, one request per call.

use crate::ai::{AiError, AiResult, TextGenerator};
use serde::{Deserialize, Serialize};
use std::env;
use std::fmt;
use std::str::FromStr;
use tracing::debug;

/// Supported LLM backends
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LlmBackend {
    #[default]
    Gemini,
    Anthropic,
    #[serde(rename = "openai")]
    OpenAi,
    Ollama,
}

impl LlmBackend {
    pub fn env_key(&self) -> &'static str {
        match self {
            LlmBackend::Gemini => "GEMINI_API_KEY",
            LlmBackend::Anthropic => "ANTHROPIC_API_KEY",
            LlmBackend::OpenAi => "OPENAI_API_KEY",
            LlmBackend::Ollama => "OLLAMA_MODEL",
        }
    }

    pub fn signup_url(&self) -> &'static str {
        match self {
            LlmBackend::Gemini => "https://aistudio.google.com/app/apikey",
            LlmBackend::Anthropic => "https://console.anthropic.com/settings/keys",
            LlmBackend::OpenAi => "https://platform.openai.com/api-keys",
            LlmBackend::Ollama => "https://ollama.ai (no key needed, just run locally)",
        }
    }

    pub fn default_model(&self) -> &'static str {
        match self {
            LlmBackend::Gemini => "gemini-3-flash-preview",
            LlmBackend::Anthropic => "claude-sonnet-4-20250514",
            LlmBackend::OpenAi => "gpt-4o",
            LlmBackend::Ollama => "llama3.1:8b",
        }
    }

    /// Base URL; Gemini appends `/{model}:generateContent`
    pub fn api_url(&self) -> &'static str {
        match self {
            LlmBackend::Gemini => "https://generativelanguage.googleapis.com/v1beta/models",
            LlmBackend::Anthropic => "https://api.anthropic.com/v1/messages",
            LlmBackend::OpenAi => "https://api.openai.com/v1/chat/completions",
            LlmBackend::Ollama => "http://localhost:11434/v1/chat/completions",
        }
    }

    pub fn is_openai_compatible(&self) -> bool {
        matches!(self, LlmBackend::OpenAi | LlmBackend::Ollama)
    }

    pub fn requires_api_key(&self) -> bool {
        !matches!(self, LlmBackend::Ollama)
    }
}

impl fmt::Display for LlmBackend {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            LlmBackend::Gemini => "gemini",
            LlmBackend::Anthropic => "anthropic",
            LlmBackend::OpenAi => "openai",
            LlmBackend::Ollama => "ollama",
        };
        f.write_str(name)
    }
}

impl FromStr for LlmBackend {
    type Err = AiError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "gemini" | "google" => Ok(LlmBackend::Gemini),
            "anthropic" | "claude" => Ok(LlmBackend::Anthropic),
            "openai" => Ok(LlmBackend::OpenAi),
            "ollama" => Ok(LlmBackend::Ollama),
            other => Err(AiError::ConfigError(format!(
                "unknown LLM backend '{}' (expected gemini, anthropic, openai or ollama)",
                other
            ))),
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    System,
    User,
    Assistant,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Message {
    pub role: Role,
    pub content: String,
}

impl Message {
    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: Role::User,
            content: content.into(),
        }
    }
    pub fn assistant(content: impl Into<String>) -> Self {
        Self {
            role: Role::Assistant,
            content: content.into(),
        }
    }
    pub fn system(content: impl Into<String>) -> Self {
        Self {
            role: Role::System,
            content: content.into(),
        }
    }
}

#[derive(Debug, Clone)]
pub struct AiConfig {
    pub backend: LlmBackend,
    pub model: Option<String>,
    pub max_tokens: u32,
    pub temperature: f32,
    /// Overrides [`LlmBackend::api_url`]
    pub base_url: Option<String>,
}

impl Default for AiConfig {
    fn default() -> Self {
        Self {
            backend: LlmBackend::default(),
            model: None,
            max_tokens: 4096,
            temperature: 1.0,
            base_url: None,
        }
    }
}

impl AiConfig {
    pub fn model(&self) -> &str {
        self.model
            .as_deref()
            .unwrap_or_else(|| self.backend.default_model())
    }

    fn url(&self) -> String {
        let base = self
            .base_url
            .as_deref()
            .unwrap_or_else(|| self.backend.api_url())
            .trim_end_matches('/');
        match self.backend {
            LlmBackend::Gemini => format!("{}/{}:generateContent", base, self.model()),
            _ => base.to_string(),
        }
    }
}

/// Unified LLM client
pub struct AiClient {
    config: AiConfig,
    api_key: String,
    agent: ureq::Agent,
}

fn make_agent() -> ureq::Agent {
    ureq::config::Config::builder()
        .http_status_as_error(false)
        .timeout_global(Some(std::time::Duration::from_secs(120)))
        .build()
        .new_agent()
}

impl AiClient {
    pub fn new(config: AiConfig, api_key: impl Into<String>) -> Self {
        Self {
            config,
            api_key: api_key.into(),
            agent: make_agent(),
        }
    }

    pub fn from_env(backend: LlmBackend) -> AiResult<Self> {
        let config = AiConfig {
            backend,
            ..Default::default()
        };
        Self::from_env_with_config(config)
    }

    pub fn from_env_with_config(mut config: AiConfig) -> AiResult<Self> {
        if !config.backend.requires_api_key() {
            if let Ok(model) = env::var("OLLAMA_MODEL") {
                config.model = Some(model);
            }
            return Ok(Self::new(config, "ollama"));
        }

        let env_key = config.backend.env_key();
        let api_key = env::var(env_key)
            .ok()
            .filter(|k| !k.trim().is_empty())
            .ok_or_else(|| AiError::MissingApiKey {
                env_var: env_key.to_string(),
                signup_url: config.backend.signup_url().to_string(),
            })?;

        Ok(Self::new(config, api_key))
    }

    pub fn backend(&self) -> LlmBackend {
        self.config.backend
    }

    pub fn model(&self) -> &str {
        self.config.model()
    }

    /// Generate a response (sync)
    pub fn generate(&self, messages: Vec<Message>, system: Option<&str>) -> AiResult<String> {
        debug!(
            "LLM request to {} ({}), {} messages",
            self.config.backend,
            self.config.model(),
            messages.len()
        );
        match self.config.backend {
            LlmBackend::Gemini => self.generate_gemini(messages, system),
            LlmBackend::Anthropic => self.generate_anthropic(messages, system),
            LlmBackend::OpenAi | LlmBackend::Ollama => self.generate_openai(messages, system),
        }
    }

    fn read_response<T: serde::de::DeserializeOwned>(
        response: ureq::http::Response<ureq::Body>,
    ) -> AiResult<T> {
        let status = response.status().as_u16();
        if status >= 400 {
            let error_text = response.into_body().read_to_string().unwrap_or_default();
            return Err(AiError::ApiError {
                status,
                message: error_text,
            });
        }
        response
            .into_body()
            .read_json()
            .map_err(|e| AiError::ParseError(e.to_string()))
    }

    fn generate_gemini(&self, messages: Vec<Message>, system: Option<&str>) -> AiResult<String> {
        let contents = messages
            .into_iter()
            .filter(|m| m.role != Role::System)
            .map(|m| GeminiContent {
                role: Some(
                    match m.role {
                        Role::Assistant => "model",
                        _ => "user",
                    }
                    .to_string(),
                ),
                parts: vec![GeminiPart { text: m.content }],
            })
            .collect();

        let body = GeminiRequest {
            contents,
            system_instruction: system.map(|s| GeminiContent {
                role: None,
                parts: vec![GeminiPart {
                    text: s.to_string(),
                }],
            }),
            generation_config: GeminiGenerationConfig {
                temperature: self.config.temperature,
                max_output_tokens: self.config.max_tokens,
            },
        };

        let response = self
            .agent
            .post(&self.config.url())
            .header("Content-Type", "application/json")
            .header("x-goog-api-key", &self.api_key)
            .send_json(&body)
            .map_err(|e| AiError::RequestFailed(e.to_string()))?;

        let resp: GeminiResponse = Self::read_response(response)?;
        let text: String = resp
            .candidates
            .into_iter()
            .next()
            .map(|c| c.content.parts.into_iter().map(|p| p.text).collect())
            .unwrap_or_default();

        if text.trim().is_empty() {
            return Err(AiError::ParseError("No text in Gemini response".to_string()));
        }
        Ok(text)
    }

    fn generate_openai(
        &self,
        mut messages: Vec<Message>,
        system: Option<&str>,
    ) -> AiResult<String> {
        if let Some(sys) = system {
            messages.insert(0, Message::system(sys));
        }

        let body = OpenAiRequest {
            model: self.config.model().to_string(),
            messages,
            max_tokens: self.config.max_tokens,
            temperature: self.config.temperature,
        };

        let mut req = self
            .agent
            .post(&self.config.url())
            .header("Content-Type", "application/json");

        if self.config.backend.requires_api_key() {
            req = req.header("Authorization", &format!("Bearer {}", self.api_key));
        }

        let response = req
            .send_json(&body)
            .map_err(|e| AiError::RequestFailed(e.to_string()))?;

        let resp: OpenAiResponse = Self::read_response(response)?;
        resp.choices
            .into_iter()
            .next()
            .map(|c| c.message.content)
            .ok_or_else(|| AiError::ParseError("No response choices".to_string()))
    }

    fn generate_anthropic(&self, messages: Vec<Message>, system: Option<&str>) -> AiResult<String> {
        let messages: Vec<_> = messages
            .into_iter()
            .filter(|m| m.role != Role::System)
            .collect();

        let body = AnthropicRequest {
            model: self.config.model().to_string(),
            max_tokens: self.config.max_tokens,
            messages,
            system: system.map(|s| s.to_string()),
            temperature: Some(self.config.temperature),
        };

        let response = self
            .agent
            .post(&self.config.url())
            .header("Content-Type", "application/json")
            .header("x-api-key", &self.api_key)
            .header("anthropic-version", "2023-06-01")
            .send_json(&body)
            .map_err(|e| AiError::RequestFailed(e.to_string()))?;

        let resp: AnthropicResponse = Self::read_response(response)?;
        resp.content
            .into_iter()
            .find(|c| c.content_type == "text")
            .map(|c| c.text)
            .ok_or_else(|| AiError::ParseError("No text content in response".to_string()))
    }
}

impl TextGenerator for AiClient {
    fn generate_text(&self, prompt: &str, system: Option<&str>) -> AiResult<String> {
        self.generate(vec![Message::user(prompt)], system)
    }
}

// Gemini API types
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct GeminiRequest {
    contents: Vec<GeminiContent>,
    #[serde(skip_serializing_if = "Option::is_none")]
    system_instruction: Option<GeminiContent>,
    generation_config: GeminiGenerationConfig,
}

#[derive(Serialize, Deserialize, Default)]
struct GeminiContent {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    role: Option<String>,
    #[serde(default)]
    parts: Vec<GeminiPart>,
}

#[derive(Serialize, Deserialize)]
struct GeminiPart {
    #[serde(default)]
    text: String,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct GeminiGenerationConfig {
    temperature: f32,
    max_output_tokens: u32,
}

#[derive(Deserialize)]
struct GeminiResponse {
    #[serde(default)]
    candidates: Vec<GeminiCandidate>,
}

#[derive(Deserialize)]
struct GeminiCandidate {
    #[serde(default)]
    content: GeminiContent,
}

// OpenAI API types
#[derive(Serialize)]
struct OpenAiRequest {
    model: String,
    messages: Vec<Message>,
    max_tokens: u32,
    temperature: f32,
}

#[derive(Deserialize)]
struct OpenAiResponse {
    choices: Vec<OpenAiChoice>,
}

#[derive(Deserialize)]
struct OpenAiChoice {
    message: OpenAiMessage,
}

#[derive(Deserialize)]
struct OpenAiMessage {
    content: String,
}

// Anthropic API types
#[derive(Serialize)]
struct AnthropicRequest {
    model: String,
    max_tokens: u32,
    messages: Vec<Message>,
    #[serde(skip_serializing_if = "Option::is_none")]
    system: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    temperature: Option<f32>,
}

#[derive(Deserialize)]
struct AnthropicResponse {
    content: Vec<AnthropicContent>,
}

#[derive(Deserialize)]
struct AnthropicContent {
    #[serde(rename = "type")]
    content_type: String,
    text: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_backend_defaults() {
        assert_eq!(LlmBackend::default(), LlmBackend::Gemini);
        assert_eq!(LlmBackend::Gemini.default_model(), "gemini-3-flash-preview");
        assert_eq!(LlmBackend::Gemini.env_key(), "GEMINI_API_KEY");
        assert!(!LlmBackend::Ollama.requires_api_key());
        assert!(LlmBackend::Ollama.is_openai_compatible());
    }

    #[test]
    fn test_config_model() {
        let config = AiConfig::default();
        assert_eq!(config.model(), "gemini-3-flash-preview");
        assert_eq!(config.temperature, 1.0);

        let config = AiConfig {
            model: Some("custom-model".to_string()),
            ..Default::default()
        };
        assert_eq!(config.model(), "custom-model");
    }

    #[test]
    fn test_gemini_url_includes_model() {
        let config = AiConfig::default();
        assert_eq!(
            config.url(),
            "https://generativelanguage.googleapis.com/v1beta/models/gemini-3-flash-preview:generateContent"
        );

        let config = AiConfig {
            backend: LlmBackend::OpenAi,
            base_url: Some("http://localhost:8080/v1/chat/completions/".into()),
            ..Default::default()
        };
        assert_eq!(config.url(), "http://localhost:8080/v1/chat/completions");
    }

    #[test]
    fn test_backend_from_str() {
        assert_eq!("Gemini".parse::<LlmBackend>().unwrap(), LlmBackend::Gemini);
        assert_eq!("claude".parse::<LlmBackend>().unwrap(), LlmBackend::Anthropic);
        assert_eq!(LlmBackend::OpenAi.to_string(), "openai");
        assert!(matches!(
            "bard".parse::<LlmBackend>(),
            Err(AiError::ConfigError(_))
        ));
    }

    #[test]
    fn test_gemini_request_shape() {
        let body = GeminiRequest {
            contents: vec![GeminiContent {
                role: Some("user".into()),
                parts: vec![GeminiPart { text: "hi".into() }],
            }],
            system_instruction: None,
            generation_config: GeminiGenerationConfig {
                temperature: 1.0,
                max_output_tokens: 4096,
            },
        };
        let value = serde_json::to_value(&body).unwrap();
        assert_eq!(value["contents"][0]["role"], "user");
        assert_eq!(value["contents"][0]["parts"][0]["text"], "hi");
        assert_eq!(value["generationConfig"]["maxOutputTokens"], 4096);
        assert!(value.get("systemInstruction").is_none());
    }

    #[test]
    fn test_gemini_response_joins_parts() {
        let resp: GeminiResponse = serde_json::from_str(
            r#"{"candidates":[{"content":{"role":"model","parts":[{"text":"a"},{"text":"b"}]}}]}"#,
        )
        .unwrap();
        let text: String = resp
            .candidates
            .into_iter()
            .next()
            .map(|c| c.content.parts.into_iter().map(|p| p.text).collect())
            .unwrap_or_default();
        assert_eq!(text, "ab");
    }
}
