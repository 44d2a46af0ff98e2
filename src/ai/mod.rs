//! LLM commentary on top of a finished snapshot
//!
//! Supports Gemini, Anthropic, OpenAI and a local Ollama server. API keys are
//! read from environment variables (or the user config, see
//! [`crate::config::UserConfig`]).
//!
//! # Environment Variables
//!
//! - `GEMINI_API_KEY`: Required for the Gemini backend (default)
//! - `ANTHROPIC_API_KEY`: Required for the Anthropic backend
//! - `OPENAI_API_KEY`: Required for the OpenAI backend
//!
//! # Example
//!
//! ```rust,ignore
//! use draftmeta::ai::{AiClient, LlmBackend, LlmEnricher};
//!
//! let client = AiClient::from_env(LlmBackend::Gemini)?;
//! let sections = LlmEnricher::new(&client).enrich(&snapshot);
//! let snapshot = snapshot.with_llm(sections);
//! ```

mod client;
mod enrich;
mod prompts;

pub use client::{AiClient, AiConfig, LlmBackend, Message, Role};
pub use enrich::{LlmEnricher, Section};
pub use prompts::PromptBuilder;

use thiserror::Error;

/// Errors that can occur in the AI module
#[derive(Error, Debug)]
pub enum AiError {
    #[error("Missing API key: {env_var} not set. Get your key at {signup_url}")]
    MissingApiKey { env_var: String, signup_url: String },

    #[error("API request failed: {0}")]
    RequestFailed(String),

    #[error("API error: {status} - {message}")]
    ApiError { status: u16, message: String },

    #[error("Failed to parse API response: {0}")]
    ParseError(String),

    #[error("Invalid configuration: {0}")]
    ConfigError(String),
}

pub type AiResult<T> = Result<T, AiError>;

/// Anything that turns a prompt into text
///
/// [`AiClient`] is the production implementation; tests plug in canned
/// responses.
pub trait TextGenerator {
    fn generate_text(&self, prompt: &str, system: Option<&str>) -> AiResult<String>;
}
