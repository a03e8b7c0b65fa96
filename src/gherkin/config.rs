//! Completion-endpoint configuration, read from the environment.

use anyhow::{Context, Result};
use std::time::Duration;

pub const DEFAULT_MODEL: &str = "llama-3.3-70b-versatile";
pub const DEFAULT_MAX_TOKENS: u32 = 8000;
pub const DEFAULT_BASE_URL: &str = "https://api.groq.com/openai/v1";

/// Settings for the chat-completions call that writes the feature file
#[derive(Debug, Clone)]
pub struct CompletionConfig {
    pub api_key: String,
    pub base_url: String,
    pub model: String,
    pub max_tokens: u32,
    pub timeout: Duration,
}

impl CompletionConfig {
    /// Load from environment variables, with `.env` as a fallback source.
    /// Only the API key is required; everything else has a default.
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok();

        let api_key = std::env::var("GROQ_API_KEY")
            .context("GROQ_API_KEY not found. Set it in the environment or in a .env file.")?;

        let base_url = std::env::var("GROQ_BASE_URL")
            .unwrap_or_else(|_| DEFAULT_BASE_URL.to_string())
            .trim_end_matches('/')
            .to_string();

        let model = std::env::var("MODEL_NAME").unwrap_or_else(|_| DEFAULT_MODEL.to_string());

        let max_tokens = match std::env::var("MAX_TOKENS") {
            Ok(raw) => raw
                .parse::<u32>()
                .with_context(|| format!("MAX_TOKENS is not a number: '{}'", raw))?,
            Err(_) => DEFAULT_MAX_TOKENS,
        };

        let timeout_secs = match std::env::var("GROQ_TIMEOUT_SECS") {
            Ok(raw) => raw
                .parse::<u64>()
                .with_context(|| format!("GROQ_TIMEOUT_SECS is not a number: '{}'", raw))?,
            Err(_) => 120,
        };

        Ok(Self {
            api_key,
            base_url,
            model,
            max_tokens,
            timeout: Duration::from_secs(timeout_secs),
        })
    }
}
