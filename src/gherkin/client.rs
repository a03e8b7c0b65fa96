//! Chat-completions client that turns an interaction map into Gherkin
//! scenarios.

use crate::gherkin::config::CompletionConfig;
use anyhow::{bail, Context, Result};
use serde::{Deserialize, Serialize};

/// Low temperature and tight nucleus sampling: the output must stay close to
/// the recorded facts, not invent behaviors
const TEMPERATURE: f32 = 0.1;
const TOP_P: f32 = 0.85;

#[derive(Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage<'a>>,
    temperature: f32,
    max_tokens: u32,
    top_p: f32,
}

#[derive(Serialize)]
struct ChatMessage<'a> {
    role: &'static str,
    content: &'a str,
}

#[derive(Deserialize)]
struct ChatResponse {
    choices: Vec<Choice>,
}

#[derive(Deserialize)]
struct Choice {
    message: ChoiceMessage,
}

#[derive(Deserialize)]
struct ChoiceMessage {
    content: String,
}

pub struct GherkinGenerator {
    config: CompletionConfig,
    client: reqwest::Client,
}

impl GherkinGenerator {
    pub fn new(config: CompletionConfig) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(config.timeout)
            .build()
            .context("Failed to build HTTP client")?;
        Ok(Self { config, client })
    }

    /// Run one completion request and return the cleaned feature text.
    /// A failed request is reported, not retried; the caller reruns the
    /// command when the failure was transient.
    pub async fn generate(&self, system_prompt: &str, scan_json: &str) -> Result<String> {
        let user_message = format!(
            "Based on the following JSON scan results, generate Gherkin test scenarios:\n\n\
             {}\n\n\
             Generate the Gherkin feature file now.",
            scan_json
        );

        let request = ChatRequest {
            model: &self.config.model,
            messages: vec![
                ChatMessage {
                    role: "system",
                    content: system_prompt,
                },
                ChatMessage {
                    role: "user",
                    content: &user_message,
                },
            ],
            temperature: TEMPERATURE,
            max_tokens: self.config.max_tokens,
            top_p: TOP_P,
        };

        let url = format!("{}/chat/completions", self.config.base_url);
        log::info!("Requesting scenarios from {} ({})", url, self.config.model);

        let response = self
            .client
            .post(&url)
            .bearer_auth(&self.config.api_key)
            .json(&request)
            .send()
            .await
            .context("Completion request failed")?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            bail!("Completion endpoint returned HTTP {}: {}", status, body);
        }

        let parsed: ChatResponse = response
            .json()
            .await
            .context("Completion response was not valid JSON")?;
        let content = parsed
            .choices
            .first()
            .context("Completion response contained no choices")?
            .message
            .content
            .as_str();

        Ok(trim_to_feature(content))
    }
}

/// Strip any model chatter before the first `Feature:` marker. Text without
/// the marker is passed through trimmed.
pub fn trim_to_feature(raw: &str) -> String {
    let trimmed = raw.trim();
    if trimmed.starts_with("Feature:") {
        return trimmed.to_string();
    }
    match trimmed.find("Feature:") {
        Some(pos) => trimmed[pos..].to_string(),
        None => trimmed.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_trim_passes_clean_feature_through() {
        let text = "Feature: Homepage interactions\n  Scenario: Click FAQ";
        assert_eq!(trim_to_feature(text), text);
    }

    #[test]
    fn test_trim_strips_leading_chatter() {
        let text = "Sure! Here are the scenarios:\n\nFeature: Homepage\n  Scenario: x";
        assert_eq!(trim_to_feature(text), "Feature: Homepage\n  Scenario: x");
    }

    #[test]
    fn test_trim_without_marker_trims_whitespace_only() {
        assert_eq!(trim_to_feature("  some text  \n"), "some text");
    }

    #[test]
    fn test_request_shape() {
        let request = ChatRequest {
            model: "llama-3.3-70b-versatile",
            messages: vec![ChatMessage {
                role: "system",
                content: "prompt",
            }],
            temperature: TEMPERATURE,
            max_tokens: 8000,
            top_p: TOP_P,
        };
        let value = serde_json::to_value(&request).unwrap();
        assert_eq!(value["model"], "llama-3.3-70b-versatile");
        assert_eq!(value["messages"][0]["role"], "system");
        assert!((value["temperature"].as_f64().unwrap() - 0.1).abs() < 1e-6);
        assert!((value["top_p"].as_f64().unwrap() - 0.85).abs() < 1e-6);
        assert_eq!(value["max_tokens"], 8000);
    }
}
