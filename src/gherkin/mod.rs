//! Gherkin scenario generation from a recorded interaction map.

pub mod client;
pub mod config;

pub use client::GherkinGenerator;
pub use config::CompletionConfig;

use anyhow::{Context, Result};
use std::path::Path;

/// Read the prompt template that becomes the system message
pub fn load_prompt_template(path: &Path) -> Result<String> {
    std::fs::read_to_string(path).with_context(|| {
        format!(
            "Prompt template '{}' not found. Create it before generating scenarios.",
            path.display()
        )
    })
}

/// Full generation flow: load config and inputs, call the completion
/// endpoint, write the feature file.
///
/// Configuration and input errors surface before any network traffic.
pub async fn generate_feature_file(input: &Path, prompt: &Path, output: &Path) -> Result<()> {
    let config = CompletionConfig::from_env()?;
    let system_prompt = load_prompt_template(prompt)?;

    let raw = std::fs::read_to_string(input)
        .with_context(|| format!("Scan results '{}' not found. Run a scan first.", input.display()))?;
    let map: serde_json::Value = serde_json::from_str(&raw)
        .with_context(|| format!("'{}' is not valid JSON", input.display()))?;
    let scan_json = serde_json::to_string_pretty(&map)?;

    let generator = GherkinGenerator::new(config)?;
    log::info!("Generating Gherkin scenarios from {}", input.display());
    let feature = generator.generate(&system_prompt, &scan_json).await?;

    std::fs::write(output, &feature)
        .with_context(|| format!("Failed to write {}", output.display()))?;
    log::info!("Scenarios written to {}", output.display());
    Ok(())
}
