use anyhow::Result;
use clap::{Parser, Subcommand};
use interaction_scout::{gherkin, LaunchOptions, ScanConfig, Scanner, SessionFactory};
use std::path::PathBuf;

/// Fallback target when no URL is given on the command line
const DEFAULT_URL: &str = "https://www.tivdak.com/patient-stories/";

#[derive(Parser)]
#[command(author, version, about = "Scans a web page for interactive affordances and generates Gherkin scenarios", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Scan a page and write its interaction map as JSON
    Scan {
        /// Page to scan
        url: Option<String>,

        /// Where to write the interaction map
        #[arg(long, default_value = "homepage_interactions.json")]
        output: PathBuf,

        /// Run Chrome without a visible window
        #[arg(long)]
        headless: bool,

        /// Disable the Chrome sandbox (needed in most CI containers)
        #[arg(long)]
        no_sandbox: bool,

        /// Path to the Chrome executable
        #[arg(long)]
        chrome_path: Option<String>,
    },

    /// Generate a Gherkin feature file from a recorded interaction map
    Generate {
        /// Interaction map produced by a previous scan
        #[arg(long, default_value = "homepage_interactions.json")]
        input: PathBuf,

        /// Prompt template used as the system message
        #[arg(long, default_value = "Gherkin_Prompt.md")]
        prompt: PathBuf,

        /// Where to write the feature file
        #[arg(long, default_value = "ai_generated_scenarios.feature")]
        output: PathBuf,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    env_logger::init();
    let cli = Cli::parse();

    match cli.command {
        Command::Scan {
            url,
            output,
            headless,
            no_sandbox,
            chrome_path,
        } => {
            let url = url.unwrap_or_else(|| DEFAULT_URL.to_string());
            let factory = SessionFactory::new(LaunchOptions {
                chrome_path,
                no_sandbox,
                headless,
            });
            let scanner = Scanner::new(factory, ScanConfig::default());

            let map = scanner
                .scan(&url)
                .await
                .map_err(|e| anyhow::anyhow!("Scan failed: {}", e))?;

            println!("{}", map.to_pretty_json()?);
            map.write_to_file(&output).await?;
            println!("Saved interaction map to {}", output.display());
        }
        Command::Generate {
            input,
            prompt,
            output,
        } => {
            gherkin::generate_feature_file(&input, &prompt, &output).await?;
            println!("Saved scenarios to {}", output.display());
        }
    }

    Ok(())
}
