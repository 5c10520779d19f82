use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Parser;
use coordination::TopicPrompt;
use court_agents::console::{FixedTopic, StdinTopicPrompt};
use court_agents::{Court, CourtConfig};
use tracing::info;

/// Put a historical figure or event on trial.
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Topic to try; prompts on stdin when omitted
    #[arg(long)]
    topic: Option<String>,

    /// Maximum review iterations (overrides MOOT_MAX_ITERATIONS)
    #[arg(long)]
    max_iterations: Option<u32>,

    /// Directory verdicts are written to (overrides MOOT_VERDICT_DIR)
    #[arg(long)]
    verdict_dir: Option<PathBuf>,

    /// TOML configuration file
    #[arg(long)]
    config: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".into()),
        )
        .init();

    let args = Args::parse();

    let mut config = CourtConfig::load(args.config.as_deref())?;
    if let Some(n) = args.max_iterations {
        config.trial.max_iterations = n;
    }
    if let Some(dir) = args.verdict_dir {
        config.verdict_dir = dir;
    }

    let prompt: Arc<dyn TopicPrompt> = match args.topic {
        Some(topic) => Arc::new(FixedTopic(topic)),
        None => Arc::new(StdinTopicPrompt::new()),
    };

    let court = Court::from_config(&config, prompt)?;
    let report = court.start().await.context("trial failed")?;

    info!(summary = %report.outcome.summary_line(), "trial closed");
    if report.outcome.is_forced() {
        println!(
            "The court reached the iteration cap ({}) without a sufficient judgment; the record may be incomplete.",
            report.outcome.iterations
        );
    }
    println!("Verdict saved to {}", report.verdict.confirmation);

    Ok(())
}
