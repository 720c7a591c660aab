//! CLI module for Cortex
//!
//! Provides commands:
//! - `serve`: run the HTTP server (default)
//! - `classify`: show how a message would be classified and planned
//! - `workers`: list the configured workers

use crate::server::config::AppConfig;
use clap::{Parser, Subcommand};
use cortex_core::{ExecutionPlanner, TaskClassifier, WorkerRegistry};
use serde_json::json;

/// Cortex LLM orchestrator CLI
#[derive(Parser, Debug)]
#[command(name = "cortex")]
#[command(about = "LLM request orchestration engine")]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Start the server (default)
    Serve,
    /// Classify a message and print the execution plan
    Classify {
        /// Message text
        message: String,
        /// Treat the request as carrying an image
        #[arg(long)]
        image: bool,
    },
    /// List configured workers
    Workers,
}

/// Run the CLI command
pub async fn run(cli: Cli, config: AppConfig) -> anyhow::Result<()> {
    match cli.command {
        None | Some(Commands::Serve) => crate::server::run(config).await,
        Some(Commands::Classify { message, image }) => {
            println!("{}", classify_report(&config, &message, image)?);
            Ok(())
        }
        Some(Commands::Workers) => {
            let registry = WorkerRegistry::from_configs(config.workers);
            for worker in registry.workers() {
                println!(
                    "{:<20} {:<32} {}",
                    worker.name, worker.model, worker.role
                );
            }
            Ok(())
        }
    }
}

fn classify_report(config: &AppConfig, message: &str, image: bool) -> anyhow::Result<String> {
    let classification = TaskClassifier::new().classify(message, image);
    let plan =
        ExecutionPlanner::new(config.planner_config()).plan(classification.category, message, image);
    let report = json!({
        "category": classification.category,
        "rule": classification.rule,
        "scores": classification.card.scores,
        "plan": plan,
    });
    Ok(serde_json::to_string_pretty(&report)?)
}
