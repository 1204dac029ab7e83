//! Command-line interface.
//!
//! The CLI is a thin collaborator harness around the synthesis core: it
//! reads UTF-8 text files as documents, drives a synthesis run, and prints
//! the resulting study guide.

mod commands;

use std::path::PathBuf;

use clap::{Parser, Subcommand};

use crate::config::Config;

#[derive(Parser)]
#[command(name = "study")]
#[command(about = "AI-assisted study guide synthesis from document collections")]
#[command(version)]
pub struct Cli {
    /// Config file path (overrides auto-discovery)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Inference service endpoint (overrides config file)
    #[arg(short, long, global = true, env = "STUDYFORGE_ENDPOINT")]
    endpoint: Option<String>,

    /// Model name (overrides preference-based selection)
    #[arg(short, long, global = true)]
    model: Option<String>,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

/// Check if verbose mode is enabled (for early logging setup).
pub fn is_verbose() -> bool {
    std::env::args().any(|arg| arg == "-v" || arg == "--verbose")
}

#[derive(Subcommand)]
enum Commands {
    /// Generate a study guide from text or markdown files
    Generate {
        /// Input files (UTF-8 text; one document per file)
        #[arg(required = true)]
        files: Vec<PathBuf>,
        /// Request streamed responses from the inference service
        #[arg(long)]
        stream: bool,
        /// Print the combined analysis as JSON instead of formatted sections
        #[arg(long)]
        json: bool,
    },

    /// List models reported by the inference service
    Models,

    /// Probe inference service availability
    Check,
}

/// Run the CLI.
pub async fn run() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let mut config = Config::load(cli.config.as_deref());
    if let Some(endpoint) = cli.endpoint {
        config.inference.endpoint = endpoint;
    }
    if let Some(model) = cli.model {
        config.inference.model = Some(model);
    }

    match cli.command {
        Commands::Generate {
            files,
            stream,
            json,
        } => {
            config.inference.stream = stream;
            commands::cmd_generate(config, &files, json).await
        }
        Commands::Models => commands::cmd_models(config).await,
        Commands::Check => commands::cmd_check(config).await,
    }
}
