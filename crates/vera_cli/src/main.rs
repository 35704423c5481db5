//! Vera CLI - terminal chat and offline evaluation.

mod commands;

use anyhow::Result;
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "vera")]
#[command(about = "Vera - routes your question to the right model and runs it", long_about = None)]
#[command(version)]
struct Cli {
    /// Configuration file
    #[arg(long, default_value = "vera.toml")]
    config: PathBuf,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Interactive chat session
    Chat,

    /// Ask a single question and exit
    Ask {
        /// The query to route
        query: String,
    },

    /// Compare strategy accuracy on a labeled query set (offline)
    Eval {
        /// JSON file of {"user_query", "expected_model"} cases
        #[arg(long, default_value = "test_queries.json")]
        queries: PathBuf,
    },

    /// List the model catalog
    Catalog,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .init();

    let cli = Cli::parse();
    let config = vera_core::VeraConfig::load(&cli.config)?;

    match cli.command {
        Commands::Chat => commands::chat(&config).await,
        Commands::Ask { query } => commands::ask(&config, &query).await,
        Commands::Eval { queries } => commands::eval(&config, &queries).await,
        Commands::Catalog => commands::catalog(&config),
    }
}
