//! CLI parser and dispatch.

mod commands;

use clap::{Parser, Subcommand};

use crate::config::CrawlSettings;

#[derive(Parser)]
#[command(name = "geoscout")]
#[command(about = "Distributed geospatial-AI crawl fleet")]
#[command(version)]
pub struct Cli {
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
    /// Enqueue seed URLs into the crawl queue
    Enqueue {
        /// URLs to enqueue
        #[arg(required = true)]
        urls: Vec<String>,

        /// Priority for the seeds (larger is claimed sooner)
        #[arg(short, long, default_value = "0")]
        priority: i32,
    },

    /// Run a crawl worker until interrupted
    Work,

    /// Show queue depth per status
    Status,
}

/// Parse arguments and run the selected command.
pub async fn run() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let settings = CrawlSettings::from_env();

    match cli.command {
        Commands::Enqueue { urls, priority } => {
            commands::cmd_enqueue(&settings, &urls, priority).await
        }
        Commands::Work => commands::cmd_work(settings).await,
        Commands::Status => commands::cmd_status(&settings).await,
    }
}
