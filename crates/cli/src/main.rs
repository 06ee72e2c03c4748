//! SourceChat CLI — the main entry point.
//!
//! Commands:
//! - `chat`     — Interactive chat, optionally grounded in a URL or PDF
//! - `ask`      — Ask a single question and print the answer
//! - `onboard`  — Write a default config file
//! - `doctor`   — Diagnose configuration

use std::path::PathBuf;

use clap::{Parser, Subcommand};

mod commands;
mod input;
mod repl;

#[derive(Parser)]
#[command(
    name = "sourcechat",
    about = "SourceChat — ask questions grounded in a web page or PDF",
    version,
    author
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Use this config file instead of ~/.sourcechat/config.toml
    #[arg(short, long, global = true, env = "SOURCECHAT_CONFIG")]
    config: Option<PathBuf>,
}

#[derive(Subcommand)]
enum Commands {
    /// Start an interactive chat session
    Chat {
        /// Ground questions in this web page
        #[arg(short, long)]
        url: Option<String>,

        /// Ground questions in this PDF file
        #[arg(short, long)]
        pdf: Option<PathBuf>,
    },

    /// Ask a single question
    Ask {
        /// The question
        question: String,

        /// Ground the question in this web page
        #[arg(short, long)]
        url: Option<String>,

        /// Ground the question in this PDF file
        #[arg(short, long)]
        pdf: Option<PathBuf>,
    },

    /// Write a default configuration file
    Onboard {
        /// Overwrite an existing config file
        #[arg(long)]
        force: bool,
    },

    /// Diagnose configuration and connectivity
    Doctor {
        /// Also check that the provider is reachable
        #[arg(long)]
        ping: bool,
    },
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Values in .env replace inherited ones. A missing .env is fine.
    let _ = dotenvy::dotenv_override();

    let cli = Cli::parse();

    // Initialize tracing
    let filter = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(filter)),
        )
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    let config_path = cli.config.as_deref();
    match cli.command {
        Commands::Chat { url, pdf } => commands::chat::run(config_path, url, pdf).await?,
        Commands::Ask { question, url, pdf } => {
            commands::ask::run(config_path, question, url, pdf).await?
        }
        Commands::Onboard { force } => commands::onboard::run(config_path, force).await?,
        Commands::Doctor { ping } => commands::doctor::run(config_path, ping).await?,
    }

    Ok(())
}
