//! Scholar CLI
//!
//! Main entry point for the scholar command-line tool: a study assistant
//! that answers from your documents, a default document folder, or the web.

mod bootstrap;
mod commands;

use clap::{Parser, Subcommand};
use commands::{AskCommand, ChatCommand, GuideCommand, IndexCommand};
use scholar_core::{logging, AppConfig, AppResult};
use std::path::PathBuf;

/// Scholar - a study assistant grounded in your documents
#[derive(Parser, Debug)]
#[command(name = "scholar")]
#[command(about = "A study assistant grounded in your documents", long_about = None)]
#[command(version)]
struct Cli {
    /// Path to workspace directory (default: current directory)
    #[arg(short, long, global = true, env = "SCHOLAR_WORKSPACE")]
    workspace: Option<PathBuf>,

    /// Path to config file
    #[arg(short, long, global = true, env = "SCHOLAR_CONFIG")]
    config: Option<PathBuf>,

    /// Log level (error, warn, info, debug, trace)
    #[arg(long, global = true, env = "RUST_LOG")]
    log_level: Option<String>,

    /// Enable verbose output (sets log level to debug)
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Disable colored output
    #[arg(long, global = true, env = "NO_COLOR")]
    no_color: bool,

    /// Chat provider (gemini, ollama)
    #[arg(short, long, global = true, env = "SCHOLAR_PROVIDER")]
    provider: Option<String>,

    /// Chat model identifier
    #[arg(short, long, global = true, env = "SCHOLAR_MODEL")]
    model: Option<String>,

    /// Default document folder (relative to the workspace)
    #[arg(long, global = true, env = "SCHOLAR_CORPUS")]
    corpus: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Start an interactive study session
    Chat(ChatCommand),

    /// Ask a single question
    Ask(AskCommand),

    /// Index the default document folder and report statistics
    Index(IndexCommand),

    /// Show how to use the study assistant
    Guide(GuideCommand),
}

#[tokio::main]
async fn main() -> AppResult<()> {
    // Credentials may live in a local .env file
    dotenvy::dotenv().ok();

    let cli = Cli::parse();

    // The workspace and config file decide which YAML layer is merged
    let config = AppConfig::load_with(cli.workspace.clone(), cli.config.clone())?;

    let config = config.with_overrides(
        cli.workspace,
        cli.config,
        cli.provider,
        cli.model,
        cli.corpus,
        cli.log_level,
        cli.verbose,
        cli.no_color,
    );

    logging::init_logging(config.log_level.as_deref(), config.no_color)?;

    tracing::info!("Scholar CLI starting");
    tracing::debug!("Workspace: {:?}", config.workspace);
    tracing::debug!("Provider: {}", config.provider);
    tracing::debug!("Model: {}", config.model);
    tracing::debug!("Corpus: {:?}", config.corpus_path());

    config.validate()?;

    let command_name = match &cli.command {
        Commands::Chat(_) => "chat",
        Commands::Ask(_) => "ask",
        Commands::Index(_) => "index",
        Commands::Guide(_) => "guide",
    };
    let _span = tracing::info_span!("command", name = command_name).entered();

    let result = match cli.command {
        Commands::Chat(cmd) => cmd.execute(&config).await,
        Commands::Ask(cmd) => cmd.execute(&config).await,
        Commands::Index(cmd) => cmd.execute(&config).await,
        Commands::Guide(cmd) => cmd.execute(&config),
    };

    match &result {
        Ok(_) => tracing::info!("Command completed successfully"),
        Err(e) => tracing::error!("Command failed: {}", e),
    }

    result
}
