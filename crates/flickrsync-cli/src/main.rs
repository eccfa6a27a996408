//! flickrsync CLI - Command-line interface for flickrsync
//!
//! Provides commands for:
//! - Authorizing access to a Flickr account
//! - Synchronizing the local photo library with Flickr
//! - Viewing what is recorded and what is pending
//! - Viewing and editing configuration

use std::path::PathBuf;

use anyhow::Result;
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use flickrsync_core::config::Config;

mod commands;
mod output;

use commands::{
    auth::AuthCommand, completions::CompletionsCommand, config::ConfigCommand,
    status::StatusCommand, sync::SyncCommand, CliContext,
};
use output::OutputFormat;

#[derive(Debug, Parser)]
#[command(
    name = "flickrsync",
    version,
    about = "Mirror a local photo library to Flickr, one album per directory"
)]
pub struct Cli {
    /// Output in JSON format
    #[arg(long, global = true)]
    json: bool,

    /// Verbose output (can be repeated: -v, -vv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    /// Use alternate config file
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Minimal output
    #[arg(short, long, global = true)]
    quiet: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Authorization commands
    #[command(subcommand)]
    Auth(AuthCommand),
    /// Synchronize the photo library with Flickr
    Sync(SyncCommand),
    /// Show recorded photos, albums and pending work
    Status(StatusCommand),
    /// View and manage configuration
    #[command(subcommand)]
    Config(ConfigCommand),
    /// Generate shell completions
    Completions(CompletionsCommand),
}

/// Picks the log filter: `RUST_LOG` wins, then `--quiet`, then `-v`,
/// then `logging.level` from the config file
fn log_filter(cli: &Cli, configured_level: &str) -> EnvFilter {
    if let Ok(filter) = EnvFilter::try_from_default_env() {
        return filter;
    }
    let level = if cli.quiet {
        "error"
    } else {
        match cli.verbose {
            0 => configured_level,
            1 => "debug",
            _ => "trace",
        }
    };
    EnvFilter::try_new(level).unwrap_or_else(|_| EnvFilter::new("info"))
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let config_path = cli.config.clone().unwrap_or_else(Config::default_path);
    let configured_level = Config::load_or_default(&config_path).logging.level;

    // Logs go to stderr so JSON output on stdout stays parseable
    let env_filter = log_filter(&cli, &configured_level);
    if cli.json {
        tracing_subscriber::fmt()
            .json()
            .with_env_filter(env_filter)
            .with_writer(std::io::stderr)
            .init();
    } else {
        tracing_subscriber::fmt()
            .with_env_filter(env_filter)
            .with_target(false)
            .with_writer(std::io::stderr)
            .init();
    }

    let format = if cli.json {
        OutputFormat::Json
    } else {
        OutputFormat::Human
    };
    let ctx = CliContext::new(format, config_path, cli.quiet);

    match cli.command {
        Commands::Auth(cmd) => cmd.execute(&ctx).await,
        Commands::Sync(cmd) => cmd.execute(&ctx).await,
        Commands::Status(cmd) => cmd.execute(&ctx).await,
        Commands::Config(cmd) => cmd.execute(&ctx).await,
        Commands::Completions(cmd) => cmd.execute(&ctx).await,
    }
}
