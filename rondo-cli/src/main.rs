//! Rondo CLI
//!
//! Hotkey-driven circular video notes for Telegram.
//!
//! # Usage
//!
//! ```bash
//! # Record and send notes (F10 toggles, Esc cancels, Ctrl-C quits)
//! rondo run
//!
//! # List the destinations the bot can send to
//! rondo destinations
//!
//! # Check ffmpeg, credentials and displays
//! rondo check
//! ```

mod commands;

use anyhow::Result;
use clap::{Parser, Subcommand};
use tracing::Level;
use tracing_subscriber::EnvFilter;

/// Rondo - circular video notes for Telegram
#[derive(Parser)]
#[command(name = "rondo")]
#[command(version)]
#[command(about = "Hotkey-driven circular video notes for Telegram", long_about = None)]
#[command(propagate_version = true)]
struct Cli {
    /// Enable verbose logging
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Subcommand to run
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Record and deliver video notes until interrupted
    Run,

    /// List the destinations the messaging client can send to
    #[command(alias = "ls")]
    Destinations,

    /// Check ffmpeg, credentials and display availability
    Check,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Set up logging based on verbosity
    let level = match cli.verbose {
        0 => Level::INFO,
        1 => Level::DEBUG,
        _ => Level::TRACE,
    };

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::from_default_env()
                .add_directive(format!("rondo={}", level).parse()?),
        )
        .with_target(false)
        .init();

    match cli.command {
        Commands::Run => commands::run(),
        Commands::Destinations => commands::destinations(),
        Commands::Check => commands::check(),
    }
}
