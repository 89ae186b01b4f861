//! Vidpress video compressor
//!
//! Compresses a video file into a smaller MP4 using ffmpeg, with merged
//! progress reporting and before/after size metrics.
//!
//! # Usage
//!
//! ```bash
//! vidpress compress holiday.mov --quality high --max-height 1080
//! vidpress validate holiday.mov --json
//! vidpress config --write
//! ```

use anyhow::{Context, Result};
use clap::Parser;
use tracing::info;

use vidpress::cli::{commands, Cli, Commands};
use vidpress::config_initialization::initialize_configuration;
use vidpress::ports::LogLevel;
use vidpress::utils::logging::init_logging;

/// Main entry point for the Vidpress CLI application
#[tokio::main]
async fn main() -> Result<()> {
    // Parse command line arguments
    let cli = Cli::parse();

    let config = initialize_configuration(&cli.config_overrides())
        .context("Failed to load configuration")?;

    // Initialize logging
    let level = LogLevel::parse(&config.logging.level)?;
    init_logging(level, config.logging.json)?;

    info!("Starting Vidpress {}", env!("CARGO_PKG_VERSION"));

    // Execute the requested command
    match cli.command {
        Commands::Compress(args) => {
            info!("Executing compress command");
            commands::compress(args, config).await?;
        }
        Commands::Validate(args) => {
            info!("Executing validate command");
            commands::validate(args, config).await?;
        }
        Commands::Config(args) => {
            commands::show_config(args, &config, cli.config.as_deref())?;
        }
    }

    Ok(())
}
