//! CLI module for Vidpress
//!
//! This module handles command-line argument parsing and command execution.

use std::path::PathBuf;

use clap::{Parser, Subcommand};

use crate::config_initialization::ConfigOverrides;

pub mod args;
pub mod commands;

/// Vidpress video compressor
///
/// Re-encodes a video into a smaller MP4 with ffmpeg, reporting progress
/// and the size saved.
#[derive(Parser, Debug)]
#[command(name = "vidpress")]
#[command(about = "Vidpress - Compress videos into smaller MP4 files")]
#[command(version)]
#[command(long_about = None)]
pub struct Cli {
    /// Logging level (trace, debug, info, warn, error)
    #[arg(long, global = true)]
    pub log_level: Option<String>,

    /// Emit logs as JSON
    #[arg(long, global = true)]
    pub log_json: bool,

    /// Configuration file to load instead of the default locations
    #[arg(long, global = true, env = "VIDPRESS_CONFIG")]
    pub config: Option<PathBuf>,

    /// The command to execute
    #[command(subcommand)]
    pub command: Commands,
}

/// Available commands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Compress a video file
    Compress(args::CompressArgs),
    /// Check whether a file would be accepted for compression
    Validate(args::ValidateArgs),
    /// Print (or save) the effective configuration
    Config(args::ConfigArgs),
}

impl Cli {
    /// Configuration values set on the command line
    pub fn config_overrides(&self) -> ConfigOverrides {
        let mut overrides = ConfigOverrides {
            config_path: self.config.clone(),
            log_level: self.log_level.clone(),
            log_json: self.log_json.then_some(true),
            ..Default::default()
        };

        match &self.command {
            Commands::Compress(args) => {
                overrides.max_size_mb = args.max_size_mb;
                overrides.codec = args.codec.clone();
                overrides.quality = args.quality.clone();
                overrides.preset = args.preset.clone();
                overrides.max_height = args.max_height;
                overrides.output_dir = args.output_dir.clone();
            }
            Commands::Validate(args) => {
                overrides.max_size_mb = args.max_size_mb;
            }
            Commands::Config(_) => {}
        }

        overrides
    }
}
