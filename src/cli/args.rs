//! Command-line argument definitions

use std::path::PathBuf;

use clap::Args;

/// Arguments for the compress command
#[derive(Args, Debug)]
pub struct CompressArgs {
    /// Input video file path
    pub input: PathBuf,

    /// MIME type to assume instead of guessing from the extension
    #[arg(long)]
    pub mime: Option<String>,

    /// Video codec (hevc, avc)
    #[arg(long)]
    pub codec: Option<String>,

    /// Quality preset (very-low, low, medium, high, very-high)
    #[arg(long)]
    pub quality: Option<String>,

    /// Encoder speed preset (ultrafast .. veryslow)
    #[arg(long)]
    pub preset: Option<String>,

    /// Downscale to at most this many lines
    #[arg(long)]
    pub max_height: Option<u32>,

    /// Directory for the compressed file (default: next to the input)
    #[arg(short, long)]
    pub output_dir: Option<PathBuf>,

    /// Largest accepted input in MiB
    #[arg(long)]
    pub max_size_mb: Option<u64>,

    /// Retry this many times after a failed attempt
    #[arg(long, default_value_t = 0)]
    pub retries: u32,

    /// Report progress as JSON lines
    #[arg(long)]
    pub json: bool,
}

/// Arguments for the validate command
#[derive(Args, Debug)]
pub struct ValidateArgs {
    /// Input video file path
    pub input: PathBuf,

    /// MIME type to assume instead of guessing from the extension
    #[arg(long)]
    pub mime: Option<String>,

    /// Largest accepted input in MiB
    #[arg(long)]
    pub max_size_mb: Option<u64>,

    /// Output in JSON format
    #[arg(long)]
    pub json: bool,
}

/// Arguments for the config command
#[derive(Args, Debug)]
pub struct ConfigArgs {
    /// Output in JSON format instead of TOML
    #[arg(long)]
    pub json: bool,

    /// Also save the effective configuration to the config file
    #[arg(long, conflicts_with = "json")]
    pub write: bool,
}
