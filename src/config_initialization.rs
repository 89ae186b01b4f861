//! Configuration model and hierarchy management
//!
//! Precedence, highest first: CLI flags, `VIDPRESS_*` environment variables,
//! the configuration file, built-in defaults.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::adapters::toml_config::TomlConfigAdapter;
use crate::domain::errors::DomainError;
use crate::domain::model::*;
use crate::engine::progress::TickerSettings;
use crate::error::{VidpressError, VidpressResult};
use crate::ports::LogLevel;

/// Complete application configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct AppConfig {
    pub validation: ValidationSection,
    pub encoder: EncoderSection,
    pub progress: TickerSettings,
    pub logging: LoggingSection,
}

/// `[validation]` table
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ValidationSection {
    pub max_size_mb: u64,
    pub allowed_types: Vec<String>,
}

impl Default for ValidationSection {
    fn default() -> Self {
        let policy = ValidationPolicy::default();
        Self {
            max_size_mb: policy.max_size_mb(),
            allowed_types: policy.allowed_types,
        }
    }
}

/// `[encoder]` table
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EncoderSection {
    pub codec: VideoCodec,
    pub quality: QualityPreset,
    pub preset: String,
    pub max_height: Option<u32>,
    pub audio_bitrate_kbps: u32,
    pub ffmpeg_path: String,
    pub ffprobe_path: String,
    /// Defaults to the input file's directory
    pub output_dir: Option<PathBuf>,
}

impl Default for EncoderSection {
    fn default() -> Self {
        let defaults = CompressionConfig::default();
        Self {
            codec: defaults.codec,
            quality: defaults.quality,
            preset: defaults.preset,
            max_height: defaults.max_height,
            audio_bitrate_kbps: defaults.audio_bitrate_kbps,
            ffmpeg_path: "ffmpeg".to_string(),
            ffprobe_path: "ffprobe".to_string(),
            output_dir: None,
        }
    }
}

/// `[logging]` table
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingSection {
    pub level: String,
    pub json: bool,
}

impl Default for LoggingSection {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            json: false,
        }
    }
}

const ENCODER_PRESETS: [&str; 9] = [
    "ultrafast",
    "superfast",
    "veryfast",
    "faster",
    "fast",
    "medium",
    "slow",
    "slower",
    "veryslow",
];

impl AppConfig {
    /// Validation policy described by the `[validation]` table
    pub fn validation_policy(&self) -> Result<ValidationPolicy, DomainError> {
        ValidationPolicy::new(
            self.validation.max_size_mb.saturating_mul(MIB),
            self.validation.allowed_types.clone(),
        )
    }

    /// Engine settings described by the `[encoder]` table
    pub fn compression_config(&self) -> CompressionConfig {
        CompressionConfig {
            codec: self.encoder.codec,
            quality: self.encoder.quality,
            preset: self.encoder.preset.clone(),
            max_height: self.encoder.max_height,
            audio_bitrate_kbps: self.encoder.audio_bitrate_kbps,
        }
    }

    /// Check the configuration for values the pipeline cannot run with
    pub fn validate(&self) -> Result<(), DomainError> {
        self.validation_policy()
            .map_err(|e| DomainError::ConfigFail(format!("[validation] {}", e)))?;

        LogLevel::parse(&self.logging.level)
            .map_err(|e| DomainError::ConfigFail(format!("[logging] {}", e)))?;

        if !ENCODER_PRESETS.contains(&self.encoder.preset.as_str()) {
            return Err(DomainError::ConfigFail(format!(
                "[encoder] unknown preset '{}'. Valid presets: {}",
                self.encoder.preset,
                ENCODER_PRESETS.join(", ")
            )));
        }
        if self.encoder.max_height == Some(0) {
            return Err(DomainError::ConfigFail(
                "[encoder] max_height must be positive".to_string(),
            ));
        }
        if self.encoder.audio_bitrate_kbps == 0 {
            return Err(DomainError::ConfigFail(
                "[encoder] audio_bitrate_kbps must be positive".to_string(),
            ));
        }

        if self.progress.interval.is_zero() {
            return Err(DomainError::ConfigFail(
                "[progress] tick_interval_ms must be positive".to_string(),
            ));
        }
        if self.progress.step == 0 {
            return Err(DomainError::ConfigFail(
                "[progress] tick_step must be positive".to_string(),
            ));
        }
        if self.progress.cap >= 100 {
            return Err(DomainError::ConfigFail(
                "[progress] tick_cap must be below 100".to_string(),
            ));
        }

        Ok(())
    }
}

/// Values supplied on the command line; `None` leaves lower layers in place
#[derive(Debug, Clone, Default)]
pub struct ConfigOverrides {
    pub config_path: Option<PathBuf>,
    pub log_level: Option<String>,
    pub log_json: Option<bool>,
    pub max_size_mb: Option<u64>,
    pub codec: Option<String>,
    pub quality: Option<String>,
    pub preset: Option<String>,
    pub max_height: Option<u32>,
    pub output_dir: Option<PathBuf>,
}

/// Build the effective configuration following the precedence order
pub fn initialize_configuration(overrides: &ConfigOverrides) -> VidpressResult<AppConfig> {
    // Step 1 and 2: defaults, then file
    let mut config = match resolve_config_file(overrides.config_path.as_deref())? {
        Some(path) => {
            info!("Loading configuration from: {}", path.display());
            TomlConfigAdapter::with_path(&path).load()?
        }
        None => {
            debug!("No configuration file found, using defaults");
            AppConfig::default()
        }
    };

    // Step 3: environment
    let applied = apply_env_overrides(&mut config, |key| std::env::var(key).ok())?;
    if applied > 0 {
        info!("Applied {} environment variable overrides", applied);
    }

    // Step 4: CLI
    apply_cli_overrides(&mut config, overrides)?;

    config.validate()?;
    Ok(config)
}

/// Pick the configuration file: an explicit path must exist, otherwise the
/// first existing well-known location wins
fn resolve_config_file(explicit: Option<&Path>) -> VidpressResult<Option<PathBuf>> {
    if let Some(path) = explicit {
        if !path.exists() {
            return Err(VidpressError::ConfigError {
                message: format!("Config file does not exist: {}", path.display()),
            });
        }
        return Ok(Some(path.to_path_buf()));
    }

    let candidates = [
        PathBuf::from("vidpress.toml"),
        TomlConfigAdapter::default_config_path(),
    ];
    Ok(candidates.into_iter().find(|path| path.exists()))
}

/// Apply `VIDPRESS_*` variables read through `lookup`; returns how many applied
pub fn apply_env_overrides<F>(config: &mut AppConfig, lookup: F) -> VidpressResult<usize>
where
    F: Fn(&str) -> Option<String>,
{
    let mut applied = 0;
    let mut read = |key: &str| {
        let value = lookup(key);
        if let Some(value) = &value {
            debug!("Found environment override: {} = {}", key, value);
            applied += 1;
        }
        value
    };

    if let Some(value) = read("VIDPRESS_LOG_LEVEL") {
        config.logging.level = value;
    }
    if let Some(value) = read("VIDPRESS_LOG_JSON") {
        config.logging.json = parse_env("VIDPRESS_LOG_JSON", &value)?;
    }
    if let Some(value) = read("VIDPRESS_MAX_SIZE_MB") {
        config.validation.max_size_mb = parse_env("VIDPRESS_MAX_SIZE_MB", &value)?;
    }
    if let Some(value) = read("VIDPRESS_CODEC") {
        config.encoder.codec = VideoCodec::parse(&value)?;
    }
    if let Some(value) = read("VIDPRESS_QUALITY") {
        config.encoder.quality = QualityPreset::parse(&value)?;
    }
    if let Some(value) = read("VIDPRESS_PRESET") {
        config.encoder.preset = value;
    }
    if let Some(value) = read("VIDPRESS_FFMPEG_PATH") {
        config.encoder.ffmpeg_path = value;
    }
    if let Some(value) = read("VIDPRESS_FFPROBE_PATH") {
        config.encoder.ffprobe_path = value;
    }
    if let Some(value) = read("VIDPRESS_OUTPUT_DIR") {
        config.encoder.output_dir = Some(PathBuf::from(value));
    }
    if let Some(value) = read("VIDPRESS_TICK_INTERVAL_MS") {
        let millis: u64 = parse_env("VIDPRESS_TICK_INTERVAL_MS", &value)?;
        config.progress.interval = std::time::Duration::from_millis(millis);
    }

    Ok(applied)
}

fn parse_env<T>(key: &str, value: &str) -> VidpressResult<T>
where
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
{
    value.trim().parse().map_err(|e| VidpressError::ConfigError {
        message: format!("Invalid value for {}: {} ({})", key, value, e),
    })
}

/// Apply CLI argument overrides to configuration
pub fn apply_cli_overrides(
    config: &mut AppConfig,
    overrides: &ConfigOverrides,
) -> VidpressResult<()> {
    if let Some(level) = &overrides.log_level {
        config.logging.level = level.clone();
    }
    if let Some(json) = overrides.log_json {
        config.logging.json = json;
    }
    if let Some(max_size_mb) = overrides.max_size_mb {
        config.validation.max_size_mb = max_size_mb;
    }
    if let Some(codec) = &overrides.codec {
        config.encoder.codec = VideoCodec::parse(codec)?;
    }
    if let Some(quality) = &overrides.quality {
        config.encoder.quality = QualityPreset::parse(quality)?;
    }
    if let Some(preset) = &overrides.preset {
        config.encoder.preset = preset.clone();
    }
    if let Some(max_height) = overrides.max_height {
        config.encoder.max_height = Some(max_height);
    }
    if let Some(output_dir) = &overrides.output_dir {
        config.encoder.output_dir = Some(output_dir.clone());
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use std::time::Duration;

    fn env(pairs: &[(&str, &str)]) -> HashMap<String, String> {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn test_defaults_are_valid() {
        let config = AppConfig::default();
        config.validate().unwrap();
        assert_eq!(config.validation.max_size_mb, 2000);
        assert_eq!(config.validation_policy().unwrap(), ValidationPolicy::default());
        assert_eq!(config.compression_config(), CompressionConfig::default());
        assert_eq!(config.progress, TickerSettings::default());
    }

    #[test]
    fn test_env_overrides_apply() {
        let vars = env(&[
            ("VIDPRESS_CODEC", "h264"),
            ("VIDPRESS_QUALITY", "high"),
            ("VIDPRESS_MAX_SIZE_MB", "100"),
            ("VIDPRESS_TICK_INTERVAL_MS", "250"),
            ("VIDPRESS_LOG_JSON", "true"),
        ]);
        let mut config = AppConfig::default();
        let lookup = |key: &str| vars.get(key).cloned();
        let applied = apply_env_overrides(&mut config, lookup).unwrap();

        assert_eq!(applied, 5);
        assert_eq!(config.encoder.codec, VideoCodec::Avc);
        assert_eq!(config.encoder.quality, QualityPreset::High);
        assert_eq!(config.validation.max_size_mb, 100);
        assert_eq!(config.progress.interval, Duration::from_millis(250));
        assert!(config.logging.json);
    }

    #[test]
    fn test_env_override_rejects_garbage() {
        let vars = env(&[("VIDPRESS_MAX_SIZE_MB", "lots")]);
        let mut config = AppConfig::default();
        let lookup = |key: &str| vars.get(key).cloned();
        assert!(apply_env_overrides(&mut config, lookup).is_err());
    }

    #[test]
    fn test_cli_overrides_beat_env() {
        let vars = env(&[("VIDPRESS_QUALITY", "low")]);
        let mut config = AppConfig::default();
        let lookup = |key: &str| vars.get(key).cloned();
        apply_env_overrides(&mut config, lookup).unwrap();

        let overrides = ConfigOverrides {
            quality: Some("very-high".to_string()),
            max_height: Some(720),
            ..Default::default()
        };
        apply_cli_overrides(&mut config, &overrides).unwrap();

        assert_eq!(config.encoder.quality, QualityPreset::VeryHigh);
        assert_eq!(config.encoder.max_height, Some(720));
    }

    #[test]
    fn test_validate_rejects_bad_values() {
        let mut config = AppConfig::default();
        config.progress.cap = 100;
        assert!(config.validate().is_err());

        let mut config = AppConfig::default();
        config.encoder.preset = "warp".to_string();
        assert!(config.validate().is_err());

        let mut config = AppConfig::default();
        config.validation.allowed_types.clear();
        assert!(config.validate().is_err());

        let mut config = AppConfig::default();
        config.logging.level = "chatty".to_string();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_explicit_missing_config_file_is_an_error() {
        let overrides = ConfigOverrides {
            config_path: Some(PathBuf::from("/definitely/not/here/vidpress.toml")),
            ..Default::default()
        };
        assert!(matches!(
            initialize_configuration(&overrides),
            Err(VidpressError::ConfigError { .. })
        ));
    }
}
