// TOML config adapter - Configuration files in TOML

use std::path::{Path, PathBuf};

use crate::config_initialization::AppConfig;
use crate::error::{VidpressError, VidpressResult};

/// Reads and writes [`AppConfig`] as TOML
#[derive(Debug, Clone, Default)]
pub struct TomlConfigAdapter {
    config_file_path: Option<PathBuf>,
}

impl TomlConfigAdapter {
    /// Create an adapter bound to the default config location
    pub fn new() -> Self {
        Self::default()
    }

    /// Create an adapter bound to a specific file
    pub fn with_path(path: impl AsRef<Path>) -> Self {
        Self {
            config_file_path: Some(path.as_ref().to_path_buf()),
        }
    }

    /// Path this adapter reads and writes
    pub fn config_file_path(&self) -> PathBuf {
        self.config_file_path
            .clone()
            .unwrap_or_else(Self::default_config_path)
    }

    /// Get default config file path
    pub fn default_config_path() -> PathBuf {
        // %APPDATA%/Vidpress on Windows, XDG config dir elsewhere
        if let Some(appdata) = std::env::var_os("APPDATA") {
            PathBuf::from(appdata).join("Vidpress").join("config.toml")
        } else if let Some(xdg) = std::env::var_os("XDG_CONFIG_HOME") {
            PathBuf::from(xdg).join("vidpress").join("config.toml")
        } else if let Some(home) = std::env::var_os("HOME") {
            PathBuf::from(home)
                .join(".config")
                .join("vidpress")
                .join("config.toml")
        } else {
            PathBuf::from("vidpress.toml")
        }
    }

    /// Parse configuration from a TOML string; missing keys take defaults
    pub fn parse(toml_content: &str) -> VidpressResult<AppConfig> {
        Ok(toml::from_str(toml_content)?)
    }

    /// Serialize configuration to a TOML string
    pub fn serialize(config: &AppConfig) -> VidpressResult<String> {
        Ok(toml::to_string_pretty(config)?)
    }

    /// Load configuration from the bound file
    pub fn load(&self) -> VidpressResult<AppConfig> {
        let path = self.config_file_path();
        if !path.exists() {
            return Err(VidpressError::ConfigError {
                message: format!("Config file does not exist: {}", path.display()),
            });
        }

        let content = std::fs::read_to_string(&path)?;
        let config = Self::parse(&content)?;
        tracing::debug!(path = %path.display(), "Loaded configuration file");
        Ok(config)
    }

    /// Save configuration to the bound file, creating parent directories
    pub fn save(&self, config: &AppConfig) -> VidpressResult<()> {
        let path = self.config_file_path();
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }

        std::fs::write(&path, Self::serialize(config)?)?;
        tracing::info!(path = %path.display(), "Saved configuration file");
        Ok(())
    }
}
