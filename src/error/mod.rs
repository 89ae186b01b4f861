//! Error handling module for Vidpress

use thiserror::Error;

use crate::domain::errors::DomainError;

/// Main error type for Vidpress operations
#[derive(Error, Debug)]
pub enum VidpressError {
    /// Input file not found or inaccessible
    #[error("Input file not found: {path}")]
    InputFileNotFound { path: String },

    /// Configuration could not be loaded or is inconsistent
    #[error("Configuration error: {message}")]
    ConfigError { message: String },

    /// Logging subscriber could not be installed
    #[error("Failed to initialize logging: {message}")]
    LoggingInitError { message: String },

    /// Domain error
    #[error(transparent)]
    Domain(#[from] DomainError),

    /// I/O error
    #[error("I/O error: {0}")]
    IoError(#[from] std::io::Error),

    /// TOML parse error
    #[error("Failed to parse TOML configuration: {0}")]
    TomlParse(#[from] toml::de::Error),

    /// TOML serialization error
    #[error("Failed to serialize TOML configuration: {0}")]
    TomlSerialize(#[from] toml::ser::Error),
}

/// Result type alias for Vidpress operations
pub type VidpressResult<T> = std::result::Result<T, VidpressError>;
