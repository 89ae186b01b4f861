// Ports - Interface definitions (contracts)

use std::sync::Arc;

use async_trait::async_trait;

use crate::domain::model::*;

/// Receives the engine's fractional progress in `[0, 1]`
pub type ProgressSink = Arc<dyn Fn(f64) + Send + Sync>;

/// Port for the encoding engine
#[async_trait]
pub trait EnginePort: Send + Sync {
    /// Encode `source` with `config`.
    ///
    /// `on_progress`, when given, may be called any number of times before
    /// the future resolves. Failures carry a human-readable message.
    async fn encode(
        &self,
        source: &SelectedFile,
        config: &CompressionConfig,
        on_progress: Option<ProgressSink>,
    ) -> Result<EncodedOutput, EngineFailure>;

    /// Short engine name for logs
    fn name(&self) -> &str {
        "engine"
    }
}

/// Port for logging and observability
#[async_trait]
pub trait LogPort: Send + Sync {
    /// Log info message
    async fn info(&self, message: &str);

    /// Log warning message
    async fn warn(&self, message: &str);

    /// Log error message
    async fn error(&self, message: &str);

    /// Log debug message
    async fn debug(&self, message: &str);
}

/// Log level enumeration
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum LogLevel {
    Trace,
    Debug,
    Info,
    Warn,
    Error,
}

impl LogLevel {
    /// Parse log level from string
    pub fn parse(level_str: &str) -> Result<Self, crate::domain::errors::DomainError> {
        match level_str.to_lowercase().as_str() {
            "trace" => Ok(LogLevel::Trace),
            "debug" => Ok(LogLevel::Debug),
            "info" => Ok(LogLevel::Info),
            "warn" => Ok(LogLevel::Warn),
            "error" => Ok(LogLevel::Error),
            _ => Err(crate::domain::errors::DomainError::BadArgs(format!(
                "Invalid log level: {}. Valid levels: trace, debug, info, warn, error",
                level_str
            ))),
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            LogLevel::Trace => "trace",
            LogLevel::Debug => "debug",
            LogLevel::Info => "info",
            LogLevel::Warn => "warn",
            LogLevel::Error => "error",
        }
    }
}
