// Tracing log adapter - Structured logging using tracing crate

use async_trait::async_trait;
use tracing::{debug, error, info, warn};

use crate::ports::*;

/// Tracing log adapter
#[derive(Debug, Clone)]
pub struct TracingLogAdapter {
    min_level: LogLevel,
}

impl TracingLogAdapter {
    /// Create a new adapter; subscriber setup happens in `utils::logging`
    pub fn new() -> Self {
        Self {
            min_level: LogLevel::Trace,
        }
    }

    /// Drop messages below `level` before they reach tracing
    pub fn with_min_level(mut self, level: LogLevel) -> Self {
        self.min_level = level;
        self
    }

    /// Check if log level should be logged
    fn should_log(&self, level: LogLevel) -> bool {
        level >= self.min_level
    }
}

impl Default for TracingLogAdapter {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl LogPort for TracingLogAdapter {
    async fn info(&self, message: &str) {
        if self.should_log(LogLevel::Info) {
            info!(target: "vidpress::job", "{}", message);
        }
    }

    async fn warn(&self, message: &str) {
        if self.should_log(LogLevel::Warn) {
            warn!(target: "vidpress::job", "{}", message);
        }
    }

    async fn error(&self, message: &str) {
        if self.should_log(LogLevel::Error) {
            error!(target: "vidpress::job", "{}", message);
        }
    }

    async fn debug(&self, message: &str) {
        if self.should_log(LogLevel::Debug) {
            debug!(target: "vidpress::job", "{}", message);
        }
    }
}
