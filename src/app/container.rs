use std::sync::Arc;

use crate::adapters::{FfmpegEngineAdapter, FfmpegSettings, TracingLogAdapter};
use crate::app::{CompressionOrchestrator, CompressionSession};
use crate::config_initialization::AppConfig;
use crate::domain::errors::DomainError;
use crate::domain::model::ValidationPolicy;
use crate::domain::rules::{FailureClassifier, HeuristicClassifier};
use crate::ports::{EnginePort, LogLevel, LogPort};

pub trait AppContainer: Send + Sync {
    fn engine(&self) -> Arc<dyn EnginePort>;
    fn log_port(&self) -> Arc<dyn LogPort>;
    fn validation_policy(&self) -> &ValidationPolicy;
    /// Fresh orchestrator sharing this container's ports
    fn orchestrator(&self) -> CompressionOrchestrator;
    /// Fresh session wrapping a fresh orchestrator
    fn session(&self) -> CompressionSession;
}

pub struct DefaultAppContainer {
    config: AppConfig,
    policy: ValidationPolicy,
    engine: Arc<dyn EnginePort>,
    log_port: Arc<dyn LogPort>,
    classifier: Arc<dyn FailureClassifier>,
}

impl DefaultAppContainer {
    /// Wire the ffmpeg engine and tracing logger from `config`
    pub fn new(config: AppConfig) -> Result<Self, DomainError> {
        let engine = Arc::new(FfmpegEngineAdapter::new(FfmpegSettings {
            ffmpeg_path: config.encoder.ffmpeg_path.clone(),
            ffprobe_path: config.encoder.ffprobe_path.clone(),
            output_dir: config.encoder.output_dir.clone(),
        }));
        Self::with_engine(config, engine)
    }

    /// Same wiring with a caller-supplied engine
    pub fn with_engine(
        config: AppConfig,
        engine: Arc<dyn EnginePort>,
    ) -> Result<Self, DomainError> {
        config.validate()?;
        let policy = config.validation_policy()?;
        let min_level = LogLevel::parse(&config.logging.level)?;
        let log_port = Arc::new(TracingLogAdapter::new().with_min_level(min_level));

        Ok(Self {
            config,
            policy,
            engine,
            log_port,
            classifier: Arc::new(HeuristicClassifier::new()),
        })
    }

    pub fn config(&self) -> &AppConfig {
        &self.config
    }
}

impl AppContainer for DefaultAppContainer {
    fn engine(&self) -> Arc<dyn EnginePort> {
        Arc::clone(&self.engine)
    }

    fn log_port(&self) -> Arc<dyn LogPort> {
        Arc::clone(&self.log_port)
    }

    fn validation_policy(&self) -> &ValidationPolicy {
        &self.policy
    }

    fn orchestrator(&self) -> CompressionOrchestrator {
        CompressionOrchestrator::new(self.engine(), self.log_port())
            .with_classifier(Arc::clone(&self.classifier))
            .with_config(self.config.compression_config())
            .with_ticker_settings(self.config.progress)
    }

    fn session(&self) -> CompressionSession {
        CompressionSession::new(self.orchestrator(), self.policy.clone())
    }
}
