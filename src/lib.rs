//! Vidpress Library
//!
//! Video compression pipeline: file validation, a single-job compression
//! orchestrator with merged progress, failure classification and size
//! metrics, driven by an ffmpeg engine adapter.

pub mod adapters;
pub mod app;
pub mod cli;
pub mod config_initialization;
pub mod domain;
pub mod engine;
pub mod error;
pub mod output;
pub mod ports;
pub mod utils;

// Re-export commonly used types
pub use app::{CompressionOrchestrator, CompressionSession, JobUpdate, OrchestratorPhase};
pub use domain::errors::DomainError;
pub use domain::model::{
    CompressionConfig, CompressionJobRecord, EncodedOutput, EngineFailure, ErrorKind, ErrorRecord,
    JobId, JobStatus, SelectedFile, ValidationPolicy, ValidationResult,
};
pub use error::{VidpressError, VidpressResult};
