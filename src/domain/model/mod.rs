// Domain models - Core types and data structures

use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::domain::errors::DomainError;

/// One mebibyte in bytes
pub const MIB: u64 = 1024 * 1024;

/// Default maximum accepted file size (2000 MiB)
pub const DEFAULT_MAX_FILE_SIZE: u64 = 2000 * MIB;

/// Default accepted MIME types, in the order they are reported to the user
pub const ALLOWED_VIDEO_TYPES: [&str; 4] = [
    "video/mp4",
    "video/quicktime", // MOV
    "video/x-msvideo", // AVI
    "video/webm",
];

/// Closed taxonomy of user-facing error kinds
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ErrorKind {
    /// Declared MIME type is not in the allow-list
    UnsupportedType,
    /// Byte size exceeds the policy limit
    Oversized,
    /// Engine rejected the codec or container
    CodecOrFormatError,
    /// Engine ran out of memory
    ResourceExhausted,
    /// Engine found the input corrupted or structurally invalid
    CorruptInput,
    /// Anything else the engine reported
    UnknownFailure,
}

impl ErrorKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorKind::UnsupportedType => "unsupported-type",
            ErrorKind::Oversized => "oversized",
            ErrorKind::CodecOrFormatError => "codec-or-format-error",
            ErrorKind::ResourceExhausted => "resource-exhausted",
            ErrorKind::CorruptInput => "corrupt-input",
            ErrorKind::UnknownFailure => "unknown-failure",
        }
    }
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// User-facing error with its taxonomy kind
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ErrorRecord {
    pub kind: ErrorKind,
    pub message: String,
    /// Raw engine message kept for diagnostics
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cause: Option<String>,
}

impl ErrorRecord {
    pub fn new(kind: ErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
            cause: None,
        }
    }

    pub fn with_cause(mut self, cause: impl Into<String>) -> Self {
        self.cause = Some(cause.into());
        self
    }
}

impl fmt::Display for ErrorRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({})", self.message, self.kind)
    }
}

/// Acceptance limits applied to submitted files
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ValidationPolicy {
    pub max_size: u64,
    pub allowed_types: Vec<String>,
}

impl ValidationPolicy {
    /// Create a policy, rejecting a zero size limit or an empty allow-list
    pub fn new(max_size: u64, allowed_types: Vec<String>) -> Result<Self, DomainError> {
        if max_size == 0 {
            return Err(DomainError::BadArgs(
                "Maximum file size must be positive".to_string(),
            ));
        }
        if allowed_types.is_empty() {
            return Err(DomainError::BadArgs(
                "At least one accepted MIME type is required".to_string(),
            ));
        }
        Ok(Self {
            max_size,
            allowed_types,
        })
    }

    pub fn accepts_type(&self, mime_type: &str) -> bool {
        self.allowed_types.iter().any(|t| t == mime_type)
    }

    /// Size limit in MB, rounded to the nearest whole number
    pub fn max_size_mb(&self) -> u64 {
        (self.max_size as f64 / MIB as f64).round() as u64
    }
}

impl Default for ValidationPolicy {
    fn default() -> Self {
        Self {
            max_size: DEFAULT_MAX_FILE_SIZE,
            allowed_types: ALLOWED_VIDEO_TYPES.iter().map(|t| t.to_string()).collect(),
        }
    }
}

/// Outcome of validating a file against a policy
#[derive(Debug, Clone, PartialEq)]
pub enum ValidationResult {
    Valid,
    Invalid(ErrorRecord),
}

impl ValidationResult {
    pub fn is_valid(&self) -> bool {
        matches!(self, ValidationResult::Valid)
    }

    pub fn error(&self) -> Option<&ErrorRecord> {
        match self {
            ValidationResult::Valid => None,
            ValidationResult::Invalid(error) => Some(error),
        }
    }
}

/// Validation state of a selected file; the error only exists when invalid
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "status", content = "error", rename_all = "lowercase")]
pub enum ValidationStatus {
    Pending,
    Valid,
    Invalid(ErrorRecord),
}

/// A candidate file submitted by the user
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SelectedFile {
    pub path: PathBuf,
    pub name: String,
    pub mime_type: String,
    pub size: u64,
    pub validation: ValidationStatus,
}

impl SelectedFile {
    /// Create a pending file from its declared attributes
    pub fn new(
        path: impl Into<PathBuf>,
        name: impl Into<String>,
        mime_type: impl Into<String>,
        size: u64,
    ) -> Self {
        Self {
            path: path.into(),
            name: name.into(),
            mime_type: mime_type.into(),
            size,
            validation: ValidationStatus::Pending,
        }
    }

    /// Consume a pending file and return it with its validation outcome applied
    pub fn validated(mut self, result: ValidationResult) -> Self {
        self.validation = match result {
            ValidationResult::Valid => ValidationStatus::Valid,
            ValidationResult::Invalid(error) => ValidationStatus::Invalid(error),
        };
        self
    }

    pub fn is_valid(&self) -> bool {
        self.validation == ValidationStatus::Valid
    }

    pub fn is_pending(&self) -> bool {
        self.validation == ValidationStatus::Pending
    }

    pub fn validation_error(&self) -> Option<&ErrorRecord> {
        match &self.validation {
            ValidationStatus::Invalid(error) => Some(error),
            _ => None,
        }
    }
}

/// Video codec requested from the engine
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum VideoCodec {
    /// H.265 / HEVC
    Hevc,
    /// H.264 / AVC
    Avc,
}

impl VideoCodec {
    /// Parse codec from string
    pub fn parse(codec_str: &str) -> Result<Self, DomainError> {
        match codec_str.trim().to_lowercase().as_str() {
            "hevc" | "h265" | "h.265" | "x265" => Ok(VideoCodec::Hevc),
            "avc" | "h264" | "h.264" | "x264" => Ok(VideoCodec::Avc),
            other => Err(DomainError::BadArgs(format!(
                "Invalid codec: {}. Valid codecs: hevc, avc",
                other
            ))),
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            VideoCodec::Hevc => "hevc",
            VideoCodec::Avc => "avc",
        }
    }
}

impl fmt::Display for VideoCodec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Quality/bitrate preset, mapped to a constant rate factor
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum QualityPreset {
    VeryLow,
    Low,
    Medium,
    High,
    VeryHigh,
}

impl QualityPreset {
    /// Parse quality preset from string
    pub fn parse(quality_str: &str) -> Result<Self, DomainError> {
        match quality_str.trim().to_lowercase().replace('_', "-").as_str() {
            "very-low" => Ok(QualityPreset::VeryLow),
            "low" => Ok(QualityPreset::Low),
            "medium" => Ok(QualityPreset::Medium),
            "high" => Ok(QualityPreset::High),
            "very-high" => Ok(QualityPreset::VeryHigh),
            other => Err(DomainError::BadArgs(format!(
                "Invalid quality preset: {}. Valid presets: very-low, low, medium, high, very-high",
                other
            ))),
        }
    }

    /// Constant rate factor (lower is higher quality)
    pub fn crf(&self) -> u8 {
        match self {
            QualityPreset::VeryLow => 32,
            QualityPreset::Low => 28,
            QualityPreset::Medium => 25,
            QualityPreset::High => 23,
            QualityPreset::VeryHigh => 20,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            QualityPreset::VeryLow => "very-low",
            QualityPreset::Low => "low",
            QualityPreset::Medium => "medium",
            QualityPreset::High => "high",
            QualityPreset::VeryHigh => "very-high",
        }
    }
}

impl fmt::Display for QualityPreset {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Settings handed to the engine for one encode
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CompressionConfig {
    pub codec: VideoCodec,
    pub quality: QualityPreset,
    /// Encoder speed preset (ultrafast .. veryslow)
    pub preset: String,
    /// Downscale so the output is at most this tall
    pub max_height: Option<u32>,
    pub audio_bitrate_kbps: u32,
}

impl Default for CompressionConfig {
    fn default() -> Self {
        Self {
            codec: VideoCodec::Hevc,
            quality: QualityPreset::Medium,
            preset: "medium".to_string(),
            max_height: None,
            audio_bitrate_kbps: 128,
        }
    }
}

/// Where the encoded bytes live
#[derive(Debug, Clone, PartialEq)]
pub enum EncodedPayload {
    InMemory(Arc<[u8]>),
    OnDisk(PathBuf),
}

/// Opaque output of a successful encode
#[derive(Debug, Clone, PartialEq)]
pub struct EncodedOutput {
    pub payload: EncodedPayload,
    pub byte_len: u64,
    pub mime_type: String,
}

impl EncodedOutput {
    pub fn in_memory(bytes: Vec<u8>, mime_type: impl Into<String>) -> Self {
        let byte_len = bytes.len() as u64;
        Self {
            payload: EncodedPayload::InMemory(Arc::from(bytes)),
            byte_len,
            mime_type: mime_type.into(),
        }
    }

    pub fn on_disk(path: impl Into<PathBuf>, byte_len: u64, mime_type: impl Into<String>) -> Self {
        Self {
            payload: EncodedPayload::OnDisk(path.into()),
            byte_len,
            mime_type: mime_type.into(),
        }
    }

    pub fn path(&self) -> Option<&Path> {
        match &self.payload {
            EncodedPayload::OnDisk(path) => Some(path),
            EncodedPayload::InMemory(_) => None,
        }
    }
}

/// Structured category an engine may attach to a failure
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailureCategory {
    CodecOrFormat,
    ResourceExhausted,
    CorruptInput,
}

/// Failure reported by the engine
#[derive(Debug, Clone, PartialEq)]
pub struct EngineFailure {
    pub message: String,
    pub category: Option<FailureCategory>,
}

impl EngineFailure {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            category: None,
        }
    }

    pub fn categorized(message: impl Into<String>, category: FailureCategory) -> Self {
        Self {
            message: message.into(),
            category: Some(category),
        }
    }
}

impl fmt::Display for EngineFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.message)
    }
}

impl std::error::Error for EngineFailure {}

/// Absolute and relative size reduction
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize)]
pub struct SizeSavings {
    pub absolute: u64,
    pub percent: f64,
}

/// Identity of one compression job
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct JobId(pub u64);

impl fmt::Display for JobId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "job-{}", self.0)
    }
}

/// Lifecycle status of a job record
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum JobStatus {
    Compressing,
    Complete,
    Error,
}

impl JobStatus {
    pub fn is_terminal(&self) -> bool {
        !matches!(self, JobStatus::Compressing)
    }
}

impl fmt::Display for JobStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            JobStatus::Compressing => f.write_str("compressing"),
            JobStatus::Complete => f.write_str("complete"),
            JobStatus::Error => f.write_str("error"),
        }
    }
}

/// Record of one compression attempt.
///
/// Only the orchestrator mutates a record; everything else sees snapshots.
/// `progress == 100` exactly when `status == Complete`, and `result` is set
/// exactly when `status == Complete`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CompressionJobRecord {
    pub job_id: JobId,
    pub file: SelectedFile,
    pub original_size: u64,
    #[serde(skip)]
    pub result: Option<EncodedOutput>,
    pub result_size: u64,
    pub size_savings_absolute: u64,
    pub size_savings_percent: f64,
    pub status: JobStatus,
    pub progress: u8,
    pub error: Option<ErrorRecord>,
    pub elapsed_ms: Option<u64>,
}

impl CompressionJobRecord {
    /// Fresh record for a job that is about to start compressing
    pub fn new(job_id: JobId, file: SelectedFile) -> Self {
        let original_size = file.size;
        Self {
            job_id,
            file,
            original_size,
            result: None,
            result_size: 0,
            size_savings_absolute: 0,
            size_savings_percent: 0.0,
            status: JobStatus::Compressing,
            progress: 0,
            error: None,
            elapsed_ms: None,
        }
    }

    pub fn is_terminal(&self) -> bool {
        self.status.is_terminal()
    }

    pub fn result_path(&self) -> Option<&Path> {
        self.result.as_ref().and_then(|output| output.path())
    }

    pub(crate) fn set_progress(&mut self, progress: u8) {
        if self.status == JobStatus::Compressing {
            self.progress = progress.min(99);
        }
    }

    pub(crate) fn complete(
        &mut self,
        output: EncodedOutput,
        savings: SizeSavings,
        elapsed_ms: u64,
    ) {
        self.result_size = output.byte_len;
        self.result = Some(output);
        self.size_savings_absolute = savings.absolute;
        self.size_savings_percent = savings.percent;
        self.elapsed_ms = Some(elapsed_ms);
        self.progress = 100;
        self.status = JobStatus::Complete;
    }

    pub(crate) fn fail(&mut self, error: ErrorRecord, elapsed_ms: u64) {
        self.error = Some(error);
        self.elapsed_ms = Some(elapsed_ms);
        self.status = JobStatus::Error;
    }
}

#[cfg(test)]
mod tests;
