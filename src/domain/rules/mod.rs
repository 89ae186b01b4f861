// Domain rules - Business logic and policies

use crate::domain::model::*;

/// Acceptance rules for submitted files
pub struct FileValidator;

impl FileValidator {
    /// Validate a file's declared type and size against a policy.
    ///
    /// Rules are checked in order and the first match wins: an unsupported
    /// type is reported even when the file is also too large.
    pub fn validate(file: &SelectedFile, policy: &ValidationPolicy) -> ValidationResult {
        Self::validate_declared(&file.mime_type, file.size, policy)
    }

    /// Validate raw declared attributes
    pub fn validate_declared(
        mime_type: &str,
        size: u64,
        policy: &ValidationPolicy,
    ) -> ValidationResult {
        if !policy.accepts_type(mime_type) {
            return ValidationResult::Invalid(ErrorRecord::new(
                ErrorKind::UnsupportedType,
                format!(
                    "Unsupported file type. Supported types: {}",
                    policy.allowed_types.join(", ")
                ),
            ));
        }

        if size > policy.max_size {
            return ValidationResult::Invalid(ErrorRecord::new(
                ErrorKind::Oversized,
                format!(
                    "File size exceeds the maximum limit of {}MB",
                    policy.max_size_mb()
                ),
            ));
        }

        ValidationResult::Valid
    }
}

/// Before/after size arithmetic
pub struct SizeMetrics;

impl SizeMetrics {
    /// Compute savings; a result larger than the original counts as zero savings
    pub fn savings(original_size: u64, result_size: u64) -> SizeSavings {
        if original_size == 0 {
            return SizeSavings::default();
        }

        let absolute = original_size.saturating_sub(result_size);
        let percent = absolute as f64 / original_size as f64 * 100.0;

        SizeSavings { absolute, percent }
    }
}

/// Maps engine failures onto the user-facing error taxonomy
pub trait FailureClassifier: Send + Sync {
    fn classify(&self, failure: &EngineFailure) -> ErrorRecord;
}

/// Best-effort classifier matching known substrings in the engine message.
///
/// A structured category on the failure takes precedence over the message.
#[derive(Debug, Default, Clone, Copy)]
pub struct HeuristicClassifier;

impl HeuristicClassifier {
    pub fn new() -> Self {
        Self
    }

    fn categorize(message: &str) -> Option<FailureCategory> {
        let lowered = message.to_lowercase();
        if lowered.contains("codec") || lowered.contains("format") {
            Some(FailureCategory::CodecOrFormat)
        } else if lowered.contains("memory") {
            Some(FailureCategory::ResourceExhausted)
        } else if lowered.contains("corrupt") || lowered.contains("invalid") {
            Some(FailureCategory::CorruptInput)
        } else {
            None
        }
    }
}

impl FailureClassifier for HeuristicClassifier {
    fn classify(&self, failure: &EngineFailure) -> ErrorRecord {
        let category = failure
            .category
            .or_else(|| Self::categorize(&failure.message));

        let record = match category {
            Some(FailureCategory::CodecOrFormat) => ErrorRecord::new(
                ErrorKind::CodecOrFormatError,
                "Unsupported video format or codec. Please try a different video file.",
            ),
            Some(FailureCategory::ResourceExhausted) => ErrorRecord::new(
                ErrorKind::ResourceExhausted,
                "File is too large to compress. Please try a smaller video file.",
            ),
            Some(FailureCategory::CorruptInput) => ErrorRecord::new(
                ErrorKind::CorruptInput,
                "Video file appears to be corrupted. Please try a different file.",
            ),
            None => ErrorRecord::new(
                ErrorKind::UnknownFailure,
                format!("Compression failed: {}", failure.message),
            ),
        };

        record.with_cause(failure.message.clone())
    }
}

#[cfg(test)]
mod tests;
