// Unit tests for domain models

use super::*;

#[test]
fn test_default_policy_matches_documented_limits() {
    let policy = ValidationPolicy::default();
    assert_eq!(policy.max_size, 2000 * 1024 * 1024);
    assert_eq!(policy.max_size_mb(), 2000);
    assert!(policy.accepts_type("video/mp4"));
    assert!(policy.accepts_type("video/quicktime"));
    assert!(policy.accepts_type("video/x-msvideo"));
    assert!(policy.accepts_type("video/webm"));
    assert!(!policy.accepts_type("video/x-matroska"));
}

#[test]
fn test_policy_rejects_degenerate_limits() {
    assert!(ValidationPolicy::new(0, vec!["video/mp4".to_string()]).is_err());
    assert!(ValidationPolicy::new(10, vec![]).is_err());
}

#[test]
fn test_selected_file_starts_pending() {
    let file = SelectedFile::new("/tmp/demo.mp4", "demo.mp4", "video/mp4", 42);
    assert!(file.is_pending());
    assert!(!file.is_valid());
    assert!(file.validation_error().is_none());
}

#[test]
fn test_selected_file_invalid_iff_error_present() {
    let file = SelectedFile::new("/tmp/a.mkv", "a.mkv", "video/x-matroska", 1);
    let error = ErrorRecord::new(ErrorKind::UnsupportedType, "nope");
    let invalid = file.clone().validated(ValidationResult::Invalid(error.clone()));
    assert_eq!(invalid.validation_error(), Some(&error));
    assert!(!invalid.is_valid());

    let valid = file.validated(ValidationResult::Valid);
    assert!(valid.is_valid());
    assert!(valid.validation_error().is_none());
}

#[test]
fn test_error_kind_names() {
    assert_eq!(ErrorKind::UnsupportedType.to_string(), "unsupported-type");
    assert_eq!(ErrorKind::CodecOrFormatError.as_str(), "codec-or-format-error");
    assert_eq!(
        serde_json::to_string(&ErrorKind::ResourceExhausted).unwrap(),
        "\"resource-exhausted\""
    );
}

#[test]
fn test_codec_parse() {
    assert_eq!(VideoCodec::parse("HEVC").unwrap(), VideoCodec::Hevc);
    assert_eq!(VideoCodec::parse("h264").unwrap(), VideoCodec::Avc);
    assert!(VideoCodec::parse("vp9").is_err());
}

#[test]
fn test_quality_parse_and_crf() {
    assert_eq!(QualityPreset::parse("very_high").unwrap(), QualityPreset::VeryHigh);
    assert_eq!(QualityPreset::parse("medium").unwrap().crf(), 25);
    assert!(QualityPreset::parse("ultra").is_err());
    assert!(QualityPreset::VeryHigh.crf() < QualityPreset::VeryLow.crf());
}

#[test]
fn test_new_record_is_compressing_at_zero() {
    let file = SelectedFile::new("/tmp/demo.mp4", "demo.mp4", "video/mp4", 500)
        .validated(ValidationResult::Valid);
    let record = CompressionJobRecord::new(JobId(1), file);
    assert_eq!(record.status, JobStatus::Compressing);
    assert_eq!(record.progress, 0);
    assert_eq!(record.original_size, 500);
    assert!(record.result.is_none());
    assert!(record.elapsed_ms.is_none());
}

#[test]
fn test_record_progress_never_reaches_100_while_compressing() {
    let file = SelectedFile::new("/tmp/demo.mp4", "demo.mp4", "video/mp4", 500);
    let mut record = CompressionJobRecord::new(JobId(1), file);
    record.set_progress(100);
    assert_eq!(record.progress, 99);

    record.complete(
        EncodedOutput::in_memory(vec![0; 100], "video/mp4"),
        SizeSavings { absolute: 400, percent: 80.0 },
        12,
    );
    assert_eq!(record.progress, 100);
    assert_eq!(record.status, JobStatus::Complete);
    assert_eq!(record.result_size, 100);
    assert_eq!(record.elapsed_ms, Some(12));
}

#[test]
fn test_record_fail_keeps_progress() {
    let file = SelectedFile::new("/tmp/demo.mp4", "demo.mp4", "video/mp4", 500);
    let mut record = CompressionJobRecord::new(JobId(3), file);
    record.set_progress(37);
    record.fail(ErrorRecord::new(ErrorKind::CorruptInput, "broken"), 40);
    assert_eq!(record.status, JobStatus::Error);
    assert_eq!(record.elapsed_ms, Some(40));
    assert_eq!(record.progress, 37);
    assert!(record.result.is_none());

    // terminal records ignore late progress
    record.set_progress(80);
    assert_eq!(record.progress, 37);
}

#[test]
fn test_job_id_display() {
    assert_eq!(JobId(7).to_string(), "job-7");
}
