// Unit tests for business rules

use super::*;

fn file(mime_type: &str, size: u64) -> SelectedFile {
    SelectedFile::new("/videos/input", "input", mime_type, size)
}

#[test]
fn test_validate_rejects_unlisted_type_regardless_of_size() {
    let policy = ValidationPolicy::default();
    for size in [0, 1, policy.max_size, policy.max_size + 1, u64::MAX] {
        let result = FileValidator::validate(&file("video/x-matroska", size), &policy);
        let error = result.error().expect("should be invalid");
        assert_eq!(error.kind, ErrorKind::UnsupportedType);
        assert!(error.message.contains("video/mp4, video/quicktime, video/x-msvideo, video/webm"));
    }
}

#[test]
fn test_validate_rejects_oversized() {
    let policy = ValidationPolicy::default();
    for mime in ALLOWED_VIDEO_TYPES {
        let result = FileValidator::validate(&file(mime, policy.max_size + 1), &policy);
        let error = result.error().expect("should be invalid");
        assert_eq!(error.kind, ErrorKind::Oversized);
        assert_eq!(error.message, "File size exceeds the maximum limit of 2000MB");
    }
}

#[test]
fn test_validate_accepts_up_to_limit() {
    let policy = ValidationPolicy::default();
    for size in [0, 1, 50 * MIB, policy.max_size] {
        assert!(FileValidator::validate(&file("video/webm", size), &policy).is_valid());
    }
}

#[test]
fn test_validate_honours_custom_policy() {
    let policy = ValidationPolicy::new(1_500_000, vec!["video/mp4".to_string()]).unwrap();
    assert!(!FileValidator::validate(&file("video/webm", 10), &policy).is_valid());

    let error = FileValidator::validate(&file("video/mp4", 2_000_000), &policy)
        .error()
        .cloned()
        .unwrap();
    // 1.43 MiB rounds to 1
    assert_eq!(error.message, "File size exceeds the maximum limit of 1MB");
}

#[test]
fn test_validate_type_match_is_exact() {
    let policy = ValidationPolicy::default();
    assert!(!FileValidator::validate(&file("VIDEO/MP4", 10), &policy).is_valid());
    assert!(!FileValidator::validate(&file("", 10), &policy).is_valid());
}

#[test]
fn test_savings_examples() {
    let s = SizeMetrics::savings(1_000_000, 250_000);
    assert_eq!(s.absolute, 750_000);
    assert!((s.percent - 75.0).abs() < 1e-9);

    let grown = SizeMetrics::savings(1_000_000, 1_200_000);
    assert_eq!(grown.absolute, 0);
    assert_eq!(grown.percent, 0.0);
}

#[test]
fn test_savings_zero_original() {
    assert_eq!(SizeMetrics::savings(0, 0), SizeSavings::default());
    assert_eq!(SizeMetrics::savings(0, 12345), SizeSavings::default());
}

#[test]
fn test_savings_formula_holds() {
    for (original, result) in [(10u64, 3u64), (7, 7), (3, 0), (50 * MIB, 20 * MIB), (1, 2)] {
        let s = SizeMetrics::savings(original, result);
        let expected = original.saturating_sub(result);
        assert_eq!(s.absolute, expected);
        assert!((s.percent - expected as f64 / original as f64 * 100.0).abs() < 1e-9);
    }
}

#[test]
fn test_classifier_maps_known_messages() {
    let classifier = HeuristicClassifier::new();
    let cases = [
        ("Unsupported codec hevc", ErrorKind::CodecOrFormatError),
        ("Unknown input format", ErrorKind::CodecOrFormatError),
        ("Out of Memory", ErrorKind::ResourceExhausted),
        ("Cannot allocate memory", ErrorKind::ResourceExhausted),
        ("file is corrupt", ErrorKind::CorruptInput),
        ("Invalid data found when processing input", ErrorKind::CorruptInput),
        ("something odd happened", ErrorKind::UnknownFailure),
    ];
    for (message, kind) in cases {
        assert_eq!(classifier.classify(&EngineFailure::new(message)).kind, kind, "{}", message);
    }
}

#[test]
fn test_classifier_codec_wins_over_corrupt() {
    let record = HeuristicClassifier.classify(&EngineFailure::new("corrupt codec header"));
    assert_eq!(record.kind, ErrorKind::CodecOrFormatError);
}

#[test]
fn test_classifier_preserves_unknown_message() {
    let record = HeuristicClassifier.classify(&EngineFailure::new("disk quota exceeded"));
    assert_eq!(record.kind, ErrorKind::UnknownFailure);
    assert_eq!(record.message, "Compression failed: disk quota exceeded");
    assert_eq!(record.cause.as_deref(), Some("disk quota exceeded"));
}

#[test]
fn test_classifier_prefers_structured_category() {
    let failure = EngineFailure::categorized("opaque", FailureCategory::ResourceExhausted);
    assert_eq!(HeuristicClassifier.classify(&failure).kind, ErrorKind::ResourceExhausted);
}
