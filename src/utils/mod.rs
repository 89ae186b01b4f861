//! Common utilities and helpers

pub mod logging;
pub mod media_type;
pub mod path;

use std::time::Duration;

const KIB: f64 = 1024.0;

/// Format a byte count for display, e.g. `"1.5 MB"`
pub fn format_file_size(bytes: u64) -> String {
    let size = bytes as f64;
    if size < KIB {
        format!("{} B", bytes)
    } else if size < KIB * KIB {
        format!("{:.1} KB", size / KIB)
    } else if size < KIB * KIB * KIB {
        format!("{:.1} MB", size / (KIB * KIB))
    } else {
        format!("{:.1} GB", size / (KIB * KIB * KIB))
    }
}

/// Format an elapsed time in milliseconds as seconds with one decimal
pub fn format_elapsed(elapsed_ms: u64) -> String {
    format!("{:.1}s", Duration::from_millis(elapsed_ms).as_secs_f64())
}

/// Shorten a file name to at most `max_len` characters, keeping its extension.
///
/// When even the extension does not fit, only the extension is returned.
pub fn truncate_file_name(name: &str, max_len: usize) -> String {
    const ELLIPSIS: &str = "...";

    if name.chars().count() <= max_len {
        return name.to_string();
    }

    let Some(dot) = name.rfind('.') else {
        let keep = max_len.saturating_sub(ELLIPSIS.len());
        return format!("{}{}", take_chars(name, keep), ELLIPSIS);
    };

    let (stem, extension) = name.split_at(dot);
    let reserved = extension.chars().count() + ELLIPSIS.len();
    if max_len <= reserved {
        return extension.to_string();
    }
    format!("{}{}{}", take_chars(stem, max_len - reserved), ELLIPSIS, extension)
}

fn take_chars(s: &str, n: usize) -> &str {
    match s.char_indices().nth(n) {
        Some((idx, _)) => &s[..idx],
        None => s,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_file_size() {
        assert_eq!(format_file_size(0), "0 B");
        assert_eq!(format_file_size(1023), "1023 B");
        assert_eq!(format_file_size(1536), "1.5 KB");
        assert_eq!(format_file_size(50 * 1024 * 1024), "50.0 MB");
        assert_eq!(format_file_size(3 * 1024 * 1024 * 1024 / 2), "1.5 GB");
    }

    #[test]
    fn test_format_elapsed() {
        assert_eq!(format_elapsed(0), "0.0s");
        assert_eq!(format_elapsed(12_345), "12.3s");
    }

    #[test]
    fn test_truncate_keeps_short_names() {
        assert_eq!(truncate_file_name("clip.mp4", 50), "clip.mp4");
    }

    #[test]
    fn test_truncate_preserves_extension() {
        let name = format!("{}.mp4", "a".repeat(60));
        let short = truncate_file_name(&name, 20);
        assert_eq!(short, format!("{}....mp4", "a".repeat(13)));
        assert_eq!(short.chars().count(), 20);
        assert!(short.ends_with(".mp4"));
    }

    #[test]
    fn test_truncate_without_extension() {
        assert_eq!(truncate_file_name("abcdefghijkl", 8), "abcde...");
    }

    #[test]
    fn test_truncate_with_oversized_extension() {
        assert_eq!(truncate_file_name("a.verylongextension", 10), ".verylongextension");
    }

    #[test]
    fn test_truncate_counts_characters() {
        let name = "ééééééééééééé.mov";
        let short = truncate_file_name(name, 10);
        assert_eq!(short, "ééé....mov");
    }
}
