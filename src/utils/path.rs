//! Output path naming

use std::path::Path;

/// Suffix appended to the stem of every compressed file
pub const COMPRESSED_SUFFIX: &str = "-compressed";

/// Name of the compressed copy of `file_name`: `<stem>-compressed.mp4`
pub fn compressed_file_name(file_name: &str) -> String {
    let stem = Path::new(file_name)
        .file_stem()
        .map(|stem| stem.to_string_lossy().to_string())
        .filter(|stem| !stem.is_empty())
        .unwrap_or_else(|| "video".to_string());
    format!("{}{}.mp4", stem, COMPRESSED_SUFFIX)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_compressed_file_name() {
        assert_eq!(compressed_file_name("holiday.mov"), "holiday-compressed.mp4");
        assert_eq!(compressed_file_name("clip.final.webm"), "clip.final-compressed.mp4");
        assert_eq!(compressed_file_name("raw"), "raw-compressed.mp4");
        assert_eq!(compressed_file_name(""), "video-compressed.mp4");
    }
}
