//! Media type detection for files picked from disk

use std::path::Path;

use crate::domain::model::SelectedFile;
use crate::error::{VidpressError, VidpressResult};

/// Fallback for extensions with no known video type
pub const UNKNOWN_MIME_TYPE: &str = "application/octet-stream";

/// Guess a MIME type from the file extension
pub fn mime_from_path(path: &Path) -> &'static str {
    let extension = path
        .extension()
        .map(|ext| ext.to_string_lossy().to_ascii_lowercase());

    match extension.as_deref() {
        Some("mp4") | Some("m4v") => "video/mp4",
        Some("mov") => "video/quicktime",
        Some("avi") => "video/x-msvideo",
        Some("webm") => "video/webm",
        Some("mkv") => "video/x-matroska",
        _ => UNKNOWN_MIME_TYPE,
    }
}

/// Build a pending [`SelectedFile`] from a path on disk.
///
/// The size comes from the file's metadata; the type is `mime_override`
/// when given, otherwise guessed from the extension.
pub async fn probe_candidate(
    path: &Path,
    mime_override: Option<&str>,
) -> VidpressResult<SelectedFile> {
    let metadata = match tokio::fs::metadata(path).await {
        Ok(metadata) => metadata,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            return Err(VidpressError::InputFileNotFound {
                path: path.display().to_string(),
            })
        }
        Err(e) => return Err(e.into()),
    };
    if !metadata.is_file() {
        return Err(VidpressError::InputFileNotFound {
            path: path.display().to_string(),
        });
    }

    let name = path
        .file_name()
        .map(|name| name.to_string_lossy().to_string())
        .unwrap_or_else(|| path.display().to_string());
    let mime_type = mime_override.unwrap_or_else(|| mime_from_path(path));

    Ok(SelectedFile::new(path, name, mime_type, metadata.len()))
}
