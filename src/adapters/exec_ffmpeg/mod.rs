//! FFmpeg execution adapter
//!
//! Runs the `ffmpeg` binary as the compression engine. The source duration
//! is probed with `ffprobe` first so that ffmpeg's `-progress` output can be
//! turned into a fraction for the progress sink.
//!
//! Every call encodes into its own partial file beside the final output and
//! renames it into place only on success, so a failed or abandoned call never
//! touches an output another call produced.

use std::collections::VecDeque;
use std::path::{Path, PathBuf};
use std::process::Stdio;
use std::sync::atomic::{AtomicU64, Ordering};

use async_trait::async_trait;
use tokio::io::{AsyncBufReadExt, AsyncRead, BufReader};
use tokio::process::Command;
use tracing::{debug, info, warn};

use crate::domain::model::*;
use crate::ports::*;
use crate::utils::path::compressed_file_name;

/// MIME type of everything this adapter writes
pub const OUTPUT_MIME_TYPE: &str = "video/mp4";

/// Number of stderr lines kept for failure messages
const STDERR_TAIL_LINES: usize = 8;

static NEXT_PARTIAL_ID: AtomicU64 = AtomicU64::new(1);

/// Where the ffmpeg binaries live and where output goes
#[derive(Debug, Clone, PartialEq)]
pub struct FfmpegSettings {
    pub ffmpeg_path: String,
    pub ffprobe_path: String,
    /// Output directory; the input's directory when unset
    pub output_dir: Option<PathBuf>,
}

impl Default for FfmpegSettings {
    fn default() -> Self {
        Self {
            ffmpeg_path: "ffmpeg".to_string(),
            ffprobe_path: "ffprobe".to_string(),
            output_dir: None,
        }
    }
}

/// FFmpeg-based engine adapter
pub struct FfmpegEngineAdapter {
    settings: FfmpegSettings,
}

impl FfmpegEngineAdapter {
    /// Create new FFmpeg adapter
    pub fn new(settings: FfmpegSettings) -> Self {
        Self { settings }
    }

    /// Where the encoded copy of `source` will be written
    pub fn output_path_for(&self, source: &SelectedFile) -> PathBuf {
        let dir = match &self.settings.output_dir {
            Some(dir) => dir.clone(),
            None => source
                .path
                .parent()
                .map(Path::to_path_buf)
                .unwrap_or_default(),
        };
        dir.join(compressed_file_name(&source.name))
    }

    /// Full ffmpeg argument list for one encode
    pub fn build_args(config: &CompressionConfig, input: &Path, output: &Path) -> Vec<String> {
        let mut args: Vec<String> = [
            "-hide_banner",
            "-nostdin",
            "-y",
            "-v",
            "error",
            "-progress",
            "pipe:1",
            "-nostats",
            "-i",
        ]
        .iter()
        .map(|s| s.to_string())
        .collect();
        args.push(input.to_string_lossy().to_string());

        args.extend(["-map", "0:v:0", "-map", "0:a?"].iter().map(|s| s.to_string()));

        let encoder = match config.codec {
            VideoCodec::Hevc => "libx265",
            VideoCodec::Avc => "libx264",
        };
        args.extend_from_slice(&[
            "-c:v".to_string(),
            encoder.to_string(),
            "-crf".to_string(),
            config.quality.crf().to_string(),
            "-preset".to_string(),
            config.preset.clone(),
            "-pix_fmt".to_string(),
            "yuv420p".to_string(),
        ]);
        if config.codec == VideoCodec::Hevc {
            // Apple players only accept the hvc1 tag in MP4
            args.extend_from_slice(&["-tag:v".to_string(), "hvc1".to_string()]);
        }

        if let Some(max_height) = config.max_height {
            args.extend_from_slice(&[
                "-vf".to_string(),
                format!("scale=-2:'min(ih,{})'", max_height),
            ]);
        }

        args.extend_from_slice(&[
            "-c:a".to_string(),
            "aac".to_string(),
            "-b:a".to_string(),
            format!("{}k", config.audio_bitrate_kbps),
            "-movflags".to_string(),
            "+faststart".to_string(),
            "-f".to_string(),
            "mp4".to_string(),
        ]);
        args.push(output.to_string_lossy().to_string());

        args
    }

    /// Fraction of `total_us` covered by an `out_time_us=` progress line
    pub fn fraction_from_progress_line(line: &str, total_us: f64) -> Option<f64> {
        if total_us <= 0.0 {
            return None;
        }
        // ffmpeg reports microseconds under both keys
        let value = line
            .strip_prefix("out_time_us=")
            .or_else(|| line.strip_prefix("out_time_ms="))?;
        let micros: i64 = value.trim().parse().ok()?;
        Some((micros.max(0) as f64 / total_us).min(1.0))
    }

    /// Source duration in seconds, or `None` when it cannot be determined
    async fn probe_duration(&self, input: &Path) -> Option<f64> {
        let output = Command::new(&self.settings.ffprobe_path)
            .args(["-v", "error", "-show_entries", "format=duration", "-of", "json"])
            .arg(input)
            .stdin(Stdio::null())
            .output()
            .await;

        let output = match output {
            Ok(output) if output.status.success() => output,
            Ok(output) => {
                debug!(
                    "ffprobe could not read {}: {}",
                    input.display(),
                    String::from_utf8_lossy(&output.stderr).trim()
                );
                return None;
            }
            Err(e) => {
                warn!("Failed to execute {}: {}", self.settings.ffprobe_path, e);
                return None;
            }
        };

        let probe: serde_json::Value = serde_json::from_slice(&output.stdout).ok()?;
        probe["format"]["duration"]
            .as_str()
            .and_then(|d| d.parse::<f64>().ok())
            .filter(|d| *d > 0.0)
    }
}

/// Output file still being written; removed on drop unless persisted
struct PartialOutput {
    path: PathBuf,
    persisted: bool,
}

impl PartialOutput {
    /// Hidden sibling of `final_path`, unique per call in this process
    fn beside(final_path: &Path) -> Self {
        let file_name = final_path
            .file_name()
            .map(|name| name.to_string_lossy().to_string())
            .unwrap_or_default();
        let id = NEXT_PARTIAL_ID.fetch_add(1, Ordering::Relaxed);
        let partial_name = format!(".{}.{}-{}.part", file_name, std::process::id(), id);
        Self {
            path: final_path.with_file_name(partial_name),
            persisted: false,
        }
    }

    async fn persist(mut self, final_path: &Path) -> std::io::Result<()> {
        tokio::fs::rename(&self.path, final_path).await?;
        self.persisted = true;
        Ok(())
    }
}

impl Drop for PartialOutput {
    fn drop(&mut self) {
        if !self.persisted {
            let _ = std::fs::remove_file(&self.path);
        }
    }
}

async fn collect_tail<R>(reader: R) -> String
where
    R: AsyncRead + Unpin,
{
    let mut lines = BufReader::new(reader).lines();
    let mut tail = VecDeque::with_capacity(STDERR_TAIL_LINES);
    while let Ok(Some(line)) = lines.next_line().await {
        let line = line.trim().to_string();
        if line.is_empty() {
            continue;
        }
        if tail.len() == STDERR_TAIL_LINES {
            tail.pop_front();
        }
        tail.push_back(line);
    }
    tail.into_iter().collect::<Vec<_>>().join("; ")
}

#[async_trait]
impl EnginePort for FfmpegEngineAdapter {
    async fn encode(
        &self,
        source: &SelectedFile,
        config: &CompressionConfig,
        on_progress: Option<ProgressSink>,
    ) -> Result<EncodedOutput, EngineFailure> {
        let output_path = self.output_path_for(source);
        if let Some(parent) = output_path.parent() {
            if !parent.as_os_str().is_empty() {
                tokio::fs::create_dir_all(parent).await.map_err(|e| {
                    EngineFailure::new(format!(
                        "Cannot create output directory {}: {}",
                        parent.display(),
                        e
                    ))
                })?;
            }
        }

        let total_us = self
            .probe_duration(&source.path)
            .await
            .map(|seconds| seconds * 1_000_000.0);
        if total_us.is_none() {
            debug!("Duration of {} unknown; engine progress disabled", source.name);
        }

        // Declared before the child so an aborted call kills ffmpeg first.
        let partial = PartialOutput::beside(&output_path);
        let args = Self::build_args(config, &source.path, &partial.path);
        info!(
            process.executable.name = "ffmpeg",
            input = %source.path.display(),
            output = %output_path.display(),
            "Launching ffmpeg"
        );
        debug!("ffmpeg args: {:?}", args);

        let mut child = Command::new(&self.settings.ffmpeg_path)
            .args(&args)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .spawn()
            .map_err(|e| {
                EngineFailure::new(format!(
                    "Failed to launch {}: {}",
                    self.settings.ffmpeg_path, e
                ))
            })?;

        let stderr_task = child
            .stderr
            .take()
            .map(|stderr| tokio::spawn(collect_tail(stderr)));

        if let Some(stdout) = child.stdout.take() {
            let mut lines = BufReader::new(stdout).lines();
            while let Ok(Some(line)) = lines.next_line().await {
                if let (Some(sink), Some(total_us)) = (&on_progress, total_us) {
                    if let Some(fraction) = Self::fraction_from_progress_line(&line, total_us) {
                        sink(fraction);
                    }
                }
            }
        }

        let status = child
            .wait()
            .await
            .map_err(|e| EngineFailure::new(format!("Lost track of ffmpeg: {}", e)))?;
        let stderr_tail = match stderr_task {
            Some(task) => task.await.unwrap_or_default(),
            None => String::new(),
        };

        if !status.success() {
            let detail = if stderr_tail.is_empty() {
                "no diagnostics".to_string()
            } else {
                stderr_tail
            };
            return Err(EngineFailure::new(format!("ffmpeg {}: {}", status, detail)));
        }

        let byte_len = tokio::fs::metadata(&partial.path)
            .await
            .map_err(|e| {
                EngineFailure::new(format!(
                    "Compression finished but no output was written to {}: {}",
                    partial.path.display(),
                    e
                ))
            })?
            .len();
        partial.persist(&output_path).await.map_err(|e| {
            EngineFailure::new(format!(
                "Cannot move the result into {}: {}",
                output_path.display(),
                e
            ))
        })?;

        Ok(EncodedOutput::on_disk(output_path, byte_len, OUTPUT_MIME_TYPE))
    }

    fn name(&self) -> &str {
        "ffmpeg"
    }
}
