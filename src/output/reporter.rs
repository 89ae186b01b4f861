//! Job reporters
//!
//! A [`JobReporter`] turns job snapshots into output lines. The console
//! reporter prints a progress line per change and a summary at the end; the
//! JSON reporter emits one JSON object per event for scripting.

use std::io::{self, Write};

use chrono::Utc;
use serde_json::json;

use crate::domain::model::{CompressionJobRecord, SelectedFile};
use crate::utils::{format_elapsed, format_file_size, truncate_file_name};

/// Longest file name shown in console output
const DISPLAY_NAME_LEN: usize = 50;

/// Width of the console progress bar in characters
const BAR_WIDTH: usize = 20;

/// Receives job lifecycle events
pub trait JobReporter {
    /// A file was validated and rejected
    fn on_rejected(&mut self, file: &SelectedFile) -> io::Result<()>;
    /// A job started compressing `record.file`
    fn on_start(&mut self, record: &CompressionJobRecord) -> io::Result<()>;
    fn on_progress(&mut self, record: &CompressionJobRecord) -> io::Result<()>;
    fn on_complete(&mut self, record: &CompressionJobRecord) -> io::Result<()>;
    /// A job failed; `will_retry` tells whether another attempt follows
    fn on_error(&mut self, record: &CompressionJobRecord, will_retry: bool) -> io::Result<()>;
}

/// Human-readable output
pub struct ConsoleReporter<W: Write> {
    out: W,
}

impl<W: Write> ConsoleReporter<W> {
    pub fn new(out: W) -> Self {
        Self { out }
    }

    pub fn into_inner(self) -> W {
        self.out
    }

    fn progress_bar(progress: u8) -> String {
        let filled = (progress as usize * BAR_WIDTH) / 100;
        format!("{}{}", "#".repeat(filled), "-".repeat(BAR_WIDTH - filled))
    }
}

impl<W: Write> JobReporter for ConsoleReporter<W> {
    fn on_rejected(&mut self, file: &SelectedFile) -> io::Result<()> {
        let reason = file
            .validation_error()
            .map(|error| error.message.as_str())
            .unwrap_or("not accepted");
        writeln!(
            self.out,
            "Rejected {}: {}",
            truncate_file_name(&file.name, DISPLAY_NAME_LEN),
            reason
        )
    }

    fn on_start(&mut self, record: &CompressionJobRecord) -> io::Result<()> {
        writeln!(
            self.out,
            "Compressing {} ({})",
            truncate_file_name(&record.file.name, DISPLAY_NAME_LEN),
            format_file_size(record.original_size)
        )
    }

    fn on_progress(&mut self, record: &CompressionJobRecord) -> io::Result<()> {
        writeln!(
            self.out,
            "[{}] {:>3}%",
            Self::progress_bar(record.progress),
            record.progress
        )
    }

    fn on_complete(&mut self, record: &CompressionJobRecord) -> io::Result<()> {
        writeln!(self.out, "Compression complete")?;
        writeln!(self.out, "  Original size:   {}", format_file_size(record.original_size))?;
        writeln!(self.out, "  Compressed size: {}", format_file_size(record.result_size))?;
        writeln!(
            self.out,
            "  Saved:           {} ({:.1}%)",
            format_file_size(record.size_savings_absolute),
            record.size_savings_percent
        )?;
        if let Some(elapsed_ms) = record.elapsed_ms {
            writeln!(self.out, "  Time taken:      {}", format_elapsed(elapsed_ms))?;
        }
        if let Some(path) = record.result_path() {
            writeln!(self.out, "  Output:          {}", path.display())?;
        }
        Ok(())
    }

    fn on_error(&mut self, record: &CompressionJobRecord, will_retry: bool) -> io::Result<()> {
        let message = record
            .error
            .as_ref()
            .map(|error| error.message.as_str())
            .unwrap_or("Compression failed");
        writeln!(self.out, "Compression failed at {}%: {}", record.progress, message)?;
        if will_retry {
            writeln!(self.out, "Retrying...")?;
        }
        Ok(())
    }
}

/// One JSON object per line, each stamped with an RFC 3339 timestamp
pub struct JsonReporter<W: Write> {
    out: W,
}

impl<W: Write> JsonReporter<W> {
    pub fn new(out: W) -> Self {
        Self { out }
    }

    pub fn into_inner(self) -> W {
        self.out
    }

    fn emit(&mut self, mut event: serde_json::Value) -> io::Result<()> {
        if let Some(object) = event.as_object_mut() {
            object.insert("timestamp".to_string(), json!(Utc::now().to_rfc3339()));
        }
        serde_json::to_writer(&mut self.out, &event)?;
        writeln!(self.out)
    }
}

impl<W: Write> JobReporter for JsonReporter<W> {
    fn on_rejected(&mut self, file: &SelectedFile) -> io::Result<()> {
        self.emit(json!({
            "event": "rejected",
            "file": file,
        }))
    }

    fn on_start(&mut self, record: &CompressionJobRecord) -> io::Result<()> {
        self.emit(json!({
            "event": "start",
            "job_id": record.job_id,
            "file": record.file.name,
            "original_size": record.original_size,
        }))
    }

    fn on_progress(&mut self, record: &CompressionJobRecord) -> io::Result<()> {
        self.emit(json!({
            "event": "progress",
            "job_id": record.job_id,
            "progress": record.progress,
        }))
    }

    fn on_complete(&mut self, record: &CompressionJobRecord) -> io::Result<()> {
        self.emit(json!({
            "event": "complete",
            "job": record,
            "output": record.result_path(),
        }))
    }

    fn on_error(&mut self, record: &CompressionJobRecord, will_retry: bool) -> io::Result<()> {
        self.emit(json!({
            "event": "error",
            "job": record,
            "will_retry": will_retry,
        }))
    }
}
