//! Shared fakes for integration tests
#![allow(dead_code)]

use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use tokio::sync::{mpsc, oneshot};

use vidpress::app::CompressionOrchestrator;
use vidpress::domain::model::*;
use vidpress::engine::TickerSettings;
use vidpress::ports::{EnginePort, LogLevel, LogPort, ProgressSink};
use vidpress::utils::path::compressed_file_name;

/// A valid file of the given size
pub fn valid_file(name: &str, size: u64) -> SelectedFile {
    SelectedFile::new(format!("/videos/{}", name), name, "video/mp4", size)
        .validated(ValidationResult::Valid)
}

/// Output the fakes hand back for `file`
pub fn output_for(file: &SelectedFile, byte_len: u64) -> EncodedOutput {
    EncodedOutput::on_disk(
        format!("/videos/{}", compressed_file_name(&file.name)),
        byte_len,
        "video/mp4",
    )
}

/// Ticker settings that never fire within a test
pub fn silent_ticker() -> TickerSettings {
    TickerSettings {
        interval: Duration::from_secs(3600),
        ..TickerSettings::default()
    }
}

/// One engine call waiting for the test to resolve it
pub struct PendingCall {
    pub file: SelectedFile,
    pub config: CompressionConfig,
    sink: Option<ProgressSink>,
    reply: oneshot::Sender<Result<EncodedOutput, EngineFailure>>,
}

impl PendingCall {
    pub fn progress(&self, fraction: f64) {
        if let Some(sink) = &self.sink {
            sink(fraction);
        }
    }

    pub fn succeed(self, byte_len: u64) {
        let output = output_for(&self.file, byte_len);
        let _ = self.reply.send(Ok(output));
    }

    pub fn fail(self, failure: EngineFailure) {
        let _ = self.reply.send(Err(failure));
    }

    /// Whether the orchestrator dropped the engine call waiting on this
    pub fn is_abandoned(&self) -> bool {
        self.reply.is_closed()
    }
}

/// Engine whose calls are resolved by the test through [`PendingCall`]
pub struct ControlledEngine {
    calls: mpsc::UnboundedSender<PendingCall>,
}

impl ControlledEngine {
    pub fn new() -> (Arc<Self>, mpsc::UnboundedReceiver<PendingCall>) {
        let (calls, rx) = mpsc::unbounded_channel();
        (Arc::new(Self { calls }), rx)
    }
}

#[async_trait]
impl EnginePort for ControlledEngine {
    async fn encode(
        &self,
        source: &SelectedFile,
        config: &CompressionConfig,
        on_progress: Option<ProgressSink>,
    ) -> Result<EncodedOutput, EngineFailure> {
        let (reply, outcome) = oneshot::channel();
        self.calls
            .send(PendingCall {
                file: source.clone(),
                config: config.clone(),
                sink: on_progress,
                reply,
            })
            .map_err(|_| EngineFailure::new("test harness went away"))?;
        outcome
            .await
            .unwrap_or_else(|_| Err(EngineFailure::new("call dropped by test")))
    }

    fn name(&self) -> &str {
        "controlled"
    }
}

/// What a [`ScriptedEngine`] does on one call
pub enum Script {
    Succeed { progress: Vec<f64>, byte_len: u64 },
    Fail { progress: Vec<f64>, failure: EngineFailure },
}

/// Engine that plays back one script per call, immediately.
///
/// Successful calls hand back an in-memory payload of `byte_len` zeroes.
pub struct ScriptedEngine {
    scripts: Mutex<VecDeque<Script>>,
    calls: AtomicUsize,
}

impl ScriptedEngine {
    pub fn new(scripts: Vec<Script>) -> Arc<Self> {
        Arc::new(Self {
            scripts: Mutex::new(scripts.into()),
            calls: AtomicUsize::new(0),
        })
    }

    pub fn call_count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl EnginePort for ScriptedEngine {
    async fn encode(
        &self,
        _source: &SelectedFile,
        _config: &CompressionConfig,
        on_progress: Option<ProgressSink>,
    ) -> Result<EncodedOutput, EngineFailure> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let script = self.scripts.lock().unwrap().pop_front();
        let report = |steps: &[f64]| {
            if let Some(sink) = &on_progress {
                steps.iter().for_each(|fraction| sink(*fraction));
            }
        };

        match script {
            Some(Script::Succeed { progress, byte_len }) => {
                report(&progress);
                Ok(EncodedOutput::in_memory(vec![0; byte_len as usize], "video/mp4"))
            }
            Some(Script::Fail { progress, failure }) => {
                report(&progress);
                Err(failure)
            }
            None => Err(EngineFailure::new("no script left")),
        }
    }
}

/// Engine that panics inside every call
pub struct PanickingEngine;

#[async_trait]
impl EnginePort for PanickingEngine {
    async fn encode(
        &self,
        source: &SelectedFile,
        _config: &CompressionConfig,
        _on_progress: Option<ProgressSink>,
    ) -> Result<EncodedOutput, EngineFailure> {
        panic!("encoder blew up on {}", source.name)
    }

    fn name(&self) -> &str {
        "panicking"
    }
}

/// Log port that keeps every message
#[derive(Default)]
pub struct RecordingLog {
    entries: Mutex<Vec<(LogLevel, String)>>,
}

impl RecordingLog {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn messages_at(&self, level: LogLevel) -> Vec<String> {
        self.entries
            .lock()
            .unwrap()
            .iter()
            .filter(|(entry_level, _)| *entry_level == level)
            .map(|(_, message)| message.clone())
            .collect()
    }

    fn push(&self, level: LogLevel, message: &str) {
        let mut entries = self.entries.lock().unwrap();
        entries.push((level, message.to_string()));
    }
}

#[async_trait]
impl LogPort for RecordingLog {
    async fn info(&self, message: &str) {
        self.push(LogLevel::Info, message);
    }

    async fn warn(&self, message: &str) {
        self.push(LogLevel::Warn, message);
    }

    async fn error(&self, message: &str) {
        self.push(LogLevel::Error, message);
    }

    async fn debug(&self, message: &str) {
        self.push(LogLevel::Debug, message);
    }
}

/// Orchestrator over `engine` with a ticker that stays quiet
pub fn quiet_orchestrator(
    engine: Arc<dyn EnginePort>,
    log: Arc<RecordingLog>,
) -> CompressionOrchestrator {
    CompressionOrchestrator::new(engine, log).with_ticker_settings(silent_ticker())
}

/// Write an executable `/bin/sh` script named `name` into `dir`
#[cfg(unix)]
pub fn write_script(dir: &std::path::Path, name: &str, body: &str) -> String {
    use std::os::unix::fs::PermissionsExt;

    let source = dir.join(format!("{}.sh", name));
    std::fs::write(&source, format!("#!/bin/sh\n{}\n", body)).unwrap();
    // Installed by `cp` so no writable descriptor leaks into a parallel spawn.
    let path = dir.join(name);
    let status = std::process::Command::new("cp")
        .arg(&source)
        .arg(&path)
        .status()
        .unwrap();
    assert!(status.success());
    std::fs::set_permissions(&path, std::fs::Permissions::from_mode(0o755)).unwrap();
    path.to_string_lossy().to_string()
}
