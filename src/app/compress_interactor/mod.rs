// Compress interactor - Owns the lifecycle of one compression job at a time

use std::sync::Arc;

use tokio::sync::{mpsc, watch};
use tokio::task::{AbortHandle, JoinError};
use tokio::time::Instant;

use crate::domain::errors::*;
use crate::domain::model::*;
use crate::domain::rules::*;
use crate::engine::progress::{ProgressMerger, SyntheticTicker, TickerSettings};
use crate::ports::*;

/// Coarse state of the orchestrator, derived from the current job
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OrchestratorPhase {
    Idle,
    Compressing,
    Complete,
    Error,
}

/// Observable change produced by applying one job event
#[derive(Debug, Clone, PartialEq)]
pub enum JobUpdate {
    Progress(CompressionJobRecord),
    Completed(CompressionJobRecord),
    Failed(CompressionJobRecord),
}

impl JobUpdate {
    pub fn record(&self) -> &CompressionJobRecord {
        match self {
            JobUpdate::Progress(record)
            | JobUpdate::Completed(record)
            | JobUpdate::Failed(record) => record,
        }
    }

    pub fn is_terminal(&self) -> bool {
        !matches!(self, JobUpdate::Progress(_))
    }
}

/// Message sent back from the engine task or the ticker, stamped with its job
#[derive(Debug)]
struct JobEvent {
    job_id: JobId,
    kind: JobEventKind,
}

#[derive(Debug)]
enum JobEventKind {
    Tick,
    EngineProgress(f64),
    Finished(Result<EncodedOutput, EngineFailure>),
}

struct ActiveJob {
    record: CompressionJobRecord,
    started_at: Instant,
    merger: ProgressMerger,
    ticker: Option<SyntheticTicker>,
    engine_call: AbortHandle,
}

impl ActiveJob {
    fn stop_ticker(&mut self) {
        if let Some(ticker) = self.ticker.take() {
            ticker.stop();
        }
    }
}

impl Drop for ActiveJob {
    // A job that is no longer current must not keep its engine call alive.
    fn drop(&mut self) {
        self.engine_call.abort();
    }
}

/// Interactor driving compression jobs through the engine port.
///
/// Engine callbacks never touch the record directly: they send identity
/// stamped events that are applied by [`next_update`](Self::next_update)
/// or [`drain_pending`](Self::drain_pending), and dropped when the job they
/// belong to is no longer current.
pub struct CompressionOrchestrator {
    engine: Arc<dyn EnginePort>,
    classifier: Arc<dyn FailureClassifier>,
    log_port: Arc<dyn LogPort>,
    config: CompressionConfig,
    ticker_settings: TickerSettings,
    active: Option<ActiveJob>,
    next_job_id: u64,
    events_tx: mpsc::UnboundedSender<JobEvent>,
    events_rx: mpsc::UnboundedReceiver<JobEvent>,
    snapshots: watch::Sender<Option<CompressionJobRecord>>,
}

impl CompressionOrchestrator {
    /// Create new orchestrator with injected ports
    pub fn new(engine: Arc<dyn EnginePort>, log_port: Arc<dyn LogPort>) -> Self {
        let (events_tx, events_rx) = mpsc::unbounded_channel();
        let (snapshots, _) = watch::channel(None);

        Self {
            engine,
            classifier: Arc::new(HeuristicClassifier::new()),
            log_port,
            config: CompressionConfig::default(),
            ticker_settings: TickerSettings::default(),
            active: None,
            next_job_id: 1,
            events_tx,
            events_rx,
            snapshots,
        }
    }

    pub fn with_classifier(mut self, classifier: Arc<dyn FailureClassifier>) -> Self {
        self.classifier = classifier;
        self
    }

    pub fn with_config(mut self, config: CompressionConfig) -> Self {
        self.config = config;
        self
    }

    pub fn with_ticker_settings(mut self, settings: TickerSettings) -> Self {
        self.ticker_settings = settings;
        self
    }

    pub fn config(&self) -> &CompressionConfig {
        &self.config
    }

    pub fn phase(&self) -> OrchestratorPhase {
        match self.active.as_ref().map(|job| job.record.status) {
            None => OrchestratorPhase::Idle,
            Some(JobStatus::Compressing) => OrchestratorPhase::Compressing,
            Some(JobStatus::Complete) => OrchestratorPhase::Complete,
            Some(JobStatus::Error) => OrchestratorPhase::Error,
        }
    }

    /// Current job record, if any
    pub fn current(&self) -> Option<&CompressionJobRecord> {
        self.active.as_ref().map(|job| &job.record)
    }

    /// Whether the synthetic ticker of the current job is still running
    pub fn is_ticking(&self) -> bool {
        self.active
            .as_ref()
            .and_then(|job| job.ticker.as_ref())
            .map_or(false, |ticker| !ticker.is_finished())
    }

    /// Receiver that sees a snapshot after every change to the current job
    pub fn subscribe(&self) -> watch::Receiver<Option<CompressionJobRecord>> {
        self.snapshots.subscribe()
    }

    /// Start compressing an already-validated file.
    ///
    /// Only allowed while idle; a finished job has to be cleared (or retried)
    /// first.
    pub async fn start(&mut self, file: SelectedFile) -> Result<JobId, DomainError> {
        if let Some(active) = &self.active {
            return Err(DomainError::InvalidState(format!(
                "Cannot start a new job while {} is {}; clear it first",
                active.record.job_id, active.record.status
            )));
        }
        if !file.is_valid() {
            return Err(DomainError::BadArgs(format!(
                "File {} has not passed validation",
                file.name
            )));
        }

        let job_id = JobId(self.next_job_id);
        self.next_job_id += 1;

        self.log_port
            .info(&format!(
                "Starting {} for {} ({} bytes) with {} at {} quality",
                job_id, file.name, file.size, self.config.codec, self.config.quality
            ))
            .await;

        let engine_call = self.spawn_engine_call(job_id, file.clone());
        let ticker = self.spawn_ticker(job_id);
        let record = CompressionJobRecord::new(job_id, file);

        self.snapshots.send_replace(Some(record.clone()));
        self.active = Some(ActiveJob {
            record,
            started_at: Instant::now(),
            merger: ProgressMerger::new(self.ticker_settings),
            ticker: Some(ticker),
            engine_call,
        });

        Ok(job_id)
    }

    /// Restart the failed job with the same file, discarding the failed record
    pub async fn retry(&mut self) -> Result<JobId, DomainError> {
        let file = match self.active.take() {
            Some(active) if active.record.status == JobStatus::Error => active.record.file.clone(),
            Some(active) => {
                let message = format!(
                    "Retry is only allowed after a failure; {} is {}",
                    active.record.job_id, active.record.status
                );
                self.active = Some(active);
                return Err(DomainError::InvalidState(message));
            }
            None => {
                return Err(DomainError::InvalidState(
                    "There is no failed job to retry".to_string(),
                ))
            }
        };

        self.log_port
            .info(&format!("Retrying compression of {}", file.name))
            .await;
        self.start(file).await
    }

    /// Drop the current job and return to idle.
    ///
    /// An engine call still in flight is aborted; events it already queued
    /// are ignored.
    pub async fn clear(&mut self) {
        if let Some(mut active) = self.active.take() {
            active.stop_ticker();
            if active.record.status == JobStatus::Compressing {
                self.log_port
                    .debug(&format!(
                        "Cancelled {} while compressing; late results will be ignored",
                        active.record.job_id
                    ))
                    .await;
            }
        }
        self.snapshots.send_replace(None);
    }

    /// Wait for the next change to the current job.
    ///
    /// Returns `None` right away when no job is compressing.
    pub async fn next_update(&mut self) -> Option<JobUpdate> {
        loop {
            if self.phase() != OrchestratorPhase::Compressing {
                return None;
            }
            let event = self.events_rx.recv().await?;
            if let Some(update) = self.apply(event).await {
                return Some(update);
            }
        }
    }

    /// Apply every event already queued without waiting for more
    pub async fn drain_pending(&mut self) -> Vec<JobUpdate> {
        let mut updates = Vec::new();
        while let Ok(event) = self.events_rx.try_recv() {
            if let Some(update) = self.apply(event).await {
                updates.push(update);
            }
        }
        updates
    }

    /// Drive the current job to a terminal state and return its record
    pub async fn wait_for_terminal(&mut self) -> Option<CompressionJobRecord> {
        while let Some(update) = self.next_update().await {
            if update.is_terminal() {
                return Some(update.record().clone());
            }
        }
        self.current().cloned()
    }

    /// Run the engine call in its own task so a panic inside the engine still
    /// ends the job with a `Finished` event. Returns the handle of that task.
    fn spawn_engine_call(&self, job_id: JobId, file: SelectedFile) -> AbortHandle {
        let engine = Arc::clone(&self.engine);
        let config = self.config.clone();
        let done_tx = self.events_tx.clone();
        let progress_tx = self.events_tx.clone();

        let sink: ProgressSink = Arc::new(move |fraction| {
            let _ = progress_tx.send(JobEvent {
                job_id,
                kind: JobEventKind::EngineProgress(fraction),
            });
        });

        let call = tokio::spawn(async move { engine.encode(&file, &config, Some(sink)).await });
        let engine_call = call.abort_handle();

        tokio::spawn(async move {
            let outcome = call.await.unwrap_or_else(|e| Err(failure_from_join_error(e)));
            let _ = done_tx.send(JobEvent {
                job_id,
                kind: JobEventKind::Finished(outcome),
            });
        });

        engine_call
    }

    /// The ticker ends by itself once synthetic progress has reached its cap.
    fn spawn_ticker(&self, job_id: JobId) -> SyntheticTicker {
        let tick_tx = self.events_tx.clone();
        let mut ticks_left = self.ticker_settings.ticks_to_cap();
        SyntheticTicker::spawn(self.ticker_settings.interval, move || {
            if ticks_left == 0 {
                return false;
            }
            ticks_left -= 1;
            let sent = tick_tx.send(JobEvent {
                job_id,
                kind: JobEventKind::Tick,
            });
            sent.is_ok() && ticks_left > 0
        })
    }

    async fn apply(&mut self, event: JobEvent) -> Option<JobUpdate> {
        let log_port = Arc::clone(&self.log_port);

        let active = match self.active.as_mut() {
            Some(active) if active.record.job_id == event.job_id => active,
            _ => {
                log_port
                    .debug(&format!("Ignoring stale event for {}", event.job_id))
                    .await;
                return None;
            }
        };
        if active.record.is_terminal() {
            return None;
        }

        match event.kind {
            JobEventKind::Tick => {
                let value = active.merger.on_tick()?;
                active.record.set_progress(value);
                self.snapshots.send_replace(Some(active.record.clone()));
                Some(JobUpdate::Progress(active.record.clone()))
            }
            JobEventKind::EngineProgress(fraction) => {
                // Real progress has arrived; the synthetic estimate is no longer needed.
                active.stop_ticker();
                let value = active.merger.on_engine_progress(fraction)?;
                active.record.set_progress(value);
                self.snapshots.send_replace(Some(active.record.clone()));
                Some(JobUpdate::Progress(active.record.clone()))
            }
            JobEventKind::Finished(Ok(output)) => {
                active.stop_ticker();

                let original_size = active.record.original_size;
                if output.byte_len > original_size {
                    log_port
                        .warn(&format!(
                            "{} produced {} bytes from a {} byte original; reporting zero savings",
                            active.record.job_id, output.byte_len, original_size
                        ))
                        .await;
                }

                let savings = SizeMetrics::savings(original_size, output.byte_len);
                let elapsed_ms = active.started_at.elapsed().as_millis() as u64;
                active.merger.finish();
                active.record.complete(output, savings, elapsed_ms);

                log_port
                    .info(&format!(
                        "{} complete: {} -> {} bytes ({:.1}% saved) in {} ms",
                        active.record.job_id,
                        original_size,
                        active.record.result_size,
                        savings.percent,
                        elapsed_ms
                    ))
                    .await;

                self.snapshots.send_replace(Some(active.record.clone()));
                Some(JobUpdate::Completed(active.record.clone()))
            }
            JobEventKind::Finished(Err(failure)) => {
                active.stop_ticker();
                active.merger.halt();

                let error = self.classifier.classify(&failure);
                let elapsed_ms = active.started_at.elapsed().as_millis() as u64;
                log_port
                    .error(&format!(
                        "{} failed at {}% as {}: {}",
                        active.record.job_id, active.record.progress, error.kind, failure.message
                    ))
                    .await;
                active.record.fail(error, elapsed_ms);

                self.snapshots.send_replace(Some(active.record.clone()));
                Some(JobUpdate::Failed(active.record.clone()))
            }
        }
    }
}

fn failure_from_join_error(error: JoinError) -> EngineFailure {
    if !error.is_panic() {
        return EngineFailure::new(format!("Engine call ended unexpectedly: {}", error));
    }
    let payload = error.into_panic();
    let detail = payload
        .downcast_ref::<&str>()
        .map(|s| s.to_string())
        .or_else(|| payload.downcast_ref::<String>().cloned())
        .unwrap_or_else(|| "no message".to_string());
    EngineFailure::new(format!("Engine call panicked: {}", detail))
}
