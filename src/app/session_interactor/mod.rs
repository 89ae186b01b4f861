// Session interactor - The state surface a front end renders from

use tokio::sync::watch;
use tracing::info;

use crate::app::compress_interactor::{CompressionOrchestrator, JobUpdate, OrchestratorPhase};
use crate::domain::errors::*;
use crate::domain::model::*;
use crate::domain::rules::*;

/// Holds the current selected file next to the orchestrator and turns
/// user intents (submit, retry, clear) into orchestrator calls
pub struct CompressionSession {
    orchestrator: CompressionOrchestrator,
    policy: ValidationPolicy,
    selected: Option<SelectedFile>,
}

impl CompressionSession {
    pub fn new(orchestrator: CompressionOrchestrator, policy: ValidationPolicy) -> Self {
        Self {
            orchestrator,
            policy,
            selected: None,
        }
    }

    pub fn policy(&self) -> &ValidationPolicy {
        &self.policy
    }

    pub fn selected_file(&self) -> Option<&SelectedFile> {
        self.selected.as_ref()
    }

    pub fn current_job(&self) -> Option<&CompressionJobRecord> {
        self.orchestrator.current()
    }

    pub fn phase(&self) -> OrchestratorPhase {
        self.orchestrator.phase()
    }

    pub fn subscribe(&self) -> watch::Receiver<Option<CompressionJobRecord>> {
        self.orchestrator.subscribe()
    }

    /// Submit a new file, superseding whatever was selected before.
    ///
    /// The file is validated against the session policy; a valid file starts
    /// a job right away, an invalid one is kept with its error so it can be
    /// shown.
    pub async fn submit_file(
        &mut self,
        candidate: SelectedFile,
    ) -> Result<SelectedFile, DomainError> {
        self.selected = None;
        self.orchestrator.clear().await;

        let result = FileValidator::validate(&candidate, &self.policy);
        let file = candidate.validated(result);

        match file.validation_error() {
            Some(error) => {
                info!(
                    file = %file.name,
                    kind = %error.kind,
                    "Rejected submitted file: {}",
                    error.message
                );
            }
            None => {
                self.orchestrator.start(file.clone()).await?;
            }
        }

        self.selected = Some(file.clone());
        Ok(file)
    }

    /// Retry the failed job with the same file
    pub async fn retry(&mut self) -> Result<JobId, DomainError> {
        self.orchestrator.retry().await
    }

    /// Forget the selected file and the job
    pub async fn clear(&mut self) {
        self.selected = None;
        self.orchestrator.clear().await;
    }

    pub async fn next_update(&mut self) -> Option<JobUpdate> {
        self.orchestrator.next_update().await
    }

    pub async fn drain_pending(&mut self) -> Vec<JobUpdate> {
        self.orchestrator.drain_pending().await
    }

    pub async fn wait_for_terminal(&mut self) -> Option<CompressionJobRecord> {
        self.orchestrator.wait_for_terminal().await
    }
}
