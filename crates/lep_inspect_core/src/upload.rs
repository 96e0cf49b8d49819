//! crates/lep_inspect_core/src/upload.rs
//!
//! The batch upload orchestrator: turns a project name plus a set of staged
//! files into the backend's three-phase remote operation
//! (init → per-file upload → confirm).
//!
//! Uploads are strictly sequential, one file at a time. That is a deliberate
//! backpressure choice: the backend hands out one pre-signed slot per file
//! and per-file progress events arrive in a stable order that aggregates
//! trivially.

use std::sync::{Arc, Mutex};
use tracing::{error, info};

use crate::domain::{FileInit, UploadCandidate};
use crate::pending::PendingSet;
use crate::ports::{FileTransfer, InspectionApi, PortError, ProgressSink, UploadEvent};
use crate::progress::AggregateProgress;

//=========================================================================================
// Errors and State
//=========================================================================================

/// Failures of a batch submission. The validation variants are detected
/// locally before any network call is made.
#[derive(Debug, thiserror::Error)]
pub enum UploadError {
    #[error("project name must not be empty")]
    EmptyName,
    #[error("no files staged for upload")]
    NoFiles,
    #[error("no detection model selected")]
    NoModel,
    /// The init response must return exactly one upload target per file, in
    /// the same order; anything else breaks the positional pairing.
    #[error("init returned {got} upload targets for {expected} files")]
    TargetMismatch { expected: usize, got: usize },
    #[error(transparent)]
    Port(#[from] PortError),
}

/// Observable orchestrator state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UploadStage {
    Idle,
    /// `current` is 1-based; 0 while init is in flight.
    Uploading { current: usize, total: usize },
    Confirming,
}

/// What a successful submission produced.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct UploadOutcome {
    pub batch_id: u64,
    pub files_uploaded: usize,
}

//=========================================================================================
// Orchestrator
//=========================================================================================

pub struct UploadOrchestrator {
    api: Arc<dyn InspectionApi>,
    transfer: Arc<dyn FileTransfer>,
    stage: Mutex<UploadStage>,
}

impl UploadOrchestrator {
    pub fn new(api: Arc<dyn InspectionApi>, transfer: Arc<dyn FileTransfer>) -> Self {
        Self {
            api,
            transfer,
            stage: Mutex::new(UploadStage::Idle),
        }
    }

    pub fn stage(&self) -> UploadStage {
        *self.stage.lock().unwrap()
    }

    fn set_stage(&self, stage: UploadStage) {
        *self.stage.lock().unwrap() = stage;
    }

    /// Submits the pending set as one batch.
    ///
    /// On success the pending set is drained and the orchestrator returns to
    /// `Idle`. On any failure the remaining steps are skipped, the pending
    /// set is left untouched (the user restarts the whole batch; there is no
    /// partial retry) and the state still returns to `Idle`.
    pub async fn submit(
        &self,
        batch_name: &str,
        model_id: Option<u64>,
        pending: &mut PendingSet,
        sink: &dyn ProgressSink,
    ) -> Result<UploadOutcome, UploadError> {
        let name = batch_name.trim();
        if name.is_empty() {
            return Err(UploadError::EmptyName);
        }
        if pending.is_empty() {
            return Err(UploadError::NoFiles);
        }
        let model_id = model_id.ok_or(UploadError::NoModel)?;

        let result = self.run(name, model_id, pending.candidates(), sink).await;
        self.set_stage(UploadStage::Idle);
        match &result {
            Ok(outcome) => {
                info!(
                    batch_id = outcome.batch_id,
                    files = outcome.files_uploaded,
                    "batch submitted"
                );
                pending.clear();
            }
            Err(err) => {
                // Detail goes to the log; callers surface a generic message.
                error!(error = %err, "batch submission failed");
            }
        }
        result
    }

    async fn run(
        &self,
        batch_name: &str,
        model_id: u64,
        candidates: &[UploadCandidate],
        sink: &dyn ProgressSink,
    ) -> Result<UploadOutcome, UploadError> {
        let total = candidates.len();
        self.set_stage(UploadStage::Uploading { current: 0, total });
        sink.on_event(UploadEvent::Started { total_files: total });

        // Phase 1: init, with files in the exact order of the staged set.
        let files: Vec<FileInit> = candidates
            .iter()
            .map(|c| FileInit {
                filename: c.filename.clone(),
                latitude: c.latitude.clone(),
                longitude: c.longitude.clone(),
            })
            .collect();
        let init = self.api.init_batch(batch_name, &files).await?;
        if init.files.len() != total {
            return Err(UploadError::TargetMismatch {
                expected: total,
                got: init.files.len(),
            });
        }

        // Phase 2: sequential per-file uploads, paired positionally with the
        // init targets.
        let mut tracker = AggregateProgress::new(total);
        for (index, (candidate, target)) in candidates.iter().zip(&init.files).enumerate() {
            self.set_stage(UploadStage::Uploading {
                current: index + 1,
                total,
            });
            sink.on_event(UploadEvent::FileStarted {
                index,
                filename: candidate.filename.clone(),
            });

            let mut on_chunk = |sent: u64, total_bytes: u64| {
                let overall = tracker.tick(sent, total_bytes);
                sink.on_event(UploadEvent::FileProgress {
                    index,
                    file_percent: AggregateProgress::file_percent(sent, total_bytes),
                    overall_percent: overall,
                });
            };
            self.transfer
                .put_file(&target.upload_url, &candidate.path, &mut on_chunk)
                .await?;

            let overall = tracker.file_completed();
            sink.on_event(UploadEvent::FileCompleted {
                index,
                overall_percent: overall,
            });
        }

        // Phase 3: hand off to backend processing.
        self.set_stage(UploadStage::Confirming);
        sink.on_event(UploadEvent::Confirming);
        self.api.confirm_batch(init.batch_id, model_id).await?;
        sink.on_event(UploadEvent::Completed {
            batch_id: init.batch_id,
        });

        Ok(UploadOutcome {
            batch_id: init.batch_id,
            files_uploaded: total,
        })
    }
}
