//! Shared in-memory fakes for driving the orchestrator and aggregator
//! without a network.

// Not every test binary uses every fake.
#![allow(dead_code)]

use async_trait::async_trait;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use uuid::Uuid;

use lep_inspect_core::domain::{
    AiModel, BatchInit, BatchListQuery, BatchPage, BatchStatus, FileInit, ImageStats, PhotoPage,
    PhotoResult, ProcessingStatus, TokenPair, UploadCandidate, UserProfile,
};
use lep_inspect_core::ports::{
    FileTransfer, InspectionApi, PortError, PortResult, ProgressSink, UploadEvent,
};

fn not_wired<T>(what: &str) -> PortResult<T> {
    Err(PortError::Malformed(format!("{what} not wired in this fake")))
}

/// Programmable backend fake. Responses are keyed per endpoint; anything a
/// test does not wire up answers with a malformed-response error.
#[derive(Default)]
pub struct FakeApi {
    /// `Ok(init)` or `Err(status)` for the init endpoint.
    pub init_result: Mutex<Option<Result<BatchInit, u16>>>,
    /// Recorded `(batch_name, files)` init calls.
    pub init_calls: Mutex<Vec<(String, Vec<FileInit>)>>,
    /// Whether confirm succeeds (default) or fails with a 500.
    pub confirm_fails: Mutex<bool>,
    /// Recorded `(batch_id, model_id)` confirm calls.
    pub confirm_calls: Mutex<Vec<(u64, u64)>>,
    /// Status response for `batch_status`.
    pub status: Mutex<Option<BatchStatus>>,
    /// `Ok(page)` or `Err(status)` keyed by the exact relative path requested.
    pub pages: Mutex<HashMap<String, Result<PhotoPage, u16>>>,
    /// Every path handed to `photo_page`, in order.
    pub page_requests: Mutex<Vec<String>>,
}

impl FakeApi {
    pub fn with_init(init: BatchInit) -> Self {
        let fake = Self::default();
        *fake.init_result.lock().unwrap() = Some(Ok(init));
        fake
    }

    pub fn add_page(&self, path: &str, page: PhotoPage) {
        self.pages
            .lock()
            .unwrap()
            .insert(path.to_string(), Ok(page));
    }

    pub fn fail_page(&self, path: &str, status: u16) {
        self.pages
            .lock()
            .unwrap()
            .insert(path.to_string(), Err(status));
    }
}

#[async_trait]
impl InspectionApi for FakeApi {
    async fn login(&self, _email: &str, _password: &str) -> PortResult<TokenPair> {
        not_wired("login")
    }

    async fn refresh(&self, _refresh_token: &str) -> PortResult<TokenPair> {
        not_wired("refresh")
    }

    async fn whoami(&self) -> PortResult<UserProfile> {
        not_wired("whoami")
    }

    async fn logout(&self, _refresh_token: &str) -> PortResult<()> {
        not_wired("logout")
    }

    async fn list_models(&self) -> PortResult<Vec<AiModel>> {
        not_wired("list_models")
    }

    async fn list_batches(&self, _query: &BatchListQuery) -> PortResult<BatchPage> {
        not_wired("list_batches")
    }

    async fn delete_batch(&self, _batch_id: u64) -> PortResult<()> {
        not_wired("delete_batch")
    }

    async fn batch_status(&self, batch_id: u64) -> PortResult<BatchStatus> {
        match self.status.lock().unwrap().clone() {
            Some(status) => Ok(status),
            None => Err(PortError::RequestFailed(404)),
        }
        .map(|mut s: BatchStatus| {
            s.id = batch_id;
            s
        })
    }

    async fn init_batch(&self, batch_name: &str, files: &[FileInit]) -> PortResult<BatchInit> {
        self.init_calls
            .lock()
            .unwrap()
            .push((batch_name.to_string(), files.to_vec()));
        match self.init_result.lock().unwrap().clone() {
            Some(Ok(init)) => Ok(init),
            Some(Err(status)) => Err(PortError::RequestFailed(status)),
            None => not_wired("init_batch"),
        }
    }

    async fn confirm_batch(&self, batch_id: u64, model_id: u64) -> PortResult<()> {
        if *self.confirm_fails.lock().unwrap() {
            return Err(PortError::RequestFailed(500));
        }
        self.confirm_calls.lock().unwrap().push((batch_id, model_id));
        Ok(())
    }

    async fn photo_page(&self, path: &str) -> PortResult<PhotoPage> {
        self.page_requests.lock().unwrap().push(path.to_string());
        match self.pages.lock().unwrap().get(path) {
            Some(Ok(page)) => Ok(page.clone()),
            Some(Err(status)) => Err(PortError::RequestFailed(*status)),
            None => Err(PortError::RequestFailed(404)),
        }
    }

    async fn batch_stats(&self) -> PortResult<ImageStats> {
        not_wired("batch_stats")
    }
}

/// Transfer fake reporting a fixed chunk schedule per file.
#[derive(Default)]
pub struct FakeTransfer {
    /// `(upload_url, path)` per upload, in call order.
    pub uploads: Mutex<Vec<(String, PathBuf)>>,
    /// Upload index (0-based) that fails with a network error.
    pub fail_at: Mutex<Option<usize>>,
}

#[async_trait]
impl FileTransfer for FakeTransfer {
    async fn put_file(
        &self,
        upload_url: &str,
        path: &Path,
        progress: &mut (dyn FnMut(u64, u64) + Send),
    ) -> PortResult<()> {
        let index = {
            let mut uploads = self.uploads.lock().unwrap();
            uploads.push((upload_url.to_string(), path.to_path_buf()));
            uploads.len() - 1
        };
        if *self.fail_at.lock().unwrap() == Some(index) {
            return Err(PortError::Network("connection reset".to_string()));
        }
        for sent in [250u64, 500, 750, 1000] {
            progress(sent, 1000);
        }
        Ok(())
    }
}

/// Records every upload event for later assertions.
#[derive(Default)]
pub struct RecordingSink {
    pub events: Mutex<Vec<UploadEvent>>,
}

impl ProgressSink for RecordingSink {
    fn on_event(&self, event: UploadEvent) {
        self.events.lock().unwrap().push(event);
    }
}

pub fn candidate(name: &str) -> UploadCandidate {
    UploadCandidate {
        id: Uuid::new_v4(),
        path: PathBuf::from(name),
        filename: name.to_string(),
        size_bytes: 1000,
        latitude: "0".to_string(),
        longitude: "0".to_string(),
    }
}

pub fn photo(id: u64, file_key: &str) -> PhotoResult {
    PhotoResult {
        id,
        file_key: file_key.to_string(),
        preview: None,
        result: None,
        latitude: "0".to_string(),
        longitude: "0".to_string(),
        uploaded_at: None,
        detections: Vec::new(),
    }
}

pub fn status(id: u64, name: &str) -> BatchStatus {
    BatchStatus {
        id,
        name: name.to_string(),
        uploaded_at: chrono::Utc::now(),
        processing_status: ProcessingStatus::Completed,
    }
}
