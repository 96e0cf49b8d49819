//! crates/lep_inspect_core/src/ports.rs
//!
//! Defines the service contracts (traits) for the application's core logic.
//! These traits form the boundary of the hexagonal architecture, allowing the
//! core to be independent of specific external implementations like the HTTP
//! backend, object storage, or the filesystem.

use async_trait::async_trait;
use std::path::Path;

use crate::domain::{
    AiModel, BatchInit, BatchListQuery, BatchPage, BatchStatus, FileInit, GpsCoordinates,
    ImageStats, PersistedSession, PhotoPage, TokenPair, UserProfile,
};

//=========================================================================================
// Generic Port Error and Result Types
//=========================================================================================

/// A generic error type for all port operations.
/// This abstracts away the specific errors from external services (network,
/// storage) so the core never depends on a transport library.
#[derive(Debug, thiserror::Error)]
pub enum PortError {
    /// The backend answered with a non-2xx status.
    #[error("request failed with status {0}")]
    RequestFailed(u16),
    /// The request never produced a response (DNS, connect, I/O).
    #[error("network error: {0}")]
    Network(String),
    /// A 2xx response whose body could not be decoded.
    #[error("malformed response: {0}")]
    Malformed(String),
    #[error("unauthorized")]
    Unauthorized,
    /// Durable client storage failed (session file, etc.).
    #[error("storage error: {0}")]
    Storage(String),
}

/// A convenience type alias for `Result<T, PortError>`.
pub type PortResult<T> = Result<T, PortError>;

//=========================================================================================
// Service Ports (Traits)
//=========================================================================================

/// The inspection backend's REST contract. Paths are relative to a
/// configured base URL; all authenticated calls carry the current bearer
/// token, injected by the adapter. No retries happen at this layer.
#[async_trait]
pub trait InspectionApi: Send + Sync {
    // --- Session ---
    async fn login(&self, email: &str, password: &str) -> PortResult<TokenPair>;

    async fn refresh(&self, refresh_token: &str) -> PortResult<TokenPair>;

    async fn whoami(&self) -> PortResult<UserProfile>;

    /// Best-effort server-side invalidation of the refresh token.
    async fn logout(&self, refresh_token: &str) -> PortResult<()>;

    // --- Batches ---
    async fn list_models(&self) -> PortResult<Vec<AiModel>>;

    async fn list_batches(&self, query: &BatchListQuery) -> PortResult<BatchPage>;

    /// A 204 with no body counts as success here, not as a decode failure.
    async fn delete_batch(&self, batch_id: u64) -> PortResult<()>;

    async fn batch_status(&self, batch_id: u64) -> PortResult<BatchStatus>;

    async fn init_batch(&self, batch_name: &str, files: &[FileInit]) -> PortResult<BatchInit>;

    async fn confirm_batch(&self, batch_id: u64, model_id: u64) -> PortResult<()>;

    /// Fetches one page of the photo listing. `path` is relative to the API
    /// base and may carry a query string (it is how `next` links are
    /// followed).
    async fn photo_page(&self, path: &str) -> PortResult<PhotoPage>;

    async fn batch_stats(&self) -> PortResult<ImageStats>;
}

/// Raw binary upload to a pre-signed URL, outside the API base.
#[async_trait]
pub trait FileTransfer: Send + Sync {
    /// PUTs the file at `path` to `upload_url`, invoking `progress` with
    /// cumulative `(bytes_sent, bytes_total)` after every chunk handed to
    /// the transport.
    async fn put_file(
        &self,
        upload_url: &str,
        path: &Path,
        progress: &mut (dyn FnMut(u64, u64) + Send),
    ) -> PortResult<()>;
}

/// Durable key-value storage for the session snapshot. Only the session
/// manager may write through this port (single-writer discipline).
pub trait SessionStorage: Send + Sync {
    fn load(&self) -> PortResult<Option<PersistedSession>>;

    fn save(&self, session: &PersistedSession) -> PortResult<()>;

    fn clear(&self) -> PortResult<()>;
}

/// GPS extraction from an image file. Extraction failure is not an error;
/// the candidate simply gets no coordinates.
pub trait GpsReader: Send + Sync {
    fn read_gps(&self, path: &Path) -> Option<GpsCoordinates>;
}

//=========================================================================================
// Upload Progress Reporting
//=========================================================================================

/// Progress events emitted by the upload orchestrator. Indices are zero
/// based and refer to the candidate ordering at submit time.
#[derive(Debug, Clone, PartialEq)]
pub enum UploadEvent {
    Started { total_files: usize },
    FileStarted { index: usize, filename: String },
    FileProgress {
        index: usize,
        file_percent: u8,
        overall_percent: f64,
    },
    FileCompleted { index: usize, overall_percent: f64 },
    Confirming,
    Completed { batch_id: u64 },
}

/// Injectable sink for upload progress, decoupling the orchestrator from
/// whatever renders the progress (CLI, UI, test recorder).
pub trait ProgressSink: Send + Sync {
    fn on_event(&self, event: UploadEvent);
}

/// A sink that discards every event.
pub struct NullSink;

impl ProgressSink for NullSink {
    fn on_event(&self, _event: UploadEvent) {}
}
