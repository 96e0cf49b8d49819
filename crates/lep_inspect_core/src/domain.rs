//! crates/lep_inspect_core/src/domain.rs
//!
//! Defines the pure, core data structures for the application.
//! These structs are independent of the backend wire format; the HTTP adapter
//! in the client crate converts its serde records into these shapes.

use chrono::{DateTime, Utc};
use std::path::PathBuf;
use uuid::Uuid;

use crate::paging::{page_window, GRID_PAGE_SIZE, TABLE_PAGE_SIZE};

/// The access/refresh token pair issued by the login and refresh endpoints.
/// Both tokens are opaque bearer credentials.
#[derive(Debug, Clone)]
pub struct TokenPair {
    pub access: String,
    pub refresh: String,
}

/// The authenticated user's profile, as returned by the whoami endpoint.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UserProfile {
    pub id: u64,
    pub email: String,
    pub first_name: String,
    pub last_name: String,
}

/// The full session snapshot held in durable storage. Absence of a snapshot
/// means logged out. While the process is alive the persisted copy is a
/// cache; the in-memory session manager is the source of truth.
#[derive(Debug, Clone)]
pub struct PersistedSession {
    pub access_token: String,
    pub refresh_token: String,
    pub user: UserProfile,
}

/// A detection model the backend can run over a batch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AiModel {
    pub id: u64,
    pub name: String,
}

/// Batch lifecycle stage. The ordering is meaningful: a batch only ever
/// moves forward through these stages.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum ProcessingStatus {
    NotProcessed,
    Processing,
    Completed,
    Reviewed,
}

impl ProcessingStatus {
    /// Human-readable label used by the presentation layer.
    pub fn label(self) -> &'static str {
        match self {
            ProcessingStatus::NotProcessed => "created",
            ProcessingStatus::Processing => "processing",
            ProcessingStatus::Completed => "completed",
            ProcessingStatus::Reviewed => "reviewed",
        }
    }
}

/// Status header for a single batch.
#[derive(Debug, Clone)]
pub struct BatchStatus {
    pub id: u64,
    pub name: String,
    pub uploaded_at: DateTime<Utc>,
    pub processing_status: ProcessingStatus,
}

/// One row of the batch listing.
#[derive(Debug, Clone)]
pub struct BatchSummary {
    pub id: u64,
    pub name: String,
    pub uploaded_at: DateTime<Utc>,
    pub photo_count: u64,
    pub processing_status: ProcessingStatus,
}

/// A single page of the batch listing, as paginated by the backend.
#[derive(Debug, Clone)]
pub struct BatchPage {
    pub count: u64,
    pub next: Option<String>,
    pub previous: Option<String>,
    pub results: Vec<BatchSummary>,
}

/// Query parameters for the batch listing endpoint.
#[derive(Debug, Clone, Default)]
pub struct BatchListQuery {
    pub page: Option<u32>,
    pub size: Option<u32>,
    pub date_from: Option<String>,
    pub date_to: Option<String>,
}

/// A local file staged for upload. `latitude`/`longitude` default to "0"
/// unless GPS extraction succeeded when the candidate was built.
#[derive(Debug, Clone)]
pub struct UploadCandidate {
    pub id: Uuid,
    pub path: PathBuf,
    pub filename: String,
    pub size_bytes: u64,
    pub latitude: String,
    pub longitude: String,
}

/// Per-file entry of the init request body.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileInit {
    pub filename: String,
    pub latitude: String,
    pub longitude: String,
}

/// Where the backend wants one file uploaded. The ordering of targets in
/// `BatchInit::files` corresponds positionally to the files sent in the
/// init request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadTarget {
    pub image_id: u64,
    pub file_key: String,
    pub upload_url: String,
}

/// The backend's response to an init call.
#[derive(Debug, Clone)]
pub struct BatchInit {
    pub batch_id: u64,
    pub files: Vec<UploadTarget>,
}

/// Whether a detection is a damage finding or a recognized object.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DetectionKind {
    Damage,
    Object,
}

/// A single classified finding on a photo. This is the single tagged
/// representation for all detection results; the wire adapter folds the
/// backend's separate damage/object arrays into it.
#[derive(Debug, Clone, PartialEq)]
pub struct Detection {
    pub kind: DetectionKind,
    pub label: String,
    pub confidence: f32,
}

/// One analyzed photo. A photo belongs to exactly one batch, recoverable
/// from the `batch_<id>/` segment embedded in `file_key`.
#[derive(Debug, Clone, PartialEq)]
pub struct PhotoResult {
    pub id: u64,
    pub file_key: String,
    pub preview: Option<String>,
    pub result: Option<String>,
    pub latitude: String,
    pub longitude: String,
    pub uploaded_at: Option<DateTime<Utc>>,
    pub detections: Vec<Detection>,
}

impl PhotoResult {
    pub fn has_damage(&self) -> bool {
        self.detections
            .iter()
            .any(|d| d.kind == DetectionKind::Damage)
    }
}

/// A single page of the photo listing endpoint.
#[derive(Debug, Clone)]
pub struct PhotoPage {
    pub count: u64,
    pub next: Option<String>,
    pub results: Vec<PhotoResult>,
}

/// Counts derived from one pass over an aggregated batch view.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DamageSummary {
    pub total: usize,
    pub with_damage: usize,
    pub without_damage: usize,
}

/// The fully materialized, batch-filtered, id-ordered photo collection for
/// one batch. Built by walking every page of the listing endpoint; all
/// further views are in-memory slices, no network involved.
#[derive(Debug, Clone)]
pub struct AggregatedBatchView {
    items: Vec<PhotoResult>,
}

impl AggregatedBatchView {
    pub fn new(items: Vec<PhotoResult>) -> Self {
        Self { items }
    }

    pub fn count(&self) -> usize {
        self.items.len()
    }

    pub fn items(&self) -> &[PhotoResult] {
        &self.items
    }

    /// Thumbnail-grid window (1-based page number).
    pub fn grid_page(&self, page: usize) -> &[PhotoResult] {
        page_window(&self.items, page, GRID_PAGE_SIZE)
    }

    /// Detail-table window (1-based page number).
    pub fn table_page(&self, page: usize) -> &[PhotoResult] {
        page_window(&self.items, page, TABLE_PAGE_SIZE)
    }

    pub fn damage_summary(&self) -> DamageSummary {
        let mut with_damage = 0;
        for item in &self.items {
            if item.has_damage() {
                with_damage += 1;
            }
        }
        DamageSummary {
            total: self.items.len(),
            with_damage,
            without_damage: self.items.len() - with_damage,
        }
    }
}

/// Global image-processing statistics.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ImageStats {
    pub total: u64,
    pub processed: u64,
    pub not_processed: u64,
}

/// Decimal-degree GPS coordinates extracted from a photo.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GpsCoordinates {
    pub latitude: f64,
    pub longitude: f64,
}
