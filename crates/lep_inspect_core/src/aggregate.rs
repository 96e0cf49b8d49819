//! crates/lep_inspect_core/src/aggregate.rs
//!
//! The batch/result aggregator: fetches a batch's status plus every page of
//! the backend's photo listing, keeps only the photos that actually belong
//! to the requested batch, and materializes them as one id-ordered in-memory
//! collection for the grid and table views.
//!
//! The listing endpoint paginates over all photos globally and its `next`
//! links come back absolute, so each page is filtered by the batch id
//! embedded in `file_key` and `next` is rewritten to a relative path before
//! reuse.

use std::sync::Arc;
use tracing::warn;

use crate::batch_key::batch_id_from_file_key;
use crate::domain::{AggregatedBatchView, BatchStatus, PhotoResult};
use crate::ports::{InspectionApi, PortResult};

/// A batch's status header together with its materialized photo collection.
#[derive(Debug, Clone)]
pub struct BatchDetail {
    pub status: BatchStatus,
    pub view: AggregatedBatchView,
}

pub struct BatchAggregator {
    api: Arc<dyn InspectionApi>,
}

impl BatchAggregator {
    pub fn new(api: Arc<dyn InspectionApi>) -> Self {
        Self { api }
    }

    /// Loads the full detail view for one batch.
    ///
    /// The status fetch must succeed; the page walk is fail-open (a mid-walk
    /// failure keeps whatever was accumulated so far; the view is read-only
    /// and degrades gracefully).
    pub async fn load(&self, batch_id: u64) -> PortResult<BatchDetail> {
        let status = self.api.batch_status(batch_id).await?;
        let view = self.collect_photos(batch_id).await;
        Ok(BatchDetail { status, view })
    }

    /// Walks every page of the photo listing for `batch_id`, strictly
    /// sequentially, and returns the filtered, id-sorted accumulation.
    pub async fn collect_photos(&self, batch_id: u64) -> AggregatedBatchView {
        let mut items: Vec<PhotoResult> = Vec::new();
        let mut next = Some(format!("vision/batches/{batch_id}/"));

        while let Some(link) = next {
            let path = relativize_next(&link);
            match self.api.photo_page(&path).await {
                Ok(page) => {
                    items.extend(
                        page.results
                            .into_iter()
                            .filter(|p| batch_id_from_file_key(&p.file_key) == Some(batch_id)),
                    );
                    next = page.next;
                }
                Err(err) => {
                    warn!(batch_id, error = %err, "photo page walk failed, keeping partial results");
                    break;
                }
            }
        }

        // Pages can arrive out of order server-side; sort once at the end.
        items.sort_by_key(|p| p.id);
        AggregatedBatchView::new(items)
    }
}

/// Rewrites an absolute `next` link back to a path relative to the API base.
///
/// `https://host/api/vision/batches/7/?page=2` becomes
/// `vision/batches/7/?page=2`; already-relative links pass through unchanged.
pub fn relativize_next(link: &str) -> String {
    for scheme in ["https://", "http://"] {
        if let Some(rest) = link.strip_prefix(scheme) {
            let after_host = match rest.find('/') {
                Some(i) => &rest[i + 1..],
                None => "",
            };
            return after_host
                .strip_prefix("api/")
                .unwrap_or(after_host)
                .to_string();
        }
    }
    link.to_string()
}
