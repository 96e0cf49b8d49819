//! services/client/src/ingest.rs
//!
//! Builds staged upload candidates from local files. Mirrors what a file
//! picker does: non-images are skipped, GPS coordinates are pulled from EXIF
//! where available and default to "0" otherwise.

use std::path::{Path, PathBuf};
use tracing::{debug, warn};
use uuid::Uuid;

use crate::error::ClientError;
use lep_inspect_core::domain::UploadCandidate;
use lep_inspect_core::ports::GpsReader;

const IMAGE_EXTENSIONS: &[&str] = &["jpg", "jpeg", "png", "tif", "tiff", "bmp", "webp"];

pub fn is_image_file(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| {
            let ext = ext.to_ascii_lowercase();
            IMAGE_EXTENSIONS.contains(&ext.as_str())
        })
        .unwrap_or(false)
}

/// Expands `paths` (files or directories, directories one level deep) into
/// upload candidates, in a stable order: arguments in the given order,
/// directory entries sorted by file name.
pub fn collect_candidates(
    paths: &[PathBuf],
    gps: &dyn GpsReader,
) -> Result<Vec<UploadCandidate>, ClientError> {
    let mut candidates = Vec::new();
    for path in paths {
        let metadata = std::fs::metadata(path)?;
        if metadata.is_dir() {
            let mut entries: Vec<PathBuf> = std::fs::read_dir(path)?
                .collect::<Result<Vec<_>, _>>()?
                .into_iter()
                .map(|entry| entry.path())
                .collect();
            entries.sort();
            for entry in entries {
                if entry.is_file() && is_image_file(&entry) {
                    candidates.push(candidate_from(&entry, gps)?);
                }
            }
        } else if is_image_file(path) {
            candidates.push(candidate_from(path, gps)?);
        } else {
            warn!(path = %path.display(), "skipping non-image file");
        }
    }
    Ok(candidates)
}

fn candidate_from(path: &Path, gps: &dyn GpsReader) -> Result<UploadCandidate, ClientError> {
    let metadata = std::fs::metadata(path)?;
    let filename = path
        .file_name()
        .and_then(|name| name.to_str())
        .map(str::to_string)
        .ok_or_else(|| ClientError::Internal(format!("unusable file name: {}", path.display())))?;

    let (latitude, longitude) = match gps.read_gps(path) {
        Some(coords) => (coords.latitude.to_string(), coords.longitude.to_string()),
        None => {
            debug!(path = %path.display(), "no GPS data, defaulting coordinates to 0");
            ("0".to_string(), "0".to_string())
        }
    };

    Ok(UploadCandidate {
        id: Uuid::new_v4(),
        path: path.to_path_buf(),
        filename,
        size_bytes: metadata.len(),
        latitude,
        longitude,
    })
}
