//! crates/lep_inspect_core/src/batch_key.rs
//!
//! The backend's photo listing is batch-oblivious; the only reliable link
//! between a photo and its batch is a `batch_<id>/` path segment embedded in
//! the photo's `file_key` (e.g. `uploads/2025/11/19/batch_12/abc123.jpg`).
//! That inference is a fragile integration shim, so it lives behind this one
//! pure function and nowhere else.

/// Extracts the batch id from a file key.
///
/// Returns the id of the first `batch_<digits>/` path segment found, or
/// `None` when the key carries no such segment.
pub fn batch_id_from_file_key(file_key: &str) -> Option<u64> {
    let mut rest = file_key;
    while let Some(pos) = rest.find("batch_") {
        let tail = &rest[pos + "batch_".len()..];
        let digits_end = tail
            .find(|c: char| !c.is_ascii_digit())
            .unwrap_or(tail.len());
        if digits_end > 0 && tail[digits_end..].starts_with('/') {
            if let Ok(id) = tail[..digits_end].parse() {
                return Some(id);
            }
        }
        rest = tail;
    }
    None
}
