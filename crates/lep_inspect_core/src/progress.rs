//! crates/lep_inspect_core/src/progress.rs
//!
//! Aggregate progress accounting for a multi-file batch upload. The overall
//! value is `(fully completed files + current file fraction) / total files`,
//! recomputed on every byte-level tick, clamped so it never decreases and
//! never exceeds 100.

/// Tracks aggregate upload progress across a fixed number of files.
///
/// Files complete strictly in order, one at a time (the orchestrator uploads
/// sequentially), so a single current-file fraction is enough.
#[derive(Debug)]
pub struct AggregateProgress {
    total_files: usize,
    completed: usize,
    current_fraction: f64,
    high_water: f64,
}

impl AggregateProgress {
    /// `total_files` must be at least 1; the orchestrator validates the
    /// candidate set before constructing a tracker.
    pub fn new(total_files: usize) -> Self {
        debug_assert!(total_files >= 1);
        Self {
            total_files: total_files.max(1),
            completed: 0,
            current_fraction: 0.0,
            high_water: 0.0,
        }
    }

    /// Records a byte-level tick of the file currently uploading and returns
    /// the new overall percentage.
    pub fn tick(&mut self, bytes_sent: u64, bytes_total: u64) -> f64 {
        self.current_fraction = if bytes_total == 0 {
            1.0
        } else {
            (bytes_sent as f64 / bytes_total as f64).min(1.0)
        };
        self.overall()
    }

    /// Marks the current file as fully uploaded and returns the new overall
    /// percentage.
    pub fn file_completed(&mut self) -> f64 {
        self.completed = (self.completed + 1).min(self.total_files);
        self.current_fraction = 0.0;
        self.overall()
    }

    /// Current overall percentage in `[0, 100]`, monotonically
    /// non-decreasing over the lifetime of the tracker.
    pub fn overall(&mut self) -> f64 {
        let raw = (self.completed as f64 + self.current_fraction) / self.total_files as f64 * 100.0;
        if raw.min(100.0) > self.high_water {
            self.high_water = raw.min(100.0);
        }
        self.high_water
    }

    /// Percentage of the file currently uploading, for per-file display.
    pub fn file_percent(bytes_sent: u64, bytes_total: u64) -> u8 {
        if bytes_total == 0 {
            return 100;
        }
        ((bytes_sent as f64 * 100.0 / bytes_total as f64).round() as u64).min(100) as u8
    }

    pub fn is_complete(&self) -> bool {
        self.completed == self.total_files
    }
}
