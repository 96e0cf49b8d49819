//! services/client/src/error.rs
//!
//! Defines the primary error type for the entire client.

use crate::config::ConfigError;
use lep_inspect_core::ports::PortError;
use lep_inspect_core::upload::UploadError;

/// The primary error type for the `client` crate.
#[derive(Debug, thiserror::Error)]
pub enum ClientError {
    /// Represents an error that occurred during configuration loading.
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// Represents an error that propagated up from one of the core ports.
    #[error("Service Port Error: {0}")]
    Port(#[from] PortError),

    /// A batch submission failure (validation or remote).
    #[error("Upload error: {0}")]
    Upload(#[from] UploadError),

    /// Represents a standard Input/Output error (e.g., reading a staged file).
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// A catch-all for any other unexpected errors.
    #[error("{0}")]
    Internal(String),
}
