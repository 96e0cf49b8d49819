//! services/client/src/lib.rs
//!
//! Client crate: adapters for the core's service ports (HTTP backend,
//! pre-signed uploads, EXIF, session file), the session manager, and the
//! command-line surface.

pub mod adapters;
pub mod cli;
pub mod config;
pub mod error;
pub mod ingest;
pub mod session;

pub use config::{Config, ConfigError};
pub use error::ClientError;
pub use session::{RefreshGuard, SessionManager, TokenCell};
