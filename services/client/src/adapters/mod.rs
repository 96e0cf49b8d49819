//! services/client/src/adapters/mod.rs
//!
//! Concrete implementations of the core's service ports.

pub mod exif_gps;
pub mod http_api;
pub mod session_file;
pub mod transfer;

pub use exif_gps::ExifGpsReader;
pub use http_api::HttpInspectionApi;
pub use session_file::FileSessionStore;
pub use transfer::HttpFileTransfer;
