pub mod aggregate;
pub mod batch_key;
pub mod domain;
pub mod paging;
pub mod pending;
pub mod ports;
pub mod progress;
pub mod upload;

pub use aggregate::{relativize_next, BatchAggregator, BatchDetail};
pub use batch_key::batch_id_from_file_key;
pub use domain::{
    AggregatedBatchView, AiModel, BatchInit, BatchListQuery, BatchPage, BatchStatus, BatchSummary,
    DamageSummary, Detection, DetectionKind, FileInit, GpsCoordinates, ImageStats,
    PersistedSession, PhotoPage, PhotoResult, ProcessingStatus, TokenPair, UploadCandidate,
    UploadTarget, UserProfile,
};
pub use pending::PendingSet;
pub use ports::{
    FileTransfer, GpsReader, InspectionApi, NullSink, PortError, PortResult, ProgressSink,
    SessionStorage, UploadEvent,
};
pub use progress::AggregateProgress;
pub use upload::{UploadError, UploadOrchestrator, UploadOutcome, UploadStage};
