//! Error types for the meeting sync pipeline.
//!
//! Only cache- and write-level failures surface here. Missing configuration degrades to
//! defaults (logged as warnings) and per-meeting LLM failures are isolated by the
//! orchestrator, so neither appears in `SyncError`.

use std::path::PathBuf;
use thiserror::Error;

/// Result type alias for sync operations
pub type SyncResult<T> = Result<T, SyncError>;

/// Fatal errors for a sync run.
#[derive(Error, Debug)]
pub enum SyncError {
    #[error("Capture cache not found at {}", .0.display())]
    CacheNotFound(PathBuf),

    #[error("Capture cache unreadable: {0}")]
    CacheParse(String),

    #[error("Failed to write meeting note {}: {source}", path.display())]
    NoteWrite {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to write queue index {}: {source}", path.display())]
    QueueWrite {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to persist processing state {}: {source}", path.display())]
    StateWrite {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Front-matter serialization failed: {0}")]
    FrontMatter(#[from] serde_yaml::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl SyncError {
    /// True for the errors that mean the capture cache could not be used at all.
    pub fn is_cache_unavailable(&self) -> bool {
        matches!(self, Self::CacheNotFound(_) | Self::CacheParse(_))
    }
}
