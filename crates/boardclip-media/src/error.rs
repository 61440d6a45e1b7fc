//! Error types for media operations.

use std::path::PathBuf;
use thiserror::Error;

/// Result type for media operations.
pub type MediaResult<T> = Result<T, MediaError>;

/// Errors that can occur during media processing.
#[derive(Debug, Error)]
pub enum MediaError {
    #[error("FFprobe not found in PATH")]
    FfprobeNotFound,

    #[error("could not open video file: {0}")]
    VideoOpen(PathBuf),

    #[error("video contains no decodable frames: {0}")]
    EmptyVideo(PathBuf),

    #[error("invalid ROI: {0}")]
    InvalidRoi(String),

    #[error("overlay plan requires at least one event timestamp")]
    EmptyPlan,

    #[error("overlay segment count ({overlay}) does not match background segment count ({background})")]
    SegmentMismatch { overlay: usize, background: usize },

    #[error("invalid offset: {0}")]
    InvalidOffset(String),

    #[error("padding requires a known total video duration")]
    PaddingWithoutDuration,

    #[error("FFprobe command failed: {message}")]
    FfprobeFailed {
        message: String,
        stderr: Option<String>,
    },

    #[error("file not found: {0}")]
    FileNotFound(PathBuf),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON parse error: {0}")]
    JsonParse(#[from] serde_json::Error),

    #[error("internal error: {0}")]
    Internal(String),
}

impl MediaError {
    /// Create an invalid-ROI error.
    pub fn invalid_roi(message: impl Into<String>) -> Self {
        Self::InvalidRoi(message.into())
    }

    /// Create an internal error.
    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal(message.into())
    }
}

#[cfg(feature = "opencv")]
impl From<opencv::Error> for MediaError {
    fn from(err: opencv::Error) -> Self {
        Self::Internal(format!("OpenCV: {err}"))
    }
}
