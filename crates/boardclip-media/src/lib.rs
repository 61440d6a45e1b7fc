#![deny(unreachable_patterns)]
//! Motion segmentation and FFmpeg overlay synthesis.
//!
//! This crate provides:
//! - ROI-masked background-subtraction motion segmentation (OpenCV)
//! - Interval padding and merging post-processing
//! - Overlay planning from move event timestamps
//! - Type-safe filter-graph synthesis for multi-segment overlays
//! - An FFmpeg command builder and a never-raising process runner

pub mod command;
pub mod error;
pub mod motion;
pub mod overlay;
pub mod probe;
pub mod roi;
pub mod segments;

pub use command::{FfmpegCommand, FfmpegRunner, DEFAULT_TIMEOUT_SECS};
pub use error::{MediaError, MediaResult};
#[cfg(feature = "opencv")]
pub use motion::detect_motion_segments;
pub use motion::{fold_motion_flags, ExtractorKind, MotionConfig, MotionRun};
pub use overlay::filtergraph::FilterGraph;
pub use overlay::planner::{parse_offset, plan_from_manifest, plan_overlays, OverlayPlan};
pub use probe::{probe_video, VideoInfo};
pub use segments::{merge_intervals, pad_intervals};
