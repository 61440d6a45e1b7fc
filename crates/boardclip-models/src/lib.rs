//! Shared data models for boardclip.
//!
//! This crate provides Serde-serializable types for:
//! - Time intervals on a video timeline
//! - Integer pixel coordinates and ROI corner handling
//! - The event manifest exported by the board renderer
//! - Report shapes printed by the command-line tools

pub mod interval;
pub mod manifest;
pub mod point;
pub mod report;

// Re-export common types
pub use interval::Interval;
pub use manifest::{EventManifest, DEFAULT_TIME_PER_MOVE};
pub use point::{canonicalize_corners, PointError, PointI32};
pub use report::{MotionReport, MotionSegmentReport, RunReport};
