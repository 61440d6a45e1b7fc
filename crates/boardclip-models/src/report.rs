//! Report shapes printed by the command-line tools.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::interval::{round2, Interval};
use crate::point::PointI32;

/// One detected motion segment in the final report.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct MotionSegmentReport {
    pub start_time_seconds: f64,
    pub end_time_seconds: f64,
    pub duration_seconds: f64,
}

impl From<Interval> for MotionSegmentReport {
    fn from(iv: Interval) -> Self {
        let iv = iv.rounded();
        Self {
            start_time_seconds: iv.start,
            end_time_seconds: iv.end,
            duration_seconds: round2(iv.end - iv.start),
        }
    }
}

/// Final output of the motion detection pipeline.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct MotionReport {
    /// Base name of the analyzed video file.
    pub video_file: String,
    /// Canonicalized ROI corners (top-left, top-right, bottom-right, bottom-left).
    pub roi_corners_used: [PointI32; 4],
    /// Detected motion segments, sorted by start time.
    pub motion_segments: Vec<MotionSegmentReport>,
}

/// Structured outcome of an external process invocation.
///
/// Every failure mode is folded into this shape; the runner never raises
/// past its boundary. `return_code` is `-1` for timeout, tool-not-found,
/// and unexpected spawn failures.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct RunReport {
    /// Whether the process exited with status 0.
    pub success: bool,
    /// Captured standard output.
    pub output: String,
    /// Captured standard error, or a human-readable failure message.
    pub error: String,
    /// Exit code, or `-1` when the process never produced one.
    pub return_code: i32,
}

impl RunReport {
    /// Report for a process that never produced an exit status.
    pub fn failed(message: impl Into<String>) -> Self {
        Self {
            success: false,
            output: String::new(),
            error: message.into(),
            return_code: -1,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_segment_report_rounds() {
        let report = MotionSegmentReport::from(Interval::new(1.0 / 3.0, 1.0));
        assert!((report.start_time_seconds - 0.33).abs() < 1e-9);
        assert!((report.duration_seconds - 0.67).abs() < 1e-9);
    }

    #[test]
    fn test_failed_report_shape() {
        let report = RunReport::failed("ffmpeg not found in PATH");
        assert!(!report.success);
        assert_eq!(report.return_code, -1);
        assert!(report.output.is_empty());
        assert!(report.error.contains("not found"));
    }

    #[test]
    fn test_run_report_serializes() {
        let report = RunReport {
            success: true,
            output: "frame=1".into(),
            error: String::new(),
            return_code: 0,
        };
        let json = serde_json::to_string(&report).unwrap();
        assert!(json.contains("\"return_code\":0"));
    }
}
