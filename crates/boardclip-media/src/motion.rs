//! ROI-masked motion segmentation.
//!
//! Frames are read strictly in sequence, masked to the ROI, and reduced to a
//! per-frame motion-present flag by a pluggable foreground extractor. An
//! explicit two-state machine folds the flag stream into time intervals.
//!
//! The fold is a pure function over the flag stream so the state machine is
//! testable without decoding any video.

use boardclip_models::Interval;

#[cfg(feature = "opencv")]
use crate::error::{MediaError, MediaResult};

#[cfg(feature = "opencv")]
use std::path::Path;

#[cfg(feature = "opencv")]
use opencv::{
    core::{self, Mat, Point, Ptr, Size},
    imgproc,
    prelude::*,
    video::{self, BackgroundSubtractorMOG2},
    videoio::{self, VideoCapture},
};

#[cfg(feature = "opencv")]
use boardclip_models::PointI32;
#[cfg(feature = "opencv")]
use tracing::{debug, warn};

/// Frame rate assumed when the container reports none.
pub const FALLBACK_FPS: f64 = 30.0;

/// Foreground extraction strategy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ExtractorKind {
    /// MOG2 background subtraction (learned per-pixel model).
    #[default]
    Mog2,
    /// Absolute difference against the previous blurred frame.
    FrameDiff,
}

/// Configuration for a motion segmentation run.
#[derive(Debug, Clone)]
pub struct MotionConfig {
    /// Minimum contour area, in pixels, for a contour to count as motion.
    pub min_contour_area: f64,
    /// Foreground extraction strategy.
    pub extractor: ExtractorKind,
}

impl Default for MotionConfig {
    fn default() -> Self {
        Self {
            min_contour_area: 500.0,
            extractor: ExtractorKind::Mog2,
        }
    }
}

/// Output of a motion segmentation run.
#[derive(Debug, Clone)]
pub struct MotionRun {
    /// Raw motion intervals, sorted and disjoint.
    pub intervals: Vec<Interval>,
    /// Frame rate used for timestamp derivation.
    pub fps: f64,
    /// Total video duration in seconds (frame count / fps).
    pub duration: f64,
}

/// Per-run segmenter state.
enum SegmenterState {
    Idle,
    Active { start: f64 },
}

/// Fold a per-frame motion-present stream into raw intervals.
///
/// Frame `i` (1-based) is stamped at `i / fps`. An interval opens on the
/// first present frame and closes on the first absent one; a run still
/// active at end of stream closes at the total duration instead of being
/// dropped. Boundaries are rounded to two decimals.
pub fn fold_motion_flags<I>(flags: I, fps: f64) -> Vec<Interval>
where
    I: IntoIterator<Item = bool>,
{
    let mut state = SegmenterState::Idle;
    let mut intervals = Vec::new();
    let mut frame_number = 0u64;

    for present in flags {
        frame_number += 1;
        let now = frame_number as f64 / fps;

        state = match (state, present) {
            (SegmenterState::Idle, true) => SegmenterState::Active { start: now },
            (SegmenterState::Active { start }, false) => {
                intervals.push(Interval::new(start, now).rounded());
                SegmenterState::Idle
            }
            (state, _) => state,
        };
    }

    if let SegmenterState::Active { start } = state {
        let total = frame_number as f64 / fps;
        intervals.push(Interval::new(start, total).rounded());
    }

    intervals
}

/// Per-frame foreground extraction behind a capability interface, so the
/// statistical model and the previous-frame-difference variant are
/// interchangeable without touching the state machine.
#[cfg(feature = "opencv")]
trait ForegroundExtractor {
    /// Produce a foreground mask for the (already ROI-masked) frame.
    fn apply(&mut self, frame: &Mat) -> MediaResult<Mat>;
}

#[cfg(feature = "opencv")]
struct Mog2Extractor {
    inner: Ptr<BackgroundSubtractorMOG2>,
}

#[cfg(feature = "opencv")]
impl Mog2Extractor {
    fn new() -> MediaResult<Self> {
        // History and variance threshold match the tuning the board footage
        // was calibrated against.
        let inner = video::create_background_subtractor_mog2(500, 50.0, false)?;
        Ok(Self { inner })
    }
}

#[cfg(feature = "opencv")]
impl ForegroundExtractor for Mog2Extractor {
    fn apply(&mut self, frame: &Mat) -> MediaResult<Mat> {
        let mut fg = Mat::default();
        self.inner.apply(frame, &mut fg, -1.0)?;
        Ok(fg)
    }
}

#[cfg(feature = "opencv")]
struct FrameDiffExtractor {
    prev: Option<Mat>,
    diff_threshold: f64,
}

#[cfg(feature = "opencv")]
impl FrameDiffExtractor {
    fn new() -> Self {
        Self {
            prev: None,
            diff_threshold: 25.0,
        }
    }
}

#[cfg(feature = "opencv")]
impl ForegroundExtractor for FrameDiffExtractor {
    fn apply(&mut self, frame: &Mat) -> MediaResult<Mat> {
        let mut gray = Mat::default();
        if frame.channels() == 3 {
            imgproc::cvt_color_def(frame, &mut gray, imgproc::COLOR_BGR2GRAY)?;
        } else {
            gray = frame.clone();
        }

        // Blur to suppress sensor noise before differencing
        let mut blurred = Mat::default();
        imgproc::gaussian_blur_def(&gray, &mut blurred, Size::new(21, 21), 0.0)?;

        let result = match self.prev.take() {
            Some(prev) => {
                let mut diff = Mat::default();
                core::absdiff(&prev, &blurred, &mut diff)?;

                let mut thresh = Mat::default();
                imgproc::threshold(
                    &diff,
                    &mut thresh,
                    self.diff_threshold,
                    255.0,
                    imgproc::THRESH_BINARY,
                )?;
                thresh
            }
            None => Mat::zeros(blurred.rows(), blurred.cols(), core::CV_8UC1)?.to_mat()?,
        };

        self.prev = Some(blurred);
        Ok(result)
    }
}

#[cfg(feature = "opencv")]
impl ExtractorKind {
    fn create(self) -> MediaResult<Box<dyn ForegroundExtractor>> {
        Ok(match self {
            ExtractorKind::Mog2 => Box::new(Mog2Extractor::new()?),
            ExtractorKind::FrameDiff => Box::new(FrameDiffExtractor::new()),
        })
    }
}

/// Reduce a foreground mask to a single motion-present flag.
#[cfg(feature = "opencv")]
fn motion_present(fg_mask: &Mat, min_contour_area: f64) -> MediaResult<bool> {
    // Drop shadows and low-confidence pixels, then close small gaps
    let mut binary = Mat::default();
    imgproc::threshold(fg_mask, &mut binary, 250.0, 255.0, imgproc::THRESH_BINARY)?;

    let kernel = Mat::ones(5, 5, core::CV_8U)?.to_mat()?;
    let mut dilated = Mat::default();
    imgproc::dilate(
        &binary,
        &mut dilated,
        &kernel,
        Point::new(-1, -1),
        2,
        core::BORDER_CONSTANT,
        imgproc::morphology_default_border_value()?,
    )?;

    let mut contours: core::Vector<core::Vector<Point>> = core::Vector::new();
    imgproc::find_contours_def(
        &dilated,
        &mut contours,
        imgproc::RETR_EXTERNAL,
        imgproc::CHAIN_APPROX_SIMPLE,
    )?;

    for contour in contours.iter() {
        if imgproc::contour_area_def(&contour)? > min_contour_area {
            return Ok(true);
        }
    }
    Ok(false)
}

/// Detect motion intervals inside the ROI of a recorded video.
///
/// Opens the video, builds the ROI mask from the first frame's dimensions,
/// and folds the per-frame motion flags into raw intervals. Unreadable or
/// empty videos are fatal; a missing frame rate falls back to
/// [`FALLBACK_FPS`] with a warning.
#[cfg(feature = "opencv")]
pub fn detect_motion_segments(
    video_path: &Path,
    corners: [PointI32; 4],
    config: &MotionConfig,
) -> MediaResult<MotionRun> {
    let mut cap = VideoCapture::from_file(&video_path.to_string_lossy(), videoio::CAP_ANY)?;
    if !cap.is_opened()? {
        return Err(MediaError::VideoOpen(video_path.to_path_buf()));
    }

    let mut fps = cap.get(videoio::CAP_PROP_FPS)?;
    if !fps.is_finite() || fps <= 0.0 {
        warn!(
            video = %video_path.display(),
            fallback = FALLBACK_FPS,
            "container reports no frame rate, assuming fallback"
        );
        fps = FALLBACK_FPS;
    }

    let mut frame = Mat::default();
    if !cap.read(&mut frame)? || frame.empty() {
        return Err(MediaError::EmptyVideo(video_path.to_path_buf()));
    }

    let mask = crate::roi::build_roi_mask(frame.cols(), frame.rows(), corners)?;
    let mut extractor = config.extractor.create()?;

    let mut flags = Vec::new();
    loop {
        let mut masked = Mat::default();
        core::bitwise_and(&frame, &frame, &mut masked, &mask)?;

        let fg = extractor.apply(&masked)?;
        flags.push(motion_present(&fg, config.min_contour_area)?);

        if !cap.read(&mut frame)? || frame.empty() {
            break;
        }
    }

    let frame_count = flags.len();
    let duration = frame_count as f64 / fps;
    let intervals = fold_motion_flags(flags, fps);
    debug!(
        video = %video_path.display(),
        frames = frame_count,
        fps,
        segments = intervals.len(),
        "motion segmentation complete"
    );

    Ok(MotionRun {
        intervals,
        fps,
        duration,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_static_stream_yields_nothing() {
        let flags = vec![false; 300];
        assert!(fold_motion_flags(flags, 30.0).is_empty());
    }

    #[test]
    fn test_empty_stream() {
        assert!(fold_motion_flags(std::iter::empty(), 30.0).is_empty());
    }

    #[test]
    fn test_single_moving_block() {
        // 90 frames at 30fps: motion on frames stamped (1.0, 2.0]
        let fps = 30.0;
        let flags: Vec<bool> = (1..=90).map(|i| {
            let t = i as f64 / fps;
            t > 1.0 && t <= 2.0
        }).collect();

        let intervals = fold_motion_flags(flags, fps);
        assert_eq!(intervals.len(), 1);
        let tolerance = 1.0 / fps + 1e-9;
        assert!((intervals[0].start - 1.0).abs() <= tolerance);
        assert!((intervals[0].end - 2.0).abs() <= tolerance);
    }

    #[test]
    fn test_active_at_end_closes_at_duration() {
        // Motion starts and never stops
        let flags: Vec<bool> = (1..=60).map(|i| i >= 30).collect();
        let intervals = fold_motion_flags(flags, 30.0);
        assert_eq!(intervals.len(), 1);
        assert!((intervals[0].end - 2.0).abs() < 1e-9);
    }

    #[test]
    fn test_two_separate_events() {
        let mut flags = vec![false; 30];
        flags.extend(vec![true; 30]);
        flags.extend(vec![false; 30]);
        flags.extend(vec![true; 30]);
        flags.extend(vec![false; 30]);

        let intervals = fold_motion_flags(flags, 30.0);
        assert_eq!(intervals.len(), 2);
        assert!(intervals[0].end < intervals[1].start);
    }

    #[test]
    fn test_boundaries_rounded() {
        // One motion frame at an awkward fps
        let mut flags = vec![false; 6];
        flags.push(true);
        flags.push(false);
        let intervals = fold_motion_flags(flags, 29.97);
        assert_eq!(intervals.len(), 1);
        let roundtrip = (intervals[0].start * 100.0).round() / 100.0;
        assert!((intervals[0].start - roundtrip).abs() < 1e-12);
    }
}
