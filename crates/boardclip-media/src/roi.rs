//! Region-of-interest mask construction and diagnostics.
//!
//! The ROI is a convex quadrilateral drawn over the board area. The mask is
//! built once from the first frame's dimensions and reused for every frame
//! of the run.

#[cfg(feature = "opencv")]
use boardclip_models::{canonicalize_corners, PointI32};

#[cfg(feature = "opencv")]
use std::path::Path;

#[cfg(feature = "opencv")]
use opencv::{
    core::{self, Mat, Point, Scalar, Vector},
    imgcodecs, imgproc,
    prelude::*,
    videoio::{self, VideoCapture},
};

#[cfg(feature = "opencv")]
use crate::error::{MediaError, MediaResult};

/// Canonical corners as an OpenCV polygon (single closed contour).
#[cfg(feature = "opencv")]
fn roi_polygon(corners: [PointI32; 4]) -> Vector<Vector<Point>> {
    let ordered = canonicalize_corners(corners);
    let contour: Vector<Point> = ordered.iter().map(|p| Point::new(p.x, p.y)).collect();
    let mut polygon = Vector::new();
    polygon.push(contour);
    polygon
}

/// Build a binary mask at frame resolution, 255 inside the ROI polygon.
#[cfg(feature = "opencv")]
pub fn build_roi_mask(width: i32, height: i32, corners: [PointI32; 4]) -> MediaResult<Mat> {
    if width <= 0 || height <= 0 {
        return Err(MediaError::invalid_roi(format!(
            "frame dimensions {width}x{height} are not usable"
        )));
    }

    let mut mask = Mat::zeros(height, width, core::CV_8UC1)?.to_mat()?;
    imgproc::fill_poly_def(&mut mask, &roi_polygon(corners), Scalar::all(255.0))?;
    Ok(mask)
}

/// Write the video's first frame with the canonical ROI polygon drawn on it.
///
/// Diagnostic only; callers treat failure as non-fatal.
#[cfg(feature = "opencv")]
pub fn save_roi_snapshot(
    video_path: &Path,
    corners: [PointI32; 4],
    output_path: &Path,
) -> MediaResult<()> {
    let mut cap = VideoCapture::from_file(&video_path.to_string_lossy(), videoio::CAP_ANY)?;
    if !cap.is_opened()? {
        return Err(MediaError::VideoOpen(video_path.to_path_buf()));
    }

    let mut frame = Mat::default();
    if !cap.read(&mut frame)? || frame.empty() {
        return Err(MediaError::EmptyVideo(video_path.to_path_buf()));
    }

    let polygon = roi_polygon(corners);
    let green = Scalar::new(0.0, 255.0, 0.0, 0.0);
    imgproc::polylines(&mut frame, &polygon, true, green, 3, imgproc::LINE_8, 0)?;

    let ordered = canonicalize_corners(corners);
    let label_pos = Point::new(ordered[0].x, (ordered[0].y - 10).max(0));
    imgproc::put_text_def(
        &mut frame,
        "Region of Interest",
        label_pos,
        imgproc::FONT_HERSHEY_SIMPLEX,
        1.0,
        green,
    )?;

    if !imgcodecs::imwrite_def(&output_path.to_string_lossy(), &frame)? {
        return Err(MediaError::internal(format!(
            "failed to write ROI snapshot to {}",
            output_path.display()
        )));
    }
    Ok(())
}

#[cfg(all(test, feature = "opencv"))]
mod tests {
    use super::*;

    #[test]
    fn test_mask_covers_polygon_only() {
        let corners = [
            PointI32::new(10, 10),
            PointI32::new(90, 10),
            PointI32::new(90, 90),
            PointI32::new(10, 90),
        ];
        let mask = build_roi_mask(100, 100, corners).unwrap();

        let inside = core::count_non_zero(&mask).unwrap();
        assert!(inside > 0);
        // Polygon interior is roughly 80x80 of the 100x100 frame
        assert!(inside < 100 * 100);
        assert_eq!(*mask.at_2d::<u8>(50, 50).unwrap(), 255);
        assert_eq!(*mask.at_2d::<u8>(5, 5).unwrap(), 0);
    }

    #[test]
    fn test_mask_rejects_empty_frame() {
        let corners = [PointI32::new(0, 0); 4];
        assert!(build_roi_mask(0, 0, corners).is_err());
    }
}
