//! Pairing of overlay-clip windows with background-clip windows.
//!
//! The rendered board animation plays `time_per_move` seconds per move,
//! back to back from t=0. Each of those windows gets composited onto the
//! background during the window that ends at the corresponding move event
//! timestamp.

use boardclip_models::{EventManifest, Interval};

use crate::error::{MediaError, MediaResult};

/// Paired interval lists plus a fixed screen offset.
#[derive(Debug, Clone, PartialEq)]
pub struct OverlayPlan {
    /// Windows into the overlay source clip, tiled from 0.
    pub overlay: Vec<Interval>,
    /// Windows on the background clip, one per event timestamp.
    pub background: Vec<Interval>,
    /// Pixel offset applied uniformly to every overlay placement.
    pub offset: (i64, i64),
}

impl OverlayPlan {
    /// Number of overlay operations.
    pub fn len(&self) -> usize {
        self.overlay.len()
    }

    /// Whether the plan contains no operations.
    pub fn is_empty(&self) -> bool {
        self.overlay.is_empty()
    }
}

/// Parse an `x,y` offset argument into exactly two numeric components.
pub fn parse_offset(raw: &str) -> MediaResult<(i64, i64)> {
    let parts: Vec<&str> = raw.split(',').collect();
    if parts.len() != 2 {
        return Err(MediaError::InvalidOffset(format!(
            "'{raw}' must have exactly two components, e.g. 40,-8"
        )));
    }
    let parse = |s: &str| {
        s.trim()
            .parse::<i64>()
            .map_err(|_| MediaError::InvalidOffset(format!("'{raw}' has a non-integer component")))
    };
    Ok((parse(parts[0])?, parse(parts[1])?))
}

/// Build an overlay plan from a per-event duration and event timestamps.
///
/// Overlay window `i` is `[i*d, (i+1)*d]`. Background window `i` ends at
/// `timestamps[i]` and starts one duration before the previous event
/// (conceptually 0 for the first), clamped at 0 so the leading window can
/// never start before the clip does.
pub fn plan_overlays(
    time_per_move: f64,
    timestamps: &[f64],
    offset: Option<(i64, i64)>,
) -> MediaResult<OverlayPlan> {
    if timestamps.is_empty() {
        return Err(MediaError::EmptyPlan);
    }

    let d = time_per_move;
    let overlay: Vec<Interval> = (0..timestamps.len())
        .map(|i| Interval::new(i as f64 * d, (i + 1) as f64 * d))
        .collect();

    let background: Vec<Interval> = timestamps
        .iter()
        .enumerate()
        .map(|(i, &end)| {
            let prev = if i == 0 { 0.0 } else { timestamps[i - 1] };
            Interval::new((prev - d).max(0.0), end)
        })
        .collect();

    Ok(OverlayPlan {
        overlay,
        background,
        offset: offset.unwrap_or((0, 0)),
    })
}

/// Build an overlay plan directly from an event manifest.
pub fn plan_from_manifest(manifest: &EventManifest) -> MediaResult<OverlayPlan> {
    plan_overlays(
        manifest.time_per_move,
        &manifest.timestamps,
        Some(manifest.offset()),
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    fn assert_iv(iv: Interval, start: f64, end: f64) {
        assert!((iv.start - start).abs() < 1e-9, "start {} != {}", iv.start, start);
        assert!((iv.end - end).abs() < 1e-9, "end {} != {}", iv.end, end);
    }

    #[test]
    fn test_plan_tiles_overlay_windows() {
        let plan = plan_overlays(0.2, &[1.0, 2.0, 3.0], None).unwrap();
        assert_eq!(plan.len(), 3);
        assert_iv(plan.overlay[0], 0.0, 0.2);
        assert_iv(plan.overlay[1], 0.2, 0.4);
        assert_iv(plan.overlay[2], 0.4, 0.6);
    }

    #[test]
    fn test_plan_background_windows_end_at_events() {
        let plan = plan_overlays(0.2, &[1.0, 2.0, 3.0], None).unwrap();
        // Naive first start would be -0.2; clamped to 0, i.e. shifted
        // forward by exactly one time_per_move.
        assert_iv(plan.background[0], 0.0, 1.0);
        assert_iv(plan.background[1], 0.8, 2.0);
        assert_iv(plan.background[2], 1.8, 3.0);
    }

    #[test]
    fn test_plan_lists_stay_parallel() {
        let plan = plan_overlays(0.5, &[2.0, 4.0, 6.0, 8.0, 10.0], None).unwrap();
        assert_eq!(plan.overlay.len(), plan.background.len());
    }

    #[test]
    fn test_empty_timestamps_rejected() {
        let err = plan_overlays(0.2, &[], None).unwrap_err();
        assert!(matches!(err, MediaError::EmptyPlan));
    }

    #[test]
    fn test_offset_default() {
        let plan = plan_overlays(0.2, &[1.0], None).unwrap();
        assert_eq!(plan.offset, (0, 0));
    }

    #[test]
    fn test_parse_offset() {
        assert_eq!(parse_offset("40,-8").unwrap(), (40, -8));
        assert_eq!(parse_offset(" 0 , 0 ").unwrap(), (0, 0));
    }

    #[test]
    fn test_parse_offset_shape_errors() {
        assert!(matches!(parse_offset("40"), Err(MediaError::InvalidOffset(_))));
        assert!(matches!(parse_offset("1,2,3"), Err(MediaError::InvalidOffset(_))));
        assert!(matches!(parse_offset("a,b"), Err(MediaError::InvalidOffset(_))));
    }

    #[test]
    fn test_plan_from_manifest() {
        let manifest = EventManifest {
            time_per_move: 0.2,
            timestamps: vec![1.0, 2.0],
            x_offset: 12,
            y_offset: 34,
        };
        let plan = plan_from_manifest(&manifest).unwrap();
        assert_eq!(plan.offset, (12, 34));
        assert_eq!(plan.len(), 2);
    }
}
