//! Padding and merging of raw motion intervals.
//!
//! The segmenter emits intervals exactly as the state machine saw them; a
//! short fumble while lifting a piece can split one move into two segments a
//! few hundred milliseconds apart. Padding widens each interval and merging
//! collapses anything that then touches or overlaps.

use boardclip_models::Interval;

use crate::error::{MediaError, MediaResult};

/// Widen each interval by `padding` seconds on both sides.
///
/// Starts are floored at 0 and ends are ceiled at `total_duration`. A
/// padding request without a known total duration is a configuration error.
pub fn pad_intervals(
    intervals: &[Interval],
    padding: f64,
    total_duration: Option<f64>,
) -> MediaResult<Vec<Interval>> {
    if padding == 0.0 {
        return Ok(intervals.to_vec());
    }
    let total = total_duration.ok_or(MediaError::PaddingWithoutDuration)?;

    Ok(intervals
        .iter()
        .map(|iv| Interval::new((iv.start - padding).max(0.0), (iv.end + padding).min(total)))
        .collect())
}

/// Merge touching or overlapping intervals into a sorted, disjoint list.
///
/// Output invariant: `end[i] < start[i+1]` for all adjacent pairs. Empty
/// input yields empty output.
pub fn merge_intervals(intervals: &[Interval]) -> Vec<Interval> {
    let mut sorted = intervals.to_vec();
    sorted.sort_by(|a, b| a.start.total_cmp(&b.start));

    let mut merged: Vec<Interval> = Vec::with_capacity(sorted.len());
    for iv in sorted {
        match merged.last_mut() {
            Some(current) if current.touches(&iv) => {
                current.end = current.end.max(iv.end);
            }
            _ => merged.push(iv),
        }
    }
    merged
}
