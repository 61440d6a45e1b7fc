//! Time intervals on a video timeline.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// A half-open-ish time range in seconds with `start < end`.
///
/// Intervals are compared and merged on their raw values; boundaries are
/// rounded to two decimal places only when a report is emitted, so repeated
/// runs over the same video produce byte-identical output.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct Interval {
    /// Start time in seconds.
    pub start: f64,
    /// End time in seconds.
    pub end: f64,
}

impl Interval {
    /// Create a new interval.
    pub fn new(start: f64, end: f64) -> Self {
        Self { start, end }
    }

    /// Duration in seconds.
    pub fn duration(&self) -> f64 {
        self.end - self.start
    }

    /// Interval with both boundaries rounded to two decimal places.
    pub fn rounded(&self) -> Self {
        Self {
            start: round2(self.start),
            end: round2(self.end),
        }
    }

    /// Whether `other` starts at or before this interval's end.
    ///
    /// Touching intervals count as overlapping for merge purposes.
    pub fn touches(&self, other: &Interval) -> bool {
        other.start <= self.end
    }
}

/// Round to two decimal places.
pub fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_duration() {
        let iv = Interval::new(1.0, 5.0);
        assert!((iv.duration() - 4.0).abs() < 1e-9);
    }

    #[test]
    fn test_rounded() {
        let iv = Interval::new(1.0 / 3.0, 2.0 / 3.0).rounded();
        assert!((iv.start - 0.33).abs() < 1e-9);
        assert!((iv.end - 0.67).abs() < 1e-9);
    }

    #[test]
    fn test_touches() {
        let a = Interval::new(0.0, 2.0);
        assert!(a.touches(&Interval::new(2.0, 3.0)));
        assert!(a.touches(&Interval::new(1.5, 3.0)));
        assert!(!a.touches(&Interval::new(2.1, 3.0)));
    }
}
