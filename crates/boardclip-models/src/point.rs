//! Integer pixel coordinates and ROI corner canonicalization.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// An integer pixel coordinate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct PointI32 {
    pub x: i32,
    pub y: i32,
}

impl PointI32 {
    /// Create a new point.
    pub fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }
}

/// Errors from parsing coordinate tokens.
#[derive(Debug, Error)]
pub enum PointError {
    #[error("invalid coordinate token '{0}': expected the form x,y with integer components")]
    InvalidToken(String),
}

impl std::str::FromStr for PointI32 {
    type Err = PointError;

    /// Parse a command-line token of the literal form `x,y`.
    fn from_str(token: &str) -> Result<Self, Self::Err> {
        let (x, y) = token
            .split_once(',')
            .ok_or_else(|| PointError::InvalidToken(token.to_string()))?;
        let x: i32 = x
            .trim()
            .parse()
            .map_err(|_| PointError::InvalidToken(token.to_string()))?;
        let y: i32 = y
            .trim()
            .parse()
            .map_err(|_| PointError::InvalidToken(token.to_string()))?;
        Ok(Self { x, y })
    }
}

/// Canonicalize 4 corner points to (top-left, top-right, bottom-right, bottom-left).
///
/// Sorts by vertical coordinate, splits into upper and lower pairs, then sorts
/// each pair by horizontal coordinate. Deterministic for any 4 distinct points
/// forming a convex quadrilateral; degenerate inputs still produce 4 points
/// (the ordering is just not meaningful for them).
pub fn canonicalize_corners(corners: [PointI32; 4]) -> [PointI32; 4] {
    let mut pts = corners;
    pts.sort_by(|a, b| a.y.cmp(&b.y).then(a.x.cmp(&b.x)));

    let (mut top, mut bottom) = ([pts[0], pts[1]], [pts[2], pts[3]]);
    top.sort_by_key(|p| p.x);
    bottom.sort_by_key(|p| p.x);

    [top[0], top[1], bottom[1], bottom[0]]
}

#[cfg(test)]
mod tests {
    use super::*;

    fn square() -> [PointI32; 4] {
        [
            PointI32::new(100, 100),
            PointI32::new(0, 0),
            PointI32::new(0, 100),
            PointI32::new(100, 0),
        ]
    }

    #[test]
    fn test_canonical_order() {
        let ordered = canonicalize_corners(square());
        assert_eq!(ordered[0], PointI32::new(0, 0));
        assert_eq!(ordered[1], PointI32::new(100, 0));
        assert_eq!(ordered[2], PointI32::new(100, 100));
        assert_eq!(ordered[3], PointI32::new(0, 100));
    }

    #[test]
    fn test_canonicalize_idempotent() {
        let once = canonicalize_corners(square());
        let twice = canonicalize_corners(once);
        assert_eq!(once, twice);
    }

    #[test]
    fn test_skewed_quad() {
        // Convex but not axis-aligned
        let pts = [
            PointI32::new(50, 5),
            PointI32::new(95, 40),
            PointI32::new(60, 90),
            PointI32::new(10, 50),
        ];
        let ordered = canonicalize_corners(pts);
        assert_eq!(ordered[0], PointI32::new(50, 5));
        assert_eq!(ordered[2], PointI32::new(60, 90));
        assert_eq!(ordered, canonicalize_corners(ordered));
    }

    #[test]
    fn test_degenerate_does_not_panic() {
        let pts = [PointI32::new(1, 1); 4];
        let ordered = canonicalize_corners(pts);
        assert_eq!(ordered, pts);
    }

    #[test]
    fn test_parse_token() {
        let p: PointI32 = "120,45".parse().unwrap();
        assert_eq!(p, PointI32::new(120, 45));
    }

    #[test]
    fn test_parse_token_names_offender() {
        let err = "120;45".parse::<PointI32>().unwrap_err();
        assert!(err.to_string().contains("120;45"));

        let err = "12,abc".parse::<PointI32>().unwrap_err();
        assert!(err.to_string().contains("12,abc"));
    }
}
