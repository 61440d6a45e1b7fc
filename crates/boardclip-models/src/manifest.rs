//! Event manifest exported by the board renderer.
//!
//! The renderer writes a small JSON object describing when each move happens
//! on the background recording and where the rendered board should sit on
//! screen. Unknown fields are ignored so the manifest can grow without
//! breaking older tools.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// Default seconds of rendered animation per move.
pub const DEFAULT_TIME_PER_MOVE: f64 = 0.2;

/// Per-run manifest of move event timestamps and overlay placement.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct EventManifest {
    /// Seconds of overlay animation consumed per move.
    #[serde(rename = "timePerMove", default = "default_time_per_move")]
    pub time_per_move: f64,

    /// Ordered move event boundary times on the background clip, in seconds.
    /// The last entry closes the final window; the caller supplies or
    /// defaults it, it is never inferred from the video itself.
    #[serde(default)]
    pub timestamps: Vec<f64>,

    /// Horizontal overlay position in pixels.
    #[serde(default)]
    pub x_offset: i64,

    /// Vertical overlay position in pixels.
    #[serde(default)]
    pub y_offset: i64,
}

fn default_time_per_move() -> f64 {
    DEFAULT_TIME_PER_MOVE
}

impl EventManifest {
    /// Parse a manifest from JSON text.
    pub fn from_json(text: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(text)
    }

    /// Overlay placement as an `(x, y)` pair.
    pub fn offset(&self) -> (i64, i64) {
        (self.x_offset, self.y_offset)
    }
}

impl Default for EventManifest {
    fn default() -> Self {
        Self {
            time_per_move: DEFAULT_TIME_PER_MOVE,
            timestamps: Vec::new(),
            x_offset: 0,
            y_offset: 0,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_full_manifest() {
        let manifest = EventManifest::from_json(
            r#"{"timePerMove": 0.5, "timestamps": [1.0, 2.0, 3.5], "x_offset": 40, "y_offset": -8}"#,
        )
        .unwrap();
        assert!((manifest.time_per_move - 0.5).abs() < 1e-9);
        assert_eq!(manifest.timestamps.len(), 3);
        assert_eq!(manifest.offset(), (40, -8));
    }

    #[test]
    fn test_defaults_applied() {
        let manifest = EventManifest::from_json(r#"{"timestamps": [1.0]}"#).unwrap();
        assert!((manifest.time_per_move - DEFAULT_TIME_PER_MOVE).abs() < 1e-9);
        assert_eq!(manifest.offset(), (0, 0));
    }

    #[test]
    fn test_unknown_fields_ignored() {
        let manifest =
            EventManifest::from_json(r#"{"timestamps": [1.0], "renderer": "remotion"}"#).unwrap();
        assert_eq!(manifest.timestamps, vec![1.0]);
    }

    #[test]
    fn test_malformed_is_error() {
        assert!(EventManifest::from_json("{not json").is_err());
    }
}
