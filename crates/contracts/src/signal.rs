//! Raw and derived render/photodiode signal records.

use serde::{Deserialize, Serialize};

/// Binary state of the render-sync quad (and of the photodiode level)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum QuadState {
    Low,
    High,
}

impl QuadState {
    /// Decode a raw sample; only exactly `0` and `1` are valid
    pub fn from_raw(raw: f64) -> Option<Self> {
        if raw == 0.0 || raw == 1.0 {
            Some(Self::from(raw == 1.0))
        } else {
            None
        }
    }

    /// Opposite state
    pub fn flipped(self) -> Self {
        match self {
            Self::Low => Self::High,
            Self::High => Self::Low,
        }
    }
}

impl From<bool> for QuadState {
    fn from(level: bool) -> Self {
        if level {
            Self::High
        } else {
            Self::Low
        }
    }
}

/// One row of the renderer's sync log, recorded once per rendered frame
///
/// `quad_value` is kept raw so that out-of-domain values can be reported.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RenderSyncSample {
    /// Renderer frame counter
    pub frame_index: i64,
    /// Renderer clock (seconds)
    pub frame_timestamp: f64,
    /// Raw quad value, expected to be 0 or 1
    pub quad_value: f64,
}

/// A transition of the render-sync quad
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ToggleEvent {
    /// Frame on which the quad changed
    pub frame_index: i64,
    /// Renderer clock (seconds)
    pub frame_timestamp: f64,
    /// State after the transition
    pub quad_value: QuadState,
}

/// A photodiode threshold crossing
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DetectionEvent {
    /// Sensor clock (seconds)
    pub detection_timestamp: f64,
    /// Port level after the crossing
    pub polarity: QuadState,
}
