//! Alignment records produced by the drift-corrected matcher.

use serde::{Deserialize, Serialize};

/// Correspondence between one toggle and at most one detection
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AlignedPair {
    /// Position in the toggle series
    pub toggle_index: usize,
    /// Renderer timestamp (seconds)
    pub gpu_time: f64,
    /// Matched sensor timestamp, `None` when no credible match was found
    pub detection_time: Option<f64>,
}

impl AlignedPair {
    /// Whether a detection was matched
    pub fn is_matched(&self) -> bool {
        self.detection_time.is_some()
    }

    /// `gpu_time - detection_time` for matched pairs
    pub fn residual(&self) -> Option<f64> {
        self.detection_time.map(|d| self.gpu_time - d)
    }

    /// Copy with both timestamps shifted by their stream origin
    pub fn rebased(&self, gpu_origin: f64, sensor_origin: f64) -> Self {
        Self {
            toggle_index: self.toggle_index,
            gpu_time: self.gpu_time + gpu_origin,
            detection_time: self.detection_time.map(|d| d + sensor_origin),
        }
    }
}

/// Last trusted (gpu, sensor) pair used as the zero reference for drift
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Anchor {
    pub gpu: f64,
    pub sensor: f64,
}

impl Anchor {
    /// Residual of a candidate detection for a toggle, relative to this anchor
    pub fn residual(&self, gpu_time: f64, sensor_time: f64) -> f64 {
        ((sensor_time - self.sensor) - (gpu_time - self.gpu)).abs()
    }

    /// Sensor time at which a toggle is expected, assuming no drift since the anchor
    pub fn expected_sensor_time(&self, gpu_time: f64) -> f64 {
        self.sensor + (gpu_time - self.gpu)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_anchor_residual_is_incremental() {
        let anchor = Anchor {
            gpu: 10.0,
            sensor: 10.5,
        };
        // 1s later on both clocks -> no residual
        assert!(anchor.residual(11.0, 11.5).abs() < 1e-12);
        assert!((anchor.residual(11.0, 11.52) - 0.02).abs() < 1e-12);
        assert!((anchor.expected_sensor_time(11.0) - 11.5).abs() < 1e-12);
    }

    #[test]
    fn test_pair_residual_and_rebase() {
        let pair = AlignedPair {
            toggle_index: 3,
            gpu_time: 0.5,
            detection_time: Some(0.49),
        };
        assert!((pair.residual().unwrap() - 0.01).abs() < 1e-12);
        let rebased = pair.rebased(100.0, 200.0);
        assert_eq!(rebased.gpu_time, 100.5);
        assert_eq!(rebased.detection_time, Some(200.49));

        let missing = AlignedPair {
            toggle_index: 4,
            gpu_time: 0.6,
            detection_time: None,
        };
        assert!(!missing.is_matched());
        assert_eq!(missing.residual(), None);
    }
}
