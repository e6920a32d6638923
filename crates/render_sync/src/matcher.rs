//! Drift-corrected toggle/detection matcher.
//!
//! Both inputs are zero-anchored, ascending timestamp slices. The first toggle
//! is paired with the first detection unconditionally and becomes the anchor.
//! Every later toggle is compared to the unconsumed detections relative to the
//! latest anchor, so only the increment since the last good pair has to fit
//! inside `max_latency`. Accepted matches move the anchor forward; rejected
//! toggles leave it untouched.

use contracts::{AlignedPair, Anchor};
use tracing::{debug, instrument};

use crate::error::{RenderSyncError, Result};

/// Sequential matcher with per-match re-anchoring
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DriftCorrectedMatcher {
    max_latency: f64,
}

/// State threaded through the fold
#[derive(Debug, Clone, Copy)]
struct MatchState {
    anchor: Anchor,
    /// Index of the first detection later than the last accepted one
    cursor: usize,
}

impl DriftCorrectedMatcher {
    pub fn new(max_latency: f64) -> Self {
        Self { max_latency }
    }

    pub fn max_latency(&self) -> f64 {
        self.max_latency
    }

    /// Align toggles to detections
    ///
    /// Returns one pair per toggle, in toggle order. Unmatched toggles carry
    /// `detection_time: None`.
    ///
    /// # Errors
    /// `EmptySeries`, `NotZeroAnchored` or `NonAscending` on malformed input.
    /// Missing matches are never an error.
    #[instrument(
        name = "drift_corrected_match",
        skip_all,
        fields(toggles = gpu_times.len(), detections = sensor_times.len(), max_latency = self.max_latency)
    )]
    pub fn align(&self, gpu_times: &[f64], sensor_times: &[f64]) -> Result<Vec<AlignedPair>> {
        validate_input("gpu", gpu_times)?;
        validate_input("sensor", sensor_times)?;

        let seed = AlignedPair {
            toggle_index: 0,
            gpu_time: gpu_times[0],
            detection_time: Some(sensor_times[0]),
        };
        let initial = MatchState {
            anchor: Anchor {
                gpu: gpu_times[0],
                sensor: sensor_times[0],
            },
            cursor: first_after(sensor_times, sensor_times[0]),
        };

        let mut pairs = Vec::with_capacity(gpu_times.len());
        pairs.push(seed);

        let (pairs, _) = gpu_times.iter().enumerate().skip(1).fold(
            (pairs, initial),
            |(mut pairs, state), (toggle_index, &gpu_time)| {
                let (detection_time, next) = self.step(state, gpu_time, sensor_times);
                pairs.push(AlignedPair {
                    toggle_index,
                    gpu_time,
                    detection_time,
                });
                (pairs, next)
            },
        );

        let matched = pairs.iter().filter(|p| p.is_matched()).count();
        debug!(matched, unmatched = pairs.len() - matched, "alignment finished");

        Ok(pairs)
    }

    /// Match one toggle against the unconsumed detections
    fn step(&self, state: MatchState, gpu_time: f64, sensor_times: &[f64]) -> (Option<f64>, MatchState) {
        let remaining = &sensor_times[state.cursor..];
        let Some(candidate) = nearest(remaining, &state.anchor, gpu_time) else {
            return (None, state);
        };

        if candidate.residual < self.max_latency {
            let next = MatchState {
                anchor: Anchor {
                    gpu: gpu_time,
                    sensor: candidate.time,
                },
                cursor: first_after(sensor_times, candidate.time),
            };
            (Some(candidate.time), next)
        } else {
            (None, state)
        }
    }
}

#[derive(Debug, Clone, Copy)]
struct Candidate {
    time: f64,
    residual: f64,
}

/// Detection with the smallest anchor-relative residual
///
/// `remaining` is sorted, so the minimum sits next to the expected time.
/// Ties resolve to the earlier detection.
fn nearest(remaining: &[f64], anchor: &Anchor, gpu_time: f64) -> Option<Candidate> {
    let expected = anchor.expected_sensor_time(gpu_time);
    let split = remaining.partition_point(|&s| s < expected);

    let before = split.checked_sub(1).and_then(|i| remaining.get(i));
    let after = remaining.get(split);

    let candidate = |time: f64| Candidate {
        time,
        residual: anchor.residual(gpu_time, time),
    };

    match (before.copied().map(candidate), after.copied().map(candidate)) {
        (Some(b), Some(a)) => Some(if a.residual < b.residual { a } else { b }),
        (b, a) => b.or(a),
    }
}

/// Index of the first detection strictly later than `time`
fn first_after(sensor_times: &[f64], time: f64) -> usize {
    sensor_times.partition_point(|&s| s <= time)
}

fn validate_input(series: &'static str, times: &[f64]) -> Result<()> {
    let Some(&first) = times.first() else {
        return Err(RenderSyncError::EmptySeries { series });
    };
    if first != 0.0 {
        return Err(RenderSyncError::NotZeroAnchored { series, first });
    }
    if let Some(position) = times.windows(2).position(|w| !(w[1] >= w[0])) {
        return Err(RenderSyncError::NonAscending {
            series,
            index: position + 1,
        });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::{Rng, SeedableRng};

    const PERIOD: f64 = 1.0 / 60.0;
    const TOLERANCE: f64 = 0.015;

    fn gpu(n: usize) -> Vec<f64> {
        (0..n).map(|i| i as f64 * PERIOD).collect()
    }

    fn detection_times(pairs: &[AlignedPair]) -> Vec<Option<f64>> {
        pairs.iter().map(|p| p.detection_time).collect()
    }

    #[test]
    fn test_identical_series_all_match() {
        let times = gpu(100);
        let pairs = DriftCorrectedMatcher::new(TOLERANCE)
            .align(&times, &times)
            .unwrap();
        assert_eq!(pairs.len(), 100);
        for (i, pair) in pairs.iter().enumerate() {
            assert_eq!(pair.toggle_index, i);
            assert_eq!(pair.detection_time, Some(times[i]));
        }
    }

    #[test]
    fn test_seed_pair_is_unconditional() {
        let pairs = DriftCorrectedMatcher::new(1e-6)
            .align(&[0.0], &[0.0, 5.0])
            .unwrap();
        assert_eq!(pairs.len(), 1);
        assert_eq!(pairs[0].detection_time, Some(0.0));
    }

    #[test]
    fn test_output_length_follows_gpu_series() {
        let times = gpu(50);
        let pairs = DriftCorrectedMatcher::new(TOLERANCE)
            .align(&times, &times[..10])
            .unwrap();
        assert_eq!(pairs.len(), 50);
        assert_eq!(pairs.iter().filter(|p| p.is_matched()).count(), 10);
        assert!(pairs[10..].iter().all(|p| p.detection_time.is_none()));
    }

    #[test]
    fn test_drift_is_absorbed_by_reanchoring() {
        // 1000 ppm drift: 0.6 s apart after 10 minutes
        let times = gpu(36_000);
        let sensor: Vec<f64> = times.iter().map(|t| t * 1.001).collect();
        let pairs = DriftCorrectedMatcher::new(TOLERANCE)
            .align(&times, &sensor)
            .unwrap();
        assert!(pairs.iter().all(|p| p.is_matched()));
        assert_eq!(pairs.last().unwrap().detection_time, sensor.last().copied());
    }

    #[test]
    fn test_spurious_detection_does_not_shift_matches() {
        let times = gpu(200);
        let mut sensor = times.clone();
        // Extra trigger half-way between toggles 100 and 101
        sensor.insert(101, times[100] + 0.4 * PERIOD);

        let pairs = DriftCorrectedMatcher::new(TOLERANCE)
            .align(&times, &sensor)
            .unwrap();
        let expected: Vec<Option<f64>> = times.iter().copied().map(Some).collect();
        assert_eq!(detection_times(&pairs), expected);
    }

    #[test]
    fn test_missing_detection_yields_one_gap() {
        let times = gpu(200);
        let mut sensor = times.clone();
        sensor.remove(120);

        let pairs = DriftCorrectedMatcher::new(TOLERANCE)
            .align(&times, &sensor)
            .unwrap();
        let unmatched: Vec<usize> = pairs
            .iter()
            .filter(|p| !p.is_matched())
            .map(|p| p.toggle_index)
            .collect();
        assert_eq!(unmatched, vec![120]);
        for pair in pairs.iter().filter(|p| p.is_matched()) {
            assert_eq!(pair.detection_time, Some(times[pair.toggle_index]));
        }
    }

    #[test]
    fn test_detections_are_never_reused() {
        // Two toggles close to a single detection
        let pairs = DriftCorrectedMatcher::new(TOLERANCE)
            .align(&[0.0, 0.1, 0.101], &[0.0, 0.1])
            .unwrap();
        assert_eq!(pairs[1].detection_time, Some(0.1));
        assert_eq!(pairs[2].detection_time, None);
    }

    #[test]
    fn test_tie_prefers_earlier_detection() {
        let pairs = DriftCorrectedMatcher::new(TOLERANCE)
            .align(&[0.0, 0.25], &[0.0, 0.2421875, 0.2578125])
            .unwrap();
        assert_eq!(pairs[1].detection_time, Some(0.2421875));
    }

    #[test]
    fn test_matches_agree_with_full_scan() {
        let mut rng = StdRng::seed_from_u64(7);
        let times = gpu(2_000);
        let mut sensor = Vec::with_capacity(times.len());
        for t in &times {
            let jittered = t + rng.random_range(-0.004..0.004);
            if rng.random_bool(0.97) {
                sensor.push(jittered);
            }
        }
        sensor.sort_by(f64::total_cmp);
        let origin = sensor[0];
        let sensor: Vec<f64> = sensor.iter().map(|s| s - origin).collect();

        let matcher = DriftCorrectedMatcher::new(TOLERANCE);
        let fast = matcher.align(&times, &sensor).unwrap();
        let slow = full_scan(&times, &sensor, TOLERANCE);
        assert_eq!(detection_times(&fast), slow);
    }

    #[test]
    fn test_idempotent() {
        let mut rng = StdRng::seed_from_u64(11);
        let times = gpu(500);
        let sensor: Vec<f64> = times
            .iter()
            .enumerate()
            .map(|(i, t)| if i == 0 { 0.0 } else { t + rng.random_range(0.0..0.003) })
            .collect();
        let matcher = DriftCorrectedMatcher::new(TOLERANCE);
        assert_eq!(
            matcher.align(&times, &sensor).unwrap(),
            matcher.align(&times, &sensor).unwrap()
        );
    }

    #[test]
    fn test_malformed_input() {
        let matcher = DriftCorrectedMatcher::new(TOLERANCE);
        assert!(matches!(
            matcher.align(&[], &[0.0]),
            Err(RenderSyncError::EmptySeries { series: "gpu" })
        ));
        assert!(matches!(
            matcher.align(&[0.0], &[]),
            Err(RenderSyncError::EmptySeries { series: "sensor" })
        ));
        assert!(matches!(
            matcher.align(&[0.5, 1.0], &[0.0]),
            Err(RenderSyncError::NotZeroAnchored { series: "gpu", .. })
        ));
        assert!(matches!(
            matcher.align(&[0.0, 1.0], &[0.0, 2.0, 1.0]),
            Err(RenderSyncError::NonAscending {
                series: "sensor",
                index: 2
            })
        ));
    }

    /// Quadratic reference: scan every detection, reject anything not later
    /// than the previous accepted one.
    fn full_scan(gpu: &[f64], sensor: &[f64], max_latency: f64) -> Vec<Option<f64>> {
        let mut out = vec![Some(sensor[0])];
        let mut anchor = (gpu[0], sensor[0]);
        let mut last = sensor[0];
        for &t in &gpu[1..] {
            let mut best: Option<(f64, f64)> = None;
            for &s in sensor.iter().filter(|&&s| s > last) {
                let d = ((s - anchor.1) - (t - anchor.0)).abs();
                if best.map_or(true, |(_, bd)| d < bd) {
                    best = Some((s, d));
                }
            }
            match best {
                Some((s, d)) if d < max_latency => {
                    out.push(Some(s));
                    anchor = (t, s);
                    last = s;
                }
                _ => out.push(None),
            }
        }
        out
    }
}
