//! Toggle extraction from the per-frame render-sync log.
//!
//! The renderer flips a quad once per stimulus update. An edge is any sample
//! whose quad value differs from the previous sample; the first sample is
//! always treated as an edge.

use contracts::{EventSeries, QuadState, RenderSyncSample, ToggleEvent};
use tracing::{debug, instrument, warn};

use crate::error::{RenderSyncError, Result};

/// A break in the frame-index sequence (`gap != 1`)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FrameGap {
    /// Frame index before the break
    pub after_frame: i64,
    /// Index difference across the break
    pub gap: i64,
}

impl From<FrameGap> for RenderSyncError {
    fn from(gap: FrameGap) -> Self {
        Self::DroppedFrame {
            after_frame: gap.after_frame,
            gap: gap.gap,
        }
    }
}

/// Result of toggle extraction
#[derive(Debug, Clone)]
pub struct ToggleExtraction {
    toggles: Vec<ToggleEvent>,
    dropped_frames: Vec<FrameGap>,
    samples: usize,
}

impl ToggleExtraction {
    /// Extracted edges, in frame order
    pub fn toggles(&self) -> &[ToggleEvent] {
        &self.toggles
    }

    /// Frame-index gaps found while extracting
    pub fn dropped_frames(&self) -> &[FrameGap] {
        &self.dropped_frames
    }

    /// Number of input samples
    pub fn sample_count(&self) -> usize {
        self.samples
    }

    /// Fail with `DroppedFrame` on the first gap
    pub fn ensure_complete(&self) -> Result<()> {
        match self.dropped_frames.first() {
            Some(&gap) => Err(gap.into()),
            None => Ok(()),
        }
    }

    /// Toggle timestamps as an event series carrying the quad state
    pub fn to_series(&self) -> Result<EventSeries<QuadState>> {
        let series = EventSeries::from_parts(
            self.toggles.iter().map(|t| t.frame_timestamp).collect(),
            self.toggles.iter().map(|t| t.quad_value).collect(),
        )?;
        Ok(series)
    }
}

/// Edge detector over render-sync samples
#[derive(Debug, Default, Clone, Copy)]
pub struct ToggleExtractor;

impl ToggleExtractor {
    /// Extract toggles
    ///
    /// # Errors
    /// - `EmptySeries` on an empty log
    /// - `InvalidSignalDomain` if any quad value is not exactly 0 or 1
    /// - `NonAscending` if frame indices or timestamps go backwards
    ///
    /// Frame-index gaps are collected rather than raised; see
    /// [`ToggleExtraction::ensure_complete`].
    #[instrument(name = "toggle_extract", skip_all, fields(samples = samples.len()))]
    pub fn extract(&self, samples: &[RenderSyncSample]) -> Result<ToggleExtraction> {
        if samples.is_empty() {
            return Err(RenderSyncError::EmptySeries {
                series: "render_sync",
            });
        }

        let states = decode_states(samples)?;

        for (index, w) in samples.windows(2).enumerate() {
            if w[1].frame_index <= w[0].frame_index {
                return Err(RenderSyncError::NonAscending {
                    series: "frame_index",
                    index: index + 1,
                });
            }
            // NaN compares false, so it is rejected here too
            if !(w[1].frame_timestamp >= w[0].frame_timestamp) {
                return Err(RenderSyncError::NonAscending {
                    series: "frame_timestamp",
                    index: index + 1,
                });
            }
        }

        let dropped_frames = frame_gaps(samples);
        if !dropped_frames.is_empty() {
            warn!(gaps = dropped_frames.len(), "frame index gaps in render sync log");
        }

        let toggles: Vec<ToggleEvent> = samples
            .iter()
            .zip(&states)
            .enumerate()
            .filter(|&(i, (_, state))| i == 0 || *state != states[i - 1])
            .map(|(_, (sample, &quad_value))| ToggleEvent {
                frame_index: sample.frame_index,
                frame_timestamp: sample.frame_timestamp,
                quad_value,
            })
            .collect();

        ensure_alternating(&toggles)?;

        debug!(toggles = toggles.len(), "toggles extracted");

        Ok(ToggleExtraction {
            toggles,
            dropped_frames,
            samples: samples.len(),
        })
    }
}

/// Distinct raw quad values, ascending
pub fn signal_domain(samples: &[RenderSyncSample]) -> Vec<f64> {
    let mut values: Vec<f64> = samples.iter().map(|s| s.quad_value).collect();
    values.sort_by(f64::total_cmp);
    values.dedup_by(|a, b| a.total_cmp(b).is_eq());
    values
}

/// Decode every sample, rejecting anything outside {0, 1}
pub fn decode_states(samples: &[RenderSyncSample]) -> Result<Vec<QuadState>> {
    let states: Vec<Option<QuadState>> = samples
        .iter()
        .map(|s| QuadState::from_raw(s.quad_value))
        .collect();

    if states.iter().any(Option::is_none) {
        let values = signal_domain(samples)
            .into_iter()
            .filter(|&v| QuadState::from_raw(v).is_none())
            .collect();
        return Err(RenderSyncError::InvalidSignalDomain { values });
    }

    Ok(states.into_iter().flatten().collect())
}

/// Every place where consecutive frame indices do not differ by exactly 1
pub fn frame_gaps(samples: &[RenderSyncSample]) -> Vec<FrameGap> {
    samples
        .windows(2)
        .filter_map(|w| {
            let gap = w[1].frame_index - w[0].frame_index;
            (gap != 1).then_some(FrameGap {
                after_frame: w[0].frame_index,
                gap,
            })
        })
        .collect()
}

/// Fail with `NonAlternating` at the first repeated state
pub fn ensure_alternating(toggles: &[ToggleEvent]) -> Result<()> {
    match toggles
        .windows(2)
        .position(|w| w[1].quad_value != w[0].quad_value.flipped())
    {
        Some(position) => Err(RenderSyncError::NonAlternating {
            index: position + 1,
        }),
        None => Ok(()),
    }
}
