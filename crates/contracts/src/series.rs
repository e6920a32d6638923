//! EventSeries - ordered (timestamp, value) sequence
//!
//! Every stream handed to the alignment stage is an `EventSeries`.
//! Construction enforces finite, non-decreasing timestamps, so downstream
//! code never re-checks ordering.

use serde::{Deserialize, Serialize};

use crate::ContractError;

/// A single timestamped event
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Event<V> {
    /// Timestamp (seconds)
    pub timestamp: f64,
    /// Attached value (`()` for pure timestamp streams)
    pub value: V,
}

/// Immutable ordered sequence of events
///
/// Timestamps are stored column-wise so the matcher can binary-search them
/// without touching the values.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EventSeries<V = ()> {
    timestamps: Vec<f64>,
    values: Vec<V>,
}

impl EventSeries<()> {
    /// Build a value-less series from timestamps
    pub fn from_timestamps(timestamps: Vec<f64>) -> Result<Self, ContractError> {
        let values = vec![(); timestamps.len()];
        Self::from_parts(timestamps, values)
    }
}

impl<V> EventSeries<V> {
    /// Build a series from parallel timestamp/value columns
    ///
    /// # Errors
    /// - columns of different length
    /// - non-finite timestamp
    /// - decreasing timestamps
    pub fn from_parts(timestamps: Vec<f64>, values: Vec<V>) -> Result<Self, ContractError> {
        if timestamps.len() != values.len() {
            return Err(ContractError::LengthMismatch {
                timestamps: timestamps.len(),
                values: values.len(),
            });
        }
        validate_timestamps(&timestamps)?;
        Ok(Self { timestamps, values })
    }

    /// Build a series from events already in time order
    pub fn from_events(events: impl IntoIterator<Item = Event<V>>) -> Result<Self, ContractError> {
        let (timestamps, values) = events
            .into_iter()
            .map(|event| (event.timestamp, event.value))
            .unzip();
        Self::from_parts(timestamps, values)
    }

    /// Number of events
    pub fn len(&self) -> usize {
        self.timestamps.len()
    }

    /// Whether the series holds no events
    pub fn is_empty(&self) -> bool {
        self.timestamps.is_empty()
    }

    /// Timestamp column
    pub fn timestamps(&self) -> &[f64] {
        &self.timestamps
    }

    /// Value column
    pub fn values(&self) -> &[V] {
        &self.values
    }

    /// First timestamp, if any
    pub fn first_timestamp(&self) -> Option<f64> {
        self.timestamps.first().copied()
    }

    /// Event at `index`
    pub fn get(&self, index: usize) -> Option<Event<&V>> {
        let timestamp = *self.timestamps.get(index)?;
        let value = self.values.get(index)?;
        Some(Event { timestamp, value })
    }

    /// Iterate over events in order
    pub fn iter(&self) -> impl Iterator<Item = Event<&V>> + '_ {
        self.timestamps
            .iter()
            .zip(self.values.iter())
            .map(|(&timestamp, value)| Event { timestamp, value })
    }

    /// First difference of the timestamps (`len - 1` entries)
    pub fn diff(&self) -> Vec<f64> {
        self.timestamps.windows(2).map(|w| w[1] - w[0]).collect()
    }

}

impl<V: Clone> EventSeries<V> {
    /// Copy with the first timestamp re-based to zero
    ///
    /// Returns the copy together with the subtracted origin. An empty series
    /// is returned unchanged with origin `0.0`.
    pub fn zero_anchored(&self) -> (Self, f64) {
        let origin = self.first_timestamp().unwrap_or(0.0);
        (self.shifted(-origin), origin)
    }

    /// Copy with `offset` added to every timestamp
    pub fn shifted(&self, offset: f64) -> Self {
        Self {
            timestamps: self.timestamps.iter().map(|t| t + offset).collect(),
            values: self.values.clone(),
        }
    }

    /// Copy without the first `n` events
    pub fn skip(&self, n: usize) -> Self {
        let n = n.min(self.len());
        Self {
            timestamps: self.timestamps[n..].to_vec(),
            values: self.values[n..].to_vec(),
        }
    }

    /// Strictly increasing subset
    ///
    /// Keeps the first event of every run of identical timestamps. Returns the
    /// subset and the number of events removed.
    pub fn monotonic_subset(&self) -> (Self, usize) {
        let mut timestamps: Vec<f64> = Vec::with_capacity(self.len());
        let mut values = Vec::with_capacity(self.len());
        for event in self.iter() {
            if timestamps
                .last()
                .is_some_and(|&last| event.timestamp <= last)
            {
                continue;
            }
            timestamps.push(event.timestamp);
            values.push(event.value.clone());
        }
        let removed = self.len() - timestamps.len();
        (Self { timestamps, values }, removed)
    }
}

fn validate_timestamps(timestamps: &[f64]) -> Result<(), ContractError> {
    for (index, &value) in timestamps.iter().enumerate() {
        if !value.is_finite() {
            return Err(ContractError::NonFiniteTimestamp { index, value });
        }
    }
    for (index, w) in timestamps.windows(2).enumerate() {
        if w[1] < w[0] {
            return Err(ContractError::NonAscending {
                index: index + 1,
                previous: w[0],
                current: w[1],
            });
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rejects_descending() {
        let err = EventSeries::from_timestamps(vec![0.0, 0.2, 0.1]).unwrap_err();
        assert!(matches!(err, ContractError::NonAscending { index: 2, .. }));
    }

    #[test]
    fn test_rejects_nan() {
        let err = EventSeries::from_timestamps(vec![0.0, f64::NAN]).unwrap_err();
        assert!(matches!(err, ContractError::NonFiniteTimestamp { index: 1, .. }));
    }

    #[test]
    fn test_rejects_length_mismatch() {
        let err = EventSeries::from_parts(vec![0.0, 1.0], vec![1u8]).unwrap_err();
        assert!(matches!(err, ContractError::LengthMismatch { .. }));
    }

    #[test]
    fn test_zero_anchored_returns_origin() {
        let series = EventSeries::from_timestamps(vec![10.0, 10.5, 11.0]).unwrap();
        let (anchored, origin) = series.zero_anchored();
        assert_eq!(origin, 10.0);
        assert_eq!(anchored.first_timestamp(), Some(0.0));
        assert_eq!(anchored.timestamps(), &[0.0, 0.5, 1.0]);
    }

    #[test]
    fn test_diff() {
        let series = EventSeries::from_timestamps(vec![0.0, 0.25, 0.75]).unwrap();
        assert_eq!(series.diff(), vec![0.25, 0.5]);
    }

    #[test]
    fn test_monotonic_subset_drops_repeats() {
        let series = EventSeries::from_parts(vec![0.0, 0.1, 0.1, 0.2], vec!['a', 'b', 'c', 'd'])
            .unwrap();
        let (subset, removed) = series.monotonic_subset();
        assert_eq!(removed, 1);
        assert_eq!(subset.timestamps(), &[0.0, 0.1, 0.2]);
        assert_eq!(subset.values(), &['a', 'b', 'd']);
    }

    #[test]
    fn test_skip_past_end() {
        let series = EventSeries::from_timestamps(vec![0.0, 1.0]).unwrap();
        assert!(series.skip(5).is_empty());
    }
}
