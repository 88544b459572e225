// SPDX-License-Identifier: MIT OR Apache-2.0
//! Timestamped samples and the ordered sequences that hold them.

use crate::error::{ReplayError, Result};
use serde::{Deserialize, Serialize};

/// A single recorded value at a point in time
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Sample<T> {
    /// Time in seconds
    pub timestamp: f32,
    /// Recorded value
    pub value: T,
}

impl<T> Sample<T> {
    /// Create a new sample
    pub fn new(timestamp: f32, value: T) -> Self {
        Self { timestamp, value }
    }
}

/// Non-empty, time-ordered run of samples
///
/// Timestamps are finite and never decrease, which lets lookups binary search instead of
/// scanning. Equal timestamps are allowed; the later sample wins a lookup.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Samples<T> {
    samples: Vec<Sample<T>>,
}

impl<T> Samples<T> {
    /// Take ownership of a sample list, checking it is non-empty and ordered
    pub fn new(samples: Vec<Sample<T>>) -> Result<Self> {
        if samples.is_empty() {
            return Err(ReplayError::EmptyTrack);
        }

        if let Some((index, sample)) = samples
            .iter()
            .enumerate()
            .find(|(_, s)| !s.timestamp.is_finite())
        {
            return Err(ReplayError::NonFiniteTimestamp {
                index,
                timestamp: sample.timestamp,
            });
        }

        for (index, pair) in samples.windows(2).enumerate() {
            if pair[1].timestamp < pair[0].timestamp {
                return Err(ReplayError::UnorderedSamples {
                    index: index + 1,
                    timestamp: pair[1].timestamp,
                    previous: pair[0].timestamp,
                });
            }
        }

        Ok(Self { samples })
    }

    /// Index of the last sample at or before `time`
    ///
    /// Times before the first sample resolve to index 0.
    pub fn nearest_index(&self, time: f32) -> usize {
        self.samples
            .partition_point(|s| s.timestamp <= time)
            .saturating_sub(1)
    }

    /// The last sample at or before `time`
    pub fn nearest(&self, time: f32) -> &Sample<T> {
        &self.samples[self.nearest_index(time)]
    }

    /// First sample
    pub fn first(&self) -> &Sample<T> {
        &self.samples[0]
    }

    /// Last sample
    pub fn last(&self) -> &Sample<T> {
        &self.samples[self.samples.len() - 1]
    }

    /// Timestamp of the first sample
    pub fn first_timestamp(&self) -> f32 {
        self.first().timestamp
    }

    /// Timestamp of the last sample
    pub fn last_timestamp(&self) -> f32 {
        self.last().timestamp
    }

    /// Sample count, always at least one
    pub fn len(&self) -> usize {
        self.samples.len()
    }

    /// Always false
    pub fn is_empty(&self) -> bool {
        false
    }

    /// Get a sample by index
    pub fn get(&self, index: usize) -> Option<&Sample<T>> {
        self.samples.get(index)
    }

    /// Iterate samples in time order
    pub fn iter(&self) -> std::slice::Iter<'_, Sample<T>> {
        self.samples.iter()
    }

}

impl<'a, T> IntoIterator for &'a Samples<T> {
    type Item = &'a Sample<T>;
    type IntoIter = std::slice::Iter<'a, Sample<T>>;

    fn into_iter(self) -> Self::IntoIter {
        self.samples.iter()
    }
}

impl<T> TryFrom<Vec<Sample<T>>> for Samples<T> {
    type Error = ReplayError;

    fn try_from(samples: Vec<Sample<T>>) -> Result<Self> {
        Self::new(samples)
    }
}

impl<'de, T: Deserialize<'de>> Deserialize<'de> for Samples<T> {
    fn deserialize<D: serde::Deserializer<'de>>(
        deserializer: D,
    ) -> std::result::Result<Self, D::Error> {
        #[derive(Deserialize)]
        struct Raw<T> {
            samples: Vec<Sample<T>>,
        }

        let raw = Raw::<T>::deserialize(deserializer)?;
        Self::new(raw.samples).map_err(serde::de::Error::custom)
    }
}
