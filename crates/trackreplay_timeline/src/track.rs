// SPDX-License-Identifier: MIT OR Apache-2.0
//! Track definitions for recorded objects.

use crate::error::{ReplayError, Result};
use crate::object::ObjectId;
use crate::primitive::Quaternion;
use crate::sample::Samples;
use crate::skeleton::{AnimationState, SkeletonSetup};
use crate::target::VisualTarget;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Kind of data a track records
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum TrackKind {
    /// Orientation over time
    Rotation,
    /// Skeleton setup plus animator state over time
    Skeletal,
}

impl TrackKind {
    /// Get the name used for this kind in log files
    pub fn name(&self) -> &'static str {
        match self {
            Self::Rotation => "Rotation",
            Self::Skeletal => "Skeletal",
        }
    }

    /// Get all known kinds
    pub fn all() -> &'static [TrackKind] {
        &[TrackKind::Rotation, TrackKind::Skeletal]
    }
}

impl fmt::Display for TrackKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for TrackKind {
    type Err = ReplayError;

    fn from_str(s: &str) -> Result<Self> {
        Self::all()
            .iter()
            .copied()
            .find(|kind| kind.name() == s.trim())
            .ok_or_else(|| ReplayError::UnknownTrackKind(s.to_string()))
    }
}

/// Kind-specific contents of a track
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum TrackData {
    /// Rotation samples
    Rotation(Samples<Quaternion>),
    /// Skeletal setup and animation samples
    Skeletal {
        /// Rig, skins and controller, recorded once
        setup: SkeletonSetup,
        /// Animator state over time
        samples: Samples<AnimationState>,
    },
}

/// Borrowed payload of one sample, handed to visual targets
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum SamplePayload<'a> {
    /// Orientation to apply
    Rotation(&'a Quaternion),
    /// Clip and normalized time to pose
    Animation(&'a AnimationState),
}

impl SamplePayload<'_> {
    /// Track kind this payload belongs to
    pub fn kind(&self) -> TrackKind {
        match self {
            Self::Rotation(_) => TrackKind::Rotation,
            Self::Animation(_) => TrackKind::Skeletal,
        }
    }
}

/// One ordered time series for one kind on one object
///
/// Tracks are read-only once built and always hold at least one sample.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Track {
    data: TrackData,
}

impl Track {
    /// Create a rotation track
    pub fn rotation(samples: Samples<Quaternion>) -> Self {
        Self {
            data: TrackData::Rotation(samples),
        }
    }

    /// Create a skeletal track
    pub fn skeletal(setup: SkeletonSetup, samples: Samples<AnimationState>) -> Self {
        Self {
            data: TrackData::Skeletal { setup, samples },
        }
    }

    /// Get the track kind
    pub fn kind(&self) -> TrackKind {
        match &self.data {
            TrackData::Rotation(_) => TrackKind::Rotation,
            TrackData::Skeletal { .. } => TrackKind::Skeletal,
        }
    }

    /// Get the kind-specific data
    pub fn data(&self) -> &TrackData {
        &self.data
    }

    /// Skeleton setup, for skeletal tracks
    pub fn setup(&self) -> Option<&SkeletonSetup> {
        match &self.data {
            TrackData::Skeletal { setup, .. } => Some(setup),
            TrackData::Rotation(_) => None,
        }
    }

    /// Get sample count
    pub fn sample_count(&self) -> usize {
        match &self.data {
            TrackData::Rotation(samples) => samples.len(),
            TrackData::Skeletal { samples, .. } => samples.len(),
        }
    }

    /// Timestamp of the first sample
    pub fn first_timestamp(&self) -> f32 {
        match &self.data {
            TrackData::Rotation(samples) => samples.first_timestamp(),
            TrackData::Skeletal { samples, .. } => samples.first_timestamp(),
        }
    }

    /// Timestamp of the last sample
    pub fn last_timestamp(&self) -> f32 {
        match &self.data {
            TrackData::Rotation(samples) => samples.last_timestamp(),
            TrackData::Skeletal { samples, .. } => samples.last_timestamp(),
        }
    }

    /// Index of the last sample at or before `time`, or 0 if `time` is earlier
    pub fn nearest_sample_index(&self, time: f32) -> usize {
        match &self.data {
            TrackData::Rotation(samples) => samples.nearest_index(time),
            TrackData::Skeletal { samples, .. } => samples.nearest_index(time),
        }
    }

    /// Payload of the sample at `index`
    pub fn payload(&self, index: usize) -> Option<SamplePayload<'_>> {
        match &self.data {
            TrackData::Rotation(samples) => {
                samples.get(index).map(|s| SamplePayload::Rotation(&s.value))
            }
            TrackData::Skeletal { samples, .. } => {
                samples.get(index).map(|s| SamplePayload::Animation(&s.value))
            }
        }
    }

    /// Payload of the sample in effect at `time`
    pub fn sample_at(&self, time: f32) -> SamplePayload<'_> {
        match &self.data {
            TrackData::Rotation(samples) => SamplePayload::Rotation(&samples.nearest(time).value),
            TrackData::Skeletal { samples, .. } => {
                SamplePayload::Animation(&samples.nearest(time).value)
            }
        }
    }

    /// Apply the sample in effect at `time` to the object's visual target
    pub fn update_visualization(&self, object: ObjectId, time: f32, target: &mut dyn VisualTarget) {
        target.apply(object, self.sample_at(time));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sample::Sample;

    fn rotation_track() -> Track {
        Track::rotation(
            Samples::new(vec![
                Sample::new(0.0, Quaternion::IDENTITY),
                Sample::new(1.0, Quaternion::new(0.0, 1.0, 0.0, 0.0)),
                Sample::new(2.5, Quaternion::new(1.0, 0.0, 0.0, 0.0)),
            ])
            .unwrap(),
        )
    }

    #[test]
    fn test_kind_names() {
        assert_eq!("Rotation".parse::<TrackKind>().unwrap(), TrackKind::Rotation);
        assert_eq!("Skeletal".parse::<TrackKind>().unwrap(), TrackKind::Skeletal);
        assert!(matches!(
            "Position".parse::<TrackKind>(),
            Err(ReplayError::UnknownTrackKind(_))
        ));
    }

    #[test]
    fn test_time_range() {
        let track = rotation_track();
        assert_eq!(track.kind(), TrackKind::Rotation);
        assert_eq!(track.first_timestamp(), 0.0);
        assert_eq!(track.last_timestamp(), 2.5);
        assert_eq!(track.sample_count(), 3);
        assert!(track.setup().is_none());
    }

    #[test]
    fn test_sample_at() {
        let track = rotation_track();
        assert_eq!(track.nearest_sample_index(1.7), 1);
        assert_eq!(
            track.sample_at(1.7),
            SamplePayload::Rotation(&Quaternion::new(0.0, 1.0, 0.0, 0.0))
        );
        assert_eq!(track.sample_at(-3.0), SamplePayload::Rotation(&Quaternion::IDENTITY));
        assert_eq!(track.payload(2).map(|p| p.kind()), Some(TrackKind::Rotation));
        assert!(track.payload(3).is_none());
    }
}
