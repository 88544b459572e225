// SPDX-License-Identifier: MIT OR Apache-2.0
//! Recorded objects and the tracks they own.

use crate::error::{ReplayError, Result};
use crate::target::VisualTarget;
use crate::track::{Track, TrackKind};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Unique identifier for a recorded object
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ObjectId(pub Uuid);

impl ObjectId {
    /// Create a new random object ID
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for ObjectId {
    fn default() -> Self {
        Self::new()
    }
}

/// One logical entity from a log, with at most one track per kind
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RecordedObject {
    /// Unique object ID
    pub id: ObjectId,
    /// Object name as recorded
    pub name: String,
    tracks: IndexMap<TrackKind, Track>,
}

impl RecordedObject {
    /// Create an object with no tracks
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            id: ObjectId::new(),
            name: name.into(),
            tracks: IndexMap::new(),
        }
    }

    /// Add a track; each kind may only be added once
    pub fn add_track(&mut self, track: Track) -> Result<()> {
        let kind = track.kind();
        if self.tracks.contains_key(&kind) {
            return Err(ReplayError::DuplicateTrackKind {
                object: self.name.clone(),
                kind: kind.name(),
            });
        }
        self.tracks.insert(kind, track);
        Ok(())
    }

    /// Builder form of [`Self::add_track`]
    pub fn with_track(mut self, track: Track) -> Result<Self> {
        self.add_track(track)?;
        Ok(self)
    }

    /// Get the track of a kind
    pub fn track(&self, kind: TrackKind) -> Option<&Track> {
        self.tracks.get(&kind)
    }

    /// Get all tracks, in the order they were added
    pub fn tracks(&self) -> impl Iterator<Item = &Track> {
        self.tracks.values()
    }

    /// Get track count
    pub fn track_count(&self) -> usize {
        self.tracks.len()
    }

    /// Earliest first-sample time across all tracks
    pub fn earliest_time(&self) -> Result<f32> {
        self.tracks
            .values()
            .map(Track::first_timestamp)
            .reduce(f32::min)
            .ok_or_else(|| ReplayError::NoTracks(self.name.clone()))
    }

    /// Latest last-sample time across all tracks
    pub fn latest_time(&self) -> Result<f32> {
        self.tracks
            .values()
            .map(Track::last_timestamp)
            .reduce(f32::max)
            .ok_or_else(|| ReplayError::NoTracks(self.name.clone()))
    }

    /// Hand every track's setup to the target once after loading
    pub fn start_visualization(&self, start_time: f32, target: &mut dyn VisualTarget) {
        for track in self.tracks.values() {
            target.start(self.id, &self.name, track, start_time);
        }
    }

    /// Forward a time update to every track
    ///
    /// Tracks are updated even when `time` is outside their own range; a
    /// track simply holds its first or last sample there.
    pub fn dispatch(&self, time: f32, target: &mut dyn VisualTarget) {
        for track in self.tracks.values() {
            track.update_visualization(self.id, time, target);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::primitive::Quaternion;
    use crate::sample::{Sample, Samples};
    use crate::skeleton::{AnimationState, SkeletonSetup};
    use crate::target::LatestSamples;

    fn rotation(times: &[f32]) -> Track {
        Track::rotation(
            Samples::new(
                times
                    .iter()
                    .map(|&t| Sample::new(t, Quaternion::new(t, 0.0, 0.0, 1.0)))
                    .collect(),
            )
            .unwrap(),
        )
    }

    fn skeletal(times: &[f32]) -> Track {
        Track::skeletal(
            SkeletonSetup::default(),
            Samples::new(
                times
                    .iter()
                    .map(|&t| Sample::new(t, AnimationState::new("Walk", t)))
                    .collect(),
            )
            .unwrap(),
        )
    }

    #[test]
    fn test_time_range_across_tracks() {
        let object = RecordedObject::new("Robot")
            .with_track(rotation(&[1.0, 2.0, 3.0]))
            .unwrap()
            .with_track(skeletal(&[0.5, 2.5]))
            .unwrap();
        assert_eq!(object.track_count(), 2);
        assert_eq!(object.earliest_time().unwrap(), 0.5);
        assert_eq!(object.latest_time().unwrap(), 3.0);
    }

    #[test]
    fn test_no_tracks() {
        let object = RecordedObject::new("Empty");
        assert!(matches!(object.earliest_time(), Err(ReplayError::NoTracks(_))));
        assert!(matches!(object.latest_time(), Err(ReplayError::NoTracks(_))));
    }

    #[test]
    fn test_duplicate_kind_rejected() {
        let mut object = RecordedObject::new("Robot");
        object.add_track(rotation(&[0.0])).unwrap();
        let result = object.add_track(rotation(&[5.0]));
        assert!(matches!(result, Err(ReplayError::DuplicateTrackKind { .. })));
        assert_eq!(object.track_count(), 1);
        assert_eq!(object.latest_time().unwrap(), 0.0);
    }

    #[test]
    fn test_dispatch_outside_track_range() {
        let object = RecordedObject::new("Robot")
            .with_track(rotation(&[1.0, 2.0]))
            .unwrap()
            .with_track(skeletal(&[5.0, 6.0]))
            .unwrap();
        let mut target = LatestSamples::new();

        object.dispatch(3.0, &mut target);
        assert_eq!(target.apply_count, 2);
        assert_eq!(target.rotation(object.id).unwrap().x, 2.0);
        assert_eq!(target.animation(object.id).unwrap().normalized_time, 5.0);
    }
}
