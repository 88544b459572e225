// SPDX-License-Identifier: MIT OR Apache-2.0
//! Binding between replayed tracks and whatever displays them.

use crate::object::ObjectId;
use crate::primitive::Quaternion;
use crate::skeleton::AnimationState;
use crate::track::{SamplePayload, Track, TrackKind};
use indexmap::IndexMap;

/// Receives resolved samples during playback
///
/// The replay core decides which sample applies; implementors decide what
/// applying it means (rotating a node, posing a rig, printing a line).
pub trait VisualTarget {
    /// Called once per track after its batch loads, before any `apply`
    fn start(&mut self, _object: ObjectId, _name: &str, _track: &Track, _start_time: f32) {}

    /// Apply one sample to the object's representation
    fn apply(&mut self, object: ObjectId, payload: SamplePayload<'_>);
}

/// Target that ignores everything
impl VisualTarget for () {
    fn apply(&mut self, _object: ObjectId, _payload: SamplePayload<'_>) {}
}

/// Owned copy of a [`SamplePayload`]
#[derive(Debug, Clone, PartialEq)]
pub enum AppliedSample {
    /// Orientation that was applied
    Rotation(Quaternion),
    /// Clip pose that was applied
    Animation(AnimationState),
}

impl From<SamplePayload<'_>> for AppliedSample {
    fn from(payload: SamplePayload<'_>) -> Self {
        match payload {
            SamplePayload::Rotation(q) => Self::Rotation(*q),
            SamplePayload::Animation(state) => Self::Animation(state.clone()),
        }
    }
}

/// Target that keeps the latest applied sample per object and kind
#[derive(Debug, Default)]
pub struct LatestSamples {
    /// Objects started, in load order
    pub started: Vec<(ObjectId, String)>,
    /// Latest sample per object, in first-applied order
    pub latest: IndexMap<(ObjectId, TrackKind), AppliedSample>,
    /// Total number of `apply` calls
    pub apply_count: usize,
}

impl LatestSamples {
    /// Create an empty target
    pub fn new() -> Self {
        Self::default()
    }

    /// Latest rotation applied to an object
    pub fn rotation(&self, object: ObjectId) -> Option<Quaternion> {
        match self.latest.get(&(object, TrackKind::Rotation)) {
            Some(AppliedSample::Rotation(q)) => Some(*q),
            _ => None,
        }
    }

    /// Latest animation state applied to an object
    pub fn animation(&self, object: ObjectId) -> Option<&AnimationState> {
        match self.latest.get(&(object, TrackKind::Skeletal)) {
            Some(AppliedSample::Animation(state)) => Some(state),
            _ => None,
        }
    }
}

impl VisualTarget for LatestSamples {
    fn start(&mut self, object: ObjectId, name: &str, _track: &Track, _start_time: f32) {
        if !self.started.iter().any(|(id, _)| *id == object) {
            self.started.push((object, name.to_string()));
        }
    }

    fn apply(&mut self, object: ObjectId, payload: SamplePayload<'_>) {
        self.apply_count += 1;
        self.latest.insert((object, payload.kind()), payload.into());
    }
}
