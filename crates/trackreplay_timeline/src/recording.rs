// SPDX-License-Identifier: MIT OR Apache-2.0
//! Recording side: turning live values into tracks.
//!
//! Values come from the host each frame; the recorders decide which of them
//! become samples according to [`RecordingSettings`].

use crate::error::Result;
use crate::primitive::{NumericFormat, Quaternion};
use crate::sample::{Sample, Samples};
use crate::skeleton::{AnimationState, SkeletonSetup};
use crate::track::Track;
use serde::{Deserialize, Serialize};

/// When a recorder takes a new sample
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum RecordingMethod {
    /// Every update
    #[default]
    EveryFrame,
    /// At most once per `sample_interval`
    EveryXSeconds,
    /// When the value moved at least `change_threshold` since the last sample
    OnChange,
}

/// Recording configuration shared by all tracks of a recorder
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RecordingSettings {
    /// Sampling policy
    pub method: RecordingMethod,
    /// Seconds between samples for [`RecordingMethod::EveryXSeconds`]
    pub sample_interval: f32,
    /// Minimum change for [`RecordingMethod::OnChange`]
    pub change_threshold: f32,
    /// Number formatting used when writing the log
    pub data_format: NumericFormat,
}

impl Default for RecordingSettings {
    fn default() -> Self {
        Self {
            method: RecordingMethod::EveryFrame,
            sample_interval: 0.1,
            change_threshold: 0.01,
            data_format: NumericFormat::default(),
        }
    }
}

/// A value that can be recorded with [`RecordingMethod::OnChange`]
pub trait Recordable: Clone {
    /// Whether `self` differs from `last` enough to be worth a new sample
    fn changed_since(&self, last: &Self, threshold: f32) -> bool;
}

impl Recordable for Quaternion {
    /// Threshold is an angle in radians
    fn changed_since(&self, last: &Self, threshold: f32) -> bool {
        self.angle_to(*last) >= threshold
    }
}

impl Recordable for AnimationState {
    /// A clip switch always counts; otherwise normalized time must advance
    /// by at least the threshold
    fn changed_since(&self, last: &Self, threshold: f32) -> bool {
        self.clip_name != last.clip_name
            || self.normalized_time - last.normalized_time >= threshold
    }
}

/// Collects samples for one track while a simulation runs
#[derive(Debug, Clone)]
pub struct TrackRecorder<T> {
    settings: RecordingSettings,
    samples: Vec<Sample<T>>,
    next_sample_time: f32,
}

impl<T: Recordable> TrackRecorder<T> {
    /// Create a recorder
    pub fn new(settings: RecordingSettings) -> Self {
        Self {
            settings,
            samples: Vec::new(),
            next_sample_time: 0.0,
        }
    }

    /// Get the settings
    pub fn settings(&self) -> &RecordingSettings {
        &self.settings
    }

    /// Discard anything recorded and take the first sample
    pub fn start_recording(&mut self, time: f32, value: T) {
        self.samples.clear();
        self.record(time, value);
    }

    /// Offer the current value; returns whether it was recorded
    pub fn update_recording(&mut self, time: f32, value: T) -> bool {
        let should_record = match (self.settings.method, self.samples.last()) {
            (_, None) | (RecordingMethod::EveryFrame, _) => true,
            (RecordingMethod::EveryXSeconds, Some(_)) => time >= self.next_sample_time,
            (RecordingMethod::OnChange, Some(last)) => {
                value.changed_since(&last.value, self.settings.change_threshold)
            }
        };

        if should_record {
            self.record(time, value);
        }
        should_record
    }

    /// Take the final sample
    pub fn end_recording(&mut self, time: f32, value: T) {
        self.record(time, value);
    }

    /// Record a sample unconditionally
    pub fn record(&mut self, time: f32, value: T) {
        self.samples.push(Sample::new(time, value));
        self.next_sample_time = time + self.settings.sample_interval;
    }

    /// Get recorded sample count
    pub fn sample_count(&self) -> usize {
        self.samples.len()
    }

    /// Get recorded samples
    pub fn samples(&self) -> &[Sample<T>] {
        &self.samples
    }

    /// Finish recording and validate the samples
    pub fn finish(self) -> Result<Samples<T>> {
        Samples::new(self.samples)
    }
}

impl TrackRecorder<Quaternion> {
    /// Finish recording into a rotation track
    pub fn into_track(self) -> Result<Track> {
        Ok(Track::rotation(self.finish()?))
    }
}

/// Records a skeleton's setup once and its animator state over time
#[derive(Debug, Clone)]
pub struct SkeletalRecorder {
    setup: SkeletonSetup,
    animation: TrackRecorder<AnimationState>,
}

impl SkeletalRecorder {
    /// Create a recorder for a rig captured by the host
    pub fn new(setup: SkeletonSetup, settings: RecordingSettings) -> Self {
        Self {
            setup,
            animation: TrackRecorder::new(settings),
        }
    }

    /// Get the recorded setup
    pub fn setup(&self) -> &SkeletonSetup {
        &self.setup
    }

    /// Get the animation sample recorder
    pub fn animation(&mut self) -> &mut TrackRecorder<AnimationState> {
        &mut self.animation
    }

    /// Finish recording into a skeletal track
    pub fn into_track(self) -> Result<Track> {
        Ok(Track::skeletal(self.setup, self.animation.finish()?))
    }
}
