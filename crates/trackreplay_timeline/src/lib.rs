// SPDX-License-Identifier: MIT OR Apache-2.0
//! Track log codec and playback timeline for recorded simulation state.
//!
//! This crate provides:
//! - Text codecs for rotation and skeletal tracks
//! - Ordered sample tracks with nearest-sample lookup
//! - Recorded objects grouped into static and dynamic batches
//! - A bidirectional, clamped playback timeline
//! - Recorders that turn live values into tracks
//!
//! ## Architecture
//!
//! Loading flows log text → [`LogParser`] → [`CodecRegistry`] → [`Track`] →
//! [`RecordedObject`] → [`ObjectRegistry`]. Playback flows the other way:
//! [`Timeline::tick`] dispatches the current time to every object, which
//! resolves a sample per track and hands it to a [`VisualTarget`].

pub mod codec;
pub mod error;
pub mod object;
pub mod primitive;
pub mod recording;
pub mod registry;
pub mod sample;
pub mod settings;
pub mod skeleton;
pub mod source;
pub mod target;
pub mod timeline;
pub mod track;

pub use codec::{CodecRegistry, RotationCodec, SkeletalCodec, TrackCodec};
pub use error::{ReplayError, Result};
pub use object::{ObjectId, RecordedObject};
pub use primitive::{parse_quaternion, NumericFormat, Quaternion};
pub use recording::{
    Recordable, RecordingMethod, RecordingSettings, SkeletalRecorder, TrackRecorder,
};
pub use registry::{generate_objects, Batch, BatchId, BatchKind, ObjectRegistry};
pub use sample::{Sample, Samples};
pub use settings::{PlaybackSettings, ReplaySettings};
pub use skeleton::{AnimationState, Bone, SkeletonSetup, Skin};
pub use source::{FileReader, FsReader, LogParser, ParsedObject};
pub use target::{AppliedSample, LatestSamples, VisualTarget};
pub use timeline::{Playstate, Timeline, TimelineEvent};
pub use track::{SamplePayload, Track, TrackData, TrackKind};
