// SPDX-License-Identifier: MIT OR Apache-2.0
//! Playback clock over every loaded batch.

use crate::codec::CodecRegistry;
use crate::error::{ReplayError, Result};
use crate::object::RecordedObject;
use crate::registry::{Batch, BatchId, BatchKind, ObjectRegistry};
use crate::settings::PlaybackSettings;
use crate::source::{read_log, FileReader, LogParser, ParsedObject};
use crate::target::VisualTarget;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Playback direction
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum Playstate {
    /// Time is not advancing
    #[default]
    Paused,
    /// Playing forward
    Forward,
    /// Playing in reverse
    Reverse,
}

/// Notification queued by the timeline
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum TimelineEvent {
    /// Current time moved
    TimeChanged(f32),
    /// Playstate changed, by command or by reaching a bound
    PlaystateChanged(Playstate),
    /// Bounds were recomputed after a load
    RangeChanged {
        /// New start time
        start: f32,
        /// New end time
        end: f32,
    },
}

/// Playback controller owning the loaded object batches
///
/// `start_time <= current_time <= end_time` holds after every call. The
/// host drives it by calling [`Timeline::tick`] once per frame.
pub struct Timeline {
    registry: ObjectRegistry,
    codecs: CodecRegistry,
    current_time: f32,
    start_time: f32,
    end_time: f32,
    playstate: Playstate,
    speed: f32,
    pending_events: Vec<TimelineEvent>,
}

impl Timeline {
    /// Create an empty timeline with the default codecs
    pub fn new() -> Self {
        Self::with_codecs(CodecRegistry::with_defaults())
    }

    /// Create an empty timeline with a custom codec registry
    pub fn with_codecs(codecs: CodecRegistry) -> Self {
        Self {
            registry: ObjectRegistry::new(),
            codecs,
            current_time: 0.0,
            start_time: 0.0,
            end_time: 0.0,
            playstate: Playstate::Paused,
            speed: 1.0,
            pending_events: Vec::new(),
        }
    }

    /// Create an empty timeline configured from settings
    pub fn with_settings(settings: &PlaybackSettings) -> Self {
        let mut timeline = Self::new();
        timeline.speed = settings.speed;
        timeline
    }

    /// Get the loaded batches
    pub fn registry(&self) -> &ObjectRegistry {
        &self.registry
    }

    /// Get the codec registry used for loads
    pub fn codecs(&self) -> &CodecRegistry {
        &self.codecs
    }

    /// Current playback time
    pub fn current_time(&self) -> f32 {
        self.current_time
    }

    /// Earliest time across all loaded tracks
    pub fn start_time(&self) -> f32 {
        self.start_time
    }

    /// Latest time across all loaded tracks
    pub fn end_time(&self) -> f32 {
        self.end_time
    }

    /// Total length of the timeline
    pub fn duration(&self) -> f32 {
        self.end_time - self.start_time
    }

    /// Current playstate
    pub fn playstate(&self) -> Playstate {
        self.playstate
    }

    /// Playback speed multiplier
    pub fn speed(&self) -> f32 {
        self.speed
    }

    /// Is currently playing (forward or reverse)
    pub fn is_playing(&self) -> bool {
        matches!(self.playstate, Playstate::Forward | Playstate::Reverse)
    }

    /// Play forward from the current position
    pub fn play(&mut self) {
        self.set_playstate(Playstate::Forward);
    }

    /// Play in reverse from the current position
    pub fn reverse(&mut self) {
        self.set_playstate(Playstate::Reverse);
    }

    /// Pause playback
    pub fn pause(&mut self) {
        self.set_playstate(Playstate::Paused);
    }

    /// Toggle between paused and forward playback
    pub fn toggle_playback(&mut self) {
        if self.is_playing() {
            self.pause();
        } else {
            self.play();
        }
    }

    /// Set the speed multiplier
    ///
    /// Any value is accepted. A negative speed runs time against the
    /// playstate; the bounds still clamp and pause.
    pub fn set_speed(&mut self, speed: f32) {
        self.speed = speed;
    }

    fn set_playstate(&mut self, playstate: Playstate) {
        if self.playstate != playstate {
            self.playstate = playstate;
            self.pending_events.push(TimelineEvent::PlaystateChanged(playstate));
            tracing::debug!("Playstate changed to {:?}", playstate);
        }
    }

    /// Advance playback by `delta_time` seconds
    ///
    /// Reaching the end while playing forward, or the start while playing in
    /// reverse, clamps to that bound and pauses.
    pub fn tick(&mut self, delta_time: f32, target: &mut dyn VisualTarget) {
        let step = delta_time * self.speed;
        if !step.is_finite() {
            tracing::warn!("Ignoring non-finite tick step {step}");
            return;
        }

        let mut time = match self.playstate {
            Playstate::Forward => self.current_time + step,
            Playstate::Reverse => self.current_time - step,
            Playstate::Paused => return,
        };

        let hit_end = match self.playstate {
            Playstate::Forward => time >= self.end_time,
            _ => time > self.end_time,
        };
        let hit_start = match self.playstate {
            Playstate::Reverse => time <= self.start_time,
            _ => time < self.start_time,
        };

        if hit_end {
            time = self.end_time;
            self.pause();
        } else if hit_start {
            time = self.start_time;
            self.pause();
        }

        self.set_time(time, target);
    }

    /// Jump to `time` without changing the playstate
    pub fn seek_to(&mut self, time: f32, target: &mut dyn VisualTarget) -> Result<()> {
        // Negated so NaN is rejected too
        if !(time >= self.start_time && time <= self.end_time) {
            return Err(ReplayError::OutOfRange {
                time,
                start: self.start_time,
                end: self.end_time,
            });
        }
        self.set_time(time, target);
        Ok(())
    }

    fn set_time(&mut self, time: f32, target: &mut dyn VisualTarget) {
        self.current_time = time;
        self.pending_events.push(TimelineEvent::TimeChanged(time));
        self.registry.dispatch(time, target);
    }

    /// Build a static batch from parsed objects, replacing the previous one
    pub fn load_static(
        &mut self,
        parsed: &[ParsedObject],
        target: &mut dyn VisualTarget,
    ) -> Result<BatchId> {
        self.load(BatchKind::Static, parsed, target)
    }

    /// Build a dynamic batch from parsed objects and add it
    pub fn load_dynamic(
        &mut self,
        parsed: &[ParsedObject],
        target: &mut dyn VisualTarget,
    ) -> Result<BatchId> {
        self.load(BatchKind::Dynamic, parsed, target)
    }

    /// Read, parse and load a log file as one batch
    pub fn load_file(
        &mut self,
        kind: BatchKind,
        path: &Path,
        reader: &dyn FileReader,
        parser: &dyn LogParser,
        target: &mut dyn VisualTarget,
    ) -> Result<BatchId> {
        let parsed = read_log(reader, parser, path)?;
        self.load(kind, &parsed, target)
    }

    fn load(
        &mut self,
        kind: BatchKind,
        parsed: &[ParsedObject],
        target: &mut dyn VisualTarget,
    ) -> Result<BatchId> {
        match self.registry.load_batch(kind, kind.name(), parsed, &self.codecs) {
            Ok(id) => {
                self.reset_after_load(id, target);
                Ok(id)
            }
            Err(e) => {
                tracing::warn!("Rejected {} batch: {e}", kind.name());
                Err(e)
            }
        }
    }

    /// Replace the static batch with already built objects
    pub fn add_static_batch(
        &mut self,
        objects: Vec<RecordedObject>,
        target: &mut dyn VisualTarget,
    ) -> BatchId {
        let batch = Batch::new(BatchKind::Static.name(), BatchKind::Static, objects);
        self.add_batch(batch, target)
    }

    /// Add already built objects as a dynamic batch
    pub fn add_dynamic_batch(
        &mut self,
        objects: Vec<RecordedObject>,
        target: &mut dyn VisualTarget,
    ) -> BatchId {
        let batch = Batch::new(BatchKind::Dynamic.name(), BatchKind::Dynamic, objects);
        self.add_batch(batch, target)
    }

    /// Add an already built batch
    pub fn add_batch(&mut self, batch: Batch, target: &mut dyn VisualTarget) -> BatchId {
        let id = self.registry.add_batch(batch);
        self.reset_after_load(id, target);
        id
    }

    fn reset_after_load(&mut self, batch: BatchId, target: &mut dyn VisualTarget) {
        self.pause();

        // An empty registry has no range; collapse to zero
        let (start, end) = self.registry.time_range().unwrap_or((0.0, 0.0));
        self.start_time = start;
        self.end_time = end;
        self.pending_events.push(TimelineEvent::RangeChanged { start, end });
        tracing::debug!(
            "Timeline range is now [{start}, {end}] over {} objects",
            self.registry.object_count()
        );

        self.registry.start_batch(batch, start, target);
        self.set_time(start, target);
    }

    /// Get queued events and clear them
    pub fn take_events(&mut self) -> Vec<TimelineEvent> {
        std::mem::take(&mut self.pending_events)
    }
}

impl Default for Timeline {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for Timeline {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Timeline")
            .field("current_time", &self.current_time)
            .field("start_time", &self.start_time)
            .field("end_time", &self.end_time)
            .field("playstate", &self.playstate)
            .field("speed", &self.speed)
            .field("objects", &self.registry.object_count())
            .finish()
    }
}
