// SPDX-License-Identifier: MIT OR Apache-2.0
//! Registry of loaded object batches.
//!
//! Objects arrive in batches: one static batch, replaced on reload, and any
//! number of dynamic batches added over time. Batches are built completely
//! before they are committed, so a failed load never leaves a partial batch.

use crate::codec::CodecRegistry;
use crate::error::{ReplayError, Result};
use crate::object::RecordedObject;
use crate::source::ParsedObject;
use crate::target::VisualTarget;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Unique identifier for a batch
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct BatchId(pub Uuid);

impl BatchId {
    /// Create a new random batch ID
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for BatchId {
    fn default() -> Self {
        Self::new()
    }
}

/// How a batch participates in the registry
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum BatchKind {
    /// Scenery that does not change; only one static batch exists at a time
    Static,
    /// Moving objects; batches accumulate
    Dynamic,
}

impl BatchKind {
    /// Get the display name
    pub fn name(&self) -> &'static str {
        match self {
            Self::Static => "Static Objects",
            Self::Dynamic => "Dynamic Objects",
        }
    }
}

/// Objects loaded together as one unit
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Batch {
    /// Unique batch ID
    pub id: BatchId,
    /// Batch name
    pub name: String,
    /// Static or dynamic
    pub kind: BatchKind,
    objects: Vec<RecordedObject>,
}

impl Batch {
    /// Create a batch from already built objects
    pub fn new(name: impl Into<String>, kind: BatchKind, objects: Vec<RecordedObject>) -> Self {
        Self {
            id: BatchId::new(),
            name: name.into(),
            kind,
            objects,
        }
    }

    /// Get all objects
    pub fn objects(&self) -> &[RecordedObject] {
        &self.objects
    }

    /// Get object count
    pub fn object_count(&self) -> usize {
        self.objects.len()
    }

    /// Earliest track time in this batch, `+inf` if it has none
    pub fn earliest_time(&self) -> f32 {
        self.objects
            .iter()
            .filter_map(|o| o.earliest_time().ok())
            .fold(f32::INFINITY, f32::min)
    }

    /// Latest track time in this batch, never below zero
    pub fn latest_time(&self) -> f32 {
        self.objects
            .iter()
            .filter_map(|o| o.latest_time().ok())
            .fold(0.0, f32::max)
    }
}

/// Build one object per parsed entry, decoding every track block
///
/// Fails on the first entry that cannot be built; nothing is returned for
/// the entries that did succeed.
pub fn generate_objects(
    parsed: &[ParsedObject],
    codecs: &CodecRegistry,
) -> Result<Vec<RecordedObject>> {
    parsed
        .iter()
        .map(|entry| {
            if entry.tracks.is_empty() {
                return Err(ReplayError::NoTracks(entry.name.clone()));
            }

            let mut object = RecordedObject::new(&entry.name);
            for (kind, text) in &entry.tracks {
                let track = codecs
                    .decode(kind, text)
                    .map_err(|e| e.in_track(&entry.name, kind))?;
                object.add_track(track)?;
            }
            Ok(object)
        })
        .collect()
}

/// All loaded batches
#[derive(Debug, Default)]
pub struct ObjectRegistry {
    static_batch: Option<Batch>,
    dynamic_batches: Vec<Batch>,
}

impl ObjectRegistry {
    /// Create an empty registry
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the static batch, returning the previous one
    pub fn set_static(&mut self, batch: Batch) -> Option<Batch> {
        self.static_batch.replace(batch)
    }

    /// Append a dynamic batch
    pub fn add_dynamic(&mut self, batch: Batch) {
        self.dynamic_batches.push(batch);
    }

    /// Commit a built batch according to its kind
    pub fn add_batch(&mut self, batch: Batch) -> BatchId {
        let id = batch.id;
        tracing::debug!(
            "Adding {} batch '{}' with {} objects",
            batch.kind.name(),
            batch.name,
            batch.object_count()
        );
        match batch.kind {
            BatchKind::Static => {
                self.set_static(batch);
            }
            BatchKind::Dynamic => self.add_dynamic(batch),
        }
        id
    }

    /// Build a batch from parsed objects and commit it
    ///
    /// The registry is untouched if any object fails to build.
    pub fn load_batch(
        &mut self,
        kind: BatchKind,
        name: impl Into<String>,
        parsed: &[ParsedObject],
        codecs: &CodecRegistry,
    ) -> Result<BatchId> {
        let objects = generate_objects(parsed, codecs)?;
        Ok(self.add_batch(Batch::new(name, kind, objects)))
    }

    /// The static batch, if loaded
    pub fn static_batch(&self) -> Option<&Batch> {
        self.static_batch.as_ref()
    }

    /// Dynamic batches in load order
    pub fn dynamic_batches(&self) -> &[Batch] {
        &self.dynamic_batches
    }

    /// All batches, static first
    pub fn batches(&self) -> impl Iterator<Item = &Batch> {
        self.static_batch.iter().chain(self.dynamic_batches.iter())
    }

    /// Get a batch by ID
    pub fn batch(&self, id: BatchId) -> Option<&Batch> {
        self.batches().find(|b| b.id == id)
    }

    /// Get batch count
    pub fn batch_count(&self) -> usize {
        self.batches().count()
    }

    /// All objects across all batches
    pub fn objects(&self) -> impl Iterator<Item = &RecordedObject> {
        self.batches().flat_map(|b| b.objects.iter())
    }

    /// Get object count across all batches
    pub fn object_count(&self) -> usize {
        self.batches().map(Batch::object_count).sum()
    }

    /// Find the first object with a name
    pub fn find(&self, name: &str) -> Option<&RecordedObject> {
        self.objects().find(|o| o.name == name)
    }

    /// Whether nothing is loaded
    pub fn is_empty(&self) -> bool {
        self.object_count() == 0
    }

    /// Earliest track time across every batch; `+inf` when empty
    pub fn global_earliest(&self) -> f32 {
        self.batches()
            .map(Batch::earliest_time)
            .fold(f32::INFINITY, f32::min)
    }

    /// Latest track time across every batch; `0.0` when empty
    pub fn global_latest(&self) -> f32 {
        self.batches().map(Batch::latest_time).fold(0.0, f32::max)
    }

    /// Global `(earliest, latest)`, or `None` if no track has been loaded
    pub fn time_range(&self) -> Option<(f32, f32)> {
        let start = self.global_earliest();
        let end = self.global_latest();
        (start <= end).then_some((start, end))
    }

    /// Start visualization for every object of one batch
    pub fn start_batch(&self, id: BatchId, start_time: f32, target: &mut dyn VisualTarget) {
        if let Some(batch) = self.batch(id) {
            for object in &batch.objects {
                object.start_visualization(start_time, target);
            }
        }
    }

    /// Forward a time update to every object, static ones included
    pub fn dispatch(&self, time: f32, target: &mut dyn VisualTarget) {
        for object in self.objects() {
            object.dispatch(time, target);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::target::LatestSamples;

    fn rotation_entry(name: &str, block: &str) -> ParsedObject {
        ParsedObject::new(name).with_track("Rotation", block)
    }

    #[test]
    fn test_empty_registry_sentinels() {
        let registry = ObjectRegistry::new();
        assert_eq!(registry.global_earliest(), f32::INFINITY);
        assert_eq!(registry.global_latest(), 0.0);
        assert!(registry.time_range().is_none());
        assert!(registry.is_empty());
    }

    #[test]
    fn test_global_range_across_batches() {
        let codecs = CodecRegistry::default();
        let mut registry = ObjectRegistry::new();
        registry
            .load_batch(
                BatchKind::Static,
                "static",
                &[rotation_entry("Floor", "2.0~0,0,0,1\n3.0~0,0,0,1\n")],
                &codecs,
            )
            .unwrap();
        registry
            .load_batch(
                BatchKind::Dynamic,
                "run 1",
                &[
                    rotation_entry("Ball", "1.0~0,0,0,1\n4.0~0,0,0,1\n"),
                    rotation_entry("Bat", "1.5~0,0,0,1\n8.5~0,0,0,1\n"),
                ],
                &codecs,
            )
            .unwrap();

        assert_eq!(registry.batch_count(), 2);
        assert_eq!(registry.object_count(), 3);
        assert_eq!(registry.time_range(), Some((1.0, 8.5)));
        assert!(registry.find("Bat").is_some());
    }

    #[test]
    fn test_malformed_object_rejects_batch() {
        let codecs = CodecRegistry::default();
        let mut registry = ObjectRegistry::new();
        registry
            .load_batch(
                BatchKind::Dynamic,
                "good",
                &[rotation_entry("Ball", "0~0,0,0,1\n")],
                &codecs,
            )
            .unwrap();

        let result = registry.load_batch(
            BatchKind::Dynamic,
            "bad",
            &[
                rotation_entry("Ok", "0~0,0,0,1\n"),
                rotation_entry("Broken", "1.0~0.1,0.2,0.3\n"),
            ],
            &codecs,
        );

        let err = result.unwrap_err();
        assert!(matches!(err, ReplayError::Track { ref object, .. } if object == "Broken"));
        assert!(matches!(err.root_cause(), ReplayError::MalformedPrimitive { .. }));
        assert_eq!(registry.object_count(), 1);
        assert_eq!(registry.batch_count(), 1);
    }

    #[test]
    fn test_unknown_kind_rejects_batch() {
        let codecs = CodecRegistry::default();
        let mut registry = ObjectRegistry::new();
        let parsed = [ParsedObject::new("Lamp").with_track("Light", "0~1\n")];
        let err = registry
            .load_batch(BatchKind::Static, "static", &parsed, &codecs)
            .unwrap_err();
        assert!(matches!(err.root_cause(), ReplayError::UnknownTrackKind(_)));
        assert!(registry.is_empty());
    }

    #[test]
    fn test_object_without_tracks_rejected() {
        let codecs = CodecRegistry::default();
        let result = generate_objects(&[ParsedObject::new("Ghost")], &codecs);
        assert!(matches!(result, Err(ReplayError::NoTracks(_))));
    }

    #[test]
    fn test_static_batch_is_replaced() {
        let codecs = CodecRegistry::default();
        let mut registry = ObjectRegistry::new();
        for block in ["0~0,0,0,1\n", "5~0,0,0,1\n"] {
            registry
                .load_batch(
                    BatchKind::Static,
                    "static",
                    &[rotation_entry("Floor", block), rotation_entry("Wall", block)],
                    &codecs,
                )
                .unwrap();
        }
        assert_eq!(registry.batch_count(), 1);
        assert_eq!(registry.object_count(), 2);
        assert_eq!(registry.global_earliest(), 5.0);
    }

    #[test]
    fn test_dispatch_reaches_static_objects() {
        let codecs = CodecRegistry::default();
        let mut registry = ObjectRegistry::new();
        registry
            .load_batch(
                BatchKind::Static,
                "static",
                &[rotation_entry("Floor", "0~0,0,0,1\n")],
                &codecs,
            )
            .unwrap();
        registry
            .load_batch(
                BatchKind::Dynamic,
                "dynamic",
                &[rotation_entry("Ball", "0~0,0,0,1\n1~1,0,0,0\n")],
                &codecs,
            )
            .unwrap();

        let mut target = LatestSamples::new();
        registry.dispatch(0.5, &mut target);
        assert_eq!(target.apply_count, 2);
    }
}
