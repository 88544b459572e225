// SPDX-License-Identifier: MIT OR Apache-2.0
//! Text target for headless playback.

use std::collections::HashMap;
use trackreplay_timeline::{ObjectId, SamplePayload, Track, VisualTarget};

/// Renders applied samples as one line per object
#[derive(Debug, Default)]
pub struct PrintTarget {
    names: HashMap<ObjectId, String>,
    lines: Vec<String>,
}

impl PrintTarget {
    /// Create an empty printer
    pub fn new() -> Self {
        Self::default()
    }

    /// Take the lines rendered since the last call
    pub fn drain(&mut self) -> Vec<String> {
        std::mem::take(&mut self.lines)
    }
}

impl VisualTarget for PrintTarget {
    fn start(&mut self, object: ObjectId, name: &str, track: &Track, start_time: f32) {
        tracing::debug!(
            "Starting {} track of '{}' ({} samples) at {start_time}",
            track.kind(),
            name,
            track.sample_count()
        );
        self.names.insert(object, name.to_string());
    }

    fn apply(&mut self, object: ObjectId, payload: SamplePayload<'_>) {
        let name = self.names.get(&object).map_or("?", String::as_str);
        let line = match payload {
            SamplePayload::Rotation(q) => format!(
                "  {name:<24} rotation  ({:.3}, {:.3}, {:.3}, {:.3})",
                q.x, q.y, q.z, q.w
            ),
            SamplePayload::Animation(state) => format!(
                "  {name:<24} animation {} @ {:.3}",
                state.clip_name, state.normalized_time
            ),
        };
        self.lines.push(line);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use trackreplay_timeline::{AnimationState, Quaternion, Sample, Samples};

    #[test]
    fn test_lines_use_started_names() {
        let samples = Samples::new(vec![Sample::new(0.0, Quaternion::IDENTITY)]).unwrap();
        let track = Track::rotation(samples);
        let id = ObjectId::new();
        let mut printer = PrintTarget::new();

        printer.start(id, "Ball", &track, 0.0);
        printer.apply(id, SamplePayload::Rotation(&Quaternion::IDENTITY));
        printer.apply(ObjectId::new(), SamplePayload::Animation(&AnimationState::new("Run", 0.25)));

        let lines = printer.drain();
        assert_eq!(lines.len(), 2);
        assert!(lines[0].contains("Ball"));
        assert!(lines[0].contains("(0.000, 0.000, 0.000, 1.000)"));
        assert!(lines[1].contains("Run @ 0.250"));
        assert!(printer.drain().is_empty());
    }
}
