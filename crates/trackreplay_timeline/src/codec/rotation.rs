// SPDX-License-Identifier: MIT OR Apache-2.0
//! Rotation tracks: `<timestamp>~<x>,<y>,<z>,<w>` per line.

use super::{block_lines, split_fields, TrackCodec, FIELD_DELIMITER};
use crate::error::{ReplayError, Result};
use crate::primitive::{parse_quaternion, parse_timestamp, NumericFormat, COMPONENT_DELIMITER};
use crate::sample::{Sample, Samples};
use crate::track::{Track, TrackData, TrackKind};
use std::fmt::Write;

/// Codec for rotation tracks
#[derive(Debug, Clone, Copy, Default)]
pub struct RotationCodec;

impl TrackCodec for RotationCodec {
    fn kind(&self) -> TrackKind {
        TrackKind::Rotation
    }

    fn decode(&self, text: &str) -> Result<Track> {
        let mut samples = Vec::new();

        for (line_no, line) in block_lines(text) {
            let [timestamp, rotation] = split_fields::<2>(line_no, line)?;
            samples.push(Sample::new(
                parse_timestamp(timestamp)?,
                parse_quaternion(rotation)?,
            ));
        }

        Ok(Track::rotation(Samples::new(samples)?))
    }

    fn encode(&self, track: &Track, format: NumericFormat) -> Result<String> {
        let TrackData::Rotation(samples) = track.data() else {
            return Err(ReplayError::KindMismatch {
                expected: TrackKind::Rotation.name(),
                actual: track.kind().name(),
            });
        };

        let mut out = String::new();
        for sample in samples {
            let [x, y, z, w] = sample.value.to_array().map(|c| format.format(c));
            // Writing to a String cannot fail
            let _ = writeln!(
                out,
                "{}{FIELD_DELIMITER}{x}{COMPONENT_DELIMITER}{y}{COMPONENT_DELIMITER}{z}{COMPONENT_DELIMITER}{w}",
                format.format(sample.timestamp),
            );
        }
        Ok(out)
    }
}
