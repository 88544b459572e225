// SPDX-License-Identifier: MIT OR Apache-2.0
//! Skeletal tracks.
//!
//! The first line is the setup header `<rig>~<skins>~<controller>`; every
//! following line is one animator sample `\t\t<timestamp>~<clip>~<time>`.
//! The two leading tabs are kept for compatibility with existing logs.

use super::{
    block_lines, ensure_unreserved, split_fields, split_terminated, TrackCodec, FIELD_DELIMITER,
    GROUP_DELIMITER, INDEX_DELIMITER, RESERVED_IN_FIELD, RESERVED_IN_GROUP, SECTION_DELIMITER,
};
use crate::error::{ReplayError, Result};
use crate::primitive::{parse_float, parse_int, parse_timestamp, NumericFormat};
use crate::sample::{Sample, Samples};
use crate::skeleton::{AnimationState, Bone, SkeletonSetup, Skin};
use crate::track::{Track, TrackData, TrackKind};
use std::fmt::Write;

/// Prefix written before every animation sample line
pub const SAMPLE_LINE_PREFIX: &str = "\t\t";

/// Codec for skeletal tracks
#[derive(Debug, Clone, Copy, Default)]
pub struct SkeletalCodec;

impl TrackCodec for SkeletalCodec {
    fn kind(&self) -> TrackKind {
        TrackKind::Skeletal
    }

    fn decode(&self, text: &str) -> Result<Track> {
        let mut lines = block_lines(text);
        let (header_no, header) = lines.next().ok_or(ReplayError::EmptyTrack)?;
        let setup = decode_setup(header_no, header)?;

        let mut samples = Vec::new();
        for (line_no, line) in lines {
            let line = line.trim_start_matches('\t');
            let [timestamp, clip, normalized] = split_fields::<3>(line_no, line)?;
            samples.push(Sample::new(
                parse_timestamp(timestamp)?,
                AnimationState::new(clip, parse_float(normalized)?),
            ));
        }

        Ok(Track::skeletal(setup, Samples::new(samples)?))
    }

    fn encode(&self, track: &Track, format: NumericFormat) -> Result<String> {
        let TrackData::Skeletal { setup, samples } = track.data() else {
            return Err(ReplayError::KindMismatch {
                expected: TrackKind::Skeletal.name(),
                actual: track.kind().name(),
            });
        };

        let mut out = encode_setup(setup)?;
        out.push('\n');

        for sample in samples {
            ensure_unreserved("clip name", &sample.value.clip_name, RESERVED_IN_FIELD)?;
            let _ = writeln!(
                out,
                "{SAMPLE_LINE_PREFIX}{}{FIELD_DELIMITER}{}{FIELD_DELIMITER}{}",
                format.format(sample.timestamp),
                sample.value.clip_name,
                format.format(sample.value.normalized_time),
            );
        }
        Ok(out)
    }
}

fn decode_setup(line_no: usize, line: &str) -> Result<SkeletonSetup> {
    let [rig, skins, controller] = split_fields::<3>(line_no, line)?;
    Ok(SkeletonSetup {
        bones: decode_rig(rig)?,
        skins: decode_skins(skins)?,
        animator_controller: controller.to_string(),
    })
}

fn encode_setup(setup: &SkeletonSetup) -> Result<String> {
    ensure_unreserved(
        "animator controller path",
        &setup.animator_controller,
        RESERVED_IN_FIELD,
    )?;
    Ok(format!(
        "{}{FIELD_DELIMITER}{}{FIELD_DELIMITER}{}",
        encode_rig(&setup.bones)?,
        encode_skins(&setup.skins)?,
        setup.animator_controller
    ))
}

/// Encode bones as `` name`parent, `` entries
pub fn encode_rig(bones: &[Bone]) -> Result<String> {
    let mut out = String::new();
    for bone in bones {
        ensure_unreserved("bone name", &bone.name, RESERVED_IN_GROUP)?;
        let _ = write!(out, "{}{INDEX_DELIMITER}{}{GROUP_DELIMITER}", bone.name, bone.parent);
    }
    Ok(out)
}

/// Decode a rig string back into bones, preserving parent indices exactly
pub fn decode_rig(text: &str) -> Result<Vec<Bone>> {
    split_terminated(text, GROUP_DELIMITER)
        .into_iter()
        .map(|entry| {
            let (name, parent) = entry
                .split_once(INDEX_DELIMITER)
                .ok_or_else(|| ReplayError::primitive("bone entry", entry))?;
            Ok(Bone::new(name, parse_int(parent)?))
        })
        .collect()
}

/// Encode skins as `` mesh`sub;mat`...;joint`..., `` entries
pub fn encode_skins(skins: &[Skin]) -> Result<String> {
    let mut out = String::new();
    for skin in skins {
        ensure_unreserved("mesh path", &skin.mesh_path, RESERVED_IN_GROUP)?;
        let _ = write!(
            out,
            "{}{INDEX_DELIMITER}{}{SECTION_DELIMITER}",
            skin.mesh_path, skin.sub_asset_index
        );

        for material in &skin.material_paths {
            ensure_unreserved("material path", material, RESERVED_IN_GROUP)?;
            let _ = write!(out, "{material}{INDEX_DELIMITER}");
        }
        out.push(SECTION_DELIMITER);

        for joint in &skin.joint_indices {
            let _ = write!(out, "{joint}{INDEX_DELIMITER}");
        }
        out.push(GROUP_DELIMITER);
    }
    Ok(out)
}

/// Decode a skin string back into skins
pub fn decode_skins(text: &str) -> Result<Vec<Skin>> {
    split_terminated(text, GROUP_DELIMITER)
        .into_iter()
        .map(decode_skin)
        .collect()
}

fn decode_skin(entry: &str) -> Result<Skin> {
    let malformed = || ReplayError::primitive("skin entry", entry);

    let mut sections = entry.split(SECTION_DELIMITER);
    let (Some(mesh), Some(materials), Some(joints), None) = (
        sections.next(),
        sections.next(),
        sections.next(),
        sections.next(),
    ) else {
        return Err(malformed());
    };

    let (mesh_path, sub_asset_index) = mesh.split_once(INDEX_DELIMITER).ok_or_else(malformed)?;

    Ok(Skin {
        mesh_path: mesh_path.to_string(),
        sub_asset_index: parse_int(sub_asset_index)?,
        material_paths: split_terminated(materials, INDEX_DELIMITER)
            .into_iter()
            .map(str::to_string)
            .collect(),
        joint_indices: split_terminated(joints, INDEX_DELIMITER)
            .into_iter()
            .map(parse_int)
            .collect::<Result<_>>()?,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn setup() -> SkeletonSetup {
        SkeletonSetup {
            bones: vec![Bone::root("Root"), Bone::new("Hip", 0), Bone::new("Spine", 1)],
            skins: vec![
                Skin {
                    mesh_path: "Assets/Characters/Robot.fbx".into(),
                    sub_asset_index: 3,
                    material_paths: vec!["Assets/Materials/Body.mat".into(), String::new()],
                    joint_indices: vec![0, 1, 2],
                },
                Skin {
                    mesh_path: "Assets/Props/Cape.asset".into(),
                    sub_asset_index: -1,
                    material_paths: Vec::new(),
                    joint_indices: vec![2],
                },
            ],
            animator_controller: "Assets/Anim/Robot.controller".into(),
        }
    }

    #[test]
    fn test_rig_string() {
        let bones = setup().bones;
        let text = encode_rig(&bones).unwrap();
        assert_eq!(text, "Root`-1,Hip`0,Spine`1,");
        assert_eq!(decode_rig(&text).unwrap(), bones);
    }

    #[test]
    fn test_skin_string() {
        let skins = setup().skins;
        let text = encode_skins(&skins).unwrap();
        assert_eq!(
            text,
            "Assets/Characters/Robot.fbx`3;Assets/Materials/Body.mat``;0`1`2`,\
             Assets/Props/Cape.asset`-1;;2`,"
        );
        assert_eq!(decode_skins(&text).unwrap(), skins);
    }

    #[test]
    fn test_block_round_trip() {
        let samples = Samples::new(vec![
            Sample::new(0.0, AnimationState::new("Idle", 0.0)),
            Sample::new(0.5, AnimationState::new("Idle", 0.25)),
            Sample::new(1.0, AnimationState::new("Run Fast", 1.5)),
        ])
        .unwrap();
        let track = Track::skeletal(setup(), samples);

        let text = SkeletalCodec.encode(&track, NumericFormat::Fixed(3)).unwrap();
        let mut lines = text.lines();
        assert!(lines.next().unwrap().ends_with("~Assets/Anim/Robot.controller"));
        assert_eq!(lines.next(), Some("\t\t0.000~Idle~0.000"));

        let decoded = SkeletalCodec.decode(&text).unwrap();
        assert_eq!(decoded, track);
    }

    #[test]
    fn test_decode_tolerates_missing_tabs() {
        let track = SkeletalCodec
            .decode("Root`-1,~~Ctrl\n0~Walk~0.1\n\t\t2~Walk~0.9\n")
            .unwrap();
        assert_eq!(track.sample_count(), 2);
        assert_eq!(track.last_timestamp(), 2.0);
        assert_eq!(track.setup().unwrap().bones, vec![Bone::root("Root")]);
        assert!(track.setup().unwrap().skins.is_empty());
    }

    #[test]
    fn test_header_without_samples_is_empty() {
        assert!(matches!(
            SkeletalCodec.decode("Root`-1,~~Ctrl\n"),
            Err(ReplayError::EmptyTrack)
        ));
        assert!(matches!(SkeletalCodec.decode(""), Err(ReplayError::EmptyTrack)));
    }

    #[test]
    fn test_malformed_header() {
        assert!(matches!(
            SkeletalCodec.decode("Root`-1,~Ctrl\n\t\t0~Idle~0\n"),
            Err(ReplayError::MalformedLine { line: 1, .. })
        ));
        assert!(matches!(
            SkeletalCodec.decode("Root,~~Ctrl\n\t\t0~Idle~0\n"),
            Err(ReplayError::MalformedPrimitive { .. })
        ));
        assert!(matches!(
            SkeletalCodec.decode("Root`x,~~Ctrl\n\t\t0~Idle~0\n"),
            Err(ReplayError::MalformedPrimitive { .. })
        ));
    }

    #[test]
    fn test_malformed_sample_line() {
        assert!(matches!(
            SkeletalCodec.decode("~~Ctrl\n\t\t0~Idle\n"),
            Err(ReplayError::MalformedLine { line: 2, .. })
        ));
        assert!(matches!(
            SkeletalCodec.decode("~~Ctrl\n\t\t0~Idle~half\n"),
            Err(ReplayError::MalformedPrimitive { .. })
        ));
    }

    #[test]
    fn test_reserved_delimiters_rejected() {
        let mut bad = setup();
        bad.bones[1].name = "Hip,L".into();
        let track = Track::skeletal(
            bad,
            Samples::new(vec![Sample::new(0.0, AnimationState::new("Idle", 0.0))]).unwrap(),
        );
        assert!(matches!(
            SkeletalCodec.encode(&track, NumericFormat::default()),
            Err(ReplayError::ReservedDelimiter { delimiter: ',', .. })
        ));

        let track = Track::skeletal(
            setup(),
            Samples::new(vec![Sample::new(0.0, AnimationState::new("Idle~2", 0.0))]).unwrap(),
        );
        assert!(matches!(
            SkeletalCodec.encode(&track, NumericFormat::default()),
            Err(ReplayError::ReservedDelimiter { delimiter: '~', .. })
        ));
    }
}
