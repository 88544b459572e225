// SPDX-License-Identifier: MIT OR Apache-2.0
//! Outer grouping of track logs written by the recorder.
//!
//! A log is a sequence of objects, each holding one block per track kind:
//!
//! ```text
//! #Robot
//! @Skeletal
//! Root`-1,Hip`0,~~Assets/Robot.controller
//! 		0.000~Idle~0.000
//! @Rotation
//! 0.000~0.000,0.000,0.000,1.000
//! #Ball
//! @Rotation
//! ...
//! ```
//!
//! `#` opens an object and `@` opens a block; every other line belongs to the
//! current block and is passed to the track codec untouched.

use indexmap::IndexMap;
use std::fmt::Write;
use trackreplay_timeline::{LogParser, ParsedObject, ReplayError, Result};

/// Marks the start of an object
pub const OBJECT_MARKER: char = '#';
/// Marks the start of a track block
pub const TRACK_MARKER: char = '@';

/// [`LogParser`] for `#object` / `@track` sectioned logs
#[derive(Debug, Clone, Copy, Default)]
pub struct SectionLogParser;

impl LogParser for SectionLogParser {
    fn parse_log(&self, text: &str) -> Result<Vec<ParsedObject>> {
        let mut objects: Vec<ParsedObject> = Vec::new();
        let mut current_kind: Option<String> = None;

        for (index, raw) in text.split('\n').enumerate() {
            let line_no = index + 1;
            let line = raw.strip_suffix('\r').unwrap_or(raw);

            if let Some(name) = line.strip_prefix(OBJECT_MARKER) {
                objects.push(ParsedObject::new(name.trim()));
                current_kind = None;
                continue;
            }

            if let Some(kind) = line.strip_prefix(TRACK_MARKER) {
                let Some(object) = objects.last_mut() else {
                    return Err(ReplayError::LogParse(format!(
                        "line {line_no}: track block before any object"
                    )));
                };
                let kind = kind.trim().to_string();
                if object.tracks.contains_key(&kind) {
                    return Err(ReplayError::LogParse(format!(
                        "line {line_no}: object '{}' has two {kind} blocks",
                        object.name
                    )));
                }
                object.tracks.insert(kind.clone(), String::new());
                current_kind = Some(kind);
                continue;
            }

            if line.trim().is_empty() {
                continue;
            }

            let block = match (objects.last_mut(), &current_kind) {
                (Some(object), Some(kind)) => object.tracks.get_mut(kind),
                _ => None,
            };
            let Some(block) = block else {
                return Err(ReplayError::LogParse(format!(
                    "line {line_no}: data outside a track block"
                )));
            };
            block.push_str(line);
            block.push('\n');
        }

        Ok(objects)
    }
}

/// Render encoded track blocks in the sectioned layout
///
/// Fails if a block line starts with a marker, since it would read back as a
/// new object or block.
pub fn write_log(objects: &[(String, IndexMap<String, String>)]) -> Result<String> {
    let mut out = String::new();
    for (name, tracks) in objects {
        let _ = writeln!(out, "{OBJECT_MARKER}{name}");
        for (kind, block) in tracks {
            if let Some(line) = block
                .lines()
                .find(|line| line.starts_with([OBJECT_MARKER, TRACK_MARKER]))
            {
                return Err(ReplayError::ReservedDelimiter {
                    field: "track line",
                    value: line.to_string(),
                    delimiter: line.chars().next().unwrap_or(OBJECT_MARKER),
                });
            }

            let _ = writeln!(out, "{TRACK_MARKER}{kind}");
            out.push_str(block);
            if !block.ends_with('\n') {
                out.push('\n');
            }
        }
    }
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;

    const LOG: &str = "#Robot\n@Skeletal\nRoot`-1,~~Ctrl\n\t\t0~Idle~0\n\t\t1~Idle~0.5\n\
                       @Rotation\n0~0,0,0,1\n\n#Ball\n@Rotation\r\n1~0,0,0,1\r\n";

    #[test]
    fn test_parse_sections() {
        let objects = SectionLogParser.parse_log(LOG).unwrap();
        assert_eq!(objects.len(), 2);
        assert_eq!(objects[0].name, "Robot");
        assert_eq!(
            objects[0].tracks["Skeletal"],
            "Root`-1,~~Ctrl\n\t\t0~Idle~0\n\t\t1~Idle~0.5\n"
        );
        assert_eq!(objects[0].tracks["Rotation"], "0~0,0,0,1\n");
        assert_eq!(objects[1].tracks["Rotation"], "1~0,0,0,1\n");
    }

    #[test]
    fn test_data_before_block_rejected() {
        assert!(matches!(
            SectionLogParser.parse_log("#Ball\n0~0,0,0,1\n"),
            Err(ReplayError::LogParse(_))
        ));
        assert!(SectionLogParser.parse_log("@Rotation\n").is_err());
    }

    #[test]
    fn test_duplicate_block_rejected() {
        let result = SectionLogParser.parse_log("#Ball\n@Rotation\n0~0,0,0,1\n@Rotation\n");
        assert!(matches!(result, Err(ReplayError::LogParse(_))));
    }

    #[test]
    fn test_write_then_parse() {
        let mut tracks = IndexMap::new();
        tracks.insert("Rotation".to_string(), "0~0,0,0,1\n2~0,1,0,0".to_string());
        let text = write_log(&[("Ball".to_string(), tracks)]).unwrap();
        assert_eq!(text, "#Ball\n@Rotation\n0~0,0,0,1\n2~0,1,0,0\n");

        let objects = SectionLogParser.parse_log(&text).unwrap();
        assert_eq!(objects[0].tracks["Rotation"], "0~0,0,0,1\n2~0,1,0,0\n");
    }

    #[test]
    fn test_write_rejects_marker_lines() {
        let mut tracks = IndexMap::new();
        tracks.insert("Skeletal".to_string(), "#Hip`-1,~~Ctrl\n\t\t0~Idle~0\n".to_string());
        let result = write_log(&[("Robot".to_string(), tracks)]);
        assert!(matches!(
            result,
            Err(ReplayError::ReservedDelimiter { delimiter: '#', .. })
        ));

        let mut tracks = IndexMap::new();
        tracks.insert("Skeletal".to_string(), "@Hip`-1,~~Ctrl\n\t\t0~Idle~0\n".to_string());
        assert!(write_log(&[("Robot".to_string(), tracks)]).is_err());
    }
}
