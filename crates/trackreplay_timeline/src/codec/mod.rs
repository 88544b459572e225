// SPDX-License-Identifier: MIT OR Apache-2.0
//! Text codecs for track blocks.
//!
//! A track block is a run of newline-separated lines. The delimiters form a
//! fixed hierarchy, each tier nested inside the previous one:
//! - `~` separates top-level fields (timestamp vs. payload)
//! - `` ` `` separates a value from its auxiliary index
//! - `,` and `;` separate repeated groups
//!
//! Names and asset paths are written verbatim, so encoding rejects any that
//! contain a delimiter of their tier or an enclosing one.

mod rotation;
mod skeletal;

pub use rotation::RotationCodec;
pub use skeletal::{decode_rig, decode_skins, encode_rig, encode_skins, SkeletalCodec};

use crate::error::{ReplayError, Result};
use crate::primitive::NumericFormat;
use crate::track::{Track, TrackKind};
use indexmap::IndexMap;

/// Separates top-level fields on a line
pub const FIELD_DELIMITER: char = '~';
/// Separates a value from its index
pub const INDEX_DELIMITER: char = '`';
/// Separates entries of a repeated group
pub const GROUP_DELIMITER: char = ',';
/// Separates sections inside a skin entry
pub const SECTION_DELIMITER: char = ';';

/// Characters that may not appear in a free-text value nested in a group
pub const RESERVED_IN_GROUP: &[char] = &[
    FIELD_DELIMITER,
    INDEX_DELIMITER,
    GROUP_DELIMITER,
    SECTION_DELIMITER,
    '\n',
    '\r',
];

/// Characters that may not appear in a free-text top-level field
pub const RESERVED_IN_FIELD: &[char] = &[FIELD_DELIMITER, '\n', '\r'];

/// Encodes and decodes one kind of track
pub trait TrackCodec: Send + Sync {
    /// Kind of track this codec handles
    fn kind(&self) -> TrackKind;

    /// Parse a track block; any malformed line fails the whole block
    fn decode(&self, text: &str) -> Result<Track>;

    /// Render a track block, one line per sample, each ending in `\n`
    fn encode(&self, track: &Track, format: NumericFormat) -> Result<String>;
}

/// Non-blank lines of a block with their one-based line numbers
pub(crate) fn block_lines(text: &str) -> impl Iterator<Item = (usize, &str)> {
    text.split('\n')
        .enumerate()
        .map(|(i, line)| (i + 1, line.strip_suffix('\r').unwrap_or(line)))
        .filter(|(_, line)| !line.trim().is_empty())
}

/// Split a line into exactly `N` top-level fields
pub(crate) fn split_fields<const N: usize>(line_no: usize, line: &str) -> Result<[&str; N]> {
    let mut fields = [""; N];
    let mut count = 0;

    for field in line.split(FIELD_DELIMITER) {
        if count == N {
            return Err(ReplayError::line(
                line_no,
                format!("expected {N} fields, found more"),
                line,
            ));
        }
        fields[count] = field;
        count += 1;
    }

    if count != N {
        return Err(ReplayError::line(
            line_no,
            format!("expected {N} fields, found {count}"),
            line,
        ));
    }

    Ok(fields)
}

/// Split a list where every entry is followed by `delimiter`
///
/// The trailing terminator is optional on decode.
pub(crate) fn split_terminated(text: &str, delimiter: char) -> Vec<&str> {
    let mut parts: Vec<&str> = text.split(delimiter).collect();
    if parts.last().is_some_and(|last| last.is_empty()) {
        parts.pop();
    }
    parts
}

/// Fail if `value` contains any of `reserved`
pub(crate) fn ensure_unreserved(field: &'static str, value: &str, reserved: &[char]) -> Result<()> {
    match value.chars().find(|c| reserved.contains(c)) {
        Some(delimiter) => Err(ReplayError::ReservedDelimiter {
            field,
            value: value.to_string(),
            delimiter,
        }),
        None => Ok(()),
    }
}

/// Lookup from track kind to the codec that handles it
///
/// Built once at startup; decoding resolves a kind name from the log
/// through this table instead of constructing types by name.
pub struct CodecRegistry {
    codecs: IndexMap<TrackKind, Box<dyn TrackCodec>>,
}

impl CodecRegistry {
    /// Create a registry with no codecs
    pub fn empty() -> Self {
        Self {
            codecs: IndexMap::new(),
        }
    }

    /// Create a registry with the rotation and skeletal codecs
    pub fn with_defaults() -> Self {
        let mut registry = Self::empty();
        registry.register(Box::new(RotationCodec));
        registry.register(Box::new(SkeletalCodec));
        registry
    }

    /// Register a codec, returning the one it replaced
    pub fn register(&mut self, codec: Box<dyn TrackCodec>) -> Option<Box<dyn TrackCodec>> {
        self.codecs.insert(codec.kind(), codec)
    }

    /// Get the codec for a kind
    pub fn codec(&self, kind: TrackKind) -> Result<&dyn TrackCodec> {
        self.codecs
            .get(&kind)
            .map(|codec| codec.as_ref())
            .ok_or_else(|| ReplayError::UnknownTrackKind(kind.name().to_string()))
    }

    /// Resolve a kind name as written in a log
    pub fn resolve(&self, name: &str) -> Result<&dyn TrackCodec> {
        let kind: TrackKind = name.parse()?;
        self.codec(kind)
    }

    /// Decode a block for the named kind
    pub fn decode(&self, kind_name: &str, text: &str) -> Result<Track> {
        self.resolve(kind_name)?.decode(text)
    }

    /// Encode a track with the codec for its kind
    pub fn encode(&self, track: &Track, format: NumericFormat) -> Result<String> {
        self.codec(track.kind())?.encode(track, format)
    }
}

impl Default for CodecRegistry {
    fn default() -> Self {
        Self::with_defaults()
    }
}

impl std::fmt::Debug for CodecRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_list().entries(self.codecs.keys()).finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_block_lines_skip_blanks() {
        let lines: Vec<_> = block_lines("a\r\n\n  \nb\n").collect();
        assert_eq!(lines, vec![(1, "a"), (4, "b")]);
    }

    #[test]
    fn test_split_fields_arity() {
        assert_eq!(split_fields::<2>(1, "1~x").unwrap(), ["1", "x"]);
        assert!(matches!(
            split_fields::<2>(3, "1~x~y"),
            Err(ReplayError::MalformedLine { line: 3, .. })
        ));
        assert!(split_fields::<3>(1, "1~x").is_err());
    }

    #[test]
    fn test_split_terminated() {
        assert_eq!(split_terminated("a,b,", ','), vec!["a", "b"]);
        assert_eq!(split_terminated("a,b", ','), vec!["a", "b"]);
        assert!(split_terminated("", ',').is_empty());
        assert_eq!(split_terminated("`", '`'), vec![""]);
    }

    #[test]
    fn test_registry_resolution() {
        let registry = CodecRegistry::with_defaults();
        assert_eq!(registry.resolve("Rotation").unwrap().kind(), TrackKind::Rotation);
        assert_eq!(registry.resolve("Skeletal").unwrap().kind(), TrackKind::Skeletal);
        assert!(matches!(
            registry.resolve("Scale"),
            Err(ReplayError::UnknownTrackKind(_))
        ));

        let empty = CodecRegistry::empty();
        assert!(matches!(
            empty.resolve("Rotation"),
            Err(ReplayError::UnknownTrackKind(_))
        ));
    }

    #[test]
    fn test_registry_encode_uses_track_kind() {
        let registry = CodecRegistry::default();
        let track = registry.decode("Rotation", "0.5~0,0,0,1\n").unwrap();
        let text = registry.encode(&track, NumericFormat::Fixed(1)).unwrap();
        assert_eq!(text, "0.5~0.0,0.0,0.0,1.0\n");
    }
}
