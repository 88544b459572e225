// SPDX-License-Identifier: MIT OR Apache-2.0
//! Error types for decoding, building and playing back track logs.

use std::path::PathBuf;

/// Result alias used throughout the crate
pub type Result<T> = std::result::Result<T, ReplayError>;

/// Errors produced by the replay core
#[derive(Debug, thiserror::Error)]
pub enum ReplayError {
    /// A numeric field did not parse
    #[error("Malformed {expected} value: {text:?}")]
    MalformedPrimitive {
        /// What the field was expected to hold
        expected: &'static str,
        /// The offending text
        text: String,
    },

    /// A line had the wrong shape for its track kind
    #[error("Malformed line {line} ({reason}): {text:?}")]
    MalformedLine {
        /// One-based line number within the track block
        line: usize,
        /// What was wrong with it
        reason: String,
        /// The offending line
        text: String,
    },

    /// A track was built or queried with zero samples
    #[error("Track has no samples")]
    EmptyTrack,

    /// A sample's timestamp went backwards
    #[error("Sample {index} at {timestamp} precedes the previous sample at {previous}")]
    UnorderedSamples {
        /// Index of the out-of-order sample
        index: usize,
        /// Its timestamp
        timestamp: f32,
        /// Timestamp of the sample before it
        previous: f32,
    },

    /// A sample's timestamp was NaN or infinite
    #[error("Sample {index} has non-finite timestamp {timestamp}")]
    NonFiniteTimestamp {
        /// Index of the offending sample
        index: usize,
        /// Its timestamp
        timestamp: f32,
    },

    /// An object without tracks was asked for its time range
    #[error("Object '{0}' has no tracks")]
    NoTracks(String),

    /// An object already owns a track of this kind
    #[error("Object '{object}' already has a {kind} track")]
    DuplicateTrackKind {
        /// Object name
        object: String,
        /// Track kind name
        kind: &'static str,
    },

    /// Seek target lies outside the timeline bounds
    #[error("Time {time} is outside the timeline range [{start}, {end}]")]
    OutOfRange {
        /// Requested time
        time: f32,
        /// Timeline start
        start: f32,
        /// Timeline end
        end: f32,
    },

    /// No codec is registered for a track kind name
    #[error("Unknown track kind: {0}")]
    UnknownTrackKind(String),

    /// A codec was handed a track of a different kind
    #[error("Codec for {expected} tracks cannot encode a {actual} track")]
    KindMismatch {
        /// Kind the codec handles
        expected: &'static str,
        /// Kind of the track it was given
        actual: &'static str,
    },

    /// A string to encode contains one of the reserved delimiters
    #[error("{field} {value:?} contains reserved delimiter {delimiter:?}")]
    ReservedDelimiter {
        /// Which field was being encoded
        field: &'static str,
        /// The offending value
        value: String,
        /// The delimiter found in it
        delimiter: char,
    },

    /// A numeric format string was not recognised
    #[error("Invalid numeric format: {0:?}")]
    InvalidFormat(String),

    /// Decoding a track failed while generating an object
    #[error("Failed to load {kind} track of object '{object}': {source}")]
    Track {
        /// Object name
        object: String,
        /// Track kind name as it appeared in the log
        kind: String,
        /// Underlying failure
        #[source]
        source: Box<ReplayError>,
    },

    /// The outer log grouping could not be parsed
    #[error("Log parse error: {0}")]
    LogParse(String),

    /// Reading a log or settings file failed
    #[error("Failed to read {path:?}: {source}")]
    Io {
        /// File path
        path: PathBuf,
        /// Underlying I/O error
        #[source]
        source: std::io::Error,
    },

    /// Settings could not be serialized or deserialized
    #[error("Settings error: {0}")]
    Settings(String),
}

impl ReplayError {
    /// Create a malformed primitive error
    pub fn primitive(expected: &'static str, text: impl Into<String>) -> Self {
        Self::MalformedPrimitive {
            expected,
            text: text.into(),
        }
    }

    /// Create a malformed line error
    pub fn line(line: usize, reason: impl Into<String>, text: impl Into<String>) -> Self {
        Self::MalformedLine {
            line,
            reason: reason.into(),
            text: text.into(),
        }
    }

    /// Wrap a track decode failure with the object and kind it belonged to
    pub fn in_track(self, object: impl Into<String>, kind: impl Into<String>) -> Self {
        Self::Track {
            object: object.into(),
            kind: kind.into(),
            source: Box::new(self),
        }
    }

    /// The innermost error, looking through track context wrappers
    pub fn root_cause(&self) -> &ReplayError {
        match self {
            Self::Track { source, .. } => source.root_cause(),
            other => other,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_root_cause_unwraps_context() {
        let err = ReplayError::EmptyTrack
            .in_track("Cube", "Rotation")
            .in_track("Outer", "Skeletal");
        assert!(matches!(err.root_cause(), ReplayError::EmptyTrack));
        assert!(err.to_string().contains("Outer"));
    }
}
