// SPDX-License-Identifier: MIT OR Apache-2.0
//! Inputs to loading: file reading and outer log parsing.
//!
//! The codecs only see isolated track blocks. Splitting a log file into
//! objects and blocks is the job of a [`LogParser`] supplied by the host.

use crate::error::{ReplayError, Result};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// One object as found in a log, before its tracks are decoded
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ParsedObject {
    /// Object name
    pub name: String,
    /// Raw track blocks keyed by kind name, in log order
    pub tracks: IndexMap<String, String>,
}

impl ParsedObject {
    /// Create a parsed object with no tracks
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            tracks: IndexMap::new(),
        }
    }

    /// Add a raw track block
    pub fn with_track(mut self, kind: impl Into<String>, text: impl Into<String>) -> Self {
        self.tracks.insert(kind.into(), text.into());
        self
    }
}

/// Reads a whole log file as text
pub trait FileReader {
    /// Read the file at `path`
    fn read_file(&self, path: &Path) -> Result<String>;
}

/// [`FileReader`] backed by the local filesystem
#[derive(Debug, Clone, Copy, Default)]
pub struct FsReader;

impl FileReader for FsReader {
    fn read_file(&self, path: &Path) -> Result<String> {
        std::fs::read_to_string(path).map_err(|source| ReplayError::Io {
            path: path.to_path_buf(),
            source,
        })
    }
}

/// Splits a log file into per-object track blocks
pub trait LogParser {
    /// Parse the full text of a log file
    fn parse_log(&self, text: &str) -> Result<Vec<ParsedObject>>;
}

/// Read and parse a log file in one step
pub fn read_log(
    reader: &dyn FileReader,
    parser: &dyn LogParser,
    path: &Path,
) -> Result<Vec<ParsedObject>> {
    let text = reader.read_file(path)?;
    let objects = parser.parse_log(&text)?;
    tracing::debug!("Parsed {} objects from {:?}", objects.len(), path);
    Ok(objects)
}
