//! Host and parser coordinate types.
//!
//! Editors report 0-based lines; SWC's source map reports 1-based lines. Both
//! use 0-based columns counted in characters. Keeping the two as distinct types
//! means a host position can never be compared with a node position by accident.

use serde::{Deserialize, Serialize};
use std::cmp::Ordering;

/// Position in host (editor) coordinates: 0-based line and character.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct HostPosition {
    pub line: u32,
    pub character: u32,
}

impl HostPosition {
    pub fn new(line: u32, character: u32) -> Self {
        Self { line, character }
    }
}

/// Position in parser coordinates: 1-based line, 0-based column.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ParserPosition {
    pub line: u32,
    pub column: u32,
}

impl ParserPosition {
    pub fn new(line: u32, column: u32) -> Self {
        Self { line, column }
    }

    /// Whether a node ending here fits inside a selection ending at `limit`.
    ///
    /// Lines compare strictly; on the same line the node may overshoot the
    /// limit by one column, which absorbs the statement terminator the
    /// normalizer strips from the selection.
    pub fn ends_within(&self, limit: &ParserPosition) -> bool {
        match self.line.cmp(&limit.line) {
            Ordering::Less => true,
            Ordering::Equal => self.column <= limit.column + 1,
            Ordering::Greater => false,
        }
    }
}

/// Start/end pair in parser coordinates, as recorded for a syntax node.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ParserRange {
    pub start: ParserPosition,
    pub end: ParserPosition,
}

/// Location in source code reported with errors (0-based line and column)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SourceLocation {
    pub line: usize,
    pub column: usize,
}
