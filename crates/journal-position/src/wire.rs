//! Editor-protocol position and range types.

use serde::{Deserialize, Serialize};

/// A protocol position: 0-based line, UTF-16 code-unit column.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize)]
pub struct WirePosition {
    pub line: u32,
    pub character: u32,
}

impl WirePosition {
    pub fn new(line: u32, character: u32) -> Self {
        Self { line, character }
    }
}

/// A protocol range, start-inclusive and end-exclusive.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct WireRange {
    pub start: WirePosition,
    pub end: WirePosition,
}

impl WireRange {
    pub fn new(start: WirePosition, end: WirePosition) -> Self {
        Self { start, end }
    }

    pub fn empty(pos: WirePosition) -> Self {
        Self { start: pos, end: pos }
    }
}
