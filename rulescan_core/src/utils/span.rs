//! Document location tracking for the scanning engine
//!
//! Positions identify a point in a document as (line index, byte offset
//! inside that line). The scanner works on one line at a time, so regions
//! handed to it are expected to lie on a single line; the types themselves
//! do not forbid multi-line regions because partitioning consumers span
//! lines.

use serde::{Deserialize, Serialize};
use std::fmt;

/// A position in a document: line index plus UTF-8 byte offset in that line.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default, Serialize, Deserialize,
)]
pub struct Position {
    /// Line index (0-based)
    pub line: usize,
    /// Byte offset within the line (0-based)
    pub offset: usize,
}

impl Position {
    /// Create a new position
    pub fn new(line: usize, offset: usize) -> Self {
        Self { line, offset }
    }

    /// The start of the document (line 0, offset 0)
    pub fn zero() -> Self {
        Self { line: 0, offset: 0 }
    }

    /// A copy of this position moved `n` bytes to the right on the same line
    pub fn advanced(self, n: usize) -> Self {
        Self {
            line: self.line,
            offset: self.offset + n,
        }
    }
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.line, self.offset)
    }
}

/// A half-open region of document text from `start` (inclusive) to `end`
/// (exclusive).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct Region {
    pub start: Position,
    pub end: Position,
}

impl Region {
    /// Create a new region
    pub fn new(start: Position, end: Position) -> Self {
        debug_assert!(start <= end, "Region start must not be after end");
        Self { start, end }
    }

    /// Create a region covering `[start, end)` on a single line
    pub fn on_line(line: usize, start: usize, end: usize) -> Self {
        Self::new(Position::new(line, start), Position::new(line, end))
    }

    /// Get the start position of this region
    pub fn start(&self) -> Position {
        self.start
    }

    /// Get the end position of this region
    pub fn end(&self) -> Position {
        self.end
    }

    /// Byte length of a single-line region
    pub fn len(&self) -> usize {
        debug_assert_eq!(self.start.line, self.end.line);
        self.end.offset - self.start.offset
    }

    /// Check if this region is empty
    pub fn is_empty(&self) -> bool {
        self.start == self.end
    }

    /// True if the region starts and ends on the same line
    pub fn is_single_line(&self) -> bool {
        self.start.line == self.end.line
    }

    /// Check if this region contains a position
    pub fn contains(&self, pos: Position) -> bool {
        pos >= self.start && pos < self.end
    }

    /// Get the source text for a single-line region from its line
    pub fn slice<'a>(&self, line: &'a str) -> &'a str {
        &line[self.start.offset..self.end.offset]
    }
}

impl fmt::Display for Region {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_single_line() {
            write!(
                f,
                "{}:{}-{}",
                self.start.line, self.start.offset, self.end.offset
            )
        } else {
            write!(f, "{}-{}", self.start, self.end)
        }
    }
}
