//! Source positions and spans for resource scripts

use serde::Serialize;
use std::cmp::Ordering;
use std::fmt;

/// A point in a decoded source file.
///
/// `offset` is a byte offset into the decoded text; `line` and `column` are
/// 1-based. Ordering only looks at `offset`, so positions from different files
/// must not be compared.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize)]
pub struct Position {
    pub offset: usize,
    pub line: usize,
    pub column: usize,
}

impl Position {
    pub fn start() -> Self {
        Position {
            offset: 0,
            line: 1,
            column: 1,
        }
    }
}

impl PartialOrd for Position {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Position {
    fn cmp(&self, other: &Self) -> Ordering {
        self.offset.cmp(&other.offset)
    }
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.line, self.column)
    }
}

/// Half-open range `[start, end)` between two positions of the same file
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub struct Span {
    pub start: Position,
    pub end: Position,
}

impl Span {
    pub fn new(start: Position, end: Position) -> Self {
        debug_assert!(start <= end, "span start after end");
        Span { start, end }
    }

    pub fn is_empty(&self) -> bool {
        self.start.offset == self.end.offset
    }

    pub fn len(&self) -> usize {
        self.end.offset - self.start.offset
    }

    pub fn contains(&self, offset: usize) -> bool {
        self.start.offset <= offset && offset < self.end.offset
    }

    /// Smallest span covering both `self` and `other`
    pub fn merge(&self, other: &Span) -> Span {
        Span {
            start: self.start.min(other.start),
            end: self.end.max(other.end),
        }
    }

    fn touches(&self, other: &Span) -> bool {
        self.start.offset <= other.end.offset && other.start.offset <= self.end.offset
    }
}

impl fmt::Display for Span {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-{}", self.start, self.end)
    }
}

/// Sort spans and coalesce the ones that overlap or touch.
///
/// Highlighters hand us identifier and text spans in arbitrary order; the
/// result is sorted and non-overlapping.
pub fn merge_ranges(mut spans: Vec<Span>) -> Vec<Span> {
    spans.sort_by_key(|s| (s.start.offset, s.end.offset));

    let mut merged: Vec<Span> = Vec::with_capacity(spans.len());
    for span in spans {
        match merged.last_mut() {
            Some(last) if last.touches(&span) => *last = last.merge(&span),
            _ => merged.push(span),
        }
    }
    merged
}
