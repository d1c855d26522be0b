//! Source spans shared by every AST node, token, and diagnostic.

use serde::{Deserialize, Serialize};
use std::fmt;

/// A half-open range over source text, in both byte offsets and 1-based
/// line/column pairs. Byte offsets let diagnostics slice the original text;
/// line/column pairs are what users see.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Span {
    pub start: usize,
    pub end: usize,
    pub line: u32,
    pub column: u32,
    pub end_line: u32,
    pub end_column: u32,
}

impl Span {
    pub fn new(start: usize, end: usize, line: u32, column: u32, end_line: u32, end_column: u32) -> Self {
        Self { start, end, line, column, end_line, end_column }
    }

    /// Zero-width span at the start of a source (used for synthetic nodes
    /// and as a safe default before real spans are known).
    pub fn dummy() -> Self {
        Self { start: 0, end: 0, line: 1, column: 1, end_line: 1, end_column: 1 }
    }

    /// Smallest span that encloses both `self` and `other`.
    pub fn to(&self, other: Span) -> Span {
        Span {
            start: self.start.min(other.start),
            end: self.end.max(other.end),
            line: self.line,
            column: self.column,
            end_line: other.end_line,
            end_column: other.end_column,
        }
    }

    /// Whether `self` lies entirely within `parent` (per the AST invariant
    /// that every node's span lies within its parent's span).
    pub fn within(&self, parent: &Span) -> bool {
        self.start >= parent.start && self.end <= parent.end
    }
}

impl Default for Span {
    fn default() -> Self {
        Self::dummy()
    }
}

impl fmt::Display for Span {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.line, self.column)
    }
}

/// An optional source file name, carried alongside a span wherever the
/// data model names one (programs parsed from a path vs. from a string).
pub type SourceFile = Option<String>;
