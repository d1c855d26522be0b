//! The single structured error the front end can produce.

use crate::span::Span;
use serde::{Deserialize, Serialize};
use std::fmt;

/// A syntax error: the first failing token's span, what was expected, and
/// a line of source context. `parse` never returns more than one of these —
/// recovery and multi-error reporting are out of scope for the front end.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MLSyntaxError {
    pub message: String,
    pub span: Span,
    pub expected: Vec<String>,
    pub source_line: Option<String>,
}

impl MLSyntaxError {
    pub fn new(message: impl Into<String>, span: Span, expected: Vec<String>, source: &str) -> Self {
        let source_line = source.lines().nth((span.line as usize).saturating_sub(1)).map(|s| s.to_string());
        Self {
            message: message.into(),
            span,
            expected,
            source_line,
        }
    }
}

impl fmt::Display for MLSyntaxError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "syntax error at {}: {}", self.span, self.message)?;
        if !self.expected.is_empty() {
            write!(f, " (expected one of: {})", self.expected.join(", "))?;
        }
        if let Some(line) = &self.source_line {
            write!(f, "\n  {} | {}", self.span.line, line)?;
            write!(f, "\n  {}   {}^", " ".repeat(self.span.line.to_string().len()), " ".repeat(self.span.column.saturating_sub(1) as usize))?;
        }
        Ok(())
    }
}

impl std::error::Error for MLSyntaxError {}
