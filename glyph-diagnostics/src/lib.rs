//! Structured diagnostics shared across the glyph toolchain (C9).
//!
//! Every crate that can produce a user-visible error implements
//! [`Diagnostic`] for its own local error type; this crate only owns the
//! trait, the `Issue` wire shape the analyzer and codegen emit, the
//! `SecurityError` taxonomy, and the two renderers that work against the
//! trait object.

pub mod diagnostic;
pub mod entropy;
pub mod error;
pub mod issue;
pub mod redact;
pub mod render;

pub use diagnostic::Diagnostic;
pub use error::SecurityError;
pub use issue::{Category, Issue, Severity};
pub use render::{render_json, render_text};
