//! `ConfigError` (§7 taxonomy): the only local error type this crate
//! defines — command bodies otherwise return `anyhow::Result` per §6's
//! "`execute` returning `anyhow::Result<i32>`" convention, so exact error
//! shape is less important there than at the edges of the command surface.

use glyph_diagnostics::{Diagnostic, Severity};
use glyph_syntax::Span;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read `{path}`: {message}")]
    Read { path: String, message: String },

    #[error("failed to parse `{path}` as TOML: {message}")]
    Parse { path: String, message: String },

    #[error("invalid value for `{key}`: {message}")]
    InvalidValue { key: String, message: String },
}

impl Diagnostic for ConfigError {
    fn severity(&self) -> Severity {
        Severity::Medium
    }

    fn primary_span(&self) -> Option<Span> {
        None
    }

    fn message(&self) -> String {
        self.to_string()
    }

    fn explanation(&self) -> String {
        "configuration is layered: built-in defaults, then glyph.toml, then GLYPH_ environment variables, then CLI flags".to_string()
    }

    fn suggestions(&self) -> Vec<String> {
        vec!["check glyph.toml and any GLYPH_-prefixed environment variables".to_string()]
    }

    fn cwe(&self) -> Option<String> {
        None
    }
}
