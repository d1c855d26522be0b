//! `SandboxError` (§7 taxonomy). Note the distinction from [`crate::result::Status`]:
//! a run that completes (even unsuccessfully, inside the child) reports a
//! `Status` in its `ExecutionResult`; a `SandboxError` is reserved for
//! failures in the *parent's* own machinery — spawning the child,
//! (de)serializing the protocol, or reading its pipes — which never reach
//! the child at all.

use glyph_diagnostics::{Diagnostic, Severity};
use glyph_syntax::Span;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum SandboxError {
    #[error("failed to spawn sandbox child process: {message}")]
    Spawn { message: String },

    #[error("failed to serialize sandbox options: {message}")]
    Protocol { message: String },

    #[error("sandbox child process exited without producing a result: {message}")]
    ProcessFailed { message: String },
}

impl Diagnostic for SandboxError {
    fn severity(&self) -> Severity {
        Severity::High
    }

    fn primary_span(&self) -> Option<Span> {
        None
    }

    fn message(&self) -> String {
        self.to_string()
    }

    fn explanation(&self) -> String {
        "the sandbox's own process management failed before the generated code could run".to_string()
    }

    fn suggestions(&self) -> Vec<String> {
        vec!["check that the configured interpreter is installed and on PATH".to_string()]
    }

    fn cwe(&self) -> Option<String> {
        None
    }
}
