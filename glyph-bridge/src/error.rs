//! Errors raised from inside a bridge call, surfaced to generated code as
//! an `MLError` (the same mechanism `Throw` lowers to, §4.5).

use glyph_capability::CapabilityError;
use glyph_diagnostics::{Diagnostic, Severity};
use glyph_syntax::Span;
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum BridgeError {
    #[error(transparent)]
    Capability(#[from] CapabilityError),

    #[error("invalid argument to `{function}`: {reason}")]
    InvalidArgument { function: String, reason: String },

    #[error("{operation} failed: {message}")]
    Io { operation: String, message: String },
}

impl Diagnostic for BridgeError {
    fn severity(&self) -> Severity {
        match self {
            BridgeError::Capability(e) => e.severity(),
            BridgeError::InvalidArgument { .. } => Severity::Medium,
            BridgeError::Io { .. } => Severity::Medium,
        }
    }

    fn primary_span(&self) -> Option<Span> {
        None
    }

    fn message(&self) -> String {
        self.to_string()
    }

    fn explanation(&self) -> String {
        match self {
            BridgeError::Capability(e) => e.explanation(),
            BridgeError::InvalidArgument { .. } => "the bridge function rejected its arguments before attempting the operation".to_string(),
            BridgeError::Io { .. } => "the underlying host operation failed after capability checks passed".to_string(),
        }
    }

    fn suggestions(&self) -> Vec<String> {
        match self {
            BridgeError::Capability(e) => e.suggestions(),
            BridgeError::InvalidArgument { function, .. } => vec![format!("check the arguments passed to `{}`", function)],
            BridgeError::Io { .. } => vec!["check that the resource exists and is accessible".to_string()],
        }
    }

    fn cwe(&self) -> Option<String> {
        match self {
            BridgeError::Capability(e) => e.cwe(),
            BridgeError::InvalidArgument { .. } => None,
            BridgeError::Io { .. } => None,
        }
    }
}
