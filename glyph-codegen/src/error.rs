//! `CodegenError` (§7): codegen may itself emit a security issue (attribute
//! rejection) and aborts on the first one — no partial output is committed.

use glyph_diagnostics::{Diagnostic, Severity};
use glyph_syntax::Span;
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum CodegenError {
    #[error("unsafe attribute: `{type_or_class}.{attribute}` is not in the safe-attribute registry")]
    UnsafeAttribute { type_or_class: String, attribute: String, span: Span },

    #[error("invalid identifier `{name}`: {reason}")]
    InvalidIdentifier { name: String, reason: String, span: Span },

    #[error("invalid assignment target: only identifiers, indexing, and attribute access may appear on the left of `=`")]
    InvalidAssignmentTarget { span: Span },
}

impl Diagnostic for CodegenError {
    fn severity(&self) -> Severity {
        Severity::Critical
    }

    fn primary_span(&self) -> Option<Span> {
        match self {
            CodegenError::UnsafeAttribute { span, .. } => Some(*span),
            CodegenError::InvalidIdentifier { span, .. } => Some(*span),
            CodegenError::InvalidAssignmentTarget { span } => Some(*span),
        }
    }

    fn message(&self) -> String {
        self.to_string()
    }

    fn explanation(&self) -> String {
        match self {
            CodegenError::UnsafeAttribute { .. } => {
                "the safe-attribute registry is the only source of truth for which attributes codegen may emit".to_string()
            }
            CodegenError::InvalidIdentifier { .. } => {
                "capability names and user identifiers are validated against the ML identifier grammar before emission".to_string()
            }
            CodegenError::InvalidAssignmentTarget { .. } => {
                "an arbitrary expression cannot be the target of an assignment".to_string()
            }
        }
    }

    fn suggestions(&self) -> Vec<String> {
        match self {
            CodegenError::UnsafeAttribute { type_or_class, attribute, .. } => {
                vec![format!("register `{}` on `{}` if this access is intentional", attribute, type_or_class)]
            }
            CodegenError::InvalidIdentifier { name, .. } => {
                vec![format!("rename `{}` to a valid, non-reserved identifier", name)]
            }
            CodegenError::InvalidAssignmentTarget { .. } => {
                vec!["assign to a variable, an index expression, or an attribute instead".to_string()]
            }
        }
    }

    fn cwe(&self) -> Option<String> {
        match self {
            CodegenError::UnsafeAttribute { .. } => Some("CWE-470".to_string()),
            CodegenError::InvalidIdentifier { .. } | CodegenError::InvalidAssignmentTarget { .. } => None,
        }
    }
}
