//! Error taxonomy (§7): `SecurityError` and its subkinds. Other crates
//! define their own local error enums (`CodegenError`, `SandboxError`,
//! `ConfigError`) and implement [`crate::diagnostic::Diagnostic`] for them
//! directly rather than folding into one master enum here — that would
//! force every leaf crate to depend on every other, which the workspace's
//! acyclic layering forbids.

use crate::diagnostic::Diagnostic;
use crate::issue::{Category, Severity};
use glyph_syntax::Span;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// The five subkinds named in §7, each carrying enough context to render a
/// full [`Diagnostic`] without consulting the AST again.
#[derive(Debug, Clone, PartialEq, Error, Serialize, Deserialize)]
pub enum SecurityError {
    #[error("code injection: call to {callee} is never permitted")]
    CodeInjection { callee: String, span: Span },

    #[error("unsafe attribute: `{type_or_class}.{attribute}` is not in the safe-attribute registry")]
    UnsafeAttribute { type_or_class: String, attribute: String, span: Span },

    #[error("reflection abuse: `{attribute}` is a reserved reflective name")]
    ReflectionAbuse { attribute: String, span: Span },

    #[error("tainted flow: data from {source} reaches sink {sink} without sanitization")]
    TaintedFlow { source: String, sink: String, path: Vec<String>, span: Span },

    #[error("capability denied: `{op}` on `{resource}` has no matching token in the active context")]
    CapabilityDenied { op: String, resource: String, span: Option<Span> },
}

impl SecurityError {
    pub fn category(&self) -> Category {
        match self {
            SecurityError::CodeInjection { .. } => Category::CodeInjection,
            SecurityError::UnsafeAttribute { .. } => Category::UnsafeAttribute,
            SecurityError::ReflectionAbuse { .. } => Category::ReflectionAbuse,
            SecurityError::TaintedFlow { .. } => Category::TaintedFlow,
            SecurityError::CapabilityDenied { .. } => Category::CapabilityDenied,
        }
    }

    /// CWE tags match the malicious-corpus categories named in §8.
    pub fn cwe_tag(&self) -> &'static str {
        match self {
            SecurityError::CodeInjection { .. } => "CWE-94",
            SecurityError::UnsafeAttribute { .. } => "CWE-470",
            SecurityError::ReflectionAbuse { .. } => "CWE-470",
            SecurityError::TaintedFlow { .. } => "CWE-20",
            SecurityError::CapabilityDenied { .. } => "CWE-862",
        }
    }

    /// Renders as the `Issue` shape the analyzer and codegen accumulate.
    pub fn to_issue(&self) -> crate::issue::Issue {
        let mut issue = crate::issue::Issue::new(self.severity(), self.category(), self.to_string())
            .with_cwe(self.cwe_tag());
        if let Some(span) = self.primary_span() {
            issue = issue.with_span(span);
        }
        if let SecurityError::TaintedFlow { path, .. } = self {
            issue = issue.with_context("path", path.join(" -> "));
        }
        issue
    }
}

impl Diagnostic for SecurityError {
    fn severity(&self) -> Severity {
        match self {
            SecurityError::CodeInjection { .. }
            | SecurityError::UnsafeAttribute { .. }
            | SecurityError::ReflectionAbuse { .. } => Severity::Critical,
            SecurityError::TaintedFlow { .. } => Severity::High,
            SecurityError::CapabilityDenied { .. } => Severity::High,
        }
    }

    fn primary_span(&self) -> Option<Span> {
        match self {
            SecurityError::CodeInjection { span, .. }
            | SecurityError::UnsafeAttribute { span, .. }
            | SecurityError::ReflectionAbuse { span, .. }
            | SecurityError::TaintedFlow { span, .. } => Some(*span),
            SecurityError::CapabilityDenied { span, .. } => *span,
        }
    }

    fn message(&self) -> String {
        self.to_string()
    }

    fn explanation(&self) -> String {
        match self {
            SecurityError::CodeInjection { .. } => {
                "calls to dynamic code evaluation are rejected regardless of how the callee name is constructed".to_string()
            }
            SecurityError::UnsafeAttribute { .. } => {
                "the safe-attribute registry is the only source of truth for which attributes codegen may emit".to_string()
            }
            SecurityError::ReflectionAbuse { .. } => {
                "dunder and reflective names can escape the sandboxed object model".to_string()
            }
            SecurityError::TaintedFlow { .. } => {
                "data originating outside the program reached a security-sensitive sink without passing through a sanitizing bridge".to_string()
            }
            SecurityError::CapabilityDenied { .. } => {
                "no token in the active capability context authorizes this operation on this resource".to_string()
            }
        }
    }

    fn suggestions(&self) -> Vec<String> {
        match self {
            SecurityError::CodeInjection { .. } => {
                vec!["replace dynamic evaluation with an explicit function call".to_string()]
            }
            SecurityError::UnsafeAttribute { type_or_class, attribute, .. } => {
                vec![format!("register `{}` on `{}` if this access is intentional", attribute, type_or_class)]
            }
            SecurityError::ReflectionAbuse { .. } => {
                vec!["access the value through a registered method instead".to_string()]
            }
            SecurityError::TaintedFlow { .. } => {
                vec!["sanitize the value before it reaches the sink, or route it through a bridge marked sanitizing".to_string()]
            }
            SecurityError::CapabilityDenied { op, resource, .. } => {
                vec![format!("declare a capability allowing `{}` on a pattern matching `{}`", op, resource)]
            }
        }
    }

    fn cwe(&self) -> Option<String> {
        Some(self.cwe_tag().to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn code_injection_is_critical_with_cwe() {
        let err = SecurityError::CodeInjection { callee: "eval".into(), span: Span::dummy() };
        assert_eq!(err.severity(), Severity::Critical);
        assert_eq!(err.cwe(), Some("CWE-94".to_string()));
    }

    #[test]
    fn to_issue_carries_taint_path_in_context() {
        let err = SecurityError::TaintedFlow {
            source: "input".into(),
            sink: "fs.write".into(),
            path: vec!["input".into(), "x".into(), "fs.write".into()],
            span: Span::dummy(),
        };
        let issue = err.to_issue();
        assert_eq!(issue.context.get("path").map(String::as_str), Some("input -> x -> fs.write"));
    }
}
