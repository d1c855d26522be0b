//! `CapabilityError`, a subtype of `MLSecurityError` per §4.4's decorator
//! protocol: a bridge method marked `requires(cap_type, op, resource_fn)`
//! raises this when [`crate::manager::CapabilityManager::check`] fails.

use glyph_diagnostics::{Diagnostic, Severity};
use glyph_syntax::Span;
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("capability denied: `{op}` on `{resource}` has no matching token in the active context")]
pub struct CapabilityError {
    pub op: String,
    pub resource: String,
}

impl Diagnostic for CapabilityError {
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
        "no token in the active capability context authorizes this operation on this resource".to_string()
    }

    fn suggestions(&self) -> Vec<String> {
        vec![format!("declare a capability allowing `{}` on a pattern matching `{}`", self.op, self.resource)]
    }

    fn cwe(&self) -> Option<String> {
        Some("CWE-862".to_string())
    }
}
