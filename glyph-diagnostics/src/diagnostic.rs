//! The `Diagnostic` trait every crate-local, user-facing error implements
//! (§4.8 ADDED). Renderers work only against this trait object, so a new
//! error-producing crate opts into both the plain-text and JSON renderers
//! without the formatter changing.

use glyph_syntax::Span;

pub trait Diagnostic {
    fn severity(&self) -> crate::issue::Severity;
    fn primary_span(&self) -> Option<Span>;
    fn message(&self) -> String;
    fn explanation(&self) -> String;
    /// At most three entries; renderers do not enforce the cap themselves.
    fn suggestions(&self) -> Vec<String>;
    fn cwe(&self) -> Option<String>;
}

impl Diagnostic for crate::issue::Issue {
    fn severity(&self) -> crate::issue::Severity {
        self.severity
    }

    fn primary_span(&self) -> Option<Span> {
        self.span
    }

    fn message(&self) -> String {
        self.message.clone()
    }

    fn explanation(&self) -> String {
        format!("category: {}", self.category)
    }

    fn suggestions(&self) -> Vec<String> {
        self.suggestions.clone()
    }

    fn cwe(&self) -> Option<String> {
        self.cwe.clone()
    }
}

impl Diagnostic for glyph_syntax::MLSyntaxError {
    fn severity(&self) -> crate::issue::Severity {
        crate::issue::Severity::High
    }

    fn primary_span(&self) -> Option<Span> {
        Some(self.span)
    }

    fn message(&self) -> String {
        self.message.clone()
    }

    fn explanation(&self) -> String {
        "the parser could not make sense of the source at this point".to_string()
    }

    fn suggestions(&self) -> Vec<String> {
        if self.expected.is_empty() {
            Vec::new()
        } else {
            vec![format!("expected one of: {}", self.expected.join(", "))]
        }
    }

    fn cwe(&self) -> Option<String> {
        None
    }
}
