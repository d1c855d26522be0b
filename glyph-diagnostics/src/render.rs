//! Two renderers, both driven purely through the [`Diagnostic`] trait
//! object (§4.8 ADDED): plain text with ±1 line of source context, and a
//! JSON record preserving every field.

use crate::diagnostic::Diagnostic;
use crate::redact::redact_message;
use serde_json::json;

/// Plain-text rendering: message, up to three suggestions, and a two-line
/// source-context block with a `^` column marker, matching the contract in
/// §4.8 ("source-line context (±1 line) and a column marker").
pub fn render_text(diagnostic: &dyn Diagnostic, source: &str) -> String {
    let mut out = String::new();
    let message = redact_message(&diagnostic.message());
    out.push_str(&format!("error: {}\n", message));

    if let Some(span) = diagnostic.primary_span() {
        let lines: Vec<&str> = source.lines().collect();
        let idx = (span.line as usize).saturating_sub(1);
        if idx > 0 {
            if let Some(prev) = lines.get(idx - 1) {
                out.push_str(&format!("  {:>4} | {}\n", span.line - 1, prev));
            }
        }
        if let Some(line) = lines.get(idx) {
            out.push_str(&format!("  {:>4} | {}\n", span.line, line));
            out.push_str(&format!("       | {}^\n", " ".repeat(span.column.saturating_sub(1) as usize)));
        }
        if let Some(next) = lines.get(idx + 1) {
            out.push_str(&format!("  {:>4} | {}\n", span.line + 1, next));
        }
    }

    out.push_str(&format!("  = note: {}\n", diagnostic.explanation()));
    if let Some(cwe) = diagnostic.cwe() {
        out.push_str(&format!("  = cwe: {}\n", cwe));
    }
    for suggestion in diagnostic.suggestions().iter().take(3) {
        out.push_str(&format!("  = help: {}\n", suggestion));
    }
    out
}

/// JSON rendering preserving every field, independent of the Issue wire
/// schema (this renderer accepts any `Diagnostic`, not just `Issue`).
pub fn render_json(diagnostic: &dyn Diagnostic) -> serde_json::Value {
    json!({
        "severity": severity_str(diagnostic.severity()),
        "message": redact_message(&diagnostic.message()),
        "explanation": diagnostic.explanation(),
        "span": diagnostic.primary_span(),
        "suggestions": diagnostic.suggestions().into_iter().take(3).collect::<Vec<_>>(),
        "cwe": diagnostic.cwe(),
    })
}

fn severity_str(severity: crate::issue::Severity) -> &'static str {
    match severity {
        crate::issue::Severity::Critical => "critical",
        crate::issue::Severity::High => "high",
        crate::issue::Severity::Medium => "medium",
        crate::issue::Severity::Low => "low",
        crate::issue::Severity::Info => "info",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::issue::{Category, Issue, Severity};
    use glyph_syntax::Span;

    #[test]
    fn text_includes_column_marker() {
        let issue = Issue::new(Severity::Critical, Category::CodeInjection, "call to eval")
            .with_span(Span::new(0, 4, 2, 5, 2, 9));
        let source = "x = 1\ny = eval(z)\nw = 2\n";
        let rendered = render_text(&issue, source);
        assert!(rendered.contains("y = eval(z)"));
        assert!(rendered.contains('^'));
    }

    #[test]
    fn json_preserves_severity_and_cwe() {
        let issue = Issue::new(Severity::High, Category::TaintedFlow, "tainted").with_cwe("CWE-20");
        let value = render_json(&issue);
        assert_eq!(value["severity"], "high");
        assert_eq!(value["cwe"], "CWE-20");
    }

    #[test]
    fn text_redacts_credential_like_message() {
        let issue = Issue::new(Severity::Low, Category::HardcodedCredential, "found secret aK9$mQ2x!z7Lp inline");
        let rendered = render_text(&issue, "");
        assert!(rendered.contains("«redacted»"));
    }
}
