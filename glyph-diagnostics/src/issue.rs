//! The `Issue` shape emitted by the security analyzer (C4) and by codegen's
//! own attribute-rejection path — the payload half of the wire schema in
//! §6 of the spec; [`crate::diagnostic::Diagnostic`] is the behavioral half.

use glyph_syntax::Span;
use serde::{de::Error as _, Deserialize, Deserializer, Serialize, Serializer};
use std::collections::BTreeMap;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Severity {
    Info,
    Low,
    Medium,
    High,
    Critical,
}

impl Severity {
    /// Strict mode refuses to generate code once any issue reaches this bar.
    pub fn is_hard_failure(self) -> bool {
        matches!(self, Severity::Critical | Severity::High)
    }
}

/// Issue classification. Variants correspond to the detectors in §4.3 and
/// the `SecurityError` subkinds in §7; `Other` covers categories added by a
/// bridge or a future detector without changing the wire schema.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Category {
    CodeInjection,
    UnsafeAttribute,
    ReflectionAbuse,
    TaintedFlow,
    CapabilityDenied,
    HardcodedCredential,
    PathTraversal,
    Other(String),
}

impl std::fmt::Display for Category {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Category::CodeInjection => "code_injection",
            Category::UnsafeAttribute => "unsafe_attribute",
            Category::ReflectionAbuse => "reflection_abuse",
            Category::TaintedFlow => "tainted_flow",
            Category::CapabilityDenied => "capability_denied",
            Category::HardcodedCredential => "hardcoded_credential",
            Category::PathTraversal => "path_traversal",
            Category::Other(name) => name,
        };
        f.write_str(s)
    }
}

impl std::str::FromStr for Category {
    type Err = std::convert::Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(match s {
            "code_injection" => Category::CodeInjection,
            "unsafe_attribute" => Category::UnsafeAttribute,
            "reflection_abuse" => Category::ReflectionAbuse,
            "tainted_flow" => Category::TaintedFlow,
            "capability_denied" => Category::CapabilityDenied,
            "hardcoded_credential" => Category::HardcodedCredential,
            "path_traversal" => Category::PathTraversal,
            other => Category::Other(other.to_string()),
        })
    }
}

// The Issue JSON schema (spec §6) treats `category` as a flat string, so
// Category gets a hand-written impl rather than a derive: the derive would
// externally-tag the `Other` variant as `{"other": "..."}` instead.
impl Serialize for Category {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_string())
    }
}

impl<'de> Deserialize<'de> for Category {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(|_: std::convert::Infallible| D::Error::custom("unreachable"))
    }
}

/// `{severity, category, message, cwe?, span?, context, suggestions}` per
/// the Issue JSON schema in §6. Issues never mutate the AST they describe;
/// an analysis run accumulates a `Vec<Issue>` and hands it to the caller.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Issue {
    pub severity: Severity,
    pub category: Category,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cwe: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub span: Option<Span>,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub context: BTreeMap<String, String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub suggestions: Vec<String>,
}

impl Issue {
    pub fn new(severity: Severity, category: Category, message: impl Into<String>) -> Self {
        Self {
            severity,
            category,
            message: message.into(),
            cwe: None,
            span: None,
            context: BTreeMap::new(),
            suggestions: Vec::new(),
        }
    }

    pub fn with_span(mut self, span: Span) -> Self {
        self.span = Some(span);
        self
    }

    pub fn with_cwe(mut self, cwe: impl Into<String>) -> Self {
        self.cwe = Some(cwe.into());
        self
    }

    pub fn with_context(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.context.insert(key.into(), value.into());
        self
    }

    /// Suggestions beyond the third are dropped — the diagnostic contract
    /// caps user-visible suggestions at three.
    pub fn with_suggestion(mut self, suggestion: impl Into<String>) -> Self {
        if self.suggestions.len() < 3 {
            self.suggestions.push(suggestion.into());
        }
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn severity_hard_failure_bar() {
        assert!(Severity::Critical.is_hard_failure());
        assert!(Severity::High.is_hard_failure());
        assert!(!Severity::Medium.is_hard_failure());
        assert!(!Severity::Info.is_hard_failure());
    }

    #[test]
    fn suggestions_capped_at_three() {
        let issue = Issue::new(Severity::Low, Category::PathTraversal, "x")
            .with_suggestion("a")
            .with_suggestion("b")
            .with_suggestion("c")
            .with_suggestion("d");
        assert_eq!(issue.suggestions.len(), 3);
    }

    #[test]
    fn category_display_is_snake_case() {
        assert_eq!(Category::CodeInjection.to_string(), "code_injection");
        assert_eq!(Category::Other("weird_one".into()).to_string(), "weird_one");
    }
}
