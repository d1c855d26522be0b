//! `{type, resource_patterns, allowed_ops, created_at, expires_at?,
//! description}`. Immutable after construction; equality is by identity,
//! not by field comparison — two tokens built from identical arguments are
//! still distinct tokens.

use crate::glob::compile_glob;
use chrono::{DateTime, Utc};
use regex::Regex;
use std::collections::HashSet;
use std::sync::Arc;

struct TokenInner {
    type_: String,
    resource_patterns: Vec<String>,
    compiled_patterns: Vec<Regex>,
    allowed_ops: HashSet<String>,
    created_at: DateTime<Utc>,
    expires_at: Option<DateTime<Utc>>,
    description: String,
}

/// Cheap to clone (an `Arc` bump); equality and hashing are by the
/// underlying allocation's identity.
#[derive(Clone)]
pub struct Token(Arc<TokenInner>);

impl Token {
    pub fn new(
        type_: impl Into<String>,
        resource_patterns: Vec<String>,
        allowed_ops: impl IntoIterator<Item = String>,
        description: impl Into<String>,
    ) -> Self {
        Self::with_expiry(type_, resource_patterns, allowed_ops, description, None)
    }

    pub fn with_expiry(
        type_: impl Into<String>,
        resource_patterns: Vec<String>,
        allowed_ops: impl IntoIterator<Item = String>,
        description: impl Into<String>,
        expires_at: Option<DateTime<Utc>>,
    ) -> Self {
        let compiled_patterns = resource_patterns.iter().map(|p| compile_glob(p)).collect();
        Self(Arc::new(TokenInner {
            type_: type_.into(),
            resource_patterns,
            compiled_patterns,
            allowed_ops: allowed_ops.into_iter().collect(),
            created_at: Utc::now(),
            expires_at,
            description: description.into(),
        }))
    }

    pub fn type_(&self) -> &str {
        &self.0.type_
    }

    pub fn resource_patterns(&self) -> &[String] {
        &self.0.resource_patterns
    }

    pub fn allowed_ops(&self) -> &HashSet<String> {
        &self.0.allowed_ops
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.0.created_at
    }

    pub fn expires_at(&self) -> Option<DateTime<Utc>> {
        self.0.expires_at
    }

    pub fn description(&self) -> &str {
        &self.0.description
    }

    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        self.0.expires_at.is_some_and(|expiry| now >= expiry)
    }

    pub fn authorizes(&self, op: &str, resource: &str) -> bool {
        self.0.allowed_ops.contains(op) && self.0.compiled_patterns.iter().any(|re| re.is_match(resource))
    }
}

impl PartialEq for Token {
    fn eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.0, &other.0)
    }
}

impl Eq for Token {}

impl std::hash::Hash for Token {
    fn hash<H: std::hash::Hasher>(&self, state: &mut H) {
        (Arc::as_ptr(&self.0) as usize).hash(state);
    }
}

impl std::fmt::Debug for Token {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Token")
            .field("type", &self.0.type_)
            .field("resource_patterns", &self.0.resource_patterns)
            .field("allowed_ops", &self.0.allowed_ops)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn identical_fields_still_distinct_tokens() {
        let a = Token::new("fs", vec!["a/*".into()], vec!["read".to_string()], "d");
        let b = Token::new("fs", vec!["a/*".into()], vec!["read".to_string()], "d");
        assert_ne!(a, b);
        assert_eq!(a, a.clone());
    }

    #[test]
    fn authorizes_checks_both_op_and_pattern() {
        let token = Token::new("fs", vec!["a/*".into()], vec!["read".to_string()], "d");
        assert!(token.authorizes("read", "a/b"));
        assert!(!token.authorizes("write", "a/b"));
        assert!(!token.authorizes("read", "b/x"));
    }

    #[test]
    fn expiry_is_checked_against_a_supplied_instant() {
        let past = Utc::now() - chrono::Duration::seconds(1);
        let token = Token::with_expiry("fs", vec!["*".into()], vec!["read".to_string()], "d", Some(past));
        assert!(token.is_expired(Utc::now()));
    }
}
