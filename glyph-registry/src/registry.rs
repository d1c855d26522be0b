//! The whitelist of attribute/method access permitted by the analyzer and
//! generator (§4.2). It is the *only* source of truth for "is this
//! attribute access safe?" — neither component keeps its own copy of the
//! dangerous-name list.

use crate::entry::{AttributeKind, SafeAttributeEntry};
use std::collections::{HashMap, HashSet};

/// Consulted only when the accessed type is not a registered scope. Access
/// through a registered class or builtin scope is decided entirely by that
/// scope's whitelist — this list never overrides it (the precedence rule).
pub const DANGEROUS_NAMES: &[&str] = &[
    "eval",
    "exec",
    "compile",
    "__import__",
    "__class__",
    "__bases__",
    "__subclasses__",
    "__globals__",
    "__getattribute__",
    "__setattr__",
    "__dict__",
    "__code__",
    "open",
    "system",
    "popen",
    "spawn",
    "fork",
    "getattr",
    "setattr",
    "delattr",
    "vars",
    "locals",
    "globals",
];

#[derive(Debug, Clone, Default)]
pub struct Registry {
    entries: HashMap<(String, String), SafeAttributeEntry>,
    scopes: HashSet<String>,
}

impl Registry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a primitive-like logical type tag (`"string"`, `"array"`,
    /// `"object"`) with its permitted attributes.
    pub fn register_builtin(&mut self, type_tag: &str, entries: impl IntoIterator<Item = (String, SafeAttributeEntry)>) {
        self.register_scope(type_tag, entries);
    }

    /// Registers a bridge-exported class. Internally keyed under the
    /// `class:<Name>` logical type tag per the design notes.
    pub fn register_class(&mut self, class_name: &str, entries: impl IntoIterator<Item = (String, SafeAttributeEntry)>) {
        self.register_scope(&class_tag(class_name), entries);
    }

    fn register_scope(&mut self, scope: &str, entries: impl IntoIterator<Item = (String, SafeAttributeEntry)>) {
        self.scopes.insert(scope.to_string());
        for (attr, entry) in entries {
            self.entries.insert((scope.to_string(), attr), entry);
        }
    }

    /// `{name, kind, required_capabilities, description}` for a known
    /// entry, if one is registered.
    pub fn lookup(&self, type_or_class: &str, attr: &str) -> Option<&SafeAttributeEntry> {
        self.entries.get(&(type_or_class.to_string(), attr.to_string()))
    }

    /// The precedence rule: a registered scope's whitelist is consulted
    /// *before* the global dangerous-name list, and entirely supersedes it
    /// — an attribute absent from a registered class's whitelist is denied
    /// even if it isn't on the dangerous-name list. Only unregistered
    /// ("unknown") types fall back to the dangerous-name list.
    pub fn is_safe(&self, type_or_class: &str, attr: &str) -> bool {
        if let Some(entry) = self.lookup(type_or_class, attr) {
            return entry.kind != AttributeKind::Forbidden;
        }
        if self.scopes.contains(type_or_class) {
            return false;
        }
        !DANGEROUS_NAMES.contains(&attr)
    }

    pub fn required_capabilities(&self, type_or_class: &str, attr: &str) -> Vec<String> {
        self.lookup(type_or_class, attr).map(|e| e.required_capabilities.clone()).unwrap_or_default()
    }

    /// Whether *any* registered scope marks an attribute named `attr` with
    /// the synthetic `"sanitizing"` capability. Used by the taint tracker
    /// (glyph-analyzer) to cut a propagation chain at a bridge call without
    /// needing full type inference to resolve the callee's static class —
    /// a conservative name-based approximation, not a type-checked one.
    pub fn is_marked_sanitizing(&self, attr: &str) -> bool {
        self.entries
            .iter()
            .any(|((_, name), entry)| name == attr && entry.required_capabilities.iter().any(|c| c == "sanitizing"))
    }

    /// Pre-populated with the builtin logical type tags (`"string"`,
    /// `"array"`, `"object"`) a generated program can call into without a
    /// bridge. Bridge classes are registered only by whatever bridge crate
    /// exposes them (glyph-bridge and beyond).
    pub fn with_default_builtins() -> Self {
        let mut registry = Self::new();
        registry.register_builtin("string", string_builtins());
        registry.register_builtin("array", array_builtins());
        registry.register_builtin("object", object_builtins());
        registry
    }
}

pub fn class_tag(class_name: &str) -> String {
    format!("class:{}", class_name)
}

fn string_builtins() -> Vec<(String, SafeAttributeEntry)> {
    vec![
        ("length".into(), SafeAttributeEntry::property("length", "number of characters")),
        ("split".into(), SafeAttributeEntry::method("split", "split on a separator")),
        ("join".into(), SafeAttributeEntry::method("join", "join an array with this string as separator")),
        ("trim".into(), SafeAttributeEntry::method("trim", "strip leading/trailing whitespace")),
        ("upper".into(), SafeAttributeEntry::method("upper", "uppercase copy")),
        ("lower".into(), SafeAttributeEntry::method("lower", "lowercase copy")),
        ("replace".into(), SafeAttributeEntry::method("replace", "replace all occurrences of a substring")),
        ("contains".into(), SafeAttributeEntry::method("contains", "substring test")),
        ("startsWith".into(), SafeAttributeEntry::method("startsWith", "prefix test")),
        ("endsWith".into(), SafeAttributeEntry::method("endsWith", "suffix test")),
        ("indexOf".into(), SafeAttributeEntry::method("indexOf", "first index of a substring, or -1")),
    ]
}

fn array_builtins() -> Vec<(String, SafeAttributeEntry)> {
    vec![
        ("length".into(), SafeAttributeEntry::property("length", "number of elements")),
        ("push".into(), SafeAttributeEntry::method("push", "append an element")),
        ("pop".into(), SafeAttributeEntry::method("pop", "remove and return the last element")),
        ("map".into(), SafeAttributeEntry::method("map", "apply a function to every element")),
        ("filter".into(), SafeAttributeEntry::method("filter", "keep elements matching a predicate")),
        ("reduce".into(), SafeAttributeEntry::method("reduce", "fold the array to a single value")),
        ("join".into(), SafeAttributeEntry::method("join", "join elements into a string")),
        ("contains".into(), SafeAttributeEntry::method("contains", "membership test")),
        ("reverse".into(), SafeAttributeEntry::method("reverse", "reversed copy")),
        ("sort".into(), SafeAttributeEntry::method("sort", "sorted copy")),
    ]
}

fn object_builtins() -> Vec<(String, SafeAttributeEntry)> {
    vec![
        ("keys".into(), SafeAttributeEntry::method("keys", "array of keys")),
        ("values".into(), SafeAttributeEntry::method("values", "array of values")),
        ("entries".into(), SafeAttributeEntry::method("entries", "array of [key, value] pairs")),
        ("has".into(), SafeAttributeEntry::method("has", "key membership test")),
        ("get".into(), SafeAttributeEntry::method("get", "value for a key, or null")),
        ("set".into(), SafeAttributeEntry::method("set", "insert or overwrite a key")),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builtin_methods_are_safe() {
        let registry = Registry::with_default_builtins();
        assert!(registry.is_safe("string", "split"));
        assert!(registry.is_safe("array", "map"));
        assert!(registry.is_safe("object", "keys"));
    }

    #[test]
    fn unknown_dangerous_name_is_denied() {
        let registry = Registry::with_default_builtins();
        assert!(!registry.is_safe("unknown", "eval"));
        assert!(!registry.is_safe("unknown", "__class__"));
    }

    #[test]
    fn unknown_type_permits_unlisted_ordinary_name() {
        let registry = Registry::with_default_builtins();
        assert!(registry.is_safe("unknown", "whatever"));
    }

    #[test]
    fn registered_class_whitelist_overrides_dangerous_list() {
        let mut registry = Registry::new();
        registry.register_class("regex", vec![("compile".to_string(), SafeAttributeEntry::method("compile", "compile a pattern"))]);
        assert!(registry.is_safe(&class_tag("regex"), "compile"));
    }

    #[test]
    fn registered_class_denies_attrs_outside_its_whitelist() {
        let mut registry = Registry::new();
        registry.register_class("regex", vec![("compile".to_string(), SafeAttributeEntry::method("compile", "compile a pattern"))]);
        // Not dangerous globally, but this class's whitelist is authoritative.
        assert!(!registry.is_safe(&class_tag("regex"), "something_unlisted"));
    }

    #[test]
    fn required_capabilities_are_reported() {
        let mut registry = Registry::new();
        registry.register_class(
            "fs",
            vec![("readFile".to_string(), SafeAttributeEntry::method("readFile", "read a file").requiring("read"))],
        );
        assert_eq!(registry.required_capabilities(&class_tag("fs"), "readFile"), vec!["read".to_string()]);
    }
}
