//! The `(type_or_class, attribute) -> SafeAttributeEntry` keying scheme.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum AttributeKind {
    Method,
    Property,
    Forbidden,
}

/// `{name, kind, required_capabilities, description}`, keyed by
/// `(type_or_class_name, attribute_name)` in the registry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SafeAttributeEntry {
    pub name: String,
    pub kind: AttributeKind,
    pub required_capabilities: Vec<String>,
    pub description: String,
}

impl SafeAttributeEntry {
    pub fn method(name: impl Into<String>, description: impl Into<String>) -> Self {
        Self { name: name.into(), kind: AttributeKind::Method, required_capabilities: Vec::new(), description: description.into() }
    }

    pub fn property(name: impl Into<String>, description: impl Into<String>) -> Self {
        Self { name: name.into(), kind: AttributeKind::Property, required_capabilities: Vec::new(), description: description.into() }
    }

    pub fn requiring(mut self, capability: impl Into<String>) -> Self {
        self.required_capabilities.push(capability.into());
        self
    }
}
