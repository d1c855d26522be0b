//! The tagged-union description of ML runtime values (§3 ADDED, §9 design
//! note promoted to data model). This is a description of the *wire shape*
//! a sandbox child process reports back as `ExecutionResult.return_value` —
//! `glyph-codegen` never interprets or constructs one of these at generation
//! time, it only owns the type so the generator and the sandbox protocol
//! agree on one shape instead of each inventing their own.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Value {
    Null,
    Bool(bool),
    Num(f64),
    Str(String),
    Array(Vec<Value>),
    Object(BTreeMap<String, Value>),
}

impl Value {
    pub fn type_tag(&self) -> &'static str {
        match self {
            Value::Null => "null",
            Value::Bool(_) => "bool",
            Value::Num(_) => "number",
            Value::Str(_) => "string",
            Value::Array(_) => "array",
            Value::Object(_) => "object",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn roundtrips_through_json() {
        let mut obj = BTreeMap::new();
        obj.insert("a".to_string(), Value::Num(1.0));
        let value = Value::Array(vec![Value::Str("x".into()), Value::Bool(true), Value::Object(obj)]);
        let json = serde_json::to_string(&value).unwrap();
        let back: Value = serde_json::from_str(&json).unwrap();
        assert_eq!(value, back);
    }

    #[test]
    fn type_tags_match_the_logical_type_names() {
        assert_eq!(Value::Null.type_tag(), "null");
        assert_eq!(Value::Num(1.0).type_tag(), "number");
    }
}
