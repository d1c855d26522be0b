//! `SandboxOptions` (§4.7, §6): resource limits plus the capability-token
//! wire format forwarded from parent to child.

use serde::{Deserialize, Serialize};

/// One capability token as it crosses the parent→child boundary (§6
/// "Capability-token wire format"). The child reconstructs a real
/// [`glyph_capability::Token`] from each record and installs it in a root
/// context before executing generated code.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TokenWire {
    #[serde(rename = "type")]
    pub type_: String,
    pub patterns: Vec<String>,
    pub ops: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub expires_at: Option<chrono::DateTime<chrono::Utc>>,
    pub description: String,
}

/// Resource limits and forwarded capabilities for one sandbox run.
/// Configurable defaults match §4.7: 30s wall clock, 100 MiB address
/// space, network off, no file patterns.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SandboxOptions {
    pub cpu_timeout_secs: u64,
    pub memory_limit_bytes: u64,
    pub network_enabled: bool,
    pub file_patterns: Vec<String>,
    #[serde(default)]
    pub tokens: Vec<TokenWire>,
    /// Serialized ML call arguments passed to the generated program's
    /// entry point, if any — an empty object when the program is run as a
    /// plain script rather than invoked as a function.
    #[serde(default)]
    pub input: serde_json::Value,
}

impl Default for SandboxOptions {
    fn default() -> Self {
        Self {
            cpu_timeout_secs: 30,
            memory_limit_bytes: 100 * 1024 * 1024,
            network_enabled: false,
            file_patterns: Vec::new(),
            tokens: Vec::new(),
            input: serde_json::Value::Object(serde_json::Map::new()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_the_documented_limits() {
        let options = SandboxOptions::default();
        assert_eq!(options.cpu_timeout_secs, 30);
        assert_eq!(options.memory_limit_bytes, 100 * 1024 * 1024);
        assert!(!options.network_enabled);
        assert!(options.file_patterns.is_empty());
    }

    #[test]
    fn token_wire_roundtrips_through_json() {
        let token = TokenWire {
            type_: "fs".to_string(),
            patterns: vec!["a/*".to_string()],
            ops: vec!["read".to_string()],
            expires_at: None,
            description: "d".to_string(),
        };
        let json = serde_json::to_string(&token).unwrap();
        assert!(json.contains("\"type\":\"fs\""));
        let back: TokenWire = serde_json::from_str(&json).unwrap();
        assert_eq!(back, token);
    }
}
