//! `native_net` (§4.6 ADDED): a minimal capability-gated socket-open stub.
//! It never opens a real socket — that would make this crate's tests
//! reach outside the process — but it exercises the same
//! validate-then-check-then-act shape `native_io` does, which is the part
//! of the contract worth demonstrating.

use crate::error::BridgeError;
use crate::protocol::{BridgeClass, BridgeModule};
use glyph_capability::MANAGER;
use glyph_registry::SafeAttributeEntry;

pub struct SocketHandle {
    host: String,
    port: u16,
}

impl SocketHandle {
    #[tracing::instrument(level = "debug")]
    pub fn open(host: impl Into<String>, port: u16) -> Result<Self, BridgeError> {
        let host = host.into();
        if host.is_empty() {
            return Err(BridgeError::InvalidArgument { function: "open".to_string(), reason: "host must not be empty".to_string() });
        }
        if port == 0 {
            return Err(BridgeError::InvalidArgument { function: "open".to_string(), reason: "port must be nonzero".to_string() });
        }
        let resource = format!("{}:{}", host, port);
        MANAGER.require("network", &resource)?;
        Ok(Self { host, port })
    }

    pub fn host(&self) -> &str {
        &self.host
    }

    pub fn port(&self) -> u16 {
        self.port
    }
}

impl BridgeClass for SocketHandle {
    fn class_name(&self) -> &str {
        "SocketHandle"
    }

    fn safe_attributes(&self) -> Vec<(String, SafeAttributeEntry)> {
        vec![
            ("host".to_string(), SafeAttributeEntry::property("host", "the remote host this socket was opened against")),
            ("port".to_string(), SafeAttributeEntry::property("port", "the remote port this socket was opened against")),
        ]
    }
}

pub struct NativeNetModule;

impl BridgeModule for NativeNetModule {
    fn import_path(&self) -> &str {
        "net"
    }

    fn classes(&self) -> Vec<Box<dyn BridgeClass>> {
        vec![Box::new(SocketHandle { host: String::new(), port: 0 })]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use glyph_capability::{Context, MANAGER};

    #[test]
    fn open_rejects_zero_port() {
        assert!(SocketHandle::open("example.com", 0).is_err());
    }

    #[test]
    fn open_without_capability_is_denied() {
        MANAGER.clear_external_tokens();
        let err = SocketHandle::open("example.com", 443).unwrap_err();
        assert!(matches!(err, BridgeError::Capability(_)));
    }

    #[test]
    fn open_with_capability_succeeds() {
        let token = MANAGER.create_token("net", vec!["example.com:443".to_string()], vec!["network".to_string()], "test");
        let _guard = MANAGER.enter_context(Context::new("test-net", vec![token]));
        let socket = SocketHandle::open("example.com", 443).unwrap();
        assert_eq!(socket.port(), 443);
    }
}
