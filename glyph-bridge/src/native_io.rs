//! `native_io` (§4.6 ADDED): a minimal capability-gated file bridge
//! exercising the contract without reimplementing a real stdlib — every
//! method checks [`CapabilityManager::require`] before touching the
//! filesystem, and rejects obviously-invalid input before that.

use crate::error::BridgeError;
use crate::protocol::{BridgeClass, BridgeModule};
use glyph_capability::MANAGER;
use glyph_registry::SafeAttributeEntry;
use std::fs;

pub struct NativeFile {
    path: String,
}

impl NativeFile {
    fn validate_path(path: &str, function: &str) -> Result<(), BridgeError> {
        if path.is_empty() {
            return Err(BridgeError::InvalidArgument { function: function.to_string(), reason: "path must not be empty".to_string() });
        }
        if path.contains('\0') {
            return Err(BridgeError::InvalidArgument { function: function.to_string(), reason: "path must not contain NUL bytes".to_string() });
        }
        Ok(())
    }

    pub fn open(path: impl Into<String>) -> Result<Self, BridgeError> {
        let path = path.into();
        Self::validate_path(&path, "open")?;
        Ok(Self { path })
    }

    #[tracing::instrument(level = "debug", skip(self), fields(path = %self.path))]
    pub fn read(&self) -> Result<String, BridgeError> {
        MANAGER.require("read", &self.path)?;
        fs::read_to_string(&self.path).map_err(|e| BridgeError::Io { operation: "read".to_string(), message: e.to_string() })
    }

    #[tracing::instrument(level = "debug", skip(self, contents), fields(path = %self.path))]
    pub fn write(&self, contents: &str) -> Result<(), BridgeError> {
        MANAGER.require("write", &self.path)?;
        fs::write(&self.path, contents).map_err(|e| BridgeError::Io { operation: "write".to_string(), message: e.to_string() })
    }

    pub fn path(&self) -> &str {
        &self.path
    }
}

impl BridgeClass for NativeFile {
    fn class_name(&self) -> &str {
        "NativeFile"
    }

    fn safe_attributes(&self) -> Vec<(String, SafeAttributeEntry)> {
        native_file_attributes()
    }
}

fn native_file_attributes() -> Vec<(String, SafeAttributeEntry)> {
    vec![
        ("read".to_string(), SafeAttributeEntry::method("read", "read the full file contents as a string").requiring("read")),
        ("write".to_string(), SafeAttributeEntry::method("write", "overwrite the file with the given string").requiring("write")),
        ("path".to_string(), SafeAttributeEntry::property("path", "the resource path this handle was opened against")),
    ]
}

pub struct NativeIoModule;

impl BridgeModule for NativeIoModule {
    fn import_path(&self) -> &str {
        "io"
    }

    fn classes(&self) -> Vec<Box<dyn BridgeClass>> {
        vec![Box::new(NativeFile { path: String::new() })]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use glyph_capability::{Context, MANAGER};

    #[test]
    fn open_rejects_empty_path() {
        assert!(NativeFile::open("").is_err());
    }

    #[test]
    fn read_without_capability_is_denied() {
        MANAGER.clear_external_tokens();
        let file = NativeFile::open("/tmp/glyph-native-io-test-missing").unwrap();
        let err = file.read().unwrap_err();
        assert!(matches!(err, BridgeError::Capability(_)));
    }

    #[test]
    fn read_with_capability_reaches_the_filesystem() {
        let dir = std::env::temp_dir().join("glyph-native-io-test");
        fs::write(&dir, "hello").unwrap();
        let path = dir.to_string_lossy().to_string();
        let token = MANAGER.create_token("fs", vec![path.clone()], vec!["read".to_string()], "test");
        let _guard = MANAGER.enter_context(Context::new("test-read", vec![token]));
        let file = NativeFile::open(path).unwrap();
        assert_eq!(file.read().unwrap(), "hello");
    }
}
