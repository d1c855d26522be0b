//! The bridge protocol (§4.6): a `BridgeModule` exposes one or more
//! `BridgeClass`es, each contributing its safe-attribute whitelist to the
//! registry (C3) at process start. Registration is the only thing a
//! bridge module and the registry share — nothing else in this workspace
//! grants an attribute access, which is why registration is a builder API
//! rather than a derive or attribute macro: it keeps the whitelist
//! explicit and readable at the call site.

use glyph_registry::{Registry, SafeAttributeEntry};

/// One bridge-exported class: a logical type tag plus the attributes it
/// whitelists. `class_name` is the bare name (e.g. `"NativeFile"`); the
/// registry keys it under `class:<class_name>` via [`glyph_registry::class_tag`].
pub trait BridgeClass {
    fn class_name(&self) -> &str;
    fn safe_attributes(&self) -> Vec<(String, SafeAttributeEntry)>;
}

/// A bridge module groups the classes it exports under one ML stdlib
/// import path (e.g. `"io"`, matching `glyph-codegen`'s `STDLIB_MODULES`
/// table). `register` is the one entry point `glyph-cli` calls at
/// startup, before any analysis or codegen runs against user source.
pub trait BridgeModule {
    fn import_path(&self) -> &str;
    fn classes(&self) -> Vec<Box<dyn BridgeClass>>;

    fn register(&self, registry: &mut Registry) {
        for class in self.classes() {
            registry.register_class(class.class_name(), class.safe_attributes());
        }
    }
}

/// Registers every module in `modules` against `registry`, in order —
/// the order matters only if two modules export a class of the same
/// name, in which case the later registration wins (last writer wins,
/// the same rule `Registry::register_scope` already applies per call).
pub fn register_all(registry: &mut Registry, modules: &[Box<dyn BridgeModule>]) {
    for module in modules {
        module.register(registry);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use glyph_registry::class_tag;

    struct DummyClass;
    impl BridgeClass for DummyClass {
        fn class_name(&self) -> &str {
            "Dummy"
        }
        fn safe_attributes(&self) -> Vec<(String, SafeAttributeEntry)> {
            vec![("ping".to_string(), SafeAttributeEntry::method("ping", "no-op"))]
        }
    }

    struct DummyModule;
    impl BridgeModule for DummyModule {
        fn import_path(&self) -> &str {
            "dummy"
        }
        fn classes(&self) -> Vec<Box<dyn BridgeClass>> {
            vec![Box::new(DummyClass)]
        }
    }

    #[test]
    fn register_adds_the_classes_whitelist_to_the_registry() {
        let mut registry = Registry::new();
        DummyModule.register(&mut registry);
        assert!(registry.is_safe(&class_tag("Dummy"), "ping"));
    }
}
