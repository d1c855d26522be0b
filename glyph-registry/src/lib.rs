//! Safe-attribute registry (C3): the whitelist consulted by the security
//! analyzer (C4) and the code generator (C6) whenever either visits an
//! `Attr` node.

pub mod entry;
pub mod registry;

pub use entry::{AttributeKind, SafeAttributeEntry};
pub use registry::{class_tag, Registry, DANGEROUS_NAMES};
