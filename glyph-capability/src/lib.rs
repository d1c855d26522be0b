//! Capability system (C5): tokens, contexts, and the scoping manager.
//!
//! Capabilities are not a sandbox — they are a self-documented intent
//! layer enforced at the stdlib boundary (§9). The sandbox executor (C8)
//! is where the external-policy seam becomes load-bearing.

pub mod context;
pub mod error;
pub mod glob;
pub mod manager;
pub mod token;

pub use context::Context;
pub use error::CapabilityError;
pub use glob::compile_glob;
pub use manager::{CapabilityManager, ContextGuard, MANAGER};
pub use token::Token;
