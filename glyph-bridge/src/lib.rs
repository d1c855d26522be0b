//! Bridge protocol (C7): the `BridgeModule`/`BridgeClass` traits that let a
//! Python-stdlib-flavored bridge register its safe attributes with C3, plus
//! two illustrative capability-gated bridges (`native_io`, `native_net`).
//! Real stdlib bridge bodies beyond these two are an explicit non-goal
//! (§1) — this crate demonstrates the contract, not a standard library.

pub mod error;
pub mod native_io;
pub mod native_net;
pub mod protocol;

pub use error::BridgeError;
pub use native_io::{NativeFile, NativeIoModule};
pub use native_net::{NativeNetModule, SocketHandle};
pub use protocol::{register_all, BridgeClass, BridgeModule};

/// Every bridge this crate ships, in the order `glyph-cli` registers them
/// at startup.
pub fn builtin_modules() -> Vec<Box<dyn BridgeModule>> {
    vec![Box::new(NativeIoModule), Box::new(NativeNetModule)]
}
