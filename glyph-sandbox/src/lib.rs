//! Sandbox executor (C8): isolated execution of generated code with
//! resource limits, capability forwarding, and structured result
//! reporting. Isolation is a real OS child process running the
//! [`trampoline`] script, not an in-process interpreter — the Rust side of
//! this crate never executes generated code itself.

pub mod cache;
pub mod error;
pub mod executor;
pub mod options;
pub mod result;
pub mod trampoline;

pub use cache::{CompilationCache, CompiledProgram, ExecutionCache};
pub use error::SandboxError;
pub use executor::SandboxExecutor;
pub use options::{SandboxOptions, TokenWire};
pub use result::{ExecutionResult, Status};
