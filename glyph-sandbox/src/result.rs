//! `ExecutionResult` (§4.7): the structured envelope a sandbox run always
//! returns — sandbox errors never raise across the process boundary, they
//! are reported as a `status` tag instead (§7 propagation policy).

use glyph_codegen::Value;
use glyph_diagnostics::Issue;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Status {
    Ok,
    Error,
    Timeout,
    MemoryExceeded,
    SecurityViolation,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExecutionResult {
    pub status: Status,
    pub stdout: String,
    pub stderr: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub return_value: Option<Value>,
    pub duration_ms: u64,
    pub peak_memory_bytes: u64,
    #[serde(default)]
    pub issues: Vec<Issue>,
}

impl ExecutionResult {
    pub fn is_success(&self) -> bool {
        self.status == Status::Ok
    }
}
