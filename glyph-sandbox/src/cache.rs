//! Compilation and execution caches (§4.7 ADDED): both off the hot path,
//! both an LRU keyed by a `blake3` content hash (matching `caliber-core`'s
//! use of `blake3` for content hashing), both behind a `Mutex` since they
//! are shared across sandbox invocations within one CLI process.

use crate::result::ExecutionResult;
use chrono::{DateTime, Duration as ChronoDuration, Utc};
use glyph_diagnostics::Issue;
use lru::LruCache;
use std::num::NonZeroUsize;
use std::sync::Mutex;

const DEFAULT_CAPACITY: usize = 256;

fn content_key(bytes: &[u8]) -> [u8; 32] {
    *blake3::hash(bytes).as_bytes()
}

struct Entry<V> {
    value: V,
    inserted_at: DateTime<Utc>,
}

struct TtlLru<V> {
    inner: LruCache<[u8; 32], Entry<V>>,
    ttl: Option<ChronoDuration>,
}

impl<V: Clone> TtlLru<V> {
    fn new(capacity: usize, ttl: Option<ChronoDuration>) -> Self {
        Self { inner: LruCache::new(NonZeroUsize::new(capacity).unwrap_or(NonZeroUsize::new(1).unwrap())), ttl }
    }

    fn get(&mut self, key: &[u8; 32]) -> Option<V> {
        let expired = match (self.inner.peek(key), self.ttl) {
            (Some(entry), Some(ttl)) => Utc::now() - entry.inserted_at > ttl,
            _ => false,
        };
        if expired {
            self.inner.pop(key);
            return None;
        }
        self.inner.get(key).map(|entry| entry.value.clone())
    }

    fn put(&mut self, key: [u8; 32], value: V) {
        self.inner.put(key, Entry { value, inserted_at: Utc::now() });
    }

    fn clear(&mut self) {
        self.inner.clear();
    }

    fn len(&self) -> usize {
        self.inner.len()
    }
}

/// ML source hash → `{generated code, issues}`, per §4.7's compilation
/// cache description. Keyed on source text alone: options that change
/// codegen output (stdlib mode) are folded into the key by the caller.
#[derive(Clone)]
pub struct CompiledProgram {
    pub code: String,
    pub issues: Vec<Issue>,
}

pub struct CompilationCache {
    cache: Mutex<TtlLru<CompiledProgram>>,
}

impl CompilationCache {
    pub fn new(capacity: usize, ttl: Option<std::time::Duration>) -> Self {
        Self { cache: Mutex::new(TtlLru::new(capacity, ttl.map(to_chrono_duration))) }
    }

    pub fn get(&self, source: &str) -> Option<CompiledProgram> {
        self.cache.lock().expect("compilation cache lock poisoned").get(&content_key(source.as_bytes()))
    }

    pub fn put(&self, source: &str, compiled: CompiledProgram) {
        self.cache.lock().expect("compilation cache lock poisoned").put(content_key(source.as_bytes()), compiled);
    }

    pub fn clear(&self) {
        self.cache.lock().expect("compilation cache lock poisoned").clear();
    }

    pub fn len(&self) -> usize {
        self.cache.lock().expect("compilation cache lock poisoned").len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl Default for CompilationCache {
    fn default() -> Self {
        Self::new(DEFAULT_CAPACITY, None)
    }
}

/// `(generated-code hash, input hash) → ExecutionResult`, per §4.7's
/// execution cache description.
pub struct ExecutionCache {
    cache: Mutex<TtlLru<ExecutionResult>>,
}

impl ExecutionCache {
    pub fn new(capacity: usize, ttl: Option<std::time::Duration>) -> Self {
        Self { cache: Mutex::new(TtlLru::new(capacity, ttl.map(to_chrono_duration))) }
    }

    fn key(code: &str, input: &serde_json::Value) -> [u8; 32] {
        let mut buf = Vec::with_capacity(code.len() + 32);
        buf.extend_from_slice(code.as_bytes());
        buf.push(0);
        buf.extend_from_slice(input.to_string().as_bytes());
        content_key(&buf)
    }

    pub fn get(&self, code: &str, input: &serde_json::Value) -> Option<ExecutionResult> {
        self.cache.lock().expect("execution cache lock poisoned").get(&Self::key(code, input))
    }

    pub fn put(&self, code: &str, input: &serde_json::Value, result: ExecutionResult) {
        self.cache.lock().expect("execution cache lock poisoned").put(Self::key(code, input), result);
    }

    pub fn clear(&self) {
        self.cache.lock().expect("execution cache lock poisoned").clear();
    }

    pub fn len(&self) -> usize {
        self.cache.lock().expect("execution cache lock poisoned").len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl Default for ExecutionCache {
    fn default() -> Self {
        Self::new(DEFAULT_CAPACITY, None)
    }
}

fn to_chrono_duration(d: std::time::Duration) -> ChronoDuration {
    ChronoDuration::from_std(d).unwrap_or(ChronoDuration::zero())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::result::Status;

    fn dummy_result() -> ExecutionResult {
        ExecutionResult {
            status: Status::Ok,
            stdout: String::new(),
            stderr: String::new(),
            return_value: None,
            duration_ms: 1,
            peak_memory_bytes: 0,
            issues: Vec::new(),
        }
    }

    #[test]
    fn compilation_cache_roundtrips_by_source_hash() {
        let cache = CompilationCache::default();
        assert!(cache.get("x = 1;").is_none());
        cache.put("x = 1;", CompiledProgram { code: "x = 1".to_string(), issues: Vec::new() });
        assert_eq!(cache.get("x = 1;").unwrap().code, "x = 1");
    }

    #[test]
    fn execution_cache_distinguishes_by_input() {
        let cache = ExecutionCache::default();
        let code = "x = 1";
        cache.put(code, &serde_json::json!({"a": 1}), dummy_result());
        assert!(cache.get(code, &serde_json::json!({"a": 1})).is_some());
        assert!(cache.get(code, &serde_json::json!({"a": 2})).is_none());
    }

    #[test]
    fn ttl_expires_stale_entries() {
        let cache = CompilationCache::new(16, Some(std::time::Duration::from_secs(0)));
        cache.put("x = 1;", CompiledProgram { code: "x = 1".to_string(), issues: Vec::new() });
        std::thread::sleep(std::time::Duration::from_millis(5));
        assert!(cache.get("x = 1;").is_none());
    }

    #[test]
    fn clear_empties_the_cache() {
        let cache = CompilationCache::default();
        cache.put("x = 1;", CompiledProgram { code: "x = 1".to_string(), issues: Vec::new() });
        assert!(!cache.is_empty());
        cache.clear();
        assert!(cache.is_empty());
    }
}
