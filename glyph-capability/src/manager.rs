//! Process-wide capability manager (§4.4): a map of named contexts
//! currently alive plus a thread-local stack of *active* contexts. The
//! design notes (§9) suggest threading the active stack explicitly through
//! an execution-context parameter instead of a thread-local, to make the
//! scoping discipline checkable by the type system; the hot path below
//! keeps the thread-local the contract specifies; [`ContextGuard`] is the
//! concession to that note — it makes the *release* side checkable instead.

use crate::context::Context;
use crate::error::CapabilityError;
use crate::token::Token;
use once_cell::sync::Lazy;
use std::cell::RefCell;
use std::collections::HashMap;
use std::sync::Mutex;

thread_local! {
    static ACTIVE_STACK: RefCell<Vec<Context>> = const { RefCell::new(Vec::new()) };
}

pub static MANAGER: Lazy<CapabilityManager> = Lazy::new(CapabilityManager::new);

pub struct CapabilityManager {
    /// Contexts that have been entered and not yet left, by name. Guarded
    /// by a lock since it is genuinely process-wide; the per-thread active
    /// stack below is not shared and needs none.
    alive: Mutex<HashMap<String, u32>>,
    /// Tokens supplied by an external policy layer (§9, "self-granted vs.
    /// externally-granted"). `None` means no policy is installed and
    /// self-granting is unconstrained; `Some(tokens)` means every declared
    /// capability must be a subset of the union of these tokens' allowed
    /// operations.
    external_tokens: Mutex<Option<Vec<Token>>>,
}

impl CapabilityManager {
    fn new() -> Self {
        Self { alive: Mutex::new(HashMap::new()), external_tokens: Mutex::new(None) }
    }

    /// Installs the external policy seam. The sandbox executor calls this
    /// before running generated code that carries parent-supplied tokens;
    /// when unset, the current self-granting model applies unconditionally.
    pub fn install_external_tokens(&self, tokens: Vec<Token>) {
        *self.external_tokens.lock().expect("capability manager lock poisoned") = Some(tokens);
    }

    pub fn clear_external_tokens(&self) {
        *self.external_tokens.lock().expect("capability manager lock poisoned") = None;
    }

    /// `declared_ops ⊆ union(external allowed_ops)` when a policy is
    /// installed; otherwise self-granting is unconstrained.
    pub fn validate_declared(&self, declared_ops: &[String]) -> bool {
        let guard = self.external_tokens.lock().expect("capability manager lock poisoned");
        match guard.as_ref() {
            None => true,
            Some(tokens) => {
                let granted: std::collections::HashSet<&str> =
                    tokens.iter().flat_map(|t| t.allowed_ops().iter().map(String::as_str)).collect();
                declared_ops.iter().all(|op| granted.contains(op.as_str()))
            }
        }
    }

    pub fn create_token(
        &self,
        type_: impl Into<String>,
        patterns: Vec<String>,
        ops: impl IntoIterator<Item = String>,
        description: impl Into<String>,
    ) -> Token {
        Token::new(type_, patterns, ops, description)
    }

    /// Pushes `context` onto this thread's active stack and returns a
    /// guard whose `Drop` pops it back off — on every exit path, including
    /// an unwinding panic or a thrown `?`. Re-entry of the same name stacks.
    pub fn enter_context(&self, context: Context) -> ContextGuard {
        let name = context.name.clone();
        let depth = {
            let mut alive = self.alive.lock().expect("capability manager lock poisoned");
            let entry = alive.entry(name.clone()).or_insert(0);
            *entry += 1;
            *entry
        };
        // Never log token contents (patterns, ops) here — only the context name and depth.
        tracing::debug!(context = %name, depth, "capability context entered");
        ACTIVE_STACK.with(|stack| stack.borrow_mut().push(context));
        ContextGuard { name, released: false }
    }

    fn leave_context(&self, name: &str) {
        ACTIVE_STACK.with(|stack| {
            let mut stack = stack.borrow_mut();
            if let Some(pos) = stack.iter().rposition(|c| c.name == name) {
                stack.remove(pos);
            }
        });
        let mut alive = self.alive.lock().expect("capability manager lock poisoned");
        if let Some(count) = alive.get_mut(name) {
            *count -= 1;
            if *count == 0 {
                alive.remove(name);
            }
        }
        tracing::debug!(context = %name, "capability context left");
    }

    /// Walks the active stack from innermost outward; succeeds on the
    /// first token whose `allowed_ops` contains `op` and whose
    /// `resource_patterns` matches `resource` by glob.
    pub fn check(&self, op: &str, resource: &str) -> bool {
        ACTIVE_STACK.with(|stack| stack.borrow().iter().rev().any(|ctx| ctx.tokens.iter().any(|t| t.authorizes(op, resource))))
    }

    /// Same as [`check`](Self::check) but returns the spec's
    /// `CapabilityError` on failure, for bridge call sites that want `?`.
    pub fn require(&self, op: &str, resource: &str) -> Result<(), CapabilityError> {
        if self.check(op, resource) {
            Ok(())
        } else {
            Err(CapabilityError { op: op.to_string(), resource: resource.to_string() })
        }
    }

    pub fn stack_depth(&self) -> usize {
        ACTIVE_STACK.with(|stack| stack.borrow().len())
    }
}

/// RAII guard returned by [`CapabilityManager::enter_context`]. Generated
/// code for a `capability` block wraps the body in this guard's lifetime
/// rather than a manually paired enter/leave call, so release happens on
/// every exit path without the generator having to enumerate them.
pub struct ContextGuard {
    name: String,
    released: bool,
}

impl Drop for ContextGuard {
    fn drop(&mut self) {
        if !self.released {
            MANAGER.leave_context(&self.name);
            self.released = true;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn check_succeeds_for_matching_token_in_active_context() {
        let token = MANAGER.create_token("fs", vec!["a/*".into()], vec!["read".to_string()], "d");
        let _guard = MANAGER.enter_context(Context::new("C", vec![token]));
        assert!(MANAGER.check("read", "a/b"));
        assert!(!MANAGER.check("write", "a/b"));
        assert!(!MANAGER.check("read", "b/x"));
    }

    #[test]
    fn guard_drop_restores_stack_depth() {
        let before = MANAGER.stack_depth();
        {
            let token = MANAGER.create_token("fs", vec!["*".into()], vec!["read".to_string()], "d");
            let _guard = MANAGER.enter_context(Context::new("depth-test", vec![token]));
            assert_eq!(MANAGER.stack_depth(), before + 1);
        }
        assert_eq!(MANAGER.stack_depth(), before);
    }

    #[test]
    fn nested_entry_of_same_name_stacks_to_depth_two() {
        let before = MANAGER.stack_depth();
        let token = MANAGER.create_token("fs", vec!["*".into()], vec!["read".to_string()], "d");
        let outer = MANAGER.enter_context(Context::new("nest-test", vec![token.clone()]));
        let inner = MANAGER.enter_context(Context::new("nest-test", vec![token]));
        assert_eq!(MANAGER.stack_depth(), before + 2);
        drop(inner);
        assert_eq!(MANAGER.stack_depth(), before + 1);
        drop(outer);
        assert_eq!(MANAGER.stack_depth(), before);
    }

    #[test]
    fn guard_releases_even_when_a_panic_unwinds_through_it() {
        let before = MANAGER.stack_depth();
        let token = MANAGER.create_token("fs", vec!["*".into()], vec!["read".to_string()], "d");
        let result = std::panic::catch_unwind(|| {
            let _guard = MANAGER.enter_context(Context::new("panic-test", vec![token]));
            panic!("boom");
        });
        assert!(result.is_err());
        assert_eq!(MANAGER.stack_depth(), before);
    }

    #[test]
    fn validate_declared_is_unconstrained_without_a_policy() {
        MANAGER.clear_external_tokens();
        assert!(MANAGER.validate_declared(&["read".to_string(), "network".to_string()]));
    }

    #[test]
    fn validate_declared_enforces_subset_once_policy_installed() {
        let granted = MANAGER.create_token("fs", vec!["*".into()], vec!["read".to_string()], "granted");
        MANAGER.install_external_tokens(vec![granted]);
        assert!(MANAGER.validate_declared(&["read".to_string()]));
        assert!(!MANAGER.validate_declared(&["read".to_string(), "write".to_string()]));
        MANAGER.clear_external_tokens();
    }
}
