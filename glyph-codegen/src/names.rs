//! Name sanitization (§4.5): capability names and user identifiers are
//! validated against the ML identifier grammar before emission; generated
//! auxiliary names are prefixed `_ml_` to avoid collisions with ML-sourced
//! identifiers (which can never start with that prefix and still pass
//! `is_valid_identifier`, since ML identifiers are checked against the
//! reserved-keyword list, not a reserved-prefix list — the `_ml_` prefix is
//! this generator's own convention, not part of the ML grammar).

use glyph_syntax::ast::is_valid_identifier;

/// Python reserved words that are not ML keywords but would still break
/// generated code if an ML identifier collided with one.
const HOST_RESERVED: &[&str] = &[
    "and", "as", "assert", "async", "await", "class", "def", "del", "elif", "else", "except", "finally", "for", "from",
    "global", "if", "import", "in", "is", "lambda", "nonlocal", "not", "or", "pass", "raise", "return", "try", "while",
    "with", "yield", "None", "True", "False", "print", "len", "str", "int", "float", "list", "dict", "set", "type",
];

pub fn is_emittable_identifier(name: &str) -> bool {
    is_valid_identifier(name) && !HOST_RESERVED.contains(&name)
}

/// Renders an ML identifier for the host, escaping a collision with a host
/// reserved word by appending the `_ml_` auxiliary prefix rather than
/// rejecting otherwise-valid ML source.
pub fn host_identifier(name: &str) -> String {
    if HOST_RESERVED.contains(&name) {
        format!("_ml_{}", name)
    } else {
        name.to_string()
    }
}

/// A fresh, collision-free auxiliary name for a generator-introduced
/// binding (lambda lowering, capability helpers) — always `_ml_`-prefixed.
pub fn aux_name(prefix: &str, counter: u32) -> String {
    format!("_ml_{}_{}", prefix, counter)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn host_reserved_words_are_escaped() {
        assert_eq!(host_identifier("class"), "_ml_class");
        assert_eq!(host_identifier("ordinary"), "ordinary");
    }

    #[test]
    fn aux_names_carry_the_reserved_prefix() {
        assert!(aux_name("lambda", 3).starts_with("_ml_"));
    }
}
