//! Phase B — AST structural analysis: visits every node looking for
//! dangerous attribute access, dangerous bare calls, and import-policy
//! violations that Phase A's surface scan cannot see.

use crate::detector::walk_exprs;
use glyph_diagnostics::{Category, Issue, Severity};
use glyph_registry::{class_tag, Registry, DANGEROUS_NAMES};
use glyph_syntax::ast::*;

/// Which import paths are permitted. An empty allowlist (the default)
/// permits everything — the policy only restricts once the caller opts in.
#[derive(Debug, Clone, Default)]
pub struct ImportPolicy {
    pub allowed_prefixes: Vec<String>,
}

impl ImportPolicy {
    pub fn permissive() -> Self {
        Self::default()
    }

    pub fn is_permitted(&self, path: &str) -> bool {
        self.allowed_prefixes.is_empty() || self.allowed_prefixes.iter().any(|prefix| path.starts_with(prefix.as_str()))
    }
}

pub fn run(program: &Program, registry: &Registry, import_policy: &ImportPolicy) -> Vec<Issue> {
    let known_classes = collect_import_bindings(&program.statements);

    let mut issues = Vec::new();
    walk_exprs(&program.statements, &mut |expr| match &expr.kind {
        ExprKind::Attr(target, name) => {
            if let ExprKind::Identifier(ident) = &target.kind {
                if let Some(class_name) = known_classes.get(ident) {
                    if !registry.is_safe(&class_tag(class_name), name) {
                        issues.push(
                            Issue::new(
                                Severity::Critical,
                                Category::UnsafeAttribute,
                                format!("`{}.{}` is not in the safe-attribute registry", class_name, name),
                            )
                            .with_span(expr.span)
                            .with_cwe("CWE-470")
                            .with_suggestion(format!("register `{}` on `{}` if this access is intentional", name, class_name)),
                        );
                    }
                    return;
                }
            }
            if DANGEROUS_NAMES.contains(&name.as_str()) {
                issues.push(
                    Issue::new(Severity::Critical, Category::ReflectionAbuse, format!("`{}` is a reserved reflective name", name))
                        .with_span(expr.span)
                        .with_cwe("CWE-470")
                        .with_suggestion("access the value through a registered method instead"),
                );
            }
        }
        ExprKind::Call(callee, _) => {
            if let ExprKind::Identifier(name) = &callee.kind {
                if DANGEROUS_NAMES.contains(&name.as_str()) {
                    issues.push(
                        Issue::new(Severity::Critical, Category::CodeInjection, format!("call to `{}` is never permitted", name))
                            .with_span(expr.span)
                            .with_cwe("CWE-94")
                            .with_suggestion("replace dynamic evaluation with an explicit function call"),
                    );
                }
            }
        }
        _ => {}
    });

    for stmt in flatten_imports(&program.statements) {
        if let StmtKind::Import(path, _) = &stmt.kind {
            if !import_policy.is_permitted(path) {
                issues.push(
                    Issue::new(Severity::Medium, Category::Other("import_policy_violation".to_string()), format!("import of `{}` is not permitted under the configured import policy", path))
                        .with_span(stmt.span)
                        .with_suggestion("add this path to the allowed import prefixes, or remove the import"),
                );
            }
        }
    }

    issues
}

fn flatten_imports(statements: &[Stmt]) -> Vec<&Stmt> {
    let mut out = Vec::new();
    for stmt in statements {
        if matches!(stmt.kind, StmtKind::Import(_, _)) {
            out.push(stmt);
        }
        for body in child_blocks(stmt) {
            out.extend(flatten_imports(&body.statements));
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use glyph_syntax::parse;

    #[test]
    fn flags_dangerous_attr_on_unknown_target() {
        let program = parse("x.__class__;", None).unwrap();
        let issues = run(&program, &Registry::with_default_builtins(), &ImportPolicy::permissive());
        assert_eq!(issues.len(), 1);
        assert_eq!(issues[0].category, Category::ReflectionAbuse);
    }

    #[test]
    fn registered_class_defers_to_registry() {
        let mut registry = Registry::with_default_builtins();
        registry.register_class("regex", vec![("compile".to_string(), glyph_registry::SafeAttributeEntry::method("compile", "d"))]);
        let program = parse(r#"import "regex" re; re.compile(x);"#, None).unwrap();
        let issues = run(&program, &registry, &ImportPolicy::permissive());
        assert!(issues.is_empty());
    }

    #[test]
    fn registered_class_still_denies_unlisted_attrs() {
        let mut registry = Registry::with_default_builtins();
        registry.register_class("regex", vec![("compile".to_string(), glyph_registry::SafeAttributeEntry::method("compile", "d"))]);
        let program = parse(r#"import "regex" re; re.__class__;"#, None).unwrap();
        let issues = run(&program, &registry, &ImportPolicy::permissive());
        assert_eq!(issues.len(), 1);
        assert_eq!(issues[0].category, Category::UnsafeAttribute);
    }

    #[test]
    fn import_policy_violation_is_flagged() {
        let program = parse(r#"import "evil/module" m;"#, None).unwrap();
        let policy = ImportPolicy { allowed_prefixes: vec!["std/".to_string()] };
        let issues = run(&program, &Registry::with_default_builtins(), &policy);
        assert_eq!(issues.len(), 1);
    }
}
