//! Phase A — pattern detection: a regex/structural scan of node surfaces.
//! Detectors are data-driven (`Vec<Box<dyn PatternDetector>>`) so adding a
//! new pattern never touches the visitor in `phase_b`/`phase_c`.

use glyph_diagnostics::entropy::is_high_entropy_token;
use glyph_diagnostics::{Category, Issue, Severity};
use glyph_syntax::ast::*;
use once_cell::sync::Lazy;
use regex::Regex;

pub trait PatternDetector: Send + Sync {
    fn name(&self) -> &'static str;
    fn scan(&self, program: &Program) -> Vec<Issue>;
}

pub fn default_detectors() -> Vec<Box<dyn PatternDetector>> {
    vec![
        Box::new(EvalExecLiteralDetector),
        Box::new(DynamicConcatToEvalDetector),
        Box::new(ReflectionStringDetector),
        Box::new(HardcodedCredentialDetector),
        Box::new(PathTraversalDetector),
    ]
}

static REFLECTION_PATTERN: Lazy<Regex> = Lazy::new(|| Regex::new(r"^__\w+__$").unwrap());
static CREDENTIAL_NAME_PATTERN: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?i)password|token|key|secret").unwrap());
static TRAVERSAL_PATTERN: Lazy<Regex> = Lazy::new(|| Regex::new(r"\.\./").unwrap());

const EVAL_LIKE: &[&str] = &["eval", "exec"];
const FILE_API_CALLEES: &[&str] = &["open", "readFile", "writeFile", "readFileSync", "writeFileSync"];

/// Literal `eval(...)`/`exec(...)` calls with a bare identifier callee.
struct EvalExecLiteralDetector;

impl PatternDetector for EvalExecLiteralDetector {
    fn name(&self) -> &'static str {
        "eval_exec_literal"
    }

    fn scan(&self, program: &Program) -> Vec<Issue> {
        let mut issues = Vec::new();
        walk_exprs(&program.statements, &mut |expr| {
            if let ExprKind::Call(callee, _) = &expr.kind {
                if let ExprKind::Identifier(name) = &callee.kind {
                    if EVAL_LIKE.contains(&name.as_str()) {
                        issues.push(
                            Issue::new(Severity::Critical, Category::CodeInjection, format!("call to `{}` is never permitted", name))
                                .with_span(expr.span)
                                .with_cwe("CWE-94")
                                .with_suggestion("replace dynamic evaluation with an explicit function call"),
                        );
                    }
                }
            }
        });
        issues
    }
}

/// String concatenation whose result flows directly into an eval-like
/// call: `eval(a + b)` — and not just `eval("literal")`.
struct DynamicConcatToEvalDetector;

impl PatternDetector for DynamicConcatToEvalDetector {
    fn name(&self) -> &'static str {
        "dynamic_concat_to_eval"
    }

    fn scan(&self, program: &Program) -> Vec<Issue> {
        let mut issues = Vec::new();
        walk_exprs(&program.statements, &mut |expr| {
            if let ExprKind::Call(callee, args) = &expr.kind {
                if let ExprKind::Identifier(name) = &callee.kind {
                    if EVAL_LIKE.contains(&name.as_str()) && args.iter().any(is_dynamic_concat) {
                        issues.push(
                            Issue::new(
                                Severity::Critical,
                                Category::CodeInjection,
                                format!("dynamically constructed string passed to `{}`", name),
                            )
                            .with_span(expr.span)
                            .with_cwe("CWE-94")
                            .with_suggestion("build the code to execute from trusted, statically known sources only"),
                        );
                    }
                }
            }
        });
        issues
    }
}

fn is_dynamic_concat(expr: &Expr) -> bool {
    matches!(&expr.kind, ExprKind::BinOp(BinOp::Add, l, r) if !is_literal(l) || !is_literal(r))
}

fn is_literal(expr: &Expr) -> bool {
    matches!(expr.kind, ExprKind::Literal(_))
}

/// Reflective dunder-style strings (`"__class__"`, `"__globals__"`, ...)
/// appearing anywhere as a string literal, independent of how they are
/// later used — Phase B catches the structural `Attr(_, "__class__")` form.
struct ReflectionStringDetector;

impl PatternDetector for ReflectionStringDetector {
    fn name(&self) -> &'static str {
        "reflection_string"
    }

    fn scan(&self, program: &Program) -> Vec<Issue> {
        let mut issues = Vec::new();
        walk_exprs(&program.statements, &mut |expr| {
            if let ExprKind::Literal(Literal::String(s)) = &expr.kind {
                if REFLECTION_PATTERN.is_match(s) {
                    issues.push(
                        Issue::new(Severity::Critical, Category::ReflectionAbuse, format!("reflective name used as a string literal: `{}`", s))
                            .with_span(expr.span)
                            .with_cwe("CWE-470")
                            .with_suggestion("access the value through a registered method instead"),
                    );
                }
            }
        });
        issues
    }
}

/// Hardcoded-credential literals: *every* disjunct must hold — high
/// entropy, minimum length, *and* an assignment target name that looks
/// like a secret — partial matches never fire (the zero-false-positive
/// rule in §4.3).
struct HardcodedCredentialDetector;

impl PatternDetector for HardcodedCredentialDetector {
    fn name(&self) -> &'static str {
        "hardcoded_credential"
    }

    fn scan(&self, program: &Program) -> Vec<Issue> {
        let mut issues = Vec::new();
        walk_stmts(&program.statements, &mut |stmt| {
            if let StmtKind::Assign(target, value) = &stmt.kind {
                if let ExprKind::Identifier(target_name) = &target.kind {
                    if let ExprKind::Literal(Literal::String(literal)) = &value.kind {
                        if CREDENTIAL_NAME_PATTERN.is_match(target_name) && is_high_entropy_token(literal) {
                            issues.push(
                                Issue::new(
                                    Severity::High,
                                    Category::HardcodedCredential,
                                    format!("`{}` is assigned a hardcoded, high-entropy literal", target_name),
                                )
                                .with_span(stmt.span)
                                .with_cwe("CWE-798")
                                .with_suggestion("load this value from configuration or a secret store instead"),
                            );
                        }
                    }
                }
            }
        });
        issues
    }
}

/// Path-traversal substrings (`../`) in string literals passed directly to
/// a file-API-looking call.
struct PathTraversalDetector;

impl PatternDetector for PathTraversalDetector {
    fn name(&self) -> &'static str {
        "path_traversal"
    }

    fn scan(&self, program: &Program) -> Vec<Issue> {
        let mut issues = Vec::new();
        walk_exprs(&program.statements, &mut |expr| {
            if let ExprKind::Call(callee, args) = &expr.kind {
                let callee_name = match &callee.kind {
                    ExprKind::Identifier(name) => Some(name.as_str()),
                    ExprKind::Attr(_, name) => Some(name.as_str()),
                    _ => None,
                };
                if let Some(name) = callee_name {
                    if FILE_API_CALLEES.contains(&name) {
                        for arg in args {
                            if let ExprKind::Literal(Literal::String(s)) = &arg.kind {
                                if TRAVERSAL_PATTERN.is_match(s) {
                                    issues.push(
                                        Issue::new(
                                            Severity::Critical,
                                            Category::PathTraversal,
                                            format!("path argument to `{}` contains a traversal sequence", name),
                                        )
                                        .with_span(expr.span)
                                        .with_cwe("CWE-22")
                                        .with_suggestion("resolve and validate the path against an allowed root before use"),
                                    );
                                }
                            }
                        }
                    }
                }
            }
        });
        issues
    }
}

/// Pre-order traversal over every expression reachable from `statements`.
pub fn walk_exprs(statements: &[Stmt], visit: &mut impl FnMut(&Expr)) {
    for stmt in statements {
        walk_stmt_exprs(stmt, visit);
    }
}

fn walk_stmt_exprs(stmt: &Stmt, visit: &mut impl FnMut(&Expr)) {
    match &stmt.kind {
        StmtKind::Assign(target, value) => {
            walk_expr(target, visit);
            walk_expr(value, visit);
        }
        StmtKind::If(cond, then, elifs, else_) => {
            walk_expr(cond, visit);
            walk_exprs(&then.statements, visit);
            for (elif_cond, elif_body) in elifs {
                walk_expr(elif_cond, visit);
                walk_exprs(&elif_body.statements, visit);
            }
            if let Some(block) = else_ {
                walk_exprs(&block.statements, visit);
            }
        }
        StmtKind::While(cond, body) => {
            walk_expr(cond, visit);
            walk_exprs(&body.statements, visit);
        }
        StmtKind::ForIn(_, iter, body) => {
            walk_expr(iter, visit);
            walk_exprs(&body.statements, visit);
        }
        StmtKind::ForC(init, cond, step, body) => {
            if let Some(init) = init {
                walk_stmt_exprs(init, visit);
            }
            if let Some(cond) = cond {
                walk_expr(cond, visit);
            }
            if let Some(step) = step {
                walk_stmt_exprs(step, visit);
            }
            walk_exprs(&body.statements, visit);
        }
        StmtKind::Return(Some(value)) => walk_expr(value, visit),
        StmtKind::Return(None) | StmtKind::Break | StmtKind::Continue => {}
        StmtKind::Throw(value) => walk_expr(value, visit),
        StmtKind::TryExcept(body, handlers, finally) => {
            walk_exprs(&body.statements, visit);
            for handler in handlers {
                walk_exprs(&handler.body.statements, visit);
            }
            if let Some(block) = finally {
                walk_exprs(&block.statements, visit);
            }
        }
        StmtKind::FunctionDecl(_, _, body) => walk_exprs(&body.statements, visit),
        StmtKind::Import(_, _) => {}
        StmtKind::CapabilityDecl(_, _, _) => {}
        StmtKind::ExprStmt(expr) => walk_expr(expr, visit),
    }
}

fn walk_expr(expr: &Expr, visit: &mut impl FnMut(&Expr)) {
    visit(expr);
    match &expr.kind {
        ExprKind::Literal(_) | ExprKind::Identifier(_) => {}
        ExprKind::Array(items) => {
            for item in items {
                walk_expr(item, visit);
            }
        }
        ExprKind::Object(pairs) => {
            for (key, value) in pairs {
                if let ObjectKey::Computed(computed) = key {
                    walk_expr(computed, visit);
                }
                walk_expr(value, visit);
            }
        }
        ExprKind::Index(target, key) => {
            walk_expr(target, visit);
            walk_expr(key, visit);
        }
        ExprKind::Attr(target, _) => walk_expr(target, visit),
        ExprKind::Call(callee, args) => {
            walk_expr(callee, visit);
            for arg in args {
                walk_expr(arg, visit);
            }
        }
        ExprKind::Lambda(_, body) => walk_exprs(&body.statements, visit),
        ExprKind::BinOp(_, l, r) => {
            walk_expr(l, visit);
            walk_expr(r, visit);
        }
        ExprKind::UnOp(_, operand) => walk_expr(operand, visit),
        ExprKind::Ternary(c, t, e) => {
            walk_expr(c, visit);
            walk_expr(t, visit);
            walk_expr(e, visit);
        }
        ExprKind::Slice(target, start, stop, step) => {
            walk_expr(target, visit);
            for part in [start, stop, step].into_iter().flatten() {
                walk_expr(part, visit);
            }
        }
        ExprKind::Spread(inner) => walk_expr(inner, visit),
    }
}

/// Pre-order traversal over every statement, including nested bodies.
pub fn walk_stmts(statements: &[Stmt], visit: &mut impl FnMut(&Stmt)) {
    for stmt in statements {
        visit(stmt);
        match &stmt.kind {
            StmtKind::If(_, then, elifs, else_) => {
                walk_stmts(&then.statements, visit);
                for (_, elif_body) in elifs {
                    walk_stmts(&elif_body.statements, visit);
                }
                if let Some(block) = else_ {
                    walk_stmts(&block.statements, visit);
                }
            }
            StmtKind::While(_, body) | StmtKind::ForIn(_, _, body) | StmtKind::ForC(_, _, _, body) => {
                walk_stmts(&body.statements, visit);
            }
            StmtKind::TryExcept(body, handlers, finally) => {
                walk_stmts(&body.statements, visit);
                for handler in handlers {
                    walk_stmts(&handler.body.statements, visit);
                }
                if let Some(block) = finally {
                    walk_stmts(&block.statements, visit);
                }
            }
            StmtKind::FunctionDecl(_, _, body) => walk_stmts(&body.statements, visit),
            _ => {}
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use glyph_syntax::parse;

    #[test]
    fn flags_literal_eval_call() {
        let program = parse("eval(x);", None).unwrap();
        let issues = EvalExecLiteralDetector.scan(&program);
        assert_eq!(issues.len(), 1);
        assert_eq!(issues[0].severity, Severity::Critical);
    }

    #[test]
    fn does_not_flag_eval_shadowed_as_a_field_call() {
        let program = parse("x.eval(y);", None).unwrap();
        let issues = EvalExecLiteralDetector.scan(&program);
        assert!(issues.is_empty());
    }

    #[test]
    fn flags_dynamic_concat_into_eval() {
        let program = parse(r#"eval(a + "b");"#, None).unwrap();
        let issues = DynamicConcatToEvalDetector.scan(&program);
        assert_eq!(issues.len(), 1);
    }

    #[test]
    fn does_not_flag_eval_of_pure_literal_concat() {
        let program = parse(r#"eval("a" + "b");"#, None).unwrap();
        let issues = DynamicConcatToEvalDetector.scan(&program);
        assert!(issues.is_empty());
    }

    #[test]
    fn flags_reflective_string_literal() {
        let program = parse(r#"x = "__class__";"#, None).unwrap();
        let issues = ReflectionStringDetector.scan(&program);
        assert_eq!(issues.len(), 1);
    }

    #[test]
    fn hardcoded_credential_requires_both_name_and_entropy() {
        let program = parse(r#"api_token = "aK9$mQ2x!z7Lp";"#, None).unwrap();
        let issues = HardcodedCredentialDetector.scan(&program);
        assert_eq!(issues.len(), 1);
    }

    #[test]
    fn credential_like_name_with_low_entropy_value_does_not_fire() {
        let program = parse(r#"api_token = "aaaaaaaa";"#, None).unwrap();
        let issues = HardcodedCredentialDetector.scan(&program);
        assert!(issues.is_empty());
    }

    #[test]
    fn high_entropy_value_with_unrelated_name_does_not_fire() {
        let program = parse(r#"greeting = "aK9$mQ2x!z7Lp";"#, None).unwrap();
        let issues = HardcodedCredentialDetector.scan(&program);
        assert!(issues.is_empty());
    }

    #[test]
    fn flags_traversal_path_into_file_api() {
        let program = parse(r#"open("../../etc/passwd");"#, None).unwrap();
        let issues = PathTraversalDetector.scan(&program);
        assert_eq!(issues.len(), 1);
    }
}
