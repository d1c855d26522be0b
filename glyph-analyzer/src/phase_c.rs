//! Phase C — coarse intraprocedural taint tracking (§4.3). Every parameter
//! of a function and every return of a source-like call is tainted; taint
//! propagates through assignment, `BinOp(+)`, array/object construction,
//! and call returns; reaching a sink with tainted data is a `high` issue.
//!
//! This is deliberately not a full dataflow fixpoint solver: loops run
//! their body once, branches are unioned rather than iterated to a fixed
//! point, and there is no cross-function return-taint propagation back to
//! call sites. That matches "coarse" and "conservative" in the contract —
//! a handful of paths are a sound approximation, not exhaustive slicing.

use glyph_diagnostics::{Category, Issue, Severity};
use glyph_registry::Registry;
use glyph_syntax::ast::*;
use std::collections::HashMap;

/// Calls whose return value is tainted unconditionally: external input and
/// network-bridge reads.
const SOURCE_CALLS: &[&str] = &["input", "readLine", "recv", "fetch", "request"];

/// Calls that are security-sensitive sinks: file write, shell, code eval.
const SINK_CALLS: &[&str] = &["eval", "exec", "writeFile", "writeFileSync", "system", "popen"];

type TaintMap = HashMap<String, Vec<String>>;

pub fn run(program: &Program, registry: &Registry) -> Vec<Issue> {
    let mut issues = Vec::new();
    let mut tainted = TaintMap::new();
    process_block(&program.statements, &mut tainted, registry, &mut issues);
    issues
}

fn process_block(statements: &[Stmt], tainted: &mut TaintMap, registry: &Registry, issues: &mut Vec<Issue>) {
    for stmt in statements {
        process_stmt(stmt, tainted, registry, issues);
    }
}

fn process_stmt(stmt: &Stmt, tainted: &mut TaintMap, registry: &Registry, issues: &mut Vec<Issue>) {
    match &stmt.kind {
        StmtKind::Assign(target, value) => {
            check_sinks(value, tainted, registry, issues);
            if let ExprKind::Identifier(name) = &target.kind {
                match taint_of(value, tainted, registry) {
                    Some(mut path) => {
                        path.push(name.clone());
                        tainted.insert(name.clone(), path);
                    }
                    None => {
                        tainted.remove(name);
                    }
                }
            }
        }
        StmtKind::ExprStmt(expr) | StmtKind::Throw(expr) => check_sinks(expr, tainted, registry, issues),
        StmtKind::Return(Some(expr)) => check_sinks(expr, tainted, registry, issues),
        StmtKind::Return(None) | StmtKind::Break | StmtKind::Continue | StmtKind::Import(_, _) | StmtKind::CapabilityDecl(_, _, _) => {}
        StmtKind::If(cond, then, elifs, else_) => {
            check_sinks(cond, tainted, registry, issues);
            let mut then_taint = tainted.clone();
            process_block(&then.statements, &mut then_taint, registry, issues);
            let mut branch_results = vec![then_taint];
            for (elif_cond, body) in elifs {
                check_sinks(elif_cond, tainted, registry, issues);
                let mut branch_taint = tainted.clone();
                process_block(&body.statements, &mut branch_taint, registry, issues);
                branch_results.push(branch_taint);
            }
            if let Some(block) = else_ {
                let mut branch_taint = tainted.clone();
                process_block(&block.statements, &mut branch_taint, registry, issues);
                branch_results.push(branch_taint);
            } else {
                branch_results.push(tainted.clone());
            }
            *tainted = union_taint(branch_results);
        }
        StmtKind::While(cond, body) => {
            check_sinks(cond, tainted, registry, issues);
            process_block(&body.statements, tainted, registry, issues);
        }
        StmtKind::ForIn(var, iter, body) => {
            check_sinks(iter, tainted, registry, issues);
            if let Some(path) = taint_of(iter, tainted, registry) {
                let mut var_path = path;
                var_path.push(var.clone());
                tainted.insert(var.clone(), var_path);
            }
            process_block(&body.statements, tainted, registry, issues);
        }
        StmtKind::ForC(init, cond, step, body) => {
            if let Some(init) = init {
                process_stmt(init, tainted, registry, issues);
            }
            if let Some(cond) = cond {
                check_sinks(cond, tainted, registry, issues);
            }
            process_block(&body.statements, tainted, registry, issues);
            if let Some(step) = step {
                process_stmt(step, tainted, registry, issues);
            }
        }
        StmtKind::TryExcept(body, handlers, finally) => {
            process_block(&body.statements, tainted, registry, issues);
            for handler in handlers {
                process_block(&handler.body.statements, tainted, registry, issues);
            }
            if let Some(block) = finally {
                process_block(&block.statements, tainted, registry, issues);
            }
        }
        StmtKind::FunctionDecl(_, params, body) => {
            let mut local = TaintMap::new();
            for param in params {
                local.insert(param.name.clone(), vec![param.name.clone()]);
            }
            process_block(&body.statements, &mut local, registry, issues);
        }
    }
}

fn union_taint(maps: Vec<TaintMap>) -> TaintMap {
    let mut result = TaintMap::new();
    for map in maps {
        for (name, path) in map {
            result.entry(name).or_insert(path);
        }
    }
    result
}

/// Returns the propagation path ending in a taint source if `expr` is
/// tainted, or `None` if it is clean (or was cut by a sanitizing bridge).
fn taint_of(expr: &Expr, tainted: &TaintMap, registry: &Registry) -> Option<Vec<String>> {
    match &expr.kind {
        ExprKind::Literal(_) => None,
        ExprKind::Identifier(name) => tainted.get(name).cloned(),
        ExprKind::BinOp(BinOp::Add, l, r) => taint_of(l, tainted, registry).or_else(|| taint_of(r, tainted, registry)),
        ExprKind::Array(items) => items.iter().find_map(|item| taint_of(item, tainted, registry)),
        ExprKind::Object(pairs) => pairs.iter().find_map(|(_, value)| taint_of(value, tainted, registry)),
        ExprKind::Spread(inner) => taint_of(inner, tainted, registry),
        ExprKind::Call(callee, args) => {
            let name = callee_name(callee);
            if name.map(|n| SOURCE_CALLS.contains(&n)).unwrap_or(false) {
                return Some(vec![name.unwrap().to_string()]);
            }
            let arg_path = args.iter().find_map(|a| taint_of(a, tainted, registry))?;
            let is_sanitizing = name.map(|n| n == "sanitize" || registry.is_marked_sanitizing(n)).unwrap_or(false);
            if is_sanitizing {
                None
            } else {
                let mut path = arg_path;
                if let Some(n) = name {
                    path.push(n.to_string());
                }
                Some(path)
            }
        }
        _ => None,
    }
}

fn callee_name(callee: &Expr) -> Option<&str> {
    match &callee.kind {
        ExprKind::Identifier(name) => Some(name),
        ExprKind::Attr(_, name) => Some(name),
        _ => None,
    }
}

/// Looks for a sink call reachable from `expr` whose arguments are tainted.
/// Recurses into every subexpression, not just the top level, so
/// `f(sink(tainted))` and `[sink(tainted)]` are both caught.
fn check_sinks(expr: &Expr, tainted: &TaintMap, registry: &Registry, issues: &mut Vec<Issue>) {
    if let ExprKind::Call(callee, args) = &expr.kind {
        if let Some(name) = callee_name(callee) {
            if SINK_CALLS.contains(&name) {
                if let Some(path) = args.iter().find_map(|a| taint_of(a, tainted, registry)) {
                    let mut full_path = path;
                    full_path.push(name.to_string());
                    issues.push(
                        Issue::new(
                            Severity::High,
                            Category::TaintedFlow,
                            format!("tainted data reaches sink `{}`", name),
                        )
                        .with_span(expr.span)
                        .with_cwe("CWE-20")
                        .with_context("path", full_path.join(" -> "))
                        .with_suggestion("sanitize the value before it reaches the sink, or route it through a bridge marked sanitizing"),
                    );
                }
            }
        }
    }
    for child in direct_children(expr) {
        check_sinks(child, tainted, registry, issues);
    }
}

fn direct_children(expr: &Expr) -> Vec<&Expr> {
    match &expr.kind {
        ExprKind::Literal(_) | ExprKind::Identifier(_) => vec![],
        ExprKind::Array(items) => items.iter().collect(),
        ExprKind::Object(pairs) => pairs
            .iter()
            .flat_map(|(key, value)| {
                let mut v = vec![value];
                if let ObjectKey::Computed(computed) = key {
                    v.push(computed);
                }
                v
            })
            .collect(),
        ExprKind::Index(target, key) => vec![target, key],
        ExprKind::Attr(target, _) => vec![target],
        ExprKind::Call(callee, args) => std::iter::once(callee.as_ref()).chain(args.iter()).collect(),
        ExprKind::Lambda(_, _) => vec![],
        ExprKind::BinOp(_, l, r) => vec![l, r],
        ExprKind::UnOp(_, operand) => vec![operand],
        ExprKind::Ternary(c, t, e) => vec![c, t, e],
        ExprKind::Slice(target, start, stop, step) => {
            let mut v = vec![target.as_ref()];
            v.extend([start, stop, step].into_iter().flatten().map(|b| b.as_ref()));
            v
        }
        ExprKind::Spread(inner) => vec![inner],
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use glyph_syntax::parse;

    #[test]
    fn function_parameter_is_tainted_and_reaches_sink() {
        let program = parse("function handle(data) { writeFile(data); }", None).unwrap();
        let issues = run(&program, &Registry::with_default_builtins());
        assert_eq!(issues.len(), 1);
        assert_eq!(issues[0].category, Category::TaintedFlow);
    }

    #[test]
    fn source_call_result_propagates_through_assignment_to_sink() {
        let program = parse("x = input(); y = x; writeFile(y);", None).unwrap();
        let issues = run(&program, &Registry::with_default_builtins());
        assert_eq!(issues.len(), 1);
    }

    #[test]
    fn taint_propagates_through_string_concatenation() {
        let program = parse(r#"x = input(); y = "prefix" + x; writeFile(y);"#, None).unwrap();
        let issues = run(&program, &Registry::with_default_builtins());
        assert_eq!(issues.len(), 1);
    }

    #[test]
    fn untainted_data_does_not_flag_sink() {
        let program = parse(r#"x = "safe"; writeFile(x);"#, None).unwrap();
        let issues = run(&program, &Registry::with_default_builtins());
        assert!(issues.is_empty());
    }

    #[test]
    fn sanitizing_bridge_call_cuts_the_chain() {
        let mut registry = Registry::with_default_builtins();
        registry.register_class(
            "validator",
            vec![("sanitize".to_string(), glyph_registry::SafeAttributeEntry::method("sanitize", "d").requiring("sanitizing"))],
        );
        let program = parse("x = input(); y = sanitize(x); writeFile(y);", None).unwrap();
        let issues = run(&program, &registry);
        assert!(issues.is_empty());
    }
}
