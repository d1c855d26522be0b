//! AST printer (§8 testable property: `parse(render(parse(P))) ≡ parse(P)`).
//!
//! `render` is the inverse of enough of the grammar to round-trip any AST
//! the parser can produce: it does not attempt to preserve the original
//! source's whitespace or comments (those are not part of the AST), only
//! its structure. Every binary/ternary/slice sub-expression is wrapped in
//! parentheses on the way out, so precedence never has to be reconstructed
//! on the way back in.

use crate::ast::*;

/// Renders a [`Program`] back into ML source text.
pub fn render(program: &Program) -> String {
    let mut out = String::new();
    render_stmts(&program.statements, &mut out);
    out
}

fn render_stmts(statements: &[Stmt], out: &mut String) {
    for stmt in statements {
        render_stmt(stmt, out);
        out.push('\n');
    }
}

fn render_block(block: &Block, out: &mut String) {
    out.push_str("{ ");
    render_stmts(&block.statements, out);
    out.push('}');
}

fn render_stmt(stmt: &Stmt, out: &mut String) {
    match &stmt.kind {
        StmtKind::Assign(target, value) => {
            render_expr(target, out);
            out.push_str(" = ");
            render_expr(value, out);
            out.push(';');
        }
        StmtKind::If(cond, then, elifs, else_) => {
            out.push_str("if (");
            render_expr(cond, out);
            out.push_str(") ");
            render_block(then, out);
            for (elif_cond, body) in elifs {
                out.push_str(" elif (");
                render_expr(elif_cond, out);
                out.push_str(") ");
                render_block(body, out);
            }
            if let Some(block) = else_ {
                out.push_str(" else ");
                render_block(block, out);
            }
        }
        StmtKind::While(cond, body) => {
            out.push_str("while (");
            render_expr(cond, out);
            out.push_str(") ");
            render_block(body, out);
        }
        StmtKind::ForIn(var, iter, body) => {
            out.push_str("for (");
            out.push_str(var);
            out.push_str(" in ");
            render_expr(iter, out);
            out.push_str(") ");
            render_block(body, out);
        }
        StmtKind::ForC(init, cond, step, body) => {
            out.push_str("for (");
            if let Some(init) = init {
                render_stmt_no_semicolon(init, out);
            }
            out.push(';');
            if let Some(cond) = cond {
                render_expr(cond, out);
            }
            out.push(';');
            if let Some(step) = step {
                render_stmt_no_semicolon(step, out);
            }
            out.push_str(") ");
            render_block(body, out);
        }
        StmtKind::Return(expr) => {
            out.push_str("return");
            if let Some(expr) = expr {
                out.push(' ');
                render_expr(expr, out);
            }
            out.push(';');
        }
        StmtKind::Break => out.push_str("break;"),
        StmtKind::Continue => out.push_str("continue;"),
        StmtKind::Throw(expr) => {
            out.push_str("throw ");
            render_expr(expr, out);
            out.push(';');
        }
        StmtKind::TryExcept(body, handlers, finally) => {
            out.push_str("try ");
            render_block(body, out);
            for handler in handlers {
                out.push_str(" except");
                match (&handler.exc_type, &handler.binding) {
                    (Some(exc_type), Some(binding)) => out.push_str(&format!(" {} {}", exc_type, binding)),
                    (Some(exc_type), None) => out.push_str(&format!(" {}", exc_type)),
                    (None, Some(binding)) => out.push_str(&format!(" {}", binding)),
                    (None, None) => {}
                }
                out.push(' ');
                render_block(&handler.body, out);
            }
            if let Some(block) = finally {
                out.push_str(" finally ");
                render_block(block, out);
            }
            out.push(';');
        }
        StmtKind::FunctionDecl(name, params, body) => {
            out.push_str("function ");
            out.push_str(name);
            render_params(params, out);
            out.push(' ');
            render_block(body, out);
        }
        StmtKind::Import(path, alias) => {
            out.push_str("import ");
            render_string_literal(path, out);
            if let Some(alias) = alias {
                out.push(' ');
                out.push_str(alias);
            }
            out.push(';');
        }
        StmtKind::CapabilityDecl(name, resources, ops) => {
            out.push_str("capability ");
            out.push_str(name);
            out.push_str(" { ");
            if !resources.is_empty() {
                out.push_str("resource ");
                for (i, r) in resources.iter().enumerate() {
                    if i > 0 {
                        out.push_str(", ");
                    }
                    render_string_literal(&r.pattern, out);
                }
                out.push_str("; ");
            }
            out.push_str("allow ");
            for (i, op) in ops.iter().enumerate() {
                if i > 0 {
                    out.push_str(", ");
                }
                out.push_str(&op.as_str());
            }
            out.push_str("; }");
        }
        StmtKind::ExprStmt(expr) => {
            render_expr(expr, out);
            out.push(';');
        }
    }
}

/// Renders the init/step clause of a C-style `for` without the trailing
/// `;` that `parse_assign_or_expr_stmt_no_semicolon` also does not consume.
fn render_stmt_no_semicolon(stmt: &Stmt, out: &mut String) {
    match &stmt.kind {
        StmtKind::Assign(target, value) => {
            render_expr(target, out);
            out.push_str(" = ");
            render_expr(value, out);
        }
        StmtKind::ExprStmt(expr) => render_expr(expr, out),
        other => render_stmt(&Stmt { kind: other.clone(), span: stmt.span }, out),
    }
}

fn render_params(params: &[Param], out: &mut String) {
    out.push('(');
    for (i, p) in params.iter().enumerate() {
        if i > 0 {
            out.push_str(", ");
        }
        out.push_str(&p.name);
    }
    out.push(')');
}

fn render_expr(expr: &Expr, out: &mut String) {
    match &expr.kind {
        ExprKind::Literal(lit) => render_literal(lit, out),
        ExprKind::Identifier(name) => out.push_str(name),
        ExprKind::Array(items) => {
            out.push('[');
            for (i, item) in items.iter().enumerate() {
                if i > 0 {
                    out.push_str(", ");
                }
                render_expr(item, out);
            }
            out.push(']');
        }
        ExprKind::Object(pairs) => {
            out.push('{');
            for (i, (key, value)) in pairs.iter().enumerate() {
                if i > 0 {
                    out.push_str(", ");
                }
                match key {
                    ObjectKey::Identifier(name) => out.push_str(name),
                    ObjectKey::String(s) => render_string_literal(s, out),
                    ObjectKey::Computed(e) => {
                        out.push('[');
                        render_expr(e, out);
                        out.push(']');
                    }
                }
                out.push_str(": ");
                render_expr(value, out);
            }
            out.push('}');
        }
        ExprKind::Index(target, key) => {
            render_atom(target, out);
            out.push('[');
            render_expr(key, out);
            out.push(']');
        }
        ExprKind::Attr(target, name) => {
            render_atom(target, out);
            out.push('.');
            out.push_str(name);
        }
        ExprKind::Call(callee, args) => {
            render_atom(callee, out);
            out.push('(');
            for (i, arg) in args.iter().enumerate() {
                if i > 0 {
                    out.push_str(", ");
                }
                render_expr(arg, out);
            }
            out.push(')');
        }
        ExprKind::Lambda(params, body) => {
            render_params(params, out);
            out.push_str(" => ");
            render_block(body, out);
        }
        ExprKind::BinOp(op, l, r) => {
            out.push('(');
            render_expr(l, out);
            out.push(' ');
            out.push_str(binop_str(*op));
            out.push(' ');
            render_expr(r, out);
            out.push(')');
        }
        ExprKind::UnOp(op, operand) => {
            out.push('(');
            out.push_str(match op {
                UnOp::Neg => "-",
                UnOp::Not => "!",
            });
            render_expr(operand, out);
            out.push(')');
        }
        ExprKind::Ternary(c, t, e) => {
            out.push('(');
            render_expr(c, out);
            out.push_str(" ? ");
            render_expr(t, out);
            out.push_str(" : ");
            render_expr(e, out);
            out.push(')');
        }
        ExprKind::Slice(target, start, stop, step) => {
            render_atom(target, out);
            out.push('[');
            if let Some(start) = start {
                render_expr(start, out);
            }
            out.push(':');
            if let Some(stop) = stop {
                render_expr(stop, out);
            }
            if let Some(step) = step {
                out.push(':');
                render_expr(step, out);
            }
            out.push(']');
        }
        ExprKind::Spread(inner) => {
            out.push_str("...");
            render_expr(inner, out);
        }
    }
}

/// Postfix targets (`Index`/`Attr`/`Call`/`Slice`) need their own target
/// wrapped in parens only when it is itself a binary/unary/ternary form —
/// parenthesizing unconditionally (cheaper to get right than selectively)
/// is exactly what [`render_expr`] already does for those variants.
fn render_atom(expr: &Expr, out: &mut String) {
    render_expr(expr, out);
}

fn binop_str(op: BinOp) -> &'static str {
    match op {
        BinOp::Add => "+",
        BinOp::Sub => "-",
        BinOp::Mul => "*",
        BinOp::Div => "/",
        BinOp::Mod => "%",
        BinOp::Eq => "==",
        BinOp::Ne => "!=",
        BinOp::Lt => "<",
        BinOp::Le => "<=",
        BinOp::Gt => ">",
        BinOp::Ge => ">=",
        BinOp::And => "&&",
        BinOp::Or => "||",
    }
}

fn render_literal(lit: &Literal, out: &mut String) {
    match lit {
        Literal::Number(n) => out.push_str(&format!("{}", n)),
        Literal::String(s) => render_string_literal(s, out),
        Literal::Bool(true) => out.push_str("true"),
        Literal::Bool(false) => out.push_str("false"),
        Literal::Null => out.push_str("null"),
    }
}

/// Mirrors the lexer's recognized escape set exactly (`\n \t \r \\ \" \0`)
/// so a rendered string literal lexes back to the same bytes.
fn render_string_literal(s: &str, out: &mut String) {
    out.push('"');
    for c in s.chars() {
        match c {
            '\\' => out.push_str("\\\\"),
            '"' => out.push_str("\\\""),
            '\n' => out.push_str("\\n"),
            '\t' => out.push_str("\\t"),
            '\r' => out.push_str("\\r"),
            '\0' => out.push_str("\\0"),
            other => out.push(other),
        }
    }
    out.push('"');
}

/// Structural equality ignoring [`crate::span::Span`] — two ASTs compare
/// equal under this relation iff they have the same shape and literal/
/// identifier content, regardless of where in source text they came from.
/// Used by the round-trip property: spans necessarily differ between
/// `parse(P)` and `parse(render(parse(P)))` since rendering does not
/// reproduce the original source's exact byte layout.
pub fn structurally_eq(a: &Program, b: &Program) -> bool {
    stmts_eq(&a.statements, &b.statements)
}

fn stmts_eq(a: &[Stmt], b: &[Stmt]) -> bool {
    a.len() == b.len() && a.iter().zip(b).all(|(x, y)| stmt_eq(x, y))
}

fn block_eq(a: &Block, b: &Block) -> bool {
    stmts_eq(&a.statements, &b.statements)
}

fn stmt_eq(a: &Stmt, b: &Stmt) -> bool {
    use StmtKind::*;
    match (&a.kind, &b.kind) {
        (Assign(at, av), Assign(bt, bv)) => expr_eq(at, bt) && expr_eq(av, bv),
        (If(ac, ath, aei, ael), If(bc, bth, bei, bel)) => {
            expr_eq(ac, bc)
                && block_eq(ath, bth)
                && aei.len() == bei.len()
                && aei.iter().zip(bei).all(|((ac, ab), (bc, bb))| expr_eq(ac, bc) && block_eq(ab, bb))
                && match (ael, bel) {
                    (Some(a), Some(b)) => block_eq(a, b),
                    (None, None) => true,
                    _ => false,
                }
        }
        (While(ac, ab), While(bc, bb)) => expr_eq(ac, bc) && block_eq(ab, bb),
        (ForIn(av, ai, ab), ForIn(bv, bi, bb)) => av == bv && expr_eq(ai, bi) && block_eq(ab, bb),
        (ForC(ai, ac, astp, ab), ForC(bi, bc, bstp, bb)) => {
            opt_stmt_eq(ai, bi) && opt_expr_eq(ac, bc) && opt_stmt_eq(astp, bstp) && block_eq(ab, bb)
        }
        (Return(a), Return(b)) => opt_expr_eq(a, b),
        (Break, Break) | (Continue, Continue) => true,
        (Throw(a), Throw(b)) => expr_eq(a, b),
        (TryExcept(ab, ah, af), TryExcept(bb, bh, bf)) => {
            block_eq(ab, bb)
                && ah.len() == bh.len()
                && ah.iter().zip(bh).all(|(x, y)| x.exc_type == y.exc_type && x.binding == y.binding && block_eq(&x.body, &y.body))
                && match (af, bf) {
                    (Some(a), Some(b)) => block_eq(a, b),
                    (None, None) => true,
                    _ => false,
                }
        }
        (FunctionDecl(an, ap, ab), FunctionDecl(bn, bp, bb)) => {
            an == bn && ap.len() == bp.len() && ap.iter().zip(bp).all(|(x, y)| x.name == y.name) && block_eq(ab, bb)
        }
        (Import(ap, aa), Import(bp, ba)) => ap == bp && aa == ba,
        (CapabilityDecl(an, ar, ao), CapabilityDecl(bn, br, bo)) => {
            an == bn && ar.iter().map(|r| &r.pattern).eq(br.iter().map(|r| &r.pattern)) && ao == bo
        }
        (ExprStmt(a), ExprStmt(b)) => expr_eq(a, b),
        _ => false,
    }
}

fn opt_stmt_eq(a: &Option<Box<Stmt>>, b: &Option<Box<Stmt>>) -> bool {
    match (a, b) {
        (Some(a), Some(b)) => stmt_eq(a, b),
        (None, None) => true,
        _ => false,
    }
}

fn opt_expr_eq(a: &Option<Expr>, b: &Option<Expr>) -> bool {
    match (a, b) {
        (Some(a), Some(b)) => expr_eq(a, b),
        (None, None) => true,
        _ => false,
    }
}

fn expr_eq(a: &Expr, b: &Expr) -> bool {
    use ExprKind::*;
    match (&a.kind, &b.kind) {
        (Literal(Literal::Number(x)), Literal(Literal::Number(y))) => x.to_bits() == y.to_bits(),
        (Literal(x), Literal(y)) => x == y,
        (Identifier(x), Identifier(y)) => x == y,
        (Array(x), Array(y)) => x.len() == y.len() && x.iter().zip(y).all(|(a, b)| expr_eq(a, b)),
        (Object(x), Object(y)) => x.len() == y.len() && x.iter().zip(y).all(|((ak, av), (bk, bv))| object_key_eq(ak, bk) && expr_eq(av, bv)),
        (Index(at, ak), Index(bt, bk)) => expr_eq(at, bt) && expr_eq(ak, bk),
        (Attr(at, an), Attr(bt, bn)) => expr_eq(at, bt) && an == bn,
        (Call(ac, aa), Call(bc, ba)) => expr_eq(ac, bc) && aa.len() == ba.len() && aa.iter().zip(ba).all(|(a, b)| expr_eq(a, b)),
        (Lambda(ap, ab), Lambda(bp, bb)) => ap.len() == bp.len() && ap.iter().zip(bp).all(|(x, y)| x.name == y.name) && block_eq(ab, bb),
        (BinOp(ao, al, ar), BinOp(bo, bl, br)) => ao == bo && expr_eq(al, bl) && expr_eq(ar, br),
        (UnOp(ao, ae), UnOp(bo, be)) => ao == bo && expr_eq(ae, be),
        (Ternary(ac, at, ae), Ternary(bc, bt, be)) => expr_eq(ac, bc) && expr_eq(at, bt) && expr_eq(ae, be),
        (Slice(at, asr, aso, ast), Slice(bt, bsr, bso, bst)) => {
            expr_eq(at, bt) && opt_box_expr_eq(asr, bsr) && opt_box_expr_eq(aso, bso) && opt_box_expr_eq(ast, bst)
        }
        (Spread(a), Spread(b)) => expr_eq(a, b),
        _ => false,
    }
}

fn opt_box_expr_eq(a: &Option<Box<Expr>>, b: &Option<Box<Expr>>) -> bool {
    match (a, b) {
        (Some(a), Some(b)) => expr_eq(a, b),
        (None, None) => true,
        _ => false,
    }
}

fn object_key_eq(a: &ObjectKey, b: &ObjectKey) -> bool {
    match (a, b) {
        (ObjectKey::Identifier(x), ObjectKey::Identifier(y)) => x == y,
        (ObjectKey::String(x), ObjectKey::String(y)) => x == y,
        (ObjectKey::Computed(x), ObjectKey::Computed(y)) => expr_eq(x, y),
        _ => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::parse;
    use proptest::prelude::*;

    fn roundtrips(source: &str) {
        let program = parse(source, None).unwrap_or_else(|e| panic!("{} failed to parse: {}", source, e));
        let rendered = render(&program);
        let reparsed = parse(&rendered, None).unwrap_or_else(|e| panic!("rendered {:?} failed to reparse: {}", rendered, e));
        assert!(structurally_eq(&program, &reparsed), "round-trip mismatch:\n  original: {:?}\n  rendered: {}\n  reparsed: {:?}", program, rendered, reparsed);
    }

    #[test]
    fn renders_assignment_and_arithmetic() {
        roundtrips("x = 1 + 2 * 3;");
    }

    #[test]
    fn renders_if_elif_else() {
        roundtrips("if (x) { y = 1; } elif (z) { y = 2; } else { y = 3; }");
    }

    #[test]
    fn renders_function_and_call() {
        roundtrips("function add(a, b) { return a + b; }\nadd(1, 2);");
    }

    #[test]
    fn renders_capability_decl() {
        roundtrips(r#"capability C { resource "a/*", "b/*"; allow read, write; }"#);
    }

    #[test]
    fn renders_import_with_alias() {
        roundtrips(r#"import "io" f;"#);
    }

    #[test]
    fn renders_slice_and_lambda() {
        roundtrips("arr[1:4:2];\nf = (x) => { return x; };");
    }

    #[test]
    fn renders_string_with_escapes() {
        roundtrips(r#"x = "a\nb\"c\\d";"#);
    }

    #[test]
    fn renders_try_except_finally() {
        roundtrips("try { x = 1; } except Err e { x = 2; } finally { x = 3; };");
    }

    // ------------------------------------------------------------------
    // Property-based round-trip over small generated arithmetic/control
    // programs (§8 ADDED): `parse(render(parse(P))) ≡ parse(P)`.
    // ------------------------------------------------------------------

    fn arb_ident() -> impl Strategy<Value = String> {
        prop_oneof![Just("a"), Just("b"), Just("c"), Just("x"), Just("y"), Just("z"), Just("count")].prop_map(String::from)
    }

    fn arb_literal() -> impl Strategy<Value = Expr> {
        // Non-negative only: a negative `Literal::Number` has no single
        // source token (the lexer has no signed-number literal — a leading
        // `-` is unary negation, see `parse_unary`), so it would round-trip
        // into a `UnOp::Neg` wrapper and fail structural equality against
        // the original flat literal. Negation itself is still covered by
        // the `UnOp::Neg` branch below.
        prop_oneof![
            (0i32..1000).prop_map(|n| literal_expr(Literal::Number(n as f64))),
            Just(literal_expr(Literal::Bool(true))),
            Just(literal_expr(Literal::Bool(false))),
            Just(literal_expr(Literal::Null)),
        ]
    }

    fn literal_expr(lit: Literal) -> Expr {
        Expr { kind: ExprKind::Literal(lit), span: crate::span::Span::dummy() }
    }

    fn ident_expr(name: String) -> Expr {
        Expr { kind: ExprKind::Identifier(name), span: crate::span::Span::dummy() }
    }

    fn arb_expr() -> impl Strategy<Value = Expr> {
        let leaf = prop_oneof![arb_literal(), arb_ident().prop_map(ident_expr)];
        leaf.prop_recursive(4, 32, 4, |inner| {
            prop_oneof![
                (inner.clone(), arb_binop(), inner.clone()).prop_map(|(l, op, r)| Expr {
                    kind: ExprKind::BinOp(op, Box::new(l), Box::new(r)),
                    span: crate::span::Span::dummy(),
                }),
                inner.clone().prop_map(|e| Expr { kind: ExprKind::UnOp(UnOp::Neg, Box::new(e)), span: crate::span::Span::dummy() }),
                prop::collection::vec(inner, 0..4)
                    .prop_map(|items| Expr { kind: ExprKind::Array(items), span: crate::span::Span::dummy() }),
            ]
        })
    }

    fn arb_binop() -> impl Strategy<Value = BinOp> {
        prop_oneof![
            Just(BinOp::Add),
            Just(BinOp::Sub),
            Just(BinOp::Mul),
            Just(BinOp::Eq),
            Just(BinOp::Lt),
            Just(BinOp::And),
            Just(BinOp::Or),
        ]
    }

    fn arb_stmt() -> impl Strategy<Value = Stmt> {
        (arb_ident(), arb_expr()).prop_map(|(name, value)| Stmt {
            kind: StmtKind::Assign(ident_expr(name), value),
            span: crate::span::Span::dummy(),
        })
    }

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(64))]

        #[test]
        fn arbitrary_small_programs_round_trip(statements in prop::collection::vec(arb_stmt(), 1..6)) {
            let program = Program { statements, span: crate::span::Span::dummy() };
            let rendered = render(&program);
            let reparsed = parse(&rendered, None).unwrap_or_else(|e| panic!("rendered {:?} failed to reparse: {}", rendered, e));
            prop_assert!(structurally_eq(&program, &reparsed));
        }
    }
}
