//! Typed abstract syntax tree with source spans on every node.
//!
//! Nodes are immutable once built: the parser constructs them, and every
//! later stage (analyzer, codegen) only visits.

use crate::span::Span;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Program {
    pub statements: Vec<Stmt>,
    pub span: Span,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Block {
    pub statements: Vec<Stmt>,
    pub span: Span,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Param {
    pub name: String,
    pub span: Span,
}

// ============================================================================
// EXPRESSIONS
// ============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Expr {
    pub kind: ExprKind,
    pub span: Span,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Literal {
    Number(f64),
    String(String),
    Bool(bool),
    Null,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum ObjectKey {
    Identifier(String),
    String(String),
    Computed(Box<Expr>),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum BinOp {
    Add,
    Sub,
    Mul,
    Div,
    Mod,
    Eq,
    Ne,
    Lt,
    Le,
    Gt,
    Ge,
    And,
    Or,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum UnOp {
    Neg,
    Not,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum ExprKind {
    Literal(Literal),
    Identifier(String),
    Array(Vec<Expr>),
    Object(Vec<(ObjectKey, Expr)>),
    Index(Box<Expr>, Box<Expr>),
    Attr(Box<Expr>, String),
    Call(Box<Expr>, Vec<Expr>),
    Lambda(Vec<Param>, Box<Block>),
    BinOp(BinOp, Box<Expr>, Box<Expr>),
    UnOp(UnOp, Box<Expr>),
    Ternary(Box<Expr>, Box<Expr>, Box<Expr>),
    Slice(Box<Expr>, Option<Box<Expr>>, Option<Box<Expr>>, Option<Box<Expr>>),
    Spread(Box<Expr>),
}

// ============================================================================
// STATEMENTS
// ============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExceptHandler {
    pub exc_type: Option<String>,
    pub binding: Option<String>,
    pub body: Block,
    pub span: Span,
}

/// The fixed operation alphabet a `CapabilityDecl` draws from.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CapOp {
    Read,
    Write,
    Execute,
    Create,
    Delete,
    Network,
    Custom(String),
}

impl CapOp {
    pub fn parse(s: &str) -> Option<CapOp> {
        match s {
            "read" => Some(CapOp::Read),
            "write" => Some(CapOp::Write),
            "execute" => Some(CapOp::Execute),
            "create" => Some(CapOp::Create),
            "delete" => Some(CapOp::Delete),
            "network" => Some(CapOp::Network),
            other => other
                .strip_prefix("custom:")
                .filter(|ident| is_valid_identifier(ident))
                .map(|ident| CapOp::Custom(ident.to_string())),
        }
    }

    pub fn as_str(&self) -> String {
        match self {
            CapOp::Read => "read".to_string(),
            CapOp::Write => "write".to_string(),
            CapOp::Execute => "execute".to_string(),
            CapOp::Create => "create".to_string(),
            CapOp::Delete => "delete".to_string(),
            CapOp::Network => "network".to_string(),
            CapOp::Custom(name) => format!("custom:{}", name),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CapabilityResource {
    pub name: String,
    pub pattern: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Stmt {
    pub kind: StmtKind,
    pub span: Span,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum StmtKind {
    Assign(Expr, Expr),
    If(Expr, Block, Vec<(Expr, Block)>, Option<Block>),
    While(Expr, Block),
    ForIn(String, Expr, Block),
    ForC(Option<Box<Stmt>>, Option<Expr>, Option<Box<Stmt>>, Block),
    Return(Option<Expr>),
    Break,
    Continue,
    Throw(Expr),
    TryExcept(Block, Vec<ExceptHandler>, Option<Block>),
    FunctionDecl(String, Vec<Param>, Block),
    Import(String, Option<String>),
    CapabilityDecl(String, Vec<CapabilityResource>, Vec<CapOp>),
    ExprStmt(Expr),
}

/// Identifier grammar shared by function names, import aliases, and
/// capability names: letters/digits/underscore, no leading digit, not a
/// reserved keyword.
pub fn is_valid_identifier(s: &str) -> bool {
    if s.is_empty() {
        return false;
    }
    let mut chars = s.chars();
    let first = chars.next().unwrap();
    if !(first.is_ascii_alphabetic() || first == '_') {
        return false;
    }
    if !chars.all(|c| c.is_ascii_alphanumeric() || c == '_') {
        return false;
    }
    !crate::token::KEYWORDS.iter().any(|(kw, _)| *kw == s)
}

/// Binds every identifier introduced by `import "path" alias;` to the
/// logical class name named by the path's last segment. There is no type
/// inference (a non-goal): this is the only identifier-to-class
/// association anything downstream of the parser ever makes, and both the
/// analyzer's Phase B and the code generator rely on this exact mapping to
/// decide whether an `Attr` access should defer to a registered class.
pub fn collect_import_bindings(statements: &[Stmt]) -> std::collections::HashMap<String, String> {
    let mut out = std::collections::HashMap::new();
    collect_import_bindings_into(statements, &mut out);
    out
}

fn collect_import_bindings_into(statements: &[Stmt], out: &mut std::collections::HashMap<String, String>) {
    for stmt in statements {
        if let StmtKind::Import(path, alias) = &stmt.kind {
            let class_name = path.rsplit('/').next().unwrap_or(path).to_string();
            let binding = alias.clone().unwrap_or_else(|| class_name.clone());
            out.insert(binding, class_name);
        }
        for body in child_blocks(stmt) {
            collect_import_bindings_into(&body.statements, out);
        }
    }
}

/// Every nested statement block reachable from `stmt` in one step —
/// shared by both the import-binding walk above and callers that need to
/// recurse into every body without re-deriving the match arms.
pub fn child_blocks(stmt: &Stmt) -> Vec<&Block> {
    match &stmt.kind {
        StmtKind::If(_, then, elifs, else_) => {
            let mut blocks = vec![then];
            blocks.extend(elifs.iter().map(|(_, body)| body));
            blocks.extend(else_.iter());
            blocks
        }
        StmtKind::While(_, body) | StmtKind::ForIn(_, _, body) | StmtKind::ForC(_, _, _, body) => vec![body],
        StmtKind::TryExcept(body, handlers, finally) => {
            let mut blocks = vec![body];
            blocks.extend(handlers.iter().map(|h| &h.body));
            blocks.extend(finally.iter());
            blocks
        }
        StmtKind::FunctionDecl(_, _, body) => vec![body],
        _ => Vec::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn identifier_grammar() {
        assert!(is_valid_identifier("foo_bar"));
        assert!(is_valid_identifier("_private"));
        assert!(!is_valid_identifier("1foo"));
        assert!(!is_valid_identifier(""));
        assert!(!is_valid_identifier("function"));
    }

    #[test]
    fn cap_op_roundtrip() {
        assert_eq!(CapOp::parse("read"), Some(CapOp::Read));
        assert_eq!(CapOp::parse("custom:audit"), Some(CapOp::Custom("audit".into())));
        assert_eq!(CapOp::parse("bogus"), None);
        assert_eq!(CapOp::Custom("audit".into()).as_str(), "custom:audit");
    }
}
