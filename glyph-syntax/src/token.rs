//! Token kinds for the ML grammar.

use crate::span::Span;

/// Reserved keywords. Matching is exact-case (ML is not a config DSL).
pub const KEYWORDS: &[(&str, TokenKind)] = &[
    ("function", TokenKind::Function),
    ("if", TokenKind::If),
    ("else", TokenKind::Else),
    ("elif", TokenKind::Elif),
    ("while", TokenKind::While),
    ("for", TokenKind::For),
    ("in", TokenKind::In),
    ("return", TokenKind::Return),
    ("break", TokenKind::Break),
    ("continue", TokenKind::Continue),
    ("throw", TokenKind::Throw),
    ("try", TokenKind::Try),
    ("except", TokenKind::Except),
    ("finally", TokenKind::Finally),
    ("import", TokenKind::Import),
    ("capability", TokenKind::Capability),
    ("resource", TokenKind::Resource),
    ("allow", TokenKind::Allow),
    ("true", TokenKind::True),
    ("false", TokenKind::False),
    ("null", TokenKind::Null),
];

#[derive(Debug, Clone, PartialEq)]
pub enum TokenKind {
    // Keywords
    Function,
    If,
    Else,
    Elif,
    While,
    For,
    In,
    Return,
    Break,
    Continue,
    Throw,
    Try,
    Except,
    Finally,
    Import,
    Capability,
    Resource,
    Allow,
    True,
    False,
    Null,

    // Literals
    Number(f64),
    String(String),
    Identifier(String),

    // Delimiters
    LBrace,
    RBrace,
    LParen,
    RParen,
    LBracket,
    RBracket,
    Colon,
    Comma,
    Dot,
    Semicolon,
    Arrow,   // =>
    Spread,  // ...
    Question,

    // Operators
    Eq,       // ==
    Ne,       // !=
    Lt,
    Le,
    Gt,
    Ge,
    Assign,   // =
    Plus,
    Minus,
    Star,
    Slash,
    Percent,
    Bang,
    AndAnd,
    OrOr,

    Eof,
}

impl TokenKind {
    pub fn describe(&self) -> String {
        match self {
            TokenKind::Identifier(_) => "identifier".to_string(),
            TokenKind::Number(_) => "number literal".to_string(),
            TokenKind::String(_) => "string literal".to_string(),
            TokenKind::Eof => "end of input".to_string(),
            other => format!("{:?}", other),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Token {
    pub kind: TokenKind,
    pub span: Span,
}

impl Token {
    pub fn new(kind: TokenKind, span: Span) -> Self {
        Self { kind, span }
    }
}
