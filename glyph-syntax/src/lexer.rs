//! Hand-written scanner producing a flat token stream.
//!
//! Mirrors the two-pass shape of a classic recursive-descent lexer: an
//! outer `next_token` dispatching on the lookahead character, and small
//! `scan_*` helpers for multi-character lexemes.

use crate::span::Span;
use crate::token::{Token, TokenKind, KEYWORDS};
use std::iter::Peekable;
use std::str::CharIndices;

#[derive(Debug, Clone, PartialEq)]
pub struct LexError {
    pub message: String,
    pub span: Span,
}

pub struct Lexer<'a> {
    source: &'a str,
    chars: Peekable<CharIndices<'a>>,
    line: u32,
    column: u32,
    pos: usize,
}

impl<'a> Lexer<'a> {
    pub fn new(source: &'a str) -> Self {
        Self {
            source,
            chars: source.char_indices().peekable(),
            line: 1,
            column: 1,
            pos: 0,
        }
    }

    /// Tokenize the entire source, stopping at the first lexical error.
    pub fn tokenize(mut self) -> Result<Vec<Token>, LexError> {
        let mut tokens = Vec::new();
        loop {
            let token = self.next_token()?;
            let is_eof = token.kind == TokenKind::Eof;
            tokens.push(token);
            if is_eof {
                break;
            }
        }
        Ok(tokens)
    }

    fn next_token(&mut self) -> Result<Token, LexError> {
        self.skip_whitespace_and_comments();

        let start_pos = self.pos;
        let start_line = self.line;
        let start_col = self.column;

        let kind = match self.peek_char() {
            None => TokenKind::Eof,
            Some(c) => match c {
                '{' => self.single(TokenKind::LBrace),
                '}' => self.single(TokenKind::RBrace),
                '(' => self.single(TokenKind::LParen),
                ')' => self.single(TokenKind::RParen),
                '[' => self.single(TokenKind::LBracket),
                ']' => self.single(TokenKind::RBracket),
                ':' => self.single(TokenKind::Colon),
                ',' => self.single(TokenKind::Comma),
                ';' => self.single(TokenKind::Semicolon),
                '?' => self.single(TokenKind::Question),

                '.' => {
                    self.advance();
                    if self.peek_char() == Some('.') && self.peek_next_char() == Some('.') {
                        self.advance();
                        self.advance();
                        TokenKind::Spread
                    } else {
                        TokenKind::Dot
                    }
                }

                '=' => {
                    self.advance();
                    match self.peek_char() {
                        Some('=') => {
                            self.advance();
                            TokenKind::Eq
                        }
                        Some('>') => {
                            self.advance();
                            TokenKind::Arrow
                        }
                        _ => TokenKind::Assign,
                    }
                }

                '!' => {
                    self.advance();
                    if self.peek_char() == Some('=') {
                        self.advance();
                        TokenKind::Ne
                    } else {
                        TokenKind::Bang
                    }
                }

                '<' => {
                    self.advance();
                    if self.peek_char() == Some('=') {
                        self.advance();
                        TokenKind::Le
                    } else {
                        TokenKind::Lt
                    }
                }

                '>' => {
                    self.advance();
                    if self.peek_char() == Some('=') {
                        self.advance();
                        TokenKind::Ge
                    } else {
                        TokenKind::Gt
                    }
                }

                '&' => {
                    self.advance();
                    if self.peek_char() == Some('&') {
                        self.advance();
                        TokenKind::AndAnd
                    } else {
                        return Err(self.error_at(start_line, start_col, start_pos, "unexpected character: &"));
                    }
                }

                '|' => {
                    self.advance();
                    if self.peek_char() == Some('|') {
                        self.advance();
                        TokenKind::OrOr
                    } else {
                        return Err(self.error_at(start_line, start_col, start_pos, "unexpected character: |"));
                    }
                }

                '+' => self.single(TokenKind::Plus),
                '-' => self.single(TokenKind::Minus),
                '*' => self.single(TokenKind::Star),
                '%' => self.single(TokenKind::Percent),

                '/' => self.single(TokenKind::Slash),

                '"' => return self.scan_string(start_pos, start_line, start_col),

                c if c.is_ascii_digit() => self.scan_number(),

                c if c.is_ascii_alphabetic() || c == '_' => self.scan_identifier(),

                c => {
                    self.advance();
                    return Err(self.error_at(start_line, start_col, start_pos, &format!("unexpected character: {}", c)));
                }
            },
        };

        Ok(Token::new(
            kind,
            Span::new(start_pos, self.pos, start_line, start_col, self.line, self.column),
        ))
    }

    fn single(&mut self, kind: TokenKind) -> TokenKind {
        self.advance();
        kind
    }

    fn scan_identifier(&mut self) -> TokenKind {
        let start = self.pos;
        while let Some(c) = self.peek_char() {
            if c.is_ascii_alphanumeric() || c == '_' {
                self.advance();
            } else {
                break;
            }
        }
        let ident = &self.source[start..self.pos];
        for (kw, kind) in KEYWORDS {
            if *kw == ident {
                return kind.clone();
            }
        }
        TokenKind::Identifier(ident.to_string())
    }

    fn scan_number(&mut self) -> TokenKind {
        let start = self.pos;
        while let Some(c) = self.peek_char() {
            if c.is_ascii_digit() {
                self.advance();
            } else {
                break;
            }
        }
        if self.peek_char() == Some('.') && self.peek_next_char().map(|c| c.is_ascii_digit()).unwrap_or(false) {
            self.advance();
            while let Some(c) = self.peek_char() {
                if c.is_ascii_digit() {
                    self.advance();
                } else {
                    break;
                }
            }
        }
        let text = &self.source[start..self.pos];
        // Already validated digit-by-digit above; parse cannot fail.
        TokenKind::Number(text.parse::<f64>().unwrap())
    }

    fn scan_string(&mut self, start_pos: usize, start_line: u32, start_col: u32) -> Result<Token, LexError> {
        self.advance(); // opening quote
        let mut value = String::new();
        loop {
            match self.peek_char() {
                None => return Err(self.error_at(start_line, start_col, start_pos, "unterminated string literal")),
                Some('"') => {
                    self.advance();
                    break;
                }
                Some('\\') => {
                    self.advance();
                    match self.peek_char() {
                        Some('n') => {
                            self.advance();
                            value.push('\n');
                        }
                        Some('t') => {
                            self.advance();
                            value.push('\t');
                        }
                        Some('r') => {
                            self.advance();
                            value.push('\r');
                        }
                        Some('\\') => {
                            self.advance();
                            value.push('\\');
                        }
                        Some('"') => {
                            self.advance();
                            value.push('"');
                        }
                        Some('\'') => {
                            self.advance();
                            value.push('\'');
                        }
                        Some('0') => {
                            self.advance();
                            value.push('\0');
                        }
                        Some(other) => {
                            return Err(self.error_at(
                                start_line,
                                start_col,
                                start_pos,
                                &format!("unknown escape sequence: \\{}", other),
                            ));
                        }
                        None => {
                            return Err(self.error_at(start_line, start_col, start_pos, "unterminated string literal"))
                        }
                    }
                }
                Some(c) => {
                    self.advance();
                    value.push(c);
                }
            }
        }
        Ok(Token::new(
            TokenKind::String(value),
            Span::new(start_pos, self.pos, start_line, start_col, self.line, self.column),
        ))
    }

    fn skip_whitespace_and_comments(&mut self) {
        loop {
            match self.peek_char() {
                Some(' ') | Some('\t') | Some('\r') => {
                    self.advance();
                }
                Some('\n') => {
                    self.advance();
                    self.line += 1;
                    self.column = 1;
                }
                Some('/') if self.peek_next_char() == Some('/') => {
                    while let Some(c) = self.peek_char() {
                        if c == '\n' {
                            break;
                        }
                        self.advance();
                    }
                }
                Some('/') if self.peek_next_char() == Some('*') => {
                    self.advance();
                    self.advance();
                    loop {
                        match self.peek_char() {
                            None => break,
                            Some('*') if self.peek_next_char() == Some('/') => {
                                self.advance();
                                self.advance();
                                break;
                            }
                            Some('\n') => {
                                self.advance();
                                self.line += 1;
                                self.column = 1;
                            }
                            _ => {
                                self.advance();
                            }
                        }
                    }
                }
                _ => break,
            }
        }
    }

    fn peek_char(&mut self) -> Option<char> {
        self.chars.peek().map(|(_, c)| *c)
    }

    fn peek_next_char(&self) -> Option<char> {
        let mut iter = self.source[self.pos..].char_indices();
        iter.next();
        iter.next().map(|(_, c)| c)
    }

    fn advance(&mut self) -> Option<char> {
        if let Some((i, c)) = self.chars.next() {
            self.pos = i + c.len_utf8();
            self.column += 1;
            Some(c)
        } else {
            None
        }
    }

    fn error_at(&self, line: u32, column: u32, start: usize, message: &str) -> LexError {
        LexError {
            message: message.to_string(),
            span: Span::new(start, self.pos, line, column, self.line, self.column),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn kinds(src: &str) -> Vec<TokenKind> {
        Lexer::new(src)
            .tokenize()
            .unwrap()
            .into_iter()
            .map(|t| t.kind)
            .collect()
    }

    #[test]
    fn tokenizes_keywords_and_identifiers() {
        let k = kinds("function foo return");
        assert_eq!(
            k,
            vec![
                TokenKind::Function,
                TokenKind::Identifier("foo".into()),
                TokenKind::Return,
                TokenKind::Eof
            ]
        );
    }

    #[test]
    fn tokenizes_numbers() {
        let k = kinds("42 3.14");
        assert_eq!(k, vec![TokenKind::Number(42.0), TokenKind::Number(3.14), TokenKind::Eof]);
    }

    #[test]
    fn tokenizes_string_escapes() {
        let k = kinds("\"a\\nb\"");
        assert_eq!(k, vec![TokenKind::String("a\nb".into()), TokenKind::Eof]);
    }

    #[test]
    fn unknown_escape_is_lex_error() {
        let err = Lexer::new("\"a\\pb\"").tokenize().unwrap_err();
        assert!(err.message.contains("unknown escape"));
    }

    #[test]
    fn skips_line_and_block_comments() {
        let k = kinds("// hi\n1 /* block\ncomment */ 2");
        assert_eq!(k, vec![TokenKind::Number(1.0), TokenKind::Number(2.0), TokenKind::Eof]);
    }

    #[test]
    fn two_char_operators() {
        let k = kinds("== != <= >= && || => ...");
        assert_eq!(
            k,
            vec![
                TokenKind::Eq,
                TokenKind::Ne,
                TokenKind::Le,
                TokenKind::Ge,
                TokenKind::AndAnd,
                TokenKind::OrOr,
                TokenKind::Arrow,
                TokenKind::Spread,
                TokenKind::Eof
            ]
        );
    }

    #[test]
    fn unterminated_string_errors() {
        let err = Lexer::new("\"abc").tokenize().unwrap_err();
        assert!(err.message.contains("unterminated"));
    }
}
