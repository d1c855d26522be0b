//! Recursive-descent parser: tokens in, a typed [`Program`] or a single
//! [`MLSyntaxError`] out. Deterministic, no I/O.

use crate::ast::*;
use crate::error::MLSyntaxError;
use crate::lexer::Lexer;
use crate::span::Span;
use crate::token::{Token, TokenKind};

/// Parse ML source text into a [`Program`].
#[tracing::instrument(level = "debug", skip(source), fields(file = file.unwrap_or("<string>"), bytes = source.len()))]
pub fn parse(source: &str, file: Option<&str>) -> Result<Program, MLSyntaxError> {
    let _ = file; // the generated span carries byte/line/col only; the caller attaches file identity.
    let tokens = Lexer::new(source)
        .tokenize()
        .map_err(|e| MLSyntaxError::new(e.message, e.span, vec![], source))?;
    let mut parser = Parser::new(tokens, source);
    let result = parser.parse_program();
    match &result {
        Ok(program) => tracing::debug!(statements = program.statements.len(), "parse succeeded"),
        Err(err) => tracing::debug!(%err, "parse failed"),
    }
    result
}

struct Parser<'a> {
    tokens: Vec<Token>,
    pos: usize,
    source: &'a str,
}

impl<'a> Parser<'a> {
    fn new(tokens: Vec<Token>, source: &'a str) -> Self {
        Self { tokens, pos: 0, source }
    }

    fn parse_program(&mut self) -> Result<Program, MLSyntaxError> {
        let start = self.current().span;
        let mut statements = Vec::new();
        while !self.is_eof() {
            statements.push(self.parse_stmt()?);
        }
        let end = self.previous_span_or(start);
        Ok(Program { statements, span: start.to(end) })
    }

    // ========================================================================
    // TOKEN CURSOR HELPERS
    // ========================================================================

    fn current(&self) -> &Token {
        &self.tokens[self.pos]
    }

    fn previous(&self) -> &Token {
        &self.tokens[self.pos.saturating_sub(1)]
    }

    fn previous_span_or(&self, fallback: Span) -> Span {
        if self.pos == 0 { fallback } else { self.previous().span }
    }

    fn is_eof(&self) -> bool {
        matches!(self.current().kind, TokenKind::Eof)
    }

    fn check(&self, kind: &TokenKind) -> bool {
        std::mem::discriminant(&self.current().kind) == std::mem::discriminant(kind)
    }

    fn advance(&mut self) -> &Token {
        if !self.is_eof() {
            self.pos += 1;
        }
        self.previous()
    }

    fn checkpoint(&self) -> usize {
        self.pos
    }

    fn restore(&mut self, checkpoint: usize) {
        self.pos = checkpoint;
    }

    fn expect(&mut self, kind: TokenKind) -> Result<&Token, MLSyntaxError> {
        if self.check(&kind) {
            Ok(self.advance())
        } else {
            Err(self.error_expected(vec![kind.describe()]))
        }
    }

    fn error(&self, message: impl Into<String>) -> MLSyntaxError {
        MLSyntaxError::new(message.into(), self.current().span, vec![], self.source)
    }

    fn error_expected(&self, expected: Vec<String>) -> MLSyntaxError {
        MLSyntaxError::new(
            format!("unexpected {}", self.current().kind.describe()),
            self.current().span,
            expected,
            self.source,
        )
    }

    fn expect_identifier(&mut self) -> Result<(String, Span), MLSyntaxError> {
        match &self.current().kind {
            TokenKind::Identifier(name) => {
                let name = name.clone();
                let span = self.current().span;
                self.advance();
                Ok((name, span))
            }
            _ => Err(self.error_expected(vec!["identifier".to_string()])),
        }
    }

    fn expect_string(&mut self) -> Result<(String, Span), MLSyntaxError> {
        match &self.current().kind {
            TokenKind::String(s) => {
                let s = s.clone();
                let span = self.current().span;
                self.advance();
                Ok((s, span))
            }
            _ => Err(self.error_expected(vec!["string literal".to_string()])),
        }
    }

    // ========================================================================
    // STATEMENTS
    // ========================================================================

    fn parse_block(&mut self) -> Result<Block, MLSyntaxError> {
        let start = self.expect(TokenKind::LBrace)?.span;
        let mut statements = Vec::new();
        while !self.check(&TokenKind::RBrace) && !self.is_eof() {
            statements.push(self.parse_stmt()?);
        }
        let end = self.expect(TokenKind::RBrace)?.span;
        Ok(Block { statements, span: start.to(end) })
    }

    fn parse_stmt(&mut self) -> Result<Stmt, MLSyntaxError> {
        match &self.current().kind {
            TokenKind::Function => self.parse_function_decl(),
            TokenKind::If => self.parse_if(),
            TokenKind::While => self.parse_while(),
            TokenKind::For => self.parse_for(),
            TokenKind::Capability => self.parse_capability_decl(),
            TokenKind::Return => self.parse_return(),
            TokenKind::Break => {
                let span = self.advance().span;
                let span = span.to(self.expect(TokenKind::Semicolon)?.span);
                Ok(Stmt { kind: StmtKind::Break, span })
            }
            TokenKind::Continue => {
                let span = self.advance().span;
                let span = span.to(self.expect(TokenKind::Semicolon)?.span);
                Ok(Stmt { kind: StmtKind::Continue, span })
            }
            TokenKind::Throw => self.parse_throw(),
            TokenKind::Try => self.parse_try_except(),
            TokenKind::Import => self.parse_import(),
            _ => self.parse_assign_or_expr_stmt(),
        }
    }

    fn parse_function_decl(&mut self) -> Result<Stmt, MLSyntaxError> {
        let start = self.expect(TokenKind::Function)?.span;
        let (name, _) = self.expect_identifier()?;
        self.expect(TokenKind::LParen)?;
        let params = self.parse_params()?;
        self.expect(TokenKind::RParen)?;
        let body = self.parse_block()?;
        let span = start.to(body.span);
        Ok(Stmt { kind: StmtKind::FunctionDecl(name, params, body), span })
    }

    fn parse_params(&mut self) -> Result<Vec<Param>, MLSyntaxError> {
        let mut params = Vec::new();
        while !self.check(&TokenKind::RParen) {
            let (name, span) = self.expect_identifier()?;
            params.push(Param { name, span });
            if self.check(&TokenKind::Comma) {
                self.advance();
            } else {
                break;
            }
        }
        Ok(params)
    }

    fn parse_if(&mut self) -> Result<Stmt, MLSyntaxError> {
        let start = self.expect(TokenKind::If)?.span;
        self.expect(TokenKind::LParen)?;
        let cond = self.parse_expr()?;
        self.expect(TokenKind::RParen)?;
        let then = self.parse_block()?;

        let mut elifs = Vec::new();
        while self.check(&TokenKind::Elif) {
            self.advance();
            self.expect(TokenKind::LParen)?;
            let elif_cond = self.parse_expr()?;
            self.expect(TokenKind::RParen)?;
            let elif_body = self.parse_block()?;
            elifs.push((elif_cond, elif_body));
        }

        let else_ = if self.check(&TokenKind::Else) {
            self.advance();
            Some(self.parse_block()?)
        } else {
            None
        };

        let end = else_
            .as_ref()
            .map(|b| b.span)
            .or_else(|| elifs.last().map(|(_, b)| b.span))
            .unwrap_or(then.span);
        Ok(Stmt { kind: StmtKind::If(cond, then, elifs, else_), span: start.to(end) })
    }

    fn parse_while(&mut self) -> Result<Stmt, MLSyntaxError> {
        let start = self.expect(TokenKind::While)?.span;
        self.expect(TokenKind::LParen)?;
        let cond = self.parse_expr()?;
        self.expect(TokenKind::RParen)?;
        let body = self.parse_block()?;
        let span = start.to(body.span);
        Ok(Stmt { kind: StmtKind::While(cond, body), span })
    }

    fn parse_for(&mut self) -> Result<Stmt, MLSyntaxError> {
        let start = self.expect(TokenKind::For)?.span;
        self.expect(TokenKind::LParen)?;

        // Disambiguate `for (ident in expr)` from `for (init; cond; step)`.
        let checkpoint = self.checkpoint();
        if let TokenKind::Identifier(name) = self.current().kind.clone() {
            self.advance();
            if self.check(&TokenKind::In) {
                self.advance();
                let iter = self.parse_expr()?;
                self.expect(TokenKind::RParen)?;
                let body = self.parse_block()?;
                let span = start.to(body.span);
                return Ok(Stmt { kind: StmtKind::ForIn(name, iter, body), span });
            }
        }
        self.restore(checkpoint);

        let init = if self.check(&TokenKind::Semicolon) {
            None
        } else {
            Some(Box::new(self.parse_assign_or_expr_stmt_no_semicolon()?))
        };
        self.expect(TokenKind::Semicolon)?;

        let cond = if self.check(&TokenKind::Semicolon) {
            None
        } else {
            Some(self.parse_expr()?)
        };
        self.expect(TokenKind::Semicolon)?;

        let step = if self.check(&TokenKind::RParen) {
            None
        } else {
            Some(Box::new(self.parse_assign_or_expr_stmt_no_semicolon()?))
        };
        self.expect(TokenKind::RParen)?;

        let body = self.parse_block()?;
        let span = start.to(body.span);
        Ok(Stmt { kind: StmtKind::ForC(init, cond, step, body), span })
    }

    fn parse_return(&mut self) -> Result<Stmt, MLSyntaxError> {
        let start = self.expect(TokenKind::Return)?.span;
        let value = if self.check(&TokenKind::Semicolon) {
            None
        } else {
            Some(self.parse_expr()?)
        };
        let end = self.expect(TokenKind::Semicolon)?.span;
        Ok(Stmt { kind: StmtKind::Return(value), span: start.to(end) })
    }

    fn parse_throw(&mut self) -> Result<Stmt, MLSyntaxError> {
        let start = self.expect(TokenKind::Throw)?.span;
        let value = self.parse_expr()?;
        let end = self.expect(TokenKind::Semicolon)?.span;
        Ok(Stmt { kind: StmtKind::Throw(value), span: start.to(end) })
    }

    fn parse_try_except(&mut self) -> Result<Stmt, MLSyntaxError> {
        let start = self.expect(TokenKind::Try)?.span;
        let body = self.parse_block()?;

        let mut handlers = Vec::new();
        while self.check(&TokenKind::Except) {
            let h_start = self.advance().span;
            let mut exc_type = None;
            let mut binding = None;
            if !self.check(&TokenKind::LBrace) {
                self.expect(TokenKind::LParen)?;
                let (ty, _) = self.expect_identifier()?;
                exc_type = Some(ty);
                if self.check(&TokenKind::Identifier(String::new())) {
                    let (b, _) = self.expect_identifier()?;
                    binding = Some(b);
                }
                self.expect(TokenKind::RParen)?;
            }
            let handler_body = self.parse_block()?;
            let span = h_start.to(handler_body.span);
            handlers.push(ExceptHandler { exc_type, binding, body: handler_body, span });
        }

        let finally = if self.check(&TokenKind::Finally) {
            self.advance();
            Some(self.parse_block()?)
        } else {
            None
        };

        if handlers.is_empty() && finally.is_none() {
            return Err(self.error("try block requires at least one except or finally clause"));
        }

        let end_span = finally
            .as_ref()
            .map(|b| b.span)
            .or_else(|| handlers.last().map(|h| h.span))
            .unwrap_or(body.span);
        let span = start.to(end_span);
        let stmt = Stmt { kind: StmtKind::TryExcept(body, handlers, finally), span };
        self.expect(TokenKind::Semicolon)?;
        Ok(stmt)
    }

    fn parse_import(&mut self) -> Result<Stmt, MLSyntaxError> {
        let start = self.expect(TokenKind::Import)?.span;
        let (path, _) = self.expect_string()?;
        let alias = if self.check(&TokenKind::Identifier(String::new())) {
            // `as` is not a reserved keyword in this grammar; aliasing uses
            // a bare trailing identifier: `import "path" alias;`
            let (name, _) = self.expect_identifier()?;
            Some(name)
        } else {
            None
        };
        let end = self.expect(TokenKind::Semicolon)?.span;
        Ok(Stmt { kind: StmtKind::Import(path, alias), span: start.to(end) })
    }

    fn parse_capability_decl(&mut self) -> Result<Stmt, MLSyntaxError> {
        let start = self.expect(TokenKind::Capability)?.span;
        let (name, _) = self.expect_identifier()?;
        self.expect(TokenKind::LBrace)?;

        let mut resources = Vec::new();
        let mut ops = Vec::new();

        while !self.check(&TokenKind::RBrace) {
            match &self.current().kind {
                TokenKind::Resource => {
                    self.advance();
                    loop {
                        let (pattern, _) = self.expect_string()?;
                        resources.push(CapabilityResource { name: format!("resource{}", resources.len()), pattern });
                        if self.check(&TokenKind::Comma) {
                            self.advance();
                        } else {
                            break;
                        }
                    }
                    self.expect(TokenKind::Semicolon)?;
                }
                TokenKind::Allow => {
                    self.advance();
                    loop {
                        let (ident, span) = self.expect_identifier()?;
                        let op = CapOp::parse(&ident)
                            .ok_or_else(|| MLSyntaxError::new(format!("unknown capability operation: {}", ident), span, vec![], self.source))?;
                        ops.push(op);
                        if self.check(&TokenKind::Comma) {
                            self.advance();
                        } else {
                            break;
                        }
                    }
                    self.expect(TokenKind::Semicolon)?;
                }
                _ => return Err(self.error_expected(vec!["resource".to_string(), "allow".to_string()])),
            }
        }
        let end = self.expect(TokenKind::RBrace)?.span;

        if ops.is_empty() {
            return Err(MLSyntaxError::new(
                "capability declaration requires at least one `allow` operation",
                start.to(end),
                vec![],
                self.source,
            ));
        }

        Ok(Stmt { kind: StmtKind::CapabilityDecl(name, resources, ops), span: start.to(end) })
    }

    fn parse_assign_or_expr_stmt(&mut self) -> Result<Stmt, MLSyntaxError> {
        let stmt = self.parse_assign_or_expr_stmt_no_semicolon()?;
        let end = self.expect(TokenKind::Semicolon)?.span;
        let span = stmt.span.to(end);
        Ok(Stmt { kind: stmt.kind, span })
    }

    /// Parses an assignment or bare expression without consuming the
    /// trailing `;` — used both for ordinary statements and for the
    /// init/step clauses of a C-style `for`.
    fn parse_assign_or_expr_stmt_no_semicolon(&mut self) -> Result<Stmt, MLSyntaxError> {
        let target = self.parse_expr()?;
        if self.check(&TokenKind::Assign) {
            self.advance();
            let value = self.parse_expr()?;
            let span = target.span.to(value.span);
            Ok(Stmt { kind: StmtKind::Assign(target, value), span })
        } else {
            let span = target.span;
            Ok(Stmt { kind: StmtKind::ExprStmt(target), span })
        }
    }

    // ========================================================================
    // EXPRESSIONS (precedence climbing)
    // ========================================================================

    fn parse_expr(&mut self) -> Result<Expr, MLSyntaxError> {
        self.parse_ternary()
    }

    fn parse_ternary(&mut self) -> Result<Expr, MLSyntaxError> {
        let cond = self.parse_logical_or()?;
        if self.check(&TokenKind::Question) {
            self.advance();
            let then = self.parse_expr()?;
            self.expect(TokenKind::Colon)?;
            let else_ = self.parse_expr()?;
            let span = cond.span.to(else_.span);
            Ok(Expr { kind: ExprKind::Ternary(Box::new(cond), Box::new(then), Box::new(else_)), span })
        } else {
            Ok(cond)
        }
    }

    fn parse_logical_or(&mut self) -> Result<Expr, MLSyntaxError> {
        let mut left = self.parse_logical_and()?;
        while self.check(&TokenKind::OrOr) {
            self.advance();
            let right = self.parse_logical_and()?;
            let span = left.span.to(right.span);
            left = Expr { kind: ExprKind::BinOp(BinOp::Or, Box::new(left), Box::new(right)), span };
        }
        Ok(left)
    }

    fn parse_logical_and(&mut self) -> Result<Expr, MLSyntaxError> {
        let mut left = self.parse_equality()?;
        while self.check(&TokenKind::AndAnd) {
            self.advance();
            let right = self.parse_equality()?;
            let span = left.span.to(right.span);
            left = Expr { kind: ExprKind::BinOp(BinOp::And, Box::new(left), Box::new(right)), span };
        }
        Ok(left)
    }

    fn parse_equality(&mut self) -> Result<Expr, MLSyntaxError> {
        let mut left = self.parse_relational()?;
        loop {
            let op = match self.current().kind {
                TokenKind::Eq => BinOp::Eq,
                TokenKind::Ne => BinOp::Ne,
                _ => break,
            };
            self.advance();
            let right = self.parse_relational()?;
            let span = left.span.to(right.span);
            left = Expr { kind: ExprKind::BinOp(op, Box::new(left), Box::new(right)), span };
        }
        Ok(left)
    }

    fn parse_relational(&mut self) -> Result<Expr, MLSyntaxError> {
        let mut left = self.parse_additive()?;
        loop {
            let op = match self.current().kind {
                TokenKind::Lt => BinOp::Lt,
                TokenKind::Le => BinOp::Le,
                TokenKind::Gt => BinOp::Gt,
                TokenKind::Ge => BinOp::Ge,
                _ => break,
            };
            self.advance();
            let right = self.parse_additive()?;
            let span = left.span.to(right.span);
            left = Expr { kind: ExprKind::BinOp(op, Box::new(left), Box::new(right)), span };
        }
        Ok(left)
    }

    fn parse_additive(&mut self) -> Result<Expr, MLSyntaxError> {
        let mut left = self.parse_multiplicative()?;
        loop {
            let op = match self.current().kind {
                TokenKind::Plus => BinOp::Add,
                TokenKind::Minus => BinOp::Sub,
                _ => break,
            };
            self.advance();
            let right = self.parse_multiplicative()?;
            let span = left.span.to(right.span);
            left = Expr { kind: ExprKind::BinOp(op, Box::new(left), Box::new(right)), span };
        }
        Ok(left)
    }

    fn parse_multiplicative(&mut self) -> Result<Expr, MLSyntaxError> {
        let mut left = self.parse_unary()?;
        loop {
            let op = match self.current().kind {
                TokenKind::Star => BinOp::Mul,
                TokenKind::Slash => BinOp::Div,
                TokenKind::Percent => BinOp::Mod,
                _ => break,
            };
            self.advance();
            let right = self.parse_unary()?;
            let span = left.span.to(right.span);
            left = Expr { kind: ExprKind::BinOp(op, Box::new(left), Box::new(right)), span };
        }
        Ok(left)
    }

    fn parse_unary(&mut self) -> Result<Expr, MLSyntaxError> {
        match self.current().kind {
            TokenKind::Minus => {
                let start = self.advance().span;
                let operand = self.parse_unary()?;
                let span = start.to(operand.span);
                Ok(Expr { kind: ExprKind::UnOp(UnOp::Neg, Box::new(operand)), span })
            }
            TokenKind::Bang => {
                let start = self.advance().span;
                let operand = self.parse_unary()?;
                let span = start.to(operand.span);
                Ok(Expr { kind: ExprKind::UnOp(UnOp::Not, Box::new(operand)), span })
            }
            _ => self.parse_postfix(),
        }
    }

    fn parse_postfix(&mut self) -> Result<Expr, MLSyntaxError> {
        let mut expr = self.parse_primary()?;
        loop {
            match self.current().kind {
                TokenKind::Dot => {
                    self.advance();
                    let (name, name_span) = self.expect_identifier()?;
                    let span = expr.span.to(name_span);
                    expr = Expr { kind: ExprKind::Attr(Box::new(expr), name), span };
                }
                TokenKind::LParen => {
                    self.advance();
                    let mut args = Vec::new();
                    while !self.check(&TokenKind::RParen) {
                        args.push(self.parse_call_arg()?);
                        if self.check(&TokenKind::Comma) {
                            self.advance();
                        } else {
                            break;
                        }
                    }
                    let end = self.expect(TokenKind::RParen)?.span;
                    let span = expr.span.to(end);
                    expr = Expr { kind: ExprKind::Call(Box::new(expr), args), span };
                }
                TokenKind::LBracket => {
                    self.advance();
                    expr = self.parse_index_or_slice(expr)?;
                }
                _ => break,
            }
        }
        Ok(expr)
    }

    fn parse_call_arg(&mut self) -> Result<Expr, MLSyntaxError> {
        if self.check(&TokenKind::Spread) {
            let start = self.advance().span;
            let inner = self.parse_expr()?;
            let span = start.to(inner.span);
            Ok(Expr { kind: ExprKind::Spread(Box::new(inner)), span })
        } else {
            self.parse_expr()
        }
    }

    /// `[` has already been consumed. Parses either `expr]` (index) or the
    /// slice grammar `[start?:stop?:step?]`.
    fn parse_index_or_slice(&mut self, target: Expr) -> Result<Expr, MLSyntaxError> {
        if self.check(&TokenKind::Colon) {
            return self.finish_slice(target, None);
        }
        let first = self.parse_expr()?;
        if self.check(&TokenKind::Colon) {
            return self.finish_slice(target, Some(first));
        }
        let end = self.expect(TokenKind::RBracket)?.span;
        let span = target.span.to(end);
        Ok(Expr { kind: ExprKind::Index(Box::new(target), Box::new(first)), span })
    }

    fn finish_slice(&mut self, target: Expr, start: Option<Expr>) -> Result<Expr, MLSyntaxError> {
        self.expect(TokenKind::Colon)?;
        let stop = if self.check(&TokenKind::Colon) || self.check(&TokenKind::RBracket) {
            None
        } else {
            Some(self.parse_expr()?)
        };
        let step = if self.check(&TokenKind::Colon) {
            self.advance();
            if self.check(&TokenKind::RBracket) {
                None
            } else {
                Some(self.parse_expr()?)
            }
        } else {
            None
        };
        let end = self.expect(TokenKind::RBracket)?.span;
        let span = target.span.to(end);
        Ok(Expr {
            kind: ExprKind::Slice(Box::new(target), start.map(Box::new), stop.map(Box::new), step.map(Box::new)),
            span,
        })
    }

    fn parse_primary(&mut self) -> Result<Expr, MLSyntaxError> {
        match self.current().kind.clone() {
            TokenKind::Number(n) => {
                let span = self.advance().span;
                Ok(Expr { kind: ExprKind::Literal(Literal::Number(n)), span })
            }
            TokenKind::String(s) => {
                let span = self.advance().span;
                Ok(Expr { kind: ExprKind::Literal(Literal::String(s)), span })
            }
            TokenKind::True => {
                let span = self.advance().span;
                Ok(Expr { kind: ExprKind::Literal(Literal::Bool(true)), span })
            }
            TokenKind::False => {
                let span = self.advance().span;
                Ok(Expr { kind: ExprKind::Literal(Literal::Bool(false)), span })
            }
            TokenKind::Null => {
                let span = self.advance().span;
                Ok(Expr { kind: ExprKind::Literal(Literal::Null), span })
            }
            TokenKind::Identifier(name) => {
                let span = self.advance().span;
                Ok(Expr { kind: ExprKind::Identifier(name), span })
            }
            TokenKind::LBracket => self.parse_array_literal(),
            TokenKind::LBrace => self.parse_object_literal(),
            TokenKind::LParen => self.parse_paren_or_lambda(),
            _ => Err(self.error_expected(vec!["expression".to_string()])),
        }
    }

    fn parse_array_literal(&mut self) -> Result<Expr, MLSyntaxError> {
        let start = self.expect(TokenKind::LBracket)?.span;
        let mut items = Vec::new();
        while !self.check(&TokenKind::RBracket) {
            items.push(self.parse_call_arg()?);
            if self.check(&TokenKind::Comma) {
                self.advance();
            } else {
                break;
            }
        }
        let end = self.expect(TokenKind::RBracket)?.span;
        Ok(Expr { kind: ExprKind::Array(items), span: start.to(end) })
    }

    fn parse_object_literal(&mut self) -> Result<Expr, MLSyntaxError> {
        let start = self.expect(TokenKind::LBrace)?.span;
        let mut pairs = Vec::new();
        while !self.check(&TokenKind::RBrace) {
            let key = match self.current().kind.clone() {
                TokenKind::Identifier(name) => {
                    self.advance();
                    ObjectKey::Identifier(name)
                }
                TokenKind::String(s) => {
                    self.advance();
                    ObjectKey::String(s)
                }
                TokenKind::LBracket => {
                    self.advance();
                    let computed = self.parse_expr()?;
                    self.expect(TokenKind::RBracket)?;
                    ObjectKey::Computed(Box::new(computed))
                }
                _ => return Err(self.error_expected(vec!["object key".to_string()])),
            };
            self.expect(TokenKind::Colon)?;
            let value = self.parse_expr()?;
            pairs.push((key, value));
            if self.check(&TokenKind::Comma) {
                self.advance();
            } else {
                break;
            }
        }
        let end = self.expect(TokenKind::RBrace)?.span;
        Ok(Expr { kind: ExprKind::Object(pairs), span: start.to(end) })
    }

    /// `(` has not yet been consumed. Disambiguates a parenthesized
    /// expression from a lambda `(params) => { body }` by a speculative
    /// parse with backtracking.
    fn parse_paren_or_lambda(&mut self) -> Result<Expr, MLSyntaxError> {
        let checkpoint = self.checkpoint();
        if let Some(lambda) = self.try_parse_lambda()? {
            return Ok(lambda);
        }
        self.restore(checkpoint);

        let start = self.expect(TokenKind::LParen)?.span;
        let inner = self.parse_expr()?;
        let end = self.expect(TokenKind::RParen)?.span;
        Ok(Expr { kind: inner.kind, span: start.to(end) })
    }

    fn try_parse_lambda(&mut self) -> Result<Option<Expr>, MLSyntaxError> {
        let start_span = self.current().span;
        self.advance(); // consume '('
        let mut params = Vec::new();
        loop {
            match &self.current().kind {
                TokenKind::RParen => break,
                TokenKind::Identifier(name) => {
                    let name = name.clone();
                    let span = self.current().span;
                    self.advance();
                    params.push(Param { name, span });
                    if self.check(&TokenKind::Comma) {
                        self.advance();
                    } else {
                        break;
                    }
                }
                _ => return Ok(None),
            }
        }
        if !self.check(&TokenKind::RParen) {
            return Ok(None);
        }
        self.advance();
        if !self.check(&TokenKind::Arrow) {
            return Ok(None);
        }
        self.advance();
        if !self.check(&TokenKind::LBrace) {
            return Ok(None);
        }
        let body = self.parse_block()?;
        let span = start_span.to(body.span);
        Ok(Some(Expr { kind: ExprKind::Lambda(params, Box::new(body)), span }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse_ok(src: &str) -> Program {
        parse(src, None).unwrap_or_else(|e| panic!("parse failed: {}", e))
    }

    #[test]
    fn parses_assignment() {
        let prog = parse_ok("x = 1;");
        assert_eq!(prog.statements.len(), 1);
        assert!(matches!(prog.statements[0].kind, StmtKind::Assign(_, _)));
    }

    #[test]
    fn parses_if_without_semicolon() {
        let prog = parse_ok("if (x) { y = 1; } elif (z) { y = 2; } else { y = 3; }");
        assert_eq!(prog.statements.len(), 1);
        match &prog.statements[0].kind {
            StmtKind::If(_, _, elifs, else_) => {
                assert_eq!(elifs.len(), 1);
                assert!(else_.is_some());
            }
            other => panic!("expected if, got {:?}", other),
        }
    }

    #[test]
    fn parses_function_decl() {
        let prog = parse_ok("function add(a, b) { return a + b; }");
        match &prog.statements[0].kind {
            StmtKind::FunctionDecl(name, params, body) => {
                assert_eq!(name, "add");
                assert_eq!(params.len(), 2);
                assert_eq!(body.statements.len(), 1);
            }
            other => panic!("expected function decl, got {:?}", other),
        }
    }

    #[test]
    fn parses_capability_decl() {
        let prog = parse_ok(r#"capability C { allow read; resource "a/*"; }"#);
        match &prog.statements[0].kind {
            StmtKind::CapabilityDecl(name, resources, ops) => {
                assert_eq!(name, "C");
                assert_eq!(resources.len(), 1);
                assert_eq!(ops, &vec![CapOp::Read]);
            }
            other => panic!("expected capability decl, got {:?}", other),
        }
    }

    #[test]
    fn capability_without_allow_is_error() {
        let err = parse(r#"capability C { resource "a/*"; }"#, None).unwrap_err();
        assert!(err.message.contains("allow"));
    }

    #[test]
    fn parses_slice_forms() {
        let prog = parse_ok("x = arr[1:4];");
        match &prog.statements[0].kind {
            StmtKind::Assign(_, value) => {
                assert!(matches!(value.kind, ExprKind::Slice(_, Some(_), Some(_), None)));
            }
            other => panic!("expected assign, got {:?}", other),
        }
    }

    #[test]
    fn parses_full_reverse_slice() {
        let prog = parse_ok("x = arr[::-1];");
        match &prog.statements[0].kind {
            StmtKind::Assign(_, value) => {
                assert!(matches!(value.kind, ExprKind::Slice(_, None, None, Some(_))));
            }
            other => panic!("expected assign, got {:?}", other),
        }
    }

    #[test]
    fn parses_lambda() {
        let prog = parse_ok("f = (a, b) => { return a + b; };");
        match &prog.statements[0].kind {
            StmtKind::Assign(_, value) => {
                assert!(matches!(value.kind, ExprKind::Lambda(_, _)));
            }
            other => panic!("expected assign, got {:?}", other),
        }
    }

    #[test]
    fn parses_ternary_and_precedence() {
        let prog = parse_ok("x = a + b * c > 1 ? 1 : 0;");
        assert_eq!(prog.statements.len(), 1);
    }

    #[test]
    fn for_c_loop() {
        let prog = parse_ok("for (i = 0; i < 10; i = i + 1) { x = i; }");
        assert!(matches!(prog.statements[0].kind, StmtKind::ForC(_, _, _, _)));
    }

    #[test]
    fn for_in_loop() {
        let prog = parse_ok("for (item in items) { x = item; }");
        assert!(matches!(prog.statements[0].kind, StmtKind::ForIn(_, _, _)));
    }

    #[test]
    fn try_except_finally_requires_semicolon() {
        let prog = parse_ok("try { x = 1; } except (Error e) { x = 2; } finally { x = 3; };");
        assert!(matches!(prog.statements[0].kind, StmtKind::TryExcept(_, _, _)));
    }

    #[test]
    fn error_reports_expected_tokens_and_context() {
        let err = parse("x = ;", None).unwrap_err();
        assert!(!err.expected.is_empty());
        assert_eq!(err.source_line.as_deref(), Some("x = ;"));
    }

    #[test]
    fn import_with_alias() {
        let prog = parse_ok(r#"import "std/net" net;"#);
        match &prog.statements[0].kind {
            StmtKind::Import(path, alias) => {
                assert_eq!(path, "std/net");
                assert_eq!(alias.as_deref(), Some("net"));
            }
            other => panic!("expected import, got {:?}", other),
        }
    }
}
