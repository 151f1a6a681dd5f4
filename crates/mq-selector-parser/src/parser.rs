//! Selector parser - hand-written recursive descent.
//!
//! Precedence, loosest first: `OR`, `AND`, `NOT`, equality (`=`, `<>`,
//! `IS [NOT] NULL`), comparison (`<`, `<=`, `>`, `>=`, `LIKE`, `BETWEEN`,
//! `IN`), additive, multiplicative, unary sign.

use crate::ast::{BinaryOp, Expr, Spanned, SpannedExpr, UnaryOp};
use crate::lexer::{Span, SpannedToken, Token};
use crate::ParseError;

/// Recursive descent parser for selector expressions.
pub struct Parser<'a> {
    tokens: &'a [SpannedToken],
    pos: usize,
    /// Counter for generating unique node IDs (starts at 1)
    next_id: i64,
}

impl<'a> Parser<'a> {
    /// Create a new parser for the given token stream.
    pub fn new(tokens: &'a [SpannedToken]) -> Self {
        Self {
            tokens,
            pos: 0,
            next_id: 1,
        }
    }

    /// Allocate the next unique node ID.
    fn next_id(&mut self) -> i64 {
        let id = self.next_id;
        self.next_id += 1;
        id
    }

    // === Utility Methods ===

    /// Peek at the current token without consuming it.
    fn peek(&self) -> Option<&Token> {
        self.tokens.get(self.pos).map(|(t, _)| t)
    }

    /// Peek at the token after the current one.
    fn peek_second(&self) -> Option<&Token> {
        self.tokens.get(self.pos + 1).map(|(t, _)| t)
    }

    /// Get the span of the current token.
    fn peek_span(&self) -> Span {
        self.tokens
            .get(self.pos)
            .map(|(_, s)| s.clone())
            .unwrap_or_else(|| self.eof_span())
    }

    /// Get the span representing end-of-input.
    fn eof_span(&self) -> Span {
        let end = self.tokens.last().map(|(_, s)| s.end).unwrap_or(0);
        end..end
    }

    /// Advance to the next token, returning the current one.
    fn advance(&mut self) -> Option<&SpannedToken> {
        let token = self.tokens.get(self.pos);
        if token.is_some() {
            self.pos += 1;
        }
        token
    }

    /// Check if the current token matches the given token.
    fn check(&self, token: &Token) -> bool {
        self.peek().map_or(false, |t| t == token)
    }

    /// Consume the current token if it matches, returning true if consumed.
    fn match_token(&mut self, token: &Token) -> bool {
        if self.check(token) {
            self.advance();
            true
        } else {
            false
        }
    }

    /// Expect a specific token, returning an error if not found.
    fn expect(&mut self, token: &Token) -> Result<Span, ParseError> {
        if self.check(token) {
            let span = self.peek_span();
            self.advance();
            Ok(span)
        } else {
            Err(self.unexpected(&format!("'{}'", token)))
        }
    }

    /// Build an error describing what was expected at the current position.
    fn unexpected(&self, expected: &str) -> ParseError {
        let message = match self.peek() {
            Some(found) => format!("expected {}, found '{}'", expected, found),
            None => format!("expected {}, found end of input", expected),
        };
        ParseError {
            message,
            span: self.peek_span(),
        }
    }

    /// Expect a string literal, returning its value and span.
    fn expect_string(&mut self, what: &str) -> Result<(String, Span), ParseError> {
        match self.peek().cloned() {
            Some(Token::String(s)) => {
                let span = self.peek_span();
                self.advance();
                Ok((s, span))
            }
            _ => Err(self.unexpected(what)),
        }
    }

    /// Check if we've reached the end of the token stream.
    pub fn at_end(&self) -> bool {
        self.pos >= self.tokens.len()
    }

    fn binary(&mut self, op: BinaryOp, left: SpannedExpr, right: SpannedExpr) -> SpannedExpr {
        let span = left.span.start..right.span.end;
        Spanned::new(
            self.next_id(),
            Expr::Binary {
                op,
                left: Box::new(left),
                right: Box::new(right),
            },
            span,
        )
    }

    // === Expression Parsing ===

    /// Parse an expression (entry point).
    pub fn parse_expr(&mut self) -> Result<SpannedExpr, ParseError> {
        self.parse_or()
    }

    /// Parse logical OR: expr OR expr
    fn parse_or(&mut self) -> Result<SpannedExpr, ParseError> {
        let mut left = self.parse_and()?;

        while self.match_token(&Token::Or) {
            let right = self.parse_and()?;
            left = self.binary(BinaryOp::Or, left, right);
        }

        Ok(left)
    }

    /// Parse logical AND: expr AND expr
    fn parse_and(&mut self) -> Result<SpannedExpr, ParseError> {
        let mut left = self.parse_not()?;

        while self.match_token(&Token::And) {
            let right = self.parse_not()?;
            left = self.binary(BinaryOp::And, left, right);
        }

        Ok(left)
    }

    /// Parse logical negation: NOT expr
    fn parse_not(&mut self) -> Result<SpannedExpr, ParseError> {
        let start = self.peek_span().start;

        if self.match_token(&Token::Not) {
            let expr = self.parse_not()?;
            let span = start..expr.span.end;
            Ok(Spanned::new(
                self.next_id(),
                Expr::Unary {
                    op: UnaryOp::Not,
                    expr: Box::new(expr),
                },
                span,
            ))
        } else {
            self.parse_equality()
        }
    }

    /// Parse equality operators: = <> IS NULL, IS NOT NULL
    fn parse_equality(&mut self) -> Result<SpannedExpr, ParseError> {
        let mut left = self.parse_comparison()?;

        loop {
            if self.match_token(&Token::Eq) {
                let right = self.parse_comparison()?;
                left = self.binary(BinaryOp::Eq, left, right);
            } else if self.match_token(&Token::Ne) {
                let right = self.parse_comparison()?;
                left = self.binary(BinaryOp::Ne, left, right);
            } else if self.match_token(&Token::Is) {
                let negated = self.match_token(&Token::Not);
                let end = self.expect(&Token::Null)?.end;
                let span = left.span.start..end;
                left = Spanned::new(
                    self.next_id(),
                    Expr::IsNull {
                        expr: Box::new(left),
                        negated,
                    },
                    span,
                );
            } else {
                break;
            }
        }

        Ok(left)
    }

    /// Parse relational operators: < <= > >= [NOT] LIKE, [NOT] BETWEEN, [NOT] IN
    fn parse_comparison(&mut self) -> Result<SpannedExpr, ParseError> {
        let mut left = self.parse_additive()?;

        loop {
            if let Some(op) = self.peek_relop() {
                self.advance();
                let right = self.parse_additive()?;
                left = self.binary(op, left, right);
                continue;
            }

            // NOT only continues a comparison when followed by LIKE/BETWEEN/IN.
            let negated = matches!(
                (self.peek(), self.peek_second()),
                (Some(Token::Not), Some(Token::Like | Token::Between | Token::In))
            );
            if negated {
                self.advance();
            }

            left = match self.peek().cloned() {
                Some(Token::Like) => {
                    self.advance();
                    self.parse_like(left, negated)?
                }
                Some(Token::Between) => {
                    self.advance();
                    self.parse_between(left, negated)?
                }
                Some(Token::In) => {
                    self.advance();
                    self.parse_in(left, negated)?
                }
                _ => break,
            };
        }

        Ok(left)
    }

    /// Check if the current token is a relational operator.
    fn peek_relop(&self) -> Option<BinaryOp> {
        match self.peek()? {
            Token::Lt => Some(BinaryOp::Lt),
            Token::Le => Some(BinaryOp::Le),
            Token::Gt => Some(BinaryOp::Gt),
            Token::Ge => Some(BinaryOp::Ge),
            _ => None,
        }
    }

    /// Parse the remainder of `expr [NOT] LIKE 'pattern' [ESCAPE 'c']`.
    fn parse_like(&mut self, expr: SpannedExpr, negated: bool) -> Result<SpannedExpr, ParseError> {
        let (pattern, pattern_span) = self.expect_string("a string pattern after LIKE")?;
        let mut end = pattern_span.end;

        let escape = if self.match_token(&Token::Escape) {
            let (literal, span) = self.expect_string("a string literal after ESCAPE")?;
            let mut chars = literal.chars();
            match (chars.next(), chars.next()) {
                (Some(c), None) => {
                    end = span.end;
                    Some(c)
                }
                _ => {
                    return Err(ParseError {
                        message: format!(
                            "ESCAPE literal must be exactly one character, found '{}'",
                            literal
                        ),
                        span,
                    })
                }
            }
        } else {
            None
        };

        let span = expr.span.start..end;
        Ok(Spanned::new(
            self.next_id(),
            Expr::Like {
                expr: Box::new(expr),
                pattern,
                escape,
                negated,
            },
            span,
        ))
    }

    /// Parse the remainder of `expr [NOT] BETWEEN low AND high`.
    fn parse_between(
        &mut self,
        expr: SpannedExpr,
        negated: bool,
    ) -> Result<SpannedExpr, ParseError> {
        let low = self.parse_additive()?;
        self.expect(&Token::And)?;
        let high = self.parse_additive()?;

        let span = expr.span.start..high.span.end;
        Ok(Spanned::new(
            self.next_id(),
            Expr::Between {
                expr: Box::new(expr),
                low: Box::new(low),
                high: Box::new(high),
                negated,
            },
            span,
        ))
    }

    /// Parse the remainder of `expr [NOT] IN ('a', 'b', ...)`.
    fn parse_in(&mut self, expr: SpannedExpr, negated: bool) -> Result<SpannedExpr, ParseError> {
        self.expect(&Token::LParen)?;

        let mut values = Vec::new();
        values.push(self.expect_string("a string literal in IN list")?.0);
        while self.match_token(&Token::Comma) {
            values.push(self.expect_string("a string literal in IN list")?.0);
        }

        let end = self.expect(&Token::RParen)?.end;
        let span = expr.span.start..end;
        Ok(Spanned::new(
            self.next_id(),
            Expr::In {
                expr: Box::new(expr),
                values,
                negated,
            },
            span,
        ))
    }

    /// Parse additive operators: + -
    fn parse_additive(&mut self) -> Result<SpannedExpr, ParseError> {
        let mut left = self.parse_mult()?;

        loop {
            let op = if self.match_token(&Token::Plus) {
                BinaryOp::Add
            } else if self.match_token(&Token::Minus) {
                BinaryOp::Sub
            } else {
                break;
            };

            let right = self.parse_mult()?;
            left = self.binary(op, left, right);
        }

        Ok(left)
    }

    /// Parse multiplicative operators: * / %
    fn parse_mult(&mut self) -> Result<SpannedExpr, ParseError> {
        let mut left = self.parse_unary()?;

        loop {
            let op = if self.match_token(&Token::Star) {
                BinaryOp::Mul
            } else if self.match_token(&Token::Slash) {
                BinaryOp::Div
            } else if self.match_token(&Token::Percent) {
                BinaryOp::Mod
            } else {
                break;
            };

            let right = self.parse_unary()?;
            left = self.binary(op, left, right);
        }

        Ok(left)
    }

    /// Parse unary sign operators: - +
    fn parse_unary(&mut self) -> Result<SpannedExpr, ParseError> {
        let start = self.peek_span().start;

        if self.match_token(&Token::Minus) {
            let expr = self.parse_unary()?;
            let span = start..expr.span.end;
            Ok(Spanned::new(
                self.next_id(),
                Expr::Unary {
                    op: UnaryOp::Neg,
                    expr: Box::new(expr),
                },
                span,
            ))
        } else if self.match_token(&Token::Plus) {
            // Unary plus is a no-op.
            self.parse_unary()
        } else {
            self.parse_atom()
        }
    }

    /// Parse an atom: literal, identifier, or parenthesized expression.
    fn parse_atom(&mut self) -> Result<SpannedExpr, ParseError> {
        let span = self.peek_span();

        // Clone the token to avoid borrowing issues
        let token = self.peek().cloned();

        let node = match token {
            // Literals
            Some(Token::Int(lit)) => match i32::try_from(lit.value) {
                Ok(n) if !lit.long => Expr::Int(n),
                _ => Expr::Long(lit.value),
            },
            Some(Token::Float(n)) => Expr::Double(n),
            Some(Token::String(s)) => Expr::String(s),
            Some(Token::True) => Expr::Bool(true),
            Some(Token::False) => Expr::Bool(false),
            Some(Token::Null) => Expr::Null,

            // Identifier
            Some(Token::Ident(name)) => Expr::Ident(name),

            // Parenthesized expression
            Some(Token::LParen) => {
                self.advance();
                let expr = self.parse_expr()?;
                self.expect(&Token::RParen)?;
                return Ok(expr);
            }

            _ => return Err(self.unexpected("an expression")),
        };

        self.advance();
        Ok(Spanned::new(self.next_id(), node, span))
    }
}

/// Parse a token stream that must hold exactly one expression.
pub fn parse_tokens(tokens: &[SpannedToken]) -> Result<SpannedExpr, ParseError> {
    if tokens.is_empty() {
        return Err(ParseError::new("empty selector", 0..0));
    }

    let mut parser = Parser::new(tokens);
    let ast = parser.parse_expr()?;
    if !parser.at_end() {
        return Err(parser.unexpected("end of selector"));
    }
    Ok(ast)
}
