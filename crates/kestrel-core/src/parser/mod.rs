//! Recursive descent parser from tokens to top-level statements
//!
//! Statements are separated by newlines or `;`. Expressions use precedence
//! climbing, lowest first: `or`, `and`, equality, comparison, additive,
//! multiplicative, unary (`-`, `not`), power (`^`, right associative).

use crate::ast::{AssignOp, BinaryOp, Expr, Stmt, UnaryOp};
use crate::lexer::{Token, TokenKind};

mod errors;
mod stream;

pub use errors::SyntaxError;
use stream::TokenStream;

/// Deepest nesting of blocks and expressions accepted before giving up.
pub const MAX_DEPTH: usize = 64;

/// The reference parser stage
#[derive(Debug, Default, Clone, Copy)]
pub struct Parser;

impl Parser {
    pub fn new() -> Self {
        Parser
    }

    pub fn parse(&self, tokens: &[Token]) -> Result<Vec<Stmt>, SyntaxError> {
        StmtParser::new(tokens).program()
    }
}

/// Parse a token slice with the reference parser
pub fn parse(tokens: &[Token]) -> Result<Vec<Stmt>, SyntaxError> {
    Parser::new().parse(tokens)
}

struct StmtParser<'t> {
    stream: TokenStream<'t>,
    depth: usize,
}

impl<'t> StmtParser<'t> {
    fn new(tokens: &'t [Token]) -> Self {
        StmtParser {
            stream: TokenStream::new(tokens),
            depth: 0,
        }
    }

    fn program(&mut self) -> Result<Vec<Stmt>, SyntaxError> {
        let mut statements = Vec::new();
        self.stream.skip_separators();
        while !self.stream.at_end() {
            statements.push(self.statement()?);
            if self.stream.at_end() {
                break;
            }
            if self.stream.skip_separators() == 0 {
                return Err(SyntaxError::expected(
                    "end of statement",
                    self.stream.peek(),
                    self.stream.eof_span(),
                ));
            }
        }
        Ok(statements)
    }

    /// Run `f` one nesting level deeper, failing past [`MAX_DEPTH`].
    fn nested<T>(
        &mut self,
        f: impl FnOnce(&mut Self) -> Result<T, SyntaxError>,
    ) -> Result<T, SyntaxError> {
        if self.depth >= MAX_DEPTH {
            let span = self
                .stream
                .peek()
                .map(|t| t.span)
                .unwrap_or_else(|| self.stream.eof_span());
            return Err(SyntaxError::new("program is nested too deeply", Some(span)));
        }
        self.depth += 1;
        let result = f(self);
        self.depth -= 1;
        result
    }

    fn statement(&mut self) -> Result<Stmt, SyntaxError> {
        let Some(token) = self.stream.peek() else {
            return Err(SyntaxError::expected("statement", None, self.stream.eof_span()));
        };

        match &token.kind {
            TokenKind::Print => self.print_stmt(),
            TokenKind::If => self.if_stmt(),
            TokenKind::While => self.while_stmt(),
            TokenKind::Break => {
                self.stream.advance();
                Ok(Stmt::Break { span: token.span })
            }
            TokenKind::Continue => {
                self.stream.advance();
                Ok(Stmt::Continue { span: token.span })
            }
            TokenKind::Identifier(name) => match self
                .stream
                .peek_nth(1)
                .and_then(|t| assign_op(&t.kind))
            {
                Some(op) => {
                    self.stream.advance();
                    self.stream.advance();
                    let value = self.expression()?;
                    let span = token.span.merge(value.span());
                    Ok(Stmt::Assignment {
                        name: name.clone(),
                        op,
                        value,
                        span,
                    })
                }
                None => self.expression_stmt(),
            },
            _ => self.expression_stmt(),
        }
    }

    fn expression_stmt(&mut self) -> Result<Stmt, SyntaxError> {
        let expr = self.expression()?;
        let span = expr.span();
        Ok(Stmt::Expression { expr, span })
    }

    fn print_stmt(&mut self) -> Result<Stmt, SyntaxError> {
        let start = self.stream.expect(TokenKind::Print, "'print'")?;
        self.stream.expect(TokenKind::LParen, "'(' after 'print'")?;
        let value = self.expression()?;
        let end = self.stream.expect(TokenKind::RParen, "')'")?;
        Ok(Stmt::Print {
            value,
            span: start.merge(end),
        })
    }

    fn if_stmt(&mut self) -> Result<Stmt, SyntaxError> {
        let start = self.stream.expect(TokenKind::If, "'if'")?;
        let condition = self.expression()?;
        let then_block = self.block()?;

        let else_block = if self.stream.skip_newlines_before(&TokenKind::Else) {
            self.stream.advance();
            if self.stream.check(&TokenKind::If) {
                Some(vec![self.nested(|p| p.if_stmt())?])
            } else {
                Some(self.block()?)
            }
        } else {
            None
        };

        Ok(Stmt::If {
            condition,
            then_block,
            else_block,
            span: start.merge(self.stream.previous_span()),
        })
    }

    fn while_stmt(&mut self) -> Result<Stmt, SyntaxError> {
        let start = self.stream.expect(TokenKind::While, "'while'")?;
        let condition = self.expression()?;
        let body = self.block()?;
        Ok(Stmt::While {
            condition,
            body,
            span: start.merge(self.stream.previous_span()),
        })
    }

    fn block(&mut self) -> Result<Vec<Stmt>, SyntaxError> {
        self.stream.expect(TokenKind::LBrace, "'{'")?;
        self.nested(|p| {
            let mut statements = Vec::new();
            p.stream.skip_separators();
            while p.stream.eat(&TokenKind::RBrace).is_none() {
                if p.stream.at_end() {
                    return Err(SyntaxError::expected("'}'", None, p.stream.eof_span()));
                }
                statements.push(p.statement()?);
                if p.stream.check(&TokenKind::RBrace) {
                    continue;
                }
                if p.stream.skip_separators() == 0 {
                    return Err(SyntaxError::expected(
                        "end of statement or '}'",
                        p.stream.peek(),
                        p.stream.eof_span(),
                    ));
                }
            }
            Ok(statements)
        })
    }

    fn expression(&mut self) -> Result<Expr, SyntaxError> {
        self.nested(|p| p.or_expr())
    }

    /// Parse a left-associative level: `next (op next)*`
    fn binary_level(
        &mut self,
        op_for: fn(&TokenKind) -> Option<BinaryOp>,
        next: fn(&mut Self) -> Result<Expr, SyntaxError>,
    ) -> Result<Expr, SyntaxError> {
        let mut left = next(self)?;
        while let Some(op) = self.stream.peek_kind().and_then(op_for) {
            self.stream.advance();
            let right = next(self)?;
            let span = left.span().merge(right.span());
            left = Expr::Binary {
                left: Box::new(left),
                op,
                right: Box::new(right),
                span,
            };
        }
        Ok(left)
    }

    fn or_expr(&mut self) -> Result<Expr, SyntaxError> {
        self.binary_level(
            |k| matches!(k, TokenKind::Or).then_some(BinaryOp::Or),
            Self::and_expr,
        )
    }

    fn and_expr(&mut self) -> Result<Expr, SyntaxError> {
        self.binary_level(
            |k| matches!(k, TokenKind::And).then_some(BinaryOp::And),
            Self::equality,
        )
    }

    fn equality(&mut self) -> Result<Expr, SyntaxError> {
        self.binary_level(
            |k| match k {
                TokenKind::EqEq => Some(BinaryOp::Eq),
                TokenKind::NotEq => Some(BinaryOp::Ne),
                _ => None,
            },
            Self::comparison,
        )
    }

    fn comparison(&mut self) -> Result<Expr, SyntaxError> {
        self.binary_level(
            |k| match k {
                TokenKind::Lt => Some(BinaryOp::Lt),
                TokenKind::Le => Some(BinaryOp::Le),
                TokenKind::Gt => Some(BinaryOp::Gt),
                TokenKind::Ge => Some(BinaryOp::Ge),
                _ => None,
            },
            Self::additive,
        )
    }

    fn additive(&mut self) -> Result<Expr, SyntaxError> {
        self.binary_level(
            |k| match k {
                TokenKind::Plus => Some(BinaryOp::Add),
                TokenKind::Minus => Some(BinaryOp::Sub),
                _ => None,
            },
            Self::multiplicative,
        )
    }

    fn multiplicative(&mut self) -> Result<Expr, SyntaxError> {
        self.binary_level(
            |k| match k {
                TokenKind::Star => Some(BinaryOp::Mul),
                TokenKind::Slash => Some(BinaryOp::Div),
                TokenKind::Percent => Some(BinaryOp::Mod),
                _ => None,
            },
            Self::unary,
        )
    }

    fn unary(&mut self) -> Result<Expr, SyntaxError> {
        let op = match self.stream.peek_kind() {
            Some(TokenKind::Minus) => UnaryOp::Neg,
            Some(TokenKind::Not) => UnaryOp::Not,
            _ => return self.power(),
        };
        let start = self.stream.advance().map(|t| t.span).unwrap_or_default();
        let operand = self.nested(|p| p.unary())?;
        let span = start.merge(operand.span());
        Ok(Expr::Unary {
            op,
            operand: Box::new(operand),
            span,
        })
    }

    fn power(&mut self) -> Result<Expr, SyntaxError> {
        let base = self.primary()?;
        if self.stream.eat(&TokenKind::Caret).is_none() {
            return Ok(base);
        }
        let exponent = self.nested(|p| p.unary())?;
        let span = base.span().merge(exponent.span());
        Ok(Expr::Binary {
            left: Box::new(base),
            op: BinaryOp::Pow,
            right: Box::new(exponent),
            span,
        })
    }

    fn primary(&mut self) -> Result<Expr, SyntaxError> {
        let Some(token) = self.stream.peek() else {
            return Err(SyntaxError::expected("expression", None, self.stream.eof_span()));
        };

        let expr = match &token.kind {
            TokenKind::Number(value) => Expr::Number {
                value: *value,
                span: token.span,
            },
            TokenKind::True => Expr::Boolean {
                value: true,
                span: token.span,
            },
            TokenKind::False => Expr::Boolean {
                value: false,
                span: token.span,
            },
            TokenKind::Identifier(name) => Expr::Identifier {
                name: name.clone(),
                span: token.span,
            },
            TokenKind::LParen => {
                self.stream.advance();
                let inner = self.expression()?;
                self.stream.expect(TokenKind::RParen, "')'")?;
                return Ok(inner);
            }
            TokenKind::Unknown(c) => {
                return Err(SyntaxError::new(
                    format!("unexpected character '{}'", c.escape_debug()),
                    Some(token.span),
                ));
            }
            _ => {
                return Err(SyntaxError::expected(
                    "expression",
                    Some(token),
                    self.stream.eof_span(),
                ));
            }
        };
        self.stream.advance();
        Ok(expr)
    }
}

fn assign_op(kind: &TokenKind) -> Option<AssignOp> {
    match kind {
        TokenKind::Assign => Some(AssignOp::Assign),
        TokenKind::PlusAssign => Some(AssignOp::AddAssign),
        TokenKind::MinusAssign => Some(AssignOp::SubAssign),
        TokenKind::StarAssign => Some(AssignOp::MulAssign),
        TokenKind::SlashAssign => Some(AssignOp::DivAssign),
        _ => None,
    }
}
