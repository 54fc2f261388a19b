//! Recursive-descent parser for boolean formulas.

use super::ast::{BinOp, Expr};
use super::lexer::{Lexer, Token, TokenKind};
use crate::error::{CircuitError, Result};

/// Parser for a single formula.
pub struct Parser<'a> {
    lexer: Lexer<'a>,
    current: Token,
}

impl<'a> Parser<'a> {
    /// Create a new parser, reading the first token.
    pub fn new(mut lexer: Lexer<'a>) -> Result<Self> {
        let current = lexer.next_token()?;
        Ok(Self { lexer, current })
    }

    /// Parse a whole formula; trailing input is an error.
    pub fn parse(&mut self) -> Result<Expr> {
        let expr = self.parse_expr()?;
        if self.current.kind != TokenKind::Eof {
            return Err(CircuitError::parse(
                self.current.column,
                format!("unexpected token: {:?}", self.current.text),
            ));
        }
        Ok(expr)
    }

    fn advance(&mut self) -> Result<()> {
        self.current = self.lexer.next_token()?;
        Ok(())
    }

    fn expect(&mut self, kind: TokenKind) -> Result<Token> {
        if self.current.kind == kind {
            let tok = self.current.clone();
            self.advance()?;
            Ok(tok)
        } else {
            Err(CircuitError::parse(
                self.current.column,
                format!("expected {:?}, got {:?}", kind, self.current.kind),
            ))
        }
    }

    fn operator(&self) -> Option<BinOp> {
        match self.current.kind {
            TokenKind::Ampersand => Some(BinOp::And),
            TokenKind::Pipe => Some(BinOp::Or),
            TokenKind::Caret => Some(BinOp::Xor),
            _ => None,
        }
    }

    /// `expr = unary { op unary }`, one connective per group.
    fn parse_expr(&mut self) -> Result<Expr> {
        let first = self.parse_unary()?;
        let Some(op) = self.operator() else {
            return Ok(first);
        };
        let mut operands = vec![first];
        while let Some(next) = self.operator() {
            if next != op {
                return Err(CircuitError::parse(
                    self.current.column,
                    format!(
                        "cannot mix '{}' and '{}' without parentheses",
                        op.symbol(),
                        next.symbol()
                    ),
                ));
            }
            self.advance()?;
            operands.push(self.parse_unary()?);
        }
        Ok(Expr::Op(op, operands))
    }

    fn parse_unary(&mut self) -> Result<Expr> {
        if self.current.kind == TokenKind::Tilde {
            self.advance()?;
            return Ok(Expr::Not(Box::new(self.parse_unary()?)));
        }
        self.parse_atom()
    }

    fn parse_atom(&mut self) -> Result<Expr> {
        let tok = self.current.clone();
        match tok.kind {
            TokenKind::OpenParen => {
                self.advance()?;
                let inner = self.parse_expr()?;
                self.expect(TokenKind::CloseParen)?;
                Ok(inner)
            }
            TokenKind::Zero | TokenKind::One => {
                self.advance()?;
                Ok(Expr::Const(tok.kind == TokenKind::One))
            }
            TokenKind::Identifier => {
                self.advance()?;
                Ok(Expr::Var(tok.text))
            }
            TokenKind::Eof => Err(CircuitError::parse(tok.column, "unexpected end of formula")),
            _ => Err(CircuitError::parse(
                tok.column,
                format!("expected operand, got {:?}", tok.text),
            )),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(input: &str) -> Result<Expr> {
        Parser::new(Lexer::new(input))?.parse()
    }

    fn var(name: &str) -> Expr {
        Expr::Var(name.to_string())
    }

    #[test]
    fn test_flat_groups() {
        assert_eq!(
            parse("a ^ b ^ 1").unwrap(),
            Expr::Op(BinOp::Xor, vec![var("a"), var("b"), Expr::Const(true)])
        );
    }

    #[test]
    fn test_negation_binds_tightest() {
        assert_eq!(
            parse("~a & ~~(b | 0)").unwrap(),
            Expr::Op(
                BinOp::And,
                vec![
                    Expr::Not(Box::new(var("a"))),
                    Expr::Not(Box::new(Expr::Not(Box::new(Expr::Op(
                        BinOp::Or,
                        vec![var("b"), Expr::Const(false)]
                    ))))),
                ]
            )
        );
    }

    #[test]
    fn test_mixed_operators_need_parentheses() {
        let err = parse("a & b | c").unwrap_err();
        assert!(matches!(err, CircuitError::ParseError { column: 7, .. }));
        assert!(parse("(a & b) | c").is_ok());
    }

    #[test]
    fn test_parse_errors() {
        assert!(matches!(parse(""), Err(CircuitError::ParseError { column: 1, .. })));
        assert!(matches!(parse("(a & b"), Err(CircuitError::ParseError { column: 7, .. })));
        assert!(matches!(parse("a b"), Err(CircuitError::ParseError { column: 3, .. })));
        assert!(matches!(parse("a &"), Err(CircuitError::ParseError { column: 4, .. })));
    }

    #[test]
    fn test_display_round_trips() {
        let expr = parse("~(a | b) ^ (c & 1)").unwrap();
        assert_eq!(expr.to_string(), "~(a | b) ^ (c & 1)");
        assert_eq!(parse(&expr.to_string()).unwrap(), expr);
    }
}
