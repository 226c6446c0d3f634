//! Expression parsing with operator precedence for Nova
//!
//! Precedence, lowest first: `||`, `&&`, comparison, additive,
//! multiplicative, unary, primary. Binary levels are left-associative and
//! comparisons do not chain.

use crate::lexer::{Position, TokenType};
use crate::ast::*;
use super::parser::Parser;
use super::error::{ParseContext, ParseResult};

impl Parser {
    /// Parse an expression (entry point for expression parsing)
    pub fn parse_expression(&mut self) -> ParseResult<Expr> {
        self.parse_logical_or_expression()
    }

    /// True if the current token can begin an expression
    pub fn can_start_expression(&self) -> bool {
        matches!(
            self.current_token().token_type,
            TokenType::Identifier(_)
                | TokenType::Number(_)
                | TokenType::String(_)
                | TokenType::True
                | TokenType::False
                | TokenType::LeftParen
                | TokenType::Minus
                | TokenType::Not
        )
    }

    fn parse_logical_or_expression(&mut self) -> ParseResult<Expr> {
        let mut expr = self.parse_logical_and_expression()?;

        while self.match_token(&TokenType::LogicalOr) {
            let right = self.parse_logical_and_expression()?;
            expr = binary(expr, BinaryOp::LogicalOr, right);
        }

        Ok(expr)
    }

    fn parse_logical_and_expression(&mut self) -> ParseResult<Expr> {
        let mut expr = self.parse_comparison_expression()?;

        while self.match_token(&TokenType::LogicalAnd) {
            let right = self.parse_comparison_expression()?;
            expr = binary(expr, BinaryOp::LogicalAnd, right);
        }

        Ok(expr)
    }

    fn parse_comparison_expression(&mut self) -> ParseResult<Expr> {
        let expr = self.parse_additive_expression()?;

        let op = match self.current_token().token_type {
            TokenType::Eq => BinaryOp::Equal,
            TokenType::NotEq => BinaryOp::NotEqual,
            TokenType::Less => BinaryOp::Less,
            TokenType::LessEq => BinaryOp::LessEqual,
            TokenType::Greater => BinaryOp::Greater,
            TokenType::GreaterEq => BinaryOp::GreaterEqual,
            _ => return Ok(expr),
        };
        self.advance();
        let right = self.parse_additive_expression()?;
        Ok(binary(expr, op, right))
    }

    fn parse_additive_expression(&mut self) -> ParseResult<Expr> {
        let mut expr = self.parse_multiplicative_expression()?;

        loop {
            let op = match self.current_token().token_type {
                TokenType::Plus => BinaryOp::Add,
                TokenType::Minus => BinaryOp::Subtract,
                _ => break,
            };
            self.advance();
            let right = self.parse_multiplicative_expression()?;
            expr = binary(expr, op, right);
        }

        Ok(expr)
    }

    fn parse_multiplicative_expression(&mut self) -> ParseResult<Expr> {
        let mut expr = self.parse_unary_expression()?;

        loop {
            let op = match self.current_token().token_type {
                TokenType::Star => BinaryOp::Multiply,
                TokenType::Slash => BinaryOp::Divide,
                TokenType::Percent => BinaryOp::Modulo,
                _ => break,
            };
            self.advance();
            let right = self.parse_unary_expression()?;
            expr = binary(expr, op, right);
        }

        Ok(expr)
    }

    fn parse_unary_expression(&mut self) -> ParseResult<Expr> {
        let op = match self.current_token().token_type {
            TokenType::Not => UnaryOp::Not,
            TokenType::Minus => UnaryOp::Negate,
            _ => return self.parse_primary_expression(),
        };
        let start_pos = self.advance().position;
        let operand = self.parse_unary_expression()?;
        let span = Span::new(start_pos, operand.span().end);

        Ok(Expr::Unary {
            op,
            operand: Box::new(operand),
            span,
        })
    }

    /// Literals, identifiers, calls and parenthesized expressions
    fn parse_primary_expression(&mut self) -> ParseResult<Expr> {
        let token = self.current_token().clone();
        let span = Span::single(token.position);

        let literal = match token.token_type {
            TokenType::Number(value) => Literal::Number(value),
            TokenType::String(value) => Literal::String(value),
            TokenType::True => Literal::Bool(true),
            TokenType::False => Literal::Bool(false),
            TokenType::Identifier(name) => {
                self.advance();
                if self.check(&TokenType::LeftParen) {
                    return self.parse_call_arguments(name, token.position);
                }
                return Ok(Expr::Identifier {
                    name,
                    binding: None,
                    span,
                });
            }
            TokenType::LeftParen => {
                self.advance();
                let expr = self.parse_expression()?;
                self.expect(TokenType::RightParen, ParseContext::Expression)?;
                return Ok(expr);
            }
            _ => return Err(self.error_here("expression", ParseContext::Expression)),
        };

        self.advance();
        Ok(Expr::Literal { value: literal, span })
    }

    /// `(arg, ...)` following a callee name
    fn parse_call_arguments(&mut self, callee: String, start_pos: Position) -> ParseResult<Expr> {
        self.expect(TokenType::LeftParen, ParseContext::CallArguments)?;
        let mut args = Vec::new();

        if !self.check(&TokenType::RightParen) {
            loop {
                args.push(self.parse_expression()?);
                if !self.match_token(&TokenType::Comma) {
                    break;
                }
            }
        }

        self.expect(TokenType::RightParen, ParseContext::CallArguments)?;
        Ok(Expr::Call {
            callee,
            args,
            span: self.span_from(start_pos),
        })
    }
}

fn binary(left: Expr, op: BinaryOp, right: Expr) -> Expr {
    let span = Span::new(left.span().start, right.span().end);
    Expr::Binary {
        left: Box::new(left),
        op,
        right: Box::new(right),
        span,
    }
}
