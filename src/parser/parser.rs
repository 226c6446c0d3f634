//! Main parser implementation for the Nova language

use crate::lexer::{Token, TokenType, Position};
use crate::ast::*;
use super::error::{ParseContext, ParseError, ParseResult};

/// The main parser struct that converts tokens to AST.
///
/// Uses a single token of lookahead (two for the few places where an
/// identifier may start either an assignment or a call). Errors are
/// collected and parsing resumes at the next statement boundary.
pub struct Parser {
    tokens: Vec<Token>,
    current: usize,
    errors: Vec<ParseError>,
}

impl Parser {
    /// Create a new parser over a token stream produced by the lexer
    pub fn new(mut tokens: Vec<Token>) -> Self {
        if tokens.last().map_or(true, |t| t.token_type != TokenType::Eof) {
            let end = tokens.last().map(|t| t.position).unwrap_or_else(Position::start);
            tokens.push(Token::new(TokenType::Eof, "", end));
        }
        Parser {
            tokens,
            current: 0,
            errors: Vec::new(),
        }
    }

    /// Get the current token without consuming it
    pub fn current_token(&self) -> &Token {
        // `new` guarantees a trailing Eof and `advance` never moves past it
        &self.tokens[self.current]
    }

    /// Token type `offset` tokens ahead, clamped to the trailing Eof
    pub fn peek_type(&self, offset: usize) -> &TokenType {
        let index = (self.current + offset).min(self.tokens.len() - 1);
        &self.tokens[index].token_type
    }

    /// Advance to the next token, returning the one consumed
    pub fn advance(&mut self) -> Token {
        let token = self.current_token().clone();
        if !self.is_at_end() {
            self.current += 1;
        }
        token
    }

    /// Check if current token matches the expected type
    pub fn check(&self, token_type: &TokenType) -> bool {
        std::mem::discriminant(&self.current_token().token_type) == std::mem::discriminant(token_type)
    }

    /// Check if we've reached the end of input
    pub fn is_at_end(&self) -> bool {
        self.current_token().token_type == TokenType::Eof
    }

    /// Consume a token if it matches the expected type
    pub fn match_token(&mut self, token_type: &TokenType) -> bool {
        if self.check(token_type) {
            self.advance();
            true
        } else {
            false
        }
    }

    /// Expect a specific token type and consume it, or return an error
    pub fn expect(&mut self, expected: TokenType, context: ParseContext) -> ParseResult<Token> {
        if self.check(&expected) {
            Ok(self.advance())
        } else {
            Err(self.error_here(&expected.to_string(), context))
        }
    }

    /// Expect an identifier and return its text and position
    pub fn expect_identifier(&mut self, what: &str, context: ParseContext) -> ParseResult<(String, Position)> {
        if let TokenType::Identifier(name) = &self.current_token().token_type {
            let name = name.clone();
            let position = self.advance().position;
            Ok((name, position))
        } else {
            Err(self.error_here(what, context))
        }
    }

    /// Build an error describing the current token
    pub fn error_here(&self, expected: &str, context: ParseContext) -> ParseError {
        let token = self.current_token();
        ParseError::unexpected(expected, &token.token_type, token.position, context)
    }

    /// Get current position for error reporting
    pub fn current_position(&self) -> Position {
        self.current_token().position
    }

    /// Position of the most recently consumed token
    pub fn previous_position(&self) -> Position {
        self.tokens[self.current.saturating_sub(1)].position
    }

    /// Span from `start` to the last consumed token
    pub fn span_from(&self, start: Position) -> Span {
        Span::new(start, self.previous_position())
    }

    /// Add an error to the error list but continue parsing
    pub fn add_error(&mut self, error: ParseError) {
        self.errors.push(error);
    }

    /// Get all accumulated errors
    pub fn errors(&self) -> &[ParseError] {
        &self.errors
    }

    pub fn into_errors(self) -> Vec<ParseError> {
        self.errors
    }

    /// Record `error` and skip ahead to a point where parsing can resume.
    /// `start` is the token index where the failed production began; at
    /// least one token is always consumed so recovery cannot loop.
    pub fn recover(&mut self, error: ParseError, start: usize) {
        self.add_error(error);
        if self.current == start {
            self.advance();
        }
        self.synchronize();
    }

    /// Skip tokens until a statement keyword or a block delimiter
    pub fn synchronize(&mut self) {
        while !self.is_at_end() {
            match &self.current_token().token_type {
                TokenType::Semicolon => {
                    self.advance();
                    return;
                }
                TokenType::LeftBrace | TokenType::RightBrace => return,
                token if token.starts_statement() => return,
                _ => {
                    self.advance();
                }
            }
        }
    }

    pub(crate) fn position_index(&self) -> usize {
        self.current
    }

    /// Parse a complete program (top-level entry point)
    pub fn parse_program(&mut self) -> Program {
        let start_pos = self.current_position();
        let mut statements = Vec::new();

        while !self.is_at_end() {
            let start = self.position_index();
            match self.parse_statement() {
                Ok(stmt) => statements.push(stmt),
                Err(err) => self.recover(err, start),
            }
        }

        let end_pos = self.current_position();
        Program {
            statements,
            span: Span::new(start_pos, end_pos),
        }
    }
}
