//! Parse errors for the Nova parser
//!
//! Every error names what the parser expected and what it found, plus the
//! construct it was working on, so a single message is enough to fix the
//! statement.

use crate::diagnostics::{Diagnostic, Stage};
use crate::lexer::{Position, TokenType};
use std::fmt;
use thiserror::Error;

/// Parse context for better error messages
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParseContext {
    TopLevel,
    Statement,
    Block,
    VariableDeclaration,
    Assignment,
    PrintStatement,
    IfCondition,
    WhileCondition,
    Expression,
    CallArguments,
    WindowDeclaration,
    ControlDeclaration,
    IconDeclaration,
}

impl fmt::Display for ParseContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ParseContext::TopLevel => write!(f, "at top level"),
            ParseContext::Statement => write!(f, "in statement"),
            ParseContext::Block => write!(f, "in block"),
            ParseContext::VariableDeclaration => write!(f, "in `have` declaration"),
            ParseContext::Assignment => write!(f, "in assignment"),
            ParseContext::PrintStatement => write!(f, "in `put` statement"),
            ParseContext::IfCondition => write!(f, "in `when` condition"),
            ParseContext::WhileCondition => write!(f, "in `while` condition"),
            ParseContext::Expression => write!(f, "in expression"),
            ParseContext::CallArguments => write!(f, "in call arguments"),
            ParseContext::WindowDeclaration => write!(f, "in window declaration"),
            ParseContext::ControlDeclaration => write!(f, "in control declaration"),
            ParseContext::IconDeclaration => write!(f, "in `set_icon`"),
        }
    }
}

/// Syntax errors with the position of the offending token
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ParseError {
    /// Unexpected token with contextual information
    #[error("expected {expected}, found {found} {context}")]
    UnexpectedToken {
        expected: String,
        found: TokenType,
        position: Position,
        context: ParseContext,
    },

    /// Input ended while a construct was still open
    #[error("expected {expected}, found end of input {context}")]
    UnexpectedEof {
        expected: String,
        position: Position,
        context: ParseContext,
    },

    /// Well-formed tokens in a place the language does not allow
    #[error("{message}")]
    InvalidSyntax {
        message: String,
        position: Position,
    },
}

impl ParseError {
    /// Create an UnexpectedToken or UnexpectedEof error depending on `found`
    pub fn unexpected(
        expected: &str,
        found: &TokenType,
        position: Position,
        context: ParseContext,
    ) -> Self {
        if *found == TokenType::Eof {
            ParseError::UnexpectedEof {
                expected: expected.to_string(),
                position,
                context,
            }
        } else {
            ParseError::UnexpectedToken {
                expected: expected.to_string(),
                found: found.clone(),
                position,
                context,
            }
        }
    }

    /// Create a simple InvalidSyntax error
    pub fn invalid_syntax(message: impl Into<String>, position: Position) -> Self {
        ParseError::InvalidSyntax {
            message: message.into(),
            position,
        }
    }

    pub fn position(&self) -> Position {
        match self {
            ParseError::UnexpectedToken { position, .. }
            | ParseError::UnexpectedEof { position, .. }
            | ParseError::InvalidSyntax { position, .. } => *position,
        }
    }

    pub fn to_diagnostic(&self) -> Diagnostic {
        Diagnostic::error(Stage::Parse, self.to_string(), self.position())
    }
}

/// Result type for parser operations
pub type ParseResult<T> = Result<T, ParseError>;
