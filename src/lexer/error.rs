use thiserror::Error;
use crate::lexer::position::Position;

/// Represents errors that can occur during lexical analysis
#[derive(Debug, Clone, PartialEq, Error)]
pub enum LexerError {
    /// Invalid character encountered
    #[error("Invalid character '{0}' at {1}")]
    InvalidCharacter(char, Position),
    /// Invalid escape sequence in a string literal
    #[error("Invalid escape sequence '{0}' at {1}")]
    InvalidEscapeSequence(String, Position),
    /// Unterminated string literal
    #[error("Unterminated string literal starting at {0}")]
    UnterminatedString(Position),
    /// Numeric literal too large to represent
    #[error("Number '{0}' is out of range at {1}")]
    NumberOutOfRange(String, Position),
}

impl LexerError {
    pub fn position(&self) -> Position {
        match self {
            LexerError::InvalidCharacter(_, pos)
            | LexerError::InvalidEscapeSequence(_, pos)
            | LexerError::UnterminatedString(pos)
            | LexerError::NumberOutOfRange(_, pos) => *pos,
        }
    }
}
