pub mod token;
pub mod error;
pub mod position;
pub mod lexer;
#[cfg(test)]
mod lexer_tests;

pub use self::lexer::Lexer;
pub use self::token::{Token, TokenType, TokenCategory};
pub use self::position::Position;
pub use self::error::LexerError;
