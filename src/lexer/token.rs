use std::fmt;
use serde::Serialize;
use crate::lexer::position::Position;

/// Token type for the Nova language
#[derive(Debug, Clone, PartialEq)]
pub enum TokenType {
    // End of file
    Eof,

    // Literals
    Identifier(String),
    Number(f64),
    String(String),

    // Keywords
    Have,
    Put,
    When,
    Otherwise,
    While,
    SetIcon,
    Window,
    True,
    False,

    // Operators
    Plus,           // +
    Minus,          // -
    Star,           // *
    Slash,          // /
    Percent,        // %
    Not,            // !
    Less,           // <
    Greater,        // >
    Equal,          // =

    // Compound operators
    LogicalAnd,     // &&
    LogicalOr,      // ||
    Eq,             // ==
    NotEq,          // !=
    LessEq,         // <=
    GreaterEq,      // >=

    // Punctuation
    LeftParen,      // (
    RightParen,     // )
    LeftBrace,      // {
    RightBrace,     // }
    Comma,          // ,
    Semicolon,      // ;
}

/// Coarse token classification exposed to callers that do not care about
/// individual keywords or operators
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum TokenCategory {
    Identifier,
    Keyword,
    StringLiteral,
    NumberLiteral,
    Punctuation,
    EndOfInput,
}

impl TokenType {
    /// Look up the keyword spelled by `ident`, if any
    pub fn keyword(ident: &str) -> Option<TokenType> {
        let token = match ident {
            "have" => TokenType::Have,
            "put" => TokenType::Put,
            "when" => TokenType::When,
            "otherwise" => TokenType::Otherwise,
            "while" => TokenType::While,
            "set_icon" => TokenType::SetIcon,
            "window" => TokenType::Window,
            "true" => TokenType::True,
            "false" => TokenType::False,
            _ => return None,
        };
        Some(token)
    }

    pub fn category(&self) -> TokenCategory {
        match self {
            TokenType::Eof => TokenCategory::EndOfInput,
            TokenType::Identifier(_) => TokenCategory::Identifier,
            TokenType::Number(_) => TokenCategory::NumberLiteral,
            TokenType::String(_) => TokenCategory::StringLiteral,
            TokenType::Have
            | TokenType::Put
            | TokenType::When
            | TokenType::Otherwise
            | TokenType::While
            | TokenType::SetIcon
            | TokenType::Window
            | TokenType::True
            | TokenType::False => TokenCategory::Keyword,
            _ => TokenCategory::Punctuation,
        }
    }

    /// True for tokens that can begin a statement; the parser resynchronizes on these
    pub fn starts_statement(&self) -> bool {
        matches!(
            self,
            TokenType::Have
                | TokenType::Put
                | TokenType::When
                | TokenType::While
                | TokenType::Window
        )
    }
}

/// A token in the Nova language
#[derive(Debug, Clone, PartialEq)]
pub struct Token {
    /// The type of token
    pub token_type: TokenType,
    /// The exact source text the token was read from
    pub lexeme: String,
    /// The position in the source code
    pub position: Position,
}

impl Token {
    /// Create a new token
    pub fn new(token_type: TokenType, lexeme: impl Into<String>, position: Position) -> Self {
        Self { token_type, lexeme: lexeme.into(), position }
    }

    pub fn category(&self) -> TokenCategory {
        self.token_type.category()
    }

    /// Returns true if the token is a keyword
    pub fn is_keyword(&self) -> bool {
        self.category() == TokenCategory::Keyword
    }
}

impl fmt::Display for TokenType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TokenType::Eof => write!(f, "end of input"),
            TokenType::Identifier(s) => write!(f, "identifier `{}`", s),
            TokenType::Number(n) => write!(f, "number `{}`", n),
            TokenType::String(s) => write!(f, "string {:?}", s),

            // Keywords
            TokenType::Have => write!(f, "`have`"),
            TokenType::Put => write!(f, "`put`"),
            TokenType::When => write!(f, "`when`"),
            TokenType::Otherwise => write!(f, "`otherwise`"),
            TokenType::While => write!(f, "`while`"),
            TokenType::SetIcon => write!(f, "`set_icon`"),
            TokenType::Window => write!(f, "`window`"),
            TokenType::True => write!(f, "`true`"),
            TokenType::False => write!(f, "`false`"),

            // Operators
            TokenType::Plus => write!(f, "`+`"),
            TokenType::Minus => write!(f, "`-`"),
            TokenType::Star => write!(f, "`*`"),
            TokenType::Slash => write!(f, "`/`"),
            TokenType::Percent => write!(f, "`%`"),
            TokenType::Not => write!(f, "`!`"),
            TokenType::Less => write!(f, "`<`"),
            TokenType::Greater => write!(f, "`>`"),
            TokenType::Equal => write!(f, "`=`"),
            TokenType::LogicalAnd => write!(f, "`&&`"),
            TokenType::LogicalOr => write!(f, "`||`"),
            TokenType::Eq => write!(f, "`==`"),
            TokenType::NotEq => write!(f, "`!=`"),
            TokenType::LessEq => write!(f, "`<=`"),
            TokenType::GreaterEq => write!(f, "`>=`"),

            // Punctuation
            TokenType::LeftParen => write!(f, "`(`"),
            TokenType::RightParen => write!(f, "`)`"),
            TokenType::LeftBrace => write!(f, "`{{`"),
            TokenType::RightBrace => write!(f, "`}}`"),
            TokenType::Comma => write!(f, "`,`"),
            TokenType::Semicolon => write!(f, "`;`"),
        }
    }
}
