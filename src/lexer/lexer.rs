use crate::lexer::position::Position;
use crate::lexer::token::{Token, TokenType};
use crate::lexer::error::LexerError;

/// The Lexer is responsible for converting source code into tokens.
///
/// Lexical errors never stop the scan: the offending input is recorded and
/// skipped so a single pass reports every independent problem.
pub struct Lexer<'a> {
    /// The input source code
    input: &'a str,
    /// The characters of the input
    chars: std::str::Chars<'a>,
    /// The current character
    current_char: Option<char>,
    /// Position tracking for error reporting
    position: Position,
    /// Errors recorded so far
    errors: Vec<LexerError>,
}

impl<'a> Lexer<'a> {
    /// Create a new lexer from input source code
    pub fn new(input: &'a str) -> Self {
        let mut chars = input.chars();
        let current_char = chars.next();

        Self {
            input,
            chars,
            current_char,
            position: Position::start(),
            errors: Vec::new(),
        }
    }

    /// Lex the whole input. The returned stream always ends with exactly one `Eof`.
    pub fn tokenize(mut self) -> (Vec<Token>, Vec<LexerError>) {
        let mut tokens = Vec::new();
        loop {
            let token = self.next_token();
            let done = token.token_type == TokenType::Eof;
            tokens.push(token);
            if done {
                break;
            }
        }
        (tokens, self.errors)
    }

    /// Advance to the next character
    pub fn advance(&mut self) {
        if let Some(ch) = self.current_char {
            self.position.advance(ch);
            self.current_char = self.chars.next();
        }
    }

    /// Look at the next character without advancing
    pub fn peek(&self) -> Option<char> {
        self.chars.clone().next()
    }

    /// Check if we've reached the end of input
    pub fn is_at_end(&self) -> bool {
        self.current_char.is_none()
    }

    /// Errors recorded so far
    pub fn errors(&self) -> &[LexerError] {
        &self.errors
    }

    /// Skip whitespace and `//` line comments
    fn skip_trivia(&mut self) {
        while let Some(ch) = self.current_char {
            if ch.is_whitespace() {
                self.advance();
            } else if ch == '/' && self.peek() == Some('/') {
                while let Some(c) = self.current_char {
                    if c == '\n' {
                        break;
                    }
                    self.advance();
                }
            } else {
                break;
            }
        }
    }

    fn lexeme_from(&self, start: Position) -> &'a str {
        &self.input[start.offset..self.position.offset]
    }

    /// Get the next token from the input
    pub fn next_token(&mut self) -> Token {
        loop {
            self.skip_trivia();

            let ch = match self.current_char {
                Some(ch) => ch,
                None => return Token::new(TokenType::Eof, "", self.position),
            };
            let start = self.position;

            if ch.is_ascii_alphabetic() || ch == '_' {
                return self.identifier_or_keyword(start);
            }
            if ch.is_ascii_digit() {
                return self.number(start);
            }
            if ch == '"' {
                return self.string(start);
            }

            let token_type = match ch {
                '+' => TokenType::Plus,
                '-' => TokenType::Minus,
                '*' => TokenType::Star,
                '/' => TokenType::Slash,
                '%' => TokenType::Percent,
                '(' => TokenType::LeftParen,
                ')' => TokenType::RightParen,
                '{' => TokenType::LeftBrace,
                '}' => TokenType::RightBrace,
                ',' => TokenType::Comma,
                ';' => TokenType::Semicolon,
                '=' => self.either('=', TokenType::Eq, TokenType::Equal),
                '!' => self.either('=', TokenType::NotEq, TokenType::Not),
                '<' => self.either('=', TokenType::LessEq, TokenType::Less),
                '>' => self.either('=', TokenType::GreaterEq, TokenType::Greater),
                '&' if self.peek() == Some('&') => {
                    self.advance();
                    TokenType::LogicalAnd
                }
                '|' if self.peek() == Some('|') => {
                    self.advance();
                    TokenType::LogicalOr
                }
                _ => {
                    // Record, consume and resynchronize on the next character
                    self.advance();
                    self.errors.push(LexerError::InvalidCharacter(ch, start));
                    continue;
                }
            };

            self.advance();
            return Token::new(token_type, self.lexeme_from(start), start);
        }
    }

    /// Pick the two-character form when the following character is `second`.
    /// Leaves the lexer on the last character of the operator.
    fn either(&mut self, second: char, double: TokenType, single: TokenType) -> TokenType {
        if self.peek() == Some(second) {
            self.advance();
            double
        } else {
            single
        }
    }

    fn identifier_or_keyword(&mut self, start: Position) -> Token {
        while let Some(ch) = self.current_char {
            if ch.is_ascii_alphanumeric() || ch == '_' {
                self.advance();
            } else {
                break;
            }
        }
        let text = self.lexeme_from(start);
        let token_type = TokenType::keyword(text)
            .unwrap_or_else(|| TokenType::Identifier(text.to_string()));
        Token::new(token_type, text, start)
    }

    fn number(&mut self, start: Position) -> Token {
        self.consume_digits();
        if self.current_char == Some('.') && self.peek().map_or(false, |c| c.is_ascii_digit()) {
            self.advance();
            self.consume_digits();
        }
        let text = self.lexeme_from(start);
        // Only ASCII digits with at most one interior dot reach here
        let mut value = text.parse::<f64>().unwrap_or_default();
        if !value.is_finite() {
            self.errors.push(LexerError::NumberOutOfRange(text.to_string(), start));
            value = 0.0;
        }
        Token::new(TokenType::Number(value), text, start)
    }

    fn consume_digits(&mut self) {
        while let Some(ch) = self.current_char {
            if ch.is_ascii_digit() {
                self.advance();
            } else {
                break;
            }
        }
    }

    fn string(&mut self, start: Position) -> Token {
        self.advance(); // opening quote
        let mut value = String::new();

        loop {
            match self.current_char {
                None | Some('\n') => {
                    self.errors.push(LexerError::UnterminatedString(start));
                    break;
                }
                Some('"') => {
                    self.advance();
                    break;
                }
                Some('\\') => {
                    let escape_pos = self.position;
                    self.advance();
                    match self.current_char {
                        Some('"') => value.push('"'),
                        Some('\\') => value.push('\\'),
                        Some('n') => value.push('\n'),
                        Some('t') => value.push('\t'),
                        Some('r') => value.push('\r'),
                        Some(other) if other != '\n' => {
                            self.errors.push(LexerError::InvalidEscapeSequence(
                                format!("\\{}", other),
                                escape_pos,
                            ));
                            value.push(other);
                        }
                        _ => continue,
                    }
                    self.advance();
                }
                Some(ch) => {
                    value.push(ch);
                    self.advance();
                }
            }
        }

        Token::new(TokenType::String(value), self.lexeme_from(start), start)
    }
}
