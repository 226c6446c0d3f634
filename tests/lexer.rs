//! Lexer integration tests
//!
//! These tests tokenize complete Nova programs and check the guarantees
//! callers rely on: one end-of-input token, positions, and error recovery.

use nova::lexer::{Lexer, LexerError, TokenCategory, TokenType};
use nova::{parse_source, Stage};

/// Test lexing a complete Nova program
#[test]
fn test_lex_complete_program() {
    let source = r#"
        // greeting window
        have name = "Nova"
        have count = 3
        when (count >= 3 && name != "") {
            put("Hello " + name)
        } otherwise {
            put(count % 2)
        }
        window Main {
            title = "Demo"
            set_icon("app.ico")
            button ok { text = "OK" on_click { exit() } }
        }
    "#;

    let (tokens, errors) = Lexer::new(source).tokenize();
    assert!(errors.is_empty(), "unexpected lex errors: {:?}", errors);

    let eof_count = tokens.iter().filter(|t| t.token_type == TokenType::Eof).count();
    assert_eq!(eof_count, 1);
    assert_eq!(tokens.last().map(|t| &t.token_type), Some(&TokenType::Eof));

    let keywords: Vec<&TokenType> = tokens.iter().filter(|t| t.is_keyword()).map(|t| &t.token_type).collect();
    assert_eq!(
        keywords,
        vec![
            &TokenType::Have,
            &TokenType::Have,
            &TokenType::When,
            &TokenType::Put,
            &TokenType::Otherwise,
            &TokenType::Put,
            &TokenType::Window,
            &TokenType::SetIcon,
        ]
    );

    let ge = tokens.iter().find(|t| t.token_type == TokenType::GreaterEq).unwrap();
    assert_eq!(ge.lexeme, ">=");
    assert_eq!(ge.position.line, 5);
}

#[test]
fn test_positions_follow_lines() {
    let (tokens, _) = Lexer::new("have x = 1\n  put(x)").tokenize();
    let put = tokens.iter().find(|t| t.token_type == TokenType::Put).unwrap();
    assert_eq!((put.position.line, put.position.column), (2, 3));
    assert_eq!(put.lexeme, "put");
}

#[test]
fn test_token_categories() {
    let (tokens, _) = Lexer::new("have s = \"x\" 4.5 (").tokenize();
    let categories: Vec<TokenCategory> = tokens.iter().map(|t| t.category()).collect();
    assert_eq!(
        categories,
        vec![
            TokenCategory::Keyword,
            TokenCategory::Identifier,
            TokenCategory::Punctuation,
            TokenCategory::StringLiteral,
            TokenCategory::NumberLiteral,
            TokenCategory::Punctuation,
            TokenCategory::EndOfInput,
        ]
    );
}

/// Two bad characters on different lines give two errors in one pass
#[test]
fn test_two_independent_lex_errors() {
    let source = "have a = 1 @\nput(a)\nhave b = 2 #\nput(b)";
    let (tokens, errors) = Lexer::new(source).tokenize();

    assert_eq!(errors.len(), 2);
    assert!(matches!(errors[0], LexerError::InvalidCharacter('@', _)));
    assert!(matches!(errors[1], LexerError::InvalidCharacter('#', _)));
    assert_eq!(errors[0].position().line, 1);
    assert_eq!(errors[1].position().line, 3);
    // lexing carried on past both
    assert_eq!(tokens.iter().filter(|t| t.token_type == TokenType::Put).count(), 2);

    let (_, diagnostics) = parse_source(source);
    assert_eq!(diagnostics.len(), 2);
    assert!(diagnostics.iter().all(|d| d.stage == Stage::Lex));
}
