#[cfg(test)]
mod tests {
    use crate::lexer::lexer::Lexer;
    use crate::lexer::error::LexerError;
    use crate::lexer::token::{TokenCategory, TokenType};

    // Helper function to get all token types, failing on lexical errors
    fn collect_tokens(input: &str) -> Vec<TokenType> {
        let (tokens, errors) = Lexer::new(input).tokenize();
        assert!(errors.is_empty(), "unexpected lexer errors: {:?}", errors);
        tokens.into_iter().map(|t| t.token_type).collect()
    }

    #[test]
    fn test_empty_input() {
        assert_eq!(collect_tokens(""), vec![TokenType::Eof]);
    }

    #[test]
    fn test_whitespace_and_comments() {
        let tokens = collect_tokens(" \t\n\r// a comment\n   // another");
        assert_eq!(tokens, vec![TokenType::Eof]);
    }

    #[test]
    fn test_single_char_tokens() {
        let tokens = collect_tokens("+-*/%(){},;=<>!");
        assert_eq!(tokens, vec![
            TokenType::Plus,
            TokenType::Minus,
            TokenType::Star,
            TokenType::Slash,
            TokenType::Percent,
            TokenType::LeftParen,
            TokenType::RightParen,
            TokenType::LeftBrace,
            TokenType::RightBrace,
            TokenType::Comma,
            TokenType::Semicolon,
            TokenType::Equal,
            TokenType::Less,
            TokenType::Greater,
            TokenType::Not,
            TokenType::Eof,
        ]);
    }

    #[test]
    fn test_multi_char_operators() {
        let tokens = collect_tokens("== != <= >= && ||");
        assert_eq!(tokens, vec![
            TokenType::Eq,
            TokenType::NotEq,
            TokenType::LessEq,
            TokenType::GreaterEq,
            TokenType::LogicalAnd,
            TokenType::LogicalOr,
            TokenType::Eof,
        ]);
    }

    #[test]
    fn test_keywords() {
        let tokens = collect_tokens("have put when otherwise while set_icon window true false");
        assert_eq!(tokens, vec![
            TokenType::Have,
            TokenType::Put,
            TokenType::When,
            TokenType::Otherwise,
            TokenType::While,
            TokenType::SetIcon,
            TokenType::Window,
            TokenType::True,
            TokenType::False,
            TokenType::Eof,
        ]);
    }

    #[test]
    fn test_identifiers() {
        let tokens = collect_tokens("button _tmp have_it x1");
        assert_eq!(tokens, vec![
            TokenType::Identifier("button".to_string()),
            TokenType::Identifier("_tmp".to_string()),
            TokenType::Identifier("have_it".to_string()),
            TokenType::Identifier("x1".to_string()),
            TokenType::Eof,
        ]);
    }

    #[test]
    fn test_numbers() {
        let tokens = collect_tokens("42 3.25 0.5");
        assert_eq!(tokens, vec![
            TokenType::Number(42.0),
            TokenType::Number(3.25),
            TokenType::Number(0.5),
            TokenType::Eof,
        ]);
    }

    #[test]
    fn test_number_out_of_range() {
        let huge = format!("1{}", "0".repeat(400));
        let (tokens, errors) = Lexer::new(&format!("put({})\nput(2)", huge)).tokenize();
        assert!(matches!(errors.as_slice(), [LexerError::NumberOutOfRange(text, _)] if *text == huge));
        assert_eq!(errors[0].position().line, 1);
        // the literal still yields a token and lexing goes on
        assert_eq!(tokens[2].token_type, TokenType::Number(0.0));
        assert!(tokens.iter().any(|t| t.token_type == TokenType::Number(2.0)));
    }

    #[test]
    fn test_digit_does_not_start_identifier() {
        let tokens = collect_tokens("9lives");
        assert_eq!(tokens, vec![
            TokenType::Number(9.0),
            TokenType::Identifier("lives".to_string()),
            TokenType::Eof,
        ]);
    }

    #[test]
    fn test_string_escapes() {
        let tokens = collect_tokens(r#""say \"hi\"\nbye\t\\""#);
        assert_eq!(tokens, vec![
            TokenType::String("say \"hi\"\nbye\t\\".to_string()),
            TokenType::Eof,
        ]);
    }

    #[test]
    fn test_lexeme_and_position() {
        let (tokens, _) = Lexer::new("have x\n  = \"a b\"").tokenize();
        assert_eq!(tokens[0].lexeme, "have");
        assert_eq!((tokens[0].position.line, tokens[0].position.column), (1, 1));
        assert_eq!(tokens[1].lexeme, "x");
        assert_eq!((tokens[2].position.line, tokens[2].position.column), (2, 3));
        assert_eq!(tokens[3].lexeme, "\"a b\"");
        assert_eq!(tokens[3].position.column, 5);
    }

    #[test]
    fn test_categories() {
        let (tokens, _) = Lexer::new("have x = \"s\" + 1").tokenize();
        let categories: Vec<_> = tokens.iter().map(|t| t.category()).collect();
        assert_eq!(categories, vec![
            TokenCategory::Keyword,
            TokenCategory::Identifier,
            TokenCategory::Punctuation,
            TokenCategory::StringLiteral,
            TokenCategory::Punctuation,
            TokenCategory::NumberLiteral,
            TokenCategory::EndOfInput,
        ]);
    }

    #[test]
    fn test_invalid_character_is_skipped() {
        let (tokens, errors) = Lexer::new("put(1 @ 2)").tokenize();
        assert_eq!(errors.len(), 1);
        assert!(matches!(errors[0], LexerError::InvalidCharacter('@', _)));
        assert_eq!(tokens.len(), 6);
    }

    #[test]
    fn test_two_errors_on_two_lines() {
        let (tokens, errors) = Lexer::new("have a = 1 $\nput(a) #\n").tokenize();
        assert_eq!(errors.len(), 2);
        assert_eq!(errors[0].position().line, 1);
        assert_eq!(errors[1].position().line, 2);
        assert_eq!(tokens.last().map(|t| &t.token_type), Some(&TokenType::Eof));
    }

    #[test]
    fn test_unterminated_string() {
        let (tokens, errors) = Lexer::new("put(\"oops)\nput(1)").tokenize();
        assert_eq!(errors, vec![LexerError::UnterminatedString(tokens[2].position)]);
        // Lexing resumes on the following line
        assert!(tokens.iter().any(|t| t.token_type == TokenType::Number(1.0)));
    }

    #[test]
    fn test_invalid_escape_keeps_token() {
        let (tokens, errors) = Lexer::new(r#""a\qb""#).tokenize();
        assert_eq!(errors.len(), 1);
        assert!(matches!(&errors[0], LexerError::InvalidEscapeSequence(s, _) if s == "\\q"));
        assert_eq!(tokens[0].token_type, TokenType::String("aqb".to_string()));
    }

    #[test]
    fn test_single_ampersand_is_invalid() {
        let (_, errors) = Lexer::new("a & b").tokenize();
        assert!(matches!(errors.as_slice(), [LexerError::InvalidCharacter('&', _)]));
    }
}
