pub mod parser;
pub mod expressions;
pub mod statements;
pub mod error;


pub use parser::Parser;
pub use error::{ParseContext, ParseError, ParseResult};

use crate::ast::Program;
use crate::diagnostics::Diagnostic;
use crate::lexer::Lexer;

/// Lex and parse `source`, returning the tree together with every lexical
/// and syntax diagnostic in source order. The tree is only meaningful when
/// the diagnostic list is empty.
pub fn parse_source(source: &str) -> (Program, Vec<Diagnostic>) {
    let (tokens, lex_errors) = Lexer::new(source).tokenize();
    let mut diagnostics: Vec<Diagnostic> = lex_errors.iter().map(Diagnostic::from).collect();

    let mut parser = Parser::new(tokens);
    let program = parser.parse_program();
    diagnostics.extend(parser.errors().iter().map(ParseError::to_diagnostic));

    log::debug!(
        "parsed {} top-level statements with {} diagnostics",
        program.statements.len(),
        diagnostics.len()
    );
    (program, diagnostics)
}
