pub mod ast;
pub mod lexer;
pub mod parser;
pub mod semantic;
pub mod codegen;
pub mod diagnostics;
pub mod config;
pub mod driver;

pub use lexer::{Lexer, Token, TokenType, Position, LexerError};
pub use ast::{Program, Expr, Stmt, WindowDecl, ControlDecl, Span};
pub use parser::{parse_source, Parser, ParseError, ParseResult};
pub use semantic::{AnalyzerConfig, SemanticAnalyzer};
pub use codegen::{CSharpGenerator, CodegenContext, CodegenResult, CodegenError, GeneratedUnit};
pub use codegen::build::{BuildRequest, BuildResult, CancelToken, CscToolchain, OutputKind, Toolchain};
pub use diagnostics::{Diagnostic, Severity, Stage};
pub use config::{CompilerConfig, ConfigError};
pub use driver::{translate, BatchReport, BatchUnit, Compiler, TranslateOptions, Translation, UnitReport};
