//! Code Generation Module for Nova
//!
//! This module translates a resolved Nova AST into C# source text and
//! hands that text to an external toolchain.
//!
//! Architecture:
//! - CodegenContext: mangled names, the enclosing window, feature flags
//! - CSharpBuilder: indented line builder that also records a source map
//! - Generators: expressions, statements, items (window classes)
//! - build: the toolchain interface and the csc adapter

use crate::ast::*;
use crate::diagnostics::{Diagnostic, Stage};
use crate::lexer::Position;
use std::collections::HashMap;
use thiserror::Error;

pub mod generator;
pub mod expressions;
pub mod statements;
pub mod items;
pub mod build;

pub use generator::{CSharpGenerator, GeneratedUnit, GeneratorOptions, IconResource};

/// Result type for code generation operations
pub type CodegenResult<T> = Result<T, CodegenError>;

/// Errors that can occur during code generation. The resolver rejects
/// everything it can, so these indicate constructs with no valid C#
/// rendering or a tree that skipped resolution.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum CodegenError {
    /// A generated type name collides with one the output relies on
    #[error("window `{name}` cannot be generated: the name is reserved for {reason}")]
    ReservedName { name: String, reason: String, span: Span },

    /// A construct with no C# rendering where it appears
    #[error("{what} has no C# equivalent here")]
    Unsupported { what: String, span: Span },

    /// A node reached the generator without resolver annotations
    #[error("internal error: {what} was not resolved")]
    Unresolved { what: String, span: Span },
}

impl CodegenError {
    pub fn span(&self) -> Span {
        match self {
            CodegenError::ReservedName { span, .. }
            | CodegenError::Unsupported { span, .. }
            | CodegenError::Unresolved { span, .. } => *span,
        }
    }

    pub fn to_diagnostic(&self) -> Diagnostic {
        Diagnostic::error(Stage::Generate, self.to_string(), self.span().start)
    }
}

/// Code generation context - tracks state during generation
#[derive(Debug)]
pub struct CodegenContext {
    /// Name of the static program class
    pub class_name: String,
    /// Generated symbol names (for name mangling)
    pub symbol_names: HashMap<SymbolId, String>,
    /// Window class whose constructor is being generated
    pub current_window: Option<String>,
    /// Set once anything needs System.Windows.Forms
    pub uses_forms: bool,
}

impl CodegenContext {
    pub fn new(class_name: impl Into<String>) -> Self {
        Self {
            class_name: class_name.into(),
            symbol_names: HashMap::new(),
            current_window: None,
            uses_forms: false,
        }
    }

    /// Generate a mangled symbol name. C# forbids a nested local from
    /// shadowing an outer one, so every binding gets a distinct name.
    pub fn mangle_symbol(&mut self, symbol_id: SymbolId, base_name: &str) -> String {
        if let Some(existing) = self.symbol_names.get(&symbol_id) {
            return existing.clone();
        }

        let mangled = format!("{}_{}", base_name, symbol_id);
        self.symbol_names.insert(symbol_id, mangled.clone());
        mangled
    }

    /// Map a value kind to the C# type that holds it
    pub fn map_kind(&self, kind: ValueKind, span: Span) -> CodegenResult<&'static str> {
        match kind {
            ValueKind::String => Ok("string"),
            ValueKind::Number => Ok("double"),
            ValueKind::Bool => Ok("bool"),
            ValueKind::Unknown => Err(CodegenError::Unresolved {
                what: "value kind".to_string(),
                span,
            }),
        }
    }

    pub fn in_window(&self) -> bool {
        self.current_window.is_some()
    }
}

/// Generated-line to source-line table. Index 0 is generated line 1;
/// a value of 0 marks scaffolding with no source counterpart.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SourceMap {
    lines: Vec<usize>,
}

impl SourceMap {
    /// Source line for a 1-based generated line
    pub fn source_line(&self, generated_line: usize) -> Option<usize> {
        generated_line
            .checked_sub(1)
            .and_then(|index| self.lines.get(index))
            .copied()
            .filter(|&line| line != 0)
    }

    pub fn len(&self) -> usize {
        self.lines.len()
    }

    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }
}

/// C# code builder with indentation and source-line tracking
#[derive(Debug, Clone, Default)]
pub struct CSharpBuilder {
    /// Current indentation level
    indent_level: usize,
    /// Generated code buffer
    code: String,
    /// Source line attributed to lines emitted from now on
    source_line: usize,
    source_map: SourceMap,
}

impl CSharpBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Attribute subsequent lines to `position`'s source line
    pub fn at(&mut self, position: Position) {
        self.source_line = position.line;
    }

    /// Subsequent lines are scaffolding
    pub fn detach(&mut self) {
        self.source_line = 0;
    }

    /// Add a line with proper indentation
    pub fn line(&mut self, text: &str) {
        if !text.is_empty() {
            for _ in 0..self.indent_level {
                self.code.push_str("    ");
            }
            self.code.push_str(text);
        }
        self.code.push('\n');
        self.source_map.lines.push(self.source_line);
    }

    pub fn blank(&mut self) {
        self.line("");
    }

    /// Increase indentation
    pub fn indent_inc(&mut self) {
        self.indent_level += 1;
    }

    /// Decrease indentation
    pub fn indent_dec(&mut self) {
        self.indent_level = self.indent_level.saturating_sub(1);
    }

    /// Add opening brace and increase indentation
    pub fn open_block(&mut self) {
        self.line("{");
        self.indent_inc();
    }

    /// Add closing brace and decrease indentation
    pub fn close_block(&mut self) {
        self.indent_dec();
        self.line("}");
    }

    /// Add a block with automatic indentation
    pub fn block<F>(&mut self, f: F) -> CodegenResult<()>
    where
        F: FnOnce(&mut Self) -> CodegenResult<()>,
    {
        self.open_block();
        f(self)?;
        self.close_block();
        Ok(())
    }

    /// Get the generated code
    pub fn code(&self) -> &str {
        &self.code
    }

    pub fn build(self) -> (String, SourceMap) {
        (self.code, self.source_map)
    }
}

/// C# keywords that cannot be used as bare identifiers
const CS_KEYWORDS: &[&str] = &[
    "abstract", "as", "base", "bool", "break", "byte", "case", "catch", "char",
    "checked", "class", "const", "continue", "decimal", "default", "delegate",
    "do", "double", "else", "enum", "event", "explicit", "extern", "false",
    "finally", "fixed", "float", "for", "foreach", "goto", "if", "implicit",
    "in", "int", "interface", "internal", "is", "lock", "long", "namespace",
    "new", "null", "object", "operator", "out", "override", "params",
    "private", "protected", "public", "readonly", "ref", "return", "sbyte",
    "sealed", "short", "sizeof", "stackalloc", "static", "string", "struct",
    "switch", "this", "throw", "true", "try", "typeof", "uint", "ulong",
    "unchecked", "unsafe", "ushort", "using", "virtual", "void", "volatile",
    "while",
];

/// Format a C# identifier (escape keywords with `@`)
pub fn format_cs_identifier(name: &str) -> String {
    if CS_KEYWORDS.contains(&name) {
        format!("@{}", name)
    } else {
        name.to_string()
    }
}

/// Quote `value` as a regular C# string literal
pub fn cs_string_literal(value: &str) -> String {
    let mut out = String::with_capacity(value.len() + 2);
    out.push('"');
    for ch in value.chars() {
        match ch {
            '"' => out.push_str("\\\""),
            '\\' => out.push_str("\\\\"),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            '\t' => out.push_str("\\t"),
            '\0' => out.push_str("\\0"),
            c if c.is_control() => out.push_str(&format!("\\u{:04x}", c as u32)),
            c => out.push(c),
        }
    }
    out.push('"');
    out
}
