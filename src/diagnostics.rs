//! Positioned diagnostics shared by every pipeline stage
//!
//! Stage-specific error enums convert into [`Diagnostic`] so callers can
//! report problems without knowing anything about tokens or AST nodes.

use crate::lexer::{LexerError, Position};
use serde::Serialize;
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Warning,
    Error,
}

/// Pipeline stage a diagnostic originated from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Stage {
    Lex,
    Parse,
    Resolve,
    Generate,
    Toolchain,
}

impl Stage {
    /// Name of the error kind this stage reports
    pub fn error_kind(self) -> &'static str {
        match self {
            Stage::Lex => "LexError",
            Stage::Parse => "SyntaxError",
            Stage::Resolve => "ResolutionError",
            Stage::Generate => "GenerationError",
            Stage::Toolchain => "ToolchainError",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Diagnostic {
    pub severity: Severity,
    pub message: String,
    /// Source line (1-based); 0 when no source position applies
    pub line: usize,
    /// Source column (1-based); 0 when no source position applies
    pub column: usize,
    pub stage: Stage,
}

impl Diagnostic {
    pub fn error(stage: Stage, message: impl Into<String>, position: Position) -> Self {
        Self {
            severity: Severity::Error,
            message: message.into(),
            line: position.line,
            column: position.column,
            stage,
        }
    }

    pub fn warning(stage: Stage, message: impl Into<String>, position: Position) -> Self {
        Self {
            severity: Severity::Warning,
            ..Self::error(stage, message, position)
        }
    }

    /// An error with no meaningful source location
    pub fn unpositioned(stage: Stage, message: impl Into<String>) -> Self {
        Self::error(stage, message, Position::new(0, 0, 0))
    }

    pub fn is_error(&self) -> bool {
        self.severity == Severity::Error
    }

    /// Render with the offending source line and a caret under the column
    pub fn render(&self, file_name: &str, source: &str) -> String {
        let mut out = format!("{}\n  --> {}:{}:{}", self, file_name, self.line, self.column);
        if let Some(text) = self.line.checked_sub(1).and_then(|i| source.lines().nth(i)) {
            let gutter = self.line.to_string();
            let pad = " ".repeat(gutter.len());
            let caret = " ".repeat(self.column.saturating_sub(1));
            out.push_str(&format!("\n{} |\n{} | {}\n{} | {}^", pad, gutter, text, pad, caret));
        }
        out
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let severity = match self.severity {
            Severity::Error => self.stage.error_kind(),
            Severity::Warning => "warning",
        };
        if self.line == 0 {
            write!(f, "{}: {}", severity, self.message)
        } else {
            write!(f, "{} at {}:{}: {}", severity, self.line, self.column, self.message)
        }
    }
}

impl From<&LexerError> for Diagnostic {
    fn from(error: &LexerError) -> Self {
        Diagnostic::error(Stage::Lex, error.to_string(), error.position())
    }
}

/// True if any diagnostic in the list is an error
pub fn has_errors(diagnostics: &[Diagnostic]) -> bool {
    diagnostics.iter().any(Diagnostic::is_error)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_names_error_kind() {
        let diag = Diagnostic::error(Stage::Resolve, "undeclared variable `y`", Position::new(3, 7, 20));
        assert_eq!(diag.to_string(), "ResolutionError at 3:7: undeclared variable `y`");
    }

    #[test]
    fn test_render_points_at_column() {
        let source = "have x = 1\nput(y)\n";
        let diag = Diagnostic::error(Stage::Resolve, "undeclared variable `y`", Position::new(2, 5, 15));
        let rendered = diag.render("demo.nova", source);
        assert!(rendered.contains("--> demo.nova:2:5"));
        assert!(rendered.contains("2 | put(y)"));
        assert!(rendered.ends_with("  |     ^"));
    }

    #[test]
    fn test_unpositioned_display() {
        let diag = Diagnostic::unpositioned(Stage::Toolchain, "toolchain timeout after 5s");
        assert_eq!(diag.to_string(), "ToolchainError: toolchain timeout after 5s");
        assert!(has_errors(&[diag]));
    }

    #[test]
    fn test_serializes_lowercase_tags() {
        let diag = Diagnostic::warning(Stage::Resolve, "unused", Position::new(1, 1, 0));
        let json = serde_json::to_value(&diag).unwrap();
        assert_eq!(json["severity"], "warning");
        assert_eq!(json["stage"], "resolve");
        assert_eq!(json["line"], 1);
    }
}
