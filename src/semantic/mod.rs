//! Semantic Analysis Module for Nova
//!
//! This module provides the resolver that runs between parsing and code
//! generation:
//! - Symbol table management and lexical scope resolution
//! - Value-kind inference and operator checks
//! - GUI control registry and window validation
//! - Semantic error reporting

pub mod symbols;
pub mod types;
pub mod controls;
pub mod analyzer;

pub use symbols::{ScopeId, ScopeKind, Symbol, SymbolError, SymbolTable};
pub use types::TypeError;
pub use controls::{ControlSpec, EventSpec, PropertySpec};
pub use analyzer::{
    AnalysisResult, AnalysisStats, AnalyzerConfig, Builtin, SemanticAnalyzer, SemanticError,
    SemanticWarning,
};
