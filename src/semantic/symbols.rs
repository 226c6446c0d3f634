//! Symbol Table and Scope Management for Nova Semantic Analysis
//!
//! This module implements the scope tree used for name resolution. Scopes
//! mirror block structure; lookup always walks from the current scope to
//! the root and returns the nearest declaration.

use crate::ast::{Literal, Span, SymbolId, ValueKind};
use std::collections::HashMap;
use thiserror::Error;

/// Unique identifier for scopes
pub type ScopeId = u32;

/// Result type for symbol operations
pub type SymbolResult<T> = Result<T, SymbolError>;

/// Errors that can occur during symbol resolution
#[derive(Debug, Clone, PartialEq, Error)]
pub enum SymbolError {
    /// Symbol already defined in current scope
    #[error("`{name}` is already declared in this scope (first declared at line {})", .existing_span.line())]
    DuplicateSymbol {
        name: String,
        existing_span: Span,
        new_span: Span,
    },
    /// Symbol not found in any enclosing scope
    #[error("undeclared variable `{name}`")]
    UndefinedSymbol { name: String, span: Span },
}

impl SymbolError {
    pub fn span(&self) -> Span {
        match self {
            SymbolError::DuplicateSymbol { new_span, .. } => *new_span,
            SymbolError::UndefinedSymbol { span, .. } => *span,
        }
    }
}

/// Symbol entry in the symbol table
#[derive(Debug, Clone, PartialEq)]
pub struct Symbol {
    pub id: SymbolId,
    pub name: String,
    pub kind: ValueKind,
    pub span: Span,
    pub scope_id: ScopeId,
    pub is_used: bool,
    /// Value known at translation time: set for constant initializers and
    /// cleared by any assignment
    pub const_value: Option<Literal>,
    /// The declaration already produced an error; uses are not re-reported
    pub poisoned: bool,
}

impl Symbol {
    pub fn new(id: SymbolId, name: String, kind: ValueKind, span: Span, scope_id: ScopeId) -> Self {
        Self {
            id,
            name,
            kind,
            span,
            scope_id,
            is_used: false,
            const_value: None,
            poisoned: false,
        }
    }

    /// Mark this symbol as used
    pub fn mark_used(&mut self) {
        self.is_used = true;
    }
}

/// Types of scopes
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScopeKind {
    /// Top level of the compilation unit
    Program,
    /// `{ ... }`, branch or loop body
    Block,
    /// Window body; outer bindings referenced inside become captures
    Window,
    /// Event handler body
    Handler,
}

/// Scope information
#[derive(Debug, Clone, PartialEq)]
pub struct Scope {
    pub id: ScopeId,
    pub parent_id: Option<ScopeId>,
    pub kind: ScopeKind,
    pub symbols: HashMap<String, SymbolId>,
}

impl Scope {
    pub fn new(id: ScopeId, parent_id: Option<ScopeId>, kind: ScopeKind) -> Self {
        Self {
            id,
            parent_id,
            kind,
            symbols: HashMap::new(),
        }
    }

    /// Look up a symbol in this scope only
    pub fn lookup_symbol(&self, name: &str) -> Option<SymbolId> {
        self.symbols.get(name).copied()
    }
}

/// Scope tree plus every symbol declared in it. Symbol and scope ids are
/// indices, so iteration follows declaration order.
#[derive(Debug, Clone)]
pub struct SymbolTable {
    symbols: Vec<Symbol>,
    scopes: Vec<Scope>,
    current_scope_id: ScopeId,
}

impl SymbolTable {
    /// Create a new symbol table with a root scope
    pub fn new() -> Self {
        Self {
            symbols: Vec::new(),
            scopes: vec![Scope::new(0, None, ScopeKind::Program)],
            current_scope_id: 0,
        }
    }

    /// Enter a new child of the current scope
    pub fn enter_scope(&mut self, kind: ScopeKind) -> ScopeId {
        let scope_id = self.scopes.len() as ScopeId;
        self.scopes.push(Scope::new(scope_id, Some(self.current_scope_id), kind));
        self.current_scope_id = scope_id;
        scope_id
    }

    /// Exit the current scope; the root scope is never exited
    pub fn exit_scope(&mut self) {
        if let Some(parent_id) = self.scope(self.current_scope_id).parent_id {
            self.current_scope_id = parent_id;
        }
    }

    /// Get the current scope ID
    pub fn current_scope(&self) -> ScopeId {
        self.current_scope_id
    }

    fn scope(&self, scope_id: ScopeId) -> &Scope {
        &self.scopes[scope_id as usize]
    }

    /// True if the current scope or one of its ancestors has `kind`
    pub fn inside(&self, kind: ScopeKind) -> bool {
        let mut scope_id = Some(self.current_scope_id);
        while let Some(id) = scope_id {
            let scope = self.scope(id);
            if scope.kind == kind {
                return true;
            }
            scope_id = scope.parent_id;
        }
        false
    }

    /// Add a symbol to the current scope
    pub fn add_symbol(&mut self, name: &str, kind: ValueKind, span: Span) -> SymbolResult<SymbolId> {
        if let Some(existing) = self.scope(self.current_scope_id).lookup_symbol(name) {
            return Err(SymbolError::DuplicateSymbol {
                name: name.to_string(),
                existing_span: self.symbols[existing as usize].span,
                new_span: span,
            });
        }

        let symbol_id = self.symbols.len() as SymbolId;
        self.symbols.push(Symbol::new(symbol_id, name.to_string(), kind, span, self.current_scope_id));
        self.scopes[self.current_scope_id as usize]
            .symbols
            .insert(name.to_string(), symbol_id);
        Ok(symbol_id)
    }

    /// Look up a symbol by name, searching up the scope chain
    pub fn lookup_symbol(&self, name: &str) -> Option<&Symbol> {
        let mut scope_id = Some(self.current_scope_id);
        while let Some(id) = scope_id {
            let scope = self.scope(id);
            if let Some(symbol_id) = scope.lookup_symbol(name) {
                return self.get_symbol(symbol_id);
            }
            scope_id = scope.parent_id;
        }
        None
    }

    /// Look up a symbol by ID
    pub fn get_symbol(&self, symbol_id: SymbolId) -> Option<&Symbol> {
        self.symbols.get(symbol_id as usize)
    }

    /// Get a mutable reference to a symbol
    pub fn get_symbol_mut(&mut self, symbol_id: SymbolId) -> Option<&mut Symbol> {
        self.symbols.get_mut(symbol_id as usize)
    }

    /// Symbols never read after declaration, in declaration order
    pub fn unused_symbols(&self) -> impl Iterator<Item = &Symbol> {
        self.symbols.iter().filter(|symbol| !symbol.is_used && !symbol.poisoned)
    }

    pub fn symbol_count(&self) -> usize {
        self.symbols.len()
    }

    pub fn scope_count(&self) -> usize {
        self.scopes.len()
    }
}

impl Default for SymbolTable {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lexer::Position;

    fn span_at(line: usize) -> Span {
        Span::single(Position::new(line, 1, 0))
    }

    #[test]
    fn test_nearest_declaration_wins() {
        let mut table = SymbolTable::new();
        let outer = table.add_symbol("x", ValueKind::Number, span_at(1)).unwrap();
        table.enter_scope(ScopeKind::Block);
        let inner = table.add_symbol("x", ValueKind::String, span_at(2)).unwrap();

        assert_eq!(table.lookup_symbol("x").map(|s| s.id), Some(inner));
        table.exit_scope();
        assert_eq!(table.lookup_symbol("x").map(|s| s.id), Some(outer));
    }

    #[test]
    fn test_duplicate_in_same_scope() {
        let mut table = SymbolTable::new();
        table.add_symbol("x", ValueKind::Number, span_at(1)).unwrap();
        let err = table.add_symbol("x", ValueKind::Number, span_at(4)).unwrap_err();
        assert_eq!(err.to_string(), "`x` is already declared in this scope (first declared at line 1)");
        assert_eq!(err.span().line(), 4);
    }

    #[test]
    fn test_sibling_scopes_are_independent() {
        let mut table = SymbolTable::new();
        table.enter_scope(ScopeKind::Block);
        table.add_symbol("tmp", ValueKind::Bool, span_at(1)).unwrap();
        table.exit_scope();
        table.enter_scope(ScopeKind::Block);
        assert!(table.lookup_symbol("tmp").is_none());
        assert!(table.add_symbol("tmp", ValueKind::Bool, span_at(2)).is_ok());
        assert_eq!(table.scope_count(), 3);
    }

    #[test]
    fn test_exit_root_is_noop() {
        let mut table = SymbolTable::new();
        table.exit_scope();
        assert_eq!(table.current_scope(), 0);
    }

    #[test]
    fn test_inside_walks_ancestors() {
        let mut table = SymbolTable::new();
        table.enter_scope(ScopeKind::Window);
        table.enter_scope(ScopeKind::Handler);
        table.enter_scope(ScopeKind::Block);
        assert!(table.inside(ScopeKind::Handler));
        assert!(table.inside(ScopeKind::Window));
        table.exit_scope();
        table.exit_scope();
        assert!(!table.inside(ScopeKind::Handler));
    }

    #[test]
    fn test_unused_symbols_in_declaration_order() {
        let mut table = SymbolTable::new();
        let a = table.add_symbol("a", ValueKind::Number, span_at(1)).unwrap();
        table.add_symbol("b", ValueKind::Number, span_at(2)).unwrap();
        table.add_symbol("c", ValueKind::Number, span_at(3)).unwrap();
        table.get_symbol_mut(a).unwrap().mark_used();

        let names: Vec<_> = table.unused_symbols().map(|s| s.name.as_str()).collect();
        assert_eq!(names, vec!["b", "c"]);
    }
}
