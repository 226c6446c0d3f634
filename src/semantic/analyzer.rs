//! Main Semantic Analyzer for Nova
//!
//! A single pass over the tree that:
//! - builds the scope tree and resolves every identifier to one declaration
//! - infers value kinds and checks operators, conditions and assignments
//! - validates windows against the control registry and evaluates icon paths
//! - records the outer bindings each window captures
//!
//! Results are written back into the tree (`binding`, `kind`, `icon`,
//! `captures`) and problems are collected rather than returned early.

use crate::ast::*;
use crate::diagnostics::{Diagnostic, Stage};
use crate::semantic::controls::{self, PropertySpec};
use crate::semantic::symbols::{ScopeId, ScopeKind, SymbolError, SymbolTable};
use crate::semantic::types::{self, TypeError};
use std::collections::{HashMap, HashSet};
use std::fmt;
use thiserror::Error;

/// Result of semantic analysis
#[derive(Debug)]
pub struct AnalysisResult {
    /// All semantic errors found, in discovery order
    pub errors: Vec<SemanticError>,
    /// Warnings generated during analysis
    pub warnings: Vec<SemanticWarning>,
    pub stats: AnalysisStats,
}

impl AnalysisResult {
    pub fn has_errors(&self) -> bool {
        !self.errors.is_empty()
    }

    /// Errors followed by warnings, as caller-facing diagnostics
    pub fn diagnostics(&self) -> Vec<Diagnostic> {
        self.errors
            .iter()
            .map(SemanticError::to_diagnostic)
            .chain(self.warnings.iter().map(SemanticWarning::to_diagnostic))
            .collect()
    }
}

/// Semantic errors that can occur during analysis
#[derive(Debug, Clone, PartialEq, Error)]
pub enum SemanticError {
    /// Symbol-related errors
    #[error(transparent)]
    Symbol(#[from] SymbolError),
    /// Operator or kind mismatch
    #[error("{error}")]
    Type { error: TypeError, span: Span },
    /// Semantic rule violations
    #[error("{message}")]
    SemanticViolation { message: String, span: Span },
}

impl SemanticError {
    fn violation(message: impl Into<String>, span: Span) -> Self {
        SemanticError::SemanticViolation {
            message: message.into(),
            span,
        }
    }

    pub fn span(&self) -> Span {
        match self {
            SemanticError::Symbol(error) => error.span(),
            SemanticError::Type { span, .. } | SemanticError::SemanticViolation { span, .. } => *span,
        }
    }

    pub fn to_diagnostic(&self) -> Diagnostic {
        Diagnostic::error(Stage::Resolve, self.to_string(), self.span().start)
    }
}

/// Semantic warnings
#[derive(Debug, Clone, PartialEq)]
pub enum SemanticWarning {
    /// Variable declared but never read
    UnusedVariable { name: String, span: Span },
    /// Icon file that is not in `.ico` format
    NonIcoIcon { path: String, span: Span },
    /// Assignment inside a window to a variable declared outside it
    CapturedAssignment { name: String, window: String, span: Span },
}

impl fmt::Display for SemanticWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SemanticWarning::UnusedVariable { name, .. } => write!(f, "unused variable `{}`", name),
            SemanticWarning::NonIcoIcon { path, .. } => {
                write!(f, "icon `{}` is not an .ico file; convert it before building", path)
            }
            SemanticWarning::CapturedAssignment { name, window, .. } => write!(
                f,
                "assignment to `{}` only changes window `{}`'s copy; the outer variable keeps its value",
                name, window
            ),
        }
    }
}

impl SemanticWarning {
    pub fn span(&self) -> Span {
        match self {
            SemanticWarning::UnusedVariable { span, .. }
            | SemanticWarning::NonIcoIcon { span, .. }
            | SemanticWarning::CapturedAssignment { span, .. } => *span,
        }
    }

    pub fn to_diagnostic(&self) -> Diagnostic {
        Diagnostic::warning(Stage::Resolve, self.to_string(), self.span().start)
    }
}

/// Analysis statistics
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AnalysisStats {
    pub symbols_declared: usize,
    pub scopes_created: usize,
    pub windows: usize,
    pub captures: usize,
}

/// Configuration for semantic analysis
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AnalyzerConfig {
    /// Enable unused variable warnings
    pub warn_unused: bool,
    /// Maximum number of errors before stopping collection
    pub max_errors: Option<usize>,
}

impl Default for AnalyzerConfig {
    fn default() -> Self {
        Self {
            warn_unused: true,
            max_errors: Some(100),
        }
    }
}

/// Calls the language provides; every other callee is passed through to
/// the target as a user method
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Builtin {
    /// `ui_message(value)` shows a message box
    UiMessage,
    /// `pause()` waits for a key press
    Pause,
    /// `exit()` ends the program
    Exit,
}

impl Builtin {
    pub fn from_name(name: &str) -> Option<Builtin> {
        match name {
            "ui_message" => Some(Builtin::UiMessage),
            "pause" => Some(Builtin::Pause),
            "exit" => Some(Builtin::Exit),
            _ => None,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Builtin::UiMessage => "ui_message",
            Builtin::Pause => "pause",
            Builtin::Exit => "exit",
        }
    }

    pub fn arity(self) -> usize {
        match self {
            Builtin::UiMessage => 1,
            Builtin::Pause | Builtin::Exit => 0,
        }
    }
}

/// Marker for "an error was already recorded for this node"
struct Reported;

type Resolved<T> = Result<T, Reported>;

/// State for the window currently being resolved
struct WindowContext {
    name: String,
    /// First scope belonging to the window; symbols in lower scopes are outer
    scope_floor: ScopeId,
    captures: Vec<Capture>,
}

/// Main semantic analyzer
pub struct SemanticAnalyzer {
    /// Configuration options
    config: AnalyzerConfig,
    symbols: SymbolTable,
    errors: Vec<SemanticError>,
    warnings: Vec<SemanticWarning>,
    window: Option<WindowContext>,
    window_names: HashMap<String, Span>,
    reported_undeclared: HashSet<String>,
    stats: AnalysisStats,
}

impl SemanticAnalyzer {
    /// Create a new semantic analyzer with default configuration
    pub fn new() -> Self {
        Self::with_config(AnalyzerConfig::default())
    }

    pub fn with_config(config: AnalyzerConfig) -> Self {
        Self {
            config,
            symbols: SymbolTable::new(),
            errors: Vec::new(),
            warnings: Vec::new(),
            window: None,
            window_names: HashMap::new(),
            reported_undeclared: HashSet::new(),
            stats: AnalysisStats::default(),
        }
    }

    pub fn config(&self) -> &AnalyzerConfig {
        &self.config
    }

    /// Resolve `program` in place. Each call starts from a fresh scope tree.
    pub fn analyze(&mut self, program: &mut Program) -> AnalysisResult {
        *self = Self::with_config(self.config.clone());

        for stmt in &mut program.statements {
            self.resolve_statement(stmt);
        }

        if self.config.warn_unused {
            self.generate_unused_warnings();
        }

        self.stats.symbols_declared = self.symbols.symbol_count();
        self.stats.scopes_created = self.symbols.scope_count();
        log::debug!(
            "resolved {} symbols in {} scopes: {} errors, {} warnings",
            self.stats.symbols_declared,
            self.stats.scopes_created,
            self.errors.len(),
            self.warnings.len()
        );

        AnalysisResult {
            errors: std::mem::take(&mut self.errors),
            warnings: std::mem::take(&mut self.warnings),
            stats: std::mem::take(&mut self.stats),
        }
    }

    // ----- statements -----

    fn resolve_statement(&mut self, stmt: &mut Stmt) {
        match stmt {
            Stmt::VarDecl { name, initializer, binding, span } => {
                let resolved = self.resolve_value(initializer);
                let kind = resolved.as_ref().copied().unwrap_or(ValueKind::Unknown);
                let constant = resolved.is_ok().then(|| self.evaluate_constant(initializer)).flatten();

                match self.symbols.add_symbol(name, kind, *span) {
                    Ok(id) => {
                        if let Some(symbol) = self.symbols.get_symbol_mut(id) {
                            symbol.poisoned = resolved.is_err();
                            symbol.const_value = constant;
                        }
                        *binding = Some(Binding { id, kind });
                    }
                    Err(error) => self.add_error(error.into()),
                }
            }

            Stmt::Assign { name, value, binding, span } => {
                let target = self.resolve_name(name, *span);
                let value_kind = self.resolve_value(value);
                let (Ok(target), Ok(value_kind)) = (target, value_kind) else {
                    return;
                };
                *binding = Some(target);

                let context = format!("value assigned to `{}`", name);
                if let Err(error) = types::expect_kind(&context, target.kind, value_kind) {
                    self.add_error(SemanticError::Type { error, span: value.span() });
                }
                if let Some(symbol) = self.symbols.get_symbol_mut(target.id) {
                    symbol.const_value = None;
                }
                self.check_captured_assignment(name, target.id, *span);
            }

            Stmt::Print { expr, .. } => {
                let _ = self.resolve_value(expr);
            }

            Stmt::If { condition, then_block, else_block, .. } => {
                self.resolve_condition(condition, "`when` condition");
                self.resolve_block(then_block, ScopeKind::Block);
                if let Some(block) = else_block {
                    self.resolve_block(block, ScopeKind::Block);
                }
            }

            Stmt::While { condition, body, .. } => {
                self.forget_loop_constants(&body.statements);
                self.resolve_condition(condition, "`while` condition");
                self.resolve_block(body, ScopeKind::Block);
            }

            Stmt::Block(block) => self.resolve_block(block, ScopeKind::Block),

            Stmt::Window(window) => self.resolve_window(window),

            Stmt::Expression { expr, .. } => match expr {
                Expr::Call { callee, args, span } => {
                    let _ = self.resolve_call(callee, args, *span, true);
                }
                other => {
                    let _ = self.resolve_expr(other);
                }
            },
        }
    }

    fn resolve_block(&mut self, block: &mut Block, kind: ScopeKind) {
        self.symbols.enter_scope(kind);
        for stmt in &mut block.statements {
            self.resolve_statement(stmt);
        }
        self.symbols.exit_scope();
    }

    fn resolve_condition(&mut self, condition: &mut Expr, context: &str) {
        if let Ok(kind) = self.resolve_value(condition) {
            if let Err(error) = types::expect_kind(context, ValueKind::Bool, kind) {
                self.add_error(SemanticError::Type { error, span: condition.span() });
            }
        }
    }

    /// A name assigned anywhere in a loop body may hold a different value on
    /// the next iteration, so it stops being a translation-time constant
    /// before the body is resolved.
    fn forget_loop_constants(&mut self, statements: &[Stmt]) {
        let mut assigned = Vec::new();
        collect_assigned_names(statements, &mut assigned);
        for name in assigned {
            let id = self.symbols.lookup_symbol(name).map(|symbol| symbol.id);
            if let Some(symbol) = id.and_then(|id| self.symbols.get_symbol_mut(id)) {
                symbol.const_value = None;
            }
        }
    }

    fn check_captured_assignment(&mut self, name: &str, id: SymbolId, span: Span) {
        let Some(window) = &self.window else { return };
        let outer = self
            .symbols
            .get_symbol(id)
            .map_or(false, |symbol| symbol.scope_id < window.scope_floor);
        if outer && self.symbols.inside(ScopeKind::Handler) {
            let window = window.name.clone();
            self.add_warning(SemanticWarning::CapturedAssignment {
                name: name.to_string(),
                window,
                span,
            });
        }
    }

    // ----- windows -----

    fn resolve_window(&mut self, window: &mut WindowDecl) {
        if self.window.is_some() {
            self.add_error(SemanticError::violation(
                format!("window `{}` cannot be declared inside another window", window.name),
                window.span,
            ));
            return;
        }

        if let Some(first) = self.window_names.get(&window.name) {
            let message = format!(
                "window `{}` is already declared at line {}",
                window.name,
                first.line()
            );
            self.add_error(SemanticError::violation(message, window.span));
        } else {
            self.window_names.insert(window.name.clone(), window.span);
        }

        let scope_floor = self.symbols.enter_scope(ScopeKind::Window);
        self.window = Some(WindowContext {
            name: window.name.clone(),
            scope_floor,
            captures: Vec::new(),
        });
        self.stats.windows += 1;

        let mut seen = HashMap::new();
        for property in &mut window.properties {
            let spec = controls::window_property(&property.name);
            if spec.is_none() {
                let message = format!(
                    "unknown window property `{}` (expected one of: {})",
                    property.name,
                    property_names(controls::WINDOW_PROPERTIES)
                );
                self.add_error(SemanticError::violation(message, property.span));
            }
            self.resolve_property(property, spec, &mut seen, &window.name);
        }

        self.resolve_icons(window);

        let mut control_names: HashMap<String, Span> = HashMap::new();
        for control in &mut window.controls {
            if control.name == window.name {
                let message = format!("control `{}` has the same name as its window", control.name);
                self.add_error(SemanticError::violation(message, control.span));
            } else if let Some(first) = control_names.get(&control.name) {
                let message = format!(
                    "control `{}` is already declared at line {}",
                    control.name,
                    first.line()
                );
                self.add_error(SemanticError::violation(message, control.span));
            } else {
                control_names.insert(control.name.clone(), control.span);
            }
            self.resolve_control(control);
        }

        self.symbols.exit_scope();
        if let Some(context) = self.window.take() {
            self.stats.captures += context.captures.len();
            window.captures = context.captures;
        }
    }

    /// Check one property against its spec. `spec` is `None` for names the
    /// caller already reported as unknown; the value is still resolved.
    fn resolve_property(
        &mut self,
        property: &mut Property,
        spec: Option<&'static PropertySpec>,
        seen: &mut HashMap<String, Span>,
        owner: &str,
    ) {
        if let Some(first) = seen.get(&property.name) {
            let message = format!(
                "property `{}` of `{}` is already set at line {}",
                property.name,
                owner,
                first.line()
            );
            self.add_error(SemanticError::violation(message, property.span));
        } else {
            seen.insert(property.name.clone(), property.span);
        }

        let Ok(kind) = self.resolve_value(&mut property.value) else { return };
        if let Some(spec) = spec {
            let context = format!("property `{}`", property.name);
            if let Err(error) = types::expect_kind(&context, spec.kind, kind) {
                self.add_error(SemanticError::Type { error, span: property.value.span() });
            }
        }
    }

    fn resolve_icons(&mut self, window: &mut WindowDecl) {
        if let Some(duplicate) = window.icons.get(1) {
            let message = format!(
                "duplicate icon declaration: window `{}` already sets an icon at line {}",
                window.name,
                window.icons[0].span.line()
            );
            self.add_error(SemanticError::violation(message, duplicate.span));
        }

        let Some(icon) = window.icons.first_mut() else { return };
        let Ok(kind) = self.resolve_value(&mut icon.path) else { return };
        if let Err(error) = types::expect_kind("icon path", ValueKind::String, kind) {
            self.add_error(SemanticError::Type { error, span: icon.path.span() });
            return;
        }

        match self.evaluate_constant(&icon.path) {
            Some(Literal::String(path)) if path.trim().is_empty() => {
                self.add_error(SemanticError::violation("icon path is empty", icon.span));
            }
            Some(Literal::String(path)) => {
                if !path.to_ascii_lowercase().ends_with(".ico") {
                    self.add_warning(SemanticWarning::NonIcoIcon {
                        path: path.clone(),
                        span: icon.span,
                    });
                }
                window.icon = Some(path);
            }
            _ => self.add_error(SemanticError::violation(
                "icon path must be a string literal or a constant; it cannot be evaluated at translation time",
                icon.path.span(),
            )),
        }
    }

    fn resolve_control(&mut self, control: &mut ControlDecl) {
        let kind = ControlKind::from_tag(&control.kind_tag);
        control.kind = kind;
        let spec = kind.map(ControlKind::spec);

        if spec.is_none() {
            let message = format!(
                "unknown control kind `{}` (expected one of: {})",
                control.kind_tag,
                controls::known_tags().join(", ")
            );
            self.add_error(SemanticError::violation(message, control.span));
        }

        let mut seen = HashMap::new();
        for property in &mut control.properties {
            let property_spec = spec.and_then(|spec| spec.property(&property.name));
            if let (Some(spec), None) = (spec, property_spec) {
                let message = format!("`{}` controls have no property `{}`", spec.tag, property.name);
                self.add_error(SemanticError::violation(message, property.span));
            }
            self.resolve_property(property, property_spec, &mut seen, &control.name);
        }

        if let Some(spec) = spec {
            for required in spec.required_properties() {
                if !seen.contains_key(required.name) {
                    let message = format!(
                        "{} `{}` is missing required property `{}`",
                        spec.tag, control.name, required.name
                    );
                    self.add_error(SemanticError::violation(message, control.span));
                }
            }
        }

        let mut handled: HashMap<String, Span> = HashMap::new();
        for handler in &mut control.handlers {
            if let Some(spec) = spec {
                if spec.event(&handler.event).is_none() {
                    let message = format!("`{}` controls have no event `{}`", spec.tag, handler.event);
                    self.add_error(SemanticError::violation(message, handler.span));
                }
            }
            if let Some(first) = handled.get(&handler.event) {
                let message = format!(
                    "`{}` of `{}` is already handled at line {}",
                    handler.event,
                    control.name,
                    first.line()
                );
                self.add_error(SemanticError::violation(message, handler.span));
            } else {
                handled.insert(handler.event.clone(), handler.span);
            }
            self.resolve_block(&mut handler.body, ScopeKind::Handler);
        }
    }

    // ----- expressions -----

    /// Resolve an expression whose value must have a known kind
    fn resolve_value(&mut self, expr: &mut Expr) -> Resolved<ValueKind> {
        let kind = self.resolve_expr(expr)?;
        if kind.is_known() {
            return Ok(kind);
        }

        let message = match expr {
            Expr::Call { callee, .. } => format!(
                "the value of `{}(...)` has no known kind; user calls can only be statements or call arguments",
                callee
            ),
            _ => "expression has no known kind".to_string(),
        };
        self.add_error(SemanticError::violation(message, expr.span()));
        Err(Reported)
    }

    fn resolve_expr(&mut self, expr: &mut Expr) -> Resolved<ValueKind> {
        match expr {
            Expr::Literal { value, .. } => Ok(value.kind()),

            Expr::Identifier { name, binding, span } => {
                let resolved = self.resolve_name(name, *span)?;
                *binding = Some(resolved);
                if let Some(symbol) = self.symbols.get_symbol_mut(resolved.id) {
                    symbol.mark_used();
                }
                Ok(resolved.kind)
            }

            Expr::Binary { left, op, right, span } => {
                let left_kind = self.resolve_value(left);
                let right_kind = self.resolve_value(right);
                let (left_kind, right_kind) = (left_kind?, right_kind?);
                types::binary_result(*op, left_kind, right_kind).map_err(|error| {
                    self.add_error(SemanticError::Type { error, span: *span });
                    Reported
                })
            }

            Expr::Unary { op, operand, span } => {
                let operand_kind = self.resolve_value(operand)?;
                types::unary_result(*op, operand_kind).map_err(|error| {
                    self.add_error(SemanticError::Type { error, span: *span });
                    Reported
                })
            }

            Expr::Call { callee, args, span } => self.resolve_call(callee, args, *span, false),
        }
    }

    /// Built-ins are checked for arity and may only appear as statements.
    /// User calls resolve their arguments and produce an unknown kind.
    fn resolve_call(
        &mut self,
        callee: &str,
        args: &mut [Expr],
        span: Span,
        as_statement: bool,
    ) -> Resolved<ValueKind> {
        let builtin = Builtin::from_name(callee);
        let mut failed = false;
        for arg in args.iter_mut() {
            let resolved = match builtin {
                Some(_) => self.resolve_value(arg),
                None => self.resolve_expr(arg),
            };
            failed |= resolved.is_err();
        }

        if let Some(builtin) = builtin {
            if builtin.arity() != args.len() {
                let message = format!(
                    "`{}` takes {} argument{} but {} {} given",
                    builtin.name(),
                    builtin.arity(),
                    if builtin.arity() == 1 { "" } else { "s" },
                    args.len(),
                    if args.len() == 1 { "was" } else { "were" }
                );
                self.add_error(SemanticError::violation(message, span));
                return Err(Reported);
            }
            if !as_statement {
                let message = format!("`{}` does not produce a value", builtin.name());
                self.add_error(SemanticError::violation(message, span));
                return Err(Reported);
            }
        }

        if failed {
            Err(Reported)
        } else {
            Ok(ValueKind::Unknown)
        }
    }

    /// Look a name up in the scope chain, recording window captures.
    /// Undeclared names are reported once per unit.
    fn resolve_name(&mut self, name: &str, span: Span) -> Resolved<Binding> {
        let Some(symbol) = self.symbols.lookup_symbol(name) else {
            if self.reported_undeclared.insert(name.to_string()) {
                self.add_error(SymbolError::UndefinedSymbol { name: name.to_string(), span }.into());
            }
            return Err(Reported);
        };

        let binding = Binding { id: symbol.id, kind: symbol.kind };
        let (scope_id, poisoned) = (symbol.scope_id, symbol.poisoned);

        if let Some(window) = &mut self.window {
            let outer = scope_id < window.scope_floor;
            if outer && !window.captures.iter().any(|c| c.binding.id == binding.id) {
                window.captures.push(Capture {
                    name: name.to_string(),
                    binding,
                });
            }
        }

        if poisoned {
            Err(Reported)
        } else {
            Ok(binding)
        }
    }

    /// Translation-time value of a resolved expression, if it has one
    fn evaluate_constant(&self, expr: &Expr) -> Option<Literal> {
        match expr {
            Expr::Literal { value, .. } => Some(value.clone()),
            Expr::Identifier { binding: Some(binding), .. } => {
                self.symbols.get_symbol(binding.id)?.const_value.clone()
            }
            Expr::Binary { left, op: BinaryOp::Add, right, .. } => {
                match (self.evaluate_constant(left)?, self.evaluate_constant(right)?) {
                    (Literal::String(a), Literal::String(b)) => Some(Literal::String(a + &b)),
                    (Literal::Number(a), Literal::Number(b)) => Some(Literal::Number(a + b)),
                    _ => None,
                }
            }
            _ => None,
        }
    }

    // ----- bookkeeping -----

    fn generate_unused_warnings(&mut self) {
        let unused: Vec<_> = self
            .symbols
            .unused_symbols()
            .map(|symbol| SemanticWarning::UnusedVariable {
                name: symbol.name.clone(),
                span: symbol.span,
            })
            .collect();
        for warning in unused {
            self.add_warning(warning);
        }
    }

    /// Add a semantic error
    fn add_error(&mut self, error: SemanticError) {
        if let Some(max_errors) = self.config.max_errors {
            if self.errors.len() >= max_errors {
                return; // Stop collecting errors
            }
        }

        self.errors.push(error);
    }

    /// Add a semantic warning
    fn add_warning(&mut self, warning: SemanticWarning) {
        self.warnings.push(warning);
    }
}

impl Default for SemanticAnalyzer {
    fn default() -> Self {
        Self::new()
    }
}

fn property_names(specs: &[PropertySpec]) -> String {
    specs.iter().map(|spec| spec.name).collect::<Vec<_>>().join(", ")
}

/// Assignment targets in `statements` and the blocks nested in them.
/// Handler bodies are skipped: they assign a window's own copy.
fn collect_assigned_names<'s>(statements: &'s [Stmt], names: &mut Vec<&'s str>) {
    for stmt in statements {
        match stmt {
            Stmt::Assign { name, .. } => names.push(name.as_str()),
            Stmt::If { then_block, else_block, .. } => {
                collect_assigned_names(&then_block.statements, names);
                if let Some(block) = else_block {
                    collect_assigned_names(&block.statements, names);
                }
            }
            Stmt::While { body, .. } | Stmt::Block(body) => collect_assigned_names(&body.statements, names),
            _ => {}
        }
    }
}
