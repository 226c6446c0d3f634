//! Abstract Syntax Tree (AST) definitions for the Nova language
//!
//! Every node owns its children and carries a [`Span`]; there are no back
//! references. The resolver annotates nodes in place (`binding`, `kind`,
//! `captures`, `icon`), which is why those fields start out empty.

use crate::lexer::Position;

/// Unique identifier for symbols (assigned by the resolver in declaration order)
pub type SymbolId = u32;

/// Source span for error reporting and debugging
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Span {
    pub start: Position,
    pub end: Position,
}

impl Span {
    pub fn new(start: Position, end: Position) -> Self {
        Self { start, end }
    }

    pub fn single(pos: Position) -> Self {
        Self { start: pos, end: pos }
    }

    pub fn merge(self, other: Span) -> Span {
        Span {
            start: if self.start.offset < other.start.offset { self.start } else { other.start },
            end: if self.end.offset > other.end.offset { self.end } else { other.end },
        }
    }

    /// Source line the node is associated with
    pub fn line(&self) -> usize {
        self.start.line
    }
}

/// Inferred kind of a value. The source language has no type annotations,
/// so every binding's kind comes from its initializer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ValueKind {
    String,
    Number,
    Bool,
    Unknown,
}

impl ValueKind {
    pub fn is_known(self) -> bool {
        self != ValueKind::Unknown
    }
}

impl std::fmt::Display for ValueKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            ValueKind::String => "string",
            ValueKind::Number => "number",
            ValueKind::Bool => "bool",
            ValueKind::Unknown => "unknown",
        };
        f.write_str(name)
    }
}

/// GUI control kinds supported inside a window declaration.
/// The property/event table lives in `semantic::controls`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ControlKind {
    Label,
    Button,
    TextBox,
    CheckBox,
}

/// A resolved reference to a declaration
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Binding {
    pub id: SymbolId,
    pub kind: ValueKind,
}

/// Binary operators
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BinaryOp {
    // Arithmetic
    Add,        // +
    Subtract,   // -
    Multiply,   // *
    Divide,     // /
    Modulo,     // %

    // Logical
    LogicalAnd, // &&
    LogicalOr,  // ||

    // Comparison
    Equal,      // ==
    NotEqual,   // !=
    Less,       // <
    LessEqual,  // <=
    Greater,    // >
    GreaterEqual, // >=
}

impl BinaryOp {
    pub fn symbol(self) -> &'static str {
        match self {
            BinaryOp::Add => "+",
            BinaryOp::Subtract => "-",
            BinaryOp::Multiply => "*",
            BinaryOp::Divide => "/",
            BinaryOp::Modulo => "%",
            BinaryOp::LogicalAnd => "&&",
            BinaryOp::LogicalOr => "||",
            BinaryOp::Equal => "==",
            BinaryOp::NotEqual => "!=",
            BinaryOp::Less => "<",
            BinaryOp::LessEqual => "<=",
            BinaryOp::Greater => ">",
            BinaryOp::GreaterEqual => ">=",
        }
    }
}

/// Unary operators
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UnaryOp {
    Not,        // !
    Negate,     // -
}

/// Literal values
#[derive(Debug, Clone, PartialEq)]
pub enum Literal {
    String(String),
    Number(f64),
    Bool(bool),
}

impl Literal {
    pub fn kind(&self) -> ValueKind {
        match self {
            Literal::String(_) => ValueKind::String,
            Literal::Number(_) => ValueKind::Number,
            Literal::Bool(_) => ValueKind::Bool,
        }
    }
}

/// Expression nodes
#[derive(Debug, Clone, PartialEq)]
pub enum Expr {
    Literal {
        value: Literal,
        span: Span,
    },

    /// Variable reference; `binding` is filled in by the resolver
    Identifier {
        name: String,
        binding: Option<Binding>,
        span: Span,
    },

    Binary {
        left: Box<Expr>,
        op: BinaryOp,
        right: Box<Expr>,
        span: Span,
    },

    Unary {
        op: UnaryOp,
        operand: Box<Expr>,
        span: Span,
    },

    /// Call to a built-in or a user-supplied target-language method
    Call {
        callee: String,
        args: Vec<Expr>,
        span: Span,
    },
}

/// A `{ ... }` statement list
#[derive(Debug, Clone, PartialEq)]
pub struct Block {
    pub statements: Vec<Stmt>,
    pub span: Span,
}

/// Statement nodes
#[derive(Debug, Clone, PartialEq)]
pub enum Stmt {
    /// `have name = initializer`
    VarDecl {
        name: String,
        initializer: Expr,
        binding: Option<Binding>,
        span: Span,
    },

    /// `name = value`
    Assign {
        name: String,
        value: Expr,
        binding: Option<Binding>,
        span: Span,
    },

    /// `put(expr)`
    Print {
        expr: Expr,
        span: Span,
    },

    /// `when (condition) { ... } otherwise { ... }`
    If {
        condition: Expr,
        then_block: Block,
        else_block: Option<Block>,
        span: Span,
    },

    /// `while (condition) { ... }`
    While {
        condition: Expr,
        body: Block,
        span: Span,
    },

    Block(Block),

    Window(WindowDecl),

    /// A call evaluated for its effect
    Expression {
        expr: Expr,
        span: Span,
    },
}

/// `name = value` inside a window or control body
#[derive(Debug, Clone, PartialEq)]
pub struct Property {
    pub name: String,
    pub value: Expr,
    pub span: Span,
}

/// `set_icon(path)`
#[derive(Debug, Clone, PartialEq)]
pub struct IconDecl {
    pub path: Expr,
    pub span: Span,
}

/// `on_click { ... }` inside a control body
#[derive(Debug, Clone, PartialEq)]
pub struct EventHandler {
    pub event: String,
    pub body: Block,
    pub span: Span,
}

/// `kind name { properties and handlers }`
#[derive(Debug, Clone, PartialEq)]
pub struct ControlDecl {
    /// Control kind as written in the source
    pub kind_tag: String,
    /// Registry entry, filled in by the resolver
    pub kind: Option<ControlKind>,
    pub name: String,
    pub properties: Vec<Property>,
    pub handlers: Vec<EventHandler>,
    pub span: Span,
}

/// An outer variable referenced from inside a window body
#[derive(Debug, Clone, PartialEq)]
pub struct Capture {
    pub name: String,
    pub binding: Binding,
}

/// `window name { ... }`
#[derive(Debug, Clone, PartialEq)]
pub struct WindowDecl {
    pub name: String,
    pub properties: Vec<Property>,
    pub controls: Vec<ControlDecl>,
    /// Every `set_icon` in source order; the resolver rejects more than one
    pub icons: Vec<IconDecl>,
    /// Icon path evaluated at translation time
    pub icon: Option<String>,
    /// Outer bindings the window body reads, in first-reference order
    pub captures: Vec<Capture>,
    pub span: Span,
}

/// A complete compilation unit
#[derive(Debug, Clone, PartialEq)]
pub struct Program {
    pub statements: Vec<Stmt>,
    pub span: Span,
}

impl Expr {
    /// Get the span of this expression
    pub fn span(&self) -> Span {
        match self {
            Expr::Literal { span, .. }
            | Expr::Identifier { span, .. }
            | Expr::Binary { span, .. }
            | Expr::Unary { span, .. }
            | Expr::Call { span, .. } => *span,
        }
    }

    fn clear_positions(&mut self) {
        match self {
            Expr::Literal { span, .. } | Expr::Identifier { span, .. } => *span = Span::default(),
            Expr::Binary { left, right, span, .. } => {
                left.clear_positions();
                right.clear_positions();
                *span = Span::default();
            }
            Expr::Unary { operand, span, .. } => {
                operand.clear_positions();
                *span = Span::default();
            }
            Expr::Call { args, span, .. } => {
                args.iter_mut().for_each(Expr::clear_positions);
                *span = Span::default();
            }
        }
    }
}

impl Stmt {
    /// Get the span of this statement
    pub fn span(&self) -> Span {
        match self {
            Stmt::VarDecl { span, .. }
            | Stmt::Assign { span, .. }
            | Stmt::Print { span, .. }
            | Stmt::If { span, .. }
            | Stmt::While { span, .. }
            | Stmt::Expression { span, .. } => *span,
            Stmt::Block(block) => block.span,
            Stmt::Window(window) => window.span,
        }
    }

    fn clear_positions(&mut self) {
        match self {
            Stmt::VarDecl { initializer: expr, span, .. }
            | Stmt::Assign { value: expr, span, .. }
            | Stmt::Print { expr, span }
            | Stmt::Expression { expr, span } => {
                expr.clear_positions();
                *span = Span::default();
            }
            Stmt::If { condition, then_block, else_block, span } => {
                condition.clear_positions();
                then_block.clear_positions();
                if let Some(block) = else_block {
                    block.clear_positions();
                }
                *span = Span::default();
            }
            Stmt::While { condition, body, span } => {
                condition.clear_positions();
                body.clear_positions();
                *span = Span::default();
            }
            Stmt::Block(block) => block.clear_positions(),
            Stmt::Window(window) => window.clear_positions(),
        }
    }
}

impl Block {
    fn clear_positions(&mut self) {
        self.statements.iter_mut().for_each(Stmt::clear_positions);
        self.span = Span::default();
    }
}

impl Property {
    fn clear_positions(&mut self) {
        self.value.clear_positions();
        self.span = Span::default();
    }
}

impl WindowDecl {
    fn clear_positions(&mut self) {
        self.properties.iter_mut().for_each(Property::clear_positions);
        for icon in &mut self.icons {
            icon.path.clear_positions();
            icon.span = Span::default();
        }
        for control in &mut self.controls {
            control.properties.iter_mut().for_each(Property::clear_positions);
            for handler in &mut control.handlers {
                handler.body.clear_positions();
                handler.span = Span::default();
            }
            control.span = Span::default();
        }
        self.span = Span::default();
    }
}

impl Program {
    /// A copy with every span reset, for comparing trees that differ only
    /// in layout
    pub fn without_positions(&self) -> Program {
        let mut program = self.clone();
        program.statements.iter_mut().for_each(Stmt::clear_positions);
        program.span = Span::default();
        program
    }
}
