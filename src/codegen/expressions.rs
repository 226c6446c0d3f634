//! Expression Code Generation for Nova
//!
//! Expressions render to a single C# string. Nested operators are always
//! parenthesized so the output never depends on C# precedence matching
//! Nova's.

use super::{cs_string_literal, format_cs_identifier, CodegenContext, CodegenError, CodegenResult};
use crate::ast::*;
use crate::semantic::types;

/// Expression code generator
pub struct ExpressionGenerator<'a> {
    /// Generation context
    context: &'a mut CodegenContext,
}

impl<'a> ExpressionGenerator<'a> {
    pub fn new(context: &'a mut CodegenContext) -> Self {
        Self { context }
    }

    /// Generate C# code for an expression
    pub fn generate_expression(&mut self, expr: &Expr) -> CodegenResult<String> {
        match expr {
            Expr::Literal { value: Literal::Number(n), span } if !n.is_finite() => Err(CodegenError::Unsupported {
                what: "a number too large for a double".to_string(),
                span: *span,
            }),
            Expr::Literal { value, .. } => Ok(generate_literal(value)),

            Expr::Identifier { name, binding, span } => {
                let binding = binding.ok_or_else(|| CodegenError::Unresolved {
                    what: format!("identifier `{}`", name),
                    span: *span,
                })?;
                Ok(self.context.mangle_symbol(binding.id, name))
            }

            Expr::Binary { left, op, right, .. } => {
                let left = self.generate_operand(left)?;
                let right = self.generate_operand(right)?;
                Ok(format!("{} {} {}", left, op.symbol(), right))
            }

            Expr::Unary { op, operand, .. } => {
                let operand = self.generate_operand(operand)?;
                let symbol = match op {
                    UnaryOp::Not => "!",
                    UnaryOp::Negate => "-",
                };
                Ok(format!("{}{}", symbol, operand))
            }

            Expr::Call { callee, args, span } => self.generate_user_call(callee, args, *span),
        }
    }

    /// An operand of another operator, parenthesized unless atomic
    fn generate_operand(&mut self, expr: &Expr) -> CodegenResult<String> {
        let code = self.generate_expression(expr)?;
        match expr {
            Expr::Binary { .. } | Expr::Unary { .. } => Ok(format!("({})", code)),
            _ => Ok(code),
        }
    }

    /// Calls that are not built-ins pass through as methods of the program
    /// class; inside a window class they need the class qualifier
    fn generate_user_call(&mut self, callee: &str, args: &[Expr], span: Span) -> CodegenResult<String> {
        if crate::semantic::Builtin::from_name(callee).is_some() {
            return Err(CodegenError::Unsupported {
                what: format!("built-in `{}` used as a value", callee),
                span,
            });
        }

        let args = args
            .iter()
            .map(|arg| self.generate_expression(arg))
            .collect::<CodegenResult<Vec<_>>>()?;
        let qualifier = if self.context.in_window() {
            format!("{}.", self.context.class_name)
        } else {
            String::new()
        };
        Ok(format!("{}{}({})", qualifier, format_cs_identifier(callee), args.join(", ")))
    }

    /// An expression converted to `int`, for pixel geometry
    pub fn generate_int(&mut self, expr: &Expr) -> CodegenResult<String> {
        if let Expr::Literal { value: Literal::Number(n), .. } = expr {
            if n.fract() == 0.0 && n.abs() <= i32::MAX as f64 {
                return Ok(format!("{}", *n as i32));
            }
        }
        Ok(format!("(int)({})", self.generate_expression(expr)?))
    }

    /// An expression converted to `string`, for APIs that only take text
    pub fn generate_text(&mut self, expr: &Expr) -> CodegenResult<String> {
        let code = self.generate_expression(expr)?;
        if expr_kind(expr) == ValueKind::String {
            Ok(code)
        } else {
            Ok(format!("Convert.ToString({})", code))
        }
    }
}

/// C# literal for a Nova literal. Numbers are doubles and always carry a
/// decimal point or exponent.
pub fn generate_literal(literal: &Literal) -> String {
    match literal {
        Literal::String(value) => cs_string_literal(value),
        Literal::Number(value) => format!("{:?}", value),
        Literal::Bool(true) => "true".to_string(),
        Literal::Bool(false) => "false".to_string(),
    }
}

/// Kind of a resolved expression, recomputed from its bindings
pub fn expr_kind(expr: &Expr) -> ValueKind {
    match expr {
        Expr::Literal { value, .. } => value.kind(),
        Expr::Identifier { binding, .. } => binding.map_or(ValueKind::Unknown, |b| b.kind),
        Expr::Binary { left, op, right, .. } => {
            types::binary_result(*op, expr_kind(left), expr_kind(right)).unwrap_or(ValueKind::Unknown)
        }
        Expr::Unary { op, operand, .. } => {
            types::unary_result(*op, expr_kind(operand)).unwrap_or(ValueKind::Unknown)
        }
        Expr::Call { .. } => ValueKind::Unknown,
    }
}
