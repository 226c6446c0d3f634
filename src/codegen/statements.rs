//! Statement Code Generation for Nova
//!
//! This module handles the translation of Nova statements to C# code.
//! Every statement maps to one C# statement or a braced block, except
//! `window`, which becomes a call into the window class generated by
//! `items`.

use super::expressions::ExpressionGenerator;
use super::{format_cs_identifier, CSharpBuilder, CodegenContext, CodegenError, CodegenResult};
use crate::ast::*;
use crate::semantic::Builtin;

/// Statement code generator
pub struct StatementGenerator<'a> {
    /// Generation context
    context: &'a mut CodegenContext,
}

impl<'a> StatementGenerator<'a> {
    /// Create a new statement generator
    pub fn new(context: &'a mut CodegenContext) -> Self {
        Self { context }
    }

    /// Create an expression generator on demand
    fn expressions(&mut self) -> ExpressionGenerator<'_> {
        ExpressionGenerator::new(self.context)
    }

    /// Generate C# code for a statement
    pub fn generate_statement(&mut self, stmt: &Stmt, builder: &mut CSharpBuilder) -> CodegenResult<()> {
        builder.at(stmt.span().start);
        match stmt {
            Stmt::VarDecl { name, initializer, binding, span } => {
                let binding = resolved(binding, name, *span)?;
                let ty = self.context.map_kind(binding.kind, *span)?;
                let variable = self.context.mangle_symbol(binding.id, name);
                let value = self.expressions().generate_expression(initializer)?;
                builder.line(&format!("{} {} = {};", ty, variable, value));
            }

            Stmt::Assign { name, value, binding, span } => {
                let binding = resolved(binding, name, *span)?;
                let variable = self.context.mangle_symbol(binding.id, name);
                let value = self.expressions().generate_expression(value)?;
                builder.line(&format!("{} = {};", variable, value));
            }

            Stmt::Print { expr, .. } => {
                let value = self.expressions().generate_expression(expr)?;
                builder.line(&format!("Console.WriteLine({});", value));
            }

            Stmt::If { condition, then_block, else_block, .. } => {
                let condition = self.expressions().generate_expression(condition)?;
                builder.line(&format!("if ({})", condition));
                self.generate_block(then_block, builder)?;
                if let Some(else_block) = else_block {
                    builder.at(else_block.span.start);
                    builder.line("else");
                    self.generate_block(else_block, builder)?;
                }
            }

            Stmt::While { condition, body, .. } => {
                let condition = self.expressions().generate_expression(condition)?;
                builder.line(&format!("while ({})", condition));
                self.generate_block(body, builder)?;
            }

            Stmt::Block(block) => self.generate_block(block, builder)?,

            Stmt::Window(window) => self.generate_window_run(window, builder)?,

            Stmt::Expression { expr, span } => match expr {
                Expr::Call { callee, args, .. } => match Builtin::from_name(callee) {
                    Some(builtin) => self.generate_builtin(builtin, args, *span, builder)?,
                    None => {
                        let call = self.expressions().generate_expression(expr)?;
                        builder.line(&format!("{};", call));
                    }
                },
                _ => {
                    return Err(CodegenError::Unsupported {
                        what: "an expression statement that is not a call".to_string(),
                        span: *span,
                    })
                }
            },
        }
        Ok(())
    }

    /// `{ ... }` with each statement on its own line
    pub fn generate_block(&mut self, block: &Block, builder: &mut CSharpBuilder) -> CodegenResult<()> {
        builder.block(|builder| {
            for stmt in &block.statements {
                self.generate_statement(stmt, builder)?;
            }
            Ok(())
        })
    }

    fn generate_builtin(
        &mut self,
        builtin: Builtin,
        args: &[Expr],
        span: Span,
        builder: &mut CSharpBuilder,
    ) -> CodegenResult<()> {
        match (builtin, args) {
            (Builtin::UiMessage, [message]) => {
                let text = self.expressions().generate_text(message)?;
                builder.line(&format!("MessageBox.Show({});", text));
            }
            (Builtin::Pause, []) => builder.line("Console.ReadKey(true);"),
            (Builtin::Exit, []) if self.context.in_window() => builder.line("Application.Exit();"),
            (Builtin::Exit, []) => builder.line("Environment.Exit(0);"),
            _ => {
                return Err(CodegenError::Unsupported {
                    what: format!("`{}` with {} arguments", builtin.name(), args.len()),
                    span,
                })
            }
        }
        Ok(())
    }

    /// Show the window, passing captured variables to its constructor
    fn generate_window_run(&mut self, window: &WindowDecl, builder: &mut CSharpBuilder) -> CodegenResult<()> {
        if self.context.in_window() {
            return Err(CodegenError::Unsupported {
                what: format!("window `{}` declared inside another window", window.name),
                span: window.span,
            });
        }

        let args: Vec<String> = window
            .captures
            .iter()
            .map(|capture| self.context.mangle_symbol(capture.binding.id, &capture.name))
            .collect();
        builder.line(&format!(
            "Application.Run(new {}({}));",
            format_cs_identifier(&window.name),
            args.join(", ")
        ));
        Ok(())
    }
}

fn resolved(binding: &Option<Binding>, name: &str, span: Span) -> CodegenResult<Binding> {
    binding.ok_or_else(|| CodegenError::Unresolved {
        what: format!("variable `{}`", name),
        span,
    })
}
