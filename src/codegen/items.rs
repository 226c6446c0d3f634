//! Window Class Generation for Nova
//!
//! Each `window` declaration becomes a `Form` subclass. Everything the
//! window sets up happens in its constructor; captured outer variables
//! arrive as constructor parameters.

use super::expressions::{generate_literal, ExpressionGenerator};
use super::statements::StatementGenerator;
use super::{cs_string_literal, format_cs_identifier, CSharpBuilder, CodegenContext, CodegenResult};
use crate::ast::*;
use crate::semantic::controls::{
    DEFAULT_WINDOW_HEIGHT, DEFAULT_WINDOW_TITLE, DEFAULT_WINDOW_WIDTH, LAYOUT_MARGIN, LAYOUT_ROW_HEIGHT,
};

/// Item code generator (window classes)
pub struct ItemGenerator<'a> {
    /// Generation context
    context: &'a mut CodegenContext,
}

impl<'a> ItemGenerator<'a> {
    pub fn new(context: &'a mut CodegenContext) -> Self {
        Self { context }
    }

    /// Generate the class for a window. `resource_name` is the manifest
    /// resource the icon is embedded under, if the window has one.
    pub fn generate_window(
        &mut self,
        window: &WindowDecl,
        resource_name: Option<&str>,
        builder: &mut CSharpBuilder,
    ) -> CodegenResult<()> {
        let class_name = format_cs_identifier(&window.name);
        self.context.current_window = Some(window.name.clone());

        builder.at(window.span.start);
        builder.line(&format!("public class {} : Form", class_name));
        let result = builder.block(|builder| {
            let params = window
                .captures
                .iter()
                .map(|capture| {
                    let ty = self.context.map_kind(capture.binding.kind, window.span)?;
                    Ok(format!("{} {}", ty, self.context.mangle_symbol(capture.binding.id, &capture.name)))
                })
                .collect::<CodegenResult<Vec<_>>>()?;

            builder.line(&format!("public {}({})", class_name, params.join(", ")));
            builder.block(|builder| {
                self.generate_window_properties(window, builder)?;
                if let Some(resource_name) = resource_name {
                    builder.at(window.icons.first().map_or(window.span, |icon| icon.span).start);
                    generate_icon_loader(&class_name, resource_name, builder);
                }
                for (index, control) in window.controls.iter().enumerate() {
                    self.generate_control(control, index, builder)?;
                }
                Ok(())
            })
        });

        self.context.current_window = None;
        result
    }

    /// Title and client size, with defaults for whatever the source omits
    fn generate_window_properties(&mut self, window: &WindowDecl, builder: &mut CSharpBuilder) -> CodegenResult<()> {
        let mut expressions = ExpressionGenerator::new(self.context);

        builder.at(find_property(&window.properties, "title").map_or(window.span, |p| p.span).start);
        let title = match find_property(&window.properties, "title") {
            Some(property) => expressions.generate_text(&property.value)?,
            None => cs_string_literal(DEFAULT_WINDOW_TITLE),
        };
        builder.line(&format!("Text = {};", title));

        let width = find_property(&window.properties, "width");
        let height = find_property(&window.properties, "height");
        builder.at(width.or(height).map_or(window.span, |p| p.span).start);
        let width = match width {
            Some(property) => expressions.generate_int(&property.value)?,
            None => DEFAULT_WINDOW_WIDTH.to_string(),
        };
        let height = match height {
            Some(property) => expressions.generate_int(&property.value)?,
            None => DEFAULT_WINDOW_HEIGHT.to_string(),
        };
        builder.line(&format!("ClientSize = new Size({}, {});", width, height));
        Ok(())
    }

    /// Construct one control, apply its properties and layout, wire its
    /// handlers and add it to the form
    fn generate_control(&mut self, control: &ControlDecl, index: usize, builder: &mut CSharpBuilder) -> CodegenResult<()> {
        let kind = control.kind.ok_or_else(|| super::CodegenError::Unresolved {
            what: format!("control `{}`", control.name),
            span: control.span,
        })?;
        let spec = kind.spec();
        let local = format!("{}_ctl", control.name);

        builder.at(control.span.start);
        builder.line(&format!("var {} = new {}();", local, spec.class_name));

        let mut expressions = ExpressionGenerator::new(self.context);
        for property in &control.properties {
            let Some(target) = spec.properties.iter().find(|p| p.name == property.name) else {
                continue; // geometry, handled below
            };
            builder.at(property.span.start);
            let value = match target.kind {
                ValueKind::String => expressions.generate_text(&property.value)?,
                _ => expressions.generate_expression(&property.value)?,
            };
            builder.line(&format!("{}.{} = {};", local, target.target, value));
        }

        builder.at(control.span.start);
        let width = find_property(&control.properties, "width");
        let height = find_property(&control.properties, "height");
        if width.is_some() || height.is_some() {
            if let Some(width) = width {
                builder.line(&format!("{}.Width = {};", local, expressions.generate_int(&width.value)?));
            }
            if let Some(height) = height {
                builder.line(&format!("{}.Height = {};", local, expressions.generate_int(&height.value)?));
            }
        } else if let Some((w, h)) = spec.default_size {
            builder.line(&format!("{}.Size = new Size({}, {});", local, w, h));
        } else {
            builder.line(&format!("{}.AutoSize = true;", local));
        }

        let x = match find_property(&control.properties, "x") {
            Some(property) => expressions.generate_int(&property.value)?,
            None => LAYOUT_MARGIN.to_string(),
        };
        let y = match find_property(&control.properties, "y") {
            Some(property) => expressions.generate_int(&property.value)?,
            None => (LAYOUT_MARGIN + LAYOUT_ROW_HEIGHT * index as i32).to_string(),
        };
        builder.line(&format!("{}.Location = new Point({}, {});", local, x, y));

        for handler in &control.handlers {
            let Some(event) = spec.event(&handler.event) else {
                continue;
            };
            builder.at(handler.span.start);
            builder.line(&format!("{}.{} += (sender, e) =>", local, event.target));
            builder.open_block();
            let mut statements = StatementGenerator::new(self.context);
            for stmt in &handler.body.statements {
                statements.generate_statement(stmt, builder)?;
            }
            builder.at(handler.span.start);
            builder.indent_dec();
            builder.line("};");
        }

        builder.at(control.span.start);
        builder.line(&format!("Controls.Add({});", local));
        Ok(())
    }
}

fn find_property<'p>(properties: &'p [Property], name: &str) -> Option<&'p Property> {
    properties.iter().find(|p| p.name == name)
}

/// Load the embedded icon; a missing resource leaves the default icon
fn generate_icon_loader(class_name: &str, resource_name: &str, builder: &mut CSharpBuilder) {
    builder.line(&format!(
        "using (var iconStream = typeof({}).Assembly.GetManifestResourceStream({}))",
        class_name,
        generate_literal(&Literal::String(resource_name.to_string()))
    ));
    builder.open_block();
    builder.line("if (iconStream != null)");
    builder.open_block();
    builder.line("Icon = new Icon(iconStream);");
    builder.close_block();
    builder.close_block();
}
