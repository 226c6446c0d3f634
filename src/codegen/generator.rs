//! C# translation unit generator
//!
//! Lays out the generated file: usings, the namespace, the static program
//! class holding `Main`, then one `Form` subclass per window in source
//! order.

use super::items::ItemGenerator;
use super::statements::StatementGenerator;
use super::{format_cs_identifier, CSharpBuilder, CodegenContext, CodegenError, CodegenResult, SourceMap};
use crate::ast::*;
use log::debug;

/// Type names the generated code refers to without qualification
const FRAMEWORK_TYPES: &[&str] = &[
    "Application", "Button", "CheckBox", "Console", "Convert", "Environment", "Form", "Icon",
    "Label", "MessageBox", "Point", "Size", "STAThread", "System", "TextBox",
];

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GeneratorOptions {
    /// Name of the static class holding `Main`
    pub class_name: String,
    /// Enclosing namespace; `None` emits top-level types
    pub namespace: Option<String>,
}

impl Default for GeneratorOptions {
    fn default() -> Self {
        Self {
            class_name: "NovaProgram".to_string(),
            namespace: Some("Nova.Generated".to_string()),
        }
    }
}

/// An icon file to embed as a manifest resource
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IconResource {
    pub window: String,
    /// Path as written in the source
    pub path: String,
    /// Name the window class loads the resource by
    pub resource_name: String,
    /// The `set_icon` it came from
    pub span: Span,
}

/// Output of a successful generation
#[derive(Debug, Clone)]
pub struct GeneratedUnit {
    pub source: String,
    pub source_map: SourceMap,
    /// The unit needs System.Windows.Forms (and a windowed subsystem)
    pub uses_forms: bool,
    pub icons: Vec<IconResource>,
}

/// Main C# generator
pub struct CSharpGenerator {
    options: GeneratorOptions,
}

impl CSharpGenerator {
    pub fn new(options: GeneratorOptions) -> Self {
        Self { options }
    }

    pub fn options(&self) -> &GeneratorOptions {
        &self.options
    }

    /// Generate a complete C# file for a resolved program
    pub fn generate(&self, program: &Program) -> CodegenResult<GeneratedUnit> {
        let windows = collect_windows(&program.statements);
        for window in &windows {
            self.check_window_name(window)?;
        }

        let uses_forms = !windows.is_empty() || uses_message_box(&program.statements);
        let mut context = CodegenContext::new(self.options.class_name.clone());
        context.uses_forms = uses_forms;

        let mut builder = CSharpBuilder::new();
        builder.line("using System;");
        if !windows.is_empty() {
            builder.line("using System.Drawing;");
        }
        if uses_forms {
            builder.line("using System.Windows.Forms;");
        }
        builder.blank();

        let icons: Vec<IconResource> = windows
            .iter()
            .filter_map(|window| {
                window.icon.as_ref().map(|path| IconResource {
                    window: window.name.clone(),
                    path: path.clone(),
                    resource_name: format!("{}.{}", window.name, file_name(path)),
                    span: window.icons.first().map_or(window.span, |icon| icon.span),
                })
            })
            .collect();

        match &self.options.namespace {
            Some(namespace) => {
                builder.line(&format!("namespace {}", namespace));
                builder.block(|builder| self.generate_types(program, &windows, &icons, &mut context, builder))?;
            }
            None => self.generate_types(program, &windows, &icons, &mut context, &mut builder)?,
        }

        let (source, source_map) = builder.build();
        debug!(
            "Generated {} lines of C# ({} windows, {} icons)",
            source_map.len(),
            windows.len(),
            icons.len()
        );
        Ok(GeneratedUnit { source, source_map, uses_forms, icons })
    }

    fn generate_types(
        &self,
        program: &Program,
        windows: &[&WindowDecl],
        icons: &[IconResource],
        context: &mut CodegenContext,
        builder: &mut CSharpBuilder,
    ) -> CodegenResult<()> {
        builder.line(&format!("public static class {}", format_cs_identifier(&self.options.class_name)));
        builder.block(|builder| {
            builder.line("[STAThread]");
            builder.line("public static void Main(string[] args)");
            builder.block(|builder| {
                if context.uses_forms {
                    builder.line("Application.EnableVisualStyles();");
                    builder.line("Application.SetCompatibleTextRenderingDefault(false);");
                }
                let mut statements = StatementGenerator::new(context);
                for stmt in &program.statements {
                    statements.generate_statement(stmt, builder)?;
                }
                builder.detach();
                Ok(())
            })
        })?;

        for window in windows {
            builder.detach();
            builder.blank();
            let resource_name = icons
                .iter()
                .find(|icon| icon.window == window.name)
                .map(|icon| icon.resource_name.as_str());
            ItemGenerator::new(context).generate_window(window, resource_name, builder)?;
        }
        builder.detach();
        Ok(())
    }

    /// Window classes share a namespace with the program class and the
    /// framework types the output uses unqualified
    fn check_window_name(&self, window: &WindowDecl) -> CodegenResult<()> {
        let reason = if window.name == self.options.class_name {
            Some("the program class")
        } else if FRAMEWORK_TYPES.contains(&window.name.as_str()) {
            Some("a framework type")
        } else {
            None
        };
        match reason {
            Some(reason) => Err(CodegenError::ReservedName {
                name: window.name.clone(),
                reason: reason.to_string(),
                span: window.span,
            }),
            None => Ok(()),
        }
    }
}

impl Default for CSharpGenerator {
    fn default() -> Self {
        Self::new(GeneratorOptions::default())
    }
}

/// Every window declaration, in source order
fn collect_windows(statements: &[Stmt]) -> Vec<&WindowDecl> {
    let mut windows = Vec::new();
    for stmt in statements {
        match stmt {
            Stmt::Window(window) => windows.push(window),
            Stmt::If { then_block, else_block, .. } => {
                windows.extend(collect_windows(&then_block.statements));
                if let Some(block) = else_block {
                    windows.extend(collect_windows(&block.statements));
                }
            }
            Stmt::While { body, .. } | Stmt::Block(body) => windows.extend(collect_windows(&body.statements)),
            _ => {}
        }
    }
    windows
}

fn uses_message_box(statements: &[Stmt]) -> bool {
    statements.iter().any(|stmt| match stmt {
        Stmt::Expression { expr: Expr::Call { callee, .. }, .. } => callee == "ui_message",
        Stmt::If { then_block, else_block, .. } => {
            uses_message_box(&then_block.statements)
                || else_block.as_ref().map_or(false, |block| uses_message_box(&block.statements))
        }
        Stmt::While { body, .. } | Stmt::Block(body) => uses_message_box(&body.statements),
        _ => false,
    })
}

/// Last path component, accepting either separator
fn file_name(path: &str) -> &str {
    path.rsplit(['/', '\\']).next().unwrap_or(path)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::parse_source;
    use crate::semantic::SemanticAnalyzer;

    fn resolve(source: &str) -> Program {
        let (mut program, diagnostics) = parse_source(source);
        assert!(diagnostics.is_empty(), "{:?}", diagnostics);
        let result = SemanticAnalyzer::new().analyze(&mut program);
        assert!(!result.has_errors(), "{:?}", result.errors);
        program
    }

    #[test]
    fn test_console_program_layout() {
        let unit = CSharpGenerator::default().generate(&resolve("put(\"hello\")")).unwrap();
        let expected = "\
using System;

namespace Nova.Generated
{
    public static class NovaProgram
    {
        [STAThread]
        public static void Main(string[] args)
        {
            Console.WriteLine(\"hello\");
        }
    }
}
";
        assert_eq!(unit.source, expected);
        assert!(!unit.uses_forms);
        assert!(unit.icons.is_empty());
        assert_eq!(unit.source_map.source_line(10), Some(1));
        assert_eq!(unit.source_map.source_line(11), None);
    }

    #[test]
    fn test_message_box_pulls_in_forms() {
        let unit = CSharpGenerator::default().generate(&resolve("when (true) { ui_message(\"x\") }")).unwrap();
        assert!(unit.uses_forms);
        assert!(unit.source.contains("using System.Windows.Forms;"));
        assert!(!unit.source.contains("using System.Drawing;"));
        assert!(unit.source.contains("Application.EnableVisualStyles();"));
    }

    #[test]
    fn test_window_program() {
        let program = resolve("have t = \"Hi\"\nwindow Main { title = t set_icon(\"assets/app.ico\") }");
        let unit = CSharpGenerator::default().generate(&program).unwrap();
        assert!(unit.uses_forms);
        assert!(unit.source.contains("using System.Drawing;"));
        assert!(unit.source.contains("Application.Run(new Main(t_0));"));
        assert!(unit.source.contains("    public class Main : Form"));
        assert_eq!(unit.icons.len(), 1);
        assert_eq!(unit.icons[0].window, "Main");
        assert_eq!(unit.icons[0].path, "assets/app.ico");
        assert_eq!(unit.icons[0].resource_name, "Main.app.ico");
        assert_eq!(unit.icons[0].span.line(), 2);
    }

    #[test]
    fn test_without_namespace() {
        let generator = CSharpGenerator::new(GeneratorOptions {
            class_name: "App".to_string(),
            namespace: None,
        });
        let unit = generator.generate(&resolve("pause()")).unwrap();
        assert!(unit.source.starts_with("using System;\n\npublic static class App\n{"));
    }

    #[test]
    fn test_reserved_window_names() {
        let err = CSharpGenerator::default().generate(&resolve("window NovaProgram { }")).unwrap_err();
        assert!(matches!(err, CodegenError::ReservedName { .. }));
        assert!(err.to_string().contains("the program class"));

        let err = CSharpGenerator::default().generate(&resolve("window Form { }")).unwrap_err();
        assert!(err.to_string().contains("a framework type"));
    }

    #[test]
    fn test_generation_is_deterministic() {
        let source = "have a = 1\nwindow W { button b { text = \"go\" on_click { put(a) } } }";
        let first = CSharpGenerator::default().generate(&resolve(source)).unwrap();
        let second = CSharpGenerator::default().generate(&resolve(source)).unwrap();
        assert_eq!(first.source, second.source);
    }

    #[test]
    fn test_icon_file_name() {
        assert_eq!(file_name("a/b/c.ico"), "c.ico");
        assert_eq!(file_name("a\\b.ico"), "b.ico");
        assert_eq!(file_name("x.ico"), "x.ico");
    }
}
