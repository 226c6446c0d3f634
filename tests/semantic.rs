//! Semantic analysis integration tests
//!
//! These tests run the resolver over complete Nova programs and check the
//! resolution guarantees later stages depend on.

use nova::ast::*;
use nova::{parse_source, translate, SemanticAnalyzer, Stage, TranslateOptions};

fn analyze(source: &str) -> (Program, nova::semantic::AnalysisResult) {
    let (mut program, diagnostics) = parse_source(source);
    assert!(diagnostics.is_empty(), "{:?}", diagnostics);
    let result = SemanticAnalyzer::new().analyze(&mut program);
    (program, result)
}

fn print_binding(stmt: &Stmt) -> Binding {
    match stmt {
        Stmt::Print { expr: Expr::Identifier { binding: Some(binding), .. }, .. } => *binding,
        other => panic!("expected a resolved put(identifier), got {:?}", other),
    }
}

/// Inner `put` sees the inner declaration, the outer one the outer
#[test]
fn test_shadowing_resolves_to_nearest_declaration() {
    let (program, result) = analyze("have x = 1 { have x = 2 put(x) } put(x)");
    assert!(!result.has_errors(), "{:?}", result.errors);

    let Stmt::VarDecl { binding: Some(outer), .. } = &program.statements[0] else { panic!("expected decl") };
    let Stmt::Block(block) = &program.statements[1] else { panic!("expected block") };
    let Stmt::VarDecl { binding: Some(inner), .. } = &block.statements[0] else { panic!("expected decl") };

    assert_ne!(outer.id, inner.id);
    assert_eq!(print_binding(&block.statements[1]), *inner);
    assert_eq!(print_binding(&program.statements[2]), *outer);
}

/// Exactly one resolution error, and generation never runs
#[test]
fn test_undeclared_identifier() {
    let (_, result) = analyze("have a = 1\nput(a + missing)\nput(missing)");
    assert_eq!(result.errors.len(), 1);
    assert_eq!(result.errors[0].to_string(), "undeclared variable `missing`");

    let diagnostics = translate("unit", "put(missing)", &TranslateOptions::default()).unwrap_err();
    assert_eq!(diagnostics.len(), 1);
    assert_eq!(diagnostics[0].stage, Stage::Resolve);
    assert!(diagnostics.iter().all(|d| d.stage != Stage::Generate));
}

#[test]
fn test_duplicate_icon_is_one_error() {
    let source = "window Main {\n  set_icon(\"a.ico\")\n  set_icon(\"b.ico\")\n}";
    let (_, result) = analyze(source);
    assert_eq!(result.errors.len(), 1);
    assert!(result.errors[0].to_string().starts_with("duplicate icon declaration"));

    let diagnostics = translate("unit", source, &TranslateOptions::default()).unwrap_err();
    assert_eq!(diagnostics.iter().filter(|d| d.is_error()).count(), 1);
}

#[test]
fn test_icon_from_constant() {
    let (program, result) = analyze("have dir = \"icons/\"\nwindow W { set_icon(dir + \"main.ico\") }");
    assert!(!result.has_errors(), "{:?}", result.errors);
    let Stmt::Window(window) = &program.statements[1] else { panic!("expected window") };
    assert_eq!(window.icon.as_deref(), Some("icons/main.ico"));

    let (_, result) = analyze("have dir = \"icons/\"\ndir = \"other/\"\nwindow W { set_icon(dir + \"main.ico\") }");
    assert_eq!(result.errors.len(), 1);
}

#[test]
fn test_kinds_inferred_from_literals() {
    let (program, result) = analyze("have s = \"a\"\nhave n = 1.5\nhave b = n > 1\nput(s) put(n) put(b)");
    assert!(!result.has_errors());
    let kinds: Vec<ValueKind> = program.statements[3..].iter().map(|s| print_binding(s).kind).collect();
    assert_eq!(kinds, vec![ValueKind::String, ValueKind::Number, ValueKind::Bool]);
}

#[test]
fn test_control_registry_checks() {
    let source = r#"
        window W {
            button go { }
            checkbox c { text = "ok" checked = 1 }
            label l { text = "x" on_click { } }
        }
    "#;
    let (_, result) = analyze(source);
    let messages: Vec<String> = result.errors.iter().map(|e| e.to_string()).collect();
    assert_eq!(messages.len(), 3, "{:?}", messages);
    assert_eq!(messages[0], "button `go` is missing required property `text`");
    assert!(result.errors.iter().all(|e| e.to_diagnostic().stage == Stage::Resolve));
}

#[test]
fn test_window_reads_outer_variables() {
    let source = "have title = \"Main\"\nwindow W { title = title button b { text = title on_click { put(title) } } }";
    let (program, result) = analyze(source);
    assert!(!result.has_errors(), "{:?}", result.errors);
    let Stmt::Window(window) = &program.statements[1] else { panic!("expected window") };
    assert_eq!(window.captures.len(), 1);
    assert_eq!(window.captures[0].name, "title");
}

#[test]
fn test_each_analysis_is_independent() {
    let mut analyzer = SemanticAnalyzer::new();
    let (mut first, _) = parse_source("put(x)");
    let (mut second, _) = parse_source("have x = 1\nput(x)");
    assert!(analyzer.analyze(&mut first).has_errors());
    assert!(!analyzer.analyze(&mut second).has_errors());
}
