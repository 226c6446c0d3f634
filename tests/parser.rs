//! Parser integration tests
//!
//! These tests parse complete Nova programs and check tree shape, error
//! recovery and layout independence.

use nova::ast::*;
use nova::{parse_source, Stage};

/// Test parsing a complete Nova program
#[test]
fn test_parse_complete_program() {
    let source = r#"
        have name = "Nova"
        have n = 0
        while (n < 3) { n = n + 1 }
        when (n == 3) { put("done") } otherwise { put(n) }
        window Main {
            title = "Hello " + name
            width = 320
            set_icon("app.ico")
            label greeting { text = "Hi" }
            button ok {
                text = "OK"
                on_click { ui_message(name) }
            }
        }
        notify(name, 1)
    "#;

    let (program, diagnostics) = parse_source(source);
    assert!(diagnostics.is_empty(), "{:?}", diagnostics);
    assert_eq!(program.statements.len(), 6);

    assert!(matches!(&program.statements[2], Stmt::While { .. }));
    let Stmt::If { else_block, .. } = &program.statements[3] else { panic!("expected if") };
    assert!(else_block.is_some());

    let Stmt::Window(window) = &program.statements[4] else { panic!("expected window") };
    assert_eq!(window.name, "Main");
    assert_eq!(window.properties.len(), 2);
    assert_eq!(window.icons.len(), 1);
    assert_eq!(window.controls.len(), 2);
    assert_eq!(window.controls[1].kind_tag, "button");
    assert_eq!(window.controls[1].handlers[0].event, "on_click");
    assert_eq!(window.span.line(), 6);

    let Stmt::Expression { expr: Expr::Call { callee, args, .. }, .. } = &program.statements[5] else {
        panic!("expected call statement")
    };
    assert_eq!(callee, "notify");
    assert_eq!(args.len(), 2);
}

/// One malformed statement does not hide errors in later ones
#[test]
fn test_recovery_reports_each_bad_statement() {
    let source = "have = 1\nput(\"ok\")\nwhen x { }\nput(\"still parsed\")";
    let (program, diagnostics) = parse_source(source);

    assert_eq!(diagnostics.len(), 2, "{:?}", diagnostics);
    assert!(diagnostics.iter().all(|d| d.stage == Stage::Parse));
    assert_eq!(diagnostics[0].line, 1);
    assert_eq!(diagnostics[1].line, 3);

    let prints = program.statements.iter().filter(|s| matches!(s, Stmt::Print { .. })).count();
    assert_eq!(prints, 2);
}

#[test]
fn test_error_names_expected_and_found() {
    let (_, diagnostics) = parse_source("put(1");
    assert_eq!(diagnostics.len(), 1);
    let message = &diagnostics[0].message;
    assert!(message.contains("`)`"), "{}", message);
    assert!(message.contains("end of input"), "{}", message);
}

/// Equivalent programs written with different layout give equal trees
#[test]
fn test_round_trip_ignores_layout() {
    let compact = "have x = 1 when (x == 1) { put(\"a\") } otherwise { put(\"b\") }";
    let spread = r#"
        have x = 1;

        when (x == 1) {
            put("a");
        }
        otherwise
        {
            put("b")
        }
    "#;

    let (first, d1) = parse_source(compact);
    let (second, d2) = parse_source(spread);
    assert!(d1.is_empty() && d2.is_empty());
    assert_ne!(first, second);
    assert_eq!(first.without_positions(), second.without_positions());
}

#[test]
fn test_every_node_has_a_line() {
    let (program, _) = parse_source("have a = 1\n{\n  put(a)\n}\n");
    let Stmt::Block(block) = &program.statements[1] else { panic!("expected block") };
    assert_eq!(block.span.line(), 2);
    assert_eq!(block.statements[0].span().line(), 3);
}
