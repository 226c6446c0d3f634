//! End-to-end pipeline tests against a stub toolchain

mod common;

use common::{write_sources, StubToolchain};
use nova::{BatchUnit, BuildResult, CancelToken, Compiler, CompilerConfig, OutputKind, Severity, Stage};

#[test]
fn test_successful_unit_reports_artifact() {
    let dir = write_sources(&[("hello.nova", "put(\"Hello\")")]);
    let compiler = Compiler::new(StubToolchain::succeeding(), CompilerConfig::default());

    let report = compiler.compile_unit(&dir.path().join("hello.nova"), OutputKind::Exe, &CancelToken::new());
    assert_eq!(
        report.result,
        BuildResult::Success {
            artifact_path: dir.path().join("hello.exe"),
            warnings: Vec::new(),
        }
    );

    let requests = compiler.toolchain().requests.borrow();
    assert_eq!(requests.len(), 1);
    assert_eq!(requests[0].unit_name, "hello");
    assert!(!requests[0].uses_forms);
    assert!(requests[0].generated_text.contains("Console.WriteLine(\"Hello\");"));
}

#[test]
fn test_failed_translation_never_reaches_toolchain() {
    let dir = write_sources(&[("bad.nova", "put(nothing)")]);
    let compiler = Compiler::new(StubToolchain::succeeding(), CompilerConfig::default());

    let report = compiler.compile_unit(&dir.path().join("bad.nova"), OutputKind::Exe, &CancelToken::new());
    assert!(!report.is_success());
    assert_eq!(report.result.diagnostics()[0].stage, Stage::Resolve);
    assert_eq!(compiler.toolchain().request_count(), 0);
}

/// Native diagnostics come back on the Nova line that produced them
#[test]
fn test_toolchain_errors_map_to_source_lines() {
    let source = "have n = 1\n\nhelper(n)";
    let dir = write_sources(&[("calls.nova", source)]);

    let probe = nova::translate("calls", source, &Default::default()).unwrap();
    let generated_line = probe
        .generated
        .source
        .lines()
        .position(|line| line.contains("helper(n_0);"))
        .unwrap()
        + 1;
    let csc_output = format!(
        "calls.cs({},13): error CS0103: The name 'helper' does not exist in the current context",
        generated_line
    );

    let compiler = Compiler::new(StubToolchain::failing_with(&csc_output), CompilerConfig::default());
    let report = compiler.compile_unit(&dir.path().join("calls.nova"), OutputKind::Exe, &CancelToken::new());

    let diagnostics = report.result.diagnostics();
    assert!(!report.is_success());
    assert_eq!(diagnostics[0].stage, Stage::Toolchain);
    assert_eq!(diagnostics[0].line, 3);
    assert!(diagnostics[0].message.starts_with("CS0103"));
}

#[test]
fn test_batch_counts_and_isolation() {
    let dir = write_sources(&[
        ("a.nova", "have a = 1\nput(a)"),
        ("b.nova", "put(undeclared)"),
        ("c.nova", "window W { label l { text = \"x\" } }"),
    ]);
    let units: Vec<BatchUnit> = ["a", "b", "c"]
        .iter()
        .map(|name| BatchUnit::new(dir.path().join(format!("{}.nova", name)), OutputKind::Dll))
        .collect();

    let compiler = Compiler::new(StubToolchain::succeeding(), CompilerConfig::default());
    let report = compiler.compile_batch(&units, &CancelToken::new());

    assert_eq!(report.succeeded, 2);
    assert_eq!(report.failed, 1);
    assert!(!report.all_succeeded());
    let names: Vec<&str> = report.units.iter().map(|u| u.unit.as_str()).collect();
    assert_eq!(names, vec!["a", "b", "c"]);
    assert!(!report.units[1].is_success());

    // b's failure leaves c untouched
    let requests = compiler.toolchain().requests.borrow();
    assert_eq!(requests.len(), 2);
    assert!(requests[1].uses_forms);
    assert_eq!(requests[1].artifact_path, dir.path().join("c.dll"));
}

#[test]
fn test_cancelled_batch_starts_nothing() {
    let dir = write_sources(&[("a.nova", "put(1)"), ("b.nova", "put(2)")]);
    let units = vec![
        BatchUnit::new(dir.path().join("a.nova"), OutputKind::Exe),
        BatchUnit::new(dir.path().join("b.nova"), OutputKind::Exe),
    ];
    let cancel = CancelToken::new();
    cancel.cancel();

    let compiler = Compiler::new(StubToolchain::succeeding(), CompilerConfig::default());
    let report = compiler.compile_batch(&units, &cancel);
    assert_eq!(report.failed, 2);
    assert_eq!(compiler.toolchain().request_count(), 0);
    assert!(report.units.iter().all(|u| u.result == BuildResult::failure("cancelled before start")));
}

#[test]
fn test_warnings_travel_with_success() {
    let dir = write_sources(&[("warn.nova", "have unused = 1")]);
    let compiler = Compiler::new(StubToolchain::succeeding(), CompilerConfig::default());
    let report = compiler.compile_unit(&dir.path().join("warn.nova"), OutputKind::Exe, &CancelToken::new());

    assert!(report.is_success());
    let warnings = report.result.diagnostics();
    assert_eq!(warnings.len(), 1);
    assert_eq!(warnings[0].severity, Severity::Warning);
}

#[test]
fn test_json_report_shape() {
    let dir = write_sources(&[("a.nova", "put(1)"), ("b.nova", "put(x)")]);
    let units = vec![
        BatchUnit::new(dir.path().join("a.nova"), OutputKind::Exe),
        BatchUnit::new(dir.path().join("b.nova"), OutputKind::Exe),
    ];
    let compiler = Compiler::new(StubToolchain::succeeding(), CompilerConfig::default());
    let report = compiler.compile_batch(&units, &CancelToken::new());

    let json = serde_json::to_value(&report).unwrap();
    assert_eq!(json["succeeded"], 1);
    assert_eq!(json["failed"], 1);
    assert_eq!(json["units"][0]["unit"], "a");
    assert_eq!(json["units"][0]["result"], "success");
    assert_eq!(json["units"][1]["result"], "failure");
    assert_eq!(json["units"][1]["diagnostics"][0]["stage"], "resolve");
    assert_eq!(json["units"][1]["diagnostics"][0]["severity"], "error");
}
