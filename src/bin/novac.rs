//! Nova Compiler CLI Driver
//!
//! Source → Lexing → Parsing → Resolution → C# generation → csc

use anyhow::{bail, Context, Result};
use clap::Parser;
use nova::{
    driver::collect_sources, translate, BatchUnit, CancelToken, Compiler, CompilerConfig, CscToolchain,
    Diagnostic, OutputKind, UnitReport,
};
use std::fs;
use std::path::{Path, PathBuf};
use std::process::ExitCode;

/// Compile Nova programs to .NET executables and libraries
#[derive(Debug, Parser)]
#[command(name = "novac", version)]
struct Args {
    /// Source files, or directories whose .nova files are compiled
    #[arg(required = true)]
    inputs: Vec<PathBuf>,

    /// Artifact kind
    #[arg(long, value_name = "exe|dll")]
    target: Option<OutputKind>,

    /// Name of the generated program class
    #[arg(long)]
    class_name: Option<String>,

    /// Directory for artifacts [default: next to each source]
    #[arg(long, value_name = "DIR")]
    out_dir: Option<PathBuf>,

    /// Path to csc.exe
    #[arg(long, value_name = "PATH")]
    csc: Option<PathBuf>,

    /// Extra assembly references (repeatable; `;` or `,` separated)
    #[arg(long = "reference", value_name = "DLL")]
    references: Vec<String>,

    /// Seconds one csc run may take (0 for no limit)
    #[arg(long, value_name = "SECS")]
    timeout: Option<u64>,

    /// Print the generated C# instead of building
    #[arg(long)]
    emit: bool,

    /// Print a JSON report
    #[arg(long)]
    json: bool,

    /// Configuration file [default: ./nova.json if present]
    #[arg(long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Enable debug logging
    #[arg(short, long)]
    verbose: bool,
}

impl Args {
    /// File settings with command-line overrides applied
    fn config(&self) -> Result<CompilerConfig> {
        let cwd = std::env::current_dir().context("failed to read the working directory")?;
        let mut config = CompilerConfig::load(self.config.as_deref(), &cwd)?;

        if let Some(target) = self.target {
            config.output_kind = target;
        }
        if let Some(class_name) = &self.class_name {
            config.class_name = class_name.clone();
        }
        if let Some(dir) = &self.out_dir {
            config.output_dir = Some(dir.clone());
        }
        if let Some(csc) = &self.csc {
            config.csc_path = Some(csc.clone());
        }
        if let Some(timeout) = self.timeout {
            config.timeout_secs = timeout;
        }
        config.extra_references.extend(self.references.iter().cloned());
        config.validate()?;
        Ok(config)
    }
}

fn main() -> ExitCode {
    let args = Args::parse();
    let level = if args.verbose { "debug" } else { "warn" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level)).init();

    match run(&args) {
        Ok(true) => ExitCode::SUCCESS,
        Ok(false) => ExitCode::FAILURE,
        Err(error) => {
            eprintln!("error: {:#}", error);
            ExitCode::from(2)
        }
    }
}

/// Returns whether every unit succeeded
fn run(args: &Args) -> Result<bool> {
    let config = args.config()?;
    let sources = collect_sources(&args.inputs).context("failed to list input files")?;
    if sources.is_empty() {
        bail!("no .nova files found");
    }

    if args.emit {
        return emit(&sources, &config);
    }

    let units: Vec<BatchUnit> = sources
        .iter()
        .map(|path| BatchUnit::new(path.clone(), config.output_kind))
        .collect();
    let toolchain = CscToolchain::new(config.build_config());
    let compiler = Compiler::new(toolchain, config);
    let cancel = CancelToken::new();
    cancel
        .cancel_on(tokio::signal::ctrl_c())
        .context("failed to install the Ctrl-C handler")?;
    let report = compiler.compile_batch(&units, &cancel);

    if args.json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        for unit in &report.units {
            print_unit(unit);
        }
        println!("{} succeeded, {} failed", report.succeeded, report.failed);
    }
    Ok(report.all_succeeded())
}

/// Translate each source and print the C#, or its diagnostics
fn emit(sources: &[PathBuf], config: &CompilerConfig) -> Result<bool> {
    let options = nova::TranslateOptions {
        generator: config.generator_options(),
        analyzer: config.analyzer_config(),
    };
    let mut ok = true;
    for path in sources {
        let source = fs::read_to_string(path).with_context(|| format!("failed to read {}", path.display()))?;
        let name = nova::driver::unit_name(path);
        match translate(&name, &source, &options) {
            Ok(translation) => {
                print_diagnostics(path, &source, &translation.warnings);
                print!("{}", translation.generated.source);
            }
            Err(diagnostics) => {
                print_diagnostics(path, &source, &diagnostics);
                ok = false;
            }
        }
    }
    Ok(ok)
}

fn print_unit(unit: &UnitReport) {
    match &unit.result {
        nova::BuildResult::Success { artifact_path, warnings } => {
            print_report_diagnostics(&unit.source_path, warnings);
            println!("{}: built {}", unit.unit, artifact_path.display());
        }
        nova::BuildResult::Failure { diagnostics } => {
            print_report_diagnostics(&unit.source_path, diagnostics);
            println!("{}: failed", unit.unit);
        }
    }
}

/// Source may have changed or vanished since the build; render without it then
fn print_report_diagnostics(path: &Path, diagnostics: &[Diagnostic]) {
    let source = fs::read_to_string(path).unwrap_or_default();
    print_diagnostics(path, &source, diagnostics);
}

fn print_diagnostics(path: &Path, source: &str, diagnostics: &[Diagnostic]) {
    let file_name = path.display().to_string();
    for diagnostic in diagnostics {
        if diagnostic.line == 0 {
            eprintln!("{}: {}", file_name, diagnostic);
        } else {
            eprintln!("{}", diagnostic.render(&file_name, source));
        }
    }
}
