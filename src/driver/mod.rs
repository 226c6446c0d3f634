//! Compilation pipeline
//!
//! Runs one source unit through lex, parse, resolve and generate, then
//! hands the result to a [`Toolchain`]. Any error stops the unit before the
//! next stage; warnings travel with the result.

use crate::ast::Program;
use crate::codegen::build::{BuildRequest, BuildResult, CancelToken, EmbeddedResource, OutputKind, Toolchain};
use crate::codegen::{CSharpGenerator, GeneratedUnit, GeneratorOptions};
use crate::config::CompilerConfig;
use crate::diagnostics::{has_errors, Diagnostic, Stage};
use crate::parser::parse_source;
use crate::semantic::{AnalyzerConfig, SemanticAnalyzer};
use log::{debug, info, warn};
use serde::Serialize;
use std::path::{Path, PathBuf};
use std::time::Instant;

pub mod batch;

pub use batch::{collect_sources, BatchReport, BatchUnit};

/// Options for the pure translation stages
#[derive(Debug, Clone, Default)]
pub struct TranslateOptions {
    pub generator: GeneratorOptions,
    pub analyzer: AnalyzerConfig,
}

/// A successfully translated unit
#[derive(Debug, Clone)]
pub struct Translation {
    pub unit_name: String,
    /// The resolved tree
    pub program: Program,
    pub generated: GeneratedUnit,
    pub warnings: Vec<Diagnostic>,
}

/// Translate Nova source to C# without invoking any toolchain
pub fn translate(name: &str, source: &str, options: &TranslateOptions) -> Result<Translation, Vec<Diagnostic>> {
    let started = Instant::now();

    let (mut program, diagnostics) = parse_source(source);
    if has_errors(&diagnostics) {
        debug!("{}: {} syntax diagnostics", name, diagnostics.len());
        return Err(diagnostics);
    }

    let analysis = SemanticAnalyzer::with_config(options.analyzer.clone()).analyze(&mut program);
    debug!(
        "{}: resolved {} symbols in {} scopes",
        name, analysis.stats.symbols_declared, analysis.stats.scopes_created
    );
    if analysis.has_errors() {
        return Err(analysis.diagnostics());
    }
    let warnings = analysis.diagnostics();

    let generated = CSharpGenerator::new(options.generator.clone())
        .generate(&program)
        .map_err(|error| {
            let mut diagnostics = vec![error.to_diagnostic()];
            diagnostics.extend(warnings.iter().cloned());
            diagnostics
        })?;

    debug!("{}: translated in {:?}", name, started.elapsed());
    Ok(Translation {
        unit_name: name.to_string(),
        program,
        generated,
        warnings,
    })
}

/// Outcome of one unit
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct UnitReport {
    pub unit: String,
    pub source_path: PathBuf,
    #[serde(flatten)]
    pub result: BuildResult,
}

impl UnitReport {
    pub fn is_success(&self) -> bool {
        self.result.is_success()
    }
}

/// Drives units through translation and a toolchain
pub struct Compiler<T: Toolchain> {
    toolchain: T,
    config: CompilerConfig,
}

impl<T: Toolchain> Compiler<T> {
    pub fn new(toolchain: T, config: CompilerConfig) -> Self {
        Self { toolchain, config }
    }

    pub fn config(&self) -> &CompilerConfig {
        &self.config
    }

    pub fn toolchain(&self) -> &T {
        &self.toolchain
    }

    pub fn translate_options(&self) -> TranslateOptions {
        TranslateOptions {
            generator: self.config.generator_options(),
            analyzer: self.config.analyzer_config(),
        }
    }

    /// Read, translate and build one source file
    pub fn compile_unit(&self, path: &Path, output_kind: OutputKind, cancel: &CancelToken) -> UnitReport {
        let unit = unit_name(path);
        info!("Compiling {} ({})", path.display(), output_kind);

        let result = match std::fs::read_to_string(path) {
            Ok(source) => self.compile_source(&unit, &source, path, output_kind, cancel),
            Err(error) => BuildResult::failure(format!("failed to read {}: {}", path.display(), error)),
        };

        match &result {
            BuildResult::Success { artifact_path, .. } => info!("{}: built {}", unit, artifact_path.display()),
            BuildResult::Failure { diagnostics } => warn!("{}: failed with {} diagnostics", unit, diagnostics.len()),
        }
        UnitReport {
            unit,
            source_path: path.to_path_buf(),
            result,
        }
    }

    /// Build already-loaded source. `path` locates icons and the artifact.
    pub fn compile_source(
        &self,
        unit: &str,
        source: &str,
        path: &Path,
        output_kind: OutputKind,
        cancel: &CancelToken,
    ) -> BuildResult {
        let translation = match translate(unit, source, &self.translate_options()) {
            Ok(translation) => translation,
            Err(diagnostics) => return BuildResult::Failure { diagnostics },
        };
        let mut warnings = translation.warnings;
        let generated = translation.generated;

        let source_dir = path.parent().unwrap_or_else(|| Path::new(""));
        let mut resources = Vec::new();
        let mut missing = Vec::new();
        for icon in &generated.icons {
            let resolved = source_dir.join(&icon.path);
            if resolved.is_file() {
                resources.push(EmbeddedResource { path: resolved, name: icon.resource_name.clone() });
            } else {
                missing.push(Diagnostic::error(
                    Stage::Toolchain,
                    format!("icon file `{}` not found (looked in {})", icon.path, resolved.display()),
                    icon.span.start,
                ));
            }
        }
        if !missing.is_empty() {
            missing.extend(warnings);
            return BuildResult::Failure { diagnostics: missing };
        }

        let artifact_path = self.artifact_path(path, output_kind);
        if self.config.keep_generated {
            let kept = artifact_path.with_extension("cs");
            let written = kept
                .parent()
                .map_or(Ok(()), std::fs::create_dir_all)
                .and_then(|_| std::fs::write(&kept, &generated.source));
            if let Err(error) = written {
                warnings.push(Diagnostic::warning(
                    Stage::Toolchain,
                    format!("could not keep generated source {}: {}", kept.display(), error),
                    Default::default(),
                ));
            }
        }

        let request = BuildRequest {
            unit_name: unit.to_string(),
            win32_icon: resources.first().map(|r| r.path.clone()),
            resources,
            generated_text: generated.source,
            output_kind,
            artifact_path,
            uses_forms: generated.uses_forms,
            source_map: generated.source_map,
        };

        let started = Instant::now();
        let result = self.toolchain.compile(&request, cancel);
        debug!("{}: toolchain finished in {:?}", unit, started.elapsed());

        match result {
            BuildResult::Success { artifact_path, warnings: toolchain_warnings } => {
                warnings.extend(toolchain_warnings);
                BuildResult::Success { artifact_path, warnings }
            }
            BuildResult::Failure { mut diagnostics } => {
                diagnostics.extend(warnings);
                BuildResult::Failure { diagnostics }
            }
        }
    }

    /// `<output_dir or source dir>/<stem>.exe|.dll`
    pub fn artifact_path(&self, source_path: &Path, output_kind: OutputKind) -> PathBuf {
        let dir = match &self.config.output_dir {
            Some(dir) => dir.clone(),
            None => source_path.parent().map(Path::to_path_buf).unwrap_or_default(),
        };
        dir.join(format!("{}.{}", unit_name(source_path), output_kind.extension()))
    }
}

/// File stem of a source path
pub fn unit_name(path: &Path) -> String {
    path.file_stem()
        .map(|stem| stem.to_string_lossy().into_owned())
        .unwrap_or_else(|| "unit".to_string())
}
