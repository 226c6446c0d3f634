//! Build System Integration for Nova
//!
//! This module hands generated C# to the .NET Framework compiler (`csc`)
//! and turns its output back into source-positioned diagnostics. The core
//! pipeline only sees the [`Toolchain`] trait, so tests can substitute a
//! stub for the real compiler.

use super::SourceMap;
use crate::diagnostics::{Diagnostic, Severity, Stage};
use log::{debug, info};
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::fs;
use std::future::Future;
use std::path::{Path, PathBuf};
use std::process::Stdio;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, OnceLock};
use std::time::Duration;
use thiserror::Error;

/// Kind of artifact to produce
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputKind {
    #[default]
    Exe,
    Dll,
}

impl OutputKind {
    pub fn extension(self) -> &'static str {
        match self {
            OutputKind::Exe => "exe",
            OutputKind::Dll => "dll",
        }
    }

    /// csc `/target:` value; executables with windows use the GUI subsystem
    pub fn target_flag(self, uses_forms: bool) -> &'static str {
        match (self, uses_forms) {
            (OutputKind::Dll, _) => "library",
            (OutputKind::Exe, true) => "winexe",
            (OutputKind::Exe, false) => "exe",
        }
    }
}

impl std::str::FromStr for OutputKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "exe" => Ok(OutputKind::Exe),
            "dll" => Ok(OutputKind::Dll),
            other => Err(format!("unknown output kind `{}` (expected exe or dll)", other)),
        }
    }
}

impl std::fmt::Display for OutputKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.extension())
    }
}

/// A file embedded into the assembly under a manifest resource name
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct EmbeddedResource {
    pub path: PathBuf,
    pub name: String,
}

/// Everything a toolchain needs to build one unit
#[derive(Debug, Clone)]
pub struct BuildRequest {
    pub unit_name: String,
    pub generated_text: String,
    pub output_kind: OutputKind,
    pub artifact_path: PathBuf,
    /// Application icon shown by the shell
    pub win32_icon: Option<PathBuf>,
    pub resources: Vec<EmbeddedResource>,
    pub uses_forms: bool,
    pub source_map: SourceMap,
}

/// Outcome of building one unit
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "result", rename_all = "lowercase")]
pub enum BuildResult {
    Success {
        artifact_path: PathBuf,
        warnings: Vec<Diagnostic>,
    },
    Failure {
        diagnostics: Vec<Diagnostic>,
    },
}

impl BuildResult {
    /// A failure carrying one unpositioned toolchain error
    pub fn failure(message: impl Into<String>) -> Self {
        BuildResult::Failure {
            diagnostics: vec![Diagnostic::unpositioned(Stage::Toolchain, message)],
        }
    }

    pub fn is_success(&self) -> bool {
        matches!(self, BuildResult::Success { .. })
    }

    pub fn diagnostics(&self) -> &[Diagnostic] {
        match self {
            BuildResult::Success { warnings, .. } => warnings,
            BuildResult::Failure { diagnostics } => diagnostics,
        }
    }
}

/// Shared flag for aborting a batch or an in-flight build
#[derive(Debug, Clone, Default)]
pub struct CancelToken {
    cancelled: Arc<AtomicBool>,
}

impl CancelToken {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.cancelled.store(true, Ordering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::SeqCst)
    }

    /// Cancel once `signal` resolves successfully, e.g. on
    /// `tokio::signal::ctrl_c()`. The signal is awaited on its own thread.
    pub fn cancel_on<F>(&self, signal: F) -> Result<(), BuildError>
    where
        F: Future<Output = std::io::Result<()>> + Send + 'static,
    {
        let runtime = tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()
            .map_err(|e| BuildError::io("failed to start the signal listener", e))?;
        let token = self.clone();
        std::thread::spawn(move || {
            runtime.block_on(async {
                match signal.await {
                    Ok(()) => {
                        info!("interrupted, cancelling the build");
                        token.cancel();
                    }
                    Err(e) => debug!("signal listener stopped: {}", e),
                }
            })
        });
        Ok(())
    }
}

/// The native build step
pub trait Toolchain {
    /// Build one unit. Blocks until the compiler exits, times out or is
    /// cancelled; every outcome is a `BuildResult`.
    fn compile(&self, request: &BuildRequest, cancel: &CancelToken) -> BuildResult;
}

/// Errors raised while driving the native compiler
#[derive(Debug, Error)]
pub enum BuildError {
    #[error("C# compiler not found: {0}")]
    CompilerNotFound(String),

    #[error("{context}: {source}")]
    Io {
        context: String,
        #[source]
        source: std::io::Error,
    },

    #[error("toolchain timeout: csc did not finish within {limit:?}")]
    Timeout { limit: Duration },

    #[error("build cancelled")]
    Cancelled,

    #[error("invalid diagnostic pattern: {0}")]
    Pattern(#[from] regex::Error),
}

impl BuildError {
    fn io(context: impl Into<String>, source: std::io::Error) -> Self {
        BuildError::Io { context: context.into(), source }
    }

    pub fn to_diagnostic(&self) -> Diagnostic {
        Diagnostic::unpositioned(Stage::Toolchain, self.to_string())
    }
}

/// Build configuration
#[derive(Debug, Clone)]
pub struct BuildConfig {
    /// Explicit compiler path; searched for when unset
    pub csc_path: Option<PathBuf>,
    /// References passed in addition to the forms assemblies
    pub extra_references: Vec<String>,
    /// Upper bound on one compiler run
    pub timeout: Option<Duration>,
    /// How often a running build checks for cancellation
    pub poll_interval: Duration,
}

impl Default for BuildConfig {
    fn default() -> Self {
        Self {
            csc_path: None,
            extra_references: Vec::new(),
            timeout: Some(Duration::from_secs(120)),
            poll_interval: Duration::from_millis(50),
        }
    }
}

/// Builder for BuildConfig
#[derive(Debug, Default)]
pub struct BuildConfigBuilder {
    config: BuildConfig,
}

impl BuildConfigBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn csc_path<P: Into<PathBuf>>(mut self, path: P) -> Self {
        self.config.csc_path = Some(path.into());
        self
    }

    /// Add references; entries may themselves be `;` or `,` separated
    pub fn reference(mut self, reference: &str) -> Self {
        self.config.extra_references.extend(
            reference
                .split([';', ','])
                .map(str::trim)
                .filter(|r| !r.is_empty())
                .map(str::to_string),
        );
        self
    }

    pub fn timeout(mut self, timeout: Option<Duration>) -> Self {
        self.config.timeout = timeout;
        self
    }

    pub fn poll_interval(mut self, interval: Duration) -> Self {
        self.config.poll_interval = interval;
        self
    }

    pub fn build(self) -> BuildConfig {
        self.config
    }
}

/// .NET Framework install locations checked when `csc` is not on PATH
const FRAMEWORK_CSC: &[&str] = &[
    r"C:\Windows\Microsoft.NET\Framework64\v4.0.30319\csc.exe",
    r"C:\Windows\Microsoft.NET\Framework\v4.0.30319\csc.exe",
];

const FORMS_REFERENCES: &[&str] = &["System.Windows.Forms.dll", "System.Drawing.dll"];

/// Toolchain adapter for the .NET Framework C# compiler
#[derive(Debug, Clone, Default)]
pub struct CscToolchain {
    config: BuildConfig,
}

impl CscToolchain {
    pub fn new(config: BuildConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &BuildConfig {
        &self.config
    }

    /// Configured path, then PATH, then the framework directories
    pub fn find_csc(&self) -> Result<PathBuf, BuildError> {
        if let Some(path) = &self.config.csc_path {
            return if path.exists() {
                Ok(path.clone())
            } else {
                Err(BuildError::CompilerNotFound(format!("{} does not exist", path.display())))
            };
        }

        if let Ok(path) = which::which("csc") {
            return Ok(path);
        }

        FRAMEWORK_CSC
            .iter()
            .map(PathBuf::from)
            .find(|path| path.exists())
            .ok_or_else(|| {
                BuildError::CompilerNotFound(
                    "install the .NET Framework 4 or pass --csc <path>".to_string(),
                )
            })
    }

    /// Command-line arguments for compiling `source_path`
    pub fn arguments(&self, request: &BuildRequest, source_path: &Path) -> Vec<String> {
        let mut args = vec![
            "/nologo".to_string(),
            format!("/target:{}", request.output_kind.target_flag(request.uses_forms)),
            format!("/out:{}", request.artifact_path.display()),
        ];

        let mut references: Vec<&str> = Vec::new();
        if request.uses_forms {
            references.extend(FORMS_REFERENCES);
        }
        references.extend(self.config.extra_references.iter().map(String::as_str));
        if !references.is_empty() {
            args.push(format!("/reference:{}", references.join(";")));
        }

        if let Some(icon) = &request.win32_icon {
            args.push(format!("/win32icon:{}", icon.display()));
        }
        for resource in &request.resources {
            args.push(format!("/resource:{},{}", resource.path.display(), resource.name));
        }

        args.push(source_path.display().to_string());
        args
    }

    fn run(&self, request: &BuildRequest, cancel: &CancelToken) -> Result<BuildResult, BuildError> {
        if cancel.is_cancelled() {
            return Err(BuildError::Cancelled);
        }
        let csc = self.find_csc()?;

        let work_dir = tempfile::tempdir().map_err(|e| BuildError::io("failed to create build directory", e))?;
        let source_path = work_dir.path().join(format!("{}.cs", request.unit_name));
        fs::write(&source_path, &request.generated_text)
            .map_err(|e| BuildError::io(format!("failed to write {}", source_path.display()), e))?;
        if let Some(parent) = request.artifact_path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)
                .map_err(|e| BuildError::io(format!("failed to create {}", parent.display()), e))?;
        }

        let args = self.arguments(request, &source_path);
        debug!("Executing: {} {}", csc.display(), args.join(" "));

        let runtime = tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()
            .map_err(|e| BuildError::io("failed to start process runtime", e))?;
        let output = runtime.block_on(self.execute_command(&csc, &args, cancel))?;

        let text = format!(
            "{}{}",
            String::from_utf8_lossy(&output.stdout),
            String::from_utf8_lossy(&output.stderr)
        );
        let diagnostics = parse_csc_output(&text, &request.source_map)?;

        if output.status.success() {
            info!("Built {}", request.artifact_path.display());
            let warnings = diagnostics.into_iter().filter(|d| d.severity == Severity::Warning).collect();
            return Ok(BuildResult::Success {
                artifact_path: request.artifact_path.clone(),
                warnings,
            });
        }

        let mut diagnostics = diagnostics;
        if !diagnostics.iter().any(Diagnostic::is_error) {
            let detail = text.trim();
            diagnostics.push(Diagnostic::unpositioned(
                Stage::Toolchain,
                if detail.is_empty() {
                    format!("csc exited with {}", output.status)
                } else {
                    format!("csc exited with {}: {}", output.status, detail)
                },
            ));
        }
        Ok(BuildResult::Failure { diagnostics })
    }

    /// Run the compiler, killing it on timeout or cancellation
    async fn execute_command(
        &self,
        csc: &Path,
        args: &[String],
        cancel: &CancelToken,
    ) -> Result<std::process::Output, BuildError> {
        let child = tokio::process::Command::new(csc)
            .args(args)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .spawn()
            .map_err(|e| BuildError::io(format!("failed to execute {}", csc.display()), e))?;

        let poll_interval = self.config.poll_interval;
        let cancelled = async move {
            while !cancel.is_cancelled() {
                tokio::time::sleep(poll_interval).await;
            }
        };

        // Dropping the child future kills the process
        let run = async {
            tokio::select! {
                output = child.wait_with_output() => {
                    output.map_err(|e| BuildError::io("failed to collect csc output", e))
                }
                _ = cancelled => Err(BuildError::Cancelled),
            }
        };

        match self.config.timeout {
            Some(limit) => tokio::time::timeout(limit, run)
                .await
                .map_err(|_| BuildError::Timeout { limit })?,
            None => run.await,
        }
    }
}

impl Toolchain for CscToolchain {
    fn compile(&self, request: &BuildRequest, cancel: &CancelToken) -> BuildResult {
        match self.run(request, cancel) {
            Ok(result) => result,
            Err(error) => BuildResult::Failure {
                diagnostics: vec![error.to_diagnostic()],
            },
        }
    }
}

fn diagnostic_pattern() -> Result<&'static Regex, BuildError> {
    static PATTERN: OnceLock<Result<Regex, regex::Error>> = OnceLock::new();
    PATTERN
        .get_or_init(|| {
            Regex::new(r"(?m)^(?:.*?\((\d+),(\d+)\): )?(error|warning) (CS\d+): (.*?)\r?$")
        })
        .as_ref()
        .map_err(|e| BuildError::Pattern(e.clone()))
}

/// Parse csc output into diagnostics, mapping generated lines back to
/// source lines. Positions without a source counterpart become unpositioned.
pub fn parse_csc_output(output: &str, source_map: &SourceMap) -> Result<Vec<Diagnostic>, BuildError> {
    let pattern = diagnostic_pattern()?;
    let diagnostics = pattern
        .captures_iter(output)
        .map(|caps| {
            let source_line = caps
                .get(1)
                .and_then(|m| m.as_str().parse::<usize>().ok())
                .and_then(|generated| source_map.source_line(generated))
                .unwrap_or(0);
            let severity = if &caps[3] == "warning" { Severity::Warning } else { Severity::Error };
            Diagnostic {
                severity,
                message: format!("{}: {}", &caps[4], &caps[5]),
                line: source_line,
                column: if source_line == 0 { 0 } else { 1 },
                stage: Stage::Toolchain,
            }
        })
        .collect();
    Ok(diagnostics)
}
