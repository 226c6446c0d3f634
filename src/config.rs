//! Compiler configuration
//!
//! Settings come from a JSON file (`nova.json` by default) and are then
//! overridden by command-line flags. The same values feed the generator,
//! the analyzer and the csc adapter.

use crate::codegen::build::{BuildConfig, BuildConfigBuilder, OutputKind};
use crate::codegen::GeneratorOptions;
use crate::semantic::AnalyzerConfig;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;
use thiserror::Error;

/// Name of the configuration file picked up from the working directory
pub const DEFAULT_CONFIG_FILE: &str = "nova.json";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read {path}: {source}")]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("invalid configuration in {path}: {source}")]
    Parse {
        path: PathBuf,
        source: serde_json::Error,
    },

    #[error("`{value}` is not a valid {field}")]
    Invalid { field: &'static str, value: String },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct CompilerConfig {
    /// Static class holding the generated `Main`
    pub class_name: String,
    /// Namespace of the generated types; empty for none
    pub namespace: String,
    pub output_kind: OutputKind,
    /// Artifact directory; alongside each source file when unset
    pub output_dir: Option<PathBuf>,
    pub csc_path: Option<PathBuf>,
    pub extra_references: Vec<String>,
    /// Seconds one csc run may take; 0 disables the limit
    pub timeout_secs: u64,
    /// Write `<unit>.cs` next to the artifact
    pub keep_generated: bool,
    pub warn_unused: bool,
    /// Stop collecting resolver errors after this many
    pub max_errors: Option<usize>,
}

impl Default for CompilerConfig {
    fn default() -> Self {
        Self {
            class_name: "NovaProgram".to_string(),
            namespace: "Nova.Generated".to_string(),
            output_kind: OutputKind::Exe,
            output_dir: None,
            csc_path: None,
            extra_references: Vec::new(),
            timeout_secs: 120,
            keep_generated: false,
            warn_unused: true,
            max_errors: Some(100),
        }
    }
}

impl CompilerConfig {
    /// Read and validate a configuration file
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        let config: CompilerConfig = serde_json::from_str(&text).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })?;
        config.validate()?;
        Ok(config)
    }

    /// `explicit` if given, otherwise `nova.json` in `dir` when it exists,
    /// otherwise the defaults
    pub fn load(explicit: Option<&Path>, dir: &Path) -> Result<Self, ConfigError> {
        match explicit {
            Some(path) => Self::from_file(path),
            None => {
                let candidate = dir.join(DEFAULT_CONFIG_FILE);
                if candidate.is_file() {
                    Self::from_file(&candidate)
                } else {
                    Ok(Self::default())
                }
            }
        }
    }

    /// Names end up verbatim in the generated C#, so they must be
    /// identifiers (dotted for the namespace)
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !is_identifier(&self.class_name) {
            return Err(ConfigError::Invalid { field: "class name", value: self.class_name.clone() });
        }
        if !self.namespace.is_empty() && !self.namespace.split('.').all(is_identifier) {
            return Err(ConfigError::Invalid { field: "namespace", value: self.namespace.clone() });
        }
        Ok(())
    }

    pub fn generator_options(&self) -> GeneratorOptions {
        GeneratorOptions {
            class_name: self.class_name.clone(),
            namespace: (!self.namespace.is_empty()).then(|| self.namespace.clone()),
        }
    }

    pub fn analyzer_config(&self) -> AnalyzerConfig {
        AnalyzerConfig {
            warn_unused: self.warn_unused,
            max_errors: self.max_errors,
        }
    }

    pub fn build_config(&self) -> BuildConfig {
        let mut builder = BuildConfigBuilder::new()
            .timeout((self.timeout_secs > 0).then(|| Duration::from_secs(self.timeout_secs)));
        if let Some(csc) = &self.csc_path {
            builder = builder.csc_path(csc);
        }
        for reference in &self.extra_references {
            builder = builder.reference(reference);
        }
        builder.build()
    }
}

fn is_identifier(name: &str) -> bool {
    let mut chars = name.chars();
    matches!(chars.next(), Some(c) if c.is_ascii_alphabetic() || c == '_')
        && chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
}
