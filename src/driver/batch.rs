//! Batch compilation
//!
//! Units run one at a time in the order given. Each unit gets its own
//! pipeline state, so a failing unit never affects its neighbours.

use super::{unit_name, Compiler, UnitReport};
use crate::codegen::build::{BuildResult, CancelToken, OutputKind, Toolchain};
use log::info;
use serde::Serialize;
use std::io;
use std::path::{Path, PathBuf};

/// Extension of Nova source files
pub const SOURCE_EXTENSION: &str = "nova";

/// One entry of a batch
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BatchUnit {
    pub path: PathBuf,
    pub output_kind: OutputKind,
}

impl BatchUnit {
    pub fn new(path: impl Into<PathBuf>, output_kind: OutputKind) -> Self {
        Self { path: path.into(), output_kind }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BatchReport {
    pub units: Vec<UnitReport>,
    pub succeeded: usize,
    pub failed: usize,
}

impl BatchReport {
    pub fn all_succeeded(&self) -> bool {
        self.failed == 0
    }
}

impl<T: Toolchain> Compiler<T> {
    /// Compile every unit in order. Once `cancel` is set, units that have
    /// not started report a failure without being read.
    pub fn compile_batch(&self, units: &[BatchUnit], cancel: &CancelToken) -> BatchReport {
        let mut reports = Vec::with_capacity(units.len());
        for unit in units {
            let report = if cancel.is_cancelled() {
                UnitReport {
                    unit: unit_name(&unit.path),
                    source_path: unit.path.clone(),
                    result: BuildResult::failure("cancelled before start"),
                }
            } else {
                self.compile_unit(&unit.path, unit.output_kind, cancel)
            };
            reports.push(report);
        }

        let succeeded = reports.iter().filter(|r| r.is_success()).count();
        let failed = reports.len() - succeeded;
        info!("Batch finished: {} succeeded, {} failed", succeeded, failed);
        BatchReport { units: reports, succeeded, failed }
    }
}

/// Expand inputs into source files: files are kept as given, directories
/// contribute their `.nova` files in name order
pub fn collect_sources(inputs: &[PathBuf]) -> io::Result<Vec<PathBuf>> {
    let mut sources = Vec::new();
    for input in inputs {
        if input.is_dir() {
            let mut found: Vec<PathBuf> = std::fs::read_dir(input)?
                .map(|entry| entry.map(|e| e.path()))
                .collect::<io::Result<Vec<_>>>()?
                .into_iter()
                .filter(|path| path.is_file() && has_source_extension(path))
                .collect();
            found.sort();
            sources.extend(found);
        } else {
            sources.push(input.clone());
        }
    }
    Ok(sources)
}

fn has_source_extension(path: &Path) -> bool {
    path.extension().map_or(false, |ext| ext.eq_ignore_ascii_case(SOURCE_EXTENSION))
}
