//! Shared helpers for integration tests

#![allow(dead_code)]

use nova::codegen::build::{parse_csc_output, BuildRequest, BuildResult, CancelToken, Toolchain};
use std::cell::RefCell;

/// Toolchain stand-in. Records every request and echoes back a fixed
/// outcome: success, or a failure built from scripted csc output.
#[derive(Default)]
pub struct StubToolchain {
    pub requests: RefCell<Vec<BuildRequest>>,
    /// csc output to report; `None` means the build succeeds
    pub csc_output: Option<String>,
}

impl StubToolchain {
    pub fn succeeding() -> Self {
        Self::default()
    }

    pub fn failing_with(csc_output: &str) -> Self {
        Self {
            requests: RefCell::new(Vec::new()),
            csc_output: Some(csc_output.to_string()),
        }
    }

    pub fn request_count(&self) -> usize {
        self.requests.borrow().len()
    }
}

impl Toolchain for StubToolchain {
    fn compile(&self, request: &BuildRequest, _cancel: &CancelToken) -> BuildResult {
        self.requests.borrow_mut().push(request.clone());
        match &self.csc_output {
            None => BuildResult::Success {
                artifact_path: request.artifact_path.clone(),
                warnings: Vec::new(),
            },
            Some(output) => match parse_csc_output(output, &request.source_map) {
                Ok(diagnostics) => BuildResult::Failure { diagnostics },
                Err(error) => BuildResult::failure(error.to_string()),
            },
        }
    }
}

/// Write `files` (name, contents) into a fresh temporary directory
pub fn write_sources(files: &[(&str, &str)]) -> tempfile::TempDir {
    let dir = tempfile::tempdir().expect("temp dir");
    for (name, contents) in files {
        std::fs::write(dir.path().join(name), contents).expect("write source");
    }
    dir
}
