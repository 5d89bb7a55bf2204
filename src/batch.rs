//! Compile many descriptions at once.
//!
//! Each description is compiled on its own; nothing is shared between
//! them until the resulting components reach the composer. A failing file
//! produces a report with diagnostics and no component, and never stops
//! the others.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use log::{debug, info};
#[cfg(feature = "parallel")]
use rayon::prelude::*;
use serde::Serialize;

use crate::component::{compile_str, Component};
use crate::dsl;
use crate::error::{CompileError, Diagnostic, Severity};

/// Options for batch compilation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompileOptions {
    /// Treat warnings as errors.
    pub strict: bool,
    /// Compile files on the rayon pool (needs the `parallel` feature).
    pub parallel: bool,
}

impl Default for CompileOptions {
    fn default() -> Self {
        Self {
            strict: false,
            parallel: true,
        }
    }
}

impl CompileOptions {
    /// Create options with default values.
    pub fn new() -> Self {
        Self::default()
    }

    /// Reject components that raise warnings.
    pub fn with_strict(mut self, strict: bool) -> Self {
        self.strict = strict;
        self
    }

    /// Enable or disable parallel compilation.
    pub fn with_parallel(mut self, parallel: bool) -> Self {
        self.parallel = parallel;
        self
    }
}

/// Outcome of compiling one description.
#[derive(Debug, Clone, Serialize)]
pub struct FileReport {
    /// File path or caller-chosen source name
    pub source: String,
    #[serde(skip)]
    pub component: Option<Arc<Component>>,
    pub diagnostics: Vec<Diagnostic>,
}

impl FileReport {
    fn failed(source: String, error: &CompileError) -> Self {
        let diagnostic = Diagnostic::from_error(error).in_file(source.clone());
        Self {
            source,
            component: None,
            diagnostics: vec![diagnostic],
        }
    }

    /// A component was produced and no diagnostic is an error.
    pub fn is_ok(&self) -> bool {
        self.component.is_some() && !self.diagnostics.iter().any(Diagnostic::is_error)
    }
}

/// Compile description text under a source name.
pub fn compile_source(source: &str, text: &str, options: &CompileOptions) -> FileReport {
    let compilation = match compile_str(text) {
        Ok(c) => c,
        Err(e) => {
            debug!("{source}: {e}");
            return FileReport::failed(source.to_string(), &e);
        }
    };

    let mut diagnostics: Vec<Diagnostic> = compilation
        .warnings
        .iter()
        .cloned()
        .map(|d| d.in_file(source))
        .collect();

    let component = if options.strict {
        match compilation.strict() {
            Ok(component) => Some(component),
            Err(e) => {
                for d in &mut diagnostics {
                    d.severity = Severity::Error;
                }
                diagnostics.push(Diagnostic::from_error(&e).in_file(source));
                None
            }
        }
    } else {
        Some(compilation.component)
    };

    FileReport {
        source: source.to_string(),
        component: component.map(Arc::new),
        diagnostics,
    }
}

/// Read and compile one description file.
pub fn compile_file(path: &Path, options: &CompileOptions) -> FileReport {
    let source = path.display().to_string();
    match dsl::read_file(path) {
        Ok(text) => compile_source(&source, &text, options),
        Err(e) => FileReport::failed(source, &e),
    }
}

/// Compile every file; reports come back in input order.
pub fn compile_files(paths: &[PathBuf], options: &CompileOptions) -> Vec<FileReport> {
    let reports: Vec<FileReport> = if options.parallel {
        compile_parallel(paths, options)
    } else {
        compile_sequential(paths, options)
    };
    let failed = reports.iter().filter(|r| !r.is_ok()).count();
    info!("compiled {} description(s), {failed} failed", reports.len());
    reports
}

#[cfg(feature = "parallel")]
fn compile_parallel(paths: &[PathBuf], options: &CompileOptions) -> Vec<FileReport> {
    paths.par_iter().map(|p| compile_file(p, options)).collect()
}

#[cfg(not(feature = "parallel"))]
fn compile_parallel(paths: &[PathBuf], options: &CompileOptions) -> Vec<FileReport> {
    compile_sequential(paths, options)
}

fn compile_sequential(paths: &[PathBuf], options: &CompileOptions) -> Vec<FileReport> {
    paths.iter().map(|p| compile_file(p, options)).collect()
}
