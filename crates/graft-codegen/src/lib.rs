//! Reconciler generation for graft components.
//!
//! This crate reads a package of component declarations, classifies each
//! component's fields into Props and State, and emits one Rust module that
//! implements mounting, updating and state changes against `graft_core`.
//!
//! # Pipeline
//!
//! - [`analyzer`] - load the package, type-check it, discover components
//! - [`imports`] - pick a `use` line and alias for every referenced module
//! - [`generators`] - render the template and format the output
//!
//! # Example
//!
//! ```ignore
//! use graft_codegen::{generate, GenerateOptions};
//!
//! let generated = generate("demos/counter-spec", &GenerateOptions::default())?;
//! generated.write_to(std::path::Path::new("demos/counter/src"))?;
//! ```

pub mod analyzer;
pub mod error;
pub mod generators;
pub mod imports;
pub mod model;

pub use analyzer::{Analysis, PackageAnalyzer};
pub use error::{CodegenError, Diagnostic, Diagnostics, ErrorClass, Result};
pub use generators::{CodeSynthesizer, TemplateEngine, HEADER};
pub use imports::{Import, ImportResolver, ImportSet};
pub use model::{Component, Field, FieldKind, ModulePath};

use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// Default artifact file name.
pub const OUTPUT_FILE: &str = "impl.gen.rs";

/// Default runtime crate the generated code calls into.
pub const RUNTIME_CRATE: &str = "graft_core";

/// Generation settings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GenerateOptions {
    /// File name of the artifact.
    pub output_file: String,
    /// Crate providing `Instance`, `Core`, `Registry` and friends.
    pub runtime_crate: String,
}

impl Default for GenerateOptions {
    fn default() -> Self {
        Self {
            output_file: OUTPUT_FILE.to_string(),
            runtime_crate: RUNTIME_CRATE.to_string(),
        }
    }
}

/// A rendered artifact, not yet written.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Generated {
    pub file_name: String,
    pub source: String,
    /// Names of the components that got a reconciler.
    pub components: Vec<String>,
}

impl Generated {
    /// Write the artifact into `dir`.
    ///
    /// The source goes to a temporary sibling first and is renamed into
    /// place, so a failed write never leaves a truncated artifact behind.
    pub fn write_to(&self, dir: &Path) -> Result<PathBuf> {
        let target = dir.join(&self.file_name);
        let temp = dir.join(format!(".{}.tmp", self.file_name));

        if let Err(source) = fs::write(&temp, &self.source) {
            let _ = fs::remove_file(&temp);
            return Err(CodegenError::Write { path: temp, source });
        }
        if let Err(source) = fs::rename(&temp, &target) {
            let _ = fs::remove_file(&temp);
            return Err(CodegenError::Write {
                path: target,
                source,
            });
        }

        info!(
            path = %target.display(),
            components = self.components.len(),
            "wrote generated reconcilers"
        );
        Ok(target)
    }
}

/// Analyze the package at `package` and render its reconcilers.
pub fn generate(package: impl AsRef<Path>, options: &GenerateOptions) -> Result<Generated> {
    let package = package.as_ref();
    let analysis = PackageAnalyzer::new(&options.runtime_crate).analyze(package)?;

    let mountable: Vec<&Component> = analysis.mountable().collect();
    debug!(
        discovered = analysis.components.len(),
        mountable = mountable.len(),
        "synthesizing reconcilers"
    );

    let imports = ImportResolver::new(&options.runtime_crate, analysis.root())
        .resolve(mountable.iter().copied());
    let source = CodeSynthesizer::new(&options.runtime_crate)?.synthesize(&mountable, &imports)?;

    Ok(Generated {
        file_name: options.output_file.clone(),
        source,
        components: mountable.iter().map(|c| c.name.clone()).collect(),
    })
}
