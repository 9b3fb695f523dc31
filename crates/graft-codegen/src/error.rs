//! Error types for analysis and code generation.

use std::fmt;
use std::io;
use std::path::PathBuf;
use thiserror::Error;

/// Result type alias for codegen operations.
pub type Result<T> = std::result::Result<T, CodegenError>;

/// Which stage of the pipeline an error belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorClass {
    /// The package could not be located or read.
    Load,
    /// The package was read but is not statically valid.
    TypeCheck,
    /// Rendering or formatting the artifact failed.
    Synthesis,
    /// The artifact could not be written.
    Output,
}

/// One problem found while checking a package.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Diagnostic {
    /// File the problem was found in.
    pub file: PathBuf,
    /// Human readable description.
    pub message: String,
}

impl Diagnostic {
    pub fn new(file: impl Into<PathBuf>, message: impl Into<String>) -> Self {
        Self {
            file: file.into(),
            message: message.into(),
        }
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.file.display(), self.message)
    }
}

/// Every diagnostic reported by one analysis run.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Diagnostics(pub Vec<Diagnostic>);

impl Diagnostics {
    /// Whether any diagnostic mentions `needle`.
    pub fn mentions(&self, needle: &str) -> bool {
        self.0.iter().any(|d| d.message.contains(needle))
    }
}

impl fmt::Display for Diagnostics {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, diagnostic) in self.0.iter().enumerate() {
            if i > 0 {
                writeln!(f)?;
            }
            write!(f, "  {diagnostic}")?;
        }
        Ok(())
    }
}

/// Errors that can occur during analysis and code generation.
#[derive(Error, Debug)]
pub enum CodegenError {
    /// The package, its manifest or its library root does not exist.
    #[error("Cannot load package at {path}: {reason}")]
    Load { path: PathBuf, reason: String },

    /// A source file or the manifest could not be read.
    #[error("Cannot read {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// The manifest is not valid TOML or lacks a package name.
    #[error("Invalid manifest {path}: {source}")]
    Manifest {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },

    /// Semantic analysis reported static errors.
    #[error("Type checking failed:\n{0}")]
    TypeCheck(Diagnostics),

    /// Template rendering error.
    #[error("Template error: {0}")]
    TemplateError(#[from] handlebars::RenderError),

    /// Invalid template.
    #[error("Invalid template: {0}")]
    InvalidTemplate(#[from] handlebars::TemplateError),

    /// Rendered source did not parse as Rust.
    #[error("Code formatting error: {0}")]
    FormattingError(String),

    /// The artifact could not be written.
    #[error("Cannot write {path}: {source}")]
    Write {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

impl CodegenError {
    /// Pipeline stage this error belongs to.
    pub fn class(&self) -> ErrorClass {
        match self {
            Self::Load { .. } | Self::Read { .. } | Self::Manifest { .. } => ErrorClass::Load,
            Self::TypeCheck(_) => ErrorClass::TypeCheck,
            Self::TemplateError(_) | Self::InvalidTemplate(_) | Self::FormattingError(_) => {
                ErrorClass::Synthesis
            }
            Self::Write { .. } => ErrorClass::Output,
        }
    }

    /// Diagnostics carried by a type-check failure.
    pub fn diagnostics(&self) -> Option<&Diagnostics> {
        match self {
            Self::TypeCheck(diagnostics) => Some(diagnostics),
            _ => None,
        }
    }
}
