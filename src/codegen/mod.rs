//! Code generation
//!
//! This module provides functionality for generating typed declarations
//! from introspected table metadata, formatting them and writing them out.

use std::path::{Path, PathBuf};

use crate::prelude::{SqlgenError, Table};

pub mod format;
pub mod go;
pub mod output;
pub mod types;

pub use format::{FormatError, Gofmt, SourceFormatter};
pub use go::GoGenerator;
pub use output::{DeclarationWriter, OverwritePrompt, TerminalPrompt, WriteOutcome};
pub use types::{map_type, FieldKind, FieldType};

/// Package name used when the output directory has no usable base name
pub const FALLBACK_PACKAGE: &str = "models";

/// Configuration for code generation
#[derive(Debug, Clone)]
pub struct CodeGenConfig {
    /// Output directory
    pub output_dir: PathBuf,
    /// Package (namespace) declared by every generated file
    pub package: String,
    /// Overwrite existing files without asking
    pub force: bool,
    /// Emit column comments above their fields
    pub with_comments: bool,
}

impl CodeGenConfig {
    pub fn new(output_dir: PathBuf) -> Self {
        let package = default_package_name(&output_dir);
        Self {
            output_dir,
            package,
            force: false,
            with_comments: false,
        }
    }

    pub fn with_package(mut self, package: impl Into<String>) -> Self {
        self.package = package.into();
        self
    }

    pub fn with_force(mut self, force: bool) -> Self {
        self.force = force;
        self
    }

    pub fn with_comments(mut self, with_comments: bool) -> Self {
        self.with_comments = with_comments;
        self
    }
}

/// Package name derived from the output directory's base name
pub fn default_package_name(output_dir: &Path) -> String {
    output_dir
        .file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .filter(|name| !name.is_empty())
        .unwrap_or_else(|| FALLBACK_PACKAGE.to_string())
}

/// Trait for language-specific code generators
pub trait CodeGenerator {
    /// Extension of generated files, without the dot
    fn file_extension(&self) -> &'static str;

    /// Check the configuration once, before any table is rendered
    fn validate_config(&self, config: &CodeGenConfig) -> Result<(), SqlgenError>;

    /// Render the declaration for one table, unformatted
    fn render_table(&self, table: &Table, config: &CodeGenConfig) -> Result<String, SqlgenError>;
}
