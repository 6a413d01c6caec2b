//! Source formatting
//!
//! Generated text is passed through an external formatter before it is
//! written. The formatter doubles as a syntax check: text it cannot parse
//! is reported rather than written.

use std::io::{self, Write};
use std::path::PathBuf;
use std::process::{Command, Stdio};

use thiserror::Error;
use tracing::trace;

#[derive(Error, Debug)]
pub enum FormatError {
    #[error("formatter `{binary}` could not be started: {source}")]
    Unavailable {
        binary: String,
        #[source]
        source: io::Error,
    },

    /// The formatter ran and refused the input
    #[error("malformed generated source: {0}")]
    Rejected(String),

    #[error("formatter I/O failed: {0}")]
    Io(#[from] io::Error),
}

/// Trait for source formatters
pub trait SourceFormatter {
    fn format(&self, source: &str) -> Result<String, FormatError>;
}

/// Formats Go source with the `gofmt` binary
#[derive(Debug, Clone)]
pub struct Gofmt {
    binary: PathBuf,
}

impl Gofmt {
    pub const DEFAULT_BINARY: &'static str = "gofmt";

    pub fn new() -> Self {
        Self::with_binary(Self::DEFAULT_BINARY)
    }

    pub fn with_binary(binary: impl Into<PathBuf>) -> Self {
        Self {
            binary: binary.into(),
        }
    }
}

impl Default for Gofmt {
    fn default() -> Self {
        Self::new()
    }
}

impl SourceFormatter for Gofmt {
    fn format(&self, source: &str) -> Result<String, FormatError> {
        trace!(binary = ?self.binary, bytes = source.len(), "Running formatter");

        let mut child = Command::new(&self.binary)
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()
            .map_err(|source| FormatError::Unavailable {
                binary: self.binary.display().to_string(),
                source,
            })?;

        // gofmt reads all of stdin before writing anything, so writing the
        // whole input up front cannot deadlock on a full stdout pipe.
        if let Some(mut stdin) = child.stdin.take() {
            stdin.write_all(source.as_bytes())?;
        }

        let output = child.wait_with_output()?;
        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(FormatError::Rejected(stderr.trim().to_string()));
        }

        String::from_utf8(output.stdout)
            .map_err(|e| FormatError::Io(io::Error::new(io::ErrorKind::InvalidData, e)))
    }
}
