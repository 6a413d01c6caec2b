use std::path::PathBuf;

use thiserror::Error;

/// sqlgen errors
#[derive(Error, Debug)]
pub enum SqlgenError {
    #[error("Failed to connect to database: {0}")]
    Connection(String),

    #[error("Failed to introspect schema '{schema}': {message}")]
    Introspection { schema: String, message: String },

    #[error("Code generation failed for table '{table}': {message}")]
    CodeGen { table: String, message: String },

    /// The formatter rejected the generated text. `source_text` is the raw,
    /// unformatted output so the offending line can be located.
    #[error("Failed to format generated code for table '{table}': {message}\ngenerated code:\n{source_text}")]
    Format {
        table: String,
        message: String,
        source_text: String,
    },

    #[error("Failed to create output directory {}: {source}", path.display())]
    OutputDir {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to write output for table '{table}' to {}: {source}", path.display())]
    Output {
        table: String,
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Configuration error: {0}")]
    Config(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_error_includes_source_text() {
        let err = SqlgenError::Format {
            table: "users".to_string(),
            message: "expected '}'".to_string(),
            source_text: "package models\n\ntype Users struct {\n".to_string(),
        };

        let message = err.to_string();
        assert!(message.contains("users"));
        assert!(message.contains("expected '}'"));
        assert!(message.contains("type Users struct {"));
    }

    #[test]
    fn test_output_error_keeps_io_source() {
        use std::error::Error as _;

        let err = SqlgenError::Output {
            table: "orders".to_string(),
            path: PathBuf::from("models/orders.go"),
            source: std::io::Error::new(std::io::ErrorKind::PermissionDenied, "denied"),
        };

        assert!(err.to_string().contains("models/orders.go"));
        assert!(err.source().is_some());
    }
}
