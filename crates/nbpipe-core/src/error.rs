//! Error types for nbpipe-core.

use std::path::PathBuf;

use thiserror::Error;

/// Result type for nbpipe-core operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur in nbpipe-core.
#[derive(Debug, Error)]
pub enum Error {
    /// Process configuration is invalid (e.g. an environment path that does not exist).
    #[error("{0}")]
    Config(String),

    /// The notebook lacks a cell with the required tag.
    #[error("No {kind} found. Please tag a cell of the notebook with the `{tag}` tag.")]
    MissingAnnotation {
        /// Human-readable description of what was looked for.
        kind: &'static str,
        /// The tag the user needs to add.
        tag: &'static str,
    },

    /// Tagged cell content does not match the expected statement shape.
    #[error(transparent)]
    Parse(#[from] ParseError),

    /// Failed to read or decode a notebook document.
    #[error("failed to read notebook {path}: {message}")]
    Notebook { path: PathBuf, message: String },

    /// Failed to load or store a marshalled variable.
    #[error("marshal error for {path}: {message}")]
    Marshal { path: PathBuf, message: String },

    /// The graph/compiler backend failed.
    #[error("pipeline compiler error: {0}")]
    Backend(String),

    /// The packaging toolchain failed.
    #[error("pipeline packaging failed: {0}")]
    Package(String),

    /// IO error.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON error.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl Error {
    /// Whether this error stems from notebook annotations (missing tag or
    /// malformed tagged cell) rather than a system fault.
    pub fn is_annotation_error(&self) -> bool {
        matches!(self, Self::MissingAnnotation { .. } | Self::Parse(_))
    }
}

/// Static-analysis failure with the position of the offending token.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("parse error at line {line}, column {column}: {message}")]
pub struct ParseError {
    /// 1-based line number.
    pub line: usize,
    /// 1-based column number.
    pub column: usize,
    /// What went wrong.
    pub message: String,
}

impl ParseError {
    pub(crate) fn new(line: usize, column: usize, message: impl Into<String>) -> Self {
        Self {
            line,
            column,
            message: message.into(),
        }
    }
}
