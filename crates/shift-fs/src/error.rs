//! Error types for shift-fs

use std::path::PathBuf;

/// Result type for shift-fs operations
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur in shift-fs operations
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("I/O error at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to render template {path}: {source}")]
    Template {
        path: PathBuf,
        #[source]
        source: Box<Error>,
    },

    #[error("Template references missing key '{key}'")]
    MissingTemplateKey { key: String },

    #[error("Unterminated template action at byte {offset}")]
    UnterminatedAction { offset: usize },

    #[error("Invalid template action '{action}'")]
    InvalidAction { action: String },

    #[error("Failed to serialize template data: {0}")]
    TemplateData(#[from] serde_json::Error),

    #[error("{failures} entries under {path} could not be synchronized")]
    Traversal { path: PathBuf, failures: usize },

    #[error("{path} is a different kind of entry than its source")]
    TypeConflict { path: PathBuf },

    #[error("Lock acquisition failed for {path}")]
    LockFailed { path: PathBuf },
}

impl Error {
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }

    pub fn template(path: impl Into<PathBuf>, source: Error) -> Self {
        Self::Template {
            path: path.into(),
            source: Box::new(source),
        }
    }
}
