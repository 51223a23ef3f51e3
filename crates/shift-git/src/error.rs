//! Error types for shift-git

use std::path::PathBuf;

/// Result type for shift-git operations
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur in shift-git operations
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("Git error: {0}")]
    Git(#[from] git2::Error),

    #[error("Repository at {path} has neither a usable remote nor a directory name")]
    UnnamedRepository { path: PathBuf },
}
