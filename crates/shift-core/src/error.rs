//! Error types for shift-core

use std::path::PathBuf;

use crate::artifact::ConfigDecodeError;

/// Result type for shift-core operations
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur in shift-core operations
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Configuration file not found at expected path
    #[error("Configuration not found at {path}")]
    ConfigNotFound { path: PathBuf },

    /// A config value did not decode into the shape a plugin expected
    #[error(transparent)]
    ConfigDecode(#[from] ConfigDecodeError),

    /// A plugin requires a config kind the artifact does not carry
    #[error("Artifact '{artifact}' is missing required config '{kind}'")]
    MissingConfig { kind: String, artifact: String },

    /// A typed config merge rejected its inputs
    #[error("Cannot merge config '{kind}': {message}")]
    ConfigMerge { kind: String, message: String },

    /// The source or output root cannot be used at all
    #[error("Cannot access root directory {path}: {source}")]
    RootUnavailable {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// A plugin reported a failure of its own
    #[error("Plugin '{plugin}' failed: {message}")]
    Plugin { plugin: String, message: String },

    /// Label selector expression could not be parsed
    #[error("Invalid label selector '{expr}': {message}")]
    Selector { expr: String, message: String },

    /// A relative mapping destination climbs out of the output root
    #[error("Destination {path} escapes the output root")]
    EscapesRoot { path: PathBuf },

    /// Source tree walk could not be set up
    #[error("Failed to walk source tree: {0}")]
    Walk(#[from] ignore::Error),

    /// Filesystem error from shift-fs
    #[error(transparent)]
    Fs(#[from] shift_fs::Error),

    /// Git error from shift-git
    #[error(transparent)]
    Git(#[from] shift_git::Error),

    /// Standard I/O error
    #[error(transparent)]
    Io(#[from] std::io::Error),

    /// JSON serialization/deserialization error
    #[error(transparent)]
    Json(#[from] serde_json::Error),

    /// TOML deserialization error
    #[error(transparent)]
    TomlDe(#[from] toml::de::Error),
}

impl Error {
    /// Whether this error must stop the whole pipeline rather than just the
    /// step that produced it.
    pub fn is_fatal(&self) -> bool {
        matches!(self, Self::MissingConfig { .. } | Self::RootUnavailable { .. })
    }
}
