//! Version-control helpers for kubeshift
//!
//! Service naming prefers repository identity over raw paths; this crate
//! answers "which repository does this directory belong to, and what is it
//! called", and turns arbitrary strings into metadata-safe names.

pub mod error;
pub mod identity;
pub mod naming;

pub use error::{Error, Result};
pub use identity::{RepoIdentity, probe, repo_name_from_url};
pub use naming::{MAX_NAME_LEN, to_metadata_name};
