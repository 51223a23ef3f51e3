//! Filesystem layer for kubeshift
//!
//! Provides the tree synchronization engine that every output-writing
//! component goes through, plus the template engine and the locked,
//! metadata-preserving I/O primitives it relies on.

pub mod error;
pub mod io;
pub mod path;
pub mod sync;
pub mod template;

pub use error::{Error, Result};
pub use sync::{generate_delta, merge, replicate, template_copy};
