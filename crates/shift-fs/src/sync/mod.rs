//! Tree synchronization engine and the operations built on it
//!
//! - **replicate**: full mirror, extra destination entries removed
//! - **merge**: additive union, nothing removed
//! - **generate_delta**: change-set written to a store directory
//! - **template_copy**: merge with every file rendered as a template

mod delta;
mod engine;
mod merge;
mod replicate;
mod template_copy;

pub use delta::{ADDITIONS_DIR, DELETIONS_FILE, GenerateDelta, MODIFICATIONS_DIR, generate_delta};
pub use engine::{SyncStrategy, Visit, already_synchronized, is_synchronized, sync_tree};
pub use merge::{Merge, merge};
pub use replicate::{Replicate, replicate};
pub use template_copy::{TemplateCopy, template_copy};
