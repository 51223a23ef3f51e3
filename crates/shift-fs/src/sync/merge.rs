//! Additive union: copy what changed, never remove anything

use std::fs;
use std::path::Path;

use super::engine::{SyncStrategy, Visit, already_synchronized, sync_tree};
use crate::{Error, Result, io};

/// Strategy that layers source onto destination.
#[derive(Debug, Default)]
pub struct Merge;

impl SyncStrategy for Merge {
    fn on_file(&mut self, src: &Path, dst: &Path) -> Result<()> {
        if already_synchronized(src, dst) {
            return Ok(());
        }
        tracing::debug!(src = %src.display(), dst = %dst.display(), "Merging file");
        io::copy_file(src, dst)
    }

    fn on_addition(&mut self, src: &Path, dst: &Path) -> Result<Visit> {
        io::create_dir_like(src, dst)?;
        Ok(Visit::Descend)
    }

    fn on_deletion(&mut self, _src: &Path, _dst: &Path) -> Result<()> {
        Ok(())
    }

    fn on_mismatch(&mut self, src: &Path, dst: &Path) -> Result<Visit> {
        type_conflict(src, dst)
    }

    fn on_symlink(&mut self, src: &Path, dst: &Path) -> Result<()> {
        link_without_clobbering(src, dst)
    }
}

/// Refuse a type clash: the destination entry stays as it is and only this
/// entry is reported as failed.
pub(super) fn type_conflict(src: &Path, dst: &Path) -> Result<Visit> {
    tracing::warn!(src = %src.display(), dst = %dst.display(), "Source and destination entry types differ, leaving destination alone");
    Err(Error::TypeConflict {
        path: dst.to_path_buf(),
    })
}

/// Recreate a source link, but only over nothing or over another link.
pub(super) fn link_without_clobbering(src: &Path, dst: &Path) -> Result<()> {
    match fs::symlink_metadata(dst) {
        Ok(meta) if !meta.file_type().is_symlink() => type_conflict(src, dst).map(|_| ()),
        _ => io::copy_symlink(src, dst),
    }
}

/// Merge `source` onto `destination`, leaving destination-only entries alone.
///
/// An entry whose type differs between the two sides (file versus
/// directory, or a destination symlink) is never replaced. Below the root
/// it counts towards [`Error::Traversal`]; at the root it is returned as
/// [`Error::TypeConflict`].
pub fn merge(source: &Path, destination: &Path) -> Result<()> {
    sync_tree(source, destination, &mut Merge)
}
