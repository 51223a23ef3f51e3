//! Recursive directory-diff walker
//!
//! The walker compares a source entry with the destination entry of the
//! same relative path and hands each situation to a [`SyncStrategy`]:
//!
//! - source file: [`SyncStrategy::on_file`]
//! - source directory, destination missing: [`SyncStrategy::on_addition`]
//! - destination entry without a source counterpart: [`SyncStrategy::on_deletion`]
//! - file on one side, directory on the other, or a destination symlink
//!   where the source is not one: [`SyncStrategy::on_mismatch`]
//! - source symlink: [`SyncStrategy::on_symlink`] (never traversed)
//!
//! A failure on a child entry is logged and counted; siblings are still
//! processed. Only the root's own stat is fatal.

use std::collections::BTreeSet;
use std::ffi::OsString;
use std::fs::{self, Metadata};
use std::path::Path;

use crate::{Error, Result, io};

/// What the walker does with a directory after a strategy callback.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Visit {
    /// Continue into the entry's children.
    Descend,
    /// The strategy handled the whole subtree.
    Prune,
}

/// Per-entry callbacks driven by [`sync_tree`].
pub trait SyncStrategy {
    /// `src` is a regular file. `dst` may not exist yet.
    fn on_file(&mut self, src: &Path, dst: &Path) -> Result<()>;

    /// `src` is a directory and nothing exists at `dst`.
    fn on_addition(&mut self, src: &Path, dst: &Path) -> Result<Visit>;

    /// `dst` exists but `src` does not. `src` is synthetic: it names where
    /// the entry would live in the source tree.
    fn on_deletion(&mut self, src: &Path, dst: &Path) -> Result<()>;

    /// `src` and `dst` both exist but one is a directory and the other is
    /// not, or `dst` is a symlink and `src` is not. Returning [`Visit::Descend`] lets the walker process `src` as
    /// usual afterwards.
    fn on_mismatch(&mut self, src: &Path, dst: &Path) -> Result<Visit>;

    /// `src` is a symbolic link. The default recreates it at `dst`.
    fn on_symlink(&mut self, src: &Path, dst: &Path) -> Result<()> {
        io::copy_symlink(src, dst)
    }
}

/// Synchronize `destination` with `source` using `strategy`.
///
/// # Errors
///
/// Returns the root's stat error directly, or [`Error::Traversal`] when one
/// or more entries below the root failed.
pub fn sync_tree(source: &Path, destination: &Path, strategy: &mut dyn SyncStrategy) -> Result<()> {
    let failures = walk(source, destination, strategy)?;
    if failures > 0 {
        return Err(Error::Traversal {
            path: source.to_path_buf(),
            failures,
        });
    }
    Ok(())
}

/// The coarse "already synchronized" test shared by every strategy: same
/// regular-file-ness, same size and same modification time. Content is not
/// compared.
pub fn is_synchronized(src: &Metadata, dst: &Metadata) -> bool {
    src.is_file() == dst.is_file()
        && src.len() == dst.len()
        && src.modified().ok() == dst.modified().ok()
}

/// Path-based form of [`is_synchronized`]. A missing side is never
/// synchronized. Links are not followed, so a symlink never matches a
/// regular file.
pub fn already_synchronized(src: &Path, dst: &Path) -> bool {
    match (fs::symlink_metadata(src), fs::symlink_metadata(dst)) {
        (Ok(s), Ok(d)) => is_synchronized(&s, &d),
        _ => false,
    }
}

fn walk(src: &Path, dst: &Path, strategy: &mut dyn SyncStrategy) -> Result<usize> {
    let meta = fs::symlink_metadata(src).map_err(|e| Error::io(src, e))?;
    let dst_meta = fs::symlink_metadata(dst).ok();

    if meta.file_type().is_symlink() {
        strategy.on_symlink(src, dst)?;
        return Ok(0);
    }

    if !meta.is_dir() {
        if dst_meta.as_ref().is_some_and(|d| d.is_dir() || d.file_type().is_symlink())
            && strategy.on_mismatch(src, dst)? == Visit::Prune
        {
            return Ok(0);
        }
        strategy.on_file(src, dst)?;
        return Ok(0);
    }

    let visit = match &dst_meta {
        None => strategy.on_addition(src, dst)?,
        Some(d) if !d.is_dir() => strategy.on_mismatch(src, dst)?,
        Some(_) => Visit::Descend,
    };
    if visit == Visit::Prune {
        return Ok(0);
    }

    let src_names = list_names(src)?;
    let mut failures = 0;

    if fs::symlink_metadata(dst).is_ok_and(|m| m.is_dir()) {
        match list_names(dst) {
            Ok(dst_names) => {
                for name in dst_names.difference(&src_names) {
                    let (s, d) = (src.join(name), dst.join(name));
                    if let Err(e) = strategy.on_deletion(&s, &d) {
                        tracing::error!(path = %d.display(), error = %e, "Failed to process destination-only entry");
                        failures += 1;
                    }
                }
            }
            Err(e) => {
                tracing::error!(path = %dst.display(), error = %e, "Failed to list destination directory");
                failures += 1;
            }
        }
    }

    for name in &src_names {
        let (s, d) = (src.join(name), dst.join(name));
        match walk(&s, &d, strategy) {
            Ok(n) => failures += n,
            Err(e) => {
                tracing::error!(path = %s.display(), error = %e, "Failed to synchronize entry");
                failures += 1;
            }
        }
    }

    Ok(failures)
}

fn list_names(dir: &Path) -> Result<BTreeSet<OsString>> {
    fs::read_dir(dir)
        .map_err(|e| Error::io(dir, e))?
        .map(|entry| entry.map(|e| e.file_name()).map_err(|e| Error::io(dir, e)))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;
    use tempfile::TempDir;

    #[derive(Default)]
    struct Recorder {
        events: Vec<(String, PathBuf)>,
    }

    impl Recorder {
        fn push(&mut self, kind: &str, path: &Path) {
            self.events.push((kind.to_string(), path.to_path_buf()));
        }
    }

    impl SyncStrategy for Recorder {
        fn on_file(&mut self, src: &Path, _dst: &Path) -> Result<()> {
            self.push("file", src);
            Ok(())
        }

        fn on_addition(&mut self, src: &Path, _dst: &Path) -> Result<Visit> {
            self.push("addition", src);
            Ok(Visit::Prune)
        }

        fn on_deletion(&mut self, _src: &Path, dst: &Path) -> Result<()> {
            self.push("deletion", dst);
            Ok(())
        }

        fn on_mismatch(&mut self, src: &Path, _dst: &Path) -> Result<Visit> {
            self.push("mismatch", src);
            Ok(Visit::Prune)
        }
    }

    #[test]
    fn classifies_every_entry_kind() {
        let src = TempDir::new().unwrap();
        let dst = TempDir::new().unwrap();
        fs::write(src.path().join("both.txt"), "a").unwrap();
        fs::write(dst.path().join("both.txt"), "b").unwrap();
        fs::create_dir(src.path().join("new_dir")).unwrap();
        fs::write(dst.path().join("stale.txt"), "x").unwrap();
        fs::create_dir(src.path().join("clash")).unwrap();
        fs::write(dst.path().join("clash"), "file").unwrap();

        let mut recorder = Recorder::default();
        sync_tree(src.path(), dst.path(), &mut recorder).unwrap();

        let kinds: Vec<_> = recorder.events.iter().map(|(k, _)| k.as_str()).collect();
        assert_eq!(kinds, vec!["deletion", "file", "mismatch", "addition"]);
        assert_eq!(recorder.events[0].1, dst.path().join("stale.txt"));
    }

    #[test]
    fn missing_root_is_fatal() {
        let dst = TempDir::new().unwrap();
        let mut recorder = Recorder::default();
        let err = sync_tree(Path::new("/definitely/not/here"), dst.path(), &mut recorder).unwrap_err();
        assert!(matches!(err, Error::Io { .. }));
    }

    struct FailingFiles;

    impl SyncStrategy for FailingFiles {
        fn on_file(&mut self, src: &Path, _dst: &Path) -> Result<()> {
            if src.ends_with("bad.txt") {
                return Err(Error::io(src, std::io::Error::other("boom")));
            }
            Ok(())
        }

        fn on_addition(&mut self, _src: &Path, _dst: &Path) -> Result<Visit> {
            Ok(Visit::Descend)
        }

        fn on_deletion(&mut self, _src: &Path, _dst: &Path) -> Result<()> {
            Ok(())
        }

        fn on_mismatch(&mut self, _src: &Path, _dst: &Path) -> Result<Visit> {
            Ok(Visit::Descend)
        }
    }

    #[test]
    fn child_failure_is_counted_not_fatal() {
        let src = TempDir::new().unwrap();
        let dst = TempDir::new().unwrap();
        fs::write(src.path().join("bad.txt"), "a").unwrap();
        fs::write(src.path().join("good.txt"), "a").unwrap();

        let err = sync_tree(src.path(), dst.path(), &mut FailingFiles).unwrap_err();
        assert!(matches!(err, Error::Traversal { failures: 1, .. }));
    }

    #[test]
    fn synchronized_requires_matching_size_and_mtime() {
        let dir = TempDir::new().unwrap();
        let a = dir.path().join("a");
        let b = dir.path().join("b");
        fs::write(&a, "same").unwrap();
        fs::write(&b, "same").unwrap();
        let mtime = filetime::FileTime::from_unix_time(1_000_000, 0);
        filetime::set_file_mtime(&a, mtime).unwrap();
        filetime::set_file_mtime(&b, mtime).unwrap();
        assert!(already_synchronized(&a, &b));

        fs::write(&b, "diff").unwrap();
        filetime::set_file_mtime(&b, mtime).unwrap();
        // Same size and mtime, different content: still "synchronized".
        assert!(already_synchronized(&a, &b));

        filetime::set_file_mtime(&b, filetime::FileTime::from_unix_time(2_000_000, 0)).unwrap();
        assert!(!already_synchronized(&a, &b));
        assert!(!already_synchronized(&a, &dir.path().join("missing")));
    }
}
