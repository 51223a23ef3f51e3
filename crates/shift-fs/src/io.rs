//! Locked and metadata-preserving I/O primitives

use std::fs::{self, Metadata, OpenOptions};
use std::io::Write;
use std::path::Path;

use filetime::FileTime;
use fs2::FileExt;

use crate::{Error, Result};

/// Write content atomically to a file with locking.
///
/// Uses write-to-temp-then-rename so a concurrent reader never observes a
/// half-written file as already synchronized.
pub fn write_atomic(path: &Path, content: &[u8]) -> Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).map_err(|e| Error::io(parent, e))?;
    }

    let temp_name = format!(
        ".{}.{}.tmp",
        path.file_name()
            .map(|n| n.to_string_lossy())
            .unwrap_or_default(),
        std::process::id()
    );
    let temp_path = path.with_file_name(&temp_name);

    let mut temp_file = OpenOptions::new()
        .write(true)
        .create(true)
        .truncate(true)
        .open(&temp_path)
        .map_err(|e| Error::io(&temp_path, e))?;

    temp_file
        .lock_exclusive()
        .map_err(|_| Error::LockFailed {
            path: path.to_path_buf(),
        })?;

    temp_file
        .write_all(content)
        .map_err(|e| Error::io(&temp_path, e))?;
    temp_file.sync_all().map_err(|e| Error::io(&temp_path, e))?;

    temp_file.unlock().map_err(|_| Error::LockFailed {
        path: path.to_path_buf(),
    })?;

    fs::rename(&temp_path, path).map_err(|e| Error::io(path, e))?;

    Ok(())
}

/// Append a single newline-terminated line, holding an exclusive lock for
/// the duration of the write.
pub fn append_line(path: &Path, line: &str) -> Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).map_err(|e| Error::io(parent, e))?;
    }
    let mut file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)
        .map_err(|e| Error::io(path, e))?;
    file.lock_exclusive().map_err(|_| Error::LockFailed {
        path: path.to_path_buf(),
    })?;
    writeln!(file, "{line}").map_err(|e| Error::io(path, e))?;
    file.unlock().map_err(|_| Error::LockFailed {
        path: path.to_path_buf(),
    })?;
    Ok(())
}

/// Copy a regular file, then mirror the source's permission bits and
/// modification time onto the copy.
///
/// Missing parent directories are created. An existing destination file or
/// symlink is replaced rather than written through, so read-only targets do
/// not block the copy and links never redirect the write.
pub fn copy_file(src: &Path, dst: &Path) -> Result<()> {
    let meta = fs::metadata(src).map_err(|e| Error::io(src, e))?;
    if let Some(parent) = dst.parent() {
        fs::create_dir_all(parent).map_err(|e| Error::io(parent, e))?;
    }
    if fs::symlink_metadata(dst).is_ok_and(|m| !m.is_dir()) {
        fs::remove_file(dst).map_err(|e| Error::io(dst, e))?;
    }
    fs::copy(src, dst).map_err(|e| Error::io(dst, e))?;
    fs::set_permissions(dst, meta.permissions()).map_err(|e| Error::io(dst, e))?;
    preserve_mtime(dst, &meta)
}

/// Stamp `dst` with the modification time recorded in `meta`.
pub fn preserve_mtime(dst: &Path, meta: &Metadata) -> Result<()> {
    let mtime = FileTime::from_last_modification_time(meta);
    filetime::set_file_mtime(dst, mtime).map_err(|e| Error::io(dst, e))
}

/// Create `dst` as a directory carrying `src`'s permission bits.
pub fn create_dir_like(src: &Path, dst: &Path) -> Result<()> {
    let meta = fs::metadata(src).map_err(|e| Error::io(src, e))?;
    fs::create_dir_all(dst).map_err(|e| Error::io(dst, e))?;
    fs::set_permissions(dst, meta.permissions()).map_err(|e| Error::io(dst, e))
}

/// Remove whatever lives at `path`, file or directory. Missing paths are
/// not an error.
pub fn remove_any(path: &Path) -> Result<()> {
    match fs::symlink_metadata(path) {
        Ok(meta) if meta.is_dir() => fs::remove_dir_all(path).map_err(|e| Error::io(path, e)),
        Ok(_) => fs::remove_file(path).map_err(|e| Error::io(path, e)),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
        Err(e) => Err(Error::io(path, e)),
    }
}

/// Recreate the symlink at `src` as `dst`, pointing at the same target.
pub fn copy_symlink(src: &Path, dst: &Path) -> Result<()> {
    let target = fs::read_link(src).map_err(|e| Error::io(src, e))?;
    if let Ok(existing) = fs::read_link(dst)
        && existing == target
    {
        return Ok(());
    }
    remove_any(dst)?;
    if let Some(parent) = dst.parent() {
        fs::create_dir_all(parent).map_err(|e| Error::io(parent, e))?;
    }
    symlink(&target, dst).map_err(|e| Error::io(dst, e))
}

#[cfg(unix)]
fn symlink(target: &Path, link: &Path) -> std::io::Result<()> {
    std::os::unix::fs::symlink(target, link)
}

#[cfg(windows)]
fn symlink(target: &Path, link: &Path) -> std::io::Result<()> {
    let resolved = link.parent().map(|p| p.join(target)).unwrap_or_default();
    if resolved.is_dir() {
        std::os::windows::fs::symlink_dir(target, link)
    } else {
        std::os::windows::fs::symlink_file(target, link)
    }
}
