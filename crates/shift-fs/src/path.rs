//! Path helpers shared by the naming and resolution layers
//!
//! All comparisons are component-wise, so `/a/bc` is never treated as a
//! descendant of `/a/b`.

use std::path::{Path, PathBuf};

/// Longest common prefix of two paths.
pub fn common_prefix(a: &Path, b: &Path) -> PathBuf {
    a.components()
        .zip(b.components())
        .take_while(|(x, y)| x == y)
        .map(|(x, _)| x)
        .collect()
}

/// Longest common ancestor of a set of paths.
///
/// Returns `None` for an empty input. Relative inputs that share nothing
/// yield an empty path.
pub fn common_ancestor<I, P>(paths: I) -> Option<PathBuf>
where
    I: IntoIterator<Item = P>,
    P: AsRef<Path>,
{
    let mut iter = paths.into_iter();
    let first = iter.next()?.as_ref().to_path_buf();
    Some(iter.fold(first, |acc, p| common_prefix(&acc, p.as_ref())))
}

/// Check whether `path` is `ancestor` or lies underneath it.
pub fn is_descendant(path: &Path, ancestor: &Path) -> bool {
    path.starts_with(ancestor)
}

/// Resolve `path` against `root` unless it is already absolute.
pub fn resolve_under(root: &Path, path: &Path) -> PathBuf {
    if path.is_absolute() {
        path.to_path_buf()
    } else if path.as_os_str().is_empty() {
        root.to_path_buf()
    } else {
        root.join(path)
    }
}

/// The directory a path denotes: itself when it is a directory (or does not
/// exist), its parent when it is a file.
pub fn enclosing_directory(path: &Path) -> PathBuf {
    if path.is_file() {
        path.parent().map(Path::to_path_buf).unwrap_or_default()
    } else {
        path.to_path_buf()
    }
}

/// Render a root-relative path with forward slashes, as written to
/// delta manifests and logs.
pub fn to_slash(path: &Path) -> String {
    path.components()
        .map(|c| c.as_os_str().to_string_lossy().into_owned())
        .collect::<Vec<_>>()
        .join("/")
}
