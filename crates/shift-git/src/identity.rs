//! Repository identity probing

use std::path::{Path, PathBuf};

use git2::{ErrorCode, Repository};

use crate::{Error, Result};

/// Identity of the repository enclosing a directory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RepoIdentity {
    /// Repository name: taken from the remote URL when one exists,
    /// otherwise from the working directory's name.
    pub name: String,
    /// Root of the working tree (or the git dir for bare repositories).
    pub root: PathBuf,
    /// URL of the remote the name came from.
    pub remote_url: Option<String>,
}

/// Find the repository enclosing `path`.
///
/// Returns `Ok(None)` when `path` is not inside a repository.
///
/// # Errors
///
/// Returns an error if a repository is found but cannot be read.
pub fn probe(path: &Path) -> Result<Option<RepoIdentity>> {
    let repo = match Repository::discover(path) {
        Ok(repo) => repo,
        Err(e) if e.code() == ErrorCode::NotFound => return Ok(None),
        Err(e) => return Err(e.into()),
    };

    let root = repo
        .workdir()
        .unwrap_or_else(|| repo.path())
        .to_path_buf();
    let remote_url = preferred_remote_url(&repo)?;

    let name = remote_url
        .as_deref()
        .and_then(repo_name_from_url)
        .or_else(|| {
            root.file_name()
                .map(|n| n.to_string_lossy().into_owned())
        })
        .ok_or_else(|| Error::UnnamedRepository { path: root.clone() })?;

    tracing::debug!(path = %path.display(), repo = %name, "Probed repository identity");

    Ok(Some(RepoIdentity {
        name,
        root,
        remote_url,
    }))
}

/// URL of `origin`, or of the first remote that has one.
fn preferred_remote_url(repo: &Repository) -> Result<Option<String>> {
    if let Ok(origin) = repo.find_remote("origin") {
        return Ok(origin.url().map(String::from));
    }
    let remotes = repo.remotes()?;
    for name in remotes.iter().flatten() {
        if let Ok(remote) = repo.find_remote(name)
            && let Some(url) = remote.url()
        {
            return Ok(Some(url.to_string()));
        }
    }
    Ok(None)
}

/// Extract a repository name from a remote URL.
///
/// Handles `https://host/org/repo.git`, `git@host:org/repo.git` and plain
/// local paths.
pub fn repo_name_from_url(url: &str) -> Option<String> {
    let trimmed = url.trim().trim_end_matches('/');
    let last = trimmed.rsplit(['/', ':', '\\']).next()?;
    let name = last.strip_suffix(".git").unwrap_or(last);
    if name.is_empty() {
        None
    } else {
        Some(name.to_string())
    }
}
