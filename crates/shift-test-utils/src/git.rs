//! Git repository fixtures.
//!
//! Repository identity only depends on the repository layout and its
//! remotes, so none of these fixtures create commits.

use std::path::Path;

/// Initialises a real git repository using `git2` (no commits, no remotes).
///
/// The repository name falls back to the directory name of `path`.
///
/// # Panics
/// Panics if `git2::Repository::init` fails.
pub fn real_git_repo(path: &Path) -> git2::Repository {
    git2::Repository::init(path).unwrap_or_else(|e| {
        panic!(
            "real_git_repo: failed to init repository at {}: {e}",
            path.display()
        )
    })
}

/// Initialises a real git repository with one remote per `(name, url)`.
///
/// # Panics
/// Panics if initialisation or adding a remote fails.
pub fn real_git_repo_with_remotes(path: &Path, remotes: &[(&str, &str)]) -> git2::Repository {
    let repo = real_git_repo(path);
    for (name, url) in remotes {
        repo.remote(name, url).unwrap_or_else(|e| {
            panic!("real_git_repo_with_remotes: failed to add remote {name} ({url}): {e}")
        });
    }
    repo
}

/// Shorthand for a repository whose `origin` points at `url`.
pub fn real_git_repo_with_origin(path: &Path, url: &str) -> git2::Repository {
    real_git_repo_with_remotes(path, &[("origin", url)])
}
