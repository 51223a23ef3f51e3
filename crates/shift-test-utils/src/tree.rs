//! [`TestTree`] builder for source and output directory scenarios.

use std::fs;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

/// A temporary directory tree with helpers for setup and assertion.
///
/// # Example
///
/// ```rust,no_run
/// use shift_test_utils::tree::TestTree;
///
/// let src = TestTree::new();
/// src.service("api", "FROM scratch\nEXPOSE 8080\n")
///     .file("api/main.go", "package main");
/// src.assert_file_exists("api/Dockerfile");
/// ```
pub struct TestTree {
    temp_dir: TempDir,
}

impl Default for TestTree {
    fn default() -> Self {
        Self::new()
    }
}

impl TestTree {
    /// Create an empty temporary directory.
    pub fn new() -> Self {
        Self {
            temp_dir: TempDir::new().unwrap(),
        }
    }

    /// Return the root path of the temporary directory.
    pub fn root(&self) -> &Path {
        self.temp_dir.path()
    }

    /// Absolute path of `rel` inside the tree.
    pub fn path(&self, rel: &str) -> PathBuf {
        self.root().join(rel)
    }

    /// Write `content` to `rel`, creating parent directories.
    pub fn file(&self, rel: &str, content: &str) -> &Self {
        let path = self.path(rel);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).unwrap();
        }
        fs::write(&path, content)
            .unwrap_or_else(|e| panic!("TestTree::file: failed to write {}: {e}", path.display()));
        self
    }

    /// Create the directory `rel` and its parents.
    pub fn dir(&self, rel: &str) -> &Self {
        fs::create_dir_all(self.path(rel)).unwrap();
        self
    }

    /// Create a service directory `rel` holding a Dockerfile.
    pub fn service(&self, rel: &str, dockerfile: &str) -> &Self {
        self.file(&format!("{rel}/Dockerfile"), dockerfile)
    }

    /// Read the file at `rel`.
    pub fn read(&self, rel: &str) -> String {
        let path = self.path(rel);
        fs::read_to_string(&path)
            .unwrap_or_else(|e| panic!("TestTree::read: failed to read {}: {e}", path.display()))
    }

    /// All entries below the root as sorted, `/`-separated relative paths.
    /// Directories carry a trailing `/`.
    pub fn entries(&self) -> Vec<String> {
        let mut out = Vec::new();
        collect(self.root(), self.root(), &mut out);
        out.sort();
        out
    }

    /// Assert that `rel` exists.
    pub fn assert_file_exists(&self, rel: &str) {
        assert!(self.path(rel).exists(), "Expected {rel} to exist");
    }

    /// Assert that `rel` does not exist.
    pub fn assert_missing(&self, rel: &str) {
        assert!(!self.path(rel).exists(), "Expected {rel} to be absent");
    }

    /// Assert that the file at `rel` contains `needle`.
    pub fn assert_file_contains(&self, rel: &str, needle: &str) {
        let content = self.read(rel);
        assert!(
            content.contains(needle),
            "Expected {rel} to contain {needle:?}, got:\n{content}"
        );
    }
}

fn collect(root: &Path, dir: &Path, out: &mut Vec<String>) {
    for entry in fs::read_dir(dir).unwrap() {
        let path = entry.unwrap().path();
        let rel: Vec<String> = path
            .strip_prefix(root)
            .unwrap()
            .components()
            .map(|c| c.as_os_str().to_string_lossy().into_owned())
            .collect();
        let rel = rel.join("/");
        if path.is_dir() {
            out.push(format!("{rel}/"));
            collect(root, &path, out);
        } else {
            out.push(rel);
        }
    }
}
