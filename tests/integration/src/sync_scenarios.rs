//! Tree sync behaviour observed across whole directory trees.

use std::fs;

use filetime::{FileTime, set_file_mtime};
use pretty_assertions::assert_eq;
use serde_json::json;
use shift_fs::sync::{ADDITIONS_DIR, DELETIONS_FILE, MODIFICATIONS_DIR};
use shift_fs::{Error, generate_delta, merge, replicate, template_copy};
use shift_test_utils::tree::TestTree;

fn mtime(tree: &TestTree, rel: &str) -> FileTime {
    FileTime::from_last_modification_time(&fs::metadata(tree.path(rel)).unwrap())
}

#[test]
fn replicate_mirrors_and_preserves_times() {
    let src = TestTree::new();
    src.file("a.txt", "alpha").file("nested/b.txt", "beta");
    set_file_mtime(src.path("a.txt"), FileTime::from_unix_time(1_000_000, 0)).unwrap();

    let dst = TestTree::new();
    dst.file("stale.txt", "old").file("nested/c.txt", "gone").dir("empty");

    replicate(src.root(), dst.root()).unwrap();

    assert_eq!(dst.entries(), src.entries());
    assert_eq!(dst.read("nested/b.txt"), "beta");
    assert_eq!(mtime(&dst, "a.txt"), FileTime::from_unix_time(1_000_000, 0));
}

#[test]
fn second_merge_skips_synchronized_files() {
    let src = TestTree::new();
    src.file("config.txt", "original");
    let dst = TestTree::new();
    dst.file("local.txt", "mine");

    merge(src.root(), dst.root()).unwrap();
    assert_eq!(dst.read("config.txt"), "original");
    dst.assert_file_exists("local.txt");

    // Same size and mtime: the coarse check treats it as already in sync.
    fs::write(dst.path("config.txt"), "tampered").unwrap();
    set_file_mtime(dst.path("config.txt"), mtime(&src, "config.txt")).unwrap();

    merge(src.root(), dst.root()).unwrap();
    assert_eq!(dst.read("config.txt"), "tampered");

    // A different mtime is enough to bring the source back.
    set_file_mtime(dst.path("config.txt"), FileTime::from_unix_time(42, 0)).unwrap();
    merge(src.root(), dst.root()).unwrap();
    assert_eq!(dst.read("config.txt"), "original");
}

#[test]
fn merge_keeps_destination_entries_of_a_different_type() {
    let src = TestTree::new();
    src.file("config", "generated").file("app.txt", "app");
    let dst = TestTree::new();
    dst.file("config/user.yaml", "mine");

    let err = merge(src.root(), dst.root()).unwrap_err();

    assert!(matches!(err, Error::Traversal { failures: 1, .. }), "{err:?}");
    assert_eq!(dst.read("config/user.yaml"), "mine");
    assert_eq!(dst.read("app.txt"), "app");
}

#[test]
fn delta_replays_onto_old_tree() {
    let new = TestTree::new();
    new.file("same.txt", "same")
        .file("changed.txt", "version two")
        .file("added/deep.txt", "deep")
        .file("swapped", "now a file");
    let old = TestTree::new();
    old.file("same.txt", "same")
        .file("changed.txt", "v1")
        .file("removed.txt", "bye")
        .file("swapped/old.txt", "was a dir");
    set_file_mtime(old.path("same.txt"), mtime(&new, "same.txt")).unwrap();
    let store = TestTree::new();

    generate_delta(new.root(), old.root(), store.root()).unwrap();

    store.assert_file_exists(&format!("{ADDITIONS_DIR}/added/deep.txt"));
    assert_eq!(store.read(&format!("{MODIFICATIONS_DIR}/changed.txt")), "version two");
    store.assert_missing(&format!("{MODIFICATIONS_DIR}/same.txt"));

    // Applying the change set to the old tree reproduces the new one.
    for line in store.read(DELETIONS_FILE).lines() {
        shift_fs::io::remove_any(&old.path(line)).unwrap();
    }
    merge(&store.path(ADDITIONS_DIR), old.root()).unwrap();
    merge(&store.path(MODIFICATIONS_DIR), old.root()).unwrap();
    assert_eq!(old.entries(), new.entries());
    assert_eq!(old.read("changed.txt"), "version two");
    assert_eq!(old.read("swapped"), "now a file");
}

#[test]
fn template_copy_renders_tree() {
    let templates = TestTree::new();
    templates
        .file("svc.yaml", "name: {{ .Name }}\nport: {{ .Spec.Port }}\n")
        .file("notes/readme.txt", "plain text");
    let out = TestTree::new();

    template_copy(templates.root(), out.root(), &json!({"Name": "api", "Spec": {"Port": 80}})).unwrap();

    assert_eq!(out.read("svc.yaml"), "name: api\nport: 80\n");
    assert_eq!(out.read("notes/readme.txt"), "plain text");
}

#[test]
fn template_copy_rejects_missing_keys() {
    let templates = TestTree::new();
    templates.file("svc.yaml", "image: {{ .Image }}\n");
    let out = TestTree::new();

    let err = template_copy(templates.root(), out.root(), &json!({"Name": "api"})).unwrap_err();

    assert!(matches!(err, Error::Template { .. } | Error::Traversal { .. }), "{err:?}");
    out.assert_missing("svc.yaml");
}
