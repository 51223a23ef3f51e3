//! Whole-pipeline runs over realistic source layouts.

use std::fs;
use std::path::Path;

use filetime::FileTime;
use pretty_assertions::assert_eq;
use serde_json::json;
use shift_core::{PathMapping, Pipeline, PipelineConfig, PluginRegistry, resolve};
use shift_test_utils::git::real_git_repo_with_origin;
use shift_test_utils::tree::TestTree;

fn config(project: &str) -> PipelineConfig {
    let mut config = PipelineConfig::default();
    config.project.name = Some(project.into());
    config
}

fn no_repo(_: &Path) -> Option<String> {
    None
}

fn mtime(path: &Path) -> FileTime {
    FileTime::from_last_modification_time(&fs::metadata(path).unwrap())
}

#[test]
fn checkouts_side_by_side_are_named_per_repository() {
    let src = TestTree::new();
    real_git_repo_with_origin(&src.path("web"), "https://example.com/acme/web-ui.git");
    real_git_repo_with_origin(&src.path("api"), "git@example.com:acme/api-server.git");
    src.service("web/app", "FROM node\n")
        .service("api/users", "FROM golang\n")
        .service("api/billing", "FROM golang\n")
        .service("tools/lint", "FROM alpine\n");

    let plan = Pipeline::new(&PluginRegistry::with_builtins(), config("mono"))
        .unwrap()
        .plan(src.root())
        .unwrap();

    let names: Vec<_> = plan.services.keys().map(String::as_str).collect();
    assert_eq!(names, vec!["api-server-billing", "api-server-users", "mono", "web-ui"]);
}

#[test]
fn nested_layout_gets_shortest_distinguishing_names() {
    let src = TestTree::new();
    src.service("platform/edge/gateway", "FROM envoy\n")
        .service("platform/core/accounts", "FROM golang\n")
        .service("platform/core/ledger", "FROM golang\n")
        .service("jobs/nightly", "FROM python\n");

    let plan = Pipeline::new(&PluginRegistry::with_builtins(), config("bank"))
        .unwrap()
        .with_probe(no_repo)
        .plan(src.root())
        .unwrap();

    let names: Vec<_> = plan.services.keys().map(String::as_str).collect();
    assert_eq!(
        names,
        vec!["bank-jobs", "bank-platform-core-accounts", "bank-platform-core-ledger", "bank-platform-edge"]
    );
}

#[test]
fn rerun_leaves_copied_sources_untouched() {
    let src = TestTree::new();
    src.service("api", "FROM scratch\nEXPOSE 8443\n")
        .file("api/main.rs", "fn main() {}");
    let out = TestTree::new();
    let pipeline = Pipeline::new(&PluginRegistry::with_builtins(), config("svc"))
        .unwrap()
        .with_probe(no_repo);

    let first = pipeline.run(src.root(), out.root()).unwrap();
    assert!(first.is_complete(), "{:?}", first.resolution.errors);
    let copied = out.path("source/api/main.rs");
    assert_eq!(mtime(&copied), mtime(&src.path("api/main.rs")));
    let entries = out.entries();

    let second = pipeline.run(src.root(), out.root()).unwrap();
    assert!(second.is_complete());
    assert_eq!(out.entries(), entries);
    assert_eq!(mtime(&copied), mtime(&src.path("api/main.rs")));
    out.assert_file_contains("deploy/yamls/svc-deployment.yaml", "containerPort: 8443");
}

#[test]
fn resolver_reports_bad_mappings_and_applies_the_rest() {
    let src = TestTree::new();
    src.file("chart/values.yaml", "image: {{ .Image }}\n")
        .file("chart/broken.yaml", "port: {{ .Port }}\n")
        .file("app/run.sh", "#!/bin/sh");
    let out = TestTree::new();
    out.file("obsolete/old.yaml", "x");

    let mappings = vec![
        PathMapping::template("chart/values.yaml", "deploy/values.yaml", json!({"Image": "api:1"})),
        PathMapping::template("chart/broken.yaml", "deploy/broken.yaml", json!({})),
        PathMapping::source("app", "source/app"),
        PathMapping::default("app/run.sh", "../escape.sh"),
        PathMapping::delete("obsolete"),
    ];
    let report = resolve(&mappings, src.root(), out.root()).unwrap();

    assert_eq!(report.applied.len(), 3);
    assert_eq!(report.errors.len(), 2);
    assert_eq!(out.read("deploy/values.yaml"), "image: api:1\n");
    out.assert_missing("deploy/broken.yaml");
    out.assert_file_exists("source/app/run.sh");
    out.assert_missing("obsolete");
    assert!(!out.root().parent().unwrap().join("escape.sh").exists());
}
