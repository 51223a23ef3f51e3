//! Service naming and bucketing
//!
//! Turns the per-directory detection hits collected under the reserved
//! empty name into named services. Names prefer repository identity and
//! fall back to the shortest path suffix that tells services apart.

use std::collections::{BTreeMap, BTreeSet};
use std::path::{Component, Path, PathBuf};

use crate::artifact::{Artifact, ServiceMap, roles};
use shift_fs::path::{common_ancestor, enclosing_directory, is_descendant};
use shift_git::to_metadata_name;

/// Key under which detection hits without a service name are collected.
pub const UNNAMED: &str = "";

/// Name used when normalization leaves nothing usable.
const FALLBACK_NAME: &str = "service";

/// Answers which repository a directory belongs to.
pub trait RepoProbe {
    /// Repository name for `path`, or `None` outside any repository.
    fn repo_name(&self, path: &Path) -> Option<String>;
}

/// [`RepoProbe`] backed by git.
#[derive(Debug, Default, Clone, Copy)]
pub struct GitProbe;

impl RepoProbe for GitProbe {
    fn repo_name(&self, path: &Path) -> Option<String> {
        match shift_git::probe(path) {
            Ok(identity) => identity.map(|id| id.name),
            Err(e) => {
                tracing::warn!(path = %path.display(), error = %e, "Could not read repository");
                None
            }
        }
    }
}

impl<F> RepoProbe for F
where
    F: Fn(&Path) -> Option<String>,
{
    fn repo_name(&self, path: &Path) -> Option<String> {
        self(path)
    }
}

/// Assign every unnamed hit in `services` to a service name.
///
/// Already-named entries keep their names. The result holds no
/// [`UNNAMED`] entry; hits without any path are dropped with an error.
pub fn name_services(project: &str, mut services: ServiceMap, probe: &dyn RepoProbe) -> ServiceMap {
    let unnamed = services.remove(UNNAMED).unwrap_or_default();
    let mut named = services;

    // Known service directory -> name, deepest first so folding picks the
    // innermost service.
    let mut known: Vec<(PathBuf, String)> = named
        .iter()
        .flat_map(|(name, hits)| {
            hits.iter()
                .flat_map(|hit| hit.paths(roles::SERVICE_DIRECTORY))
                .map(move |p| (p.clone(), name.clone()))
        })
        .collect();
    known.sort_by_key(|(p, _)| std::cmp::Reverse(p.components().count()));

    let mut staged: BTreeMap<PathBuf, Vec<Artifact>> = BTreeMap::new();
    for hit in unnamed {
        let Some(bounding) = bounding_path(&hit) else {
            tracing::error!(kind = %hit.kind, "Dropping detection hit without any path");
            continue;
        };

        match known.iter().find(|(p, _)| is_descendant(&bounding, p)) {
            Some((_, name)) => named.entry(name.clone()).or_default().push(hit),
            None => staged.entry(bounding).or_default().push(hit),
        }
    }

    if staged.is_empty() {
        return named;
    }

    let mut by_repo: BTreeMap<Option<String>, Vec<PathBuf>> = BTreeMap::new();
    for path in staged.keys() {
        by_repo.entry(probe.repo_name(path)).or_default().push(path.clone());
    }

    let mut assigned: Vec<(String, PathBuf)> = Vec::new();
    let mut leftover: Vec<(String, Vec<PathBuf>)> = Vec::new();
    for (repo, paths) in by_repo {
        match repo {
            Some(repo) if paths.len() == 1 => assigned.extend(paths.into_iter().map(|p| (repo.clone(), p))),
            Some(repo) => leftover.push((repo, paths)),
            None => leftover.push((project.to_string(), paths)),
        }
    }

    if named.is_empty() && assigned.is_empty() && leftover.len() == 1 && leftover[0].1.len() == 1 {
        let (_, paths) = leftover.remove(0);
        assigned.extend(paths.into_iter().map(|p| (project.to_string(), p)));
    }

    for (key, paths) in leftover {
        bucket(&key, &paths, &mut assigned);
    }

    let mut taken: BTreeSet<String> = named.keys().cloned().collect();
    for (raw, path) in assigned {
        let name = unique_name(&raw, &mut taken);
        tracing::debug!(service = %name, path = %path.display(), "Named service");
        if let Some(hits) = staged.remove(&path) {
            named.entry(name).or_default().extend(hits);
        }
    }

    named
}

/// Directory that bounds all paths of a detection hit.
///
/// Uses the service-directory role when present and every recorded path
/// otherwise.
pub fn bounding_path(hit: &Artifact) -> Option<PathBuf> {
    let service_dirs = hit.paths(roles::SERVICE_DIRECTORY);
    let ancestor = if service_dirs.is_empty() {
        common_ancestor(hit.all_paths())?
    } else {
        common_ancestor(service_dirs)?
    };
    Some(enclosing_directory(&ancestor))
}

/// Split `paths` into groups by the first segment after their common
/// prefix, recursing into groups with more than one member.
fn bucket(key: &str, paths: &[PathBuf], out: &mut Vec<(String, PathBuf)>) {
    if let [only] = paths {
        out.push((key.to_string(), only.clone()));
        return;
    }
    let Some(prefix) = common_ancestor(paths) else {
        return;
    };

    let mut groups: BTreeMap<String, Vec<PathBuf>> = BTreeMap::new();
    for path in paths {
        let segment = path
            .strip_prefix(&prefix)
            .ok()
            .and_then(|rest| rest.components().next())
            .map(segment_name)
            .unwrap_or_default();
        groups.entry(segment).or_default().push(path.clone());
    }

    for (segment, members) in groups {
        bucket(&join_key(key, &segment), &members, out);
    }
}

fn segment_name(component: Component<'_>) -> String {
    component.as_os_str().to_string_lossy().into_owned()
}

fn join_key(key: &str, segment: &str) -> String {
    match (key.is_empty(), segment.is_empty()) {
        (_, true) => key.to_string(),
        (true, false) => segment.to_string(),
        (false, false) => format!("{key}-{segment}"),
    }
}

/// Normalize `raw` and suffix it until it no longer collides with `taken`.
fn unique_name(raw: &str, taken: &mut BTreeSet<String>) -> String {
    let mut base = to_metadata_name(raw);
    if base.is_empty() {
        base = FALLBACK_NAME.to_string();
    }

    let mut candidate = base.clone();
    let mut n = 2;
    while taken.contains(&candidate) {
        let suffix = format!("-{n}");
        let keep = base.len().min(shift_git::MAX_NAME_LEN - suffix.len());
        candidate = format!("{}{suffix}", base[..keep].trim_end_matches('-'));
        n += 1;
    }
    taken.insert(candidate.clone());
    candidate
}
