//! Artifact Merge Layer
//!
//! Folds artifacts returned by plugins into the aggregate kept by the
//! pipeline. Artifacts combine by `(kind, name)`: path lists are unioned in
//! first-seen order and configs are merged per kind through
//! [`ConfigMergers`].

use super::{Artifact, ConfigMergers};

impl Artifact {
    /// Fold `newer` into `self`. Both must describe the same unit.
    pub fn merge_with(&mut self, newer: Artifact, mergers: &ConfigMergers) {
        debug_assert!(self.same_unit(&newer));

        for (role, paths) in newer.paths {
            for path in paths {
                self.add_path(&role, path);
            }
        }

        for (kind, value) in newer.configs {
            let merged = match self.configs.get(&kind) {
                Some(existing) => mergers.merge(&kind, existing, &value),
                None => value,
            };
            self.configs.insert(kind, merged);
        }
    }

    /// Non-mutating form of [`Artifact::merge_with`].
    pub fn merged(&self, newer: &Artifact, mergers: &ConfigMergers) -> Artifact {
        let mut out = self.clone();
        out.merge_with(newer.clone(), mergers);
        out
    }
}

/// Combine `new` with its counterparts in `old` and collapse duplicates
/// within `new`.
///
/// Every returned artifact is the fold of the matching `old` entry (if any)
/// followed by each matching `new` entry in order. The output lists one
/// artifact per distinct `(kind, name)` present in `new`, in first-seen
/// order. Artifacts only present in `old` are not returned.
pub fn merge_artifacts(old: &[Artifact], new: Vec<Artifact>, mergers: &ConfigMergers) -> Vec<Artifact> {
    let mut out: Vec<Artifact> = Vec::with_capacity(new.len());

    for artifact in new {
        if let Some(existing) = out.iter_mut().find(|a| a.same_unit(&artifact)) {
            existing.merge_with(artifact, mergers);
            continue;
        }

        match old.iter().find(|a| a.same_unit(&artifact)) {
            Some(previous) => {
                let mut combined = previous.clone();
                combined.merge_with(artifact, mergers);
                out.push(combined);
            }
            None => out.push(artifact),
        }
    }

    out
}

/// The aggregate artifact set owned by the pipeline across passes.
#[derive(Debug, Clone, Default)]
pub struct ArtifactSet {
    items: Vec<Artifact>,
}

impl ArtifactSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn items(&self) -> &[Artifact] {
        &self.items
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn get(&self, kind: &str, name: &str) -> Option<&Artifact> {
        self.items.iter().find(|a| a.key() == (kind, name))
    }

    /// Merge `new` into the set and return the entries that were added or
    /// whose content changed.
    pub fn merge(&mut self, new: Vec<Artifact>, mergers: &ConfigMergers) -> Vec<Artifact> {
        let merged = merge_artifacts(&self.items, new, mergers);
        self.absorb(merged)
    }

    /// Store already-merged artifacts, replacing same-unit entries in place.
    /// Returns the entries that were added or whose content changed.
    pub fn absorb(&mut self, merged: Vec<Artifact>) -> Vec<Artifact> {
        let mut changed = Vec::new();

        for artifact in merged {
            match self.items.iter_mut().find(|a| a.same_unit(&artifact)) {
                Some(slot) if *slot == artifact => {}
                Some(slot) => {
                    *slot = artifact.clone();
                    changed.push(artifact);
                }
                None => {
                    self.items.push(artifact.clone());
                    changed.push(artifact);
                }
            }
        }

        changed
    }

    pub fn into_items(self) -> Vec<Artifact> {
        self.items
    }
}

impl FromIterator<Artifact> for ArtifactSet {
    fn from_iter<I: IntoIterator<Item = Artifact>>(iter: I) -> Self {
        let mut set = ArtifactSet::new();
        set.merge(iter.into_iter().collect(), &ConfigMergers::new());
        set
    }
}
