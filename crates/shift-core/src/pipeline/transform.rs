//! Transform passes

use crate::Result;
use crate::artifact::{Artifact, ArtifactSet, ConfigMergers};
use crate::mapping::PathMapping;
use crate::plugin::{PluginEnv, PluginRegistry};

/// State left behind by the transform passes.
#[derive(Debug, Default)]
pub struct TransformOutcome {
    /// Every artifact known at the end of the run
    pub artifacts: ArtifactSet,
    /// Mappings in the order plugins returned them
    pub path_mappings: Vec<PathMapping>,
    /// Number of passes that ran
    pub passes: usize,
    /// Whether the pass limit stopped the run before it settled
    pub truncated: bool,
}

/// Run passes until no plugin produces a new or changed artifact.
///
/// Each pass offers the pending artifacts to plugins in registry order.
/// An artifact handed to a plugin that consumes its kind exclusively is
/// not offered to later plugins in the same pass.
///
/// # Errors
///
/// Only fatal plugin errors abort; others are logged and the plugin's
/// output for that pass is discarded.
pub fn run_passes(
    plugins: &PluginRegistry,
    mergers: &ConfigMergers,
    env: &PluginEnv,
    seed: Vec<Artifact>,
    max_passes: usize,
) -> Result<TransformOutcome> {
    let mut outcome = TransformOutcome::default();
    let mut pending = outcome.artifacts.merge(seed, mergers);

    while !pending.is_empty() {
        if outcome.passes >= max_passes {
            tracing::warn!(max_passes, pending = pending.len(), "Pass limit reached before the pipeline settled");
            outcome.truncated = true;
            break;
        }
        outcome.passes += 1;
        let _span = tracing::debug_span!("pass", n = outcome.passes).entered();

        let mut claimed = vec![false; pending.len()];
        let mut produced = Vec::new();

        for plugin in plugins.iter() {
            let contract = plugin.contract();
            let mut offered = Vec::new();
            for (i, artifact) in pending.iter().enumerate() {
                if claimed[i] {
                    continue;
                }
                if let Some(consumption) = contract.consumption(&artifact.kind) {
                    offered.push(artifact.clone());
                    claimed[i] = consumption.exclusive;
                }
            }
            if offered.is_empty() {
                continue;
            }

            tracing::debug!(plugin = plugin.name(), artifacts = offered.len(), "Running transform");
            match plugin.transform(env, &offered, outcome.artifacts.items()) {
                Ok(output) => {
                    outcome.path_mappings.extend(output.path_mappings);
                    produced.extend(output.artifacts);
                }
                Err(e) if e.is_fatal() => return Err(e),
                Err(e) => {
                    tracing::error!(plugin = plugin.name(), error = %e, "Transform failed, discarding its output");
                }
            }
        }

        pending = outcome.artifacts.merge(produced, mergers);
    }

    Ok(outcome)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Error;
    use crate::artifact::kinds;
    use crate::plugin::{Plugin, PluginContract, TransformOutput};
    use std::sync::{Arc, Mutex};

    /// Records what it was offered and turns each artifact into one of
    /// `emits` kind.
    struct Stage {
        name: &'static str,
        contract: PluginContract,
        emits: Option<&'static str>,
        seen: Mutex<Vec<String>>,
    }

    impl Stage {
        fn new(name: &'static str, contract: PluginContract, emits: Option<&'static str>) -> Arc<Self> {
            Arc::new(Self {
                name,
                contract,
                emits,
                seen: Mutex::new(Vec::new()),
            })
        }

        fn seen(&self) -> Vec<String> {
            self.seen.lock().unwrap().clone()
        }
    }

    impl Plugin for Stage {
        fn name(&self) -> &str {
            self.name
        }

        fn contract(&self) -> &PluginContract {
            &self.contract
        }

        fn transform(&self, _env: &PluginEnv, new: &[Artifact], _old: &[Artifact]) -> Result<TransformOutput> {
            let mut output = TransformOutput::default();
            for artifact in new {
                self.seen.lock().unwrap().push(artifact.name.clone());
                output
                    .path_mappings
                    .push(PathMapping::delete(format!("{}/{}", self.name, artifact.name)));
                if let Some(kind) = self.emits {
                    output.artifacts.push(Artifact::new(kind, &artifact.name));
                }
            }
            Ok(output)
        }
    }

    struct Demanding;

    impl Plugin for Demanding {
        fn name(&self) -> &str {
            "demanding"
        }

        fn contract(&self) -> &PluginContract {
            static CONTRACT: std::sync::LazyLock<PluginContract> =
                std::sync::LazyLock::new(|| PluginContract::new().consumes(kinds::SERVICE));
            &CONTRACT
        }

        fn transform(&self, _env: &PluginEnv, new: &[Artifact], _old: &[Artifact]) -> Result<TransformOutput> {
            new[0].require_config::<u16>("Port")?;
            Ok(TransformOutput::default())
        }
    }

    fn env() -> PluginEnv {
        PluginEnv::new("/src", "/tmp/unused")
    }

    fn services(names: &[&str]) -> Vec<Artifact> {
        names.iter().map(|n| Artifact::new(kinds::SERVICE, *n)).collect()
    }

    #[test]
    fn exclusive_consumer_hides_artifacts_from_later_plugins() {
        let shared = Stage::new("shared", PluginContract::new().consumes(kinds::SERVICE), None);
        let owner = Stage::new("owner", PluginContract::new().consumes_exclusively(kinds::SERVICE), None);
        let late = Stage::new("late", PluginContract::new().consumes(kinds::SERVICE), None);

        let mut registry = PluginRegistry::new();
        registry.register(shared.clone());
        registry.register(owner.clone());
        registry.register(late.clone());

        let outcome = run_passes(&registry, &ConfigMergers::new(), &env(), services(&["a", "b"]), 8).unwrap();

        assert_eq!(shared.seen(), vec!["a", "b"]);
        assert_eq!(owner.seen(), vec!["a", "b"]);
        assert!(late.seen().is_empty());
        assert_eq!(outcome.passes, 1);
        assert_eq!(outcome.path_mappings.len(), 4);
    }

    #[test]
    fn produced_artifacts_feed_the_next_pass() {
        let first = Stage::new("first", PluginContract::new().consumes(kinds::SERVICE), Some(kinds::IR));
        let second = Stage::new(
            "second",
            PluginContract::new().consumes(kinds::IR),
            Some(kinds::KUBERNETES_YAMLS),
        );

        let mut registry = PluginRegistry::new();
        registry.register(second.clone());
        registry.register(first.clone());

        let outcome = run_passes(&registry, &ConfigMergers::new(), &env(), services(&["a"]), 8).unwrap();

        assert_eq!(second.seen(), vec!["a"]);
        assert_eq!(outcome.passes, 3);
        assert_eq!(outcome.artifacts.len(), 3);
        assert!(!outcome.truncated);
    }

    #[test]
    fn pass_limit_truncates() {
        let first = Stage::new("first", PluginContract::new().consumes(kinds::SERVICE), Some(kinds::IR));
        let mut registry = PluginRegistry::new();
        registry.register(first);

        let outcome = run_passes(&registry, &ConfigMergers::new(), &env(), services(&["a"]), 1).unwrap();

        assert_eq!(outcome.passes, 1);
        assert!(outcome.truncated);
    }

    #[test]
    fn missing_required_config_aborts() {
        let mut registry = PluginRegistry::new();
        registry.register(Arc::new(Demanding));

        let err = run_passes(&registry, &ConfigMergers::new(), &env(), services(&["a"]), 8).unwrap_err();
        assert!(matches!(err, Error::MissingConfig { .. }));
    }
}
