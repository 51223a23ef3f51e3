//! Plugin registry storage

use std::sync::Arc;

use super::{LabelSelector, Plugin};
use crate::artifact::ConfigMergers;

/// Label naming the deployment target a plugin generates for.
pub const TARGET_LABEL: &str = "target";

/// Ordered collection of plugins available to a pipeline run.
///
/// Iteration follows registration order; the pipeline relies on it for
/// exclusive consumption.
#[derive(Clone, Default)]
pub struct PluginRegistry {
    plugins: Vec<Arc<dyn Plugin>>,
}

impl PluginRegistry {
    /// Create a new empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a registry pre-populated with the built-in plugins.
    pub fn with_builtins() -> Self {
        let mut registry = Self::new();
        for plugin in super::builtins::builtin_plugins() {
            registry.register(plugin);
        }
        registry
    }

    /// Register a plugin. A plugin with the same name is replaced in place.
    pub fn register(&mut self, plugin: Arc<dyn Plugin>) {
        match self.plugins.iter_mut().find(|p| p.name() == plugin.name()) {
            Some(slot) => *slot = plugin,
            None => self.plugins.push(plugin),
        }
    }

    pub fn get(&self, name: &str) -> Option<&Arc<dyn Plugin>> {
        self.plugins.iter().find(|p| p.name() == name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.get(name).is_some()
    }

    pub fn len(&self) -> usize {
        self.plugins.len()
    }

    pub fn is_empty(&self) -> bool {
        self.plugins.is_empty()
    }

    /// Plugin names in registration order.
    pub fn names(&self) -> Vec<&str> {
        self.plugins.iter().map(|p| p.name()).collect()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Arc<dyn Plugin>> {
        self.plugins.iter()
    }

    /// Plugins whose labels satisfy `selector`.
    pub fn select(&self, selector: &LabelSelector) -> PluginRegistry {
        self.filtered(|p| selector.matches(&p.contract().labels))
    }

    /// Plugins usable for `target`: those without a target label plus those
    /// labelled with exactly this target.
    pub fn for_target(&self, target: &str) -> PluginRegistry {
        self.filtered(|p| {
            p.contract()
                .labels
                .get(TARGET_LABEL)
                .is_none_or(|t| t == target)
        })
    }

    /// Plugins that consume `kind`, in registration order.
    pub fn consumers_of(&self, kind: &str) -> Vec<&Arc<dyn Plugin>> {
        self.plugins
            .iter()
            .filter(|p| p.contract().consumption(kind).is_some())
            .collect()
    }

    /// Typed config mergers contributed by all plugins.
    pub fn config_mergers(&self) -> ConfigMergers {
        let mut mergers = ConfigMergers::new();
        for plugin in &self.plugins {
            plugin.config_mergers(&mut mergers);
        }
        mergers
    }

    fn filtered(&self, keep: impl Fn(&dyn Plugin) -> bool) -> PluginRegistry {
        PluginRegistry {
            plugins: self
                .plugins
                .iter()
                .filter(|p| keep(Arc::as_ref(p)))
                .cloned()
                .collect(),
        }
    }
}

impl std::fmt::Debug for PluginRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_list().entries(self.names()).finish()
    }
}
