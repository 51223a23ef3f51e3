//! Config value merging
//!
//! Configs of the same kind combine through a typed [`ConfigMerger`] when a
//! plugin registered one, and through [`deep_merge`] otherwise. A typed
//! merge that fails is logged and replaced by the generic merge.

use std::collections::BTreeMap;
use std::fmt;
use std::marker::PhantomData;
use std::sync::Arc;

use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::Value;

use crate::{Error, Result};

/// Generic recursive merge where `newer` takes precedence.
///
/// - objects: key union, shared keys merged recursively
/// - arrays: `base` followed by the elements of `newer` it lacks
/// - anything else: `newer` unless it is empty (see [`is_empty_value`])
pub fn deep_merge(base: &Value, newer: &Value) -> Value {
    match (base, newer) {
        (Value::Object(base_map), Value::Object(newer_map)) => {
            let mut merged = base_map.clone();
            for (key, newer_val) in newer_map {
                let value = match base_map.get(key) {
                    Some(base_val) => deep_merge(base_val, newer_val),
                    None => newer_val.clone(),
                };
                merged.insert(key.clone(), value);
            }
            Value::Object(merged)
        }
        (Value::Array(base_items), Value::Array(newer_items)) => {
            let mut merged = base_items.clone();
            for item in newer_items {
                if !merged.contains(item) {
                    merged.push(item.clone());
                }
            }
            Value::Array(merged)
        }
        (base, newer) => {
            if is_empty_value(newer) {
                base.clone()
            } else {
                newer.clone()
            }
        }
    }
}

/// `null`, `""`, `[]` and `{}` are empty. Booleans and numbers never are.
pub fn is_empty_value(value: &Value) -> bool {
    match value {
        Value::Null => true,
        Value::String(s) => s.is_empty(),
        Value::Array(items) => items.is_empty(),
        Value::Object(map) => map.is_empty(),
        Value::Bool(_) | Value::Number(_) => false,
    }
}

/// A config shape that knows how to combine with a newer instance of itself.
pub trait Mergeable: Sized {
    fn merge(self, newer: Self) -> Self;
}

/// Merge contract for one config kind.
pub trait ConfigMerger: Send + Sync {
    fn merge(&self, kind: &str, old: &Value, new: &Value) -> Result<Value>;
}

/// [`ConfigMerger`] that decodes both sides into `T` and uses
/// [`Mergeable::merge`].
pub struct TypedMerger<T>(PhantomData<fn() -> T>);

impl<T> TypedMerger<T> {
    pub fn new() -> Self {
        Self(PhantomData)
    }
}

impl<T> Default for TypedMerger<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> ConfigMerger for TypedMerger<T>
where
    T: Mergeable + Serialize + DeserializeOwned,
{
    fn merge(&self, kind: &str, old: &Value, new: &Value) -> Result<Value> {
        let decode = |value: &Value| {
            serde_json::from_value::<T>(value.clone()).map_err(|e| Error::ConfigMerge {
                kind: kind.to_string(),
                message: e.to_string(),
            })
        };
        let merged = decode(old)?.merge(decode(new)?);
        Ok(serde_json::to_value(merged)?)
    }
}

/// Config kind -> typed merger.
#[derive(Clone, Default)]
pub struct ConfigMergers {
    by_kind: BTreeMap<String, Arc<dyn ConfigMerger>>,
}

impl ConfigMergers {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `T`'s [`Mergeable`] implementation for `kind`.
    pub fn register<T>(&mut self, kind: impl Into<String>)
    where
        T: Mergeable + Serialize + DeserializeOwned + 'static,
    {
        self.register_merger(kind, Arc::new(TypedMerger::<T>::new()));
    }

    pub fn register_merger(&mut self, kind: impl Into<String>, merger: Arc<dyn ConfigMerger>) {
        self.by_kind.insert(kind.into(), merger);
    }

    pub fn contains(&self, kind: &str) -> bool {
        self.by_kind.contains_key(kind)
    }

    /// Combine two values of config `kind`, newer taking precedence.
    pub fn merge(&self, kind: &str, old: &Value, new: &Value) -> Value {
        if let Some(merger) = self.by_kind.get(kind) {
            match merger.merge(kind, old, new) {
                Ok(value) => return value,
                Err(e) => {
                    tracing::error!(kind = %kind, error = %e, "Typed config merge failed, using generic merge");
                }
            }
        }
        deep_merge(old, new)
    }
}

impl fmt::Debug for ConfigMergers {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_set().entries(self.by_kind.keys()).finish()
    }
}
