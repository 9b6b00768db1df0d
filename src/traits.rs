//! Global traits: named mutation recipes shared by every blueprint of a factory.

use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;

use serde_json::Value;

use crate::draft::Draft;
use crate::error::Result;

/// A global trait receives the value it was called with and the draft to mutate.
pub type GlobalTrait = Arc<dyn Fn(&Value, &mut Draft) -> Result<()> + Send + Sync>;

/// Name of the built-in trait that deletes keys from a draft.
pub const OMIT: &str = "omit";

pub struct TraitRegistry {
    kept: BTreeMap<String, GlobalTrait>,
}

impl TraitRegistry {
    /// A registry holding only the built-in `omit` trait.
    pub fn new() -> Self {
        let mut registry = Self { kept: BTreeMap::new() };
        registry.reset();
        registry
    }
    /// Adds `name`, replacing whatever was registered under it before.
    pub fn register<F>(&mut self, name: impl Into<String>, recipe: F)
    where
        F: Fn(&Value, &mut Draft) -> Result<()> + Send + Sync + 'static,
    {
        self.kept.insert(name.into(), Arc::new(recipe));
    }
    pub fn remove(&mut self, name: &str) -> bool {
        self.kept.remove(name).is_some()
    }
    pub fn get(&self, name: &str) -> Option<GlobalTrait> {
        self.kept.get(name).cloned()
    }
    pub fn contains(&self, name: &str) -> bool {
        self.kept.contains_key(name)
    }
    pub fn names(&self) -> Vec<String> {
        self.kept.keys().cloned().collect()
    }
    pub fn len(&self) -> usize {
        self.kept.len()
    }
    pub fn is_empty(&self) -> bool {
        self.kept.is_empty()
    }
    /// Forgets every registered trait except `omit`.
    pub fn reset(&mut self) {
        self.kept.clear();
        self.register(OMIT, omit);
    }
}

impl Default for TraitRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for TraitRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_set().entries(self.kept.keys()).finish()
    }
}

/// Deletes one key, or every key of an array, from the draft.
pub fn omit(value: &Value, draft: &mut Draft) -> Result<()> {
    match value {
        Value::Array(keys) => keys.iter().filter_map(key_of).for_each(|key| {
            draft.remove(&key);
        }),
        other => {
            if let Some(key) = key_of(other) {
                draft.remove(&key);
            }
        }
    }
    Ok(())
}

// keys given as numbers or booleans address the field with that textual name
fn key_of(value: &Value) -> Option<String> {
    match value {
        Value::Null => None,
        Value::String(s) => Some(s.clone()),
        other => Some(other.to_string()),
    }
}
