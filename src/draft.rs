//! The working object a blueprint builder fills in.
//!
//! A [`Draft`] keeps two views side by side: the plain `fields` that end up in
//! the attribute set, and the *local traits* a builder attaches to itself.
//! A key lives in at most one of the two views; assigning a field drops a
//! local trait of the same name and vice versa.

use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;

use serde_json::{Map, Value};

use crate::error::{FactoryError, Result};
use crate::factory::Factory;
use crate::merge;

/// A mutation recipe attached by a builder, invoked with the draft it lives on.
pub type LocalTrait = Arc<dyn Fn(&mut Draft, &Value, &Factory) -> Result<()> + Send + Sync>;

#[derive(Clone, Default)]
pub struct Draft {
    fields: Map<String, Value>,
    traits: BTreeMap<String, LocalTrait>,
}

impl Draft {
    pub fn new() -> Self {
        Self::default()
    }

    // ------------- Fields -------------
    pub fn set(&mut self, key: impl Into<String>, value: impl Into<Value>) -> &mut Self {
        let key = key.into();
        self.traits.remove(&key);
        self.fields.insert(key, value.into());
        self
    }
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.fields.get(key)
    }
    pub fn get_mut(&mut self, key: &str) -> Option<&mut Value> {
        self.fields.get_mut(key)
    }
    /// Deletes `key` from both views, returning the field value if there was one.
    pub fn remove(&mut self, key: &str) -> Option<Value> {
        self.traits.remove(key);
        self.fields.shift_remove(key)
    }
    pub fn contains(&self, key: &str) -> bool {
        self.fields.contains_key(key) || self.traits.contains_key(key)
    }
    pub fn fields(&self) -> &Map<String, Value> {
        &self.fields
    }
    /// Deep merges `data` on top of the fields (see [`crate::merge`]).
    pub fn merge(&mut self, data: &Value) {
        merge::merge_into(&mut self.fields, data);
        // merged keys become data, replacing a local trait of the same name
        if let Value::Object(data) = data {
            for key in data.keys() {
                self.traits.remove(key);
            }
        }
    }

    // ------------- Local traits -------------
    pub fn define_trait<F>(&mut self, name: impl Into<String>, recipe: F) -> &mut Self
    where
        F: Fn(&mut Draft, &Value, &Factory) -> Result<()> + Send + Sync + 'static,
    {
        let name = name.into();
        self.fields.shift_remove(&name);
        self.traits.insert(name, Arc::new(recipe));
        self
    }
    pub fn has_trait(&self, name: &str) -> bool {
        self.traits.contains_key(name)
    }
    pub fn trait_names(&self) -> impl Iterator<Item = &str> {
        self.traits.keys().map(String::as_str)
    }
    pub(crate) fn local_trait(&self, name: &str) -> Option<LocalTrait> {
        self.traits.get(name).cloned()
    }
    /// Runs the local trait `name` against this draft.
    ///
    /// Global traits are not consulted here; the factory resolves those while
    /// building. Fails with [`FactoryError::UnknownTrait`] when no such local
    /// trait exists.
    pub fn invoke(&mut self, name: &str, value: &Value, factory: &Factory) -> Result<()> {
        let recipe = self.local_trait(name).ok_or_else(|| FactoryError::UnknownTrait {
            prefix: factory.error_prefix().to_owned(),
            name: name.to_owned(),
        })?;
        recipe(self, value, factory)
    }
    /// Drops every local trait, leaving a plain attribute set.
    pub fn into_attributes(self) -> Map<String, Value> {
        self.fields
    }
}

impl fmt::Debug for Draft {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Draft")
            .field("fields", &self.fields)
            .field("traits", &self.traits.keys().collect::<Vec<_>>())
            .finish()
    }
}
