//! The public face of the crate.
//!
//! A [`Factory`] owns one blueprint registry, one set of global traits, the
//! builder helpers and the provider it persists through. Nothing is shared
//! between factories, so independent test suites can each keep their own.
//!
//! Defining blueprints and registering traits take `&mut self`; building and
//! creating only need `&self`, which lets builders call back into the factory
//! for nested fixtures.

use std::fmt;
use std::sync::Arc;

use futures_util::future::try_join_all;
use serde_json::{Map, Value};
use tracing::{debug, warn};

use crate::blueprint::{Blueprint, BlueprintRegistry, IntoNames};
use crate::draft::Draft;
use crate::error::{FactoryError, Result};
use crate::helpers::Helpers;
use crate::provider::{Document, Filter, Model, Provider};
use crate::store::DocumentStore;
use crate::traits::TraitRegistry;

pub const DEFAULT_ERROR_PREFIX: &str = "Mongo factory ";

// ------------- Options -------------
pub struct FactoryOptions {
    /// Text every blueprint error message starts with.
    pub error_prefix: String,
    /// Where `build`, `create` and `clean` go. `None` binds an in-memory [`DocumentStore`].
    pub provider: Option<Arc<dyn Provider>>,
    /// Seed for [`Helpers`]; unseeded factories draw from entropy.
    pub seed: Option<u64>,
}

impl FactoryOptions {
    pub fn with_error_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.error_prefix = prefix.into();
        self
    }
    pub fn with_provider(mut self, provider: impl Provider + 'static) -> Self {
        self.provider = Some(Arc::new(provider));
        self
    }
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }
}

impl Default for FactoryOptions {
    fn default() -> Self {
        Self {
            error_prefix: DEFAULT_ERROR_PREFIX.to_owned(),
            provider: None,
            seed: None,
        }
    }
}

// ------------- Overrides -------------
/// Caller supplied adjustments for a single build: data merged on top of the
/// generated attributes, and traits applied (in order) before that merge.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Overrides {
    data: Value,
    traits: Vec<(String, Value)>,
}

impl Overrides {
    pub fn new() -> Self {
        Self::default()
    }
    /// Data to deep merge over the result; only objects contribute anything.
    pub fn with_data(mut self, data: Value) -> Self {
        self.data = data;
        self
    }
    pub fn with_trait(mut self, name: impl Into<String>, value: impl Into<Value>) -> Self {
        self.traits.push((name.into(), value.into()));
        self
    }
    /// Appends every entry of a JSON object as a trait, keeping its key order.
    pub fn with_traits(mut self, traits: Value) -> Self {
        if let Value::Object(traits) = traits {
            self.traits.extend(traits);
        }
        self
    }
    pub fn data(&self) -> &Value {
        &self.data
    }
    pub fn traits(&self) -> &[(String, Value)] {
        &self.traits
    }
}

// ------------- Factory -------------
pub struct Factory {
    error_prefix: String,
    provider: Arc<dyn Provider>,
    registry: BlueprintRegistry,
    traits: TraitRegistry,
    helpers: Helpers,
}

// zero asks for the default of a single item
fn times(count: usize) -> usize {
    count.max(1)
}

impl Factory {
    /// A factory bound to a fresh in-memory document store.
    pub fn new() -> Result<Self> {
        Self::with_options(FactoryOptions::default())
    }

    pub fn with_options(options: FactoryOptions) -> Result<Self> {
        let provider: Arc<dyn Provider> = match options.provider {
            Some(provider) => provider,
            None => Arc::new(DocumentStore::open_in_memory()?),
        };
        Ok(Self {
            error_prefix: options.error_prefix,
            provider,
            registry: BlueprintRegistry::new(),
            traits: TraitRegistry::new(),
            helpers: Helpers::new(options.seed),
        })
    }

    /// A factory with default options persisting through `provider`.
    pub fn with_provider(provider: impl Provider + 'static) -> Self {
        Self {
            error_prefix: DEFAULT_ERROR_PREFIX.to_owned(),
            provider: Arc::new(provider),
            registry: BlueprintRegistry::new(),
            traits: TraitRegistry::new(),
            helpers: Helpers::default(),
        }
    }

    pub fn error_prefix(&self) -> &str {
        &self.error_prefix
    }
    pub fn provider(&self) -> &Arc<dyn Provider> {
        &self.provider
    }
    pub fn helpers(&self) -> &Helpers {
        &self.helpers
    }
    pub fn blueprint(&self, name: &str) -> Option<Arc<Blueprint>> {
        self.registry.get(name)
    }
    pub fn is_defined(&self, name: &str) -> bool {
        self.registry.contains(name)
    }
    pub fn blueprint_names(&self) -> Vec<String> {
        self.registry.names()
    }
    pub fn trait_names(&self) -> Vec<String> {
        self.traits.names()
    }

    // ------------- Registries -------------
    /// Forgets every blueprint.
    pub fn reset_registry(&mut self) {
        self.registry.clear();
    }
    /// Drops all global traits except the built-in `omit`.
    pub fn reset_global_traits(&mut self) {
        self.traits.reset();
    }
    /// Adds or replaces the global trait `name`.
    pub fn register_trait<F>(&mut self, name: impl Into<String>, recipe: F)
    where
        F: Fn(&Value, &mut Draft) -> Result<()> + Send + Sync + 'static,
    {
        self.traits.register(name, recipe);
    }
    pub fn remove_trait(&mut self, name: &str) -> bool {
        self.traits.remove(name)
    }

    /// Registers a blueprint under one name or a list of aliases.
    ///
    /// A name may carry its parent as `"child > parent"`; the parent has to be
    /// defined already. Pass `None` as `model` for an abstract blueprint.
    ///
    /// ```
    /// use fixture_factory::{Factory, MemoryProvider, Model, Overrides};
    /// use serde_json::json;
    ///
    /// let mut factory = Factory::with_provider(MemoryProvider::new());
    /// factory.define("person", None, |draft, _| {
    ///     draft.set("species", "human");
    ///     Ok(())
    /// }).unwrap();
    /// factory.define("user > person", Model::new("users"), |draft, f| {
    ///     draft.set("name", f.helpers().hex(8));
    ///     Ok(())
    /// }).unwrap();
    ///
    /// let user = factory.attributes("user", &Overrides::new()).unwrap();
    /// assert_eq!(user["species"], json!("human"));
    /// ```
    pub fn define<N, F>(
        &mut self,
        names: N,
        model: impl Into<Option<Model>>,
        builder: F,
    ) -> Result<()>
    where
        N: IntoNames,
        F: Fn(&mut Draft, &Factory) -> Result<()> + Send + Sync + 'static,
    {
        let model = model.into();
        let defined = self
            .registry
            .register(names.into_names(), model, Arc::new(builder), &self.error_prefix)?;
        for blueprint in &defined {
            debug!(
                blueprint = blueprint.name(),
                parent = blueprint.parent(),
                model = blueprint.model().map(Model::collection),
                "blueprint defined"
            );
        }
        Ok(())
    }

    fn defined(&self, name: &str) -> Result<Arc<Blueprint>> {
        self.registry
            .get(name)
            .ok_or_else(|| FactoryError::UndefinedBlueprint {
                prefix: self.error_prefix.clone(),
                name: name.to_owned(),
            })
    }

    /// The model attached to `name`; abstract blueprints have none.
    pub fn model(&self, name: &str) -> Result<Model> {
        self.defined(name)?
            .model()
            .cloned()
            .ok_or_else(|| FactoryError::AbstractBlueprint {
                prefix: self.error_prefix.clone(),
                name: name.to_owned(),
            })
    }

    /// Removes persisted documents of the blueprint's model matching `filter`.
    pub async fn clean(&self, name: &str, filter: impl Into<Filter>) -> Result<u64> {
        let filter = filter.into();
        let model = self.model(name)?;
        let removed = self.provider.remove(&model, &filter).await;
        match &removed {
            Ok(count) => debug!(blueprint = name, count, "cleaned"),
            Err(e) => warn!(blueprint = name, error = %e, "clean failed"),
        }
        removed
    }

    // ------------- Building -------------
    // builders run from the root ancestor down to `name`, without data or traits
    fn draft(&self, name: &str) -> Result<Draft> {
        let mut chain = vec![self.defined(name)?];
        while let Some(parent) = chain.last().and_then(|b| b.parent()) {
            let parent = self.defined(parent)?;
            chain.push(parent);
        }
        let mut draft = Draft::new();
        for blueprint in chain.iter().rev() {
            (blueprint.builder())(&mut draft, self)?;
        }
        Ok(draft)
    }

    /// Builds the working draft for `name`, local traits included.
    ///
    /// Traits are resolved in the order given: a global trait of that name
    /// wins, otherwise a local trait of the draft is used, otherwise the call
    /// fails with [`FactoryError::UnknownTrait`]. The override data is merged
    /// last.
    pub fn object(&self, name: &str, overrides: &Overrides) -> Result<Draft> {
        let mut draft = self.draft(name)?;
        for (key, value) in overrides.traits() {
            if let Some(recipe) = self.traits.get(key) {
                debug!(blueprint = name, trait_name = key.as_str(), "global trait");
                recipe(value, &mut draft)?;
            } else if let Some(recipe) = draft.local_trait(key) {
                debug!(blueprint = name, trait_name = key.as_str(), "local trait");
                recipe(&mut draft, value, self)?;
            } else {
                return Err(FactoryError::UnknownTrait {
                    prefix: self.error_prefix.clone(),
                    name: key.clone(),
                });
            }
        }
        draft.merge(overrides.data());
        Ok(draft)
    }

    /// Plain attributes for `name`: [`Factory::object`] without the local traits.
    pub fn attributes(&self, name: &str, overrides: &Overrides) -> Result<Map<String, Value>> {
        Ok(self.object(name, overrides)?.into_attributes())
    }

    /// An unsaved model instance built from the attributes of `name`.
    pub fn build(&self, name: &str, overrides: &Overrides) -> Result<Document> {
        let model = self.model(name)?;
        let attributes = self.attributes(name, overrides)?;
        debug!(blueprint = name, collection = %model, "build");
        self.provider.create(&model, attributes)
    }

    /// Builds and saves through the provider.
    pub async fn create(&self, name: &str, overrides: &Overrides) -> Result<Document> {
        let document = self.build(name, overrides)?;
        let saved = self.provider.save(document).await;
        match &saved {
            Ok(document) => debug!(blueprint = name, id = document.id(), "created"),
            Err(e) => warn!(blueprint = name, error = %e, "create failed"),
        }
        saved
    }

    // ------------- Bulk -------------
    // Each item is built from scratch; a count of zero yields one item.
    pub fn object_array(
        &self,
        name: &str,
        count: usize,
        overrides: &Overrides,
    ) -> Result<Vec<Draft>> {
        (0..times(count)).map(|_| self.object(name, overrides)).collect()
    }

    pub fn attributes_array(
        &self,
        name: &str,
        count: usize,
        overrides: &Overrides,
    ) -> Result<Vec<Map<String, Value>>> {
        (0..times(count))
            .map(|_| self.attributes(name, overrides))
            .collect()
    }

    pub fn build_array(
        &self,
        name: &str,
        count: usize,
        overrides: &Overrides,
    ) -> Result<Vec<Document>> {
        (0..times(count)).map(|_| self.build(name, overrides)).collect()
    }

    /// Runs `count` creates concurrently; the first failure fails the batch.
    pub async fn create_array(
        &self,
        name: &str,
        count: usize,
        overrides: &Overrides,
    ) -> Result<Vec<Document>> {
        let count = times(count);
        debug!(blueprint = name, count, "create batch");
        try_join_all((0..count).map(|_| self.create(name, overrides))).await
    }
}

impl fmt::Debug for Factory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Factory")
            .field("error_prefix", &self.error_prefix)
            .field("registry", &self.registry)
            .field("traits", &self.traits)
            .finish_non_exhaustive()
    }
}
