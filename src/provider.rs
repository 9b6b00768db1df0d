//! The persistence boundary.
//!
//! The factory only ever talks to a [`Provider`]: it asks it to construct a
//! [`Document`] from an attribute set, to save one, and to remove documents
//! matching a [`Filter`]. Which store sits behind the trait is of no concern
//! to the factory; see [`crate::memory`] and [`crate::store`] for the two
//! provided implementations.

use std::fmt;
use std::sync::Arc;

use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde_json::{Map, Value};

use crate::error::Result;

/// Field name under which a saved document exposes its identifier.
pub const ID_FIELD: &str = "_id";

// ------------- Model -------------
/// Opaque handle to a persistable type, identified by its collection name.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Model {
    collection: String,
}

impl Model {
    pub fn new(collection: impl Into<String>) -> Self {
        Self { collection: collection.into() }
    }
    pub fn collection(&self) -> &str {
        &self.collection
    }
}

impl fmt::Display for Model {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.collection)
    }
}

// ------------- Document -------------
/// A model instance: built from attributes, identified once saved.
#[derive(Debug, Clone, PartialEq)]
pub struct Document {
    model: Model,
    id: Option<u64>,
    fields: Map<String, Value>,
}

impl Document {
    pub fn new(model: Model, fields: Map<String, Value>) -> Self {
        Self { model, id: None, fields }
    }
    pub fn model(&self) -> &Model {
        &self.model
    }
    pub fn id(&self) -> Option<u64> {
        self.id
    }
    /// Providers call this when they persist a document for the first time.
    pub fn assign_id(&mut self, id: u64) {
        self.id = Some(id);
    }
    pub fn is_saved(&self) -> bool {
        self.id.is_some()
    }
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.fields.get(key)
    }
    pub fn fields(&self) -> &Map<String, Value> {
        &self.fields
    }
    pub fn fields_mut(&mut self) -> &mut Map<String, Value> {
        &mut self.fields
    }
    pub fn into_fields(self) -> Map<String, Value> {
        self.fields
    }
    /// The fields as a JSON object, with `_id` added once the document is saved.
    pub fn to_value(&self) -> Value {
        let mut object = self.fields.clone();
        if let Some(id) = self.id {
            object.insert(ID_FIELD.to_owned(), Value::from(id));
        }
        Value::Object(object)
    }
    /// Reads the document into a caller supplied type.
    pub fn deserialize<T: DeserializeOwned>(&self) -> Result<T> {
        Ok(serde_json::from_value(self.to_value())?)
    }
}

// ------------- Filter -------------
/// Equality conditions on top level fields; `_id` matches the document identifier.
/// An empty filter matches every document.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Filter {
    conditions: Map<String, Value>,
}

impl Filter {
    pub fn new() -> Self {
        Self::default()
    }
    pub fn eq(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.conditions.insert(key.into(), value.into());
        self
    }
    pub fn by_id(id: u64) -> Self {
        Self::new().eq(ID_FIELD, id)
    }
    pub fn is_empty(&self) -> bool {
        self.conditions.is_empty()
    }
    pub fn conditions(&self) -> &Map<String, Value> {
        &self.conditions
    }
    pub fn matches(&self, document: &Document) -> bool {
        self.conditions.iter().all(|(key, expected)| {
            if key == ID_FIELD {
                document.id().map(Value::from).as_ref() == Some(expected)
            } else {
                document.fields().get(key) == Some(expected)
            }
        })
    }
}

impl From<Map<String, Value>> for Filter {
    fn from(conditions: Map<String, Value>) -> Self {
        Self { conditions }
    }
}

/// Objects become conditions, anything else is the empty filter.
impl From<Value> for Filter {
    fn from(value: Value) -> Self {
        match value {
            Value::Object(conditions) => Self { conditions },
            _ => Self::default(),
        }
    }
}

// ------------- Provider -------------
/// What the factory needs from a persistence layer.
#[async_trait]
pub trait Provider: Send + Sync {
    /// Constructs an instance of `model` from `attributes` without persisting it.
    fn create(&self, model: &Model, attributes: Map<String, Value>) -> Result<Document>;

    /// Persists the document, resolving with the stored version (identifier assigned).
    async fn save(&self, document: Document) -> Result<Document>;

    /// Deletes every document of `model` matching `filter`, returning how many went.
    async fn remove(&self, model: &Model, filter: &Filter) -> Result<u64>;
}

/// Lets a caller keep a handle on the provider it gave to a factory.
#[async_trait]
impl<P: Provider + ?Sized> Provider for Arc<P> {
    fn create(&self, model: &Model, attributes: Map<String, Value>) -> Result<Document> {
        (**self).create(model, attributes)
    }

    async fn save(&self, document: Document) -> Result<Document> {
        (**self).save(document).await
    }

    async fn remove(&self, model: &Model, filter: &Filter) -> Result<u64> {
        (**self).remove(model, filter).await
    }
}
