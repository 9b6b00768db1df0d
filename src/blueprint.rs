//! Blueprint definitions and the registry that owns them.
//!
//! A blueprint is registered under a name that may carry its parent, written
//! `"child > parent"`. Only one parent per name is allowed; longer chains are
//! built by defining each link separately, and are then unbounded in depth.

use std::collections::{BTreeMap, HashSet};
use std::fmt;
use std::sync::Arc;

use crate::draft::Draft;
use crate::error::{FactoryError, Result};
use crate::factory::Factory;
use crate::provider::Model;

/// Fills a fresh draft; receives the factory so it can build nested fixtures.
pub type Builder = Arc<dyn Fn(&mut Draft, &Factory) -> Result<()> + Send + Sync>;

/// Separates a blueprint name from its parent's name.
pub const PARENT_SEPARATOR: char = '>';

// ------------- Blueprint -------------
pub struct Blueprint {
    name: String,
    model: Option<Model>,
    parent: Option<String>,
    builder: Builder,
}

impl Blueprint {
    pub fn name(&self) -> &str {
        &self.name
    }
    pub fn model(&self) -> Option<&Model> {
        self.model.as_ref()
    }
    pub fn parent(&self) -> Option<&str> {
        self.parent.as_deref()
    }
    pub fn builder(&self) -> &Builder {
        &self.builder
    }
    /// Abstract blueprints have no model and can only produce attributes.
    pub fn is_abstract(&self) -> bool {
        self.model.is_none()
    }
}

impl fmt::Debug for Blueprint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Blueprint")
            .field("name", &self.name)
            .field("model", &self.model)
            .field("parent", &self.parent)
            .finish_non_exhaustive()
    }
}

// ------------- Names -------------
/// Anything that can name one blueprint or a list of aliases.
pub trait IntoNames {
    fn into_names(self) -> Vec<String>;
}

impl IntoNames for &str {
    fn into_names(self) -> Vec<String> {
        vec![self.to_owned()]
    }
}
impl IntoNames for String {
    fn into_names(self) -> Vec<String> {
        vec![self]
    }
}
impl IntoNames for &String {
    fn into_names(self) -> Vec<String> {
        vec![self.clone()]
    }
}
impl<S: AsRef<str>> IntoNames for Vec<S> {
    fn into_names(self) -> Vec<String> {
        self.iter().map(|s| s.as_ref().to_owned()).collect()
    }
}
impl<S: AsRef<str>> IntoNames for &[S] {
    fn into_names(self) -> Vec<String> {
        self.iter().map(|s| s.as_ref().to_owned()).collect()
    }
}
impl<S: AsRef<str>, const N: usize> IntoNames for [S; N] {
    fn into_names(self) -> Vec<String> {
        self.iter().map(|s| s.as_ref().to_owned()).collect()
    }
}

/// Splits `"name > parent"` into its trimmed parts.
fn parse_name(raw: &str) -> std::result::Result<(String, Option<String>), String> {
    let segments: Vec<&str> = raw.split(PARENT_SEPARATOR).map(str::trim).collect();
    match segments.as_slice() {
        [name] if !name.is_empty() => Ok(((*name).to_owned(), None)),
        [name, parent] if !name.is_empty() && !parent.is_empty() => {
            Ok(((*name).to_owned(), Some((*parent).to_owned())))
        }
        [_, _] | [_] => Err(format!(
            "'{raw}' definition requires both a name and, after '>', a parent name"
        )),
        _ => Err(format!(
            "{raw} definition has multiple inheritance. Use only one parent."
        )),
    }
}

// ------------- Registry -------------
#[derive(Default)]
pub struct BlueprintRegistry {
    kept: BTreeMap<String, Arc<Blueprint>>,
}

impl BlueprintRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers every alias in `names` with the same model and builder.
    ///
    /// All aliases are validated before any is kept, so a failure leaves the
    /// registry as it was. An alias may name a parent registered earlier in
    /// the same list.
    pub fn register(
        &mut self,
        names: Vec<String>,
        model: Option<Model>,
        builder: Builder,
        prefix: &str,
    ) -> Result<Vec<Arc<Blueprint>>> {
        let invalid = |reason: String| FactoryError::InvalidDefinition {
            prefix: prefix.to_owned(),
            reason,
        };
        if names.is_empty() {
            return Err(invalid(
                "Definition requires a blueprint name to be specified".to_owned(),
            ));
        }
        let mut staged: Vec<Blueprint> = Vec::with_capacity(names.len());
        let mut seen: HashSet<String> = HashSet::new();
        for raw in &names {
            let (name, parent) = parse_name(raw).map_err(invalid)?;
            if let Some(parent) = &parent {
                if !self.kept.contains_key(parent) && !seen.contains(parent) {
                    return Err(invalid(format!("{parent} parent is not yet defined")));
                }
            }
            if self.kept.contains_key(&name) || !seen.insert(name.clone()) {
                return Err(invalid(format!("{name} is already defined")));
            }
            staged.push(Blueprint {
                name,
                model: model.clone(),
                parent,
                builder: Arc::clone(&builder),
            });
        }
        Ok(staged
            .into_iter()
            .map(|blueprint| {
                let blueprint = Arc::new(blueprint);
                self.kept
                    .insert(blueprint.name.clone(), Arc::clone(&blueprint));
                blueprint
            })
            .collect())
    }
    pub fn get(&self, name: &str) -> Option<Arc<Blueprint>> {
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
    pub fn clear(&mut self) {
        self.kept.clear();
    }
}

impl fmt::Debug for BlueprintRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(self.kept.values()).finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn plain_name() {
        assert_eq!(parse_name("user"), Ok(("user".to_owned(), None)));
    }

    #[test]
    fn name_with_parent_is_trimmed() {
        assert_eq!(
            parse_name("  admin >user  "),
            Ok(("admin".to_owned(), Some("user".to_owned())))
        );
    }

    #[test]
    fn chains_are_rejected() {
        let reason = parse_name("model.asd > bad > me").unwrap_err();
        assert!(reason.contains("multiple inheritance"));
    }

    #[test]
    fn empty_segments_are_rejected() {
        assert!(parse_name("").is_err());
        assert!(parse_name("   ").is_err());
        assert!(parse_name("child >").is_err());
        assert!(parse_name("> parent").is_err());
    }

    #[test]
    fn aliases_from_many_shapes() {
        assert_eq!("a".into_names(), vec!["a"]);
        assert_eq!(vec!["a", "b"].into_names(), vec!["a", "b"]);
        assert_eq!(["a", "b", "c"].into_names().len(), 3);
        let owned = vec![String::from("x")];
        assert_eq!(owned.as_slice().into_names(), vec!["x"]);
    }
}
