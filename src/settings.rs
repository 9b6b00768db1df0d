//! Factory configuration read with the `config` crate.
//!
//! Sources, later ones winning:
//! * built-in defaults;
//! * an optional file (any format `config` recognizes by extension);
//! * environment variables prefixed with `FIXTURE_`, nested keys joined by
//!   `__`, e.g. `FIXTURE_ERROR_PREFIX`, `FIXTURE_SEED`, `FIXTURE_STORE__PATH`.

use std::sync::Arc;

use config::{Config, Environment, File};
use serde::Deserialize;

use crate::error::Result;
use crate::factory::{DEFAULT_ERROR_PREFIX, Factory, FactoryOptions};
use crate::store::DocumentStore;

pub const ENV_PREFIX: &str = "FIXTURE";

/// `FIXTURE_*` variables, nested keys joined by `__`, numbers parsed.
pub fn environment() -> Environment {
    Environment::with_prefix(ENV_PREFIX)
        .prefix_separator("_")
        .separator("__")
        .try_parsing(true)
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub error_prefix: String,
    pub seed: Option<u64>,
    pub store: StoreSettings,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct StoreSettings {
    /// Database file for the document store; in memory when absent.
    pub path: Option<String>,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            error_prefix: DEFAULT_ERROR_PREFIX.to_owned(),
            seed: None,
            store: StoreSettings::default(),
        }
    }
}

impl Settings {
    /// Reads `file` (if given) and the process environment.
    pub fn load(file: Option<&str>) -> Result<Self> {
        Self::load_with(file, environment())
    }

    /// Same as [`Settings::load`] with an explicit environment source.
    pub fn load_with(file: Option<&str>, environment: Environment) -> Result<Self> {
        let mut builder = Config::builder();
        if let Some(file) = file {
            builder = builder.add_source(File::with_name(file).required(false));
        }
        let settings = builder
            .add_source(environment)
            .build()?
            .try_deserialize()?;
        Ok(settings)
    }

    /// Opens the configured store and turns the settings into factory options.
    pub fn into_options(self) -> Result<FactoryOptions> {
        let store = match &self.store.path {
            Some(path) => DocumentStore::open(path)?,
            None => DocumentStore::open_in_memory()?,
        };
        Ok(FactoryOptions {
            error_prefix: self.error_prefix,
            provider: Some(Arc::new(store)),
            seed: self.seed,
        })
    }

    pub fn into_factory(self) -> Result<Factory> {
        Factory::with_options(self.into_options()?)
    }
}
