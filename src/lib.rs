//! Fixture factory: blueprints for generating test data.
//!
//! A *blueprint* is a named recipe: an optional [`Model`] handle, an optional
//! parent blueprint and a builder closure that fills in a [`Draft`]. From a
//! blueprint the [`Factory`] produces:
//! * a [`Draft`] with its local traits still attached ([`Factory::object`]);
//! * a plain attribute map ([`Factory::attributes`]);
//! * an unsaved [`Document`] ([`Factory::build`]);
//! * a persisted [`Document`] ([`Factory::create`]).
//!
//! Each of these has a bulk form (`*_array`) that repeats the operation.
//!
//! ## Inheritance
//! Names may carry a parent, `"admin > user"`. The parent is built first and
//! its fields and local traits become the starting point of the child. One
//! parent per definition; deeper chains are built one link at a time.
//!
//! ## Traits
//! Callers pass traits in [`Overrides`]. A trait name is looked up among the
//! factory's *global* traits first (the built-in `omit` deletes keys), then
//! among the *local* traits the builder attached to the draft. Override data
//! is deep merged last: objects merge key by key, arrays are replaced.
//!
//! ## Persistence
//! Everything past attribute generation goes through a [`Provider`]. Two are
//! included: [`MemoryProvider`] and the SQLite backed [`DocumentStore`], the
//! latter being the default.
//!
//! ## Quick Start
//! ```
//! use fixture_factory::{Factory, MemoryProvider, Model, Overrides};
//! use serde_json::json;
//!
//! let mut factory = Factory::with_provider(MemoryProvider::new());
//! factory.define("user", Model::new("users"), |draft, f| {
//!     draft.set("name", f.helpers().hex(32));
//!     draft.set("hidden", false);
//!     draft.define_trait("hide", |draft, _, _| {
//!         draft.set("hidden", true);
//!         Ok(())
//!     });
//!     Ok(())
//! }).unwrap();
//!
//! let overrides = Overrides::new().with_trait("hide", json!(true));
//! let user = factory.build("user", &overrides).unwrap();
//! assert!(!user.is_saved());
//! assert_eq!(user.get("hidden"), Some(&json!(true)));
//! ```

pub mod blueprint;
pub mod draft;
pub mod error;
pub mod factory;
pub mod helpers;
pub mod logging;
pub mod memory;
pub mod merge;
pub mod provider;
pub mod settings;
pub mod store;
pub mod traits;

pub use blueprint::{Blueprint, IntoNames};
pub use draft::Draft;
pub use error::{FactoryError, Result};
pub use factory::{Factory, FactoryOptions, Overrides};
pub use memory::MemoryProvider;
pub use provider::{Document, Filter, Model, Provider};
pub use settings::Settings;
pub use store::DocumentStore;
