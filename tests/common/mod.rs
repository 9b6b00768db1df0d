#![allow(dead_code)]

use std::sync::Arc;

use fixture_factory::{Factory, FactoryOptions, MemoryProvider, Model, Overrides, Result};
use serde_json::{Map, Value};

pub fn users() -> Model {
    Model::new("users")
}

pub fn requests() -> Model {
    Model::new("requests")
}

/// A seeded factory over a memory provider the test keeps a handle on.
pub fn factory() -> (Factory, Arc<MemoryProvider>) {
    fixture_factory::logging::init_tracing();
    let memory = Arc::new(MemoryProvider::new());
    let options = FactoryOptions::default()
        .with_provider(Arc::clone(&memory))
        .with_seed(1234);
    let factory = Factory::with_options(options).expect("factory");
    (factory, memory)
}

/// The same factory with the shared fixtures already defined.
pub fn seeded_factory() -> (Factory, Arc<MemoryProvider>) {
    let (mut factory, memory) = factory();
    define_fixtures(&mut factory).expect("fixtures");
    (factory, memory)
}

pub fn define_fixtures(factory: &mut Factory) -> Result<()> {
    factory.define("with.trait", requests(), |draft, f| {
        draft.set("body", f.helpers().hex(32));
        draft.set("text", f.helpers().hex(32));
        draft.define_trait("noText", |draft, _, _| {
            draft.remove("text");
            Ok(())
        });
        draft.define_trait("replaceText", |draft, value, _| {
            draft.set("text", value.clone());
            Ok(())
        });
        Ok(())
    })?;
    factory.define("user.meta", None, |draft, f| {
        draft.set("votes", f.helpers().integer(1, 30));
        draft.set("favs", f.helpers().integer(1, 10));
        Ok(())
    })?;
    factory.define("user.comment", None, |draft, f| {
        draft.set("body", f.helpers().hex(32));
        draft.set("date", f.helpers().date());
        Ok(())
    })?;
    factory.define("user", users(), |draft, f| {
        draft.set("name", f.helpers().hex(32));
        draft.set("body", f.helpers().hex(40));
        draft.set("comments", f.attributes_array("user.comment", 3, &Overrides::new())?);
        draft.set("date", f.helpers().date());
        draft.set("hidden", false);
        draft.set("meta", f.attributes("user.meta", &Overrides::new())?);
        Ok(())
    })?;
    Ok(())
}

pub fn expect_user(attributes: &Map<String, Value>) {
    assert_eq!(attributes["name"].as_str().map(str::len), Some(32));
    assert_eq!(attributes["body"].as_str().map(str::len), Some(40));
    assert_eq!(attributes["comments"].as_array().map(Vec::len), Some(3));
    assert!(attributes["date"].is_string());
    assert_eq!(attributes["hidden"], Value::Bool(false));
    let votes = attributes["meta"]["votes"].as_i64().expect("votes");
    assert!((1..=30).contains(&votes));
    let favs = attributes["meta"]["favs"].as_i64().expect("favs");
    assert!((1..=10).contains(&favs));
}
