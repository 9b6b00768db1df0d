mod common;

use fixture_factory::{Factory, FactoryError, FactoryOptions, MemoryProvider, Overrides};
use serde_json::json;

use common::{factory, users};

fn assert_invalid(result: fixture_factory::Result<()>, fragment: &str) {
    match result {
        Err(FactoryError::InvalidDefinition { reason, .. }) => {
            assert!(reason.contains(fragment), "unexpected reason: {reason}")
        }
        other => panic!("expected an invalid definition, got {other:?}"),
    }
}

#[test]
fn redefinition_fails_and_keeps_the_original() {
    let (mut f, _) = factory();
    f.define("redefine.me", None, |d, _| {
        d.set("version", 1);
        Ok(())
    })
    .unwrap();
    let second = f.define("redefine.me", users(), |d, _| {
        d.set("version", 2);
        Ok(())
    });
    assert_invalid(second, "redefine.me is already defined");
    let attributes = f.attributes("redefine.me", &Overrides::new()).unwrap();
    assert_eq!(attributes["version"], json!(1));
    assert!(f.blueprint("redefine.me").unwrap().is_abstract());
}

#[test]
fn multiple_inheritance_is_rejected() {
    let (mut f, _) = factory();
    let result = f.define("model.asd > bad > me", None, |_, _| Ok(()));
    assert_invalid(result, "multiple inheritance");
    assert!(f.blueprint_names().is_empty());
}

#[test]
fn parent_must_exist() {
    let (mut f, _) = factory();
    let result = f.define("model.asd > bad", None, |_, _| Ok(()));
    assert_invalid(result, "bad parent is not yet defined");
    assert!(!f.is_defined("model.asd"));
}

#[test]
fn child_name_already_taken() {
    let (mut f, _) = factory();
    f.define("parent123", None, |_, _| Ok(())).unwrap();
    f.define("child123", None, |_, _| Ok(())).unwrap();
    let result = f.define("child123> parent123", None, |_, _| Ok(()));
    assert_invalid(result, "child123 is already defined");
}

#[test]
fn names_are_trimmed_around_the_separator() {
    let (mut f, _) = factory();
    f.define("base", None, |_, _| Ok(())).unwrap();
    f.define("  derived   >   base ", None, |_, _| Ok(())).unwrap();
    let derived = f.blueprint("derived").unwrap();
    assert_eq!(derived.parent(), Some("base"));
}

#[test]
fn aliases_share_model_and_builder() {
    let (mut f, _) = factory();
    f.define(["alias.model", "alias.model.2"], users(), |d, _| {
        d.set("kind", "aliased");
        Ok(())
    })
    .unwrap();
    for name in ["alias.model", "alias.model.2"] {
        assert_eq!(f.model(name).unwrap(), users());
        assert_eq!(
            f.attributes(name, &Overrides::new()).unwrap()["kind"],
            json!("aliased")
        );
    }
}

#[test]
fn duplicate_aliases_register_nothing() {
    let (mut f, _) = factory();
    let result = f.define(vec!["alias.123", "alias.123"], None, |_, _| Ok(()));
    assert_invalid(result, "alias.123 is already defined");
    assert!(!f.is_defined("alias.123"));
}

#[test]
fn failing_alias_leaves_earlier_aliases_unregistered() {
    let (mut f, _) = factory();
    f.define("taken", None, |_, _| Ok(())).unwrap();
    let result = f.define(vec!["fresh", "taken"], None, |_, _| Ok(()));
    assert_invalid(result, "taken is already defined");
    assert!(!f.is_defined("fresh"));
    assert_eq!(f.blueprint_names(), vec!["taken".to_string()]);
}

#[test]
fn alias_may_name_an_earlier_alias_as_parent() {
    let (mut f, _) = factory();
    f.define(vec!["first", "second > first"], None, |d, _| {
        d.set("n", 1);
        Ok(())
    })
    .unwrap();
    assert_eq!(f.blueprint("second").unwrap().parent(), Some("first"));
}

#[test]
fn name_is_required() {
    let (mut f, _) = factory();
    assert_invalid(
        f.define(Vec::<String>::new(), None, |_, _| Ok(())),
        "requires a blueprint name",
    );
    assert_invalid(f.define("   ", None, |_, _| Ok(())), "requires both a name");
    assert_invalid(f.define("orphan >", None, |_, _| Ok(())), "requires both a name");
}

#[test]
fn definition_without_model_is_abstract() {
    let (mut f, _) = factory();
    f.define("no.model", None, |d, _| {
        d.set("id", 1);
        Ok(())
    })
    .unwrap();
    let blueprint = f.blueprint("no.model").unwrap();
    assert!(blueprint.is_abstract());
    assert_eq!(blueprint.model(), None);
}

#[test]
fn reset_registry_forgets_everything() {
    let (mut f, _) = factory();
    f.define("test", None, |_, _| Ok(())).unwrap();
    f.reset_registry();
    assert!(f.blueprint_names().is_empty());
    // the name is free again
    f.define("test", None, |_, _| Ok(())).unwrap();
}

#[test]
fn errors_carry_the_configured_prefix() {
    let options = FactoryOptions::default()
        .with_error_prefix("fixtures: ")
        .with_provider(MemoryProvider::new());
    let mut f = Factory::with_options(options).unwrap();
    assert_eq!(f.error_prefix(), "fixtures: ");
    f.define("dup", None, |_, _| Ok(())).unwrap();
    let err = f.define("dup", None, |_, _| Ok(())).unwrap_err();
    assert_eq!(err.to_string(), "fixtures: dup is already defined");
    let err = f.attributes("nope", &Overrides::new()).unwrap_err();
    assert_eq!(err.to_string(), "fixtures: nope factory name is not defined");
}

#[test]
fn default_prefix_matches_the_classic_one() {
    let (f, _) = factory();
    let err = f.model("missing").unwrap_err();
    assert_eq!(err.to_string(), "Mongo factory missing factory name is not defined");
}

#[test]
fn independent_factories_do_not_interfere() {
    let (mut a, _) = factory();
    let (mut b, _) = factory();
    a.define("shared.name", None, |_, _| Ok(())).unwrap();
    b.define("shared.name", None, |_, _| Ok(())).unwrap();
    a.register_trait("only.in.a", |_, _| Ok(()));
    assert!(a.trait_names().contains(&"only.in.a".to_string()));
    assert_eq!(b.trait_names(), vec!["omit".to_string()]);
}
