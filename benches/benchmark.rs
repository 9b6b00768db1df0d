use std::hint::black_box;

use criterion::{Criterion, criterion_group, criterion_main};
use fixture_factory::merge::merge_into;
use fixture_factory::{Factory, FactoryOptions, MemoryProvider, Model, Overrides};
use serde_json::{Map, Value, json};

fn factory() -> Factory {
    let options = FactoryOptions::default()
        .with_provider(MemoryProvider::new())
        .with_seed(42);
    let mut factory = Factory::with_options(options).expect("factory");
    factory
        .define("comment", None, |d, f| {
            d.set("body", f.helpers().hex(32));
            d.set("date", f.helpers().date());
            Ok(())
        })
        .expect("comment");
    factory
        .define("person", None, |d, f| {
            d.set("name", f.helpers().hex(16));
            d.set("age", f.helpers().integer(18, 90));
            Ok(())
        })
        .expect("person");
    factory
        .define("user > person", Model::new("users"), |d, f| {
            d.set("comments", f.attributes_array("comment", 10, &Overrides::new())?);
            d.set("meta", json!({"votes": f.helpers().integer(1, 30)}));
            d.define_trait("silence", |d, _, _| {
                d.set("comments", Vec::<Value>::new());
                Ok(())
            });
            Ok(())
        })
        .expect("user");
    factory
}

fn nested(depth: usize, width: usize) -> Value {
    if depth == 0 {
        return json!(depth);
    }
    let mut object = Map::new();
    for i in 0..width {
        object.insert(format!("k{i}"), nested(depth - 1, width));
    }
    Value::Object(object)
}

pub fn criterion_benchmark(c: &mut Criterion) {
    let f = factory();
    let plain = Overrides::new();
    c.bench_function("attributes flat", |b| {
        b.iter(|| f.attributes(black_box("person"), &plain))
    });
    c.bench_function("attributes inherited and nested", |b| {
        b.iter(|| f.attributes(black_box("user"), &plain))
    });
    let traited = Overrides::new()
        .with_trait("silence", true)
        .with_trait("omit", json!(["age"]))
        .with_data(json!({"meta": {"votes": 1}}));
    c.bench_function("attributes with traits and data", |b| {
        b.iter(|| f.attributes(black_box("user"), &traited))
    });
    c.bench_function("attributes array 100", |b| {
        b.iter(|| f.attributes_array(black_box("person"), 100, &plain))
    });

    let source = nested(3, 8);
    c.bench_function("merge 3 deep x 8 wide", |b| {
        b.iter(|| {
            let mut target = Map::new();
            merge_into(&mut target, black_box(&source));
            merge_into(&mut target, black_box(&source));
            target
        })
    });
}

criterion_group!(benches, criterion_benchmark);
criterion_main!(benches);
