#![allow(missing_docs)]

use criterion::{Criterion, criterion_group, criterion_main};
use equivalence_core::json::{Field, Filter, Step, strip_fields};
use serde_json::{Value, json};
use std::hint::black_box;

/// A state document with `count` resources, shaped like `terraform show -json`.
fn state_document(count: usize) -> Value {
    let resources: Vec<Value> = (0..count)
        .map(|index| {
            json!({
                "address": format!("local_file.f[{index}]"),
                "mode": if index % 2 == 0 { "managed" } else { "data" },
                "values": {
                    "id": format!("{index:040x}"),
                    "content": "hello",
                    "tags": {"env": "prod", "index": index}
                }
            })
        })
        .collect();

    json!({
        "format_version": "1.0",
        "terraform_version": "1.9.0",
        "values": {"root_module": {"resources": resources}}
    })
}

fn benchmark_wildcard_strip(c: &mut Criterion) {
    let mut group = c.benchmark_group("wildcard_strip");

    let plain = [
        Field::parse("terraform_version"),
        Field::parse("values.root_module.resources.*.values.id"),
    ];
    let filtered = [Field::new(vec![
        Step::key("values"),
        Step::key("root_module"),
        Step::key("resources"),
        Step::wildcard().with_filter(Filter::new(["mode"], "managed")),
        Step::key("values"),
        Step::key("tags"),
    ])];

    for count in [10, 100, 1_000] {
        let document = state_document(count);

        group.bench_function(format!("plain_{count}"), |b| {
            b.iter(|| {
                let result = strip_fields(black_box(&plain), black_box(document.clone()));
                black_box(result)
            })
        });

        group.bench_function(format!("filtered_{count}"), |b| {
            b.iter(|| {
                let result = strip_fields(black_box(&filtered), black_box(document.clone()));
                black_box(result)
            })
        });
    }

    group.finish();
}

criterion_group!(benches, benchmark_wildcard_strip);
criterion_main!(benches);
