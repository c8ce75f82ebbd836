//! Benchmarks for telar core operations.
//!
//! Run with: cargo bench
//!
//! Results include 95% confidence intervals via Criterion.

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use serde_yaml_ng::Value;
use std::collections::HashMap;
use telar::builders::record::mapping;
use telar::core::injector::{Injector, Output};
use telar::core::{emitter, resolver};

fn chain_injector(n: usize) -> Injector {
    let mut injector = Injector::new(HashMap::new());
    for i in 0..n {
        let key = format!("node-{i:04}");
        let deps_owned: Vec<String> = if i == 0 {
            Vec::new()
        } else {
            vec![format!("node-{:04}", i - 1)]
        };
        let deps: Vec<&str> = deps_owned.iter().map(String::as_str).collect();
        let manifest = mapping(vec![("step", Value::from(i as u64))]);
        injector = injector
            .rule(&key, &deps, move |_: &[Value]| {
                Ok(Output::new(vec![manifest.clone()], Value::Null))
            })
            .unwrap();
    }
    injector
}

fn diamond_injector(width: usize) -> Injector {
    let mut injector = Injector::new(HashMap::new())
        .rule("base", &[], |_: &[Value]| {
            Ok(Output::new(
                vec![mapping(vec![("kind", "Base".into())])],
                Value::Null,
            ))
        })
        .unwrap();

    let mut mids = Vec::with_capacity(width);
    for i in 0..width {
        let key = format!("mid-{i:04}");
        let manifest = mapping(vec![("mid", Value::from(i as u64))]);
        injector = injector
            .rule(&key, &["base"], move |_: &[Value]| {
                Ok(Output::new(vec![manifest.clone()], Value::Null))
            })
            .unwrap();
        mids.push(key);
    }

    let mid_refs: Vec<&str> = mids.iter().map(String::as_str).collect();
    injector
        .rule("top", &mid_refs, |_: &[Value]| {
            Ok(Output::new(
                vec![mapping(vec![("kind", "Top".into())])],
                Value::Null,
            ))
        })
        .unwrap()
}

fn bench_resolve_chain(c: &mut Criterion) {
    let mut group = c.benchmark_group("resolve_chain");
    for n in [10, 50, 100] {
        let injector = chain_injector(n);
        let top = format!("node-{:04}", n - 1);
        group.bench_with_input(BenchmarkId::from_parameter(n), &injector, |b, injector| {
            b.iter(|| {
                let resolved = resolver::get_resource(black_box(injector), &top).unwrap();
                black_box(resolved);
            });
        });
    }
    group.finish();
}

fn bench_resolve_diamond(c: &mut Criterion) {
    let mut group = c.benchmark_group("resolve_diamond");
    for width in [4, 16, 64] {
        let injector = diamond_injector(width);
        group.bench_with_input(
            BenchmarkId::from_parameter(width),
            &injector,
            |b, injector| {
                b.iter(|| {
                    let resolved = resolver::get_resource(black_box(injector), "top").unwrap();
                    black_box(resolved);
                });
            },
        );
    }
    group.finish();
}

fn bench_emit_stream(c: &mut Criterion) {
    let injector = chain_injector(100);
    let resolved = resolver::get_resource(&injector, "node-0099").unwrap();

    c.bench_function("emit_yaml_stream_100", |b| {
        b.iter(|| {
            let stream = emitter::to_yaml_stream(black_box(&resolved.manifests)).unwrap();
            black_box(emitter::stream_digest(&stream));
        });
    });
}

criterion_group!(
    benches,
    bench_resolve_chain,
    bench_resolve_diamond,
    bench_emit_stream
);
criterion_main!(benches);
