//! # Resolver Benchmarks
//!
//! Struct acceptance over dependency chains and fan-outs.
//!
//! Run with: `cargo bench -p ferry-core`

use criterion::{BenchmarkId, Criterion, criterion_group, criterion_main};
use ferry_core::{
    Constructor, ResolutionSession, Resolver, Struct, StructResolver, Variable, simple_var_type,
};
use std::collections::BTreeMap;
use std::hint::black_box;
use std::path::Path;

fn accept_ints(name: &str, structs: &mut dyn StructResolver) -> bool {
    name == "int" || structs.resolve(name)
}

/// A movable struct with the given field types.
fn movable(name: &str, field_types: &[String]) -> Struct {
    let mut record = Struct::new(name, "/bench/types.h", 1);
    for (i, ty) in field_types.iter().enumerate() {
        record
            .fields
            .push(Variable::new(format!("f{}", i), ty.clone(), ty.clone()));
    }
    record.constructors.push(Constructor {
        params: vec![Variable::new("other", format!("{} &&", name), name)],
        definition_line: 2,
    });
    record.has_move_constructor = true;
    record
}

/// `S0 { S1 }`, `S1 { S2 }`, … ending in `int`.
fn chain(size: usize) -> BTreeMap<String, Struct> {
    (0..size)
        .map(|i| {
            let field = if i + 1 == size {
                "int".to_string()
            } else {
                format!("S{}", i + 1)
            };
            let name = format!("S{}", i);
            (name.clone(), movable(&name, &[field]))
        })
        .collect()
}

/// `Root` holds one field of each leaf struct.
fn fan_out(size: usize) -> BTreeMap<String, Struct> {
    let leaves: Vec<String> = (0..size).map(|i| format!("Leaf{}", i)).collect();
    let mut structs: BTreeMap<String, Struct> = leaves
        .iter()
        .map(|name| (name.clone(), movable(name, &["int".to_string()])))
        .collect();
    structs.insert("Root".to_string(), movable("Root", &leaves));
    structs
}

fn verify(structs: &BTreeMap<String, Struct>, name: &str) -> bool {
    let mut session = ResolutionSession::new();
    let mut resolver = Resolver::new(&mut session, structs, &accept_ints, Path::new("/bench/a.cpp"));
    resolver.verify_struct(name)
}

// =============================================================================
// BENCHMARKS
// =============================================================================

fn bench_chain(c: &mut Criterion) {
    let mut group = c.benchmark_group("resolve_chain");

    for size in [10, 100, 1000].iter() {
        let structs = chain(*size);
        group.bench_with_input(BenchmarkId::from_parameter(size), size, |b, _| {
            b.iter(|| black_box(verify(&structs, "S0")));
        });
    }

    group.finish();
}

fn bench_fan_out(c: &mut Criterion) {
    let mut group = c.benchmark_group("resolve_fan_out");

    for size in [10, 100, 1000].iter() {
        let structs = fan_out(*size);
        group.bench_with_input(BenchmarkId::from_parameter(size), size, |b, _| {
            b.iter(|| black_box(verify(&structs, "Root")));
        });
    }

    group.finish();
}

fn bench_simple_var_type(c: &mut Criterion) {
    c.bench_function("simple_var_type", |b| {
        b.iter(|| {
            black_box(simple_var_type(black_box(
                "const std::map<std::string, std::vector<const ns::Point *>> &",
            )))
        });
    });
}

criterion_group!(benches, bench_chain, bench_fan_out, bench_simple_var_type);
criterion_main!(benches);
