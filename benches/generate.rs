extern crate winmdgen;

use criterion::{criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use std::hint::black_box;
use winmdgen::prelude::*;

/// A component with `count` runtime classes, each implementing its own interface that is
/// declared after it, so every `implements` starts out as a deferred reference.
fn component(count: usize) -> Program {
    let mut types = Vec::with_capacity(count * 2);
    for index in 0..count {
        let interface = format!("Contoso.IControl{index}");
        types.push(
            TypeDeclaration::class(&format!("Contoso.Control{index}"))
                .implements(TypeReference::program(&interface))
                .member(MemberDeclaration::property("Text", TypeSig::String))
                .method(
                    MemberDeclaration::method("Resize")
                        .param("width", TypeSig::I4)
                        .param("height", TypeSig::I4),
                ),
        );
        types.push(
            TypeDeclaration::interface(&interface)
                .method(MemberDeclaration::method("Invalidate").returns(TypeSig::Boolean)),
        );
    }

    let mut program = Program::new();
    program.add_unit("Controls.cs", types);
    program
}

/// Benchmark building the tables alone and building plus serializing
fn bench_generate(c: &mut Criterion) {
    let options = ArtifactOptions::new("Contoso", "1.0.0.0");

    let mut group = c.benchmark_group("generate");
    for count in [10usize, 100, 1000] {
        let program = component(count);
        group.throughput(Throughput::Elements(count as u64 * 2));

        group.bench_with_input(BenchmarkId::new("build_tables", count), &program, |b, program| {
            b.iter(|| black_box(build_tables(black_box(program), &options).unwrap()));
        });
        group.bench_with_input(BenchmarkId::new("build_artifact", count), &program, |b, program| {
            b.iter(|| black_box(build_artifact(black_box(program), &options).unwrap()));
        });
    }
    group.finish();
}

criterion_group!(benches, bench_generate);
criterion_main!(benches);
