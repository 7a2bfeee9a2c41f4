//! Manifest parsing benchmark.

use camino::Utf8Path;
use criterion::{black_box, criterion_group, criterion_main, Criterion};
use reqlint_manifest::Manifest;

fn synthetic_manifest(packages: usize) -> String {
    let mut content = String::from("# synthetic manifest\n");
    for i in 0..packages {
        content.push_str(&format!("package-{i}>=1.{}.0, <2.0.0\n", i % 50));
        if i % 7 == 0 {
            content.push_str(&format!(
                "extra-{i}==0.{}.1; python_version >= '3.7'\n",
                i % 20
            ));
        }
    }
    content
}

fn bench_parse(c: &mut Criterion) {
    let small = synthetic_manifest(50);
    let large = synthetic_manifest(2000);
    let source = Utf8Path::new("requirements.txt");

    c.bench_function("parse_manifest_50", |b| {
        b.iter(|| Manifest::parse_str(black_box(&small), source))
    });

    c.bench_function("parse_manifest_2000", |b| {
        b.iter(|| Manifest::parse_str(black_box(&large), source))
    });
}

criterion_group!(benches, bench_parse);
criterion_main!(benches);
