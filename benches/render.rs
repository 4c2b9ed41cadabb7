#[macro_use]
extern crate criterion;

use criterion::Criterion;
use mandelplane::{escape_time, Plane, Scheme};
use num::Complex;

fn escape_benchmark(c: &mut Criterion) {
    c.bench_function("escape_time boundary point", |b| {
        b.iter(|| escape_time(Complex::new(-0.7435, 0.1314), 1000))
    });
    c.bench_function("escape_time interior point", |b| {
        b.iter(|| escape_time(Complex::new(-0.1, 0.1), 1000))
    });
}

fn plane_benchmark(c: &mut Criterion) {
    for scheme in Scheme::all() {
        let mut plane = Plane::new(320, 240).unwrap();
        c.bench_function(&format!("compute 320x240 {}", scheme), move |b| {
            b.iter(|| plane.compute_scheme(*scheme).unwrap())
        });
    }
}

criterion_group!(benches, escape_benchmark, plane_benchmark);
criterion_main!(benches);
