//! Mogrifier 벤치마크
//!
//! 매칭/비매칭 경로의 mogrify 성능 측정

use criterion::{criterion_group, criterion_main, BenchmarkId, Criterion};
use statsd_mogrifier::mogrifier::{MogrifierSet, MogrifierSpec};
use statsd_mogrifier::statsd::rewrite_line;

fn build_set(filler: usize) -> MogrifierSet {
    let mut specs: Vec<MogrifierSpec> = (0..filler)
        .map(|i| MogrifierSpec::new(format!(r"^unused_{}\.(\d+)$", i), "unused"))
        .collect();
    specs.push(
        MogrifierSpec::new(r"^jobs\.(\d+)\.(\w+)$", "jobs.$2")
            .with_tag("job_id", "$1")
            .with_tag("source", "legacy"),
    );
    MogrifierSet::build(specs).expect("benchmark mogrifiers must compile")
}

fn benchmark_mogrify(c: &mut Criterion) {
    let mut group = c.benchmark_group("mogrify");

    for filler in [0usize, 10, 100] {
        let set = build_set(filler);

        group.bench_with_input(BenchmarkId::new("hit", filler), &set, |b, set| {
            b.iter(|| set.mogrify("jobs.12345.duration"))
        });

        group.bench_with_input(BenchmarkId::new("miss", filler), &set, |b, set| {
            b.iter(|| set.mogrify("http.requests.total"))
        });
    }

    group.finish();
}

fn benchmark_rewrite_line(c: &mut Criterion) {
    let set = build_set(10);

    c.bench_function("rewrite_line", |b| {
        b.iter(|| rewrite_line(&set, "jobs.12345.duration:250|ms|@0.5|#env:prod"))
    });
}

criterion_group!(benches, benchmark_mogrify, benchmark_rewrite_line);
criterion_main!(benches);
