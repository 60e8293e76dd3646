use criterion::{black_box, criterion_group, criterion_main, Criterion};
use dashvar::{Interpolator, StateSnapshot, VariableDependencySet, VariableStore};

fn panel(paths: usize) -> StateSnapshot {
    let mut snap = StateSnapshot::new();
    for i in 0..paths {
        snap = snap.set(
            format!("p{i}"),
            format!(r#"sum(rate(m{i}{{env="$env",host=~"$host"}}[$__interval])) by ($group{i})"#),
        );
    }
    snap
}

fn tracked(paths: usize) -> Vec<String> {
    (0..paths).map(|i| format!("p{i}")).collect()
}

fn bench_scan(c: &mut Criterion) {
    let small = panel(2).shared();
    let large = panel(16).shared();

    let mut g = c.benchmark_group("dependency_scan");

    g.bench_function("first_scan_2paths", |b| {
        b.iter(|| {
            let mut deps = VariableDependencySet::new(tracked(2));
            deps.names(black_box(&small)).len()
        })
    });
    g.bench_function("first_scan_16paths", |b| {
        b.iter(|| {
            let mut deps = VariableDependencySet::new(tracked(16));
            deps.names(black_box(&large)).len()
        })
    });

    let mut warm = VariableDependencySet::new(tracked(16));
    warm.names(&large);
    g.bench_function("cache_hit_same_snapshot", |b| {
        b.iter(|| warm.names(black_box(&large)).len())
    });

    let base = panel(16);
    let mut derived = VariableDependencySet::new(tracked(16));
    derived.names(&base.clone().shared());
    g.bench_function("derived_snapshot_no_rescan", |b| {
        b.iter(|| {
            let next = base.with("title", "renamed").shared();
            derived.names(black_box(&next)).len()
        })
    });

    let mut edited = VariableDependencySet::new(tracked(16));
    edited.names(&base.clone().shared());
    g.bench_function("rescan_after_edit", |b| {
        b.iter(|| {
            let next = base.with("p0", r#"up{env="$env"}"#).shared();
            edited.names(black_box(&next)).len()
        })
    });

    g.finish();
}

fn bench_interpolate(c: &mut Criterion) {
    let mut vars = VariableStore::new();
    vars.set("env", "prod");
    vars.set("host", vec!["web-1", "web-2", "web-3"]);
    vars.set("__interval", "1m");
    let interp = Interpolator::new(&vars);

    let query = r#"sum(rate(http_requests{env="$env",host=~"${host:regex}"}[$__interval])) by (code)"#;
    let plain = "no tokens in this legend at all";

    let mut g = c.benchmark_group("interpolate");
    g.bench_function("query_with_tokens", |b| {
        b.iter(|| interp.replace(black_box(query)))
    });
    g.bench_function("token_free_text", |b| {
        b.iter(|| interp.replace(black_box(plain)))
    });
    g.finish();
}

criterion_group!(benches, bench_scan, bench_interpolate);
criterion_main!(benches);
