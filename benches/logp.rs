use criterion::black_box;
use criterion::Criterion;
use criterion::{criterion_group, criterion_main};
use genmodel::model::{DistSpec, ExprExt, LogDensity, Model};

fn regression(n: usize) -> Model {
    let xs: Vec<f64> = (0..n).map(|i| i as f64 / n as f64).collect();
    let ys: Vec<f64> = xs.iter().map(|x| 1.0 + 2.0 * x).collect();
    let mut model = Model::new();
    model.add_coord_len("obs", n).unwrap();
    let x = model.add_data("x", xs, &["obs"]).unwrap();
    let a = model.add_prior("a", DistSpec::normal(0.0, 10.0), &[]).unwrap();
    let b = model.add_prior("b", DistSpec::normal(0.0, 10.0), &[]).unwrap();
    let sigma = model
        .add_prior("sigma", DistSpec::half_normal(1.0), &[])
        .unwrap();
    model
        .add_likelihood("y", DistSpec::normal(a + b * x, sigma), ys, &["obs"])
        .unwrap();
    model
}

fn hierarchical(n_groups: usize) -> Model {
    let idx: Vec<usize> = (0..10 * n_groups).map(|i| i % n_groups).collect();
    let ys: Vec<f64> = idx.iter().map(|&g| g as f64 * 0.1).collect();
    let mut model = Model::new();
    model.add_coord_len("group", n_groups).unwrap();
    model.add_coord_len("obs", ys.len()).unwrap();
    let idx = model.add_data("idx", idx, &["obs"]).unwrap();
    let mu = model.add_prior("mu", DistSpec::normal(0.0, 5.0), &[]).unwrap();
    let tau = model.add_prior("tau", DistSpec::half_normal(1.0), &[]).unwrap();
    let alpha = model
        .add_prior("alpha", DistSpec::normal(mu, tau), &["group"])
        .unwrap();
    model
        .add_likelihood("y", DistSpec::normal(alpha.take(idx), 1.0), ys, &["obs"])
        .unwrap();
    model
}

fn bench_regression_logp(c: &mut Criterion) {
    let mut group = c.benchmark_group("regression logp");
    for n in [10, 100, 1000] {
        let model = regression(n);
        let density = LogDensity::new(&model).unwrap();
        let theta = vec![0.5; density.dim()];
        group.bench_function(format!("{n} obs"), |b| {
            b.iter(|| black_box(density.logp(&theta)))
        });
    }
}

fn bench_regression_grad(c: &mut Criterion) {
    let mut group = c.benchmark_group("regression logp and grad");
    for n in [10, 100, 1000] {
        let model = regression(n);
        let density = LogDensity::new(&model).unwrap();
        let theta = vec![0.5; density.dim()];
        group.bench_function(format!("{n} obs"), |b| {
            b.iter(|| black_box(density.logp_and_grad(&theta)))
        });
    }
}

// The gradient is a finite difference, so its cost grows with the number
// of free parameters
fn bench_hierarchical_grad(c: &mut Criterion) {
    let mut group = c.benchmark_group("hierarchical logp and grad");
    for n_groups in [2, 8, 32] {
        let model = hierarchical(n_groups);
        let density = LogDensity::new(&model).unwrap();
        let theta = vec![0.1; density.dim()];
        group.bench_function(format!("{n_groups} groups"), |b| {
            b.iter(|| black_box(density.logp_and_grad(&theta)))
        });
    }
}

criterion_group!(
    logp_benches,
    bench_regression_logp,
    bench_regression_grad,
    bench_hierarchical_grad
);
criterion_main!(logp_benches);
