use std::hint::black_box;

use criterion::criterion_group;
use criterion::criterion_main;
use criterion::BenchmarkId;
use criterion::Criterion;
use ndarray::Array1;
use portfolio_geometry::quant::portfolio::build_covariance;
use portfolio_geometry::quant::portfolio::fixtures::textbook_assets;
use portfolio_geometry::quant::portfolio::fixtures::textbook_correlation;
use portfolio_geometry::quant::portfolio::fixtures::textbook_mvl;
use portfolio_geometry::quant::portfolio::portfolio_risk_batch;
use portfolio_geometry::quant::portfolio::random_portfolios;
use portfolio_geometry::quant::portfolio::MvlCoefficients;
use rand::rngs::StdRng;
use rand::SeedableRng;

fn bench_risk_batch(c: &mut Criterion) {
  let mut group = c.benchmark_group("portfolio_risk_batch");
  let assets = textbook_assets().unwrap();
  let cov = build_covariance(&assets, &textbook_correlation().unwrap()).unwrap();

  for &size in &[1_000, 10_000, 100_000] {
    let mut rng = StdRng::seed_from_u64(0);
    let weights = random_portfolios(size, 3, true, &mut rng).unwrap();
    group.bench_with_input(BenchmarkId::from_parameter(size), &weights, |b, w| {
      b.iter(|| black_box(portfolio_risk_batch(w, &cov).unwrap()))
    });
  }

  group.finish();
}

fn bench_random_portfolios(c: &mut Criterion) {
  let mut group = c.benchmark_group("random_portfolios");

  for allow_short in [false, true] {
    group.bench_function(if allow_short { "short" } else { "long_only" }, |b| {
      let mut rng = StdRng::seed_from_u64(1);
      b.iter(|| black_box(random_portfolios(10_000, 3, allow_short, &mut rng).unwrap()))
    });
  }

  group.finish();
}

fn bench_mvl(c: &mut Criterion) {
  let assets = textbook_assets().unwrap();
  let cov = build_covariance(&assets, &textbook_correlation().unwrap()).unwrap();
  let mvl = textbook_mvl().unwrap();
  let targets = Array1::linspace(0.0, 0.3, 10_000);

  c.bench_function("mvl_solve", |b| {
    b.iter(|| black_box(MvlCoefficients::solve(&assets, &cov).unwrap()))
  });
  c.bench_function("mvl_evaluate", |b| b.iter(|| black_box(mvl.evaluate(&targets))));
}

criterion_group!(benches, bench_risk_batch, bench_random_portfolios, bench_mvl);
criterion_main!(benches);
