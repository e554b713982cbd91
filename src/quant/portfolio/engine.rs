//! # Portfolio Engine
//!
//! $$
//! (\mu, \sigma, R) \mapsto \Sigma \mapsto \{(\sigma_p, \mu_p)\}
//! $$
//!
//! High-level entry point tying the asset inputs, the covariance and the curve
//! generators together, and handing the resulting curves to a [`SeriesSink`].

use ndarray::Array1;
use ndarray::Array2;
use ndarray_stats::QuantileExt;
use rand::rngs::StdRng;
use rand::SeedableRng;
use rayon::prelude::*;
use tracing::debug;

use super::data::build_covariance;
use super::geometry::portfolio_return;
use super::geometry::portfolio_return_batch;
use super::geometry::portfolio_risk;
use super::geometry::portfolio_risk_batch;
use super::geometry::two_asset_edge;
use super::mvl::MvlCoefficients;
use super::sampling::RandomPortfolios;
use super::sampling::DEFAULT_MAX_ATTEMPTS;
use super::sampling::DEFAULT_SUM_TOLERANCE;
use super::types::AssetSet;
use super::types::CorrelationMatrix;
use super::types::CovarianceMatrix;
use super::types::Portfolio;
use crate::error::Error;
use crate::error::Result;
use crate::visualization::SeriesSink;

/// Runtime configuration for [`PortfolioEngine`].
#[derive(Clone, Debug)]
pub struct PortfolioEngineConfig {
  /// Number of target returns on the MVL grid.
  pub mvl_points: usize,
  /// Lowest target return on the MVL grid.
  pub target_min: f64,
  /// Highest target return on the MVL grid.
  pub target_max: f64,
  /// Number of points on each two-asset edge, spanning weights 0..=1.
  pub edge_points: usize,
  /// Size of the random portfolio cloud.
  pub random_portfolios: usize,
  /// Allow short positions in the random cloud.
  pub allow_short: bool,
  /// Random draws whose `|sum|` does not exceed this are resampled.
  pub degenerate_sum_tolerance: f64,
  /// Draws per random portfolio before giving up.
  pub max_resample_attempts: usize,
  /// Seed for the random cloud, `None` draws from OS entropy.
  pub seed: Option<u64>,
}

impl Default for PortfolioEngineConfig {
  fn default() -> Self {
    Self {
      mvl_points: 200,
      target_min: 0.0,
      target_max: 0.3,
      edge_points: 101,
      random_portfolios: 1000,
      allow_short: false,
      degenerate_sum_tolerance: DEFAULT_SUM_TOLERANCE,
      max_resample_attempts: DEFAULT_MAX_ATTEMPTS,
      seed: None,
    }
  }
}

/// Single entry point for minimum-variance line and feasible-region workflows.
#[derive(Clone, Debug)]
pub struct PortfolioEngine {
  config: PortfolioEngineConfig,
  assets: AssetSet,
  correlation: CorrelationMatrix,
  covariance: CovarianceMatrix,
}

impl PortfolioEngine {
  /// Construct an engine, building the covariance matrix once.
  pub fn new(
    assets: AssetSet,
    correlation: CorrelationMatrix,
    config: PortfolioEngineConfig,
  ) -> Result<Self> {
    if !(config.target_min <= config.target_max) {
      return Err(Error::invalid(format!(
        "target range [{}, {}] is empty",
        config.target_min, config.target_max
      )));
    }

    let covariance = build_covariance(&assets, &correlation)?;
    debug!(n_assets = assets.len(), ?config, "portfolio engine ready");

    Ok(Self {
      config,
      assets,
      correlation,
      covariance,
    })
  }

  /// Borrow engine configuration.
  pub fn config(&self) -> &PortfolioEngineConfig {
    &self.config
  }

  pub fn assets(&self) -> &AssetSet {
    &self.assets
  }

  pub fn correlation(&self) -> &CorrelationMatrix {
    &self.correlation
  }

  pub fn covariance(&self) -> &CovarianceMatrix {
    &self.covariance
  }

  /// Price a single weight vector.
  pub fn portfolio(&self, weights: Array1<f64>) -> Result<Portfolio> {
    let expected_return = portfolio_return(&weights, &self.assets)?;
    let volatility = portfolio_risk(&weights, &self.covariance)?;
    Ok(Portfolio {
      weights,
      expected_return,
      volatility,
    })
  }

  /// Price every row of a weight batch.
  pub fn portfolios(&self, weights: Array2<f64>) -> Result<Vec<Portfolio>> {
    let returns = portfolio_return_batch(&weights, &self.assets)?;
    let risks = portfolio_risk_batch(&weights, &self.covariance)?;

    Ok(
      weights
        .rows()
        .into_iter()
        .zip(returns.iter().zip(risks.iter()))
        .map(|(w, (&expected_return, &volatility))| Portfolio {
          weights: w.to_owned(),
          expected_return,
          volatility,
        })
        .collect(),
    )
  }

  /// MVL coefficients solved from this engine's inputs.
  pub fn mvl_coefficients(&self) -> Result<MvlCoefficients> {
    MvlCoefficients::solve(&self.assets, &self.covariance)
  }

  /// Configured grid of target returns.
  pub fn target_grid(&self) -> Array1<f64> {
    Array1::linspace(
      self.config.target_min,
      self.config.target_max,
      self.config.mvl_points,
    )
  }

  /// Portfolios on the minimum-variance line over the target grid.
  pub fn mvl_curve(&self, coeffs: &MvlCoefficients) -> Result<Vec<Portfolio>> {
    self.check_coefficients(coeffs)?;
    self.portfolios(coeffs.evaluate(&self.target_grid()))
  }

  /// The no-short-selling part of [`Self::mvl_curve`].
  pub fn efficient_frontier(&self, coeffs: &MvlCoefficients) -> Result<Vec<Portfolio>> {
    Ok(
      self
        .mvl_curve(coeffs)?
        .into_iter()
        .filter(Portfolio::is_feasible)
        .collect(),
    )
  }

  /// Least-variance portfolio on the line.
  pub fn minimum_variance_portfolio(&self, coeffs: &MvlCoefficients) -> Result<Portfolio> {
    self.check_coefficients(coeffs)?;
    let target = coeffs.minimum_variance_target(&self.covariance)?;
    self.portfolio(coeffs.weights_at(target))
  }

  /// Random portfolio cloud, seeded from the configuration.
  pub fn random_cloud(&self) -> Result<Vec<Portfolio>> {
    let mut rng = match self.config.seed {
      Some(seed) => StdRng::seed_from_u64(seed),
      None => StdRng::from_entropy(),
    };
    let weights = RandomPortfolios::new(
      self.config.random_portfolios,
      self.assets.len(),
      self.config.allow_short,
      self.config.degenerate_sum_tolerance,
      self.config.max_resample_attempts,
    )
    .sample(&mut rng)?;

    self.portfolios(weights)
  }

  /// Two-asset edges of the feasible region, one curve per pair `(i, j)` with `i < j`.
  pub fn pair_edges(&self) -> Result<Vec<((usize, usize), Vec<Portfolio>)>> {
    let n = self.assets.len();
    let range = Array1::linspace(0.0, 1.0, self.config.edge_points);
    let pairs: Vec<(usize, usize)> = (0..n)
      .flat_map(|i| ((i + 1)..n).map(move |j| (i, j)))
      .collect();

    pairs
      .into_par_iter()
      .map(|(i, j)| -> Result<_> {
        let curve = self.portfolios(two_asset_edge(i, j, n, &range)?)?;
        Ok(((i, j), curve))
      })
      .collect()
  }

  /// Portfolio with the smallest volatility among `portfolios`.
  pub fn least_risky(portfolios: &[Portfolio]) -> Option<&Portfolio> {
    let vols: Array1<f64> = portfolios.iter().map(|p| p.volatility).collect();
    vols.argmin().ok().map(|idx| &portfolios[idx])
  }

  /// Push every curve to `sink` as `(volatility, expected return)` series.
  pub fn plot<S: SeriesSink>(&self, coeffs: &MvlCoefficients, sink: &mut S) -> Result<()> {
    push_portfolios(sink, "minimum-variance line", &self.mvl_curve(coeffs)?)?;
    push_portfolios(sink, "efficient frontier", &self.efficient_frontier(coeffs)?)?;
    push_portfolios(sink, "random portfolios", &self.random_cloud()?)?;

    for ((i, j), edge) in self.pair_edges()? {
      push_portfolios(sink, &format!("edge {i}-{j}"), &edge)?;
    }

    let gmv = self.minimum_variance_portfolio(coeffs)?;
    sink.push_series(
      "minimum-variance portfolio",
      &[gmv.volatility],
      &[gmv.expected_return],
    )?;

    let vols = self.assets.stddevs().to_vec();
    let rets = self.assets.returns().to_vec();
    sink.push_series("assets", &vols, &rets)
  }

  fn check_coefficients(&self, coeffs: &MvlCoefficients) -> Result<()> {
    if coeffs.len() != self.assets.len() {
      return Err(Error::invalid(format!(
        "MVL has {} assets but the engine has {}",
        coeffs.len(),
        self.assets.len()
      )));
    }
    Ok(())
  }
}

fn push_portfolios<S: SeriesSink>(sink: &mut S, label: &str, curve: &[Portfolio]) -> Result<()> {
  let vols: Vec<f64> = curve.iter().map(|p| p.volatility).collect();
  let rets: Vec<f64> = curve.iter().map(|p| p.expected_return).collect();
  sink.push_series(label, &vols, &rets)
}

#[cfg(test)]
mod tests {
  use approx::assert_abs_diff_eq;
  use ndarray::array;

  use super::*;
  use crate::quant::portfolio::fixtures::textbook_assets;
  use crate::quant::portfolio::fixtures::textbook_correlation;
  use crate::quant::portfolio::fixtures::textbook_mvl;
  use crate::visualization::SeriesCollector;

  fn engine(config: PortfolioEngineConfig) -> anyhow::Result<PortfolioEngine> {
    Ok(PortfolioEngine::new(
      textbook_assets()?,
      textbook_correlation()?,
      config,
    )?)
  }

  fn seeded() -> PortfolioEngineConfig {
    PortfolioEngineConfig {
      random_portfolios: 300,
      seed: Some(11),
      ..Default::default()
    }
  }

  #[test]
  fn frontier_is_feasible_subset_of_mvl() -> anyhow::Result<()> {
    let engine = engine(seeded())?;
    let coeffs = textbook_mvl()?;
    let mvl = engine.mvl_curve(&coeffs)?;
    let frontier = engine.efficient_frontier(&coeffs)?;

    assert_eq!(mvl.len(), 200);
    assert!(!frontier.is_empty());
    assert!(frontier.len() < mvl.len());

    let (lo, hi) = coeffs
      .feasible_return_range()
      .ok_or_else(|| anyhow::anyhow!("empty feasible range"))?;
    // the rounded textbook coefficients hit each target return to within 1e-3
    for p in &frontier {
      assert!(p.is_feasible());
      assert!(p.expected_return >= lo - 1e-3 && p.expected_return <= hi + 1e-3);
    }
    Ok(())
  }

  #[test]
  fn random_cloud_never_beats_minimum_variance() -> anyhow::Result<()> {
    let engine = engine(PortfolioEngineConfig {
      allow_short: true,
      ..seeded()
    })?;
    let coeffs = engine.mvl_coefficients()?;
    let gmv = engine.minimum_variance_portfolio(&coeffs)?;
    let cloud = engine.random_cloud()?;

    assert_eq!(cloud.len(), 300);
    let least = PortfolioEngine::least_risky(&cloud)
      .ok_or_else(|| anyhow::anyhow!("empty cloud"))?;
    assert!(least.volatility >= gmv.volatility - 1e-12);
    Ok(())
  }

  #[test]
  fn seeded_cloud_is_reproducible() -> anyhow::Result<()> {
    let engine = engine(seeded())?;
    assert_eq!(engine.random_cloud()?, engine.random_cloud()?);
    Ok(())
  }

  #[test]
  fn pair_edges_connect_assets() -> anyhow::Result<()> {
    let engine = engine(seeded())?;
    let edges = engine.pair_edges()?;
    assert_eq!(edges.len(), 3);

    for ((i, j), curve) in &edges {
      assert_eq!(curve.len(), 101);
      let first = &curve[0];
      let last = &curve[curve.len() - 1];
      assert_abs_diff_eq!(first.volatility, engine.assets().stddevs()[*i], epsilon = 1e-12);
      assert_abs_diff_eq!(last.volatility, engine.assets().stddevs()[*j], epsilon = 1e-12);
      assert_abs_diff_eq!(first.expected_return, engine.assets().returns()[*i], epsilon = 1e-12);
      assert_abs_diff_eq!(last.expected_return, engine.assets().returns()[*j], epsilon = 1e-12);
    }
    Ok(())
  }

  #[test]
  fn plot_pushes_every_curve() -> anyhow::Result<()> {
    let engine = engine(seeded())?;
    let mut sink = SeriesCollector::default();
    engine.plot(&textbook_mvl()?, &mut sink)?;

    let labels: Vec<&str> = sink.series().iter().map(|s| s.label.as_str()).collect();
    assert_eq!(
      labels,
      vec![
        "minimum-variance line",
        "efficient frontier",
        "random portfolios",
        "edge 0-1",
        "edge 0-2",
        "edge 1-2",
        "minimum-variance portfolio",
        "assets",
      ]
    );
    let assets = sink
      .get("assets")
      .ok_or_else(|| anyhow::anyhow!("missing assets series"))?;
    assert_eq!(assets.x, vec![0.28, 0.24, 0.25]);
    Ok(())
  }

  #[test]
  fn rejects_mismatched_inputs() -> anyhow::Result<()> {
    let engine = engine(seeded())?;
    let two_asset = MvlCoefficients::new(array![1.0, -1.0], array![0.0, 1.0])?;
    assert!(engine.mvl_curve(&two_asset).is_err());
    assert!(engine.portfolio(array![0.5, 0.5]).is_err());

    let bad_range = PortfolioEngineConfig {
      target_min: 0.3,
      target_max: 0.1,
      ..Default::default()
    };
    assert!(PortfolioEngine::new(textbook_assets()?, textbook_correlation()?, bad_range).is_err());
    Ok(())
  }
}
