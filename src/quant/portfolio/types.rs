//! # Portfolio Types
//!
//! $$
//! \Sigma = D R D,\qquad D = \operatorname{diag}(\sigma_1,\dots,\sigma_N)
//! $$
//!
//! Validated inputs (assets, correlation, covariance) and the derived portfolio point.

use nalgebra::DMatrix;
use ndarray::Array1;
use ndarray::Array2;
use ndarray::ArrayBase;
use ndarray::Data;
use ndarray::Ix1;

use super::data::validate_correlation;
use super::data::validate_covariance;
use crate::error::Error;
use crate::error::Result;

/// Ordered set of assets with expected returns and standard deviations.
#[derive(Clone, Debug, PartialEq)]
pub struct AssetSet {
  returns: Array1<f64>,
  stddevs: Array1<f64>,
}

impl AssetSet {
  /// Build an asset set. Requires at least two assets, finite returns and
  /// strictly positive finite standard deviations.
  pub fn new(returns: Array1<f64>, stddevs: Array1<f64>) -> Result<Self> {
    if returns.len() != stddevs.len() {
      return Err(Error::invalid(format!(
        "asset set has {} returns but {} standard deviations",
        returns.len(),
        stddevs.len()
      )));
    }
    if returns.len() < 2 {
      return Err(Error::invalid(format!(
        "asset set needs at least 2 assets, got {}",
        returns.len()
      )));
    }
    if let Some(i) = returns.iter().position(|r| !r.is_finite()) {
      return Err(Error::invalid(format!("return of asset {i} is not finite")));
    }
    if let Some(i) = stddevs.iter().position(|s| !(s.is_finite() && *s > 0.0)) {
      return Err(Error::invalid(format!(
        "standard deviation of asset {i} must be positive and finite, got {}",
        stddevs[i]
      )));
    }

    Ok(Self { returns, stddevs })
  }

  /// Number of assets.
  pub fn len(&self) -> usize {
    self.returns.len()
  }

  /// Always false, an asset set holds at least two assets.
  pub fn is_empty(&self) -> bool {
    self.returns.is_empty()
  }

  /// Expected returns `mu`.
  pub fn returns(&self) -> &Array1<f64> {
    &self.returns
  }

  /// Standard deviations `sigma`.
  pub fn stddevs(&self) -> &Array1<f64> {
    &self.stddevs
  }
}

/// Symmetric, unit-diagonal, positive semi-definite correlation matrix.
#[derive(Clone, Debug, PartialEq)]
pub struct CorrelationMatrix(Array2<f64>);

impl CorrelationMatrix {
  /// Validate and wrap a correlation matrix.
  pub fn new(corr: Array2<f64>) -> Result<Self> {
    validate_correlation(&corr)?;
    Ok(Self(corr))
  }

  /// Build from the strict upper triangle, given as `(i, j, rho)` triples.
  /// Unlisted off-diagonal pairs are uncorrelated.
  pub fn from_pairs(n: usize, pairs: &[(usize, usize, f64)]) -> Result<Self> {
    let mut corr = Array2::<f64>::eye(n);
    for &(i, j, rho) in pairs {
      if i >= n || j >= n || i == j {
        return Err(Error::invalid(format!(
          "correlation pair ({i}, {j}) is not an off-diagonal entry of a {n}x{n} matrix"
        )));
      }
      corr[[i, j]] = rho;
      corr[[j, i]] = rho;
    }
    Self::new(corr)
  }

  /// Matrix dimension.
  pub fn dim(&self) -> usize {
    self.0.nrows()
  }

  pub fn as_array(&self) -> &Array2<f64> {
    &self.0
  }
}

/// Symmetric positive semi-definite covariance matrix.
#[derive(Clone, Debug, PartialEq)]
pub struct CovarianceMatrix(Array2<f64>);

impl CovarianceMatrix {
  /// Validate and wrap an externally supplied covariance matrix.
  pub fn new(cov: Array2<f64>) -> Result<Self> {
    validate_covariance(&cov)?;
    Ok(Self(cov))
  }

  /// Wrap a matrix produced by [`super::data::build_covariance`], whose inputs
  /// are already validated.
  pub(crate) fn from_validated(cov: Array2<f64>) -> Self {
    Self(cov)
  }

  /// Matrix dimension.
  pub fn dim(&self) -> usize {
    self.0.nrows()
  }

  pub fn as_array(&self) -> &Array2<f64> {
    &self.0
  }

  /// Per-asset volatilities, the square roots of the diagonal.
  pub fn volatilities(&self) -> Array1<f64> {
    self.0.diag().mapv(|v| v.max(0.0).sqrt())
  }

  /// Recover the correlation matrix `D^-1 C D^-1`.
  pub fn correlation(&self) -> Result<CorrelationMatrix> {
    let vols = self.volatilities();
    if let Some(i) = vols.iter().position(|&v| v <= 0.0) {
      return Err(Error::invalid(format!(
        "asset {i} has zero variance, correlation is undefined"
      )));
    }
    let n = self.dim();
    let corr = Array2::from_shape_fn((n, n), |(i, j)| {
      if i == j {
        1.0
      } else {
        (self.0[[i, j]] / (vols[i] * vols[j])).clamp(-1.0, 1.0)
      }
    });
    CorrelationMatrix::new(corr)
  }

  /// Unchecked quadratic form `w' C w`.
  pub(crate) fn quadratic_form<S: Data<Elem = f64>>(&self, w: &ArrayBase<S, Ix1>) -> f64 {
    w.dot(&self.0.dot(w))
  }

  pub(crate) fn to_dmatrix(&self) -> DMatrix<f64> {
    let n = self.dim();
    DMatrix::from_fn(n, n, |i, j| self.0[[i, j]])
  }
}

/// A weight vector with its expected return and risk.
#[derive(Clone, Debug, PartialEq)]
pub struct Portfolio {
  /// Portfolio weights, one per asset.
  pub weights: Array1<f64>,
  /// Expected return `w' mu`.
  pub expected_return: f64,
  /// Risk `sqrt(w' C w)`.
  pub volatility: f64,
}

impl Portfolio {
  /// Sharpe ratio `(expected_return - risk_free) / volatility`, zero for a riskless portfolio.
  pub fn sharpe(&self, risk_free: f64) -> f64 {
    if self.volatility > 1e-15 {
      (self.expected_return - risk_free) / self.volatility
    } else {
      0.0
    }
  }

  /// True when no weight is negative.
  pub fn is_feasible(&self) -> bool {
    super::geometry::is_feasible(&self.weights)
  }
}
