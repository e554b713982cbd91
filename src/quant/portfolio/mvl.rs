//! # Minimum-Variance Line
//!
//! $$
//! \min_{\mathbf{w}} \mathbf{w}^\top \Sigma \mathbf{w}\ \text{ s.t. }\ \mathbf{w}^\top\mu = t,\
//! \mathbf{w}^\top\mathbf{1} = 1 \quad\Longrightarrow\quad \mathbf{w}(t) = \mathbf{a}\,t + \mathbf{b}
//! $$
//!
//! The MVL is affine in the target return. With `x = C^-1 1`, `y = C^-1 mu`,
//! `A = 1'x`, `B = 1'y`, `K = mu'y` and `D = AK - B^2` the Lagrange conditions give
//! `a = (A y - B x) / D` and `b = (K x - B y) / D`.

use nalgebra::DVector;
use ndarray::Array1;
use ndarray::Array2;
use tracing::debug;

use super::types::AssetSet;
use super::types::CovarianceMatrix;
use crate::error::Error;
use crate::error::Result;

/// Relative threshold on `D = AK - B^2` below which the returns carry no
/// information beyond the budget constraint.
const DEGENERATE_RETURNS_TOL: f64 = 1e-12;
/// Smallest-to-largest eigenvalue ratio below which the covariance is singular.
const SINGULAR_TOL: f64 = 1e-12;

/// Affine MVL coefficients, `w_i(t) = a_i t + b_i`.
#[derive(Clone, Debug, PartialEq)]
pub struct MvlCoefficients {
  a: Array1<f64>,
  b: Array1<f64>,
}

impl MvlCoefficients {
  pub fn new(a: Array1<f64>, b: Array1<f64>) -> Result<Self> {
    if a.len() != b.len() {
      return Err(Error::invalid(format!(
        "MVL coefficients have {} slopes but {} intercepts",
        a.len(),
        b.len()
      )));
    }
    if a.len() < 2 {
      return Err(Error::invalid("MVL coefficients need at least 2 assets"));
    }
    if a.iter().chain(b.iter()).any(|v| !v.is_finite()) {
      return Err(Error::invalid("MVL coefficients must be finite"));
    }
    Ok(Self { a, b })
  }

  /// Solve the Lagrange conditions of the minimum-variance problem for any N.
  pub fn solve(assets: &AssetSet, cov: &CovarianceMatrix) -> Result<Self> {
    let n = assets.len();
    if cov.dim() != n {
      return Err(Error::invalid(format!(
        "covariance matrix is {0}x{0} but the asset set has {n} assets",
        cov.dim()
      )));
    }

    let c = cov.to_dmatrix();
    let eig = c.symmetric_eigenvalues();
    if eig.min() <= SINGULAR_TOL * eig.max() {
      return Err(Error::invalid("covariance matrix is singular, the MVL is not unique"));
    }
    let chol = c
      .cholesky()
      .ok_or_else(|| Error::invalid("covariance matrix is singular, the MVL is not unique"))?;

    let ones = DVector::from_element(n, 1.0);
    let mu = DVector::from_iterator(n, assets.returns().iter().copied());
    let x = chol.solve(&ones);
    let y = chol.solve(&mu);

    let big_a = ones.dot(&x);
    let big_b = ones.dot(&y);
    let big_k = mu.dot(&y);
    let det = big_a * big_k - big_b * big_b;

    if det <= DEGENERATE_RETURNS_TOL * big_a * big_k {
      return Err(Error::invalid(
        "expected returns are all equal, every target return but one is unreachable",
      ));
    }

    let a = Array1::from_shape_fn(n, |i| (big_a * y[i] - big_b * x[i]) / det);
    let b = Array1::from_shape_fn(n, |i| (big_k * x[i] - big_b * y[i]) / det);
    debug!(?a, ?b, "solved minimum-variance line");

    Self::new(a, b)
  }

  /// Number of assets.
  pub fn len(&self) -> usize {
    self.a.len()
  }

  pub fn is_empty(&self) -> bool {
    self.a.is_empty()
  }

  /// Slopes `a`.
  pub fn slopes(&self) -> &Array1<f64> {
    &self.a
  }

  /// Intercepts `b`.
  pub fn intercepts(&self) -> &Array1<f64> {
    &self.b
  }

  /// Weights on the line at target return `t`.
  pub fn weights_at(&self, target: f64) -> Array1<f64> {
    &self.a * target + &self.b
  }

  /// One row of weights per target return.
  pub fn evaluate(&self, targets: &Array1<f64>) -> Array2<f64> {
    Array2::from_shape_fn((targets.len(), self.len()), |(k, i)| {
      self.a[i] * targets[k] + self.b[i]
    })
  }

  /// Closed interval of target returns whose weights are all non-negative, the
  /// efficient segment of the line. `None` if no target avoids short positions.
  pub fn feasible_return_range(&self) -> Option<(f64, f64)> {
    let mut lo = f64::NEG_INFINITY;
    let mut hi = f64::INFINITY;

    for (&a, &b) in self.a.iter().zip(self.b.iter()) {
      if a > 0.0 {
        lo = lo.max(-b / a);
      } else if a < 0.0 {
        hi = hi.min(-b / a);
      } else if b < 0.0 {
        return None;
      }
    }

    (lo <= hi).then_some((lo, hi))
  }

  /// Target return of least variance along the line, `t* = -a'Cb / a'Ca`.
  pub fn minimum_variance_target(&self, cov: &CovarianceMatrix) -> Result<f64> {
    if cov.dim() != self.len() {
      return Err(Error::invalid(format!(
        "covariance matrix is {0}x{0} but the MVL has {1} assets",
        cov.dim(),
        self.len()
      )));
    }

    let ca = cov.as_array().dot(&self.a);
    let aca = self.a.dot(&ca);
    if aca <= 0.0 {
      return Err(Error::invalid(
        "variance is flat along the MVL, no unique minimum",
      ));
    }

    Ok(-self.b.dot(&ca) / aca)
  }
}

/// Evaluate the MVL at every target return.
pub fn evaluate_mvl(coeffs: &MvlCoefficients, targets: &Array1<f64>) -> Array2<f64> {
  coeffs.evaluate(targets)
}
