//! # Portfolio Data Utilities
//!
//! $$
//! \Sigma_{ij} = \sigma_i \sigma_j \rho_{ij}
//! $$
//!
//! Covariance construction and structural validation of correlation/covariance inputs.

use approx::abs_diff_eq;
use nalgebra::DMatrix;
use ndarray::Array2;

use super::types::AssetSet;
use super::types::CorrelationMatrix;
use super::types::CovarianceMatrix;
use crate::error::Error;
use crate::error::Result;

/// Tolerance for `m[i][j] == m[j][i]` and the unit diagonal.
pub const SYMMETRY_TOL: f64 = 1e-12;
/// Smallest eigenvalue still accepted as positive semi-definite.
pub const PSD_TOL: f64 = -1e-10;

/// Build `C = diag(sigma) R diag(sigma)`.
pub fn build_covariance(assets: &AssetSet, corr: &CorrelationMatrix) -> Result<CovarianceMatrix> {
  let n = assets.len();
  if corr.dim() != n {
    return Err(Error::invalid(format!(
      "correlation matrix is {0}x{0} but the asset set has {n} assets",
      corr.dim()
    )));
  }

  let sigmas = assets.stddevs();
  let rho = corr.as_array();
  let cov = Array2::from_shape_fn((n, n), |(i, j)| sigmas[i] * sigmas[j] * rho[[i, j]]);

  Ok(CovarianceMatrix::from_validated(cov))
}

fn check_square(m: &Array2<f64>, what: &str) -> Result<usize> {
  let (rows, cols) = m.dim();
  if rows != cols {
    return Err(Error::invalid(format!("{what} must be square, got {rows}x{cols}")));
  }
  if rows == 0 {
    return Err(Error::invalid(format!("{what} is empty")));
  }
  if m.iter().any(|v| !v.is_finite()) {
    return Err(Error::invalid(format!("{what} contains non-finite entries")));
  }
  Ok(rows)
}

fn check_symmetric(m: &Array2<f64>, what: &str) -> Result<()> {
  let n = m.nrows();
  for i in 0..n {
    for j in (i + 1)..n {
      if !abs_diff_eq!(m[[i, j]], m[[j, i]], epsilon = SYMMETRY_TOL) {
        return Err(Error::invalid(format!(
          "{what} is not symmetric at ({i}, {j}): {} vs {}",
          m[[i, j]],
          m[[j, i]]
        )));
      }
    }
  }
  Ok(())
}

/// Smallest eigenvalue of a symmetric matrix.
pub fn min_eigenvalue(m: &Array2<f64>) -> f64 {
  let n = m.nrows();
  DMatrix::from_fn(n, n, |i, j| m[[i, j]])
    .symmetric_eigenvalues()
    .min()
}

fn check_psd(m: &Array2<f64>, what: &str) -> Result<()> {
  let lambda = min_eigenvalue(m);
  if lambda < PSD_TOL {
    return Err(Error::invalid(format!(
      "{what} is not positive semi-definite (smallest eigenvalue {lambda:e})"
    )));
  }
  Ok(())
}

pub(crate) fn validate_correlation(corr: &Array2<f64>) -> Result<()> {
  let what = "correlation matrix";
  let n = check_square(corr, what)?;

  for i in 0..n {
    if !abs_diff_eq!(corr[[i, i]], 1.0, epsilon = SYMMETRY_TOL) {
      return Err(Error::invalid(format!(
        "{what} diagonal entry {i} is {}, expected 1",
        corr[[i, i]]
      )));
    }
  }
  if let Some(((i, j), v)) = corr.indexed_iter().find(|((i, j), v)| i != j && v.abs() > 1.0) {
    return Err(Error::invalid(format!(
      "{what} entry ({i}, {j}) = {v} is outside [-1, 1]"
    )));
  }

  check_symmetric(corr, what)?;
  check_psd(corr, what)
}

pub(crate) fn validate_covariance(cov: &Array2<f64>) -> Result<()> {
  let what = "covariance matrix";
  check_square(cov, what)?;
  if let Some(i) = cov.diag().iter().position(|&v| v < 0.0) {
    return Err(Error::invalid(format!("{what} has negative variance at {i}")));
  }
  check_symmetric(cov, what)?;
  check_psd(cov, what)
}
