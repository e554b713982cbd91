//! # Portfolio Geometry
//!
//! $$
//! \mu_p = \mathbf{w}^\top\mu,\qquad \sigma_p = \sqrt{\mathbf{w}^\top \Sigma \mathbf{w}},\qquad
//! \mathcal{F} = \{\mathbf{w} : w_i \ge 0\}
//! $$
//!
//! Risk/return of weight vectors, the no-short-selling test and two-asset edges.
//! Batches are `Array2` with one weight vector per row.

use ndarray::Array1;
use ndarray::Array2;
use ndarray::ArrayBase;
use ndarray::Axis;
use ndarray::Data;
use ndarray::Ix1;
use ndarray::Zip;

use super::types::AssetSet;
use super::types::CovarianceMatrix;
use crate::error::Error;
use crate::error::Result;

/// Quadratic forms below this are treated as a non-PSD covariance.
pub const NEGATIVE_VARIANCE_TOL: f64 = 1e-12;

fn check_len(len: usize, n: usize) -> Result<()> {
  if len != n {
    return Err(Error::invalid(format!(
      "weight vector has {len} entries, expected {n}"
    )));
  }
  Ok(())
}

fn risk_from_variance(variance: f64) -> Result<f64> {
  if variance.is_nan() || variance < -NEGATIVE_VARIANCE_TOL {
    return Err(Error::invalid(format!(
      "portfolio variance {variance:e} is negative, covariance is not positive semi-definite"
    )));
  }
  Ok(variance.max(0.0).sqrt())
}

/// Expected return `w' mu`.
pub fn portfolio_return<S: Data<Elem = f64>>(
  weights: &ArrayBase<S, Ix1>,
  assets: &AssetSet,
) -> Result<f64> {
  check_len(weights.len(), assets.len())?;
  Ok(weights.dot(assets.returns()))
}

/// Risk `sqrt(w' C w)`.
pub fn portfolio_risk<S: Data<Elem = f64>>(
  weights: &ArrayBase<S, Ix1>,
  cov: &CovarianceMatrix,
) -> Result<f64> {
  check_len(weights.len(), cov.dim())?;
  risk_from_variance(cov.quadratic_form(weights))
}

/// Row-wise expected returns.
pub fn portfolio_return_batch(weights: &Array2<f64>, assets: &AssetSet) -> Result<Array1<f64>> {
  check_len(weights.ncols(), assets.len())?;
  Ok(weights.dot(assets.returns()))
}

/// Row-wise risks, evaluated in parallel over rows.
pub fn portfolio_risk_batch(weights: &Array2<f64>, cov: &CovarianceMatrix) -> Result<Array1<f64>> {
  check_len(weights.ncols(), cov.dim())?;
  let variances = Zip::from(weights.rows()).par_map_collect(|w| cov.quadratic_form(&w));
  variances.iter().map(|&v| risk_from_variance(v)).collect()
}

/// True iff every weight is non-negative.
pub fn is_feasible<S: Data<Elem = f64>>(weights: &ArrayBase<S, Ix1>) -> bool {
  weights.iter().all(|&w| w >= 0.0)
}

/// [`is_feasible`] for every row.
pub fn feasible_mask(weights: &Array2<f64>) -> Vec<bool> {
  weights.rows().into_iter().map(|w| is_feasible(&w)).collect()
}

/// Keep only the rows without short positions.
pub fn filter_feasible(weights: &Array2<f64>) -> Array2<f64> {
  let rows: Vec<usize> = feasible_mask(weights)
    .into_iter()
    .enumerate()
    .filter_map(|(i, ok)| ok.then_some(i))
    .collect();
  weights.select(Axis(0), &rows)
}

/// Portfolios holding only assets `i` and `j`: weight `w` on `j`, `1 - w` on `i`,
/// for every `w` in `weight_range`.
pub fn two_asset_edge(
  i: usize,
  j: usize,
  n_assets: usize,
  weight_range: &Array1<f64>,
) -> Result<Array2<f64>> {
  if i == j {
    return Err(Error::invalid(format!("edge needs two distinct assets, got {i} twice")));
  }
  if i >= n_assets || j >= n_assets {
    return Err(Error::invalid(format!(
      "edge ({i}, {j}) is out of range for {n_assets} assets"
    )));
  }

  let mut edge = Array2::<f64>::zeros((weight_range.len(), n_assets));
  for (mut row, &w) in edge.rows_mut().into_iter().zip(weight_range.iter()) {
    row[i] = 1.0 - w;
    row[j] = w;
  }

  Ok(edge)
}
