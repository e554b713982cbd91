//! # Textbook Three-Asset Example
//!
//! $$
//! \mu = (0.10, 0.15, 0.20),\quad \sigma = (0.28, 0.24, 0.25),\quad
//! \rho_{12} = -0.10,\ \rho_{13} = 0.25,\ \rho_{23} = 0.20
//! $$
//!
//! Fixed inputs of the classic three-security example and its hardcoded
//! minimum-variance line coefficients.

use ndarray::array;

use super::mvl::MvlCoefficients;
use super::types::AssetSet;
use super::types::CorrelationMatrix;
use crate::error::Result;

pub fn textbook_assets() -> Result<AssetSet> {
  AssetSet::new(array![0.10, 0.15, 0.20], array![0.28, 0.24, 0.25])
}

pub fn textbook_correlation() -> Result<CorrelationMatrix> {
  CorrelationMatrix::from_pairs(3, &[(0, 1, -0.10), (0, 2, 0.25), (1, 2, 0.20)])
}

/// `w(t) = a t + b`, rounded to three decimals.
pub fn textbook_mvl() -> Result<MvlCoefficients> {
  MvlCoefficients::new(
    array![-8.614, -2.769, 11.384],
    array![1.578, 0.845, -1.422],
  )
}
