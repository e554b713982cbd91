//! # Random Portfolios
//!
//! $$
//! \mathbf{w} = \frac{\mathbf{z}}{\mathbf{1}^\top\mathbf{z}},\qquad
//! z_i \sim \begin{cases}\mathcal N(0,1) & \text{short selling allowed}\\ \mathcal U[0,1) & \text{otherwise}\end{cases}
//! $$
//!
//! Random weight vectors on the budget hyperplane. With short selling the raw sum
//! can land arbitrarily close to zero; such draws are resampled.

use impl_new_derive::ImplNew;
use ndarray::Array1;
use ndarray::Array2;
use ndarray_rand::RandomExt;
use rand::Rng;
use rand_distr::Distribution;
use rand_distr::StandardNormal;
use rand_distr::Uniform;
use tracing::debug;
use tracing::warn;

use crate::error::Error;
use crate::error::Result;

/// Default `|sum|` below which a draw is rejected.
pub const DEFAULT_SUM_TOLERANCE: f64 = 1e-8;
/// Default number of draws per row before giving up.
pub const DEFAULT_MAX_ATTEMPTS: usize = 64;

/// Sampler for `n` random portfolios over `n_assets` assets.
#[derive(ImplNew, Clone, Debug)]
pub struct RandomPortfolios {
  /// Number of portfolios.
  pub n: usize,
  /// Number of assets per portfolio.
  pub n_assets: usize,
  /// Draw unconstrained normal weights instead of non-negative uniform ones.
  pub allow_short: bool,
  /// Draws whose `|sum|` does not exceed this are resampled.
  pub sum_tolerance: f64,
  /// Draws per row before [`Error::DegenerateSample`] is returned.
  pub max_attempts: usize,
}

impl RandomPortfolios {
  /// Sample one normalised portfolio per row.
  pub fn sample<R: Rng + ?Sized>(&self, rng: &mut R) -> Result<Array2<f64>> {
    if self.n_assets < 2 {
      return Err(Error::invalid(format!(
        "random portfolios need at least 2 assets, got {}",
        self.n_assets
      )));
    }
    if self.max_attempts == 0 {
      return Err(Error::invalid("max_attempts must be at least 1"));
    }

    let mut out = Array2::<f64>::zeros((self.n, self.n_assets));
    let uniform = Uniform::new(0.0, 1.0);

    for mut row in out.rows_mut() {
      let w = if self.allow_short {
        self.draw_row(&StandardNormal, rng)?
      } else {
        self.draw_row(&uniform, rng)?
      };
      row.assign(&w);
    }

    Ok(out)
  }

  fn draw_row<D, R>(&self, dist: &D, rng: &mut R) -> Result<Array1<f64>>
  where
    D: Distribution<f64>,
    R: Rng + ?Sized,
  {
    let mut sum = 0.0;
    for attempt in 1..=self.max_attempts {
      let z = Array1::<f64>::random_using(self.n_assets, dist, rng);
      sum = z.sum();
      if sum.abs() > self.sum_tolerance {
        return Ok(z / sum);
      }
      debug!(attempt, sum, "weight sum near zero, resampling");
    }

    warn!(
      attempts = self.max_attempts,
      sum, "giving up on random portfolio, weight sum stayed near zero"
    );
    Err(Error::DegenerateSample {
      attempts: self.max_attempts,
      sum,
    })
  }
}

/// `n` random portfolios with the default degeneracy guard.
pub fn random_portfolios<R: Rng + ?Sized>(
  n: usize,
  n_assets: usize,
  allow_short: bool,
  rng: &mut R,
) -> Result<Array2<f64>> {
  RandomPortfolios::new(
    n,
    n_assets,
    allow_short,
    DEFAULT_SUM_TOLERANCE,
    DEFAULT_MAX_ATTEMPTS,
  )
  .sample(rng)
}
