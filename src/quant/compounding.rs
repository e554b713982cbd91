//! # Compounding Convergence
//!
//! $$
//! \lim_{m\to\infty}\left(1 + \frac{r}{m}\right)^{m t} = e^{r t}
//! $$
//!
//! Growth factors under discrete compounding at increasing frequencies and their
//! gap to continuous compounding.

use crate::error::Error;
use crate::error::Result;
use crate::visualization::SeriesSink;

/// Growth factor `(1 + r/m)^(m t)` for `m` compounding periods per year.
pub fn compound_factor(rate: f64, periods_per_year: u32, years: f64) -> Result<f64> {
  if periods_per_year == 0 {
    return Err(Error::invalid("compounding needs at least one period per year"));
  }
  let m = f64::from(periods_per_year);
  let base = 1.0 + rate / m;
  if base <= 0.0 {
    return Err(Error::invalid(format!(
      "rate {rate} wipes out the principal within one of {periods_per_year} periods"
    )));
  }
  Ok(base.powf(m * years))
}

/// Growth factor `e^(r t)` under continuous compounding.
pub fn continuous_factor(rate: f64, years: f64) -> f64 {
  (rate * years).exp()
}

/// Discrete factor at one frequency and its distance to the continuous limit.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct CompoundingPoint {
  pub periods_per_year: u32,
  pub factor: f64,
  /// `continuous_factor - factor`.
  pub gap: f64,
}

/// One [`CompoundingPoint`] per entry of `frequencies`, in the given order.
pub fn compounding_convergence(
  rate: f64,
  years: f64,
  frequencies: &[u32],
) -> Result<Vec<CompoundingPoint>> {
  let limit = continuous_factor(rate, years);
  frequencies
    .iter()
    .map(|&m| {
      let factor = compound_factor(rate, m, years)?;
      Ok(CompoundingPoint {
        periods_per_year: m,
        factor,
        gap: limit - factor,
      })
    })
    .collect()
}

/// Push the discrete factors against frequency, plus the continuous limit as a
/// flat line over the same frequencies.
pub fn plot_convergence<S: SeriesSink>(
  rate: f64,
  years: f64,
  frequencies: &[u32],
  sink: &mut S,
) -> Result<()> {
  let points = compounding_convergence(rate, years, frequencies)?;
  let x: Vec<f64> = points.iter().map(|p| f64::from(p.periods_per_year)).collect();
  let y: Vec<f64> = points.iter().map(|p| p.factor).collect();
  let limit = vec![continuous_factor(rate, years); x.len()];

  sink.push_series("discrete compounding", &x, &y)?;
  sink.push_series("continuous compounding", &x, &limit)
}

#[cfg(test)]
mod tests {
  use approx::assert_relative_eq;

  use super::*;
  use crate::visualization::SeriesCollector;

  #[test]
  fn annual_compounding_is_simple_growth() -> anyhow::Result<()> {
    assert_relative_eq!(compound_factor(0.1, 1, 1.0)?, 1.1, epsilon = 1e-12);
    assert_relative_eq!(compound_factor(0.1, 2, 1.0)?, 1.1025, epsilon = 1e-12);
    let monthly = (1.0 + 0.1 / 12.0_f64).powi(24);
    assert_relative_eq!(compound_factor(0.1, 12, 2.0)?, monthly, epsilon = 1e-12);
    Ok(())
  }

  #[test]
  fn gap_shrinks_towards_continuous_limit() -> anyhow::Result<()> {
    let freqs = [1, 2, 4, 12, 52, 365, 8760];
    let points = compounding_convergence(0.1, 1.0, &freqs)?;

    for pair in points.windows(2) {
      assert!(pair[0].gap > 0.0);
      assert!(pair[1].gap < pair[0].gap);
      assert!(pair[1].factor > pair[0].factor);
    }
    let last = points[points.len() - 1];
    assert_relative_eq!(last.factor, 0.1_f64.exp(), epsilon = 1e-5);
    Ok(())
  }

  #[test]
  fn rejects_degenerate_compounding() {
    assert!(compound_factor(0.1, 0, 1.0).is_err());
    assert!(compound_factor(-2.0, 1, 1.0).is_err());
    assert!(compounding_convergence(0.1, 1.0, &[1, 0]).is_err());
  }

  #[test]
  fn plot_pushes_discrete_and_limit() -> anyhow::Result<()> {
    let mut sink = SeriesCollector::default();
    plot_convergence(0.05, 1.0, &[1, 4, 12], &mut sink)?;

    let discrete = sink
      .get("discrete compounding")
      .ok_or_else(|| anyhow::anyhow!("missing discrete series"))?;
    assert_eq!(discrete.x, vec![1.0, 4.0, 12.0]);
    let limit = sink
      .get("continuous compounding")
      .ok_or_else(|| anyhow::anyhow!("missing limit series"))?;
    assert!(limit.y.iter().all(|&v| v == 0.05_f64.exp()));
    Ok(())
  }
}
