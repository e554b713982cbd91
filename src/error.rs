//! # Errors
//!
//! Error type shared by the portfolio and compounding modules.

use thiserror::Error;

/// Errors raised by portfolio geometry computations.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum Error {
  /// Malformed dimensions or numeric properties of an input.
  #[error("invalid input: {0}")]
  InvalidInput(String),

  /// A random weight vector kept summing to (almost) zero.
  #[error("degenerate sample: row sum {sum:e} stayed near zero after {attempts} attempts")]
  DegenerateSample {
    /// Number of draws attempted for the row.
    attempts: usize,
    /// Sum of the last rejected draw.
    sum: f64,
  },
}

impl Error {
  pub(crate) fn invalid(msg: impl Into<String>) -> Self {
    Self::InvalidInput(msg.into())
  }
}

/// Result alias used across the crate.
pub type Result<T> = std::result::Result<T, Error>;
