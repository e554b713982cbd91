//! # Visualization
//!
//! $$
//! \text{curves }\{(x_k, y_k)\}_{k=1}^m \mapsto \text{sink}
//! $$
//!
//! Rendering is injected: producers hand labelled `(x, y)` sequences to a
//! [`SeriesSink`], and the sink decides what to draw or store.

use impl_new_derive::ImplNew;

use crate::error::Error;
use crate::error::Result;

/// Receiver of labelled coordinate sequences.
pub trait SeriesSink {
  fn push_series(&mut self, label: &str, x: &[f64], y: &[f64]) -> Result<()>;
}

/// One labelled curve.
#[derive(ImplNew, Clone, Debug, PartialEq)]
pub struct Series {
  pub label: String,
  pub x: Vec<f64>,
  pub y: Vec<f64>,
}

impl Series {
  pub fn len(&self) -> usize {
    self.x.len()
  }

  pub fn is_empty(&self) -> bool {
    self.x.is_empty()
  }
}

/// In-memory sink that keeps every series in push order.
#[derive(Clone, Debug, Default)]
pub struct SeriesCollector {
  series: Vec<Series>,
}

impl SeriesCollector {
  pub fn series(&self) -> &[Series] {
    &self.series
  }

  /// First series pushed under `label`.
  pub fn get(&self, label: &str) -> Option<&Series> {
    self.series.iter().find(|s| s.label == label)
  }

  pub fn into_series(self) -> Vec<Series> {
    self.series
  }
}

impl SeriesSink for SeriesCollector {
  fn push_series(&mut self, label: &str, x: &[f64], y: &[f64]) -> Result<()> {
    if x.len() != y.len() {
      return Err(Error::invalid(format!(
        "series '{label}' has {} x values but {} y values",
        x.len(),
        y.len()
      )));
    }
    self
      .series
      .push(Series::new(label.to_string(), x.to_vec(), y.to_vec()));
    Ok(())
  }
}
