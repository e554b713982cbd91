//! # portfolio-geometry
//!
//! $$
//! \mu_p = \mathbf{w}^\top \mu, \qquad \sigma_p = \sqrt{\mathbf{w}^\top \Sigma \mathbf{w}}
//! $$
//!
//! Classical portfolio-theory geometry: covariance construction, the minimum-variance
//! line, the efficient frontier, random portfolio clouds, two-asset edges of the
//! feasible region and a compounding convergence illustration.

pub mod error;
pub mod quant;
pub mod visualization;

pub use error::Error;
pub use error::Result;
