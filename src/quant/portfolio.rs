//! # Portfolio
//!
//! $$
//! \sigma_p^2 = \mathbf{w}^\top \Sigma \mathbf{w}
//! $$
//!
//! Minimum-variance line, efficient frontier and feasible-region geometry.

pub mod data;
pub mod engine;
pub mod fixtures;
pub mod geometry;
pub mod mvl;
pub mod sampling;
pub mod types;

pub use data::build_covariance;
pub use engine::PortfolioEngine;
pub use engine::PortfolioEngineConfig;
pub use geometry::feasible_mask;
pub use geometry::filter_feasible;
pub use geometry::is_feasible;
pub use geometry::portfolio_return;
pub use geometry::portfolio_return_batch;
pub use geometry::portfolio_risk;
pub use geometry::portfolio_risk_batch;
pub use geometry::two_asset_edge;
pub use mvl::evaluate_mvl;
pub use mvl::MvlCoefficients;
pub use sampling::random_portfolios;
pub use sampling::RandomPortfolios;
pub use types::AssetSet;
pub use types::CorrelationMatrix;
pub use types::CovarianceMatrix;
pub use types::Portfolio;
