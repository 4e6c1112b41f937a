//! Mathematical utilities: the OLS solve and scoring metrics.

pub mod metrics;
pub mod ols;

pub use metrics::*;
pub use ols::*;
