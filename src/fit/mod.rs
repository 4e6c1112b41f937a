//! Training policy and evaluation.
//!
//! Responsibilities:
//!
//! - cap the training set to its most recent rows (`limiter`)
//! - score a model configuration with repeated random splits (`evaluator`)

pub mod evaluator;
pub mod limiter;

pub use evaluator::*;
pub use limiter::*;
