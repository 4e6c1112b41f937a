//! Input/output helpers.
//!
//! - dataset ingest (`dataset`)
//! - model persistence (`model_store`)
//! - result exports (CSV/JSON) (`export`)

pub mod dataset;
pub mod export;
pub mod model_store;

pub use dataset::*;
pub use export::*;
pub use model_store::*;
