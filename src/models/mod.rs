//! Fitted model representation.

pub mod model;

pub use model::*;
