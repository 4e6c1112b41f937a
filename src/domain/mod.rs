//! Domain types used throughout the backend.
//!
//! This module defines:
//!
//! - parsed datasets (`TrainingSet`, `PredictionSet`)
//! - the combinable result status (`Status`)
//! - result objects returned by train / estimate / evaluate

pub mod types;

pub use types::*;
