//! `ols-regressor` library crate.
//!
//! An ordinary least squares regression backend: parse a dataset, train and
//! persist a linear model, predict with it, and evaluate predictive quality
//! with repeated random splits scored by R².
//!
//! The binary (`olsr`) is a thin wrapper around this library so that a host
//! process can embed the processor directly and tests never spawn processes.

pub mod app;
pub mod cli;
pub mod config;
pub mod domain;
pub mod error;
pub mod fit;
pub mod io;
pub mod logging;
pub mod math;
pub mod models;
pub mod processor;
pub mod report;

pub use config::ProcessorConfig;
pub use error::{RegressionError, Result};
pub use processor::{Classifier, RegressionProcessor, Regressor};
