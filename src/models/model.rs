//! The fitted linear model.
//!
//! Fitting lives in `math::ols`; this type only owns the coefficients and
//! evaluates them, so prediction stays a small, pure function.

use chrono::{DateTime, Utc};

use crate::error::Result;
use crate::math::fit_ols;

/// Coefficients of one OLS solve, intercept first.
#[derive(Debug, Clone, PartialEq)]
pub struct LinearModel {
    coefficients: Vec<f64>,
    training_rows: usize,
    trained_at: DateTime<Utc>,
}

impl LinearModel {
    /// Fit a model on `samples` (each `nfeatures` long) against `targets`.
    pub fn fit(samples: &[Vec<f64>], targets: &[f64], nfeatures: usize) -> Result<Self> {
        let coefficients = fit_ols(samples, targets, nfeatures)?;
        Ok(Self {
            coefficients,
            training_rows: samples.len(),
            trained_at: Utc::now(),
        })
    }

    /// Rebuild a model from stored parts. Callers validate the coefficients.
    pub(crate) fn from_parts(
        coefficients: Vec<f64>,
        training_rows: usize,
        trained_at: DateTime<Utc>,
    ) -> Self {
        Self {
            coefficients,
            training_rows,
            trained_at,
        }
    }

    /// `β0 + Σ βj · x_j`.
    ///
    /// Features beyond `nfeatures()` are ignored; missing ones count as zero.
    pub fn predict(&self, sample: &[f64]) -> f64 {
        match self.coefficients.split_first() {
            Some((intercept, slopes)) => {
                intercept + slopes.iter().zip(sample).map(|(b, x)| b * x).sum::<f64>()
            }
            None => 0.0,
        }
    }

    pub fn predict_many(&self, samples: &[Vec<f64>]) -> Vec<f64> {
        samples.iter().map(|s| self.predict(s)).collect()
    }

    pub fn coefficients(&self) -> &[f64] {
        &self.coefficients
    }

    pub fn nfeatures(&self) -> usize {
        self.coefficients.len().saturating_sub(1)
    }

    pub fn training_rows(&self) -> usize {
        self.training_rows
    }

    pub fn trained_at(&self) -> DateTime<Utc> {
        self.trained_at
    }
}
