//! Ordinary least squares via the normal equations.
//!
//! We solve
//!
//! ```text
//! (XᵀX) β = Xᵀy
//! ```
//!
//! where `X` is the sample matrix with a leading column of ones (intercept).
//!
//! Implementation choices:
//! - `XᵀX` is square (`F + 1` columns), so an LU decomposition with partial
//!   pivoting is the natural solver. It never forms an explicit inverse.
//! - Engagement-style indicators are often collinear. A zero pivot is not the
//!   only way a system fails: a pivot that is tiny relative to the largest one
//!   yields coefficients dominated by rounding noise, so we reject those too.
//! - The pivot ratio is not scale-invariant. `XᵀX` squares feature
//!   magnitudes, so features on wildly different scales shrink the smallest
//!   pivot relative to the largest without any collinearity. A well-posed
//!   system can then be reported as singular; rescale such features first.

use nalgebra::{DMatrix, DVector};

use crate::error::{RegressionError, Result};

/// Smallest number of rows an OLS fit accepts.
pub const MIN_FIT_ROWS: usize = 2;

/// Pivots smaller than this fraction of the largest pivot count as zero.
const RELATIVE_PIVOT_TOLERANCE: f64 = 1e-10;

/// Build the design matrix `[1, x_1, ..., x_F]` for each sample.
pub fn design_matrix(samples: &[Vec<f64>], nfeatures: usize) -> DMatrix<f64> {
    DMatrix::from_fn(samples.len(), nfeatures + 1, |i, j| {
        if j == 0 {
            1.0
        } else {
            samples[i].get(j - 1).copied().unwrap_or(0.0)
        }
    })
}

/// Fit OLS coefficients (intercept first) for `samples` against `targets`.
pub fn fit_ols(samples: &[Vec<f64>], targets: &[f64], nfeatures: usize) -> Result<Vec<f64>> {
    let n = samples.len();
    if n < MIN_FIT_ROWS {
        return Err(RegressionError::InsufficientData {
            required: MIN_FIT_ROWS,
            found: n,
        });
    }
    if targets.len() != n {
        return Err(RegressionError::MalformedDataset(format!(
            "{n} samples but {} targets",
            targets.len()
        )));
    }

    let x = design_matrix(samples, nfeatures);
    let y = DVector::from_column_slice(targets);

    let beta = solve_normal_equations(&x, &y)?;
    Ok(beta.iter().copied().collect())
}

/// Solve `(XᵀX) β = Xᵀy` with an LU decomposition.
pub fn solve_normal_equations(x: &DMatrix<f64>, y: &DVector<f64>) -> Result<DVector<f64>> {
    let xtx = x.tr_mul(x);
    let xty = x.tr_mul(y);

    let lu = xtx.lu();

    let u = lu.u();
    let pivots: Vec<f64> = u.diagonal().iter().map(|v| v.abs()).collect();
    let max_pivot = pivots.iter().copied().fold(0.0, f64::max);
    let min_pivot = pivots.iter().copied().fold(f64::INFINITY, f64::min);

    if !(max_pivot.is_finite() && max_pivot > 0.0) {
        return Err(RegressionError::SingularMatrix(
            "XᵀX has no usable pivot".to_string(),
        ));
    }
    if min_pivot <= RELATIVE_PIVOT_TOLERANCE * max_pivot {
        return Err(RegressionError::SingularMatrix(format!(
            "pivot ratio {:.3e} below tolerance; features are collinear or rows are too few",
            min_pivot / max_pivot
        )));
    }

    let beta = lu
        .solve(&xty)
        .ok_or_else(|| RegressionError::SingularMatrix("LU solve failed".to_string()))?;

    if !beta.iter().all(|v| v.is_finite()) {
        return Err(RegressionError::SingularMatrix(
            "solution contains non-finite coefficients".to_string(),
        ));
    }

    Ok(beta)
}
