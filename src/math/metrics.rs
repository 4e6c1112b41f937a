//! Scoring helpers for the evaluator.

/// Coefficient of determination `1 - SS_res / SS_tot`.
///
/// Returns `0.0` when the actual values have no variance (or there are none),
/// whatever the predictions are.
pub fn r_squared(actual: &[f64], predicted: &[f64]) -> f64 {
    if actual.is_empty() {
        return 0.0;
    }

    let mean_actual = mean(actual);
    let ss_tot: f64 = actual.iter().map(|a| (a - mean_actual).powi(2)).sum();
    if ss_tot == 0.0 {
        return 0.0;
    }

    let ss_res: f64 = actual
        .iter()
        .zip(predicted)
        .map(|(a, p)| (a - p).powi(2))
        .sum();

    1.0 - ss_res / ss_tot
}

pub fn mean(values: &[f64]) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    values.iter().sum::<f64>() / values.len() as f64
}

/// Standard deviation dividing by `n` (not `n - 1`).
pub fn population_std_dev(values: &[f64]) -> f64 {
    if values.len() < 2 {
        return 0.0;
    }
    let m = mean(values);
    let variance = values.iter().map(|v| (v - m).powi(2)).sum::<f64>() / values.len() as f64;
    variance.sqrt()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn perfect_predictions_score_one() {
        let actual = [1.0, 2.0, 3.0, 4.0];
        assert!((r_squared(&actual, &actual) - 1.0).abs() < 1e-12);
    }

    #[test]
    fn constant_actuals_score_zero_regardless_of_predictions() {
        let actual = [5.0, 5.0, 5.0];
        assert_eq!(r_squared(&actual, &[5.0, 5.0, 5.0]), 0.0);
        assert_eq!(r_squared(&actual, &[100.0, -3.0, 0.0]), 0.0);
    }

    #[test]
    fn predicting_the_mean_scores_zero() {
        let actual = [1.0, 2.0, 3.0];
        assert!(r_squared(&actual, &[2.0, 2.0, 2.0]).abs() < 1e-12);
    }

    #[test]
    fn bad_predictions_go_negative() {
        let actual = [1.0, 2.0, 3.0];
        assert!(r_squared(&actual, &[3.0, 2.0, 1.0]) < 0.0);
    }

    #[test]
    fn population_std_dev_divides_by_n() {
        // Population std-dev of [2,4,4,4,5,5,7,9] is exactly 2.
        let values = [2.0, 4.0, 4.0, 4.0, 5.0, 5.0, 7.0, 9.0];
        assert!((population_std_dev(&values) - 2.0).abs() < 1e-12);
        assert_eq!(population_std_dev(&[0.7]), 0.0);
    }
}
