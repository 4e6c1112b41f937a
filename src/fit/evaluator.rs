//! Model evaluation by repeated random train/test splits.
//!
//! Each iteration shuffles the row indices, fits a fresh model on the first
//! `1 - test_fraction` of them and scores R² on the rest. The aggregate score
//! is the mean over iterations; its spread (population std-dev) tells us
//! whether there is enough data for the score to be trusted.
//!
//! An iteration whose split produces a singular system is left out of the
//! aggregate and reported in the notices. If no iteration succeeds the whole
//! evaluation fails.

use rand::Rng;
use rand::seq::SliceRandom;
use tracing::{debug, info, warn};

use crate::domain::{EvaluationResult, Status};
use crate::error::{RegressionError, Result};
use crate::math::{MIN_FIT_ROWS, mean, population_std_dev, r_squared};
use crate::models::LinearModel;

/// Fewest rows an evaluation accepts.
pub const MIN_EVALUATION_ROWS: usize = 4;

pub const DEFAULT_TEST_FRACTION: f64 = 0.2;

/// Mean R² below which an evaluation is flagged `LOW_SCORE`.
pub const DEFAULT_MIN_SCORE: f64 = 0.6;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EvaluationOptions {
    /// Share of rows held out for scoring in each iteration.
    pub test_fraction: f64,
    pub min_score: f64,
}

impl Default for EvaluationOptions {
    fn default() -> Self {
        Self {
            test_fraction: DEFAULT_TEST_FRACTION,
            min_score: DEFAULT_MIN_SCORE,
        }
    }
}

/// Borrowed view of the data being evaluated.
#[derive(Debug, Clone, Copy)]
pub struct EvaluationData<'a> {
    pub samples: &'a [Vec<f64>],
    pub targets: &'a [f64],
    pub nfeatures: usize,
}

/// Evaluate a model configuration (or a pretrained model) on `data`.
///
/// With a pretrained model the dataset is scored as a whole, once.
pub fn evaluate<R: Rng + ?Sized>(
    data: EvaluationData<'_>,
    iterations: usize,
    max_deviation: f64,
    pretrained: Option<&LinearModel>,
    opts: &EvaluationOptions,
    rng: &mut R,
) -> Result<EvaluationResult> {
    let n = data.samples.len();
    if n < MIN_EVALUATION_ROWS {
        info!(rows = n, "Not enough rows to evaluate");
        return Ok(EvaluationResult::insufficient(n, MIN_EVALUATION_ROWS));
    }

    let mut notices = Vec::new();
    let mut scores = Vec::new();
    let mut failed_iterations = 0usize;

    let iterations = match pretrained {
        Some(model) => {
            let predicted = model.predict_many(data.samples);
            scores.push(r_squared(data.targets, &predicted));
            1
        }
        None => {
            let iterations = iterations.max(1);
            let train_len = train_len(n, opts.test_fraction);
            let mut indices: Vec<usize> = (0..n).collect();

            for iteration in 0..iterations {
                indices.shuffle(rng);
                let (train_idx, test_idx) = indices.split_at(train_len);

                match score_split(data, train_idx, test_idx) {
                    Ok(score) => {
                        debug!(iteration, score, "Evaluation iteration scored");
                        scores.push(score);
                    }
                    Err(RegressionError::SingularMatrix(reason)) => {
                        warn!(iteration, %reason, "Evaluation iteration skipped");
                        failed_iterations += 1;
                        notices.push(format!(
                            "Iteration {} skipped: the training split could not be solved ({reason}).",
                            iteration + 1
                        ));
                    }
                    Err(e) => return Err(e),
                }
            }
            iterations
        }
    };

    if scores.is_empty() {
        return Err(RegressionError::SingularMatrix(format!(
            "all {iterations} evaluation iterations failed"
        )));
    }

    let score = mean(&scores);
    let std_dev = population_std_dev(&scores);
    let status = classify(score, std_dev, max_deviation, opts.min_score, &mut notices);

    info!(
        score,
        std_dev,
        iterations,
        failed_iterations,
        status = %status,
        "Evaluation complete"
    );

    Ok(EvaluationResult {
        status,
        notices,
        score,
        std_dev,
        scores,
        iterations,
        failed_iterations,
    })
}

/// Rows used for training in each split; both sides stay non-empty.
fn train_len(n: usize, test_fraction: f64) -> usize {
    let raw = ((1.0 - test_fraction) * n as f64).round() as usize;
    raw.clamp(MIN_FIT_ROWS, n - 1)
}

fn score_split(data: EvaluationData<'_>, train_idx: &[usize], test_idx: &[usize]) -> Result<f64> {
    let train_samples: Vec<Vec<f64>> = train_idx.iter().map(|&i| data.samples[i].clone()).collect();
    let train_targets: Vec<f64> = train_idx.iter().map(|&i| data.targets[i]).collect();

    let model = LinearModel::fit(&train_samples, &train_targets, data.nfeatures)?;

    let actual: Vec<f64> = test_idx.iter().map(|&i| data.targets[i]).collect();
    let predicted: Vec<f64> = test_idx
        .iter()
        .map(|&i| model.predict(&data.samples[i]))
        .collect();

    Ok(r_squared(&actual, &predicted))
}

fn classify(
    score: f64,
    std_dev: f64,
    max_deviation: f64,
    min_score: f64,
    notices: &mut Vec<String>,
) -> Status {
    let mut status = Status::OK;

    if std_dev > max_deviation {
        status |= Status::HIGH_VARIANCE;
        notices.push(format!(
            "Scores vary too much between iterations (std-dev {std_dev:.4} > allowed {max_deviation:.4}); more data is needed."
        ));
    }
    if score < min_score {
        status |= Status::LOW_SCORE;
        notices.push(format!(
            "Mean R² {score:.4} is below the minimum acceptable score {min_score:.2}."
        ));
    }

    status
}

#[cfg(test)]
mod tests {
    use rand::SeedableRng;
    use rand::rngs::StdRng;
    use rand_distr::{Distribution, Normal};

    use super::*;

    fn linear_data(n: usize) -> (Vec<Vec<f64>>, Vec<f64>) {
        let samples: Vec<Vec<f64>> = (0..n)
            .map(|i| vec![i as f64, ((i * 7) % 11) as f64])
            .collect();
        let targets = samples.iter().map(|s| 3.0 + 2.0 * s[0] - 0.5 * s[1]).collect();
        (samples, targets)
    }

    fn data<'a>(samples: &'a [Vec<f64>], targets: &'a [f64], nfeatures: usize) -> EvaluationData<'a> {
        EvaluationData {
            samples,
            targets,
            nfeatures,
        }
    }

    #[test]
    fn fewer_than_four_rows_is_insufficient_without_fitting() {
        // Identical rows would be singular if a fit were attempted.
        let samples = vec![vec![1.0]; 3];
        let targets = vec![1.0; 3];
        let mut rng = StdRng::seed_from_u64(1);

        let result = evaluate(
            data(&samples, &targets, 1),
            5,
            0.1,
            None,
            &EvaluationOptions::default(),
            &mut rng,
        )
        .unwrap();

        assert!(result.status.contains(Status::INSUFFICIENT_DATA));
        assert_eq!(result.score, 0.0);
        assert!(result.scores.is_empty());
        assert_eq!(result.notices.len(), 1);
    }

    #[test]
    fn noiseless_linear_data_scores_one() {
        let (samples, targets) = linear_data(50);
        let mut rng = StdRng::seed_from_u64(7);

        let result = evaluate(
            data(&samples, &targets, 2),
            10,
            0.01,
            None,
            &EvaluationOptions::default(),
            &mut rng,
        )
        .unwrap();

        assert_eq!(result.iterations, 10);
        assert_eq!(result.scores.len(), 10);
        assert!((result.score - 1.0).abs() < 1e-9);
        assert!(result.std_dev < 1e-9);
        assert!(result.status.is_ok(), "{:?}", result.notices);
        assert!(result.notices.is_empty());
    }

    #[test]
    fn pure_noise_scores_low_and_flags_both_conditions() {
        let normal = Normal::new(0.0, 1.0).unwrap();
        let mut noise_rng = StdRng::seed_from_u64(42);
        let samples: Vec<Vec<f64>> = (0..200).map(|i| vec![i as f64]).collect();
        let targets: Vec<f64> = (0..200).map(|_| normal.sample(&mut noise_rng)).collect();

        let mut rng = StdRng::seed_from_u64(3);
        let result = evaluate(
            data(&samples, &targets, 1),
            5,
            0.0,
            None,
            &EvaluationOptions::default(),
            &mut rng,
        )
        .unwrap();

        assert!(result.score < 0.1, "score {}", result.score);
        assert!(result.status.contains(Status::LOW_SCORE));
        assert!(result.status.contains(Status::HIGH_VARIANCE));
        assert_eq!(result.notices.len(), 2);
    }

    #[test]
    fn pretrained_model_scores_whole_dataset_once() {
        let (samples, targets) = linear_data(20);
        let model = LinearModel::fit(&samples, &targets, 2).unwrap();
        let mut rng = StdRng::seed_from_u64(0);

        let result = evaluate(
            data(&samples, &targets, 2),
            25,
            0.01,
            Some(&model),
            &EvaluationOptions::default(),
            &mut rng,
        )
        .unwrap();

        assert_eq!(result.iterations, 1);
        assert_eq!(result.scores.len(), 1);
        assert!((result.score - 1.0).abs() < 1e-9);
        assert_eq!(result.std_dev, 0.0);
    }

    #[test]
    fn singular_iterations_are_excluded_from_the_aggregate() {
        // Only the last row has a non-zero feature. Whenever it lands in the
        // test split, the training split is singular.
        let samples: Vec<Vec<f64>> = (0..10).map(|i| vec![if i == 9 { 1.0 } else { 0.0 }]).collect();
        let targets: Vec<f64> = (0..10).map(|i| i as f64).collect();
        let mut rng = StdRng::seed_from_u64(11);

        let result = evaluate(
            data(&samples, &targets, 1),
            50,
            1.0,
            None,
            &EvaluationOptions::default(),
            &mut rng,
        )
        .unwrap();

        assert_eq!(result.iterations, 50);
        assert!(result.failed_iterations > 0);
        assert_eq!(result.scores.len() + result.failed_iterations, 50);
        assert!(result.notices.iter().any(|n| n.contains("skipped")));
    }

    #[test]
    fn all_iterations_failing_is_an_error() {
        let samples = vec![vec![2.0]; 8];
        let targets: Vec<f64> = (0..8).map(f64::from).collect();
        let mut rng = StdRng::seed_from_u64(5);

        let err = evaluate(
            data(&samples, &targets, 1),
            3,
            0.1,
            None,
            &EvaluationOptions::default(),
            &mut rng,
        )
        .unwrap_err();
        assert!(matches!(err, RegressionError::SingularMatrix(_)));
    }

    #[test]
    fn same_seed_gives_same_scores() {
        let normal = Normal::new(0.0, 0.5).unwrap();
        let mut noise_rng = StdRng::seed_from_u64(9);
        let samples: Vec<Vec<f64>> = (0..40).map(|i| vec![i as f64]).collect();
        let targets: Vec<f64> = (0..40)
            .map(|i| i as f64 + normal.sample(&mut noise_rng))
            .collect();

        let run = |seed| {
            let mut rng = StdRng::seed_from_u64(seed);
            evaluate(
                data(&samples, &targets, 1),
                4,
                0.5,
                None,
                &EvaluationOptions::default(),
                &mut rng,
            )
            .unwrap()
            .scores
        };
        assert_eq!(run(21), run(21));
    }

    #[test]
    fn split_is_eighty_twenty_and_never_empty() {
        assert_eq!(train_len(10, 0.2), 8);
        assert_eq!(train_len(4, 0.2), 3);
        assert_eq!(train_len(5, 0.0), 4);
        assert_eq!(train_len(5, 1.0), 2);
    }
}
