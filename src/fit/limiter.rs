//! Training sample cap.
//!
//! Rows are assumed to be chronological (oldest first), so when a dataset is
//! larger than the cap we keep the most recent suffix.

/// Default maximum number of rows a model is trained on.
pub const DEFAULT_MAX_TRAINING_SAMPLES: usize = 20_000;

/// Output of [`limit_samples`].
#[derive(Debug, Clone, PartialEq)]
pub struct LimitedSamples {
    pub samples: Vec<Vec<f64>>,
    pub targets: Vec<f64>,
    pub was_limited: bool,
    /// Row count before the cap was applied.
    pub total_before: usize,
}

impl LimitedSamples {
    pub fn kept(&self) -> usize {
        self.samples.len()
    }
}

/// Keep at most `cap` rows, taken from the end. `cap == 0` means unlimited.
pub fn limit_samples(samples: Vec<Vec<f64>>, targets: Vec<f64>, cap: usize) -> LimitedSamples {
    let total_before = samples.len();

    if cap == 0 || total_before <= cap {
        return LimitedSamples {
            samples,
            targets,
            was_limited: false,
            total_before,
        };
    }

    let start = total_before - cap;
    let samples = samples.into_iter().skip(start).collect();
    let targets = targets.into_iter().skip(start).collect();

    LimitedSamples {
        samples,
        targets,
        was_limited: true,
        total_before,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rows(values: &[f64]) -> (Vec<Vec<f64>>, Vec<f64>) {
        (values.iter().map(|v| vec![*v]).collect(), values.to_vec())
    }

    #[test]
    fn keeps_the_last_cap_rows_in_order() {
        // A..E
        let (samples, targets) = rows(&[1.0, 2.0, 3.0, 4.0, 5.0]);
        let out = limit_samples(samples, targets, 3);

        assert!(out.was_limited);
        assert_eq!(out.total_before, 5);
        assert_eq!(out.kept(), 3);
        assert_eq!(out.samples, vec![vec![3.0], vec![4.0], vec![5.0]]);
        assert_eq!(out.targets, vec![3.0, 4.0, 5.0]);
    }

    #[test]
    fn zero_cap_is_identity() {
        let (samples, targets) = rows(&[1.0, 2.0, 3.0]);
        let out = limit_samples(samples.clone(), targets.clone(), 0);
        assert!(!out.was_limited);
        assert_eq!(out.samples, samples);
        assert_eq!(out.targets, targets);
        assert_eq!(out.total_before, 3);
    }

    #[test]
    fn cap_at_or_above_len_is_identity() {
        for cap in [3, 4, 20_000] {
            let (samples, targets) = rows(&[1.0, 2.0, 3.0]);
            let out = limit_samples(samples.clone(), targets.clone(), cap);
            assert!(!out.was_limited, "cap {cap}");
            assert_eq!(out.samples, samples);
            assert_eq!(out.targets, targets);
        }
    }

    #[test]
    fn output_length_equals_cap_when_over() {
        let values: Vec<f64> = (0..100).map(f64::from).collect();
        let (samples, targets) = rows(&values);
        let out = limit_samples(samples, targets, 7);
        assert_eq!(out.kept(), 7);
        assert_eq!(out.targets, values[93..].to_vec());
    }
}
