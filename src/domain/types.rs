//! Shared domain types.
//!
//! Result objects are serializable so they can be exported as JSON and handed
//! to a host process unchanged.

use std::collections::HashMap;
use std::fmt;
use std::ops::{BitOr, BitOrAssign};

use serde::{Deserialize, Serialize};

/// Outcome status of an operation.
///
/// Conditions combine: an evaluation can be both `LOW_SCORE` and
/// `HIGH_VARIANCE` at once. `OK` is the empty set.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Status(u8);

impl Status {
    pub const OK: Status = Status(0);
    pub const INSUFFICIENT_DATA: Status = Status(1 << 0);
    pub const LOW_SCORE: Status = Status(1 << 1);
    pub const HIGH_VARIANCE: Status = Status(1 << 2);

    const LABELS: [(Status, &'static str); 3] = [
        (Status::INSUFFICIENT_DATA, "insufficient-data"),
        (Status::LOW_SCORE, "low-score"),
        (Status::HIGH_VARIANCE, "high-variance"),
    ];

    pub fn bits(self) -> u8 {
        self.0
    }

    pub fn is_ok(self) -> bool {
        self.0 == 0
    }

    pub fn contains(self, other: Status) -> bool {
        other.0 != 0 && self.0 & other.0 == other.0
    }

    pub fn insert(&mut self, other: Status) {
        self.0 |= other.0;
    }

    /// Human-readable labels of every condition set.
    pub fn labels(self) -> Vec<&'static str> {
        if self.is_ok() {
            return vec!["ok"];
        }
        Self::LABELS
            .iter()
            .filter(|(flag, _)| self.contains(*flag))
            .map(|(_, label)| *label)
            .collect()
    }
}

impl BitOr for Status {
    type Output = Status;

    fn bitor(self, rhs: Status) -> Status {
        Status(self.0 | rhs.0)
    }
}

impl BitOrAssign for Status {
    fn bitor_assign(&mut self, rhs: Status) {
        self.insert(rhs);
    }
}

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.labels().join("+"))
    }
}

/// Key/value pairs from the two metadata lines of a dataset file.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DatasetMeta {
    pub nfeatures: usize,
    /// Every metadata field, keyed by lowercased name.
    pub fields: HashMap<String, String>,
}

/// Features + targets, as used for training and evaluation.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TrainingSet {
    pub meta: DatasetMeta,
    pub samples: Vec<Vec<f64>>,
    pub targets: Vec<f64>,
    /// Tokens that were not finite numbers and were read as `0.0`.
    pub coerced_values: usize,
}

impl TrainingSet {
    pub fn len(&self) -> usize {
        self.samples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    pub fn nfeatures(&self) -> usize {
        self.meta.nfeatures
    }
}

/// Sample ids + features, as used for prediction.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PredictionSet {
    pub meta: DatasetMeta,
    pub sample_ids: Vec<String>,
    pub samples: Vec<Vec<f64>>,
    pub coerced_values: usize,
}

impl PredictionSet {
    pub fn len(&self) -> usize {
        self.samples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    pub fn nfeatures(&self) -> usize {
        self.meta.nfeatures
    }
}

/// Returned by a train call.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrainingResult {
    pub status: Status,
    pub notices: Vec<String>,
    /// Rows the model was fitted on (after the sample cap).
    pub rows_used: usize,
    /// Rows read from the dataset.
    pub rows_total: usize,
}

/// A single prediction, keyed by its position in the input dataset.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Prediction {
    pub row: usize,
    pub sample_id: String,
    pub value: f64,
}

/// Returned by an estimate call. Predictions keep input row order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EstimateResult {
    pub status: Status,
    pub notices: Vec<String>,
    pub predictions: Vec<Prediction>,
}

/// Returned by an evaluate call.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EvaluationResult {
    pub status: Status,
    pub notices: Vec<String>,
    /// Mean R² across the iterations that completed.
    pub score: f64,
    /// Population standard deviation of `scores`.
    pub std_dev: f64,
    pub scores: Vec<f64>,
    /// Iterations actually attempted (1 when evaluating a pretrained model).
    pub iterations: usize,
    /// Iterations whose fit failed and were left out of the aggregate.
    pub failed_iterations: usize,
}

impl EvaluationResult {
    pub fn insufficient(found: usize, required: usize) -> Self {
        Self {
            status: Status::INSUFFICIENT_DATA,
            notices: vec![format!(
                "Not enough data to evaluate: {found} rows available, at least {required} required."
            )],
            score: 0.0,
            std_dev: 0.0,
            scores: Vec::new(),
            iterations: 0,
            failed_iterations: 0,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_combines_conditions() {
        let mut status = Status::OK;
        assert!(status.is_ok());
        status |= Status::LOW_SCORE;
        status.insert(Status::HIGH_VARIANCE);

        assert!(!status.is_ok());
        assert!(status.contains(Status::LOW_SCORE));
        assert!(status.contains(Status::HIGH_VARIANCE));
        assert!(!status.contains(Status::INSUFFICIENT_DATA));
        assert_eq!(status.to_string(), "low-score+high-variance");
    }

    #[test]
    fn ok_status_does_not_contain_itself_as_condition() {
        assert!(!Status::OK.contains(Status::OK));
        assert_eq!(Status::OK.labels(), vec!["ok"]);
    }

    #[test]
    fn status_serializes_as_bits() {
        let status = Status::INSUFFICIENT_DATA | Status::HIGH_VARIANCE;
        let json = serde_json::to_string(&status).unwrap();
        assert_eq!(json, "5");
        let back: Status = serde_json::from_str(&json).unwrap();
        assert_eq!(back, status);
    }
}
