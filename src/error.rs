use std::path::PathBuf;

use thiserror::Error;

/// Every failure the regression backend can surface to a caller.
///
/// Advisory outcomes of an evaluation (low score, high variance) are not
/// errors; they are status bits on the result instead.
#[derive(Debug, Error)]
pub enum RegressionError {
    #[error("Malformed dataset: {0}")]
    MalformedDataset(String),

    #[error("Insufficient data: {found} rows available, at least {required} required")]
    InsufficientData { required: usize, found: usize },

    #[error("Singular matrix: the normal equations cannot be solved ({0})")]
    SingularMatrix(String),

    #[error("No model found in '{}'", .0.display())]
    ModelNotFound(PathBuf),

    #[error("Corrupt model '{}': {reason}", .path.display())]
    CorruptModel { path: PathBuf, reason: String },

    #[error("Feature count mismatch: model expects {expected} features, dataset has {found}")]
    FeatureMismatch { expected: usize, found: usize },

    #[error("Unsupported operation `{operation}`: use {alternative} instead")]
    UnsupportedOperation {
        operation: &'static str,
        alternative: &'static str,
    },

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("I/O error on '{}': {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl RegressionError {
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }

    /// Process exit code used by the `olsr` binary.
    pub fn exit_code(&self) -> u8 {
        match self {
            Self::MalformedDataset(_) | Self::InvalidConfig(_) | Self::Io { .. } => 2,
            Self::InsufficientData { .. } => 3,
            Self::SingularMatrix(_)
            | Self::ModelNotFound(_)
            | Self::CorruptModel { .. }
            | Self::FeatureMismatch { .. } => 4,
            Self::UnsupportedOperation { .. } => 5,
        }
    }
}

pub type Result<T, E = RegressionError> = std::result::Result<T, E>;
