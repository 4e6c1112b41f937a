//! The regression processor: the entry points a host calls.
//!
//! Every call is self-contained. Datasets are read from disk, models are
//! loaded fresh from the model directory, and nothing is cached between calls.
//!
//! Two traits describe the capability surface:
//! - [`Regressor`] is what a generic host uses to drive any regression backend.
//! - [`Classifier`] exists so a host probing for classification gets an
//!   immediate `UnsupportedOperation` instead of partial work.

use std::path::{Path, PathBuf};

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use tracing::{info, info_span, warn};

use crate::config::ProcessorConfig;
use crate::domain::{
    EstimateResult, EvaluationResult, Prediction, PredictionSet, Status, TrainingResult,
    TrainingSet,
};
use crate::error::{RegressionError, Result};
use crate::fit::evaluator::{self, EvaluationData};
use crate::fit::limiter::limit_samples;
use crate::io::dataset::{read_prediction_file, read_training_file};
use crate::io::model_store;
use crate::math::MIN_FIT_ROWS;
use crate::models::LinearModel;

const CLASSIFICATION_ALTERNATIVE: &str = "a classification backend";

/// Regression capabilities exposed to a host.
pub trait Regressor {
    /// Fit a model on `dataset` and store it.
    fn train(&self, dataset: &Path) -> Result<TrainingResult>;

    /// Predict every row of `dataset` with the stored model.
    fn estimate(&self, dataset: &Path) -> Result<EstimateResult>;

    /// Score the model configuration (or the model in `pretrained_dir`) on `dataset`.
    fn evaluate(
        &self,
        dataset: &Path,
        max_deviation: f64,
        iterations: usize,
        pretrained_dir: Option<&Path>,
    ) -> Result<EvaluationResult>;

    /// Location of the stored model, ready to be packaged by the host.
    fn export(&self) -> Result<PathBuf>;

    /// Best-effort copy of a model from `source` into this processor's directory.
    fn import(&self, source: &Path) -> bool;
}

/// Classification entry points. This backend only does regression.
pub trait Classifier {
    fn train_classification(&self, dataset: &Path) -> Result<TrainingResult>;

    fn classify(&self, dataset: &Path) -> Result<EstimateResult>;

    fn evaluate_classification(
        &self,
        dataset: &Path,
        max_deviation: f64,
        iterations: usize,
        pretrained_dir: Option<&Path>,
    ) -> Result<EvaluationResult>;
}

/// OLS regression backend bound to one model directory.
#[derive(Debug, Clone)]
pub struct RegressionProcessor {
    config: ProcessorConfig,
    model_dir: PathBuf,
}

impl RegressionProcessor {
    pub fn new(config: ProcessorConfig, model_dir: impl Into<PathBuf>) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            config,
            model_dir: model_dir.into(),
        })
    }

    pub fn config(&self) -> &ProcessorConfig {
        &self.config
    }

    pub fn model_dir(&self) -> &Path {
        &self.model_dir
    }

    /// Train on an already parsed dataset.
    pub fn train_set(&self, set: TrainingSet) -> Result<TrainingResult> {
        let _span = info_span!("train", model_dir = %self.model_dir.display()).entered();

        let rows_total = set.len();
        let nfeatures = set.nfeatures();
        let mut notices = coercion_notice(set.coerced_values);

        let limited = limit_samples(set.samples, set.targets, self.config.max_training_samples);
        if limited.was_limited {
            info!(
                kept = limited.kept(),
                total = limited.total_before,
                "Training set capped to most recent rows"
            );
            notices.push(format!(
                "Training used the most recent {} of {} samples.",
                limited.kept(),
                limited.total_before
            ));
        }

        // Counted after the cap: a cap of 1 leaves too few rows as well.
        let rows_used = limited.kept();
        if rows_used < MIN_FIT_ROWS {
            warn!(rows = rows_used, total = rows_total, "Not enough rows to train");
            notices.push(format!(
                "Not enough data to train: {rows_used} rows available, at least {MIN_FIT_ROWS} required."
            ));
            return Ok(TrainingResult {
                status: Status::INSUFFICIENT_DATA,
                notices,
                rows_used: 0,
                rows_total,
            });
        }

        let model = LinearModel::fit(&limited.samples, &limited.targets, nfeatures)?;
        model_store::save_model(&model, &self.model_dir)?;

        info!(rows = rows_used, nfeatures, "Model trained");
        Ok(TrainingResult {
            status: Status::OK,
            notices,
            rows_used,
            rows_total,
        })
    }

    /// Predict an already parsed dataset with the stored model.
    pub fn estimate_set(&self, set: PredictionSet) -> Result<EstimateResult> {
        let model = model_store::load_model(&self.model_dir)?;
        self.predict_set(&model, set)
    }

    fn predict_set(&self, model: &LinearModel, set: PredictionSet) -> Result<EstimateResult> {
        let _span = info_span!("estimate", model_dir = %self.model_dir.display()).entered();
        ensure_features(model, set.nfeatures())?;

        let notices = coercion_notice(set.coerced_values);
        let predictions: Vec<Prediction> = set
            .sample_ids
            .into_iter()
            .zip(&set.samples)
            .enumerate()
            .map(|(row, (sample_id, sample))| Prediction {
                row,
                sample_id,
                value: model.predict(sample),
            })
            .collect();

        info!(rows = predictions.len(), "Estimates computed");
        Ok(EstimateResult {
            status: Status::OK,
            notices,
            predictions,
        })
    }

    /// Evaluate an already parsed dataset, drawing splits from `rng`.
    pub fn evaluate_set<R: Rng + ?Sized>(
        &self,
        set: &TrainingSet,
        max_deviation: f64,
        iterations: usize,
        pretrained_dir: Option<&Path>,
        rng: &mut R,
    ) -> Result<EvaluationResult> {
        let _span = info_span!("evaluate", iterations, max_deviation).entered();

        let pretrained = match pretrained_dir {
            Some(dir) => {
                let model = model_store::load_model(dir)?;
                ensure_features(&model, set.nfeatures())?;
                Some(model)
            }
            None => None,
        };

        let data = EvaluationData {
            samples: &set.samples,
            targets: &set.targets,
            nfeatures: set.nfeatures(),
        };
        let mut result = evaluator::evaluate(
            data,
            iterations,
            max_deviation,
            pretrained.as_ref(),
            &self.config.evaluation_options(),
            rng,
        )?;

        let mut notices = coercion_notice(set.coerced_values);
        notices.append(&mut result.notices);
        result.notices = notices;
        Ok(result)
    }

    fn rng(&self) -> StdRng {
        match self.config.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        }
    }
}

impl Regressor for RegressionProcessor {
    fn train(&self, dataset: &Path) -> Result<TrainingResult> {
        self.train_set(read_training_file(dataset)?)
    }

    fn estimate(&self, dataset: &Path) -> Result<EstimateResult> {
        // No model, no point reading the dataset.
        let model = model_store::load_model(&self.model_dir)?;
        self.predict_set(&model, read_prediction_file(dataset)?)
    }

    fn evaluate(
        &self,
        dataset: &Path,
        max_deviation: f64,
        iterations: usize,
        pretrained_dir: Option<&Path>,
    ) -> Result<EvaluationResult> {
        let set = read_training_file(dataset)?;
        let mut rng = self.rng();
        self.evaluate_set(&set, max_deviation, iterations, pretrained_dir, &mut rng)
    }

    fn export(&self) -> Result<PathBuf> {
        model_store::export_model(&self.model_dir)
    }

    fn import(&self, source: &Path) -> bool {
        model_store::import_model(source, &self.model_dir)
    }
}

impl Classifier for RegressionProcessor {
    fn train_classification(&self, _dataset: &Path) -> Result<TrainingResult> {
        Err(unsupported("train_classification"))
    }

    fn classify(&self, _dataset: &Path) -> Result<EstimateResult> {
        Err(unsupported("classify"))
    }

    fn evaluate_classification(
        &self,
        _dataset: &Path,
        _max_deviation: f64,
        _iterations: usize,
        _pretrained_dir: Option<&Path>,
    ) -> Result<EvaluationResult> {
        Err(unsupported("evaluate_classification"))
    }
}

fn unsupported(operation: &'static str) -> RegressionError {
    RegressionError::UnsupportedOperation {
        operation,
        alternative: CLASSIFICATION_ALTERNATIVE,
    }
}

fn ensure_features(model: &LinearModel, found: usize) -> Result<()> {
    if model.nfeatures() != found {
        return Err(RegressionError::FeatureMismatch {
            expected: model.nfeatures(),
            found,
        });
    }
    Ok(())
}

fn coercion_notice(coerced: usize) -> Vec<String> {
    if coerced == 0 {
        return Vec::new();
    }
    vec![format!("{coerced} non-numeric values were read as 0.")]
}
