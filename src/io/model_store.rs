//! Persist fitted models.
//!
//! A model lives in a caller-chosen directory under a fixed file name. The
//! file is a JSON envelope:
//! - format tag + version
//! - `nfeatures` and the coefficients (intercept first)
//! - training metadata (row count, timestamp)
//! - a SHA-256 checksum over `nfeatures` and the coefficient bits
//!
//! Loading deserializes into that one envelope type (unknown fields are
//! rejected) and then validates it before a `LinearModel` is handed out.

use std::fs;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use tracing::{debug, info, warn};

use crate::error::{RegressionError, Result};
use crate::models::LinearModel;

pub const MODEL_FILE_NAME: &str = "model.ser";

const FORMAT_TAG: &str = "ols-linear-model";
const FORMAT_VERSION: u32 = 1;

#[derive(Debug, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
struct StoredModel {
    format: String,
    version: u32,
    nfeatures: usize,
    coefficients: Vec<f64>,
    training_rows: usize,
    trained_at: DateTime<Utc>,
    checksum: String,
}

impl StoredModel {
    fn from_model(model: &LinearModel) -> Self {
        Self {
            format: FORMAT_TAG.to_string(),
            version: FORMAT_VERSION,
            nfeatures: model.nfeatures(),
            coefficients: model.coefficients().to_vec(),
            training_rows: model.training_rows(),
            trained_at: model.trained_at(),
            checksum: compute_checksum(model.nfeatures(), model.coefficients()),
        }
    }

    fn into_model(self) -> std::result::Result<LinearModel, String> {
        if self.format != FORMAT_TAG {
            return Err(format!("unexpected format tag '{}'", self.format));
        }
        if self.version != FORMAT_VERSION {
            return Err(format!("unsupported format version {}", self.version));
        }
        if self.nfeatures == 0 || self.coefficients.len() != self.nfeatures + 1 {
            return Err(format!(
                "{} coefficients for {} features",
                self.coefficients.len(),
                self.nfeatures
            ));
        }
        if !self.coefficients.iter().all(|c| c.is_finite()) {
            return Err("non-finite coefficient".to_string());
        }
        if compute_checksum(self.nfeatures, &self.coefficients) != self.checksum {
            return Err("checksum mismatch".to_string());
        }

        Ok(LinearModel::from_parts(
            self.coefficients,
            self.training_rows,
            self.trained_at,
        ))
    }
}

/// Path of the model file inside `dir`.
pub fn model_path(dir: &Path) -> PathBuf {
    dir.join(MODEL_FILE_NAME)
}

/// Write `model` to `dir`, replacing any previous model there.
pub fn save_model(model: &LinearModel, dir: &Path) -> Result<PathBuf> {
    fs::create_dir_all(dir).map_err(|e| RegressionError::io(dir, e))?;

    let path = model_path(dir);
    let bytes = serde_json::to_vec(&StoredModel::from_model(model)).map_err(|e| {
        RegressionError::CorruptModel {
            path: path.clone(),
            reason: format!("serialization failed: {e}"),
        }
    })?;
    fs::write(&path, bytes).map_err(|e| RegressionError::io(&path, e))?;

    info!(
        path = %path.display(),
        nfeatures = model.nfeatures(),
        training_rows = model.training_rows(),
        "Model saved"
    );
    Ok(path)
}

/// Load and validate the model stored in `dir`.
pub fn load_model(dir: &Path) -> Result<LinearModel> {
    let (_, model) = read_stored(dir)?;
    debug!(dir = %dir.display(), nfeatures = model.nfeatures(), "Model loaded");
    Ok(model)
}

/// The exportable unit is the model directory itself.
pub fn export_model(dir: &Path) -> Result<PathBuf> {
    if !model_path(dir).is_file() {
        return Err(RegressionError::ModelNotFound(dir.to_path_buf()));
    }
    Ok(dir.to_path_buf())
}

/// Copy a valid model from `source` into `target`.
///
/// Best effort: returns `false` instead of failing when the source model is
/// missing or corrupt, or the copy cannot be written. Importing a directory
/// onto itself leaves the model untouched.
pub fn import_model(source: &Path, target: &Path) -> bool {
    let bytes = match read_stored(source) {
        Ok((bytes, _)) => bytes,
        Err(e) => {
            warn!(source = %source.display(), error = %e, "Model import skipped");
            return false;
        }
    };

    match copy_model(source, target, &bytes) {
        Ok(()) => {
            info!(source = %source.display(), target = %target.display(), "Model imported");
            true
        }
        Err(e) => {
            warn!(target = %target.display(), error = %e, "Model import failed");
            false
        }
    }
}

/// Raw bytes of the model file in `dir` together with the validated model.
fn read_stored(dir: &Path) -> Result<(Vec<u8>, LinearModel)> {
    let path = model_path(dir);
    if !path.is_file() {
        return Err(RegressionError::ModelNotFound(dir.to_path_buf()));
    }
    let bytes = fs::read(&path).map_err(|e| RegressionError::io(&path, e))?;
    let model = decode(&bytes).map_err(|reason| RegressionError::CorruptModel { path, reason })?;
    Ok((bytes, model))
}

/// Write `bytes` into `target` through a sibling temp file and a rename, so a
/// failed write never leaves a truncated model behind.
fn copy_model(source: &Path, target: &Path, bytes: &[u8]) -> std::io::Result<()> {
    fs::create_dir_all(target)?;
    if fs::canonicalize(source)? == fs::canonicalize(target)? {
        debug!(dir = %target.display(), "Import source is the target; nothing to copy");
        return Ok(());
    }

    let staged = target.join(format!("{MODEL_FILE_NAME}.tmp"));
    fs::write(&staged, bytes)?;
    fs::rename(&staged, model_path(target)).inspect_err(|_| {
        let _ = fs::remove_file(&staged);
    })
}

fn decode(bytes: &[u8]) -> std::result::Result<LinearModel, String> {
    let stored: StoredModel =
        serde_json::from_slice(bytes).map_err(|e| format!("not a stored model: {e}"))?;
    stored.into_model()
}

fn compute_checksum(nfeatures: usize, coefficients: &[f64]) -> String {
    let mut hasher = Sha256::new();
    hasher.update((nfeatures as u64).to_le_bytes());
    for c in coefficients {
        hasher.update(c.to_bits().to_le_bytes());
    }
    hex::encode(hasher.finalize())
}
