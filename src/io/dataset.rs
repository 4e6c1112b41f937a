//! Dataset ingest.
//!
//! A dataset file looks like:
//!
//! ```text
//! nfeatures,targetclasses,targettype      <- metadata names
//! 3,"[0,1]",real                          <- metadata values
//! f1,f2,f3,target                         <- column header (ignored)
//! 0.5,1,0,12.25                           <- rows
//! ```
//!
//! Training/evaluation rows hold `nfeatures` feature columns followed by the
//! target. Prediction rows hold a sample id followed by `nfeatures` features.
//!
//! Design goals:
//! - **Strict shape**: missing metadata and rows with the wrong number of
//!   columns are fatal.
//! - **Permissive values**: tokens that are not finite numbers are read as
//!   `0.0` and counted, never rejected.
//! - **Streaming**: rows are read one record at a time into the output arrays.

use std::collections::HashMap;
use std::fs::File;
use std::io::Read;
use std::path::Path;

use csv::StringRecord;
use tracing::{debug, warn};

use crate::domain::{DatasetMeta, PredictionSet, TrainingSet};
use crate::error::{RegressionError, Result};

const NFEATURES_FIELD: &str = "nfeatures";

/// Read a dataset of features + target.
pub fn read_training<R: Read>(input: R) -> Result<TrainingSet> {
    let mut reader = csv_reader(input);
    let meta = read_header(&mut reader)?;
    let nfeatures = meta.nfeatures;

    let mut out = TrainingSet {
        meta,
        ..TrainingSet::default()
    };

    let mut record = StringRecord::new();
    while next_record(&mut reader, &mut record)? {
        ensure_width(&record, nfeatures + 1, "features + target")?;

        let mut sample = Vec::with_capacity(nfeatures);
        for token in record.iter().take(nfeatures) {
            sample.push(coerce_f64(token, &mut out.coerced_values));
        }
        let target = coerce_f64(&record[nfeatures], &mut out.coerced_values);

        out.samples.push(sample);
        out.targets.push(target);
    }

    log_coercions(out.coerced_values, out.samples.len());
    debug!(rows = out.samples.len(), nfeatures, "Read training dataset");
    Ok(out)
}

/// Read a dataset of sample ids + features.
pub fn read_prediction<R: Read>(input: R) -> Result<PredictionSet> {
    let mut reader = csv_reader(input);
    let meta = read_header(&mut reader)?;
    let nfeatures = meta.nfeatures;

    let mut out = PredictionSet {
        meta,
        ..PredictionSet::default()
    };

    let mut record = StringRecord::new();
    while next_record(&mut reader, &mut record)? {
        ensure_width(&record, nfeatures + 1, "sample id + features")?;

        let sample_id = record[0].to_string();
        let mut sample = Vec::with_capacity(nfeatures);
        for token in record.iter().skip(1) {
            sample.push(coerce_f64(token, &mut out.coerced_values));
        }

        out.sample_ids.push(sample_id);
        out.samples.push(sample);
    }

    log_coercions(out.coerced_values, out.samples.len());
    debug!(rows = out.samples.len(), nfeatures, "Read prediction dataset");
    Ok(out)
}

pub fn read_training_file(path: &Path) -> Result<TrainingSet> {
    read_training(open(path)?)
}

pub fn read_prediction_file(path: &Path) -> Result<PredictionSet> {
    read_prediction(open(path)?)
}

fn open(path: &Path) -> Result<File> {
    File::open(path).map_err(|e| RegressionError::io(path, e))
}

fn csv_reader<R: Read>(input: R) -> csv::Reader<R> {
    csv::ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .trim(csv::Trim::All)
        .from_reader(input)
}

/// Consume the two metadata lines and the column header line.
fn read_header<R: Read>(reader: &mut csv::Reader<R>) -> Result<DatasetMeta> {
    let mut names = StringRecord::new();
    let mut values = StringRecord::new();
    let mut columns = StringRecord::new();

    if !next_record(reader, &mut names)? {
        return Err(RegressionError::MalformedDataset(
            "Missing metadata names line.".to_string(),
        ));
    }
    if !next_record(reader, &mut values)? {
        return Err(RegressionError::MalformedDataset(
            "Missing metadata values line.".to_string(),
        ));
    }
    if names.len() != values.len() {
        return Err(RegressionError::MalformedDataset(format!(
            "Metadata has {} names but {} values.",
            names.len(),
            values.len()
        )));
    }

    let fields: HashMap<String, String> = names
        .iter()
        .zip(values.iter())
        .map(|(name, value)| (normalize_field_name(name), value.to_string()))
        .collect();

    let raw = fields.get(NFEATURES_FIELD).ok_or_else(|| {
        RegressionError::MalformedDataset(format!("Metadata is missing `{NFEATURES_FIELD}`."))
    })?;
    let nfeatures = raw
        .parse::<usize>()
        .ok()
        .filter(|n| *n > 0)
        .ok_or_else(|| {
            RegressionError::MalformedDataset(format!(
                "`{NFEATURES_FIELD}` must be a positive integer, got '{raw}'."
            ))
        })?;

    if !next_record(reader, &mut columns)? {
        return Err(RegressionError::MalformedDataset(
            "Missing column header line.".to_string(),
        ));
    }

    Ok(DatasetMeta { nfeatures, fields })
}

fn next_record<R: Read>(reader: &mut csv::Reader<R>, record: &mut StringRecord) -> Result<bool> {
    reader
        .read_record(record)
        .map_err(|e| RegressionError::MalformedDataset(format!("CSV parse error: {e}")))
}

fn ensure_width(record: &StringRecord, expected: usize, layout: &str) -> Result<()> {
    if record.len() == expected {
        return Ok(());
    }
    let line = record.position().map(|p| p.line()).unwrap_or(0);
    Err(RegressionError::MalformedDataset(format!(
        "Line {line}: expected {expected} columns ({layout}), found {}.",
        record.len()
    )))
}

fn normalize_field_name(name: &str) -> String {
    // Spreadsheet exports sometimes prefix the first field with a BOM.
    name.trim().trim_start_matches('\u{feff}').to_ascii_lowercase()
}

/// Parse a numeric token; anything that is not a finite number becomes `0.0`.
fn coerce_f64(token: &str, coerced: &mut usize) -> f64 {
    match token.parse::<f64>() {
        Ok(v) if v.is_finite() => v,
        _ => {
            *coerced += 1;
            0.0
        }
    }
}

fn log_coercions(coerced: usize, rows: usize) {
    if coerced > 0 {
        warn!(coerced, rows, "Non-numeric dataset values were read as 0.0");
    }
}
