//! Export results for downstream consumers.
//!
//! - predictions as CSV (`row,sampleid,prediction`), easy to join back onto
//!   the host's sample table
//! - evaluation results as pretty JSON

use std::fs::File;
use std::path::Path;

use crate::domain::{EstimateResult, EvaluationResult};
use crate::error::{RegressionError, Result};

/// Write every prediction, in input row order.
pub fn write_predictions_csv(path: &Path, result: &EstimateResult) -> Result<()> {
    let file = File::create(path).map_err(|e| RegressionError::io(path, e))?;
    let mut writer = csv::Writer::from_writer(file);

    writer
        .write_record(["row", "sampleid", "prediction"])
        .map_err(|e| csv_error(path, e))?;

    for p in &result.predictions {
        writer
            .write_record([p.row.to_string(), p.sample_id.clone(), format!("{:.10}", p.value)])
            .map_err(|e| csv_error(path, e))?;
    }

    writer.flush().map_err(|e| RegressionError::io(path, e))?;
    Ok(())
}

pub fn write_evaluation_json(path: &Path, result: &EvaluationResult) -> Result<()> {
    let file = File::create(path).map_err(|e| RegressionError::io(path, e))?;
    serde_json::to_writer_pretty(file, result)
        .map_err(|e| RegressionError::io(path, std::io::Error::other(e)))?;
    Ok(())
}

fn csv_error(path: &Path, e: csv::Error) -> RegressionError {
    RegressionError::io(path, std::io::Error::other(e))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{Prediction, Status};

    fn read_evaluation_json(path: &Path) -> EvaluationResult {
        serde_json::from_reader(File::open(path).unwrap()).unwrap()
    }

    #[test]
    fn predictions_csv_keeps_order_and_quotes_ids() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("predictions.csv");
        let result = EstimateResult {
            status: Status::OK,
            notices: Vec::new(),
            predictions: vec![
                Prediction {
                    row: 0,
                    sample_id: "b,1".to_string(),
                    value: 2.5,
                },
                Prediction {
                    row: 1,
                    sample_id: "a".to_string(),
                    value: -1.0,
                },
            ],
        };

        write_predictions_csv(&path, &result).unwrap();
        let text = std::fs::read_to_string(&path).unwrap();
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines[0], "row,sampleid,prediction");
        assert_eq!(lines[1], "0,\"b,1\",2.5000000000");
        assert_eq!(lines[2], "1,a,-1.0000000000");
    }

    #[test]
    fn evaluation_json_reads_back() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("evaluation.json");
        let result = EvaluationResult {
            status: Status::LOW_SCORE,
            notices: vec!["low".to_string()],
            score: 0.25,
            std_dev: 0.01,
            scores: vec![0.24, 0.26],
            iterations: 2,
            failed_iterations: 0,
        };

        write_evaluation_json(&path, &result).unwrap();
        assert_eq!(read_evaluation_json(&path), result);
    }
}
