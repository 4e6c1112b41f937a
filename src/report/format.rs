//! Terminal formatting of result objects.
//!
//! Formatting lives here so the processor stays free of presentation code and
//! output changes stay localized.

use crate::domain::{EstimateResult, EvaluationResult, Status, TrainingResult};

/// Summary of a train call.
pub fn format_training(result: &TrainingResult, model_dir: &str) -> String {
    let mut out = String::new();

    out.push_str("=== olsr - train ===\n");
    out.push_str(&format!("Status: {}\n", result.status));
    out.push_str(&format!(
        "Rows: used={} | read={}\n",
        result.rows_used, result.rows_total
    ));
    if result.status.is_ok() {
        out.push_str(&format!("Model: {model_dir}\n"));
    }
    push_notices(&mut out, &result.notices);

    out
}

/// Summary plus a table of predictions.
pub fn format_estimates(result: &EstimateResult, limit: usize) -> String {
    let mut out = String::new();

    out.push_str("=== olsr - estimate ===\n");
    out.push_str(&format!("Status: {}\n", result.status));
    out.push_str(&format!("Predictions: n={}\n", result.predictions.len()));
    push_notices(&mut out, &result.notices);
    out.push('\n');

    out.push_str(format!("{:>8} {:<24} {:>16}\n", "row", "sampleid", "prediction").trim_end());
    out.push('\n');
    out.push_str(format!("{:->8} {:-<24} {:->16}\n", "", "", "").trim_end());
    out.push('\n');

    for p in result.predictions.iter().take(limit) {
        out.push_str(
            format!(
                "{:>8} {:<24} {:>16.6}\n",
                p.row,
                truncate(&p.sample_id, 24),
                p.value
            )
            .trim_end(),
        );
        out.push('\n');
    }
    if result.predictions.len() > limit {
        out.push_str(&format!(
            "... {} more rows (use --export to write all)\n",
            result.predictions.len() - limit
        ));
    }

    out
}

/// Summary of an evaluate call.
pub fn format_evaluation(result: &EvaluationResult, max_deviation: f64) -> String {
    let mut out = String::new();

    out.push_str("=== olsr - evaluate ===\n");
    out.push_str(&format!("Status: {}\n", result.status));
    if result.status.contains(Status::INSUFFICIENT_DATA) {
        push_notices(&mut out, &result.notices);
        return out;
    }

    out.push_str(&format!(
        "Score (mean R²): {:.4} | std-dev={:.4} (max {:.4})\n",
        result.score, result.std_dev, max_deviation
    ));
    out.push_str(&format!(
        "Iterations: {} | failed={}\n",
        result.iterations, result.failed_iterations
    ));
    out.push_str(&format!("Scores: {}\n", fmt_vec(&result.scores)));
    push_notices(&mut out, &result.notices);

    out
}

fn push_notices(out: &mut String, notices: &[String]) {
    if notices.is_empty() {
        return;
    }
    out.push_str("\nNotices:\n");
    for notice in notices {
        out.push_str(&format!("- {notice}\n"));
    }
}

fn fmt_vec(v: &[f64]) -> String {
    let parts: Vec<String> = v.iter().map(|x| format!("{x:.4}")).collect();
    format!("[{}]", parts.join(", "))
}

fn truncate(s: &str, max: usize) -> String {
    if s.chars().count() <= max {
        return s.to_string();
    }
    let mut out: String = s.chars().take(max.saturating_sub(1)).collect();
    out.push('.');
    out
}
