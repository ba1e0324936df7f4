//! Scores a prediction file against ground truth joined on `Id`.
//!
//! The key is matched as exact text after trimming, so `"7"` and `"07"`
//! are different rows.

use serde::Serialize;
use std::collections::HashMap;

use crate::aggregate::utility::mean;
use crate::error::{PipelineError, Result};
use crate::report::Report;
use crate::schema::{ColumnSpec, normalize};
use crate::table::RawTable;

const TRUTH_COLUMNS: &[ColumnSpec] = &[
    ColumnSpec::required("id", &["Id", "id"]),
    ColumnSpec::required("true", &["True", "true"]),
];

const PREDICTION_COLUMNS: &[ColumnSpec] = &[
    ColumnSpec::required("id", &["Id", "id"]),
    ColumnSpec::required("predicted", &["Predicted", "predicted"]),
    ColumnSpec::optional("true", &["True", "true"]),
];

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EvaluatedRow {
    pub id: String,
    pub truth: f64,
    pub predicted: f64,
    pub abs_error: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EvaluationSummary {
    pub matched: usize,
    pub unmatched: usize,
    pub mae: f64,
    pub rmse: f64,
    pub rows: Vec<EvaluatedRow>,
}

/// Joins `predictions` with `truth` (or with the predictions' own `True`
/// column when no truth file is given) and computes MAE and RMSE.
pub fn evaluate(predictions: &RawTable, truth: Option<&RawTable>) -> Result<Report<EvaluationSummary>> {
    let preds = normalize(predictions, PREDICTION_COLUMNS, "predictions")?;

    let truth_by_id: HashMap<String, f64> = match truth {
        Some(raw) => {
            let table = normalize(raw, TRUTH_COLUMNS, "ground truth")?;
            table
                .rows()
                .filter_map(|row| Some((row.text("id")?.to_string(), row.float("true")?)))
                .collect()
        }
        None => {
            if !preds.has_column("true") {
                return Err(PipelineError::missing_column("predictions", "true"));
            }
            preds
                .rows()
                .filter_map(|row| Some((row.text("id")?.to_string(), row.float("true")?)))
                .collect()
        }
    };

    let mut rows = Vec::new();
    let mut unmatched = 0;
    for row in preds.rows() {
        let (Some(id), Some(predicted)) = (row.text("id"), row.float("predicted")) else {
            unmatched += 1;
            continue;
        };
        match truth_by_id.get(id) {
            Some(&truth) => rows.push(EvaluatedRow {
                id: id.to_string(),
                truth,
                predicted,
                abs_error: (truth - predicted).abs(),
            }),
            None => unmatched += 1,
        }
    }

    let abs: Vec<f64> = rows.iter().map(|r| r.abs_error).collect();
    let sq: Vec<f64> = abs.iter().map(|e| e * e).collect();
    let (Some(mae), Some(mse)) = (mean(&abs), mean(&sq)) else {
        return Ok(Report::NoData);
    };

    Ok(Report::Ready(EvaluationSummary {
        matched: rows.len(),
        unmatched,
        mae,
        rmse: mse.sqrt(),
        rows,
    }))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn raw(text: &str) -> RawTable {
        RawTable::from_csv_str(text).unwrap()
    }

    #[test]
    fn test_join_on_exact_id() {
        let preds = raw("Id,Predicted\n1,10\n2,4\n07,3\n");
        let truth = raw("Id,True\n1,12\n2,4\n7,3\n");
        let out = evaluate(&preds, Some(&truth)).unwrap().ready().unwrap();

        assert_eq!(out.matched, 2);
        assert_eq!(out.unmatched, 1);
        assert_eq!(out.mae, 1.0);
        assert!((out.rmse - 2.0f64.sqrt()).abs() < 1e-12);
    }

    #[test]
    fn test_self_contained_prediction_file() {
        let preds = raw("Id,True,Predicted\na,1,2\nb,5,5\n");
        let out = evaluate(&preds, None).unwrap().ready().unwrap();
        assert_eq!(out.matched, 2);
        assert_eq!(out.mae, 0.5);
    }

    #[test]
    fn test_missing_true_column_without_truth_file() {
        let preds = raw("Id,Predicted\na,2\n");
        assert!(matches!(
            evaluate(&preds, None),
            Err(PipelineError::MissingColumn { .. })
        ));
    }

    #[test]
    fn test_no_overlap_is_no_data() {
        let preds = raw("Id,Predicted\na,2\n");
        let truth = raw("Id,True\nb,2\n");
        assert!(evaluate(&preds, Some(&truth)).unwrap().is_no_data());
    }
}
