//! Prediction pipeline
//!
//! Orchestrates the two upload paths: annotate-and-aggregate for
//! feature-only tables, predict-and-score for tables carrying the
//! ground-truth column. Both paths are pure functions of
//! (table, classifier, registry); repeated calls on the same table
//! yield the same report.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::error::{AppError, AppResult};
use crate::logic::ingest::FeatureTable;
use crate::logic::labels::LabelRegistry;
use crate::logic::model::{Classifier, FeatureMatrix};

/// Ground-truth column the accuracy path requires
pub const LABEL_COLUMN: &str = "Attack Name";

/// How many true/predicted pairs the scored report keeps for display.
/// Accuracy itself always covers every row.
pub const PAIRING_PREVIEW_ROWS: usize = 20;

/// One input row annotated with the resolved attack class
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnnotatedRow {
    pub predicted_attack: String,
    pub description: String,
    pub recommendation: String,
}

/// Frequency-table entry: how many rows resolved to this class
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClassCount {
    pub name: String,
    pub count: usize,
}

/// Result of the unlabeled path
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UnlabeledReport {
    pub rows: Vec<AnnotatedRow>,
    pub frequency: Vec<ClassCount>,
}

/// True/predicted display-name pair
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LabelPair {
    pub true_label: String,
    pub predicted_label: String,
}

/// Result of the labeled path
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScoredReport {
    /// Percentage 0-100 rounded to two decimals; `None` when the upload
    /// has no data rows (undefined, not zero)
    pub accuracy: Option<f64>,
    /// First [`PAIRING_PREVIEW_ROWS`] true/predicted pairs
    pub pairing: Vec<LabelPair>,
    /// Raw class ids for every row, in input order
    pub predictions: Vec<i64>,
}

/// The pipeline borrows its collaborators; nothing here holds state
/// across calls.
pub struct Pipeline<'a> {
    classifier: &'a dyn Classifier,
    registry: &'a LabelRegistry,
}

impl<'a> Pipeline<'a> {
    pub fn new(classifier: &'a dyn Classifier, registry: &'a LabelRegistry) -> Self {
        Self { classifier, registry }
    }

    /// Unlabeled path: one annotated row per input row, plus exact
    /// class counts. An empty table yields an empty report.
    pub fn predict_unlabeled(&self, table: &FeatureTable) -> AppResult<UnlabeledReport> {
        if table.is_empty() {
            return Ok(UnlabeledReport {
                rows: Vec::new(),
                frequency: Vec::new(),
            });
        }

        let matrix = to_matrix(&table.columns, &table.rows)?;
        let predictions = self.classifier.predict(&matrix)?;

        let mut rows = Vec::with_capacity(predictions.len());
        let mut counts: BTreeMap<&str, usize> = BTreeMap::new();
        for &id in &predictions {
            let label = self.registry.resolve(id);
            *counts.entry(label.name).or_insert(0) += 1;
            rows.push(AnnotatedRow {
                predicted_attack: label.name.to_string(),
                description: label.description.to_string(),
                recommendation: label.recommendation.to_string(),
            });
        }

        let mut frequency: Vec<ClassCount> = counts
            .into_iter()
            .map(|(name, count)| ClassCount {
                name: name.to_string(),
                count,
            })
            .collect();
        // Display ordering only; the counts are the contract
        frequency.sort_by(|a, b| b.count.cmp(&a.count).then_with(|| a.name.cmp(&b.name)));

        Ok(UnlabeledReport { rows, frequency })
    }

    /// Labeled path: split off the ground-truth column, predict on the
    /// remaining features and score against the registry's inverse map.
    /// Ground-truth names the registry does not know count as incorrect.
    pub fn predict_and_score(&self, table: &FeatureTable) -> AppResult<ScoredReport> {
        let label_idx = table.column_index(LABEL_COLUMN).ok_or_else(|| {
            AppError::Schema(format!("missing required column '{}'", LABEL_COLUMN))
        })?;

        if table.is_empty() {
            return Ok(ScoredReport {
                accuracy: None,
                pairing: Vec::new(),
                predictions: Vec::new(),
            });
        }

        let feature_columns: Vec<String> = table
            .columns
            .iter()
            .enumerate()
            .filter(|(i, _)| *i != label_idx)
            .map(|(_, c)| c.clone())
            .collect();
        let feature_rows: Vec<Vec<String>> = table
            .rows
            .iter()
            .map(|row| {
                row.iter()
                    .enumerate()
                    .filter(|(i, _)| *i != label_idx)
                    .map(|(_, cell)| cell.clone())
                    .collect()
            })
            .collect();
        let truths: Vec<&str> = table.rows.iter().map(|row| row[label_idx].as_str()).collect();

        let matrix = to_matrix(&feature_columns, &feature_rows)?;
        let predictions = self.classifier.predict(&matrix)?;

        let truth_ids: Vec<Option<i64>> =
            truths.iter().map(|name| self.registry.id_of(name)).collect();
        let correct = predictions
            .iter()
            .zip(&truth_ids)
            .filter(|(pred, truth)| truth.map_or(false, |t| t == **pred))
            .count();

        let total = predictions.len();
        let accuracy = if total == 0 {
            None
        } else {
            let pct = correct as f64 / total as f64 * 100.0;
            Some((pct * 100.0).round() / 100.0)
        };

        let pairing = predictions
            .iter()
            .zip(&truths)
            .take(PAIRING_PREVIEW_ROWS)
            .map(|(&id, truth)| LabelPair {
                true_label: truth.to_string(),
                predicted_label: self.registry.resolve(id).name.to_string(),
            })
            .collect();

        Ok(ScoredReport {
            accuracy,
            pairing,
            predictions,
        })
    }
}

/// Convert cell text to the f32 matrix the classifier consumes.
/// A non-numeric feature cell is a mistyped column, reported the same
/// way as any other input the model cannot accept.
fn to_matrix(columns: &[String], rows: &[Vec<String>]) -> AppResult<FeatureMatrix> {
    let mut values = Vec::with_capacity(rows.len());
    for (row_no, row) in rows.iter().enumerate() {
        let mut parsed = Vec::with_capacity(row.len());
        for (column, cell) in columns.iter().zip(row.iter()) {
            let value: f32 = cell.trim().parse().map_err(|_| {
                AppError::Prediction(format!(
                    "column '{}' row {} is not numeric: '{}'",
                    column,
                    row_no + 1,
                    cell
                ))
            })?;
            parsed.push(value);
        }
        values.push(parsed);
    }
    Ok(FeatureMatrix {
        columns: columns.to_vec(),
        values,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::logic::ingest;
    use crate::logic::model::testing::{RejectingClassifier, ScriptedClassifier};

    fn unlabeled_table(rows: usize) -> FeatureTable {
        let mut csv = String::from("flow_rate,pkt_size\n");
        for i in 0..rows {
            csv.push_str(&format!("{}.5,{}\n", i, 64 + i));
        }
        ingest::parse(csv.as_bytes()).unwrap()
    }

    fn labeled_table(truths: &[&str]) -> FeatureTable {
        let mut csv = String::from("flow_rate,Attack Name,pkt_size\n");
        for (i, truth) in truths.iter().enumerate() {
            csv.push_str(&format!("{}.5,{},{}\n", i, truth, 64 + i));
        }
        ingest::parse(csv.as_bytes()).unwrap()
    }

    #[test]
    fn test_unlabeled_one_row_per_input() {
        let registry = LabelRegistry::builtin();
        let classifier = ScriptedClassifier {
            script: vec![0, 1, 2, 3, 4, 0],
        };
        let pipeline = Pipeline::new(&classifier, &registry);

        let report = pipeline.predict_unlabeled(&unlabeled_table(6)).unwrap();
        assert_eq!(report.rows.len(), 6);
        assert_eq!(report.rows[0].predicted_attack, "Benign Traffic");
        assert_eq!(report.rows[4].predicted_attack, "MQTT Flood");
        assert_eq!(report.rows[5].predicted_attack, "Benign Traffic");
    }

    #[test]
    fn test_unlabeled_frequency_scenario() {
        // 4 rows, model predicts [0, 1, 1, 4]
        let registry = LabelRegistry::builtin();
        let classifier = ScriptedClassifier {
            script: vec![0, 1, 1, 4],
        };
        let pipeline = Pipeline::new(&classifier, &registry);

        let report = pipeline.predict_unlabeled(&unlabeled_table(4)).unwrap();
        let counts: Vec<(&str, usize)> = report
            .frequency
            .iter()
            .map(|c| (c.name.as_str(), c.count))
            .collect();
        assert_eq!(
            counts,
            vec![("DoS Flood", 2), ("Benign Traffic", 1), ("MQTT Flood", 1)]
        );

        let total: usize = report.frequency.iter().map(|c| c.count).sum();
        assert_eq!(total, 4);

        assert_eq!(report.rows[1].description, "Denial of Service attack using flooding.");
        assert_eq!(
            report.rows[3].recommendation,
            "Secure MQTT brokers and monitor for unusual activity."
        );
    }

    #[test]
    fn test_unlabeled_unknown_id_degrades_gracefully() {
        let registry = LabelRegistry::builtin();
        let classifier = ScriptedClassifier { script: vec![0, 17] };
        let pipeline = Pipeline::new(&classifier, &registry);

        let report = pipeline.predict_unlabeled(&unlabeled_table(2)).unwrap();
        assert_eq!(report.rows[1].predicted_attack, "Unknown");
        assert_eq!(report.rows[1].description, "");
    }

    #[test]
    fn test_unlabeled_empty_table_yields_empty_report() {
        let registry = LabelRegistry::builtin();
        let classifier = ScriptedClassifier { script: vec![] };
        let pipeline = Pipeline::new(&classifier, &registry);

        let report = pipeline.predict_unlabeled(&unlabeled_table(0)).unwrap();
        assert!(report.rows.is_empty());
        assert!(report.frequency.is_empty());
    }

    #[test]
    fn test_unlabeled_mistyped_cell_is_prediction_error() {
        let registry = LabelRegistry::builtin();
        let classifier = ScriptedClassifier { script: vec![0] };
        let pipeline = Pipeline::new(&classifier, &registry);

        let table = ingest::parse(b"flow_rate,pkt_size\nfast,64\n").unwrap();
        let err = pipeline.predict_unlabeled(&table).unwrap_err();
        match err {
            AppError::Prediction(msg) => {
                assert!(msg.contains("flow_rate"));
                assert!(msg.contains("fast"));
            }
            other => panic!("expected Prediction, got {other:?}"),
        }
    }

    #[test]
    fn test_unlabeled_model_rejection_is_recoverable() {
        let registry = LabelRegistry::builtin();
        let classifier = RejectingClassifier;
        let pipeline = Pipeline::new(&classifier, &registry);

        let err = pipeline.predict_unlabeled(&unlabeled_table(2)).unwrap_err();
        assert!(matches!(err, AppError::Prediction(_)));
    }

    #[test]
    fn test_scored_missing_column_is_schema_error() {
        let registry = LabelRegistry::builtin();
        let classifier = ScriptedClassifier { script: vec![0] };
        let pipeline = Pipeline::new(&classifier, &registry);

        let err = pipeline.predict_and_score(&unlabeled_table(1)).unwrap_err();
        match err {
            AppError::Schema(msg) => assert!(msg.contains("Attack Name")),
            other => panic!("expected Schema, got {other:?}"),
        }
    }

    #[test]
    fn test_scored_accuracy_scenario() {
        // ground truth [Benign Traffic, DoS Flood], predictions [0, 2]
        let registry = LabelRegistry::builtin();
        let classifier = ScriptedClassifier { script: vec![0, 2] };
        let pipeline = Pipeline::new(&classifier, &registry);

        let table = labeled_table(&["Benign Traffic", "DoS Flood"]);
        let report = pipeline.predict_and_score(&table).unwrap();

        assert_eq!(report.accuracy, Some(50.0));
        assert_eq!(
            report.pairing,
            vec![
                LabelPair {
                    true_label: "Benign Traffic".to_string(),
                    predicted_label: "Benign Traffic".to_string(),
                },
                LabelPair {
                    true_label: "DoS Flood".to_string(),
                    predicted_label: "DDoS Flood".to_string(),
                },
            ]
        );
        assert_eq!(report.predictions, vec![0, 2]);
    }

    #[test]
    fn test_scored_all_correct_is_100() {
        let registry = LabelRegistry::builtin();
        let classifier = ScriptedClassifier {
            script: vec![1, 1, 3],
        };
        let pipeline = Pipeline::new(&classifier, &registry);

        let table = labeled_table(&["DoS Flood", "DoS Flood", "Recon Flood"]);
        let report = pipeline.predict_and_score(&table).unwrap();
        assert_eq!(report.accuracy, Some(100.0));
    }

    #[test]
    fn test_scored_accuracy_rounds_to_two_decimals() {
        // 1 of 3 correct = 33.333...% -> 33.33
        let registry = LabelRegistry::builtin();
        let classifier = ScriptedClassifier {
            script: vec![0, 0, 0],
        };
        let pipeline = Pipeline::new(&classifier, &registry);

        let table = labeled_table(&["Benign Traffic", "DoS Flood", "DDoS Flood"]);
        let report = pipeline.predict_and_score(&table).unwrap();
        assert_eq!(report.accuracy, Some(33.33));
    }

    #[test]
    fn test_scored_unresolvable_truth_counts_incorrect() {
        let registry = LabelRegistry::builtin();
        let classifier = ScriptedClassifier { script: vec![0, 1] };
        let pipeline = Pipeline::new(&classifier, &registry);

        let table = labeled_table(&["Not A Known Attack", "DoS Flood"]);
        let report = pipeline.predict_and_score(&table).unwrap();
        assert_eq!(report.accuracy, Some(50.0));
        assert_eq!(report.pairing[0].true_label, "Not A Known Attack");
    }

    #[test]
    fn test_scored_empty_table_is_undefined_not_nan() {
        let registry = LabelRegistry::builtin();
        let classifier = ScriptedClassifier { script: vec![] };
        let pipeline = Pipeline::new(&classifier, &registry);

        let table = labeled_table(&[]);
        let report = pipeline.predict_and_score(&table).unwrap();
        assert_eq!(report.accuracy, None);
        assert!(report.pairing.is_empty());
        assert!(report.predictions.is_empty());
    }

    #[test]
    fn test_scored_pairing_truncates_to_preview_window() {
        let registry = LabelRegistry::builtin();
        let truths: Vec<&str> = (0..25).map(|_| "DoS Flood").collect();
        let classifier = ScriptedClassifier {
            script: vec![1; 25],
        };
        let pipeline = Pipeline::new(&classifier, &registry);

        let report = pipeline.predict_and_score(&labeled_table(&truths)).unwrap();
        assert_eq!(report.pairing.len(), PAIRING_PREVIEW_ROWS);
        // Accuracy still covers all 25 rows
        assert_eq!(report.predictions.len(), 25);
        assert_eq!(report.accuracy, Some(100.0));
    }

    #[test]
    fn test_scored_ground_truth_never_reaches_model() {
        // The scripted stub asserts on row count; the label column being
        // dropped means two feature columns survive, widths untouched.
        let registry = LabelRegistry::builtin();
        let classifier = ScriptedClassifier { script: vec![2] };
        let pipeline = Pipeline::new(&classifier, &registry);

        // "Attack Name" sits between the feature columns; if it leaked
        // into the matrix the non-numeric cell would fail the parse.
        let table = labeled_table(&["DDoS Flood"]);
        let report = pipeline.predict_and_score(&table).unwrap();
        assert_eq!(report.accuracy, Some(100.0));
    }

    #[test]
    fn test_pipeline_is_idempotent() {
        let registry = LabelRegistry::builtin();
        let classifier = ScriptedClassifier {
            script: vec![0, 1, 1, 4],
        };
        let pipeline = Pipeline::new(&classifier, &registry);

        let table = unlabeled_table(4);
        let first = pipeline.predict_unlabeled(&table).unwrap();
        let second = pipeline.predict_unlabeled(&table).unwrap();
        assert_eq!(first.rows, second.rows);
        assert_eq!(first.frequency, second.frequency);
    }
}
